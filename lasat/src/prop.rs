//! Truth values, the trail and propagation along binary implications.
pub mod binary;
pub mod ledger;
pub mod trail;

pub use binary::propagate_binary;
pub use ledger::{Degree, Fix, Ledger, Truth};
pub use trail::Trail;

/// Propagation reached a literal whose complement is already fixed.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Conflict;
