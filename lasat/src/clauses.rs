//! Clauses of width three and more.
use std::fmt;

use crate::lit::Lit;
use crate::prop::Ledger;

pub mod occurrence;
pub mod ternary;

pub use occurrence::OccurrenceTable;
pub use ternary::TernaryTable;

/// Storage for the clauses that are not binary.
///
/// Each table keeps, for every literal, a list of the clauses it has to look at once that
/// literal's variable becomes a real truth. The active part of each list only holds clauses that
/// are neither satisfied nor reduced to a binary clause.
pub trait ClauseTable {
    /// Detach the clauses of a variable that was just promoted.
    ///
    /// `lit` is the literal that became a real truth, the ledger already reflects this. Pairs
    /// of literals of which one has to be true from now on are appended to `pairs`.
    fn promote(&mut self, lit: Lit, ledger: &Ledger, pairs: &mut Vec<[Lit; 2]>);

    /// Undo [`promote`](ClauseTable::promote).
    ///
    /// Calls have to happen in reverse order of promotion, while `lit` is still fixed.
    fn demote(&mut self, lit: Lit, ledger: &Ledger);

    /// Number of active clauses listed for a literal.
    fn active_len(&self, lit: Lit) -> usize;

    /// Write the table in a human readable form.
    fn dump(&self, target: &mut dyn fmt::Write, ledger: &Ledger) -> fmt::Result;

    /// Short name used in log messages.
    fn name(&self) -> &'static str;
}

/// The clause table selected when the formula was loaded.
pub struct Clauses {
    table: Box<dyn ClauseTable>,
}

impl Default for Clauses {
    fn default() -> Clauses {
        Clauses::new(TernaryTable::default())
    }
}

impl Clauses {
    pub fn new(table: impl ClauseTable + 'static) -> Clauses {
        Clauses {
            table: Box::new(table),
        }
    }

    pub fn table(&self) -> &dyn ClauseTable {
        &*self.table
    }

    pub fn table_mut(&mut self) -> &mut dyn ClauseTable {
        &mut *self.table
    }
}
