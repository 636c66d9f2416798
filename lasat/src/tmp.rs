//! Temporary data.
use crate::lit::Lit;
use crate::stamps::Stamps;

/// Temporary data used by various parts of the solver.
///
/// Make sure to check any documented invariants when using this. Also make sure to check all
/// existing users when adding invariants.
#[derive(Default)]
pub struct TmpData {
    /// Pairs produced by promoting a literal.
    ///
    /// Empty between uses, keeps its allocation.
    pub pairs: Vec<[Lit; 2]>,
    /// A mark for each literal code.
    ///
    /// Advance before use, marks are stale afterwards.
    pub lit_marks: Stamps,
}

impl TmpData {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.lit_marks.set_len(count * 2);
    }
}
