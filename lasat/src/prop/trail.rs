//! Fixed literals in the order they were fixed.
use crate::lit::Lit;

/// Stack of all fixed literals along the current path.
///
/// The stack is divided into three segments. Literals below `committed` were fixed before the
/// current node was entered. Up to `real` they are real truths, above that the near truths of
/// the current propagation round follow.
#[derive(Default)]
pub struct Trail {
    lits: Vec<Lit>,
    real: usize,
    committed: usize,
}

impl Trail {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.lits.clear();
        self.lits.reserve(count);
        self.real = 0;
        self.committed = 0;
    }

    /// All fixed literals, oldest first.
    pub fn lits(&self) -> &[Lit] {
        &self.lits
    }

    pub fn len(&self) -> usize {
        self.lits.len()
    }

    /// Number of literals known to be real truths.
    pub fn real_len(&self) -> usize {
        self.real
    }

    /// Number of literals fixed before the current node.
    pub fn committed_len(&self) -> usize {
        self.committed
    }

    pub fn push(&mut self, lit: Lit) {
        self.lits.push(lit)
    }

    /// Start a propagation round on top of the committed literals.
    pub fn begin_round(&mut self) {
        debug_assert_eq!(self.lits.len(), self.committed);
        self.lits.truncate(self.committed);
        self.real = self.committed;
    }

    /// Take the oldest near truth to promote it.
    pub fn next_near(&mut self) -> Option<Lit> {
        let lit = self.lits.get(self.real).cloned()?;
        self.real += 1;
        Some(lit)
    }

    /// Remove the newest near truth.
    pub fn pop_near(&mut self) -> Option<Lit> {
        if self.lits.len() > self.real {
            self.lits.pop()
        } else {
            None
        }
    }

    /// Remove the newest real truth that is not committed.
    pub fn pop_real(&mut self) -> Option<Lit> {
        if self.lits.len() > self.committed {
            let lit = self.lits.pop();
            self.real = self.real.min(self.lits.len());
            lit
        } else {
            None
        }
    }

    /// Accept all literals of the current round.
    pub fn commit(&mut self) {
        self.real = self.lits.len();
        self.committed = self.lits.len();
    }

    /// Move the committed boundary back to an earlier node.
    pub fn set_committed(&mut self, committed: usize) {
        debug_assert!(committed <= self.committed);
        self.committed = committed;
    }
}
