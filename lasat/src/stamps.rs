//! Marks that can be cleared in constant time.

/// A set of marked indices that is emptied by advancing an epoch counter.
///
/// Each entry stores the epoch in which it was marked last. Entries are only rewritten when they
/// are marked again, so clearing never touches the table.
pub struct Stamps {
    epoch: u64,
    marks: Vec<u64>,
}

impl Default for Stamps {
    fn default() -> Stamps {
        Stamps {
            epoch: 1,
            marks: vec![],
        }
    }
}

impl Stamps {
    /// Update structures for a new number of indices.
    pub fn set_len(&mut self, len: usize) {
        self.marks.resize(len, 0);
    }

    /// Unmark all indices.
    pub fn advance(&mut self) {
        self.epoch += 1;
    }

    /// Mark an index, returns whether it was unmarked before.
    pub fn mark(&mut self, index: usize) -> bool {
        let first = self.marks[index] != self.epoch;
        self.marks[index] = self.epoch;
        first
    }

    pub fn is_marked(&self, index: usize) -> bool {
        self.marks[index] == self.epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_clears_marks() {
        let mut stamps = Stamps::default();
        stamps.set_len(4);

        assert!(!stamps.is_marked(2));
        assert!(stamps.mark(2));
        assert!(!stamps.mark(2));
        assert!(stamps.is_marked(2));
        assert!(!stamps.is_marked(3));

        stamps.advance();

        assert!(!stamps.is_marked(2));
        assert!(stamps.mark(3));
        assert!(stamps.is_marked(3));
    }
}
