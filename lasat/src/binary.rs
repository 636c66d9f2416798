//! Binary implication table.
use crate::lit::Lit;
use crate::stamps::Stamps;

/// Binary clauses stored as implications, `b` in `implied(a)` means `a` implies `b`.
///
/// Implications added during the search are logged. Within one round only the first addition to
/// a literal's list records the list's previous length, which is enough to restore all lists by
/// truncation.
#[derive(Default)]
pub struct BinaryTable {
    by_lit: Vec<Vec<Lit>>,
    touched: Stamps,
    log: Vec<(Lit, usize)>,
}

impl BinaryTable {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.by_lit.clear();
        self.by_lit.resize(count * 2, vec![]);
        self.touched.set_len(count * 2);
        self.log.clear();
    }

    /// Add a binary clause of the input formula.
    ///
    /// These are never removed, so they are not logged.
    pub fn add_clause(&mut self, lits: [Lit; 2]) {
        for i in 0..2 {
            self.by_lit[(!lits[i]).code()].push(lits[i ^ 1]);
        }
    }

    /// Implications of a given literal.
    pub fn implied(&self, lit: Lit) -> &[Lit] {
        &self.by_lit[lit.code()]
    }

    /// Start logging a new round of additions.
    pub fn begin_round(&mut self) {
        self.touched.advance();
    }

    /// Add a single implication.
    pub fn append(&mut self, lit: Lit, implied: Lit) {
        let list = &mut self.by_lit[lit.code()];
        if self.touched.mark(lit.code()) {
            self.log.push((lit, list.len()));
        }
        list.push(implied);
    }

    /// Add the clause `a ∨ b` as the implications `¬a → b` and `¬b → a`.
    pub fn append_clause(&mut self, a: Lit, b: Lit) {
        self.append(!a, b);
        self.append(!b, a);
    }

    /// Size of the addition log, used as a restore point.
    pub fn log_len(&self) -> usize {
        self.log.len()
    }

    /// Undo all additions logged after the given restore point.
    pub fn downdate(&mut self, log_len: usize) {
        while self.log.len() > log_len {
            if let Some((lit, len)) = self.log.pop() {
                self.by_lit[lit.code()].truncate(len);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use lasat_formula::{lit, lits};

    #[test]
    fn downdate_restores_lists() {
        let mut table = BinaryTable::default();
        table.set_var_count(4);
        table.add_clause(lits![1, 2]);

        assert_eq!(table.implied(lit!(-1)), &lits![2]);
        assert_eq!(table.implied(lit!(-2)), &lits![1]);

        let restore_point = table.log_len();

        table.begin_round();
        table.append_clause(lit!(1), lit!(3));
        table.append(lit!(-1), lit!(4));
        assert_eq!(table.implied(lit!(-1)), &lits![2, 3, 4]);
        assert_eq!(table.log_len(), restore_point + 2);

        let inner_point = table.log_len();
        table.begin_round();
        table.append(lit!(-1), lit!(-4));
        table.append_clause(lit!(2), lit!(4));
        assert_eq!(table.implied(lit!(-1)), &lits![2, 3, 4, -4]);

        table.downdate(inner_point);
        assert_eq!(table.implied(lit!(-1)), &lits![2, 3, 4]);
        assert_eq!(table.implied(lit!(-2)), &lits![1]);
        assert!(table.implied(lit!(-4)).is_empty());

        table.downdate(restore_point);
        assert_eq!(table.implied(lit!(-1)), &lits![2]);
        assert!(table.implied(lit!(-3)).is_empty());
        assert_eq!(table.log_len(), restore_point);
    }
}
