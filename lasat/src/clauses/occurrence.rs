//! Wide clauses with per-literal occurrence lists.
use std::fmt;

use crate::lit::Lit;
use crate::prop::Ledger;

use super::ClauseTable;

/// Clauses of any width, each listed under every one of its literals.
///
/// For each clause the number of literals that are not real falsehoods is tracked. When that
/// number drops to two, the clause is reported as a pair. Occurrence lists are split into an
/// active prefix and an inactive suffix, like the lists of the ternary table.
#[derive(Default)]
pub struct OccurrenceTable {
    clauses: Vec<Vec<Lit>>,
    free_count: Vec<usize>,
    /// Clauses with fewer free literals than this keep them at the front while deactivating.
    sort_limit: Vec<usize>,
    by_lit: Vec<Vec<usize>>,
    active: Vec<usize>,
    /// Active list lengths of promoted literals, restored by demotion.
    saved_active: Vec<usize>,
}

impl OccurrenceTable {
    /// Build a table from clauses of width three and more.
    ///
    /// `sort_limit` computes the sorting threshold of a clause from its width.
    pub fn new(
        var_count: usize,
        clauses: Vec<Vec<Lit>>,
        sort_limit: impl Fn(usize) -> usize,
    ) -> OccurrenceTable {
        let mut by_lit = vec![vec![]; var_count * 2];

        for (index, clause) in clauses.iter().enumerate() {
            debug_assert!(clause.len() >= 3);
            for &lit in clause.iter() {
                by_lit[lit.code()].push(index);
            }
        }

        OccurrenceTable {
            free_count: clauses.iter().map(|clause| clause.len()).collect(),
            sort_limit: clauses.iter().map(|clause| sort_limit(clause.len())).collect(),
            active: by_lit.iter().map(|list| list.len()).collect(),
            by_lit,
            clauses,
            saved_active: vec![],
        }
    }

    /// Literals of a clause, free literals first once the clause was reduced to a pair.
    #[cfg(test)]
    pub fn clause(&self, index: usize) -> &[Lit] {
        &self.clauses[index]
    }

    /// Active clauses containing a literal.
    #[cfg(test)]
    pub fn active_clauses(&self, lit: Lit) -> &[usize] {
        &self.by_lit[lit.code()][..self.active[lit.code()]]
    }

    #[cfg(test)]
    pub fn free_count(&self, index: usize) -> usize {
        self.free_count[index]
    }
}

/// Move a clause behind the active prefix of an occurrence list.
fn detach(list: &mut [usize], active: &mut usize, clause: usize) {
    *active -= 1;
    let last = *active;
    if let Some(pos) = list[..last].iter().position(|&listed| listed == clause) {
        list.swap(pos, last);
    }
    debug_assert_eq!(list[last], clause);
}

impl ClauseTable for OccurrenceTable {
    fn promote(&mut self, lit: Lit, ledger: &Ledger, pairs: &mut Vec<[Lit; 2]>) {
        let code = lit.code();
        self.saved_active.push(self.active[code]);

        // Clauses containing `lit` are satisfied, detach them from all free literals.
        while self.active[code] > 0 {
            let index = self.by_lit[code][0];
            let keep_sorted = self.free_count[index] < self.sort_limit[index];
            let free_count = self.free_count[index];
            let clause = &mut self.clauses[index];

            let mut found = 0;
            for pos in 0..clause.len() {
                let other = clause[pos];
                if other == lit || !ledger.is_real(other.var()) {
                    detach(
                        &mut self.by_lit[other.code()],
                        &mut self.active[other.code()],
                        index,
                    );
                    if keep_sorted {
                        clause.swap(found, pos);
                    }
                    found += 1;
                    if found == free_count {
                        break;
                    }
                }
            }
        }

        // Clauses containing `!lit` lose a free literal.
        let negated = (!lit).code();
        for i in 0..self.active[negated] {
            let index = self.by_lit[negated][i];
            self.free_count[index] -= 1;
            if self.free_count[index] != 2 {
                continue;
            }

            let clause = &mut self.clauses[index];
            let mut found = 0;
            for pos in 0..clause.len() {
                if !ledger.is_real(clause[pos].var()) {
                    clause.swap(found, pos);
                    found += 1;
                    if found == 2 {
                        break;
                    }
                }
            }
            debug_assert_eq!(found, 2);

            let pair = [clause[0], clause[1]];
            pairs.push(pair);
            for &other in pair.iter() {
                detach(
                    &mut self.by_lit[other.code()],
                    &mut self.active[other.code()],
                    index,
                );
            }
        }
    }

    fn demote(&mut self, lit: Lit, ledger: &Ledger) {
        let negated = (!lit).code();
        for i in (0..self.active[negated]).rev() {
            let index = self.by_lit[negated][i];
            if self.free_count[index] == 2 {
                for &other in self.clauses[index][..2].iter() {
                    self.active[other.code()] += 1;
                }
            }
            self.free_count[index] += 1;
        }

        let code = lit.code();
        let saved = match self.saved_active.pop() {
            Some(saved) => saved,
            None => panic!("demoting {} without matching promotion", lit),
        };

        for i in 0..saved {
            let index = self.by_lit[code][i];
            for &other in self.clauses[index].iter().rev() {
                if other == lit || !ledger.is_real(other.var()) {
                    self.active[other.code()] += 1;
                }
            }
        }
    }

    fn active_len(&self, lit: Lit) -> usize {
        self.active[lit.code()]
    }

    fn dump(&self, target: &mut dyn fmt::Write, ledger: &Ledger) -> fmt::Result {
        for (index, clause) in self.clauses.iter().enumerate() {
            write!(target, "  #{} [{} free]:", index, self.free_count[index])?;
            for &lit in clause.iter() {
                match ledger.truth(lit.var()) {
                    Some(truth) => write!(target, " {}={}", lit, truth)?,
                    None => write!(target, " {}", lit)?,
                }
            }
            writeln!(target)?;
        }
        for (code, list) in self.by_lit.iter().enumerate() {
            if list.is_empty() {
                continue;
            }
            write!(target, "  {}:", Lit::from_code(code))?;
            for (pos, index) in list.iter().enumerate() {
                if pos == self.active[code] {
                    write!(target, " |")?;
                }
                write!(target, " #{}", index)?;
            }
            writeln!(target)?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "occurrence"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use lasat_formula::{lit, lits};

    use crate::prop::Degree;

    fn table(clauses: &[&[Lit]], var_count: usize, sort_limit: usize) -> OccurrenceTable {
        OccurrenceTable::new(
            var_count,
            clauses.iter().map(|clause| clause.to_vec()).collect(),
            |_| sort_limit,
        )
    }

    fn active_counts(table: &OccurrenceTable, var_count: usize) -> Vec<usize> {
        (0..var_count * 2)
            .map(|code| table.active_len(Lit::from_code(code)))
            .collect()
    }

    fn fix_real(ledger: &mut Ledger, lit: Lit) {
        ledger.fix(lit, Degree::Near);
        ledger.promote(lit);
    }

    #[test]
    fn shrinking_clause_becomes_pair() {
        let mut table = table(&[&lits![1, 2, 3, 4], &lits![-1, 2, 5]], 5, 0);
        let mut ledger = Ledger::default();
        ledger.set_var_count(5);
        let initial = active_counts(&table, 5);

        let mut pairs = vec![];

        fix_real(&mut ledger, lit!(-3));
        table.promote(lit!(-3), &ledger, &mut pairs);
        assert!(pairs.is_empty());
        assert_eq!(table.free_count(0), 3);

        fix_real(&mut ledger, lit!(-1));
        table.promote(lit!(-1), &ledger, &mut pairs);
        assert_eq!(pairs, vec![lits![2, 4]]);
        assert_eq!(table.free_count(0), 2);
        assert_eq!(&table.clause(0)[..2], &lits![2, 4]);

        // The second clause is satisfied and the first one became a pair.
        assert!(table.active_clauses(lit!(2)).is_empty());
        assert!(table.active_clauses(lit!(5)).is_empty());
        assert!(table.active_clauses(lit!(4)).is_empty());

        table.demote(lit!(-1), &ledger);
        ledger.unassign(lit!(1).var());
        table.demote(lit!(-3), &ledger);
        ledger.unassign(lit!(3).var());

        assert_eq!(active_counts(&table, 5), initial);
        assert_eq!(table.free_count(0), 4);
        assert_eq!(table.free_count(1), 3);
    }

    #[test]
    fn sorted_deactivation_keeps_free_literals_in_front() {
        let mut table = table(&[&lits![1, 2, 3, 4, 5]], 5, 10);
        let mut ledger = Ledger::default();
        ledger.set_var_count(5);
        let mut pairs = vec![];

        fix_real(&mut ledger, lit!(-2));
        table.promote(lit!(-2), &ledger, &mut pairs);
        fix_real(&mut ledger, lit!(4));
        table.promote(lit!(4), &ledger, &mut pairs);

        assert!(pairs.is_empty());
        assert_eq!(&table.clause(0)[..4], &lits![1, 3, 4, 5]);
        assert!(table.active_clauses(lit!(1)).is_empty());
        assert!(table.active_clauses(lit!(5)).is_empty());

        table.demote(lit!(4), &ledger);
        ledger.unassign(lit!(4).var());
        assert_eq!(table.active_clauses(lit!(1)), &[0]);
        assert_eq!(table.active_clauses(lit!(4)), &[0]);
        // Lists of falsified literals are left alone.
        assert_eq!(table.active_clauses(lit!(2)), &[0]);
    }
}
