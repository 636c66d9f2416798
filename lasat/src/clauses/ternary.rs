//! Ternary clauses with linked entries.
use std::fmt;

use crate::lit::Lit;
use crate::prop::Ledger;

use super::ClauseTable;

/// Every ternary clause `a ∨ b ∨ c` as three entries: `(b, c)` in the list of `¬a`, `(c, a)` in
/// the list of `¬b` and `(a, b)` in the list of `¬c`.
///
/// The entries of a clause are linked into a cycle, so each one can be found from any other. A
/// list is split into an active prefix and an inactive suffix. Deactivating a clause swaps each
/// of its entries behind the active prefix of its list and shrinks the prefix, reactivation only
/// needs to grow the prefixes again.
#[derive(Default)]
pub struct TernaryTable {
    pairs: Vec<[Lit; 2]>,
    link: Vec<usize>,
    /// The list of literal code `c` occupies `start[c]..start[c + 1]`.
    start: Vec<usize>,
    active: Vec<usize>,
}

impl TernaryTable {
    pub fn new(var_count: usize, clauses: &[[Lit; 3]]) -> TernaryTable {
        let lit_count = var_count * 2;

        let mut start = vec![0; lit_count + 1];
        for clause in clauses {
            for &lit in clause.iter() {
                start[(!lit).code() + 1] += 1;
            }
        }
        for code in 0..lit_count {
            start[code + 1] += start[code];
        }

        let entries = start[lit_count];
        let mut pairs = vec![[Lit::from_code(0); 2]; entries];
        let mut link = vec![0; entries];
        let mut fill = start[..lit_count].to_vec();

        let mut place = |lit: Lit, pair: [Lit; 2]| {
            let pos = fill[lit.code()];
            fill[lit.code()] += 1;
            pairs[pos] = pair;
            pos
        };

        for &[a, b, c] in clauses {
            let p = place(!a, [b, c]);
            let pp = place(!b, [c, a]);
            let ppp = place(!c, [a, b]);
            link[p] = pp;
            link[pp] = ppp;
            link[ppp] = p;
        }

        let active = (0..lit_count)
            .map(|code| start[code + 1] - start[code])
            .collect();

        TernaryTable {
            pairs,
            link,
            start,
            active,
        }
    }

    /// Shrink the active prefix of a list, returning the position that just became inactive.
    fn shrink(&mut self, lit: Lit) -> usize {
        self.active[lit.code()] -= 1;
        self.start[lit.code()] + self.active[lit.code()]
    }

    /// Active entries of a list.
    pub fn active_pairs(&self, lit: Lit) -> &[[Lit; 2]] {
        let begin = self.start[lit.code()];
        &self.pairs[begin..begin + self.active[lit.code()]]
    }
}

impl ClauseTable for TernaryTable {
    fn promote(&mut self, lit: Lit, _ledger: &Ledger, pairs: &mut Vec<[Lit; 2]>) {
        let var = lit.var();

        // Deactivate every clause containing the variable, taking it out of the lists of the
        // other two literals.
        for &listed in [var.positive(), var.negative()].iter() {
            for i in 0..self.active[listed.code()] {
                let p = self.start[listed.code()] + i;
                let [u, v] = self.pairs[p];
                let mut pp = self.link[p];
                let ppp = self.link[pp];

                let t = self.shrink(!u);
                if t != pp {
                    let moved = self.pairs[t];
                    let q = self.link[t];
                    let qq = self.link[q];
                    self.link[qq] = pp;
                    self.link[p] = t;
                    self.pairs[pp] = moved;
                    self.link[pp] = q;
                    self.pairs[t] = [v, !listed];
                    self.link[t] = ppp;
                    pp = t;
                }

                let t = self.shrink(!v);
                if t != ppp {
                    let moved = self.pairs[t];
                    let q = self.link[t];
                    let qq = self.link[q];
                    self.link[qq] = ppp;
                    self.link[pp] = t;
                    self.pairs[ppp] = moved;
                    self.link[ppp] = q;
                    self.pairs[t] = [!listed, u];
                    self.link[t] = p;
                }
            }
        }

        pairs.extend_from_slice(self.active_pairs(lit));
    }

    fn demote(&mut self, lit: Lit, _ledger: &Ledger) {
        let var = lit.var();

        for &listed in [var.negative(), var.positive()].iter() {
            let begin = self.start[listed.code()];
            for i in (0..self.active[listed.code()]).rev() {
                let [u, v] = self.pairs[begin + i];
                self.active[(!v).code()] += 1;
                self.active[(!u).code()] += 1;
            }
        }
    }

    fn active_len(&self, lit: Lit) -> usize {
        self.active[lit.code()]
    }

    fn dump(&self, target: &mut dyn fmt::Write, _ledger: &Ledger) -> fmt::Result {
        for code in 0..self.active.len() {
            let begin = self.start[code];
            let end = self.start[code + 1];
            if begin == end {
                continue;
            }
            write!(target, "  {}:", Lit::from_code(code))?;
            for pos in begin..end {
                if pos == begin + self.active[code] {
                    write!(target, " |")?;
                }
                let [u, v] = self.pairs[pos];
                write!(target, " ({} {})", u, v)?;
            }
            writeln!(target)?;
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ternary"
    }
}
