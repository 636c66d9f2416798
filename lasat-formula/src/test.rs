//! Formula generators for tests.
use proptest::{prelude::*, *};

use rand::distributions::Bernoulli;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::cnf::CnfFormula;
use crate::lit::{Lit, Var};

/// Generate small hard unsat instances.
///
/// Implementation of http://www.cs.qub.ac.uk/~i.spence/sgen/ but with random partitions
pub fn sgen_unsat_formula(
    blocks: impl Strategy<Value = usize>,
) -> impl Strategy<Value = CnfFormula> {
    blocks.prop_flat_map(|blocks| {
        collection::vec(bool::ANY, blocks * 4 + 1).prop_perturb(|polarity, mut rng| {
            let mut clauses: Vec<Vec<Lit>> = vec![];
            let mut lits = polarity
                .into_iter()
                .enumerate()
                .map(|(index, polarity)| Lit::from_index(index, polarity))
                .collect::<Vec<_>>();

            for &invert in [false, true].iter() {
                lits.shuffle(&mut rng);
                for block in lits.chunks_exact(4) {
                    for a in 0..4 {
                        for b in 0..a {
                            for c in 0..b {
                                let mut clause =
                                    vec![block[a] ^ invert, block[b] ^ invert, block[c] ^ invert];
                                clause.shuffle(&mut rng);
                                clauses.push(clause);
                            }
                        }
                    }
                }
                let &lit_a = lits.last().unwrap();
                for b in 0..4 {
                    for c in 0..b {
                        let mut clause = vec![lit_a ^ invert, lits[b] ^ invert, lits[c] ^ invert];
                        clause.shuffle(&mut rng);
                        clauses.push(clause);
                    }
                }
            }

            clauses.shuffle(&mut rng);
            CnfFormula::from(clauses)
        })
    })
}

/// Generate a sat instance.
///
/// This fixes a random full assignment and only generates clauses that contain at least one literal
/// true under it. Clause lengths vary with `density`, so wide clauses are common for larger
/// variable counts.
pub fn sat_formula(
    vars: impl Strategy<Value = usize>,
    clause_count: impl Strategy<Value = usize>,
    density: impl Strategy<Value = f64>,
    polarity_dist: impl Strategy<Value = f64>,
) -> impl Strategy<Value = CnfFormula> {
    (vars, clause_count, density, polarity_dist).prop_flat_map(
        |(vars, clause_count, density, polarity_dist)| {
            let density = Bernoulli::new(density).unwrap();
            let polarity_dist = Bernoulli::new(polarity_dist).unwrap();

            collection::vec(bool::ANY, vars).prop_perturb(move |polarity, mut rng| {
                let mut clauses: Vec<Vec<Lit>> = vec![];
                let lits = polarity
                    .into_iter()
                    .enumerate()
                    .map(|(index, polarity)| Lit::from_index(index, polarity))
                    .collect::<Vec<_>>();

                for _ in 0..clause_count {
                    let &fixed_lit = lits.choose(&mut rng).unwrap();
                    let mut clause = vec![fixed_lit];
                    for &lit in lits.iter() {
                        if lit != fixed_lit && rng.sample(density) {
                            clause.push(lit ^ rng.sample(polarity_dist));
                        }
                    }
                    clause.shuffle(&mut rng);
                    clauses.push(clause);
                }

                clauses.shuffle(&mut rng);
                let mut formula = CnfFormula::from(clauses);
                formula.set_var_count(vars);
                formula
            })
        },
    )
}

/// Random clauses of exactly `width` distinct variables each.
///
/// Around the satisfiability threshold this produces a healthy mix of sat and unsat instances.
pub fn k_cnf_formula(
    vars: impl Strategy<Value = usize>,
    clause_count: impl Strategy<Value = usize>,
    width: usize,
) -> impl Strategy<Value = CnfFormula> {
    (vars, clause_count).prop_flat_map(move |(vars, clause_count)| {
        let vars = vars.max(width);
        Just(()).prop_perturb(move |(), mut rng| {
            let all_vars: Vec<Var> = (0..vars).map(Var::from_index).collect();
            let mut formula = CnfFormula::new();
            formula.set_var_count(vars);
            for _ in 0..clause_count {
                let picked: Vec<Var> = all_vars
                    .choose_multiple(&mut rng, width)
                    .cloned()
                    .collect();
                let clause: Vec<Lit> = picked.iter().map(|&var| var.lit(rng.gen())).collect();
                formula.add_clause(clause);
            }
            formula
        })
    })
}

/// Pigeonhole formula: every item is put into one of the slots, no slot holds two items.
///
/// Variable `item * slots + slot + 1` states that `item` sits in `slot`. Unsatisfiable whenever
/// `items > slots`.
pub fn pigeon_hole_formula(items: usize, slots: usize) -> CnfFormula {
    let placed = |item: usize, slot: usize| Lit::from_index(item * slots + slot, true);

    let mut formula = CnfFormula::new();
    formula.set_var_count(items * slots);

    for item in 0..items {
        formula.add_clause((0..slots).map(|slot| placed(item, slot)));
    }

    for slot in 0..slots {
        for item_a in 0..items {
            for item_b in 0..item_a {
                formula.add_clause(vec![!placed(item_a, slot), !placed(item_b, slot)]);
            }
        }
    }

    formula
}

/// Exhaustively search for a satisfying assignment.
///
/// Returns the first model in counting order. Only usable for small variable counts.
pub fn brute_force_model(formula: &CnfFormula) -> Option<Vec<bool>> {
    let var_count = formula.var_count();
    assert!(var_count <= 20, "brute force search over {} variables", var_count);

    (0..1u64 << var_count)
        .map(|bits| {
            (0..var_count)
                .map(|index| bits & (1 << index) != 0)
                .collect::<Vec<bool>>()
        })
        .find(|values| {
            formula.iter().all(|clause| {
                clause
                    .iter()
                    .any(|lit| values[lit.index()] == lit.is_positive())
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pigeon_hole_shape() {
        let formula = pigeon_hole_formula(4, 3);
        assert_eq!(formula.var_count(), 12);
        assert_eq!(formula.len(), 4 + 3 * 6);
        assert_eq!(formula.max_clause_len(), 3);
        assert_eq!(brute_force_model(&formula), None);

        let fits = pigeon_hole_formula(3, 3);
        assert!(brute_force_model(&fits).is_some());
    }

    #[test]
    fn brute_force_respects_clauses() {
        let formula = cnf_formula![
            1, 2;
            -1, 2;
            1, -2;
        ];
        assert_eq!(brute_force_model(&formula), Some(vec![true, true]));
    }
}
