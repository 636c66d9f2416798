//! Rewriting wide clauses into ternary clauses.
use crate::cnf::CnfFormula;
use crate::lit::Var;

/// Split every clause with more than three literals into a chain of ternary clauses.
///
/// The clause `l1 ∨ l2 ∨ … ∨ lk` becomes `l1 ∨ l2 ∨ y1`, `¬y1 ∨ l3 ∨ y2`, …,
/// `¬y(k-3) ∨ l(k-1) ∨ lk` using fresh variables `y1` to `y(k-3)`, numbered after all variables
/// of the input. The result is satisfiable exactly when the input is, and restricting a model of
/// the result to the input variables gives a model of the input.
pub fn reduce_to_bounded_width(formula: &CnfFormula) -> CnfFormula {
    let mut reduced = CnfFormula::new();
    reduced.set_var_count(formula.var_count());

    let mut next_index = formula.var_count();
    let mut fresh_var = || {
        let var = Var::from_index(next_index);
        next_index += 1;
        var
    };

    for clause in formula.iter() {
        let width = clause.len();
        if width <= 3 {
            reduced.add_clause(clause);
            continue;
        }

        let mut link = fresh_var();
        reduced.add_clause(&[clause[0], clause[1], link.positive()]);
        for &lit in clause[2..width - 2].iter() {
            let next_link = fresh_var();
            reduced.add_clause(&[link.negative(), lit, next_link.positive()]);
            link = next_link;
        }
        reduced.add_clause(&[link.negative(), clause[width - 2], clause[width - 1]]);
    }

    reduced
}
