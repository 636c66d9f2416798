//! Loading a formula into the solver.
use log::info;
use partial_ref::{partial, PartialRef};

use crate::clauses::{Clauses, OccurrenceTable, TernaryTable};
use crate::cnf::CnfFormula;
use crate::config::WideClauseStrategy;
use crate::context::{
    set_var_count, BinaryTableP, ClausesP, Context, DecisionsP, FreeVarsP, LedgerP, SearchP,
    SolverConfigP, SolverStateP, StatsP, TmpDataP, TrailP,
};
use crate::lit::Lit;
use crate::reduce::reduce_to_bounded_width;
use crate::search::Step;
use crate::stamps::Stamps;
use crate::state::SatState;

/// Remove repeated literals and drop tautological clauses.
///
/// Clauses keep the order of their first occurrences. Returns `None` if the formula contains an
/// empty clause.
pub fn normalize(formula: &CnfFormula, var_count: usize) -> Option<CnfFormula> {
    let mut seen = Stamps::default();
    seen.set_len(var_count * 2);

    let mut normalized = CnfFormula::new();
    normalized.set_var_count(var_count);

    let mut lits: Vec<Lit> = vec![];

    'clauses: for clause in formula.iter() {
        if clause.is_empty() {
            return None;
        }

        seen.advance();
        lits.clear();

        for &lit in clause.iter() {
            if seen.is_marked((!lit).code()) {
                continue 'clauses;
            }
            if seen.mark(lit.code()) {
                lits.push(lit);
            }
        }

        normalized.add_clause(&lits);
    }

    Some(normalized)
}

/// Set up all search structures for a formula over `var_count` variables.
///
/// Complementary unit clauses or an empty clause make the formula unsatisfiable right away,
/// without visiting any search node.
pub fn load_formula(
    mut ctx: partial!(
        Context,
        mut BinaryTableP,
        mut ClausesP,
        mut DecisionsP,
        mut FreeVarsP,
        mut LedgerP,
        mut SearchP,
        mut SolverStateP,
        mut StatsP,
        mut TmpDataP,
        mut TrailP,
        SolverConfigP,
    ),
    formula: &CnfFormula,
    var_count: usize,
) {
    ctx.part_mut(SolverStateP).loaded = true;
    ctx.part_mut(SolverStateP).input_var_count = var_count;

    let normalized = match normalize(formula, var_count) {
        Some(normalized) => normalized,
        None => {
            info!("Formula contains an empty clause");
            set_var_count(ctx.borrow(), var_count);
            finish_unsat(ctx.borrow());
            return;
        }
    };

    let config = ctx.part(SolverConfigP);
    let keep_wide = config.wide_clauses == WideClauseStrategy::OccurrenceTables;
    let formula = if normalized.max_clause_len() > 3 && !keep_wide {
        reduce_to_bounded_width(&normalized)
    } else {
        normalized
    };

    // Only kept wide clauses remain after reduction.
    let has_wide = formula.max_clause_len() > 3;

    let search_var_count = formula.var_count();
    set_var_count(ctx.borrow(), search_var_count);

    let mut unit_count = 0;
    let mut binary_count = 0;
    let mut ternary = vec![];
    let mut wide = vec![];

    {
        let (tmp_data, mut ctx) = ctx.split_part_mut(TmpDataP);
        let marks = &mut tmp_data.lit_marks;
        marks.advance();

        for clause in formula.iter() {
            match *clause {
                [lit] => {
                    if marks.is_marked((!lit).code()) {
                        info!("Formula contains complementary unit clauses {} and {}", lit, !lit);
                        finish_unsat(ctx.borrow());
                        return;
                    }
                    if marks.mark(lit.code()) {
                        ctx.part_mut(SearchP).forced.push(lit);
                    }
                    unit_count += 1;
                }
                [a, b] => {
                    ctx.part_mut(BinaryTableP).add_clause([a, b]);
                    binary_count += 1;
                }
                [a, b, c] if !has_wide => ternary.push([a, b, c]),
                _ => wide.push(clause.to_vec()),
            }
        }
    }

    let clauses: Clauses = if has_wide {
        let config = ctx.part(SolverConfigP).clone();
        OccurrenceTable::new(search_var_count, wide, |width| config.sort_limit(width)).into()
    } else {
        TernaryTable::new(search_var_count, &ternary).into()
    };
    *ctx.part_mut(ClausesP) = clauses;

    let clauses = ctx.part(ClausesP);
    info!(
        "Loaded {} variables ({} added by width reduction), {} unit, {} binary clauses, using {} table",
        search_var_count,
        search_var_count - var_count,
        unit_count,
        binary_count,
        clauses.table().name(),
    );
}

/// Mark the formula as unsatisfiable before any search.
fn finish_unsat(mut ctx: partial!(Context, mut SearchP, mut SolverStateP)) {
    ctx.part_mut(SolverStateP).sat_state = SatState::Unsat;
    let search = ctx.part_mut(SearchP);
    search.forced.clear();
    search.step = Step::Unsat;
}

impl From<TernaryTable> for Clauses {
    fn from(table: TernaryTable) -> Clauses {
        Clauses::new(table)
    }
}

impl From<OccurrenceTable> for Clauses {
    fn from(table: OccurrenceTable) -> Clauses {
        Clauses::new(table)
    }
}
