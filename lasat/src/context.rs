//! Central solver data structure.
use partial_ref::{part, partial, PartialRef, PartialRefTarget};

use crate::binary::BinaryTable;
use crate::clauses::Clauses;
use crate::config::SolverConfig;
use crate::decision::Decisions;
use crate::free_vars::FreeVars;
use crate::prop::{Ledger, Trail};
use crate::search::Search;
use crate::state::SolverState;
use crate::stats::Stats;
use crate::tmp::TmpData;

/// Part declarations for the [`Context`] struct.
mod parts {
    use super::*;

    part!(pub BinaryTableP: BinaryTable);
    part!(pub ClausesP: Clauses);
    part!(pub DecisionsP: Decisions);
    part!(pub FreeVarsP: FreeVars);
    part!(pub LedgerP: Ledger);
    part!(pub SearchP: Search);
    part!(pub SolverConfigP: SolverConfig);
    part!(pub SolverStateP: SolverState);
    part!(pub StatsP: Stats);
    part!(pub TmpDataP: TmpData);
    part!(pub TrailP: Trail);
}

pub use parts::*;

/// Central solver data structure.
///
/// This struct contains all data kept by the solver. Most functions operating on multiple fields of
/// the context use partial references provided by the `partial_ref` crate. This documents the data
/// dependencies and makes the borrow checker happy without the overhead of passing individual
/// references.
#[derive(PartialRefTarget, Default)]
pub struct Context {
    #[part = "BinaryTableP"]
    binary_table: BinaryTable,
    #[part = "ClausesP"]
    clauses: Clauses,
    #[part = "DecisionsP"]
    decisions: Decisions,
    #[part = "FreeVarsP"]
    free_vars: FreeVars,
    #[part = "LedgerP"]
    ledger: Ledger,
    #[part = "SearchP"]
    search: Search,
    #[part = "SolverConfigP"]
    solver_config: SolverConfig,
    #[part = "SolverStateP"]
    solver_state: SolverState,
    #[part = "StatsP"]
    stats: Stats,
    #[part = "TmpDataP"]
    tmp_data: TmpData,
    #[part = "TrailP"]
    trail: Trail,
}

/// Size all per-variable structures for a new formula.
///
/// This resets their contents.
pub fn set_var_count(
    mut ctx: partial!(
        Context,
        mut BinaryTableP,
        mut DecisionsP,
        mut FreeVarsP,
        mut LedgerP,
        mut SolverStateP,
        mut StatsP,
        mut TmpDataP,
        mut TrailP,
    ),
    count: usize,
) {
    ctx.part_mut(BinaryTableP).set_var_count(count);
    ctx.part_mut(DecisionsP).set_var_count(count);
    ctx.part_mut(FreeVarsP).set_var_count(count);
    ctx.part_mut(LedgerP).set_var_count(count);
    ctx.part_mut(SolverStateP).var_count = count;
    ctx.part_mut(StatsP).set_var_count(count);
    ctx.part_mut(TmpDataP).set_var_count(count);
    ctx.part_mut(TrailP).set_var_count(count);
}
