//! Depth first search with binary propagation and lookahead-free branching.
//!
//! The search is a state machine. Each [`Step`] corresponds to one phase of processing a search
//! node and all state needed to continue lives in the [`Context`], so the search can be stopped
//! between nodes and resumed later.
use std::mem::take;

use log::{debug, info, trace};
use partial_ref::{partial, PartialRef};

use crate::context::{
    BinaryTableP, ClausesP, Context, DecisionsP, FreeVarsP, LedgerP, SearchP, SolverConfigP,
    SolverStateP, StatsP, TmpDataP, TrailP,
};
use crate::decision::{choose_literal, Branch};
use crate::dump::{invariant_violation, progress_line, state_dump};
use crate::lit::Lit;
use crate::promote::promote_near_truths;
use crate::prop::{propagate_binary, Degree};

/// Phase of the search loop that runs next.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Step {
    /// Enter a node: process forced literals or look for a branching literal.
    NewNode,
    /// Select a branching literal and record how to undo it.
    ChooseLiteral,
    /// Force the literal of the current branch.
    TryLiteral,
    /// Fix forced literals and their consequences, promoting them to real truths.
    PropagateAndPromote,
    /// Commit the round and move one level deeper.
    AcceptRealTruths,
    /// Conflict: drop the near truths of the failed round.
    UnfixNearTruths,
    /// Drop uncommitted real truths and restore the clause tables.
    UnfixRealTruths,
    /// Remove binary implications added since the current decision.
    DowndateBinaryTable,
    /// Switch to the second branch of the current decision if untried.
    TryOtherPolarity,
    /// Both branches failed, return to the previous decision.
    Backtrack,
    /// All variables are fixed as real truths.
    Sat,
    /// No branch is left to try.
    Unsat,
}

impl Default for Step {
    fn default() -> Step {
        Step::NewNode
    }
}

/// Search loop state.
#[derive(Default)]
pub struct Search {
    pub step: Step,
    /// Literals fixed at the start of the next propagation round.
    pub forced: Vec<Lit>,
}

/// Run the search until it finishes.
///
/// `interrupted` is polled whenever a node is entered. When it returns `true` the search stops
/// and `None` is returned, calling this again continues where it stopped.
pub fn search(
    mut ctx: partial!(
        Context,
        mut BinaryTableP,
        mut ClausesP,
        mut DecisionsP,
        mut FreeVarsP,
        mut LedgerP,
        mut SearchP,
        mut StatsP,
        mut TmpDataP,
        mut TrailP,
        SolverConfigP,
        SolverStateP,
    ),
    interrupted: impl Fn() -> bool,
) -> Option<bool> {
    loop {
        match ctx.part(SearchP).step {
            Step::Sat => return Some(true),
            Step::Unsat => return Some(false),
            Step::NewNode if interrupted() => return None,
            _ => {
                search_step(ctx.borrow());
            }
        }
    }
}

/// Perform a single step of the search, returning the step that follows.
pub fn search_step(
    mut ctx: partial!(
        Context,
        mut BinaryTableP,
        mut ClausesP,
        mut DecisionsP,
        mut FreeVarsP,
        mut LedgerP,
        mut SearchP,
        mut StatsP,
        mut TmpDataP,
        mut TrailP,
        SolverConfigP,
        SolverStateP,
    ),
) -> Step {
    let step = ctx.part(SearchP).step;

    if ctx.part(SolverConfigP).verbosity >= 1 {
        debug!("{:?} at depth {}", step, ctx.part(DecisionsP).depth());
    }

    let next = match step {
        Step::NewNode => new_node(ctx.borrow()),
        Step::ChooseLiteral => choose(ctx.borrow()),
        Step::TryLiteral => try_literal(ctx.borrow()),
        Step::PropagateAndPromote => propagate_and_promote(ctx.borrow()),
        Step::AcceptRealTruths => accept_real_truths(ctx.borrow()),
        Step::UnfixNearTruths => unfix_near_truths(ctx.borrow()),
        Step::UnfixRealTruths => unfix_real_truths(ctx.borrow()),
        Step::DowndateBinaryTable => downdate_binary_table(ctx.borrow()),
        Step::TryOtherPolarity => try_other_polarity(ctx.borrow()),
        Step::Backtrack => backtrack(ctx.borrow()),
        Step::Sat | Step::Unsat => step,
    };

    ctx.part_mut(SearchP).step = next;

    if ctx.part(SolverConfigP).self_check {
        check_invariants(ctx.borrow());
    }

    next
}

fn new_node(
    mut ctx: partial!(
        Context,
        mut DecisionsP,
        mut StatsP,
        mut TmpDataP,
        BinaryTableP,
        ClausesP,
        FreeVarsP,
        LedgerP,
        SearchP,
        SolverConfigP,
        SolverStateP,
        TrailP,
    ),
) -> Step {
    let committed = ctx.part(TrailP).committed_len();

    let decision = ctx.part_mut(DecisionsP).current_mut();
    decision.branch = None;
    decision.node_start = committed;

    if ctx.part(SolverConfigP).verbosity >= 2 {
        trace!("entering node\n{}", state_dump(ctx.borrow()));
    }

    if !ctx.part(SearchP).forced.is_empty() {
        return Step::PropagateAndPromote;
    }

    if trail_contradicts_binary_table(ctx.borrow()) {
        return Step::Backtrack;
    }

    if committed == ctx.part(SolverStateP).var_count {
        ctx.part_mut(StatsP).solutions += 1;
        if ctx.part(SolverConfigP).progress {
            info!("{}", progress_line(ctx.borrow()));
        }
        return Step::Sat;
    }

    Step::ChooseLiteral
}

/// Check whether a committed literal implies the complement of another one.
///
/// Implications added after both literals were fixed are not followed by propagation, so this
/// catches conflicts that propagation missed.
fn trail_contradicts_binary_table(
    mut ctx: partial!(Context, mut TmpDataP, BinaryTableP, TrailP),
) -> bool {
    let (tmp_data, ctx) = ctx.split_part_mut(TmpDataP);
    let marks = &mut tmp_data.lit_marks;
    let lits = ctx.part(TrailP).lits();
    let binary_table = ctx.part(BinaryTableP);

    marks.advance();
    for &lit in lits {
        marks.mark(lit.code());
    }

    lits.iter().any(|&lit| {
        binary_table
            .implied(lit)
            .iter()
            .any(|&implied| implied != !lit && marks.is_marked((!implied).code()))
    })
}

fn choose(
    mut ctx: partial!(
        Context,
        mut DecisionsP,
        mut StatsP,
        BinaryTableP,
        ClausesP,
        FreeVarsP,
        LedgerP,
        SearchP,
        SolverConfigP,
        SolverStateP,
        TrailP,
    ),
) -> Step {
    let lit = match choose_literal(ctx.borrow()) {
        Some(lit) => lit,
        None => {
            let committed = ctx.part(TrailP).committed_len();
            invariant_violation(
                ctx.borrow(),
                format_args!("no free variable with only {} fixed", committed),
            )
        }
    };

    let committed = ctx.part(TrailP).committed_len();
    let log_len = ctx.part(BinaryTableP).log_len();

    let decisions = ctx.part_mut(DecisionsP);
    let depth = decisions.depth();
    let decision = decisions.current_mut();
    decision.lit = lit;
    decision.branch = Some(Branch::First);
    decision.committed = committed;
    decision.log_len = log_len;

    let stats = ctx.part_mut(StatsP);
    stats.add_node(depth);
    let nodes = stats.nodes;

    let config = ctx.part(SolverConfigP);
    if config.progress && config.progress_interval > 0 && nodes % config.progress_interval == 0 {
        info!("{}", progress_line(ctx.borrow()));
    }

    Step::TryLiteral
}

fn try_literal(mut ctx: partial!(Context, mut SearchP, DecisionsP)) -> Step {
    let lit = ctx.part(DecisionsP).current().lit;
    let forced = &mut ctx.part_mut(SearchP).forced;
    forced.clear();
    forced.push(lit);
    Step::PropagateAndPromote
}

fn propagate_and_promote(
    mut ctx: partial!(
        Context,
        mut BinaryTableP,
        mut ClausesP,
        mut FreeVarsP,
        mut LedgerP,
        mut SearchP,
        mut TmpDataP,
        mut TrailP,
        DecisionsP,
        SolverConfigP,
        SolverStateP,
    ),
) -> Step {
    ctx.part_mut(TrailP).begin_round();
    ctx.part_mut(BinaryTableP).begin_round();

    let mut forced = take(&mut ctx.part_mut(SearchP).forced);

    let mut result = Ok(());
    for &lit in forced.iter() {
        result = propagate_binary(ctx.borrow(), lit, Degree::Near);
        if result.is_err() {
            break;
        }
    }

    forced.clear();
    ctx.part_mut(SearchP).forced = forced;

    if result.is_ok() {
        result = promote_near_truths(ctx.borrow());
    }

    match result {
        Ok(()) => Step::AcceptRealTruths,
        Err(_) => Step::UnfixNearTruths,
    }
}

fn accept_real_truths(
    mut ctx: partial!(
        Context,
        mut DecisionsP,
        mut TrailP,
        BinaryTableP,
        ClausesP,
        FreeVarsP,
        LedgerP,
        SearchP,
        SolverStateP,
    ),
) -> Step {
    ctx.part_mut(TrailP).commit();

    let decisions = ctx.part_mut(DecisionsP);
    if decisions.current().branch.is_some() {
        decisions.descend();
    } else if decisions.depth() > 0 {
        let depth = decisions.depth();
        invariant_violation(
            ctx.borrow(),
            format_args!("forced literals accepted at depth {} without decision", depth),
        );
    }

    Step::NewNode
}

fn unfix_near_truths(mut ctx: partial!(Context, mut LedgerP, mut TrailP)) -> Step {
    let (trail, mut ctx) = ctx.split_part_mut(TrailP);
    let ledger = ctx.part_mut(LedgerP);

    while let Some(lit) = trail.pop_near() {
        ledger.unassign(lit.var());
    }

    Step::UnfixRealTruths
}

fn unfix_real_truths(
    mut ctx: partial!(Context, mut ClausesP, mut FreeVarsP, mut LedgerP, mut TrailP),
) -> Step {
    let (trail, mut ctx) = ctx.split_part_mut(TrailP);
    let (clauses, mut ctx) = ctx.split_part_mut(ClausesP);
    let (free_vars, mut ctx) = ctx.split_part_mut(FreeVarsP);
    let ledger = ctx.part_mut(LedgerP);

    while let Some(lit) = trail.pop_real() {
        clauses.table_mut().demote(lit, ledger);
        free_vars.restore(lit.var());
        ledger.unassign(lit.var());
    }

    Step::DowndateBinaryTable
}

fn downdate_binary_table(mut ctx: partial!(Context, mut BinaryTableP, DecisionsP)) -> Step {
    let decision = *ctx.part(DecisionsP).current();
    if decision.branch.is_some() {
        ctx.part_mut(BinaryTableP).downdate(decision.log_len);
    }
    Step::TryOtherPolarity
}

fn try_other_polarity(mut ctx: partial!(Context, mut DecisionsP)) -> Step {
    let decision = ctx.part_mut(DecisionsP).current_mut();
    if decision.branch == Some(Branch::First) {
        decision.lit = !decision.lit;
        decision.branch = Some(Branch::Second);
        Step::TryLiteral
    } else {
        Step::Backtrack
    }
}

fn backtrack(mut ctx: partial!(Context, mut DecisionsP, mut TrailP)) -> Step {
    let decisions = ctx.part_mut(DecisionsP);
    if decisions.depth() == 0 {
        return Step::Unsat;
    }
    decisions.ascend();
    let committed = decisions.current().committed;
    ctx.part_mut(TrailP).set_committed(committed);
    Step::UnfixRealTruths
}

/// Panic with a state dump if the search state is inconsistent.
fn check_invariants(
    mut ctx: partial!(
        Context,
        BinaryTableP,
        ClausesP,
        DecisionsP,
        FreeVarsP,
        LedgerP,
        SearchP,
        SolverStateP,
        TrailP,
    ),
) {
    if let Some(message) = find_violation(ctx.borrow()) {
        invariant_violation(ctx.borrow(), format_args!("{}", message));
    }
}

fn find_violation(
    ctx: partial!(Context, FreeVarsP, LedgerP, SolverStateP, TrailP),
) -> Option<String> {
    let trail = ctx.part(TrailP);
    let ledger = ctx.part(LedgerP);
    let free_vars = ctx.part(FreeVarsP);

    let mut previous = Degree::Real;
    for (pos, &lit) in trail.lits().iter().enumerate() {
        let truth = match ledger.truth(lit.var()) {
            Some(truth) if truth.polarity() == lit.is_positive() => truth,
            _ => return Some(format!("trail literal {} is not fixed true", lit)),
        };
        if truth.degree() > previous {
            return Some(format!("degree increases at trail literal {}", lit));
        }
        previous = truth.degree();

        let expected = if pos < trail.real_len() {
            Degree::Real
        } else {
            Degree::Near
        };
        if truth.degree() != expected {
            return Some(format!("trail literal {} has degree {:?}", lit, truth.degree()));
        }
        if free_vars.is_free(lit.var()) == (expected == Degree::Real) {
            return Some(format!("free list disagrees with trail literal {}", lit));
        }
    }

    let var_count = ctx.part(SolverStateP).var_count;
    if free_vars.free_count() + trail.real_len() != var_count {
        return Some(format!(
            "{} free and {} real of {} variables",
            free_vars.free_count(),
            trail.real_len(),
            var_count
        ));
    }

    None
}
