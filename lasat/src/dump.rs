//! Human readable views of the search state.
use std::fmt::{self, Write};

use partial_ref::{partial, PartialRef};

use crate::context::{
    BinaryTableP, ClausesP, Context, DecisionsP, FreeVarsP, LedgerP, SearchP, SolverStateP,
    StatsP, TrailP,
};
use crate::decision::Branch;
use crate::lit::Lit;

/// Describe the current search path as one digit per fixed literal.
///
/// The digits are even for positive and odd for negative literals:
///
/// * `0`/`1`: first branch of a decision
/// * `2`/`3`: second branch of a decision, after the first one failed
/// * `4`/`5`: implied by the branch at the same depth
/// * `6`/`7`: fixed before the first decision, or forced at the start of a node
///
/// A `|` stands for a node that only propagated forced literals.
pub fn progress_line(ctx: partial!(Context, DecisionsP, SolverStateP, StatsP, TrailP)) -> String {
    let decisions = ctx.part(DecisionsP);
    let trail = ctx.part(TrailP);
    let lits = trail.lits();

    let mut line = format!(
        "nodes: {} depth: {} fixed: {}/{} path:",
        ctx.part(StatsP).nodes,
        decisions.depth(),
        trail.committed_len(),
        ctx.part(SolverStateP).var_count,
    );

    let code = |base: u8, lit: Lit| base + lit.is_negative() as u8;

    let path = decisions.path();
    let mut pos = 0;
    for (depth, decision) in path.iter().enumerate() {
        while pos < decision.committed.min(lits.len()) {
            write!(line, " {}", code(6, lits[pos])).unwrap();
            pos += 1;
        }
        match decision.branch {
            None => line.push_str(" |"),
            Some(branch) => {
                if let Some(&lit) = lits.get(pos) {
                    let base = if branch == Branch::First { 0 } else { 2 };
                    write!(line, " {}", code(base, lit)).unwrap();
                    pos += 1;
                }
            }
        }
        let node_end = match path.get(depth + 1) {
            Some(next) => next.node_start,
            None => decisions.current().node_start,
        };
        while pos < node_end.min(lits.len()) {
            write!(line, " {}", code(4, lits[pos])).unwrap();
            pos += 1;
        }
    }

    line
}

/// Write the complete search state.
pub fn write_state(
    target: &mut dyn fmt::Write,
    ctx: partial!(
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
) -> fmt::Result {
    let decisions = ctx.part(DecisionsP);
    let trail = ctx.part(TrailP);
    let ledger = ctx.part(LedgerP);
    let free_vars = ctx.part(FreeVarsP);
    let var_count = ctx.part(SolverStateP).var_count;

    writeln!(
        target,
        "step: {:?} depth: {} variables: {}",
        ctx.part(SearchP).step,
        decisions.depth(),
        var_count
    )?;

    write!(target, "forced:")?;
    for lit in ctx.part(SearchP).forced.iter() {
        write!(target, " {}", lit)?;
    }
    writeln!(target)?;

    write!(target, "decisions:")?;
    for decision in decisions.path().iter().chain(Some(decisions.current())) {
        match decision.branch {
            Some(branch) => write!(target, " {}({:?})", decision.lit, branch)?,
            None => write!(target, " -")?,
        }
    }
    writeln!(target)?;

    write!(
        target,
        "trail (committed {}, real {}):",
        trail.committed_len(),
        trail.real_len()
    )?;
    for &lit in trail.lits() {
        match ledger.truth(lit.var()) {
            Some(truth) => write!(target, " {}={}", lit, truth)?,
            None => write!(target, " {}=?", lit)?,
        }
    }
    writeln!(target)?;

    write!(target, "free ({}):", free_vars.free_count())?;
    for (pos, var) in free_vars.vars().iter().enumerate() {
        if pos == free_vars.free_count() {
            write!(target, " |")?;
        }
        write!(target, " {}", var)?;
    }
    writeln!(target)?;

    writeln!(target, "binary implications:")?;
    let binary_table = ctx.part(BinaryTableP);
    for code in 0..var_count * 2 {
        let lit = Lit::from_code(code);
        let implied = binary_table.implied(lit);
        if implied.is_empty() {
            continue;
        }
        write!(target, "  {}:", lit)?;
        for implied in implied.iter() {
            write!(target, " {}", implied)?;
        }
        writeln!(target)?;
    }

    let table = ctx.part(ClausesP).table();
    writeln!(target, "{} clauses:", table.name())?;
    table.dump(target, ledger)
}

/// The complete search state as a string.
pub fn state_dump(
    ctx: partial!(
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
) -> String {
    let mut dump = String::new();
    write_state(&mut dump, ctx).unwrap();
    dump
}

/// Abort after an internal invariant was found broken.
pub fn invariant_violation(
    ctx: partial!(
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
    message: fmt::Arguments,
) -> ! {
    panic!("internal invariant violated: {}\n{}", message, state_dump(ctx))
}

#[cfg(test)]
mod tests {
    use super::*;

    use partial_ref::IntoPartialRefMut;

    use lasat_formula::cnf_formula;

    use crate::cnf::CnfFormula;
    use crate::context::{SolverConfigP, TmpDataP};
    use crate::load::load_formula;
    use crate::search::{search_step, Step};

    fn step_to(
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
        step: Step,
        depth: usize,
    ) {
        while ctx.part(SearchP).step != step || ctx.part(DecisionsP).depth() != depth {
            assert!(ctx.part(SearchP).step != Step::Unsat);
            search_step(ctx.borrow());
        }
    }

    fn loaded(formula: &CnfFormula) -> Context {
        let mut ctx = Context::default();
        load_formula(
            ctx.into_partial_ref_mut().borrow(),
            formula,
            formula.var_count(),
        );
        ctx
    }

    #[test]
    fn forced_then_first_branches() {
        let mut ctx = loaded(&cnf_formula![
            1;
            2, 3;
            -2, 4;
        ]);
        let mut ctx = ctx.into_partial_ref_mut();

        step_to(ctx.borrow(), Step::ChooseLiteral, 1);
        assert_eq!(
            progress_line(ctx.borrow()),
            "nodes: 1 depth: 1 fixed: 2/4 path: 6 0"
        );

        step_to(ctx.borrow(), Step::Sat, 3);
        assert_eq!(
            progress_line(ctx.borrow()),
            "nodes: 3 depth: 3 fixed: 4/4 path: 6 0 0 0"
        );

        let dump = state_dump(ctx.borrow());
        assert!(dump.starts_with("step: Sat depth: 3 variables: 4\n"));
        assert!(dump.contains("decisions: 4(First) 3(First) 2(First) -\n"));
        assert!(dump.contains("trail (committed 4, real 4): 1=RT 4=RT 3=RT 2=RT\n"));
        assert!(dump.contains("free (0): | 2 3 4 1\n"));
        assert!(dump.contains("  -4: -2\n"));
        assert!(dump.contains("ternary clauses:"));
    }

    #[test]
    fn second_branch_and_implied() {
        let mut ctx = loaded(&cnf_formula![
            -1, 2;
            -1, -2;
            1, -3;
        ]);
        let mut ctx = ctx.into_partial_ref_mut();

        step_to(ctx.borrow(), Step::ChooseLiteral, 1);
        assert_eq!(
            progress_line(ctx.borrow()),
            "nodes: 1 depth: 1 fixed: 2/3 path: 3 5"
        );

        step_to(ctx.borrow(), Step::Sat, 2);
        assert_eq!(
            progress_line(ctx.borrow()),
            "nodes: 2 depth: 2 fixed: 3/3 path: 3 5 0"
        );
        assert!(state_dump(ctx.borrow()).contains("decisions: -1(Second) 2(First) -\n"));
    }

    #[test]
    #[should_panic(expected = "internal invariant violated: broken")]
    fn violation_includes_dump() {
        let mut ctx = loaded(&cnf_formula![
            1, 2;
        ]);
        let mut ctx = ctx.into_partial_ref_mut();
        invariant_violation(ctx.borrow(), format_args!("broken"));
    }
}
