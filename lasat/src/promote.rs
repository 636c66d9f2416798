//! Turning near truths into real truths.
use std::mem::take;

use log::trace;
use partial_ref::{partial, PartialRef};

use crate::context::{
    BinaryTableP, ClausesP, Context, DecisionsP, FreeVarsP, LedgerP, SearchP, SolverConfigP,
    SolverStateP, TmpDataP, TrailP,
};
use crate::dump::invariant_violation;
use crate::lit::Lit;
use crate::prop::{propagate_binary, Conflict, Degree};

/// Promote all near truths of the current round, oldest first.
///
/// Promoting a literal detaches its variable from the clause table. Every clause that shrinks to
/// two unfixed literals is then handled by [`consider_pair`], which may fix further near truths.
/// Those are promoted by the same loop.
pub fn promote_near_truths(
    mut ctx: partial!(
        Context,
        mut BinaryTableP,
        mut ClausesP,
        mut FreeVarsP,
        mut LedgerP,
        mut TmpDataP,
        mut TrailP,
        DecisionsP,
        SearchP,
        SolverConfigP,
        SolverStateP,
    ),
) -> Result<(), Conflict> {
    while let Some(lit) = ctx.part_mut(TrailP).next_near() {
        ctx.part_mut(LedgerP).promote(lit);
        ctx.part_mut(FreeVarsP).remove(lit.var());

        let mut pairs = take(&mut ctx.part_mut(TmpDataP).pairs);
        {
            let (clauses, ctx) = ctx.split_part_mut(ClausesP);
            clauses
                .table_mut()
                .promote(lit, ctx.part(LedgerP), &mut pairs);
        }

        let mut result = Ok(());
        for &[u, v] in pairs.iter() {
            result = consider_pair(ctx.borrow(), u, v);
            if result.is_err() {
                break;
            }
        }

        pairs.clear();
        ctx.part_mut(TmpDataP).pairs = pairs;
        result?;
    }
    Ok(())
}

/// Handle a clause that shrank to the two literals `u` and `v`.
///
/// Does nothing if either literal is true. If one is false the other one is fixed and if both
/// are false this is a conflict. Otherwise the clause is added to the binary table.
pub fn consider_pair(
    mut ctx: partial!(
        Context,
        mut BinaryTableP,
        mut LedgerP,
        mut TmpDataP,
        mut TrailP,
        ClausesP,
        DecisionsP,
        FreeVarsP,
        SearchP,
        SolverConfigP,
        SolverStateP,
    ),
    u: Lit,
    v: Lit,
) -> Result<(), Conflict> {
    let ledger = ctx.part(LedgerP);
    if ledger.lit_is_true(u, Degree::Near) || ledger.lit_is_true(v, Degree::Near) {
        return Ok(());
    }

    let u_false = ledger.lit_is_false(u, Degree::Near);
    let v_false = ledger.lit_is_false(v, Degree::Near);

    if ctx.part(SolverConfigP).verbosity >= 2 {
        trace!("pair {} {}", u, v);
    }

    match (u_false, v_false) {
        (true, true) => Err(Conflict),
        (true, false) => propagate_binary(ctx.borrow(), v, Degree::Near),
        (false, true) => propagate_binary(ctx.borrow(), u, Degree::Near),
        (false, false) => exploit_pair(ctx.borrow(), u, v),
    }
}

/// Add the unfixed pair `u ∨ v` to the binary table unless existing implications already decide
/// it.
fn exploit_pair(
    mut ctx: partial!(
        Context,
        mut BinaryTableP,
        mut LedgerP,
        mut TmpDataP,
        mut TrailP,
        ClausesP,
        DecisionsP,
        FreeVarsP,
        SearchP,
        SolverConfigP,
        SolverStateP,
    ),
    u: Lit,
    v: Lit,
) -> Result<(), Conflict> {
    if ctx.part(SolverConfigP).compensation_resolvents {
        for &(a, b) in [(u, v), (v, u)].iter() {
            if add_compensation_resolvents(ctx.borrow(), a, b)? {
                return Ok(());
            }
        }
    }

    let known = ctx
        .part(BinaryTableP)
        .implied(!u)
        .iter()
        .cloned()
        .find(|implied| implied.var() == v.var());

    if known == Some(!v) {
        // !u implies both v and !v
        propagate_binary(ctx.borrow(), u, Degree::Near)
    } else if known == Some(v) {
        Ok(())
    } else if ctx.part(BinaryTableP).implied(!v).contains(&!u) {
        // !v implies both u and !u
        propagate_binary(ctx.borrow(), v, Degree::Near)
    } else {
        ctx.part_mut(BinaryTableP).append_clause(u, v);
        Ok(())
    }
}

/// Add the resolvents of the new clause `a ∨ b` with the implications of `b`.
///
/// For each `w` implied by `b` the clause `a ∨ w` follows. Resolvents already implied by `!a`
/// are skipped. If `!a` implies `!w` for such a `w`, `a` itself follows and is fixed, in which
/// case this returns `true`.
fn add_compensation_resolvents(
    mut ctx: partial!(
        Context,
        mut BinaryTableP,
        mut LedgerP,
        mut TmpDataP,
        mut TrailP,
        ClausesP,
        DecisionsP,
        FreeVarsP,
        SearchP,
        SolverStateP,
    ),
    a: Lit,
    b: Lit,
) -> Result<bool, Conflict> {
    let (tmp_data, mut ctx) = ctx.split_part_mut(TmpDataP);
    let marks = &mut tmp_data.lit_marks;

    marks.advance();
    marks.mark((!a).code());
    for &implied in ctx.part(BinaryTableP).implied(!a) {
        marks.mark(implied.code());
    }

    if marks.is_marked(b.code()) || marks.is_marked((!b).code()) {
        return Ok(false);
    }

    let implied_count = ctx.part(BinaryTableP).implied(b).len();
    for i in 0..implied_count {
        let w = ctx.part(BinaryTableP).implied(b)[i];
        let ledger = ctx.part(LedgerP);

        if ledger.is_fixed(w.var(), Degree::Near) {
            if ledger.lit_is_false(w, Degree::Near) {
                invariant_violation(
                    ctx.borrow(),
                    format_args!("unfixed {} implies {} which is fixed false", b, w),
                );
            }
        } else if marks.is_marked((!w).code()) {
            propagate_binary(ctx.borrow(), a, Degree::Near)?;
            return Ok(true);
        } else if !marks.is_marked(w.code()) {
            ctx.part_mut(BinaryTableP).append_clause(a, w);
        }
    }

    Ok(false)
}
