//! Propagation of binary implications.
use partial_ref::{partial, PartialRef};

use crate::context::{BinaryTableP, Context, LedgerP, TrailP};
use crate::lit::Lit;

use super::{Conflict, Degree, Fix};

/// Fix a literal and everything it implies via the binary table.
///
/// All newly fixed literals get the degree `context` and are pushed to the trail. Literals
/// fixed with a lower degree count as unfixed. Returns a conflict as soon as an implied literal's
/// complement is fixed, the literals fixed up to that point stay on the trail.
pub fn propagate_binary(
    mut ctx: partial!(Context, mut LedgerP, mut TrailP, BinaryTableP),
    lit: Lit,
    context: Degree,
) -> Result<(), Conflict> {
    let (binary_table, mut ctx) = ctx.split_part(BinaryTableP);
    let (trail, mut ctx) = ctx.split_part_mut(TrailP);
    let ledger = ctx.part_mut(LedgerP);

    let mut head = trail.len();

    match ledger.fix(lit, context) {
        Fix::AlreadyTrue => return Ok(()),
        Fix::Conflict => return Err(Conflict),
        Fix::Recorded => trail.push(lit),
    }

    while let Some(&lit) = trail.lits().get(head) {
        head += 1;
        for &implied in binary_table.implied(lit) {
            match ledger.fix(implied, context) {
                Fix::AlreadyTrue => (),
                Fix::Conflict => return Err(Conflict),
                Fix::Recorded => trail.push(implied),
            }
        }
    }

    Ok(())
}
