//! Lasat is a DPLL based SAT solver. Given a boolean formula in [conjunctive normal form][cnf],
//! it either finds a variable assignment that makes the formula true or determines that none
//! exists.
//!
//! The search follows Knuth's Algorithm L without its lookahead heuristics: literals implied by a
//! decision are first fixed as near truths via binary implications and then promoted to real
//! truths, which shrinks the remaining ternary or wide clauses. Clauses that shrink to two
//! literals become new binary implications, which are undone again on backtracking.
//!
//! [cnf]: https://en.wikipedia.org/wiki/Conjunctive_normal_form

pub mod config;
pub mod reduce;
pub mod solver;
pub mod stats;

mod binary;
mod clauses;
mod context;
mod decision;
mod dump;
mod free_vars;
mod load;
mod promote;
mod prop;
mod search;
mod stamps;
mod state;
mod tmp;


pub use lasat_formula::{cnf, lit, CnfFormula, Lit, Var};

pub use config::{SolverConfig, WideClauseStrategy};
pub use solver::{Solver, SolverError};
pub use stats::Stats;

pub mod dimacs {
    //! DIMACS CNF parser and writer.
    pub use lasat_dimacs::*;
}
