//! Boolean satisfiability solver.
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use partial_ref::{IntoPartialRef, IntoPartialRefMut, PartialRef};

use anyhow::Error;
use log::info;
use thiserror::Error;

use crate::cnf::CnfFormula;
use crate::config::SolverConfig;
use crate::context::{Context, SolverConfigP, SolverStateP, StatsP, TrailP};
use crate::dimacs::DimacsParser;
use crate::lit::{Lit, Var};
use crate::load::load_formula;
use crate::search::search;
use crate::state::SatState;
use crate::stats::Stats;

/// Possible errors while solving a formula.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("The formula has no variables")]
    NoVariables,
    #[error("Variable {var} is out of range, only {var_count} variables were declared")]
    VarOutOfRange { var: Var, var_count: usize },
    #[error("The formula was already loaded, the solver cannot be modified anymore")]
    AlreadyStarted,
    #[error("The search was interrupted")]
    Interrupted,
}

/// A boolean satisfiability solver.
///
/// The formula is collected by [`add_formula`](Solver::add_formula) and friends and loaded into
/// the search structures on the first call to [`solve`](Solver::solve). After that, clauses and
/// configuration are fixed.
#[derive(Default)]
pub struct Solver {
    ctx: Box<Context>,
    formula: CnfFormula,
    declared_var_count: Option<usize>,
    interrupt: Option<Arc<AtomicBool>>,
}

impl Solver {
    /// Create a new solver.
    pub fn new() -> Solver {
        Solver::default()
    }

    /// Change the solver configuration.
    pub fn config(&mut self, config: &SolverConfig) -> Result<(), SolverError> {
        let mut ctx = self.ctx.into_partial_ref_mut();
        if ctx.part(SolverStateP).loaded {
            return Err(SolverError::AlreadyStarted);
        }
        *ctx.part_mut(SolverConfigP) = config.clone();
        Ok(())
    }

    /// Declare the number of variables of the formula.
    ///
    /// Variables that do not occur in any clause still count. Without a declaration the count is
    /// one more than the highest variable index used.
    pub fn declare_var_count(&mut self, count: usize) -> Result<(), SolverError> {
        self.check_not_loaded()?;
        self.declared_var_count = Some(count);
        Ok(())
    }

    /// Add a formula to the solver.
    pub fn add_formula(&mut self, formula: &CnfFormula) -> Result<(), SolverError> {
        self.check_not_loaded()?;
        for clause in formula.iter() {
            self.formula.add_clause(clause);
        }
        self.formula.set_var_count(formula.var_count());
        Ok(())
    }

    /// Add a single clause to the solver.
    pub fn add_clause(&mut self, clause: &[Lit]) -> Result<(), SolverError> {
        self.check_not_loaded()?;
        self.formula.add_clause(clause);
        Ok(())
    }

    /// Reads and adds a formula in DIMACS CNF format.
    ///
    /// The variable count of the header, if present, is used as declared variable count.
    pub fn add_dimacs_cnf(&mut self, input: impl io::Read) -> Result<(), Error> {
        self.check_not_loaded()?;

        let mut parser = DimacsParser::parse_lines(input)?;

        if let Some(header) = parser.header() {
            self.declared_var_count = Some(header.var_count);
        }

        info!(
            "Parsed formula with {} variables and {} clauses",
            parser.var_count(),
            parser.clause_count()
        );

        self.add_formula(&parser.take_formula())?;

        Ok(())
    }

    /// Stop the search when the given flag is set.
    ///
    /// The flag is checked each time a search node is entered. An interrupted search can be
    /// resumed by calling [`solve`](Solver::solve) again after clearing the flag.
    pub fn set_interrupt(&mut self, flag: Arc<AtomicBool>) {
        self.interrupt = Some(flag);
    }

    /// Check the satisfiability of the formula.
    pub fn solve(&mut self) -> Result<bool, SolverError> {
        if !self.is_loaded() {
            let var_count = self.checked_var_count()?;
            let mut ctx = self.ctx.into_partial_ref_mut();
            load_formula(ctx.borrow(), &self.formula, var_count);
            self.formula = CnfFormula::new();
        }

        let mut ctx = self.ctx.into_partial_ref_mut();

        match ctx.part(SolverStateP).sat_state {
            SatState::Sat => return Ok(true),
            SatState::Unsat => return Ok(false),
            SatState::Unknown => (),
        }

        let interrupt = self.interrupt.clone();
        let interrupted = || match &interrupt {
            Some(flag) => flag.load(Ordering::Relaxed),
            None => false,
        };

        let result = search(ctx.borrow(), interrupted);

        let state = ctx.part_mut(SolverStateP);
        match result {
            Some(true) => state.sat_state = SatState::Sat,
            Some(false) => state.sat_state = SatState::Unsat,
            None => {
                info!("Search interrupted");
                return Err(SolverError::Interrupted);
            }
        }

        info!(
            "Search finished after {} nodes: {}",
            ctx.part(StatsP).nodes,
            if result == Some(true) { "sat" } else { "unsat" }
        );

        Ok(result == Some(true))
    }

    /// Set of literals that satisfy the formula.
    ///
    /// Only contains literals of input variables, not those added by width reduction.
    pub fn model(&self) -> Option<Vec<Lit>> {
        let ctx = self.ctx.into_partial_ref();
        let state = ctx.part(SolverStateP);
        if state.sat_state != SatState::Sat {
            return None;
        }

        let mut model: Vec<Lit> = ctx
            .part(TrailP)
            .lits()
            .iter()
            .cloned()
            .filter(|lit| lit.index() < state.input_var_count)
            .collect();
        model.sort_by_key(|lit| lit.index());
        Some(model)
    }

    /// Statistics of all searches so far.
    pub fn stats(&self) -> Stats {
        self.ctx.into_partial_ref().part(StatsP).clone()
    }

    /// Reset the statistics.
    pub fn reset_stats(&mut self) {
        self.ctx.into_partial_ref_mut().part_mut(StatsP).reset();
    }

    fn is_loaded(&self) -> bool {
        self.ctx.into_partial_ref().part(SolverStateP).loaded
    }

    fn check_not_loaded(&self) -> Result<(), SolverError> {
        if self.is_loaded() {
            Err(SolverError::AlreadyStarted)
        } else {
            Ok(())
        }
    }

    /// Number of variables to solve for, validating all literals against it.
    fn checked_var_count(&self) -> Result<usize, SolverError> {
        let var_count = match self.declared_var_count {
            Some(declared) => {
                if self.formula.var_count() > declared {
                    let var = self
                        .formula
                        .iter()
                        .flat_map(|clause| clause.iter())
                        .map(|lit| lit.var())
                        .find(|var| var.index() >= declared)
                        .unwrap_or_else(|| Var::from_index(declared));
                    return Err(SolverError::VarOutOfRange {
                        var,
                        var_count: declared,
                    });
                }
                declared
            }
            None => self.formula.var_count(),
        };

        if var_count == 0 {
            return Err(SolverError::NoVariables);
        }

        Ok(var_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    use lasat_formula::{cnf_formula, lits};

    use crate::dimacs::write_dimacs;
    use crate::test::{all_configs, check_model, sat_formula, sgen_unsat_formula};

    #[test]
    fn no_variables() {
        let mut solver = Solver::new();
        assert!(matches!(solver.solve(), Err(SolverError::NoVariables)));
    }

    #[test]
    fn undeclared_variable() {
        let mut solver = Solver::new();
        solver.declare_var_count(2).unwrap();
        solver.add_clause(&lits![1, -3]).unwrap();
        match solver.solve() {
            Err(SolverError::VarOutOfRange { var, var_count }) => {
                assert_eq!(var.to_dimacs(), 3);
                assert_eq!(var_count, 2);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn frozen_after_solve() {
        let mut solver = Solver::new();
        solver.add_clause(&lits![1, 2]).unwrap();
        assert_eq!(solver.solve().unwrap(), true);
        assert!(matches!(
            solver.add_clause(&lits![-1]),
            Err(SolverError::AlreadyStarted)
        ));
        assert!(matches!(
            solver.config(&SolverConfig::default()),
            Err(SolverError::AlreadyStarted)
        ));
        assert_eq!(solver.solve().unwrap(), true);
    }

    #[test]
    fn unused_declared_variables_are_fixed() {
        let mut solver = Solver::new();
        solver.declare_var_count(4).unwrap();
        solver.add_clause(&lits![-2]).unwrap();
        assert_eq!(solver.solve().unwrap(), true);
        let model = solver.model().unwrap();
        assert_eq!(model.len(), 4);
        assert!(model.contains(&Lit::from_dimacs(-2)));
    }

    #[test]
    fn interrupt_and_resume() {
        let formula = crate::test::pigeon_hole_formula(5, 4);

        let mut solver = Solver::new();
        solver.add_formula(&formula).unwrap();

        let flag = Arc::new(AtomicBool::new(true));
        solver.set_interrupt(flag.clone());

        assert!(matches!(solver.solve(), Err(SolverError::Interrupted)));
        assert_eq!(solver.model(), None);

        flag.store(false, Ordering::Relaxed);
        assert_eq!(solver.solve().unwrap(), false);
        assert!(solver.stats().nodes > 0);

        solver.reset_stats();
        assert_eq!(solver.stats().nodes, 0);
    }

    #[test]
    fn pure_binary_instance() {
        for config in all_configs() {
            let mut solver = Solver::new();
            solver.config(&config).unwrap();
            solver
                .add_formula(&cnf_formula![
                    1, 2;
                    -1, 2;
                    1, -2;
                ])
                .unwrap();

            assert_eq!(solver.solve().unwrap(), true);
            assert_eq!(solver.model().unwrap(), lits![1, 2].to_vec());
        }
    }

    #[test]
    fn complementary_units_need_no_search() {
        let mut solver = Solver::new();
        solver.add_clause(&lits![1]).unwrap();
        solver.add_clause(&lits![-1]).unwrap();

        assert_eq!(solver.solve().unwrap(), false);
        assert_eq!(solver.model(), None);
        assert_eq!(solver.stats().nodes, 0);
    }

    #[test]
    fn only_input_variables_in_model() {
        let formula = cnf_formula![
            1, 2, 3, 4, 5, 6;
            -1;
            -2;
            -3;
            -4;
            -5;
        ];
        let mut solver = Solver::new();
        solver.add_formula(&formula).unwrap();
        assert_eq!(solver.solve().unwrap(), true);
        let model = solver.model().unwrap();
        assert_eq!(model, lits![-1, -2, -3, -4, -5, 6].to_vec());
    }

    proptest! {
        #[test]
        fn sgen_unsat(formula in sgen_unsat_formula(1..5usize)) {
            for config in all_configs() {
                let mut solver = Solver::new();
                solver.config(&config).unwrap();
                solver.add_formula(&formula).unwrap();

                prop_assert_eq!(solver.solve().unwrap(), false);
                prop_assert_eq!(solver.model(), None);
            }
        }

        #[test]
        fn sat(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            for config in all_configs() {
                let mut solver = Solver::new();
                solver.config(&config).unwrap();
                solver.add_formula(&formula).unwrap();

                prop_assert_eq!(solver.solve().unwrap(), true);

                let model = solver.model().unwrap();
                prop_assert!(check_model(&formula, &model));
            }
        }

        #[test]
        fn sat_via_dimacs(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            let mut solver = Solver::new();

            let mut dimacs = vec![];

            write_dimacs(&mut dimacs, &formula).unwrap();

            solver.add_dimacs_cnf(&mut &dimacs[..]).unwrap();

            prop_assert_eq!(solver.solve().unwrap(), true);

            let model = solver.model().unwrap();
            prop_assert_eq!(model.len(), formula.var_count());
            prop_assert!(check_model(&formula, &model));
        }
    }
}
