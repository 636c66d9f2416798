//! Miscellaneous solver state.

/// Satisfiability state.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SatState {
    Unknown,
    Sat,
    Unsat,
}

impl Default for SatState {
    fn default() -> SatState {
        SatState::Unknown
    }
}

/// Miscellaneous solver state.
///
/// Anything larger or any larger group of related state variables should be moved into a separate
/// part of [`Context`](crate::context::Context).
#[derive(Default)]
pub struct SolverState {
    pub sat_state: SatState,
    /// Whether a formula was loaded, after which the configuration is frozen.
    pub loaded: bool,
    /// Number of variables the search works on, including variables added by width reduction.
    pub var_count: usize,
    /// Number of variables of the input formula.
    pub input_var_count: usize,
}
