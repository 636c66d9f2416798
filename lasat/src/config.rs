//! Solver configuration.
use serde::Deserialize;

use lasat_macros::{DocDefault, DocHelp};

/// How clauses with more than three literals are handled.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WideClauseStrategy {
    /// Split wide clauses into ternary clauses using fresh variables.
    ReduceToBoundedWidth,
    /// Keep wide clauses and track them with occurrence lists.
    OccurrenceTables,
}

/// Configurable parameters used during solving.
#[derive(DocDefault, DocHelp, Clone, PartialEq, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Add the resolvents that make up for a clause shrinking to a binary clause. (Default: false)
    pub compensation_resolvents: bool,

    /// Handling of clauses with more than three literals, either "reduce-to-bounded-width" or
    /// "occurrence-tables". (Default: WideClauseStrategy::ReduceToBoundedWidth)
    pub wide_clauses: WideClauseStrategy,

    /// Wide clauses with at least this many literals keep their free literals in front.
    /// (Default: 33)
    pub sort_min_width: usize,

    /// Fraction of a wide clause's width below which its free literals are kept in front.
    /// (Default: 0.390625)
    pub sort_ratio: f64,

    /// Log a line describing the search path periodically. (Default: false)
    pub progress: bool,

    /// Number of search nodes between progress lines. (Default: 10000)
    pub progress_interval: u64,

    /// 0 for quiet, 1 to log every search step, 2 to also log the full state at each node.
    /// (Default: 0)
    pub verbosity: u8,

    /// Verify internal invariants after every search step. (Default: false)
    pub self_check: bool,
}

impl SolverConfig {
    /// Number of leading literals a wide clause keeps sorted by freedom.
    pub fn sort_limit(&self, width: usize) -> usize {
        if width >= self.sort_min_width {
            (width as f64 * self.sort_ratio).round() as usize
        } else {
            0
        }
    }
}
