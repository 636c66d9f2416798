//! Search statistics.
use std::fmt;

/// Counters collected during the search.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Stats {
    /// Number of branching nodes visited.
    pub nodes: u64,
    /// Number of branching nodes visited per depth.
    pub levels: Vec<u64>,
    /// Deepest depth at which a branching node was visited.
    pub max_depth: Option<usize>,
    /// Number of satisfying assignments found.
    pub solutions: u64,
}

impl Stats {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.levels.resize(count + 1, 0);
    }

    /// Count a branching node at the given depth.
    pub fn add_node(&mut self, depth: usize) {
        self.nodes += 1;
        if self.levels.len() <= depth {
            self.levels.resize(depth + 1, 0);
        }
        self.levels[depth] += 1;
        self.max_depth = Some(self.max_depth.map_or(depth, |max| max.max(depth)));
    }

    /// Clear all counters, keeping the table sizes.
    pub fn reset(&mut self) {
        self.nodes = 0;
        for count in self.levels.iter_mut() {
            *count = 0;
        }
        self.max_depth = None;
        self.solutions = 0;
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "nodes: {}", self.nodes)?;
        writeln!(f, "solutions: {}", self.solutions)?;
        match self.max_depth {
            Some(max_depth) => {
                writeln!(f, "max depth: {}", max_depth)?;
                write!(f, "nodes per depth:")?;
                for count in self.levels[..=max_depth].iter() {
                    write!(f, " {}", count)?;
                }
                writeln!(f)
            }
            None => writeln!(f, "max depth: -"),
        }
    }
}
