//! Branching decisions.
use partial_ref::{partial, PartialRef};

use crate::context::{Context, FreeVarsP};
use crate::lit::Lit;

/// Which value of a decision is being tried.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Branch {
    First,
    Second,
}

/// What is needed to revisit and undo one search node.
#[derive(Copy, Clone, Debug)]
pub struct Decision {
    /// Literal tried by the current branch.
    pub lit: Lit,
    /// `None` while the node only propagates forced literals.
    pub branch: Option<Branch>,
    /// Committed trail length before the decision.
    pub committed: usize,
    /// Binary table restore point before the decision.
    pub log_len: usize,
    /// Committed trail length when the node was entered.
    pub node_start: usize,
}

impl Default for Decision {
    fn default() -> Decision {
        Decision {
            lit: Lit::from_code(0),
            branch: None,
            committed: 0,
            log_len: 0,
            node_start: 0,
        }
    }
}

/// One record per depth of the search tree.
#[derive(Default)]
pub struct Decisions {
    depth: usize,
    records: Vec<Decision>,
}

impl Decisions {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.depth = 0;
        self.records.clear();
        self.records.resize(count + 1, Decision::default());
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Record of the node at the current depth.
    pub fn current(&self) -> &Decision {
        &self.records[self.depth]
    }

    pub fn current_mut(&mut self) -> &mut Decision {
        &mut self.records[self.depth]
    }

    /// Records of all nodes above the current one.
    pub fn path(&self) -> &[Decision] {
        &self.records[..self.depth]
    }

    pub fn descend(&mut self) {
        self.depth += 1;
    }

    pub fn ascend(&mut self) {
        self.depth -= 1;
    }
}

/// Select the literal to branch on.
///
/// This is the positive literal of the first variable in the free list. Returns `None` if all
/// variables are fixed.
pub fn choose_literal(ctx: partial!(Context, FreeVarsP)) -> Option<Lit> {
    ctx.part(FreeVarsP).first().map(|var| var.positive())
}
