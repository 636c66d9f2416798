//! Graded truth values of all variables.
use std::fmt;

use crate::lit::{Lit, Var};

/// How firmly a value is fixed.
///
/// Within a propagation round, near truths are tentative consequences of the literals forced in
/// that round. Promoted near truths become real truths, which stay until the search backtracks
/// over them. Proto truths are reserved for lookahead and are never set by the search.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum Degree {
    Proto,
    Near,
    Real,
}

/// A fixed value of a variable.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct Truth {
    degree: Degree,
    negative: bool,
}

impl Truth {
    /// Fix a variable to `polarity` with the given degree.
    pub fn new(degree: Degree, polarity: bool) -> Truth {
        Truth {
            degree,
            negative: !polarity,
        }
    }

    pub fn degree(self) -> Degree {
        self.degree
    }

    /// Value of the variable.
    pub fn polarity(self) -> bool {
        !self.negative
    }
}

impl fmt::Display for Truth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let degree = match self.degree {
            Degree::Proto => "P",
            Degree::Near => "N",
            Degree::Real => "R",
        };
        write!(f, "{}{}", degree, if self.negative { "F" } else { "T" })
    }
}

/// Outcome of fixing a literal.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Fix {
    /// The literal was fixed true already.
    AlreadyTrue,
    /// The literal's complement is fixed.
    Conflict,
    /// The literal is now fixed true.
    Recorded,
}

/// Truth value and degree of each variable.
#[derive(Default)]
pub struct Ledger {
    values: Vec<Option<Truth>>,
}

impl Ledger {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.values.clear();
        self.values.resize(count, None);
    }

    pub fn truth(&self, var: Var) -> Option<Truth> {
        self.values[var.index()]
    }

    /// Whether the variable is fixed with at least the given degree.
    pub fn is_fixed(&self, var: Var, context: Degree) -> bool {
        match self.values[var.index()] {
            Some(truth) => truth.degree >= context,
            None => false,
        }
    }

    /// Whether the variable is fixed as a real truth.
    pub fn is_real(&self, var: Var) -> bool {
        self.is_fixed(var, Degree::Real)
    }

    pub fn lit_is_true(&self, lit: Lit, context: Degree) -> bool {
        match self.values[lit.index()] {
            Some(truth) => truth.degree >= context && truth.negative == lit.is_negative(),
            None => false,
        }
    }

    pub fn lit_is_false(&self, lit: Lit, context: Degree) -> bool {
        self.lit_is_true(!lit, context)
    }

    /// Fix a literal to true in the given context.
    ///
    /// Values of a lower degree than `context` count as unfixed and are overwritten.
    pub fn fix(&mut self, lit: Lit, context: Degree) -> Fix {
        let value = &mut self.values[lit.index()];
        match *value {
            Some(truth) if truth.degree >= context => {
                if truth.negative == lit.is_negative() {
                    Fix::AlreadyTrue
                } else {
                    Fix::Conflict
                }
            }
            _ => {
                *value = Some(Truth::new(context, lit.is_positive()));
                Fix::Recorded
            }
        }
    }

    /// Turn the near truth of `lit` into a real truth.
    pub fn promote(&mut self, lit: Lit) {
        debug_assert!(self.lit_is_true(lit, Degree::Near));
        self.values[lit.index()] = Some(Truth::new(Degree::Real, lit.is_positive()));
    }

    pub fn unassign(&mut self, var: Var) {
        self.values[var.index()] = None;
    }
}
