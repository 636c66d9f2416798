//! Variables and literals.
use std::{fmt, ops};

/// The integer type backing variables and literal codes.
pub type LitIdx = u32;

/// A boolean variable.
///
/// Stored as a 0-based index. The DIMACS conversions shift this by one, so the variable with index
/// 0 is written as `1`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Var {
    index: LitIdx,
}

impl Var {
    /// The variable written as `number` in DIMACS CNF, `number` must be positive.
    #[inline]
    pub fn from_dimacs(number: isize) -> Var {
        debug_assert!(number > 0);
        Var::from_index((number - 1) as usize)
    }

    /// The variable with the given 0-based index.
    #[inline]
    pub fn from_index(index: usize) -> Var {
        debug_assert!(index < Var::max_count());
        Var {
            index: index as LitIdx,
        }
    }

    /// The positive number used for this variable in DIMACS CNF.
    #[inline]
    pub fn to_dimacs(self) -> isize {
        self.index as isize + 1
    }

    /// The 0-based index of this variable.
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Largest number of variables a formula may use.
    ///
    /// Leaves a few bits of the backing type unused so that literal codes and sentinel values fit.
    pub const fn max_count() -> usize {
        (LitIdx::max_value() >> 4) as usize + 1
    }

    /// The literal of this variable with the given polarity.
    #[inline]
    pub fn lit(self, polarity: bool) -> Lit {
        Lit::from_var(self, polarity)
    }

    /// The literal asserting this variable.
    #[inline]
    pub fn positive(self) -> Lit {
        self.lit(true)
    }

    /// The literal negating this variable.
    #[inline]
    pub fn negative(self) -> Lit {
        self.lit(false)
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A variable together with a polarity.
///
/// The literal code is `2 * index` for a positive and `2 * index + 1` for a negative literal. This
/// makes negation a single xor and lets tables indexed by literal use `2 * var_count` entries,
/// with both literals of a variable next to each other.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Lit {
    code: LitIdx,
}

impl Lit {
    /// The literal of `var` with the given polarity (`true` for positive).
    #[inline]
    pub fn from_var(var: Var, polarity: bool) -> Lit {
        Lit {
            code: (var.index << 1) | (!polarity as LitIdx),
        }
    }

    /// The literal of the variable with the given 0-based index.
    #[inline]
    pub fn from_index(index: usize, polarity: bool) -> Lit {
        Lit::from_var(Var::from_index(index), polarity)
    }

    /// The literal with the given code.
    #[inline]
    pub fn from_code(code: usize) -> Lit {
        debug_assert!(code < Var::max_count() * 2);
        Lit {
            code: code as LitIdx,
        }
    }

    /// The literal written as `number` in DIMACS CNF.
    ///
    /// `number` must be nonzero, see [`try_from_dimacs`](Lit::try_from_dimacs) for a checked
    /// version.
    #[inline]
    pub fn from_dimacs(number: isize) -> Lit {
        Lit::from_var(Var::from_dimacs(number.abs()), number > 0)
    }

    /// The literal written as `number` in DIMACS CNF, if `number` denotes one.
    pub fn try_from_dimacs(number: isize) -> Option<Lit> {
        let magnitude = number.checked_abs()? as usize;
        if magnitude == 0 || magnitude > Var::max_count() {
            None
        } else {
            Some(Lit::from_index(magnitude - 1, number > 0))
        }
    }

    /// The signed number used for this literal in DIMACS CNF.
    #[inline]
    pub fn to_dimacs(self) -> isize {
        let number = self.var().to_dimacs();
        if self.is_negative() {
            -number
        } else {
            number
        }
    }

    /// The literal's variable.
    #[inline]
    pub fn var(self) -> Var {
        Var {
            index: self.code >> 1,
        }
    }

    /// 0-based index of the literal's variable.
    #[inline]
    pub fn index(self) -> usize {
        self.var().index()
    }

    /// Whether this literal negates its variable.
    #[inline]
    pub fn is_negative(self) -> bool {
        self.code & 1 == 1
    }

    /// Whether this literal asserts its variable.
    #[inline]
    pub fn is_positive(self) -> bool {
        !self.is_negative()
    }

    /// The literal code, usable as an index into literal tables.
    #[inline]
    pub fn code(self) -> usize {
        self.code as usize
    }
}

impl ops::Not for Lit {
    type Output = Lit;

    #[inline]
    fn not(self) -> Lit {
        Lit {
            code: self.code ^ 1,
        }
    }
}

/// Negates the literal when the right hand side is `true`.
impl ops::BitXor<bool> for Lit {
    type Output = Lit;

    #[inline]
    fn bitxor(self, rhs: bool) -> Lit {
        Lit {
            code: self.code ^ rhs as LitIdx,
        }
    }
}

impl From<Var> for Lit {
    #[inline]
    fn from(var: Var) -> Lit {
        var.positive()
    }
}

impl fmt::Debug for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;
    use proptest::{prelude::*, *};

    pub fn var(index: impl Strategy<Value = usize>) -> impl Strategy<Value = Var> {
        index.prop_map(Var::from_index)
    }

    pub fn lit(index: impl Strategy<Value = usize>) -> impl Strategy<Value = Lit> {
        (var(index), bool::ANY).prop_map(|(var, polarity)| var.lit(polarity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_pair_up_per_variable() {
        let var = Var::from_dimacs(3);
        assert_eq!(var.positive().code(), 4);
        assert_eq!(var.negative().code(), 5);
        assert_eq!(!var.positive(), var.negative());
        assert_eq!(var.negative().var(), var);
        assert_eq!(var.positive() ^ true, var.negative());
        assert_eq!(var.positive() ^ false, var.positive());
    }

    #[test]
    fn dimacs_conversion() {
        assert_eq!(Lit::from_dimacs(-7).to_dimacs(), -7);
        assert_eq!(Lit::from_dimacs(7).to_dimacs(), 7);
        assert!(Lit::from_dimacs(-7).is_negative());
        assert_eq!(Lit::from_dimacs(1).code(), 0);

        assert_eq!(Lit::try_from_dimacs(0), None);
        assert_eq!(Lit::try_from_dimacs(-2), Some(Lit::from_dimacs(-2)));
        assert_eq!(Lit::try_from_dimacs(Var::max_count() as isize + 1), None);
        assert_eq!(Lit::try_from_dimacs(isize::min_value()), None);
    }
}
