use crate::asp::{BoundValue, Bounds};
use crate::TrapSpaceError;
use std::fmt::{Display, Formatter};

impl Display for BoundValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundValue::Count(x) => write!(f, "{}", x),
            BoundValue::All => write!(f, "n"),
        }
    }
}

impl From<usize> for BoundValue {
    fn from(value: usize) -> Self {
        BoundValue::Count(value)
    }
}

impl BoundValue {
    pub fn resolve(&self, num_vars: usize) -> usize {
        match self {
            BoundValue::Count(x) => *x,
            BoundValue::All => num_vars,
        }
    }
}

impl Bounds {
    pub fn new(lower: impl Into<BoundValue>, upper: impl Into<BoundValue>) -> Bounds {
        Bounds {
            lower: lower.into(),
            upper: upper.into(),
        }
    }

    /// Bounds `(n, n)`, i.e. only states.
    pub fn states() -> Bounds {
        Bounds::new(BoundValue::All, BoundValue::All)
    }

    /// Bounds `(1, n)`, i.e. everything except the trivial (all-free) space.
    pub fn non_trivial() -> Bounds {
        Bounds::new(1, BoundValue::All)
    }

    /// Replace symbolic endpoints with `num_vars` and check that the range is not empty.
    ///
    /// A solution never fixes more than `num_vars` variables, so a larger upper bound is
    /// reduced to `num_vars`.
    pub fn resolve(&self, num_vars: usize) -> Result<(usize, usize), TrapSpaceError> {
        let lower = self.lower.resolve(num_vars);
        let upper = self.upper.resolve(num_vars).min(num_vars);
        if lower > upper {
            return Err(TrapSpaceError::InvalidInput(format!(
                "Malformed bounds ({}, {}) resolved to ({}, {}).",
                self.lower, self.upper, lower, upper
            )));
        }
        Ok((lower, upper))
    }
}
