use crate::ExtendedBoolean;
use crate::TrapSpaceError;
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use ExtendedBoolean::{Any, One, Zero};

impl Debug for ExtendedBoolean {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Zero => write!(f, "0"),
            One => write!(f, "1"),
            Any => write!(f, "-"),
        }
    }
}

impl Display for ExtendedBoolean {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl From<bool> for ExtendedBoolean {
    fn from(value: bool) -> Self {
        if value {
            One
        } else {
            Zero
        }
    }
}

impl From<Option<bool>> for ExtendedBoolean {
    fn from(value: Option<bool>) -> Self {
        value.map(ExtendedBoolean::from).unwrap_or(Any)
    }
}

impl TryFrom<char> for ExtendedBoolean {
    type Error = TrapSpaceError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '0' => Ok(Zero),
            '1' => Ok(One),
            '-' => Ok(Any),
            _ => Err(TrapSpaceError::InvalidInput(format!(
                "Unexpected subspace character `{}`.",
                value
            ))),
        }
    }
}

/// Implements a "set-like" ordering for extended Booleans. "Any" is greater than constant values
/// (since it covers both values), while constant values are incomparable between each other.
impl PartialOrd for ExtendedBoolean {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Zero, Zero) | (One, One) | (Any, Any) => Some(Ordering::Equal),
            (Zero, Any) | (One, Any) => Some(Ordering::Less),
            (Any, One) | (Any, Zero) => Some(Ordering::Greater),
            (One, Zero) | (Zero, One) => None,
        }
    }
}

impl ExtendedBoolean {
    pub fn try_as_bool(&self) -> Option<bool> {
        match self {
            Zero => Some(false),
            One => Some(true),
            Any => None,
        }
    }
}
