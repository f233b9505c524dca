use crate::asp::AspVariant;
use crate::TrapSpaceError;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

impl FromStr for AspVariant {
    type Err = TrapSpaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "min" => Ok(AspVariant::Minimal),
            "max" => Ok(AspVariant::Maximal),
            "all" => Ok(AspVariant::All),
            "percolated" => Ok(AspVariant::Percolated),
            "circuits" => Ok(AspVariant::Circuits),
            _ => Err(TrapSpaceError::InvalidInput(format!(
                "Unknown trap space type `{}`.",
                s
            ))),
        }
    }
}

impl Display for AspVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AspVariant::Minimal => "min",
            AspVariant::Maximal => "max",
            AspVariant::All => "all",
            AspVariant::Percolated => "percolated",
            AspVariant::Circuits => "circuits",
        };
        write!(f, "{}", name)
    }
}

impl AspVariant {
    /// True if the encoding should close solutions under percolation (instead of only
    /// removing duplicate solutions of the same trap space).
    pub fn uses_percolation(&self) -> bool {
        matches!(self, AspVariant::Percolated | AspVariant::Circuits)
    }
}
