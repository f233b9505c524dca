use crate::trap_spaces::CircuitDecomposition;
use crate::{PrimeImplicants, Representation, Subspace, TrapSpaceError};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

impl FromStr for Representation {
    type Err = TrapSpaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dict" => Ok(Representation::Dict),
            "str" => Ok(Representation::Str),
            _ => Err(TrapSpaceError::InvalidInput(format!(
                "Unknown trap space representation `{}`.",
                s
            ))),
        }
    }
}

impl Display for Representation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Representation::Dict => write!(f, "dict"),
            Representation::Str => write!(f, "str"),
        }
    }
}

impl Representation {
    /// Render `space` in this representation. The `primes` determine the variable order
    /// of the compact string form.
    pub fn render(&self, primes: &PrimeImplicants, space: &Subspace) -> String {
        match self {
            Representation::Dict => space.to_json(),
            Representation::Str => space.to_str(primes),
        }
    }

    /// Render one solution of the circuits query as the circuit part followed by the
    /// percolated part, separated by a space.
    pub fn render_circuit(&self, primes: &PrimeImplicants, circuit: &CircuitDecomposition) -> String {
        format!(
            "{} {}",
            self.render(primes, &circuit.circuit),
            self.render(primes, &circuit.percolated)
        )
    }
}
