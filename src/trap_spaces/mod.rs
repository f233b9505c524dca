//! High-level trap space queries.
//!
//! Every query selects the right encoding parameters (variant, bounds, projection, extra
//! constraints), runs the resulting program through an [`AspSolver`] and decodes the answer
//! sets. Apart from [`percolate_trap_space`], which works directly on the prime implicants,
//! all queries go through the solver.
//!
//! ```no_run
//! use biodivine_asp_trap_spaces::trap_spaces::{QueryOptions, TrapSpaceKind, TrapSpaces};
//! use biodivine_asp_trap_spaces::{PrimeImplicants, Representation};
//!
//! let primes = PrimeImplicants::try_from_json(r#"{"x": [[{"x": 1}], [{"x": 0}]]}"#).unwrap();
//! let queries = TrapSpaces::from_path().unwrap();
//! let minimal = queries
//!     .trap_spaces(&primes, TrapSpaceKind::Minimal, &QueryOptions::default())
//!     .unwrap();
//! for space in &minimal {
//!     println!("{}", Representation::Str.render(&primes, space));
//! }
//! ```

use crate::asp::potassco::{AspSolver, Potassco};
use crate::asp::AspVariant;
use crate::{PrimeImplicants, Subspace, TrapSpaceError};
use std::path::PathBuf;

/// **(internal)** Implementation of the individual queries.
mod _impl_queries;

/// Which trap spaces should be returned by a query.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TrapSpaceKind {
    /// Subset-minimal trap spaces.
    Minimal,
    /// Subset-maximal trap spaces (excluding the trivial trap space).
    Maximal,
    /// All trap spaces.
    All,
    /// Trap spaces closed under percolation.
    Percolated,
}

/// One solution of the circuits query: the fixed variables of a percolated trap space split
/// into the variables that are part of a feedback circuit and those fixed by percolation.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct CircuitDecomposition {
    pub circuit: Subspace,
    pub percolated: Subspace,
}

/// Settings shared by all queries.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryOptions {
    /// The maximal number of returned solutions (the default is 1000).
    pub max_output: usize,
    /// If set, the generated program is also saved to this file.
    pub program_file: Option<PathBuf>,
}

/// Computes trap spaces (and related objects) using an [`AspSolver`].
///
/// The object holds no state besides the solver, so it can be reused for any number of
/// queries and networks.
pub struct TrapSpaces<S: AspSolver = Potassco> {
    solver: S,
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions {
            max_output: 1000,
            program_file: None,
        }
    }
}

impl QueryOptions {
    pub fn with_max_output(mut self, max_output: usize) -> Self {
        self.max_output = max_output;
        self
    }

    pub fn with_program_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.program_file = Some(path.into());
        self
    }
}

impl From<TrapSpaceKind> for AspVariant {
    fn from(value: TrapSpaceKind) -> Self {
        match value {
            TrapSpaceKind::Minimal => AspVariant::Minimal,
            TrapSpaceKind::Maximal => AspVariant::Maximal,
            TrapSpaceKind::All => AspVariant::All,
            TrapSpaceKind::Percolated => AspVariant::Percolated,
        }
    }
}

impl std::str::FromStr for TrapSpaceKind {
    type Err = TrapSpaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<AspVariant>()? {
            AspVariant::Minimal => Ok(TrapSpaceKind::Minimal),
            AspVariant::Maximal => Ok(TrapSpaceKind::Maximal),
            AspVariant::All => Ok(TrapSpaceKind::All),
            AspVariant::Percolated => Ok(TrapSpaceKind::Percolated),
            AspVariant::Circuits => Err(TrapSpaceError::InvalidInput(
                "Circuits are not a kind of trap space, use the circuits query.".to_string(),
            )),
        }
    }
}

impl TrapSpaces<Potassco> {
    /// Use `gringo` and `clasp` found in `PATH`.
    pub fn from_path() -> Result<TrapSpaces<Potassco>, TrapSpaceError> {
        Ok(TrapSpaces::new(Potassco::from_path()?))
    }
}

impl<S: AspSolver> TrapSpaces<S> {
    pub fn new(solver: S) -> TrapSpaces<S> {
        TrapSpaces { solver }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }
}

/// Percolate the given `trap_space`: its values are turned into constants of the network
/// and propagated until a fixed point is reached. The result contains the original values
/// as well as all percolated constants.
///
/// The function does not check whether `trap_space` is really a trap space, and it never
/// modifies `primes`.
pub fn percolate_trap_space(primes: &PrimeImplicants, trap_space: &Subspace) -> Subspace {
    let (_, constants) = primes
        .clone()
        .create_constants(trap_space)
        .percolate_and_keep_constants();
    constants
}
