use crate::Subspace;
use std::time::Duration;
use thiserror::Error;

/// Errors produced while building, solving or interpreting trap space queries.
#[derive(Debug, Error)]
pub enum TrapSpaceError {
    /// The query parameters are malformed (bounds, subspace strings, output limits, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The query references variables that do not exist in the network.
    #[error("Unknown variables: {0:?}")]
    UnknownVariables(Vec<String>),

    /// The minimal trap space containing a state must be unique. Finding more than one
    /// means the prime implicants or the solver output are inconsistent.
    #[error("The smallest trap space containing a state must be unique, found {}.", .0.len())]
    NonUniqueMinimalTrapSpace(Vec<Subspace>),

    /// Spawning or communicating with `gringo`/`clasp` failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A `.primes` file or a JSON subspace could not be read.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The diagnostic output of `gringo` or `clasp` reported an error.
    #[error("Call to gringo and/or clasp failed (`{command}`): {stderr}")]
    SolverFailed { command: String, stderr: String },

    /// The solver did not finish in time. Both processes were terminated.
    #[error("Solver timed out after {0:?}")]
    Timeout(Duration),

    /// The solver run was cancelled through a `CancelToken`.
    #[error("Solver run was cancelled")]
    Cancelled,

    /// The solver output does not follow the expected answer set grammar.
    #[error("Malformed solver output: {0}")]
    MalformedOutput(String),
}
