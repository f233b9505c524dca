//! Translation of trap space problems into answer set programs and back.
//!
//! The encoding follows the prime implicant graph approach of Klarner et al. (2015): every
//! prime implicant is a hyper-arc with one `target` and several `source` facts, a solution
//! selects a set of arcs (`in_set`) that is consistent and stable, and the variables hit by
//! the selected arcs (`hit`) form the trap space.
//!
//! The module has three parts:
//!
//!  - [`primes_to_asp`] builds the program text for a given [`AspVariant`], [`Bounds`] and
//!    projection.
//!  - [`potassco`] runs the program through `gringo | clasp`.
//!  - [`parse_answer_sets`], [`decode_spaces`] and [`decode_circuits`] read the answer sets
//!    printed by `clasp`.
//!

pub mod potassco;

/// **(internal)** Resolution of symbolic bounds.
mod _impl_bounds;
/// **(internal)** Parsing of `clasp` answer sets.
mod _impl_decoder;
/// **(internal)** Generation of the logic program text.
mod _impl_encoder;
/// **(internal)** Parsing and display of `AspVariant`.
mod _impl_variant;

pub use _impl_decoder::{decode_circuits, decode_spaces, parse_answer_sets};
pub use _impl_encoder::{primes_to_asp, save_asp, subspace_constraints};

/// The problem variants supported by the encoding. Apart from the extra constraints of
/// `Percolated` and `Circuits`, the variant also selects the `clasp` search heuristic.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AspVariant {
    /// Subset-minimal trap spaces.
    Minimal,
    /// Subset-maximal trap spaces (excluding the trivial one when bounded).
    Maximal,
    /// All trap spaces.
    All,
    /// Trap spaces that are closed under percolation.
    Percolated,
    /// Percolated trap spaces split into circuit and percolated variables.
    Circuits,
}

/// One endpoint of a cardinality bound: either an explicit count of fixed variables,
/// or the number of all network variables (written as `n`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BoundValue {
    Count(usize),
    All,
}

/// An inclusive range on the number of fixed variables of a solution.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Bounds {
    pub lower: BoundValue,
    pub upper: BoundValue,
}

/// A single answer set printed by `clasp`: the `hit/2` atoms and (for circuits) the
/// `percolated/1` atoms, in the order in which they were printed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AnswerSet {
    pub hits: Vec<(String, bool)>,
    pub percolated: Vec<String>,
}
