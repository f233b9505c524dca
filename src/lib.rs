//! A library for computing trap spaces of Boolean networks using answer set programming.
//!
//! The network is given as a set of prime implicants ([`PrimeImplicants`]). Each query is
//! translated into a logic program (see [`asp::primes_to_asp`]), grounded and solved by the
//! Potassco tools `gringo` and `clasp` (see [`asp::potassco`]), and the answer sets are
//! decoded back into [`Subspace`] objects. The queries themselves are available through
//! [`trap_spaces::TrapSpaces`].
//!
//! Note that the number of trap spaces is typically exponential in the number of network
//! variables, so every query is capped by a maximal number of returned solutions.

use std::collections::BTreeMap;

pub mod asp;
pub mod trap_spaces;

mod error;

/// **(internal)** Display and ordering of extended Booleans.
mod _impl_extended_boolean;
/// **(internal)** Percolation of constants through prime implicants.
mod _impl_percolation;
/// **(internal)** Utility methods for `PrimeImplicants`, including `.primes` serialization.
mod _impl_prime_implicants;
/// **(internal)** Parsing and rendering of `Representation`.
mod _impl_representation;
/// **(internal)** Utility methods for `Subspace`, including string/dict conversions.
mod _impl_subspace;

pub use error::TrapSpaceError;
pub use trap_spaces::percolate_trap_space;

/// An enum representing the possible state of each variable when describing a subspace
/// in the compact string form (e.g. `1-0`).
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub enum ExtendedBoolean {
    Zero,
    One,
    Any,
}

/// `Subspace` is a partial assignment of network variables: the variables that appear in the
/// map are fixed to the given value, all other variables are free.
///
/// A `Subspace` is also used to represent a single prime implicant (the partial assignment
/// that forces the target variable to a particular value), as well as a full state (when
/// every network variable is fixed).
///
/// Variables are always kept in lexicographic order, which is also the order of the
/// "bits" in the compact string representation (see [`Subspace::to_str`]).
#[derive(Clone, Default, PartialEq, Eq, Hash, Debug)]
pub struct Subspace(BTreeMap<String, bool>);

/// Prime implicants of a Boolean network.
///
/// For every variable, the structure keeps two lists of prime implicants: `[0]` are the
/// minimal partial assignments which force the variable to `false`, and `[1]` those that
/// force it to `true`. A constant variable has one empty list and the other list contains
/// exactly the empty implicant.
///
/// The structure follows the `.primes` JSON format of PyBoolNet, i.e.
/// `{"x": [[{"x": 1}], [{"x": 0}]]}` describes the network `x' = !x`.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct PrimeImplicants {
    primes: BTreeMap<String, [Vec<Subspace>; 2]>,
}

/// Selects how subspaces are presented to the user: either as a JSON-like dictionary
/// (`{"x": 1, "z": 0}`) or as the compact string over all network variables (`1-0`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default)]
pub enum Representation {
    #[default]
    Dict,
    Str,
}
