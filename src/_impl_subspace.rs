use crate::{ExtendedBoolean, PrimeImplicants, Subspace, TrapSpaceError};
use num_bigint::BigUint;
use num_traits::One;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::btree_map;
use std::fmt::{Display, Formatter};

impl Display for Subspace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// Subspaces are ordered by inclusion: a subspace that fixes more variables is smaller.
/// The order is the product of the per-variable `ExtendedBoolean` order.
impl PartialOrd for Subspace {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let mut result = Ordering::Equal;
        for name in self.variables().chain(other.variables()) {
            let left = ExtendedBoolean::from(self.get(name));
            let right = ExtendedBoolean::from(other.get(name));
            match (result, left.partial_cmp(&right)?) {
                (_, Ordering::Equal) => (),
                (Ordering::Equal, ordering) => result = ordering,
                (current, ordering) if current != ordering => return None,
                _ => (),
            }
        }
        Some(result)
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for Subspace {
    fn from_iter<T: IntoIterator<Item = (S, bool)>>(iter: T) -> Self {
        Subspace(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl IntoIterator for Subspace {
    type Item = (String, bool);
    type IntoIter = btree_map::IntoIter<String, bool>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Subspace {
    /// Create an empty subspace (i.e. all variables are free).
    pub fn new() -> Subspace {
        Subspace::default()
    }

    /// Create a subspace from a list of fixed values.
    ///
    /// If a variable appears multiple times, the last value is used.
    pub fn from_values<S: Into<String>>(values: Vec<(S, bool)>) -> Subspace {
        values.into_iter().collect()
    }

    pub fn get(&self, variable: &str) -> Option<bool> {
        self.0.get(variable).cloned()
    }

    /// Fix `variable` to `value`, returning the previously fixed value (if any).
    pub fn insert(&mut self, variable: &str, value: bool) -> Option<bool> {
        self.0.insert(variable.to_string(), value)
    }

    pub fn remove(&mut self, variable: &str) -> Option<bool> {
        self.0.remove(variable)
    }

    /// The number of fixed variables.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the fixed variables in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    /// True if every variable fixed in `other` is fixed to the same value in `self`.
    pub fn is_subspace_of(&self, other: &Subspace) -> bool {
        other.iter().all(|(k, v)| self.get(k) == Some(v))
    }

    /// True if there is no variable fixed to different values in `self` and `other`
    /// (i.e. the two subspaces intersect).
    pub fn is_consistent_with(&self, other: &Subspace) -> bool {
        self.iter()
            .all(|(k, v)| other.get(k).map(|it| it == v).unwrap_or(true))
    }

    /// Try to intersect two subspaces. If the result is empty, returns `None`.
    pub fn intersect(&self, other: &Subspace) -> Option<Subspace> {
        if !self.is_consistent_with(other) {
            return None;
        }
        let mut result = self.clone();
        for (k, v) in other.iter() {
            result.insert(k, v);
        }
        Some(result)
    }

    /// Read a subspace from its compact string form, e.g. `1-0`. The string must have one
    /// character per network variable, in lexicographic order of variable names.
    pub fn try_from_str(primes: &PrimeImplicants, value: &str) -> Result<Subspace, TrapSpaceError> {
        let value = value.trim();
        if value.chars().count() != primes.num_vars() {
            return Err(TrapSpaceError::InvalidInput(format!(
                "Subspace `{}` has length {}, but the network has {} variables.",
                value,
                value.chars().count(),
                primes.num_vars()
            )));
        }
        let mut result = Subspace::new();
        for (name, c) in primes.variables().zip(value.chars()) {
            if let Some(v) = ExtendedBoolean::try_from(c)?.try_as_bool() {
                result.insert(name, v);
            }
        }
        Ok(result)
    }

    /// Write this subspace in the compact string form (one character per network variable).
    pub fn to_str(&self, primes: &PrimeImplicants) -> String {
        primes
            .variables()
            .map(|name| ExtendedBoolean::from(self.get(name)).to_string())
            .collect()
    }

    /// Read a subspace from a JSON object with `0/1` values, e.g. `{"x": 1, "y": 0}`.
    pub fn try_from_json(value: &str) -> Result<Subspace, TrapSpaceError> {
        let json: Value = serde_json::from_str(value)?;
        Self::try_from_json_value(&json)
    }

    pub(crate) fn try_from_json_value(value: &Value) -> Result<Subspace, TrapSpaceError> {
        let Some(object) = value.as_object() else {
            return Err(TrapSpaceError::InvalidInput(format!(
                "Expected a JSON object, found `{}`.",
                value
            )));
        };
        let mut result = Subspace::new();
        for (name, value) in object {
            let value = match value {
                Value::Bool(b) => *b,
                Value::Number(n) if n.as_u64() == Some(0) => false,
                Value::Number(n) if n.as_u64() == Some(1) => true,
                _ => {
                    return Err(TrapSpaceError::InvalidInput(format!(
                        "Value of `{}` must be 0 or 1, found `{}`.",
                        name, value
                    )))
                }
            };
            result.insert(name, value);
        }
        Ok(result)
    }

    /// Write this subspace as a compact JSON object, e.g. `{"x":1,"y":0}`.
    pub fn to_json(&self) -> String {
        self.to_json_value().to_string()
    }

    pub(crate) fn to_json_value(&self) -> Value {
        let map: Map<String, Value> = self
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(u8::from(v))))
            .collect();
        Value::Object(map)
    }

    /// Read a subspace either from its JSON form (when it starts with `{`) or from
    /// its compact string form.
    pub fn try_parse(primes: &PrimeImplicants, value: &str) -> Result<Subspace, TrapSpaceError> {
        if value.trim_start().starts_with('{') {
            Self::try_from_json(value)
        } else {
            Self::try_from_str(primes, value)
        }
    }

    /// Count the states of the network that belong to this subspace.
    pub fn count_states(&self, primes: &PrimeImplicants) -> BigUint {
        let fixed = self
            .variables()
            .filter(|it| primes.contains_variable(it))
            .count();
        let free = primes.num_vars() - fixed;
        BigUint::one() << free
    }
}

#[cfg(test)]
mod tests {
    use crate::{PrimeImplicants, Subspace};
    use std::cmp::Ordering;
    use num_bigint::BigUint;

    fn three_free_variables() -> PrimeImplicants {
        let mut primes = PrimeImplicants::new();
        for name in ["x", "y", "z"] {
            let zero = Subspace::from_values(vec![(name, false)]);
            let one = Subspace::from_values(vec![(name, true)]);
            primes.insert(name, [vec![zero], vec![one]]);
        }
        primes
    }

    #[test]
    fn subspace_string_round_trip() {
        let primes = three_free_variables();
        // All 27 subspaces over three variables.
        for i in 0..27 {
            let mut code = i;
            let mut text = String::new();
            for _ in 0..3 {
                text.push(['0', '1', '-'][code % 3]);
                code /= 3;
            }
            let space = Subspace::try_from_str(&primes, &text).unwrap();
            assert_eq!(text, space.to_str(&primes));
            assert_eq!(space, Subspace::try_from_str(&primes, &space.to_str(&primes)).unwrap());
            assert_eq!(space, Subspace::try_from_json(&space.to_json()).unwrap());
        }
    }

    #[test]
    fn subspace_string_errors() {
        let primes = three_free_variables();
        assert!(Subspace::try_from_str(&primes, "10").is_err());
        assert!(Subspace::try_from_str(&primes, "1*0").is_err());
        assert!(Subspace::try_from_json("{\"x\": 2}").is_err());
        assert!(Subspace::try_from_json("[1, 0]").is_err());
    }

    #[test]
    fn subspace_parse_both_forms() {
        let primes = three_free_variables();
        let expected = Subspace::from_values(vec![("x", true), ("z", false)]);
        assert_eq!(expected, Subspace::try_parse(&primes, "1-0").unwrap());
        assert_eq!(expected, Subspace::try_parse(&primes, "{\"x\": 1, \"z\": 0}").unwrap());
        assert_eq!("{\"x\":1,\"z\":0}", expected.to_json());
    }

    #[test]
    fn subspace_inclusion_and_intersection() {
        let a = Subspace::from_values(vec![("x", true)]);
        let b = Subspace::from_values(vec![("x", true), ("y", false)]);
        let c = Subspace::from_values(vec![("x", false)]);
        assert!(b < a);
        assert!(a > b);
        assert_eq!(None, a.partial_cmp(&c));
        // Neither fixes the variable of the other.
        let d = Subspace::from_values(vec![("y", false)]);
        assert_eq!(None, a.partial_cmp(&d));
        assert_eq!(Some(Ordering::Equal), b.partial_cmp(&b.clone()));
        assert!(Subspace::new() > d);
        assert!(b.is_subspace_of(&Subspace::new()));
        assert_eq!(None, b.intersect(&c));
        assert_eq!(Some(b.clone()), a.intersect(&Subspace::from_values(vec![("y", false)])));
    }

    #[test]
    fn subspace_state_count() {
        let primes = three_free_variables();
        assert_eq!(BigUint::from(8u32), Subspace::new().count_states(&primes));
        let space = Subspace::from_values(vec![("x", true), ("y", true)]);
        assert_eq!(BigUint::from(2u32), space.count_states(&primes));
    }
}
