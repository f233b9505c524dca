use crate::{PrimeImplicants, Subspace, TrapSpaceError};
use serde_json::Value;

impl PrimeImplicants {
    /// Create an empty set of prime implicants (a network with no variables).
    pub fn new() -> PrimeImplicants {
        PrimeImplicants::default()
    }

    /// Read prime implicants from a PyBoolNet `.primes` JSON document.
    pub fn try_from_json(value: &str) -> Result<PrimeImplicants, TrapSpaceError> {
        let json: Value = serde_json::from_str(value)?;
        let Some(object) = json.as_object() else {
            return Err(TrapSpaceError::InvalidInput(
                "Prime implicants must be a JSON object.".to_string(),
            ));
        };
        let mut result = PrimeImplicants::new();
        for (name, lists) in object {
            let lists = match lists.as_array() {
                Some(lists) if lists.len() == 2 => lists,
                _ => {
                    return Err(TrapSpaceError::InvalidInput(format!(
                        "Primes of `{}` must be a pair of lists.",
                        name
                    )))
                }
            };
            let mut entry: [Vec<Subspace>; 2] = [Vec::new(), Vec::new()];
            for (value, list) in lists.iter().enumerate() {
                let Some(list) = list.as_array() else {
                    return Err(TrapSpaceError::InvalidInput(format!(
                        "Primes of `{}` for value {} must be a list.",
                        name, value
                    )));
                };
                for prime in list {
                    entry[value].push(Subspace::try_from_json_value(prime)?);
                }
            }
            result.insert(name, entry);
        }

        let unknown = result.unknown_variables(
            result
                .primes
                .values()
                .flat_map(|it| it.iter().flatten())
                .flat_map(|prime| prime.variables()),
        );
        if !unknown.is_empty() {
            return Err(TrapSpaceError::UnknownVariables(unknown));
        }

        Ok(result)
    }

    /// Write prime implicants as a PyBoolNet `.primes` JSON document.
    pub fn to_json(&self) -> String {
        let object: serde_json::Map<String, Value> = self
            .primes
            .iter()
            .map(|(name, [zero, one])| {
                let zero = zero.iter().map(|it| it.to_json_value()).collect();
                let one = one.iter().map(|it| it.to_json_value()).collect();
                (name.clone(), Value::Array(vec![Value::Array(zero), Value::Array(one)]))
            })
            .collect();
        Value::Object(object).to_string()
    }

    /// Set the prime implicants of `variable` (`[0]` forces `false`, `[1]` forces `true`).
    pub fn insert(&mut self, variable: &str, primes: [Vec<Subspace>; 2]) {
        self.primes.insert(variable.to_string(), primes);
    }

    pub fn get(&self, variable: &str) -> Option<&[Vec<Subspace>; 2]> {
        self.primes.get(variable)
    }

    /// Return the prime implicants that force `variable` to `value`.
    pub fn get_primes(&self, variable: &str, value: bool) -> &[Subspace] {
        match self.primes.get(variable) {
            Some(entry) => &entry[usize::from(value)],
            None => &[],
        }
    }

    pub fn num_vars(&self) -> usize {
        self.primes.len()
    }

    pub fn contains_variable(&self, variable: &str) -> bool {
        self.primes.contains_key(variable)
    }

    /// Iterate over the network variables in lexicographic order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.primes.keys().map(|it| it.as_str())
    }

    /// Iterate over variables and their prime implicants in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Vec<Subspace>; 2])> {
        self.primes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Collect the (sorted, unique) names from `names` that are not network variables.
    pub fn unknown_variables<'a, I: IntoIterator<Item = &'a str>>(&self, names: I) -> Vec<String> {
        let mut unknown = names
            .into_iter()
            .filter(|it| !self.contains_variable(it))
            .map(|it| it.to_string())
            .collect::<Vec<_>>();
        unknown.sort();
        unknown.dedup();
        unknown
    }

    /// Variables that are constant, i.e. one of their prime lists contains the empty implicant.
    pub fn find_constants(&self) -> Subspace {
        let mut result = Subspace::new();
        for (name, [zero, one]) in self.iter() {
            if one.iter().any(|it| it.is_empty()) {
                result.insert(name, true);
            } else if zero.iter().any(|it| it.is_empty()) {
                result.insert(name, false);
            }
        }
        result
    }

    /// Create a copy of these prime implicants that only keeps the implicants which are
    /// consistent with `subspace` (i.e. can still be satisfied inside it).
    ///
    /// Every variable is retained, even if it loses all of its implicants.
    pub fn active_primes(&self, subspace: &Subspace) -> PrimeImplicants {
        let primes = self
            .primes
            .iter()
            .map(|(name, lists)| {
                let active = lists.clone().map(|list| {
                    list.into_iter()
                        .filter(|prime| prime.is_consistent_with(subspace))
                        .collect::<Vec<_>>()
                });
                (name.clone(), active)
            })
            .collect();
        PrimeImplicants { primes }
    }

    /// Turn every variable fixed in `constants` into a constant of the network.
    ///
    /// The method consumes the implicants, so the caller decides whether the original
    /// is copied or given up.
    pub fn create_constants(mut self, constants: &Subspace) -> PrimeImplicants {
        for (name, value) in constants.iter() {
            let entry = if value {
                [Vec::new(), vec![Subspace::new()]]
            } else {
                [vec![Subspace::new()], Vec::new()]
            };
            self.insert(name, entry);
        }
        self
    }
}
