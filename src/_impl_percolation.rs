use crate::{PrimeImplicants, Subspace};

impl PrimeImplicants {
    /// Propagate the constants of the network through the prime implicants until a fixed
    /// point is reached.
    ///
    /// Every implicant that contradicts a constant is removed, and constant variables are
    /// erased from the remaining implicants. Variables that end up with an empty implicant
    /// become new constants. The constant variables are kept in the returned structure
    /// (as `[[], [{}]]` or `[[{}], []]`) and the second component contains all constants
    /// that were found.
    pub fn percolate_and_keep_constants(mut self) -> (PrimeImplicants, Subspace) {
        let mut constants = Subspace::new();
        let mut pending: Vec<(String, bool)> = self.find_constants().into_iter().collect();
        while let Some((name, value)) = pending.pop() {
            if constants.get(&name).is_some() {
                continue;
            }
            constants.insert(&name, value);
            self.make_constant(&name, value);

            for (target, lists) in self.primes.iter_mut() {
                if target == &name {
                    continue;
                }
                for list in lists.iter_mut() {
                    list.retain(|prime| prime.get(&name).map(|it| it == value).unwrap_or(true));
                    for prime in list.iter_mut() {
                        prime.remove(&name);
                    }
                }
            }

            for (name, value) in self.find_constants() {
                if constants.get(&name).is_none() {
                    pending.push((name, value));
                }
            }
        }

        (self, constants)
    }

    /// **(internal)** Replace the implicants of `name` with the canonical constant form.
    fn make_constant(&mut self, name: &str, value: bool) {
        let entry = if value {
            [Vec::new(), vec![Subspace::new()]]
        } else {
            [vec![Subspace::new()], Vec::new()]
        };
        self.insert(name, entry);
    }
}

#[cfg(test)]
mod tests {
    use crate::{PrimeImplicants, Subspace};

    fn s(values: Vec<(&str, bool)>) -> Subspace {
        Subspace::from_values(values)
    }

    // a' = 1, b' = a, c' = b & !d, d' = d
    fn chain() -> PrimeImplicants {
        let mut primes = PrimeImplicants::new();
        primes.insert("a", [vec![], vec![Subspace::new()]]);
        primes.insert("b", [vec![s(vec![("a", false)])], vec![s(vec![("a", true)])]]);
        primes.insert(
            "c",
            [
                vec![s(vec![("b", false)]), s(vec![("d", true)])],
                vec![s(vec![("b", true), ("d", false)])],
            ],
        );
        primes.insert("d", [vec![s(vec![("d", false)])], vec![s(vec![("d", true)])]]);
        primes
    }

    #[test]
    fn percolation_reaches_fixed_point() {
        let (primes, constants) = chain().percolate_and_keep_constants();
        let expected = Subspace::from_values(vec![("a", true), ("b", true)]);
        assert_eq!(expected, constants);
        assert_eq!(constants, primes.find_constants());
        // `c` now only depends on `d`.
        assert_eq!(vec![Subspace::from_values(vec![("d", false)])], primes.get("c").unwrap()[1]);
        assert_eq!(vec![Subspace::from_values(vec![("d", true)])], primes.get("c").unwrap()[0]);
    }

    #[test]
    fn percolation_of_created_constants() {
        let primes = chain().create_constants(&Subspace::from_values(vec![("d", false)]));
        let (_, constants) = primes.percolate_and_keep_constants();
        let expected =
            Subspace::from_values(vec![("a", true), ("b", true), ("c", true), ("d", false)]);
        assert_eq!(expected, constants);
    }
}
