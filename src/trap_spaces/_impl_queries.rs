use crate::asp::potassco::{AspSolver, SolverRequest};
use crate::asp::{
    decode_circuits, decode_spaces, primes_to_asp, save_asp, subspace_constraints, AspVariant,
    BoundValue, Bounds,
};
use crate::trap_spaces::{CircuitDecomposition, QueryOptions, TrapSpaceKind, TrapSpaces};
use crate::{PrimeImplicants, Subspace, TrapSpaceError};
use log::{debug, error};

impl<S: AspSolver> TrapSpaces<S> {
    /// Compute the minimal, maximal, all or percolated trap spaces of the network.
    ///
    /// For maximal trap spaces, the trivial trap space (all variables free) is excluded.
    pub fn trap_spaces(
        &self,
        primes: &PrimeImplicants,
        kind: TrapSpaceKind,
        options: &QueryOptions,
    ) -> Result<Vec<Subspace>, TrapSpaceError> {
        let bounds = default_bounds(kind);
        self.solve_spaces(primes, kind.into(), bounds, None, &[], options)
    }

    /// Compute trap spaces whose number of fixed variables lies within `bounds`.
    ///
    /// Note that the bounds are applied *before* minimal or maximal trap spaces are selected.
    /// A trap space may therefore be minimal with respect to the bounds without being minimal
    /// in the unbounded sense. For `bounds = (n, n)`, the kind is irrelevant and the result
    /// are the steady states.
    pub fn trap_spaces_bounded(
        &self,
        primes: &PrimeImplicants,
        kind: TrapSpaceKind,
        bounds: Bounds,
        options: &QueryOptions,
    ) -> Result<Vec<Subspace>, TrapSpaceError> {
        self.solve_spaces(primes, kind.into(), Some(bounds), None, &[], options)
    }

    /// Compute the steady states (fixed points) of the network.
    pub fn steady_states(
        &self,
        primes: &PrimeImplicants,
        options: &QueryOptions,
    ) -> Result<Vec<Subspace>, TrapSpaceError> {
        self.solve_spaces(primes, AspVariant::All, Some(Bounds::states()), None, &[], options)
    }

    /// Compute the steady states of the network projected onto the `project` variables.
    ///
    /// Steady states that agree on the projected variables are reported as separate
    /// solutions only when the solver projection distinguishes them, so the result can be
    /// shorter than the list of steady states.
    pub fn steady_states_projected(
        &self,
        primes: &PrimeImplicants,
        project: &[String],
        options: &QueryOptions,
    ) -> Result<Vec<Subspace>, TrapSpaceError> {
        let unknown = primes.unknown_variables(project.iter().map(|it| it.as_str()));
        if !unknown.is_empty() {
            error!("can not project steady states: unknown names {:?}", unknown);
            return Err(TrapSpaceError::UnknownVariables(unknown));
        }
        self.solve_spaces(
            primes,
            AspVariant::All,
            Some(Bounds::states()),
            Some(project),
            &[],
            options,
        )
    }

    /// Compute percolated trap spaces and split each into circuit and percolated variables.
    pub fn circuits(
        &self,
        primes: &PrimeImplicants,
        options: &QueryOptions,
    ) -> Result<Vec<CircuitDecomposition>, TrapSpaceError> {
        let bounds = Some(Bounds::new(0, BoundValue::All));
        let output = self.run(primes, AspVariant::Circuits, bounds, None, &[], options)?;
        decode_circuits(&output, options.max_output)
    }

    /// Compute the trap spaces that contain the given `state`.
    ///
    /// For a full state and `TrapSpaceKind::Minimal`, the result is the unique smallest
    /// trap space containing the state.
    pub fn trap_spaces_that_contain_state(
        &self,
        primes: &PrimeImplicants,
        state: &Subspace,
        kind: TrapSpaceKind,
        options: &QueryOptions,
    ) -> Result<Vec<Subspace>, TrapSpaceError> {
        self.trap_spaces_that_intersect_subspace(primes, state, kind, options)
    }

    /// Compute the trap spaces that have a non-empty intersection with `subspace`.
    ///
    /// If the restricted problem has no solution, the result is the trivial trap space
    /// (the whole state space), which always intersects `subspace`.
    pub fn trap_spaces_that_intersect_subspace(
        &self,
        primes: &PrimeImplicants,
        subspace: &Subspace,
        kind: TrapSpaceKind,
        options: &QueryOptions,
    ) -> Result<Vec<Subspace>, TrapSpaceError> {
        check_subspace(primes, subspace)?;
        let relevant_primes = primes.active_primes(subspace);
        let bounds = default_bounds(kind);
        let spaces =
            self.solve_spaces(&relevant_primes, kind.into(), bounds, None, &[], options)?;

        if spaces.is_empty() {
            return Ok(vec![Subspace::new()]);
        }

        if subspace.len() == primes.num_vars() && kind == TrapSpaceKind::Minimal {
            if spaces.len() > 1 {
                error!("the smallest trap space containing a state (or other space) must be unique!");
                error!("found {} smallest trap spaces.", spaces.len());
                error!("{:?}", spaces);
                return Err(TrapSpaceError::NonUniqueMinimalTrapSpace(spaces));
            }
            return Ok(spaces.into_iter().take(1).collect());
        }

        Ok(spaces)
    }

    /// Compute the trap spaces that are contained within `subspace`.
    ///
    /// For an empty `subspace`, this is the same as [`TrapSpaces::trap_spaces`].
    pub fn trap_spaces_within_subspace(
        &self,
        primes: &PrimeImplicants,
        subspace: &Subspace,
        kind: TrapSpaceKind,
        options: &QueryOptions,
    ) -> Result<Vec<Subspace>, TrapSpaceError> {
        if subspace.is_empty() {
            return self.trap_spaces(primes, kind, options);
        }
        check_subspace(primes, subspace)?;
        let relevant_primes = primes.active_primes(subspace);
        let bounds = Bounds::new(subspace.len(), BoundValue::All);
        let extra_lines = subspace_constraints(subspace);
        self.solve_spaces(
            &relevant_primes,
            kind.into(),
            Some(bounds),
            None,
            &extra_lines,
            options,
        )
    }

    /// Compute the unique smallest trap space that contains `state`.
    pub fn smallest_trap_space(
        &self,
        primes: &PrimeImplicants,
        state: &Subspace,
        options: &QueryOptions,
    ) -> Result<Subspace, TrapSpaceError> {
        let spaces =
            self.trap_spaces_that_contain_state(primes, state, TrapSpaceKind::Minimal, options)?;
        Ok(spaces.into_iter().next().unwrap_or_default())
    }

    /// **(internal)** Encode, solve and decode a query whose solutions are subspaces.
    fn solve_spaces(
        &self,
        primes: &PrimeImplicants,
        variant: AspVariant,
        bounds: Option<Bounds>,
        project: Option<&[String]>,
        extra_lines: &[String],
        options: &QueryOptions,
    ) -> Result<Vec<Subspace>, TrapSpaceError> {
        let output = self.run(primes, variant, bounds, project, extra_lines, options)?;
        decode_spaces(&output, options.max_output)
    }

    /// **(internal)** Build the program for the query, run the solver and return its
    /// standard output.
    fn run(
        &self,
        primes: &PrimeImplicants,
        variant: AspVariant,
        bounds: Option<Bounds>,
        project: Option<&[String]>,
        extra_lines: &[String],
        options: &QueryOptions,
    ) -> Result<String, TrapSpaceError> {
        if options.max_output == 0 {
            return Err(TrapSpaceError::InvalidInput(
                "The maximal number of solutions must be positive.".to_string(),
            ));
        }
        let bounds = bounds
            .map(|it| it.resolve(primes.num_vars()))
            .transpose()?;

        let program = primes_to_asp(primes, Some(variant), bounds, project, extra_lines);
        if let Some(path) = &options.program_file {
            save_asp(path, &program)?;
        }
        debug!("{}", program);

        let request = SolverRequest {
            program: &program,
            program_file: options.program_file.as_deref(),
            variant,
            max_output: options.max_output,
        };
        Ok(self.solver.solve(&request)?.stdout)
    }
}

/// **(internal)** Maximal trap spaces exclude the trivial trap space.
fn default_bounds(kind: TrapSpaceKind) -> Option<Bounds> {
    if kind == TrapSpaceKind::Maximal {
        Some(Bounds::non_trivial())
    } else {
        None
    }
}

/// **(internal)** A subspace used to restrict a query must only use network variables.
fn check_subspace(primes: &PrimeImplicants, subspace: &Subspace) -> Result<(), TrapSpaceError> {
    let unknown = primes.unknown_variables(subspace.variables());
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(TrapSpaceError::UnknownVariables(unknown))
    }
}

#[cfg(test)]
mod tests {
    use crate::asp::potassco::{AspSolver, SolverOutput, SolverRequest};
    use crate::asp::{AspVariant, BoundValue, Bounds};
    use crate::trap_spaces::{
        percolate_trap_space, CircuitDecomposition, QueryOptions, TrapSpaceKind, TrapSpaces,
    };
    use crate::{PrimeImplicants, Representation, Subspace, TrapSpaceError};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use test_log::test;

    // x' = !x | y | z, y' = !x&z | y&!z, z' = x&y | z
    const PRIMES: &str = r#"{
        "x": [[{"x": 1, "y": 0, "z": 0}], [{"x": 0}, {"y": 1}, {"z": 1}]],
        "y": [[{"x": 1, "y": 0}, {"x": 1, "z": 1}, {"y": 0, "z": 0}], [{"x": 0, "z": 1}, {"y": 1, "z": 0}, {"x": 0, "y": 1}]],
        "z": [[{"x": 0, "z": 0}, {"y": 0, "z": 0}], [{"x": 1, "y": 1}, {"z": 1}]]
    }"#;

    const ALL: &str = "clasp version 3.3.5\nReading from stdin\nSolving...\nAnswer: 1\n\nAnswer: 2\nhit(\"z\",1)\nAnswer: 3\nhit(\"z\",1) hit(\"x\",1)\nAnswer: 4\nhit(\"y\",0) hit(\"z\",0)\nAnswer: 5\nhit(\"z\",1) hit(\"x\",1) hit(\"y\",0)\nSATISFIABLE\n";
    const MIN: &str = "Solving...\nAnswer: 1\nhit(\"y\",0) hit(\"z\",0)\nAnswer: 2\nhit(\"x\",1) hit(\"y\",0) hit(\"z\",1)\nSATISFIABLE\n";
    const MAX: &str = "Solving...\nAnswer: 1\nhit(\"z\",1)\nAnswer: 2\nhit(\"y\",0) hit(\"z\",0)\nSATISFIABLE\n";
    const STEADY: &str = "Solving...\nAnswer: 1\nhit(\"x\",1) hit(\"y\",0) hit(\"z\",1)\nSATISFIABLE\n";
    const EMPTY: &str = "Solving...\nUNSATISFIABLE\n";

    /// A solver that replays a fixed output and remembers every request.
    struct ReplaySolver {
        output: String,
        requests: RefCell<Vec<(String, Option<PathBuf>, AspVariant, usize)>>,
    }

    impl AspSolver for ReplaySolver {
        fn solve(&self, request: &SolverRequest) -> Result<SolverOutput, TrapSpaceError> {
            self.requests.borrow_mut().push((
                request.program.to_string(),
                request.program_file.map(|it| it.to_path_buf()),
                request.variant,
                request.max_output,
            ));
            Ok(SolverOutput {
                stdout: self.output.clone(),
                stderr: String::new(),
            })
        }
    }

    fn replay(output: &str) -> TrapSpaces<ReplaySolver> {
        TrapSpaces::new(ReplaySolver {
            output: output.to_string(),
            requests: RefCell::new(Vec::new()),
        })
    }

    fn last_program(queries: &TrapSpaces<ReplaySolver>) -> String {
        queries.solver().requests.borrow().last().unwrap().0.clone()
    }

    fn last_variant(queries: &TrapSpaces<ReplaySolver>) -> AspVariant {
        queries.solver().requests.borrow().last().unwrap().2
    }

    fn primes() -> PrimeImplicants {
        PrimeImplicants::try_from_json(PRIMES).unwrap()
    }

    fn render(primes: &PrimeImplicants, spaces: &[Subspace]) -> Vec<String> {
        let mut result = spaces
            .iter()
            .map(|it| Representation::Str.render(primes, it))
            .collect::<Vec<_>>();
        result.sort();
        result
    }

    fn state(primes: &PrimeImplicants, value: &str) -> Subspace {
        Subspace::try_from_str(primes, value).unwrap()
    }

    #[test]
    fn all_trap_spaces_in_string_form() {
        let primes = primes();
        let queries = replay(ALL);
        let spaces = queries
            .trap_spaces(&primes, TrapSpaceKind::All, &QueryOptions::default())
            .unwrap();
        assert_eq!(vec!["---", "--1", "-00", "1-1", "101"], render(&primes, &spaces));
        assert_eq!(AspVariant::All, last_variant(&queries));
        let program = last_program(&queries);
        assert!(!program.contains("cardinality constraint"));
        assert!(program.contains("bijection constraint"));
    }

    #[test]
    fn maximal_trap_spaces_exclude_trivial_space() {
        let primes = primes();
        let queries = replay(MAX);
        let spaces = queries
            .trap_spaces(&primes, TrapSpaceKind::Maximal, &QueryOptions::default())
            .unwrap();
        assert_eq!(vec!["--1", "-00"], render(&primes, &spaces));
        assert_eq!(AspVariant::Maximal, last_variant(&queries));
        let program = last_program(&queries);
        assert!(program.contains(":- {hit(V,S)} 0.\n:- 4 {hit(V,S)}."));
    }

    #[test]
    fn maximal_spaces_contain_minimal_spaces() {
        let primes = primes();
        let options = QueryOptions::default();
        let minimal = replay(MIN)
            .trap_spaces(&primes, TrapSpaceKind::Minimal, &options)
            .unwrap();
        let maximal = replay(MAX)
            .trap_spaces(&primes, TrapSpaceKind::Maximal, &options)
            .unwrap();
        for max in &maximal {
            for (name, value) in max.iter() {
                assert!(minimal
                    .iter()
                    .any(|min| min.is_subspace_of(max) && min.get(name) == Some(value)));
            }
        }
    }

    #[test]
    fn steady_states_are_bounded_by_network_size() {
        let primes = primes();
        let queries = replay(STEADY);
        let states = queries.steady_states(&primes, &QueryOptions::default()).unwrap();
        assert_eq!(vec!["101"], render(&primes, &states));
        let program = last_program(&queries);
        assert!(program.contains("(enforced by \"Bounds=(3, 3)\")\n:- {hit(V,S)} 2.\n:- 4 {hit(V,S)}."));
        assert!(program.ends_with("#show hit/2."));

        let bounded = queries
            .trap_spaces_bounded(&primes, TrapSpaceKind::Minimal, Bounds::states(), &QueryOptions::default())
            .unwrap();
        assert_eq!(states, bounded);
        assert_eq!(program, last_program(&queries));
    }

    #[test]
    fn projected_steady_states() {
        let primes = primes();
        let queries = replay("Answer: 1\nhit(\"x\",1)\nSATISFIABLE\n");
        let project = vec!["x".to_string()];
        let states = queries
            .steady_states_projected(&primes, &project, &QueryOptions::default())
            .unwrap();
        assert_eq!(vec![Subspace::from_values(vec![("x", true)])], states);
        let program = last_program(&queries);
        assert!(program.ends_with("#show.\n#show hit(\"x\",S) : hit(\"x\",S)."));

        let project = vec!["x".to_string(), "w".to_string()];
        let error = queries
            .steady_states_projected(&primes, &project, &QueryOptions::default())
            .unwrap_err();
        assert!(matches!(error, TrapSpaceError::UnknownVariables(names) if names == vec!["w".to_string()]));
    }

    #[test]
    fn circuits_are_decoded_as_pairs() {
        let primes = primes();
        let queries = replay("Answer: 1\nhit(\"z\",1) percolated(\"x\") hit(\"x\",1) percolated(\"y\") hit(\"y\",0)\nSATISFIABLE\n");
        let circuits = queries.circuits(&primes, &QueryOptions::default()).unwrap();
        assert_eq!(
            vec![CircuitDecomposition {
                circuit: Subspace::from_values(vec![("z", true)]),
                percolated: Subspace::from_values(vec![("x", true), ("y", false)]),
            }],
            circuits
        );
        assert_eq!(AspVariant::Circuits, last_variant(&queries));
        let program = last_program(&queries);
        assert!(program.contains(":- 4 {hit(V,S)}."));
        assert!(!program.contains(":- {hit(V,S)}"));
        assert!(program.ends_with("#show percolated/1.\n#show hit/2."));
    }

    #[test]
    fn smallest_trap_space_of_state() {
        let primes = primes();
        let queries = replay("Answer: 1\nhit(\"y\",0) hit(\"z\",0)\nSATISFIABLE\n");
        let space = queries
            .smallest_trap_space(&primes, &state(&primes, "000"), &QueryOptions::default())
            .unwrap();
        assert_eq!("-00", space.to_str(&primes));
        assert_eq!(AspVariant::Minimal, last_variant(&queries));
        // Primes inconsistent with the state are not part of the program.
        let program = last_program(&queries);
        assert!(!program.contains("source(\"x\",1,"));
        assert!(program.ends_with("#show hit/2."));
    }

    #[test]
    fn smallest_trap_space_must_be_unique() {
        let primes = primes();
        let queries = replay(MIN);
        let error = queries
            .smallest_trap_space(&primes, &state(&primes, "100"), &QueryOptions::default())
            .unwrap_err();
        match error {
            TrapSpaceError::NonUniqueMinimalTrapSpace(spaces) => assert_eq!(2, spaces.len()),
            other => panic!("Unexpected error: {:?}", other),
        }

        // For a subspace that is not a full state, several minimal trap spaces are fine.
        let spaces = queries
            .trap_spaces_that_intersect_subspace(
                &primes,
                &Subspace::from_values(vec![("x", true)]),
                TrapSpaceKind::Minimal,
                &QueryOptions::default(),
            )
            .unwrap();
        assert_eq!(2, spaces.len());
    }

    #[test]
    fn empty_result_is_the_whole_space() {
        let primes = primes();
        let queries = replay(EMPTY);
        let spaces = queries
            .trap_spaces_that_contain_state(
                &primes,
                &state(&primes, "011"),
                TrapSpaceKind::Maximal,
                &QueryOptions::default(),
            )
            .unwrap();
        assert_eq!(vec![Subspace::new()], spaces);
        assert!(last_program(&queries).contains(":- {hit(V,S)} 0."));
    }

    #[test]
    fn trap_spaces_within_subspace() {
        let primes = primes();
        let queries = replay("Answer: 1\nhit(\"z\",1)\nAnswer: 2\nhit(\"x\",1) hit(\"z\",1)\nSATISFIABLE\n");
        let subspace = Subspace::from_values(vec![("z", true)]);
        let spaces = queries
            .trap_spaces_within_subspace(&primes, &subspace, TrapSpaceKind::All, &QueryOptions::default())
            .unwrap();
        assert_eq!(vec!["--1", "1-1"], render(&primes, &spaces));
        let program = last_program(&queries);
        assert!(program.contains(":- {hit(V,S)} 0.\n:- 4 {hit(V,S)}.\n:- not hit(\"z\",1).\n\n"));

        // Empty subspace degenerates into the unrestricted query.
        queries
            .trap_spaces_within_subspace(&primes, &Subspace::new(), TrapSpaceKind::All, &QueryOptions::default())
            .unwrap();
        assert!(!last_program(&queries).contains("not hit("));

        let unknown = Subspace::from_values(vec![("w", true)]);
        let error = queries
            .trap_spaces_within_subspace(&primes, &unknown, TrapSpaceKind::All, &QueryOptions::default())
            .unwrap_err();
        assert!(matches!(error, TrapSpaceError::UnknownVariables(_)));
    }

    #[test]
    fn output_is_truncated() {
        let primes = primes();
        let queries = replay(ALL);
        let options = QueryOptions::default().with_max_output(2);
        let spaces = queries.trap_spaces(&primes, TrapSpaceKind::All, &options).unwrap();
        assert_eq!(2, spaces.len());
        assert_eq!(2, queries.solver().requests.borrow()[0].3);

        let options = QueryOptions::default().with_max_output(0);
        let error = queries.trap_spaces(&primes, TrapSpaceKind::All, &options).unwrap_err();
        assert!(matches!(error, TrapSpaceError::InvalidInput(_)));
    }

    #[test]
    fn program_is_saved_to_file() {
        let primes = primes();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("query.asp");
        let queries = replay(ALL);
        let options = QueryOptions::default().with_program_file(&path);
        queries.trap_spaces(&primes, TrapSpaceKind::All, &options).unwrap();
        let saved = std::fs::read_to_string(&path).unwrap();
        assert_eq!(last_program(&queries), saved);
        assert_eq!(Some(path), queries.solver().requests.borrow()[0].1.clone());
    }

    #[test]
    fn percolation_of_trap_spaces() {
        let primes = primes();
        let original = primes.clone();
        let space = percolate_trap_space(&primes, &Subspace::from_values(vec![("z", true)]));
        assert_eq!("101", space.to_str(&primes));
        assert_eq!(space, percolate_trap_space(&primes, &space));
        let space = percolate_trap_space(&primes, &Subspace::from_values(vec![("y", false), ("z", false)]));
        assert_eq!("-00", space.to_str(&primes));
        assert_eq!(original, primes);
    }

    #[test]
    fn bounds_with_explicit_counts() {
        let primes = primes();
        let queries = replay(ALL);
        let bounds = Bounds::new(2, BoundValue::All);
        queries
            .trap_spaces_bounded(&primes, TrapSpaceKind::All, bounds, &QueryOptions::default())
            .unwrap();
        assert!(last_program(&queries).contains(":- {hit(V,S)} 1.\n:- 4 {hit(V,S)}."));

        // Upper bounds beyond the network size are the same as `n`.
        let bounds = Bounds::new(0, usize::MAX);
        queries
            .trap_spaces_bounded(&primes, TrapSpaceKind::All, bounds, &QueryOptions::default())
            .unwrap();
        let program = last_program(&queries);
        assert!(program.contains("(enforced by \"Bounds=(0, 3)\")\n:- 4 {hit(V,S)}."));

        let error = queries
            .trap_spaces_bounded(&primes, TrapSpaceKind::All, Bounds::new(3, 2), &QueryOptions::default())
            .unwrap_err();
        assert!(matches!(error, TrapSpaceError::InvalidInput(_)));
    }

    /// Runs the real Potassco tools if they are installed.
    #[test]
    fn potassco_trap_spaces() {
        let Ok(queries) = TrapSpaces::from_path() else {
            return;
        };
        let primes = primes();
        let options = QueryOptions::default();
        let all = queries.trap_spaces(&primes, TrapSpaceKind::All, &options).unwrap();
        assert_eq!(vec!["---", "--1", "-00", "1-1", "101"], render(&primes, &all));
        let minimal = queries.trap_spaces(&primes, TrapSpaceKind::Minimal, &options).unwrap();
        assert_eq!(vec!["-00", "101"], render(&primes, &minimal));
        let maximal = queries.trap_spaces(&primes, TrapSpaceKind::Maximal, &options).unwrap();
        assert_eq!(vec!["--1", "-00"], render(&primes, &maximal));
        let steady = queries.steady_states(&primes, &options).unwrap();
        assert_eq!(vec!["101"], render(&primes, &steady));
        for code in ["000", "001", "010", "011", "100", "101", "110", "111"] {
            let space = queries
                .smallest_trap_space(&primes, &state(&primes, code), &options)
                .unwrap();
            assert!(state(&primes, code).is_subspace_of(&space));
        }
    }
}
