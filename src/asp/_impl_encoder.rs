use crate::asp::AspVariant;
use crate::{PrimeImplicants, Subspace, TrapSpaceError};
use log::info;
use std::path::Path;

/// Build the answer set program for the trap spaces of `primes`.
///
/// The program consists of data (the hyper-arcs of the prime implicant graph) and a problem
/// description that includes the consistency, stability and non-emptiness conditions.
/// The remaining arguments modify the problem:
///
///  - `variant`: `Percolated` and `Circuits` replace the bijection rule with percolation
///    closure, `Circuits` also derives `percolated/1`. Other variants (or `None`) only
///    influence the solver heuristic, not the program.
///  - `bounds`: `(a, b)` enforces that the number of fixed variables `x` of a solution
///    satisfies `a <= x <= b`.
///  - `project`: shows only the `hit/2` atoms of the given variables. Names that are not
///    network variables are ignored; an empty projection means no projection.
///  - `extra_lines`: appended verbatim before the show directives.
///
/// Identical arguments always produce identical text: arcs are numbered by iterating the
/// variables in lexicographic order and the values in the order `0, 1`.
pub fn primes_to_asp(
    primes: &PrimeImplicants,
    variant: Option<AspVariant>,
    bounds: Option<(usize, usize)>,
    project: Option<&[String]>,
    extra_lines: &[String],
) -> String {
    let mut project = project
        .unwrap_or(&[])
        .iter()
        .filter(|it| primes.contains_variable(it))
        .map(|it| it.as_str())
        .collect::<Vec<_>>();
    project.sort();
    project.dedup();

    let mut lines: Vec<String> = vec![
        "% created using biodivine-asp-trap-spaces".to_string(),
        "".to_string(),
        "% encoding of prime implicants as hyper-arcs that consist of a unique \"target\" and (possibly) several \"sources\".".to_string(),
        "% \"target\" and \"source\" are triplets that consist of a variable name, an activity and a unique arc-identifier. ".to_string(),
        "".to_string(),
    ];

    let mut index = 0;
    for (name, lists) in primes.iter() {
        for (value, list) in lists.iter().enumerate() {
            for prime in list {
                index += 1;
                let mut hyper = vec![format!("target({},{},a{}).", quote(name), value, index)];
                for (source, source_value) in prime.iter() {
                    hyper.push(format!(
                        "source({},{},a{}).",
                        quote(source),
                        u8::from(source_value),
                        index
                    ));
                }
                lines.push(hyper.join(" "));
            }
        }
    }

    lines.extend(
        [
            "",
            "% generator: \"in_set(ID)\" specifies which arcs are chosen for a trap set (ID is unique for target(_,_,_)).",
            "{in_set(ID) : target(V,S,ID)}.",
            "",
            "% consistency constraint",
            ":- in_set(ID1), in_set(ID2), target(V,1,ID1), target(V,0,ID2).",
            "",
            "% stability constraint",
            ":- in_set(ID1), source(V,S,ID1), not in_set(ID2) : target(V,S,ID2).",
            "",
        ]
        .map(String::from),
    );

    if variant.map(|it| it.uses_percolation()).unwrap_or(false) {
        lines.extend(
            [
                "% percolation constraint.",
                "% ensure that if all sources of a prime are hit then it must belong to the solution.",
                "in_set(ID) :- target(V,S,ID), hit(V1,S1) : source(V1,S1,ID).",
            ]
            .map(String::from),
        );
    } else {
        lines.extend(
            [
                "% bijection constraint (between asp solutions and trap spaces)",
                "% to avoid the repetition of equivalent solutions we add all prime implicants",
                "% that agree with the current solution.",
                "in_set(ID) :- target(V,S,ID), hit(V,S), hit(V1,S1) : source(V1,S1,ID).",
            ]
            .map(String::from),
        );
    }

    if variant == Some(AspVariant::Circuits) {
        lines.extend(
            [
                "",
                "% circuits constraint, distinguishes between circuit nodes and percolated nodes",
                "upstream(V1,V2) :- in_set(ID), target(V1,S1,ID), source(V2,S2,ID).",
                "upstream(V1,V2) :- upstream(V1,V3), upstream(V3,V2).",
                "percolated(V1) :- hit(V1,S), not upstream(V1,V1).",
            ]
            .map(String::from),
        );
    }

    lines.extend(
        [
            "",
            "% \"hit\" captures the stable variables and their activities.",
            "hit(V,S) :- in_set(ID), target(V,S,ID).",
        ]
        .map(String::from),
    );

    if let Some((lower, upper)) = bounds {
        lines.push("".to_string());
        lines.push(format!(
            "% cardinality constraint (enforced by \"Bounds=({}, {})\")",
            lower, upper
        ));
        if lower > 0 {
            lines.push(format!(":- {{hit(V,S)}} {}.", lower - 1));
        }
        lines.push(format!(":- {} {{hit(V,S)}}.", upper.saturating_add(1)));
    }

    lines.extend(extra_lines.iter().cloned());

    if !project.is_empty() {
        lines.push("".to_string());
        lines.push(format!(
            "% show projection (enforced by \"Project={:?}\").",
            project
        ));
        lines.push("#show.".to_string());
        for name in &project {
            let name = quote(name);
            lines.push(format!("#show hit({},S) : hit({},S).", name, name));
        }
    } else if variant == Some(AspVariant::Circuits) {
        lines.extend(
            [
                "",
                "% show fixed nodes and distinguish between circuits and percolated",
                "#show percolated/1.",
                "#show hit/2.",
            ]
            .map(String::from),
        );
    } else {
        lines.extend(["", "% show fixed nodes", "#show hit/2."].map(String::from));
    }

    lines.join("\n")
}

/// Constraints that force every value of `subspace` to be hit by a solution (followed by
/// an empty line). Used as `extra_lines` of [`primes_to_asp`].
pub fn subspace_constraints(subspace: &Subspace) -> Vec<String> {
    let mut lines = subspace
        .iter()
        .map(|(name, value)| format!(":- not hit({},{}).", quote(name), u8::from(value)))
        .collect::<Vec<_>>();
    lines.push(String::new());
    lines
}

/// Save the program text to `path` (for inspection or manual editing).
pub fn save_asp(path: &Path, asp_text: &str) -> Result<(), TrapSpaceError> {
    std::fs::write(path, asp_text)?;
    info!("created {}", path.display());
    Ok(())
}

/// **(internal)** Write a variable name as a quoted ASP string constant.
fn quote(name: &str) -> String {
    format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}
