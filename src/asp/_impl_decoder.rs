use crate::asp::AnswerSet;
use crate::trap_spaces::CircuitDecomposition;
use crate::{Subspace, TrapSpaceError};
use fxhash::FxHashSet;
use lazy_static::lazy_static;
use log::info;
use regex::Regex;

lazy_static! {
    /// A single atom `name(args)`; quoted arguments may contain parentheses and escaped quotes.
    static ref ATOM: Regex =
        Regex::new(r#"^(?P<pred>[a-z][A-Za-z0-9_]*)\((?P<args>(?:"(?:[^"\\]|\\.)*"|[^()"])*)\)"#)
            .unwrap();
    /// Arguments of `hit/2`: a quoted variable name and a Boolean value.
    static ref HIT_ARGS: Regex =
        Regex::new(r#"^\s*"(?P<name>(?:[^"\\]|\\.)*)"\s*,\s*(?P<value>[01])\s*$"#).unwrap();
    /// Arguments of `percolated/1`: a quoted variable name.
    static ref PERCOLATED_ARGS: Regex =
        Regex::new(r#"^\s*"(?P<name>(?:[^"\\]|\\.)*)"\s*$"#).unwrap();
}

/// Read (at most `max_output`) answer sets from the standard output of `clasp`.
///
/// Every answer set is printed on the line following an `Answer: k` line. The answer line
/// consists of whitespace separated `hit("name",0|1)` and `percolated("name")` atoms (and it
/// is empty for the empty answer set). Anything else in an answer line is an error.
pub fn parse_answer_sets(output: &str, max_output: usize) -> Result<Vec<AnswerSet>, TrapSpaceError> {
    let mut result = Vec::new();
    let mut lines = output.lines();
    while result.len() < max_output {
        let Some(line) = lines.next() else {
            break;
        };
        if !line.starts_with("Answer") {
            continue;
        }
        let Some(answer) = lines.next() else {
            return Err(TrapSpaceError::MalformedOutput(format!(
                "Missing answer set after `{}`.",
                line
            )));
        };
        result.push(parse_answer_line(answer)?);
    }
    Ok(result)
}

/// Decode the answer sets of a trap space query into subspaces.
pub fn decode_spaces(output: &str, max_output: usize) -> Result<Vec<Subspace>, TrapSpaceError> {
    let result = parse_answer_sets(output, max_output)?
        .into_iter()
        .map(|answer| hits_to_subspace(&answer.hits))
        .collect::<Result<Vec<_>, _>>()?;
    log_truncation(result.len(), max_output);
    Ok(result)
}

/// Decode the answer sets of a circuits query: the variables marked as `percolated` form
/// the percolated part, every other fixed variable belongs to the circuit part.
pub fn decode_circuits(
    output: &str,
    max_output: usize,
) -> Result<Vec<CircuitDecomposition>, TrapSpaceError> {
    let mut result = Vec::new();
    for answer in parse_answer_sets(output, max_output)? {
        let percolated_names: FxHashSet<&str> =
            answer.percolated.iter().map(|it| it.as_str()).collect();
        let (percolated, circuit): (Vec<_>, Vec<_>) = answer
            .hits
            .iter()
            .cloned()
            .partition(|(name, _)| percolated_names.contains(name.as_str()));
        result.push(CircuitDecomposition {
            circuit: hits_to_subspace(&circuit)?,
            percolated: hits_to_subspace(&percolated)?,
        });
    }
    log_truncation(result.len(), max_output);
    Ok(result)
}

/// **(internal)** Parse one answer line into its atoms.
fn parse_answer_line(line: &str) -> Result<AnswerSet, TrapSpaceError> {
    let mut answer = AnswerSet::default();
    let mut rest = line.trim_start();
    while !rest.is_empty() {
        let Some(atom) = ATOM.captures(rest) else {
            return Err(TrapSpaceError::MalformedOutput(format!(
                "Unexpected text `{}` in answer set `{}`.",
                rest, line
            )));
        };
        let predicate = &atom["pred"];
        let args = &atom["args"];
        match predicate {
            "hit" => {
                let Some(hit) = HIT_ARGS.captures(args) else {
                    return Err(malformed_atom(predicate, args));
                };
                answer
                    .hits
                    .push((unescape(&hit["name"]), &hit["value"] == "1"));
            }
            "percolated" => {
                let Some(percolated) = PERCOLATED_ARGS.captures(args) else {
                    return Err(malformed_atom(predicate, args));
                };
                answer.percolated.push(unescape(&percolated["name"]));
            }
            _ => return Err(malformed_atom(predicate, args)),
        }
        let end = atom.get(0).map(|it| it.end()).unwrap_or(rest.len());
        rest = rest[end..].trim_start();
    }
    Ok(answer)
}

/// **(internal)** Build a subspace, checking that no variable is hit with both values.
fn hits_to_subspace(hits: &[(String, bool)]) -> Result<Subspace, TrapSpaceError> {
    let mut result = Subspace::new();
    for (name, value) in hits {
        if let Some(previous) = result.insert(name, *value) {
            if previous != *value {
                return Err(TrapSpaceError::MalformedOutput(format!(
                    "Variable `{}` is hit with both values.",
                    name
                )));
            }
        }
    }
    Ok(result)
}

fn malformed_atom(predicate: &str, args: &str) -> TrapSpaceError {
    TrapSpaceError::MalformedOutput(format!("Unexpected atom `{}({})`.", predicate, args))
}

fn unescape(name: &str) -> String {
    name.replace("\\\"", "\"").replace("\\\\", "\\")
}

fn log_truncation(found: usize, max_output: usize) {
    if let Some(notice) = truncation_notice(found, max_output) {
        info!("{}", notice);
        info!("Increase the maximal output to find out.");
    }
}

/// **(internal)** The notice reported when the solver output was cut at `max_output`.
fn truncation_notice(found: usize, max_output: usize) -> Option<String> {
    if found == max_output {
        Some(format!("There are possibly more than {} trap spaces.", max_output))
    } else {
        None
    }
}
