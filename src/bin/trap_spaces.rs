/*
   Command line front-end for the trap space queries. The network is read from a `.primes`
   JSON file, the query is solved using `gringo` and `clasp` and every result is printed
   on a separate line.

   Example: `trap-spaces network.primes min --representation str`
*/

use biodivine_asp_trap_spaces::asp::potassco::{Potassco, PotasscoConfig};
use biodivine_asp_trap_spaces::asp::{BoundValue, Bounds};
use biodivine_asp_trap_spaces::trap_spaces::{QueryOptions, TrapSpaceKind, TrapSpaces};
use biodivine_asp_trap_spaces::{
    percolate_trap_space, PrimeImplicants, Representation, Subspace, TrapSpaceError,
};
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Query {
    /// Minimal trap spaces.
    Min,
    /// Maximal trap spaces.
    Max,
    /// All trap spaces.
    All,
    /// Trap spaces closed under percolation.
    Percolated,
    /// Steady states (optionally projected using `--project`).
    Steady,
    /// Percolated trap spaces split into circuit and percolated variables.
    Circuits,
    /// Trap spaces that contain the state given by `--subspace`.
    Contain,
    /// Trap spaces that intersect `--subspace`.
    Intersect,
    /// Trap spaces within `--subspace`.
    Within,
    /// The smallest trap space that contains the state given by `--subspace`.
    Smallest,
    /// Percolation of `--subspace` (no solver needed).
    Percolate,
}

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Prime implicants of the network in the `.primes` JSON format.
    #[arg(value_name = "PRIMES")]
    primes: PathBuf,

    #[arg(value_enum)]
    query: Query,

    /// Kind of trap spaces used by `contain`, `intersect` and `within`
    /// (`min`, `max`, `all` or `percolated`).
    #[arg(long, default_value = "min")]
    kind: TrapSpaceKind,

    /// A state or subspace, either as a string (`1-0`) or as a JSON object.
    #[arg(long)]
    subspace: Option<String>,

    /// Comma separated variables onto which steady states are projected.
    #[arg(long, value_delimiter = ',')]
    project: Vec<String>,

    /// Bounds on the number of fixed variables, e.g. `1,n`.
    #[arg(long, value_name = "LOWER,UPPER")]
    bounds: Option<String>,

    /// Path to the `gringo` executable (searched in `PATH` by default).
    #[arg(long)]
    gringo: Option<PathBuf>,

    /// Path to the `clasp` executable (searched in `PATH` by default).
    #[arg(long)]
    clasp: Option<PathBuf>,

    /// Terminate the solver after the given number of seconds.
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Maximal number of returned solutions.
    #[arg(long, default_value = "1000")]
    max_output: usize,

    /// Also save the generated logic program to this file.
    #[arg(long)]
    asp_file: Option<PathBuf>,

    /// Output representation (`dict` or `str`).
    #[arg(long, default_value = "dict")]
    representation: Representation,

    /// Increase logging verbosity (`-v` for debug, `-vv` for trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Cli::parse();

    let level = match args.verbose {
        0 => simplelog::LevelFilter::Info,
        1 => simplelog::LevelFilter::Debug,
        _ => simplelog::LevelFilter::Trace,
    };
    let logger = simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    );
    if let Err(e) = logger {
        eprintln!("Cannot initialize logging: {}", e);
    }

    match run(&args) {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
        }
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: &Cli) -> Result<Vec<String>, TrapSpaceError> {
    let primes = PrimeImplicants::try_from_json(&std::fs::read_to_string(&args.primes)?)?;
    let subspace = match &args.subspace {
        Some(value) => Some(Subspace::try_parse(&primes, value)?),
        None => None,
    };
    let require_subspace = || {
        subspace.clone().ok_or_else(|| {
            TrapSpaceError::InvalidInput(format!("Query {:?} requires --subspace.", args.query))
        })
    };
    let render = |spaces: Vec<Subspace>| {
        spaces
            .iter()
            .map(|it| args.representation.render(&primes, it))
            .collect::<Vec<_>>()
    };

    let mut options = QueryOptions::default().with_max_output(args.max_output);
    if let Some(path) = &args.asp_file {
        options = options.with_program_file(path);
    }
    let bounds = args.bounds.as_deref().map(parse_bounds).transpose()?;
    // Percolation does not need the solver, so it is only located when a query runs.
    let queries = || solver_config(args).map(|it| TrapSpaces::new(Potassco::new(it)));

    let spaces = match args.query {
        Query::Min | Query::Max | Query::All | Query::Percolated => {
            let kind = match args.query {
                Query::Min => TrapSpaceKind::Minimal,
                Query::Max => TrapSpaceKind::Maximal,
                Query::All => TrapSpaceKind::All,
                _ => TrapSpaceKind::Percolated,
            };
            match bounds {
                Some(bounds) => queries()?.trap_spaces_bounded(&primes, kind, bounds, &options)?,
                None => queries()?.trap_spaces(&primes, kind, &options)?,
            }
        }
        Query::Steady if args.project.is_empty() => queries()?.steady_states(&primes, &options)?,
        Query::Steady => queries()?.steady_states_projected(&primes, &args.project, &options)?,
        Query::Circuits => {
            return Ok(queries()?
                .circuits(&primes, &options)?
                .iter()
                .map(|it| args.representation.render_circuit(&primes, it))
                .collect());
        }
        Query::Contain => queries()?.trap_spaces_that_contain_state(
            &primes,
            &require_subspace()?,
            args.kind,
            &options,
        )?,
        Query::Intersect => queries()?.trap_spaces_that_intersect_subspace(
            &primes,
            &require_subspace()?,
            args.kind,
            &options,
        )?,
        Query::Within => queries()?.trap_spaces_within_subspace(
            &primes,
            &require_subspace()?,
            args.kind,
            &options,
        )?,
        Query::Smallest => {
            vec![queries()?.smallest_trap_space(&primes, &require_subspace()?, &options)?]
        }
        Query::Percolate => vec![percolate_trap_space(&primes, &require_subspace()?)],
    };

    Ok(render(spaces))
}

fn solver_config(args: &Cli) -> Result<PotasscoConfig, TrapSpaceError> {
    let mut config = match (&args.gringo, &args.clasp) {
        (Some(gringo), Some(clasp)) => PotasscoConfig::new(gringo, clasp),
        _ => PotasscoConfig::from_path()?,
    };
    if let Some(gringo) = &args.gringo {
        config = config.with_gringo(gringo);
    }
    if let Some(clasp) = &args.clasp {
        config = config.with_clasp(clasp);
    }
    if let Some(seconds) = args.timeout {
        config = config.with_timeout(Duration::from_secs(seconds));
    }
    Ok(config)
}

/// Read `lower,upper` where each value is a number or `n` (all variables).
fn parse_bounds(value: &str) -> Result<Bounds, TrapSpaceError> {
    let parse = |it: &str| match it.trim() {
        "n" => Ok(BoundValue::All),
        it => it.parse::<usize>().map(BoundValue::Count).map_err(|_| {
            TrapSpaceError::InvalidInput(format!("Invalid bound `{}` in `{}`.", it, value))
        }),
    };
    match value.split_once(',') {
        Some((lower, upper)) => Ok(Bounds::new(parse(lower)?, parse(upper)?)),
        None => Err(TrapSpaceError::InvalidInput(format!(
            "Bounds must be written as `lower,upper`, got `{}`.",
            value
        ))),
    }
}
