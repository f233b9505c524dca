//! Running answer set programs through the Potassco tools `gringo` and `clasp`.
//!
//! The program text is grounded by `gringo` and the ground program is piped directly into
//! `clasp`, which enumerates the answer sets. The [`AspSolver`] trait abstracts this pipeline
//! so that the queries in [`crate::trap_spaces`] can also run against a different solver
//! (or a fake one in tests).

use crate::asp::AspVariant;
use crate::TrapSpaceError;
use log::{debug, error};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

/// The substring of the diagnostic output that signals a failure of `gringo` or `clasp`.
pub const ERROR_MARKER: &str = "ERROR";

/// How often a running solver checks its `CancelToken`.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One invocation of the solver pipeline.
#[derive(Clone, Debug)]
pub struct SolverRequest<'a> {
    /// The program text.
    pub program: &'a str,
    /// If set, the program has also been saved to this file and the grounder reads it from
    /// there instead of its standard input.
    pub program_file: Option<&'a Path>,
    /// Selects the search heuristic.
    pub variant: AspVariant,
    /// The maximal number of enumerated answer sets.
    pub max_output: usize,
}

/// The raw output of the solver pipeline: the standard output of `clasp` and the
/// collected diagnostic output of both tools.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SolverOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Anything that can enumerate the answer sets of a program and print them in the
/// format of `clasp`.
pub trait AspSolver {
    fn solve(&self, request: &SolverRequest) -> Result<SolverOutput, TrapSpaceError>;
}

/// Locations of the Potassco executables and the limits of one solver run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PotasscoConfig {
    pub gringo: PathBuf,
    pub clasp: PathBuf,
    /// If set, both processes are terminated once the limit is exceeded.
    pub timeout: Option<Duration>,
}

/// A shared flag that aborts a running solver pipeline once it is set.
///
/// Clones share the flag. It stays set until [`CancelToken::reset`] is called, so every
/// solver run that uses the token fails with `TrapSpaceError::Cancelled` in the meantime.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

/// Runs `gringo | clasp` as two chained child processes.
#[derive(Clone, Debug)]
pub struct Potassco {
    config: PotasscoConfig,
    cancel: CancelToken,
}

impl PotasscoConfig {
    /// Use the given executables, without a timeout.
    pub fn new(gringo: impl Into<PathBuf>, clasp: impl Into<PathBuf>) -> PotasscoConfig {
        PotasscoConfig {
            gringo: gringo.into(),
            clasp: clasp.into(),
            timeout: None,
        }
    }

    /// Find `gringo` and `clasp` in `PATH`.
    pub fn from_path() -> Result<PotasscoConfig, TrapSpaceError> {
        let find = |name: &str| {
            which::which(name).map_err(|_| {
                TrapSpaceError::InvalidInput(format!("Executable `{}` not found in PATH.", name))
            })
        };
        Ok(PotasscoConfig::new(find("gringo")?, find("clasp")?))
    }

    pub fn with_gringo(mut self, path: impl Into<PathBuf>) -> Self {
        self.gringo = path.into();
        self
    }

    pub fn with_clasp(mut self, path: impl Into<PathBuf>) -> Self {
        self.clasp = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Clear the flag so that the token (and every clone) can be used for new runs.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Command line arguments of `clasp` for the given variant.
///
/// Projection support (`--project`) is always requested. Maximal and minimal trap spaces use
/// domain heuristics that prefer larger (resp. smaller) sets of `hit` atoms, such that
/// the enumerated answer sets are subset-maximal (resp. minimal).
pub fn clasp_arguments(variant: AspVariant, max_output: usize) -> Vec<String> {
    let mut args = vec![format!("--models={}", max_output), "--project".to_string()];
    let dom_mod = match variant {
        AspVariant::Maximal => Some("--dom-mod=5,16"),
        AspVariant::Minimal => Some("--dom-mod=3,16"),
        _ => None,
    };
    if let Some(dom_mod) = dom_mod {
        args.push("--enum-mode=domRec".to_string());
        args.push("--heuristic=Domain".to_string());
        args.push(dom_mod.to_string());
    }
    args
}

impl Potassco {
    pub fn new(config: PotasscoConfig) -> Potassco {
        Potassco {
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Use `gringo` and `clasp` from `PATH`.
    pub fn from_path() -> Result<Potassco, TrapSpaceError> {
        Ok(Potassco::new(PotasscoConfig::from_path()?))
    }

    /// Abort the solver run when `cancel` is set.
    ///
    /// The token is not cleared after a cancelled run: all later runs of this solver (and of
    /// its clones) are cancelled immediately until [`CancelToken::reset`] is called.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Potassco {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &PotasscoConfig {
        &self.config
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// The two commands as they would be written in a shell (used for diagnostics).
    fn command_line(&self, request: &SolverRequest) -> String {
        let mut gringo = vec![self.config.gringo.display().to_string()];
        if let Some(file) = request.program_file {
            gringo.push(file.display().to_string());
        }
        let mut clasp = vec![self.config.clasp.display().to_string()];
        clasp.extend(clasp_arguments(request.variant, request.max_output));
        format!("{} | {}", gringo.join(" "), clasp.join(" "))
    }

    fn run(&self, request: &SolverRequest) -> Result<SolverOutput, TrapSpaceError> {
        // One deadline covers the whole pipeline, not each process separately.
        let deadline = self.config.timeout.map(|it| Instant::now() + it);
        let mut gringo = Command::new(&self.config.gringo);
        if let Some(file) = request.program_file {
            gringo.arg(file).stdin(Stdio::null());
        } else {
            gringo.stdin(Stdio::piped());
        }
        let mut gringo = gringo.stdout(Stdio::piped()).stderr(Stdio::piped()).spawn()?;

        let Some(ground_program) = gringo.stdout.take() else {
            kill_quietly(&mut gringo);
            return Err(missing_pipe("gringo stdout"));
        };
        let clasp = Command::new(&self.config.clasp)
            .args(clasp_arguments(request.variant, request.max_output))
            .stdin(Stdio::from(ground_program))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();
        let mut clasp = match clasp {
            Ok(clasp) => clasp,
            Err(e) => {
                kill_quietly(&mut gringo);
                return Err(e.into());
            }
        };

        let writer = gringo.stdin.take().map(|mut stdin| {
            let program = request.program.to_string();
            std::thread::spawn(move || stdin.write_all(program.as_bytes()))
        });
        let gringo_stderr = gringo.stderr.take().map(read_in_background);
        let clasp_stdout = clasp.stdout.take().map(read_in_background);
        let clasp_stderr = clasp.stderr.take().map(read_in_background);

        if let Err(e) = self.wait(&mut clasp, deadline).and_then(|_| self.wait(&mut gringo, deadline)) {
            kill_quietly(&mut clasp);
            kill_quietly(&mut gringo);
            return Err(e);
        }

        let write_result = writer.map(join_thread).transpose()?;
        let stdout = collect_stream(clasp_stdout)?;
        let mut stderr = collect_stream(gringo_stderr)?;
        stderr.push_str(&collect_stream(clasp_stderr)?);

        // A broken pipe only means that gringo stopped reading; its diagnostics explain why.
        if let Some(Err(e)) = write_result {
            if !stderr.contains(ERROR_MARKER) {
                return Err(e.into());
            }
        }

        Ok(SolverOutput { stdout, stderr })
    }

    /// Wait for `child` until `deadline` while honouring the cancellation token.
    fn wait(&self, child: &mut Child, deadline: Option<Instant>) -> Result<(), TrapSpaceError> {
        loop {
            if self.cancel.is_cancelled() {
                return Err(TrapSpaceError::Cancelled);
            }
            let mut slice = POLL_INTERVAL;
            if let (Some(deadline), Some(timeout)) = (deadline, self.config.timeout) {
                let now = Instant::now();
                if now >= deadline {
                    return Err(TrapSpaceError::Timeout(timeout));
                }
                slice = slice.min(deadline - now);
            }
            if child.wait_timeout(slice)?.is_some() {
                return Ok(());
            }
        }
    }
}

impl AspSolver for Potassco {
    fn solve(&self, request: &SolverRequest) -> Result<SolverOutput, TrapSpaceError> {
        let command = self.command_line(request);
        debug!("command: {}", command);

        let output = match self.run(request) {
            Ok(output) => output,
            Err(e) => {
                error!("{}", request.program);
                error!("{}", e);
                error!("Call to gringo and / or clasp failed.");
                error!("command: {}", command);
                return Err(e);
            }
        };

        if output.stderr.contains(ERROR_MARKER) {
            error!("Call to gringo and / or clasp failed.");
            if let Some(file) = request.program_file {
                error!("asp file: {}", file.display());
            }
            error!("command: {}", command);
            error!("error: {}", output.stderr);
            return Err(TrapSpaceError::SolverFailed {
                command,
                stderr: output.stderr,
            });
        }

        debug!("{}", output.stderr);
        debug!("{}", output.stdout);
        Ok(output)
    }
}

fn read_in_background<R: Read + Send + 'static>(mut stream: R) -> JoinHandle<std::io::Result<String>> {
    std::thread::spawn(move || {
        let mut buffer = Vec::new();
        stream.read_to_end(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    })
}

fn join_thread<T>(handle: JoinHandle<std::io::Result<T>>) -> Result<std::io::Result<T>, TrapSpaceError> {
    handle
        .join()
        .map_err(|_| TrapSpaceError::Io(std::io::Error::other("solver I/O thread panicked")))
}

fn collect_stream(
    handle: Option<JoinHandle<std::io::Result<String>>>,
) -> Result<String, TrapSpaceError> {
    match handle {
        Some(handle) => Ok(join_thread(handle)??),
        None => Ok(String::new()),
    }
}

fn kill_quietly(child: &mut Child) {
    // The process may have already exited, in which case there is nothing to report.
    let _ = child.kill();
    let _ = child.wait();
}

fn missing_pipe(name: &str) -> TrapSpaceError {
    TrapSpaceError::Io(std::io::Error::other(format!("{} is not available", name)))
}
