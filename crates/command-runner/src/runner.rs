//! The logged command runner

use std::io::ErrorKind;
use std::panic::Location;
use std::process::{Output, Stdio};

use tracing::{debug, error, warn};

use crate::error::{Error, Result};
use crate::invocation::{Invocation, OnFailure, OutputMode};
use crate::log::{LogContext, UTILITY};
use crate::pretty::pretty_string_cmd;
use crate::process::{ExitStatus, RunOutput, decode_text};

/// Number of log lines echoed back after a failure
pub const DEFAULT_TAIL_LINES: usize = 40;

/// Runs external commands and logs every invocation to a shared log file
#[derive(Debug, Clone)]
pub struct Runner {
    log: LogContext,
    tail_lines: usize,
}

impl Runner {
    /// Create a runner logging to the given context
    pub fn new(log: LogContext) -> Self {
        Self {
            log,
            tail_lines: DEFAULT_TAIL_LINES,
        }
    }

    /// Set how many log lines are echoed back after a failure
    pub fn with_tail_lines(mut self, tail_lines: usize) -> Self {
        self.tail_lines = tail_lines;
        self
    }

    /// The log context this runner writes to
    pub fn log(&self) -> &LogContext {
        &self.log
    }

    /// Execute an invocation and enforce the logging/failure contract.
    ///
    /// A debug record of the invocation is always appended to the log. On a
    /// non-zero exit or a missing program the log tail is echoed back and
    /// [`Error::LoggedRunFailed`] is returned, unless the invocation carries
    /// [`OnFailure::RaiseInstead`].
    #[track_caller]
    pub fn run(&self, invocation: &Invocation) -> Result<RunOutput> {
        let caller = Location::caller();
        self.log.in_scope(|| self.attempt(invocation, caller))
    }

    /// Run `invocation`, retrying up to `retries` more times on the generic
    /// runner failure. Any other error is returned immediately.
    #[track_caller]
    pub fn run_with_retry(&self, invocation: &Invocation, retries: u32) -> Result<RunOutput> {
        let caller = Location::caller();
        self.log.in_scope(|| {
            let mut remaining = retries;
            loop {
                match self.attempt(invocation, caller) {
                    Err(Error::LoggedRunFailed) if remaining > 0 => {
                        remaining -= 1;
                        debug!(target: UTILITY, "retrying, {} retries left", remaining);
                    }
                    result => return result,
                }
            }
        })
    }

    /// Execute an invocation and return its stdout as text.
    ///
    /// Stderr is inherited. A non-zero exit returns [`Error::ProcessFailed`].
    /// A missing program is logged and yields `Ok(None)`. No tail-log or
    /// on-failure handling happens here.
    #[track_caller]
    pub fn check(&self, invocation: &Invocation) -> Result<Option<String>> {
        let caller = Location::caller();
        self.log.in_scope(|| {
            let mut command = self.prepare(invocation)?;
            command.stdout(Stdio::piped());

            let output = match spawn_and_wait(&mut command) {
                Ok(output) => output,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    log_not_found("check", caller, &e);
                    return Ok(None);
                }
                Err(source) => {
                    return Err(Error::SpawnFailed {
                        command: invocation.get_program().to_string_lossy().into_owned(),
                        source,
                    });
                }
            };

            let stdout = decode_text(&output.stdout);
            let status = ExitStatus::from(output.status);
            if !status.success() {
                return Err(Error::ProcessFailed {
                    command: invocation.display_command(),
                    status,
                    output: stdout,
                });
            }
            Ok(Some(stdout))
        })
    }

    fn attempt(&self, invocation: &Invocation, caller: &Location<'_>) -> Result<RunOutput> {
        let mut command = self.prepare(invocation)?;
        let mode = invocation.get_output();
        match mode {
            OutputMode::Log => {
                let log_file = self.log.append_handle()?;
                command.stdout(Stdio::from(log_file.try_clone()?));
                command.stderr(Stdio::from(log_file));
            }
            OutputMode::Inherit => {
                command.stdout(Stdio::inherit());
                command.stderr(Stdio::inherit());
            }
            OutputMode::Capture => {
                command.stdout(Stdio::piped());
                command.stderr(Stdio::piped());
            }
        }

        let output = match spawn_and_wait(&mut command) {
            Ok(output) => Some(output),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log_not_found("run", caller, &e);
                None
            }
            Err(source) => {
                return Err(Error::SpawnFailed {
                    command: invocation.get_program().to_string_lossy().into_owned(),
                    source,
                });
            }
        };

        let status = output.as_ref().map(|o| ExitStatus::from(o.status));
        if let (Some(output), Some(status)) = (output, status) {
            if status.success() {
                return Ok(into_run_output(output, status, mode));
            }
        }

        if let Err(e) = self.log.tail(self.tail_lines) {
            warn!(target: UTILITY, "could not tail {}: {}", self.log.path().display(), e);
        }
        if let Some(status) = status {
            error!(target: UTILITY, "return code: {}", status.returncode());
        }
        match invocation.get_on_failure() {
            OnFailure::NoAction => {}
            OnFailure::Message(message) => error!(target: UTILITY, "{}", message),
            OnFailure::RaiseInstead(replacement) => {
                return Err(Error::Replaced(replacement.clone()));
            }
        }
        Err(Error::LoggedRunFailed)
    }

    /// Shared setup: resolve cwd, print the info message, record the
    /// invocation, build the process command.
    fn prepare(&self, invocation: &Invocation) -> Result<std::process::Command> {
        let cwd = invocation.resolve_cwd()?;

        if let Some(message) = invocation.get_info_message() {
            println!("{message}");
        }

        debug!(
            target: UTILITY,
            "logged_run\n\tcwd:\t{}\n\tcmd:\t{}\n\tkwargs:\t{:?}",
            cwd.display(),
            pretty_string_cmd(invocation.tokens()),
            invocation.get_options()
        );

        Ok(invocation.prepare(&cwd))
    }
}

fn spawn_and_wait(command: &mut std::process::Command) -> std::io::Result<Output> {
    command.spawn()?.wait_with_output()
}

fn log_not_found(method: &str, caller: &Location<'_>, e: &std::io::Error) {
    error!(
        target: UTILITY,
        "Runner::{}(...) called from {} raised [ {:?}: {} ]",
        method,
        caller,
        e.kind(),
        e
    );
}

fn into_run_output(output: Output, status: ExitStatus, mode: OutputMode) -> RunOutput {
    let (stdout, stderr) = match mode {
        OutputMode::Capture => (
            Some(decode_text(&output.stdout)),
            Some(decode_text(&output.stderr)),
        ),
        OutputMode::Log | OutputMode::Inherit => (None, None),
    };
    RunOutput {
        status,
        stdout,
        stderr,
    }
}
