//! Invocation type describing a single logged command execution

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};

/// What to do when an invocation fails, besides raising the generic failure
#[derive(Debug, Clone, Default)]
pub enum OnFailure {
    /// Only the return code is logged
    #[default]
    NoAction,
    /// Log this message as an error before raising the generic failure
    Message(String),
    /// Raise this error instead of the generic failure
    RaiseInstead(Arc<dyn std::error::Error + Send + Sync>),
}

impl OnFailure {
    /// Build a [`OnFailure::RaiseInstead`] from any error value
    pub fn raise<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::RaiseInstead(Arc::new(error))
    }
}

impl From<&str> for OnFailure {
    fn from(message: &str) -> Self {
        Self::Message(message.to_owned())
    }
}

impl From<String> for OnFailure {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

/// Where the output of the spawned process goes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Append stdout and stderr to the log file
    #[default]
    Log,
    /// Stream to the invoking process's stdout and stderr
    Inherit,
    /// Pipe stdout and stderr back to the caller as text
    Capture,
}

/// Options passed through to the process spawn unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpawnOptions {
    /// Environment variables to set
    pub env: BTreeMap<OsString, OsString>,
    /// Whether to clear the environment before setting our vars
    pub env_clear: bool,
}

/// A command to be executed through the [`Runner`](crate::Runner)
///
/// Cheap to clone, so the same invocation can be re-run on retry.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// The program to execute
    program: OsString,
    /// The arguments to pass to the program
    args: Vec<OsString>,
    /// Working directory, the process cwd when unset
    current_dir: Option<PathBuf>,
    /// Printed to stdout before executing
    info_message: Option<String>,
    on_failure: OnFailure,
    output: OutputMode,
    options: SpawnOptions,
}

impl Invocation {
    /// Create a new invocation for the given program
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            args: Vec::new(),
            current_dir: None,
            info_message: None,
            on_failure: OnFailure::NoAction,
            output: OutputMode::Log,
            options: SpawnOptions::default(),
        }
    }

    /// Create an invocation from a full token list (program first)
    ///
    /// Tokens may mix strings and paths.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut tokens = tokens.into_iter();
        let program = tokens.next().ok_or(Error::EmptyCommand)?;
        let mut invocation = Self::new(program);
        invocation.args(tokens);
        Ok(invocation)
    }

    /// Add an argument
    pub fn arg<S: AsRef<OsStr>>(&mut self, arg: S) -> &mut Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self.arg(arg);
        }
        self
    }

    /// Set the working directory
    pub fn current_dir<P: AsRef<Path>>(&mut self, dir: P) -> &mut Self {
        self.current_dir = Some(dir.as_ref().to_owned());
        self
    }

    /// Set a message printed to stdout before the command runs
    pub fn info_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.info_message = Some(message.into());
        self
    }

    /// Set the on-failure directive
    pub fn on_failure(&mut self, on_failure: impl Into<OnFailure>) -> &mut Self {
        self.on_failure = on_failure.into();
        self
    }

    /// Set where process output goes
    pub fn output(&mut self, output: OutputMode) -> &mut Self {
        self.output = output;
        self
    }

    /// Set an environment variable
    pub fn env<K, V>(&mut self, key: K, val: V) -> &mut Self
    where
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        self.options
            .env
            .insert(key.as_ref().to_owned(), val.as_ref().to_owned());
        self
    }

    /// Clear all environment variables (except those explicitly set)
    pub fn env_clear(&mut self) -> &mut Self {
        self.options.env_clear = true;
        self
    }

    /// Get the program name
    pub fn get_program(&self) -> &OsStr {
        &self.program
    }

    /// Get the arguments
    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// All tokens, program first
    pub fn tokens(&self) -> impl Iterator<Item = &OsStr> {
        std::iter::once(self.program.as_os_str()).chain(self.args.iter().map(OsString::as_os_str))
    }

    /// Get the configured working directory
    pub fn get_current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Get the informational message
    pub fn get_info_message(&self) -> Option<&str> {
        self.info_message.as_deref()
    }

    /// Get the on-failure directive
    pub fn get_on_failure(&self) -> &OnFailure {
        &self.on_failure
    }

    /// Get the output mode
    pub fn get_output(&self) -> OutputMode {
        self.output
    }

    /// Get the pass-through spawn options
    pub fn get_options(&self) -> &SpawnOptions {
        &self.options
    }

    /// Command line joined with spaces, for error messages
    pub fn display_command(&self) -> String {
        self.tokens()
            .map(|t| t.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The configured working directory, or the process cwd
    pub(crate) fn resolve_cwd(&self) -> Result<PathBuf> {
        match &self.current_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    /// Convert into a `std::process::Command` running in `cwd`
    pub(crate) fn prepare(&self, cwd: &Path) -> std::process::Command {
        let mut cmd = std::process::Command::new(&self.program);
        cmd.args(&self.args);

        if self.options.env_clear {
            cmd.env_clear();
        }
        for (key, val) in &self.options.env {
            cmd.env(key, val);
        }

        cmd.current_dir(cwd);
        cmd
    }
}

/// Builder pattern helper
impl Invocation {
    /// Create a builder for this invocation (for chaining)
    pub fn builder<S: AsRef<OsStr>>(program: S) -> InvocationBuilder {
        InvocationBuilder(Invocation::new(program))
    }
}

/// Builder wrapper for more ergonomic invocation construction
pub struct InvocationBuilder(Invocation);

impl InvocationBuilder {
    /// Add an argument
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.0.arg(arg);
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.0.args(args);
        self
    }

    /// Set the working directory
    pub fn current_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.0.current_dir(dir);
        self
    }

    /// Set the informational message
    pub fn info_message(mut self, message: impl Into<String>) -> Self {
        self.0.info_message(message);
        self
    }

    /// Set the on-failure directive
    pub fn on_failure(mut self, on_failure: impl Into<OnFailure>) -> Self {
        self.0.on_failure(on_failure);
        self
    }

    /// Set where process output goes
    pub fn output(mut self, output: OutputMode) -> Self {
        self.0.output(output);
        self
    }

    /// Set an environment variable
    pub fn env<K, V>(mut self, key: K, val: V) -> Self
    where
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        self.0.env(key, val);
        self
    }

    /// Build the invocation
    pub fn build(self) -> Invocation {
        self.0
    }
}
