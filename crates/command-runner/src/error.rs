//! Error types for logged command execution

use std::sync::Arc;

use thiserror::Error;

use crate::process::ExitStatus;

/// Unified error type for command execution and file helpers
#[derive(Error, Debug)]
pub enum Error {
    /// The generic runner failure.
    ///
    /// Raised when a command exits non-zero, cannot be found, or produced
    /// no result. The cause is only recorded in the log file.
    #[error("logged run failed, see the log file for details")]
    LoggedRunFailed,

    /// A caller-supplied error raised in place of [`Error::LoggedRunFailed`]
    #[error("{0}")]
    Replaced(Arc<dyn std::error::Error + Send + Sync>),

    /// A checked command exited unsuccessfully
    #[error("command `{command}` failed with {status}")]
    ProcessFailed {
        /// The command line that was executed
        command: String,
        /// The exit status of the process
        status: ExitStatus,
        /// Whatever the process wrote to stdout before exiting
        output: String,
    },

    /// Failed to spawn a process for a reason other than a missing program
    #[error("failed to spawn `{command}`: {source}")]
    SpawnFailed {
        /// The program that could not be spawned
        command: String,
        /// The underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// An invocation was built from an empty token list
    #[error("command has no program to execute")]
    EmptyCommand,

    /// The log file appender could not be created
    #[error("failed to initialize log file: {0}")]
    LogInit(#[from] tracing_appender::rolling::InitError),

    /// Walking a directory tree failed
    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a replacement error from any error value
    pub fn replaced<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Replaced(Arc::new(error))
    }

    /// Returns true for the generic runner failure
    pub fn is_logged_run_failure(&self) -> bool {
        matches!(self, Error::LoggedRunFailed)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
