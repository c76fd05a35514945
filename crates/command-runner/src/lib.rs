//! Logged external command execution
//!
//! This crate provides a single entry point for running external commands.
//! Every invocation is recorded in an append-only log file together with
//! the command's output, failures are reported through one error type, and
//! a small set of file helpers (copy, mkdir, chmod) delegate to system
//! commands so permission bits come out the same on every machine.
//!
//! ```no_run
//! use command_runner::{Invocation, LogContext, Runner};
//!
//! let runner = Runner::new(LogContext::in_current_dir()?);
//! let cmd = Invocation::builder("cargo").arg("build").arg("--release").build();
//! runner.run_with_retry(&cmd, 1)?;
//! # Ok::<(), command_runner::Error>(())
//! ```

#![warn(missing_docs)]

pub mod error;
#[cfg(unix)]
pub mod fs;
pub mod invocation;
pub mod log;
pub mod pretty;
pub mod process;
pub mod runner;

pub use error::{Error, Result};
#[cfg(unix)]
pub use fs::{FileHelper, FileOps, MkdirOptions, NativeFileOps, ShellFileOps};
pub use invocation::{Invocation, InvocationBuilder, OnFailure, OutputMode, SpawnOptions};
pub use log::LogContext;
pub use pretty::pretty_string_cmd;
pub use process::{ExitStatus, RunOutput};
pub use runner::Runner;
