//! The shared append-only log file and its tracing dispatch
//!
//! Every runner owns a [`LogContext`]. Records are written synchronously, so
//! a record is on disk before the child process it describes starts
//! appending its own output to the same file.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::{Dispatch, Level, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use crate::error::{Error, Result};

/// Default log file name, created in the current working directory
pub const DEFAULT_LOG_FILE: &str = "btb.log";

/// Target for invocation records and failures
pub const UTILITY: &str = "utility";

/// Target for log lines echoed back after a failure
pub const TAIL: &str = "tail";

const BANNER_WIDTH: usize = 80;
const TAIL_START: &str = "tailing log file ";
const TAIL_END: &str = "end of tailing of the log file ";

/// Log sink plus formatter bound to one log file
///
/// Build it once per log file per process and hand clones to whatever needs
/// to log; clones share the same sink.
#[derive(Clone)]
pub struct LogContext {
    path: PathBuf,
    dispatch: Dispatch,
}

impl fmt::Debug for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogContext").field("path", &self.path).finish()
    }
}

impl LogContext {
    /// Log to `btb.log` in the current working directory at debug level
    pub fn in_current_dir() -> Result<Self> {
        Self::open(std::env::current_dir()?.join(DEFAULT_LOG_FILE))
    }

    /// Log to `path` at debug level
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_level(path, Level::DEBUG)
    }

    /// Log to `path`, recording events up to `level`
    ///
    /// The path is made absolute once here and never re-resolved.
    pub fn with_level(path: impl AsRef<Path>, level: Level) -> Result<Self> {
        let path = std::path::absolute(path.as_ref())?;
        let (dir, file_name) = match (path.parent(), path.file_name()) {
            (Some(dir), Some(name)) => (dir.to_path_buf(), name.to_string_lossy().into_owned()),
            _ => {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("not a file path: {}", path.display()),
                )));
            }
        };

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(file_name)
            .build(dir)?;

        let subscriber = tracing_subscriber::fmt()
            .with_writer(appender)
            .with_ansi(false)
            .with_target(true)
            .with_max_level(level)
            .finish();

        Ok(Self {
            path,
            dispatch: Dispatch::new(subscriber),
        })
    }

    /// Absolute path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The dispatch writing to this log file
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Run `f` with this context as the default tracing dispatcher
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Open a fresh append handle for redirecting child process output
    pub(crate) fn append_handle(&self) -> Result<File> {
        Ok(OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?)
    }

    /// Echo the last `n` lines of the log back into the log on the `tail`
    /// target, framed by banner lines. Does nothing for an empty log.
    pub fn tail(&self, n: usize) -> Result<()> {
        let bytes = std::fs::read(&self.path)?;
        let contents = String::from_utf8_lossy(&bytes);
        let lines: Vec<&str> = contents.lines().collect();
        if lines.is_empty() {
            return Ok(());
        }

        let recent = &lines[lines.len().saturating_sub(n)..];
        self.in_scope(|| {
            info!(target: TAIL, "{}", banner(TAIL_START));
            for line in recent {
                info!(target: TAIL, "{}", line);
            }
            info!(target: TAIL, "{}", banner(TAIL_END));
        });
        Ok(())
    }
}

fn banner(message: &str) -> String {
    let half = "- ".repeat(BANNER_WIDTH.saturating_sub(message.len()) / 4);
    format!("{half}{message}{half}")
}
