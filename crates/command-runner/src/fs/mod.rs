//! Permission-normalizing file helpers
//!
//! Copy and chmod go through a [`FileOps`] backend. The default backend,
//! [`ShellFileOps`], shells out to the system `cp` and `chmod` through the
//! [`Runner`](crate::Runner), because native copy and mkdir primitives do
//! not reliably preserve or honour permission bits on every platform.
//! [`NativeFileOps`] does the same work with `std::fs`.
//!
//! # Example
//!
//! ```no_run
//! use command_runner::{FileHelper, LogContext, MkdirOptions, Runner};
//!
//! let runner = Runner::new(LogContext::in_current_dir()?);
//! let files = FileHelper::shell(runner);
//! files.safe_mkdir("out", 0o700, MkdirOptions::default())?;
//! files.safe_copytree("assets", "out/assets")?;
//! files.mac_force_access_all("out", false)?;
//! # Ok::<(), command_runner::Error>(())
//! ```

pub mod native;
pub mod perms;
pub mod shell;

pub use native::NativeFileOps;
pub use perms::filemode;
pub use shell::ShellFileOps;

use std::os::unix::fs::DirBuilderExt;
use std::path::Path;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::Result;
use crate::log::{LogContext, UTILITY};
use crate::runner::Runner;

/// Mode applied to directories and executables
pub const DIR_MODE: u32 = 0o755;

/// Mode applied to regular, non-executable files
pub const FILE_MODE: u32 = 0o644;

/// Copy and permission primitives the helpers are built on
pub trait FileOps {
    /// Copy a single file from `src` to `dst`
    fn copy(&self, src: &Path, dst: &Path) -> Result<()>;

    /// Copy a directory tree with `cp -R` semantics: when `dst` is an
    /// existing directory the tree lands inside it
    fn copy_tree(&self, src: &Path, dst: &Path) -> Result<()>;

    /// Set permission bits on `path`, and everything below it when
    /// `recursive` is set
    fn set_mode(&self, path: &Path, mode: u32, recursive: bool) -> Result<()>;
}

/// Options forwarded to directory creation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MkdirOptions {
    /// Create missing parent directories
    pub parents: bool,
    /// Do not fail when the directory already exists
    pub exist_ok: bool,
}

/// File helpers backed by a [`FileOps`] implementation
#[derive(Debug, Clone)]
pub struct FileHelper<O: FileOps> {
    ops: O,
    log: LogContext,
}

impl FileHelper<ShellFileOps> {
    /// Helpers that shell out to `cp` and `chmod` through `runner`
    pub fn shell(runner: Runner) -> Self {
        let log = runner.log().clone();
        Self::new(ShellFileOps::new(runner), log)
    }
}

impl FileHelper<NativeFileOps> {
    /// Helpers backed by `std::fs`, logging to `log`
    pub fn native(log: LogContext) -> Self {
        Self::new(NativeFileOps, log)
    }
}

impl<O: FileOps> FileHelper<O> {
    /// Create helpers from any backend
    pub fn new(ops: O, log: LogContext) -> Self {
        Self { ops, log }
    }

    /// Get a reference to the backend
    pub fn ops(&self) -> &O {
        &self.ops
    }

    /// Symbolic permission string for `path`, or `None` if it does not exist
    pub fn file_permissions(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = path.as_ref();
        let mode = perms::path_mode(path);
        if mode.is_none() {
            self.log.in_scope(|| {
                debug!(
                    target: UTILITY,
                    "Tried to check permissions for {} - file not found",
                    path.display()
                )
            });
        }
        mode
    }

    /// Copy a single file
    pub fn safe_copy(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<()> {
        self.ops.copy(src.as_ref(), dst.as_ref())
    }

    /// Copy a directory tree
    pub fn safe_copytree(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<()> {
        self.ops.copy_tree(src.as_ref(), dst.as_ref())
    }

    /// Create a directory, then re-apply `mode` recursively with [`chmod`](Self::chmod)
    /// since the creation mode is filtered by the umask.
    pub fn safe_mkdir(
        &self,
        path: impl AsRef<Path>,
        mode: u32,
        options: MkdirOptions,
    ) -> Result<()> {
        let path = std::path::absolute(path.as_ref())?;

        // Missing parents get the default mode; only the leaf gets `mode`
        if options.parents {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let created = std::fs::DirBuilder::new().mode(mode).create(&path);
        if let Err(e) = created {
            let tolerated = options.exist_ok
                && e.kind() == std::io::ErrorKind::AlreadyExists
                && path.is_dir();
            if !tolerated {
                return Err(e.into());
            }
        }

        let current = self.file_permissions(&path).unwrap_or_default();
        self.log.in_scope(|| {
            debug!(target: UTILITY, "Created dir [ {} ]: {}", current, path.display())
        });
        self.chmod(&path, mode, true)
    }

    /// Set `mode` on `path` (recursively unless disabled) and log the
    /// resulting permissions
    pub fn chmod(&self, path: impl AsRef<Path>, mode: u32, recursive: bool) -> Result<()> {
        let path = std::path::absolute(path.as_ref())?;
        self.ops.set_mode(&path, mode, recursive)?;

        let current = self.file_permissions(&path).unwrap_or_default();
        self.log.in_scope(|| {
            debug!(
                target: UTILITY,
                "chmod validation: permissions are now [ {} ] for {}",
                current,
                path.display()
            )
        });
        Ok(())
    }

    /// Normalize permissions below `path`: directories (or everything, when
    /// `is_executable`) get `0755`, other entries `0644`. `path` itself is
    /// left untouched.
    ///
    /// Each directory is fixed up before it is listed, so unreadable
    /// subdirectories are repaired rather than aborting the walk.
    pub fn mac_force_access_all(&self, path: impl AsRef<Path>, is_executable: bool) -> Result<()> {
        let mut pending = vec![path.as_ref().to_path_buf()];
        while let Some(dir) = pending.pop() {
            for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
                let entry = entry?;
                let descend = entry.file_type().is_dir();
                let entry = entry.into_path();
                let mode = if is_executable || entry.is_dir() {
                    DIR_MODE
                } else {
                    FILE_MODE
                };
                self.chmod(&entry, mode, false)?;
                if descend {
                    pending.push(entry);
                }
            }
        }
        Ok(())
    }
}
