//! File operations that shell out to the system `cp` and `chmod`

use std::path::Path;

use crate::error::Result;
use crate::invocation::Invocation;
use crate::runner::Runner;

use super::FileOps;

/// Runs `cp` and `chmod` through a [`Runner`], so every call is logged and
/// failures surface as the runner's errors.
#[derive(Debug, Clone)]
pub struct ShellFileOps {
    runner: Runner,
}

impl ShellFileOps {
    /// Create a backend running commands through `runner`
    pub fn new(runner: Runner) -> Self {
        Self { runner }
    }

    /// Get a reference to the runner
    pub fn runner(&self) -> &Runner {
        &self.runner
    }
}

impl FileOps for ShellFileOps {
    fn copy(&self, src: &Path, dst: &Path) -> Result<()> {
        let cmd = Invocation::builder("cp").arg(src).arg(dst).build();
        self.runner.run(&cmd)?;
        Ok(())
    }

    fn copy_tree(&self, src: &Path, dst: &Path) -> Result<()> {
        let cmd = Invocation::builder("cp").arg("-R").arg(src).arg(dst).build();
        self.runner.run(&cmd)?;
        Ok(())
    }

    fn set_mode(&self, path: &Path, mode: u32, recursive: bool) -> Result<()> {
        let mut cmd = Invocation::new("chmod");
        if recursive {
            cmd.arg("-R");
        }
        cmd.arg(format!("{mode:o}")).arg(path);
        self.runner.run(&cmd)?;
        Ok(())
    }
}
