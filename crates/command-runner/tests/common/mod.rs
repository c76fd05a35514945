//! Shared helpers for command-runner integration tests

#![allow(dead_code)]

use command_runner::{LogContext, Runner};
use std::path::Path;
use tempfile::TempDir;

/// A runner logging into its own temporary directory
pub struct TestRunner {
    pub dir: TempDir,
    pub runner: Runner,
}

impl TestRunner {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let log = LogContext::open(dir.path().join("btb.log")).expect("open log");
        Self {
            runner: Runner::new(log),
            dir,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn log_contents(&self) -> String {
        std::fs::read_to_string(self.runner.log().path()).unwrap_or_default()
    }

    /// Lines written on the given target, excluding lines echoed by a tail
    pub fn own_lines(&self, needle: &str) -> usize {
        self.log_contents()
            .lines()
            .filter(|l| l.contains(needle) && !l.contains(" tail: "))
            .count()
    }

    /// Number of invocation records written so far
    pub fn invocation_records(&self) -> usize {
        self.own_lines("DEBUG utility: logged_run")
    }
}
