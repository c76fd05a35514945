use anyhow::{Context, Result};
use command_runner::{Invocation, OutputMode, Runner};
use std::path::PathBuf;

fn invocation(command: Vec<String>, cwd: Option<PathBuf>) -> Result<Invocation> {
    let mut invocation = Invocation::from_tokens(command)?;
    if let Some(dir) = cwd {
        invocation.current_dir(dir);
    }
    Ok(invocation)
}

pub fn run(
    runner: &Runner,
    command: Vec<String>,
    cwd: Option<PathBuf>,
    stream: bool,
    message: Option<String>,
    on_failure: Option<String>,
) -> Result<()> {
    let mut invocation = invocation(command, cwd)?;
    if stream {
        invocation.output(OutputMode::Inherit);
    }
    if let Some(message) = message {
        invocation.info_message(message);
    }
    if let Some(on_failure) = on_failure {
        invocation.on_failure(on_failure);
    }

    runner
        .run(&invocation)
        .with_context(|| format!("see {}", runner.log().path().display()))?;
    Ok(())
}

pub fn check(runner: &Runner, command: Vec<String>, cwd: Option<PathBuf>) -> Result<()> {
    let invocation = invocation(command, cwd)?;

    match runner.check(&invocation)? {
        Some(output) => print!("{output}"),
        None => anyhow::bail!(
            "{} not found, see {}",
            invocation.get_program().to_string_lossy(),
            runner.log().path().display()
        ),
    }
    Ok(())
}

/// Total attempts made for `retries` retries
fn attempts(retries: u32) -> u32 {
    retries.saturating_add(1)
}

pub fn retry(runner: &Runner, command: Vec<String>, cwd: Option<PathBuf>, retries: u32) -> Result<()> {
    let invocation = invocation(command, cwd)?;

    runner
        .run_with_retry(&invocation, retries)
        .with_context(|| {
            format!(
                "gave up after {} attempts, see {}",
                attempts(retries),
                runner.log().path().display()
            )
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempts_counts_first_run() {
        assert_eq!(attempts(0), 1);
        assert_eq!(attempts(3), 4);
    }

    #[test]
    fn test_attempts_saturates() {
        assert_eq!(attempts(u32::MAX), u32::MAX);
    }
}
