//! Tests for bounded retries

mod common;

use command_runner::{Error, Invocation, OnFailure};
use common::TestRunner;

/// A command that appends one line per attempt to `attempts` and then
/// fails until the file holds `succeed_on` lines
fn counting_command(t: &TestRunner, succeed_on: usize) -> Invocation {
    let script = format!(
        "echo attempt >> attempts; [ $(wc -l < attempts) -ge {succeed_on} ]"
    );
    Invocation::builder("sh")
        .arg("-c")
        .arg(script)
        .current_dir(t.path())
        .build()
}

fn attempts(t: &TestRunner) -> usize {
    std::fs::read_to_string(t.path().join("attempts"))
        .unwrap_or_default()
        .lines()
        .count()
}

#[test]
fn test_exhausted_retries_make_n_plus_one_attempts() {
    let t = TestRunner::new();
    let cmd = counting_command(&t, 100);

    let err = t.runner.run_with_retry(&cmd, 3).unwrap_err();

    assert!(matches!(err, Error::LoggedRunFailed));
    assert_eq!(attempts(&t), 4);
    assert_eq!(t.invocation_records(), 4);
    assert_eq!(t.own_lines("ERROR utility: return code: 1"), 4);
}

#[test]
fn test_first_success_stops_retrying() {
    let t = TestRunner::new();
    let cmd = counting_command(&t, 1);

    t.runner.run_with_retry(&cmd, 5).unwrap();

    assert_eq!(attempts(&t), 1);
    assert_eq!(t.invocation_records(), 1);
}

#[test]
fn test_success_on_a_later_attempt() {
    let t = TestRunner::new();
    let cmd = counting_command(&t, 3);

    let result = t.runner.run_with_retry(&cmd, 5).unwrap();

    assert!(result.status.success());
    assert_eq!(attempts(&t), 3);
}

#[test]
fn test_zero_retries_is_a_single_attempt() {
    let t = TestRunner::new();
    let cmd = counting_command(&t, 100);

    assert!(t.runner.run_with_retry(&cmd, 0).is_err());
    assert_eq!(attempts(&t), 1);
}

#[test]
fn test_replacement_error_is_not_retried() {
    let t = TestRunner::new();
    let mut cmd = counting_command(&t, 100);
    cmd.on_failure(OnFailure::raise(std::io::Error::other("fatal")));

    let err = t.runner.run_with_retry(&cmd, 3).unwrap_err();

    assert!(matches!(err, Error::Replaced(_)));
    assert_eq!(attempts(&t), 1);
}

#[test]
fn test_message_failure_is_retried() {
    let t = TestRunner::new();
    let mut cmd = counting_command(&t, 100);
    cmd.on_failure("still broken");

    assert!(t.runner.run_with_retry(&cmd, 2).is_err());
    assert_eq!(attempts(&t), 3);
    assert_eq!(t.own_lines("ERROR utility: still broken"), 3);
}
