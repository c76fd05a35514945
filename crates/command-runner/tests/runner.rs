//! Tests for the logged run contract

mod common;

use command_runner::{Error, Invocation, OnFailure, OutputMode};
use common::TestRunner;

#[test]
fn test_successful_run_writes_one_record() {
    let t = TestRunner::new();
    let cmd = Invocation::builder("echo").arg("hello world").build();

    let result = t.runner.run(&cmd).unwrap();

    assert!(result.status.success());
    assert_eq!(t.invocation_records(), 1);
    let log = t.log_contents();
    assert!(log.contains("DEBUG utility"));
    assert!(log.contains("\tcmd:\techo \\\n\t\thello world"));
    // output was redirected into the log, not captured
    assert!(log.contains("hello world\n"));
    assert!(result.stdout.is_none());
}

#[test]
fn test_record_names_working_directory() {
    let t = TestRunner::new();
    let cmd = Invocation::builder("pwd").current_dir(t.path()).build();

    t.runner.run(&cmd).unwrap();

    let log = t.log_contents();
    assert!(log.contains(&format!("\tcwd:\t{}", t.path().display())));
    assert!(log.contains("\tkwargs:\tSpawnOptions"));
}

#[test]
fn test_record_precedes_command_output() {
    let t = TestRunner::new();
    let cmd = Invocation::builder("sh")
        .arg("-c")
        .arg("echo from-child; echo to-stderr >&2")
        .build();

    t.runner.run(&cmd).unwrap();

    let log = t.log_contents();
    let record = log.find("logged_run").unwrap();
    let stdout = log.find("from-child\n").unwrap();
    let stderr = log.find("to-stderr\n").unwrap();
    assert!(record < stdout);
    assert!(record < stderr);
}

#[test]
fn test_nonzero_exit_raises_generic_failure_and_tails_log() {
    let t = TestRunner::new();
    let cmd = Invocation::builder("sh").arg("-c").arg("echo about-to-fail; exit 3").build();

    let err = t.runner.run(&cmd).unwrap_err();

    assert!(matches!(err, Error::LoggedRunFailed));
    let log = t.log_contents();
    assert!(log.contains("tailing log file"));
    assert!(log.contains("end of tailing of the log file"));
    assert!(log.contains("INFO tail: about-to-fail"));
    assert!(log.contains("ERROR utility: return code: 3"));
}

#[test]
fn test_tail_is_bounded_to_forty_lines() {
    let t = TestRunner::new();
    let cmd = Invocation::builder("sh")
        .arg("-c")
        .arg("for i in $(seq 1 100); do echo noisy-$i; done; exit 1")
        .build();

    assert!(t.runner.run(&cmd).is_err());

    let log = t.log_contents();
    let echoed = log.lines().filter(|l| l.contains(" tail: noisy-")).count();
    assert_eq!(echoed, 40);
    assert!(log.contains(" tail: noisy-100"));
    assert!(!log.contains(" tail: noisy-60\n"));
}

#[test]
fn test_short_log_is_echoed_whole() {
    let t = TestRunner::new();
    let cmd = Invocation::builder("sh")
        .arg("-c")
        .arg("echo first; echo second; exit 1")
        .build();

    assert!(t.runner.run(&cmd).is_err());

    let log = t.log_contents();
    let lines: Vec<&str> = log.lines().collect();
    let start = lines.iter().position(|l| l.contains("tailing log file")).unwrap();
    let end = lines
        .iter()
        .position(|l| l.contains("end of tailing of the log file"))
        .unwrap();
    assert!(start < 40);
    // every line written before the tail started is echoed, no more
    assert_eq!(end - start - 1, start);
    assert!(lines[start + 1..end].iter().all(|l| l.contains(" tail: ")));
    assert!(lines[end - 1].ends_with(" tail: second"));
}

#[test]
fn test_tail_length_is_configurable() {
    let t = TestRunner::new();
    let runner = t.runner.clone().with_tail_lines(5);
    let cmd = Invocation::builder("sh")
        .arg("-c")
        .arg("for i in $(seq 1 20); do echo noisy-$i; done; exit 1")
        .build();

    assert!(runner.run(&cmd).is_err());

    let echoed = t
        .log_contents()
        .lines()
        .filter(|l| l.contains(" tail: noisy-"))
        .count();
    assert_eq!(echoed, 5);
}

#[test]
fn test_on_failure_message_is_logged() {
    let t = TestRunner::new();
    let cmd = Invocation::builder("false").on_failure("signing step failed").build();

    let err = t.runner.run(&cmd).unwrap_err();

    assert!(err.is_logged_run_failure());
    assert!(t.log_contents().contains("ERROR utility: signing step failed"));
}

#[test]
fn test_on_failure_replacement_error_is_raised() {
    let t = TestRunner::new();
    let cmd = Invocation::builder("false")
        .on_failure(OnFailure::raise(std::io::Error::other("artefact not wrapped")))
        .build();

    let err = t.runner.run(&cmd).unwrap_err();

    assert!(matches!(err, Error::Replaced(_)));
    assert_eq!(err.to_string(), "artefact not wrapped");
    // the failure is still logged before the replacement leaves the runner
    assert!(t.log_contents().contains("return code: 1"));
}

#[test]
fn test_missing_program_folds_into_generic_failure() {
    let t = TestRunner::new();
    let cmd = Invocation::new("this_command_does_not_exist_12345");

    let err = t.runner.run(&cmd).unwrap_err();

    assert!(matches!(err, Error::LoggedRunFailed));
    let log = t.log_contents();
    assert!(log.contains("Runner::run(...) called from"));
    assert!(log.contains("tests/runner.rs"));
    assert!(log.contains("NotFound"));
    // no result, so no return code
    assert!(!log.contains("return code"));
    assert_eq!(t.invocation_records(), 1);
}

#[test]
fn test_capture_mode_returns_output() {
    let t = TestRunner::new();
    let cmd = Invocation::builder("sh")
        .arg("-c")
        .arg("printf 'out\\r\\n'; printf 'err\\n' >&2")
        .output(OutputMode::Capture)
        .build();

    let result = t.runner.run(&cmd).unwrap();

    assert_eq!(result.stdout.as_deref(), Some("out\n"));
    assert_eq!(result.stderr.as_deref(), Some("err\n"));
    assert!(!t.log_contents().contains("out\n"));
}

#[test]
fn test_environment_is_passed_through() {
    let t = TestRunner::new();
    let cmd = Invocation::builder("sh")
        .arg("-c")
        .arg("echo value=$BTB_TEST_VAR")
        .env("BTB_TEST_VAR", "forty-two")
        .output(OutputMode::Capture)
        .build();

    let result = t.runner.run(&cmd).unwrap();

    assert_eq!(result.stdout.as_deref(), Some("value=forty-two\n"));
    assert!(t.log_contents().contains("BTB_TEST_VAR"));
}

#[test]
fn test_info_message_is_not_logged() {
    let t = TestRunner::new();
    let cmd = Invocation::builder("true").info_message("Building artefacts").build();

    t.runner.run(&cmd).unwrap();

    assert!(!t.log_contents().contains("Building artefacts"));
}

#[test]
fn test_check_returns_captured_output() {
    let t = TestRunner::new();
    let cmd = Invocation::builder("echo").arg("checked").build();

    let output = t.runner.check(&cmd).unwrap();

    assert_eq!(output.as_deref(), Some("checked\n"));
    assert_eq!(t.invocation_records(), 1);
}

#[test]
fn test_check_nonzero_exit_is_process_failure() {
    let t = TestRunner::new();
    let cmd = Invocation::builder("sh").arg("-c").arg("echo partial; exit 2").build();

    let err = t.runner.check(&cmd).unwrap_err();

    match err {
        Error::ProcessFailed { status, output, .. } => {
            assert_eq!(status.code, Some(2));
            assert_eq!(output, "partial\n");
        }
        other => panic!("expected ProcessFailed, got {other:?}"),
    }
    // check does not tail the log
    assert!(!t.log_contents().contains("tailing log file"));
}

#[test]
fn test_check_missing_program_is_swallowed() {
    let t = TestRunner::new();
    let cmd = Invocation::new("this_command_does_not_exist_12345");

    let output = t.runner.check(&cmd).unwrap();

    assert!(output.is_none());
    assert!(t.log_contents().contains("Runner::check(...) called from"));
}
