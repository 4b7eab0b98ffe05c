//! Tests for the subprocess-backed generator
//!
//! Each generator is a short `sh -c` script, so these tests need a POSIX shell.

use std::time::Duration;

use pretty_assertions::assert_eq;
use tailor_core::{CommandGenerator, Error, Generator, ServiceErrorKind, suggest_with_retry};
use tempfile::TempDir;

const VALID: &str = r#"{"replacements":[{"original":"Go","replacement":"Rust"}],"summary":["Lead with Rust"]}"#;

fn generator(script: &str, args: &[&str]) -> CommandGenerator {
    let mut argv = vec!["sh".to_string(), "-c".to_string(), script.to_string(), "sh".to_string()];
    argv.extend(args.iter().map(|a| a.to_string()));
    CommandGenerator::new(argv).unwrap()
}

fn kind_of(err: &Error) -> Option<ServiceErrorKind> {
    match err {
        Error::ExternalService { kind, .. } => Some(*kind),
        _ => None,
    }
}

fn large_resume() -> String {
    "Go developer with five years of backend work.\n".repeat(6_000)
}

#[tokio::test]
async fn generator_that_ignores_stdin_still_succeeds() {
    let script = format!("echo '{}'", VALID);
    let suggestion = generator(&script, &[])
        .suggest(&large_resume(), "Rust role")
        .await
        .unwrap();

    assert_eq!(suggestion.replacements[0].replacement, "Rust");
}

#[tokio::test]
async fn large_output_before_reading_stdin_does_not_stall() {
    let script = format!("yes filler | head -n 40000; echo '{}'; cat > /dev/null", VALID);
    let result = tokio::time::timeout(
        Duration::from_secs(30),
        generator(&script, &[]).suggest(&large_resume(), "Rust role"),
    )
    .await
    .expect("generator run stalled");

    assert_eq!(result.unwrap().summary, vec!["Lead with Rust".to_string()]);
}

#[tokio::test]
async fn exit_codes_classify_failures() {
    let cases = [
        ("cat > /dev/null; echo 'bad key' >&2; exit 2", ServiceErrorKind::Authentication),
        ("cat > /dev/null; exit 3", ServiceErrorKind::Quota),
        ("cat > /dev/null; echo 'no such model' >&2; exit 7", ServiceErrorKind::Request),
    ];

    for (script, expected) in cases {
        let err = generator(script, &[])
            .suggest("Jane Doe", "Rust role")
            .await
            .unwrap_err();
        assert_eq!(kind_of(&err), Some(expected), "script: {}", script);
        assert!(!err.is_retryable());
    }
}

#[tokio::test]
async fn stderr_becomes_the_error_message() {
    let err = generator("echo 'no such model' >&2; exit 7", &[])
        .suggest("Jane Doe", "Rust role")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no such model"), "got: {}", err);
}

#[tokio::test]
async fn undecodable_output_is_retried_until_attempts_run_out() {
    let dir = TempDir::new().unwrap();
    let counter = dir.path().join("calls");

    let err = suggest_with_retry(
        &generator(
            r#"echo call >> "$1"; echo 'not json at all'"#,
            &[counter.to_str().unwrap()],
        ),
        "Jane Doe",
        "Rust role",
        3,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::Parse { .. }));
    let calls = std::fs::read_to_string(&counter).unwrap();
    assert_eq!(calls.lines().count(), 3);
}

#[tokio::test]
async fn later_attempt_can_recover_from_bad_output() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("seen");
    let script = format!(
        r#"if [ -f "$1" ]; then echo 'Here you go: {}'; else touch "$1"; echo 'garbled'; fi"#,
        VALID
    );

    let suggestion = suggest_with_retry(
        &generator(&script, &[marker.to_str().unwrap()]),
        "Jane Doe",
        "Rust role",
        3,
    )
    .await
    .unwrap();

    assert_eq!(suggestion.replacements.len(), 1);
}
