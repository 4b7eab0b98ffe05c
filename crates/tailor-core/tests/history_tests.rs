//! Tests for the version log store

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tailor_core::{Error, JobTags, Selector, VersionLog, VersionLogEntry};
use tempfile::TempDir;

fn tags(company: &str, title: &str) -> JobTags {
    JobTags::new(Some(company.into()), Some(title.into()), None)
}

fn seeded_log(dir: &TempDir) -> VersionLog {
    let log = VersionLog::new(dir.path().join("history.json"));
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    for (n, (rev, company)) in [("r1", "Initech"), ("r2", "Globex"), ("r3", "Hooli")]
        .into_iter()
        .enumerate()
    {
        let entry = VersionLogEntry::update(
            rev,
            tags(company, "Backend Engineer"),
            vec![format!("tailored for {}", company)],
        )
        .with_timestamp(base + chrono::Duration::hours(n as i64));
        log.append(entry).unwrap();
    }
    log
}

#[test]
fn missing_log_reads_as_empty() {
    let dir = TempDir::new().unwrap();
    let log = VersionLog::new(dir.path().join("history.json"));
    assert!(log.read().is_empty());
}

#[test]
fn append_then_read_equals_prior_read_plus_entry() {
    let dir = TempDir::new().unwrap();
    let log = seeded_log(&dir);
    let before = log.read();

    let entry = VersionLogEntry::update("r4", tags("Umbrella", "SRE"), vec!["x".into()]);
    let idx = log.append(entry.clone()).unwrap();

    let mut expected = before;
    expected.push(entry);
    assert_eq!(idx, 3);
    assert_eq!(log.read(), expected);
}

#[test]
fn persisted_form_uses_camel_case_keys() {
    let dir = TempDir::new().unwrap();
    let log = seeded_log(&dir);
    log.append(VersionLogEntry::revert("r4", "r1")).unwrap();

    let raw = std::fs::read_to_string(log.path().to_native()).unwrap();
    assert!(raw.contains("\"revisionId\""));
    assert!(raw.contains("\"jobTitle\""));
    assert!(raw.contains("\"isRevert\": true"));
}

#[test]
fn corrupt_log_reads_as_empty_and_is_replaced_on_append() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history.json");
    std::fs::write(&path, "{ not json").unwrap();

    let log = VersionLog::new(path.as_path());
    assert!(log.read().is_empty());

    log.append(VersionLogEntry::update("r1", JobTags::default(), vec![]))
        .unwrap();
    assert_eq!(log.read().len(), 1);
}

#[test]
fn tag_patches_only_named_field() {
    let dir = TempDir::new().unwrap();
    let log = seeded_log(&dir);
    let before = log.read();

    let patched = log
        .patch(
            &Selector::Index(1),
            &JobTags::new(Some("Acme".into()), None, None),
        )
        .unwrap();

    let after = log.read();
    assert_eq!(patched, after[1]);
    assert_eq!(after[1].company.as_deref(), Some("Acme"));
    assert_eq!(after[1].job_title, before[1].job_title);
    assert_eq!(after[1].revision_id, before[1].revision_id);
    assert_eq!(after[1].timestamp, before[1].timestamp);
    assert_eq!(after[1].changes, before[1].changes);
    assert_eq!(after[1].is_revert(), before[1].is_revert());
    assert_eq!(after[0], before[0]);
    assert_eq!(after[2], before[2]);
}

#[rstest]
#[case("0", 0)]
#[case("2", 2)]
#[case("r2", 1)]
fn selector_tokens_resolve(#[case] token: &str, #[case] expected: usize) {
    let dir = TempDir::new().unwrap();
    let log = seeded_log(&dir);
    let selector: Selector = token.parse().unwrap();

    let (idx, _) = log.resolve(&selector).unwrap();
    assert_eq!(idx, expected);
}

#[rstest]
#[case("7")]
#[case("r99")]
fn unknown_selector_is_not_found(#[case] token: &str) {
    let dir = TempDir::new().unwrap();
    let log = seeded_log(&dir);
    let selector: Selector = token.parse().unwrap();

    let err = log
        .patch(&selector, &JobTags::new(Some("Acme".into()), None, None))
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
    assert_eq!(log.read().len(), 3);
}

#[test]
fn search_matches_metadata_case_insensitively() {
    let dir = TempDir::new().unwrap();
    let log = seeded_log(&dir);

    let hits: Vec<usize> = log.search("GLOBEX").into_iter().map(|(i, _)| i).collect();
    assert_eq!(hits, vec![1]);

    let hits = log.search("backend engineer");
    assert_eq!(hits.len(), 3);
    assert!(log.search("no such thing").is_empty());
}
