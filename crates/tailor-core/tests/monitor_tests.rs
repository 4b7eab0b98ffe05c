//! Tests for liveness probing, discovery and queue processing

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tailor_core::{
    JobQueue, JobQueueEntry, Liveness, ProbeConfig, Suggestion, UpdateCoordinator, VersionLog,
    WordReplacement, discover, probe_all, process_queue,
};
use tailor_test_utils::{
    InMemoryDocumentService, ProbeBehavior, ScriptedGenerator, StaticJobSource, StaticProbe,
};
use tempfile::TempDir;

const DOC: &str = "resume";

fn fast() -> ProbeConfig {
    ProbeConfig {
        concurrency: 4,
        timeout: Duration::from_millis(200),
    }
}

#[tokio::test]
async fn timeout_counts_as_not_live() {
    let probe = StaticProbe::new()
        .with("https://a.test/1", ProbeBehavior::Live)
        .with("https://b.test/2", ProbeBehavior::Hang)
        .with("https://c.test/3", ProbeBehavior::Dead);

    let results = probe_all(
        Arc::new(probe),
        vec![
            "https://a.test/1".into(),
            "https://b.test/2".into(),
            "https://c.test/3".into(),
        ],
        fast(),
    )
    .await;

    let liveness: Vec<Liveness> = results.iter().map(|r| r.liveness).collect();
    assert_eq!(
        liveness,
        vec![Liveness::Live, Liveness::TimedOut, Liveness::Dead]
    );
    assert_eq!(results[1].url, "https://b.test/2");
}

#[tokio::test]
async fn concurrency_never_exceeds_cap() {
    let mut probe = StaticProbe::new().with_delay(Duration::from_millis(20));
    let urls: Vec<String> = (0..12).map(|n| format!("https://jobs.test/{}", n)).collect();
    for url in &urls {
        probe = probe.with(url, ProbeBehavior::Live);
    }
    let probe = Arc::new(probe);

    let results = probe_all(
        probe.clone(),
        urls,
        ProbeConfig {
            concurrency: 3,
            timeout: Duration::from_secs(5),
        },
    )
    .await;

    assert!(results.iter().all(|r| r.liveness.is_live()));
    assert_eq!(probe.calls(), 12);
    assert!(probe.peak_in_flight() <= 3, "peak was {}", probe.peak_in_flight());
}

#[tokio::test]
async fn discover_queues_only_new_live_postings() {
    let dir = TempDir::new().unwrap();
    let queue = JobQueue::new(dir.path().join("queue.json"));
    queue
        .merge(vec![JobQueueEntry::new("Acme", "https://acme.test/1", "Engineer")])
        .unwrap();

    let probe = Arc::new(
        StaticProbe::new()
            .with("https://acme.test/1", ProbeBehavior::Live)
            .with("https://globex.test/2", ProbeBehavior::Live)
            .with("https://hooli.test/3", ProbeBehavior::Dead),
    );

    let report = discover(
        &queue,
        vec![
            JobQueueEntry::new("Acme", "https://acme.test/1", "Engineer"),
            JobQueueEntry::new("Globex", "https://globex.test/2", "SRE"),
            JobQueueEntry::new("Hooli", "https://hooli.test/3", "Data"),
        ],
        probe.clone(),
        fast(),
    )
    .await
    .unwrap();

    assert_eq!(report.added, 1);
    assert_eq!(report.probed.len(), 2);
    assert_eq!(probe.calls(), 2);
    let urls: Vec<String> = queue.read().into_iter().map(|e| e.url).collect();
    assert_eq!(urls, vec!["https://acme.test/1", "https://globex.test/2"]);
}

#[tokio::test]
async fn processed_postings_are_consumed_and_failures_stay_queued() {
    let dir = TempDir::new().unwrap();
    let queue = JobQueue::new(dir.path().join("queue.json"));
    queue
        .merge(vec![
            JobQueueEntry::new("Acme", "https://acme.test/1", "Engineer"),
            JobQueueEntry::new("Globex", "https://globex.test/2", "SRE"),
        ])
        .unwrap();

    let log = VersionLog::new(dir.path().join("history.json"));
    let service = InMemoryDocumentService::new(DOC, "Wrote Python tooling.");
    let generator = ScriptedGenerator::repeating(Suggestion {
        replacements: vec![WordReplacement::new("Python", "Python and Go")],
        summary: vec![],
    });
    let source = StaticJobSource::new().with("https://acme.test/1", "Go and Python shop");
    let coordinator = UpdateCoordinator::new(&service, &generator, &log, DOC);

    let report = process_queue(&coordinator, &queue, &source).await;

    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.items[0].label, "Engineer (Acme)");

    let remaining: Vec<String> = queue.read().into_iter().map(|e| e.url).collect();
    assert_eq!(remaining, vec!["https://globex.test/2"]);

    let entries = log.read();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].company.as_deref(), Some("Acme"));
    assert_eq!(entries[0].job_url.as_deref(), Some("https://acme.test/1"));
}
