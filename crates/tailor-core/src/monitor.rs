//! Job posting monitoring
//!
//! Discovery merges freshly found postings into the [`JobQueue`], keeping
//! only those whose URL still answers. Processing drains the queue through
//! ordinary update cycles, one posting at a time.

use std::sync::Arc;

use crate::Result;
use crate::probe::{LinkProbe, ProbeConfig, ProbeResult, probe_all};
use crate::queue::{JobQueue, JobQueueEntry};
use crate::source::JobSource;
use crate::update::{BatchItem, BatchReport, UpdateCoordinator, UpdateRequest};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoverReport {
    /// Liveness of every posting not already queued
    pub probed: Vec<ProbeResult>,
    /// Postings added to the queue
    pub added: usize,
}

/// Probe new postings from `discovered` and queue the live ones.
///
/// Postings already in the queue are skipped without probing.
pub async fn discover(
    queue: &JobQueue,
    discovered: Vec<JobQueueEntry>,
    probe: Arc<dyn LinkProbe>,
    config: ProbeConfig,
) -> Result<DiscoverReport> {
    let queued: Vec<String> = queue.read().into_iter().map(|e| e.url).collect();
    let fresh: Vec<JobQueueEntry> = discovered
        .into_iter()
        .filter(|e| !queued.contains(&e.url))
        .collect();

    let urls = fresh.iter().map(|e| e.url.clone()).collect();
    let probed = probe_all(probe, urls, config).await;

    let live: Vec<JobQueueEntry> = fresh
        .into_iter()
        .zip(&probed)
        .filter(|(_, result)| result.liveness.is_live())
        .map(|(entry, _)| entry)
        .collect();

    let added = queue.merge(live)?;
    tracing::info!(probed = probed.len(), added, "discovery merged into queue");
    Ok(DiscoverReport { probed, added })
}

/// Run an update cycle for every queued posting, in queue order.
///
/// A posting is consumed only after its cycle succeeds; failed postings stay
/// queued for a later run.
pub async fn process_queue(
    coordinator: &UpdateCoordinator<'_>,
    queue: &JobQueue,
    source: &dyn JobSource,
) -> BatchReport {
    let mut report = BatchReport::default();

    for entry in queue.read() {
        let request = UpdateRequest::new(String::new(), entry.tags());
        let label = request.label();

        let result = match source.describe(&entry.url).await {
            Ok(description) => {
                let request = UpdateRequest {
                    job_description: description,
                    ..request
                };
                coordinator.run(&request).await
            }
            Err(e) => Err(e),
        };

        let result = match result {
            Ok(outcome) => queue.consume(&entry.url).map(|_| outcome),
            Err(e) => {
                tracing::warn!(url = %entry.url, error = %e, "queued posting failed, leaving it queued");
                Err(e)
            }
        };

        report.items.push(BatchItem { label, result });
    }

    report
}
