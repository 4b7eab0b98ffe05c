//! In-memory collaborators for coordinator tests.
//!
//! Every double records how it was called so tests can assert on side
//! effects (or their absence) without touching the filesystem.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tailor_core::{
    DocumentService, Error, Generator, JobSource, LinkProbe, Result, Revision, RevisionContent,
    ServiceErrorKind, Suggestion,
};

struct DocState {
    text: String,
    revisions: Vec<Revision>,
    snapshots: HashMap<String, String>,
    calls: Vec<String>,
}

/// Single-document service held in memory.
///
/// Revision ids are `r0` (the baseline), `r1`, `r2`, ... in creation order.
pub struct InMemoryDocumentService {
    document_id: String,
    state: Mutex<DocState>,
    serves_history: bool,
    fail_apply: Option<ServiceErrorKind>,
    fail_overwrite: Option<ServiceErrorKind>,
}

impl InMemoryDocumentService {
    /// A document whose baseline revision `r0` holds `text`.
    pub fn new(document_id: &str, text: &str) -> Self {
        let service = Self {
            document_id: document_id.to_string(),
            state: Mutex::new(DocState {
                text: String::new(),
                revisions: Vec::new(),
                snapshots: HashMap::new(),
                calls: Vec::new(),
            }),
            serves_history: true,
            fail_apply: None,
            fail_overwrite: None,
        };
        service.push_revision(text);
        service
    }

    /// Serve every revision's content as [`RevisionContent::CurrentFallback`].
    pub fn without_history(mut self) -> Self {
        self.serves_history = false;
        self
    }

    /// Make `apply_text_substitutions` fail with `kind`.
    pub fn failing_apply(mut self, kind: ServiceErrorKind) -> Self {
        self.fail_apply = Some(kind);
        self
    }

    /// Make `overwrite_body` fail with `kind`.
    pub fn failing_overwrite(mut self, kind: ServiceErrorKind) -> Self {
        self.fail_overwrite = Some(kind);
        self
    }

    /// Record a revision holding `text`, as an out-of-band edit would.
    pub fn push_revision(&self, text: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let n = state.revisions.len();
        let id = format!("r{}", n);
        state.revisions.push(Revision {
            id: id.clone(),
            modified_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + chrono::Duration::minutes(n as i64),
            mime_type: "text/plain".to_string(),
        });
        state.snapshots.insert(id.clone(), text.to_string());
        state.text = text.to_string();
        id
    }

    /// Current live text.
    pub fn text(&self) -> String {
        self.state.lock().unwrap().text.clone()
    }

    pub fn revision_ids(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.revisions.iter().map(|r| r.id.clone()).collect()
    }

    /// Names of the trait methods called so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of mutating calls (substitutions and overwrites).
    pub fn mutation_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| *c == "apply_text_substitutions" || *c == "overwrite_body")
            .count()
    }

    fn enter(&self, call: &str, document_id: &str) -> Result<()> {
        self.state.lock().unwrap().calls.push(call.to_string());
        if document_id == self.document_id {
            Ok(())
        } else {
            Err(Error::document(
                ServiceErrorKind::Request,
                format!("document '{}' not found", document_id),
            ))
        }
    }
}

#[async_trait]
impl DocumentService for InMemoryDocumentService {
    async fn export_text(&self, document_id: &str) -> Result<String> {
        self.enter("export_text", document_id)?;
        Ok(self.text())
    }

    async fn list_revisions(&self, document_id: &str) -> Result<Vec<Revision>> {
        self.enter("list_revisions", document_id)?;
        Ok(self.state.lock().unwrap().revisions.clone())
    }

    async fn get_revision_content(
        &self,
        document_id: &str,
        revision_id: &str,
    ) -> Result<RevisionContent> {
        self.enter("get_revision_content", document_id)?;
        let state = self.state.lock().unwrap();
        let snapshot = state.snapshots.get(revision_id).ok_or_else(|| {
            Error::document(
                ServiceErrorKind::Request,
                format!("revision '{}' not found", revision_id),
            )
        })?;
        if self.serves_history {
            Ok(RevisionContent::Historical(snapshot.clone()))
        } else {
            Ok(RevisionContent::CurrentFallback(state.text.clone()))
        }
    }

    async fn apply_text_substitutions(
        &self,
        document_id: &str,
        pairs: &[(String, String)],
    ) -> Result<usize> {
        self.enter("apply_text_substitutions", document_id)?;
        if let Some(kind) = self.fail_apply {
            return Err(Error::document(kind, "substitution rejected"));
        }

        let mut text = self.text();
        let mut changed = 0;
        for (original, replacement) in pairs {
            changed += text.matches(original.as_str()).count();
            text = text.replace(original.as_str(), replacement);
        }
        self.push_revision(&text);
        Ok(changed)
    }

    async fn overwrite_body(&self, document_id: &str, text: &str) -> Result<()> {
        self.enter("overwrite_body", document_id)?;
        if let Some(kind) = self.fail_overwrite {
            return Err(Error::document(kind, "overwrite rejected"));
        }
        self.push_revision(text);
        Ok(())
    }
}

/// Generator that replays a script of results.
///
/// Once the script is exhausted it returns the repeating suggestion, if one
/// was set, or a request error.
#[derive(Default)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<Suggestion>>>,
    repeating: Option<Suggestion>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every call with `suggestion`.
    pub fn repeating(suggestion: Suggestion) -> Self {
        Self {
            repeating: Some(suggestion),
            ..Self::default()
        }
    }

    pub fn then_ok(self, suggestion: Suggestion) -> Self {
        self.script.lock().unwrap().push_back(Ok(suggestion));
        self
    }

    pub fn then_err(self, error: Error) -> Self {
        self.script.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn suggest(&self, _resume_text: &str, _job_description: &str) -> Result<Suggestion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        self.repeating.clone().ok_or_else(|| {
            Error::generator(ServiceErrorKind::Request, "generator script exhausted")
        })
    }
}

/// How [`StaticProbe`] answers for one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeBehavior {
    Live,
    Dead,
    /// Never answers; only a timeout ends the probe
    Hang,
}

/// Link probe with fixed answers per URL. Unknown URLs are dead.
#[derive(Default)]
pub struct StaticProbe {
    answers: HashMap<String, ProbeBehavior>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl StaticProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, behavior: ProbeBehavior) -> Self {
        self.answers.insert(url.to_string(), behavior);
        self
    }

    /// Wait `delay` before answering, so concurrent probes overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Highest number of probes observed in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LinkProbe for StaticProbe {
    async fn is_live(&self, url: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let behavior = self
            .answers
            .get(url)
            .copied()
            .unwrap_or(ProbeBehavior::Dead);
        if behavior == ProbeBehavior::Hang {
            std::future::pending::<()>().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        behavior == ProbeBehavior::Live
    }
}

/// Job source with fixed descriptions per URL. Unknown URLs fail.
#[derive(Default)]
pub struct StaticJobSource {
    descriptions: HashMap<String, String>,
}

impl StaticJobSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, description: &str) -> Self {
        self.descriptions
            .insert(url.to_string(), description.to_string());
        self
    }
}

#[async_trait]
impl JobSource for StaticJobSource {
    async fn describe(&self, url: &str) -> Result<String> {
        self.descriptions.get(url).cloned().ok_or_else(|| {
            Error::job_source(ServiceErrorKind::Request, format!("no posting at {}", url))
        })
    }
}
