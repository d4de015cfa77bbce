//! Analysis session: the per-action request cycle behind the dashboard.
//!
//! Each action kind moves `idle -> submitting -> idle`, and a second
//! submission of the same kind while one is outstanding is rejected with
//! [`SessionError::Busy`]. After a successful analysis the similar-articles
//! lookup runs as a best-effort background task with its own
//! [`LookupStatus`]; its failures are logged and never surfaced as notices.
//! There is no cancellation: a stale lookup that finishes after a newer
//! submission still writes its result (last write wins).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::AnalysisBackend;
use crate::error::SessionError;
use crate::normalize::normalize_analysis;
use crate::types::{
    ActionKind, AnalysisInput, AnalysisResult, LookupStatus, Notice, RequestPhase, SimilarArticle,
};

/// Observer for session events. The CLI prints them; tests record them.
#[async_trait]
pub trait SessionCallback: Send + Sync {
    /// A user-facing notice (success or failure of a primary action).
    async fn on_notice(&self, notice: &Notice);

    /// An action entered or left the `submitting` phase.
    async fn on_phase_change(&self, _action: ActionKind, _phase: RequestPhase) {}

    /// The similar-articles lookup changed status.
    async fn on_similar_update(&self, _status: LookupStatus, _articles: &[SimilarArticle]) {}
}

/// A callback that ignores every event.
pub struct NoOpCallback;

#[async_trait]
impl SessionCallback for NoOpCallback {
    async fn on_notice(&self, _notice: &Notice) {}
}

/// UI state for one view. Fresh values replace old ones on each submit.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub analyze_phase: RequestPhase,
    pub summarize_phase: RequestPhase,
    pub submitted: Option<String>,
    pub analysis: Option<AnalysisResult>,
    /// Related articles carried by the analysis response itself.
    pub related: Vec<SimilarArticle>,
    /// Articles from the `/similar` lookup.
    pub similar: Vec<SimilarArticle>,
    pub similar_status: LookupStatus,
    pub summary: Option<String>,
    /// Error message of the last failed analysis.
    pub error: Option<String>,
    /// Bumped each time a similar-articles lookup starts.
    lookup_generation: u64,
}

impl SessionState {
    pub fn phase(&self, action: ActionKind) -> RequestPhase {
        match action {
            ActionKind::Analyze => self.analyze_phase,
            ActionKind::Summarize => self.summarize_phase,
            ActionKind::Similar if self.similar_status == LookupStatus::Loading => {
                RequestPhase::Submitting
            }
            ActionKind::Similar => RequestPhase::Idle,
        }
    }

    fn set_phase(&mut self, action: ActionKind, phase: RequestPhase) {
        match action {
            ActionKind::Analyze => self.analyze_phase = phase,
            ActionKind::Summarize => self.summarize_phase = phase,
            ActionKind::Similar => {}
        }
    }

    /// Articles to show in the related-articles panel: the lookup's list
    /// when it found any, otherwise whatever the analysis response carried.
    pub fn display_articles(&self) -> &[SimilarArticle] {
        if self.similar.is_empty() {
            &self.related
        } else {
            &self.similar
        }
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Puts an action back to `idle` when dropped, so an early return or a
/// dropped future cannot leave the trigger disabled.
struct PhaseGuard {
    state: Arc<Mutex<SessionState>>,
    action: ActionKind,
}

impl Drop for PhaseGuard {
    fn drop(&mut self) {
        lock(&self.state).set_phase(self.action, RequestPhase::Idle);
    }
}

/// Held by a running similar-articles lookup. If the lookup is dropped
/// before it writes a result, the status goes back to `idle` unless a newer
/// lookup has started since.
struct LookupGuard {
    state: Arc<Mutex<SessionState>>,
    generation: u64,
}

impl LookupGuard {
    /// Mark a new lookup as loading. The caller holds the state lock.
    fn start(shared: &Arc<Mutex<SessionState>>, state: &mut SessionState) -> Self {
        state.lookup_generation += 1;
        state.similar_status = LookupStatus::Loading;
        state.similar.clear();
        Self {
            state: Arc::clone(shared),
            generation: state.lookup_generation,
        }
    }
}

impl Drop for LookupGuard {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        if state.similar_status == LookupStatus::Loading
            && state.lookup_generation == self.generation
        {
            state.similar_status = LookupStatus::Idle;
        }
    }
}

type LookupOutcome = (LookupStatus, Vec<SimilarArticle>);

/// Drives analysis, summarization and similar-article lookups against a
/// backend and keeps the resulting display state.
pub struct AnalysisSession {
    backend: Arc<dyn AnalysisBackend>,
    callback: Arc<dyn SessionCallback>,
    state: Arc<Mutex<SessionState>>,
    similar_task: Mutex<Option<JoinHandle<LookupOutcome>>>,
}

impl AnalysisSession {
    pub fn new(backend: Arc<dyn AnalysisBackend>, callback: Arc<dyn SessionCallback>) -> Self {
        Self {
            backend,
            callback,
            state: Arc::new(Mutex::new(SessionState::default())),
            similar_task: Mutex::new(None),
        }
    }

    pub fn backend(&self) -> &Arc<dyn AnalysisBackend> {
        &self.backend
    }

    /// A copy of the current display state.
    pub fn snapshot(&self) -> SessionState {
        lock(&self.state).clone()
    }

    pub fn phase(&self, action: ActionKind) -> RequestPhase {
        lock(&self.state).phase(action)
    }

    fn begin(&self, action: ActionKind) -> Result<PhaseGuard, SessionError> {
        let mut state = lock(&self.state);
        if state.phase(action) == RequestPhase::Submitting {
            debug!(%action, "Rejected submission while a request is in flight");
            return Err(SessionError::Busy { action });
        }
        state.set_phase(action, RequestPhase::Submitting);
        Ok(PhaseGuard {
            state: Arc::clone(&self.state),
            action,
        })
    }

    async fn reject_empty(&self, action: ActionKind) -> SessionError {
        let err = SessionError::EmptyInput { action };
        self.callback
            .on_notice(&Notice::error("Input Required", err.to_string()))
            .await;
        err
    }

    /// Analyze article text or a URL.
    ///
    /// Blank input is rejected before any network call. On success the
    /// similar-articles lookup is started in the background; use
    /// [`AnalysisSession::wait_for_similar`] to await it.
    pub async fn analyze(&self, raw: &str) -> Result<AnalysisResult, SessionError> {
        if raw.trim().is_empty() {
            return Err(self.reject_empty(ActionKind::Analyze).await);
        }
        let guard = self.begin(ActionKind::Analyze)?;
        {
            let mut state = lock(&self.state);
            state.submitted = Some(raw.to_string());
            state.analysis = None;
            state.related.clear();
            state.similar.clear();
            state.similar_status = LookupStatus::Idle;
            state.summary = None;
            state.error = None;
        }
        self.callback
            .on_phase_change(ActionKind::Analyze, RequestPhase::Submitting)
            .await;

        let input = AnalysisInput::detect(raw);
        let outcome = match self.backend.analyze(&input).await {
            Ok(json) => {
                let normalized = normalize_analysis(&json, raw);
                let result = normalized.result;
                {
                    let mut state = lock(&self.state);
                    state.analysis = Some(result.clone());
                    state.related = normalized.related;
                }
                info!(
                    sentiment = result.sentiment.as_str(),
                    authenticity = %result.real_or_fake,
                    trust_score = result.trust_score,
                    "Analysis complete"
                );
                self.spawn_similar_lookup(input.as_str().to_string());
                self.callback
                    .on_notice(&Notice::success(
                        "Analysis Complete",
                        format!(
                            "Sentiment: {}, Authenticity: {}",
                            result.sentiment, result.real_or_fake
                        ),
                    ))
                    .await;
                Ok(result)
            }
            Err(e) => {
                warn!(error = %e, "Analysis failed");
                let message = e.to_string();
                lock(&self.state).error = Some(message.clone());
                self.callback
                    .on_notice(&Notice::error("Analysis Failed", message))
                    .await;
                Err(SessionError::Client(e))
            }
        };

        drop(guard);
        self.callback
            .on_phase_change(ActionKind::Analyze, RequestPhase::Idle)
            .await;
        outcome
    }

    /// Summarize article text. A blank or missing summary is an error.
    pub async fn summarize(&self, raw: &str) -> Result<String, SessionError> {
        if raw.trim().is_empty() {
            return Err(self.reject_empty(ActionKind::Summarize).await);
        }
        let guard = self.begin(ActionKind::Summarize)?;
        lock(&self.state).summary = None;
        self.callback
            .on_phase_change(ActionKind::Summarize, RequestPhase::Submitting)
            .await;

        let outcome = match self.backend.summarize(raw).await {
            Ok(summary) => {
                lock(&self.state).summary = Some(summary.clone());
                info!(chars = summary.len(), "Summary complete");
                self.callback
                    .on_notice(&Notice::success(
                        "Summary Complete",
                        "The article has been summarized.",
                    ))
                    .await;
                Ok(summary)
            }
            Err(e) => {
                warn!(error = %e, "Summarization failed");
                self.callback
                    .on_notice(&Notice::error("Summarization Failed", e.to_string()))
                    .await;
                Err(SessionError::Client(e))
            }
        };

        drop(guard);
        self.callback
            .on_phase_change(ActionKind::Summarize, RequestPhase::Idle)
            .await;
        outcome
    }

    /// Run a similar-articles lookup in the foreground.
    ///
    /// Backend failures are swallowed exactly as in the background lookup:
    /// the returned status is [`LookupStatus::Error`] with an empty list.
    pub async fn lookup_similar(&self, raw: &str) -> Result<LookupOutcome, SessionError> {
        if raw.trim().is_empty() {
            return Err(self.reject_empty(ActionKind::Similar).await);
        }
        let guard = {
            let mut state = lock(&self.state);
            if state.phase(ActionKind::Similar) == RequestPhase::Submitting {
                debug!(action = %ActionKind::Similar, "Rejected submission while a request is in flight");
                return Err(SessionError::Busy {
                    action: ActionKind::Similar,
                });
            }
            LookupGuard::start(&self.state, &mut state)
        };
        Ok(run_similar_lookup(
            Arc::clone(&self.backend),
            Arc::clone(&self.callback),
            raw.to_string(),
            guard,
        )
        .await)
    }

    fn spawn_similar_lookup(&self, text: String) {
        let guard = LookupGuard::start(&self.state, &mut lock(&self.state));
        let handle = tokio::spawn(run_similar_lookup(
            Arc::clone(&self.backend),
            Arc::clone(&self.callback),
            text,
            guard,
        ));
        // A previous lookup still in flight is detached, not cancelled.
        let previous = self
            .similar_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if previous.is_some_and(|h| !h.is_finished()) {
            debug!("Previous similar-articles lookup still running; last write wins");
        }
    }

    /// Wait for the most recent background similar-articles lookup, if any.
    pub async fn wait_for_similar(&self) -> LookupStatus {
        let handle = self
            .similar_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            warn!(error = %e, "Similar-articles task did not complete");
        }
        lock(&self.state).similar_status
    }
}

async fn run_similar_lookup(
    backend: Arc<dyn AnalysisBackend>,
    callback: Arc<dyn SessionCallback>,
    text: String,
    guard: LookupGuard,
) -> LookupOutcome {
    callback
        .on_similar_update(LookupStatus::Loading, &[])
        .await;

    let (status, articles) = match backend.similar(&text).await {
        Ok(articles) if articles.is_empty() => (LookupStatus::Empty, Vec::new()),
        Ok(articles) => (LookupStatus::Ready, articles),
        Err(e) => {
            warn!(error = %e, "Similar-articles lookup failed; showing none");
            (LookupStatus::Error, Vec::new())
        }
    };
    debug!(%status, count = articles.len(), "Similar-articles lookup finished");

    {
        let mut state = lock(&guard.state);
        state.similar_status = status;
        state.similar = articles.clone();
    }
    drop(guard);
    callback.on_similar_update(status, &articles).await;
    (status, articles)
}
