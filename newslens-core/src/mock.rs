//! In-memory backend and callback doubles for tests and offline demos.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::client::{AnalysisBackend, HealthReport};
use crate::error::ClientError;
use crate::session::SessionCallback;
use crate::types::{ActionKind, AnalysisInput, LookupStatus, Notice, RequestPhase, SimilarArticle};

/// A scripted backend. Each endpoint pops its next queued response; an
/// empty queue falls back to a neutral default.
pub struct MockBackend {
    analyze: Mutex<VecDeque<Result<Value, ClientError>>>,
    similar: Mutex<VecDeque<Result<Vec<SimilarArticle>, ClientError>>>,
    summarize: Mutex<VecDeque<Result<String, ClientError>>>,
    health: Mutex<VecDeque<Result<HealthReport, ClientError>>>,
    analyze_calls: AtomicUsize,
    similar_calls: AtomicUsize,
    summarize_calls: AtomicUsize,
    health_calls: AtomicUsize,
    last_input: Mutex<Option<AnalysisInput>>,
    delay: Duration,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            analyze: Mutex::new(VecDeque::new()),
            similar: Mutex::new(VecDeque::new()),
            summarize: Mutex::new(VecDeque::new()),
            health: Mutex::new(VecDeque::new()),
            analyze_calls: AtomicUsize::new(0),
            similar_calls: AtomicUsize::new(0),
            summarize_calls: AtomicUsize::new(0),
            health_calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
            delay: Duration::ZERO,
        }
    }

    /// Delay every response, to hold requests in flight.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn queue_analyze(&self, response: Result<Value, ClientError>) {
        self.analyze.lock().unwrap().push_back(response);
    }

    pub fn queue_similar(&self, response: Result<Vec<SimilarArticle>, ClientError>) {
        self.similar.lock().unwrap().push_back(response);
    }

    pub fn queue_summarize(&self, response: Result<String, ClientError>) {
        self.summarize.lock().unwrap().push_back(response);
    }

    pub fn queue_health(&self, response: Result<HealthReport, ClientError>) {
        self.health.lock().unwrap().push_back(response);
    }

    /// Number of requests issued for an action.
    pub fn calls(&self, action: ActionKind) -> usize {
        match action {
            ActionKind::Analyze => self.analyze_calls.load(Ordering::SeqCst),
            ActionKind::Summarize => self.summarize_calls.load(Ordering::SeqCst),
            ActionKind::Similar => self.similar_calls.load(Ordering::SeqCst),
        }
    }

    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    /// The input of the most recent analysis request.
    pub fn last_input(&self) -> Option<AnalysisInput> {
        self.last_input.lock().unwrap().clone()
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisBackend for MockBackend {
    async fn health(&self) -> Result<HealthReport, ClientError> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.health.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(HealthReport {
                model_status: Some("mock".to_string()),
            })
        })
    }

    async fn analyze(&self, input: &AnalysisInput) -> Result<Value, ClientError> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_input.lock().unwrap() = Some(input.clone());
        self.pause().await;
        self.analyze
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({ "sentiment": "Neutral" })))
    }

    async fn similar(&self, _text: &str) -> Result<Vec<SimilarArticle>, ClientError> {
        self.similar_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.similar
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn summarize(&self, _text: &str) -> Result<String, ClientError> {
        self.summarize_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.summarize
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ClientError::MissingSummary))
    }

    fn base_url(&self) -> &str {
        "mock://backend"
    }
}

/// Records every session event it receives.
#[derive(Default)]
pub struct RecordingCallback {
    notices: Mutex<Vec<Notice>>,
    phases: Mutex<Vec<(ActionKind, RequestPhase)>>,
    similar: Mutex<Vec<LookupStatus>>,
}

impl RecordingCallback {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn phases(&self) -> Vec<(ActionKind, RequestPhase)> {
        self.phases.lock().unwrap().clone()
    }

    pub fn similar_statuses(&self) -> Vec<LookupStatus> {
        self.similar.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionCallback for RecordingCallback {
    async fn on_notice(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }

    async fn on_phase_change(&self, action: ActionKind, phase: RequestPhase) {
        self.phases.lock().unwrap().push((action, phase));
    }

    async fn on_similar_update(&self, status: LookupStatus, _articles: &[SimilarArticle]) {
        self.similar.lock().unwrap().push(status);
    }
}
