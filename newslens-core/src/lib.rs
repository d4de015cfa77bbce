//! # NewsLens Core
//!
//! Core library for the NewsLens news-analysis dashboard.
//! Provides the backend HTTP client, result normalization, the analysis
//! session state machine, backend health polling, the static MLOps
//! catalogue, configuration, and fundamental types.

pub mod client;
pub mod config;
pub mod error;
pub mod health;
pub mod mlops;
pub mod mock;
pub mod normalize;
pub mod session;
pub mod types;

// Re-export commonly used types at the crate root.
pub use client::{AnalysisBackend, HealthReport, HttpBackend};
pub use config::{AnalyzeRoute, BackendConfig, DashboardConfig, UiConfig, init_workspace_config};
pub use error::{ClientError, ConfigError, FailureClass, NewsLensError, Result, SessionError};
pub use health::{BackendStatus, HealthMonitor, HealthSnapshot, check_health};
pub use mock::{MockBackend, RecordingCallback};
pub use normalize::{NormalizedAnalysis, normalize_analysis, normalize_similar};
pub use session::{AnalysisSession, NoOpCallback, SessionCallback, SessionState};
pub use types::{
    ActionKind, AnalysisInput, AnalysisResult, Authenticity, LookupStatus, Notice, NoticeLevel,
    RequestPhase, SimilarArticle,
};
