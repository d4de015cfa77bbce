//! Backend health polling.
//!
//! [`check_health`] performs a single `GET /health`; [`HealthMonitor`] runs it
//! on an interval and publishes the latest [`HealthSnapshot`] over a
//! `tokio::sync::watch` channel.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::AnalysisBackend;
use crate::error::ClientError;

/// Reachability of the analysis backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BackendStatus {
    /// No check has completed yet.
    Checking,
    Online { model_status: String },
    Offline { reason: String },
}

impl BackendStatus {
    pub fn is_online(&self) -> bool {
        matches!(self, BackendStatus::Online { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            BackendStatus::Checking => "checking",
            BackendStatus::Online { .. } => "online",
            BackendStatus::Offline { .. } => "offline",
        }
    }

    /// Model status when online, failure reason when offline.
    pub fn details(&self) -> Option<&str> {
        match self {
            BackendStatus::Checking => None,
            BackendStatus::Online { model_status } => Some(model_status),
            BackendStatus::Offline { reason } => Some(reason),
        }
    }
}

impl std::fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendStatus::Checking => write!(f, "Backend: checking..."),
            BackendStatus::Online { model_status } => {
                write!(f, "Backend: online (Model: {model_status})")
            }
            BackendStatus::Offline { reason } => write!(f, "Backend: offline ({reason})"),
        }
    }
}

/// A status together with the time it was observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthSnapshot {
    #[serde(flatten)]
    pub status: BackendStatus,
    pub checked_at: Option<DateTime<Utc>>,
}

impl HealthSnapshot {
    fn checking() -> Self {
        Self {
            status: BackendStatus::Checking,
            checked_at: None,
        }
    }
}

/// Probe the backend once.
pub async fn check_health(backend: &dyn AnalysisBackend) -> BackendStatus {
    match backend.health().await {
        Ok(report) => BackendStatus::Online {
            model_status: report
                .model_status
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
        },
        Err(ClientError::HttpStatus { status, .. }) => BackendStatus::Offline {
            reason: format!("HTTP {status}"),
        },
        Err(e) => {
            debug!(error = %e, "Health check failed");
            BackendStatus::Offline {
                reason: "Connection failed".to_string(),
            }
        }
    }
}

/// Background task polling `/health` on a fixed interval.
///
/// The task is aborted when the monitor is dropped.
pub struct HealthMonitor {
    rx: watch::Receiver<HealthSnapshot>,
    handle: JoinHandle<()>,
}

impl HealthMonitor {
    /// Start polling immediately and then every `interval` (minimum one second).
    pub fn spawn(backend: Arc<dyn AnalysisBackend>, interval: Duration) -> Self {
        let interval = interval.max(Duration::from_secs(1));
        let (tx, rx) = watch::channel(HealthSnapshot::checking());

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let status = check_health(backend.as_ref()).await;
                let changed = tx.borrow().status != status;
                if changed {
                    match &status {
                        BackendStatus::Online { model_status } => {
                            info!(model_status = model_status.as_str(), "Backend online")
                        }
                        BackendStatus::Offline { reason } => {
                            warn!(reason = reason.as_str(), "Backend offline")
                        }
                        BackendStatus::Checking => {}
                    }
                }
                let snapshot = HealthSnapshot {
                    status,
                    checked_at: Some(Utc::now()),
                };
                if tx.send(snapshot).is_err() {
                    debug!("Health monitor has no subscribers; stopping");
                    break;
                }
            }
        });

        Self { rx, handle }
    }

    pub fn subscribe(&self) -> watch::Receiver<HealthSnapshot> {
        self.rx.clone()
    }

    pub fn current(&self) -> HealthSnapshot {
        self.rx.borrow().clone()
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::HealthReport;
    use crate::mock::MockBackend;

    #[tokio::test]
    async fn test_online_with_model_status() {
        let backend = MockBackend::new();
        backend.queue_health(Ok(HealthReport {
            model_status: Some("Models loaded".into()),
        }));
        let status = check_health(&backend).await;
        assert_eq!(
            status,
            BackendStatus::Online {
                model_status: "Models loaded".into()
            }
        );
        assert_eq!(status.to_string(), "Backend: online (Model: Models loaded)");
    }

    #[tokio::test]
    async fn test_online_without_model_status() {
        let backend = MockBackend::new();
        backend.queue_health(Ok(HealthReport { model_status: None }));
        let status = check_health(&backend).await;
        assert_eq!(status.details(), Some("unknown"));
        assert!(status.is_online());
    }

    #[tokio::test]
    async fn test_offline_on_http_status() {
        let backend = MockBackend::new();
        backend.queue_health(Err(ClientError::HttpStatus {
            endpoint: "/health".into(),
            status: 502,
        }));
        let status = check_health(&backend).await;
        assert_eq!(
            status,
            BackendStatus::Offline {
                reason: "HTTP 502".into()
            }
        );
    }

    #[tokio::test]
    async fn test_offline_on_connection_failure() {
        let backend = MockBackend::new();
        backend.queue_health(Err(ClientError::Connection {
            endpoint: "http://localhost:5000/health".into(),
            message: "connection refused".into(),
        }));
        let status = check_health(&backend).await;
        assert_eq!(status.label(), "offline");
        assert_eq!(status.details(), Some("Connection failed"));
    }

    #[tokio::test]
    async fn test_monitor_publishes_updates() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_health(Err(ClientError::HttpStatus {
            endpoint: "/health".into(),
            status: 500,
        }));
        let monitor = HealthMonitor::spawn(backend.clone(), Duration::from_secs(60));
        let mut rx = monitor.subscribe();

        rx.changed().await.unwrap();
        let snapshot = rx.borrow().clone();
        assert_eq!(
            snapshot.status,
            BackendStatus::Offline {
                reason: "HTTP 500".into()
            }
        );
        assert!(snapshot.checked_at.is_some());
        assert_eq!(backend.health_calls(), 1);
        assert_eq!(monitor.current().status, snapshot.status);
    }
}
