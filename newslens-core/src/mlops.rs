//! Static ML-operations catalogue.
//!
//! Everything here is fixed demo data: there is no orchestration, no live
//! metrics source and no persistence. The pipeline is kept as a
//! `petgraph` digraph so it can be listed in dependency order.

use std::collections::HashMap;
use std::str::FromStr;

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;

/// Models the catalogue knows about. The first one is selected by default.
pub static MODELS: [&str; 4] = [
    "sentiment-classifier-v1.2",
    "text-summarizer-v2.1",
    "fake-news-detector-v1.0",
    "topic-classifier-v1.3",
];

pub fn default_model() -> &'static str {
    MODELS[0]
}

/// Resolve a model name, accepting any unambiguous prefix.
pub fn find_model(name: &str) -> Option<&'static str> {
    let name = name.trim();
    if let Some(exact) = MODELS.iter().find(|m| **m == name) {
        return Some(*exact);
    }
    let mut matches = MODELS.iter().filter(|m| m.starts_with(name));
    match (matches.next(), matches.next()) {
        (Some(only), None) if !name.is_empty() => Some(*only),
        _ => None,
    }
}

/// Headline counters for the overview cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_models: u32,
    pub active_models: u32,
    pub deployed_pipelines: u32,
    pub alerts_today: u32,
}

pub const OVERVIEW: Overview = Overview {
    total_models: 12,
    active_models: 8,
    deployed_pipelines: 5,
    alerts_today: 3,
};

/// Quality and serving metrics of the selected model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub average_latency_ms: u32,
    pub p99_latency_ms: u32,
    pub throughput_per_min: u32,
    pub error_rate: f64,
}

pub const MODEL_METRICS: ModelMetrics = ModelMetrics {
    accuracy: 94.3,
    precision: 92.1,
    recall: 89.7,
    f1_score: 90.9,
    average_latency_ms: 122,
    p99_latency_ms: 245,
    throughput_per_min: 870,
    error_rate: 0.2,
};

/// Health indicators shown on the monitoring tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthIndicators {
    pub model_status: &'static str,
    pub uptime: &'static str,
    pub data_drift: &'static str,
    pub predictions_today: u32,
}

pub const HEALTH_INDICATORS: HealthIndicators = HealthIndicators {
    model_status: "Healthy",
    uptime: "99.8%",
    data_drift: "Moderate",
    predictions_today: 24_567,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PerformancePoint {
    pub time: &'static str,
    pub accuracy: f64,
    pub latency_ms: u32,
    pub throughput: u32,
}

pub static PERFORMANCE_SERIES: [PerformancePoint; 6] = [
    PerformancePoint { time: "00:00", accuracy: 94.2, latency_ms: 125, throughput: 850 },
    PerformancePoint { time: "04:00", accuracy: 94.5, latency_ms: 120, throughput: 920 },
    PerformancePoint { time: "08:00", accuracy: 93.8, latency_ms: 135, throughput: 780 },
    PerformancePoint { time: "12:00", accuracy: 94.1, latency_ms: 128, throughput: 890 },
    PerformancePoint { time: "16:00", accuracy: 94.7, latency_ms: 115, throughput: 950 },
    PerformancePoint { time: "20:00", accuracy: 94.3, latency_ms: 122, throughput: 870 },
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftPoint {
    pub time: &'static str,
    pub data_drift: f64,
    pub model_drift: f64,
}

pub static DRIFT_SERIES: [DriftPoint; 6] = [
    DriftPoint { time: "00:00", data_drift: 0.02, model_drift: 0.01 },
    DriftPoint { time: "04:00", data_drift: 0.03, model_drift: 0.02 },
    DriftPoint { time: "08:00", data_drift: 0.08, model_drift: 0.04 },
    DriftPoint { time: "12:00", data_drift: 0.12, model_drift: 0.07 },
    DriftPoint { time: "16:00", data_drift: 0.15, model_drift: 0.09 },
    DriftPoint { time: "20:00", data_drift: 0.11, model_drift: 0.06 },
];

/// The drift point with the highest data drift.
pub fn peak_drift() -> &'static DriftPoint {
    DRIFT_SERIES
        .iter()
        .max_by(|a, b| a.data_drift.total_cmp(&b.data_drift))
        .unwrap_or(&DRIFT_SERIES[0])
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionBucket {
    pub label: &'static str,
    pub count: u32,
    pub percentage: f64,
}

pub static PREDICTION_DISTRIBUTION: [PredictionBucket; 3] = [
    PredictionBucket { label: "Positive", count: 3420, percentage: 68.4 },
    PredictionBucket { label: "Negative", count: 1180, percentage: 23.6 },
    PredictionBucket { label: "Neutral", count: 400, percentage: 8.0 },
];

// --- Alerts ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Warning,
    Error,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Resolved,
    Investigating,
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertStatus::Active => write!(f, "active"),
            AlertStatus::Resolved => write!(f, "resolved"),
            AlertStatus::Investigating => write!(f, "investigating"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub id: u32,
    pub kind: AlertKind,
    pub title: &'static str,
    pub description: &'static str,
    pub timestamp: &'static str,
    pub model: &'static str,
    pub severity: Severity,
    pub status: AlertStatus,
}

pub static ALERTS: [Alert; 4] = [
    Alert {
        id: 1,
        kind: AlertKind::Warning,
        title: "Data Drift Detected",
        description: "Input data distribution has shifted beyond threshold",
        timestamp: "2 hours ago",
        model: "sentiment-classifier-v1.2",
        severity: Severity::Medium,
        status: AlertStatus::Active,
    },
    Alert {
        id: 2,
        kind: AlertKind::Error,
        title: "High Error Rate",
        description: "Error rate exceeded 5% in the last hour",
        timestamp: "4 hours ago",
        model: "fake-news-detector-v1.0",
        severity: Severity::High,
        status: AlertStatus::Resolved,
    },
    Alert {
        id: 3,
        kind: AlertKind::Info,
        title: "Model Retrained",
        description: "Model successfully retrained with new data",
        timestamp: "6 hours ago",
        model: "text-summarizer-v2.1",
        severity: Severity::Low,
        status: AlertStatus::Resolved,
    },
    Alert {
        id: 4,
        kind: AlertKind::Warning,
        title: "Latency Spike",
        description: "Average response time increased by 40%",
        timestamp: "8 hours ago",
        model: "topic-classifier-v1.3",
        severity: Severity::Medium,
        status: AlertStatus::Investigating,
    },
];

/// Which alerts to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlertFilter {
    #[default]
    All,
    Status(AlertStatus),
}

impl AlertFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        match self {
            AlertFilter::All => true,
            AlertFilter::Status(status) => alert.status == *status,
        }
    }
}

impl FromStr for AlertFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(AlertFilter::All),
            "active" => Ok(AlertFilter::Status(AlertStatus::Active)),
            "resolved" => Ok(AlertFilter::Status(AlertStatus::Resolved)),
            "investigating" => Ok(AlertFilter::Status(AlertStatus::Investigating)),
            other => Err(format!(
                "unknown alert filter '{other}' (expected all, active, resolved or investigating)"
            )),
        }
    }
}

/// Alerts passing `filter`, in catalogue order.
pub fn alerts(filter: AlertFilter) -> Vec<&'static Alert> {
    ALERTS.iter().filter(|a| filter.matches(a)).collect()
}

// --- Pipeline graph ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    DataIngestion,
    ModelTraining,
    ModelDeployment,
    Monitoring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Active,
    Idle,
    Warning,
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageStatus::Active => write!(f, "active"),
            StageStatus::Idle => write!(f, "idle"),
            StageStatus::Warning => write!(f, "warning"),
        }
    }
}

/// A node of the pipeline graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineStage {
    pub id: String,
    pub kind: StageKind,
    pub label: String,
    pub status: StageStatus,
    /// Free-form key/value facts shown under the label.
    pub details: Vec<(String, String)>,
}

impl PipelineStage {
    pub fn new(id: &str, kind: StageKind, label: &str, status: StageStatus) -> Self {
        Self {
            id: id.to_string(),
            kind,
            label: label.to_string(),
            status,
            details: Vec::new(),
        }
    }

    pub fn with_detail(mut self, key: &str, value: &str) -> Self {
        self.details.push((key.to_string(), value.to_string()));
        self
    }
}

/// Edge styling carried over from the dashboard: animated flows are live,
/// dashed links are auxiliary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineLink {
    pub animated: bool,
    pub dashed: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown pipeline stage '{0}'")]
pub struct UnknownStage(pub String);

/// The ML pipeline as a directed graph of stages.
pub struct PipelineGraph {
    graph: DiGraph<PipelineStage, PipelineLink>,
    id_index: HashMap<String, NodeIndex>,
}

impl PipelineGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            id_index: HashMap::new(),
        }
    }

    /// Add a stage, replacing any stage with the same id.
    pub fn add_stage(&mut self, stage: PipelineStage) -> NodeIndex {
        if let Some(&idx) = self.id_index.get(&stage.id) {
            self.graph[idx] = stage;
            return idx;
        }
        let id = stage.id.clone();
        let idx = self.graph.add_node(stage);
        self.id_index.insert(id, idx);
        idx
    }

    pub fn connect(&mut self, from: &str, to: &str, link: PipelineLink) -> Result<(), UnknownStage> {
        let from_idx = *self
            .id_index
            .get(from)
            .ok_or_else(|| UnknownStage(from.to_string()))?;
        let to_idx = *self
            .id_index
            .get(to)
            .ok_or_else(|| UnknownStage(to.to_string()))?;
        self.graph.update_edge(from_idx, to_idx, link);
        Ok(())
    }

    pub fn stage(&self, id: &str) -> Option<&PipelineStage> {
        self.id_index.get(id).map(|&idx| &self.graph[idx])
    }

    pub fn stage_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Stages in dependency order (upstream first). Ties keep insertion
    /// order; a cyclic graph falls back to insertion order entirely.
    pub fn stages_in_order(&self) -> Vec<&PipelineStage> {
        match toposort(&self.graph, None) {
            Ok(order) => {
                // toposort is stable only per DFS root; rank by depth instead.
                let mut depth: HashMap<NodeIndex, usize> = HashMap::new();
                for &idx in &order {
                    let d = self
                        .graph
                        .neighbors_directed(idx, Direction::Incoming)
                        .filter_map(|p| depth.get(&p))
                        .map(|d| d + 1)
                        .max()
                        .unwrap_or(0);
                    depth.insert(idx, d);
                }
                let mut indices: Vec<NodeIndex> = self.graph.node_indices().collect();
                indices.sort_by_key(|idx| (depth[idx], idx.index()));
                indices.into_iter().map(|idx| &self.graph[idx]).collect()
            }
            Err(_) => self.graph.node_weights().collect(),
        }
    }

    /// Every link as `(from, to, style)`, in insertion order.
    pub fn links(&self) -> Vec<(&PipelineStage, &PipelineStage, PipelineLink)> {
        self.graph
            .edge_references()
            .map(|e| (&self.graph[e.source()], &self.graph[e.target()], *e.weight()))
            .collect()
    }

    /// Stages fed directly by `id`.
    pub fn downstream(&self, id: &str) -> Vec<&PipelineStage> {
        let Some(&idx) = self.id_index.get(id) else {
            return Vec::new();
        };
        let mut out: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        out.sort_by_key(|n| n.index());
        out.into_iter().map(|n| &self.graph[n]).collect()
    }

    /// Stages feeding directly into `id`.
    pub fn upstream(&self, id: &str) -> Vec<&PipelineStage> {
        let Some(&idx) = self.id_index.get(id) else {
            return Vec::new();
        };
        let mut out: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .collect();
        out.sort_by_key(|n| n.index());
        out.into_iter().map(|n| &self.graph[n]).collect()
    }

    /// The demo pipeline: ingestion, training, deployment and monitoring,
    /// plus a validation-data branch.
    pub fn demo() -> Self {
        let mut pipeline = Self::new();
        pipeline.add_stage(
            PipelineStage::new("data-1", StageKind::DataIngestion, "Data Ingestion", StageStatus::Active)
                .with_detail("last run", "2 min ago")
                .with_detail("throughput", "1.2K records/sec"),
        );
        pipeline.add_stage(
            PipelineStage::new("training-1", StageKind::ModelTraining, "Model Training", StageStatus::Idle)
                .with_detail("last run", "6 hours ago")
                .with_detail("accuracy", "94.2%"),
        );
        pipeline.add_stage(
            PipelineStage::new(
                "deployment-1",
                StageKind::ModelDeployment,
                "Model Deployment",
                StageStatus::Active,
            )
            .with_detail("version", "v1.2.3")
            .with_detail("requests", "450/min"),
        );
        pipeline.add_stage(
            PipelineStage::new("monitoring-1", StageKind::Monitoring, "Model Monitoring", StageStatus::Active)
                .with_detail("alerts", "0")
                .with_detail("uptime", "99.8%"),
        );
        pipeline.add_stage(
            PipelineStage::new("data-2", StageKind::DataIngestion, "Validation Data", StageStatus::Active)
                .with_detail("last run", "5 min ago")
                .with_detail("throughput", "300 records/sec"),
        );
        pipeline.add_stage(
            PipelineStage::new(
                "monitoring-2",
                StageKind::Monitoring,
                "Data Quality Monitor",
                StageStatus::Warning,
            )
            .with_detail("alerts", "1")
            .with_detail("last check", "1 min ago"),
        );

        let live = PipelineLink { animated: true, dashed: false };
        let plain = PipelineLink::default();
        let auxiliary = PipelineLink { animated: false, dashed: true };
        let links = [
            ("data-1", "training-1", live),
            ("training-1", "deployment-1", plain),
            ("deployment-1", "monitoring-1", live),
            ("data-2", "monitoring-2", live),
            ("data-2", "deployment-1", auxiliary),
        ];
        for (from, to, link) in links {
            pipeline
                .connect(from, to, link)
                .expect("demo stage ids are registered");
        }
        pipeline
    }
}

impl Default for PipelineGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_model() {
        assert_eq!(find_model("text-summarizer-v2.1"), Some("text-summarizer-v2.1"));
        assert_eq!(find_model("fake"), Some("fake-news-detector-v1.0"));
        assert_eq!(find_model("t"), None); // ambiguous
        assert_eq!(find_model(""), None);
        assert_eq!(find_model("unknown-model"), None);
        assert_eq!(default_model(), "sentiment-classifier-v1.2");
    }

    #[test]
    fn test_alert_filter_parse() {
        assert_eq!("all".parse::<AlertFilter>().unwrap(), AlertFilter::All);
        assert_eq!(
            "Investigating".parse::<AlertFilter>().unwrap(),
            AlertFilter::Status(AlertStatus::Investigating)
        );
        assert!("pending".parse::<AlertFilter>().is_err());
    }

    #[test]
    fn test_alert_filtering() {
        assert_eq!(alerts(AlertFilter::All).len(), 4);
        let resolved = alerts(AlertFilter::Status(AlertStatus::Resolved));
        assert_eq!(
            resolved.iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![2, 3]
        );
        let active = alerts(AlertFilter::Status(AlertStatus::Active));
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "Data Drift Detected");
    }

    #[test]
    fn test_peak_drift() {
        let peak = peak_drift();
        assert_eq!(peak.time, "16:00");
        assert_eq!(peak.data_drift, 0.15);
    }

    #[test]
    fn test_prediction_distribution_sums_to_100() {
        let total: f64 = PREDICTION_DISTRIBUTION.iter().map(|b| b.percentage).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_demo_pipeline_shape() {
        let pipeline = PipelineGraph::demo();
        assert_eq!(pipeline.stage_count(), 6);
        assert_eq!(pipeline.link_count(), 5);

        let downstream: Vec<&str> = pipeline
            .downstream("data-2")
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(downstream, vec!["deployment-1", "monitoring-2"]);

        let upstream: Vec<&str> = pipeline
            .upstream("deployment-1")
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(upstream, vec!["training-1", "data-2"]);

        let dashed = pipeline.links().into_iter().filter(|(_, _, l)| l.dashed).count();
        assert_eq!(dashed, 1);
    }

    #[test]
    fn test_stages_in_dependency_order() {
        let pipeline = PipelineGraph::demo();
        let order: Vec<&str> = pipeline
            .stages_in_order()
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(
            order,
            vec![
                "data-1",
                "data-2",
                "training-1",
                "monitoring-2",
                "deployment-1",
                "monitoring-1"
            ]
        );
    }

    #[test]
    fn test_connect_unknown_stage() {
        let mut pipeline = PipelineGraph::new();
        pipeline.add_stage(PipelineStage::new(
            "a",
            StageKind::DataIngestion,
            "A",
            StageStatus::Active,
        ));
        let err = pipeline
            .connect("a", "missing", PipelineLink::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown pipeline stage 'missing'");
    }

    #[test]
    fn test_cycle_falls_back_to_insertion_order() {
        let mut pipeline = PipelineGraph::new();
        for id in ["x", "y"] {
            pipeline.add_stage(PipelineStage::new(id, StageKind::Monitoring, id, StageStatus::Idle));
        }
        pipeline.connect("x", "y", PipelineLink::default()).unwrap();
        pipeline.connect("y", "x", PipelineLink::default()).unwrap();
        let order: Vec<&str> = pipeline
            .stages_in_order()
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(order, vec!["x", "y"]);
    }

    #[test]
    fn test_add_stage_replaces_existing() {
        let mut pipeline = PipelineGraph::demo();
        pipeline.add_stage(PipelineStage::new(
            "training-1",
            StageKind::ModelTraining,
            "Retraining",
            StageStatus::Active,
        ));
        assert_eq!(pipeline.stage_count(), 6);
        assert_eq!(pipeline.stage("training-1").unwrap().label, "Retraining");
    }
}
