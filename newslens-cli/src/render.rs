//! Terminal rendering of analysis results, notices, health and MLOps views.
//!
//! Every function returns a `String` so output can be asserted in tests;
//! callers decide where to print it.

use newslens_core::config::{AnalyzeRoute, UiConfig};
use newslens_core::health::{BackendStatus, HealthSnapshot};
use newslens_core::mlops::{self, AlertFilter, AlertKind, AlertStatus, PipelineGraph, Severity};
use newslens_core::{
    AnalysisResult, Authenticity, ClientError, FailureClass, LookupStatus, Notice, NoticeLevel,
    SessionError, SimilarArticle,
};
use serde_json::Value;
use std::path::Path;

const GREEN: &str = "32";
const RED: &str = "31";
const YELLOW: &str = "33";
const BLUE: &str = "34";
const CYAN: &str = "36";
const GRAY: &str = "90";
const BOLD: &str = "1";

/// Colour band of a trust score badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustBand {
    High,
    Medium,
    Low,
}

impl TrustBand {
    pub fn of(score: f64) -> Self {
        if score >= 70.0 {
            TrustBand::High
        } else if score >= 40.0 {
            TrustBand::Medium
        } else {
            TrustBand::Low
        }
    }

    fn color(self) -> &'static str {
        match self {
            TrustBand::High => GREEN,
            TrustBand::Medium => YELLOW,
            TrustBand::Low => RED,
        }
    }
}

fn sentiment_color(sentiment: &str) -> &'static str {
    match sentiment.to_ascii_lowercase().as_str() {
        "positive" => GREEN,
        "negative" => RED,
        "neutral" => YELLOW,
        _ => BLUE,
    }
}

fn authenticity_color(label: Authenticity) -> &'static str {
    match label {
        Authenticity::Real => GREEN,
        Authenticity::Fake => RED,
        Authenticity::Unknown => GRAY,
    }
}

/// Whole numbers print without decimals, everything else with one.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// Renders dashboard panels as terminal text.
#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    width: usize,
    troubleshooting: bool,
}

impl Renderer {
    pub fn new(ui: &UiConfig) -> Self {
        Self {
            color: ui.color,
            width: ui.wrap_width.max(20),
            troubleshooting: ui.show_troubleshooting,
        }
    }

    /// A renderer without colours.
    #[cfg(test)]
    pub fn plain() -> Self {
        Self {
            color: false,
            width: 100,
            troubleshooting: true,
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn heading(&self, text: &str) -> String {
        format!("\n{}\n", self.paint(BOLD, text))
    }

    fn wrap(&self, text: &str, indent: &str) -> String {
        let options = textwrap::Options::new(self.width)
            .initial_indent(indent)
            .subsequent_indent(indent);
        textwrap::fill(text, options)
    }

    // --- REPL chrome ---

    /// Startup banner of the interactive mode.
    pub fn banner(
        &self,
        base_url: &str,
        route: AnalyzeRoute,
        workspace: &Path,
        has_config_file: bool,
    ) -> String {
        let mut out = format!("\n  {}\n\n", self.paint("1;32", "NewsLens"));
        out.push_str(&format!(
            "  Backend: {} | Route: {} | Workspace: {}\n",
            base_url,
            route,
            workspace.display()
        ));
        if !has_config_file {
            out.push_str(&format!(
                "  {}\n",
                self.paint(GRAY, "No config file found; using defaults (`newslens config init` creates one)")
            ));
        }
        out.push_str("  Type /help for commands, /quit to exit\n");
        out
    }

    pub fn prompt(&self) -> String {
        format!("{} ", self.paint("1;34", ">"))
    }

    /// Dimmed in-progress hint, e.g. "analyzing...".
    pub fn progress(&self, label: &str) -> String {
        format!("  {}", self.paint(GRAY, label))
    }

    pub fn error_line(&self, message: &str) -> String {
        self.paint(RED, &format!("Error: {message}"))
    }

    // --- Analysis ---

    /// The full results panel for one analysis.
    pub fn analysis(
        &self,
        result: &AnalysisResult,
        articles: &[SimilarArticle],
        lookup: LookupStatus,
    ) -> String {
        let mut out = String::new();

        out.push_str(&self.heading("Authenticity Assessment"));
        out.push_str(&format!(
            "  Classification: {}\n",
            self.paint(
                authenticity_color(result.real_or_fake),
                &result.real_or_fake.to_string()
            )
        ));
        out.push_str(&format!(
            "  Trust Score:    {}\n",
            self.paint(
                TrustBand::of(result.trust_score).color(),
                &format!("{}/100", format_number(result.trust_score))
            )
        ));
        if result.fake_confidence > 0.0 {
            out.push_str(&format!(
                "  Detection confidence: {}%\n",
                format_number(result.fake_confidence)
            ));
        }
        if result.real_or_fake == Authenticity::Unknown {
            out.push_str(&self.unknown_explanation(result.fallback_info.as_deref()));
        }

        out.push_str(&self.heading("Sentiment Analysis"));
        out.push_str(&format!(
            "  {}  {}% confidence\n",
            self.paint(sentiment_color(&result.sentiment), &result.sentiment),
            format_number(result.confidence)
        ));

        out.push_str(&self.heading("Key Topics"));
        if result.key_topics.is_empty() {
            out.push_str(&format!("  {}\n", self.paint(GRAY, "(none)")));
        } else {
            let topics: Vec<String> = result
                .key_topics
                .iter()
                .map(|t| format!("[{}]", self.paint(CYAN, t)))
                .collect();
            out.push_str(&format!("  {}\n", topics.join(" ")));
        }

        if let Some(reasoning) = result.display_reasoning() {
            out.push_str(&self.heading("AI Reasoning Report"));
            out.push_str(&self.wrap(reasoning, "  "));
            out.push('\n');
        }

        if let Some(warning) = &result.parse_warning {
            out.push_str(&format!(
                "\n  {} {}\n",
                self.paint(YELLOW, "Note:"),
                warning
            ));
        }

        for (name, value) in &result.supplementary {
            out.push_str(&self.heading(&section_title(name)));
            out.push_str(&self.supplementary_value(value));
        }

        out.push_str(&self.related_articles(articles, lookup));

        out.push_str(&format!(
            "\n  {} words analyzed | trust score {}\n",
            self.paint(BLUE, &result.word_count.to_string()),
            self.paint(GREEN, &format_number(result.trust_score))
        ));
        out
    }

    fn unknown_explanation(&self, fallback_info: Option<&str>) -> String {
        let mut out = format!(
            "\n  {}\n  The AI model could not classify this article as \"Fake\" or \"Real\".\n",
            self.paint(BOLD, "Unable to determine authenticity.")
        );
        match fallback_info.map(str::trim).filter(|s| !s.is_empty()) {
            Some(info) => {
                out.push_str(&format!(
                    "  {} {}.\n",
                    self.paint(BOLD, "Reason:"),
                    info.trim_end_matches('.')
                ));
            }
            None => {
                out.push_str(&self.wrap(
                    "This usually happens if the backend could not load a news authenticity \
                     model, or the result is too uncertain. Check the backend logs for model \
                     loading errors.",
                    "  ",
                ));
                out.push('\n');
            }
        }
        out
    }

    fn supplementary_value(&self, value: &Value) -> String {
        match value {
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| format!("  {}: {}\n", self.paint(GRAY, k), inline_value(v)))
                .collect(),
            other => format!("{}\n", self.wrap(&inline_value(other), "  ")),
        }
    }

    /// Related-articles panel. Hidden entirely when there is nothing to show,
    /// except for a hint while the lookup is still running.
    pub fn related_articles(&self, articles: &[SimilarArticle], lookup: LookupStatus) -> String {
        if articles.is_empty() {
            return if lookup == LookupStatus::Loading {
                format!("\n  {}\n", self.paint(GRAY, "Looking up related articles..."))
            } else {
                String::new()
            };
        }
        let mut out = self.heading("Related Articles");
        for article in articles {
            out.push_str(&format!("  - {}\n", self.paint(BOLD, &article.title)));
            let mut meta = Vec::new();
            if let Some(source) = &article.source {
                meta.push(source.clone());
            }
            if let Some(published) = &article.published_at {
                meta.push(published.clone());
            }
            if let Some(score) = article.trust_score {
                meta.push(format!("trust {}", format_number(score)));
            }
            if let Some(status) = &article.trust_status {
                meta.push(status.clone());
            }
            if !meta.is_empty() {
                out.push_str(&format!("    {}\n", self.paint(GRAY, &meta.join(" | "))));
            }
            if !article.url.is_empty() {
                out.push_str(&format!("    {}\n", self.paint(BLUE, &article.url)));
            }
        }
        out
    }

    /// Output of a foreground similar-articles lookup.
    pub fn similar_lookup(&self, status: LookupStatus, articles: &[SimilarArticle]) -> String {
        match status {
            LookupStatus::Ready => self.related_articles(articles, status),
            LookupStatus::Error => format!(
                "  {}\n",
                self.paint(GRAY, "Related articles are unavailable right now.")
            ),
            _ => format!("  {}\n", self.paint(GRAY, "No related articles found.")),
        }
    }

    pub fn summary(&self, summary: &str) -> String {
        let mut out = self.heading("Summary");
        out.push_str(&self.wrap(summary, "  "));
        out.push('\n');
        out
    }

    // --- Notices and errors ---

    pub fn notice(&self, notice: &Notice) -> String {
        let (code, marker) = match notice.level {
            NoticeLevel::Success => (GREEN, "✓"),
            NoticeLevel::Error => (RED, "✗"),
        };
        format!(
            "{} {}",
            self.paint(code, &format!("{marker} {}", notice.title)),
            notice.description
        )
    }

    /// Error details panel with troubleshooting hints for `base_url`.
    pub fn client_error(&self, title: &str, err: &ClientError, base_url: &str) -> String {
        let mut out = format!("\n{}\n", self.paint(RED, title));
        out.push_str(&format!("  {}\n", self.paint(BOLD, "Error Details:")));
        out.push_str(&self.wrap(&err.to_string(), "  "));
        out.push('\n');
        if self.troubleshooting {
            out.push_str(&format!("\n  {}\n", self.paint(BOLD, "Troubleshooting:")));
            for hint in troubleshooting_hints(err.class(), base_url) {
                out.push_str(&format!("  - {hint}\n"));
            }
        }
        out
    }

    pub fn session_error(&self, title: &str, err: &SessionError, base_url: &str) -> String {
        match err {
            SessionError::Client(client) => self.client_error(title, client, base_url),
            other => format!("{}\n", self.paint(YELLOW, &other.to_string())),
        }
    }

    // --- Health ---

    pub fn health(&self, snapshot: &HealthSnapshot) -> String {
        let code = match &snapshot.status {
            BackendStatus::Online { .. } => GREEN,
            BackendStatus::Offline { .. } => RED,
            BackendStatus::Checking => GRAY,
        };
        let mut line = self.paint(code, &snapshot.status.to_string());
        if let Some(at) = snapshot.checked_at {
            line.push_str(&format!(
                " {}",
                self.paint(GRAY, &format!("[{}]", at.format("%H:%M:%S")))
            ));
        }
        line
    }

    // --- MLOps ---

    pub fn mlops_overview(&self) -> String {
        let o = mlops::OVERVIEW;
        let mut out = self.heading("ML Operations Dashboard");
        out.push_str(&format!("  Total Models        {:>4}  (+2 this month)\n", o.total_models));
        out.push_str(&format!("  Active Models       {:>4}  (running smoothly)\n", o.active_models));
        out.push_str(&format!(
            "  Deployed Pipelines  {:>4}  (all operational)\n",
            o.deployed_pipelines
        ));
        let resolved = mlops::alerts(AlertFilter::Status(AlertStatus::Resolved)).len();
        out.push_str(&format!(
            "  Alerts Today        {:>4}  ({resolved} resolved)\n",
            o.alerts_today
        ));
        out
    }

    pub fn mlops_models(&self, selected: &str) -> String {
        let mut out = self.heading("Models");
        for model in mlops::MODELS {
            if model == selected {
                out.push_str(&format!("  * {}\n", self.paint(CYAN, model)));
            } else {
                out.push_str(&format!("    {model}\n"));
            }
        }
        out
    }

    /// Health indicators, metrics and prediction distribution of `model`.
    pub fn mlops_model_health(&self, model: &str) -> String {
        let h = mlops::HEALTH_INDICATORS;
        let m = mlops::MODEL_METRICS;
        let mut out = self.heading(&format!("Model Health: {model}"));
        out.push_str(&format!(
            "  Status {} | Uptime {} | Data drift {} | Predictions today {}\n",
            self.paint(GREEN, h.model_status),
            h.uptime,
            self.paint(YELLOW, h.data_drift),
            h.predictions_today
        ));

        out.push_str(&self.heading("Performance Metrics"));
        for (label, value) in [
            ("Accuracy", m.accuracy),
            ("Precision", m.precision),
            ("Recall", m.recall),
            ("F1 Score", m.f1_score),
        ] {
            out.push_str(&format!(
                "  {label:<10} {:>5}%  {}\n",
                format_number(value),
                self.bar(value, 100.0, 30, GREEN)
            ));
        }
        out.push_str(&format!(
            "  Latency    {}ms avg, {}ms p99\n",
            m.average_latency_ms, m.p99_latency_ms
        ));
        out.push_str(&format!("  Throughput {}/min\n", m.throughput_per_min));
        out.push_str(&format!("  Error rate {}%\n", format_number(m.error_rate)));

        out.push_str(&self.heading("Prediction Distribution"));
        for bucket in &mlops::PREDICTION_DISTRIBUTION {
            out.push_str(&format!(
                "  {:<9} {:>5} ({:>4}%) {}\n",
                bucket.label,
                bucket.count,
                format_number(bucket.percentage),
                self.bar(bucket.percentage, 100.0, 30, sentiment_color(bucket.label))
            ));
        }

        out.push_str(&self.heading("Performance (24h)"));
        for point in &mlops::PERFORMANCE_SERIES {
            out.push_str(&format!(
                "  {}  accuracy {:>4}%  latency {:>3}ms  throughput {:>3}/min\n",
                point.time,
                format_number(point.accuracy),
                point.latency_ms,
                point.throughput
            ));
        }
        out
    }

    pub fn mlops_alerts(&self, filter: AlertFilter) -> String {
        let alerts = mlops::alerts(filter);
        let mut out = self.heading("Alerts");
        if alerts.is_empty() {
            out.push_str(&format!("  {}\n", self.paint(GRAY, "No alerts match this filter.")));
            return out;
        }
        for alert in alerts {
            let (code, marker) = match (alert.status, alert.kind) {
                (AlertStatus::Resolved, _) => (GREEN, "✓"),
                (_, AlertKind::Error) => (RED, "✗"),
                (_, AlertKind::Warning) => (YELLOW, "!"),
                (_, AlertKind::Info) => (BLUE, "i"),
            };
            let severity_code = match alert.severity {
                Severity::High => RED,
                Severity::Medium => YELLOW,
                Severity::Low => GRAY,
            };
            out.push_str(&format!(
                "  {} {} [{}] {}\n",
                self.paint(code, marker),
                self.paint(BOLD, alert.title),
                self.paint(severity_code, &alert.severity.to_string()),
                alert.status
            ));
            out.push_str(&format!("    {}\n", alert.description));
            out.push_str(&format!(
                "    {}\n",
                self.paint(GRAY, &format!("{} | {}", alert.model, alert.timestamp))
            ));
        }
        out
    }

    pub fn mlops_drift(&self) -> String {
        let max = mlops::peak_drift().data_drift;
        let mut out = self.heading("Data & Model Drift");
        for point in &mlops::DRIFT_SERIES {
            out.push_str(&format!(
                "  {}  data {:.2} {:<20}  model {:.2} {}\n",
                point.time,
                point.data_drift,
                self.bar(point.data_drift, max, 20, YELLOW),
                point.model_drift,
                self.bar(point.model_drift, max, 20, CYAN)
            ));
        }
        let peak = mlops::peak_drift();
        out.push_str(&format!(
            "  Peak data drift {:.2} at {}\n",
            peak.data_drift, peak.time
        ));
        out
    }

    pub fn mlops_pipeline(&self, pipeline: &PipelineGraph) -> String {
        let mut out = self.heading("ML Pipeline");
        for stage in pipeline.stages_in_order() {
            let code = match stage.status {
                mlops::StageStatus::Active => GREEN,
                mlops::StageStatus::Idle => GRAY,
                mlops::StageStatus::Warning => YELLOW,
            };
            out.push_str(&format!(
                "  {} {} ({})\n",
                self.paint(code, "●"),
                self.paint(BOLD, &stage.label),
                stage.status
            ));
            for (key, value) in &stage.details {
                out.push_str(&format!("      {}: {}\n", self.paint(GRAY, key), value));
            }
            let targets: Vec<&str> = pipeline
                .downstream(&stage.id)
                .iter()
                .map(|s| s.label.as_str())
                .collect();
            if !targets.is_empty() {
                out.push_str(&format!("      -> {}\n", targets.join(", ")));
            }
        }
        let auxiliary: Vec<String> = pipeline
            .links()
            .into_iter()
            .filter(|(_, _, link)| link.dashed)
            .map(|(from, to, _)| format!("{} -> {}", from.label, to.label))
            .collect();
        if !auxiliary.is_empty() {
            out.push_str(&format!(
                "  {} {}\n",
                self.paint(GRAY, "auxiliary:"),
                auxiliary.join(", ")
            ));
        }
        out
    }

    fn bar(&self, value: f64, max: f64, width: usize, code: &str) -> String {
        if max <= 0.0 {
            return String::new();
        }
        let filled = ((value / max) * width as f64).round().clamp(0.0, width as f64) as usize;
        self.paint(code, &"█".repeat(filled))
    }
}

/// Hints shown under an error, by failure class.
pub fn troubleshooting_hints(class: FailureClass, base_url: &str) -> Vec<String> {
    let health = format!("{base_url}/health");
    match class {
        FailureClass::Network => vec![
            format!("Make sure the analysis backend is running at {base_url}"),
            format!("Check if the backend responds at: {health}"),
            "Restart the backend server and try again".to_string(),
        ],
        FailureClass::HttpStatus => vec![
            "The backend answered with an error status; check its logs".to_string(),
            format!("Check if the backend responds at: {health}"),
        ],
        FailureClass::NonJson => vec![
            format!("{base_url} returned a page instead of JSON; make sure it points at the analysis API"),
            "A proxy or a crashed worker can also produce HTML error pages".to_string(),
        ],
        FailureClass::Backend => vec![
            "The backend reported this error itself; check the backend logs for details".to_string(),
        ],
    }
}

/// `factCheck` -> `Fact Check`.
fn section_title(key: &str) -> String {
    let mut title = String::new();
    for (i, ch) in key.chars().enumerate() {
        if i == 0 {
            title.extend(ch.to_uppercase());
        } else if ch.is_uppercase() {
            title.push(' ');
            title.push(ch);
        } else if ch == '_' {
            title.push(' ');
        } else {
            title.push(ch);
        }
    }
    title
}

fn inline_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(inline_value).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}
