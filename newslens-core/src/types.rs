//! Core value types shared across the NewsLens crates.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Authenticity label produced by the backend's fake-news classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Authenticity {
    Real,
    Fake,
    #[default]
    Unknown,
}

impl Authenticity {
    /// Parse a backend label case-insensitively. Anything other than
    /// `real` / `fake` maps to `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "real" => Authenticity::Real,
            "fake" => Authenticity::Fake,
            _ => Authenticity::Unknown,
        }
    }
}

impl std::fmt::Display for Authenticity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Authenticity::Real => write!(f, "Real"),
            Authenticity::Fake => write!(f, "Fake"),
            Authenticity::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Display-ready analysis record, recomputed on every submit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub sentiment: String,
    /// Sentiment confidence on a 0-100 scale.
    pub confidence: f64,
    pub key_topics: Vec<String>,
    pub word_count: usize,
    pub real_or_fake: Authenticity,
    pub fake_confidence: f64,
    /// Trust score on a 0-100 scale.
    pub trust_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Backend explanation of why the authenticity label is `Unknown`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_info: Option<String>,
    /// Backend warning about short or poorly extracted input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_warning: Option<String>,
    /// Optional historical sections (`factCheck`, `sourceReputation`),
    /// rendered additively in the order they were found.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub supplementary: Vec<(String, Value)>,
}

impl AnalysisResult {
    /// Reasoning text worth showing, with backend placeholders filtered out.
    pub fn display_reasoning(&self) -> Option<&str> {
        const PLACEHOLDERS: &[&str] = &["Summarization model not available.", "No reasoning provided"];
        self.reasoning
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty() && !PLACEHOLDERS.contains(r))
    }
}

/// A related article returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarArticle {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_status: Option<String>,
}

/// What the user submitted for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisInput {
    Text(String),
    Url(url::Url),
}

impl AnalysisInput {
    /// Classify raw input: an `http(s)://` string that parses as a URL is a
    /// link, everything else is article text.
    pub fn detect(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if (lower.starts_with("http://") || lower.starts_with("https://"))
            && !trimmed.contains(char::is_whitespace)
        {
            if let Ok(url) = url::Url::parse(trimmed) {
                return AnalysisInput::Url(url);
            }
        }
        AnalysisInput::Text(raw.to_string())
    }

    /// JSON request body for the analysis endpoints.
    pub fn request_body(&self) -> Value {
        match self {
            AnalysisInput::Text(text) => serde_json::json!({ "text": text }),
            AnalysisInput::Url(url) => serde_json::json!({ "url": url.as_str() }),
        }
    }

    /// The string form sent to auxiliary endpoints such as `/similar`.
    pub fn as_str(&self) -> &str {
        match self {
            AnalysisInput::Text(text) => text,
            AnalysisInput::Url(url) => url.as_str(),
        }
    }
}

/// Count whitespace-separated words, as the input panel displays them.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// User actions that issue a backend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Analyze,
    Summarize,
    Similar,
}

impl ActionKind {
    pub fn verb(&self) -> &'static str {
        match self {
            ActionKind::Analyze => "analyze",
            ActionKind::Summarize => "summarize",
            ActionKind::Similar => "look up",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Analyze => write!(f, "analysis"),
            ActionKind::Summarize => write!(f, "summarization"),
            ActionKind::Similar => write!(f, "similar-articles"),
        }
    }
}

/// Phase of a single action's request cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestPhase {
    #[default]
    Idle,
    Submitting,
}

/// Status of the best-effort similar-articles lookup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Empty,
    Error,
}

impl std::fmt::Display for LookupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupStatus::Idle => write!(f, "idle"),
            LookupStatus::Loading => write!(f, "loading"),
            LookupStatus::Ready => write!(f, "ready"),
            LookupStatus::Empty => write!(f, "empty"),
            LookupStatus::Error => write!(f, "error"),
        }
    }
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A short user-facing status message (the dashboard's toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticity_from_label() {
        assert_eq!(Authenticity::from_label("REAL"), Authenticity::Real);
        assert_eq!(Authenticity::from_label(" fake "), Authenticity::Fake);
        assert_eq!(Authenticity::from_label("uncertain"), Authenticity::Unknown);
        assert_eq!(Authenticity::from_label(""), Authenticity::Unknown);
    }

    #[test]
    fn test_detect_url_input() {
        let input = AnalysisInput::detect("https://example.com/news/1");
        assert!(matches!(input, AnalysisInput::Url(_)));
        assert_eq!(
            input.request_body(),
            serde_json::json!({ "url": "https://example.com/news/1" })
        );
    }

    #[test]
    fn test_detect_text_input() {
        let input = AnalysisInput::detect("Markets rallied on Monday.");
        assert_eq!(
            input,
            AnalysisInput::Text("Markets rallied on Monday.".into())
        );
        // A bare domain without a scheme stays text; the backend rejects it.
        assert!(matches!(
            AnalysisInput::detect("example.com/story"),
            AnalysisInput::Text(_)
        ));
        // A sentence that merely starts with a link is still text.
        assert!(matches!(
            AnalysisInput::detect("https://example.com says hello"),
            AnalysisInput::Text(_)
        ));
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("  one   two\nthree "), 3);
    }

    #[test]
    fn test_display_reasoning_filters_placeholders() {
        let mut result = AnalysisResult {
            sentiment: "Positive".into(),
            confidence: 90.0,
            key_topics: vec![],
            word_count: 3,
            real_or_fake: Authenticity::Real,
            fake_confidence: 0.0,
            trust_score: 80.0,
            reasoning: Some("Summarization model not available.".into()),
            fallback_info: None,
            parse_warning: None,
            supplementary: vec![],
        };
        assert_eq!(result.display_reasoning(), None);
        result.reasoning = Some("   ".into());
        assert_eq!(result.display_reasoning(), None);
        result.reasoning = Some("Sources agree with the claim.".into());
        assert_eq!(
            result.display_reasoning(),
            Some("Sources agree with the claim.")
        );
    }
}
