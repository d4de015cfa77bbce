//! HTTP client for the external analysis backend.
//!
//! The [`AnalysisBackend`] trait is the seam between the session logic and
//! the transport; [`HttpBackend`] implements it with `reqwest`. Response
//! classification lives in [`classify_response`] so it can be tested
//! without a server.

use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::config::{AnalyzeRoute, BackendConfig};
use crate::error::ClientError;
use crate::normalize::normalize_similar;
use crate::types::{AnalysisInput, SimilarArticle};

/// Characters of a non-JSON analysis body quoted in the error message.
pub const ANALYZE_EXCERPT_CHARS: usize = 200;

/// Characters of a non-JSON summarize body quoted in the error message.
pub const SUMMARIZE_EXCERPT_CHARS: usize = 300;

/// Payload of a successful `/health` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub model_status: Option<String>,
}

/// Operations the dashboard needs from the analysis service.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// `GET /health`.
    async fn health(&self) -> Result<HealthReport, ClientError>;

    /// Run an analysis and return the raw JSON body for normalization.
    async fn analyze(&self, input: &AnalysisInput) -> Result<Value, ClientError>;

    /// `POST /similar` and normalize the returned articles.
    async fn similar(&self, text: &str) -> Result<Vec<SimilarArticle>, ClientError>;

    /// `POST /summarize` and return a non-blank summary.
    async fn summarize(&self, text: &str) -> Result<String, ClientError>;

    /// Base URL shown in troubleshooting hints.
    fn base_url(&self) -> &str;
}

/// `reqwest`-backed implementation of [`AnalysisBackend`].
pub struct HttpBackend {
    client: Client,
    base_url: String,
    route: AnalyzeRoute,
    timeout_secs: u64,
}

impl HttpBackend {
    /// Create a client from configuration.
    pub fn new(config: &BackendConfig) -> Result<Self, ClientError> {
        let parsed = url::Url::parse(&config.base_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ClientError::InvalidBaseUrl {
                url: config.base_url.clone(),
                message: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ClientError::Connection {
                endpoint: config.base_url.clone(),
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            route: config.analyze_route,
            timeout_secs: config.request_timeout_secs,
        })
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Path an analysis request is sent to under the configured route.
    pub fn analyze_path(&self, input: &AnalysisInput) -> &'static str {
        match (self.route, input) {
            (AnalyzeRoute::Unified, _) => "/analyze",
            (AnalyzeRoute::Split, AnalysisInput::Text(_)) => "/analyze-text",
            (AnalyzeRoute::Split, AnalysisInput::Url(_)) => "/analyze-url",
        }
    }

    fn map_send_error(&self, path: &str, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout {
                endpoint: path.to_string(),
                timeout_secs: self.timeout_secs,
            }
        } else {
            ClientError::Connection {
                endpoint: self.endpoint_url(path),
                message: err.to_string(),
            }
        }
    }

    /// POST a JSON body and return status, content type and body text.
    async fn post(&self, path: &str, body: &Value) -> Result<RawResponse, ClientError> {
        let url = self.endpoint_url(path);
        debug!(url = url.as_str(), "Sending backend request");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_error(path, e))?;
        RawResponse::read(path, response, self).await
    }
}

/// A fully read HTTP response.
struct RawResponse {
    status: StatusCode,
    content_type: Option<String>,
    body: String,
}

impl RawResponse {
    async fn read(
        path: &str,
        response: reqwest::Response,
        backend: &HttpBackend,
    ) -> Result<Self, ClientError> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .await
            .map_err(|e| backend.map_send_error(path, e))?;
        debug!(endpoint = path, status = status.as_u16(), "Backend responded");
        Ok(Self {
            status,
            content_type,
            body,
        })
    }
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    async fn health(&self) -> Result<HealthReport, ClientError> {
        let url = self.endpoint_url("/health");
        debug!(url = url.as_str(), "Checking backend health");
        let response = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| self.map_send_error("/health", e))?;
        let raw = RawResponse::read("/health", response, self).await?;
        if !raw.status.is_success() {
            return Err(ClientError::HttpStatus {
                endpoint: "/health".to_string(),
                status: raw.status.as_u16(),
            });
        }
        let json: Value =
            serde_json::from_str(&raw.body).map_err(|e| ClientError::InvalidJson {
                endpoint: "/health".to_string(),
                message: e.to_string(),
                excerpt: excerpt(&raw.body, ANALYZE_EXCERPT_CHARS),
            })?;
        Ok(HealthReport {
            model_status: json
                .get("model_status")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    async fn analyze(&self, input: &AnalysisInput) -> Result<Value, ClientError> {
        let path = self.analyze_path(input);
        let raw = self.post(path, &input.request_body()).await?;
        classify_response(path, raw.status, raw.content_type.as_deref(), &raw.body)
    }

    async fn similar(&self, text: &str) -> Result<Vec<SimilarArticle>, ClientError> {
        let raw = self
            .post("/similar", &serde_json::json!({ "text": text }))
            .await?;
        let json = classify_response("/similar", raw.status, raw.content_type.as_deref(), &raw.body)?;
        Ok(normalize_similar(&json))
    }

    async fn summarize(&self, text: &str) -> Result<String, ClientError> {
        let raw = self
            .post("/summarize", &serde_json::json!({ "text": text }))
            .await?;
        classify_summary(raw.status, raw.content_type.as_deref(), &raw.body)
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Whether a `Content-Type` header value denotes JSON.
pub fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| {
        let mime = ct.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        mime == "application/json" || mime.ends_with("+json")
    })
}

/// First `limit` characters of `body`, with `...` appended when truncated.
pub fn excerpt(body: &str, limit: usize) -> String {
    let mut chars = body.char_indices();
    match chars.nth(limit) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

/// Turn a response into JSON or a classified error.
///
/// Order of checks: the content type must be JSON, the body must parse,
/// a non-2xx status is an error (using the body's `error` field when
/// present), and a 2xx body carrying a non-blank `error` field is still a
/// backend-reported failure.
pub fn classify_response(
    endpoint: &str,
    status: StatusCode,
    content_type: Option<&str>,
    body: &str,
) -> Result<Value, ClientError> {
    if !is_json_content_type(content_type) {
        return Err(ClientError::NonJson {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            content_type: content_type.unwrap_or("unknown content type").to_string(),
            excerpt: excerpt(body, ANALYZE_EXCERPT_CHARS),
        });
    }

    let json: Value = serde_json::from_str(body).map_err(|e| ClientError::InvalidJson {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
        excerpt: excerpt(body, ANALYZE_EXCERPT_CHARS),
    })?;

    let reported = json
        .get("error")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string);

    match (status.is_success(), reported) {
        (_, Some(message)) => Err(ClientError::Backend {
            endpoint: endpoint.to_string(),
            status: Some(status.as_u16()),
            message,
        }),
        (false, None) => Err(ClientError::HttpStatus {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        }),
        (true, None) => Ok(json),
    }
}

/// Classify a `/summarize` response into a non-blank summary.
pub fn classify_summary(
    status: StatusCode,
    content_type: Option<&str>,
    body: &str,
) -> Result<String, ClientError> {
    const ENDPOINT: &str = "/summarize";

    if !is_json_content_type(content_type) {
        return Err(summary_body_error(status, content_type, body));
    }

    let json = classify_response(ENDPOINT, status, content_type, body)?;
    match json.get("summary").and_then(Value::as_str) {
        Some(summary) if !summary.trim().is_empty() => Ok(summary.to_string()),
        _ => Err(ClientError::MissingSummary),
    }
}

/// Error for a non-JSON `/summarize` body: an embedded `"error": "..."`
/// wins, a blank or `null` body gets a dedicated message, anything else is
/// quoted.
fn summary_body_error(status: StatusCode, content_type: Option<&str>, body: &str) -> ClientError {
    static ERROR_FIELD: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = ERROR_FIELD.get_or_init(|| Regex::new(r#""error"\s*:\s*"([^"]+)""#).ok());

    if let Some(message) = pattern
        .as_ref()
        .and_then(|re| re.captures(body))
        .and_then(|caps| caps.get(1))
    {
        return ClientError::Backend {
            endpoint: "/summarize".to_string(),
            status: Some(status.as_u16()),
            message: message.as_str().to_string(),
        };
    }

    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return ClientError::EmptyResponse {
            endpoint: "/summarize".to_string(),
        };
    }

    ClientError::NonJson {
        endpoint: "/summarize".to_string(),
        status: status.as_u16(),
        content_type: content_type.unwrap_or("unknown content type").to_string(),
        excerpt: excerpt(body, SUMMARIZE_EXCERPT_CHARS),
    }
}
