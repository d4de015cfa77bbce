//! Error types for the NewsLens core library.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering the backend client, the analysis session and configuration.

use crate::types::ActionKind;

/// Top-level error type for operations outside the request cycle
/// (configuration loading and writing).
#[derive(Debug, thiserror::Error)]
pub enum NewsLensError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse failure class of a [`ClientError`], used to pick the user-facing
/// wording and troubleshooting hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The request never produced an HTTP response.
    Network,
    /// Non-2xx status without a usable `error` message.
    HttpStatus,
    /// The body was not JSON (wrong content type or unparseable).
    NonJson,
    /// The backend reported an `error` message or an unusable payload.
    Backend,
}

/// Errors from talking to the analysis backend.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Could not connect to the analysis backend at {endpoint}: {message}")]
    Connection { endpoint: String, message: String },

    #[error("Request to {endpoint} timed out after {timeout_secs}s")]
    Timeout { endpoint: String, timeout_secs: u64 },

    #[error("{endpoint} failed (HTTP {status})")]
    HttpStatus { endpoint: String, status: u16 },

    #[error("Server returned {content_type}. Response: {excerpt}")]
    NonJson {
        endpoint: String,
        status: u16,
        content_type: String,
        excerpt: String,
    },

    #[error("Server returned malformed JSON ({message}). Raw response: {excerpt}")]
    InvalidJson {
        endpoint: String,
        message: String,
        excerpt: String,
    },

    /// Message reported by the backend in its `error` field, shown verbatim.
    #[error("{message}")]
    Backend {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },

    #[error("No summary or error was returned by the server (empty/null response).")]
    EmptyResponse { endpoint: String },

    #[error("The server did not return a summary. Please try again.")]
    MissingSummary,

    #[error("Invalid backend URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },
}

impl ClientError {
    /// The failure class this error belongs to.
    pub fn class(&self) -> FailureClass {
        match self {
            ClientError::Connection { .. }
            | ClientError::Timeout { .. }
            | ClientError::InvalidBaseUrl { .. } => FailureClass::Network,
            ClientError::HttpStatus { .. } => FailureClass::HttpStatus,
            ClientError::NonJson { .. } | ClientError::InvalidJson { .. } => FailureClass::NonJson,
            ClientError::Backend { .. }
            | ClientError::EmptyResponse { .. }
            | ClientError::MissingSummary => FailureClass::Backend,
        }
    }

    /// HTTP status of the response that caused this error, if one arrived.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::HttpStatus { status, .. } | ClientError::NonJson { status, .. } => {
                Some(*status)
            }
            ClientError::Backend { status, .. } => *status,
            _ => None,
        }
    }
}

/// Errors from the analysis session's request cycle.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Please enter a news article or snippet to {verb}.", verb = .action.verb())]
    EmptyInput { action: ActionKind },

    #[error("A {action} request is already in progress")]
    Busy { action: ActionKind },

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Errors from the configuration system.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration parse error: {message}")]
    ParseError { message: String },

    #[error("Could not serialize configuration: {message}")]
    SerializeError { message: String },
}

/// A type alias for results using the top-level `NewsLensError`.
pub type Result<T> = std::result::Result<T, NewsLensError>;
