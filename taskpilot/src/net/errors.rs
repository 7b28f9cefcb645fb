//! Error taxonomy for the request pipeline.

use serde_json::Value;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Coarse classification a UI can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Network unreachable or connection dropped
    Transport,
    /// 401 from the backend
    Authorization,
    /// Any other 4xx
    Validation,
    /// 5xx and any other non-success status
    Server,
    /// The refresh endpoint rejected the refresh token
    Refresh,
    /// Response body did not have the expected shape
    Decode,
    /// An operation needed an access token and there was none
    NotAuthenticated,
    /// The request could not be built (bad URL or header)
    InvalidRequest,
}

/// Errors surfaced by the dispatcher, coordinator, facades and channels
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failure
    #[error("Network request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// WebSocket transport failure
    #[error("Streaming connection failed: {0}")]
    Channel(Box<tungstenite::Error>),

    /// The access token was rejected
    #[error("Not authorized: {}", summarize(.body))]
    Authorization { body: Value },

    /// The request was rejected (4xx other than 401)
    #[error("Request rejected with status {status}: {}", summarize(.body))]
    Validation { status: u16, body: Value },

    /// The backend failed (5xx)
    #[error("Server error with status {status}: {}", summarize(.body))]
    Server { status: u16, body: Value },

    /// The refresh endpoint returned a non-success status
    #[error("Session refresh failed: {}", summarize(.body))]
    Refresh { status: Option<u16>, body: Value },

    /// The response could not be decoded into the expected type
    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    /// No access token is available
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The target URL could not be built
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A header value contained characters HTTP does not allow
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

impl From<tungstenite::Error> for ApiError {
    fn from(error: tungstenite::Error) -> Self {
        ApiError::Channel(Box::new(error))
    }
}

impl ApiError {
    /// Classify a non-success HTTP status and its parsed body.
    pub fn from_status(status: u16, body: Value) -> Self {
        match status {
            401 => ApiError::Authorization { body },
            400..=499 => ApiError::Validation { status, body },
            _ => ApiError::Server { status, body },
        }
    }

    /// A decode error for a response that parsed but broke an invariant.
    pub fn malformed(message: impl std::fmt::Display) -> Self {
        ApiError::Decode(<serde_json::Error as serde::de::Error>::custom(message))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) | ApiError::Channel(_) => ErrorKind::Transport,
            ApiError::Authorization { .. } => ErrorKind::Authorization,
            ApiError::Validation { .. } => ErrorKind::Validation,
            ApiError::Server { .. } => ErrorKind::Server,
            ApiError::Refresh { .. } => ErrorKind::Refresh,
            ApiError::Decode(_) => ErrorKind::Decode,
            ApiError::NotAuthenticated => ErrorKind::NotAuthenticated,
            ApiError::InvalidUrl(_) | ApiError::InvalidHeader(_) => ErrorKind::InvalidRequest,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Authorization { .. } => Some(401),
            ApiError::Validation { status, .. } | ApiError::Server { status, .. } => Some(*status),
            ApiError::Refresh { status, .. } => *status,
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Parsed response body, for callers that render backend messages.
    pub fn body(&self) -> Option<&Value> {
        match self {
            ApiError::Authorization { body }
            | ApiError::Validation { body, .. }
            | ApiError::Server { body, .. }
            | ApiError::Refresh { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Human-readable message from the backend body (`detail`, `message` or
    /// `error`), if it sent one.
    pub fn detail(&self) -> Option<&str> {
        self.body().and_then(body_message)
    }

    pub fn is_authorization_failure(&self) -> bool {
        matches!(self, ApiError::Authorization { .. })
    }

    /// The session is gone and the user has to sign in again.
    pub fn needs_reauth(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Authorization | ErrorKind::Refresh | ErrorKind::NotAuthenticated
        )
    }

    /// Worth retrying later without user action.
    pub fn is_transient(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport | ErrorKind::Server)
    }
}

/// Result type for the request pipeline
pub type ApiResult<T> = Result<T, ApiError>;

fn body_message(body: &Value) -> Option<&str> {
    ["detail", "message", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
}

fn summarize(body: &Value) -> String {
    match body_message(body) {
        Some(message) => message.to_string(),
        None => body.to_string(),
    }
}
