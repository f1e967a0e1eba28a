use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Body returned for every unrouted request.
pub const NOT_FOUND_BODY: &str = "404 page not found";

/// Application-wide error types with appropriate HTTP status codes.
///
/// # Scope
///
/// - `Config` - bad or missing broker list, fatal at startup
/// - `Connection` - the session cannot reach the cluster (request-scoped once running)
/// - `Decode` - malformed request body, the only client error
/// - `Selection` - no writable partition for the topic
/// - `Publish` - the broker rejected or never acknowledged the message
/// - `Timeout` - the publish did not complete within the configured bound
#[derive(Error, Debug)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("kafka connection failed: {0}")]
    Connection(String),

    #[error("{0}")]
    Decode(String),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("kafka: failed to produce message to topic {topic}: {reason}")]
    Publish { topic: String, reason: String },

    #[error("publish to topic {topic} timed out after {millis}ms")]
    Timeout { topic: String, millis: u128 },

    #[error("not found")]
    NotFound,
}

/// Partition selection failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no writable partitions available for topic {topic}")]
    NoWritablePartitions { topic: String },
}

impl AppError {
    /// HTTP status this error maps to at the handler boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Decode(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Config(_)
            | AppError::Connection(_)
            | AppError::Selection(_)
            | AppError::Publish { .. }
            | AppError::Timeout { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short, fixed label for the error variant.
    ///
    /// Used as a metric label, so it never carries request data.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Connection(_) => "connection",
            AppError::Decode(_) => "decode",
            AppError::Selection(_) => "selection",
            AppError::Publish { .. } => "publish",
            AppError::Timeout { .. } => "timeout",
            AppError::NotFound => "not_found",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Decode errors echo the parser message so callers can fix their payload,
        // broker failures carry the detail behind a fixed prefix.
        let body = match &self {
            AppError::Decode(msg) => msg.clone(),
            AppError::NotFound => NOT_FOUND_BODY.to_string(),
            other => format!("Failed to store your data, {other}"),
        };

        (status, body).into_response()
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
