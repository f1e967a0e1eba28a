//! The gateway's single endpoint.
//!
//! # Endpoints
//!
//! - `POST /` - Publish `{"topic": "...", "value": "..."}` and report its placement
//!
//! Every other method or path is answered with `404`.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use tracing::{instrument, warn};

use crate::error::{AppError, AppResult};
use crate::models::MessageEnvelope;
use crate::state::AppState;

/// Publish one message.
///
/// The body is decoded from raw bytes rather than through `Json`, so a
/// missing `Content-Type` header is not an error.
///
/// # Responses
///
/// - `200` - `Success to store one message into [<topic>], partition:<p>, offset:<o>`
/// - `400` - the decode error text
/// - `500` - `Failed to store your data, <error>`
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8880/ -d '{"topic":"orders","value":"hello"}'
/// ```
#[instrument(skip(state, body), fields(body_len = body.len()))]
pub async fn publish_message(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<(StatusCode, String)> {
    let envelope = MessageEnvelope::from_json(&body).inspect_err(|e| {
        warn!(error = %e, "Rejected malformed request body");
    })?;

    let topic = envelope.topic.clone();
    let placement = state.publisher.publish(envelope).await?;

    Ok((StatusCode::OK, placement.confirmation(&topic)))
}

/// Fallback for unsupported methods and unknown paths.
pub async fn not_found(method: Method, uri: Uri) -> AppError {
    warn!(%method, %uri, "Request to unsupported method or path");
    AppError::NotFound
}
