//! Input validation for inbound envelopes.
//!
//! Kafka rejects topic names outside a small legal alphabet. Checking here
//! lets a bad name fail as a client error instead of a broker round trip.

use crate::error::{AppError, AppResult};

// =============================================================================
// Validation Constants
// =============================================================================

/// Maximum length for topic names.
///
/// Matches the broker-side limit (`Topic.MAX_NAME_LENGTH`).
pub const MAX_TOPIC_NAME_LENGTH: usize = 249;

/// Validate a Kafka topic name.
///
/// Rules:
/// - Must be between 1 and 249 characters
/// - Can contain ASCII alphanumerics, dots, underscores, and hyphens
/// - Cannot be exactly `.` or `..`
pub fn validate_topic_name(topic: &str) -> AppResult<()> {
    if topic.is_empty() {
        return Err(AppError::Decode("topic must not be empty".to_string()));
    }

    if topic.len() > MAX_TOPIC_NAME_LENGTH {
        return Err(AppError::Decode(format!(
            "topic name cannot exceed {MAX_TOPIC_NAME_LENGTH} characters (got {})",
            topic.len()
        )));
    }

    if topic == "." || topic == ".." {
        return Err(AppError::Decode(format!("topic name cannot be '{topic}'")));
    }

    if let Some((pos, c)) = topic
        .chars()
        .enumerate()
        .find(|(_, c)| !is_legal_topic_char(*c))
    {
        return Err(AppError::Decode(format!(
            "topic name contains invalid character '{}' at position {pos}. \
             Only alphanumeric characters, dots, underscores, and hyphens are allowed",
            c.escape_default()
        )));
    }

    Ok(())
}

fn is_legal_topic_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-'
}
