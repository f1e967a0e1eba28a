use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::validation::validate_topic_name;

/// A message to publish: the destination topic and its raw value.
///
/// Built once per request and moved into the publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEnvelope {
    pub topic: String,
    pub value: Vec<u8>,
}

/// Wire shape of the request body.
#[derive(Deserialize)]
struct EnvelopeBody {
    topic: String,
    #[serde(default)]
    value: String,
}

impl MessageEnvelope {
    pub fn new(topic: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            value: value.into(),
        }
    }

    /// Decode a JSON request body of the form `{"topic": "...", "value": "..."}`.
    ///
    /// A missing `value` decodes to an empty payload. Unknown fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Decode` carrying the parser message when the body is
    /// not valid JSON, lacks `topic`, or names a topic Kafka would reject.
    pub fn from_json(body: &[u8]) -> AppResult<Self> {
        let parsed: EnvelopeBody =
            serde_json::from_slice(body).map_err(|e| AppError::Decode(e.to_string()))?;

        validate_topic_name(&parsed.topic)?;

        Ok(Self {
            topic: parsed.topic,
            value: parsed.value.into_bytes(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_body() {
        let envelope =
            MessageEnvelope::from_json(br#"{"topic":"orders","value":"hello"}"#).unwrap();

        assert_eq!(envelope, MessageEnvelope::new("orders", "hello"));
    }

    #[test]
    fn test_decode_missing_value_is_empty() {
        let envelope = MessageEnvelope::from_json(br#"{"topic":"orders"}"#).unwrap();

        assert!(envelope.value.is_empty());
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let envelope =
            MessageEnvelope::from_json(br#"{"topic":"orders","value":"x","key":"k"}"#).unwrap();

        assert_eq!(envelope.value, b"x");
    }

    #[test]
    fn test_decode_not_json() {
        let err = MessageEnvelope::from_json(b"not-json").unwrap_err();

        assert!(matches!(err, AppError::Decode(_)));
        assert!(err.to_string().contains("expected"));
    }

    #[test]
    fn test_decode_missing_topic() {
        let err = MessageEnvelope::from_json(br#"{"value":"hello"}"#).unwrap_err();

        assert!(matches!(err, AppError::Decode(_)));
        assert!(err.to_string().contains("missing field `topic`"));
    }

    #[test]
    fn test_decode_empty_topic() {
        let err = MessageEnvelope::from_json(br#"{"topic":"","value":"hello"}"#).unwrap_err();

        assert!(matches!(err, AppError::Decode(_)));
    }

    #[test]
    fn test_decode_wrong_types() {
        assert!(MessageEnvelope::from_json(br#"{"topic":42}"#).is_err());
        assert!(MessageEnvelope::from_json(br#"["orders","hello"]"#).is_err());
        assert!(MessageEnvelope::from_json(b"").is_err());
    }

    #[test]
    fn test_decode_keeps_utf8_bytes() {
        let envelope =
            MessageEnvelope::from_json(r#"{"topic":"t","value":"héllo"}"#.as_bytes()).unwrap();

        assert_eq!(envelope.value, "héllo".as_bytes());
    }
}
