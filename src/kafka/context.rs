//! librdkafka client context: log forwarding and connectivity tracking.

use std::sync::Arc;

use rdkafka::ClientContext;
use rdkafka::config::RDKafkaLogLevel;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use tracing::{debug, error, info, warn};

use super::connection::SessionState;

/// Context attached to the producer.
///
/// librdkafka logs from its own threads; every line is re-emitted through
/// `tracing` under the `librdkafka` target. Without `verbose`, only warnings
/// and worse are forwarded.
pub struct GatewayContext {
    verbose: bool,
    state: Arc<SessionState>,
}

impl GatewayContext {
    pub fn new(verbose: bool, state: Arc<SessionState>) -> Self {
        Self { verbose, state }
    }
}

impl ClientContext for GatewayContext {
    fn log(&self, level: RDKafkaLogLevel, fac: &str, log_message: &str) {
        match level {
            RDKafkaLogLevel::Emerg
            | RDKafkaLogLevel::Alert
            | RDKafkaLogLevel::Critical
            | RDKafkaLogLevel::Error => {
                error!(target: "librdkafka", facility = fac, "{log_message}")
            }
            RDKafkaLogLevel::Warning => {
                warn!(target: "librdkafka", facility = fac, "{log_message}")
            }
            RDKafkaLogLevel::Notice | RDKafkaLogLevel::Info if self.verbose => {
                info!(target: "librdkafka", facility = fac, "{log_message}")
            }
            RDKafkaLogLevel::Debug if self.verbose => {
                debug!(target: "librdkafka", facility = fac, "{log_message}")
            }
            _ => {}
        }
    }

    fn error(&self, error: KafkaError, reason: &str) {
        if matches!(error, KafkaError::Global(RDKafkaErrorCode::AllBrokersDown)) {
            self.state.set_connected(false);
        }
        error!(target: "librdkafka", error = %error, reason, "Kafka client error");
    }
}
