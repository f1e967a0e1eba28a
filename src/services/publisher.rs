use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use tracing::{error, info, instrument};

use crate::broker::Broker;
use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::models::{MessageEnvelope, Placement};
use crate::partition::PartitionSelector;

/// Publishes envelopes through the shared broker session.
///
/// Each call resolves a partition hint, sends synchronously, and writes one
/// audit log line for the outcome. Nothing is retried here; the session's
/// own retry budget is the only one.
///
/// # Counter Memory Ordering
///
/// `messages_published` uses `Ordering::Relaxed`: it is a monotonic metric
/// and no control flow reads it.
#[derive(Clone)]
pub struct PublisherService {
    broker: Arc<dyn Broker>,
    selector: PartitionSelector,
    /// Last-resort bound on a send. The session expires undelivered messages
    /// itself before this fires. `None` waits for the broker indefinitely.
    deadline: Option<Duration>,
    messages_published: Arc<AtomicU64>,
}

impl PublisherService {
    pub fn new(
        broker: Arc<dyn Broker>,
        selector: PartitionSelector,
        deadline: Option<Duration>,
    ) -> Self {
        Self {
            broker,
            selector,
            deadline,
            messages_published: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Publish one envelope and return where it was stored.
    ///
    /// # Errors
    ///
    /// - `AppError::Selection` when manual selection finds no writable partition;
    ///   nothing is sent in that case
    /// - `AppError::Connection` when metadata cannot be fetched or the session is closed
    /// - `AppError::Publish` when the broker does not acknowledge the message,
    ///   including when the session's message timeout expires it
    /// - `AppError::Timeout` when the deadline elapses before the session reports
    #[instrument(skip(self, envelope), fields(topic = %envelope.topic, value_len = envelope.value.len()))]
    pub async fn publish(&self, envelope: MessageEnvelope) -> AppResult<Placement> {
        let topic = envelope.topic.clone();
        let started = Instant::now();

        let result = self.publish_inner(envelope).await;
        let elapsed = started.elapsed().as_secs_f64();

        match &result {
            Ok(placement) => {
                self.messages_published.fetch_add(1, Ordering::Relaxed);
                metrics::record_publish_success(&topic, elapsed);
                info!(
                    topic = %topic,
                    partition = placement.partition,
                    offset = placement.offset,
                    "Success to store one message"
                );
            }
            Err(e) => {
                metrics::record_publish_failure(e.kind(), elapsed);
                error!(topic = %topic, error = %e, "Failed to store message");
            }
        }

        result
    }

    async fn publish_inner(&self, envelope: MessageEnvelope) -> AppResult<Placement> {
        let hint = self.selector.resolve(self.broker.as_ref(), &envelope.topic).await?;
        let send = self.broker.send(&envelope.topic, &envelope.value, hint);

        match self.deadline {
            Some(limit) => tokio::time::timeout(limit, send)
                .await
                .map_err(|_| AppError::Timeout {
                    topic: envelope.topic.clone(),
                    millis: limit.as_millis(),
                })?,
            None => send.await,
        }
    }

    /// Shared broker session.
    pub fn broker(&self) -> &Arc<dyn Broker> {
        &self.broker
    }

    /// Total messages acknowledged since startup.
    pub fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }
}
