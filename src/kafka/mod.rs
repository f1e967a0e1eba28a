//! Kafka producer session built on `rdkafka`.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        KafkaSession                          │
//! │  ┌──────────────────┐  ┌──────────────────────────────────┐  │
//! │  │ FutureProducer   │  │ Operations                       │  │
//! │  │ + GatewayContext │  │ - send (awaits delivery report)  │  │
//! │  │ (log forwarding, │  │ - writable_partitions (metadata) │  │
//! │  │  connectivity)   │  │ - ping (cluster metadata)        │  │
//! │  │                  │  │ - close (flush, idempotent)      │  │
//! │  └──────────────────┘  └──────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Structure
//!
//! - `policy` - Delivery presets (`strong`, `low-latency`) and their client properties
//! - `context` - `ClientContext` that forwards librdkafka logs into `tracing`
//! - `connection` - Session lifecycle flags shared with the context
//!
//! # Message Timeout
//!
//! librdkafka keeps retrying an undelivered message until
//! `message.timeout.ms` expires, independently of whoever awaits the
//! delivery report. The session sets it from the publish timeout so that a
//! message the caller was told failed is never stored afterwards.
//!
//! # Blocking Calls
//!
//! Metadata requests and flushes are synchronous in librdkafka. They run on
//! `spawn_blocking` so a slow cluster never stalls the async workers.
//!
//! # Example
//!
//! ```rust,ignore
//! let session = KafkaSession::connect(&brokers, &SessionSettings::default()).await?;
//! let placement = session.send("orders", b"hello", PartitionHint::Automatic).await?;
//! session.close().await;
//! ```

mod connection;
mod context;
mod policy;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rdkafka::ClientConfig;
use rdkafka::config::RDKafkaLogLevel;
use rdkafka::error::RDKafkaErrorCode;
use rdkafka::metadata::Metadata;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use tokio::task;
use tracing::{debug, info, instrument, warn};

use crate::broker::Broker;
use crate::brokers::BrokerList;
use crate::error::{AppError, AppResult};
use crate::models::{PartitionHint, Placement};

pub use connection::SessionState;
pub use context::GatewayContext;
pub use policy::{Acks, Compression, DeliveryPolicy, DeliveryPreset};

/// Client debug contexts enabled by `--verbose`.
const VERBOSE_DEBUG_CONTEXTS: &str = "broker,topic,msg";

/// Options that shape a session, independent of where the brokers are.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub delivery: DeliveryPreset,
    /// Bound on metadata requests and the flush on close.
    pub metadata_timeout: Duration,
    /// How long the client retries an undelivered message before failing
    /// it. `None` keeps librdkafka's default.
    pub message_timeout: Option<Duration>,
    /// Forward client-library logs at every level.
    pub verbose: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            delivery: DeliveryPreset::Strong,
            metadata_timeout: Duration::from_secs(5),
            message_timeout: Some(Duration::from_secs(30)),
            verbose: false,
        }
    }
}

/// Long-lived producer session against a Kafka cluster.
///
/// Cheap to share behind an `Arc`; librdkafka serializes access to its
/// internal queues, so concurrent `send` calls need no extra locking.
pub struct KafkaSession {
    producer: FutureProducer<GatewayContext>,
    state: Arc<SessionState>,
    metadata_timeout: Duration,
}

impl KafkaSession {
    /// Create the producer and verify the cluster is reachable.
    ///
    /// librdkafka connects lazily, so a cluster-wide metadata request is made
    /// up front. Without it an unreachable cluster would only surface on the
    /// first request.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Connection` if the client cannot be created or the
    /// initial metadata request fails.
    #[instrument(skip(brokers, settings), fields(brokers = %brokers, delivery = %settings.delivery))]
    pub async fn connect(brokers: &BrokerList, settings: &SessionSettings) -> AppResult<Self> {
        info!("Creating Kafka producer session");

        let session = Self::create(brokers, settings)?;

        let metadata = session.fetch_metadata(None).await?;
        info!(
            brokers_reported = metadata.brokers().len(),
            topics = metadata.topics().len(),
            "Connected to Kafka cluster"
        );

        Ok(session)
    }

    /// Create the producer without contacting the cluster.
    fn create(brokers: &BrokerList, settings: &SessionSettings) -> AppResult<Self> {
        let state = Arc::new(SessionState::new());
        let producer: FutureProducer<GatewayContext> = client_config(brokers, settings)
            .create_with_context(GatewayContext::new(settings.verbose, state.clone()))
            .map_err(|e| AppError::Connection(e.to_string()))?;

        Ok(Self {
            producer,
            state,
            metadata_timeout: settings.metadata_timeout,
        })
    }

    /// Run a metadata request on the blocking pool.
    ///
    /// `None` asks for every topic; `Some(topic)` refreshes just that one.
    async fn fetch_metadata(&self, topic: Option<&str>) -> AppResult<Metadata> {
        let producer = self.producer.clone();
        let topic = topic.map(str::to_owned);
        let timeout = self.metadata_timeout;

        let result = task::spawn_blocking(move || {
            producer
                .client()
                .fetch_metadata(topic.as_deref(), Timeout::After(timeout))
        })
        .await
        .map_err(|e| AppError::Connection(format!("metadata task failed: {e}")))?;

        match result {
            Ok(metadata) => {
                self.state.set_connected(true);
                Ok(metadata)
            }
            Err(e) => {
                self.state.set_connected(false);
                Err(AppError::Connection(format!("metadata request failed: {e}")))
            }
        }
    }

    fn ensure_open(&self) -> AppResult<()> {
        if self.state.is_closed() {
            return Err(AppError::Connection("producer session is closed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Broker for KafkaSession {
    #[instrument(skip(self))]
    async fn writable_partitions(&self, topic: &str) -> AppResult<Vec<i32>> {
        self.ensure_open()?;

        let metadata = self.fetch_metadata(Some(topic)).await?;
        writable_partitions_from(&metadata, topic)
    }

    #[instrument(skip(self, value), fields(value_len = value.len()))]
    async fn send(&self, topic: &str, value: &[u8], hint: PartitionHint) -> AppResult<Placement> {
        self.ensure_open()?;

        let mut record = FutureRecord::<(), [u8]>::to(topic).payload(value);
        if let PartitionHint::Explicit(partition) = hint {
            record = record.partition(partition);
        }

        // Timeout::Never: wait for queue space rather than fail fast; the
        // delivery report itself is bounded by `message.timeout.ms`.
        match self.producer.send(record, Timeout::Never).await {
            Ok((partition, offset)) => {
                self.state.set_connected(true);
                Ok(Placement { partition, offset })
            }
            Err((e, _message)) => Err(AppError::Publish {
                topic: topic.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn ping(&self) -> AppResult<()> {
        self.ensure_open()?;

        self.fetch_metadata(None).await.map(|_| ())
    }

    async fn close(&self) {
        if !self.state.mark_closed() {
            debug!("Kafka session already closed");
            return;
        }

        let producer = self.producer.clone();
        let timeout = self.metadata_timeout;
        let flushed = task::spawn_blocking(move || producer.flush(Timeout::After(timeout))).await;

        match flushed {
            Ok(Ok(())) => info!("Kafka session closed"),
            Ok(Err(e)) => warn!(error = %e, "Failed to flush Kafka producer cleanly"),
            Err(e) => warn!(error = %e, "Kafka flush task failed"),
        }
    }

    fn is_connected(&self) -> bool {
        self.state.is_connected()
    }
}

/// Build the client configuration for a session.
fn client_config(brokers: &BrokerList, settings: &SessionSettings) -> ClientConfig {
    let mut config = ClientConfig::new();
    config.set("bootstrap.servers", brokers.bootstrap_servers());
    settings.delivery.policy().apply(&mut config);

    if let Some(timeout) = settings.message_timeout {
        config.set("message.timeout.ms", timeout.as_millis().to_string());
    }

    if settings.verbose {
        config
            .set("debug", VERBOSE_DEBUG_CONTEXTS)
            .set_log_level(RDKafkaLogLevel::Debug);
    } else {
        config.set_log_level(RDKafkaLogLevel::Warning);
    }

    config
}

/// Extract the writable partition ids of `topic` from a metadata response.
///
/// A partition is writable when it has a leader and reports no error. A topic
/// the cluster does not know (or whose leader election is still running
/// after auto-creation) has no writable partitions.
fn writable_partitions_from(metadata: &Metadata, topic: &str) -> AppResult<Vec<i32>> {
    let Some(entry) = metadata.topics().iter().find(|t| t.name() == topic) else {
        return Ok(Vec::new());
    };

    if let Some(err) = entry.error() {
        return match RDKafkaErrorCode::from(err) {
            RDKafkaErrorCode::UnknownTopicOrPartition | RDKafkaErrorCode::LeaderNotAvailable => {
                Ok(Vec::new())
            }
            code => Err(AppError::Connection(format!(
                "metadata for topic {topic} reported {code}"
            ))),
        };
    }

    Ok(entry
        .partitions()
        .iter()
        .filter(|p| p.leader() >= 0 && p.error().is_none())
        .map(|p| p.id())
        .collect())
}
