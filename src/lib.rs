//! # Kafka HTTP Gateway
//!
//! Accepts `{"topic": ..., "value": ...}` over HTTP and synchronously
//! publishes each message to Kafka, answering with the partition and offset
//! the broker assigned.
//!
//! - **One endpoint**: `POST /`; every other method or path is `404`
//! - **Partition strategies**: broker default, or uniform random among writable partitions
//! - **Delivery presets**: `strong` (all in-sync replicas) or `low-latency` (leader only)
//! - **Observability**: request ids, structured logging, optional Prometheus endpoint
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum HTTP Server                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Middleware (Request ID → Trace → Body Limit)               │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Handler (publish_message, not_found)                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  PublisherService (PartitionSelector + Broker)              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  KafkaSession (rdkafka FutureProducer)                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Kafka cluster                                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kafka_http_gateway::{AppState, BrokerList, Config, KafkaSession, build_router};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load()?;
//!     let brokers = BrokerList::load(&config.broker_config)?;
//!     let session = KafkaSession::connect(&brokers, &config.session_settings()).await?;
//!
//!     let state = AppState::new(Arc::new(session), config);
//!     let app = build_router(state);
//!
//!     // Start the server...
//!     Ok(())
//! }
//! ```
//!
//! ## Broker Configuration
//!
//! The file named by `--config` holds a single `key=value` line:
//! ```text
//! brokers=kafka-1:9092,kafka-2:9092
//! ```

pub mod broker;
pub mod brokers;
pub mod config;
pub mod error;
pub mod handlers;
pub mod kafka;
pub mod metrics;
pub mod models;
pub mod partition;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
pub mod validation;

// Re-exports for convenience
pub use broker::Broker;
pub use brokers::BrokerList;
pub use config::{Cli, Config};
pub use error::{AppError, AppResult, SelectionError};
pub use kafka::{DeliveryPreset, KafkaSession, SessionSettings};
pub use models::{MessageEnvelope, PartitionHint, Placement};
pub use partition::{PartitionSelector, PartitionStrategy};
pub use routes::build_router;
pub use services::PublisherService;
pub use state::AppState;
