//! The seam between the publish path and the broker cluster.
//!
//! [`crate::kafka::KafkaSession`] is the production implementation. The
//! publish service and partition selector only see this trait, so they can be
//! driven by an in-memory cluster in tests.

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{PartitionHint, Placement};

/// A long-lived, shareable session with a broker cluster.
///
/// Implementations must be safe to call concurrently from many request tasks
/// without external locking.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Partition ids of `topic` that currently accept writes.
    ///
    /// Always reflects live cluster metadata. An unknown topic yields an
    /// empty set rather than an error.
    async fn writable_partitions(&self, topic: &str) -> AppResult<Vec<i32>>;

    /// Send one message and wait for the broker's acknowledgment.
    ///
    /// Success means the configured acknowledgment level was reached and the
    /// returned placement is durable under that policy.
    async fn send(&self, topic: &str, value: &[u8], hint: PartitionHint) -> AppResult<Placement>;

    /// Make a lightweight round trip to the cluster.
    ///
    /// Refreshes what `is_connected` reports, so connectivity recovers even
    /// when no messages are flowing.
    async fn ping(&self) -> AppResult<()>;

    /// Release held connections. Calling it again is a no-op.
    async fn close(&self);

    /// Last known connectivity to the cluster.
    fn is_connected(&self) -> bool;
}
