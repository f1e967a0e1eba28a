//! Partition selection policy.
//!
//! Two strategies, fixed at construction time:
//!
//! - [`PartitionStrategy::Automatic`] leaves placement to the client library's
//!   default partitioner. No metadata is fetched.
//! - [`PartitionStrategy::RandomWritable`] asks the cluster which partitions of
//!   the topic currently have a live leader and picks one uniformly at random.
//!   Messages only land on partitions known to be writable right now, at the
//!   cost of any key-based ordering (no key is sent).

use std::fmt;

use clap::ValueEnum;
use rand::Rng;
use tracing::{debug, instrument};

use crate::broker::Broker;
use crate::error::{AppResult, SelectionError};
use crate::models::PartitionHint;

/// How the target partition of a message is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PartitionStrategy {
    /// Delegate to the client's default partitioner.
    #[default]
    Automatic,
    /// Pick uniformly among partitions that currently accept writes.
    RandomWritable,
}

impl fmt::Display for PartitionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionStrategy::Automatic => f.write_str("automatic"),
            PartitionStrategy::RandomWritable => f.write_str("random-writable"),
        }
    }
}

/// Resolves a [`PartitionHint`] for each outgoing message.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartitionSelector {
    strategy: PartitionStrategy,
}

impl PartitionSelector {
    pub fn new(strategy: PartitionStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> PartitionStrategy {
        self.strategy
    }

    /// Decide where the next message for `topic` goes.
    ///
    /// With `RandomWritable`, the writable set is fetched fresh on every call.
    ///
    /// # Errors
    ///
    /// - `AppError::Selection` if the topic has no writable partition
    ///   (including a topic the cluster does not know)
    /// - any error from the metadata request itself
    #[instrument(skip(self, broker), fields(strategy = %self.strategy))]
    pub async fn resolve(&self, broker: &dyn Broker, topic: &str) -> AppResult<PartitionHint> {
        match self.strategy {
            PartitionStrategy::Automatic => Ok(PartitionHint::Automatic),
            PartitionStrategy::RandomWritable => {
                let writable = broker.writable_partitions(topic).await?;
                let partition = pick_writable(&writable, &mut rand::rng()).ok_or_else(|| {
                    SelectionError::NoWritablePartitions {
                        topic: topic.to_string(),
                    }
                })?;

                debug!(topic, ?writable, partition, "Selected writable partition");
                Ok(PartitionHint::Explicit(partition))
            }
        }
    }
}

/// Choose one partition id uniformly at random, or `None` for an empty set.
pub fn pick_writable<R: Rng + ?Sized>(writable: &[i32], rng: &mut R) -> Option<i32> {
    if writable.is_empty() {
        return None;
    }
    writable.get(rng.random_range(0..writable.len())).copied()
}
