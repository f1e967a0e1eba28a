//! Shared application state for Axum handlers.
//!
//! # Structured Concurrency
//!
//! The broker health task is tracked with `tokio_util::task::TaskTracker`
//! and stopped through a `CancellationToken`. `shutdown()` stops it and then
//! closes the broker session, in that order.
//!
//! Each tick pings the cluster instead of reading a cached flag, so an idle
//! gateway notices when the cluster comes back.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, trace, warn};

use crate::broker::Broker;
use crate::config::Config;
use crate::metrics;
use crate::partition::PartitionSelector;
use crate::services::PublisherService;

/// Shared application state, cloned into every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Publish path: selector plus broker session
    pub publisher: PublisherService,
    pub config: Arc<Config>,
    pub started_at: Instant,
    /// Result of the latest health check ping
    broker_reachable: Arc<AtomicBool>,
    task_tracker: TaskTracker,
    cancellation_token: CancellationToken,
}

impl AppState {
    /// Build state around an already connected broker session.
    ///
    /// Spawns the broker health task; call `shutdown()` before exit.
    pub fn new(broker: Arc<dyn Broker>, config: Config) -> Self {
        let publisher = PublisherService::new(
            broker,
            PartitionSelector::new(config.partition_strategy),
            config.publish_deadline(),
        );

        let broker_reachable = Arc::new(AtomicBool::new(publisher.broker().is_connected()));

        let state = Self {
            publisher,
            config: Arc::new(config),
            started_at: Instant::now(),
            broker_reachable,
            task_tracker: TaskTracker::new(),
            cancellation_token: CancellationToken::new(),
        };

        state.spawn_health_check_task();

        state
    }

    /// Periodically ping the cluster, export connectivity, and log changes.
    fn spawn_health_check_task(&self) {
        let broker = self.publisher.broker().clone();
        let reachable = self.broker_reachable.clone();
        let period = self.config.health_check_interval;
        let cancel = self.cancellation_token.clone();

        self.task_tracker.spawn(async move {
            let mut ticker = interval(period);
            let mut was_connected = reachable.load(Ordering::Relaxed);
            metrics::set_broker_connected(was_connected);

            loop {
                tokio::select! {
                    biased;

                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                let connected = tokio::select! {
                    biased;

                    _ = cancel.cancelled() => break,
                    result = broker.ping() => match result {
                        Ok(()) => true,
                        Err(e) => {
                            debug!(error = %e, "Health check ping failed");
                            false
                        }
                    },
                };

                reachable.store(connected, Ordering::Relaxed);
                metrics::set_broker_connected(connected);

                match (was_connected, connected) {
                    (true, false) => warn!("Health check: Kafka cluster became unreachable"),
                    (false, true) => info!("Health check: Kafka cluster reachable again"),
                    (false, false) => warn!("Health check: Kafka cluster is still unreachable"),
                    (true, true) => trace!("Health check: Kafka connection OK"),
                }
                was_connected = connected;
            }

            debug!("Health check task shutting down");
        });
    }

    /// Stop background tasks and close the broker session.
    ///
    /// Safe to call more than once.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown");

        self.cancellation_token.cancel();
        self.task_tracker.close();
        self.task_tracker.wait().await;

        self.publisher.broker().close().await;

        info!(
            messages_published = self.publisher.messages_published(),
            uptime_secs = self.uptime().as_secs(),
            "Shutdown complete"
        );
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Whether the latest health check reached the cluster.
    pub fn broker_reachable(&self) -> bool {
        self.broker_reachable.load(Ordering::Relaxed)
    }
}
