//! Shared fixtures for the gateway's HTTP tests.
//!
//! `MemoryBroker` stands in for a Kafka cluster: each topic is a fixed list
//! of partitions, each either writable or not, appending to an in-memory log.
#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kafka_http_gateway::{
    AppError, AppResult, AppState, Broker, Config, PartitionHint, PartitionStrategy, Placement,
    build_router,
};
use reqwest::Client;
use tokio::net::TcpListener;

#[derive(Default)]
struct MemoryPartition {
    writable: bool,
    log: Vec<Vec<u8>>,
}

/// In-memory cluster used in place of a real Kafka session.
#[derive(Default)]
pub struct MemoryBroker {
    topics: Mutex<HashMap<String, Vec<MemoryPartition>>>,
    next_automatic: AtomicUsize,
    fail_sends: AtomicBool,
    sends: AtomicUsize,
    closes: AtomicUsize,
    closed: AtomicBool,
    unreachable: AtomicBool,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a topic whose partitions are writable where `writable[i]` is true.
    pub fn with_topic(self, topic: &str, writable: &[bool]) -> Self {
        let partitions = writable
            .iter()
            .map(|&writable| MemoryPartition {
                writable,
                log: Vec::new(),
            })
            .collect();
        self.topics
            .lock()
            .unwrap()
            .insert(topic.to_string(), partitions);
        self
    }

    /// Make every subsequent send fail as an unreachable cluster would.
    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }

    /// Simulate the whole cluster going away or coming back.
    pub fn set_reachable(&self, reachable: bool) {
        self.unreachable.store(!reachable, Ordering::SeqCst);
    }

    /// Number of send attempts that reached the broker.
    pub fn send_count(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Messages stored in one partition, in offset order.
    pub fn messages(&self, topic: &str, partition: i32) -> Vec<Vec<u8>> {
        let topics = self.topics.lock().unwrap();
        topics
            .get(topic)
            .and_then(|partitions| partitions.get(partition as usize))
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn writable_partitions(&self, topic: &str) -> AppResult<Vec<i32>> {
        let topics = self.topics.lock().unwrap();
        let writable = topics
            .get(topic)
            .map(|partitions| {
                partitions
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.writable)
                    .map(|(id, _)| id as i32)
                    .collect()
            })
            .unwrap_or_default();
        Ok(writable)
    }

    async fn send(&self, topic: &str, value: &[u8], hint: PartitionHint) -> AppResult<Placement> {
        self.sends.fetch_add(1, Ordering::SeqCst);

        if self.closed.load(Ordering::SeqCst) {
            return Err(AppError::Connection("producer session is closed".to_string()));
        }
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(AppError::Publish {
                topic: topic.to_string(),
                reason: "Local: All broker connections are down".to_string(),
            });
        }

        let mut topics = self.topics.lock().unwrap();
        let unknown = || AppError::Publish {
            topic: topic.to_string(),
            reason: "Broker: Unknown topic or partition".to_string(),
        };
        let partitions = topics.get_mut(topic).ok_or_else(unknown)?;

        let partition = match hint {
            PartitionHint::Explicit(p) => p,
            PartitionHint::Automatic => {
                let writable: Vec<i32> = partitions
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.writable)
                    .map(|(id, _)| id as i32)
                    .collect();
                if writable.is_empty() {
                    return Err(AppError::Publish {
                        topic: topic.to_string(),
                        reason: "Broker: Leader not available".to_string(),
                    });
                }
                let turn = self.next_automatic.fetch_add(1, Ordering::SeqCst);
                writable[turn % writable.len()]
            }
        };

        let target = partitions
            .get_mut(partition as usize)
            .ok_or_else(unknown)?;
        target.log.push(value.to_vec());

        Ok(Placement {
            partition,
            offset: (target.log.len() - 1) as i64,
        })
    }

    async fn ping(&self) -> AppResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(AppError::Connection("producer session is closed".to_string()));
        }
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(AppError::Connection("all brokers down".to_string()));
        }
        Ok(())
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
    }

    fn is_connected(&self) -> bool {
        !self.closed.load(Ordering::SeqCst) && !self.unreachable.load(Ordering::SeqCst)
    }
}

/// A gateway served on an ephemeral port, backed by a `MemoryBroker`.
pub struct TestGateway {
    pub broker: Arc<MemoryBroker>,
    pub state: AppState,
    pub client: Client,
    base_url: String,
}

impl TestGateway {
    pub async fn start(broker: MemoryBroker, strategy: PartitionStrategy) -> Self {
        let config = Config {
            partition_strategy: strategy,
            ..Config::default()
        };
        Self::start_with_config(broker, config).await
    }

    pub async fn start_with_config(broker: MemoryBroker, config: Config) -> Self {
        let broker = Arc::new(broker);
        let state = AppState::new(broker.clone(), config);
        let app = build_router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            broker,
            state,
            client: Client::new(),
            base_url: format!("http://{addr}"),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a raw body to `/` and return status and text.
    pub async fn post_root(&self, body: impl Into<String>) -> (u16, String) {
        let response = self
            .client
            .post(self.url("/"))
            .body(body.into())
            .send()
            .await
            .expect("Request failed");
        let status = response.status().as_u16();
        (status, response.text().await.unwrap())
    }
}

/// Parse `Success to store one message into [<topic>], partition:<p>, offset:<o>`.
pub fn parse_confirmation(body: &str) -> (String, i32, i64) {
    let rest = body
        .strip_prefix("Success to store one message into [")
        .unwrap_or_else(|| panic!("unexpected body: {body}"));
    let (topic, rest) = rest.split_once("], partition:").unwrap();
    let (partition, offset) = rest.split_once(", offset:").unwrap();
    (
        topic.to_string(),
        partition.parse().unwrap(),
        offset.parse().unwrap(),
    )
}
