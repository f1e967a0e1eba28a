//! Delivery policy presets for the producer session.

use std::fmt;
use std::time::Duration;

use clap::ValueEnum;
use rdkafka::ClientConfig;

/// Named delivery presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DeliveryPreset {
    /// Wait for all in-sync replicas, retry transient failures.
    #[default]
    Strong,
    /// Leader-only acks, snappy compression, batches flushed every 500ms.
    LowLatency,
}

impl DeliveryPreset {
    pub fn policy(self) -> DeliveryPolicy {
        match self {
            DeliveryPreset::Strong => DeliveryPolicy {
                acks: Acks::All,
                retries: 10,
                compression: Compression::None,
                linger: Duration::ZERO,
            },
            DeliveryPreset::LowLatency => DeliveryPolicy {
                acks: Acks::Leader,
                retries: 3,
                compression: Compression::Snappy,
                linger: Duration::from_millis(500),
            },
        }
    }
}

impl fmt::Display for DeliveryPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryPreset::Strong => f.write_str("strong"),
            DeliveryPreset::LowLatency => f.write_str("low-latency"),
        }
    }
}

/// Replica acknowledgment level required before a send counts as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acks {
    Leader,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Snappy,
}

/// Producer settings derived from a [`DeliveryPreset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPolicy {
    pub acks: Acks,
    /// Client-side retries for retriable broker errors.
    pub retries: u32,
    pub compression: Compression,
    /// How long the client waits to fill a batch before sending.
    pub linger: Duration,
}

impl DeliveryPolicy {
    /// librdkafka properties for this policy.
    pub fn settings(&self) -> Vec<(&'static str, String)> {
        let acks = match self.acks {
            Acks::Leader => "1",
            Acks::All => "all",
        };
        let compression = match self.compression {
            Compression::None => "none",
            Compression::Snappy => "snappy",
        };

        vec![
            ("acks", acks.to_string()),
            ("retries", self.retries.to_string()),
            ("compression.type", compression.to_string()),
            ("linger.ms", self.linger.as_millis().to_string()),
        ]
    }

    pub fn apply(&self, config: &mut ClientConfig) {
        for (key, value) in self.settings() {
            config.set(key, value);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn setting(policy: &DeliveryPolicy, key: &str) -> String {
        policy
            .settings()
            .into_iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
            .unwrap()
    }

    #[test]
    fn test_default_preset_is_strong() {
        assert_eq!(DeliveryPreset::default(), DeliveryPreset::Strong);
    }

    #[test]
    fn test_strong_settings() {
        let policy = DeliveryPreset::Strong.policy();

        assert_eq!(setting(&policy, "acks"), "all");
        assert_eq!(setting(&policy, "retries"), "10");
        assert_eq!(setting(&policy, "compression.type"), "none");
        assert_eq!(setting(&policy, "linger.ms"), "0");
    }

    #[test]
    fn test_low_latency_settings() {
        let policy = DeliveryPreset::LowLatency.policy();

        assert_eq!(setting(&policy, "acks"), "1");
        assert_eq!(setting(&policy, "compression.type"), "snappy");
        assert_eq!(setting(&policy, "linger.ms"), "500");
    }

    #[test]
    fn test_apply_sets_client_config() {
        let mut config = ClientConfig::new();
        DeliveryPreset::Strong.policy().apply(&mut config);

        assert_eq!(config.get("acks"), Some("all"));
        assert_eq!(config.get("retries"), Some("10"));
    }

    #[test]
    fn test_preset_display() {
        assert_eq!(DeliveryPreset::Strong.to_string(), "strong");
        assert_eq!(DeliveryPreset::LowLatency.to_string(), "low-latency");
    }
}
