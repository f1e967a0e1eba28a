//! Process configuration from command-line flags.
//!
//! # Configuration Hierarchy
//!
//! Every flag falls back to an environment variable, which falls back to a
//! default. A `.env` file in the working directory is loaded before parsing,
//! so it can supply any of the variables below.
//!
//! # Flags
//!
//! - `--addr` / `GATEWAY_ADDR`: HTTP bind address (default: `0.0.0.0:8880`)
//! - `--config` / `GATEWAY_BROKER_CONFIG`: broker list file (default: `config`)
//! - `--verbose` / `GATEWAY_VERBOSE`: forward all Kafka client logs
//! - `--delivery` / `GATEWAY_DELIVERY`: `strong` (default) or `low-latency`
//! - `--partition-strategy` / `GATEWAY_PARTITION_STRATEGY`: `automatic` (default) or `random-writable`
//! - `--log-format` / `LOG_FORMAT`: `text` (default) or `json`
//!
//! # Tuning
//!
//! - `PUBLISH_TIMEOUT_SECS`: how long the client keeps an undelivered message, 0 = client default (default: 30)
//! - `METADATA_TIMEOUT_MS`: bound on metadata requests and the shutdown flush (default: 5000)
//! - `MAX_REQUEST_BODY_SIZE`: request body limit in bytes (default: 1 MiB)
//! - `HEALTH_CHECK_INTERVAL_SECS`: broker connectivity check period (default: 30)
//! - `METRICS_PORT`: Prometheus listener port, 0 disables (default: 0)

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::error::{AppError, AppResult};
use crate::kafka::{DeliveryPreset, SessionSettings};
use crate::partition::PartitionStrategy;

/// Grace period between the client expiring a message and the gateway
/// giving up on its delivery report.
pub const PUBLISH_DEADLINE_MARGIN: Duration = Duration::from_secs(5);

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line, for log shippers
    Json,
}

/// Command-line interface.
#[derive(Parser, Debug, Clone)]
#[command(name = "kafka-http-gateway", version, about = "Publish HTTP payloads to Kafka")]
pub struct Cli {
    /// The address to bind to. A bare `:port` binds all interfaces.
    #[arg(long, env = "GATEWAY_ADDR", default_value = "0.0.0.0:8880")]
    pub addr: String,

    /// File holding one `key=host:port,host:port` line.
    #[arg(long = "config", env = "GATEWAY_BROKER_CONFIG", default_value = "config")]
    pub broker_config: PathBuf,

    /// Turn on Kafka client logging.
    #[arg(long, env = "GATEWAY_VERBOSE")]
    pub verbose: bool,

    /// Delivery guarantees for the producer session.
    #[arg(long, env = "GATEWAY_DELIVERY", value_enum, default_value_t = DeliveryPreset::Strong)]
    pub delivery: DeliveryPreset,

    /// How the target partition is chosen.
    #[arg(
        long,
        env = "GATEWAY_PARTITION_STRATEGY",
        value_enum,
        default_value_t = PartitionStrategy::Automatic
    )]
    pub partition_strategy: PartitionStrategy,

    /// Seconds the client keeps retrying an undelivered message (0 = client default).
    #[arg(long, env = "PUBLISH_TIMEOUT_SECS", default_value_t = 30)]
    pub publish_timeout_secs: u64,

    /// Milliseconds allowed for metadata requests and the shutdown flush.
    #[arg(long, env = "METADATA_TIMEOUT_MS", default_value_t = 5000)]
    pub metadata_timeout_ms: u64,

    /// Maximum accepted request body in bytes.
    #[arg(long, env = "MAX_REQUEST_BODY_SIZE", default_value_t = 1024 * 1024)]
    pub max_request_body_size: usize,

    /// Seconds between broker connectivity checks.
    #[arg(long, env = "HEALTH_CHECK_INTERVAL_SECS", default_value_t = 30)]
    pub health_check_interval_secs: u64,

    /// Port for the Prometheus endpoint (0 = disabled).
    #[arg(long, env = "METRICS_PORT", default_value_t = 0)]
    pub metrics_port: u16,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Validated gateway configuration.
#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    pub bind_addr: SocketAddr,

    /// Maximum request body size in bytes
    pub max_request_body_size: usize,

    // =========================================================================
    // Kafka Configuration
    // =========================================================================
    /// Path of the broker list file
    pub broker_config: PathBuf,

    pub delivery: DeliveryPreset,

    pub partition_strategy: PartitionStrategy,

    /// Message timeout handed to the client; `None` keeps the client default
    pub publish_timeout: Option<Duration>,

    pub metadata_timeout: Duration,

    /// Forward every Kafka client log line
    pub verbose: bool,

    // =========================================================================
    // Observability Configuration
    // =========================================================================
    pub health_check_interval: Duration,

    /// Port for Prometheus metrics endpoint (0 = disabled)
    pub metrics_port: u16,

    pub log_format: LogFormat,
}

impl Config {
    /// Load `.env`, parse the process arguments, and validate them.
    ///
    /// Exits the process with usage output on malformed flags, like any
    /// clap-based CLI.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a value parses but is invalid.
    pub fn load() -> AppResult<Self> {
        // A missing .env file is normal
        let _ = dotenvy::dotenv();

        Self::from_cli(Cli::parse())
    }

    /// Build a validated configuration from parsed flags.
    pub fn from_cli(cli: Cli) -> AppResult<Self> {
        let config = Self {
            bind_addr: parse_bind_addr(&cli.addr)?,
            max_request_body_size: cli.max_request_body_size,
            broker_config: cli.broker_config,
            delivery: cli.delivery,
            partition_strategy: cli.partition_strategy,
            publish_timeout: (cli.publish_timeout_secs > 0)
                .then(|| Duration::from_secs(cli.publish_timeout_secs)),
            metadata_timeout: Duration::from_millis(cli.metadata_timeout_ms),
            verbose: cli.verbose,
            health_check_interval: Duration::from_secs(cli.health_check_interval_secs),
            metrics_port: cli.metrics_port,
            log_format: cli.log_format,
        };

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.max_request_body_size == 0 {
            return Err(AppError::Config(
                "MAX_REQUEST_BODY_SIZE must be greater than 0".to_string(),
            ));
        }

        if self.metadata_timeout.is_zero() {
            return Err(AppError::Config(
                "METADATA_TIMEOUT_MS must be greater than 0".to_string(),
            ));
        }

        if self.health_check_interval.is_zero() {
            return Err(AppError::Config(
                "HEALTH_CHECK_INTERVAL_SECS must be greater than 0".to_string(),
            ));
        }

        if self.metrics_enabled() && self.metrics_port == self.bind_addr.port() {
            return Err(AppError::Config(format!(
                "METRICS_PORT ({}) must differ from the gateway port",
                self.metrics_port
            )));
        }

        Ok(())
    }

    /// Settings for the Kafka producer session.
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            delivery: self.delivery,
            metadata_timeout: self.metadata_timeout,
            message_timeout: self.publish_timeout,
            verbose: self.verbose,
        }
    }

    /// How long a request waits for a delivery report.
    ///
    /// Slightly longer than the client's message timeout, so an undelivered
    /// message is reported by the client as failed and never stored later.
    pub fn publish_deadline(&self) -> Option<Duration> {
        self.publish_timeout.map(|timeout| timeout + PUBLISH_DEADLINE_MARGIN)
    }

    pub fn metrics_enabled(&self) -> bool {
        self.metrics_port > 0
    }

    /// Prometheus listener address, or `None` when disabled.
    pub fn metrics_addr(&self) -> Option<SocketAddr> {
        self.metrics_enabled()
            .then(|| SocketAddr::from(([0, 0, 0, 0], self.metrics_port)))
    }
}

/// Parse a bind address, accepting the `:port` shorthand.
fn parse_bind_addr(addr: &str) -> AppResult<SocketAddr> {
    let full = match addr.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => addr.to_string(),
    };

    full.parse()
        .map_err(|e| AppError::Config(format!("Invalid bind address '{addr}': {e}")))
}

/// Defaults for tests and development.
impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8880)),
            max_request_body_size: 1024 * 1024,
            broker_config: PathBuf::from("config"),
            delivery: DeliveryPreset::Strong,
            partition_strategy: PartitionStrategy::Automatic,
            publish_timeout: Some(Duration::from_secs(30)),
            metadata_timeout: Duration::from_secs(5),
            verbose: false,
            health_check_interval: Duration::from_secs(30),
            metrics_port: 0,
            log_format: LogFormat::Text,
        }
    }
}
