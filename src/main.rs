use std::process::ExitCode;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use kafka_http_gateway::config::LogFormat;
use kafka_http_gateway::{AppState, BrokerList, Config, KafkaSession, build_router, metrics, utils};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exitcode::OK as u8),
        Err(exit_code) => ExitCode::from(exit_code as u8),
    }
}

fn init_tracing(verbose: bool, format: LogFormat) {
    let default_level = if verbose { "debug" } else { "info" };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(true)
        .with_thread_ids(true);

    match format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }
}

/// Run the gateway, returning an exit code on error.
async fn run() -> Result<(), exitcode::ExitCode> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false, LogFormat::Text);
            error!("Configuration error: {e}");
            return Err(exitcode::CONFIG);
        }
    };

    init_tracing(config.verbose, config.log_format);

    info!(
        "Starting Kafka HTTP gateway v{}",
        env!("CARGO_PKG_VERSION")
    );

    let brokers = BrokerList::load(&config.broker_config).map_err(|e| {
        error!("Failed to load broker list: {e}");
        exitcode::CONFIG
    })?;
    info!("Kafka brokers: {brokers}");
    info!(
        delivery = %config.delivery,
        publish_timeout = ?config.publish_timeout,
        partition_strategy = %config.partition_strategy,
        verbose = config.verbose,
        "Configuration loaded"
    );

    if let Some(metrics_addr) = config.metrics_addr() {
        metrics::try_init_metrics(metrics_addr);
    }

    info!("Connecting to Kafka cluster...");
    let session = KafkaSession::connect(&brokers, &config.session_settings())
        .await
        .map_err(|e| {
            error!("Failed to start Kafka producer: {e}");
            exitcode::UNAVAILABLE
        })?;
    info!("Kafka producer session established");

    let addr = config.bind_addr;
    let state = AppState::new(Arc::new(session), config);
    let app = build_router(state.clone());

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind to {addr}: {e}");
        exitcode::UNAVAILABLE
    })?;

    info!("Server listening on http://{addr}");
    info!("  POST /  - Publish {{\"topic\": ..., \"value\": ...}}");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(utils::shutdown_signal())
        .await;

    // The producer is flushed even when the server failed
    info!("HTTP server stopped, closing Kafka session...");
    state.shutdown().await;

    served.map_err(|e| {
        error!("Server error: {e}");
        exitcode::SOFTWARE
    })
}
