//! Employee time-off server.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use timeoff_server::config::validation::validate_config;
use timeoff_server::config::{load_config, ConfigError, ServerConfig};
use timeoff_server::http::HttpServer;
use timeoff_server::lifecycle::{spawn_signal_listener, Shutdown};
use timeoff_server::observability::{logging, metrics};

#[derive(Debug, Parser)]
#[command(name = "timeoff-server")]
#[command(about = "Employee time-off HTTP service", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "timeoff-server starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        chunk_size = config.streaming.chunk_size,
        request_timeout_secs = config.timeouts.request_secs,
        handle_method_not_allowed = config.routing.handle_method_not_allowed,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;
    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    server.run(listener, shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
