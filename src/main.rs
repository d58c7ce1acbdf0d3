use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use image_api::config::load_config;
use image_api::observability::{logging, metrics};
use image_api::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "image-api")]
#[command(about = "HTTP service that rotates, resizes and grayscales uploaded images", long_about = None)]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listening port; overrides PORT and the config file.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Must run before the config reads PORT/HOST.
    let dotenv = dotenvy::dotenv();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.listener.port = port;
    }

    logging::init_logging(&config.observability);

    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded .env file"),
        Err(e) => tracing::info!(error = %e, "No .env file loaded"),
    }

    tracing::info!("image-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        max_body_size = config.limits.max_body_size,
        max_dimension = config.limits.max_dimension,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validation guarantees the address parses.
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(config.listener.bind_address()).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
