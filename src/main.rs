//! Mocky - CLI Entry Point

use anyhow::Result;
use clap::Parser;
use mocky::metrics::{AtomicCounter, NoopCounter, RouteCounter, DYNAMIC_ROUTES_COUNTER};
use mocky::{MockServer, MockyConfig, OpenApiDocument};
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "mocky",
    about = "Mocky - A simple OpenAPI Mock Server to simulate API responses based on OpenAPI specifications",
    version
)]
struct Args {
    /// Path to the OpenAPI specification file (YAML or JSON format)
    #[arg(long, default_value = "openapi.yaml")]
    file: PathBuf,

    /// Port number on which the server will listen
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Hostname or IP address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Enable the dynamic route counter
    #[arg(long)]
    otel: bool,

    /// Load the document, register its routes and exit
    #[arg(long)]
    validate: bool,
}

impl From<&Args> for MockyConfig {
    fn from(args: &Args) -> Self {
        Self {
            file: args.file.clone(),
            host: args.host.clone(),
            port: args.port,
            debug: args.debug,
            metrics: args.otel,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = MockyConfig::from(&args);

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if config.debug { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load the OpenAPI document
    info!(path = ?config.file, "Loading OpenAPI document");
    let document = OpenApiDocument::from_file(&config.file).map_err(|e| {
        error!(error = %e, "Failed to load OpenAPI file");
        e
    })?;
    if let Some(doc_info) = &document.info {
        info!(title = %doc_info.title, version = %doc_info.version, "OpenAPI document loaded");
    }

    // Register routes
    let counter = config.metrics.then(AtomicCounter::new);
    let sink: &dyn RouteCounter = match &counter {
        Some(counter) => counter,
        None => &NoopCounter,
    };
    let server = MockServer::from_document(&document, sink)?;
    if let Some(counter) = &counter {
        info!(counter = DYNAMIC_ROUTES_COUNTER, value = counter.get(), "Route metrics");
    }

    if args.validate {
        println!(
            "OpenAPI document is valid ({} routes registered)",
            server.registered()
        );
        return Ok(());
    }

    let addr = config.bind_addr()?;
    server.serve(addr).await?;

    Ok(())
}
