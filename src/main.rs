//! folder-router
//!
//! An HTTP service whose API surface is composed from a directory tree.
//!
//! # Architecture Overview
//!
//! ```text
//!   routes/                       ┌──────────────────────────────────────────────┐
//!   ├── route.toml?               │                  BOOTSTRAP                   │
//!   ├── users/                    │                                              │
//!   │   ├── route.toml  ─────────▶│  walker ──▶ loader ──▶ path mapper ──▶ mount │
//!   │   └── profile/              │  (dirs)    (entry →    (/api/users/   table  │
//!   │       └── route.toml        │             unit)       profile)             │
//!   └── products/                 └──────────────────────┬───────────────────────┘
//!       └── route.toml                                   │ immutable axum::Router
//!                                                        ▼
//!     Client Request  ──▶ request id ──▶ trace ──▶ timeout ──▶ routes | / | /health
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use folder_router::config::{load_config, validate_config, ConfigError, ServerConfig};
use folder_router::lifecycle::{Bootstrap, BootstrapReport, DirectoryStatus, Shutdown};
use folder_router::observability::{logging, metrics};
use folder_router::{demo, HttpServer};

const DEFAULT_CONFIG: &str = "folder-router.toml";

#[derive(Parser)]
#[command(name = "folder-router", version)]
#[command(about = "HTTP server whose routes are organized by folder structure", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./folder-router.toml when present).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `routes.root`.
    #[arg(long)]
    routes_root: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(long)]
    bind: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Compose routes and serve them (default)
    Serve,
    /// Compose routes, print the mount table and exit
    Routes,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    logging::init_logging(&config.observability)?;
    tracing::info!("folder-router v{} starting", env!("CARGO_PKG_VERSION"));

    let command = cli.command.unwrap_or(Commands::Serve);
    // Installed before bootstrap so the mount gauges reach the exporter.
    if matches!(command, Commands::Serve) && config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        if let Err(e) = metrics::init_metrics(addr) {
            tracing::error!(error = %e, "Failed to start metrics endpoint");
        }
    }

    let registry = demo::registry();
    let report = match Bootstrap::new(&config.routes, &registry).run() {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Startup aborted");
            return Err(e.into());
        }
    };

    match command {
        Commands::Routes => {
            print_routes(&report);
            Ok(())
        }
        Commands::Serve => serve(config, report).await,
    }
}

fn resolve_config(cli: &Cli) -> Result<ServerConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None if Path::new(DEFAULT_CONFIG).is_file() => load_config(Path::new(DEFAULT_CONFIG))?,
        None => ServerConfig::default(),
    };

    if let Some(root) = &cli.routes_root {
        config.routes.root = root.clone();
    }
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

async fn serve(config: ServerConfig, report: BootstrapReport) -> Result<(), Box<dyn std::error::Error>> {
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, report.table);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn print_routes(report: &BootstrapReport) {
    for record in report.table.records() {
        println!("{}  (unit `{}`, tags: {})", record.prefix, record.unit, record.tags.join(", "));
        for (method, path) in &record.endpoints {
            println!("    {:<7} {path}", method.as_str());
        }
    }

    for outcome in &report.outcomes {
        match &outcome.status {
            DirectoryStatus::Mounted { .. } => {}
            DirectoryStatus::NoRouter => println!("skipped  {}: no router", outcome.relative),
            DirectoryStatus::LoadFailed { cause } => {
                println!("skipped  {}: load error: {cause}", outcome.relative)
            }
        }
    }

    let summary = report.summary();
    println!(
        "{} mounted, {} skipped ({} without router, {} failed)",
        summary.mounted,
        summary.skipped(),
        summary.no_router,
        summary.failed
    );
}
