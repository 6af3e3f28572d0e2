//! Kapili RPC Server - Main entrypoint.
//!
//! This is the main entry point for the Kapili RPC server application.
//! It loads configuration, initializes the logging system, and serves the standard
//! methods over HTTP until interrupted.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use kapili_rpc::config::{self, ConfigLoader, KapiliConfig, LogConfig};
use kapili_rpc::protocol::jsonrpc::{create_registry, Dispatcher, DispatcherOptions};
use kapili_rpc::transport::{HttpServer, HttpServerConfig};

/// Command line arguments for the Kapili RPC server.
#[derive(Parser, Debug)]
#[clap(name = "Kapili RPC Server", version, author, about)]
struct Args {
    /// Path to configuration file
    #[clap(short, long, value_parser)]
    config: Option<PathBuf>,

    /// Command to execute
    #[clap(subcommand)]
    command: Option<Command>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Start the server
    Start,

    /// Validate the configuration file
    Validate,

    /// Generate a default configuration file
    GenConfig {
        /// Path to output configuration file
        #[clap(short, long, value_parser)]
        output: PathBuf,
    },
}

/// Initialize the logging system.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(log: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.level))
        .context("invalid log filter")?;
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default());

    let result = if log.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_file(log.source_location)
                    .with_line_number(log.source_location)
                    .with_thread_names(true),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_file(log.source_location)
                    .with_line_number(log.source_location)
                    .with_thread_names(true),
            )
            .try_init()
    };

    result.context("failed to set global tracing subscriber")
}

/// Main entry point for the application.
fn main() -> Result<()> {
    let args = Args::parse();
    let loader = ConfigLoader::new(args.config.as_deref(), config::ENV_PREFIX);

    match args.command.unwrap_or(Command::Start) {
        Command::Start => {
            let loaded = loader.load().context("failed to load configuration")?;
            init_logging(&loaded.log)?;
            kapili_rpc::init();

            config::init_global_config(loaded);
            let global = config::get_global_config().context("configuration not initialized")?;
            let config = global.get();

            info!(
                name = %config.server.name,
                address = %config.server.address,
                version = kapili_rpc::VERSION,
                "Starting Kapili RPC server"
            );

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(config.server.worker_threads)
                .thread_name("kapili-worker")
                .enable_all()
                .build()
                .context("failed to build runtime")?;

            runtime.block_on(serve(config))
        }
        Command::Validate => {
            init_logging(&LogConfig::default())?;
            match loader.load() {
                Ok(_) => {
                    info!("Configuration validated successfully");
                    Ok(())
                }
                Err(e) => {
                    error!(error = %e, "Configuration validation error");
                    Err(e.into())
                }
            }
        }
        Command::GenConfig { output } => {
            init_logging(&LogConfig::default())?;
            info!("Generating default configuration");

            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }

            let toml = toml::to_string_pretty(&KapiliConfig::default())
                .context("failed to serialize configuration")?;
            std::fs::write(&output, toml)
                .with_context(|| format!("failed to write {}", output.display()))?;

            info!(path = %output.display(), "Default configuration written");
            Ok(())
        }
    }
}

/// Serves the standard methods until Ctrl-C.
async fn serve(config: &KapiliConfig) -> Result<()> {
    let registry = create_registry().context("failed to register methods")?;
    let dispatcher = Dispatcher::with_options(Arc::new(registry), DispatcherOptions::from(config));
    let server = HttpServer::new(HttpServerConfig::from_config(config), dispatcher);

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown requested"),
            Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
        }
        signal.cancel();
    });

    server.run(shutdown).await?;
    info!("Server stopped");
    Ok(())
}
