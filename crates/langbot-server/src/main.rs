//! LangBot — entry point.
//!
//! # Commands
//!
//! - `langbot serve [--config PATH] [--logs]` — run the `POST /chat` HTTP service
//! - `langbot status [--config PATH]` — show configuration and provider status

mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use langbot_core::config::load_config;
use langbot_providers::registry::find_by_name;
use langbot_server::{build_router, build_state};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// LangBot — a small chat relay in front of a hosted LLM
#[derive(Parser)]
#[command(name = "langbot", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Config file (defaults to ~/.langbot/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Show configuration and provider status
    Status {
        /// Config file (defaults to ~/.langbot/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, logs } => {
            init_logging(logs);
            load_dotenv();
            serve(config).await
        }
        Commands::Status { config } => {
            load_dotenv();
            status::run(config.as_deref())
        }
    }
}

// ─────────────────────────────────────────────
// Serve command
// ─────────────────────────────────────────────

async fn serve(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_deref());

    let env_key = find_by_name(&config.chat.provider).map_or("", |spec| spec.env_key);
    config
        .validate(env_key)
        .context("configuration is not usable")?;

    let state = build_state(&config).context("failed to initialize chat handler")?;
    let app = build_router(state);

    let host = config.server.host.as_str();
    let port = config.server.port;
    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("failed to bind {host}:{port}"))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %listener.local_addr()?,
        "LangBot listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

/// Resolve when Ctrl+C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Load `.env` from the working directory into the process environment.
fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "failed to load .env"),
    }
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("langbot=debug,langbot_core=debug,langbot_chat=debug,langbot_providers=debug,langbot_server=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
