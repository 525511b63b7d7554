//! Loaner Server — Application entry point.

use std::path::PathBuf;

use clap::Parser;
use loaner_db::DbManager;
use loaner_server::{AppState, config};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "loaner", about = "Shared staging test-account checkout service")]
struct Cli {
    /// Configuration file (TOML or YAML). Missing files fall back to
    /// defaults and the environment.
    #[arg(long, short, default_value = "loaner.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("loaner=info"));
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    if let Err(e) = run(Cli::parse()).await {
        error!(error = %e, "Loaner server failed");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load(&cli.config)?;
    info!(path = %cli.config.display(), "Starting Loaner server...");

    let db = DbManager::connect(&config.database).await?;
    loaner_db::run_migrations(db.client()).await?;

    let listen_addr = config.listen_addr.clone();
    let state = AppState::new(db.client().clone(), config);
    state.auth.purge_expired_sessions().await?;

    let listener = TcpListener::bind(&listen_addr).await?;
    info!(addr = %listen_addr, "Listening");

    axum::serve(listener, loaner_server::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Loaner server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
