//! King's Valley server binary.

#![warn(missing_docs)]

use anyhow::{Context, Result};
use clap::Parser;
use kings_valley::MatchEngine;
use kings_valley_server::cli::{Cli, Command};
use kings_valley_server::store::{MatchStore, MemoryStore, SqliteStore};
use kings_valley_server::{GameService, MatchRegistry, ServerConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            config,
            port,
            host,
            database_url,
        } => {
            let mut config = ServerConfig::load(config.as_deref())?;
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            if database_url.is_some() {
                config.database_url = database_url;
            }
            run_server(config).await
        }
        Command::Inspect {
            database_url,
            lookup,
        } => inspect(database_url, lookup),
    }
}

/// Run the HTTP game server
async fn run_server(config: ServerConfig) -> Result<()> {
    let store: Arc<dyn MatchStore> = match &config.database_url {
        Some(path) => Arc::new(SqliteStore::open(path.clone())?),
        None => {
            warn!("No database configured, matches will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };
    let service = GameService::new(Arc::new(MatchRegistry::new()), store);

    spawn_reaper(
        service.clone(),
        Duration::from_secs(config.reap_interval_secs.max(1)),
        config.max_idle()?,
    );

    let app = kings_valley_server::http::router(service);
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?;
    info!(
        host = %config.host,
        port = config.port,
        "Server ready at http://{}:{}/api/",
        config.host,
        config.port
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Periodically drops finished and idle matches from memory.
fn spawn_reaper(service: GameService, every: Duration, max_idle: chrono::Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let removed = service.reap(max_idle);
            if removed > 0 {
                info!(removed, live = service.registry().len(), "Reaper sweep");
            }
        }
    });
}

/// Print a stored match
fn inspect(database_url: String, lookup: String) -> Result<()> {
    let store = SqliteStore::open(database_url)?;
    let snapshot = match store.get(&lookup)? {
        Some(snapshot) => Some(snapshot),
        None => store.get_by_code(&lookup)?,
    }
    .with_context(|| format!("No match with id or code '{lookup}'"))?;

    let engine = MatchEngine::from_snapshot(snapshot)?;
    println!("Match {} (code {})", engine.id(), engine.join_code());
    println!("Status: {}", engine.status());
    for player in engine.players() {
        println!("Player {}: {} ({})", player.seat, player.display_name, player.id);
    }
    match engine.winner() {
        Some(side) => println!("Winner: player {side}"),
        None => println!("To move: player {}", engine.current_turn()),
    }
    println!("\n{}\n", engine.board().display());
    for (ply, mv) in engine.move_log().iter().enumerate() {
        println!("{:>3}. {}", ply + 1, mv);
    }
    Ok(())
}
