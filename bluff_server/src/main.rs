//! Multiplayer bluffing card game server.
//!
//! Each room runs as its own actor task; clients talk to rooms over a
//! WebSocket carrying JSON messages.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Error};
use bluff::{MessageRouter, RoomManager, SessionRegistry};
use bluff_server::{
    api::{self, AppState},
    config::ServerConfig,
    logging,
};
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;
use tokio::sync::watch;

const HELP: &str = "\
Run a multiplayer bluffing card game server

USAGE:
  bluff_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:3000]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  ROOM_MAX_PLAYERS         Seats per room [default: 5]
  ROOM_HAND_SIZE           Cards dealt per player [default: 5]
  WS_BURST_LIMIT           Messages per second per connection [default: 10]
  WS_SUSTAINED_LIMIT       Messages per minute per connection [default: 100]
  RUST_LOG                 Log filter [default: info,tower_http=warn]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override: Option<SocketAddr> = pargs
        .opt_value_from_str("--bind")
        .context("Invalid --bind address")?;

    logging::init();

    let config = ServerConfig::from_env(bind_override)?;
    config.validate()?;

    // Catching signals for a graceful exit.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    set_handler(move || {
        let _ = shutdown_tx.send(true);
    })?;

    info!(
        "Rooms seat up to {} players with {} cards each",
        config.rooms.max_players, config.rooms.hand_size
    );

    let rooms = Arc::new(RoomManager::new(config.rooms));
    let sessions = Arc::new(SessionRegistry::new());
    let router = Arc::new(MessageRouter::new(rooms, sessions));

    let app = api::create_router(AppState {
        router,
        limits: config.rate_limits,
    });

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_rx))
        .await
        .context("Server error")?;

    info!("Shutting down server...");

    Ok(())
}

/// Resolves once the signal handler fires
async fn shutdown_signal(mut shutdown: watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}
