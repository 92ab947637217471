//! Orb Arena Server
//!
//! Reads configuration from the environment, starts the WebSocket server and
//! the tick loop, and shuts down cleanly on Ctrl-C.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use orb_arena::{
    game::rules::{ARENA_SIZE, CONSUMABLE_COUNT},
    GameServer, ServerConfig, VERSION,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    let config = ServerConfig::from_env().context("invalid configuration")?;

    info!("Orb Arena Server v{}", VERSION);
    info!("Arena: {}x{}, {} consumables", ARENA_SIZE, ARENA_SIZE, CONSUMABLE_COUNT);
    info!("Tick interval: {} ms", config.tick_interval.as_millis());
    info!("Bind address: {}", config.bind_addr);

    let server = GameServer::new(config).context("failed to create server")?;

    let run = server.run();
    tokio::pin!(run);

    tokio::select! {
        result = &mut run => {
            result.context("server stopped with an error")?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for shutdown signal")?;
            info!("Ctrl-C received, shutting down");
            server.shutdown();
            run.await.context("server stopped with an error")?;
        }
    }

    info!("Server stopped");
    Ok(())
}
