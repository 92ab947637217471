//! WebSocket Game Server
//!
//! Async WebSocket server for arena connections. Each connection gets an
//! actor identity, a reader loop that feeds the session gateway, and a writer
//! task that merges direct replies with the per-tick world broadcast.

use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, instrument, warn};

use crate::core::rng::derive_world_seed;
use crate::game::entity::ActorId;
use crate::game::rules::TICK_INTERVAL_MS;
use crate::game::state::WorldState;
use crate::network::auth::AuthConfig;
use crate::network::gateway::SessionGateway;
use crate::network::protocol::{
    AccountResult, ClientMessage, Direction, ErrorCode, ServerError, ServerMessage,
};
use crate::network::scheduler::TickScheduler;
use crate::network::scores::{open_score_sink, spawn_score_worker, ScoreError};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connections.
    pub max_connections: usize,
    /// Simulation tick period.
    pub tick_interval: Duration,
    /// Fixed world seed. Derived from boot entropy when unset.
    pub world_seed: Option<u64>,
    /// JSON-lines score log. Scores are only logged when unset.
    pub score_log_path: Option<PathBuf>,
    /// Account gate and token settings.
    pub auth: AuthConfig,
    /// Server version string.
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            max_connections: 1000,
            tick_interval: Duration::from_millis(TICK_INTERVAL_MS),
            world_seed: None,
            score_log_path: None,
            auth: AuthConfig::default(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables.
    ///
    /// Unset variables fall back to the defaults; set but unparseable ones
    /// are an error.
    pub fn from_env() -> Result<Self, GameServerError> {
        let defaults = Self::default();

        let host: IpAddr = parse_var("BIND_HOST", std::env::var("BIND_HOST").ok())?
            .unwrap_or_else(|| defaults.bind_addr.ip());
        let port: u16 = parse_var("PORT", std::env::var("PORT").ok())?
            .unwrap_or(DEFAULT_PORT);
        let max_connections = parse_var("MAX_CONNECTIONS", std::env::var("MAX_CONNECTIONS").ok())?
            .unwrap_or(defaults.max_connections);
        let tick_ms: u64 = parse_var("TICK_INTERVAL_MS", std::env::var("TICK_INTERVAL_MS").ok())?
            .unwrap_or(TICK_INTERVAL_MS);
        if tick_ms == 0 {
            return Err(GameServerError::InvalidConfig {
                key: "TICK_INTERVAL_MS",
                value: "0".into(),
            });
        }

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            max_connections,
            tick_interval: Duration::from_millis(tick_ms),
            world_seed: parse_var("WORLD_SEED", std::env::var("WORLD_SEED").ok())?,
            score_log_path: std::env::var_os("SCORE_LOG_PATH").map(PathBuf::from),
            auth: AuthConfig::from_env(),
            version: defaults.version,
        })
    }
}

/// Parse an optional configuration value.
fn parse_var<T: FromStr>(key: &'static str, raw: Option<String>) -> Result<Option<T>, GameServerError> {
    match raw {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| GameServerError::InvalidConfig { key, value }),
    }
}

/// Game server errors.
#[derive(Debug, thiserror::Error)]
pub enum GameServerError {
    /// Failed to bind to address.
    #[error("Failed to bind: {0}")]
    BindFailed(#[from] std::io::Error),

    /// Configuration value could not be parsed.
    #[error("Invalid value for {key}: {value:?}")]
    InvalidConfig {
        /// Environment variable name
        key: &'static str,
        /// Offending value
        value: String,
    },

    /// Score log could not be opened.
    #[error("Score sink error: {0}")]
    ScoreSink(#[from] ScoreError),
}

/// Connected client state.
struct ConnectedClient {
    /// Actor identity for this connection.
    actor_id: ActorId,
    /// Connection time.
    connected_at: Instant,
}

/// The game server.
pub struct GameServer {
    /// Server configuration.
    config: ServerConfig,
    /// Command entry point.
    gateway: SessionGateway,
    /// Simulation driver.
    scheduler: TickScheduler,
    /// Connected clients.
    clients: Arc<RwLock<BTreeMap<SocketAddr, ConnectedClient>>>,
    /// Shutdown signal.
    shutdown_tx: broadcast::Sender<()>,
}

impl GameServer {
    /// Create a new game server.
    ///
    /// Must be called inside a Tokio runtime; the score worker starts here.
    pub fn new(config: ServerConfig) -> Result<Self, GameServerError> {
        let sink = open_score_sink(config.score_log_path.as_deref())?;
        let (scores, _worker) = spawn_score_worker(sink);

        let seed = config.world_seed.unwrap_or_else(boot_seed);
        info!(seed, "World created");
        let world = Arc::new(RwLock::new(WorldState::new(seed)));

        let gateway = SessionGateway::new(world.clone(), config.auth.clone(), scores);
        let scheduler = TickScheduler::with_period(world, config.tick_interval);
        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(Self {
            config,
            gateway,
            scheduler,
            clients: Arc::new(RwLock::new(BTreeMap::new())),
            shutdown_tx,
        })
    }

    /// Bind the configured address and run the server.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<(), GameServerError> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Run the server on an already bound listener.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), GameServerError> {
        info!("Game server listening on {}", listener.local_addr()?);
        if self.gateway.gate_enabled() {
            info!("Join requires a login token");
        }

        let scheduler_handle = tokio::spawn(
            self.scheduler.clone().run(self.shutdown_tx.subscribe()),
        );

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            let actor_id = ActorId::generate();
                            if !self.admit(addr, actor_id).await {
                                warn!("Connection limit reached, rejecting {}", addr);
                                tokio::spawn(reject_overloaded(stream, addr));
                                continue;
                            }

                            info!("New connection from {}", addr);
                            self.handle_connection(stream, addr, actor_id);
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        if let Err(e) = scheduler_handle.await {
            error!("Tick scheduler task failed: {}", e);
        }

        Ok(())
    }

    /// Claim a connection slot. Check and insert happen under one write lock.
    async fn admit(&self, addr: SocketAddr, actor_id: ActorId) -> bool {
        let mut clients = self.clients.write().await;
        if clients.len() >= self.config.max_connections {
            return false;
        }
        clients.insert(addr, ConnectedClient {
            actor_id,
            connected_at: Instant::now(),
        });
        true
    }

    /// Handle a new WebSocket connection whose slot is already claimed.
    fn handle_connection(&self, stream: TcpStream, addr: SocketAddr, actor_id: ActorId) {
        let clients = self.clients.clone();
        let gateway = self.gateway.clone();
        let mut updates_rx = self.scheduler.subscribe();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let ws_stream = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    error!("WebSocket handshake failed for {}: {}", addr, e);
                    clients.write().await.remove(&addr);
                    return;
                }
            };

            let (mut ws_sender, mut ws_receiver) = ws_stream.split();
            let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(64);

            // Writer: direct replies plus the per-tick broadcast
            let mut sender_task = tokio::spawn(async move {
                loop {
                    let text = tokio::select! {
                        msg = msg_rx.recv() => {
                            let Some(msg) = msg else { break };
                            match msg.to_json() {
                                Ok(t) => t,
                                Err(e) => {
                                    error!("Failed to serialize message: {}", e);
                                    continue;
                                }
                            }
                        }
                        update = updates_rx.recv() => {
                            match update {
                                Ok(frame) => frame.to_string(),
                                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                                    debug!("Client {} lagging, skipped {} updates", addr, skipped);
                                    continue;
                                }
                                Err(broadcast::error::RecvError::Closed) => break,
                            }
                        }
                    };
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
            });

            if let Some(view) = gateway.on_connect(actor_id).await {
                let _ = msg_tx.send(ServerMessage::Init(view)).await;
            }

            // Handle incoming messages
            loop {
                tokio::select! {
                    msg = ws_receiver.next() => {
                        match msg {
                            Some(Ok(Message::Text(text))) => {
                                match ClientMessage::from_json(&text) {
                                    Ok(client_msg) => {
                                        Self::handle_client_message(actor_id, client_msg, &gateway, &msg_tx).await;
                                    }
                                    Err(e) => {
                                        debug!("Invalid message from {}: {}", addr, e);
                                        let _ = msg_tx.send(ServerMessage::Error(ServerError::new(
                                            ErrorCode::InvalidInput,
                                            "Invalid message format",
                                        ))).await;
                                    }
                                }
                            }
                            Some(Ok(Message::Binary(data))) => {
                                // Binary frames carry a bare move direction
                                match Direction::from_bytes(&data) {
                                    Ok(dir) => {
                                        gateway.on_move(actor_id, dir.to_vec2()).await;
                                    }
                                    Err(e) => {
                                        debug!("Invalid binary frame from {}: {}", addr, e);
                                        let _ = msg_tx.send(ServerMessage::Error(ServerError::new(
                                            ErrorCode::InvalidInput,
                                            "Invalid binary move frame",
                                        ))).await;
                                    }
                                }
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                debug!("Client {} disconnected", addr);
                                break;
                            }
                            Some(Err(e)) => {
                                error!("WebSocket error for {}: {}", addr, e);
                                break;
                            }
                            _ => {}
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        let _ = msg_tx.send(ServerMessage::Shutdown {
                            reason: "Server shutting down".to_string(),
                        }).await;
                        break;
                    }
                }
            }

            // Cleanup
            gateway.on_disconnect(actor_id).await;

            // Let the writer flush anything already queued
            drop(msg_tx);
            if tokio::time::timeout(Duration::from_millis(250), &mut sender_task).await.is_err() {
                sender_task.abort();
            }

            if let Some(client) = clients.write().await.remove(&addr) {
                info!(
                    actor = %client.actor_id,
                    connected_secs = client.connected_at.elapsed().as_secs(),
                    "Client {} cleaned up",
                    addr
                );
            }
        });
    }

    /// Handle a client message.
    async fn handle_client_message(
        actor_id: ActorId,
        msg: ClientMessage,
        gateway: &SessionGateway,
        sender: &mpsc::Sender<ServerMessage>,
    ) {
        let reply = match msg {
            ClientMessage::Join(join) => {
                match gateway.on_join(actor_id, join.name.as_deref(), join.token.as_deref()).await {
                    Ok(view) => Some(ServerMessage::Init(view)),
                    Err(e) => {
                        debug!(actor = %actor_id, "join rejected: {}", e);
                        Some(ServerMessage::Error(ServerError::new(e.code(), e.to_string())))
                    }
                }
            }
            ClientMessage::Move(dir) => {
                gateway.on_move(actor_id, dir.to_vec2()).await;
                None
            }
            ClientMessage::SaveScore(submission) => {
                gateway.on_score_save(&submission.name, submission.score);
                None
            }
            ClientMessage::Register(creds) => {
                let result = match gateway.register(&creds.username, &creds.password).await {
                    Ok(()) => AccountResult::ok(None),
                    Err(e) => AccountResult::failed(e.to_string()),
                };
                Some(ServerMessage::RegisterResult(result))
            }
            ClientMessage::Login(creds) => {
                let result = match gateway.login(&creds.username, &creds.password).await {
                    Ok(token) => AccountResult::ok(token),
                    Err(e) => AccountResult::failed(e.to_string()),
                };
                Some(ServerMessage::LoginResult(result))
            }
            ClientMessage::Ping { timestamp } => Some(ServerMessage::Pong {
                timestamp,
                server_time: unix_millis(),
            }),
        };

        if let Some(reply) = reply {
            let _ = sender.send(reply).await;
        }
    }

    /// Shutdown the server.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Get active connection count.
    pub async fn connection_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Command entry point shared by all connections.
    pub fn gateway(&self) -> &SessionGateway {
        &self.gateway
    }
}

/// Complete the handshake, send a `server_overloaded` error and close.
async fn reject_overloaded(stream: TcpStream, addr: SocketAddr) {
    let mut ws = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            debug!("Handshake failed for rejected {}: {}", addr, e);
            return;
        }
    };

    let frame = ServerMessage::Error(ServerError::new(
        ErrorCode::ServerOverloaded,
        "Server is full",
    ));
    match frame.to_json() {
        Ok(text) => {
            let _ = ws.send(Message::Text(text)).await;
        }
        Err(e) => error!("Failed to serialize message: {}", e),
    }
    let _ = ws.close(None).await;
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Seed from wall-clock time and a random UUID.
fn boot_seed() -> u64 {
    let mut entropy = Vec::with_capacity(32);
    entropy.extend_from_slice(&unix_millis().to_le_bytes());
    entropy.extend_from_slice(ActorId::generate().as_bytes());
    derive_world_seed(&entropy)
}
