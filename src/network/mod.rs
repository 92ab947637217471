//! Network Module
//!
//! WebSocket server, wire protocol, and the collaborators the arena talks
//! to: accounts and score persistence.

pub mod protocol;
pub mod auth;
pub mod scores;
pub mod gateway;
pub mod scheduler;
pub mod server;

pub use protocol::{ClientMessage, ServerMessage};
pub use auth::{AuthConfig, AuthError, AccountStore};
pub use scores::{ScoreRecord, ScoreSink, ScoreQueue};
pub use gateway::{SessionGateway, GatewayError};
pub use scheduler::TickScheduler;
pub use server::{GameServer, ServerConfig, GameServerError};
