//! Protocol Messages
//!
//! Wire format for client-server communication over WebSocket.
//! Messages are JSON text frames tagged by `type`. Move commands may also
//! arrive as binary frames carrying a bincode-encoded [`Direction`].

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::game::entity::{Actor, ActorId, Color, Consumable};
use crate::game::state::WorldSnapshot;

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Enter the arena (or respawn) under a display name.
    Join(JoinRequest),

    /// Request a move in the given direction.
    Move(Direction),

    /// Persist a final score.
    SaveScore(ScoreSubmission),

    /// Create an account.
    Register(Credentials),

    /// Log in to an existing account.
    Login(Credentials),

    /// Ping for latency measurement.
    Ping { timestamp: u64 },
}

/// Join request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinRequest {
    /// Display name. Missing or blank means the default name.
    #[serde(default)]
    pub name: Option<String>,
    /// Login token, required only when the account gate is enabled.
    #[serde(default)]
    pub token: Option<String>,
}

/// Movement direction. Not required to be normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Direction {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
}

impl Direction {
    /// Convert to a vector for the movement resolver.
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Decode a binary move frame.
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }

    /// Encode as a binary move frame.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }
}

/// Score submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSubmission {
    /// Player name as entered by the client
    #[serde(default)]
    pub name: String,
    /// Final score. Fractional values are kept as sent.
    #[serde(default)]
    pub score: f64,
}

/// Username and password pair for register and login.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Account name
    #[serde(default)]
    pub username: String,
    /// Plain-text password
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The sender's own actor, after connect or join.
    Init(ActorView),

    /// World state (every tick).
    Update(WorldUpdate),

    /// Registration result.
    RegisterResult(AccountResult),

    /// Login result.
    LoginResult(AccountResult),

    /// Pong response.
    Pong { timestamp: u64, server_time: u64 },

    /// Error message.
    Error(ServerError),

    /// Server is shutting down.
    Shutdown { reason: String },
}

/// Public view of an actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorView {
    /// Actor identity
    pub id: ActorId,
    /// Display name
    pub name: String,
    /// Centre X
    pub x: f64,
    /// Centre Y
    pub y: f64,
    /// Current radius
    pub radius: f64,
    /// CSS color string
    pub color: Color,
    /// Distance per move command
    pub speed: f64,
}

impl From<&Actor> for ActorView {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id,
            name: actor.name.clone(),
            x: actor.position.x,
            y: actor.position.y,
            radius: actor.radius,
            color: actor.color,
            speed: actor.speed,
        }
    }
}

/// Public view of a consumable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumableView {
    /// Centre X
    pub x: f64,
    /// Centre Y
    pub y: f64,
    /// Radius
    pub radius: f64,
    /// CSS color string
    pub color: Color,
}

impl From<&Consumable> for ConsumableView {
    fn from(consumable: &Consumable) -> Self {
        Self {
            x: consumable.position.x,
            y: consumable.position.y,
            radius: consumable.radius,
            color: consumable.color,
        }
    }
}

/// Per-tick world broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldUpdate {
    /// Live actors in identity order
    pub players: Vec<ActorView>,
    /// Every consumable
    pub foods: Vec<ConsumableView>,
}

impl From<&WorldSnapshot> for WorldUpdate {
    fn from(snapshot: &WorldSnapshot) -> Self {
        Self {
            players: snapshot.actors.iter().map(ActorView::from).collect(),
            foods: snapshot.consumables.iter().map(ConsumableView::from).collect(),
        }
    }
}

/// Outcome of register or login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountResult {
    /// Whether the request succeeded.
    pub success: bool,
    /// Login token, when one was issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Error message if failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AccountResult {
    /// Successful result, optionally carrying a token.
    pub fn ok(token: Option<String>) -> Self {
        Self { success: true, token, error: None }
    }

    /// Failed result with a message.
    pub fn failed(error: impl Into<String>) -> Self {
        Self { success: false, token: None, error: Some(error.into()) }
    }
}

/// Server error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerError {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

impl ServerError {
    /// Create an error frame payload.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Not authenticated.
    NotAuthenticated,
    /// Login token has expired.
    TokenExpired,
    /// Invalid login token (signature, format, claims).
    InvalidToken,
    /// Invalid input.
    InvalidInput,
    /// Connection limit reached.
    ServerOverloaded,
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
