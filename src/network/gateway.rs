//! Session Gateway
//!
//! Translates per-connection commands into world mutations. Every mutation
//! takes the world write lock for its whole duration, so commands never
//! interleave partially with each other or with a tick.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::core::vec2::Vec2;
use crate::game::entity::ActorId;
use crate::game::movement::apply_move;
use crate::game::state::WorldState;
use crate::network::auth::{
    hash_password, issue_token, validate_token, verify_password, AccountStore, AuthConfig,
    AuthError,
};
use crate::network::protocol::{ActorView, ErrorCode};
use crate::network::scores::ScoreQueue;

/// Gateway errors surfaced to the connection.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Join attempted without a token while the gate is enabled.
    #[error("login required")]
    NotAuthenticated,

    /// Token or account check failed.
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
}

impl GatewayError {
    /// Wire error code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            GatewayError::NotAuthenticated => ErrorCode::NotAuthenticated,
            GatewayError::Auth(AuthError::Expired) => ErrorCode::TokenExpired,
            GatewayError::Auth(_) => ErrorCode::InvalidToken,
        }
    }
}

/// Entry point for all commands arriving from sessions.
#[derive(Clone)]
pub struct SessionGateway {
    world: Arc<RwLock<WorldState>>,
    accounts: Arc<RwLock<AccountStore>>,
    auth: AuthConfig,
    scores: ScoreQueue,
}

impl SessionGateway {
    /// Create a gateway over a shared world.
    pub fn new(world: Arc<RwLock<WorldState>>, auth: AuthConfig, scores: ScoreQueue) -> Self {
        Self {
            world,
            accounts: Arc::new(RwLock::new(AccountStore::with_cost(auth.password_cost))),
            auth,
            scores,
        }
    }

    /// Shared world handle.
    pub fn world(&self) -> Arc<RwLock<WorldState>> {
        self.world.clone()
    }

    /// Whether `join` requires a login token.
    pub fn gate_enabled(&self) -> bool {
        self.auth.is_configured()
    }

    /// A connection was opened.
    ///
    /// With the gate disabled the connection gets a default actor straight
    /// away; otherwise it has to log in and join first.
    pub async fn on_connect(&self, id: ActorId) -> Option<ActorView> {
        if self.gate_enabled() {
            return None;
        }

        let mut world = self.world.write().await;
        let actor = world.spawn_actor(id, None);
        debug!(actor = %id, "default actor spawned on connect");
        Some(ActorView::from(actor))
    }

    /// Create or replace the actor for `id`.
    pub async fn on_join(
        &self,
        id: ActorId,
        name: Option<&str>,
        token: Option<&str>,
    ) -> Result<ActorView, GatewayError> {
        if self.gate_enabled() {
            let token = token.ok_or(GatewayError::NotAuthenticated)?;
            let claims = validate_token(token, &self.auth)?;
            debug!(actor = %id, account = %claims.sub, "join token accepted");
        }

        let mut world = self.world.write().await;
        let actor = world.spawn_actor(id, name);
        info!(actor = %id, name = %actor.name, "actor joined");
        Ok(ActorView::from(actor))
    }

    /// Apply a move command. Returns whether an actor was moved.
    pub async fn on_move(&self, id: ActorId, direction: Vec2) -> bool {
        if !direction.is_finite() {
            debug!(actor = %id, "ignoring non-finite move");
            return false;
        }

        let mut world = self.world.write().await;
        match world.get_actor_mut(&id) {
            Some(actor) => {
                apply_move(actor, direction);
                true
            }
            None => {
                debug!(actor = %id, "move for unknown actor ignored");
                false
            }
        }
    }

    /// A connection closed. Returns whether an actor was removed.
    pub async fn on_disconnect(&self, id: ActorId) -> bool {
        let removed = self.world.write().await.remove_actor(&id).is_some();
        if removed {
            debug!(actor = %id, "actor removed on disconnect");
        }
        removed
    }

    /// Queue a score for persistence. Never waits on storage.
    pub fn on_score_save(&self, name: &str, score: f64) {
        if !self.scores.submit(name, score) {
            warn!(name, score, "score worker is not running; score dropped");
        }
    }

    /// Create an account.
    ///
    /// The bcrypt hash is computed on the blocking pool with no lock held.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let cost = {
            let accounts = self.accounts.read().await;
            accounts.check_available(username, password)?;
            accounts.cost()
        };

        let password = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| AuthError::PasswordHash(e.to_string()))??;

        self.accounts
            .write()
            .await
            .insert_hashed(username, password_hash)?;
        info!(username, "account registered");
        Ok(())
    }

    /// Check credentials. Returns a login token when the gate is enabled.
    pub async fn login(&self, username: &str, password: &str) -> Result<Option<String>, AuthError> {
        let stored = self
            .accounts
            .read()
            .await
            .password_hash(username)
            .map(str::to_owned)
            .ok_or(AuthError::InvalidCredentials)?;

        let password = password.to_owned();
        tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .map_err(|e| AuthError::PasswordHash(e.to_string()))??;

        if self.gate_enabled() {
            issue_token(username, &self.auth).map(Some)
        } else {
            Ok(None)
        }
    }
}
