//! Accounts and Login Tokens
//!
//! Registration and login against an in-memory account store, plus HS256
//! tokens for gating `join`. The gate is only enforced when a token secret is
//! configured.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

/// Default bcrypt cost for stored passwords.
pub const DEFAULT_PASSWORD_COST: u32 = 10;

/// Authentication configuration.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// Issuer claim ("iss") written into and expected from tokens.
    pub issuer: Option<String>,
    /// HS256 secret. `None` disables the join gate.
    pub secret: Option<String>,
    /// Lifetime of issued tokens in seconds.
    pub token_ttl_secs: u64,
    /// Whether to skip expiry validation (for testing only).
    pub skip_expiry: bool,
    /// bcrypt cost for new accounts.
    pub password_cost: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: None,
            secret: None,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            skip_expiry: false,
            password_cost: DEFAULT_PASSWORD_COST,
        }
    }
}

impl AuthConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            issuer: std::env::var("AUTH_ISSUER").ok(),
            secret: std::env::var("AUTH_SECRET").ok().filter(|s| !s.is_empty()),
            token_ttl_secs: std::env::var("AUTH_TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TOKEN_TTL_SECS),
            skip_expiry: std::env::var("AUTH_SKIP_EXPIRY")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            password_cost: std::env::var("AUTH_PASSWORD_COST")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PASSWORD_COST),
        }
    }

    /// Check if the join gate is enabled.
    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }
}

/// Claims carried by login tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject - the account username.
    pub sub: String,
    /// Expiry timestamp (Unix seconds).
    #[serde(default)]
    pub exp: u64,
    /// Issued at timestamp.
    #[serde(default)]
    pub iat: u64,
    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No token secret configured on server.
    #[error("authentication not configured")]
    NotConfigured,
    /// Username or password was empty.
    #[error("missing username or password")]
    MissingCredentials,
    /// Username is not 3 to 15 ASCII letters.
    #[error("invalid username")]
    InvalidUsername,
    /// Password does not meet the strength rules.
    #[error("weak password")]
    WeakPassword,
    /// Username is already registered.
    #[error("username already exists")]
    UsernameTaken,
    /// Unknown username or wrong password.
    #[error("wrong username or password")]
    InvalidCredentials,
    /// bcrypt failed to hash or parse a stored hash.
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
    /// Token format is invalid.
    #[error("invalid token format")]
    InvalidFormat,
    /// Token signature verification failed.
    #[error("invalid signature")]
    InvalidSignature,
    /// Token has expired.
    #[error("token expired")]
    Expired,
    /// Issuer claim doesn't match expected value.
    #[error("invalid issuer")]
    InvalidIssuer,
    /// Required claim is missing.
    #[error("missing required claim: {0}")]
    MissingClaim(String),
    /// JWT encoding or decoding error.
    #[error("token error: {0}")]
    TokenError(String),
}

// =============================================================================
// ACCOUNT STORE
// =============================================================================

/// A stored account. The password is kept only as a bcrypt hash.
#[derive(Clone, Debug)]
struct Account {
    password_hash: String,
}

/// In-memory account registry.
#[derive(Debug)]
pub struct AccountStore {
    accounts: BTreeMap<String, Account>,
    cost: u32,
}

impl Default for AccountStore {
    fn default() -> Self {
        Self::with_cost(DEFAULT_PASSWORD_COST)
    }
}

impl AccountStore {
    /// Create an empty store hashing at the default cost.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store hashing at `cost` (bcrypt rounds, 4 to 31).
    pub fn with_cost(cost: u32) -> Self {
        Self {
            accounts: BTreeMap::new(),
            cost,
        }
    }

    /// bcrypt cost used for new accounts.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Number of registered accounts.
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether no account is registered.
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Whether `username` is registered.
    pub fn contains(&self, username: &str) -> bool {
        self.accounts.contains_key(username)
    }

    /// Check that a registration would be accepted, without hashing.
    pub fn check_available(&self, username: &str, password: &str) -> Result<(), AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        validate_username(username)?;
        validate_password(password)?;
        if self.accounts.contains_key(username) {
            return Err(AuthError::UsernameTaken);
        }
        Ok(())
    }

    /// Store an account whose password was hashed with [`hash_password`].
    pub fn insert_hashed(&mut self, username: &str, password_hash: String) -> Result<(), AuthError> {
        if self.accounts.contains_key(username) {
            return Err(AuthError::UsernameTaken);
        }
        self.accounts
            .insert(username.to_string(), Account { password_hash });
        Ok(())
    }

    /// Register a new account, hashing on the calling thread.
    pub fn register(&mut self, username: &str, password: &str) -> Result<(), AuthError> {
        self.check_available(username, password)?;
        let password_hash = hash_password(password, self.cost)?;
        self.insert_hashed(username, password_hash)
    }

    /// Stored hash for `username`.
    pub fn password_hash(&self, username: &str) -> Option<&str> {
        self.accounts
            .get(username)
            .map(|a| a.password_hash.as_str())
    }

    /// Check a username and password pair.
    pub fn verify(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let stored = self
            .password_hash(username)
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(password, stored)
    }
}

/// Usernames are 3 to 15 ASCII letters.
pub fn validate_username(username: &str) -> Result<(), AuthError> {
    let len_ok = (3..=15).contains(&username.len());
    if len_ok && username.bytes().all(|b| b.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(AuthError::InvalidUsername)
    }
}

/// Passwords need at least 6 characters, an uppercase letter and a digit.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    let long_enough = password.chars().count() >= 6;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if long_enough && has_upper && has_digit {
        Ok(())
    } else {
        Err(AuthError::WeakPassword)
    }
}

/// Hash a password with bcrypt. CPU-bound; run it off the async workers.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(password, cost).map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Check a password against a bcrypt hash.
pub fn verify_password(password: &str, password_hash: &str) -> Result<(), AuthError> {
    match bcrypt::verify(password, password_hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(AuthError::InvalidCredentials),
        Err(e) => Err(AuthError::PasswordHash(e.to_string())),
    }
}

// =============================================================================
// TOKENS
// =============================================================================

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Issue a login token for `username`.
pub fn issue_token(username: &str, config: &AuthConfig) -> Result<String, AuthError> {
    let secret = config.secret.as_ref().ok_or(AuthError::NotConfigured)?;
    let now = unix_now();
    let claims = TokenClaims {
        sub: username.to_string(),
        exp: now + config.token_ttl_secs,
        iat: now,
        iss: config.issuer.clone(),
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| AuthError::TokenError(e.to_string()))
}

/// Validate a login token and extract claims.
pub fn validate_token(token: &str, config: &AuthConfig) -> Result<TokenClaims, AuthError> {
    let secret = config.secret.as_ref().ok_or(AuthError::NotConfigured)?;

    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims = std::collections::HashSet::new();
    validation.validate_aud = false;

    if let Some(ref issuer) = config.issuer {
        validation.set_issuer(&[issuer]);
    }

    if config.skip_expiry {
        validation.validate_exp = false;
    }

    let key = DecodingKey::from_secret(secret.as_bytes());
    let token_data: TokenData<TokenClaims> =
        decode(token, &key, &validation).map_err(map_jwt_error)?;

    let claims = token_data.claims;

    if claims.sub.is_empty() {
        return Err(AuthError::MissingClaim("sub".into()));
    }

    // Manual expiry check (in case validation was skipped)
    if !config.skip_expiry && claims.exp > 0 && unix_now() > claims.exp {
        return Err(AuthError::Expired);
    }

    Ok(claims)
}

/// Map JWT library errors to our error type.
fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
        ErrorKind::InvalidToken | ErrorKind::Base64(_) => AuthError::InvalidFormat,
        _ => AuthError::TokenError(err.to_string()),
    }
}

// =============================================================================
// TESTS
// =============================================================================
