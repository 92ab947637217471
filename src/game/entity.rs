//! Entity Model
//!
//! Actors (one per joined session) and consumables (static food items).

use std::fmt;
use serde::{Serialize, Deserialize, Serializer, Deserializer};

use crate::core::rng::DeterministicRng;
use crate::core::vec2::Vec2;
use crate::game::rules::{
    ARENA_SIZE, ACTOR_START_RADIUS, ACTOR_SPEED, SPAWN_PADDING,
    DEFAULT_ACTOR_NAME, CONSUMABLE_RADIUS,
};

// =============================================================================
// ACTOR ID
// =============================================================================

/// Opaque actor identity (UUID, one per connection).
///
/// Implements Ord so the world map iterates in a fixed order; the resolvers
/// rely on that order for their tie-breaks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub uuid::Uuid);

impl ActorId {
    /// Fresh random identity.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(uuid::Uuid::from_bytes(bytes))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({})", self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// =============================================================================
// COLOR
// =============================================================================

/// Cosmetic colour, stored as a hue and sent as a CSS `hsl()` string.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Hue in degrees, `[0, 360)`.
    pub hue: f64,
}

impl Color {
    /// Colour with the given hue.
    pub const fn from_hue(hue: f64) -> Self {
        Self { hue }
    }

    /// Random fully saturated colour.
    pub fn random(rng: &mut DeterministicRng) -> Self {
        Self::from_hue(rng.random_hue())
    }

    /// CSS representation, e.g. `hsl(120, 100%, 50%)`.
    pub fn css(&self) -> String {
        format!("hsl({}, 100%, 50%)", self.hue)
    }

    /// Parse the CSS form produced by [`Color::css`].
    pub fn parse_css(s: &str) -> Option<Self> {
        let inner = s.trim().strip_prefix("hsl(")?.strip_suffix(')')?;
        let hue = inner.split(',').next()?.trim().parse::<f64>().ok()?;
        Some(Self::from_hue(hue))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.css())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::parse_css(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hsl colour: {}", s)))
    }
}

// =============================================================================
// ACTOR
// =============================================================================

/// A live participant in the arena.
#[derive(Clone, Debug, PartialEq)]
pub struct Actor {
    /// Identity, equal to the owning session's id
    pub id: ActorId,

    /// Display label
    pub name: String,

    /// Centre position
    pub position: Vec2,

    /// Collision radius; only ever grows
    pub radius: f64,

    /// Cosmetic colour, fixed at creation
    pub color: Color,

    /// Distance covered per move command
    pub speed: f64,
}

impl Actor {
    /// Create an actor at a random position clear of the elimination band.
    ///
    /// Empty or missing names fall back to [`DEFAULT_ACTOR_NAME`].
    pub fn spawn(id: ActorId, name: Option<&str>, rng: &mut DeterministicRng) -> Self {
        let name = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => DEFAULT_ACTOR_NAME.to_string(),
        };
        let margin = ACTOR_START_RADIUS + SPAWN_PADDING;
        let position = rng.random_position(margin, ARENA_SIZE - margin);
        let color = Color::random(rng);

        Self {
            id,
            name,
            position,
            radius: ACTOR_START_RADIUS,
            color,
            speed: ACTOR_SPEED,
        }
    }

    /// Create an actor at an explicit position and radius.
    pub fn at(id: ActorId, name: &str, position: Vec2, radius: f64) -> Self {
        Self {
            id,
            name: name.to_string(),
            position,
            radius,
            color: Color::from_hue(0.0),
            speed: ACTOR_SPEED,
        }
    }

    /// Radius and position are finite and the radius is positive.
    pub fn is_well_formed(&self) -> bool {
        self.radius.is_finite() && self.radius > 0.0 && self.position.is_finite()
    }
}

// =============================================================================
// CONSUMABLE
// =============================================================================

/// A static item that grows whichever actor overlaps it.
#[derive(Clone, Debug, PartialEq)]
pub struct Consumable {
    /// Centre position
    pub position: Vec2,

    /// Collision radius
    pub radius: f64,

    /// Cosmetic colour
    pub color: Color,
}

impl Consumable {
    /// Create a consumable anywhere in the arena.
    pub fn spawn(rng: &mut DeterministicRng) -> Self {
        let position = rng.random_position(0.0, ARENA_SIZE);
        let color = Color::random(rng);
        Self {
            position,
            radius: CONSUMABLE_RADIUS,
            color,
        }
    }

    /// Create a consumable at an explicit position.
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            radius: CONSUMABLE_RADIUS,
            color: Color::from_hue(0.0),
        }
    }
}
