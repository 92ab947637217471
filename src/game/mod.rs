//! Game Logic Module
//!
//! The arena simulation. Given the same seed and the same sequence of
//! commands, it produces the same world.
//!
//! ## Module Structure
//!
//! - `rules`: Tuning constants
//! - `entity`: Actors, consumables, identities and colors
//! - `state`: The world container
//! - `movement`: Move commands and clamping
//! - `collision`: Circle overlap and edge tests
//! - `consumption`: Eating consumables
//! - `boundary`: Edge elimination
//! - `absorption`: Actor versus actor
//! - `tick`: One simulation step
//! - `events`: What happened during a tick

pub mod rules;
pub mod entity;
pub mod state;
pub mod movement;
pub mod collision;
pub mod consumption;
pub mod boundary;
pub mod absorption;
pub mod tick;
pub mod events;

// Re-export key types
pub use entity::{Actor, ActorId, Color, Consumable};
pub use state::{WorldSnapshot, WorldState};
pub use movement::apply_move;
pub use tick::{tick, TickResult};
pub use events::{GameEvent, RemovalCause};
