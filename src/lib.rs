//! # Orb Arena Server
//!
//! Authoritative server for a multiplayer arena where circular actors roam a
//! square field, eat consumables to grow, swallow smaller actors, and die on
//! contact with the walls.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     ORB ARENA SERVER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                                │
//! │  ├── vec2.rs     - 2D vector                                 │
//! │  └── rng.rs      - Seeded Xorshift128+ PRNG                  │
//! │                                                              │
//! │  game/           - Arena rules (seeded, single-threaded)     │
//! │  ├── entity.rs   - Actors and consumables                    │
//! │  ├── state.rs    - World state                               │
//! │  ├── movement.rs - Move commands and clamping                │
//! │  ├── consumption.rs / boundary.rs / absorption.rs            │
//! │  └── tick.rs     - One simulation step                       │
//! │                                                              │
//! │  network/        - Async I/O                                 │
//! │  ├── server.rs   - WebSocket server + config                 │
//! │  ├── gateway.rs  - Session commands into the world           │
//! │  ├── scheduler.rs- 33 ms tick loop and broadcast             │
//! │  ├── protocol.rs - Message types                             │
//! │  ├── auth.rs     - Accounts and login tokens                 │
//! │  └── scores.rs   - Score persistence                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism
//!
//! Everything under `game/` draws randomness from the world's seeded RNG and
//! iterates actors in identity order (BTreeMap). The same seed and the same
//! command sequence produce the same world.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use core::vec2::Vec2;
pub use core::rng::DeterministicRng;
pub use game::entity::{Actor, ActorId, Consumable};
pub use game::state::WorldState;
pub use network::server::{GameServer, ServerConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
