//! Game Rules
//!
//! Tuning constants for the arena. These are fixed for the lifetime of the
//! process; only the tick period is overridable through server configuration.

/// Side length of the square arena (world units).
pub const ARENA_SIZE: f64 = 5000.0;

/// Default tick period in milliseconds (~30 Hz).
pub const TICK_INTERVAL_MS: u64 = 33;

/// Number of consumables kept alive at all times.
pub const CONSUMABLE_COUNT: usize = 200;

/// Radius of a freshly spawned actor.
pub const ACTOR_START_RADIUS: f64 = 30.0;

/// Distance an actor travels per move command.
pub const ACTOR_SPEED: f64 = 5.0;

/// Extra distance kept between a new actor's edge and the walls.
pub const SPAWN_PADDING: f64 = 1.0;

/// Display name used when a session joins without one.
pub const DEFAULT_ACTOR_NAME: &str = "NoName";

/// Radius of every consumable.
pub const CONSUMABLE_RADIUS: f64 = 10.0;

/// Radius gained per consumable eaten.
pub const CONSUMPTION_GROWTH: f64 = 1.0;

/// An actor must exceed the other's radius by more than this to absorb it.
pub const ABSORPTION_MARGIN: f64 = 5.0;

/// Fraction of the absorbed actor's radius added to the absorber.
pub const ABSORPTION_GAIN: f64 = 0.2;
