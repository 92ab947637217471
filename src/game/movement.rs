//! Movement & Bounds
//!
//! Turns a requested direction into a position change. Applied as soon as a
//! move command arrives, not on the tick.

use crate::core::vec2::Vec2;
use crate::game::entity::Actor;
use crate::game::rules::ARENA_SIZE;

/// Move `actor` one step of its speed along `direction`, then clamp.
///
/// The direction does not need to be normalized. Zero-length and non-finite
/// directions leave the position unchanged (the clamp still applies).
pub fn apply_move(actor: &mut Actor, direction: Vec2) {
    if let Some(unit) = direction.try_normalize() {
        actor.position = actor.position + unit.scale(actor.speed);
    }
    clamp_to_arena(actor);
}

/// Clamp the actor's centre to `[radius, ARENA_SIZE - radius]` on each axis.
///
/// Only the centre is clamped; an actor resting at the clamp limit still
/// touches the wall and is picked up by the boundary rule.
pub fn clamp_to_arena(actor: &mut Actor) {
    let min = actor.radius;
    let max = (ARENA_SIZE - actor.radius).max(min);
    actor.position = actor.position.clamp_axes(min, max);
}
