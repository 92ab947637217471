//! Boundary Elimination
//!
//! Any actor whose bounding circle reaches an arena edge is removed.

use tracing::debug;

use crate::game::collision::touches_arena_edge;
use crate::game::entity::ActorId;
use crate::game::events::GameEvent;
use crate::game::state::WorldState;

/// Remove every actor touching an edge. Returns how many were removed.
///
/// Movement clamps an actor's centre to exactly `radius` from a wall, which
/// counts as touching. Holding a direction into a wall therefore eliminates
/// the actor on the next tick.
pub fn resolve_boundary(state: &mut WorldState, events: &mut Vec<GameEvent>) -> usize {
    let doomed: Vec<ActorId> = state
        .actors
        .values()
        .filter(|actor| touches_arena_edge(actor))
        .map(|actor| actor.id)
        .collect();

    for id in &doomed {
        if let Some(actor) = state.remove_actor(id) {
            debug!(actor = %id, position = %actor.position, radius = actor.radius, "boundary elimination");
            events.push(GameEvent::BoundaryEliminated {
                actor_id: *id,
                position: actor.position,
                radius: actor.radius,
            });
        }
    }

    doomed.len()
}
