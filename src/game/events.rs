//! Game Events
//!
//! Records of what the resolvers did during a tick. The scheduler logs them;
//! tests use them to check resolver behaviour without diffing whole worlds.

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::game::entity::ActorId;

/// Why an actor left the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalCause {
    /// Absorbed by a larger actor
    Absorbed,
    /// Bounding circle reached an arena edge
    Boundary,
    /// Failed the per-tick state check
    InvariantViolation,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Actor ate a consumable
    ConsumableEaten {
        actor_id: ActorId,
        consumable_position: Vec2,
        new_radius: f64,
    },

    /// Actor absorbed another actor
    ActorAbsorbed {
        absorber_id: ActorId,
        absorbed_id: ActorId,
        radius_gained: f64,
        new_radius: f64,
    },

    /// Actor touched the arena edge
    BoundaryEliminated {
        actor_id: ActorId,
        position: Vec2,
        radius: f64,
    },

    /// Actor was dropped as malformed
    InvariantDropped {
        actor_id: ActorId,
    },
}

impl GameEvent {
    /// The actor removed from the world by this event, if any.
    pub fn removed_actor(&self) -> Option<(ActorId, RemovalCause)> {
        match self {
            GameEvent::ConsumableEaten { .. } => None,
            GameEvent::ActorAbsorbed { absorbed_id, .. } => {
                Some((*absorbed_id, RemovalCause::Absorbed))
            }
            GameEvent::BoundaryEliminated { actor_id, .. } => {
                Some((*actor_id, RemovalCause::Boundary))
            }
            GameEvent::InvariantDropped { actor_id } => {
                Some((*actor_id, RemovalCause::InvariantViolation))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removed_actor() {
        let a = ActorId::from_bytes([1; 16]);
        let b = ActorId::from_bytes([2; 16]);

        let eaten = GameEvent::ConsumableEaten {
            actor_id: a,
            consumable_position: Vec2::ZERO,
            new_radius: 31.0,
        };
        assert_eq!(eaten.removed_actor(), None);

        let absorbed = GameEvent::ActorAbsorbed {
            absorber_id: a,
            absorbed_id: b,
            radius_gained: 4.0,
            new_radius: 44.0,
        };
        assert_eq!(absorbed.removed_actor(), Some((b, RemovalCause::Absorbed)));

        let edge = GameEvent::BoundaryEliminated {
            actor_id: a,
            position: Vec2::new(30.0, 100.0),
            radius: 30.0,
        };
        assert_eq!(edge.removed_actor(), Some((a, RemovalCause::Boundary)));
    }
}
