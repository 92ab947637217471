//! Collision Detection
//!
//! Circle overlap tests shared by the consumption and absorption resolvers.

use crate::core::vec2::Vec2;
use crate::game::entity::{Actor, Consumable};
use crate::game::rules::ARENA_SIZE;

/// Check if two circles overlap.
///
/// Strict: circles whose edges exactly touch do not overlap.
#[inline]
pub fn circles_overlap(pos_a: Vec2, radius_a: f64, pos_b: Vec2, radius_b: f64) -> bool {
    pos_a.distance(pos_b) < radius_a + radius_b
}

/// Check if an actor overlaps a consumable.
#[inline]
pub fn actor_overlaps_consumable(actor: &Actor, consumable: &Consumable) -> bool {
    circles_overlap(actor.position, actor.radius, consumable.position, consumable.radius)
}

/// Check if two actors overlap.
#[inline]
pub fn actors_overlap(a: &Actor, b: &Actor) -> bool {
    circles_overlap(a.position, a.radius, b.position, b.radius)
}

/// Check if an actor's bounding circle reaches or crosses any arena edge.
#[inline]
pub fn touches_arena_edge(actor: &Actor) -> bool {
    let Vec2 { x, y } = actor.position;
    let r = actor.radius;
    x - r <= 0.0 || x + r >= ARENA_SIZE || y - r <= 0.0 || y + r >= ARENA_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entity::ActorId;

    #[test]
    fn test_circles_overlap() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);

        // distance 10, combined radius 12
        assert!(circles_overlap(a, 6.0, b, 6.0));

        // exactly touching is not an overlap
        assert!(!circles_overlap(a, 5.0, b, 5.0));

        // apart
        assert!(!circles_overlap(a, 2.0, Vec2::new(20.0, 0.0), 2.0));
    }

    #[test]
    fn test_actor_consumable_overlap() {
        let id = ActorId::from_bytes([1; 16]);
        let actor = Actor::at(id, "a", Vec2::new(100.0, 100.0), 30.0);

        assert!(actor_overlaps_consumable(&actor, &Consumable::at(Vec2::new(139.0, 100.0))));
        assert!(!actor_overlaps_consumable(&actor, &Consumable::at(Vec2::new(140.0, 100.0))));
    }

    #[test]
    fn test_touches_arena_edge() {
        let id = ActorId::from_bytes([1; 16]);
        let inside = Actor::at(id, "a", Vec2::new(31.0, 2500.0), 30.0);
        assert!(!touches_arena_edge(&inside));

        for pos in [
            Vec2::new(30.0, 2500.0),
            Vec2::new(4970.0, 2500.0),
            Vec2::new(2500.0, 30.0),
            Vec2::new(2500.0, 4970.0),
        ] {
            assert!(touches_arena_edge(&Actor::at(id, "a", pos, 30.0)), "{:?}", pos);
        }
    }
}
