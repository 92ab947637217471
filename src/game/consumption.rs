//! Consumption
//!
//! Actors grow by eating overlapping consumables. Every eaten consumable is
//! replaced immediately, so the population never changes.

use crate::game::collision::actor_overlaps_consumable;
use crate::game::entity::{ActorId, Consumable};
use crate::game::events::GameEvent;
use crate::game::rules::CONSUMPTION_GROWTH;
use crate::game::state::WorldState;

/// Run the consumption pass for every live actor, in identity order.
pub fn resolve_consumption(state: &mut WorldState, events: &mut Vec<GameEvent>) {
    for actor_id in state.actor_ids() {
        consume_for_actor(state, actor_id, events);
    }
}

/// Let one actor eat everything it overlaps.
///
/// Each existing consumable is checked exactly once against the actor's
/// current radius, which grows as it eats. Survivors are kept in order and
/// replacements are appended after the scan, so a replacement is never
/// evaluated against the same actor in the same pass.
fn consume_for_actor(state: &mut WorldState, actor_id: ActorId, events: &mut Vec<GameEvent>) {
    let Some(actor) = state.actors.get_mut(&actor_id) else {
        return;
    };

    let previous = std::mem::take(&mut state.consumables);
    let mut retained = Vec::with_capacity(previous.len());
    let mut eaten = 0usize;

    for consumable in previous {
        if actor_overlaps_consumable(actor, &consumable) {
            actor.radius += CONSUMPTION_GROWTH;
            eaten += 1;
            events.push(GameEvent::ConsumableEaten {
                actor_id,
                consumable_position: consumable.position,
                new_radius: actor.radius,
            });
        } else {
            retained.push(consumable);
        }
    }

    for _ in 0..eaten {
        retained.push(Consumable::spawn(&mut state.rng));
    }
    state.consumables = retained;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::Vec2;
    use crate::game::entity::Actor;

    fn id(b: u8) -> ActorId {
        ActorId::from_bytes([b; 16])
    }

    #[test]
    fn test_actor_eats_overlapping_consumable() {
        let food_pos = Vec2::new(1000.0, 1000.0);
        let far_pos = Vec2::new(3000.0, 3000.0);
        let mut world = WorldState::with_consumables(
            1,
            vec![Consumable::at(food_pos), Consumable::at(far_pos)],
        );
        world.insert_actor(Actor::at(id(1), "eater", food_pos, 50.0));

        let mut events = Vec::new();
        resolve_consumption(&mut world, &mut events);

        assert_eq!(world.get_actor(&id(1)).unwrap().radius, 51.0);
        assert_eq!(world.consumable_count(), 2);
        assert!(!world.has_consumable_at(food_pos));
        assert!(world.has_consumable_at(far_pos));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_multiple_consumables_in_one_tick() {
        let centre = Vec2::new(2000.0, 2000.0);
        let foods = vec![
            Consumable::at(centre),
            Consumable::at(Vec2::new(2010.0, 2000.0)),
            Consumable::at(Vec2::new(2000.0, 2015.0)),
        ];
        let mut world = WorldState::with_consumables(1, foods);
        world.insert_actor(Actor::at(id(1), "eater", centre, 30.0));

        let mut events = Vec::new();
        resolve_consumption(&mut world, &mut events);

        assert_eq!(world.get_actor(&id(1)).unwrap().radius, 33.0);
        assert_eq!(world.consumable_count(), 3);
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_growth_extends_reach_within_scan() {
        // Second consumable is just out of reach of radius 30 but inside
        // reach once the first one has been eaten.
        let centre = Vec2::new(2000.0, 2000.0);
        let foods = vec![
            Consumable::at(centre),
            Consumable::at(Vec2::new(2040.5, 2000.0)),
        ];
        let mut world = WorldState::with_consumables(1, foods);
        world.insert_actor(Actor::at(id(1), "eater", centre, 30.0));

        let mut events = Vec::new();
        resolve_consumption(&mut world, &mut events);

        assert_eq!(world.get_actor(&id(1)).unwrap().radius, 32.0);
    }

    #[test]
    fn test_no_overlap_no_change() {
        let mut world = WorldState::with_consumables(
            1,
            vec![Consumable::at(Vec2::new(100.0, 100.0))],
        );
        world.insert_actor(Actor::at(id(1), "a", Vec2::new(1000.0, 1000.0), 30.0));

        let before = world.consumables.clone();
        let mut events = Vec::new();
        resolve_consumption(&mut world, &mut events);

        assert_eq!(world.consumables, before);
        assert_eq!(world.get_actor(&id(1)).unwrap().radius, 30.0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_population_constant_with_many_actors() {
        let mut world = WorldState::new(4242);
        for b in 0..30u8 {
            world.spawn_actor(id(b), None);
        }

        let mut events = Vec::new();
        for _ in 0..20 {
            resolve_consumption(&mut world, &mut events);
            assert_eq!(world.consumable_count(), 200);
        }
    }

    #[test]
    fn test_shared_consumable_goes_to_first_actor() {
        let food_pos = Vec2::new(1500.0, 1500.0);
        let mut world = WorldState::with_consumables(1, vec![Consumable::at(food_pos)]);
        world.insert_actor(Actor::at(id(2), "second", food_pos, 30.0));
        world.insert_actor(Actor::at(id(1), "first", food_pos, 30.0));

        let mut events = Vec::new();
        resolve_consumption(&mut world, &mut events);

        assert_eq!(world.get_actor(&id(1)).unwrap().radius, 31.0);
        // The replacement is random; the second actor only grows if it
        // happens to land on top of it.
        assert!(world.get_actor(&id(2)).unwrap().radius <= 31.0);
        assert_eq!(world.consumable_count(), 1);
    }
}
