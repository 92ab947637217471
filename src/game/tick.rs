//! Authoritative Simulation Tick
//!
//! One step of the arena rules. Movement is not part of the tick; it is
//! applied when move commands arrive.

use tracing::trace;

use crate::game::absorption::resolve_absorption;
use crate::game::boundary::resolve_boundary;
use crate::game::consumption::resolve_consumption;
use crate::game::events::GameEvent;
use crate::game::state::WorldState;

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Tick number just completed
    pub tick: u64,
    /// Events generated this tick
    pub events: Vec<GameEvent>,
    /// Actors removed by the boundary rule
    pub boundary_eliminations: usize,
    /// Actors removed by absorption
    pub absorptions: usize,
}

impl TickResult {
    /// Whether anything changed other than the tick counter.
    pub fn is_quiet(&self) -> bool {
        self.events.is_empty()
    }
}

/// Run one simulation tick.
///
/// Order within a tick:
/// 1. Drop actors that violate the state invariants
/// 2. Consumption, per actor in identity order
/// 3. Boundary elimination
/// 4. Absorption over identity-ordered pairs
///
/// Given the same state (including its RNG), the result is identical.
pub fn tick(state: &mut WorldState) -> TickResult {
    let mut events = Vec::new();

    state.enforce_invariants(&mut events);
    resolve_consumption(state, &mut events);
    let boundary_eliminations = resolve_boundary(state, &mut events);
    let absorptions = resolve_absorption(state, &mut events);

    state.tick += 1;

    trace!(
        tick = state.tick,
        actors = state.actor_count(),
        events = events.len(),
        "tick complete"
    );

    TickResult {
        tick: state.tick,
        events,
        boundary_eliminations,
        absorptions,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::Vec2;
    use crate::game::entity::{Actor, ActorId, Consumable};
    use crate::game::events::RemovalCause;
    use crate::game::movement::apply_move;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn id(b: u8) -> ActorId {
        ActorId::from_bytes([b; 16])
    }

    #[test]
    fn test_tick_determinism() {
        let build = || {
            let mut world = WorldState::new(12345);
            for b in 0..16u8 {
                world.spawn_actor(id(b), None);
            }
            world
        };

        let mut world1 = build();
        let mut world2 = build();
        let mut commands = StdRng::seed_from_u64(777);

        for _ in 0..100 {
            for b in 0..16u8 {
                let dir = Vec2::new(commands.gen_range(-1.0..1.0), commands.gen_range(-1.0..1.0));
                if let Some(a) = world1.get_actor_mut(&id(b)) {
                    apply_move(a, dir);
                }
                if let Some(a) = world2.get_actor_mut(&id(b)) {
                    apply_move(a, dir);
                }
            }
            let r1 = tick(&mut world1);
            let r2 = tick(&mut world2);
            assert_eq!(r1.events, r2.events);
        }

        assert_eq!(world1.snapshot(), world2.snapshot());
        assert_eq!(world1.rng.state(), world2.rng.state());
    }

    #[test]
    fn test_tick_counter_advances() {
        let mut world = WorldState::new(1);
        assert_eq!(tick(&mut world).tick, 1);
        assert_eq!(tick(&mut world).tick, 2);
        assert_eq!(world.tick, 2);
    }

    #[test]
    fn test_consumption_before_boundary() {
        // The actor eats, then is eliminated by its grown radius.
        let food = Vec2::new(35.0, 2500.0);
        let mut world = WorldState::with_consumables(1, vec![Consumable::at(food)]);
        world.insert_actor(Actor::at(id(1), "edge", Vec2::new(30.5, 2500.0), 30.0));

        let result = tick(&mut world);

        assert_eq!(world.actor_count(), 0);
        assert_eq!(result.boundary_eliminations, 1);
        assert!(matches!(result.events[0], GameEvent::ConsumableEaten { .. }));
        assert_eq!(
            result.events[1].removed_actor(),
            Some((id(1), RemovalCause::Boundary))
        );
    }

    #[test]
    fn test_boundary_before_absorption() {
        // The big actor touches the wall and is gone before it can absorb.
        let mut world = WorldState::with_consumables(1, Vec::new());
        world.insert_actor(Actor::at(id(1), "big", Vec2::new(60.0, 2500.0), 60.0));
        world.insert_actor(Actor::at(id(2), "small", Vec2::new(100.0, 2500.0), 20.0));

        let result = tick(&mut world);

        assert_eq!(world.actor_ids(), vec![id(2)]);
        assert_eq!(world.get_actor(&id(2)).unwrap().radius, 20.0);
        assert_eq!(result.absorptions, 0);
    }

    #[test]
    fn test_quiet_tick() {
        let mut world = WorldState::with_consumables(1, Vec::new());
        world.insert_actor(Actor::at(id(1), "lonely", Vec2::new(2500.0, 2500.0), 30.0));

        let result = tick(&mut world);
        assert!(result.is_quiet());
        assert_eq!(world.actor_count(), 1);
    }

    #[test]
    fn test_population_survives_long_run() {
        let mut world = WorldState::new(99);
        for b in 0..40u8 {
            world.spawn_actor(id(b), None);
        }

        for _ in 0..200 {
            tick(&mut world);
            assert_eq!(world.consumable_count(), 200);
            for actor in world.actors.values() {
                assert!(actor.radius >= 30.0);
            }
        }
    }
}
