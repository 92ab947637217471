//! Absorption
//!
//! A sufficiently larger actor swallows an overlapping smaller one and gains
//! a fraction of its radius.
//!
//! Pairs are visited in identity order over the ids alive when the pass
//! starts. Radii are read live, so an actor that has just absorbed someone
//! competes with its new radius for the rest of the pass. Actors removed
//! earlier in the pass are skipped.

use tracing::debug;

use crate::game::collision::actors_overlap;
use crate::game::entity::ActorId;
use crate::game::events::GameEvent;
use crate::game::rules::{ABSORPTION_GAIN, ABSORPTION_MARGIN};
use crate::game::state::WorldState;

/// Which side of a pair, if any, absorbs the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Neither is large enough, or they do not overlap
    Stalemate,
    /// The first actor absorbs the second
    FirstAbsorbs,
    /// The second actor absorbs the first
    SecondAbsorbs,
}

/// Decide a single pairing.
pub fn judge(first_radius: f64, second_radius: f64, overlapping: bool) -> Outcome {
    if !overlapping {
        Outcome::Stalemate
    } else if first_radius > second_radius + ABSORPTION_MARGIN {
        Outcome::FirstAbsorbs
    } else if second_radius > first_radius + ABSORPTION_MARGIN {
        Outcome::SecondAbsorbs
    } else {
        Outcome::Stalemate
    }
}

/// Run the absorption pass. Returns the number of actors absorbed.
pub fn resolve_absorption(state: &mut WorldState, events: &mut Vec<GameEvent>) -> usize {
    let ids = state.actor_ids();
    let mut absorbed = 0;

    for (i, &first) in ids.iter().enumerate() {
        for &second in &ids[i + 1..] {
            let (Some(a), Some(b)) = (state.actors.get(&first), state.actors.get(&second)) else {
                if state.actors.contains_key(&first) {
                    continue;
                }
                break;
            };

            let (winner, loser) = match judge(a.radius, b.radius, actors_overlap(a, b)) {
                Outcome::Stalemate => continue,
                Outcome::FirstAbsorbs => (first, second),
                Outcome::SecondAbsorbs => (second, first),
            };

            absorb(state, winner, loser, events);
            absorbed += 1;

            if loser == first {
                break;
            }
        }
    }

    absorbed
}

fn absorb(state: &mut WorldState, winner: ActorId, loser: ActorId, events: &mut Vec<GameEvent>) {
    let Some(prey) = state.remove_actor(&loser) else {
        return;
    };
    let Some(hunter) = state.get_actor_mut(&winner) else {
        return;
    };

    let gained = prey.radius * ABSORPTION_GAIN;
    hunter.radius += gained;

    debug!(absorber = %winner, absorbed = %loser, gained, new_radius = hunter.radius, "actor absorbed");
    events.push(GameEvent::ActorAbsorbed {
        absorber_id: winner,
        absorbed_id: loser,
        radius_gained: gained,
        new_radius: hunter.radius,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::Vec2;
    use crate::game::entity::Actor;

    fn id(b: u8) -> ActorId {
        ActorId::from_bytes([b; 16])
    }

    fn world_with(actors: &[(u8, f64, f64, f64)]) -> WorldState {
        let mut world = WorldState::with_consumables(1, Vec::new());
        for &(b, x, y, r) in actors {
            world.insert_actor(Actor::at(id(b), "actor", Vec2::new(x, y), r));
        }
        world
    }

    #[test]
    fn test_judge() {
        assert_eq!(judge(40.0, 20.0, true), Outcome::FirstAbsorbs);
        assert_eq!(judge(20.0, 40.0, true), Outcome::SecondAbsorbs);
        assert_eq!(judge(30.0, 33.0, true), Outcome::Stalemate);
        assert_eq!(judge(35.0, 30.0, true), Outcome::Stalemate);
        assert_eq!(judge(40.0, 20.0, false), Outcome::Stalemate);
    }

    #[test]
    fn test_larger_absorbs_smaller() {
        let mut world = world_with(&[(1, 1000.0, 1000.0, 40.0), (2, 1030.0, 1000.0, 20.0)]);

        let mut events = Vec::new();
        assert_eq!(resolve_absorption(&mut world, &mut events), 1);

        assert_eq!(world.get_actor(&id(1)).unwrap().radius, 44.0);
        assert!(world.get_actor(&id(2)).is_none());
        assert_eq!(
            events,
            vec![GameEvent::ActorAbsorbed {
                absorber_id: id(1),
                absorbed_id: id(2),
                radius_gained: 4.0,
                new_radius: 44.0,
            }]
        );
    }

    #[test]
    fn test_smaller_id_can_be_absorbed() {
        let mut world = world_with(&[(1, 1000.0, 1000.0, 20.0), (2, 1030.0, 1000.0, 40.0)]);

        let mut events = Vec::new();
        resolve_absorption(&mut world, &mut events);

        assert!(world.get_actor(&id(1)).is_none());
        assert_eq!(world.get_actor(&id(2)).unwrap().radius, 44.0);
    }

    #[test]
    fn test_close_sizes_stalemate() {
        let mut world = world_with(&[(1, 1000.0, 1000.0, 30.0), (2, 1010.0, 1000.0, 33.0)]);

        let mut events = Vec::new();
        assert_eq!(resolve_absorption(&mut world, &mut events), 0);
        assert_eq!(world.actor_count(), 2);
        assert!(events.is_empty());
    }

    #[test]
    fn test_no_overlap_no_absorption() {
        let mut world = world_with(&[(1, 1000.0, 1000.0, 40.0), (2, 1060.0, 1000.0, 20.0)]);

        let mut events = Vec::new();
        assert_eq!(resolve_absorption(&mut world, &mut events), 0);
        assert_eq!(world.actor_count(), 2);
    }

    #[test]
    fn test_chained_absorption_uses_updated_radius() {
        // Visit order: (1,2) then (1,3) skipped since 1 is gone, then (2,3).
        let mut world = world_with(&[
            (1, 1000.0, 1000.0, 30.0),
            (2, 1010.0, 1000.0, 60.0),
            (3, 1020.0, 1000.0, 100.0),
        ]);

        let mut events = Vec::new();
        assert_eq!(resolve_absorption(&mut world, &mut events), 2);

        assert_eq!(world.actor_ids(), vec![id(3)]);
        let survivor = world.get_actor(&id(3)).unwrap();
        assert!((survivor.radius - 113.2).abs() < 1e-9);

        assert_eq!(events[0].removed_actor().map(|(a, _)| a), Some(id(1)));
        assert_eq!(events[1].removed_actor().map(|(a, _)| a), Some(id(2)));
    }

    #[test]
    fn test_one_absorber_many_prey() {
        let mut world = world_with(&[
            (1, 2000.0, 2000.0, 100.0),
            (2, 2050.0, 2000.0, 30.0),
            (3, 1950.0, 2000.0, 30.0),
            (4, 2000.0, 2050.0, 30.0),
        ]);

        let mut events = Vec::new();
        assert_eq!(resolve_absorption(&mut world, &mut events), 3);
        assert_eq!(world.actor_ids(), vec![id(1)]);
        assert!((world.get_actor(&id(1)).unwrap().radius - 118.0).abs() < 1e-9);
    }
}
