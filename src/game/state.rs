//! World State
//!
//! The live actors and consumables of the arena.
//! Uses BTreeMap so iteration follows identity order.

use std::collections::BTreeMap;
use tracing::error;

use crate::core::rng::DeterministicRng;
use crate::core::vec2::Vec2;
use crate::game::entity::{Actor, ActorId, Consumable};
use crate::game::events::GameEvent;
use crate::game::rules::CONSUMABLE_COUNT;

/// Point-in-time copy of the world, taken at the end of a tick.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldSnapshot {
    /// Tick that produced this snapshot
    pub tick: u64,
    /// Live actors in identity order
    pub actors: Vec<Actor>,
    /// All consumables
    pub consumables: Vec<Consumable>,
}

impl WorldSnapshot {
    /// Whether the snapshot contains the given actor.
    pub fn contains_actor(&self, id: &ActorId) -> bool {
        self.actors.iter().any(|a| a.id == *id)
    }
}

/// Complete state of the arena.
#[derive(Clone, Debug)]
pub struct WorldState {
    /// Completed tick count
    pub tick: u64,

    /// Seed the world was created with
    pub seed: u64,

    /// Random source for every spawn
    pub rng: DeterministicRng,

    /// Live actors (BTreeMap for identity-ordered iteration)
    pub actors: BTreeMap<ActorId, Actor>,

    /// Consumables; the length never changes after construction
    pub consumables: Vec<Consumable>,
}

impl WorldState {
    /// Create a world with the standard consumable population.
    pub fn new(seed: u64) -> Self {
        Self::with_consumable_count(seed, CONSUMABLE_COUNT)
    }

    /// Create a world with a custom consumable population.
    pub fn with_consumable_count(seed: u64, count: usize) -> Self {
        let mut rng = DeterministicRng::new(seed);
        let consumables = (0..count).map(|_| Consumable::spawn(&mut rng)).collect();

        Self {
            tick: 0,
            seed,
            rng,
            actors: BTreeMap::new(),
            consumables,
        }
    }

    /// Create a world with explicit consumables (no random spawn).
    pub fn with_consumables(seed: u64, consumables: Vec<Consumable>) -> Self {
        Self {
            tick: 0,
            seed,
            rng: DeterministicRng::new(seed),
            actors: BTreeMap::new(),
            consumables,
        }
    }

    /// Create or replace the actor for `id` at a random position.
    pub fn spawn_actor(&mut self, id: ActorId, name: Option<&str>) -> &Actor {
        let actor = Actor::spawn(id, name, &mut self.rng);
        self.actors.insert(id, actor);
        &self.actors[&id]
    }

    /// Insert a fully specified actor, replacing any previous one with the same id.
    pub fn insert_actor(&mut self, actor: Actor) {
        self.actors.insert(actor.id, actor);
    }

    /// Get an actor by ID.
    pub fn get_actor(&self, id: &ActorId) -> Option<&Actor> {
        self.actors.get(id)
    }

    /// Get an actor mutably by ID.
    pub fn get_actor_mut(&mut self, id: &ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(id)
    }

    /// Remove an actor. Removing an absent actor is a no-op.
    pub fn remove_actor(&mut self, id: &ActorId) -> Option<Actor> {
        self.actors.remove(id)
    }

    /// Number of live actors.
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Number of consumables.
    pub fn consumable_count(&self) -> usize {
        self.consumables.len()
    }

    /// Snapshot of the live identities, in order.
    pub fn actor_ids(&self) -> Vec<ActorId> {
        self.actors.keys().copied().collect()
    }

    /// Whether any consumable sits exactly at `position`.
    pub fn has_consumable_at(&self, position: Vec2) -> bool {
        self.consumables.iter().any(|c| c.position == position)
    }

    /// Drop actors that break the state invariants.
    ///
    /// An actor is dropped when its radius is not strictly positive, any
    /// coordinate is non-finite, or its stored id disagrees with its map key.
    pub fn enforce_invariants(&mut self, events: &mut Vec<GameEvent>) {
        let offenders: Vec<ActorId> = self
            .actors
            .iter()
            .filter(|(key, actor)| actor.id != **key || !actor.is_well_formed())
            .map(|(key, _)| *key)
            .collect();

        for id in offenders {
            if let Some(actor) = self.actors.remove(&id) {
                error!(
                    actor = %id,
                    stored_id = %actor.id,
                    radius = actor.radius,
                    position = %actor.position,
                    "dropping actor that violates world invariants"
                );
                events.push(GameEvent::InvariantDropped { actor_id: id });
            }
        }
    }

    /// Copy the current world for broadcasting.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.tick,
            actors: self.actors.values().cloned().collect(),
            consumables: self.consumables.clone(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
