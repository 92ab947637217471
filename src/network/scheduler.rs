//! Tick Scheduler
//!
//! Drives the simulation at a fixed interval and publishes one serialized
//! `update` per tick to every connection.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::game::rules::TICK_INTERVAL_MS;
use crate::game::state::WorldState;
use crate::game::tick::{tick, TickResult};
use crate::network::protocol::{ServerMessage, WorldUpdate};

/// Buffered updates per connection before a slow reader starts skipping.
pub const UPDATE_CHANNEL_CAPACITY: usize = 16;

/// Fixed-rate simulation driver.
#[derive(Clone)]
pub struct TickScheduler {
    world: Arc<RwLock<WorldState>>,
    period: Duration,
    updates: broadcast::Sender<Arc<str>>,
}

impl TickScheduler {
    /// Create a scheduler with the standard 33 ms period.
    pub fn new(world: Arc<RwLock<WorldState>>) -> Self {
        Self::with_period(world, Duration::from_millis(TICK_INTERVAL_MS))
    }

    /// Create a scheduler with a custom period.
    pub fn with_period(world: Arc<RwLock<WorldState>>, period: Duration) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self { world, period, updates }
    }

    /// Tick period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Receive serialized `update` frames.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<str>> {
        self.updates.subscribe()
    }

    /// Run one tick and publish the resulting update.
    pub async fn step(&self) -> TickResult {
        let (result, snapshot) = {
            let mut world = self.world.write().await;
            let result = tick(&mut world);
            (result, world.snapshot())
        };

        for event in &result.events {
            if let Some((actor, cause)) = event.removed_actor() {
                debug!(tick = result.tick, actor = %actor, ?cause, "actor removed");
            }
        }

        match ServerMessage::Update(WorldUpdate::from(&snapshot)).to_json() {
            // No receivers is fine; nobody is connected.
            Ok(json) => {
                let _ = self.updates.send(Arc::from(json));
            }
            Err(e) => error!(tick = result.tick, "failed to serialize update: {}", e),
        }

        result
    }

    /// Tick until `shutdown` fires.
    ///
    /// Passes never overlap. If a pass overruns the period, missed ticks are
    /// skipped rather than bursted.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(period_ms = self.period.as_millis() as u64, "Tick scheduler started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.step().await;
                }
                _ = shutdown.recv() => {
                    info!("Tick scheduler stopping");
                    break;
                }
            }
        }
    }
}
