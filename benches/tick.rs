//! Benchmarks for the simulation tick.

#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use orb_arena::game::{tick, ActorId, WorldState};

fn world_with_actors(count: u8) -> WorldState {
    let mut world = WorldState::new(42);
    for b in 0..count {
        world.spawn_actor(ActorId::from_bytes([b; 16]), None);
    }
    world
}

fn bench_tick(c: &mut Criterion) {
    for count in [10u8, 50, 200] {
        c.bench_function(&format!("tick_{count}_actors"), |b| {
            b.iter_batched(
                || world_with_actors(count),
                |mut world| black_box(tick(&mut world)),
                BatchSize::SmallInput,
            );
        });
    }
}

fn bench_snapshot_serialize(c: &mut Criterion) {
    use orb_arena::network::protocol::{ServerMessage, WorldUpdate};

    let world = world_with_actors(100);
    c.bench_function("serialize_update_100_actors", |b| {
        b.iter(|| {
            let msg = ServerMessage::Update(WorldUpdate::from(&world.snapshot()));
            black_box(msg.to_json().unwrap())
        });
    });
}

criterion_group!(benches, bench_tick, bench_snapshot_serialize);
criterion_main!(benches);
