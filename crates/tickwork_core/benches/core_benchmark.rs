//! # Core Hot Path Benchmark
//!
//! Measures the per-tick operations every system hits:
//! - Component iteration and in-place update
//! - Queue delivery by subsystem
//! - Pruning of stale timed messages
//!
//! Run with: `cargo bench --package tickwork_core`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tickwork_core::{Message, MessageQueue, Position, Velocity, World};

const SUBSYSTEMS: [&str; 4] = ["audio", "render", "entities", "spawner"];

fn populated_world(count: usize) -> World {
    let mut world = World::new();
    for i in 0..count {
        let e = world.new_entity();
        #[allow(clippy::cast_precision_loss)]
        let f = i as f32;
        world.add_component(e, Position::new(f, f));
        world.add_component(e, Velocity::new(1.0, 0.5));
    }
    world
}

fn populated_queue(count: usize) -> MessageQueue {
    let mut queue = MessageQueue::new();
    for i in 0..count {
        let sys = SUBSYSTEMS[i % SUBSYSTEMS.len()];
        #[allow(clippy::cast_possible_wrap)]
        let tick = (i % 64) as i64;
        queue.add(Message::timed(tick, sys, "cmd", "a;b"));
        if i % 8 == 0 {
            queue.add(Message::new(sys, "now", ""));
        }
    }
    queue
}

fn bench_component_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("component_update");

    for count in [1_000, 10_000, 100_000] {
        let mut world = populated_world(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                let velocities: Vec<_> = world
                    .get_components::<Velocity>()
                    .map(|(id, v)| (id, *v))
                    .collect();
                for (id, v) in velocities {
                    if let Some(p) = world.set_component::<Position>(id) {
                        p.x += v.x;
                        p.y += v.y;
                    }
                }
                black_box(world.entity_count())
            });
        });
    }

    group.finish();
}

fn bench_queue_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_get");

    for count in [1_000, 10_000] {
        let queue = populated_queue(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter_batched(
                || queue.clone(),
                |mut queue| {
                    for tick in 0..64 {
                        for sys in SUBSYSTEMS {
                            black_box(queue.get(sys, tick));
                        }
                    }
                    queue
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_queue_prune(c: &mut Criterion) {
    let queue = populated_queue(10_000);
    c.bench_function("queue_prune_10k", |b| {
        b.iter_batched(
            || queue.clone(),
            |mut queue| black_box(queue.prune(32)),
            criterion::BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_component_update,
    bench_queue_get,
    bench_queue_prune,
);
criterion_main!(benches);
