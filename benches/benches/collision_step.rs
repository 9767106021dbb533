// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Rect, Vec2};

use bramble_collision::{BodyFlags, CollisionWorld};

struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

const WORLD: f64 = 2000.0;
const WALL: f64 = 16.0;

/// A walled arena with `movers` dynamic bodies inside, the canonical
/// game-loop workload.
fn build_world(movers: usize) -> (CollisionWorld, Vec<bramble_collision::BodyId>) {
    let mut world = CollisionWorld::new();
    world.set_world_size(WORLD).unwrap();
    world.set_world_depth(4);

    let half = 0.5 * WORLD;
    let walls = [
        Rect::new(-half, half - WALL, half, half),
        Rect::new(-half, -half, half, -half + WALL),
        Rect::new(-half, -half, -half + WALL, half),
        Rect::new(half - WALL, -half, half, half),
    ];
    for bounds in walls {
        let id = world.create_body_with_flags(BodyFlags::SOLID);
        world.set_bounds(id, bounds);
    }

    let mut rng = Rng::new(0x5EED_5EED_5EED_5EED);
    let span = WORLD - 2.0 * WALL - 32.0;
    let mut ids = Vec::with_capacity(movers);
    for _ in 0..movers {
        let x = rng.next_f64() * span - 0.5 * span;
        let y = rng.next_f64() * span - 0.5 * span;
        let id = world.create_body();
        world.set_bounds(id, Rect::new(x, y, x + 32.0, y + 32.0));
        world.subscribe(id);
        ids.push(id);
    }
    (world, ids)
}

fn bench_step(c: &mut Criterion) {
    for &movers in &[50_usize, 200, 800] {
        let mut group = c.benchmark_group(format!("step/{movers}"));
        group.throughput(Throughput::Elements(movers as u64));
        group.bench_function("translate_and_step", |b| {
            b.iter_batched(
                || build_world(movers),
                |(mut world, ids)| {
                    // A handful of frames so the dirty re-file path is hit on
                    // every body each time.
                    for frame in 0..4_u32 {
                        let d = f64::from(frame) + 1.0;
                        for &id in &ids {
                            world.translate(id, Vec2::new(d, -d));
                        }
                        black_box(world.step());
                    }
                    world
                },
                BatchSize::SmallInput,
            );
        });
        group.finish();
    }
}

fn bench_static_step(c: &mut Criterion) {
    // Nothing moves between passes, so steps do pure broad-phase work.
    let mut group = c.benchmark_group("step_idle/800");
    group.throughput(Throughput::Elements(800));
    let (mut world, _ids) = build_world(800);
    let _ = world.step();
    group.bench_function("no_motion", |b| {
        b.iter(|| black_box(world.step()));
    });
    group.finish();
}

criterion_group!(benches, bench_step, bench_static_step);
criterion_main!(benches);
