// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};

use bramble_quadtree::{Aabb2D, QuadTree};

#[derive(Clone)]
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

/// Small boxes scattered uniformly over the world, the clustered-workload
/// shape the quadtree is built for.
fn gen_random_boxes(count: usize, world: f64, size: f64) -> Vec<Aabb2D> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    let half = 0.5 * world;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let x = rng.next_f64() * (world - size) - half;
        let y = rng.next_f64() * (world - size) - half;
        out.push(Aabb2D::from_xywh(x, y, size, size));
    }
    out
}

fn build_tree(boxes: &[Aabb2D], world: f64, depth: u32) -> QuadTree<u32> {
    let mut tree = QuadTree::new(world, depth);
    for (i, aabb) in boxes.iter().enumerate() {
        let _ = tree.insert(*aabb, i as u32);
    }
    let _ = tree.commit();
    tree
}

fn bench_queries(c: &mut Criterion) {
    const WORLD: f64 = 2000.0;
    const DEPTH: u32 = 4;
    for &count in &[256_usize, 1024, 4096] {
        let boxes = gen_random_boxes(count, WORLD, 16.0);
        let tree = build_tree(&boxes, WORLD, DEPTH);
        let queries = gen_random_boxes(256, WORLD, 48.0);

        let mut group = c.benchmark_group(format!("query_rect/{count}"));
        group.throughput(Throughput::Elements(queries.len() as u64));
        group.bench_function("quadtree", |b| {
            b.iter(|| {
                let mut hits = 0_usize;
                for q in &queries {
                    hits += tree.query_rect(black_box(*q)).count();
                }
                black_box(hits)
            });
        });
        group.bench_function("linear_scan", |b| {
            b.iter(|| {
                let mut hits = 0_usize;
                for q in &queries {
                    hits += boxes.iter().filter(|a| a.intersects(black_box(q))).count();
                }
                black_box(hits)
            });
        });
        group.finish();
    }
}

fn bench_refile(c: &mut Criterion) {
    const WORLD: f64 = 2000.0;
    let boxes = gen_random_boxes(1024, WORLD, 16.0);

    let mut group = c.benchmark_group("refile/1024");
    group.throughput(Throughput::Elements(boxes.len() as u64));
    group.bench_function("update_commit", |b| {
        b.iter_batched(
            || {
                let mut tree = QuadTree::new(WORLD, 4);
                let keys: Vec<_> = boxes
                    .iter()
                    .enumerate()
                    .map(|(i, a)| tree.insert(*a, i as u32))
                    .collect();
                let _ = tree.commit();
                (tree, keys)
            },
            |(mut tree, keys)| {
                for (key, aabb) in keys.iter().zip(&boxes) {
                    let moved = Aabb2D::new(
                        aabb.min_x + 3.0,
                        aabb.min_y + 3.0,
                        aabb.max_x + 3.0,
                        aabb.max_y + 3.0,
                    );
                    tree.update(*key, moved);
                }
                let _ = tree.commit();
                tree
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_queries, bench_refile);
criterion_main!(benches);
