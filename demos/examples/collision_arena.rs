// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Walled arena with bouncing boxes.
//!
//! This example shows the whole frame loop: bodies translate, the pass runs,
//! and subscribed bodies walk the delivery sequence to flip their velocity
//! against each contact normal. A few bodies are spawned and destroyed
//! mid-run to show handles going stale without disturbing the rest.
//!
//! Run:
//! - `cargo run -p bramble_demos --example collision_arena`

use std::collections::HashMap;

use bramble_collision::{BodyFlags, BodyId, CollisionWorld};
use kurbo::{Rect, Vec2};

const WORLD_SIZE: f64 = 2000.0;
const WALL: f64 = 16.0;
const BOX: f64 = 40.0;
const FRAMES: u32 = 600;

struct Rng(u64);

impl Rng {
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

fn main() {
    let mut world = CollisionWorld::new();
    world.set_world_size(WORLD_SIZE).unwrap();
    world.set_world_depth(4);

    // Four static walls framing the arena.
    let half = 0.5 * WORLD_SIZE;
    let walls = [
        Rect::new(-half, half - WALL, half, half),
        Rect::new(-half, -half, half, -half + WALL),
        Rect::new(-half, -half, -half + WALL, half),
        Rect::new(half - WALL, -half, half, half),
    ];
    for bounds in walls {
        let wall = world.create_body_with_flags(BodyFlags::SOLID);
        world.set_bounds(wall, bounds);
    }

    // Fifty movers with random positions and velocities, each subscribed so
    // it hears about its own contacts.
    let mut rng = Rng(0x1234_5678_9ABC_DEF0);
    let mut velocities: HashMap<BodyId, Vec2> = HashMap::new();
    let span = WORLD_SIZE - 2.0 * WALL - BOX;
    for _ in 0..50 {
        let id = spawn_mover(&mut world, &mut rng, span);
        velocities.insert(id, random_velocity(&mut rng));
    }

    let mut total_contacts = 0_usize;
    for frame in 0..FRAMES {
        // Integrate.
        for (&id, &v) in &velocities {
            world.translate(id, v);
        }

        let report = world.step();
        total_contacts += report.contacts;

        // React: flip the velocity component along each contact normal. The
        // normal faces away from the other body on this subscriber's side.
        for delivery in world.deliveries().to_vec() {
            let Some(normal) = delivery.meta.normal_for(delivery.subscriber) else {
                continue;
            };
            if !world.flags(delivery.other).is_some_and(|f| f.contains(BodyFlags::SOLID)) {
                continue;
            }
            if let Some(v) = velocities.get_mut(&delivery.subscriber) {
                if normal.x != 0.0 {
                    v.x = v.x.abs() * normal.x.signum();
                } else {
                    v.y = v.y.abs() * normal.y.signum();
                }
            }
        }

        // Churn the population a little: retire one mover and spawn another
        // every hundred frames.
        if frame % 100 == 99 {
            if let Some(&victim) = velocities.keys().next() {
                velocities.remove(&victim);
                world.destroy_body(victim).unwrap();
            }
            let id = spawn_mover(&mut world, &mut rng, span);
            velocities.insert(id, random_velocity(&mut rng));

            println!(
                "frame {:>3}: {} bodies, {} contacts, {} box checks",
                frame + 1,
                world.body_count(),
                report.contacts,
                report.bb_checks
            );
        }
    }

    println!("{total_contacts} contacts over {FRAMES} frames");
}

fn spawn_mover(world: &mut CollisionWorld, rng: &mut Rng, span: f64) -> BodyId {
    let x = rng.next_f64() * span - 0.5 * span;
    let y = rng.next_f64() * span - 0.5 * span;
    let id = world.create_body();
    world.set_bounds(id, Rect::new(x, y, x + BOX, y + BOX));
    world.subscribe(id);
    id
}

fn random_velocity(rng: &mut Rng) -> Vec2 {
    let vx = rng.next_f64() * 8.0 - 4.0;
    let vy = rng.next_f64() * 8.0 - 4.0;
    Vec2::new(vx, vy)
}
