// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bramble Collision: a Kurbo-native 2D collision management core.
//!
//! Bramble Collision is the body/contact layer of the Bramble stack, built on
//! [`bramble_quadtree`] for its broad phase and [`bramble_events`] for its
//! delivery sequencing.
//!
//! - Create and destroy axis-aligned bodies with stable generational
//!   [`BodyId`] handles, [`BodyFlags`] (dynamic/solid), and opaque owner
//!   tokens.
//! - Run one [`CollisionWorld::step`] per frame: moved bodies are re-filed in
//!   the spatial index, candidate pairs come from quadtree queries instead of
//!   an all-pairs scan, strict AABB overlap confirms them, and each confirmed
//!   pair carries a least-penetration-axis contact normal.
//! - Read the frame's [`Contact`]s, the [`PassReport`] metrics (box checks,
//!   contact count), and the per-subscriber delivery sequence.
//!
//! ## What this is not
//!
//! There is no impulse resolution, friction, mass, or rotation here, and no
//! contact persistence across frames (no "collision end"). Detection plus a
//! notification is the whole contract; consumers decide their own response,
//! typically by flipping a velocity component against the contact normal.
//!
//! ## Frame discipline
//!
//! Everything is single-threaded and synchronous. The owning loop mutates
//! body boxes (`set_bounds`/`translate`), calls `step()`, then walks
//! [`CollisionWorld::deliveries`] to execute reactions. Reactions therefore
//! land strictly before the next pass, never retroactively in the current
//! one.
//!
//! # Example
//!
//! ```rust
//! use bramble_collision::{BodyFlags, CollisionWorld};
//! use kurbo::Rect;
//!
//! let mut world = CollisionWorld::new();
//! world.set_world_size(2000.0).unwrap();
//! world.set_world_depth(4);
//!
//! // A static wall and a mover overlapping it by 5 units on y.
//! let wall = world.create_body_with_flags(BodyFlags::SOLID);
//! world.set_bounds(wall, Rect::new(-500.0, -500.0, 500.0, -480.0));
//! let mover = world.create_body();
//! world.set_bounds(mover, Rect::new(-10.0, -485.0, 10.0, -465.0));
//! world.subscribe(mover);
//!
//! let report = world.step();
//! assert_eq!(report.contacts, 1);
//! let contact = world.contacts()[0];
//! assert_eq!(contact.normal.x, 0.0, "least-penetration axis is y");
//!
//! // The mover learns who it hit and reacts on its own.
//! let delivery = &world.deliveries()[0];
//! assert_eq!(delivery.subscriber, mover);
//! assert_eq!(delivery.other, wall);
//! ```
//!
//! This crate is `no_std` and uses `alloc`; enable the `std` feature
//! (default) or `libm` to select Kurbo's float backend.

#![no_std]

extern crate alloc;

pub mod types;
pub mod world;

pub use types::{BodyFlags, BodyId, CollisionError, Contact, PassReport, QueryFilter};
pub use world::CollisionWorld;

// Deliveries surface in `CollisionWorld::deliveries`; re-export the type so
// consumers can name it without depending on the events crate directly.
pub use bramble_events::Delivery;
