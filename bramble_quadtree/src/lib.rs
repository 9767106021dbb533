// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bramble Quadtree: a bounded, depth-limited quadtree over 2D AABBs.
//!
//! Bramble Quadtree is the spatial acceleration layer of the Bramble collision
//! stack, usable on its own wherever "which boxes may overlap this region?"
//! needs to be answered without scanning every box.
//!
//! - Insert, update, and remove axis-aligned bounding boxes (AABBs) with user payloads.
//! - Query by point or intersecting rectangle.
//! - Batch structural changes and apply them with [`QuadTree::commit`],
//!   receiving a coarse [`SyncReport`] summary (added/moved/removed counts).
//!
//! The tree covers a square world region centered at the origin with a
//! configurable side length and maximum subdivision depth. Each entry is filed
//! at the deepest node whose region fully contains its box; a box that
//! straddles a subdivision boundary stays at the deepest containing ancestor
//! and is never duplicated across siblings. Boxes that fall entirely outside
//! the world region are filed at the root rather than dropped, so off-world
//! entries remain queryable.
//!
//! It is scalar-fixed to `f64` and does not depend on any geometry crate.
//! Higher layers can compute world-space AABBs from whatever geometry types
//! they use and feed them here.
//!
//! # Example
//!
//! ```rust
//! use bramble_quadtree::{Aabb2D, QuadTree};
//!
//! // A 200x200 world subdivided at most 3 levels deep.
//! let mut tree: QuadTree<u32> = QuadTree::new(200.0, 3);
//! let a = tree.insert(Aabb2D::new(-40.0, -40.0, -20.0, -20.0), 1);
//! let _b = tree.insert(Aabb2D::new(10.0, 10.0, 30.0, 30.0), 2);
//! let _sync = tree.commit();
//!
//! // Point query inside the first box.
//! let hits: Vec<_> = tree.query_point(-30.0, -30.0).collect();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].1, 1);
//!
//! // Move the first box and commit; the old position no longer matches.
//! tree.update(a, Aabb2D::new(60.0, 60.0, 80.0, 80.0));
//! let sync = tree.commit();
//! assert_eq!(sync.moved, 1);
//! assert_eq!(tree.query_point(-30.0, -30.0).count(), 0);
//! ```
//!
//! ## Float semantics
//!
//! This crate assumes no NaNs for coordinates. Debug builds may assert.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod tree;
pub mod types;

pub use tree::{Key, QuadTree, SyncReport};
pub use types::Aabb2D;
