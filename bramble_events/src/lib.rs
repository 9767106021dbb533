// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bramble Events: a deterministic subscription registry and pair fan-out.
//!
//! ## Overview
//!
//! This crate turns a list of confirmed pairs (for example, this frame's
//! collision contacts) into an explicit, ordered delivery sequence for the
//! keys that subscribed. It does not execute handlers.
//! Instead, a higher layer walks the returned [`Delivery`] items and invokes
//! whatever reaction it wants; because the sequence is computed synchronously,
//! every reaction lands before the next frame begins.
//!
//! ## Delivery semantics
//!
//! For each pair `(a, b, meta)`, up to two deliveries are emitted: one to `a`
//! carrying `b` as the other party, and one to `b` carrying `a` — each side
//! only if it is currently subscribed. Delivery is symmetric and happens once
//! per side, never once globally, so each subscriber can react given only its
//! own role in the pair.
//!
//! ## Ordering
//!
//! Input pair order is preserved and, within a pair, the first element
//! delivers before the second. Consumers must not depend on ordering between
//! independent pairs.
//!
//! ## Lifetime discipline
//!
//! Subscriptions are keyed by caller-chosen ids and must be torn down
//! explicitly (scoped acquire/release) before the subscribing object goes
//! away; the registry never holds references into caller state.
//!
//! # Example
//!
//! ```rust
//! use bramble_events::{Subscriptions, fan_out};
//!
//! let mut subs: Subscriptions<u32> = Subscriptions::new();
//! subs.subscribe(1);
//! subs.subscribe(2);
//!
//! let pairs = [(1_u32, 2_u32, "bump"), (2, 3, "scrape")];
//! let deliveries = fan_out(pairs.iter().copied(), &subs);
//!
//! // Both sides of (1, 2) are subscribed; of (2, 3) only 2 is.
//! assert_eq!(deliveries.len(), 3);
//! assert_eq!(deliveries[0].subscriber, 1);
//! assert_eq!(deliveries[0].other, 2);
//! assert_eq!(deliveries[2].subscriber, 2);
//! assert_eq!(deliveries[2].other, 3);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

/// Explicit subscribe/unsubscribe registry keyed by `K`.
///
/// Subscribing twice is idempotent; unsubscribing a key that never subscribed
/// is a no-op. Lookups are `O(log n)`.
#[derive(Clone, Debug, Default)]
pub struct Subscriptions<K: Ord + Copy> {
    keys: BTreeSet<K>,
}

impl<K: Ord + Copy> Subscriptions<K> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            keys: BTreeSet::new(),
        }
    }

    /// Register `key` for delivery. Returns true if it was not yet subscribed.
    pub fn subscribe(&mut self, key: K) -> bool {
        self.keys.insert(key)
    }

    /// Remove `key` from delivery. Returns true if it was subscribed.
    pub fn unsubscribe(&mut self, key: K) -> bool {
        self.keys.remove(&key)
    }

    /// True if `key` is currently subscribed.
    pub fn contains(&self, key: K) -> bool {
        self.keys.contains(&key)
    }

    /// Number of subscribed keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True if nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Drop every subscription.
    pub fn clear(&mut self) {
        self.keys.clear();
    }
}

/// A single notification: `subscriber` learns it paired with `other`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Delivery<K, M> {
    /// The subscribed key this delivery is addressed to.
    pub subscriber: K,
    /// The other party of the pair.
    pub other: K,
    /// Payload describing the pairing (for collisions, the contact).
    pub meta: M,
}

/// Expand pairs into per-side deliveries for subscribed keys.
///
/// See the crate docs for the exact ordering and symmetry guarantees.
pub fn fan_out<K, M, I>(pairs: I, subs: &Subscriptions<K>) -> Vec<Delivery<K, M>>
where
    K: Ord + Copy,
    M: Copy,
    I: IntoIterator<Item = (K, K, M)>,
{
    let mut out = Vec::new();
    for (a, b, meta) in pairs {
        if subs.contains(a) {
            out.push(Delivery {
                subscriber: a,
                other: b,
                meta,
            });
        }
        if subs.contains(b) {
            out.push(Delivery {
                subscriber: b,
                other: a,
                meta,
            });
        }
    }
    out
}
