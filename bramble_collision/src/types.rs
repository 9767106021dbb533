// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core types: body handles, flags, contacts, pass metrics, errors.

use bitflags::bitflags;
use kurbo::Vec2;

/// Identifier for a collision body (generational).
///
/// A `BodyId` stays valid for exactly the lifetime of the body it was issued
/// for. Destroying the body and reusing its storage slot bumps the slot
/// generation, so old ids go stale instead of aliasing the newcomer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BodyId(pub(crate) u32, pub(crate) u32);

impl BodyId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags! {
    /// Body flags controlling pass participation.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct BodyFlags: u8 {
        /// Body moves and is tested against others each pass. Non-dynamic
        /// bodies only ever appear as the other side of a pair.
        const DYNAMIC = 0b0000_0001;
        /// Body participates in blocking-resolution decisions by consumers.
        /// The pass itself reports contacts regardless; consumers check this
        /// flag when deciding whether to react.
        const SOLID   = 0b0000_0010;
    }
}

impl Default for BodyFlags {
    fn default() -> Self {
        Self::DYNAMIC | Self::SOLID
    }
}

/// A confirmed overlapping pair for one pass.
///
/// `a` and `b` are in canonical (slot-ordered) form. `normal` is a unit axis
/// vector pointing from `a` toward `b` along the axis of least penetration;
/// when both axes penetrate equally it lies on the x axis. Contacts are not
/// persisted across passes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contact {
    /// First body of the pair (lower slot).
    pub a: BodyId,
    /// Second body of the pair.
    pub b: BodyId,
    /// Unit axis normal from `a` toward `b`.
    pub normal: Vec2,
}

impl Contact {
    /// The other body of the pair, or `None` if `id` is not involved.
    pub fn other(&self, id: BodyId) -> Option<BodyId> {
        if id == self.a {
            Some(self.b)
        } else if id == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    /// The normal as seen from `id`'s side: pointing away from the other
    /// body. Returns `None` if `id` is not involved.
    pub fn normal_for(&self, id: BodyId) -> Option<Vec2> {
        if id == self.a {
            Some(-self.normal)
        } else if id == self.b {
            Some(self.normal)
        } else {
            None
        }
    }
}

/// Metrics for the most recently completed pass.
///
/// Returned by [`CollisionWorld::step`](crate::CollisionWorld::step) so tests
/// and profilers can assert exact counts without any process-global state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Narrow-phase box tests performed, one per candidate pair examined,
    /// confirmed or not.
    pub bb_checks: u64,
    /// Confirmed contacts.
    pub contacts: usize,
}

/// Restricts spatial query results.
///
/// Used by [`CollisionWorld::bodies_at_point`](crate::CollisionWorld::bodies_at_point)
/// and [`CollisionWorld::bodies_in_rect`](crate::CollisionWorld::bodies_in_rect).
#[derive(Clone, Copy, Debug, Default)]
pub struct QueryFilter {
    /// If true, only return bodies marked [`BodyFlags::SOLID`].
    pub solid_only: bool,
    /// If true, only return bodies marked [`BodyFlags::DYNAMIC`].
    pub dynamic_only: bool,
}

/// Errors reported by the collision world.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CollisionError {
    /// World size must be positive and finite; it is never silently clamped.
    InvalidWorldSize(f64),
    /// The body handle was already destroyed or never issued.
    StaleBody(BodyId),
}

impl core::fmt::Display for CollisionError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidWorldSize(v) => {
                write!(f, "world size must be positive and finite, got {v}")
            }
            Self::StaleBody(id) => write!(f, "stale body handle {id:?}"),
        }
    }
}

impl core::error::Error for CollisionError {}
