// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The collision world: body registry, per-frame pass, spatial queries.

use alloc::vec::Vec;
use kurbo::{Point, Rect, Vec2};

use bramble_events::{Delivery, Subscriptions, fan_out};
use bramble_quadtree::{Aabb2D, Key as TreeKey, QuadTree};

use crate::types::{BodyFlags, BodyId, CollisionError, Contact, PassReport, QueryFilter};

/// World size used until the owner configures one.
const DEFAULT_WORLD_SIZE: f64 = 1024.0;
/// Subdivision depth used until the owner configures one.
const DEFAULT_WORLD_DEPTH: u32 = 4;

#[derive(Clone, Debug)]
struct BodySlot {
    generation: u32,
    bounds: Rect,
    flags: BodyFlags,
    owner: Option<u64>,
    key: TreeKey,
    // Bounds changed since the slot was last filed in the index.
    dirty: bool,
}

/// Registry of collidable bodies plus the pass that detects their contacts.
///
/// One world exclusively owns its spatial index and registry; body handles
/// must not be used across worlds. All operations are synchronous and
/// single-threaded: the owning loop mutates bodies, then calls
/// [`CollisionWorld::step`], then reads [`CollisionWorld::contacts`] and
/// [`CollisionWorld::deliveries`].
pub struct CollisionWorld {
    bodies: Vec<Option<BodySlot>>,
    generations: Vec<u32>, // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    live: usize,
    index: QuadTree<BodyId>,
    subs: Subscriptions<BodyId>,
    contacts: Vec<Contact>,
    deliveries: Vec<Delivery<BodyId, Contact>>,
    last_report: PassReport,
}

impl Default for CollisionWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for CollisionWorld {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CollisionWorld")
            .field("bodies", &self.live)
            .field("contacts", &self.contacts.len())
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

impl CollisionWorld {
    /// Create an empty world with default size and depth.
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            live: 0,
            index: QuadTree::new(DEFAULT_WORLD_SIZE, DEFAULT_WORLD_DEPTH),
            subs: Subscriptions::new(),
            contacts: Vec::new(),
            deliveries: Vec::new(),
            last_report: PassReport::default(),
        }
    }

    // --- configuration ---

    /// Set the side length of the indexed world region.
    ///
    /// Rejects non-positive or non-finite values; the size is never silently
    /// clamped. Rebuilds the spatial index, carrying live bodies forward.
    pub fn set_world_size(&mut self, size: f64) -> Result<(), CollisionError> {
        if !(size > 0.0 && size.is_finite()) {
            return Err(CollisionError::InvalidWorldSize(size));
        }
        self.rebuild_index(size, self.index.world_depth());
        Ok(())
    }

    /// Set the maximum subdivision depth of the spatial index.
    ///
    /// Any depth is valid (zero disables subdivision entirely). Rebuilds the
    /// index, carrying live bodies forward.
    pub fn set_world_depth(&mut self, depth: u32) {
        self.rebuild_index(self.index.world_size(), depth);
    }

    /// Side length of the indexed world region.
    pub fn world_size(&self) -> f64 {
        self.index.world_size()
    }

    /// Maximum subdivision depth of the spatial index.
    pub fn world_depth(&self) -> u32 {
        self.index.world_depth()
    }

    fn rebuild_index(&mut self, size: f64, depth: u32) {
        let mut index = QuadTree::new(size, depth);
        for (i, slot) in self.bodies.iter_mut().enumerate() {
            let Some(slot) = slot.as_mut() else { continue };
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Body indices never exceed u32 in practice."
            )]
            let id = BodyId::new(i as u32, slot.generation);
            slot.key = index.insert(rect_to_aabb(slot.bounds), id);
            slot.dirty = false;
        }
        let _ = index.commit();
        self.index = index;
    }

    // --- body lifecycle ---

    /// Create a dynamic, solid body with a zero-size box at the origin.
    ///
    /// The returned handle stays valid until [`CollisionWorld::destroy_body`].
    pub fn create_body(&mut self) -> BodyId {
        self.create_body_with_flags(BodyFlags::default())
    }

    /// Create a body with explicit flags (for example a static world
    /// boundary: `BodyFlags::SOLID` without `BodyFlags::DYNAMIC`).
    pub fn create_body_with_flags(&mut self, flags: BodyFlags) -> BodyId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            (idx, generation)
        } else {
            self.bodies.push(None);
            self.generations.push(1);
            (self.bodies.len() - 1, 1_u32)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Body indices never exceed u32 in practice."
        )]
        let id = BodyId::new(idx as u32, generation);
        let key = self.index.insert(rect_to_aabb(Rect::ZERO), id);
        let _ = self.index.commit();
        self.bodies[id.idx()] = Some(BodySlot {
            generation,
            bounds: Rect::ZERO,
            flags,
            owner: None,
            key,
            dirty: false,
        });
        self.live += 1;
        id
    }

    /// Destroy a body, removing it from the registry and the spatial index.
    ///
    /// Destruction is immediately visible to queries. A stale handle (double
    /// destroy included) reports [`CollisionError::StaleBody`] and leaves the
    /// registry untouched.
    pub fn destroy_body(&mut self, id: BodyId) -> Result<(), CollisionError> {
        let Some(slot) = self.slot(id) else {
            return Err(CollisionError::StaleBody(id));
        };
        let key = slot.key;
        self.index.remove(key);
        let _ = self.index.commit();
        self.bodies[id.idx()] = None;
        self.free_list.push(id.idx());
        self.live -= 1;
        self.subs.unsubscribe(id);
        Ok(())
    }

    /// Number of live bodies. `O(1)`.
    pub fn body_count(&self) -> usize {
        self.live
    }

    /// True if `id` refers to a live body.
    pub fn is_alive(&self, id: BodyId) -> bool {
        self.slot(id).is_some()
    }

    // --- body state ---

    /// Set a body's world-space box. Stale ids are ignored.
    ///
    /// The spatial index is re-synchronized at the start of the next pass.
    pub fn set_bounds(&mut self, id: BodyId, bounds: Rect) {
        if let Some(slot) = self.slot_mut(id) {
            slot.bounds = bounds;
            slot.dirty = true;
        }
    }

    /// A body's world-space box, if live.
    pub fn bounds(&self, id: BodyId) -> Option<Rect> {
        self.slot(id).map(|s| s.bounds)
    }

    /// Translate a body's box by `delta`. Stale ids are ignored.
    pub fn translate(&mut self, id: BodyId, delta: Vec2) {
        if let Some(slot) = self.slot_mut(id) {
            slot.bounds = slot.bounds + delta;
            slot.dirty = true;
        }
    }

    /// Replace a body's flags. Stale ids are ignored.
    pub fn set_flags(&mut self, id: BodyId, flags: BodyFlags) {
        if let Some(slot) = self.slot_mut(id) {
            slot.flags = flags;
        }
    }

    /// A body's flags, if live.
    pub fn flags(&self, id: BodyId) -> Option<BodyFlags> {
        self.slot(id).map(|s| s.flags)
    }

    /// Attach an opaque owner token used by the consumer to route deliveries
    /// back to the owning object. The world never interprets it.
    pub fn set_owner(&mut self, id: BodyId, owner: Option<u64>) {
        if let Some(slot) = self.slot_mut(id) {
            slot.owner = owner;
        }
    }

    /// A body's owner token, if live and set.
    pub fn owner(&self, id: BodyId) -> Option<u64> {
        self.slot(id).and_then(|s| s.owner)
    }

    // --- events ---

    /// Subscribe a body to collision-begin deliveries.
    /// Must be torn down with [`CollisionWorld::unsubscribe`] before the
    /// owning object goes away (destroying the body also unsubscribes it).
    pub fn subscribe(&mut self, id: BodyId) -> bool {
        if self.is_alive(id) {
            self.subs.subscribe(id)
        } else {
            false
        }
    }

    /// Remove a body's subscription.
    pub fn unsubscribe(&mut self, id: BodyId) -> bool {
        self.subs.unsubscribe(id)
    }

    /// This frame's delivery sequence: one entry per subscribed side of each
    /// confirmed contact, valid until the next [`CollisionWorld::step`].
    pub fn deliveries(&self) -> &[Delivery<BodyId, Contact>] {
        &self.deliveries
    }

    // --- queries ---

    /// Bodies whose box contains the point (boundary inclusive), e.g. for a
    /// pointer click.
    pub fn bodies_at_point(&self, pt: Point, filter: QueryFilter) -> Vec<BodyId> {
        let ids: Vec<BodyId> = self.index.query_point(pt.x, pt.y).map(|(_, id)| id).collect();
        self.filtered(ids, filter)
    }

    /// Bodies whose box intersects the rectangle (boundary inclusive).
    pub fn bodies_in_rect(&self, rect: Rect, filter: QueryFilter) -> Vec<BodyId> {
        let ids: Vec<BodyId> = self
            .index
            .query_rect(rect_to_aabb(rect))
            .map(|(_, id)| id)
            .collect();
        self.filtered(ids, filter)
    }

    fn filtered(&self, ids: Vec<BodyId>, filter: QueryFilter) -> Vec<BodyId> {
        ids.into_iter()
            .filter(|id| {
                let Some(slot) = self.slot(*id) else {
                    return false;
                };
                if filter.solid_only && !slot.flags.contains(BodyFlags::SOLID) {
                    return false;
                }
                if filter.dynamic_only && !slot.flags.contains(BodyFlags::DYNAMIC) {
                    return false;
                }
                true
            })
            .collect()
    }

    // --- the pass ---

    /// Confirmed contacts of the most recently completed pass.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Number of contacts reported by the most recently completed pass.
    pub fn contact_count(&self) -> usize {
        self.last_report.contacts
    }

    /// Metrics of the most recently completed pass.
    pub fn last_report(&self) -> PassReport {
        self.last_report
    }

    /// Run one collision pass.
    ///
    /// Re-files every body whose box changed, finds candidate pairs through
    /// the spatial index, confirms strict AABB overlap, computes contact
    /// normals, and builds the delivery sequence for subscribed bodies. The
    /// sequence is complete when this returns; the caller walks
    /// [`CollisionWorld::deliveries`] to execute reactions, which therefore
    /// land before the next pass, never retroactively in this one.
    pub fn step(&mut self) -> PassReport {
        // 1. Re-synchronize moved bodies.
        for slot in self.bodies.iter_mut().flatten() {
            if slot.dirty {
                self.index.update(slot.key, rect_to_aabb(slot.bounds));
                slot.dirty = false;
            }
        }
        let _ = self.index.commit();

        // 2./3. Broad phase + narrow phase.
        self.contacts.clear();
        let mut bb_checks = 0_u64;
        for i in 0..self.bodies.len() {
            let Some(slot) = self.bodies[i].as_ref() else {
                continue;
            };
            if !slot.flags.contains(BodyFlags::DYNAMIC) {
                continue;
            }
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Body indices never exceed u32 in practice."
            )]
            let id = BodyId::new(i as u32, slot.generation);
            let bounds = slot.bounds;
            let candidates: Vec<BodyId> = self
                .index
                .query_rect(rect_to_aabb(bounds))
                .map(|(_, other)| other)
                .collect();
            for other in candidates {
                if other == id {
                    continue;
                }
                let Some(other_slot) = self.slot(other) else {
                    continue;
                };
                let other_dynamic = other_slot.flags.contains(BodyFlags::DYNAMIC);
                let other_bounds = other_slot.bounds;
                // An unordered dynamic pair is examined once, from the lower
                // slot; dynamic-vs-static always from the dynamic side.
                if other_dynamic && other.idx() < i {
                    continue;
                }
                bb_checks += 1;
                if let Some(contact) = narrow_phase(id, bounds, other, other_bounds) {
                    self.contacts.push(contact);
                }
            }
        }

        self.last_report = PassReport {
            bb_checks,
            contacts: self.contacts.len(),
        };

        // 4. Fan out to subscribers.
        self.deliveries = fan_out(
            self.contacts.iter().map(|c| (c.a, c.b, *c)),
            &self.subs,
        );

        self.last_report
    }

    fn slot(&self, id: BodyId) -> Option<&BodySlot> {
        let s = self.bodies.get(id.idx())?.as_ref()?;
        if s.generation != id.1 {
            return None;
        }
        Some(s)
    }

    fn slot_mut(&mut self, id: BodyId) -> Option<&mut BodySlot> {
        let s = self.bodies.get_mut(id.idx())?.as_mut()?;
        if s.generation != id.1 {
            return None;
        }
        Some(s)
    }
}

/// Strict AABB overlap test plus contact-normal computation.
///
/// Touching boxes (boundary equality on either axis) and degenerate boxes
/// (zero or inverted extent) never produce a contact. The reported normal
/// lies on the axis of least penetration, ties on x, pointing from the
/// canonical first body toward the second.
fn narrow_phase(id_a: BodyId, a: Rect, id_b: BodyId, b: Rect) -> Option<Contact> {
    // Canonical slot ordering so the pair and its normal are stable
    // regardless of which side initiated the test.
    let (id_a, a, id_b, b) = if id_a.idx() <= id_b.idx() {
        (id_a, a, id_b, b)
    } else {
        (id_b, b, id_a, a)
    };
    let aabb_a = rect_to_aabb(a);
    let aabb_b = rect_to_aabb(b);
    if aabb_a.is_empty() || aabb_b.is_empty() {
        return None;
    }
    let (px, py) = aabb_a.overlap(&aabb_b);
    if !(px > 0.0 && py > 0.0) {
        return None;
    }
    let normal = if px <= py {
        let sign = if b.center().x >= a.center().x { 1.0 } else { -1.0 };
        Vec2::new(sign, 0.0)
    } else {
        let sign = if b.center().y >= a.center().y { 1.0 } else { -1.0 };
        Vec2::new(0.0, sign)
    };
    Some(Contact {
        a: id_a,
        b: id_b,
        normal,
    })
}

fn rect_to_aabb(r: Rect) -> Aabb2D {
    Aabb2D::new(r.x0, r.y0, r.x1, r.y1)
}
