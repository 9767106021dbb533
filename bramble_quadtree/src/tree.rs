// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quadtree structure, batched updates, queries.

use alloc::vec::Vec;

use crate::types::Aabb2D;

/// Generational handle for entries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key(u32, u32);

impl Key {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Keys are 32-bit; slot indices never exceed u32 in practice."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Counts of structural changes applied by [`QuadTree::commit`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Entries filed for the first time.
    pub added: usize,
    /// Entries re-filed because their box changed.
    pub moved: usize,
    /// Entries unfiled and released.
    pub removed: usize,
}

impl SyncReport {
    /// True if the commit applied no structural changes.
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.moved == 0 && self.removed == 0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mark {
    Added,
    Moved,
    Removed,
}

#[derive(Clone, Debug)]
struct Entry<P> {
    generation: u32,
    aabb: Aabb2D,
    payload: P,
    // Node the entry is currently filed under; `None` until first commit.
    node: Option<usize>,
    mark: Option<Mark>,
}

#[derive(Clone, Debug)]
struct Node {
    region: Aabb2D,
    depth: u32,
    children: Option<[usize; 4]>,
    slots: Vec<usize>,
}

impl Node {
    fn new(region: Aabb2D, depth: u32) -> Self {
        Self {
            region,
            depth,
            children: None,
            slots: Vec::new(),
        }
    }
}

/// Bounded quadtree over 2D AABBs with payloads.
///
/// Structural placement is deferred: [`QuadTree::insert`],
/// [`QuadTree::update`], and [`QuadTree::remove`] record pending marks, and
/// [`QuadTree::commit`] files, re-files, or unfiles the affected entries.
/// Queries observe the committed state.
pub struct QuadTree<P: Copy> {
    world_size: f64,
    world_depth: u32,
    entries: Vec<Option<Entry<P>>>,
    generations: Vec<u32>, // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    nodes: Vec<Node>, // nodes[0] is the root
}

impl<P: Copy> core::fmt::Debug for QuadTree<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.entries.len();
        let alive = self.entries.iter().filter(|e| e.is_some()).count();
        f.debug_struct("QuadTree")
            .field("world_size", &self.world_size)
            .field("world_depth", &self.world_depth)
            .field("total_slots", &total)
            .field("alive", &alive)
            .field("nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

impl<P: Copy> QuadTree<P> {
    /// Create an empty tree over `[-world_size/2, world_size/2]²` with at
    /// most `world_depth` subdivision levels below the root.
    ///
    /// `world_size` must be positive and finite; validating configuration
    /// inputs before construction is the caller's job.
    pub fn new(world_size: f64, world_depth: u32) -> Self {
        assert!(
            world_size > 0.0 && world_size.is_finite(),
            "world size must be positive and finite"
        );
        let half = 0.5 * world_size;
        let root = Node::new(Aabb2D::new(-half, -half, half, half), 0);
        let mut nodes = Vec::new();
        nodes.push(root);
        Self {
            world_size,
            world_depth,
            entries: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            nodes,
        }
    }

    /// Side length of the indexed world region.
    pub fn world_size(&self) -> f64 {
        self.world_size
    }

    /// Maximum subdivision depth below the root.
    pub fn world_depth(&self) -> u32 {
        self.world_depth
    }

    /// Number of live entries, committed or pending.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// True if the tree holds no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of allocated tree nodes (root included).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// True if `key` refers to a live entry.
    pub fn is_alive(&self, key: Key) -> bool {
        self.entry(key).is_some()
    }

    /// The stored box and payload for `key`, if live.
    pub fn get(&self, key: Key) -> Option<(Aabb2D, P)> {
        self.entry(key).map(|e| (e.aabb, e.payload))
    }

    /// Insert a new AABB with payload. Returns a stable handle.
    pub fn insert(&mut self, aabb: Aabb2D, payload: P) -> Key {
        let entry = Entry {
            generation: 0, // patched below
            aabb,
            payload,
            node: None,
            mark: Some(Mark::Added),
        };
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.entries[idx] = Some(Entry { generation, ..entry });
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.entries.push(Some(Entry { generation, ..entry }));
            self.generations.push(generation);
            (self.entries.len() - 1, generation)
        };
        Key::new(idx, generation)
    }

    /// Update an existing entry's AABB. Stale keys are ignored.
    pub fn update(&mut self, key: Key, aabb: Aabb2D) {
        if let Some(e) = self.entry_mut(key) {
            e.aabb = aabb;
            e.mark = Some(match e.mark {
                Some(Mark::Added) => Mark::Added,
                _ => Mark::Moved,
            });
        }
    }

    /// Remove an existing entry. Stale keys are ignored.
    pub fn remove(&mut self, key: Key) {
        if let Some(e) = self.entry_mut(key) {
            if matches!(e.mark, Some(Mark::Added)) {
                // Never committed; drop the slot outright.
                self.entries[key.idx()] = None;
                self.free_list.push(key.idx());
            } else {
                e.mark = Some(Mark::Removed);
            }
        }
    }

    /// Drop all entries and collapse the tree back to a bare root.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generations.clear();
        self.free_list.clear();
        let region = self.nodes[0].region;
        self.nodes.clear();
        self.nodes.push(Node::new(region, 0));
    }

    /// Apply pending marks to the node hierarchy and report what changed.
    ///
    /// An entry inserted and removed between commits never becomes visible.
    pub fn commit(&mut self) -> SyncReport {
        let mut sync = SyncReport::default();
        for i in 0..self.entries.len() {
            let pending = {
                let Some(entry) = self.entries[i].as_mut() else {
                    continue;
                };
                entry.mark.take().map(|m| (m, entry.aabb, entry.node))
            };
            let Some((mark, aabb, old_node)) = pending else {
                continue;
            };
            match mark {
                Mark::Added => {
                    let node = file(&mut self.nodes, self.world_depth, i, &aabb);
                    if let Some(e) = self.entries[i].as_mut() {
                        e.node = Some(node);
                    }
                    sync.added += 1;
                }
                Mark::Moved => {
                    if let Some(n) = old_node {
                        unfile(&mut self.nodes, n, i);
                    }
                    let node = file(&mut self.nodes, self.world_depth, i, &aabb);
                    if let Some(e) = self.entries[i].as_mut() {
                        e.node = Some(node);
                    }
                    sync.moved += 1;
                }
                Mark::Removed => {
                    if let Some(n) = old_node {
                        unfile(&mut self.nodes, n, i);
                    }
                    self.entries[i] = None;
                    self.free_list.push(i);
                    sync.removed += 1;
                }
            }
        }
        sync
    }

    /// Query committed entries whose box contains the point (boundary
    /// inclusive).
    pub fn query_point(&self, x: f64, y: f64) -> impl Iterator<Item = (Key, P)> + '_ {
        self.query_rect(Aabb2D::from_point(x, y))
    }

    /// Query committed entries whose box intersects the rectangle (boundary
    /// inclusive).
    ///
    /// Descends only into children whose region intersects the query.
    /// Entries filed at a visited ancestor (straddlers and off-world boxes at
    /// the root) are always considered.
    pub fn query_rect(&self, rect: Aabb2D) -> impl Iterator<Item = (Key, P)> + '_ {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        stack.push(0_usize);
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            for &slot in &node.slots {
                let Some(Some(e)) = self.entries.get(slot) else {
                    continue;
                };
                if e.aabb.intersects(&rect) {
                    out.push((Key::new(slot, e.generation), e.payload));
                }
            }
            if let Some(children) = node.children {
                for child in children {
                    if self.nodes[child].region.intersects(&rect) {
                        stack.push(child);
                    }
                }
            }
        }
        out.into_iter()
    }

    fn entry(&self, key: Key) -> Option<&Entry<P>> {
        let e = self.entries.get(key.idx())?.as_ref()?;
        if e.generation != key.1 {
            return None;
        }
        Some(e)
    }

    fn entry_mut(&mut self, key: Key) -> Option<&mut Entry<P>> {
        let e = self.entries.get_mut(key.idx())?.as_mut()?;
        if e.generation != key.1 {
            return None;
        }
        Some(e)
    }
}

/// Split a node region into its four child regions.
///
/// Order: top-left, top-right, bottom-left, bottom-right.
fn split(region: &Aabb2D) -> [Aabb2D; 4] {
    let mid_x = 0.5 * (region.min_x + region.max_x);
    let mid_y = 0.5 * (region.min_y + region.max_y);
    [
        Aabb2D::new(region.min_x, region.min_y, mid_x, mid_y),
        Aabb2D::new(mid_x, region.min_y, region.max_x, mid_y),
        Aabb2D::new(region.min_x, mid_y, mid_x, region.max_y),
        Aabb2D::new(mid_x, mid_y, region.max_x, region.max_y),
    ]
}

/// File `slot` at the deepest node (≤ `max_depth`) whose region fully
/// contains `aabb`, allocating child nodes on the way down as needed.
/// Boxes not contained in the root region are filed at the root.
fn file(nodes: &mut Vec<Node>, max_depth: u32, slot: usize, aabb: &Aabb2D) -> usize {
    let mut idx = 0;
    if nodes[0].region.contains(aabb) {
        loop {
            let (region, depth, children) = {
                let n = &nodes[idx];
                (n.region, n.depth, n.children)
            };
            if depth >= max_depth {
                break;
            }
            let quads = split(&region);
            let Some(q) = quads.iter().position(|r| r.contains(aabb)) else {
                // Straddles the subdivision boundary; stays at this level.
                break;
            };
            let children = match children {
                Some(c) => c,
                None => {
                    let base = nodes.len();
                    for quad in quads {
                        nodes.push(Node::new(quad, depth + 1));
                    }
                    let c = [base, base + 1, base + 2, base + 3];
                    nodes[idx].children = Some(c);
                    c
                }
            };
            idx = children[q];
        }
    }
    nodes[idx].slots.push(slot);
    idx
}

/// Remove `slot` from the node it was filed under.
fn unfile(nodes: &mut [Node], node: usize, slot: usize) {
    let slots = &mut nodes[node].slots;
    if let Some(pos) = slots.iter().position(|&s| s == slot) {
        slots.swap_remove(pos);
    } else {
        debug_assert!(false, "slot missing from its filed node");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn committed<P: Copy>(tree: &mut QuadTree<P>, aabb: Aabb2D, payload: P) -> Key {
        let k = tree.insert(aabb, payload);
        let _ = tree.commit();
        k
    }

    #[test]
    fn small_box_files_deep_straddler_stays_shallow() {
        let mut tree: QuadTree<u32> = QuadTree::new(128.0, 3);
        // Fully inside the top-left quadrant chain.
        let _deep = committed(&mut tree, Aabb2D::new(-60.0, -60.0, -56.0, -56.0), 1);
        let nodes_after_deep = tree.node_count();
        assert!(nodes_after_deep > 1, "descent must allocate children");

        // Straddles the root midline: must stay at the root, no new nodes.
        let _wide = committed(&mut tree, Aabb2D::new(-10.0, -10.0, 10.0, 10.0), 2);
        assert_eq!(tree.node_count(), nodes_after_deep);

        // Both visible to a query covering everything.
        let all: Vec<_> = tree
            .query_rect(Aabb2D::new(-64.0, -64.0, 64.0, 64.0))
            .collect();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn depth_cap_bounds_node_allocation() {
        let mut tree: QuadTree<u32> = QuadTree::new(1024.0, 0);
        for i in 0..32_u32 {
            let x = f64::from(i) * 4.0 - 500.0;
            let _ = tree.insert(Aabb2D::new(x, 0.0, x + 1.0, 1.0), i);
        }
        let _ = tree.commit();
        // Depth zero: everything lives at the root.
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.len(), 32);
    }

    #[test]
    fn query_visits_ancestor_entries() {
        let mut tree: QuadTree<u32> = QuadTree::new(128.0, 4);
        // Straddler at the root.
        let straddler = committed(&mut tree, Aabb2D::new(-2.0, -2.0, 2.0, 2.0), 1);
        // Deep neighbor in one quadrant.
        let deep = committed(&mut tree, Aabb2D::new(20.0, 20.0, 24.0, 24.0), 2);

        let hits: Vec<Key> = tree
            .query_rect(Aabb2D::new(1.0, 1.0, 22.0, 22.0))
            .map(|(k, _)| k)
            .collect();
        assert!(hits.contains(&straddler));
        assert!(hits.contains(&deep));
    }

    #[test]
    fn stale_key_is_ignored_everywhere() {
        let mut tree: QuadTree<u32> = QuadTree::new(64.0, 2);
        let k = committed(&mut tree, Aabb2D::new(0.0, 0.0, 4.0, 4.0), 1);
        tree.remove(k);
        let sync = tree.commit();
        assert_eq!(sync.removed, 1);
        assert!(!tree.is_alive(k));
        assert_eq!(tree.get(k), None);

        // Slot reuse must bump the generation; the old key stays stale.
        let k2 = committed(&mut tree, Aabb2D::new(0.0, 0.0, 4.0, 4.0), 2);
        assert!(tree.is_alive(k2));
        assert!(!tree.is_alive(k));
        tree.update(k, Aabb2D::new(50.0, 50.0, 54.0, 54.0));
        let sync = tree.commit();
        assert!(sync.is_empty(), "stale update must not re-file anything");
    }

    #[test]
    fn moved_entry_is_refiled_lazily() {
        let mut tree: QuadTree<u32> = QuadTree::new(128.0, 3);
        let k = committed(&mut tree, Aabb2D::new(-50.0, -50.0, -46.0, -46.0), 1);
        tree.update(k, Aabb2D::new(40.0, 40.0, 44.0, 44.0));

        // Before commit, queries still see the old placement.
        assert_eq!(tree.query_point(42.0, 42.0).count(), 0);
        let sync = tree.commit();
        assert_eq!(sync.moved, 1);
        assert_eq!(tree.query_point(42.0, 42.0).count(), 1);
        assert_eq!(tree.query_point(-48.0, -48.0).count(), 0);
    }

    #[test]
    fn point_query_is_boundary_inclusive() {
        let mut tree: QuadTree<u32> = QuadTree::new(64.0, 2);
        let _ = committed(&mut tree, Aabb2D::new(0.0, 0.0, 8.0, 8.0), 1);
        assert_eq!(tree.query_point(8.0, 8.0).count(), 1);
        assert_eq!(tree.query_point(8.1, 8.0).count(), 0);
    }

    #[test]
    fn clear_resets_to_bare_root() {
        let mut tree: QuadTree<u32> = QuadTree::new(64.0, 3);
        for i in 0..8_u32 {
            let x = f64::from(i) * 6.0 - 30.0;
            let _ = tree.insert(Aabb2D::new(x, -30.0, x + 2.0, -28.0), i);
        }
        let _ = tree.commit();
        assert!(tree.node_count() > 1);
        tree.clear();
        assert_eq!(tree.node_count(), 1);
        assert!(tree.is_empty());
        assert_eq!(tree.query_rect(Aabb2D::new(-32.0, -32.0, 32.0, 32.0)).count(), 0);
    }
}
