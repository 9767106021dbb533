// Copyright 2026 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::cmp::Ordering;

/// Axis-aligned bounding box in 2D, `f64` coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2D {
    /// Minimum x (left)
    pub min_x: f64,
    /// Minimum y (top)
    pub min_y: f64,
    /// Maximum x (right)
    pub max_x: f64,
    /// Maximum y (bottom)
    pub max_y: f64,
}

impl Aabb2D {
    /// Create a new AABB from min/max corners.
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Create an AABB from origin and size.
    pub const fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + w,
            max_y: y + h,
        }
    }

    /// A degenerate AABB covering exactly one point.
    pub const fn from_point(x: f64, y: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    /// Whether this AABB contains the point (boundary inclusive).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        le(self.min_x, x) && le(x, self.max_x) && le(self.min_y, y) && le(y, self.max_y)
    }

    /// Whether this AABB fully contains `other` (boundary inclusive).
    pub fn contains(&self, other: &Self) -> bool {
        le(self.min_x, other.min_x)
            && le(other.max_x, self.max_x)
            && le(self.min_y, other.min_y)
            && le(other.max_y, self.max_y)
    }

    /// Whether this AABB intersects `other` (boundary inclusive).
    ///
    /// Touching boxes count as intersecting here; this is the conservative
    /// candidate test. Callers that need strict overlap (a shared edge does
    /// not count) apply their own narrow-phase test on top.
    pub fn intersects(&self, other: &Self) -> bool {
        le(self.min_x, other.max_x)
            && le(other.min_x, self.max_x)
            && le(self.min_y, other.max_y)
            && le(other.min_y, self.max_y)
    }

    /// Per-axis overlap depths `(x, y)` against `other`.
    ///
    /// Both values are positive iff the boxes strictly overlap; a value of
    /// zero means the boxes touch on that axis.
    pub fn overlap(&self, other: &Self) -> (f64, f64) {
        let x = min_f(self.max_x, other.max_x) - max_f(self.min_x, other.min_x);
        let y = min_f(self.max_y, other.max_y) - max_f(self.min_y, other.min_y);
        (x, y)
    }

    /// Return true if the AABB has zero or inverted extent on either axis.
    /// Assumes no NaN.
    pub fn is_empty(&self) -> bool {
        !lt(self.min_x, self.max_x) || !lt(self.min_y, self.max_y)
    }

    /// Center point of the AABB.
    pub fn center(&self) -> (f64, f64) {
        (
            0.5 * (self.min_x + self.max_x),
            0.5 * (self.min_y + self.max_y),
        )
    }
}

pub(crate) fn min_f(a: f64, b: f64) -> f64 {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_f(a: f64, b: f64) -> f64 {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

pub(crate) fn le(a: f64, b: f64) -> bool {
    a.partial_cmp(&b)
        .map(|o| o != Ordering::Greater)
        .unwrap_or(false)
}

pub(crate) fn lt(a: f64, b: f64) -> bool {
    a.partial_cmp(&b)
        .map(|o| o == Ordering::Less)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_boxes_intersect_but_do_not_overlap() {
        let a = Aabb2D::new(0.0, 0.0, 10.0, 10.0);
        let b = Aabb2D::new(10.0, 0.0, 20.0, 10.0);
        assert!(a.intersects(&b));
        let (x, y) = a.overlap(&b);
        assert_eq!(x, 0.0);
        assert_eq!(y, 10.0);
    }

    #[test]
    fn degenerate_box_is_empty() {
        assert!(Aabb2D::from_point(3.0, 4.0).is_empty());
        assert!(Aabb2D::new(0.0, 0.0, 0.0, 10.0).is_empty());
        // Inverted extent.
        assert!(Aabb2D::new(5.0, 0.0, -5.0, 10.0).is_empty());
        assert!(!Aabb2D::new(0.0, 0.0, 1.0, 1.0).is_empty());
    }

    #[test]
    fn containment_is_boundary_inclusive() {
        let outer = Aabb2D::new(0.0, 0.0, 100.0, 100.0);
        let edge = Aabb2D::new(0.0, 0.0, 50.0, 50.0);
        assert!(outer.contains(&edge));
        assert!(outer.contains_point(100.0, 100.0));
        assert!(!outer.contains_point(100.1, 100.0));
    }

    #[test]
    fn overlap_depths_match_penetration() {
        let a = Aabb2D::new(0.0, 0.0, 10.0, 10.0);
        let b = Aabb2D::new(8.0, 5.0, 18.0, 25.0);
        let (x, y) = a.overlap(&b);
        assert_eq!(x, 2.0);
        assert_eq!(y, 5.0);
    }
}
