/*

    Axis Aligned Bounding Box in the local space of the
    manipulated object, plus helpers to relate two boxes
    and to gather the box of several sub-parts.

    @date: 9 Nov, 2025
*/

use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AxisAlignedBox {
    #[serde(deserialize_with = "crate::config::deser_vec3")]
    pub min: Vector3,
    #[serde(deserialize_with = "crate::config::deser_vec3")]
    pub max: Vector3,
}

impl Default for AxisAlignedBox {
    fn default() -> Self {
        Self::ZERO
    }
}

impl AxisAlignedBox {
    pub const ZERO: Self = Self {
        min: Vector3::ZERO,
        max: Vector3::ZERO,
    };

    /// Box that contains nothing, (inf, -inf) on every axis.
    /// Expanding it by any point yields that point.
    pub const EMPTY: Self = Self {
        min: Vector3::INFINITY,
        max: Vector3::NEG_INFINITY,
    };

    pub fn new(min: Vector3, max: Vector3) -> Self {
        debug_assert!(min.cmple(max).all(), "Invalid box, found max < min");
        Self { min, max }
    }

    pub fn from_center_extent(center: Vector3, extent: Vector3) -> Self {
        Self::new(center - extent, center + extent)
    }

    pub fn from_points(points: &[Vector3]) -> Self {
        let mut b = Self::EMPTY;
        for p in points {
            b.expand(*p);
        }
        b
    }

    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    pub fn center(&self) -> Vector3 {
        (self.min + self.max) * 0.5
    }

    /// Half size of the box.
    pub fn extent(&self) -> Vector3 {
        (self.max - self.min) * 0.5
    }

    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    pub fn contains(&self, p: Vector3) -> bool {
        self.min.cmple(p).all() && p.cmple(self.max).all()
    }

    pub fn expand(&mut self, p: Vector3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn union(&self, other: &AxisAlignedBox) -> AxisAlignedBox {
        if other.is_empty() {
            return *self;
        }
        if self.is_empty() {
            return *other;
        }
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn corners(&self) -> [Vector3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vector3::new(a.x, a.y, a.z),
            Vector3::new(b.x, a.y, a.z),
            Vector3::new(a.x, b.y, a.z),
            Vector3::new(b.x, b.y, a.z),
            Vector3::new(a.x, a.y, b.z),
            Vector3::new(b.x, a.y, b.z),
            Vector3::new(a.x, b.y, b.z),
            Vector3::new(b.x, b.y, b.z),
        ]
    }

    /// Axis aligned box enclosing this box after transforming it.
    pub fn transformed(&self, transform: &Transform) -> AxisAlignedBox {
        if self.is_empty() {
            return *self;
        }
        let corners = self.corners().map(|c| transform.transform_point(c));
        Self::from_points(&corners)
    }
}

/// Relative translation and scale that maps `relative_to` onto `bbox`.
///
/// Returns the transform and whether it is valid. When any extent of `relative_to`
/// is ~0 the scale can not be computed and falls back to one.
pub fn get_relative_box_transform(bbox: &AxisAlignedBox, relative_to: &AxisAlignedBox) -> (Transform, bool) {
    let ext_a = bbox.extent();
    let ext_b = relative_to.extent();

    let valid = !(is_nearly_zero(ext_b.x) || is_nearly_zero(ext_b.y) || is_nearly_zero(ext_b.z));
    if !valid {
        debug!("Reference box has degenerate extent {:?}, relative scale falls back to one", ext_b);
    }
    let scale = if valid { ext_a / ext_b } else { Vector3::ONE };
    let translation = bbox.center() - relative_to.center() * scale;
    (Transform::new(Quaternion::IDENTITY, translation, scale), valid)
}

/// Box enclosing all parts, each given by its own box and its world transform,
/// expressed in the space defined by `world_to_local`. Empty part boxes are skipped.
pub fn calculate_nested_bounds(parts: &[(Transform, AxisAlignedBox)], world_to_local: &Transform) -> AxisAlignedBox {
    let mut bounds = AxisAlignedBox::EMPTY;
    for (part_to_world, part_box) in parts {
        if part_box.is_empty() {
            continue;
        }
        let part_to_local = *world_to_local * *part_to_world;
        bounds = bounds.union(&part_box.transformed(&part_to_local));
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    const EPS: Float = 1e-9;

    #[test]
    fn test_center_extent() {
        let b = AxisAlignedBox::new(Vector3::new(-1.0, 0.0, 2.0), Vector3::new(3.0, 2.0, 4.0));
        assert_eq!(b.center(), Vector3::new(1.0, 1.0, 3.0));
        assert_eq!(b.extent(), Vector3::new(2.0, 1.0, 1.0));
    }

    #[test]
    fn test_relative_transform_roundtrip() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let center = Vector3::new(rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0));
            let extent = Vector3::new(rng.random_range(0.1..3.0), rng.random_range(0.1..3.0), rng.random_range(0.1..3.0));
            let initial = AxisAlignedBox::from_center_extent(center, extent);

            let new_center = Vector3::new(rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0), rng.random_range(-5.0..5.0));
            let factor: Float = rng.random_range(0.1..4.0);
            let target = AxisAlignedBox::from_center_extent(new_center, extent * factor);

            let (rel, valid) = get_relative_box_transform(&target, &initial);
            assert!(valid);

            let mapped = initial.transformed(&rel);
            assert!(mapped.min.abs_diff_eq(target.min, 1e-7), "{:?} vs {:?}", mapped, target);
            assert!(mapped.max.abs_diff_eq(target.max, 1e-7), "{:?} vs {:?}", mapped, target);
        }
    }

    #[test]
    fn test_relative_transform_degenerate() {
        let flat = AxisAlignedBox::new(Vector3::new(-1.0, -1.0, 0.0), Vector3::new(1.0, 1.0, 0.0));
        let target = AxisAlignedBox::new(Vector3::new(-2.0, -2.0, 0.0), Vector3::new(2.0, 2.0, 0.0));
        let (rel, valid) = get_relative_box_transform(&target, &flat);
        assert!(!valid);
        assert_eq!(rel.scale, Vector3::ONE);
        assert_eq!(rel.rotation, Quaternion::IDENTITY);
    }

    #[test]
    fn test_empty_box_expands_to_point() {
        let mut b = AxisAlignedBox::EMPTY;
        assert!(b.is_empty());
        b.expand(Vector3::new(1.0, 2.0, 3.0));
        assert!(!b.is_empty());
        assert_eq!(b.min, b.max);
    }

    #[test]
    fn test_nested_bounds_in_local_space() {
        let unit = AxisAlignedBox::new(Vector3::splat(-0.5), Vector3::splat(0.5));
        let parts = vec![
            (Transform::from_translation(Vector3::new(10.0, 0.0, 0.0)), unit),
            (Transform::from_translation(Vector3::new(12.0, 0.0, 0.0)), unit),
            (Transform::IDENTITY, AxisAlignedBox::EMPTY),
        ];
        let world_to_owner = Transform::from_translation(Vector3::new(-10.0, 0.0, 0.0));
        let bounds = calculate_nested_bounds(&parts, &world_to_owner);
        assert!(bounds.min.abs_diff_eq(Vector3::new(-0.5, -0.5, -0.5), EPS));
        assert!(bounds.max.abs_diff_eq(Vector3::new(2.5, 0.5, 0.5), EPS));
    }
}
