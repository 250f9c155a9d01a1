/*

    Declare Transform (translation, rotation, non-uniform scale)
    and Rotator (pitch, yaw, roll in degrees).

    Composition follows matrix order: (a * b) applies b first,
    then a. There is no shear, so composing two transforms with
    non-uniform scale and rotation is an approximation, the same
    one most engines make.

    @date: 3 Oct, 2025
*/

use std::ops::Mul;

use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vector3,
    pub rotation: Quaternion,
    pub scale: Vector3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vector3::ZERO,
        rotation: Quaternion::IDENTITY,
        scale: Vector3::ONE,
    };

    pub fn new(rotation: Quaternion, translation: Vector3, scale: Vector3) -> Self {
        Self { translation, rotation, scale }
    }

    pub fn from_translation(translation: Vector3) -> Self {
        Self { translation, ..Self::IDENTITY }
    }

    pub fn from_rotation(rotation: Quaternion) -> Self {
        Self { rotation, ..Self::IDENTITY }
    }

    #[inline]
    pub fn transform_point(&self, p: Vector3) -> Vector3 {
        self.rotation * (self.scale * p) + self.translation
    }

    #[inline]
    pub fn transform_vector(&self, v: Vector3) -> Vector3 {
        self.rotation * (self.scale * v)
    }

    #[inline]
    pub fn transform_rotation(&self, q: Quaternion) -> Quaternion {
        self.rotation * q
    }

    /// Inverse of transform_point, scale components that are ~0 collapse to 0.
    #[inline]
    pub fn inverse_transform_point(&self, p: Vector3) -> Vector3 {
        safe_div(self.rotation.inverse() * (p - self.translation), self.scale)
    }

    /// Express `world` in the local space of self, i.e. self^-1 * world.
    /// Translation is mapped exactly through inverse_transform_point.
    pub fn to_local(&self, world: &Transform) -> Transform {
        Transform {
            translation: self.inverse_transform_point(world.translation),
            rotation: self.rotation.inverse() * world.rotation,
            scale: safe_div(world.scale, self.scale),
        }
    }

    pub fn abs_diff_eq(&self, other: &Transform, max_abs_diff: Float) -> bool {
        self.translation.abs_diff_eq(other.translation, max_abs_diff)
            && self.scale.abs_diff_eq(other.scale, max_abs_diff)
            // q and -q are the same rotation
            && (self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
                || self.rotation.abs_diff_eq(-other.rotation, max_abs_diff))
    }
}

impl Mul<Transform> for Transform {
    type Output = Transform;

    fn mul(self, rhs: Transform) -> Transform {
        Transform {
            translation: self.transform_point(rhs.translation),
            rotation: (self.rotation * rhs.rotation).normalize(),
            scale: self.scale * rhs.scale,
        }
    }
}

/// Euler rotation in degrees.
///
/// Yaw turns +X towards +Y, pitch turns +X towards +Z,
/// roll turns +Y towards -Z. Roll is applied first, then pitch, then yaw.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Rotator {
    pub pitch: Float,
    pub yaw: Float,
    pub roll: Float,
}

impl Rotator {
    pub const ZERO: Self = Self { pitch: 0.0, yaw: 0.0, roll: 0.0 };

    pub const fn new(pitch: Float, yaw: Float, roll: Float) -> Self {
        Self { pitch, yaw, roll }
    }

    pub fn to_quat(&self) -> Quaternion {
        let yaw = Quaternion::from_rotation_z(self.yaw.to_radians());
        let pitch = Quaternion::from_rotation_y(-self.pitch.to_radians());
        let roll = Quaternion::from_rotation_x(-self.roll.to_radians());
        (yaw * pitch * roll).normalize()
    }
}

impl From<Rotator> for Quaternion {
    fn from(r: Rotator) -> Self {
        r.to_quat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: Float = 1e-9;

    #[test]
    fn test_rotator_axes() {
        // yaw 90: +X -> +Y
        let q = Rotator::new(0.0, 90.0, 0.0).to_quat();
        assert!((q * Vector3::X).abs_diff_eq(Vector3::Y, EPS));

        // pitch 90: +X -> +Z
        let q = Rotator::new(90.0, 0.0, 0.0).to_quat();
        assert!((q * Vector3::X).abs_diff_eq(Vector3::Z, EPS));

        // roll 90: +Y -> -Z
        let q = Rotator::new(0.0, 0.0, 90.0).to_quat();
        assert!((q * Vector3::Y).abs_diff_eq(Vector3::NEG_Z, EPS));
    }

    #[test]
    fn test_compose_applies_rhs_first() {
        let a = Transform::from_translation(Vector3::new(1.0, 0.0, 0.0));
        let b = Transform::new(
            Rotator::new(0.0, 90.0, 0.0).to_quat(),
            Vector3::ZERO,
            Vector3::splat(2.0),
        );
        let p = Vector3::new(1.0, 0.0, 0.0);
        let composed = (a * b).transform_point(p);
        let sequential = a.transform_point(b.transform_point(p));
        assert!(composed.abs_diff_eq(sequential, EPS));
        assert!(composed.abs_diff_eq(Vector3::new(1.0, 2.0, 0.0), EPS));
    }

    #[test]
    fn test_inverse_transform_point_roundtrip() {
        let t = Transform::new(
            Rotator::new(30.0, 45.0, 10.0).to_quat(),
            Vector3::new(3.0, -2.0, 5.0),
            Vector3::new(2.0, 0.5, 3.0),
        );
        let p = Vector3::new(0.3, -1.2, 4.0);
        let back = t.inverse_transform_point(t.transform_point(p));
        assert!(back.abs_diff_eq(p, 1e-9));
    }

    #[test]
    fn test_to_local_then_compose_is_world() {
        let parent = Transform::new(
            Rotator::new(0.0, 30.0, 0.0).to_quat(),
            Vector3::new(1.0, 2.0, 3.0),
            Vector3::ONE,
        );
        let world = Transform::new(
            Rotator::new(10.0, 0.0, 20.0).to_quat(),
            Vector3::new(-1.0, 0.0, 4.0),
            Vector3::ONE,
        );
        let local = parent.to_local(&world);
        assert!((parent * local).abs_diff_eq(&world, 1e-9));
    }
}
