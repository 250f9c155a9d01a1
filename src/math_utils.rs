/*

    Generic rotation utilities shared by the manipulators:
    minimal rotation between vectors, swing-twist decomposition
    and rotation about a pivot point.

    Degenerate inputs never panic:
        - zero-length vector in minimal_rotation -> identity
        - anti-parallel vectors -> 180 degrees about a deterministic
          axis orthogonal to the first vector
        - zero-length twist axis -> identity twist, swing = rotation

    @date: 9 Oct, 2025
*/

use crate::prelude::*;

/// Shortest-arc rotation that maps the direction of `a` onto the direction of `b`.
pub fn minimal_rotation(a: Vector3, b: Vector3) -> Quaternion {
    let (Some(a_n), Some(b_n)) = (a.try_normalize(), b.try_normalize()) else {
        debug!("Minimal rotation with near-zero vector ({:?}, {:?}), using identity", a, b);
        return Quaternion::IDENTITY;
    };

    if a_n == b_n {
        return Quaternion::IDENTITY;
    }

    if a_n.dot(b_n) < -1.0 + SMALL {
        // NOTE: any_orthonormal_vector is deterministic for a given input,
        // that is the tie-break for opposite vectors.
        let axis = a_n.any_orthonormal_vector();
        return Quaternion::from_axis_angle(axis, std::f64::consts::PI);
    }

    Quaternion::from_rotation_arc(a_n, b_n)
}

/// Split `rotation` into (swing, twist) where twist rotates about `twist_axis`
/// and `rotation = swing * twist`.
pub fn swing_twist_decompose(rotation: Quaternion, twist_axis: Vector3) -> (Quaternion, Quaternion) {
    let Some(axis) = twist_axis.try_normalize() else {
        debug!("Twist axis {:?} can not be normalized, returning identity twist", twist_axis);
        return (rotation, Quaternion::IDENTITY);
    };

    let v = Vector3::new(rotation.x, rotation.y, rotation.z);
    let projection = axis * axis.dot(v);
    let twist = Quaternion::from_xyzw(projection.x, projection.y, projection.z, rotation.w);

    let twist = if approx_zero(twist.length_squared()) {
        // Pure 180 degree swing, no twist component
        Quaternion::IDENTITY
    } else {
        twist.normalize()
    };

    let swing = rotation * twist.inverse();
    (swing, twist)
}

/// Rotate `transform` by `rotation` while keeping the world-space `pivot` fixed.
pub fn rotate_about_pivot(transform: &Transform, rotation: Quaternion, pivot: Vector3) -> Transform {
    let mut result = *transform;
    result.translation -= pivot;
    result = Transform::from_rotation(rotation) * result;
    result.translation += pivot;
    result
}
