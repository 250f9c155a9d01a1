/*

    Declare numeric types used throughout this repo.

    WARNING: If you like to use f32 instead of f64
    during computations, you need to change all of these
    together: Float, Vector3, Matrix3, Quaternion.

    @date: 2 Oct, 2025
*/

use bevy_math::{DMat3, DQuat, DVec3};

pub type Float = f64; // WARNING: If you want to change it to f32, don't forget to update the aliases below
pub type Vector3 = DVec3;
pub type Matrix3 = DMat3;
pub type Quaternion = DQuat;

/// Tolerance used for "is this extent/length usable" checks.
pub const KINDA_SMALL: Float = 1e-4;
/// Tolerance used for squared lengths before normalizing.
pub const SMALL: Float = 1e-8;

pub fn approx_zero(x: Float) -> bool {
    x.abs() < SMALL
}

pub fn is_nearly_zero(x: Float) -> bool {
    x.abs() <= KINDA_SMALL
}

/// Component-wise division that leaves 0 where the divisor is ~0.
pub fn safe_div(v: Vector3, d: Vector3) -> Vector3 {
    let div = |a: Float, b: Float| if approx_zero(b) { 0.0 } else { a / b };
    Vector3::new(div(v.x, d.x), div(v.y, d.y), div(v.z, d.z))
}

/// Outer product a * b^T, built column by column.
pub fn outer(a: Vector3, b: Vector3) -> Matrix3 {
    Matrix3::from_cols(a * b.x, a * b.y, a * b.z)
}
