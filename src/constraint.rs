/*

    Constraint matrices restricting drag vectors to the axes
    or planes an affordance is allowed to move along.

    Given v = (x, y, z):
        - axial:    outer(v, v) / |v|^2        projection on the axis v
        - planar:   I - outer(n, n) / |n|^2    projection on the plane orthogonal to n
        - diagonal: diag(x^2, y^2, z^2) / |v|^2  per-axis, no cross coupling
        - uniform:  outer(v, v) / |v|^2        all active axes move proportionally

    |v|^2 == 0 yields the zero matrix for every form.

    @date: 14 Oct, 2025
*/

use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Axial,
    Planar,
    Diagonal,
    Uniform,
}

impl ConstraintKind {
    pub fn matrix(&self, v: Vector3) -> Matrix3 {
        match self {
            ConstraintKind::Axial => make_axial_constraint_matrix(v),
            ConstraintKind::Planar => make_planar_constraint_matrix(v),
            ConstraintKind::Diagonal => make_diagonal_matrix(v),
            ConstraintKind::Uniform => make_uniform_matrix(v),
        }
    }
}

#[inline]
fn inv_norm2(v: Vector3) -> Option<Float> {
    let norm2 = v.length_squared();
    if norm2 > 0.0 { Some(1.0 / norm2) } else { None }
}

pub fn make_axial_constraint_matrix(axis: Vector3) -> Matrix3 {
    match inv_norm2(axis) {
        Some(inv) => outer(axis, axis) * inv,
        None => Matrix3::ZERO,
    }
}

pub fn make_planar_constraint_matrix(normal: Vector3) -> Matrix3 {
    match inv_norm2(normal) {
        Some(inv) => Matrix3::IDENTITY - outer(normal, normal) * inv,
        None => Matrix3::ZERO,
    }
}

pub fn make_diagonal_matrix(v: Vector3) -> Matrix3 {
    match inv_norm2(v) {
        Some(inv) => Matrix3::from_diagonal(v * v * inv),
        None => Matrix3::ZERO,
    }
}

pub fn make_uniform_matrix(v: Vector3) -> Matrix3 {
    // Same projection as the axial matrix, the difference is where it is used:
    // at corners and edges several axes are active at once.
    make_axial_constraint_matrix(v)
}

/// Constraint an affordance at `location` gets by default for `uniform_action`.
/// Single-axis locations reduce to the same matrix either way.
pub fn default_constraint_matrix(location: Vector3, uniform_action: bool) -> Matrix3 {
    if uniform_action {
        make_uniform_matrix(location)
    } else {
        make_diagonal_matrix(location)
    }
}
