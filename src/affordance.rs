/*

    Declare affordances: grabbable handles placed on the
    bounding box which enable one kind of manipulation.

    - AffordanceKind: which proxy class to spawn (center/face/edge/corner)
    - AffordanceAction: what dragging it does to the box
    - Affordance: placement in normalized box space + constraint

    @date: 13 Oct, 2025
*/

use serde::de::Deserializer;

use crate::bbox::AxisAlignedBox;
use crate::config::{deser_vec3, deser_mat3_cols};
use crate::constraint::ConstraintKind;
use crate::prelude::*;

/// Defines the kind of proxy that should be spawned for an affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum AffordanceKind {
    #[default]
    Center,
    Face,
    Edge,
    Corner,
}

impl AffordanceKind {
    /// Kind implied by a location in normalized box space,
    /// counting how many axes are non-zero.
    pub fn from_location(location: Vector3) -> Self {
        let active = location.to_array().iter().filter(|c| !approx_zero(**c)).count();
        match active {
            0 => AffordanceKind::Center,
            1 => AffordanceKind::Face,
            2 => AffordanceKind::Edge,
            _ => AffordanceKind::Corner,
        }
    }
}

/// Defines which effect moving an affordance has on the bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum AffordanceAction {
    /// Move only one side of the bounding box.
    #[default]
    Resize,
    /// Move both sides of the bounding box.
    Translate,
    /// Scale the bounding box, moving both sides in opposite directions.
    Scale,
    /// Rotate the bounding box about its center point.
    Rotate,
}

impl AffordanceAction {
    /// True if the action supports uniform (coupled) constraints.
    pub fn supports_uniform_constraint(&self) -> bool {
        !matches!(self, AffordanceAction::Rotate)
    }
}

/// Name of a proxy class the host knows how to spawn.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct ProxyClass(pub String);

impl ProxyClass {
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Affordance {
    pub kind: AffordanceKind,
    pub action: AffordanceAction,
    /// Location in normalized bounding box space, components in [-1, 1].
    pub bounds_location: Vector3,
    /// Rotation of the affordance in bounding box space.
    pub bounds_rotation: Rotator,
    /// Drag vectors are multiplied with this matrix during interaction.
    pub constraint_matrix: Matrix3,
    /// Overrides the per-kind proxy class when set.
    pub actor_class: Option<ProxyClass>,
}

impl Default for Affordance {
    fn default() -> Self {
        Self {
            kind: AffordanceKind::Center,
            action: AffordanceAction::Resize,
            bounds_location: Vector3::ZERO,
            bounds_rotation: Rotator::ZERO,
            constraint_matrix: Matrix3::IDENTITY,
            actor_class: None,
        }
    }
}

impl Affordance {
    /// Transform from affordance local space to world space, based on the root transform.
    /// Root transform scale is not passed on to the affordance.
    pub fn world_transform(&self, bounds: &AxisAlignedBox, root: &Transform) -> Transform {
        let location = bounds.center() + bounds.extent() * self.bounds_location;
        Transform::new(
            root.transform_rotation(self.bounds_rotation.to_quat()),
            root.transform_point(location),
            Vector3::ONE,
        )
    }
}

// Custom affordances come from configuration files. The constraint can be given
// explicitly as three matrix columns or as a shorthand applied to the location.
impl<'de> Deserialize<'de> for Affordance {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "PascalCase")]
        struct Helper {
            #[serde(default)]
            kind: Option<AffordanceKind>,
            #[serde(default)]
            action: AffordanceAction,
            #[serde(deserialize_with = "deser_vec3")]
            bounds_location: Vector3,
            #[serde(default)]
            bounds_rotation: Rotator,
            #[serde(default, deserialize_with = "deser_mat3_cols")]
            constraint_matrix: Option<Matrix3>,
            #[serde(default)]
            constraint: Option<ConstraintKind>,
            #[serde(default)]
            actor_class: Option<ProxyClass>,
        }

        let helper = Helper::deserialize(deserializer)?;
        let constraint_matrix = match (helper.constraint_matrix, helper.constraint) {
            (Some(m), _) => m,
            (None, Some(kind)) => kind.matrix(helper.bounds_location),
            (None, None) => Matrix3::IDENTITY,
        };

        Ok(Affordance {
            kind: helper.kind.unwrap_or_else(|| AffordanceKind::from_location(helper.bounds_location)),
            action: helper.action,
            bounds_location: helper.bounds_location,
            bounds_rotation: helper.bounds_rotation,
            constraint_matrix,
            actor_class: helper.actor_class,
        })
    }
}
