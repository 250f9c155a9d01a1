/*

    Preset catalog of bounding box affordances.

    The center plus twenty-six canonical locations on the unit box
    (6 faces, 12 edges, 8 corners), each with a fixed location and
    rotation.
    Named presets combine these locations with actions.

    The tables are built once on first use and never change afterwards.

    @date: 15 Oct, 2025
*/

use std::sync::OnceLock;

use crate::affordance::{Affordance, AffordanceAction, AffordanceKind};
use crate::constraint::default_constraint_matrix;
use crate::prelude::*;

/// Possible presets for common bounding box configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum ManipulatorPreset {
    /// Uniform resizing with corners and rotation with edges.
    #[default]
    Default,
    /// Only front corners and edges are shown, all resize.
    Slate2D,
    /// Full set of affordances, all resizing.
    AllResize,
    /// Full set of affordances, all translating.
    AllTranslate,
    /// Full set of affordances, all scaling.
    AllScale,
    /// Full set of affordances, all rotating.
    AllRotate,
}

impl ManipulatorPreset {
    pub const ALL: [ManipulatorPreset; 6] = [
        ManipulatorPreset::Default,
        ManipulatorPreset::Slate2D,
        ManipulatorPreset::AllResize,
        ManipulatorPreset::AllTranslate,
        ManipulatorPreset::AllScale,
        ManipulatorPreset::AllRotate,
    ];
}

/// Canonical placements on the box. Front is +X, right is +Y, top is +Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffordancePlacement {
    Center,
    FaceFront,
    FaceBack,
    FaceRight,
    FaceLeft,
    FaceTop,
    FaceBottom,
    EdgeFrontRight,
    EdgeFrontLeft,
    EdgeFrontTop,
    EdgeFrontBottom,
    EdgeBackRight,
    EdgeBackLeft,
    EdgeBackTop,
    EdgeBackBottom,
    EdgeRightTop,
    EdgeRightBottom,
    EdgeLeftTop,
    EdgeLeftBottom,
    CornerFrontRightTop,
    CornerFrontRightBottom,
    CornerFrontLeftTop,
    CornerFrontLeftBottom,
    CornerBackRightTop,
    CornerBackRightBottom,
    CornerBackLeftTop,
    CornerBackLeftBottom,
}

use AffordancePlacement as P;

const FACES: [AffordancePlacement; 6] = [P::FaceFront, P::FaceBack, P::FaceRight, P::FaceLeft, P::FaceTop, P::FaceBottom];

const EDGES: [AffordancePlacement; 12] = [
    P::EdgeFrontRight, P::EdgeFrontLeft, P::EdgeFrontTop, P::EdgeFrontBottom,
    P::EdgeBackRight, P::EdgeBackLeft, P::EdgeBackTop, P::EdgeBackBottom,
    P::EdgeRightTop, P::EdgeRightBottom, P::EdgeLeftTop, P::EdgeLeftBottom,
];

const CORNERS: [AffordancePlacement; 8] = [
    P::CornerFrontRightTop, P::CornerFrontRightBottom, P::CornerFrontLeftTop, P::CornerFrontLeftBottom,
    P::CornerBackRightTop, P::CornerBackRightBottom, P::CornerBackLeftTop, P::CornerBackLeftBottom,
];

impl AffordancePlacement {
    pub fn location(&self) -> Vector3 {
        let (x, y, z) = match self {
            P::Center => (0.0, 0.0, 0.0),

            P::FaceFront => (1.0, 0.0, 0.0),
            P::FaceBack => (-1.0, 0.0, 0.0),
            P::FaceRight => (0.0, 1.0, 0.0),
            P::FaceLeft => (0.0, -1.0, 0.0),
            P::FaceTop => (0.0, 0.0, 1.0),
            P::FaceBottom => (0.0, 0.0, -1.0),

            P::EdgeFrontRight => (1.0, 1.0, 0.0),
            P::EdgeFrontLeft => (1.0, -1.0, 0.0),
            P::EdgeFrontTop => (1.0, 0.0, 1.0),
            P::EdgeFrontBottom => (1.0, 0.0, -1.0),
            P::EdgeBackRight => (-1.0, 1.0, 0.0),
            P::EdgeBackLeft => (-1.0, -1.0, 0.0),
            P::EdgeBackTop => (-1.0, 0.0, 1.0),
            P::EdgeBackBottom => (-1.0, 0.0, -1.0),
            P::EdgeRightTop => (0.0, 1.0, 1.0),
            P::EdgeRightBottom => (0.0, 1.0, -1.0),
            P::EdgeLeftTop => (0.0, -1.0, 1.0),
            P::EdgeLeftBottom => (0.0, -1.0, -1.0),

            P::CornerFrontRightTop => (1.0, 1.0, 1.0),
            P::CornerFrontRightBottom => (1.0, 1.0, -1.0),
            P::CornerFrontLeftTop => (1.0, -1.0, 1.0),
            P::CornerFrontLeftBottom => (1.0, -1.0, -1.0),
            P::CornerBackRightTop => (-1.0, 1.0, 1.0),
            P::CornerBackRightBottom => (-1.0, 1.0, -1.0),
            P::CornerBackLeftTop => (-1.0, -1.0, 1.0),
            P::CornerBackLeftBottom => (-1.0, -1.0, -1.0),
        };
        Vector3::new(x, y, z)
    }

    /// Rotation as (pitch, yaw, roll) in degrees.
    pub fn rotation(&self) -> Rotator {
        let (pitch, yaw, roll) = match self {
            P::Center => (0.0, 0.0, 0.0),

            P::FaceFront => (0.0, 0.0, 0.0),
            P::FaceBack => (0.0, 180.0, 0.0),
            P::FaceRight => (0.0, 90.0, 0.0),
            P::FaceLeft => (0.0, 270.0, 0.0),
            P::FaceTop => (90.0, 0.0, 0.0),
            P::FaceBottom => (270.0, 0.0, 0.0),

            P::EdgeFrontRight => (0.0, 0.0, 0.0),
            P::EdgeFrontLeft => (0.0, 270.0, 0.0),
            P::EdgeFrontTop => (90.0, 0.0, 90.0),
            P::EdgeFrontBottom => (0.0, 0.0, 90.0),
            P::EdgeBackRight => (0.0, 90.0, 0.0),
            P::EdgeBackLeft => (0.0, 180.0, 0.0),
            P::EdgeBackTop => (180.0, 0.0, 90.0),
            P::EdgeBackBottom => (270.0, 0.0, 90.0),
            P::EdgeRightTop => (90.0, 0.0, 0.0),
            P::EdgeRightBottom => (270.0, 0.0, 0.0),
            P::EdgeLeftTop => (90.0, 90.0, 270.0),
            P::EdgeLeftBottom => (270.0, 0.0, 180.0),

            P::CornerFrontRightTop => (0.0, 0.0, 0.0),
            P::CornerFrontRightBottom => (0.0, 0.0, 90.0),
            P::CornerFrontLeftTop => (0.0, 270.0, 0.0),
            P::CornerFrontLeftBottom => (0.0, 270.0, 90.0),
            P::CornerBackRightTop => (0.0, 90.0, 0.0),
            P::CornerBackRightBottom => (0.0, 90.0, 90.0),
            P::CornerBackLeftTop => (0.0, 180.0, 0.0),
            P::CornerBackLeftBottom => (0.0, 180.0, 90.0),
        };
        Rotator::new(pitch, yaw, roll)
    }

    pub fn kind(&self) -> AffordanceKind {
        match self {
            P::Center => AffordanceKind::Center,
            p if FACES.contains(p) => AffordanceKind::Face,
            p if EDGES.contains(p) => AffordanceKind::Edge,
            _ => AffordanceKind::Corner,
        }
    }

    /// All 27 placements: center, faces, corners, edges.
    pub fn all() -> impl Iterator<Item = AffordancePlacement> {
        std::iter::once(P::Center)
            .chain(FACES)
            .chain(CORNERS)
            .chain(EDGES)
    }
}

pub fn make_affordance_from_placement(placement: AffordancePlacement, action: AffordanceAction) -> Affordance {
    let location = placement.location();
    Affordance {
        kind: placement.kind(),
        action,
        bounds_location: location,
        bounds_rotation: placement.rotation(),
        // Allow movement on non-aligned axes
        constraint_matrix: default_constraint_matrix(location, action.supports_uniform_constraint()),
        actor_class: None,
    }
}

fn build_preset(preset: ManipulatorPreset) -> Vec<Affordance> {
    use AffordanceAction as A;
    match preset {
        ManipulatorPreset::Default => CORNERS
            .iter()
            .map(|p| make_affordance_from_placement(*p, A::Resize))
            .chain(EDGES.iter().map(|p| make_affordance_from_placement(*p, A::Rotate)))
            .collect(),
        ManipulatorPreset::Slate2D => [P::CornerFrontRightTop, P::CornerFrontRightBottom, P::CornerFrontLeftTop, P::CornerFrontLeftBottom]
            .iter()
            .chain([P::EdgeFrontRight, P::EdgeFrontLeft, P::EdgeFrontTop, P::EdgeFrontBottom].iter())
            .map(|p| make_affordance_from_placement(*p, A::Resize))
            .collect(),
        ManipulatorPreset::AllResize => all_with_action(A::Resize),
        ManipulatorPreset::AllTranslate => all_with_action(A::Translate),
        ManipulatorPreset::AllScale => all_with_action(A::Scale),
        ManipulatorPreset::AllRotate => all_with_action(A::Rotate),
    }
}

fn all_with_action(action: AffordanceAction) -> Vec<Affordance> {
    AffordancePlacement::all()
        .map(|p| make_affordance_from_placement(p, action))
        .collect()
}

/// Get the list of affordances contained in a preset.
pub fn preset_affordances(preset: ManipulatorPreset) -> &'static [Affordance] {
    static REGISTRY: OnceLock<Vec<Vec<Affordance>>> = OnceLock::new();
    let registry = REGISTRY.get_or_init(|| {
        debug!("Building bounding box preset tables");
        ManipulatorPreset::ALL.iter().map(|p| build_preset(*p)).collect()
    });
    // ALL is ordered like the enum declaration
    &registry[preset as usize]
}
