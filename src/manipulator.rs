/*

    Base for manipulators that react to grabbing pointers.

    It does not move anything by itself. Implementations compute a
    target transform with move_to_targets / rotate_around_pivot /
    rotate_about_axis and hand it to apply_target_transform.

    Only single pointer rotation is solved. With more than one
    pointer the rotation needs a least-squares fit (SVD of the
    grab/target cross covariance), which is not implemented: the
    source transform is returned unchanged in that case.

    @date: 22 Oct, 2025
*/

use crate::grab::{grab_location, target_location, GrabEvent, GrabPointerData, GrabTracker, PointerId, PointerSensor};
use crate::math_utils::{minimal_rotation, rotate_about_pivot, swing_twist_decompose};
use crate::prelude::*;

/// The object a manipulator moves, usually the owning actor's root.
pub trait ManipulationTarget {
    fn world_transform(&self) -> Transform;
    fn set_world_transform(&mut self, transform: Transform);
}

#[derive(Debug, SmartDefault)]
pub struct ManipulatorBase {
    tracker: GrabTracker,

    /// World transform of the manipulated component when manipulation started.
    pub initial_transform: Transform,

    /// Initial transform relative to the head pose at that moment.
    pub initial_camera_space_transform: Transform,

    /// If true the initial transform is captured when the first pointer grabs.
    #[default = true]
    pub auto_set_initial_transform: bool,
}

impl ManipulatorBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracker(&self) -> &GrabTracker {
        &self.tracker
    }

    pub fn grab_pointers(&self) -> &[GrabPointerData] {
        self.tracker.grab_pointers()
    }

    /// Start a grab on the manipulator component.
    /// `head_pose` is only used if this grab captures the initial transform.
    pub fn begin_grab(&mut self, pointer: PointerId, pointer_pose: &Transform, component_transform: &Transform, head_pose: &Transform, time: Float) -> GrabPointerData {
        let data = self.tracker.begin_grab(pointer, pointer_pose, component_transform, time);
        if self.auto_set_initial_transform && self.tracker.grab_pointers().len() == 1 {
            self.set_initial_transform(component_transform, head_pose);
        }
        data
    }

    pub fn end_grab(&mut self, pointer: PointerId) -> bool {
        self.tracker.end_grab(pointer)
    }

    pub fn drain_events(&mut self) -> Vec<GrabEvent> {
        self.tracker.drain_events()
    }

    /// Cache the world space and camera space transform manipulation is based on.
    pub fn set_initial_transform(&mut self, component_transform: &Transform, head_pose: &Transform) {
        self.initial_transform = *component_transform;
        self.initial_camera_space_transform = head_pose.to_local(component_transform);
    }

    /// Translate the source transform so the grab centroid matches the target centroid.
    pub fn move_to_targets(&self, sensor: &impl PointerSensor, source: &Transform) -> Transform {
        let center_grab = self.tracker.grab_point_centroid(source);
        let center_target = self.tracker.target_centroid(sensor);
        Transform::from_translation(center_target - center_grab) * *source
    }

    // Single pointer only, None means "leave the source as it is".
    fn single_pointer_rotation(&self, sensor: &impl PointerSensor, source: &Transform, pivot: Vector3) -> Option<Quaternion> {
        match self.tracker.grab_pointers() {
            [] => None,
            [grab] => {
                let grab_vec = grab_location(source, grab) - pivot;
                let target_vec = target_location(sensor, grab) - pivot;
                Some(minimal_rotation(grab_vec, target_vec))
            }
            _ => {
                // TODO: least-squares rotation for several pointers (SVD of the cross covariance)
                None
            }
        }
    }

    /// Rotate the source transform around the pivot so the pointer lines up with its target.
    pub fn rotate_around_pivot(&self, sensor: &impl PointerSensor, source: &Transform, pivot: Vector3) -> Transform {
        match self.single_pointer_rotation(sensor, source, pivot) {
            Some(rotation) => rotate_about_pivot(source, rotation, pivot),
            None => *source,
        }
    }

    /// Like rotate_around_pivot but only keeps the part of the rotation about `axis`.
    pub fn rotate_about_axis(&self, sensor: &impl PointerSensor, source: &Transform, pivot: Vector3, axis: Vector3) -> Transform {
        match self.single_pointer_rotation(sensor, source, pivot) {
            Some(rotation) => {
                let (_swing, twist) = swing_twist_decompose(rotation, axis);
                rotate_about_pivot(source, twist, pivot)
            }
            None => *source,
        }
    }

    /// Apply the target transform to the root while keeping the offset
    /// between the manipulator component and the root.
    pub fn apply_target_transform(&self, target: &mut impl ManipulationTarget, component_transform: &Transform, transform: &Transform) {
        let root = target.world_transform();
        let offset = component_transform.to_local(&root);
        target.set_world_transform(*transform * offset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const EPS: Float = 1e-9;

    #[derive(Default)]
    struct Pointers(HashMap<PointerId, Transform>);

    impl PointerSensor for Pointers {
        fn current_world_pose(&self, pointer: PointerId) -> Option<Transform> {
            self.0.get(&pointer).copied()
        }
    }

    struct Root(Transform);

    impl ManipulationTarget for Root {
        fn world_transform(&self) -> Transform {
            self.0
        }
        fn set_world_transform(&mut self, transform: Transform) {
            self.0 = transform;
        }
    }

    fn grabbed(pointer_at: Vector3) -> (ManipulatorBase, Pointers) {
        let mut m = ManipulatorBase::new();
        m.begin_grab(PointerId(0), &Transform::from_translation(pointer_at), &Transform::IDENTITY, &Transform::IDENTITY, 0.0);
        (m, Pointers::default())
    }

    #[test]
    fn test_move_to_targets() {
        let (m, mut sensor) = grabbed(Vector3::new(1.0, 0.0, 0.0));
        sensor.0.insert(PointerId(0), Transform::from_translation(Vector3::new(1.0, 2.0, 0.0)));
        let moved = m.move_to_targets(&sensor, &Transform::IDENTITY);
        assert!(moved.translation.abs_diff_eq(Vector3::new(0.0, 2.0, 0.0), EPS));
    }

    #[test]
    fn test_rotate_around_pivot_single_pointer() {
        let (m, mut sensor) = grabbed(Vector3::new(1.0, 0.0, 0.0));
        sensor.0.insert(PointerId(0), Transform::from_translation(Vector3::new(0.0, 1.0, 0.0)));
        let rotated = m.rotate_around_pivot(&sensor, &Transform::IDENTITY, Vector3::ZERO);
        assert!((rotated.rotation * Vector3::X).abs_diff_eq(Vector3::Y, EPS));
        assert!(rotated.translation.abs_diff_eq(Vector3::ZERO, EPS));
    }

    #[test]
    fn test_rotate_about_axis_keeps_twist_only() {
        let (m, mut sensor) = grabbed(Vector3::new(1.0, 0.0, 0.0));
        // Target is up and to the side, only the turn about Z survives
        sensor.0.insert(PointerId(0), Transform::from_translation(Vector3::new(0.0, 1.0, 1.0)));
        let rotated = m.rotate_about_axis(&sensor, &Transform::IDENTITY, Vector3::ZERO, Vector3::Z);
        assert!((rotated.rotation * Vector3::Z).abs_diff_eq(Vector3::Z, EPS));
    }

    #[test]
    fn test_several_pointers_leave_source_unchanged() {
        let (mut m, mut sensor) = grabbed(Vector3::new(1.0, 0.0, 0.0));
        m.begin_grab(PointerId(1), &Transform::from_translation(Vector3::new(-1.0, 0.0, 0.0)), &Transform::IDENTITY, &Transform::IDENTITY, 0.1);
        sensor.0.insert(PointerId(0), Transform::from_translation(Vector3::Y));
        sensor.0.insert(PointerId(1), Transform::from_translation(Vector3::NEG_Y));
        let source = Transform::from_translation(Vector3::new(0.5, 0.5, 0.5));
        assert_eq!(m.rotate_around_pivot(&sensor, &source, Vector3::ZERO), source);
        assert_eq!(m.rotate_about_axis(&sensor, &source, Vector3::ZERO, Vector3::Z), source);
    }

    #[test]
    fn test_no_pointer_leaves_source_unchanged() {
        let m = ManipulatorBase::new();
        let sensor = Pointers::default();
        let source = Transform::from_translation(Vector3::ONE);
        assert_eq!(m.rotate_around_pivot(&sensor, &source, Vector3::ZERO), source);
        assert_eq!(m.move_to_targets(&sensor, &source), source);
    }

    #[test]
    fn test_initial_transform_on_first_grab_only() {
        let mut m = ManipulatorBase::new();
        let first = Transform::from_translation(Vector3::X);
        let head = Transform::from_translation(Vector3::new(0.0, 0.0, 2.0));
        m.begin_grab(PointerId(0), &Transform::IDENTITY, &first, &head, 0.0);
        m.begin_grab(PointerId(1), &Transform::IDENTITY, &Transform::from_translation(Vector3::Y), &head, 0.0);
        assert_eq!(m.initial_transform, first);
        assert!(m.initial_camera_space_transform.translation.abs_diff_eq(Vector3::new(1.0, 0.0, -2.0), EPS));
    }

    #[test]
    fn test_apply_target_transform_keeps_offset() {
        let m = ManipulatorBase::new();
        let mut root = Root(Transform::IDENTITY);
        // Component sits 1 unit in front of the root
        let component = Transform::from_translation(Vector3::X);
        let target = Transform::from_translation(Vector3::new(5.0, 0.0, 0.0));
        m.apply_target_transform(&mut root, &component, &target);
        assert!(root.0.translation.abs_diff_eq(Vector3::new(4.0, 0.0, 0.0), EPS));
    }
}
