/*

    Grab pointer model.

    A grab is an interaction session between one physical pointer
    and one grabbable object. GrabPointerData keeps what is needed
    to relate the pointer to the object over the grab's lifetime:
    the pointer id, the start time and the pointer pose at grab
    start expressed in the local space of the grabbed object.

    The free functions are pure, the GrabTracker holds the ordered
    list of grabs for one grabbable and queues begin/end events for
    whoever listens (see drain_events).

    @date: 20 Oct, 2025
*/

use crate::prelude::*;

/// Identity of a physical pointer (hand, controller ray, mouse).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct PointerId(pub u32);

/// Where pointers currently are. Polled every tick while a grab is active.
pub trait PointerSensor {
    /// None if the pointer does not exist (anymore).
    fn current_world_pose(&self, pointer: PointerId) -> Option<Transform>;

    fn current_world_position(&self, pointer: PointerId) -> Option<Vector3> {
        self.current_world_pose(pointer).map(|t| t.translation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrabPointerData {
    pub pointer: PointerId,
    /// Seconds since application start.
    pub start_time: Float,
    /// Pointer transform at grab start, relative to the grabbed object.
    pub local_grab_transform: Transform,
}

impl GrabPointerData {
    pub fn new(pointer: PointerId, start_time: Float, local_grab_transform: Transform) -> Self {
        Self { pointer, start_time, local_grab_transform }
    }
}

/// Grab point in world space.
pub fn grab_location(transform: &Transform, grab: &GrabPointerData) -> Vector3 {
    transform.transform_point(grab.local_grab_transform.translation)
}

/// Grab rotation in world space.
pub fn grab_rotation(transform: &Transform, grab: &GrabPointerData) -> Quaternion {
    transform.transform_rotation(grab.local_grab_transform.rotation)
}

/// Grab transform in world space.
pub fn grab_transform(transform: &Transform, grab: &GrabPointerData) -> Transform {
    *transform * grab.local_grab_transform
}

// A grab refers to a pointer for its whole lifetime. Losing the pointer while
// grabbing is an integration error: assert in debug, fall back in release.
fn dangling(grab: &GrabPointerData) {
    error!("Pointer {:?} vanished during an active grab", grab.pointer);
    debug_assert!(false, "grab pointer {:?} is dangling", grab.pointer);
}

/// Current pointer location in world space.
pub fn target_location(sensor: &impl PointerSensor, grab: &GrabPointerData) -> Vector3 {
    sensor.current_world_position(grab.pointer).unwrap_or_else(|| {
        dangling(grab);
        Vector3::ZERO
    })
}

/// Current pointer rotation in world space.
pub fn target_rotation(sensor: &impl PointerSensor, grab: &GrabPointerData) -> Quaternion {
    target_transform(sensor, grab).rotation
}

/// Current pointer transform in world space.
pub fn target_transform(sensor: &impl PointerSensor, grab: &GrabPointerData) -> Transform {
    sensor.current_world_pose(grab.pointer).unwrap_or_else(|| {
        dangling(grab);
        Transform::IDENTITY
    })
}

/// World space offset from grab point to target.
pub fn location_offset(sensor: &impl PointerSensor, transform: &Transform, grab: &GrabPointerData) -> Vector3 {
    target_location(sensor, grab) - grab_location(transform, grab)
}

/// World space rotation from grab rotation to target rotation.
pub fn rotation_offset(sensor: &impl PointerSensor, transform: &Transform, grab: &GrabPointerData) -> Quaternion {
    (target_rotation(sensor, grab) * grab_rotation(transform, grab).inverse()).normalize()
}

/// Arithmetic mean of `f` over the grabs, zero for an empty set.
pub fn centroid<F>(grabs: &[GrabPointerData], f: F) -> Vector3
where
    F: Fn(&GrabPointerData) -> Vector3,
{
    let sum: Vector3 = grabs.iter().map(f).sum();
    sum / grabs.len().max(1) as Float
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrabEvent {
    Begin(GrabPointerData),
    End(GrabPointerData),
}

/// Ordered list of pointers grabbing one object. Index 0 is the primary grab.
#[derive(Debug, Default)]
pub struct GrabTracker {
    grab_pointers: Vec<GrabPointerData>,
    events: Vec<GrabEvent>,
}

impl GrabTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grab_pointers(&self) -> &[GrabPointerData] {
        &self.grab_pointers
    }

    pub fn is_grabbed(&self) -> bool {
        !self.grab_pointers.is_empty()
    }

    /// Start a grab. A pointer that was already grabbing is released first.
    pub fn begin_grab(&mut self, pointer: PointerId, pointer_pose: &Transform, component_transform: &Transform, time: Float) -> GrabPointerData {
        self.end_grab(pointer);

        let data = GrabPointerData::new(pointer, time, component_transform.to_local(pointer_pose));
        debug!("Pointer {:?} begins grab at t={}", pointer, time);
        self.grab_pointers.push(data);
        self.events.push(GrabEvent::Begin(data));
        data
    }

    /// Remove every grab of this pointer. Returns false if it was not grabbing.
    pub fn end_grab(&mut self, pointer: PointerId) -> bool {
        let events = &mut self.events;
        let before = self.grab_pointers.len();
        self.grab_pointers.retain(|data| {
            if data.pointer == pointer {
                events.push(GrabEvent::End(*data));
                false
            } else {
                true
            }
        });
        before != self.grab_pointers.len()
    }

    /// Recompute the local grab transform from the current poses.
    pub fn reset_local_grab_point(&mut self, pointer: PointerId, pointer_pose: &Transform, component_transform: &Transform) -> bool {
        match self.grab_pointers.iter_mut().find(|d| d.pointer == pointer) {
            Some(data) => {
                data.local_grab_transform = component_transform.to_local(pointer_pose);
                true
            }
            None => false,
        }
    }

    /// Grab data of the pointer and the order in which it started grabbing.
    pub fn find_grab_pointer(&self, pointer: PointerId) -> Option<(usize, &GrabPointerData)> {
        self.grab_pointers
            .iter()
            .enumerate()
            .find(|(_, d)| d.pointer == pointer)
    }

    pub fn primary_grab_pointer(&self) -> Option<&GrabPointerData> {
        self.grab_pointers.first()
    }

    pub fn secondary_grab_pointer(&self) -> Option<&GrabPointerData> {
        self.grab_pointers.get(1)
    }

    /// Centroid of the grab points in world space.
    pub fn grab_point_centroid(&self, transform: &Transform) -> Vector3 {
        centroid(&self.grab_pointers, |g| grab_location(transform, g))
    }

    /// Centroid of the pointer targets in world space.
    pub fn target_centroid(&self, sensor: &impl PointerSensor) -> Vector3 {
        centroid(&self.grab_pointers, |g| target_location(sensor, g))
    }

    /// Hand out queued begin/end events in the order they happened.
    pub fn drain_events(&mut self) -> Vec<GrabEvent> {
        std::mem::take(&mut self.events)
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

    #[test]
    fn test_centroid_of_empty_set_is_zero() {
        let c = centroid(&[], |g| g.local_grab_transform.translation);
        assert_eq!(c, Vector3::ZERO);
        assert_eq!(GrabTracker::new().grab_point_centroid(&Transform::IDENTITY), Vector3::ZERO);
    }

    #[test]
    fn test_grab_order_and_reentry() {
        let mut tracker = GrabTracker::new();
        let pose = Transform::from_translation(Vector3::X);
        tracker.begin_grab(PointerId(1), &pose, &Transform::IDENTITY, 0.0);
        tracker.begin_grab(PointerId(2), &pose, &Transform::IDENTITY, 0.5);
        assert_eq!(tracker.primary_grab_pointer().unwrap().pointer, PointerId(1));
        assert_eq!(tracker.secondary_grab_pointer().unwrap().pointer, PointerId(2));

        // Grabbing again with the same pointer moves it to the back
        tracker.begin_grab(PointerId(1), &pose, &Transform::IDENTITY, 1.0);
        assert_eq!(tracker.find_grab_pointer(PointerId(1)).unwrap().0, 1);
        assert_eq!(tracker.grab_pointers().len(), 2);

        let events = tracker.drain_events();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[2], GrabEvent::End(d) if d.pointer == PointerId(1)));
        assert!(tracker.drain_events().is_empty());
    }

    #[test]
    fn test_end_grab_unknown_pointer() {
        let mut tracker = GrabTracker::new();
        assert!(!tracker.end_grab(PointerId(7)));
        assert!(tracker.drain_events().is_empty());
    }

    #[test]
    fn test_local_grab_roundtrip_and_offsets() {
        let component = Transform::new(
            Rotator::new(0.0, 90.0, 0.0).to_quat(),
            Vector3::new(5.0, 0.0, 0.0),
            Vector3::splat(2.0),
        );
        let pose = Transform::from_translation(Vector3::new(5.0, 4.0, 0.0));
        let mut tracker = GrabTracker::new();
        let grab = tracker.begin_grab(PointerId(3), &pose, &component, 0.0);

        assert!(grab_location(&component, &grab).abs_diff_eq(pose.translation, EPS));

        let mut sensor = Pointers::default();
        sensor.0.insert(PointerId(3), Transform::from_translation(Vector3::new(5.0, 4.0, 1.0)));
        assert!(location_offset(&sensor, &component, &grab).abs_diff_eq(Vector3::Z, EPS));
        assert!(tracker.target_centroid(&sensor).abs_diff_eq(Vector3::new(5.0, 4.0, 1.0), EPS));

        // Pointer rotation equals grab rotation: no rotation offset
        sensor.0.insert(PointerId(3), pose);
        assert!(rotation_offset(&sensor, &component, &grab).abs_diff_eq(Quaternion::IDENTITY, EPS));
    }

    #[test]
    fn test_reset_local_grab_point() {
        let component = Transform::new(
            Rotator::new(0.0, 90.0, 0.0).to_quat(),
            Vector3::new(2.0, 0.0, 0.0),
            Vector3::ONE,
        );
        let mut tracker = GrabTracker::new();
        tracker.begin_grab(PointerId(1), &Transform::from_translation(Vector3::new(2.0, 1.0, 0.0)), &component, 0.0);

        let moved = Transform::from_translation(Vector3::new(3.0, 1.0, 2.0));
        assert!(tracker.reset_local_grab_point(PointerId(1), &moved, &component));
        let grab = tracker.primary_grab_pointer().unwrap();
        assert!(grab_location(&component, grab).abs_diff_eq(moved.translation, EPS));

        assert!(!tracker.reset_local_grab_point(PointerId(9), &moved, &component));
        // Resetting does not emit events
        assert_eq!(tracker.drain_events().len(), 1);
    }

    #[test]
    fn test_centroid_of_two_grabs() {
        let mut tracker = GrabTracker::new();
        tracker.begin_grab(PointerId(1), &Transform::from_translation(Vector3::new(1.0, 0.0, 0.0)), &Transform::IDENTITY, 0.0);
        tracker.begin_grab(PointerId(2), &Transform::from_translation(Vector3::new(3.0, 2.0, 0.0)), &Transform::IDENTITY, 0.0);
        let c = tracker.grab_point_centroid(&Transform::IDENTITY);
        assert!(c.abs_diff_eq(Vector3::new(2.0, 1.0, 0.0), EPS));
    }
}
