/*

    Interfaces to the application hosting a manipulator.

    The manipulation core does not own a scene. Whatever runs it
    (an engine, an editor, a test) provides the owner's geometry,
    the pointer poses and the proxies drawn for each affordance.

    InMemoryHost is a minimal host without rendering, used by the
    `manipulate` binary and the integration tests.

    @date: 27 Oct, 2025
*/

use std::collections::{BTreeMap, HashMap};

use crate::affordance::ProxyClass;
use crate::bbox::{calculate_nested_bounds, AxisAlignedBox};
use crate::grab::{GrabEvent, GrabTracker, PointerId, PointerSensor};
use crate::manipulator::ManipulationTarget;
use crate::prelude::*;

/// Opaque handle of a spawned affordance proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProxyHandle(pub u64);

pub trait GeometrySource {
    /// Box enclosing the owner's visible parts, in the owner's local space.
    fn compute_local_bounds(&self) -> AxisAlignedBox;
}

pub trait ProxyLifecycle {
    /// None if the host can not spawn the class.
    fn spawn_proxy(&mut self, class: &ProxyClass) -> Option<ProxyHandle>;
    fn destroy_proxy(&mut self, handle: ProxyHandle);
    fn set_proxy_transform(&mut self, handle: ProxyHandle, transform: Transform);
    fn proxy_transform(&self, handle: ProxyHandle) -> Option<Transform>;
}

/// Everything a bounding box manipulator needs from its host.
pub trait ManipulatorHost: GeometrySource + PointerSensor + ProxyLifecycle + ManipulationTarget {}

impl<T> ManipulatorHost for T where T: GeometrySource + PointerSensor + ProxyLifecycle + ManipulationTarget {}

#[derive(Debug)]
pub struct Proxy {
    pub class: ProxyClass,
    pub transform: Transform,
    /// Pointers grabbing this proxy.
    pub tracker: GrabTracker,
}

#[derive(Debug, Default)]
pub struct InMemoryHost {
    pub owner: Transform,
    /// Parts of the owner: transform relative to the owner and local box of the part.
    pub parts: Vec<(Transform, AxisAlignedBox)>,
    pointers: HashMap<PointerId, Transform>,
    proxies: BTreeMap<ProxyHandle, Proxy>,
    next_handle: u64,
}

impl InMemoryHost {
    pub fn new(owner: Transform) -> Self {
        Self {
            owner,
            ..Default::default()
        }
    }

    pub fn add_part(&mut self, relative_transform: Transform, bounds: AxisAlignedBox) {
        self.parts.push((relative_transform, bounds));
    }

    pub fn set_pointer_pose(&mut self, pointer: PointerId, pose: Transform) {
        self.pointers.insert(pointer, pose);
    }

    pub fn remove_pointer(&mut self, pointer: PointerId) {
        self.pointers.remove(&pointer);
    }

    pub fn proxy(&self, handle: ProxyHandle) -> Option<&Proxy> {
        self.proxies.get(&handle)
    }

    pub fn proxy_count(&self) -> usize {
        self.proxies.len()
    }

    /// Start a grab of the proxy with the pointer at its current pose.
    /// Returns the events the proxy emitted, empty if either does not exist.
    pub fn grab_proxy(&mut self, pointer: PointerId, handle: ProxyHandle, time: Float) -> Vec<GrabEvent> {
        let Some(pose) = self.pointers.get(&pointer).copied() else {
            warn!("Pointer {:?} does not exist, can not grab", pointer);
            return Vec::new();
        };
        match self.proxies.get_mut(&handle) {
            Some(proxy) => {
                proxy.tracker.begin_grab(pointer, &pose, &proxy.transform, time);
                proxy.tracker.drain_events()
            }
            None => Vec::new(),
        }
    }

    pub fn release_proxy(&mut self, pointer: PointerId, handle: ProxyHandle) -> Vec<GrabEvent> {
        match self.proxies.get_mut(&handle) {
            Some(proxy) => {
                proxy.tracker.end_grab(pointer);
                proxy.tracker.drain_events()
            }
            None => Vec::new(),
        }
    }
}

impl GeometrySource for InMemoryHost {
    fn compute_local_bounds(&self) -> AxisAlignedBox {
        // Parts are stored relative to the owner already
        calculate_nested_bounds(&self.parts, &Transform::IDENTITY)
    }
}

impl PointerSensor for InMemoryHost {
    fn current_world_pose(&self, pointer: PointerId) -> Option<Transform> {
        self.pointers.get(&pointer).copied()
    }
}

impl ProxyLifecycle for InMemoryHost {
    fn spawn_proxy(&mut self, class: &ProxyClass) -> Option<ProxyHandle> {
        self.next_handle += 1;
        let handle = ProxyHandle(self.next_handle);
        self.proxies.insert(
            handle,
            Proxy {
                class: class.clone(),
                transform: Transform::IDENTITY,
                tracker: GrabTracker::new(),
            },
        );
        Some(handle)
    }

    fn destroy_proxy(&mut self, handle: ProxyHandle) {
        self.proxies.remove(&handle);
    }

    fn set_proxy_transform(&mut self, handle: ProxyHandle, transform: Transform) {
        if let Some(proxy) = self.proxies.get_mut(&handle) {
            proxy.transform = transform;
        }
    }

    fn proxy_transform(&self, handle: ProxyHandle) -> Option<Transform> {
        self.proxies.get(&handle).map(|p| p.transform)
    }
}

impl ManipulationTarget for InMemoryHost {
    fn world_transform(&self) -> Transform {
        self.owner
    }

    fn set_world_transform(&mut self, transform: Transform) {
        self.owner = transform;
    }
}
