/*

    Bounding box manipulator.

    Spawns one proxy per affordance around the owner's local bounds
    and turns a pointer dragging one of them into a new owner
    transform. The bounds themselves never change: the owner is moved,
    rotated and scaled so that its initial bounds end up where the
    modified box is.

    All movement is computed in the owner's local space as it was
    when the grab started, so the box changing under the pointer
    does not feed back into the drag.

    Only one affordance can be grabbed at a time.

    @date: 29 Oct, 2025
*/

use std::collections::HashMap;

use crate::affordance::{Affordance, AffordanceAction, AffordanceKind, ProxyClass};
use crate::bbox::{get_relative_box_transform, AxisAlignedBox};
use crate::config::ManipulatorConfig;
use crate::grab::{grab_transform, target_location, GrabEvent, GrabPointerData};
use crate::host::{ManipulatorHost, ProxyHandle};
use crate::math_utils::{minimal_rotation, rotate_about_pivot};
use crate::presets::preset_affordances;
use crate::prelude::*;

/// A pointer grabbing one of the affordances, by index into the used affordances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveGrab {
    pub affordance: usize,
    pub pointer: GrabPointerData,
}

/// What one tick of an active grab computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManipulationUpdate {
    pub affordance: usize,
    /// Modified box in the owner's local space at grab start.
    pub bounds: AxisAlignedBox,
    pub delta_rotation: Quaternion,
    /// Transform applied to the owner, None if the box could not be related to the initial one.
    pub transform: Option<Transform>,
}

#[derive(Debug)]
pub struct BoundingBoxManipulator {
    config: ManipulatorConfig,
    affordances: Vec<Affordance>,

    /// Local bounds of the owner.
    bounds: AxisAlignedBox,

    proxies: HashMap<ProxyHandle, usize>,
    active_grabs: Vec<ActiveGrab>,

    // Snapshot taken when a grab starts
    initial_bounds: AxisAlignedBox,
    initial_transform: Transform,
}

impl BoundingBoxManipulator {
    pub fn new(config: ManipulatorConfig) -> Self {
        let affordances = if config.use_custom_affordances {
            config.custom_affordances.clone()
        } else {
            preset_affordances(config.preset).to_vec()
        };

        Self {
            config,
            affordances,
            bounds: AxisAlignedBox::ZERO,
            proxies: HashMap::new(),
            active_grabs: Vec::new(),
            initial_bounds: AxisAlignedBox::ZERO,
            initial_transform: Transform::IDENTITY,
        }
    }

    pub fn config(&self) -> &ManipulatorConfig {
        &self.config
    }

    /// Affordances in use: the custom list or the preset.
    pub fn used_affordances(&self) -> &[Affordance] {
        &self.affordances
    }

    pub fn affordance_kind_class(&self, kind: AffordanceKind) -> Option<&ProxyClass> {
        self.config.affordance_classes.class_for(kind)
    }

    pub fn bounds(&self) -> &AxisAlignedBox {
        &self.bounds
    }

    pub fn is_grabbing(&self) -> bool {
        !self.active_grabs.is_empty()
    }

    pub fn active_grabs(&self) -> &[ActiveGrab] {
        &self.active_grabs
    }

    /// Index of the affordance a proxy was spawned for.
    pub fn proxy_affordance(&self, proxy: ProxyHandle) -> Option<usize> {
        self.proxies.get(&proxy).copied()
    }

    /// Proxy spawned for the affordance, None if it was skipped.
    pub fn affordance_proxy(&self, affordance: usize) -> Option<ProxyHandle> {
        self.proxies
            .iter()
            .find(|(_, index)| **index == affordance)
            .map(|(handle, _)| *handle)
    }

    pub fn begin_play(&mut self, host: &mut impl ManipulatorHost) {
        let span = tracing::span!(tracing::Level::INFO, "begin_play");
        let _enter = span.enter();

        if self.config.init_bounds_from_actor {
            self.compute_bounds_from_components(host);
        } else {
            self.bounds = AxisAlignedBox::ZERO;
        }

        for (index, affordance) in self.affordances.iter().enumerate() {
            let class = affordance
                .actor_class
                .as_ref()
                .or_else(|| self.config.affordance_classes.class_for(affordance.kind));

            let Some(class) = class else {
                warn!("No proxy class for {:?} affordance {}, skipping", affordance.kind, index);
                continue;
            };

            match host.spawn_proxy(class) {
                Some(handle) => {
                    self.proxies.insert(handle, index);
                }
                None => warn!("Host could not spawn proxy class {:?} for affordance {}", class, index),
            }
        }
        info!("Spawned {} of {} affordance proxies", self.proxies.len(), self.affordances.len());

        self.update_affordance_transforms(host);
    }

    pub fn end_play(&mut self, host: &mut impl ManipulatorHost) {
        let span = tracing::span!(tracing::Level::INFO, "end_play");
        let _enter = span.enter();

        self.active_grabs.clear();
        for (handle, _) in self.proxies.drain() {
            host.destroy_proxy(handle);
        }
        debug!("Affordance proxies destroyed");
    }

    /// Take the bounds from the owner's geometry and move the proxies there.
    pub fn compute_bounds_from_components(&mut self, host: &mut impl ManipulatorHost) {
        let bounds = host.compute_local_bounds();
        self.bounds = if bounds.is_empty() {
            debug!("Owner has no geometry, using a zero box");
            AxisAlignedBox::ZERO
        } else {
            bounds
        };
        self.update_affordance_transforms(host);
    }

    pub fn update_affordance_transforms(&self, host: &mut impl ManipulatorHost) {
        let root = host.world_transform();
        for (handle, index) in &self.proxies {
            let transform = self.affordances[*index].world_transform(&self.bounds, &root);
            host.set_proxy_transform(*handle, transform);
        }
    }

    /// Move the owner to follow the active grab. None while nothing is grabbed.
    pub fn tick(&mut self, host: &mut impl ManipulatorHost) -> Option<ManipulationUpdate> {
        let active = *self.active_grabs.first()?;
        debug_assert_eq!(self.active_grabs.len(), 1, "only one grab at a time is supported");

        let affordance = &self.affordances[active.affordance];
        let target = target_location(&*host, &active.pointer);
        let (bounds, delta_rotation) = self.compute_modified_bounds(affordance, &active.pointer, target);

        // Bounds are not changed, they inherit the transform from the owner
        let (box_transform, valid) = get_relative_box_transform(&bounds, &self.initial_bounds);
        let transform = if valid {
            let pivot = self.initial_transform.transform_point(self.initial_bounds.center());
            let new_transform = rotate_about_pivot(&(self.initial_transform * box_transform), delta_rotation, pivot);
            host.set_world_transform(new_transform);
            Some(new_transform)
        } else {
            None
        };

        self.update_affordance_transforms(host);

        Some(ManipulationUpdate {
            affordance: active.affordance,
            bounds,
            delta_rotation,
            transform,
        })
    }

    /// Box and rotation resulting from dragging `affordance` from the grab point to `target` (world space).
    pub fn compute_modified_bounds(&self, affordance: &Affordance, grab: &GrabPointerData, target: Vector3) -> (AxisAlignedBox, Quaternion) {
        let location = affordance.bounds_location;
        let constraint = affordance.constraint_matrix;

        let local_grab = grab.local_grab_transform.translation;
        let local_target = self.initial_transform.inverse_transform_point(target);

        let mut bounds = self.initial_bounds;
        let mut delta_rotation = Quaternion::IDENTITY;

        match affordance.action {
            AffordanceAction::Resize => {
                let delta = constraint * (local_target - local_grab);
                // Only move the side the affordance is on
                bounds.min += delta * (-location).max(Vector3::ZERO);
                bounds.max += delta * location.max(Vector3::ZERO);
            }
            AffordanceAction::Translate => {
                let delta = constraint * (local_target - local_grab);
                bounds.min += delta;
                bounds.max += delta;
            }
            AffordanceAction::Scale => {
                let delta = constraint * (local_target - local_grab);
                // Opposing sides move in opposite directions
                bounds.min -= delta * location;
                bounds.max += delta * location;
            }
            AffordanceAction::Rotate => {
                let center = self.initial_bounds.center();
                let constrained_grab = constraint * (local_grab - center);
                let constrained_target = constraint * (local_target - center);
                let base_rotation = minimal_rotation(constrained_grab, constrained_target);
                let init_rotation = self.initial_transform.rotation;
                delta_rotation = (init_rotation * base_rotation * init_rotation.inverse()).normalize();
            }
        }

        (bounds, delta_rotation)
    }

    /// Feed the begin/end events queued by a proxy's grab tracker.
    pub fn handle_grab_events(&mut self, host: &impl ManipulatorHost, proxy: ProxyHandle, events: impl IntoIterator<Item = GrabEvent>) {
        for event in events {
            match event {
                GrabEvent::Begin(grab) => {
                    self.on_pointer_begin_grab(host, proxy, &grab);
                }
                GrabEvent::End(grab) => {
                    self.on_pointer_end_grab(proxy, &grab);
                }
            }
        }
    }

    // Grab data is relative to the proxy, the manipulator works in owner space
    fn owner_space_grab(&self, host: &impl ManipulatorHost, proxy: ProxyHandle, index: usize, grab: &GrabPointerData) -> GrabPointerData {
        let owner = host.world_transform();
        let proxy_transform = host
            .proxy_transform(proxy)
            .unwrap_or_else(|| self.affordances[index].world_transform(&self.bounds, &owner));
        let relative = owner.to_local(&proxy_transform);
        GrabPointerData::new(grab.pointer, grab.start_time, grab_transform(&relative, grab))
    }

    fn lookup_proxy(&self, proxy: ProxyHandle) -> Option<usize> {
        let index = self.proxy_affordance(proxy);
        if index.is_none() {
            error!("Grab event from unknown proxy {:?}", proxy);
        }
        index
    }

    /// A pointer started grabbing a proxy. `grab` is relative to the proxy.
    pub fn on_pointer_begin_grab(&mut self, host: &impl ManipulatorHost, proxy: ProxyHandle, grab: &GrabPointerData) -> bool {
        let Some(index) = self.lookup_proxy(proxy) else {
            return false;
        };
        let owner_grab = self.owner_space_grab(host, proxy, index, grab);
        self.try_activate_grab_pointer(index, owner_grab, host.world_transform())
    }

    /// Grab data of a proxy changed, e.g. its local grab point was reset.
    pub fn on_pointer_update_grab(&mut self, host: &impl ManipulatorHost, proxy: ProxyHandle, grab: &GrabPointerData) -> bool {
        let Some(index) = self.lookup_proxy(proxy) else {
            return false;
        };
        let owner_grab = self.owner_space_grab(host, proxy, index, grab);
        match self.active_grabs.iter_mut().find(|g| g.affordance == index) {
            Some(active) => {
                active.pointer = owner_grab;
                true
            }
            None => {
                warn!("Update for affordance {} which is not grabbed", index);
                false
            }
        }
    }

    /// A pointer stopped grabbing a proxy. Ignored if another pointer holds the affordance.
    pub fn on_pointer_end_grab(&mut self, proxy: ProxyHandle, grab: &GrabPointerData) -> bool {
        let Some(index) = self.lookup_proxy(proxy) else {
            return false;
        };
        match self.find_grab_pointer(index) {
            Some(active) if active.pointer != grab.pointer => {
                debug!("Pointer {:?} released affordance {} held by {:?}", grab.pointer, index, active.pointer);
                false
            }
            _ => self.try_release_grab_pointer(index),
        }
    }

    /// Start manipulating with the affordance. Fails if another grab is active
    /// or the affordance does not exist.
    pub fn try_activate_grab_pointer(&mut self, affordance: usize, grab: GrabPointerData, owner_transform: Transform) -> bool {
        if !self.active_grabs.is_empty() {
            return false;
        }
        if affordance >= self.affordances.len() {
            warn!("Affordance {} does not exist ({} in use)", affordance, self.affordances.len());
            return false;
        }

        self.active_grabs.push(ActiveGrab { affordance, pointer: grab });
        self.initial_bounds = self.bounds;
        self.initial_transform = owner_transform;
        debug!("Affordance {} grabbed by {:?}", affordance, grab.pointer);
        true
    }

    /// Stop manipulating with the affordance. False if it was not grabbed.
    pub fn try_release_grab_pointer(&mut self, affordance: usize) -> bool {
        let before = self.active_grabs.len();
        self.active_grabs.retain(|g| g.affordance != affordance);
        let released = before != self.active_grabs.len();
        if released {
            debug!("Affordance {} released", affordance);
        }
        released
    }

    pub fn find_grab_pointer(&self, affordance: usize) -> Option<&GrabPointerData> {
        self.active_grabs
            .iter()
            .find(|g| g.affordance == affordance)
            .map(|g| &g.pointer)
    }
}
