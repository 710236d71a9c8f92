use std::path::Path;

use tracing::{debug, info};

use crate::collision::{
    intersect_segment_sphere, query_particle, query_point, BodyHandle, ColliderHandle, Particle,
    ParticleContact,
};
use crate::config::SimConfig;
use crate::dynamics::{RigidBody, RigidBodyDesc};
use crate::error::{Error, Result};
use crate::geometry::{Aabb, Collider};
use crate::math::Vec3;
use crate::mesh::obj::parse_obj_objects;
use crate::mesh::HalfEdgeMesh;

/// The body collection of a simulation.
///
/// Bodies live in a slot vector; removed slots are recycled by later
/// [`World::create_body`] calls, so a handle is only valid until its body is
/// removed.
pub struct World {
    config: SimConfig,
    /// All rigid bodies, including dead slots
    bodies: Vec<RigidBody>,
    /// Free body indices for reuse
    free_bodies: Vec<usize>,
    paused: bool,
}

impl Default for World {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl World {
    /// Creates an empty world with the given configuration
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            bodies: Vec::new(),
            free_bodies: Vec::new(),
            paused: false,
        }
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SimConfig) {
        self.config = config;
    }

    /// Pausing keeps bodies integrating under reduced gravity.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Creates a new rigid body and returns its handle
    pub fn create_body(&mut self, desc: RigidBodyDesc) -> BodyHandle {
        let index = self.free_bodies.pop().unwrap_or(self.bodies.len());
        let handle = BodyHandle::new(index as u32);
        let mut body = RigidBody::from_desc(handle, &desc);
        body.wake_up(self.config.sleep_epsilon);

        if index == self.bodies.len() {
            self.bodies.push(body);
        } else {
            self.bodies[index] = body;
        }
        debug!(?handle, is_static = desc.is_static, "created body");
        handle
    }

    /// Removes a body and returns it with its colliders
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<RigidBody> {
        if self.body(handle).is_none() {
            return Err(Error::InvalidBody(handle));
        }
        let body = std::mem::take(&mut self.bodies[handle.index()]);
        self.free_bodies.push(handle.index());
        debug!(?handle, "removed body");
        Ok(body)
    }

    /// Gets a reference to a live body
    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies
            .get(handle.index())
            .filter(|b| b.handle == handle && handle.is_valid())
    }

    /// Gets a mutable reference to a live body
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies
            .get_mut(handle.index())
            .filter(|b| b.handle == handle && handle.is_valid())
    }

    /// Wakes a body with the motion seed of the configured sleep threshold
    pub fn wake_up(&mut self, handle: BodyHandle) -> Result<()> {
        let sleep_epsilon = self.config.sleep_epsilon;
        let body = self.body_mut(handle).ok_or(Error::InvalidBody(handle))?;
        body.wake_up(sleep_epsilon);
        Ok(())
    }

    /// Attaches a collider to a body and refreshes the body's mass
    pub fn attach_collider(
        &mut self,
        handle: BodyHandle,
        collider: Collider,
    ) -> Result<ColliderHandle> {
        let body = self.body_mut(handle).ok_or(Error::InvalidBody(handle))?;
        let index = body.add_collider(collider)?;
        Ok(ColliderHandle::new(handle, index))
    }

    pub fn collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.body(handle.body)?.collider(handle.index as usize)
    }

    /// Creates a body carrying one hull collider built from `mesh`, scaled
    /// uniformly by `scale`, at the description's density.
    pub fn spawn_hull(
        &mut self,
        mesh: HalfEdgeMesh,
        desc: RigidBodyDesc,
        scale: f32,
    ) -> Result<BodyHandle> {
        let mesh = if scale == 1.0 { mesh } else { mesh.scaled(scale) };
        let collider = Collider::hull(mesh, desc.density)?;

        let handle = self.create_body(desc);
        if let Err(err) = self.attach_collider(handle, collider) {
            self.remove_body(handle)?;
            return Err(err);
        }
        if let Some(body) = self.body(handle) {
            info!(?handle, mass = body.mass(), position = ?body.position, "spawned hull");
        }
        Ok(handle)
    }

    /// Loads an OBJ file and spawns one hull body per object, merging
    /// coplanar faces at the configured tolerance.
    pub fn spawn_obj<P: AsRef<Path>>(
        &mut self,
        path: P,
        desc: RigidBodyDesc,
        scale: f32,
    ) -> Result<Vec<BodyHandle>> {
        let meshes = parse_obj_objects(path, Some(self.config.merge_tolerance))?;
        let mut handles = Vec::with_capacity(meshes.len());
        for mesh in meshes {
            match self.spawn_hull(mesh, desc.clone(), scale) {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    for handle in handles {
                        self.remove_body(handle)?;
                    }
                    return Err(err);
                }
            }
        }
        Ok(handles)
    }

    /// Advances every live body by `dt`.
    pub fn step(&mut self, dt: f32) {
        let ctx = self.config.step_context(dt, self.paused);
        for body in self.bodies.iter_mut().filter(|b| b.handle.is_valid()) {
            body.update(&ctx);
            if self.config.allow_sleep {
                body.update_sleep(&ctx);
            }
        }
    }

    /// Returns the number of bodies in the world
    pub fn num_bodies(&self) -> usize {
        self.bodies.len() - self.free_bodies.len()
    }

    /// Returns an iterator over all body handles
    pub fn bodies(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.live_bodies().map(|b| b.handle)
    }

    fn live_bodies(&self) -> impl Iterator<Item = &RigidBody> + '_ {
        self.bodies.iter().filter(|b| b.handle.is_valid())
    }

    fn colliders(&self) -> impl Iterator<Item = (ColliderHandle, &RigidBody, &Collider)> + '_ {
        self.live_bodies().flat_map(|body| {
            body.colliders()
                .iter()
                .enumerate()
                .map(move |(i, c)| (ColliderHandle::new(body.handle, i), body, c))
        })
    }

    /// Contacts of every particle against every collider it may touch.
    pub fn query_particles(&self, particles: &[Particle]) -> Vec<ParticleContact> {
        let mut contacts = Vec::new();
        for (_, body, collider) in self.colliders() {
            let bounds = collider.contact_aabb(body);
            for particle in particles {
                if !bounds.contains_point(particle.position) {
                    continue;
                }
                contacts.extend(query_particle(body, collider, particle));
            }
        }
        contacts
    }

    /// First collider containing `point`
    pub fn pick_point(&self, point: Vec3) -> Option<ColliderHandle> {
        self.colliders()
            .find(|(_, body, collider)| query_point(body, collider, point))
            .map(|(handle, _, _)| handle)
    }

    /// Nearest sphere collider hit by the segment `a -> b`, with the entry point.
    pub fn pick_segment(&self, a: Vec3, b: Vec3) -> Option<(ColliderHandle, Vec3)> {
        self.colliders()
            .filter_map(|(handle, body, collider)| {
                intersect_segment_sphere(a, b, body, collider).map(|hit| (handle, hit))
            })
            .min_by(|(_, p), (_, q)| a.distance_squared(*p).total_cmp(&a.distance_squared(*q)))
    }

    /// Collider pairs on distinct bodies whose world bounds overlap.
    pub fn overlapping_pairs(&self) -> Vec<(ColliderHandle, ColliderHandle)> {
        let boxes: Vec<(ColliderHandle, Aabb)> = self
            .colliders()
            .map(|(handle, body, collider)| (handle, collider.world_aabb(body)))
            .collect();

        let mut pairs = Vec::new();
        for (i, (ha, a)) in boxes.iter().enumerate() {
            for (hb, b) in &boxes[i + 1..] {
                if ha.body != hb.body && a.overlaps(*b) {
                    pairs.push((*ha, *hb));
                }
            }
        }
        pairs
    }
}
