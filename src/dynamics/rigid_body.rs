use tracing::debug;

use crate::collision::BodyHandle;
use crate::config::{StepContext, DEFAULT_SLEEP_EPSILON};
use crate::error::MassError;
use crate::geometry::Collider;
use crate::math::{Mat3, Quat, Vec3};

use super::integrator;

/// Multiple of the sleep threshold a body's motion is seeded with on waking.
const WAKE_FACTOR: f32 = 5.0;

/// A rigid body made of one or more colliders.
///
/// `centroid` is the world-space center of mass; `position` is the origin of
/// the body frame that collider geometry is expressed in. The two differ by
/// `rotation * local_centroid`.
#[derive(Debug, Clone)]
pub struct RigidBody {
    /// Body handle for identification
    pub handle: BodyHandle,

    // Transform
    /// Origin of the body frame in world space
    pub position: Vec3,
    /// Orientation as a unit quaternion
    pub orientation: Quat,
    /// Rotation matrix derived from `orientation`
    pub rotation: Mat3,
    /// Center of mass in world space
    pub centroid: Vec3,
    /// Center of mass in the body frame
    pub local_centroid: Vec3,

    // Velocities
    /// Linear velocity of the centroid
    pub velocity: Vec3,
    /// Angular velocity in world space (radians per second)
    pub angular_velocity: Vec3,

    // Forces
    /// Accumulated force (reset each step)
    pub force: Vec3,
    /// Accumulated torque about the centroid (reset each step)
    pub torque: Vec3,

    // Mass properties
    /// Inverse mass (0 for static bodies)
    pub inv_mass: f32,
    /// Inertia tensor about the centroid, body frame
    pub local_inertia: Mat3,
    /// Inverse of `local_inertia`
    pub local_inv_inertia: Mat3,
    /// World space inverse inertia tensor (updated each step)
    pub inv_inertia: Mat3,

    // Material
    /// Density given to colliders built for this body
    pub density: f32,
    /// Coefficient of restitution (bounciness)
    pub restitution: f32,
    /// Coefficient of friction
    pub friction: f32,

    // Sleep
    /// Running average of squared speed
    pub motion: f32,
    /// Whether the body is integrated by `update`
    pub is_awake: bool,
    /// Whether `update_sleep` may put the body to sleep
    pub can_sleep: bool,

    // Render tags, carried for collaborators
    /// RGB display color
    pub color: [f32; 3],
    /// Display group id
    pub group: i32,

    colliders: Vec<Collider>,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            handle: BodyHandle::INVALID,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            rotation: Mat3::IDENTITY,
            centroid: Vec3::ZERO,
            local_centroid: Vec3::ZERO,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
            inv_mass: 1.0,
            local_inertia: Mat3::IDENTITY,
            local_inv_inertia: Mat3::IDENTITY,
            inv_inertia: Mat3::IDENTITY,
            density: 1.0,
            restitution: 0.3,
            friction: 0.4,
            motion: WAKE_FACTOR * DEFAULT_SLEEP_EPSILON,
            is_awake: true,
            can_sleep: true,
            color: [0.4, 0.9, 0.1],
            group: 0,
            colliders: Vec::new(),
        }
    }
}

impl RigidBody {
    /// Creates a dynamic body with unit mass at the origin
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a body from a description
    pub fn from_desc(handle: BodyHandle, desc: &RigidBodyDesc) -> Self {
        let mut body = Self {
            handle,
            velocity: desc.velocity,
            angular_velocity: desc.angular_velocity,
            density: desc.density,
            restitution: desc.restitution,
            friction: desc.friction,
            can_sleep: desc.can_sleep,
            color: desc.color,
            group: desc.group,
            ..Self::default()
        };
        if desc.is_static {
            body.make_static();
        }
        body.set_transform(desc.position, desc.orientation);
        body
    }

    /// Places the body frame at `position` with `orientation` and rederives
    /// the rotation, world centroid and world inertia.
    pub fn set_transform(&mut self, position: Vec3, orientation: Quat) {
        self.position = position;
        self.orientation = orientation.normalize();
        self.rotation = Mat3::from_quat(self.orientation);
        self.centroid = self.position + self.rotation * self.local_centroid;
        self.refresh_inertia();
    }

    /// Recomputes the world inverse inertia from the current rotation.
    pub fn refresh_inertia(&mut self) {
        if self.is_static() {
            self.inv_inertia = Mat3::ZERO;
            return;
        }
        let r = self.rotation;
        self.inv_inertia = r.transpose() * self.local_inv_inertia * r;
    }

    #[inline]
    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    #[inline]
    pub fn collider(&self, index: usize) -> Option<&Collider> {
        self.colliders.get(index)
    }

    /// Attaches a collider and returns its index on this body.
    ///
    /// Dynamic bodies recompute mass, centroid and inertia over every
    /// attached collider. On error the collider is not kept and the body is
    /// unchanged.
    pub fn add_collider(&mut self, mut collider: Collider) -> Result<usize, MassError> {
        collider.set_body(self.handle);
        self.colliders.push(collider);
        let index = self.colliders.len() - 1;

        if !self.is_static() {
            if let Err(err) = self.recompute_mass() {
                self.colliders.pop();
                return Err(err);
            }
        }
        Ok(index)
    }

    /// Detaches a collider, recomputing mass over the rest.
    ///
    /// A dynamic body left without colliders goes back to unit mass and
    /// identity inertia.
    pub fn remove_collider(&mut self, index: usize) -> Option<Collider> {
        if index >= self.colliders.len() {
            return None;
        }
        let mut collider = self.colliders.remove(index);
        collider.set_body(BodyHandle::INVALID);

        if !self.is_static() && self.recompute_mass().is_err() {
            self.reset_mass();
        }
        Some(collider)
    }

    fn reset_mass(&mut self) {
        self.inv_mass = 1.0;
        self.local_centroid = Vec3::ZERO;
        self.local_inertia = Mat3::IDENTITY;
        self.local_inv_inertia = Mat3::IDENTITY;
        self.centroid = self.position;
        self.refresh_inertia();
    }

    fn recompute_mass(&mut self) -> Result<(), MassError> {
        let mass: f32 = self.colliders.iter().map(Collider::mass).sum();
        if mass <= 0.0 {
            return Err(MassError::ZeroMass);
        }

        let local_centroid = self
            .colliders
            .iter()
            .fold(Vec3::ZERO, |acc, c| acc + c.centroid() * c.mass())
            / mass;

        let local_inertia = self.colliders.iter().fold(Mat3::ZERO, |acc, c| {
            let r = c.centroid() - local_centroid;
            let shift = (Mat3::IDENTITY * r.dot(r) - Mat3::outer_product(r, r)) * c.mass();
            acc + c.inertia() + shift
        });

        self.inv_mass = 1.0 / mass;
        self.local_centroid = local_centroid;
        self.local_inertia = local_inertia;
        self.local_inv_inertia = local_inertia.try_inverse().unwrap_or(Mat3::ZERO);
        self.centroid = self.position + self.rotation * local_centroid;
        self.refresh_inertia();

        debug!(
            handle = ?self.handle,
            colliders = self.colliders.len(),
            mass,
            "aggregated body mass"
        );
        Ok(())
    }

    /// Pins the body in place: zero inverse mass and inverse inertia.
    pub fn make_static(&mut self) {
        self.inv_mass = 0.0;
        self.local_inv_inertia = Mat3::ZERO;
        self.inv_inertia = Mat3::ZERO;
        self.velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
    }

    /// Returns true for bodies with infinite mass
    #[inline]
    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    /// Returns the mass (inverse of inv_mass, or infinity for static)
    #[inline]
    pub fn mass(&self) -> f32 {
        if self.inv_mass > 0.0 {
            1.0 / self.inv_mass
        } else {
            f32::INFINITY
        }
    }

    #[inline]
    pub fn local_to_global_vec(&self, v: Vec3) -> Vec3 {
        self.rotation * v
    }

    #[inline]
    pub fn global_to_local_vec(&self, v: Vec3) -> Vec3 {
        self.rotation.transpose() * v
    }

    #[inline]
    pub fn local_to_global_point(&self, p: Vec3) -> Vec3 {
        self.position + self.rotation * p
    }

    #[inline]
    pub fn global_to_local_point(&self, p: Vec3) -> Vec3 {
        self.rotation.transpose() * (p - self.position)
    }

    /// Expresses a vector given in `other`'s frame in this body's frame.
    #[inline]
    pub fn local_to_local_vec(&self, other: &RigidBody, v: Vec3) -> Vec3 {
        self.global_to_local_vec(other.local_to_global_vec(v))
    }

    /// Expresses a point given in `other`'s frame in this body's frame.
    #[inline]
    pub fn local_to_local_point(&self, other: &RigidBody, p: Vec3) -> Vec3 {
        self.global_to_local_point(other.local_to_global_point(p))
    }

    /// Adds a force through the centroid
    #[inline]
    pub fn apply_force(&mut self, force: Vec3) {
        self.force += force;
    }

    /// Adds a force applied at a body-local point; the torque is taken about
    /// the world centroid.
    pub fn apply_force_at(&mut self, force: Vec3, local_point: Vec3) {
        let arm = self.local_to_global_point(local_point) - self.centroid;
        self.force += force;
        self.torque += arm.cross(force);
    }

    #[inline]
    pub fn apply_torque(&mut self, torque: Vec3) {
        self.torque += torque;
    }

    /// Clears accumulated forces
    #[inline]
    pub fn clear_forces(&mut self) {
        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;
    }

    /// Wakes up the body
    ///
    /// The motion average restarts well above `sleep_epsilon` so the body
    /// stays awake for a few steps.
    pub fn wake_up(&mut self, sleep_epsilon: f32) {
        self.is_awake = true;
        self.motion = WAKE_FACTOR * sleep_epsilon;
    }

    /// Puts the body to sleep and zeroes its velocities
    pub fn sleep(&mut self) {
        self.is_awake = false;
        self.velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
    }

    /// Applies gravity and accumulated forces, then integrates one step.
    pub fn update(&mut self, ctx: &StepContext) {
        integrator::update(self, ctx);
    }

    /// Advances centroid and orientation only.
    pub fn integrate_position(&mut self, dt: f32) {
        integrator::integrate_position(self, dt);
    }

    /// Updates the motion average and puts a resting body to sleep.
    pub fn update_sleep(&mut self, ctx: &StepContext) {
        integrator::update_sleep(self, ctx);
    }
}

/// Description for creating a rigid body
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RigidBodyDesc {
    pub is_static: bool,
    pub position: Vec3,
    pub orientation: Quat,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    /// Density used by colliders built for this body
    pub density: f32,
    pub restitution: f32,
    pub friction: f32,
    pub can_sleep: bool,
    pub color: [f32; 3],
    pub group: i32,
}

impl Default for RigidBodyDesc {
    fn default() -> Self {
        Self {
            is_static: false,
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            density: 1.0,
            restitution: 0.3,
            friction: 0.4,
            can_sleep: true,
            color: [0.4, 0.9, 0.1],
            group: 0,
        }
    }
}

impl RigidBodyDesc {
    /// Creates a new dynamic body description
    pub fn dynamic() -> Self {
        Self::default()
    }

    /// Creates a new static body description
    pub fn fixed() -> Self {
        Self {
            is_static: true,
            ..Self::default()
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: Vec3) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }

    pub fn with_group(mut self, group: i32) -> Self {
        self.group = group;
        self
    }
}
