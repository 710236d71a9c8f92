use crate::math::Vec3;

/// A handle to a body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyHandle(pub u32);

impl BodyHandle {
    /// Invalid/null body handle
    pub const INVALID: Self = Self(u32::MAX);

    /// Creates a new body handle
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the index of this handle
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns true if this handle is valid
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }
}

impl Default for BodyHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

/// Names one collider: its body and its index among the body's colliders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColliderHandle {
    /// Owning body
    pub body: BodyHandle,
    /// Position in the body's collider list
    pub index: u32,
}

impl ColliderHandle {
    pub fn new(body: BodyHandle, index: usize) -> Self {
        Self {
            body,
            index: index as u32,
        }
    }
}

/// Caller-chosen identifier of a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleHandle(pub u32);

/// A point mass probed against colliders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Identifier echoed back in contacts
    pub handle: ParticleHandle,
    /// World-space position
    pub position: Vec3,
}

impl Particle {
    pub fn new(handle: u32, position: Vec3) -> Self {
        Self {
            handle: ParticleHandle(handle),
            position,
        }
    }
}

/// Contact between a particle and a collider surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleContact {
    pub particle: ParticleHandle,
    /// World-space surface normal pointing out of the collider
    pub normal: Vec3,
    /// Penetration depth along `normal` (positive when inside)
    pub depth: f32,
}
