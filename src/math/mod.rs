mod mat3;
mod quat;
mod vec3;

pub use mat3::Mat3;
pub use quat::Quat;
pub use vec3::Vec3;

/// Tolerances shared by the geometric predicates.
pub mod consts {
    /// Generic comparison epsilon.
    pub const EPSILON: f32 = 1e-6;

    /// A point is outside a hull face when its signed distance drops below this.
    pub const CONTAINMENT_TOLERANCE: f32 = -1e-4;

    /// A particle is in contact range of a hull face down to this signed distance.
    pub const CONTACT_TOLERANCE: f32 = -0.07;

    /// Sphere contact range as a factor on the radius.
    pub const SPHERE_CONTACT_SCALE: f32 = 1.1;
}
