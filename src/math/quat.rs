use std::ops::{Add, AddAssign, Mul};

use super::vec3::Vec3;

/// A quaternion `(x, y, z, w)` with `w` the scalar part.
///
/// Body orientations are unit quaternions; integration adds a non-unit
/// derivative and renormalizes afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    /// Identity quaternion (no rotation)
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Pure quaternion `(v, 0)`, used to lift an angular velocity.
    #[inline]
    pub const fn pure(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z, 0.0)
    }

    /// Rotation of `angle` radians about `axis`.
    #[inline]
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let (s, c) = (angle * 0.5).sin_cos();
        let axis = axis.normalize();
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }

    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Unit quaternion, or identity if the input has (near) zero length.
    #[inline]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len > 1e-10 {
            self * (1.0 / len)
        } else {
            Self::IDENTITY
        }
    }

    /// Conjugate; the inverse rotation for unit quaternions.
    #[inline]
    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Rotates a vector by this (unit) quaternion.
    #[inline]
    pub fn rotate_vec(self, v: Vec3) -> Vec3 {
        let qv = Vec3::new(self.x, self.y, self.z);
        let uv = qv.cross(v);
        let uuv = qv.cross(uv);
        v + (uv * self.w + uuv) * 2.0
    }

    /// Time derivative of this orientation under world-space angular
    /// velocity `omega`: `0.5 * (omega, 0) * q`.
    #[inline]
    pub fn derivative(self, omega: Vec3) -> Self {
        (Self::pure(omega) * self) * 0.5
    }
}

impl Mul for Quat {
    type Output = Self;

    /// Hamilton product; `a * b` applies `b` first.
    #[inline]
    fn mul(self, other: Self) -> Self {
        Self::new(
            self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
            self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
        )
    }
}

impl Mul<f32> for Quat {
    type Output = Self;

    #[inline]
    fn mul(self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s, self.w * s)
    }
}

impl Add for Quat {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(
            self.x + other.x,
            self.y + other.y,
            self.z + other.z,
            self.w + other.w,
        )
    }
}

impl AddAssign for Quat {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_axis_angle() {
        let q = Quat::from_axis_angle(Vec3::Z, PI / 2.0);
        assert!(q.rotate_vec(Vec3::X).abs_diff_eq(Vec3::Y, EPSILON));
    }

    #[test]
    fn test_conjugate_undoes_rotation() {
        let q = Quat::from_axis_angle(Vec3::ONE, PI / 3.0);
        let v = Vec3::new(1.0, 2.0, 3.0);
        let back = q.conjugate().rotate_vec(q.rotate_vec(v));
        assert!(back.abs_diff_eq(v, EPSILON));
    }

    #[test]
    fn test_composition_order() {
        let a = Quat::from_axis_angle(Vec3::Z, PI / 2.0);
        let b = Quat::from_axis_angle(Vec3::X, PI / 2.0);
        let v = Vec3::Y;
        let composed = (a * b).rotate_vec(v);
        assert!(composed.abs_diff_eq(a.rotate_vec(b.rotate_vec(v)), EPSILON));
    }

    #[test]
    fn test_derivative_small_step() {
        let q = Quat::IDENTITY;
        let omega = Vec3::new(0.0, 0.0, 1.0);
        let dt = 1e-3;
        let stepped = (q + q.derivative(omega) * dt).normalize();
        let exact = Quat::from_axis_angle(Vec3::Z, dt);
        assert_relative_eq!(stepped.dot(exact), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_normalize() {
        assert_relative_eq!(Quat::new(1.0, 2.0, 3.0, 4.0).normalize().length(), 1.0);
        assert_eq!(Quat::new(0.0, 0.0, 0.0, 0.0).normalize(), Quat::IDENTITY);
    }
}
