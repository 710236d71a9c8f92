use std::ops::{Add, AddAssign, Mul, Sub};

use super::quat::Quat;
use super::vec3::Vec3;

/// A 3x3 matrix stored in column-major order.
///
/// Used for body rotation matrices and inertia tensors.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Mat3 {
    /// Columns of the matrix
    pub cols: [Vec3; 3],
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat3 {
    pub const ZERO: Self = Self {
        cols: [Vec3::ZERO, Vec3::ZERO, Vec3::ZERO],
    };

    pub const IDENTITY: Self = Self {
        cols: [Vec3::X, Vec3::Y, Vec3::Z],
    };

    #[inline]
    pub const fn from_cols(c0: Vec3, c1: Vec3, c2: Vec3) -> Self {
        Self { cols: [c0, c1, c2] }
    }

    #[inline]
    pub fn from_diagonal(diag: Vec3) -> Self {
        Self::from_cols(
            Vec3::new(diag.x, 0.0, 0.0),
            Vec3::new(0.0, diag.y, 0.0),
            Vec3::new(0.0, 0.0, diag.z),
        )
    }

    /// Rotation matrix of a unit quaternion, so that `R * v == q.rotate_vec(v)`.
    #[inline]
    pub fn from_quat(q: Quat) -> Self {
        let x2 = q.x + q.x;
        let y2 = q.y + q.y;
        let z2 = q.z + q.z;

        let xx = q.x * x2;
        let xy = q.x * y2;
        let xz = q.x * z2;
        let yy = q.y * y2;
        let yz = q.y * z2;
        let zz = q.z * z2;
        let wx = q.w * x2;
        let wy = q.w * y2;
        let wz = q.w * z2;

        Self::from_cols(
            Vec3::new(1.0 - (yy + zz), xy + wz, xz - wy),
            Vec3::new(xy - wz, 1.0 - (xx + zz), yz + wx),
            Vec3::new(xz + wy, yz - wx, 1.0 - (xx + yy)),
        )
    }

    /// `v * wᵀ`
    #[inline]
    pub fn outer_product(v: Vec3, w: Vec3) -> Self {
        Self::from_cols(v * w.x, v * w.y, v * w.z)
    }

    #[inline]
    pub fn transpose(self) -> Self {
        Self::from_cols(self.row(0), self.row(1), self.row(2))
    }

    #[inline]
    pub fn determinant(self) -> f32 {
        self.cols[0].dot(self.cols[1].cross(self.cols[2]))
    }

    /// Inverse via the adjugate, `None` when the determinant vanishes.
    #[inline]
    pub fn try_inverse(self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < 1e-12 {
            return None;
        }

        let inv_det = 1.0 / det;
        let r0 = self.cols[1].cross(self.cols[2]) * inv_det;
        let r1 = self.cols[2].cross(self.cols[0]) * inv_det;
        let r2 = self.cols[0].cross(self.cols[1]) * inv_det;

        Some(Self::from_cols(
            Vec3::new(r0.x, r1.x, r2.x),
            Vec3::new(r0.y, r1.y, r2.y),
            Vec3::new(r0.z, r1.z, r2.z),
        ))
    }

    #[inline]
    pub fn col(self, index: usize) -> Vec3 {
        self.cols[index]
    }

    #[inline]
    pub fn row(self, index: usize) -> Vec3 {
        Vec3::new(self.cols[0][index], self.cols[1][index], self.cols[2][index])
    }

    #[inline]
    pub fn diagonal(self) -> Vec3 {
        Vec3::new(self.cols[0].x, self.cols[1].y, self.cols[2].z)
    }

    #[inline]
    pub fn trace(self) -> f32 {
        self.cols[0].x + self.cols[1].y + self.cols[2].z
    }

    #[inline]
    pub fn scale(self, s: f32) -> Self {
        Self::from_cols(self.cols[0] * s, self.cols[1] * s, self.cols[2] * s)
    }

    /// Largest element-wise difference below `epsilon`.
    #[inline]
    pub fn approx_eq(self, other: Self, epsilon: f32) -> bool {
        (0..3).all(|i| self.cols[i].abs_diff_eq(other.cols[i], epsilon))
    }
}

impl Add for Mat3 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self::from_cols(
            self.cols[0] + other.cols[0],
            self.cols[1] + other.cols[1],
            self.cols[2] + other.cols[2],
        )
    }
}

impl AddAssign for Mat3 {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Mat3 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::from_cols(
            self.cols[0] - other.cols[0],
            self.cols[1] - other.cols[1],
            self.cols[2] - other.cols[2],
        )
    }
}

impl Mul for Mat3 {
    type Output = Self;

    #[inline]
    fn mul(self, other: Self) -> Self {
        Self::from_cols(self * other.cols[0], self * other.cols[1], self * other.cols[2])
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;

    #[inline]
    fn mul(self, v: Vec3) -> Vec3 {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z
    }
}

impl Mul<f32> for Mat3 {
    type Output = Self;

    #[inline]
    fn mul(self, s: f32) -> Self {
        self.scale(s)
    }
}

impl Mul<Mat3> for f32 {
    type Output = Mat3;

    #[inline]
    fn mul(self, m: Mat3) -> Mat3 {
        m.scale(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_transpose() {
        let m = Mat3::from_cols(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(7.0, 8.0, 9.0),
        );
        let mt = m.transpose();
        assert_eq!(mt.col(0), Vec3::new(1.0, 4.0, 7.0));
        assert_eq!(mt.col(2), Vec3::new(3.0, 6.0, 9.0));
    }

    #[test]
    fn test_inverse() {
        let m = Mat3::from_cols(
            Vec3::new(2.0, 1.0, 0.0),
            Vec3::new(0.0, 3.0, 1.0),
            Vec3::new(1.0, 0.0, 4.0),
        );
        let inv = m.try_inverse().unwrap();
        assert!((m * inv).approx_eq(Mat3::IDENTITY, EPSILON));
        assert!(Mat3::ZERO.try_inverse().is_none());
    }

    #[test]
    fn test_from_quat_matches_rotate_vec() {
        let q = Quat::from_axis_angle(Vec3::new(1.0, 2.0, 0.5).normalize(), 0.7);
        let v = Vec3::new(0.3, -1.0, 2.0);
        assert!((Mat3::from_quat(q) * v).abs_diff_eq(q.rotate_vec(v), EPSILON));

        let quarter = Mat3::from_quat(Quat::from_axis_angle(Vec3::Z, PI / 2.0));
        assert!((quarter * Vec3::X).abs_diff_eq(Vec3::Y, EPSILON));
    }

    #[test]
    fn test_outer_product() {
        let m = Mat3::outer_product(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(m.row(1), Vec3::new(8.0, 10.0, 12.0));
        assert_eq!(m.trace(), 4.0 + 10.0 + 18.0);
    }
}
