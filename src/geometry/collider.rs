use std::f32::consts::PI;

use crate::collision::BodyHandle;
use crate::dynamics::RigidBody;
use crate::error::MassError;
use crate::math::consts::{CONTACT_TOLERANCE, EPSILON, SPHERE_CONTACT_SCALE};
use crate::math::{Mat3, Vec3};
use crate::mesh::HalfEdgeMesh;

use super::aabb::Aabb;

/// Tag of a collider's shape variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Sphere,
    Hull,
}

/// Mass, centroid and inertia of a collider, all in body-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassProperties {
    /// Total mass
    pub mass: f32,
    /// Center of mass in body-local coordinates
    pub centroid: Vec3,
    /// Inertia tensor about `centroid`
    pub inertia: Mat3,
}

impl MassProperties {
    pub const ZERO: Self = Self {
        mass: 0.0,
        centroid: Vec3::ZERO,
        inertia: Mat3::ZERO,
    };
}

/// A solid sphere placed at `center` in the body frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereShape {
    pub radius: f32,
    pub center: Vec3,
}

impl SphereShape {
    /// Computes mass properties given density
    pub fn mass_properties(&self, density: f32) -> Result<MassProperties, MassError> {
        check_density(density)?;
        if !(self.radius > 0.0 && self.radius.is_finite()) {
            return Err(MassError::InvalidRadius(self.radius));
        }
        let r = self.radius;
        let mass = (4.0 / 3.0) * PI * r * r * r * density;
        let i = (2.0 / 5.0) * mass * r * r;
        Ok(MassProperties {
            mass,
            centroid: self.center,
            inertia: Mat3::from_diagonal(Vec3::splat(i)),
        })
    }
}

/// A convex polyhedron given by its half-edge boundary, in the body frame.
#[derive(Debug, Clone, PartialEq)]
pub struct HullShape {
    pub mesh: HalfEdgeMesh,
}

impl HullShape {
    /// Smallest signed distance from `point` to a face plane, positive when
    /// `point` is inside every face.
    pub fn min_face_distance(&self, point: Vec3) -> f32 {
        let mesh = &self.mesh;
        mesh.face_handles()
            .map(|f| (mesh.face_point(f) - point).dot(mesh.face(f).normal))
            .fold(f32::INFINITY, f32::min)
    }

    /// Integrates volume, first and second moments over the faces.
    ///
    /// Each face is fanned from its first vertex and every triangle forms a
    /// signed tetrahedron with the first mesh vertex as apex. The covariance
    /// is shifted to the centroid before conversion to an inertia tensor.
    pub fn mass_properties(&self, density: f32) -> Result<MassProperties, MassError> {
        check_density(density)?;
        let mesh = &self.mesh;
        let reference = mesh
            .vertices()
            .first()
            .map(|v| v.position)
            .ok_or(MassError::NonPositiveVolume(0.0))?;

        let mut volume = 0.0;
        let mut moment = Vec3::ZERO;
        let mut covariance = Mat3::ZERO;

        for face in mesh.face_handles() {
            let polygon = mesh.face_polygon(face);
            let Some((&first, rest)) = polygon.split_first() else {
                continue;
            };
            let a = first - reference;
            for pair in rest.windows(2) {
                let b = pair[0] - reference;
                let c = pair[1] - reference;

                let det = a.dot(b.cross(c));
                let tet_volume = det / 6.0;
                let sum = a + b + c;

                volume += tet_volume;
                moment += sum * (tet_volume / 4.0);
                covariance += (Mat3::outer_product(sum, sum)
                    + Mat3::outer_product(a, a)
                    + Mat3::outer_product(b, b)
                    + Mat3::outer_product(c, c))
                    * (det / 120.0);
            }
        }

        if volume <= EPSILON {
            return Err(MassError::NonPositiveVolume(volume));
        }

        let mass = density * volume;
        let offset = moment / volume;
        let centered = covariance * density - Mat3::outer_product(offset, offset) * mass;
        let inertia = Mat3::IDENTITY * centered.trace() - centered;

        Ok(MassProperties {
            mass,
            centroid: reference + offset,
            inertia,
        })
    }
}

fn check_density(density: f32) -> Result<(), MassError> {
    if density > 0.0 && density.is_finite() {
        Ok(())
    } else {
        Err(MassError::InvalidDensity(density))
    }
}

/// Geometry of a collider.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Sphere(SphereShape),
    Hull(HullShape),
}

impl Shape {
    #[inline]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Sphere(_) => ShapeKind::Sphere,
            Shape::Hull(_) => ShapeKind::Hull,
        }
    }

    pub fn mass_properties(&self, density: f32) -> Result<MassProperties, MassError> {
        match self {
            Shape::Sphere(s) => s.mass_properties(density),
            Shape::Hull(h) => h.mass_properties(density),
        }
    }
}

/// A shape attached to a rigid body, with its mass properties cached at
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    shape: Shape,
    mass_properties: MassProperties,
    density: f32,
    body: BodyHandle,
}

impl Collider {
    /// Sphere at the body origin.
    pub fn sphere(radius: f32, density: f32) -> Result<Self, MassError> {
        Self::sphere_at(Vec3::ZERO, radius, density)
    }

    /// Sphere centered at `center` in the body frame.
    pub fn sphere_at(center: Vec3, radius: f32, density: f32) -> Result<Self, MassError> {
        Self::new(Shape::Sphere(SphereShape { radius, center }), density)
    }

    /// Convex hull collider; the mesh is in body-local coordinates.
    pub fn hull(mesh: HalfEdgeMesh, density: f32) -> Result<Self, MassError> {
        Self::new(Shape::Hull(HullShape { mesh }), density)
    }

    pub fn new(shape: Shape, density: f32) -> Result<Self, MassError> {
        let mass_properties = shape.mass_properties(density)?;
        Ok(Self {
            shape,
            mass_properties,
            density,
            body: BodyHandle::INVALID,
        })
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    #[inline]
    pub fn mass_properties(&self) -> &MassProperties {
        &self.mass_properties
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass_properties.mass
    }

    #[inline]
    pub fn centroid(&self) -> Vec3 {
        self.mass_properties.centroid
    }

    #[inline]
    pub fn inertia(&self) -> Mat3 {
        self.mass_properties.inertia
    }

    #[inline]
    pub fn density(&self) -> f32 {
        self.density
    }

    /// Owning body, or [`BodyHandle::INVALID`] before attachment
    #[inline]
    pub fn body(&self) -> BodyHandle {
        self.body
    }

    #[inline]
    pub(crate) fn set_body(&mut self, body: BodyHandle) {
        self.body = body;
    }

    #[inline]
    pub fn as_sphere(&self) -> Option<&SphereShape> {
        match &self.shape {
            Shape::Sphere(s) => Some(s),
            Shape::Hull(_) => None,
        }
    }

    #[inline]
    pub fn as_hull(&self) -> Option<&HullShape> {
        match &self.shape {
            Shape::Hull(h) => Some(h),
            Shape::Sphere(_) => None,
        }
    }

    /// Bounds in the body frame
    pub fn local_aabb(&self) -> Aabb {
        match &self.shape {
            Shape::Sphere(s) => Aabb::from_center_radius(s.center, s.radius),
            Shape::Hull(h) => Aabb::from_points(h.mesh.vertices().iter().map(|v| v.position)),
        }
    }

    /// World-space bounds under the body's current transform
    pub fn world_aabb(&self, body: &RigidBody) -> Aabb {
        match &self.shape {
            Shape::Sphere(s) => {
                Aabb::from_center_radius(body.local_to_global_point(s.center), s.radius)
            }
            Shape::Hull(h) => Aabb::from_points(
                h.mesh
                    .vertices()
                    .iter()
                    .map(|v| body.local_to_global_point(v.position)),
            ),
        }
    }

    /// World-space bounds of every point a particle contact can be reported
    /// at.
    ///
    /// For hulls this is the hull scaled about its centroid by `1 + t / r`,
    /// where `t` is the contact range and `r` the centroid's smallest face
    /// distance: every offset face plane lies inside the scaled hull.
    pub fn contact_aabb(&self, body: &RigidBody) -> Aabb {
        match &self.shape {
            Shape::Sphere(s) => Aabb::from_center_radius(
                body.local_to_global_point(s.center),
                s.radius * SPHERE_CONTACT_SCALE,
            ),
            Shape::Hull(h) => {
                let inner = h.min_face_distance(self.centroid());
                if inner <= EPSILON {
                    return Aabb::INFINITE;
                }
                let factor = 1.0 - CONTACT_TOLERANCE / inner;
                let origin = body.local_to_global_point(self.centroid());
                self.world_aabb(body).scale_about(origin, factor)
            }
        }
    }
}
