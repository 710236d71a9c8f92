//! Narrow-phase predicates on a body and one of its colliders.
//!
//! Every function here is pure: it reads the body's current transform and
//! the collider's local geometry and never mutates either. Degenerate input
//! (zero-length segments, polygons with fewer than three vertices) yields
//! `false` or `None`.

use crate::dynamics::RigidBody;
use crate::geometry::{Aabb, Collider, Shape};
use crate::math::consts::{CONTACT_TOLERANCE, CONTAINMENT_TOLERANCE, SPHERE_CONTACT_SCALE};
use crate::math::Vec3;

use super::contact::{Particle, ParticleContact};

/// World-space point and outward normal of every hull face.
fn world_planes<'a>(
    body: &'a RigidBody,
    mesh: &'a crate::mesh::HalfEdgeMesh,
) -> impl Iterator<Item = (Vec3, Vec3)> + 'a {
    mesh.face_handles().map(move |f| {
        let point = body.local_to_global_point(mesh.face_point(f));
        let normal = body.local_to_global_vec(mesh.face(f).normal);
        (point, normal)
    })
}

/// Returns true if `point` lies inside the collider.
///
/// Hulls accept points up to `1e-4` outside a face plane; spheres test
/// strictly against the radius.
pub fn query_point(body: &RigidBody, collider: &Collider, point: Vec3) -> bool {
    match collider.shape() {
        Shape::Hull(hull) => world_planes(body, &hull.mesh)
            .all(|(p, n)| (p - point).dot(n) >= CONTAINMENT_TOLERANCE),
        Shape::Sphere(sphere) => {
            let center = body.local_to_global_point(sphere.center);
            (point - center).length() < sphere.radius
        }
    }
}

/// Contact between a particle and the collider surface, if the particle is
/// inside or within contact range.
///
/// For hulls the contact uses the face the particle is closest to passing
/// through, so its depth is the smallest penetration over all faces.
pub fn query_particle(
    body: &RigidBody,
    collider: &Collider,
    particle: &Particle,
) -> Option<ParticleContact> {
    let p = particle.position;
    match collider.shape() {
        Shape::Hull(hull) => {
            let mut best: Option<(Vec3, f32)> = None;
            for (point, normal) in world_planes(body, &hull.mesh) {
                let d = (point - p).dot(normal);
                if d < CONTACT_TOLERANCE {
                    return None;
                }
                if best.map_or(true, |(_, depth)| d < depth) {
                    best = Some((normal, d));
                }
            }
            best.map(|(normal, depth)| ParticleContact {
                particle: particle.handle,
                normal,
                depth,
            })
        }
        Shape::Sphere(sphere) => {
            let center = body.local_to_global_point(sphere.center);
            let offset = p - center;
            let range = sphere.radius * SPHERE_CONTACT_SCALE;
            if offset.length_squared() >= range * range {
                return None;
            }
            let distance = offset.length();
            Some(ParticleContact {
                particle: particle.handle,
                normal: offset.try_normalize().unwrap_or(Vec3::Y),
                depth: sphere.radius - distance,
            })
        }
    }
}

/// First point where segment `a -> b` enters a sphere collider.
///
/// Returns `a` itself when `a` starts inside the sphere, and `None` for hull
/// colliders, misses, hits beyond `b` and zero-length segments.
pub fn intersect_segment_sphere(
    a: Vec3,
    b: Vec3,
    body: &RigidBody,
    collider: &Collider,
) -> Option<Vec3> {
    let sphere = collider.as_sphere()?;
    let center = body.local_to_global_point(sphere.center);

    let ab = b - a;
    let len = ab.length();
    if len <= f32::EPSILON {
        return None;
    }
    let d = ab / len;
    let m = a - center;
    let b = m.dot(d);
    let c = m.dot(m) - sphere.radius * sphere.radius;

    // Starts outside and points away.
    if c > 0.0 && b > 0.0 {
        return None;
    }
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    if t > len {
        return None;
    }
    Some(a + d * t.max(0.0))
}

/// True if `c` lies left of (or on) the directed line `a -> b`, looking down
/// `normal`.
#[inline]
pub fn is_ccw(a: Vec3, b: Vec3, c: Vec3, normal: Vec3) -> bool {
    (b - a).cross(c - b).dot(normal) >= 0.0
}

/// Point location in a convex CCW polygon by binary search over the fan of
/// wedges around `verts[0]`.
///
/// Points on the two fan boundary edges through `verts[0]` count as outside.
pub fn query_polygon_point(point: Vec3, verts: &[Vec3], normal: Vec3) -> bool {
    let n = verts.len();
    if n < 3 {
        return false;
    }

    let (mut low, mut high) = (0, n);
    loop {
        let mid = (low + high) / 2;
        if is_ccw(verts[0], verts[mid], point, normal) {
            low = mid;
        } else {
            high = mid;
        }
        if low + 1 >= high {
            break;
        }
    }

    if low == 0 || high == n {
        return false;
    }
    is_ccw(verts[low], verts[high], point, normal)
}

/// Returns true if the boxes overlap
#[inline]
pub fn overlap(a: &Aabb, b: &Aabb) -> bool {
    a.overlaps(*b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Quat;
    use crate::mesh::test_shapes::unit_cube;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_4;

    const EPSILON: f32 = 1e-5;

    fn cube() -> (RigidBody, Collider) {
        let collider = Collider::hull(unit_cube(), 1.0).unwrap();
        (RigidBody::new(), collider)
    }

    fn sphere_at(position: Vec3, radius: f32) -> (RigidBody, Collider) {
        let mut body = RigidBody::new();
        body.set_transform(position, Quat::IDENTITY);
        (body, Collider::sphere(radius, 1.0).unwrap())
    }

    #[test]
    fn test_point_in_hull() {
        let (body, c) = cube();
        assert!(query_point(&body, &c, Vec3::splat(0.5)));
        assert!(query_point(&body, &c, Vec3::new(1.0, 0.5, 0.5)));
        assert!(query_point(&body, &c, Vec3::new(1.00005, 0.5, 0.5)));
        assert!(!query_point(&body, &c, Vec3::new(1.001, 0.5, 0.5)));
        assert!(!query_point(&body, &c, Vec3::new(0.5, -0.1, 0.5)));
    }

    #[test]
    fn test_point_in_moved_hull() {
        let (mut body, c) = cube();
        body.set_transform(Vec3::new(10.0, 0.0, 0.0), Quat::from_axis_angle(Vec3::Y, FRAC_PI_4));
        let inside = body.local_to_global_point(Vec3::splat(0.5));
        assert!(query_point(&body, &c, inside));
        assert!(!query_point(&body, &c, Vec3::splat(0.5)));
    }

    #[test]
    fn test_point_in_sphere() {
        let (body, c) = sphere_at(Vec3::new(1.0, 2.0, 3.0), 2.0);
        let center = Vec3::new(1.0, 2.0, 3.0);
        assert!(query_point(&body, &c, center + Vec3::X * (2.0 - 1e-3)));
        assert!(!query_point(&body, &c, center + Vec3::X * (2.0 + 1e-3)));
    }

    #[test]
    fn test_particle_in_hull_uses_nearest_face() {
        let (body, c) = cube();
        let particle = Particle::new(4, Vec3::new(0.5, 0.9, 0.5));
        let contact = query_particle(&body, &c, &particle).unwrap();
        assert_eq!(contact.particle.0, 4);
        assert!(contact.normal.abs_diff_eq(Vec3::Y, EPSILON));
        assert_relative_eq!(contact.depth, 0.1, epsilon = EPSILON);
    }

    #[test]
    fn test_particle_near_hull() {
        let (body, c) = cube();
        let close = Particle::new(0, Vec3::new(-0.05, 0.5, 0.5));
        let contact = query_particle(&body, &c, &close).unwrap();
        assert!(contact.normal.abs_diff_eq(-Vec3::X, EPSILON));
        assert_relative_eq!(contact.depth, -0.05, epsilon = EPSILON);

        let far = Particle::new(1, Vec3::new(-0.08, 0.5, 0.5));
        assert!(query_particle(&body, &c, &far).is_none());
    }

    #[test]
    fn test_particle_sphere() {
        let (body, c) = sphere_at(Vec3::ZERO, 1.0);
        let inside = Particle::new(0, Vec3::new(0.0, 0.0, 0.75));
        let contact = query_particle(&body, &c, &inside).unwrap();
        assert!(contact.normal.abs_diff_eq(Vec3::Z, EPSILON));
        assert_relative_eq!(contact.depth, 0.25, epsilon = EPSILON);

        let skin = Particle::new(1, Vec3::new(1.05, 0.0, 0.0));
        let contact = query_particle(&body, &c, &skin).unwrap();
        assert_relative_eq!(contact.depth, -0.05, epsilon = EPSILON);

        let outside = Particle::new(2, Vec3::new(1.2, 0.0, 0.0));
        assert!(query_particle(&body, &c, &outside).is_none());
    }

    #[test]
    fn test_segment_hits_sphere() {
        let (body, c) = sphere_at(Vec3::new(5.0, 0.0, 0.0), 1.0);
        let hit = intersect_segment_sphere(Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), &body, &c)
            .unwrap();
        // |AC| - r from A
        assert!(hit.abs_diff_eq(Vec3::new(4.0, 0.0, 0.0), EPSILON));
    }

    #[test]
    fn test_segment_misses_sphere() {
        let (body, c) = sphere_at(Vec3::new(5.0, 0.0, 0.0), 1.0);
        // Points away.
        assert!(intersect_segment_sphere(Vec3::ZERO, Vec3::new(-10.0, 0.0, 0.0), &body, &c).is_none());
        // Passes beside.
        assert!(intersect_segment_sphere(Vec3::new(0.0, 2.0, 0.0), Vec3::new(10.0, 2.0, 0.0), &body, &c).is_none());
        // Stops short.
        assert!(intersect_segment_sphere(Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0), &body, &c).is_none());
        // Zero length.
        assert!(intersect_segment_sphere(Vec3::ZERO, Vec3::ZERO, &body, &c).is_none());
    }

    #[test]
    fn test_segment_starting_inside() {
        let (body, c) = sphere_at(Vec3::ZERO, 1.0);
        let a = Vec3::new(0.5, 0.0, 0.0);
        let hit = intersect_segment_sphere(a, Vec3::new(5.0, 0.0, 0.0), &body, &c).unwrap();
        assert!(hit.abs_diff_eq(a, EPSILON));
    }

    #[test]
    fn test_segment_against_hull() {
        let (body, c) = cube();
        assert!(intersect_segment_sphere(Vec3::ZERO, Vec3::ONE, &body, &c).is_none());
    }

    #[test]
    fn test_is_ccw() {
        assert!(is_ccw(Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0), Vec3::Z));
        assert!(!is_ccw(Vec3::ZERO, Vec3::X, Vec3::new(1.0, -1.0, 0.0), Vec3::Z));
        // Collinear counts as CCW.
        assert!(is_ccw(Vec3::ZERO, Vec3::X, Vec3::X * 2.0, Vec3::Z));
    }

    #[test]
    fn test_polygon_point() {
        let hexagon: Vec<Vec3> = (0..6)
            .map(|i| {
                let a = i as f32 * std::f32::consts::PI / 3.0;
                Vec3::new(a.cos(), a.sin(), 0.0)
            })
            .collect();
        assert!(query_polygon_point(Vec3::new(0.1, 0.2, 0.0), &hexagon, Vec3::Z));
        assert!(query_polygon_point(Vec3::new(-0.5, -0.3, 0.0), &hexagon, Vec3::Z));
        assert!(!query_polygon_point(Vec3::new(2.0, 0.0, 0.0), &hexagon, Vec3::Z));
        assert!(!query_polygon_point(Vec3::new(0.9, -0.6, 0.0), &hexagon, Vec3::Z));
        assert!(!query_polygon_point(Vec3::new(0.0, 0.95, 0.0), &hexagon, Vec3::Z));
    }

    #[test]
    fn test_polygon_point_degenerate() {
        assert!(!query_polygon_point(Vec3::ZERO, &[], Vec3::Z));
        assert!(!query_polygon_point(Vec3::ZERO, &[Vec3::X, Vec3::Y], Vec3::Z));
    }

    #[test]
    fn test_overlap() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::splat(0.9), Vec3::splat(2.0));
        let c = Aabb::new(Vec3::new(0.0, 1.1, 0.0), Vec3::new(1.0, 2.0, 1.0));
        assert!(overlap(&a, &b) && overlap(&b, &a));
        assert!(!overlap(&a, &c) && !overlap(&c, &a));
    }
}
