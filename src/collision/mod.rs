//! Point, particle and segment queries against colliders.

pub mod contact;
pub mod query;

pub use contact::{BodyHandle, ColliderHandle, Particle, ParticleContact, ParticleHandle};
pub use query::{
    intersect_segment_sphere, is_ccw, overlap, query_particle, query_point, query_polygon_point,
};
