//! # hullsim
//!
//! Rigid bodies built from convex polyhedral hulls and spheres.
//!
//! ## Features
//!
//! - **Half-Edge Hulls**: Twin-linked boundary meshes with coplanar face merging
//! - **OBJ Loading**: Vertex and polygon records, optionally split per object
//! - **Mass Properties**: Exact hull volume, centroid and inertia tensor by tetrahedral decomposition
//! - **Rigid Body Dynamics**: Explicit integration with damping, a floor cutoff and sleeping
//! - **Queries**: Point containment, particle contacts and segment picking
//!
//! ## Quick Start
//!
//! ```rust
//! use hullsim::prelude::*;
//!
//! let obj = "\
//! v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\n\
//! f 1 3 2\nf 1 2 4\nf 1 4 3\nf 2 3 4\n";
//! let mesh = read_obj(obj.as_bytes(), Some(DEFAULT_MERGE_TOLERANCE)).unwrap();
//!
//! let mut world = World::default();
//! let body = world
//!     .spawn_hull(mesh, RigidBodyDesc::dynamic().with_position(Vec3::new(0.0, 5.0, 0.0)), 1.0)
//!     .unwrap();
//!
//! let dt = 1.0 / 60.0;
//! for _ in 0..60 {
//!     world.step(dt);
//! }
//! assert!(world.body(body).unwrap().position.y < 5.0);
//! ```

pub mod collision;
pub mod config;
pub mod dynamics;
pub mod error;
pub mod geometry;
pub mod math;
pub mod mesh;
mod world;

pub use config::{SimConfig, StepContext};
pub use error::{Error, MassError, MeshError, Result};
pub use world::World;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::collision::{BodyHandle, ColliderHandle, Particle, ParticleContact};
    pub use crate::config::{SimConfig, StepContext};
    pub use crate::dynamics::{RigidBody, RigidBodyDesc};
    pub use crate::error::{Error, MassError, MeshError};
    pub use crate::geometry::{Aabb, Collider, MassProperties, Shape, ShapeKind};
    pub use crate::math::{Mat3, Quat, Vec3};
    pub use crate::mesh::obj::{parse_obj, read_obj};
    pub use crate::mesh::{HalfEdgeMesh, DEFAULT_MERGE_TOLERANCE};
    pub use crate::world::World;
}
