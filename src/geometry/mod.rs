mod aabb;
mod collider;

pub use aabb::Aabb;
pub use collider::{Collider, HullShape, MassProperties, Shape, ShapeKind, SphereShape};
