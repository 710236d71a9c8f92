mod integrator;
mod rigid_body;

pub use integrator::{integrate_position, update, update_sleep};
pub use rigid_body::{RigidBody, RigidBodyDesc};
