use tracing::{debug, warn};

use crate::config::StepContext;
use crate::math::{Mat3, Vec3};

use super::rigid_body::RigidBody;

/// One explicit step: gravity and accumulated forces into velocities, then
/// [`integrate_position`], then damping.
///
/// Static and sleeping bodies are left alone. A body whose origin has fallen
/// below `ctx.floor_height` is put to sleep instead of integrated.
pub fn update(body: &mut RigidBody, ctx: &StepContext) {
    if body.is_static() {
        return;
    }

    if body.position.y < ctx.floor_height {
        if body.is_awake {
            warn!(
                handle = ?body.handle,
                height = body.position.y,
                floor = ctx.floor_height,
                "body fell out of the scene, putting it to sleep"
            );
        }
        body.sleep();
        return;
    }

    if !body.is_awake {
        return;
    }

    let dt = ctx.dt;
    body.force += Vec3::new(0.0, -ctx.effective_gravity(), 0.0) * body.mass();

    body.refresh_inertia();
    body.velocity += body.force * (dt * body.inv_mass);
    body.angular_velocity += body.inv_inertia * body.torque * dt;
    body.clear_forces();

    integrate_position(body, dt);

    body.velocity *= ctx.damping;
    body.angular_velocity *= ctx.damping;
}

/// Advances the centroid and orientation by the current velocities and
/// rederives the rotation matrix and body origin.
pub fn integrate_position(body: &mut RigidBody, dt: f32) {
    if body.is_static() {
        return;
    }

    body.centroid += body.velocity * dt;

    let spin = body.orientation.derivative(body.angular_velocity) * dt;
    body.orientation = (body.orientation + spin).normalize();
    body.rotation = Mat3::from_quat(body.orientation);

    body.position = body.centroid - body.rotation * body.local_centroid;
}

/// Folds the body's squared speed into its motion average and puts it to
/// sleep once the average drops below `ctx.sleep_epsilon`.
pub fn update_sleep(body: &mut RigidBody, ctx: &StepContext) {
    if body.is_static() || !body.is_awake {
        return;
    }

    let speed2 = body.velocity.length_squared() + body.angular_velocity.length_squared();
    body.motion = (ctx.sleep_bias * body.motion + (1.0 - ctx.sleep_bias) * speed2)
        .min(ctx.sleep_motion_max);

    if body.can_sleep && body.motion < ctx.sleep_epsilon {
        debug!(handle = ?body.handle, motion = body.motion, "body fell asleep");
        body.sleep();
    }
}
