//! Simulation settings and the per-step context handed to body integration.

use crate::mesh::DEFAULT_MERGE_TOLERANCE;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default squared-velocity sleep threshold.
pub const DEFAULT_SLEEP_EPSILON: f32 = 0.12;

/// Settings shared by every step of a [`World`](crate::World).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SimConfig {
    /// Magnitude of gravity along -Y (m/s²).
    pub gravity: f32,
    /// Velocity scale applied after each update.
    pub damping: f32,
    /// Bodies whose origin falls below this height are put to sleep.
    pub floor_height: f32,
    /// Gravity multiplier while the simulation is paused.
    pub paused_gravity_scale: f32,
    /// Squared-velocity threshold below which a body may fall asleep.
    pub sleep_epsilon: f32,
    /// Weight of the previous motion value in the running average.
    pub sleep_bias: f32,
    /// Upper clamp of the motion accumulator.
    pub sleep_motion_max: f32,
    /// Whether [`World::step`](crate::World::step) lets resting bodies fall asleep.
    pub allow_sleep: bool,
    /// Normal tolerance used when merging coplanar hull faces.
    pub merge_tolerance: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            damping: 0.99,
            floor_height: -100.0,
            paused_gravity_scale: 0.1,
            sleep_epsilon: DEFAULT_SLEEP_EPSILON,
            sleep_bias: 0.9,
            sleep_motion_max: 1.0,
            allow_sleep: false,
            merge_tolerance: DEFAULT_MERGE_TOLERANCE,
        }
    }
}

impl SimConfig {
    /// Config with no gravity.
    #[must_use]
    pub fn zero_gravity() -> Self {
        Self {
            gravity: 0.0,
            ..Default::default()
        }
    }

    /// Set the gravity magnitude.
    #[must_use]
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the velocity damping factor.
    #[must_use]
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    /// Set the out-of-bounds floor height.
    #[must_use]
    pub fn with_floor_height(mut self, floor_height: f32) -> Self {
        self.floor_height = floor_height;
        self
    }

    /// Let bodies fall asleep once their motion settles.
    #[must_use]
    pub fn with_sleep(mut self, allow_sleep: bool) -> Self {
        self.allow_sleep = allow_sleep;
        self
    }

    /// Build the context for one step of length `dt`.
    #[must_use]
    pub fn step_context(&self, dt: f32, paused: bool) -> StepContext {
        StepContext {
            dt,
            paused,
            gravity: self.gravity,
            damping: self.damping,
            floor_height: self.floor_height,
            paused_gravity_scale: self.paused_gravity_scale,
            sleep_epsilon: self.sleep_epsilon,
            sleep_bias: self.sleep_bias,
            sleep_motion_max: self.sleep_motion_max,
        }
    }
}

/// Everything [`RigidBody::update`](crate::dynamics::RigidBody::update) needs
/// for a single step. Built fresh each step instead of read from globals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepContext {
    /// Step length in seconds.
    pub dt: f32,
    /// Whether the simulation is paused.
    pub paused: bool,
    /// Magnitude of gravity along -Y.
    pub gravity: f32,
    /// Velocity scale applied after integration.
    pub damping: f32,
    /// Out-of-bounds height.
    pub floor_height: f32,
    /// Gravity multiplier while paused.
    pub paused_gravity_scale: f32,
    /// Sleep threshold.
    pub sleep_epsilon: f32,
    /// Motion averaging bias.
    pub sleep_bias: f32,
    /// Motion accumulator clamp.
    pub sleep_motion_max: f32,
}

impl StepContext {
    /// Context for a running simulation with default settings.
    #[must_use]
    pub fn new(dt: f32) -> Self {
        SimConfig::default().step_context(dt, false)
    }

    /// Effective gravity magnitude for this step.
    #[inline]
    pub fn effective_gravity(&self) -> f32 {
        if self.paused {
            self.gravity * self.paused_gravity_scale
        } else {
            self.gravity
        }
    }
}
