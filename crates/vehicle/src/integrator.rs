//! # Reference Rigid Body
//!
//! A minimal host-side rigid body used by the runtime and the tests. It
//! accumulates forces and torques pushed by the vehicle and advances itself
//! with semi-implicit Euler integration when the host calls
//! [`SimpleBody::integrate`].

use glam::{Quat, Vec3};

use crate::host::RigidBody;

/// Integration constants
const MIN_ANGULAR_STEP: f32 = 1e-9;

#[derive(Clone, Debug)]
pub struct SimpleBody {
    pub position: Vec3,
    pub rotation: Quat,
    pub linear_velocity: Vec3,
    /// World-space angular velocity in rad/s.
    pub angular_velocity: Vec3,
    mass: f32,
    /// Principal moments of inertia in the body's local frame.
    inertia: Vec3,
    force: Vec3,
    torque: Vec3,
}

impl SimpleBody {
    #[must_use]
    pub fn new(position: Vec3, mass: f32, inertia: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass,
            inertia,
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
        }
    }

    /// Solid box with the given half extents.
    #[must_use]
    pub fn solid_box(position: Vec3, mass: f32, half_extents: Vec3) -> Self {
        let size = half_extents * 2.0;
        let inertia = Vec3::new(
            size.y * size.y + size.z * size.z,
            size.x * size.x + size.z * size.z,
            size.x * size.x + size.y * size.y,
        ) * (mass / 12.0);
        Self::new(position, mass, inertia)
    }

    #[must_use]
    pub fn accumulated_force(&self) -> Vec3 {
        self.force
    }

    #[must_use]
    pub fn accumulated_torque(&self) -> Vec3 {
        self.torque
    }

    pub fn clear_forces(&mut self) {
        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;
    }

    fn inverse_mass(&self) -> f32 {
        if self.mass > 0.0 {
            1.0 / self.mass
        } else {
            0.0
        }
    }

    fn inverse_inertia(&self) -> Vec3 {
        let inv = |i: f32| if i > 0.0 { 1.0 / i } else { 0.0 };
        Vec3::new(inv(self.inertia.x), inv(self.inertia.y), inv(self.inertia.z))
    }

    /// Advance the body by `dt` and clear the accumulators.
    pub fn integrate(&mut self, dt: f32, gravity: Vec3) {
        let gravity = if self.mass > 0.0 { gravity } else { Vec3::ZERO };
        let acceleration = self.force * self.inverse_mass() + gravity;
        self.linear_velocity += acceleration * dt;
        self.position += self.linear_velocity * dt;

        // Torque is resolved in the local frame where the inertia is diagonal.
        let local_torque = self.rotation.inverse() * self.torque;
        let local_alpha = local_torque * self.inverse_inertia();
        self.angular_velocity += self.rotation * local_alpha * dt;

        let rotation_step = self.angular_velocity * dt;
        if rotation_step.length_squared() > MIN_ANGULAR_STEP {
            self.rotation = (Quat::from_scaled_axis(rotation_step) * self.rotation).normalize();
        }

        self.clear_forces();
    }
}

impl RigidBody for SimpleBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn velocity(&self) -> Vec3 {
        self.linear_velocity
    }

    fn mass(&self) -> f32 {
        self.mass
    }

    fn velocity_at_point(&self, point: Vec3) -> Vec3 {
        self.linear_velocity + self.angular_velocity.cross(point - self.position)
    }

    fn apply_force_at_point(&mut self, force: Vec3, point: Vec3) {
        self.force += force;
        self.torque += (point - self.position).cross(force);
    }

    fn apply_force(&mut self, force: Vec3) {
        self.force += force;
    }

    fn apply_impulse(&mut self, impulse: Vec3) {
        self.linear_velocity += impulse * self.inverse_mass();
    }
}
