//! # Wheel Force Model
//!
//! Each wheel raycasts for ground contact once per fixed step and, when it
//! touches the ground, pushes four force contributions into the chassis at
//! its anchor point: a damped suspension spring, lateral grip, drive force
//! shaped by the power curve, and braking against the rolling direction.
//!
//! Wheels hold no integration state. Velocities are always sampled from the
//! host's rigid body, which owns integration.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::curve::ResponseCurve;
use crate::error::VehicleError;
use crate::host::{GroundCaster, LayerMask, RigidBody};

/// Corner of the chassis a wheel is mounted on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WheelPosition {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

impl WheelPosition {
    pub const ALL: [Self; 4] = [
        Self::FrontLeft,
        Self::FrontRight,
        Self::BackLeft,
        Self::BackRight,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn is_front(self) -> bool {
        matches!(self, Self::FrontLeft | Self::FrontRight)
    }
}

/// Static tuning of a single wheel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    /// Mass used by the lateral grip model in kg
    pub mass: f32,
    /// Wheel radius, also the ground raycast length
    pub radius: f32,
    /// Chassis speed at which the power curve is sampled at 1.0
    pub max_speed: f32,
    /// Fraction of lateral slip velocity cancelled each fixed step
    pub tire_grip_factor: f32,
    pub suspension_rest_distance: f32,
    pub spring_strength: f32,
    pub spring_damper: f32,
    /// Torque multiplier over normalized forward speed
    pub power_curve: ResponseCurve,
    pub ground_layers: LayerMask,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            mass: 20.0,
            radius: 0.5,
            max_speed: 1000.0,
            tire_grip_factor: 0.03,
            suspension_rest_distance: 0.5,
            spring_strength: 400.0,
            spring_damper: 20.0,
            power_curve: ResponseCurve::default(),
            ground_layers: LayerMask::ALL,
        }
    }
}

impl WheelConfig {
    /// # Errors
    ///
    /// Returns [`VehicleError::InvalidWheelConfig`] naming the first field
    /// that is non-finite or out of range.
    pub fn validate(&self) -> Result<(), VehicleError> {
        let checks: [(&'static str, f32, bool); 7] = [
            ("mass", self.mass, self.mass >= 0.0),
            ("radius", self.radius, self.radius > 0.0),
            ("max_speed", self.max_speed, self.max_speed > 0.0),
            ("tire_grip_factor", self.tire_grip_factor, true),
            (
                "suspension_rest_distance",
                self.suspension_rest_distance,
                self.suspension_rest_distance >= 0.0,
            ),
            ("spring_strength", self.spring_strength, self.spring_strength >= 0.0),
            ("spring_damper", self.spring_damper, self.spring_damper >= 0.0),
        ];
        for (field, value, in_range) in checks {
            if !value.is_finite() || !in_range {
                return Err(VehicleError::InvalidWheelConfig { field, value });
            }
        }
        Ok(())
    }
}

/// Force contributions a wheel pushed into the chassis during one fixed step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WheelForces {
    pub suspension: Vec3,
    pub sideways: Vec3,
    pub acceleration: Vec3,
    pub brake: Vec3,
}

impl WheelForces {
    #[must_use]
    pub fn total(&self) -> Vec3 {
        self.suspension + self.sideways + self.acceleration + self.brake
    }
}

/// World frame of a wheel for the current step.
#[derive(Clone, Copy, Debug)]
struct WheelFrame {
    anchor: Vec3,
    up: Vec3,
    right: Vec3,
    forward: Vec3,
}

#[derive(Clone, Debug)]
pub struct WheelModel {
    config: WheelConfig,
    /// Mount point in the chassis frame
    local_position: Vec3,
    /// Steering yaw around the chassis up axis, in degrees
    steer_angle: f32,
    motor_torque: f32,
    brake_torque: f32,
    /// Ray distance to the ground, `None` while airborne
    hit_distance: Option<f32>,
    forces: WheelForces,
}

impl WheelModel {
    /// # Errors
    ///
    /// Fails when `config` does not pass [`WheelConfig::validate`] or the
    /// mount point is not finite.
    pub fn new(config: WheelConfig, local_position: Vec3) -> Result<Self, VehicleError> {
        config.validate()?;
        if !local_position.is_finite() {
            return Err(VehicleError::InvalidWheelConfig {
                field: "local_position",
                value: local_position.length(),
            });
        }
        Ok(Self {
            config,
            local_position,
            steer_angle: 0.0,
            motor_torque: 0.0,
            brake_torque: 0.0,
            hit_distance: None,
            forces: WheelForces::default(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &WheelConfig {
        &self.config
    }

    #[must_use]
    pub fn local_position(&self) -> Vec3 {
        self.local_position
    }

    #[must_use]
    pub fn steer_angle(&self) -> f32 {
        self.steer_angle
    }

    pub fn set_steer_angle(&mut self, degrees: f32) {
        self.steer_angle = degrees;
    }

    #[must_use]
    pub fn motor_torque(&self) -> f32 {
        self.motor_torque
    }

    pub fn set_motor_torque(&mut self, torque: f32) {
        self.motor_torque = torque;
    }

    #[must_use]
    pub fn brake_torque(&self) -> f32 {
        self.brake_torque
    }

    pub fn set_brake_torque(&mut self, torque: f32) {
        self.brake_torque = torque;
    }

    #[must_use]
    pub fn is_grounded(&self) -> bool {
        self.hit_distance.is_some()
    }

    #[must_use]
    pub fn hit_distance(&self) -> Option<f32> {
        self.hit_distance
    }

    /// Forces applied during the last fixed step.
    #[must_use]
    pub fn last_forces(&self) -> WheelForces {
        self.forces
    }

    /// Forget the last step's forces, e.g. when a step is skipped.
    pub fn clear_forces(&mut self) {
        self.forces = WheelForces::default();
    }

    /// Lateral grip force from the last fixed step, for debug drawing.
    #[must_use]
    pub fn sideways_force(&self) -> Vec3 {
        self.forces.sideways
    }

    #[must_use]
    pub fn anchor<B: RigidBody + ?Sized>(&self, body: &B) -> Vec3 {
        body.local_to_world(self.local_position)
    }

    /// Chassis rotation composed with this wheel's steering yaw.
    #[must_use]
    pub fn world_rotation<B: RigidBody + ?Sized>(&self, body: &B) -> Quat {
        body.rotation() * Quat::from_rotation_y(self.steer_angle.to_radians())
    }

    fn frame<B: RigidBody + ?Sized>(&self, body: &B) -> WheelFrame {
        let rotation = self.world_rotation(body);
        WheelFrame {
            anchor: self.anchor(body),
            up: rotation * Vec3::Y,
            right: rotation * Vec3::X,
            forward: rotation * Vec3::Z,
        }
    }

    /// Cast down the chassis' local down axis for at most one radius.
    pub fn ground_check<B, G>(&mut self, body: &B, ground: &G) -> bool
    where
        B: RigidBody + ?Sized,
        G: GroundCaster + ?Sized,
    {
        let was_grounded = self.is_grounded();
        self.hit_distance = ground.cast_ray(
            self.anchor(body),
            -body.up(),
            self.config.radius,
            self.config.ground_layers,
        );
        if was_grounded != self.is_grounded() {
            trace!(
                grounded = self.is_grounded(),
                hit = ?self.hit_distance,
                "wheel contact changed"
            );
        }
        self.is_grounded()
    }

    /// Run one fixed step: ground check, then suspension, sideways,
    /// acceleration and brake forces in that order. An airborne wheel
    /// applies nothing.
    pub fn fixed_step<B, G>(&mut self, body: &mut B, ground: &G, fixed_dt: f32) -> WheelForces
    where
        B: RigidBody + ?Sized,
        G: GroundCaster + ?Sized,
    {
        self.forces = WheelForces::default();
        if !self.ground_check(body, ground) {
            return self.forces;
        }

        let frame = self.frame(body);
        self.forces.suspension = self.apply_suspension_force(body, &frame);
        self.forces.sideways = self.apply_sideways_force(body, &frame, fixed_dt);
        self.forces.acceleration = self.apply_acceleration_force(body, &frame);
        self.forces.brake = self.apply_brake_force(body, &frame);
        self.forces
    }

    fn apply_suspension_force<B: RigidBody + ?Sized>(
        &self,
        body: &mut B,
        frame: &WheelFrame,
    ) -> Vec3 {
        let Some(hit_distance) = self.hit_distance else {
            return Vec3::ZERO;
        };
        let offset = self.config.suspension_rest_distance - hit_distance;
        let spring_velocity = frame.up.dot(body.velocity_at_point(frame.anchor));
        let magnitude =
            offset * self.config.spring_strength - spring_velocity * self.config.spring_damper;

        let force = frame.up * magnitude;
        body.apply_force_at_point(force, frame.anchor);
        force
    }

    fn apply_sideways_force<B: RigidBody + ?Sized>(
        &self,
        body: &mut B,
        frame: &WheelFrame,
        fixed_dt: f32,
    ) -> Vec3 {
        if fixed_dt <= 0.0 {
            return Vec3::ZERO;
        }
        let lateral_velocity = frame.right.dot(body.velocity_at_point(frame.anchor));
        let desired_velocity_change = -lateral_velocity * self.config.tire_grip_factor;
        let desired_acceleration = desired_velocity_change / fixed_dt;

        let force = frame.right * self.config.mass * desired_acceleration;
        body.apply_force_at_point(force, frame.anchor);
        force
    }

    fn apply_acceleration_force<B: RigidBody + ?Sized>(
        &self,
        body: &mut B,
        frame: &WheelFrame,
    ) -> Vec3 {
        if self.motor_torque == 0.0 {
            return Vec3::ZERO;
        }
        let forward_speed = body.forward().dot(body.velocity());
        let normalized_speed = (forward_speed.abs() / self.config.max_speed).clamp(0.0, 1.0);
        let torque = self.config.power_curve.evaluate(normalized_speed) * self.motor_torque;

        let force = frame.forward * torque;
        body.apply_force_at_point(force, frame.anchor);
        force
    }

    fn apply_brake_force<B: RigidBody + ?Sized>(&self, body: &mut B, frame: &WheelFrame) -> Vec3 {
        if self.brake_torque <= 0.0 {
            return Vec3::ZERO;
        }
        let point_velocity = body.velocity_at_point(frame.anchor);
        let rolling_velocity = frame.forward * frame.forward.dot(point_velocity);
        // zero when the wheel is not rolling, never NaN
        let direction = -rolling_velocity.normalize_or_zero();

        let force = direction * self.brake_torque;
        if force != Vec3::ZERO {
            body.apply_force_at_point(force, frame.anchor);
        }
        force
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::ResponseCurve;
    use crate::ground::GroundPlane;
    use crate::integrator::SimpleBody;

    const DT: f32 = 0.02;

    /// Chassis whose wheel anchors (local y = 0) sit `height` above the ground.
    fn chassis_at(height: f32) -> SimpleBody {
        SimpleBody::solid_box(Vec3::new(0.0, height, 0.0), 100.0, Vec3::new(0.9, 0.3, 1.5))
    }

    fn wheel(config: WheelConfig) -> WheelModel {
        WheelModel::new(config, Vec3::new(0.8, 0.0, 1.3)).unwrap()
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn airborne_wheel_applies_nothing() {
        let mut body = chassis_at(2.0);
        body.linear_velocity = Vec3::new(3.0, -1.0, 12.0);
        let mut w = wheel(WheelConfig::default());
        w.set_motor_torque(500.0);
        w.set_brake_torque(300.0);

        let forces = w.fixed_step(&mut body, &GroundPlane::default(), DT);

        assert!(!w.is_grounded());
        assert_eq!(w.hit_distance(), None);
        assert_eq!(forces, WheelForces::default());
        assert_eq!(body.accumulated_force(), Vec3::ZERO);
        assert_eq!(body.accumulated_torque(), Vec3::ZERO);
    }

    #[test]
    fn ground_layers_filter_contact() {
        let mut body = chassis_at(0.3);
        let config = WheelConfig {
            ground_layers: LayerMask::layer(5),
            ..WheelConfig::default()
        };
        let mut w = wheel(config);

        w.fixed_step(&mut body, &GroundPlane::new(0.0, LayerMask::layer(1)), DT);
        assert!(!w.is_grounded());

        w.fixed_step(&mut body, &GroundPlane::new(0.0, LayerMask::layer(5)), DT);
        assert!(w.is_grounded());
        assert!((w.hit_distance().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn suspension_extends_when_offset_positive() {
        let mut body = chassis_at(0.3);
        let mut w = wheel(WheelConfig::default());

        let forces = w.fixed_step(&mut body, &GroundPlane::default(), DT);

        // offset = 0.5 - 0.3, force = 0.2 * 400
        assert!(approx(forces.suspension, Vec3::new(0.0, 80.0, 0.0)));
        assert!(approx(body.accumulated_force(), Vec3::new(0.0, 80.0, 0.0)));
    }

    #[test]
    fn suspension_damper_opposes_approach_velocity() {
        let mut body = chassis_at(0.3);
        body.linear_velocity = Vec3::new(0.0, -2.0, 0.0);
        let mut w = wheel(WheelConfig::default());

        let forces = w.fixed_step(&mut body, &GroundPlane::default(), DT);

        // 0.2 * 400 - (-2.0 * 20)
        assert!(approx(forces.suspension, Vec3::new(0.0, 120.0, 0.0)));
    }

    #[test]
    fn sideways_force_cancels_slip_fraction() {
        let mut body = chassis_at(0.5);
        body.linear_velocity = Vec3::new(4.0, 0.0, 0.0);
        let mut w = wheel(WheelConfig::default());

        let forces = w.fixed_step(&mut body, &GroundPlane::default(), DT);

        // -4 * 0.03 / 0.02 * 20
        assert!(approx(forces.sideways, Vec3::new(-120.0, 0.0, 0.0)));
        assert_eq!(forces.suspension, Vec3::ZERO);
    }

    #[test]
    fn sideways_force_follows_steering() {
        let mut body = chassis_at(0.5);
        body.linear_velocity = Vec3::new(0.0, 0.0, 10.0);
        let mut w = wheel(WheelConfig::default());
        w.set_steer_angle(90.0);

        let forces = w.fixed_step(&mut body, &GroundPlane::default(), DT);

        // steered fully sideways the wheel's right axis is -Z
        assert!(forces.sideways.z < 0.0);
        assert!(forces.sideways.x.abs() < 1e-3);
    }

    #[test]
    fn acceleration_scales_with_power_curve() {
        let mut body = chassis_at(0.5);
        body.linear_velocity = Vec3::new(0.0, 0.0, -250.0);
        let config = WheelConfig {
            power_curve: ResponseCurve::linear(1.0, 0.2),
            ..WheelConfig::default()
        };
        let mut w = wheel(config);
        w.set_motor_torque(125.0);

        let forces = w.fixed_step(&mut body, &GroundPlane::default(), DT);

        // |speed| / max_speed = 0.25 even when reversing
        assert!(approx(forces.acceleration, Vec3::new(0.0, 0.0, 100.0)));
    }

    #[test]
    fn zero_motor_torque_skips_acceleration() {
        let mut body = chassis_at(0.5);
        let mut w = wheel(WheelConfig::default());
        let forces = w.fixed_step(&mut body, &GroundPlane::default(), DT);
        assert_eq!(forces.acceleration, Vec3::ZERO);
    }

    #[test]
    fn brake_opposes_rolling_direction() {
        let mut body = chassis_at(0.5);
        body.linear_velocity = Vec3::new(2.0, 0.0, 6.0);
        let mut w = wheel(WheelConfig::default());
        w.set_brake_torque(300.0);

        let forces = w.fixed_step(&mut body, &GroundPlane::default(), DT);

        assert!(approx(forces.brake, Vec3::new(0.0, 0.0, -300.0)));
    }

    #[test]
    fn brake_without_rolling_velocity_is_zero() {
        let mut body = chassis_at(0.5);
        body.linear_velocity = Vec3::new(5.0, 0.0, 0.0);
        let mut w = wheel(WheelConfig::default());
        w.set_brake_torque(300.0);

        let forces = w.fixed_step(&mut body, &GroundPlane::default(), DT);

        assert_eq!(forces.brake, Vec3::ZERO);
        assert!(forces.total().is_finite());
        assert!(body.accumulated_force().is_finite());
    }

    #[test]
    fn rejects_invalid_config() {
        let negative_mass = WheelConfig {
            mass: -1.0,
            ..WheelConfig::default()
        };
        assert!(matches!(
            WheelModel::new(negative_mass, Vec3::ZERO),
            Err(VehicleError::InvalidWheelConfig { field: "mass", .. })
        ));

        let negative_radius = WheelConfig {
            radius: -0.5,
            ..WheelConfig::default()
        };
        assert!(matches!(
            WheelModel::new(negative_radius, Vec3::ZERO),
            Err(VehicleError::InvalidWheelConfig { field: "radius", .. })
        ));

        assert!(WheelModel::new(WheelConfig::default(), Vec3::splat(f32::NAN)).is_err());
    }
}
