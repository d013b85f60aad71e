//! # Vehicle Controller
//!
//! Owns the four wheels and translates driver input into per-wheel motor
//! torque, brake torque and steering. It runs on two cadences driven by the
//! host:
//!
//! -   [`VehicleController::on_frame`] once per rendered frame: reads input
//!     and eases the front wheels toward their Ackermann angles.
//! -   [`VehicleController::on_fixed_step`] once per physics tick: distributes
//!     torque, steps every wheel, then applies downforce and boost.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::debug::{VehicleDebugInfo, WheelDebugInfo};
use crate::error::VehicleError;
use crate::host::{GroundCaster, RigidBody};
use crate::steering::{ackermann_angles, max_steer_angle, smooth_toward};
use crate::wheel::{WheelModel, WheelPosition};

/// Which axle receives motor torque.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DriveType {
    #[default]
    Fwd,
    Rwd,
    Awd,
}

impl DriveType {
    /// Divisor used for both motor and brake torque.
    #[must_use]
    pub const fn driven_wheel_count(self) -> f32 {
        match self {
            Self::Awd => 4.0,
            Self::Fwd | Self::Rwd => 2.0,
        }
    }

    #[must_use]
    pub const fn drives(self, position: WheelPosition) -> bool {
        match self {
            Self::Fwd => position.is_front(),
            Self::Rwd => !position.is_front(),
            Self::Awd => true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Steering limit in degrees, below [`max_steer_angle`] for the wheelbase
    pub max_steer_angle: f32,
    /// Rate of the per-frame steering blend
    pub steer_smoothing: f32,
    /// Raw steer input to degrees
    pub steer_input_multiplier: f32,
    pub drive_type: DriveType,
    pub motor_force: f32,
    pub brake_force: f32,
    /// Impulse applied every fixed step while boost is held
    pub boost_force: f32,
    /// Downforce per unit of speed
    pub down_force: f32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_steer_angle: 30.0,
            steer_smoothing: 0.5,
            steer_input_multiplier: 0.1,
            drive_type: DriveType::Fwd,
            motor_force: 1000.0,
            brake_force: 2000.0,
            boost_force: 10.0,
            down_force: 0.1,
        }
    }
}

impl ControllerConfig {
    /// # Errors
    ///
    /// Returns [`VehicleError::InvalidControllerConfig`] naming the first
    /// field that is non-finite or out of range.
    pub fn validate(&self) -> Result<(), VehicleError> {
        let checks: [(&'static str, f32, bool); 7] = [
            (
                "max_steer_angle",
                self.max_steer_angle,
                (0.0..90.0).contains(&self.max_steer_angle),
            ),
            ("steer_smoothing", self.steer_smoothing, self.steer_smoothing >= 0.0),
            ("steer_input_multiplier", self.steer_input_multiplier, true),
            ("motor_force", self.motor_force, true),
            ("brake_force", self.brake_force, self.brake_force >= 0.0),
            ("boost_force", self.boost_force, self.boost_force >= 0.0),
            ("down_force", self.down_force, self.down_force >= 0.0),
        ];
        for (field, value, in_range) in checks {
            if !value.is_finite() || !in_range {
                return Err(VehicleError::InvalidControllerConfig { field, value });
            }
        }
        Ok(())
    }
}

/// Driver input sampled once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlInput {
    /// Normalized steering in [-1, 1], positive to the right
    pub steer: f32,
    /// Normalized throttle in [-1, 1]
    pub throttle: f32,
    pub brake: bool,
    pub boost: bool,
}

impl ControlInput {
    fn sanitized(self) -> Self {
        let finite_or_zero = |name: &str, v: f32| {
            if v.is_finite() {
                v
            } else {
                warn!(input = name, value = v, "non-finite control input replaced with 0");
                0.0
            }
        };
        Self {
            steer: finite_or_zero("steer", self.steer),
            throttle: finite_or_zero("throttle", self.throttle),
            ..self
        }
    }
}

#[derive(Clone, Debug)]
pub struct VehicleController {
    config: ControllerConfig,
    /// Indexed by [`WheelPosition::index`]
    wheels: [WheelModel; 4],
    input: ControlInput,
    current_steer_angle: f32,
    current_motor_force: f32,
    current_brake_force: f32,
    last_downforce: Vec3,
    last_boost_impulse: Vec3,
}

impl VehicleController {
    /// `wheels` are given in [`WheelPosition::ALL`] order: FL, FR, BL, BR.
    ///
    /// # Errors
    ///
    /// Fails when `config` does not pass [`ControllerConfig::validate`], or
    /// when `max_steer_angle` reaches [`max_steer_angle`] for this wheelbase.
    pub fn new(config: ControllerConfig, wheels: [WheelModel; 4]) -> Result<Self, VehicleError> {
        config.validate()?;
        let wheelbase = wheels[WheelPosition::FrontLeft.index()].local_position().z
            + wheels[WheelPosition::FrontRight.index()].local_position().z;
        if config.max_steer_angle >= max_steer_angle(wheelbase) {
            return Err(VehicleError::InvalidControllerConfig {
                field: "max_steer_angle",
                value: config.max_steer_angle,
            });
        }
        debug!(drive_type = ?config.drive_type, wheelbase, "vehicle controller created");
        Ok(Self {
            config,
            wheels,
            input: ControlInput::default(),
            current_steer_angle: 0.0,
            current_motor_force: 0.0,
            current_brake_force: 0.0,
            last_downforce: Vec3::ZERO,
            last_boost_impulse: Vec3::ZERO,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn set_drive_type(&mut self, drive_type: DriveType) {
        self.config.drive_type = drive_type;
    }

    #[must_use]
    pub fn wheel(&self, position: WheelPosition) -> &WheelModel {
        &self.wheels[position.index()]
    }

    #[must_use]
    pub fn wheels(&self) -> &[WheelModel; 4] {
        &self.wheels
    }

    #[must_use]
    pub fn input(&self) -> ControlInput {
        self.input
    }

    #[must_use]
    pub fn current_steer_angle(&self) -> f32 {
        self.current_steer_angle
    }

    #[must_use]
    pub fn current_motor_force(&self) -> f32 {
        self.current_motor_force
    }

    #[must_use]
    pub fn current_brake_force(&self) -> f32 {
        self.current_brake_force
    }

    /// Front-to-rear axle distance, taken from the front wheels' mount points.
    #[must_use]
    pub fn wheelbase(&self) -> f32 {
        self.wheel(WheelPosition::FrontLeft).local_position().z
            + self.wheel(WheelPosition::FrontRight).local_position().z
    }

    /// Latch input and derive the steering angle and total forces from it.
    pub fn read_input(&mut self, input: ControlInput) {
        let input = input.sanitized();
        let max = self.config.max_steer_angle;
        self.current_steer_angle =
            (input.steer * self.config.steer_input_multiplier).clamp(-max, max);
        self.current_motor_force = input.throttle * self.config.motor_force;
        self.current_brake_force = if input.brake {
            self.config.brake_force
        } else {
            0.0
        };
        self.input = input;
    }

    /// Ease both front wheels toward their Ackermann targets.
    pub fn apply_steering(&mut self, dt: f32) {
        let targets = ackermann_angles(self.current_steer_angle, self.wheelbase());
        let rate = self.config.steer_smoothing;
        for (position, target) in [
            (WheelPosition::FrontLeft, targets.left),
            (WheelPosition::FrontRight, targets.right),
        ] {
            let wheel = &mut self.wheels[position.index()];
            wheel.set_steer_angle(smooth_toward(wheel.steer_angle(), target, rate, dt));
        }
    }

    /// Per-frame update: input read, then steering smoothing.
    pub fn on_frame(&mut self, dt: f32, input: ControlInput) {
        self.read_input(input);
        self.apply_steering(dt);
    }

    /// Write motor and brake torque into every wheel. Undriven wheels get no
    /// motor torque; every wheel brakes with the drive divisor.
    pub fn distribute_torque(&mut self) {
        let drive_type = self.config.drive_type;
        let divisor = drive_type.driven_wheel_count();
        let motor_torque = self.current_motor_force / divisor;
        let brake_torque = self.current_brake_force / divisor;

        for position in WheelPosition::ALL {
            let wheel = &mut self.wheels[position.index()];
            wheel.set_motor_torque(if drive_type.drives(position) {
                motor_torque
            } else {
                0.0
            });
            wheel.set_brake_torque(brake_torque);
        }
    }

    /// Per-physics-tick update. Every contribution lands in `body`'s
    /// accumulator before the host integrates.
    pub fn on_fixed_step<B, G>(&mut self, body: &mut B, ground: &G, fixed_dt: f32)
    where
        B: RigidBody + ?Sized,
        G: GroundCaster + ?Sized,
    {
        if !(fixed_dt > 0.0 && fixed_dt.is_finite()) {
            warn!(fixed_dt, "skipping fixed step with invalid duration");
            for wheel in &mut self.wheels {
                wheel.clear_forces();
            }
            self.last_downforce = Vec3::ZERO;
            self.last_boost_impulse = Vec3::ZERO;
            return;
        }

        self.distribute_torque();
        for wheel in &mut self.wheels {
            wheel.fixed_step(body, ground, fixed_dt);
        }

        self.last_downforce = Vec3::NEG_Y * body.velocity().length() * self.config.down_force;
        body.apply_force(self.last_downforce);

        self.last_boost_impulse = if self.input.boost {
            body.forward() * self.config.boost_force
        } else {
            Vec3::ZERO
        };
        if self.input.boost {
            body.apply_impulse(self.last_boost_impulse);
        }
    }

    /// Drop latched input and torque, keeping wheel steering where it is.
    pub fn reset_inputs(&mut self) {
        self.read_input(ControlInput::default());
        self.distribute_torque();
        self.last_downforce = Vec3::ZERO;
        self.last_boost_impulse = Vec3::ZERO;
    }

    #[must_use]
    pub fn debug_info<B: RigidBody + ?Sized>(&self, body: &B) -> VehicleDebugInfo {
        let wheels = WheelPosition::ALL.map(|position| {
            let wheel = self.wheel(position);
            WheelDebugInfo {
                position,
                anchor: wheel.anchor(body),
                rotation: wheel.world_rotation(body),
                radius: wheel.config().radius,
                grounded: wheel.is_grounded(),
                hit_distance: wheel.hit_distance(),
                steer_angle: wheel.steer_angle(),
                motor_torque: wheel.motor_torque(),
                brake_torque: wheel.brake_torque(),
                forces: wheel.last_forces(),
            }
        });
        VehicleDebugInfo {
            wheels,
            speed: body.velocity().length(),
            forward_speed: body.forward().dot(body.velocity()),
            steer_angle: self.current_steer_angle,
            downforce: self.last_downforce,
            boost_impulse: self.last_boost_impulse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wheel::WheelConfig;

    fn controller(config: ControllerConfig) -> VehicleController {
        let wheels = [
            Vec3::new(-0.8, 0.0, 1.3),
            Vec3::new(0.8, 0.0, 1.3),
            Vec3::new(-0.8, 0.0, -1.3),
            Vec3::new(0.8, 0.0, -1.3),
        ]
        .map(|p| WheelModel::new(WheelConfig::default(), p).unwrap());
        VehicleController::new(config, wheels).unwrap()
    }

    fn torques(c: &VehicleController) -> [f32; 4] {
        WheelPosition::ALL.map(|p| c.wheel(p).motor_torque())
    }

    #[test]
    fn steer_angle_is_clamped() {
        let mut c = controller(ControllerConfig {
            steer_input_multiplier: 45.0,
            ..ControllerConfig::default()
        });
        c.read_input(ControlInput { steer: 1.0, ..ControlInput::default() });
        assert!((c.current_steer_angle() - 30.0).abs() < 1e-6);
        c.read_input(ControlInput { steer: -0.5, ..ControlInput::default() });
        assert!((c.current_steer_angle() + 22.5).abs() < 1e-6);
    }

    #[test]
    fn default_multiplier_never_reaches_the_limit() {
        let mut c = controller(ControllerConfig::default());
        c.read_input(ControlInput { steer: 1.0, ..ControlInput::default() });
        assert!((c.current_steer_angle() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn brake_input_is_all_or_nothing() {
        let mut c = controller(ControllerConfig::default());
        c.read_input(ControlInput { brake: true, throttle: 0.3, ..ControlInput::default() });
        assert!((c.current_brake_force() - 2000.0).abs() < 1e-6);
        assert!((c.current_motor_force() - 300.0).abs() < 1e-3);
        c.read_input(ControlInput::default());
        assert_eq!(c.current_brake_force(), 0.0);
    }

    #[test]
    fn drive_types_mask_motor_torque() {
        let mut c = controller(ControllerConfig::default());
        c.read_input(ControlInput { throttle: 1.0, ..ControlInput::default() });

        c.set_drive_type(DriveType::Fwd);
        c.distribute_torque();
        assert_eq!(torques(&c), [500.0, 500.0, 0.0, 0.0]);

        c.set_drive_type(DriveType::Rwd);
        c.distribute_torque();
        assert_eq!(torques(&c), [0.0, 0.0, 500.0, 500.0]);

        c.set_drive_type(DriveType::Awd);
        c.distribute_torque();
        assert_eq!(torques(&c), [250.0; 4]);
    }

    #[test]
    fn brake_uses_drive_divisor_on_all_wheels() {
        let mut c = controller(ControllerConfig::default());
        c.read_input(ControlInput { brake: true, ..ControlInput::default() });

        c.distribute_torque();
        for p in WheelPosition::ALL {
            assert_eq!(c.wheel(p).brake_torque(), 1000.0);
        }

        c.set_drive_type(DriveType::Awd);
        c.distribute_torque();
        for p in WheelPosition::ALL {
            assert_eq!(c.wheel(p).brake_torque(), 500.0);
        }
    }

    #[test]
    fn wheelbase_comes_from_front_mounts() {
        let c = controller(ControllerConfig::default());
        assert!((c.wheelbase() - 2.6).abs() < 1e-6);
    }

    #[test]
    fn steering_eases_toward_ackermann_targets() {
        let mut c = controller(ControllerConfig {
            steer_input_multiplier: 20.0,
            steer_smoothing: 5.0,
            ..ControllerConfig::default()
        });
        let right = ControlInput { steer: 1.0, ..ControlInput::default() };

        c.on_frame(0.1, right);
        let target = ackermann_angles(20.0, 2.6);
        let fl = c.wheel(WheelPosition::FrontLeft).steer_angle();
        let fr = c.wheel(WheelPosition::FrontRight).steer_angle();
        assert!((fl - target.left * 0.5).abs() < 1e-4);
        assert!((fr - target.right * 0.5).abs() < 1e-4);
        assert_eq!(c.wheel(WheelPosition::BackLeft).steer_angle(), 0.0);

        for _ in 0..50 {
            c.on_frame(0.1, right);
        }
        assert!((c.wheel(WheelPosition::FrontLeft).steer_angle() - target.left).abs() < 1e-3);
    }

    #[test]
    fn non_finite_input_is_ignored() {
        let mut c = controller(ControllerConfig::default());
        c.read_input(ControlInput {
            steer: f32::NAN,
            throttle: f32::INFINITY,
            ..ControlInput::default()
        });
        assert_eq!(c.current_steer_angle(), 0.0);
        assert_eq!(c.current_motor_force(), 0.0);
    }

    #[test]
    fn steer_limit_depends_on_wheelbase() {
        let config = |max_steer_angle| ControllerConfig {
            max_steer_angle,
            ..ControllerConfig::default()
        };
        let wheels = || {
            [
                Vec3::new(-0.8, 0.0, 1.3),
                Vec3::new(0.8, 0.0, 1.3),
                Vec3::new(-0.8, 0.0, -1.3),
                Vec3::new(0.8, 0.0, -1.3),
            ]
            .map(|p| WheelModel::new(WheelConfig::default(), p).unwrap())
        };

        assert!(VehicleController::new(config(37.0), wheels()).is_ok());
        assert!(matches!(
            VehicleController::new(config(45.0), wheels()),
            Err(VehicleError::InvalidControllerConfig { field: "max_steer_angle", .. })
        ));
    }

    #[test]
    fn rejects_invalid_config() {
        let wheels = [Vec3::ZERO; 4].map(|p| WheelModel::new(WheelConfig::default(), p).unwrap());
        let config = ControllerConfig {
            max_steer_angle: 95.0,
            ..ControllerConfig::default()
        };
        assert!(matches!(
            VehicleController::new(config, wheels),
            Err(VehicleError::InvalidControllerConfig { field: "max_steer_angle", .. })
        ));
    }
}
