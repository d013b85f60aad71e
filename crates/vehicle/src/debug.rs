//! Read-only snapshots for debug overlays and logging.

use glam::{Quat, Vec3};

use crate::wheel::{WheelForces, WheelPosition};

/// Wheel state after the last fixed step.
#[derive(Clone, Copy, Debug)]
pub struct WheelDebugInfo {
    pub position: WheelPosition,
    pub anchor: Vec3,
    /// Chassis rotation including steering yaw
    pub rotation: Quat,
    pub radius: f32,
    pub grounded: bool,
    pub hit_distance: Option<f32>,
    pub steer_angle: f32,
    pub motor_torque: f32,
    pub brake_torque: f32,
    pub forces: WheelForces,
}

impl WheelDebugInfo {
    /// Points around the wheel rim in its rolling plane, closed at the end.
    #[must_use]
    pub fn outline(&self, resolution: usize) -> Vec<Vec3> {
        let resolution = resolution.max(3);
        (0..=resolution)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let angle = i as f32 * std::f32::consts::TAU / resolution as f32;
                let local = Vec3::new(0.0, angle.sin(), angle.cos()) * self.radius;
                self.anchor + self.rotation * local
            })
            .collect()
    }

    /// Segment from the anchor along the last lateral grip force.
    #[must_use]
    pub fn sideways_force_line(&self) -> (Vec3, Vec3) {
        (self.anchor, self.anchor + self.forces.sideways)
    }
}

/// Whole-vehicle snapshot, see [`crate::VehicleController::debug_info`].
#[derive(Clone, Copy, Debug)]
pub struct VehicleDebugInfo {
    pub wheels: [WheelDebugInfo; 4],
    pub speed: f32,
    pub forward_speed: f32,
    pub steer_angle: f32,
    pub downforce: Vec3,
    pub boost_impulse: Vec3,
}

impl VehicleDebugInfo {
    #[must_use]
    pub fn grounded_wheels(&self) -> usize {
        self.wheels.iter().filter(|w| w.grounded).count()
    }

    /// Sum of all wheel forces from the last fixed step.
    #[must_use]
    pub fn total_wheel_force(&self) -> Vec3 {
        self.wheels.iter().map(|w| w.forces.total()).sum()
    }
}
