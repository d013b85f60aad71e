//! # Vehicle Descriptions
//!
//! JSON description of a vehicle: controller tuning, a shared wheel config and
//! one entry per corner with its mount point and optional per-wheel
//! overrides. Every field falls back to the defaults of [`ControllerConfig`]
//! and [`WheelConfig`].
//!
//! ```json
//! {
//!   "controller": { "drive_type": "RWD", "motor_force": 1500.0 },
//!   "wheel_defaults": { "spring_strength": 4000.0, "spring_damper": 300.0 },
//!   "wheels": [
//!     { "corner": "front_left",  "position": [-0.8, 0.0,  1.3] },
//!     { "corner": "front_right", "position": [ 0.8, 0.0,  1.3] },
//!     { "corner": "back_left",   "position": [-0.8, 0.0, -1.3],
//!       "overrides": { "tire_grip_factor": 0.05 } },
//!     { "corner": "back_right",  "position": [ 0.8, 0.0, -1.3],
//!       "overrides": { "tire_grip_factor": 0.05 } }
//!   ]
//! }
//! ```

use std::path::Path;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::controller::{ControllerConfig, VehicleController};
use crate::curve::ResponseCurve;
use crate::error::VehicleError;
use crate::host::LayerMask;
use crate::wheel::{WheelConfig, WheelModel, WheelPosition};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpec {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub wheel_defaults: WheelConfig,
    pub wheels: Vec<WheelSpec>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WheelSpec {
    pub corner: WheelPosition,
    /// Mount point in the chassis frame
    pub position: Vec3,
    #[serde(default)]
    pub overrides: WheelOverrides,
}

/// Per-wheel replacements for fields of [`VehicleSpec::wheel_defaults`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelOverrides {
    pub mass: Option<f32>,
    pub radius: Option<f32>,
    pub max_speed: Option<f32>,
    pub tire_grip_factor: Option<f32>,
    pub suspension_rest_distance: Option<f32>,
    pub spring_strength: Option<f32>,
    pub spring_damper: Option<f32>,
    pub power_curve: Option<ResponseCurve>,
    pub ground_layers: Option<LayerMask>,
}

impl WheelOverrides {
    #[must_use]
    pub fn apply(&self, base: &WheelConfig) -> WheelConfig {
        WheelConfig {
            mass: self.mass.unwrap_or(base.mass),
            radius: self.radius.unwrap_or(base.radius),
            max_speed: self.max_speed.unwrap_or(base.max_speed),
            tire_grip_factor: self.tire_grip_factor.unwrap_or(base.tire_grip_factor),
            suspension_rest_distance: self
                .suspension_rest_distance
                .unwrap_or(base.suspension_rest_distance),
            spring_strength: self.spring_strength.unwrap_or(base.spring_strength),
            spring_damper: self.spring_damper.unwrap_or(base.spring_damper),
            power_curve: self
                .power_curve
                .clone()
                .unwrap_or_else(|| base.power_curve.clone()),
            ground_layers: self.ground_layers.unwrap_or(base.ground_layers),
        }
    }
}

impl VehicleSpec {
    /// Symmetric layout: wheels at `(±half_track, 0, ±half_wheelbase)`.
    #[must_use]
    pub fn symmetric(half_track: f32, half_wheelbase: f32) -> Self {
        let wheels = WheelPosition::ALL
            .iter()
            .map(|&corner| {
                let x = match corner {
                    WheelPosition::FrontLeft | WheelPosition::BackLeft => -half_track,
                    WheelPosition::FrontRight | WheelPosition::BackRight => half_track,
                };
                let z = if corner.is_front() {
                    half_wheelbase
                } else {
                    -half_wheelbase
                };
                WheelSpec {
                    corner,
                    position: Vec3::new(x, 0.0, z),
                    overrides: WheelOverrides::default(),
                }
            })
            .collect();
        Self {
            controller: ControllerConfig::default(),
            wheel_defaults: WheelConfig::default(),
            wheels,
        }
    }

    /// # Errors
    ///
    /// Returns [`VehicleError::Io`] if the file cannot be read and
    /// [`VehicleError::Parse`] if it is not a valid description.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, VehicleError> {
        let json = std::fs::read_to_string(path)?;
        json.parse()
    }

    /// # Errors
    ///
    /// Returns [`VehicleError::Parse`] if serialization fails.
    pub fn to_json(&self) -> Result<String, VehicleError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Resolved config for one corner.
    #[must_use]
    pub fn wheel_config(&self, wheel: &WheelSpec) -> WheelConfig {
        wheel.overrides.apply(&self.wheel_defaults)
    }

    /// Validate the description and build a controller.
    ///
    /// # Errors
    ///
    /// Fails when a corner is missing or repeated, or when any wheel or the
    /// controller config is out of range.
    pub fn build(&self) -> Result<VehicleController, VehicleError> {
        let mut slots: [Option<WheelModel>; 4] = Default::default();
        for spec in &self.wheels {
            let slot = &mut slots[spec.corner.index()];
            if slot.is_some() {
                return Err(VehicleError::DuplicateWheel(spec.corner));
            }
            *slot = Some(WheelModel::new(self.wheel_config(spec), spec.position)?);
        }

        let [fl, fr, bl, br] = slots;
        let take =
            |slot: Option<WheelModel>, corner| slot.ok_or(VehicleError::MissingWheel(corner));
        let wheels = [
            take(fl, WheelPosition::FrontLeft)?,
            take(fr, WheelPosition::FrontRight)?,
            take(bl, WheelPosition::BackLeft)?,
            take(br, WheelPosition::BackRight)?,
        ];
        VehicleController::new(self.controller.clone(), wheels)
    }
}

impl Default for VehicleSpec {
    fn default() -> Self {
        Self::symmetric(0.8, 1.3)
    }
}

impl FromStr for VehicleSpec {
    type Err = VehicleError;

    fn from_str(json: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(json)?)
    }
}
