//! # Scenarios
//!
//! A scenario bundles everything the headless host needs: the chassis body,
//! the ground plane, the vehicle description and a timed drive script that
//! plays the role of a driver.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use vehicle::{ControlInput, GroundPlane, LayerMask, SimpleBody, Vec3, VehicleSpec};

const BUILTIN_SCENARIO: &str = include_str!("../data/arcade.json");

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChassisSpec {
    pub mass: f32,
    pub half_extents: Vec3,
    pub spawn: Vec3,
}

impl ChassisSpec {
    #[must_use]
    pub fn spawn_body(&self) -> SimpleBody {
        SimpleBody::solid_box(self.spawn, self.mass, self.half_extents)
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct GroundSpec {
    pub height: f32,
    /// Collision layer index of the ground plane
    pub layer: u32,
}

impl GroundSpec {
    #[must_use]
    pub fn plane(&self) -> GroundPlane {
        GroundPlane::new(self.height, LayerMask::layer(self.layer))
    }
}

/// One stretch of constant driver input.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ScriptSegment {
    /// Seconds this input is held
    pub duration: f32,
    #[serde(flatten)]
    pub input: ControlInput,
}

/// Timed input playback. Past the last segment the driver lets go of
/// everything.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriveScript {
    pub segments: Vec<ScriptSegment>,
}

impl DriveScript {
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.segments.iter().map(|s| s.duration.max(0.0)).sum()
    }

    /// Input held at `time` seconds into the script.
    #[must_use]
    pub fn sample(&self, time: f32) -> ControlInput {
        let mut start = 0.0;
        for segment in &self.segments {
            let end = start + segment.duration.max(0.0);
            if time >= start && time < end {
                return segment.input;
            }
            start = end;
        }
        ControlInput::default()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub chassis: ChassisSpec,
    #[serde(default)]
    pub ground: GroundSpec,
    pub vehicle: VehicleSpec,
    #[serde(default)]
    pub script: DriveScript,
}

impl Scenario {
    /// The scenario shipped with the binary.
    pub fn builtin() -> Result<Self> {
        BUILTIN_SCENARIO.parse::<Self>().context("built-in scenario is malformed")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        json.parse::<Self>()
            .with_context(|| format!("failed to parse scenario {}", path.display()))
    }
}

impl FromStr for Scenario {
    type Err = anyhow::Error;

    fn from_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_scenario_builds() {
        let scenario = Scenario::builtin().unwrap();
        assert!(scenario.vehicle.build().is_ok());
        assert_eq!(scenario.script.segments.len(), 4);
        assert!((scenario.script.duration() - 7.0).abs() < 1e-6);
    }

    #[test]
    fn script_samples_by_time() {
        let script: DriveScript = serde_json::from_str(
            r#"[
                { "duration": 1.0, "throttle": 1.0 },
                { "duration": 0.5, "steer": -1.0, "brake": true }
            ]"#,
        )
        .unwrap();

        assert!((script.sample(0.0).throttle - 1.0).abs() < 1e-6);
        assert!((script.sample(0.99).throttle - 1.0).abs() < 1e-6);
        let turning = script.sample(1.2);
        assert!(turning.brake);
        assert!((turning.steer + 1.0).abs() < 1e-6);
        assert_eq!(turning.throttle, 0.0);
        assert_eq!(script.sample(1.5), ControlInput::default());
        assert_eq!(script.sample(-1.0), ControlInput::default());
    }
}
