//! Keyframed response curve mapping normalized speed to a torque multiplier.

use serde::{Deserialize, Serialize};

use crate::error::VehicleError;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
}

impl Keyframe {
    #[must_use]
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

/// Piecewise-linear curve over strictly increasing keyframe times.
///
/// Sampling before the first key or after the last returns the end value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Keyframe>", into = "Vec<Keyframe>")]
pub struct ResponseCurve {
    keys: Vec<Keyframe>,
}

impl ResponseCurve {
    /// # Errors
    ///
    /// Returns [`VehicleError::InvalidCurve`] when `keys` is empty, holds a
    /// non-finite entry or its times are not strictly increasing.
    pub fn new(keys: Vec<Keyframe>) -> Result<Self, VehicleError> {
        if keys.is_empty() {
            return Err(VehicleError::InvalidCurve("curve needs at least one key"));
        }
        if keys
            .iter()
            .any(|k| !k.time.is_finite() || !k.value.is_finite())
        {
            return Err(VehicleError::InvalidCurve("keys must be finite"));
        }
        if keys.windows(2).any(|w| w[1].time <= w[0].time) {
            return Err(VehicleError::InvalidCurve(
                "key times must be strictly increasing",
            ));
        }
        Ok(Self { keys })
    }

    /// Flat curve: every sample returns `value`.
    #[must_use]
    pub fn constant(value: f32) -> Self {
        Self {
            keys: vec![Keyframe::new(0.0, value)],
        }
    }

    /// Straight line from `start` at 0 to `end` at 1.
    #[must_use]
    pub fn linear(start: f32, end: f32) -> Self {
        Self {
            keys: vec![Keyframe::new(0.0, start), Keyframe::new(1.0, end)],
        }
    }

    #[must_use]
    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    #[must_use]
    pub fn evaluate(&self, t: f32) -> f32 {
        let first = self.keys[0];
        let last = self.keys[self.keys.len() - 1];
        if t.is_nan() || t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // first.time < t < last.time, so 1 <= upper < len
        let upper = self.keys.partition_point(|k| k.time <= t);
        let a = self.keys[upper - 1];
        let b = self.keys[upper];
        let s = (t - a.time) / (b.time - a.time);
        a.value + (b.value - a.value) * s
    }
}

impl Default for ResponseCurve {
    fn default() -> Self {
        Self::constant(1.0)
    }
}

impl TryFrom<Vec<Keyframe>> for ResponseCurve {
    type Error = VehicleError;

    fn try_from(keys: Vec<Keyframe>) -> Result<Self, Self::Error> {
        Self::new(keys)
    }
}

impl From<ResponseCurve> for Vec<Keyframe> {
    fn from(curve: ResponseCurve) -> Self {
        curve.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn interpolates_between_keys() {
        let curve = ResponseCurve::new(vec![
            Keyframe::new(0.0, 1.0),
            Keyframe::new(0.5, 0.8),
            Keyframe::new(1.0, 0.0),
        ])
        .unwrap();

        assert!(approx(curve.evaluate(0.25), 0.9));
        assert!(approx(curve.evaluate(0.5), 0.8));
        assert!(approx(curve.evaluate(0.75), 0.4));
    }

    #[test]
    fn clamps_outside_key_range() {
        let curve = ResponseCurve::linear(1.0, 0.25);
        assert!(approx(curve.evaluate(-3.0), 1.0));
        assert!(approx(curve.evaluate(7.0), 0.25));
        assert!(approx(curve.evaluate(f32::NAN), 1.0));
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(ResponseCurve::new(vec![]).is_err());
        assert!(ResponseCurve::new(vec![Keyframe::new(0.0, f32::INFINITY)]).is_err());
        let repeated = vec![Keyframe::new(0.5, 1.0), Keyframe::new(0.5, 0.0)];
        assert!(ResponseCurve::new(repeated).is_err());
    }

    #[test]
    fn deserializes_from_key_list() {
        let curve: ResponseCurve =
            serde_json::from_str(r#"[{"time":0.0,"value":1.0},{"time":1.0,"value":0.5}]"#)
                .unwrap();
        assert!(approx(curve.evaluate(0.5), 0.75));

        let unsorted = serde_json::from_str::<ResponseCurve>(
            r#"[{"time":1.0,"value":1.0},{"time":0.0,"value":0.5}]"#,
        );
        assert!(unsorted.is_err());
    }
}
