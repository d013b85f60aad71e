//! Ackermann steering geometry and per-frame steering smoothing.
//!
//! Angles are in degrees throughout, matching the controller config.

/// Steering angles below this magnitude (degrees) count as driving straight.
pub const STRAIGHT_EPSILON: f32 = 1e-4;

/// Target yaw of the two front wheels, in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AckermannAngles {
    pub left: f32,
    pub right: f32,
}

/// Split one steering angle into left/right front wheel angles.
///
/// The turn radius is `|1 / tan(angle)|`; each wheel then aims at the turn
/// centre from half a wheelbase further out (left) or in (right), and both
/// take the sign of `steer_angle`. Near-zero angles return straight wheels
/// instead of dividing by a vanishing tangent.
#[must_use]
pub fn ackermann_angles(steer_angle: f32, wheelbase: f32) -> AckermannAngles {
    if !steer_angle.is_finite() || steer_angle.abs() < STRAIGHT_EPSILON {
        return AckermannAngles::default();
    }

    let turn_radius = (1.0 / steer_angle.to_radians().tan()).abs();
    let half_wheelbase = wheelbase / 2.0;
    let left = (wheelbase / (turn_radius + half_wheelbase)).atan().to_degrees();
    let right = (wheelbase / (turn_radius - half_wheelbase)).atan().to_degrees();

    let sign = steer_angle.signum();
    AckermannAngles {
        left: sign * left,
        right: sign * right,
    }
}

/// Largest steering angle, in degrees, for which [`ackermann_angles`] keeps
/// both wheels turning the same way. Past it the inner wheel's turn radius
/// `1 / tan(angle) - wheelbase / 2` goes negative and that wheel flips.
#[must_use]
pub fn max_steer_angle(wheelbase: f32) -> f32 {
    if wheelbase > 0.0 {
        (2.0 / wheelbase).atan().to_degrees()
    } else {
        90.0
    }
}

/// Move `current` toward `target` by `rate * dt`, clamped to `[0, 1]`.
#[must_use]
pub fn smooth_toward(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let t = (rate * dt).clamp(0.0, 1.0);
    current + (target - current) * t
}
