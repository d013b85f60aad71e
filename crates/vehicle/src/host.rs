//! # Host Capabilities
//!
//! The vehicle never integrates motion or casts rays itself. The surrounding
//! simulation hands it a rigid body and a ground query through the traits in
//! this module; wheels read velocity samples from the body and push forces
//! back into its accumulator.
//!
//! Axis convention: `+Z` is forward, `+Y` is up and `+X` is right, in the
//! body's local frame.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Rigid body owned by the host simulation.
///
/// Forces pushed through [`RigidBody::apply_force_at_point`] and
/// [`RigidBody::apply_force`] must be accumulated until the host integrates;
/// [`RigidBody::apply_impulse`] changes the velocity immediately.
pub trait RigidBody {
    fn position(&self) -> Vec3;
    fn rotation(&self) -> Quat;
    /// Linear velocity of the centre of mass.
    fn velocity(&self) -> Vec3;
    fn mass(&self) -> f32;
    /// Velocity of a world-space point rigidly attached to the body.
    fn velocity_at_point(&self, point: Vec3) -> Vec3;
    fn apply_force_at_point(&mut self, force: Vec3, point: Vec3);
    fn apply_force(&mut self, force: Vec3);
    fn apply_impulse(&mut self, impulse: Vec3);

    fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::Z
    }

    fn up(&self) -> Vec3 {
        self.rotation() * Vec3::Y
    }

    fn right(&self) -> Vec3 {
        self.rotation() * Vec3::X
    }

    /// Transform a point from the body's local frame into world space.
    fn local_to_world(&self, local: Vec3) -> Vec3 {
        self.position() + self.rotation() * local
    }
}

/// Ground raycast provided by the host.
pub trait GroundCaster {
    /// Distance from `origin` to the first surface hit along `direction`
    /// within `max_distance`, considering only surfaces on `layers`.
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<f32>;
}

/// 32-layer collision filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: Self = Self(u32::MAX);
    pub const NONE: Self = Self(0);

    /// Mask containing only layer `index`. Indices past 31 yield an empty mask.
    #[must_use]
    pub const fn layer(index: u32) -> Self {
        if index < 32 {
            Self(1 << index)
        } else {
            Self::NONE
        }
    }

    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_masks_filter_by_bit() {
        let ground = LayerMask::layer(3);
        assert!(LayerMask::ALL.intersects(ground));
        assert!(!LayerMask::NONE.intersects(ground));
        assert!(!LayerMask::layer(4).intersects(ground));
        assert!(LayerMask::layer(4).union(ground).intersects(ground));
        assert_eq!(LayerMask::layer(40), LayerMask::NONE);
    }
}
