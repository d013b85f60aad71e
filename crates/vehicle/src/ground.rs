//! Infinite horizontal ground plane answering wheel raycasts.

use glam::Vec3;

use crate::host::{GroundCaster, LayerMask};

const PARALLEL_EPSILON: f32 = 1e-6;

#[derive(Clone, Copy, Debug)]
pub struct GroundPlane {
    pub height: f32,
    pub layer: LayerMask,
}

impl GroundPlane {
    #[must_use]
    pub const fn new(height: f32, layer: LayerMask) -> Self {
        Self { height, layer }
    }
}

impl Default for GroundPlane {
    fn default() -> Self {
        Self::new(0.0, LayerMask::layer(0))
    }
}

impl GroundCaster for GroundPlane {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Option<f32> {
        if !layers.intersects(self.layer) {
            return None;
        }
        let direction = direction.normalize_or_zero();
        if direction.y.abs() < PARALLEL_EPSILON {
            return None;
        }

        let distance = (self.height - origin.y) / direction.y;
        (0.0..=max_distance).contains(&distance).then_some(distance)
    }
}
