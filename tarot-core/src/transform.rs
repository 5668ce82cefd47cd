//! Animatable card poses.

use serde::{Deserialize, Serialize};

/// Values that can be blended between two endpoints.
pub trait Interpolate: Clone {
    /// Blend from `self` towards `to`; `t` runs from 0.0 to 1.0.
    #[must_use]
    fn interpolate(&self, to: &Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

/// Pose of a single card.
///
/// Translation is the offset of the card's top-left corner from the
/// container centre, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTransform {
    /// Horizontal offset in pixels.
    pub translate_x: f32,
    /// Vertical offset in pixels.
    pub translate_y: f32,
    /// Rotation in degrees.
    pub rotate: f32,
    /// Uniform scale; 0 collapses the card.
    pub scale: f32,
    /// Opacity from 0.0 to 1.0.
    pub opacity: f32,
    /// Stacking order.
    pub z_index: i32,
}

impl Default for CardTransform {
    fn default() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            rotate: 0.0,
            scale: 1.0,
            opacity: 1.0,
            z_index: 0,
        }
    }
}

impl CardTransform {
    /// Copy of this pose with a different opacity.
    #[must_use]
    pub fn with_opacity(self, opacity: f32) -> Self {
        Self { opacity, ..self }
    }
}

impl Interpolate for CardTransform {
    /// Stacking order is not blended; it switches to the target immediately.
    fn interpolate(&self, to: &Self, t: f32) -> Self {
        Self {
            translate_x: self.translate_x.interpolate(&to.translate_x, t),
            translate_y: self.translate_y.interpolate(&to.translate_y, t),
            rotate: self.rotate.interpolate(&to.rotate, t),
            scale: self.scale.interpolate(&to.scale, t),
            opacity: self.opacity.interpolate(&to.opacity, t),
            z_index: to.z_index,
        }
    }
}
