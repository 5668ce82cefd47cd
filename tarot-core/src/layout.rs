//! Card sizing, fan geometry and slot placement.
//!
//! All positions are offsets from the container centre. Poses describe the
//! card's top-left corner, so every target point is recentred by half the
//! card size before it is written into a [`CardTransform`].

use serde::{Deserialize, Serialize};

use crate::config::{AnimationConfig, LayoutConfig};
use crate::transform::CardTransform;

/// Height-to-width ratio of every card.
pub const CARD_ASPECT_RATIO: f32 = 1.6;

/// Number of slots in a three-card reading.
pub const SLOT_COUNT: usize = 3;

/// Size of the rendering surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Viewport {
    /// Create a viewport of the given size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(400.0, 800.0)
    }
}

/// Rendered size of a card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardDimensions {
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl CardDimensions {
    /// Dimensions for a card of the given width at the fixed aspect ratio.
    #[must_use]
    pub fn from_width(width: f32) -> Self {
        Self {
            width,
            height: width * CARD_ASPECT_RATIO,
        }
    }

    /// Turn a centre point into the top-left offset of a card of this size.
    #[must_use]
    pub fn recenter(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.width / 2.0, y - self.height / 2.0)
    }
}

/// Target position of the card drawn in a given round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotPosition {
    /// Horizontal centre offset in pixels.
    pub x: f32,
    /// Vertical centre offset in pixels.
    pub y: f32,
}

impl SlotPosition {
    /// Create a slot at the given centre offset.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Card size for a viewport width. Wide viewports get larger cards.
#[must_use]
pub fn card_dimensions(viewport_width: f32, layout: &LayoutConfig) -> CardDimensions {
    let width = if viewport_width >= layout.wide_breakpoint {
        layout.wide_card_width
    } else {
        layout.narrow_card_width
    };
    CardDimensions::from_width(width)
}

/// Evenly spaced slot row above the centre of the viewport.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn default_slot_positions(
    viewport: Viewport,
    dims: CardDimensions,
    layout: &LayoutConfig,
) -> [SlotPosition; SLOT_COUNT] {
    let step = dims.width + layout.slot_gap;
    let y = -viewport.height * layout.slot_row_offset;
    std::array::from_fn(|i| SlotPosition::new((i as f32 - 1.0) * step, y))
}

/// Angle in degrees of the card at `index` in a fan of `count` cards.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn fan_angle(index: usize, count: usize, spread_angle: f32) -> f32 {
    if count <= 1 {
        return 0.0;
    }
    -spread_angle / 2.0 + (spread_angle / (count - 1) as f32) * index as f32
}

/// Stacking order of the card at `index`: earlier cards sit on top.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn fan_z_index(index: usize, count: usize) -> i32 {
    count.saturating_sub(index) as i32
}

/// Fully overlapping pose every card takes before the fan-out starts.
#[must_use]
pub fn stacked_pose(index: usize, count: usize, dims: CardDimensions) -> CardTransform {
    let (translate_x, translate_y) = dims.recenter(0.0, 0.0);
    CardTransform {
        translate_x,
        translate_y,
        rotate: 0.0,
        scale: 1.0,
        opacity: 1.0,
        z_index: fan_z_index(index, count),
    }
}

/// Resting pose of the card at `index` on the fan arc.
#[must_use]
pub fn fan_pose(
    index: usize,
    count: usize,
    spread_angle: f32,
    dims: CardDimensions,
    animation: &AnimationConfig,
) -> CardTransform {
    let angle = fan_angle(index, count, spread_angle);
    let radius = dims.width * animation.radius_factor;
    let radians = angle.to_radians();

    let x = radius * radians.sin();
    let y = -radius * radians.cos() + radius * animation.vertical_bias;
    let (translate_x, translate_y) = dims.recenter(x, y);

    CardTransform {
        translate_x,
        translate_y,
        rotate: angle,
        scale: 1.0,
        opacity: 1.0,
        z_index: fan_z_index(index, count),
    }
}

/// Pose of a chosen card resting in its slot.
#[must_use]
pub fn slot_pose(
    slot: SlotPosition,
    dims: CardDimensions,
    z_index: i32,
    animation: &AnimationConfig,
) -> CardTransform {
    let (translate_x, translate_y) = dims.recenter(slot.x, slot.y);
    CardTransform {
        translate_x,
        translate_y,
        rotate: 0.0,
        scale: animation.settled_scale,
        opacity: 1.0,
        z_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-3;

    #[test]
    fn test_fan_angles_spread_evenly() {
        assert!((fan_angle(0, 3, 60.0) + 30.0).abs() < EPS);
        assert!(fan_angle(1, 3, 60.0).abs() < EPS);
        assert!((fan_angle(2, 3, 60.0) - 30.0).abs() < EPS);
        assert!(fan_angle(0, 1, 60.0).abs() < EPS);
        assert!(fan_angle(0, 0, 60.0).abs() < EPS);
    }

    #[test]
    fn test_middle_card_pose() {
        let dims = CardDimensions::from_width(100.0);
        let pose = fan_pose(1, 3, 60.0, dims, &AnimationConfig::default());

        // radius 150: x = 0 - 50, y = -150 + 90 - 80
        assert!((pose.translate_x + 50.0).abs() < EPS);
        assert!((pose.translate_y + 140.0).abs() < EPS);
        assert!(pose.rotate.abs() < EPS);
        assert_eq!(pose.z_index, 2);
    }

    #[test]
    fn test_outer_cards_mirror() {
        let dims = CardDimensions::from_width(100.0);
        let config = AnimationConfig::default();
        let left = fan_pose(0, 3, 60.0, dims, &config);
        let right = fan_pose(2, 3, 60.0, dims, &config);

        assert!((left.translate_x + 50.0 + 75.0).abs() < EPS);
        assert!((right.translate_x + 50.0 - 75.0).abs() < EPS);
        assert!((left.translate_y - right.translate_y).abs() < EPS);
        assert!((left.rotate + right.rotate).abs() < EPS);
        assert!(left.z_index > right.z_index);
    }

    #[test]
    fn test_card_dimensions_follow_breakpoint() {
        let layout = LayoutConfig::default();
        let narrow = card_dimensions(400.0, &layout);
        let wide = card_dimensions(1024.0, &layout);

        assert!((narrow.width - 100.0).abs() < EPS);
        assert!((narrow.height - 160.0).abs() < EPS);
        assert!(wide.width > narrow.width);
        assert!((wide.height / wide.width - CARD_ASPECT_RATIO).abs() < EPS);
    }

    #[test]
    fn test_default_slots_are_centred() {
        let layout = LayoutConfig::default();
        let dims = CardDimensions::from_width(100.0);
        let slots = default_slot_positions(Viewport::default(), dims, &layout);

        assert!((slots[0].x + 116.0).abs() < EPS);
        assert!(slots[1].x.abs() < EPS);
        assert!((slots[2].x - 116.0).abs() < EPS);
        assert!(slots.iter().all(|s| (s.y + 200.0).abs() < EPS));
    }

    #[test]
    fn test_slot_pose_recentres() {
        let dims = CardDimensions::from_width(100.0);
        let pose = slot_pose(
            SlotPosition::new(200.0, 120.0),
            dims,
            10,
            &AnimationConfig::default(),
        );
        assert!((pose.translate_x - 150.0).abs() < EPS);
        assert!((pose.translate_y - 40.0).abs() < EPS);
        assert!((pose.scale - 0.9).abs() < EPS);
    }
}
