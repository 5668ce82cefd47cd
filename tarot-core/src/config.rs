//! Tunables for layout and choreography.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::TarotResult;

/// Timing and geometry of the fan and selection animations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Pause between the stacked pose and the start of the fan-out.
    pub fan_delay_ms: u64,
    /// Duration of the fan-out tween.
    pub fan_duration_ms: u64,
    /// Duration of the sibling fade-out when a card is chosen.
    pub fade_duration_ms: u64,
    /// Duration of the move into the round's slot.
    pub position_duration_ms: u64,
    /// Duration of the instruction hint fade-in.
    pub instruction_fade_ms: u64,
    /// Total fan spread in degrees.
    pub spread_angle: f32,
    /// Fan radius as a multiple of the card width.
    pub radius_factor: f32,
    /// Vertical lift of the arc as a multiple of the radius.
    pub vertical_bias: f32,
    /// Scale of a card resting in its slot.
    pub settled_scale: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            fan_delay_ms: 300,
            fan_duration_ms: 600,
            fade_duration_ms: 250,
            position_duration_ms: 500,
            instruction_fade_ms: 300,
            spread_angle: 60.0,
            radius_factor: 1.5,
            vertical_bias: 0.6,
            settled_scale: 0.9,
        }
    }
}

/// Card sizing and slot placement relative to the viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Viewport width from which the wide card size applies.
    pub wide_breakpoint: f32,
    /// Card width on narrow viewports.
    pub narrow_card_width: f32,
    /// Card width on wide viewports.
    pub wide_card_width: f32,
    /// Horizontal gap between drawn-card slots.
    pub slot_gap: f32,
    /// Slot row offset from the centre, as a fraction of viewport height.
    pub slot_row_offset: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            wide_breakpoint: 768.0,
            narrow_card_width: 100.0,
            wide_card_width: 150.0,
            slot_gap: 16.0,
            slot_row_offset: 0.25,
        }
    }
}

/// Complete configuration of the tarot core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TarotConfig {
    /// Animation tunables.
    pub animation: AnimationConfig,
    /// Layout tunables.
    pub layout: LayoutConfig,
}

impl TarotConfig {
    /// Parse a configuration from JSON. Missing fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> TarotResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> TarotResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(crate::store::StoreError::from)?;
        Self::from_json(&raw)
    }
}
