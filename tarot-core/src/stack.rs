//! Tap handling on top of the animation controller.

use tracing::{debug, warn};

use crate::animation::{AnimationController, AnimationPhase, SelectionCallbacks};
use crate::card::Card;
use crate::config::{AnimationConfig, LayoutConfig};
use crate::layout::{default_slot_positions, CardDimensions, SlotPosition, Viewport, SLOT_COUNT};

/// The fanned card stack of one reading.
///
/// A tap is only accepted when no card has been chosen this round and no
/// chosen card is still on its way to a slot.
#[derive(Debug)]
pub struct CardStack {
    controller: AnimationController,
    slots: [SlotPosition; SLOT_COUNT],
    is_card_selected: bool,
    animating_to_position: bool,
}

impl CardStack {
    /// Create a stack with default slots for `viewport`.
    #[must_use]
    pub fn new(
        config: AnimationConfig,
        layout: &LayoutConfig,
        viewport: Viewport,
        dims: CardDimensions,
    ) -> Self {
        Self::with_slots(config, default_slot_positions(viewport, dims, layout))
    }

    /// Create a stack with caller-supplied slots.
    #[must_use]
    pub fn with_slots(config: AnimationConfig, slots: [SlotPosition; SLOT_COUNT]) -> Self {
        Self {
            controller: AnimationController::with_config(config),
            slots,
            is_card_selected: false,
            animating_to_position: false,
        }
    }

    /// The animation controller driving the table.
    #[must_use]
    pub const fn controller(&self) -> &AnimationController {
        &self.controller
    }

    /// Slot targets, one per round.
    #[must_use]
    pub const fn slots(&self) -> &[SlotPosition; SLOT_COUNT] {
        &self.slots
    }

    /// Replace the slot targets, e.g. after a viewport change.
    pub fn set_slots(&mut self, slots: [SlotPosition; SLOT_COUNT]) {
        self.slots = slots;
    }

    /// Whether a card has been chosen in the current round.
    #[must_use]
    pub const fn is_card_selected(&self) -> bool {
        self.is_card_selected
    }

    /// Whether a chosen card is still moving to its slot.
    #[must_use]
    pub const fn animating_to_position(&self) -> bool {
        self.animating_to_position
    }

    /// Fan out `cards` for the next round.
    pub fn prepare_round(&mut self, cards: &[Card], session_started: bool, dims: CardDimensions) {
        self.is_card_selected = false;
        let spread = self.controller.config().spread_angle;
        self.controller
            .update_all_card_transforms(cards, session_started, spread, dims);
        self.animating_to_position = self.controller.is_selecting();
    }

    /// React to a tap on `card`.
    ///
    /// Returns `false` and leaves everything untouched if the tap is not
    /// accepted right now.
    pub fn handle_card_select(
        &mut self,
        card: &Card,
        all_cards: &[Card],
        current_round: usize,
        dims: CardDimensions,
        callbacks: SelectionCallbacks,
    ) -> bool {
        if card.is_selected || self.is_card_selected || self.animating_to_position {
            debug!(
                "Ignoring tap on {}: selected={} animating={}",
                card.id, self.is_card_selected, self.animating_to_position
            );
            return false;
        }
        if self.controller.phase() == AnimationPhase::Reset {
            debug!("Ignoring tap on {}: no cards on the table", card.id);
            return false;
        }

        match self.controller.animate_card_selection(
            card,
            all_cards,
            current_round,
            &self.slots,
            dims,
            callbacks,
        ) {
            Ok(()) => {
                self.is_card_selected = true;
                self.animating_to_position = true;
                true
            }
            Err(e) => {
                warn!("Selection of {} rejected: {e}", card.id);
                false
            }
        }
    }

    /// Move the clock forward by `dt_ms`.
    pub fn advance(&mut self, dt_ms: u64) {
        self.controller.advance(dt_ms);
        self.animating_to_position = self.controller.is_selecting();
    }

    /// Run every pending animation to its end.
    pub fn finish(&mut self) {
        self.controller.finish();
        self.animating_to_position = self.controller.is_selecting();
    }

    /// Clear the table and both selection guards.
    pub fn reset(&mut self) {
        self.controller.reset_animations();
        self.is_card_selected = false;
        self.animating_to_position = false;
    }
}
