//! # Fan and Selection Choreography
//!
//! Turns discrete reading events into timed pose changes for every card on
//! the table. The controller owns a clock, a pose per card, the opacity of
//! the "tap a card" hint, and a queue of timers. Time only moves when the
//! host calls [`AnimationController::advance`].
//!
//! ```text
//!  Reset ──update(started)──▶ Stacked ──fan delay──▶ Fanned
//!    ▲                                                 │
//!    │                                    animate_card_selection
//!    │                                                 ▼
//!    └──── reset_animations ◀── Settled ◀── positioning ◀── Selecting (fade)
//! ```
//!
//! Every write is an absolute target, and every timer is stamped with the
//! epoch it was scheduled in. [`AnimationController::reset_animations`] bumps
//! the epoch, so a timer that outlives its session is discarded instead of
//! touching the next one.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::card::{Card, CardId};
use crate::config::AnimationConfig;
use crate::layout::{fan_pose, slot_pose, stacked_pose, CardDimensions, SlotPosition};
use crate::timeline::{Animated, Easing};
use crate::transform::CardTransform;
use crate::{TarotError, TarotResult};

/// Stacking order of a card travelling to or resting in its slot.
const SLOT_Z_INDEX: i32 = 100;

/// Fired once the chosen card has reached its slot.
pub type PositionedCallback = Box<dyn FnOnce()>;

/// Fired with the finalized card once the selection animation is over.
pub type CompleteCallback = Box<dyn FnOnce(Card)>;

/// Callbacks of a single selection animation.
pub struct SelectionCallbacks {
    /// Lets the host reveal its detail overlay.
    pub on_card_positioned: Option<PositionedCallback>,
    /// Receives the chosen card, face up and selected.
    pub on_complete: CompleteCallback,
}

impl SelectionCallbacks {
    /// Callbacks with only a completion handler.
    #[must_use]
    pub fn new(on_complete: impl FnOnce(Card) + 'static) -> Self {
        Self {
            on_card_positioned: None,
            on_complete: Box::new(on_complete),
        }
    }

    /// Add a handler that fires right before `on_complete`.
    #[must_use]
    pub fn on_card_positioned(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_card_positioned = Some(Box::new(callback));
        self
    }

    fn fire(self, card: Card) {
        if let Some(positioned) = self.on_card_positioned {
            positioned();
        }
        (self.on_complete)(card);
    }
}

impl std::fmt::Debug for SelectionCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionCallbacks")
            .field("on_card_positioned", &self.on_card_positioned.is_some())
            .finish_non_exhaustive()
    }
}

/// Where the card set is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationPhase {
    /// No poses, hint hidden.
    Reset,
    /// Cards fully overlap, waiting for the fan-out.
    Stacked,
    /// Cards spread along the arc (or travelling there).
    Fanned,
    /// A chosen card is on its way to its slot.
    Selecting,
    /// The chosen card rests in its slot.
    Settled,
}

#[derive(Debug, Clone)]
enum TimerAction {
    FanOut {
        cards: Vec<CardId>,
        spread_angle: f32,
        dims: CardDimensions,
    },
}

#[derive(Debug, Clone)]
struct Timer {
    fire_at: u64,
    epoch: u64,
    action: TimerAction,
}

#[derive(Debug, Clone, Copy)]
enum FlightStage {
    FadingSiblings { until_ms: u64 },
    Positioning { until_ms: u64 },
}

impl FlightStage {
    const fn until_ms(self) -> u64 {
        match self {
            Self::FadingSiblings { until_ms } | Self::Positioning { until_ms } => until_ms,
        }
    }
}

#[derive(Debug)]
struct SelectionFlight {
    card: Card,
    target: CardTransform,
    stage: FlightStage,
    callbacks: SelectionCallbacks,
}

/// Drives every card pose and the instruction hint over time.
#[derive(Debug)]
pub struct AnimationController {
    config: AnimationConfig,
    now_ms: u64,
    epoch: u64,
    phase: AnimationPhase,
    transforms: BTreeMap<CardId, Animated<CardTransform>>,
    settled: BTreeSet<CardId>,
    instruction: Animated<f32>,
    timers: Vec<Timer>,
    flight: Option<SelectionFlight>,
}

impl AnimationController {
    /// Create a controller with default timings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(AnimationConfig::default())
    }

    /// Create a controller with custom timings.
    #[must_use]
    pub fn with_config(config: AnimationConfig) -> Self {
        Self {
            config,
            now_ms: 0,
            epoch: 0,
            phase: AnimationPhase::Reset,
            transforms: BTreeMap::new(),
            settled: BTreeSet::new(),
            instruction: Animated::new(0.0),
            timers: Vec::new(),
            flight: None,
        }
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Current clock time in milliseconds.
    #[must_use]
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> AnimationPhase {
        self.phase
    }

    /// Whether a chosen card is still travelling to its slot.
    #[must_use]
    pub fn is_selecting(&self) -> bool {
        self.flight.is_some()
    }

    /// Whether nothing is scheduled or moving.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.timers.is_empty()
            && self.flight.is_none()
            && !self.instruction.is_animating(self.now_ms)
            && self
                .transforms
                .values()
                .all(|pose| !pose.is_animating(self.now_ms))
    }

    /// Pose of a card at the current clock time.
    #[must_use]
    pub fn transform(&self, id: &CardId) -> Option<CardTransform> {
        self.transforms.get(id).map(|pose| pose.value_at(self.now_ms))
    }

    /// Pose a card is heading to.
    #[must_use]
    pub fn target_transform(&self, id: &CardId) -> Option<CardTransform> {
        self.transforms.get(id).map(|pose| *pose.target())
    }

    /// Poses of every card on the table at the current clock time.
    #[must_use]
    pub fn transforms(&self) -> BTreeMap<CardId, CardTransform> {
        self.transforms
            .iter()
            .map(|(id, pose)| (id.clone(), pose.value_at(self.now_ms)))
            .collect()
    }

    /// Opacity of the instruction hint at the current clock time.
    #[must_use]
    pub fn instruction_opacity(&self) -> f32 {
        self.instruction.value_at(self.now_ms)
    }

    /// Hide the hint and drop every pose, timer and selection in flight.
    ///
    /// Calling this twice leaves the same state as calling it once.
    pub fn reset_animations(&mut self) {
        self.instruction.set_immediate(0.0);
        self.transforms.clear();
        self.settled.clear();
        self.supersede();
        self.phase = AnimationPhase::Reset;
    }

    /// Lay out `cards` for a new round.
    ///
    /// Without a started session only the hint is hidden and the table is
    /// cleared. Otherwise the cards snap into a stack and, after the fan
    /// delay, spread along the arc while the hint fades in. Cards already
    /// resting in a slot keep their pose.
    pub fn update_all_card_transforms(
        &mut self,
        cards: &[Card],
        session_started: bool,
        spread_angle: f32,
        dims: CardDimensions,
    ) {
        if !session_started {
            self.reset_animations();
            return;
        }

        self.supersede();
        self.instruction.set_immediate(0.0);

        let settled = &self.settled;
        self.transforms.retain(|id, _| settled.contains(id));

        let count = cards.len();
        for (index, card) in cards.iter().enumerate() {
            self.settled.remove(&card.id);
            self.transforms
                .insert(card.id.clone(), Animated::new(stacked_pose(index, count, dims)));
        }

        self.timers.push(Timer {
            fire_at: self.now_ms.saturating_add(self.config.fan_delay_ms),
            epoch: self.epoch,
            action: TimerAction::FanOut {
                cards: cards.iter().map(|card| card.id.clone()).collect(),
                spread_angle,
                dims,
            },
        });
        self.phase = AnimationPhase::Stacked;
        debug!("Stacked {count} cards, fan-out in {}ms", self.config.fan_delay_ms);
    }

    /// Move `selected` into the slot of `current_round`.
    ///
    /// A fan-out that has not started yet is cancelled. Siblings and the
    /// hint fade out together; once the slowest of them is done, the chosen
    /// card travels to its slot. When it arrives,
    /// `on_card_positioned` and then `on_complete` fire, once each.
    ///
    /// # Errors
    ///
    /// Returns [`TarotError::InvalidSlot`] if no slot is reserved for
    /// `current_round`.
    pub fn animate_card_selection(
        &mut self,
        selected: &Card,
        all_cards: &[Card],
        current_round: usize,
        drawn_slot_positions: &[SlotPosition],
        dims: CardDimensions,
        callbacks: SelectionCallbacks,
    ) -> TarotResult<()> {
        let slot = drawn_slot_positions
            .get(current_round)
            .copied()
            .ok_or(TarotError::InvalidSlot(current_round))?;

        if let Some(previous) = self.flight.take() {
            debug!("Dropping unfinished selection of {}", previous.card.id);
        }
        // A fan-out still pending would bring the siblings and the hint back.
        if !self.timers.is_empty() {
            debug!("Cancelling {} pending timers for selection", self.timers.len());
            self.timers.clear();
        }

        let now = self.now_ms;
        let fade = self.config.fade_duration_ms;
        let mut until_ms = now;

        for card in all_cards.iter().filter(|card| card.id != selected.id) {
            if let Some(pose) = self.transforms.get_mut(&card.id) {
                let faded = pose.value_at(now).with_opacity(0.0);
                pose.set_target(faded, now, fade, Easing::Linear);
                until_ms = until_ms.max(pose.busy_until().unwrap_or(now));
            }
        }
        self.instruction.set_target(0.0, now, fade, Easing::Linear);
        until_ms = until_ms.max(self.instruction.busy_until().unwrap_or(now));

        self.transforms.entry(selected.id.clone()).or_default();

        self.flight = Some(SelectionFlight {
            card: selected.clone(),
            target: slot_pose(slot, dims, SLOT_Z_INDEX, &self.config),
            stage: FlightStage::FadingSiblings { until_ms },
            callbacks,
        });
        self.phase = AnimationPhase::Selecting;
        debug!("Selecting {} for round {current_round}", selected.id);
        Ok(())
    }

    /// Move the clock forward by `dt_ms`.
    pub fn advance(&mut self, dt_ms: u64) {
        self.advance_to(self.now_ms.saturating_add(dt_ms));
    }

    /// Move the clock to `target_ms`, firing timers and phase changes in order.
    ///
    /// Moving backwards is ignored.
    pub fn advance_to(&mut self, target_ms: u64) {
        while let Some(at) = self.next_event_at().filter(|&at| at <= target_ms) {
            self.now_ms = self.now_ms.max(at);
            self.fire_due();
        }
        self.now_ms = self.now_ms.max(target_ms);
        self.settle();
    }

    /// Run the clock until nothing is scheduled or moving.
    pub fn finish(&mut self) {
        while let Some(at) = self.next_event_at() {
            self.advance_to(at);
        }
        let last = self
            .transforms
            .values()
            .filter_map(Animated::busy_until)
            .chain(self.instruction.busy_until())
            .max();
        if let Some(last) = last {
            self.advance_to(last);
        }
    }

    fn next_event_at(&self) -> Option<u64> {
        self.timers
            .iter()
            .map(|timer| timer.fire_at)
            .chain(self.flight.as_ref().map(|flight| flight.stage.until_ms()))
            .min()
    }

    fn fire_due(&mut self) {
        let now = self.now_ms;
        let (due, pending): (Vec<_>, Vec<_>) =
            self.timers.drain(..).partition(|timer| timer.fire_at <= now);
        self.timers = pending;

        for timer in due {
            if timer.epoch != self.epoch {
                debug!("Discarding stale timer from epoch {}", timer.epoch);
                continue;
            }
            self.run_timer(timer.action);
        }

        if self
            .flight
            .as_ref()
            .is_some_and(|flight| flight.stage.until_ms() <= now)
        {
            self.step_flight();
        }
    }

    fn run_timer(&mut self, action: TimerAction) {
        let now = self.now_ms;
        match action {
            TimerAction::FanOut {
                cards,
                spread_angle,
                dims,
            } => {
                let count = cards.len();
                for (index, id) in cards.iter().enumerate() {
                    if let Some(pose) = self.transforms.get_mut(id) {
                        let target = fan_pose(index, count, spread_angle, dims, &self.config);
                        pose.set_target(
                            target,
                            now,
                            self.config.fan_duration_ms,
                            Easing::EaseOutCubic,
                        );
                    }
                }
                self.instruction.set_target(
                    1.0,
                    now,
                    self.config.instruction_fade_ms,
                    Easing::Linear,
                );
                self.phase = AnimationPhase::Fanned;
                debug!("Fanning out {count} cards");
            }
        }
    }

    fn step_flight(&mut self) {
        let Some(mut flight) = self.flight.take() else {
            return;
        };
        let now = self.now_ms;

        match flight.stage {
            FlightStage::FadingSiblings { .. } => {
                let duration = self.config.position_duration_ms;
                if let Some(pose) = self.transforms.get_mut(&flight.card.id) {
                    pose.set_target(flight.target, now, duration, Easing::EaseInOutCubic);
                }
                flight.stage = FlightStage::Positioning {
                    until_ms: now.saturating_add(duration),
                };
                self.flight = Some(flight);
            }
            FlightStage::Positioning { .. } => {
                if let Some(pose) = self.transforms.get_mut(&flight.card.id) {
                    pose.set_immediate(flight.target);
                }
                self.settled.insert(flight.card.id.clone());
                self.phase = AnimationPhase::Settled;
                debug!("Card {} reached its slot", flight.card.id);

                let card = flight.card.revealed().selected();
                flight.callbacks.fire(card);
            }
        }
    }

    fn settle(&mut self) {
        let now = self.now_ms;
        self.instruction.settle(now);
        for pose in self.transforms.values_mut() {
            pose.settle(now);
        }
    }

    fn supersede(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.timers.clear();
        if let Some(flight) = self.flight.take() {
            debug!("Selection of {} superseded", flight.card.id);
        }
    }
}

impl Default for AnimationController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::card::ImageRef;

    const EPS: f32 = 1e-3;

    fn cards() -> Vec<Card> {
        ["A", "B", "C"]
            .into_iter()
            .map(|id| Card::new(id, format!("Karte {id}"), ImageRef::bundled(id)))
            .collect()
    }

    fn dims() -> CardDimensions {
        CardDimensions::from_width(100.0)
    }

    fn fanned() -> (AnimationController, Vec<Card>) {
        let mut controller = AnimationController::new();
        let cards = cards();
        controller.update_all_card_transforms(&cards, true, 60.0, dims());
        controller.finish();
        (controller, cards)
    }

    #[test]
    fn test_stacked_pose_is_written_immediately() {
        let mut controller = AnimationController::new();
        let cards = cards();
        controller.update_all_card_transforms(&cards, true, 60.0, dims());

        assert_eq!(controller.phase(), AnimationPhase::Stacked);
        let poses = controller.transforms();
        assert_eq!(poses.len(), 3);
        for (index, card) in cards.iter().enumerate() {
            let pose = poses[&card.id];
            assert!((pose.translate_x + 50.0).abs() < EPS);
            assert!((pose.translate_y + 80.0).abs() < EPS);
            assert!((pose.opacity - 1.0).abs() < EPS);
            assert_eq!(pose.z_index, i32::try_from(3 - index).expect("small"));
        }
        assert!(controller.instruction_opacity().abs() < EPS);
    }

    #[test]
    fn test_fan_waits_for_delay() {
        let mut controller = AnimationController::new();
        let cards = cards();
        controller.update_all_card_transforms(&cards, true, 60.0, dims());

        controller.advance(299);
        assert_eq!(controller.phase(), AnimationPhase::Stacked);
        let left = controller.transform(&cards[0].id).expect("pose");
        assert!(left.rotate.abs() < EPS);

        controller.advance(1);
        assert_eq!(controller.phase(), AnimationPhase::Fanned);
        assert!(!controller.is_idle());
    }

    #[test]
    fn test_fan_reaches_arc() {
        let (controller, cards) = fanned();

        assert!(controller.is_idle());
        assert!((controller.instruction_opacity() - 1.0).abs() < EPS);
        for (index, card) in cards.iter().enumerate() {
            let pose = controller.transform(&card.id).expect("pose");
            let expected = fan_pose(index, 3, 60.0, dims(), controller.config());
            assert!((pose.translate_x - expected.translate_x).abs() < EPS);
            assert!((pose.translate_y - expected.translate_y).abs() < EPS);
            assert!((pose.rotate - expected.rotate).abs() < EPS);
            assert!((pose.scale - 1.0).abs() < EPS);
            assert!((pose.opacity - 1.0).abs() < EPS);
        }
        let middle = controller.transform(&cards[1].id).expect("pose");
        assert!(middle.rotate.abs() < EPS);
    }

    #[test]
    fn test_not_started_only_hides_hint() {
        let (mut controller, cards) = fanned();
        controller.update_all_card_transforms(&cards, false, 60.0, dims());

        assert!(controller.instruction_opacity().abs() < EPS);
        assert!(controller.transforms().is_empty());
        controller.advance(10_000);
        assert_eq!(controller.phase(), AnimationPhase::Reset);
    }

    #[test]
    fn test_selection_sequencing() {
        let (mut controller, cards) = fanned();
        let log = Rc::new(RefCell::new(Vec::new()));
        let slots = [SlotPosition::new(200.0, 120.0); 3];

        let positioned = Rc::clone(&log);
        let completed = Rc::clone(&log);
        let callbacks = SelectionCallbacks::new(move |card: Card| {
            assert!(card.show_front && card.is_selected);
            completed.borrow_mut().push(format!("complete:{}", card.id));
        })
        .on_card_positioned(move || positioned.borrow_mut().push("positioned".to_string()));

        controller
            .animate_card_selection(&cards[1], &cards, 0, &slots, dims(), callbacks)
            .expect("slot exists");
        assert!(controller.is_selecting());

        // Fade finishes before the chosen card moves.
        controller.advance(250);
        let b = controller.transform(&cards[1].id).expect("pose");
        assert!((b.translate_x + 50.0).abs() < EPS);
        assert!(controller.transform(&cards[0].id).expect("pose").opacity.abs() < EPS);
        assert!(log.borrow().is_empty());

        controller.advance(499);
        assert!(log.borrow().is_empty());
        assert!(controller.is_selecting());

        controller.advance(1);
        assert_eq!(*log.borrow(), vec!["positioned", "complete:B"]);
        assert_eq!(controller.phase(), AnimationPhase::Settled);
        assert!(!controller.is_selecting());

        let b = controller.transform(&cards[1].id).expect("pose");
        assert!((b.translate_x - 150.0).abs() < EPS);
        assert!((b.translate_y - 40.0).abs() < EPS);
        assert!(b.rotate.abs() < EPS);
        assert!((b.scale - 0.9).abs() < EPS);
        assert!((b.opacity - 1.0).abs() < EPS);

        controller.finish();
        assert_eq!(log.borrow().len(), 2);
        for other in [&cards[0], &cards[2]] {
            let pose = controller.transform(&other.id).expect("pose");
            assert!(pose.opacity.abs() < EPS);
        }
        assert!(controller.instruction_opacity().abs() < EPS);
    }

    #[test]
    fn test_selection_while_stacked_cancels_fan_out() {
        let mut controller = AnimationController::new();
        let cards = cards();
        controller.update_all_card_transforms(&cards, true, 60.0, dims());
        controller.advance(100);

        let done = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&done);
        controller
            .animate_card_selection(
                &cards[1],
                &cards,
                0,
                &[SlotPosition::new(200.0, 120.0); 3],
                dims(),
                SelectionCallbacks::new(move |_| *flag.borrow_mut() = true),
            )
            .expect("slot exists");

        // Past the original fan-out time.
        controller.advance(300);
        assert_eq!(controller.phase(), AnimationPhase::Selecting);
        assert!(controller.instruction_opacity().abs() < EPS);

        controller.finish();
        assert!(*done.borrow());
        assert_eq!(controller.phase(), AnimationPhase::Settled);
        for other in [&cards[0], &cards[2]] {
            let pose = controller.transform(&other.id).expect("pose");
            assert!(pose.opacity.abs() < EPS);
        }
        assert!(controller.instruction_opacity().abs() < EPS);
        let b = controller.transform(&cards[1].id).expect("pose");
        assert!((b.translate_x - 150.0).abs() < EPS);
        assert!((b.translate_y - 40.0).abs() < EPS);
    }

    #[test]
    fn test_selection_without_slot_is_rejected() {
        let (mut controller, cards) = fanned();
        let result = controller.animate_card_selection(
            &cards[0],
            &cards,
            3,
            &[SlotPosition::new(0.0, 0.0); 3],
            dims(),
            SelectionCallbacks::new(|_| {}),
        );
        assert!(matches!(result, Err(TarotError::InvalidSlot(3))));
        assert!(!controller.is_selecting());
    }

    #[test]
    fn test_reset_discards_pending_fan() {
        let mut controller = AnimationController::new();
        let cards = cards();
        controller.update_all_card_transforms(&cards, true, 60.0, dims());
        controller.reset_animations();
        controller.advance(10_000);

        assert_eq!(controller.phase(), AnimationPhase::Reset);
        assert!(controller.transforms().is_empty());
        assert!(controller.instruction_opacity().abs() < EPS);
    }

    #[test]
    fn test_reset_twice_is_stable() {
        let (mut controller, _) = fanned();
        controller.reset_animations();
        let first = (controller.transforms(), controller.instruction_opacity());
        controller.reset_animations();
        let second = (controller.transforms(), controller.instruction_opacity());

        assert_eq!(first, second);
        assert!(first.0.is_empty());
        assert!(first.1.abs() < EPS);
    }

    #[test]
    fn test_reset_mid_selection_never_fires_callbacks() {
        let (mut controller, cards) = fanned();
        let fired = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&fired);
        controller
            .animate_card_selection(
                &cards[0],
                &cards,
                0,
                &[SlotPosition::new(0.0, 0.0); 3],
                dims(),
                SelectionCallbacks::new(move |_| *flag.borrow_mut() = true),
            )
            .expect("slot exists");

        controller.advance(100);
        controller.reset_animations();
        controller.finish();
        assert!(!*fired.borrow());
    }

    #[test]
    fn test_settled_card_survives_next_round() {
        let (mut controller, cards) = fanned();
        controller
            .animate_card_selection(
                &cards[0],
                &cards,
                0,
                &[SlotPosition::new(0.0, -200.0); 3],
                dims(),
                SelectionCallbacks::new(|_| {}),
            )
            .expect("slot exists");
        controller.finish();

        controller.update_all_card_transforms(&cards[1..], true, 60.0, dims());
        controller.finish();

        let poses = controller.transforms();
        assert_eq!(poses.len(), 3);
        let settled = poses[&cards[0].id];
        assert!((settled.translate_y + 280.0).abs() < EPS);
        assert!((poses[&cards[1].id].opacity - 1.0).abs() < EPS);
    }
}
