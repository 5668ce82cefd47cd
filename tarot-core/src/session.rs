//! # Three-Card Session
//!
//! The authoritative record of what the user has drawn so far.
//!
//! ```text
//! Idle ──start──▶ Loading ──cards──▶ Active(0) ─select─▶ Active(1) ─select─▶ Active(2) ─select─▶ Complete
//!  ▲                 │                                                                           │
//!  └──── error ──────┘◀─────────────────────────── dismiss_summary ─────────────────────────────┘
//! ```
//!
//! [`SessionState`] is plain data with the transition rules; [`CardSession`]
//! is the shared handle the UI holds, which performs the pool fetch and
//! guards late writes with a liveness flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::card::Card;
use crate::config::LayoutConfig;
use crate::layout::{card_dimensions, CardDimensions};
use crate::pool::CardPool;
use crate::store::ReadingStore;
use crate::TarotError;

/// Number of cards in a reading.
pub const CARDS_PER_SESSION: usize = 3;

/// Coarse lifecycle of a session, derived from its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    /// Not started; may carry an error from the last attempt.
    Idle,
    /// Waiting for the card pool.
    Loading,
    /// Accepting selections; `round` cards drawn so far.
    Active {
        /// Index of the next slot to fill.
        round: usize,
    },
    /// All cards drawn.
    Complete,
}

/// Round and card bookkeeping of a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Whether cards have been dealt.
    pub session_started: bool,
    /// Cards dealt for this session, fixed once drawn.
    pub predetermined_cards: Vec<Card>,
    /// Cards chosen so far, in order.
    pub drawn_cards: Vec<Card>,
    /// Index of the next slot to fill; always `drawn_cards.len()`.
    pub current_round: usize,
    /// Whether a pool fetch is in flight.
    pub loading: bool,
    /// Message of the last failed start.
    pub error: Option<String>,
}

impl SessionState {
    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.loading {
            SessionPhase::Loading
        } else if !self.session_started {
            SessionPhase::Idle
        } else if self.current_round >= CARDS_PER_SESSION {
            SessionPhase::Complete
        } else {
            SessionPhase::Active {
                round: self.current_round,
            }
        }
    }

    /// Whether every card of the reading has been drawn.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.session_started && self.current_round >= CARDS_PER_SESSION
    }

    /// Dealt cards that have not been chosen yet, in deal order.
    #[must_use]
    pub fn remaining_cards(&self) -> Vec<Card> {
        self.predetermined_cards
            .iter()
            .filter(|card| !self.drawn_cards.iter().any(|drawn| drawn.id == card.id))
            .cloned()
            .collect()
    }

    /// Record the start of a pool fetch.
    pub fn begin_loading(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Take the dealt cards and open round 0.
    pub fn deal(&mut self, cards: Vec<Card>) {
        self.predetermined_cards = cards;
        self.drawn_cards.clear();
        self.current_round = 0;
        self.session_started = true;
    }

    /// Record a failed start.
    ///
    /// Cards of an earlier session are dropped along with it.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.session_started = false;
        self.predetermined_cards.clear();
        self.drawn_cards.clear();
        self.current_round = 0;
    }

    /// Append a selected copy of `card` and open the next round.
    ///
    /// Returns `false` without changing anything if no session is running
    /// or every card has already been drawn.
    pub fn select_card(&mut self, card: &Card) -> bool {
        if !self.session_started {
            debug!("Ignoring selection of {}: session not started", card.id);
            return false;
        }
        if self.current_round >= CARDS_PER_SESSION {
            debug!("Ignoring selection of {}: all cards drawn", card.id);
            return false;
        }
        self.drawn_cards.push(card.selected());
        self.current_round += 1;
        true
    }

    /// Return to the initial state.
    pub fn dismiss_summary(&mut self) {
        *self = Self::default();
    }
}

/// Card size for the given viewport width.
#[must_use]
pub fn session_card_dimensions(viewport_width: f32, layout: &LayoutConfig) -> CardDimensions {
    card_dimensions(viewport_width, layout)
}

/// Shared handle to a three-card session.
///
/// Clones share the same state. After [`CardSession::unmount`], results of
/// fetches still in flight are dropped instead of written.
#[derive(Clone)]
pub struct CardSession {
    state: Arc<Mutex<SessionState>>,
    pool: Arc<dyn CardPool>,
    store: Option<ReadingStore>,
    mounted: Arc<AtomicBool>,
}

impl std::fmt::Debug for CardSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardSession")
            .field("state", &self.snapshot())
            .field("store", &self.store)
            .field("mounted", &self.is_mounted())
            .finish_non_exhaustive()
    }
}

impl CardSession {
    /// Create an idle session drawing from `pool`.
    #[must_use]
    pub fn new(pool: Arc<dyn CardPool>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::default())),
            pool,
            store: None,
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Save drawn cards to `store` after every accepted selection.
    #[must_use]
    pub fn with_store(mut self, store: ReadingStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.lock().phase()
    }

    /// Whether results may still be written.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    /// Stop accepting results of fetches in flight.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
    }

    /// Deal a fresh set of cards.
    ///
    /// Failures end up in [`SessionState::error`]; calling again retries.
    /// `loading` is cleared however the fetch ends.
    pub async fn start_session(&self) {
        self.lock().begin_loading();
        let _loading = LoadingGuard { session: self };

        let outcome = self.pool.draw_cards(CARDS_PER_SESSION).await;
        if !self.is_mounted() {
            debug!("Session unmounted during card fetch, dropping result");
            return;
        }

        let mut state = self.lock();
        match outcome {
            Ok(cards) if cards.is_empty() => {
                warn!("Card pool returned no cards");
                state.fail(TarotError::NoCards.to_string());
            }
            Ok(mut cards) => {
                cards.truncate(CARDS_PER_SESSION);
                info!("Session started with {} cards", cards.len());
                state.deal(cards);
            }
            Err(e) => {
                warn!("Card pool failed: {e}");
                state.fail(e.to_string());
            }
        }
    }

    /// Record `card` as the pick of the current round.
    ///
    /// Returns `false` if the selection was ignored.
    pub fn select_card(&self, card: &Card) -> bool {
        let mut state = self.lock();
        if !state.select_card(card) {
            return false;
        }
        if state.is_complete() {
            info!("All {CARDS_PER_SESSION} cards drawn");
        }
        if let Some(store) = &self.store {
            if let Err(e) = store.save_drawn_cards(&state.drawn_cards) {
                warn!("Failed to save drawn cards: {e}");
            }
        }
        true
    }

    /// Throw the session away and return to idle.
    pub fn dismiss_summary(&self) {
        self.lock().dismiss_summary();
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

struct LoadingGuard<'a> {
    session: &'a CardSession,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.session.is_mounted() {
            self.session.lock().loading = false;
        }
    }
}
