//! Headless three-card reading.
//!
//! Plays the part of the UI: deals, fans every round, taps a card, waits
//! for it to land and feeds it back into the session.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{anyhow, Context};
use tarot_core::layout::card_dimensions;
use tarot_core::{Card, CardSession, CardStack, SelectionCallbacks, TarotConfig, Viewport};
use tracing::{debug, info};

/// Simulated frame length.
pub const FRAME_MS: u64 = 16;

/// Outcome of a headless reading.
#[derive(Debug, Clone)]
pub struct ReadingReport {
    /// Cards in the order they were drawn, face up.
    pub cards: Vec<Card>,
    /// Frames rendered until the last card settled.
    pub frames: u64,
}

/// Run a full reading on `session`.
///
/// `picks[round]` chooses among the cards still on the table (wrapping
/// around); missing entries pick the first card.
///
/// # Errors
///
/// Returns an error if the session cannot start or a tap is rejected.
pub async fn run_reading(
    session: &CardSession,
    config: &TarotConfig,
    viewport: Viewport,
    picks: &[usize],
) -> anyhow::Result<ReadingReport> {
    session.start_session().await;
    let state = session.snapshot();
    if let Some(error) = state.error {
        return Err(anyhow!(error));
    }

    let dims = card_dimensions(viewport.width, &config.layout);
    let mut stack = CardStack::new(config.animation.clone(), &config.layout, viewport, dims);
    let landed: Rc<RefCell<Option<Card>>> = Rc::default();
    let mut frames = 0;

    while !session.snapshot().is_complete() {
        let state = session.snapshot();
        let remaining = state.remaining_cards();
        if remaining.is_empty() {
            break;
        }

        stack.prepare_round(&remaining, state.session_started, dims);
        frames += run_until_idle(&mut stack);

        let pick = picks.get(state.current_round).copied().unwrap_or(0) % remaining.len();
        let chosen = &remaining[pick];
        debug!("Round {}: tapping {}", state.current_round, chosen.name);

        let sink = Rc::clone(&landed);
        let accepted = stack.handle_card_select(
            chosen,
            &remaining,
            state.current_round,
            dims,
            SelectionCallbacks::new(move |card| *sink.borrow_mut() = Some(card))
                .on_card_positioned(|| debug!("Card positioned, revealing")),
        );
        if !accepted {
            return Err(anyhow!("tap on {} was rejected", chosen.name));
        }
        frames += run_until_idle(&mut stack);

        let card = landed
            .borrow_mut()
            .take()
            .context("selection finished without a card")?;
        session.select_card(&card);
    }

    let cards = session.snapshot().drawn_cards;
    info!("Reading finished after {frames} frames");
    Ok(ReadingReport { cards, frames })
}

fn run_until_idle(stack: &mut CardStack) -> u64 {
    let mut frames = 0;
    while !stack.controller().is_idle() {
        stack.advance(FRAME_MS);
        frames += 1;
    }
    frames
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use tarot_core::LocalCardPool;

    #[tokio::test]
    async fn test_reading_draws_three_distinct_cards() {
        let pool = LocalCardPool::major_arcana(Some(5)).expect("deck");
        let session = CardSession::new(Arc::new(pool));

        let report = run_reading(&session, &TarotConfig::default(), Viewport::default(), &[2, 1])
            .await
            .expect("reading");

        assert_eq!(report.cards.len(), 3);
        assert!(report.cards.iter().all(|card| card.show_front && card.is_selected));
        assert_ne!(report.cards[0].id, report.cards[1].id);
        assert_ne!(report.cards[1].id, report.cards[2].id);
        assert!(report.frames > 0);
    }

    #[tokio::test]
    async fn test_reading_from_empty_deck_fails() {
        let session = CardSession::new(Arc::new(LocalCardPool::new(Vec::new(), Some(0))));
        let error = run_reading(&session, &TarotConfig::default(), Viewport::default(), &[])
            .await
            .expect_err("no cards");
        assert_eq!(error.to_string(), "Keine Karten zum Anzeigen gefunden.");
    }
}
