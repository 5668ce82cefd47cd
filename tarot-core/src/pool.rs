//! Card pools - where the cards of a reading come from.

use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use thiserror::Error;

use crate::card::Card;

/// The Major Arcana shipped with the crate.
const MAJOR_ARCANA: &str = include_str!("../assets/major_arcana.json");

/// Errors a card pool can report.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The pool could not be reached or refused the request.
    #[error("{0}")]
    Unavailable(String),

    /// The deck definition could not be parsed.
    #[error("Invalid deck: {0}")]
    InvalidDeck(#[from] serde_json::Error),
}

/// Source of random cards with their explanations.
///
/// Implementations hand out face-down, unselected cards.
#[async_trait]
pub trait CardPool: Send + Sync {
    /// Draw up to `count` distinct cards.
    ///
    /// An empty result is not an error here; callers decide what it means.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Unavailable`] if the pool cannot serve the draw.
    async fn draw_cards(&self, count: usize) -> Result<Vec<Card>, PoolError>;
}

/// A pool drawing from an in-memory deck without replacement.
#[derive(Debug)]
pub struct LocalCardPool {
    deck: Vec<Card>,
    rng: Mutex<StdRng>,
}

impl LocalCardPool {
    /// Pool over the given deck.
    ///
    /// With a seed, draws are reproducible.
    #[must_use]
    pub fn new(deck: Vec<Card>, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            deck,
            rng: Mutex::new(rng),
        }
    }

    /// Pool over a deck given as a JSON array of cards.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidDeck`] if the JSON is not a card list.
    pub fn from_json(json: &str, seed: Option<u64>) -> Result<Self, PoolError> {
        let deck: Vec<Card> = serde_json::from_str(json)?;
        Ok(Self::new(deck, seed))
    }

    /// Pool over the bundled Major Arcana, explanations included.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidDeck`] if the bundled deck is corrupt.
    pub fn major_arcana(seed: Option<u64>) -> Result<Self, PoolError> {
        Self::from_json(MAJOR_ARCANA, seed)
    }

    /// Every card in the deck.
    #[must_use]
    pub fn deck(&self) -> &[Card] {
        &self.deck
    }
}

#[async_trait]
impl CardPool for LocalCardPool {
    async fn draw_cards(&self, count: usize) -> Result<Vec<Card>, PoolError> {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let drawn: Vec<Card> = self
            .deck
            .choose_multiple(&mut *rng, count)
            .map(Card::face_down)
            .collect();
        tracing::debug!("Drew {} of {count} requested cards", drawn.len());
        Ok(drawn)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_bundled_deck_is_complete() {
        let pool = LocalCardPool::major_arcana(Some(1)).expect("bundled deck");
        assert_eq!(pool.deck().len(), 22);

        let ids: HashSet<_> = pool.deck().iter().map(|card| card.id.clone()).collect();
        assert_eq!(ids.len(), 22);
        assert!(pool.deck().iter().all(|card| card.explanation.is_some()));
    }

    #[tokio::test]
    async fn test_draw_is_distinct_and_face_down() {
        let pool = LocalCardPool::major_arcana(Some(7)).expect("bundled deck");
        let cards = pool.draw_cards(3).await.expect("draw");

        assert_eq!(cards.len(), 3);
        let ids: HashSet<_> = cards.iter().map(|card| card.id.clone()).collect();
        assert_eq!(ids.len(), 3);
        assert!(cards.iter().all(|card| !card.show_front && !card.is_selected));
    }

    #[tokio::test]
    async fn test_seeded_draws_repeat() {
        let first = LocalCardPool::major_arcana(Some(42)).expect("deck");
        let second = LocalCardPool::major_arcana(Some(42)).expect("deck");

        let a = first.draw_cards(3).await.expect("draw");
        let b = second.draw_cards(3).await.expect("draw");
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_small_deck_returns_what_it_has() {
        let pool = LocalCardPool::new(Vec::new(), Some(0));
        assert!(pool.draw_cards(3).await.expect("draw").is_empty());
    }

    #[test]
    fn test_invalid_deck() {
        assert!(matches!(
            LocalCardPool::from_json("{}", None),
            Err(PoolError::InvalidDeck(_))
        ));
    }
}
