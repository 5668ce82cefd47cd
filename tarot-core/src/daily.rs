//! The card of the day.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::card::Card;
use crate::pool::CardPool;
use crate::store::ReadingStore;
use crate::{TarotError, TarotResult};

/// Draws one card per calendar day and remembers it.
#[derive(Clone)]
pub struct DailyCardService {
    pool: Arc<dyn CardPool>,
    store: ReadingStore,
}

impl std::fmt::Debug for DailyCardService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DailyCardService")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl DailyCardService {
    /// Create a service drawing from `pool` and caching in `store`.
    #[must_use]
    pub fn new(pool: Arc<dyn CardPool>, store: ReadingStore) -> Self {
        Self { pool, store }
    }

    /// The card of `date`, drawing and caching it on first request.
    ///
    /// The returned card is face up.
    ///
    /// # Errors
    ///
    /// Returns [`TarotError::NoCards`] if the pool returns nothing, or the
    /// pool or store error otherwise.
    pub async fn draw(&self, date: NaiveDate) -> TarotResult<Card> {
        if let Some(card) = self.store.daily_card(date)? {
            debug!("Daily card for {date} served from cache");
            return Ok(card);
        }

        let card = self
            .pool
            .draw_cards(1)
            .await?
            .into_iter()
            .next()
            .ok_or(TarotError::NoCards)?
            .revealed();

        self.store.cache_daily_card(date, &card)?;
        info!("Daily card for {date}: {}", card.name);
        Ok(card)
    }

    /// The card of today in local time.
    ///
    /// # Errors
    ///
    /// See [`DailyCardService::draw`].
    pub async fn draw_today(&self) -> TarotResult<Card> {
        self.draw(Local::now().date_naive()).await
    }
}
