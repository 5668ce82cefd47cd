//! Key/value storage for readings.
//!
//! Provides a thread-safe [`ReadingStore`] holding JSON blobs: the cards of
//! the latest reading and the daily card of each day. With a data directory,
//! every entry is mirrored to `<key>.json` so it survives restarts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;

use crate::card::Card;

/// Key of the cards drawn in the latest reading.
const DRAWN_CARDS_KEY: &str = "drawn_cards";

/// Prefix of daily card keys; the ISO date follows.
const DAILY_CARD_PREFIX: &str = "daily_card_";

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An I/O error occurred during persistence.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Thread-safe reading storage.
///
/// # Example
///
/// ```
/// use tarot_core::store::ReadingStore;
/// use tarot_core::{Card, ImageRef};
///
/// let store = ReadingStore::new();
/// let card = Card::new("major-00", "Der Narr", ImageRef::bundled("major/00"));
///
/// store.save_drawn_cards(&[card.clone()]).unwrap();
/// assert_eq!(store.load_drawn_cards().unwrap(), vec![card]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReadingStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
    /// Optional data directory for filesystem persistence.
    data_dir: Option<PathBuf>,
}

impl ReadingStore {
    /// Create an in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with filesystem persistence.
    ///
    /// The directory is created if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self {
            entries: Arc::default(),
            data_dir: Some(data_dir),
        })
    }

    /// The data directory, if persistence is enabled.
    #[must_use]
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Store a raw JSON value under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the value cannot be written to disk.
    pub fn put(&self, key: &str, value: String) -> Result<(), StoreError> {
        if let Some(path) = self.path_for(key) {
            std::fs::write(path, &value)?;
        }
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(key.to_string(), value);
        Ok(())
    }

    /// Fetch the raw JSON value under `key`, falling back to disk.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be read.
    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        {
            let entries = self
                .entries
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(value) = entries.get(key) {
                return Ok(Some(value.clone()));
            }
        }

        let Some(path) = self.path_for(key) else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        let value = std::fs::read_to_string(path)?;
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(key.to_string(), value.clone());
        Ok(Some(value))
    }

    /// Remove the value under `key` from memory and disk.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be removed.
    pub fn remove(&self, key: &str) -> Result<(), StoreError> {
        {
            let mut entries = self
                .entries
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            entries.remove(key);
        }
        if let Some(path) = self.path_for(key) {
            if path.exists() {
                std::fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    /// Remember the cards of the latest reading.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the disk write fails.
    pub fn save_drawn_cards(&self, cards: &[Card]) -> Result<(), StoreError> {
        self.put(DRAWN_CARDS_KEY, serde_json::to_string(cards)?)
    }

    /// Cards of the latest reading; empty if none was saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored value cannot be read or parsed.
    pub fn load_drawn_cards(&self) -> Result<Vec<Card>, StoreError> {
        match self.get(DRAWN_CARDS_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Forget the cards of the latest reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be removed.
    pub fn clear_drawn_cards(&self) -> Result<(), StoreError> {
        self.remove(DRAWN_CARDS_KEY)
    }

    /// Remember the daily card of `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the disk write fails.
    pub fn cache_daily_card(&self, date: NaiveDate, card: &Card) -> Result<(), StoreError> {
        self.put(&daily_key(date), serde_json::to_string(card)?)
    }

    /// The daily card of `date`, if one was drawn.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored value cannot be read or parsed.
    pub fn daily_card(&self, date: NaiveDate) -> Result<Option<Card>, StoreError> {
        self.get(&daily_key(date))?
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(StoreError::from)
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join(format!("{key}.json")))
    }
}

fn daily_key(date: NaiveDate) -> String {
    format!("{DAILY_CARD_PREFIX}{}", date.format("%Y-%m-%d"))
}
