//! Error types for tarot operations.

use thiserror::Error;

use crate::pool::PoolError;
use crate::store::StoreError;

/// Result type for tarot operations.
pub type TarotResult<T> = Result<T, TarotError>;

/// Errors that can occur in tarot operations.
#[derive(Debug, Error)]
pub enum TarotError {
    /// The card pool answered with an empty draw.
    #[error("Keine Karten zum Anzeigen gefunden.")]
    NoCards,

    /// The card pool failed.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// Reading storage failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Configuration or card serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A selection referenced a round without a reserved slot.
    #[error("No slot reserved for round {0}")]
    InvalidSlot(usize),
}
