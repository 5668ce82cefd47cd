//! Tarot cards - the values a reading is made of.

use serde::{Deserialize, Serialize};

/// Stable identifier of a card within a pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    /// Create an identifier from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Where a card's artwork comes from.
///
/// The core never looks inside these; an asset collaborator resolves them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ImageRef {
    /// Artwork shipped with the application, looked up by key.
    Bundled {
        /// Asset key, e.g. `major/00`.
        key: String,
    },
    /// Artwork served by the backend.
    Remote {
        /// Absolute image URL.
        url: String,
    },
}

impl ImageRef {
    /// Reference to bundled artwork.
    #[must_use]
    pub fn bundled(key: impl Into<String>) -> Self {
        Self::Bundled { key: key.into() }
    }

    /// Reference to remote artwork.
    #[must_use]
    pub fn remote(url: impl Into<String>) -> Self {
        Self::Remote { url: url.into() }
    }
}

/// A drawn or drawable tarot card.
///
/// Cards are values: every transition returns a new card so earlier copies
/// held in a reading's history never change underneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Unique identifier within the pool.
    pub id: CardId,
    /// Display name.
    pub name: String,
    /// Artwork reference.
    pub image: ImageRef,
    /// Meaning of the card, when known.
    #[serde(default)]
    pub explanation: Option<String>,
    /// Whether the card currently shows its face.
    #[serde(default)]
    pub show_front: bool,
    /// Whether the user committed to this card in the current session.
    #[serde(default)]
    pub is_selected: bool,
}

impl Card {
    /// Create a face-down, unselected card without explanation.
    #[must_use]
    pub fn new(id: impl Into<CardId>, name: impl Into<String>, image: ImageRef) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image,
            explanation: None,
            show_front: false,
            is_selected: false,
        }
    }

    /// Copy of this card carrying the given explanation.
    #[must_use]
    pub fn with_explanation(&self, explanation: impl Into<String>) -> Self {
        Self {
            explanation: Some(explanation.into()),
            ..self.clone()
        }
    }

    /// Copy of this card flagged as selected.
    #[must_use]
    pub fn selected(&self) -> Self {
        Self {
            is_selected: true,
            ..self.clone()
        }
    }

    /// Copy of this card turned face up.
    #[must_use]
    pub fn revealed(&self) -> Self {
        Self {
            show_front: true,
            ..self.clone()
        }
    }

    /// Copy of this card turned face down and unselected, as a pool hands it out.
    #[must_use]
    pub fn face_down(&self) -> Self {
        Self {
            show_front: false,
            is_selected: false,
            ..self.clone()
        }
    }
}

impl From<String> for CardId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
