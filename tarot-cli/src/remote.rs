//! Client for the Arcana REST backend.
//!
//! Serves random cards (with explanations) and accepts finished readings.
//! Saving is best-effort: callers log failures and move on.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tarot_core::{Card, CardPool, PoolError};
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The base URL provided by configuration is invalid.
    #[error("invalid API URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed (connection, timeout, etc.).
    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("API returned status {0}")]
    Status(u16),
}

/// Asynchronous backend client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Arc<InnerClient>,
}

#[derive(Debug)]
struct InnerClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    /// Create a client for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidUrl`] if the URL is malformed.
    /// Returns [`RemoteError::Http`] if the HTTP client fails to build.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, RemoteError> {
        let mut base =
            Url::parse(base_url.as_ref()).map_err(|e| RemoteError::InvalidUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(RemoteError::InvalidUrl(base.to_string()));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = Client::builder()
            .user_agent(concat!("arcana/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(InnerClient { http, base }),
        })
    }

    /// Fetch `count` random cards.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    pub async fn random_cards(&self, count: usize) -> Result<Vec<Card>, RemoteError> {
        let url = self.endpoint("cards/random")?;
        debug!("GET {url} count={count}");

        let response = self
            .inner
            .http
            .get(url)
            .query(&[("count", count)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status().as_u16()));
        }
        Ok(response.json().await?)
    }

    /// Store a finished reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    pub async fn save_reading(&self, cards: &[Card]) -> Result<(), RemoteError> {
        let url = self.endpoint("readings")?;
        debug!("POST {url} with {} cards", cards.len());

        let response = self.inner.http.post(url).json(cards).send().await?;
        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status().as_u16()));
        }
        Ok(())
    }

    fn endpoint(&self, path: &str) -> Result<Url, RemoteError> {
        self.inner
            .base
            .join(path)
            .map_err(|e| RemoteError::InvalidUrl(e.to_string()))
    }
}

#[async_trait]
impl CardPool for ApiClient {
    async fn draw_cards(&self, count: usize) -> Result<Vec<Card>, PoolError> {
        let cards = self
            .random_cards(count)
            .await
            .map_err(|e| PoolError::Unavailable(e.to_string()))?;
        Ok(cards.iter().map(Card::face_down).collect())
    }
}
