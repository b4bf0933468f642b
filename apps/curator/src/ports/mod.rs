//! Collaborator ports.
//!
//! The pipeline performs no I/O itself. Everything that touches the network or
//! storage sits behind these traits; implementations live in `adapters`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CuratedHotelCard, PhotoMetadata};

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("Rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Resolves photo metadata the source did not declare.
/// Returns best-effort values; any field may stay `None`.
#[async_trait]
pub trait PhotoMetadataProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<PhotoMetadata, CollaboratorError>;
}

/// The authoritative source used for final re-verification.
///
/// `Ok(None)` means the hotel could not be found there.
#[async_trait]
pub trait ReverificationSource: Send + Sync {
    async fn fresh_photos(
        &self,
        name: &str,
        city: &str,
    ) -> Result<Option<Vec<String>>, CollaboratorError>;
}

/// Persists finished cards. The core knows nothing of its schema.
#[async_trait]
pub trait CuratedHotelSink: Send + Sync {
    async fn store(&self, cards: &[CuratedHotelCard]) -> Result<(), CollaboratorError>;
}

/// Retry schedule injected into collaborators. The pipeline never retries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub multiplier: f64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 1000,
            multiplier: 2.0,
            max_backoff_ms: 8000,
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before `attempt` (0-based). The first attempt never waits.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = self.multiplier.max(1.0).powi(attempt as i32 - 1);
        let millis = (self.initial_backoff_ms as f64 * factor).min(self.max_backoff_ms as f64);
        Duration::from_millis(millis as u64)
    }
}
