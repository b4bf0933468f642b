use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::models::CuratedHotelCard;
use crate::ports::{CollaboratorError, CuratedHotelSink};

/// Writes the finished catalog as a pretty-printed JSON array.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CuratedHotelSink for JsonFileSink {
    async fn store(&self, cards: &[CuratedHotelCard]) -> Result<(), CollaboratorError> {
        let body = serde_json::to_vec_pretty(cards)?;
        tokio::fs::write(&self.path, body).await?;
        info!("Wrote {} curated hotels to {}", cards.len(), self.path.display());
        Ok(())
    }
}
