//! HTTP photo metadata probe.
//!
//! Issues a HEAD request per photo and reads `content-type` / `content-length`.
//! Dimensions come from resize hints in the URL when the CDN exposes them;
//! otherwise they stay unknown and the scorer rejects the photo.

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::models::PhotoMetadata;
use crate::photos::url::dimension_hints;
use crate::ports::{CollaboratorError, PhotoMetadataProbe, RetryPolicy};

#[derive(Clone)]
pub struct HttpPhotoProbe {
    client: Client,
    retry: RetryPolicy,
}

impl HttpPhotoProbe {
    pub fn new(retry: RetryPolicy, timeout_secs: u64) -> Result<Self, CollaboratorError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CollaboratorError::Http(e.to_string()))?;
        Ok(Self { client, retry })
    }
}

#[async_trait]
impl PhotoMetadataProbe for HttpPhotoProbe {
    async fn probe(&self, url: &str) -> Result<PhotoMetadata, CollaboratorError> {
        let (width, height) = dimension_hints(url);
        let mut last_error: Option<CollaboratorError> = None;

        for attempt in 0..self.retry.max_attempts.max(1) {
            if attempt > 0 {
                let delay = self.retry.delay_for(attempt);
                warn!(
                    "Photo probe attempt {} failed for {}, retrying after {}ms...",
                    attempt,
                    url,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.head(url).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(CollaboratorError::Http(e.to_string()));
                    continue;
                }
            };

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS {
                last_error = Some(CollaboratorError::RateLimited {
                    attempts: attempt + 1,
                });
                continue;
            }
            if status.is_server_error() {
                last_error = Some(CollaboratorError::Http(format!("status {status}")));
                continue;
            }
            if !status.is_success() {
                return Err(CollaboratorError::Http(format!("status {status} for {url}")));
            }

            let headers = response.headers();
            let content_type = headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string());
            let file_size = headers
                .get(CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok());

            debug!(url, ?content_type, ?file_size, ?width, ?height, "photo probed");

            return Ok(PhotoMetadata {
                width,
                height,
                file_size,
                content_type,
            });
        }

        // Every attempt that falls through records its failure.
        Err(last_error.unwrap_or_else(|| {
            CollaboratorError::Unavailable(format!("no probe attempt made for {url}"))
        }))
    }
}
