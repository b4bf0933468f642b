//! Photo Selector: picks the top-K accepted photos for one hotel.
//!
//! Algorithm:
//! 1. Collapse exact and near-duplicate URLs (resize params ignored)
//! 2. Score every survivor with the quality scorer
//! 3. Keep accepted photos, sort by quality then source priority
//! 4. Truncate to K; flag `insufficient` when fewer than M remain
//!
//! The selector never rejects a hotel. The curation filter does that.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{ensure, CurationError};
use crate::models::photo::{PhotoCandidate, ScoredPhoto};
use crate::photos::quality::PhotoQualityScorer;
use crate::photos::{compare_ranked, dedupe_by_url};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectorConfig {
    /// K: photos kept per hotel.
    pub target_count: usize,
    /// M: fewer surviving photos marks the hotel insufficient.
    pub min_count: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            target_count: 8,
            min_count: 4,
        }
    }
}

impl SelectorConfig {
    pub fn validate(&self) -> Result<(), CurationError> {
        ensure(self.min_count > 0, || {
            "min_count (M) must be at least 1".to_string()
        })?;
        ensure(self.target_count >= self.min_count, || {
            format!(
                "target_count (K={}) must be >= min_count (M={})",
                self.target_count, self.min_count
            )
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionOutcome {
    /// Accepted photos, best first, at most K.
    pub selected: Vec<ScoredPhoto>,
    /// Photos the scorer rejected, with reasons.
    pub rejected: Vec<ScoredPhoto>,
    pub duplicates_removed: usize,
    /// Fewer than M photos survived.
    pub insufficient: bool,
}

#[derive(Debug, Clone)]
pub struct PhotoSelector {
    scorer: PhotoQualityScorer,
    config: SelectorConfig,
}

impl PhotoSelector {
    pub fn new(scorer: PhotoQualityScorer, config: SelectorConfig) -> Result<Self, CurationError> {
        config.validate()?;
        Ok(Self { scorer, config })
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn select(&self, hotel: &str, photos: &[PhotoCandidate]) -> SelectionOutcome {
        let (unique, duplicates_removed) = dedupe_by_url(
            photos.to_vec(),
            |p| p.url.as_str(),
            |new, kept| new.source_type.priority() > kept.source_type.priority(),
        );

        let (mut selected, rejected): (Vec<ScoredPhoto>, Vec<ScoredPhoto>) = unique
            .iter()
            .map(|p| self.scorer.score(p))
            .partition(ScoredPhoto::is_accepted);

        selected.sort_by(compare_ranked);
        selected.truncate(self.config.target_count);

        let insufficient = selected.len() < self.config.min_count;

        debug!(
            hotel,
            offered = photos.len(),
            duplicates_removed,
            rejected = rejected.len(),
            selected = selected.len(),
            insufficient,
            "photo selection complete"
        );

        SelectionOutcome {
            selected,
            rejected,
            duplicates_removed,
            insufficient,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::photo::PhotoSourceType;
    use crate::photos::quality::PhotoQualityConfig;

    fn selector(k: usize, m: usize) -> PhotoSelector {
        let scorer = PhotoQualityScorer::new(PhotoQualityConfig::default()).unwrap();
        PhotoSelector::new(
            scorer,
            SelectorConfig {
                target_count: k,
                min_count: m,
            },
        )
        .unwrap()
    }

    fn good(url: &str, width: u32, source: PhotoSourceType) -> PhotoCandidate {
        PhotoCandidate::new(url, source)
            .with_dimensions(width, width * 2 / 3)
            .with_file_size(900_000)
    }

    #[test]
    fn test_selects_best_first_and_truncates_to_k() {
        let photos: Vec<_> = (0..10)
            .map(|i| {
                good(
                    &format!("https://cdn/{i}.jpg"),
                    1200 + i * 60,
                    PhotoSourceType::PrimaryApi,
                )
            })
            .collect();
        let outcome = selector(6, 4).select("Villa Azur", &photos);
        assert_eq!(outcome.selected.len(), 6);
        assert!(!outcome.insufficient);
        for pair in outcome.selected.windows(2) {
            assert!(pair[0].quality_score >= pair[1].quality_score);
        }
        assert!(outcome.selected.iter().all(ScoredPhoto::is_accepted));
    }

    #[test]
    fn test_resized_variants_count_once() {
        let photos = vec![
            good("https://cdn/a.jpg?w=800", 1800, PhotoSourceType::Scraped),
            good("https://cdn/a.jpg?w=2400", 1800, PhotoSourceType::PrimaryApi),
            good("https://cdn/a.jpg?w=800", 1800, PhotoSourceType::Scraped),
        ];
        let outcome = selector(8, 1).select("Villa Azur", &photos);
        assert_eq!(outcome.duplicates_removed, 2);
        assert_eq!(outcome.selected.len(), 1);
        assert_eq!(
            outcome.selected[0].candidate.source_type,
            PhotoSourceType::PrimaryApi
        );
    }

    #[test]
    fn test_same_source_duplicate_keeps_first_seen() {
        let photos = vec![
            good("https://cdn/a.jpg?w=1600", 1600, PhotoSourceType::Scraped),
            good("https://cdn/a.jpg?w=2400", 2400, PhotoSourceType::Scraped),
        ];
        let outcome = selector(8, 1).select("Villa Azur", &photos);
        assert_eq!(outcome.duplicates_removed, 1);
        assert_eq!(outcome.selected[0].url(), "https://cdn/a.jpg?w=1600");
    }

    #[test]
    fn test_quality_ties_prefer_primary_source() {
        let photos = vec![
            good("https://cdn/scraped.jpg", 1800, PhotoSourceType::Scraped),
            good("https://cdn/search.jpg", 1800, PhotoSourceType::SecondarySearch),
            good("https://cdn/primary.jpg", 1800, PhotoSourceType::PrimaryApi),
        ];
        let outcome = selector(8, 1).select("Villa Azur", &photos);
        let urls: Vec<_> = outcome.selected.iter().map(|p| p.url()).collect();
        assert_eq!(
            urls,
            vec![
                "https://cdn/primary.jpg",
                "https://cdn/search.jpg",
                "https://cdn/scraped.jpg"
            ]
        );
    }

    #[test]
    fn test_insufficient_is_reported_not_rejected() {
        let photos = vec![
            good("https://cdn/1.jpg", 1800, PhotoSourceType::PrimaryApi),
            PhotoCandidate::new("https://cdn/tiny.jpg", PhotoSourceType::Scraped)
                .with_dimensions(400, 300)
                .with_file_size(5_000),
        ];
        let outcome = selector(8, 4).select("Villa Azur", &photos);
        assert!(outcome.insufficient);
        assert_eq!(outcome.selected.len(), 1);
        assert_eq!(outcome.rejected.len(), 1);
    }

    #[test]
    fn test_k_below_m_is_a_configuration_error() {
        let scorer = PhotoQualityScorer::new(PhotoQualityConfig::default()).unwrap();
        let err = PhotoSelector::new(
            scorer,
            SelectorConfig {
                target_count: 2,
                min_count: 4,
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("target_count"));
    }
}
