//! Photo Quality Scorer: pure, per-photo technical scoring.
//!
//! Points (0 – 100):
//! - resolution, proportional to pixel area over the minimum baseline: ≤ 40
//! - file size inside the ideal band: ≤ 20
//! - aspect ratio closeness to the ideal landscape ratio: ≤ 20
//! - high-resolution bonus: 20
//!
//! Hard rejections override the score. Remote probing is a collaborator job;
//! this module only reads the metadata it is given.

use serde::{Deserialize, Serialize};

use crate::errors::{ensure, CurationError};
use crate::models::photo::{PhotoCandidate, PhotoRejection, PhotoVerdict, ScoredPhoto};

const RESOLUTION_POINTS: f64 = 40.0;
const FILE_SIZE_POINTS: f64 = 20.0;
const ASPECT_POINTS: f64 = 20.0;
const HIGH_RES_BONUS: f64 = 20.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhotoQualityConfig {
    pub min_width: u32,
    pub min_height: u32,
    pub high_res_width: u32,
    pub high_res_height: u32,
    /// Hard floor: smaller files are rejected.
    pub min_bytes: u64,
    /// Files between `min_bytes` and this get partial credit.
    pub ideal_min_bytes: u64,
    /// Files above this (but under `max_bytes`) get no size credit.
    pub ideal_max_bytes: u64,
    /// Hard ceiling: larger files are rejected.
    pub max_bytes: u64,
    pub ideal_aspect: f64,
    pub aspect_tolerance: f64,
}

impl Default for PhotoQualityConfig {
    fn default() -> Self {
        Self {
            min_width: 1200,
            min_height: 800,
            high_res_width: 1600,
            high_res_height: 1200,
            min_bytes: 20_000,
            ideal_min_bytes: 150_000,
            ideal_max_bytes: 5_000_000,
            max_bytes: 15_000_000,
            ideal_aspect: 1.5,
            aspect_tolerance: 0.5,
        }
    }
}

impl PhotoQualityConfig {
    pub fn validate(&self) -> Result<(), CurationError> {
        ensure(self.min_width > 0 && self.min_height > 0, || {
            "photo minimum resolution must be non-zero".to_string()
        })?;
        ensure(
            self.high_res_width >= self.min_width && self.high_res_height >= self.min_height,
            || "high-resolution threshold must be at least the minimum resolution".to_string(),
        )?;
        ensure(
            self.min_bytes <= self.ideal_min_bytes
                && self.ideal_min_bytes <= self.ideal_max_bytes
                && self.ideal_max_bytes <= self.max_bytes,
            || {
                format!(
                    "file size bounds must be ordered: {} <= {} <= {} <= {}",
                    self.min_bytes, self.ideal_min_bytes, self.ideal_max_bytes, self.max_bytes
                )
            },
        )?;
        ensure(self.ideal_min_bytes > 0, || {
            "ideal_min_bytes must be non-zero".to_string()
        })?;
        ensure(
            self.ideal_aspect.is_finite() && self.ideal_aspect > 0.0,
            || format!("ideal_aspect must be positive, got {}", self.ideal_aspect),
        )?;
        ensure(
            self.aspect_tolerance.is_finite() && self.aspect_tolerance > 0.0,
            || {
                format!(
                    "aspect_tolerance must be positive, got {}",
                    self.aspect_tolerance
                )
            },
        )
    }
}

#[derive(Debug, Clone)]
pub struct PhotoQualityScorer {
    config: PhotoQualityConfig,
}

impl PhotoQualityScorer {
    pub fn new(config: PhotoQualityConfig) -> Result<Self, CurationError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PhotoQualityConfig {
        &self.config
    }

    pub fn score(&self, photo: &PhotoCandidate) -> ScoredPhoto {
        let cfg = &self.config;

        if let Some(ct) = photo.content_type.as_deref() {
            if !ct.trim().to_ascii_lowercase().starts_with("image/") {
                return rejected(
                    photo,
                    0.0,
                    PhotoRejection::MetadataUnavailable {
                        detail: format!("unsupported content type: {ct}"),
                    },
                );
            }
        }

        let (width, height) = match (photo.width, photo.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => {
                return rejected(
                    photo,
                    0.0,
                    PhotoRejection::MetadataUnavailable {
                        detail: "metadata unavailable".to_string(),
                    },
                )
            }
        };

        let score = self.compute_score(width, height, photo.file_size);

        if width < cfg.min_width || height < cfg.min_height {
            return rejected(photo, score, PhotoRejection::ResolutionTooLow { width, height });
        }
        if let Some(bytes) = photo.file_size {
            if bytes < cfg.min_bytes {
                return rejected(photo, score, PhotoRejection::FileTooSmall { bytes });
            }
            if bytes > cfg.max_bytes {
                return rejected(photo, score, PhotoRejection::FileTooLarge { bytes });
            }
        }

        ScoredPhoto {
            candidate: photo.clone(),
            quality_score: score,
            verdict: PhotoVerdict::Accepted,
            rejection: None,
        }
    }

    fn compute_score(&self, width: u32, height: u32, file_size: Option<u64>) -> f64 {
        let total = self.resolution_points(width, height)
            + self.file_size_points(file_size)
            + self.aspect_points(width, height)
            + self.high_res_bonus(width, height);
        total.clamp(0.0, 100.0)
    }

    fn resolution_points(&self, width: u32, height: u32) -> f64 {
        let area = width as f64 * height as f64;
        let baseline = self.config.min_width as f64 * self.config.min_height as f64;
        (RESOLUTION_POINTS * area / baseline).min(RESOLUTION_POINTS)
    }

    fn file_size_points(&self, file_size: Option<u64>) -> f64 {
        let cfg = &self.config;
        match file_size {
            None => 0.0,
            Some(bytes) if bytes > cfg.ideal_max_bytes => 0.0,
            Some(bytes) if bytes >= cfg.ideal_min_bytes => FILE_SIZE_POINTS,
            Some(bytes) => FILE_SIZE_POINTS * bytes as f64 / cfg.ideal_min_bytes as f64,
        }
    }

    fn aspect_points(&self, width: u32, height: u32) -> f64 {
        let ratio = width as f64 / height as f64;
        let distance = (ratio - self.config.ideal_aspect).abs();
        (ASPECT_POINTS * (1.0 - distance / self.config.aspect_tolerance)).max(0.0)
    }

    fn high_res_bonus(&self, width: u32, height: u32) -> f64 {
        if width >= self.config.high_res_width && height >= self.config.high_res_height {
            HIGH_RES_BONUS
        } else {
            0.0
        }
    }
}

fn rejected(photo: &PhotoCandidate, score: f64, rejection: PhotoRejection) -> ScoredPhoto {
    ScoredPhoto {
        candidate: photo.clone(),
        quality_score: score,
        verdict: PhotoVerdict::Rejected,
        rejection: Some(rejection),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::photo::PhotoSourceType;

    fn scorer() -> PhotoQualityScorer {
        PhotoQualityScorer::new(PhotoQualityConfig::default()).unwrap()
    }

    fn photo(width: u32, height: u32, bytes: u64) -> PhotoCandidate {
        PhotoCandidate::new("https://cdn/p.jpg", PhotoSourceType::PrimaryApi)
            .with_dimensions(width, height)
            .with_file_size(bytes)
    }

    #[test]
    fn test_large_landscape_photo_accepted_with_high_score() {
        let scored = scorer().score(&photo(2000, 1300, 800_000));
        assert!(scored.is_accepted());
        assert!(
            scored.quality_score >= 80.0,
            "Expected ≥80, got {}",
            scored.quality_score
        );
    }

    #[test]
    fn test_small_photo_rejected_for_resolution() {
        let scored = scorer().score(&photo(400, 300, 5_000));
        assert!(!scored.is_accepted());
        let reason = scored.rejection_reason().unwrap();
        assert!(reason.contains("resolution too low"), "got {reason}");
        assert!(reason.contains("400x300"));
    }

    #[test]
    fn test_unknown_dimensions_rejected_as_metadata_unavailable() {
        let p = PhotoCandidate::new("https://cdn/p.jpg", PhotoSourceType::Scraped);
        let scored = scorer().score(&p);
        assert!(matches!(
            scored.rejection,
            Some(PhotoRejection::MetadataUnavailable { .. })
        ));
        assert_eq!(scored.quality_score, 0.0);
    }

    #[test]
    fn test_non_image_content_type_rejected() {
        let mut p = photo(2000, 1300, 800_000);
        p.content_type = Some("text/html".to_string());
        let scored = scorer().score(&p);
        assert_eq!(
            scored.rejection_reason().as_deref(),
            Some("unsupported content type: text/html")
        );
    }

    #[test]
    fn test_file_size_floor_and_ceiling() {
        let small = scorer().score(&photo(2000, 1300, 10_000));
        assert_eq!(
            small.rejection,
            Some(PhotoRejection::FileTooSmall { bytes: 10_000 })
        );
        let huge = scorer().score(&photo(2000, 1300, 20_000_000));
        assert_eq!(
            huge.rejection,
            Some(PhotoRejection::FileTooLarge { bytes: 20_000_000 })
        );
    }

    #[test]
    fn test_missing_file_size_is_accepted_without_size_credit() {
        let p = PhotoCandidate::new("https://cdn/p.jpg", PhotoSourceType::PrimaryApi)
            .with_dimensions(1800, 1200);
        let with_size = scorer().score(&photo(1800, 1200, 600_000));
        let without = scorer().score(&p);
        assert!(without.is_accepted());
        assert!((with_size.quality_score - without.quality_score - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_file_gets_partial_credit() {
        let s = scorer();
        assert!((s.file_size_points(Some(75_000)) - 10.0).abs() < 1e-9);
        assert_eq!(s.file_size_points(Some(6_000_000)), 0.0);
        assert_eq!(s.file_size_points(None), 0.0);
    }

    #[test]
    fn test_aspect_points_decay_linearly() {
        let s = scorer();
        assert!((s.aspect_points(1500, 1000) - 20.0).abs() < 1e-9);
        assert!((s.aspect_points(1250, 1000) - 10.0).abs() < 1e-9);
        assert_eq!(s.aspect_points(1000, 1000), 0.0);
        assert_eq!(s.aspect_points(3000, 1000), 0.0);
    }

    #[test]
    fn test_higher_resolution_never_scores_lower() {
        let s = scorer();
        let mut previous = 0.0;
        for step in 0..20 {
            let w = 1200 + step * 150;
            let h = w * 2 / 3;
            let scored = s.score(&photo(w, h, 800_000));
            assert!(
                scored.quality_score >= previous,
                "{}x{} scored {} < {}",
                w,
                h,
                scored.quality_score,
                previous
            );
            previous = scored.quality_score;
        }
    }

    #[test]
    fn test_score_is_clamped_to_100() {
        let scored = scorer().score(&photo(6000, 4000, 2_000_000));
        assert!(scored.quality_score <= 100.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PhotoQualityConfig {
            ideal_min_bytes: 10,
            min_bytes: 100,
            ..PhotoQualityConfig::default()
        };
        assert!(matches!(
            PhotoQualityScorer::new(config),
            Err(CurationError::Configuration(_))
        ));
    }
}
