//! Verification Auditor: final re-check against the authoritative source.
//!
//! Confidence (0 – 100) is rebuilt from scratch, independent of upstream scores:
//! - share of photos from a trusted source          × trusted_weight (40)
//! - photo count adequacy, min(count / K, 1)         × count_weight (20)
//! - suspicious URL markers, minus a penalty each      suspicious_weight (20)
//! - a fresh photo set can be re-fetched               refetch_weight (15)
//! - the name does not look like test/placeholder data name_weight (5)
//!
//! Admission requires confidence ≥ threshold AND no issues. Nothing upstream is mutated.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::curation::appeal::contains_term;
use crate::errors::{ensure, CurationError};
use crate::models::candidate::CurationCandidate;
use crate::ports::ReverificationSource;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationConfig {
    pub threshold: f64,
    pub trusted_weight: f64,
    pub count_weight: f64,
    pub suspicious_weight: f64,
    pub suspicious_penalty: f64,
    pub refetch_weight: f64,
    pub name_weight: f64,
    /// K: photo count that earns full adequacy credit.
    pub target_photo_count: usize,
    /// M: below this an issue is raised.
    pub min_photo_count: usize,
    pub suspicious_markers: Vec<String>,
    pub placeholder_name_terms: Vec<String>,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            threshold: 95.0,
            trusted_weight: 40.0,
            count_weight: 20.0,
            suspicious_weight: 20.0,
            suspicious_penalty: 5.0,
            refetch_weight: 15.0,
            name_weight: 5.0,
            target_photo_count: 8,
            min_photo_count: 4,
            suspicious_markers: [
                "stock",
                "placeholder",
                "shutterstock",
                "istockphoto",
                "gettyimages",
                "dreamstime",
                "no-image",
                "no_image",
                "default-hotel",
                "dummy",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            placeholder_name_terms: [
                "test",
                "placeholder",
                "sample",
                "lorem",
                "dummy",
                "example",
                "tbd",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl VerificationConfig {
    pub fn validate(&self) -> Result<(), CurationError> {
        ensure(
            self.threshold.is_finite() && self.threshold > 0.0 && self.threshold <= 100.0,
            || format!("verification threshold must be in (0, 100], got {}", self.threshold),
        )?;
        let weights = [
            self.trusted_weight,
            self.count_weight,
            self.suspicious_weight,
            self.refetch_weight,
            self.name_weight,
        ];
        ensure(weights.iter().all(|w| w.is_finite() && *w >= 0.0), || {
            "verification weights must be non-negative".to_string()
        })?;
        let total: f64 = weights.iter().sum();
        ensure(total <= 100.0 + 1e-9, || {
            format!("verification weights sum to {total}, must not exceed 100")
        })?;
        ensure(total + 1e-9 >= self.threshold, || {
            format!(
                "verification threshold {} is unreachable with weights summing to {total}",
                self.threshold
            )
        })?;
        ensure(
            self.suspicious_penalty.is_finite() && self.suspicious_penalty >= 0.0,
            || "suspicious_penalty must be non-negative".to_string(),
        )?;
        ensure(
            self.min_photo_count > 0 && self.target_photo_count >= self.min_photo_count,
            || {
                format!(
                    "photo counts must satisfy 0 < M ({}) <= K ({})",
                    self.min_photo_count, self.target_photo_count
                )
            },
        )
    }
}

/// What the authoritative source returned for a hotel.
#[derive(Debug, Clone, PartialEq)]
pub enum FreshPhotos {
    Found(Vec<String>),
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditReport {
    pub confidence: f64,
    pub issues: Vec<String>,
    pub accepted: bool,
}

#[derive(Clone)]
pub struct VerificationAuditor {
    config: VerificationConfig,
    source: Arc<dyn ReverificationSource>,
}

impl VerificationAuditor {
    pub fn new(
        config: VerificationConfig,
        source: Arc<dyn ReverificationSource>,
    ) -> Result<Self, CurationError> {
        config.validate()?;
        Ok(Self { config, source })
    }

    pub fn config(&self) -> &VerificationConfig {
        &self.config
    }

    /// Fetches a fresh photo set and audits the candidate.
    /// Collaborator failures lower confidence; they never propagate.
    pub async fn audit(&self, candidate: &CurationCandidate) -> AuditReport {
        let fresh = match self
            .source
            .fresh_photos(candidate.name(), &candidate.record.city)
            .await
        {
            Ok(Some(urls)) => FreshPhotos::Found(urls),
            Ok(None) => FreshPhotos::NotFound,
            Err(e) => {
                warn!(hotel = %candidate.name(), error = %e, "re-verification lookup failed");
                FreshPhotos::Failed(e.to_string())
            }
        };
        self.assess(candidate, &fresh)
    }

    pub fn assess(&self, candidate: &CurationCandidate, fresh: &FreshPhotos) -> AuditReport {
        let cfg = &self.config;
        let mut issues = Vec::new();
        let count = candidate.photo_count();

        let trusted = candidate
            .photos
            .iter()
            .filter(|p| p.candidate.source_type.is_trusted())
            .count();
        let trusted_points = if count == 0 {
            0.0
        } else {
            cfg.trusted_weight * trusted as f64 / count as f64
        };

        let adequacy = (count as f64 / cfg.target_photo_count as f64).min(1.0);
        let count_points = cfg.count_weight * adequacy;
        if count < cfg.min_photo_count {
            issues.push(format!(
                "insufficient photos: {count} < {}",
                cfg.min_photo_count
            ));
        }

        let mut suspicious_hits = 0usize;
        for photo in &candidate.photos {
            let url = photo.url().to_lowercase();
            for marker in &cfg.suspicious_markers {
                let occurrences = url.matches(marker.to_lowercase().as_str()).count();
                for _ in 0..occurrences {
                    issues.push(format!("suspicious photo marker '{marker}' in {}", photo.url()));
                }
                suspicious_hits += occurrences;
            }
        }
        let suspicious_points =
            (cfg.suspicious_weight - cfg.suspicious_penalty * suspicious_hits as f64).max(0.0);

        let refetch_points = match fresh {
            FreshPhotos::Found(urls) if !urls.is_empty() => cfg.refetch_weight,
            FreshPhotos::Found(_) => {
                issues.push("authoritative source returned no photos".to_string());
                0.0
            }
            FreshPhotos::NotFound => {
                issues.push("hotel not found in authoritative source".to_string());
                0.0
            }
            FreshPhotos::Failed(e) => {
                issues.push(format!("re-verification unavailable: {e}"));
                0.0
            }
        };

        let name_points = match self.name_problem(candidate.name()) {
            Some(problem) => {
                issues.push(problem);
                0.0
            }
            None => cfg.name_weight,
        };

        let confidence = (trusted_points
            + count_points
            + suspicious_points
            + refetch_points
            + name_points)
            .clamp(0.0, 100.0);
        let accepted = confidence >= cfg.threshold && issues.is_empty();

        debug!(
            hotel = %candidate.name(),
            confidence,
            issues = issues.len(),
            accepted,
            "audit complete"
        );

        AuditReport {
            confidence,
            issues,
            accepted,
        }
    }

    fn name_problem(&self, name: &str) -> Option<String> {
        let lower = name.trim().to_lowercase();
        let letters = lower.chars().filter(|c| c.is_alphabetic()).count();
        if letters < 3 {
            return Some(format!("name too short to be real: '{name}'"));
        }
        self.config
            .placeholder_name_terms
            .iter()
            .find(|t| contains_term(&lower, &t.to_lowercase()))
            .map(|t| format!("placeholder name '{name}' (matched '{t}')"))
    }
}
