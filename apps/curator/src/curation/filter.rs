//! Curation Filter: hard admission gates.
//!
//! Gates run cheapest first and stop at the first failure:
//! chain list → rating floor → price bounds → minimum photo count.

use serde::{Deserialize, Serialize};

use crate::errors::{ensure, CurationError};
use crate::models::candidate::CurationCandidate;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "gate", rename_all = "snake_case")]
pub enum GateFailure {
    ExcludedChain { keyword: String },
    RatingTooLow { rating: f64, floor: f64 },
    PriceOutOfRange { amount: f64, min: f64, max: f64 },
    InsufficientPhotos { count: usize, min: usize },
}

impl GateFailure {
    pub fn tag(&self) -> &'static str {
        match self {
            GateFailure::ExcludedChain { .. } => "excluded chain",
            GateFailure::RatingTooLow { .. } => "rating too low",
            GateFailure::PriceOutOfRange { .. } => "price out of range",
            GateFailure::InsufficientPhotos { .. } => "insufficient photos",
        }
    }
}

/// Rating floors differ per calling workflow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CallerProfile {
    #[default]
    Standard,
    Strict,
}

impl CallerProfile {
    pub fn rating_floor(self) -> f64 {
        match self {
            CallerProfile::Standard => 4.0,
            CallerProfile::Strict => 4.2,
        }
    }
}

impl std::str::FromStr for CallerProfile {
    type Err = CurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(CallerProfile::Standard),
            "strict" => Ok(CallerProfile::Strict),
            other => Err(CurationError::config(format!(
                "unknown caller profile '{other}' (expected 'standard' or 'strict')"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterConfig {
    pub excluded_chains: Vec<String>,
    pub rating_floor: f64,
    pub min_price: f64,
    pub max_price: f64,
    /// Mirrors the selector's M.
    pub min_photos: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self::for_profile(CallerProfile::Standard)
    }
}

impl FilterConfig {
    pub fn for_profile(profile: CallerProfile) -> Self {
        Self {
            excluded_chains: DEFAULT_EXCLUDED_CHAINS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rating_floor: profile.rating_floor(),
            min_price: 80.0,
            max_price: 5_000.0,
            min_photos: 4,
        }
    }

    pub fn validate(&self) -> Result<(), CurationError> {
        ensure(
            self.rating_floor.is_finite() && (0.0..=5.0).contains(&self.rating_floor),
            || format!("rating_floor must be within 0–5, got {}", self.rating_floor),
        )?;
        ensure(
            self.min_price.is_finite() && self.max_price.is_finite() && self.min_price >= 0.0,
            || "price bounds must be finite and non-negative".to_string(),
        )?;
        ensure(self.min_price <= self.max_price, || {
            format!(
                "min_price ({}) must not exceed max_price ({})",
                self.min_price, self.max_price
            )
        })?;
        ensure(self.min_photos > 0, || {
            "min_photos must be at least 1".to_string()
        })?;
        ensure(
            self.excluded_chains.iter().all(|c| !c.trim().is_empty()),
            || "excluded chain keywords must not be empty".to_string(),
        )
    }
}

const DEFAULT_EXCLUDED_CHAINS: &[&str] = &[
    "holiday inn",
    "best western",
    "ibis",
    "motel 6",
    "super 8",
    "days inn",
    "comfort inn",
    "travelodge",
    "premier inn",
    "hampton inn",
    "red roof",
    "la quinta",
    "econo lodge",
    "quality inn",
];

#[derive(Debug, Clone)]
pub struct CurationFilter {
    config: FilterConfig,
    chains_lower: Vec<String>,
}

impl CurationFilter {
    pub fn new(config: FilterConfig) -> Result<Self, CurationError> {
        config.validate()?;
        let chains_lower = config
            .excluded_chains
            .iter()
            .map(|c| c.trim().to_lowercase())
            .collect();
        Ok(Self {
            config,
            chains_lower,
        })
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn check(&self, candidate: &CurationCandidate) -> Result<(), GateFailure> {
        let name_lower = candidate.name().to_lowercase();
        if let Some(keyword) = self.chains_lower.iter().find(|c| name_lower.contains(c.as_str())) {
            return Err(GateFailure::ExcludedChain {
                keyword: keyword.clone(),
            });
        }

        if let Some(rating) = candidate.record.rating {
            if rating < self.config.rating_floor {
                return Err(GateFailure::RatingTooLow {
                    rating,
                    floor: self.config.rating_floor,
                });
            }
        }

        if let Some(price) = &candidate.record.price {
            if price.amount < self.config.min_price || price.amount > self.config.max_price {
                return Err(GateFailure::PriceOutOfRange {
                    amount: price.amount,
                    min: self.config.min_price,
                    max: self.config.max_price,
                });
            }
        }

        if candidate.photo_count() < self.config.min_photos {
            return Err(GateFailure::InsufficientPhotos {
                count: candidate.photo_count(),
                min: self.config.min_photos,
            });
        }

        Ok(())
    }
}
