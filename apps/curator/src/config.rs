use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::curation::{
    AmenityTable, CallerProfile, DiversityConfig, FilterConfig, TaxonomySet, VerificationConfig,
};
use crate::errors::{ensure, CurationError};
use crate::photos::{PhotoQualityConfig, SelectorConfig};
use crate::ports::RetryPolicy;

pub const MIN_BATCH_SIZE: usize = 5;
pub const MAX_BATCH_SIZE: usize = 25;

/// Every threshold, weight and lookup table the pipeline runs with.
///
/// Deserializes from a partial JSON document: missing sections fall back to
/// their defaults. Nothing is trusted until [`PipelineConfig::validate`] passes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub batch_size: usize,
    pub max_concurrency: usize,
    pub photo_quality: PhotoQualityConfig,
    pub selector: SelectorConfig,
    pub filter: FilterConfig,
    pub diversity: DiversityConfig,
    pub verification: VerificationConfig,
    pub taxonomies: TaxonomySet,
    pub amenities: AmenityTable,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::for_profile(CallerProfile::Standard)
    }
}

impl PipelineConfig {
    pub fn for_profile(profile: CallerProfile) -> Self {
        Self {
            batch_size: 10,
            max_concurrency: 4,
            photo_quality: PhotoQualityConfig::default(),
            selector: SelectorConfig::default(),
            filter: FilterConfig::for_profile(profile),
            diversity: DiversityConfig::default(),
            verification: VerificationConfig::default(),
            taxonomies: TaxonomySet::default(),
            amenities: AmenityTable::default(),
        }
    }

    /// Sets K and M everywhere they are consulted.
    pub fn with_photo_counts(mut self, target: usize, min: usize) -> Self {
        self.selector.target_count = target;
        self.selector.min_count = min;
        self.filter.min_photos = min;
        self.verification.target_photo_count = target;
        self.verification.min_photo_count = min;
        self
    }

    pub fn with_target_size(mut self, n: usize) -> Self {
        self.diversity.target_size = n;
        self
    }

    pub fn validate(&self) -> Result<(), CurationError> {
        ensure(
            (MIN_BATCH_SIZE..=MAX_BATCH_SIZE).contains(&self.batch_size),
            || {
                format!(
                    "batch_size must be {MIN_BATCH_SIZE}..={MAX_BATCH_SIZE}, got {}",
                    self.batch_size
                )
            },
        )?;
        ensure(self.max_concurrency > 0, || {
            "max_concurrency must be at least 1".to_string()
        })?;

        self.photo_quality.validate()?;
        self.selector.validate()?;
        self.filter.validate()?;
        self.diversity.validate()?;
        self.verification.validate()?;
        self.taxonomies.validate()?;

        // K and M are one setting spread over three stages.
        ensure(self.filter.min_photos == self.selector.min_count, || {
            format!(
                "filter.min_photos ({}) must equal selector.min_count ({})",
                self.filter.min_photos, self.selector.min_count
            )
        })?;
        ensure(
            self.verification.min_photo_count == self.selector.min_count
                && self.verification.target_photo_count == self.selector.target_count,
            || {
                format!(
                    "verification photo counts ({}/{}) must match the selector ({}/{})",
                    self.verification.target_photo_count,
                    self.verification.min_photo_count,
                    self.selector.target_count,
                    self.selector.min_count
                )
            },
        )
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid pipeline config JSON in {}", path.display()))
    }
}

/// Runner configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub input_path: PathBuf,
    /// Source dump whose primary-API entries back re-verification.
    pub authority_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub pipeline_config_path: Option<PathBuf>,
    pub profile: CallerProfile,
    pub target_size: Option<usize>,
    pub batch_size: Option<usize>,
    pub max_concurrency: Option<usize>,
    pub probe_http: bool,
    pub probe_timeout_secs: u64,
    pub retry: RetryPolicy,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            input_path: require_env("CURATOR_INPUT")?.into(),
            authority_path: std::env::var("CURATOR_AUTHORITY").ok().map(PathBuf::from),
            output_path: std::env::var("CURATOR_OUTPUT").ok().map(PathBuf::from),
            pipeline_config_path: std::env::var("CURATOR_PIPELINE_CONFIG")
                .ok()
                .map(PathBuf::from),
            profile: std::env::var("CURATOR_PROFILE")
                .unwrap_or_else(|_| "standard".to_string())
                .parse::<CallerProfile>()
                .context("CURATOR_PROFILE must be 'standard' or 'strict'")?,
            target_size: optional_env("CURATOR_TARGET_SIZE")?,
            batch_size: optional_env("CURATOR_BATCH_SIZE")?,
            max_concurrency: optional_env("CURATOR_MAX_CONCURRENCY")?,
            probe_http: optional_env("CURATOR_PROBE_HTTP")?.unwrap_or(false),
            probe_timeout_secs: optional_env("CURATOR_PROBE_TIMEOUT_SECS")?.unwrap_or(10),
            retry: RetryPolicy::default(),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Pipeline config from the JSON file (or the profile preset), with
    /// environment overrides applied on top. Validated before returning.
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut pipeline = match &self.pipeline_config_path {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::for_profile(self.profile),
        };

        if let Some(n) = self.target_size {
            pipeline = pipeline.with_target_size(n);
        }
        if let Some(size) = self.batch_size {
            pipeline.batch_size = size;
        }
        if let Some(permits) = self.max_concurrency {
            pipeline.max_concurrency = permits;
        }

        pipeline
            .validate()
            .context("Pipeline configuration is invalid")?;
        Ok(pipeline)
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner_config() -> Config {
        Config {
            input_path: "hotels.json".into(),
            authority_path: None,
            output_path: None,
            pipeline_config_path: None,
            profile: CallerProfile::Standard,
            target_size: None,
            batch_size: None,
            max_concurrency: None,
            probe_http: false,
            probe_timeout_secs: 10,
            retry: RetryPolicy::none(),
            rust_log: "info".to_string(),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
        assert!(PipelineConfig::for_profile(CallerProfile::Strict)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_batch_size_bounds() {
        for size in [4, 26] {
            let config = PipelineConfig {
                batch_size: size,
                ..PipelineConfig::default()
            };
            assert!(config.validate().is_err(), "batch_size {size} accepted");
        }
        for size in [5, 25] {
            let config = PipelineConfig {
                batch_size: size,
                ..PipelineConfig::default()
            };
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_mismatched_min_photos_is_rejected() {
        let mut config = PipelineConfig::default();
        config.filter.min_photos = 3;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("min_photos"));
    }

    #[test]
    fn test_with_photo_counts_keeps_stages_consistent() {
        let config = PipelineConfig::default().with_photo_counts(6, 3);
        assert!(config.validate().is_ok());
        assert_eq!(config.filter.min_photos, 3);
        assert_eq!(config.verification.target_photo_count, 6);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "batch_size": 20, "max_concurrency": 8 }"#).unwrap();
        assert_eq!(config.batch_size, 20);
        assert_eq!(config.max_concurrency, 8);
        assert_eq!(config.selector, SelectorConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides_apply_on_top_of_profile() {
        let config = Config {
            profile: CallerProfile::Strict,
            target_size: Some(20),
            batch_size: Some(15),
            ..runner_config()
        };
        let pipeline = config.pipeline_config().unwrap();
        assert_eq!(pipeline.filter.rating_floor, 4.2);
        assert_eq!(pipeline.diversity.target_size, 20);
        assert_eq!(pipeline.batch_size, 15);
    }

    #[test]
    fn test_invalid_override_is_fatal() {
        let config = Config {
            batch_size: Some(40),
            ..runner_config()
        };
        assert!(config.pipeline_config().is_err());
    }

    #[test]
    fn test_pipeline_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.json");
        std::fs::write(&path, r#"{ "diversity": { "target_size": 12, "country_cap": 0.25, "continent_cap": 0.5, "price_tier_cap": 0.5, "relax_factor": 2.0, "budget_max": 150.0, "mid_max": 350.0, "luxury_max": 800.0, "default_tier": "mid", "rank_by": "value" } }"#).unwrap();

        let config = Config {
            pipeline_config_path: Some(path),
            ..runner_config()
        };
        let pipeline = config.pipeline_config().unwrap();
        assert_eq!(pipeline.diversity.target_size, 12);
        assert_eq!(pipeline.batch_size, 10);
    }

    #[test]
    fn test_missing_config_file_is_reported() {
        let config = Config {
            pipeline_config_path: Some("/nonexistent/pipeline.json".into()),
            ..runner_config()
        };
        let err = config.pipeline_config().unwrap_err();
        assert!(err.to_string().contains("pipeline config"));
    }
}
