use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use curator::adapters::{HttpPhotoProbe, InMemoryReverification, JsonFileSink};
use curator::ports::PhotoMetadataProbe;
use curator::{Config, CurationPipeline, RawHotelRecord, SourceRecord};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting curator v{}", env!("CARGO_PKG_VERSION"));

    let pipeline_config = config.pipeline_config()?;
    info!(
        "Pipeline config: profile {:?}, target size {}, batch size {}",
        config.profile, pipeline_config.diversity.target_size, pipeline_config.batch_size
    );

    let sources = load_sources(&config.input_path).await?;
    info!("Loaded {} hotel records from {}", sources.len(), config.input_path.display());

    let reverification = match &config.authority_path {
        Some(path) => InMemoryReverification::from_sources(&load_sources(path).await?),
        None => {
            // Stand-in: without a dedicated authority dump, the input's own
            // primary-API entries answer re-verification.
            warn!("CURATOR_AUTHORITY not set; re-verifying against the input's primary-API records");
            InMemoryReverification::from_sources(&sources)
        }
    };
    info!("Re-verification source holds {} hotels", reverification.len());

    let records: Vec<RawHotelRecord> = sources.into_iter().map(SourceRecord::into_raw).collect();

    let probe: Option<Arc<dyn PhotoMetadataProbe>> = if config.probe_http {
        let probe = HttpPhotoProbe::new(config.retry.clone(), config.probe_timeout_secs)
            .context("Failed to build HTTP photo probe")?;
        info!("HTTP photo probe enabled (timeout {}s)", config.probe_timeout_secs);
        Some(Arc::new(probe))
    } else {
        None
    };

    let pipeline = CurationPipeline::new(pipeline_config, probe, Arc::new(reverification))?;

    let report = match &config.output_path {
        Some(path) => pipeline
            .run_and_store(records, &JsonFileSink::new(path))
            .await
            .with_context(|| format!("Failed to write curated hotels to {}", path.display()))?,
        None => {
            let report = pipeline.run(records).await;
            println!("{}", serde_json::to_string_pretty(&report.cards)?);
            report
        }
    };

    for batch in report.insufficient_batches() {
        warn!("Batch {} ({} records) yielded no admissible hotels", batch.index, batch.offered);
    }
    for (tag, count) in report.rejection_counts() {
        info!("Rejected {count}: {tag}");
    }
    for card in &report.cards {
        debug!(
            "{} ({}, {}): confidence {:.2}, hero {}",
            card.name,
            card.city,
            card.country,
            card.confidence,
            card.hero_photo().unwrap_or("-")
        );
    }
    info!(
        "Curated {} hotels ({} first pass, {} relaxed)",
        report.cards.len(),
        report.first_pass_count,
        report.relaxed_count
    );

    Ok(())
}

/// Reads a JSON array of tagged source records.
async fn load_sources(path: &Path) -> Result<Vec<SourceRecord>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid source records in {}", path.display()))
}
