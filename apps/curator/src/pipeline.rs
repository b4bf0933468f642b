//! Orchestrates the curation stages over a run of raw hotel records.
//!
//! Records are processed in batches. Within a batch the per-candidate work
//! (metadata probing, photo selection, appeal scoring, hard gates) runs on
//! tokio tasks bounded by a semaphore; results are collected back in input
//! order. Dedup and diversity balancing then run sequentially over everything
//! admitted, and the balanced set is re-verified, again batch by batch.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::curation::appeal::VisualAppealScorer;
use crate::curation::dedup::{identity_key, Deduplicator};
use crate::curation::diversity::DiversityBalancer;
use crate::curation::filter::CurationFilter;
use crate::curation::tags::AmenityTable;
use crate::curation::verification::VerificationAuditor;
use crate::errors::CurationError;
use crate::models::{
    CuratedHotelCard, CurationCandidate, PhotoCandidate, PhotoRejection, RawHotelRecord,
    RejectedCandidate, Rejection, ScoredPhoto,
};
use crate::photos::{PhotoQualityScorer, PhotoSelector};
use crate::ports::{CuratedHotelSink, PhotoMetadataProbe, ReverificationSource};

/// What happened to one input batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchSummary {
    pub index: usize,
    pub offered: usize,
    pub admitted: usize,
    /// Candidates lost to a failed task.
    pub dropped: usize,
    /// No admissible hotel came out of this batch (InsufficientCandidates).
    pub insufficient: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// Final cards, in balanced rank order.
    pub cards: Vec<CuratedHotelCard>,
    pub rejected: Vec<RejectedCandidate>,
    pub batches: Vec<BatchSummary>,
    pub admitted_by_filter: usize,
    pub duplicates_collapsed: usize,
    pub first_pass_count: usize,
    pub relaxed_count: usize,
    pub verification_dropped: usize,
}

impl RunReport {
    /// Rejection counts keyed by tag, for summaries.
    pub fn rejection_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for r in &self.rejected {
            *counts.entry(r.rejection.tag()).or_insert(0) += 1;
        }
        counts
    }

    pub fn insufficient_batches(&self) -> impl Iterator<Item = &BatchSummary> {
        self.batches.iter().filter(|b| b.insufficient)
    }
}

/// Per-candidate work up to and including the hard gates.
struct CandidateStage {
    selector: PhotoSelector,
    appeal: VisualAppealScorer,
    amenities: AmenityTable,
    filter: CurationFilter,
    probe: Option<Arc<dyn PhotoMetadataProbe>>,
}

impl CandidateStage {
    async fn assess(&self, record: RawHotelRecord) -> Result<CurationCandidate, RejectedCandidate> {
        let mut photos = record.photos.clone();
        let probe_failures = self.resolve_metadata(&record.name, &mut photos).await;

        let tags = self.amenities.derive_tags(&record.amenity_codes);
        let selection = self.selector.select(&record.name, &photos);

        if selection.selected.is_empty()
            && !selection.rejected.is_empty()
            && selection.rejected.iter().all(lacks_metadata)
        {
            let detail = probe_failures
                .into_iter()
                .next()
                .unwrap_or_else(|| "no photo metadata could be resolved".to_string());
            return Err(RejectedCandidate::new(
                &record,
                Rejection::MetadataUnavailable { detail },
            ));
        }

        let score = self.appeal.score(&record, &tags);
        let candidate = CurationCandidate {
            identity_key: identity_key(&record.name, &record.city, &record.country),
            appeal_score: score.appeal,
            value_score: score.value,
            photos: selection.selected,
            tags,
            matched_terms: score.matched_terms(),
            record,
        };

        match self.filter.check(&candidate) {
            Ok(()) => Ok(candidate),
            Err(failure) => Err(RejectedCandidate::new(
                &candidate.record,
                Rejection::Gate { failure },
            )),
        }
    }

    /// Probes photos with missing metadata. Returns the failure messages.
    async fn resolve_metadata(&self, hotel: &str, photos: &mut [PhotoCandidate]) -> Vec<String> {
        let Some(probe) = &self.probe else {
            return Vec::new();
        };

        let mut failures = Vec::new();
        for photo in photos.iter_mut().filter(|p| p.needs_probe()) {
            match probe.probe(&photo.url).await {
                Ok(meta) => photo.merge_metadata(&meta),
                Err(e) => {
                    debug!(hotel, url = %photo.url, error = %e, "metadata probe failed");
                    failures.push(format!("metadata probe failed for {}: {e}", photo.url));
                }
            }
        }
        failures
    }
}

fn lacks_metadata(photo: &ScoredPhoto) -> bool {
    matches!(
        photo.rejection,
        Some(PhotoRejection::MetadataUnavailable { .. })
    )
}

pub struct CurationPipeline {
    config: PipelineConfig,
    stage: Arc<CandidateStage>,
    deduplicator: Deduplicator,
    balancer: DiversityBalancer,
    auditor: Arc<VerificationAuditor>,
    permits: Arc<Semaphore>,
}

impl CurationPipeline {
    /// Builds every stage from `config`. Any invalid threshold, weight or
    /// taxonomy is a [`CurationError::Configuration`].
    pub fn new(
        config: PipelineConfig,
        probe: Option<Arc<dyn PhotoMetadataProbe>>,
        reverification: Arc<dyn ReverificationSource>,
    ) -> Result<Self, CurationError> {
        config.validate()?;

        let scorer = PhotoQualityScorer::new(config.photo_quality.clone())?;
        let selector = PhotoSelector::new(scorer, config.selector.clone())?;
        let stage = CandidateStage {
            selector,
            appeal: VisualAppealScorer::new(config.taxonomies.clone()),
            amenities: config.amenities.clone(),
            filter: CurationFilter::new(config.filter.clone())?,
            probe,
        };

        Ok(Self {
            deduplicator: Deduplicator::new(config.selector.target_count),
            balancer: DiversityBalancer::new(config.diversity.clone())?,
            auditor: Arc::new(VerificationAuditor::new(
                config.verification.clone(),
                reverification,
            )?),
            permits: Arc::new(Semaphore::new(config.max_concurrency)),
            stage: Arc::new(stage),
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn run(&self, records: Vec<RawHotelRecord>) -> RunReport {
        let mut report = RunReport::default();
        let mut admitted: Vec<CurationCandidate> = Vec::new();

        info!(
            records = records.len(),
            batch_size = self.config.batch_size,
            max_concurrency = self.config.max_concurrency,
            "curation run started"
        );

        for (index, batch) in into_batches(records, self.config.batch_size)
            .into_iter()
            .enumerate()
        {
            let offered = batch.len();
            let stage = Arc::clone(&self.stage);
            let results = self
                .run_bounded(batch, move |record| {
                    let stage = Arc::clone(&stage);
                    async move { stage.assess(record).await }
                })
                .await;

            let mut summary = BatchSummary {
                index,
                offered,
                admitted: 0,
                dropped: 0,
                insufficient: false,
            };
            for result in results {
                match result {
                    Some(Ok(candidate)) => {
                        summary.admitted += 1;
                        admitted.push(candidate);
                    }
                    Some(Err(rejected)) => {
                        debug!(
                            hotel = %rejected.name,
                            reason = %rejected.rejection.tag(),
                            "candidate rejected"
                        );
                        report.rejected.push(rejected);
                    }
                    None => summary.dropped += 1,
                }
            }

            if summary.admitted == 0 {
                summary.insufficient = true;
                warn!(
                    batch = index,
                    offered,
                    "InsufficientCandidates: batch yielded no admissible hotels"
                );
            } else {
                debug!(batch = index, offered, admitted = summary.admitted, "batch complete");
            }
            report.batches.push(summary);
        }
        report.admitted_by_filter = admitted.len();

        let dedup = self.deduplicator.dedupe(admitted);
        report.duplicates_collapsed = dedup.collapsed.len();
        report.rejected.extend(dedup.collapsed);

        let balanced = self.balancer.balance(dedup.kept);
        report.first_pass_count = balanced.first_pass_count;
        report.relaxed_count = balanced.relaxed_count;
        report.rejected.extend(balanced.excluded);

        for batch in into_batches(balanced.selected, self.config.batch_size) {
            let offered = batch.len();
            let auditor = Arc::clone(&self.auditor);
            let audited = self
                .run_bounded(batch, move |candidate| {
                    let auditor = Arc::clone(&auditor);
                    async move {
                        let audit = auditor.audit(&candidate).await;
                        (candidate, audit)
                    }
                })
                .await;

            let completed: Vec<_> = audited.into_iter().flatten().collect();
            report.verification_dropped += offered - completed.len();
            for (candidate, audit) in completed {
                if audit.accepted {
                    report
                        .cards
                        .push(CuratedHotelCard::from_candidate(candidate, audit.confidence));
                } else {
                    report.rejected.push(RejectedCandidate::new(
                        &candidate.record,
                        Rejection::Verification {
                            confidence: audit.confidence,
                            issues: audit.issues,
                        },
                    ));
                }
            }
        }

        info!(
            cards = report.cards.len(),
            rejected = report.rejected.len(),
            duplicates = report.duplicates_collapsed,
            first_pass = report.first_pass_count,
            relaxed = report.relaxed_count,
            "curation run complete"
        );
        report
    }

    /// Runs the pipeline and hands the cards to `sink`. Only sink failures
    /// surface as errors.
    pub async fn run_and_store(
        &self,
        records: Vec<RawHotelRecord>,
        sink: &dyn CuratedHotelSink,
    ) -> Result<RunReport, CurationError> {
        let report = self.run(records).await;
        sink.store(&report.cards).await?;
        Ok(report)
    }

    /// Runs `task` over `items` with at most `max_concurrency` in flight.
    /// Slot `i` holds the result for item `i`, or `None` if its task failed.
    async fn run_bounded<T, R, F, Fut>(&self, items: Vec<T>, task: F) -> Vec<Option<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> Fut,
        Fut: Future<Output = R> + Send + 'static,
    {
        let mut slots: Vec<Option<R>> =
            std::iter::repeat_with(|| None).take(items.len()).collect();
        let mut set = JoinSet::new();

        for (index, item) in items.into_iter().enumerate() {
            let permits = Arc::clone(&self.permits);
            let work = task(item);
            set.spawn(async move {
                let _permit = permits.acquire_owned().await.ok()?;
                Some((index, work.await))
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(Some((index, result))) => slots[index] = Some(result),
                Ok(None) => warn!("concurrency limiter closed, task skipped"),
                Err(e) => warn!(error = %e, "candidate task failed, dropping candidate"),
            }
        }
        slots
    }
}

fn into_batches<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let mut batches = Vec::new();
    let mut iter = items.into_iter();
    loop {
        let batch: Vec<T> = iter.by_ref().take(size).collect();
        if batch.is_empty() {
            return batches;
        }
        batches.push(batch);
    }
}
