use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::curation::geo::resolve_country;
use crate::models::candidate::{CurationCandidate, RejectedCandidate, Rejection};
use crate::photos::{compare_ranked, dedupe_by_url};

/// Lower-cases, turns punctuation into spaces, collapses whitespace.
pub fn normalize_identity_part(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical identity of a physical hotel across sources.
///
/// The country goes through [`resolve_country`], so "FR" and "France" agree.
pub fn identity_key(name: &str, city: &str, country: &str) -> String {
    format!(
        "{}|{}|{}",
        normalize_identity_part(name),
        normalize_identity_part(city),
        normalize_identity_part(&resolve_country(country).key)
    )
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupOutcome {
    /// One candidate per identity key, in first-seen order.
    pub kept: Vec<CurationCandidate>,
    pub collapsed: Vec<RejectedCandidate>,
    pub photos_removed: usize,
}

/// Collapses candidates that describe the same hotel.
///
/// The winner of a collision is the higher appeal score, then the larger
/// selected photo set (as each candidate arrived, before any merging), then the
/// first seen. It absorbs the loser's photos and tags; its photo
/// set is then re-deduplicated by URL, re-ranked and truncated to `max_photos`.
#[derive(Debug, Clone)]
pub struct Deduplicator {
    max_photos: usize,
}

impl Deduplicator {
    pub fn new(max_photos: usize) -> Self {
        Self { max_photos }
    }

    pub fn dedupe(&self, candidates: Vec<CurationCandidate>) -> DedupOutcome {
        let mut kept: Vec<CurationCandidate> = Vec::with_capacity(candidates.len());
        let mut slots: HashMap<String, usize> = HashMap::new();
        // Photo count of each slot's current winner before it absorbed anything.
        let mut own_counts: Vec<usize> = Vec::with_capacity(candidates.len());
        let mut collapsed = Vec::new();

        for candidate in candidates {
            let Some(&slot) = slots.get(&candidate.identity_key) else {
                slots.insert(candidate.identity_key.clone(), kept.len());
                own_counts.push(candidate.photo_count());
                kept.push(candidate);
                continue;
            };

            let incumbent = &mut kept[slot];
            let challenger_wins = candidate.appeal_score > incumbent.appeal_score
                || (candidate.appeal_score == incumbent.appeal_score
                    && candidate.photo_count() > own_counts[slot]);

            let loser = if challenger_wins {
                own_counts[slot] = candidate.photo_count();
                std::mem::replace(incumbent, candidate)
            } else {
                candidate
            };

            let winner = &mut kept[slot];
            debug!(
                identity = %winner.identity_key,
                kept = %winner.record.source.source_ref,
                dropped = %loser.record.source.source_ref,
                "collapsing duplicate hotel"
            );
            collapsed.push(RejectedCandidate::new(
                &loser.record,
                Rejection::Duplicate {
                    kept_identity: winner.identity_key.clone(),
                },
            ));
            winner.photos.extend(loser.photos);
            winner.enrich_tags(loser.tags);
        }

        let mut photos_removed = 0usize;
        for candidate in &mut kept {
            photos_removed += self.dedupe_photos(candidate);
        }

        DedupOutcome {
            kept,
            collapsed,
            photos_removed,
        }
    }

    /// Secondary pass over one candidate's photo set. Returns photos dropped.
    fn dedupe_photos(&self, candidate: &mut CurationCandidate) -> usize {
        let before = candidate.photos.len();
        let photos = std::mem::take(&mut candidate.photos);
        let (mut unique, _) = dedupe_by_url(
            photos,
            |p| p.url(),
            |new, kept| compare_ranked(new, kept).is_lt(),
        );
        unique.sort_by(compare_ranked);
        unique.truncate(self.max_photos);
        candidate.narrow_photos(unique);
        before - candidate.photos.len()
    }
}
