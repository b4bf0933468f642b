use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::curation::filter::GateFailure;
use crate::models::hotel::{Coordinates, Price, RawHotelRecord};
use crate::models::photo::{PhotoSourceType, ScoredPhoto};

/// A hotel moving through the curation stages.
///
/// Scores are set once by the appeal scorer. Later stages may only narrow the
/// photo set or add tags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurationCandidate {
    pub record: RawHotelRecord,
    pub appeal_score: f64, // 0 – 100
    pub value_score: f64,
    pub identity_key: String,
    pub photos: Vec<ScoredPhoto>,
    pub tags: Vec<String>,
    pub matched_terms: Vec<String>,
}

impl CurationCandidate {
    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn photo_count(&self) -> usize {
        self.photos.len()
    }

    /// Replaces the photo set. Every photo must already be accepted.
    pub fn narrow_photos(&mut self, photos: Vec<ScoredPhoto>) {
        debug_assert!(photos.iter().all(ScoredPhoto::is_accepted));
        self.photos = photos;
    }

    /// Adds tags not already present, preserving existing order.
    pub fn enrich_tags<I: IntoIterator<Item = String>>(&mut self, tags: I) {
        for tag in tags {
            if !self.tags.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
                self.tags.push(tag);
            }
        }
    }
}

/// Why a candidate left the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    /// Every photo failed metadata resolution.
    MetadataUnavailable { detail: String },
    Gate { failure: GateFailure },
    Duplicate { kept_identity: String },
    DiversityCap { bucket: String },
    /// Ranked below the target size cutoff.
    BelowCutoff { rank: usize },
    Verification { confidence: f64, issues: Vec<String> },
}

impl Rejection {
    pub fn tag(&self) -> String {
        match self {
            Rejection::MetadataUnavailable { .. } => "metadata unavailable".to_string(),
            Rejection::Gate { failure } => failure.tag().to_string(),
            Rejection::Duplicate { .. } => "duplicate".to_string(),
            Rejection::DiversityCap { .. } => "diversity cap".to_string(),
            Rejection::BelowCutoff { .. } => "below cutoff".to_string(),
            Rejection::Verification { .. } => "verification failed".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RejectedCandidate {
    pub name: String,
    pub location: String,
    pub rejection: Rejection,
}

impl RejectedCandidate {
    pub fn new(record: &RawHotelRecord, rejection: Rejection) -> Self {
        Self {
            name: record.name.clone(),
            location: record.location(),
            rejection,
        }
    }
}

/// Terminal output handed to the persistence collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CuratedHotelCard {
    pub id: Uuid,
    pub identity_key: String,
    pub name: String,
    pub city: String,
    pub country: String,
    pub coordinates: Option<Coordinates>,
    pub description: String,
    pub price: Option<Price>,
    pub rating: Option<f64>,
    /// Hero photo first.
    pub photo_urls: Vec<String>,
    pub tags: Vec<String>,
    pub appeal_score: f64,
    pub confidence: f64,
    pub source: PhotoSourceType,
}

impl CuratedHotelCard {
    /// Card ids are derived from the identity key, so re-runs produce the same id.
    pub fn from_candidate(candidate: CurationCandidate, confidence: f64) -> Self {
        let id = Uuid::new_v5(&Uuid::NAMESPACE_OID, candidate.identity_key.as_bytes());
        let CurationCandidate {
            record,
            appeal_score,
            identity_key,
            photos,
            tags,
            ..
        } = candidate;

        Self {
            id,
            identity_key,
            name: record.name,
            city: record.city,
            country: record.country,
            coordinates: record.coordinates,
            description: record.description,
            price: record.price,
            rating: record.rating,
            photo_urls: photos.into_iter().map(|p| p.candidate.url).collect(),
            tags,
            appeal_score,
            confidence,
            source: record.source.source_type,
        }
    }

    pub fn hero_photo(&self) -> Option<&str> {
        self.photo_urls.first().map(String::as_str)
    }
}
