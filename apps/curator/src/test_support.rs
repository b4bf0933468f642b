// Shared fixtures for in-module tests.

use async_trait::async_trait;

use crate::curation::dedup::identity_key;
use crate::models::{
    CurationCandidate, PhotoCandidate, PhotoSourceType, PhotoVerdict, RawHotelRecord,
    ScoredPhoto, SourceId,
};
use crate::ports::{CollaboratorError, ReverificationSource};

fn slug(s: &str) -> String {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// A primary-API record with no photos, price or rating.
pub fn raw_record(name: &str, city: &str, country: &str) -> RawHotelRecord {
    RawHotelRecord {
        source: SourceId {
            source_type: PhotoSourceType::PrimaryApi,
            source_ref: slug(name),
        },
        name: name.to_string(),
        city: city.to_string(),
        country: country.to_string(),
        coordinates: None,
        description: String::new(),
        amenity_codes: Vec::new(),
        photos: Vec::new(),
        price: None,
        rating: None,
    }
}

/// Accepted primary-API photo with full metadata.
pub fn scored_photo(url: &str, score: f64) -> ScoredPhoto {
    ScoredPhoto {
        candidate: PhotoCandidate::new(url, PhotoSourceType::PrimaryApi)
            .with_dimensions(2000, 1333)
            .with_file_size(800_000),
        quality_score: score,
        verdict: PhotoVerdict::Accepted,
        rejection: None,
    }
}

/// A candidate past the appeal stage with `photos` accepted photos, best first.
pub fn candidate(
    name: &str,
    city: &str,
    country: &str,
    appeal: f64,
    photos: usize,
) -> CurationCandidate {
    let record = raw_record(name, city, country);
    let base = slug(name);
    CurationCandidate {
        identity_key: identity_key(name, city, country),
        appeal_score: appeal,
        value_score: appeal,
        photos: (0..photos)
            .map(|i| {
                scored_photo(
                    &format!("https://cdn.example.com/{base}/{i}.jpg"),
                    95.0 - i as f64,
                )
            })
            .collect(),
        tags: Vec::new(),
        matched_terms: Vec::new(),
        record,
    }
}

/// A photo the probe-free pipeline will accept as-is.
pub fn good_photo(url: &str, source: PhotoSourceType) -> PhotoCandidate {
    PhotoCandidate::new(url, source)
        .with_dimensions(2000, 1333)
        .with_file_size(800_000)
}

/// Re-verification stub returning the same answer for every hotel.
pub struct StaticReverification {
    answer: Option<Vec<String>>,
    fail: bool,
}

impl StaticReverification {
    pub fn found() -> Self {
        Self {
            answer: Some(vec!["https://authority.example.com/1.jpg".to_string()]),
            fail: false,
        }
    }

    pub fn not_found() -> Self {
        Self {
            answer: None,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            fail: true,
        }
    }
}

#[async_trait]
impl ReverificationSource for StaticReverification {
    async fn fresh_photos(
        &self,
        _name: &str,
        _city: &str,
    ) -> Result<Option<Vec<String>>, CollaboratorError> {
        if self.fail {
            return Err(CollaboratorError::Unavailable("authority offline".to_string()));
        }
        Ok(self.answer.clone())
    }
}
