use std::collections::HashMap;

use async_trait::async_trait;

use crate::curation::dedup::normalize_identity_part;
use crate::models::{PhotoSourceType, RawHotelRecord, SourceRecord};
use crate::ports::{CollaboratorError, ReverificationSource};

/// Authoritative photo sets held in memory, keyed by normalized name + city.
///
/// The runner fills it from primary-API records, which are the authoritative
/// source for re-verification.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReverification {
    photos: HashMap<String, Vec<String>>,
}

impl InMemoryReverification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, city: &str, urls: Vec<String>) {
        self.photos.insert(key(name, city), urls);
    }

    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a RawHotelRecord>,
    {
        let mut source = Self::new();
        for record in records {
            let urls = record.photos.iter().map(|p| p.url.clone()).collect();
            source.insert(&record.name, &record.city, urls);
        }
        source
    }

    /// Builds the authority from the primary-API entries of a source dump.
    /// Other source shapes are not authoritative and are skipped.
    pub fn from_sources(sources: &[SourceRecord]) -> Self {
        let primary: Vec<RawHotelRecord> = sources
            .iter()
            .filter(|s| s.source_type() == PhotoSourceType::PrimaryApi)
            .cloned()
            .map(SourceRecord::into_raw)
            .collect();
        Self::from_records(&primary)
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }
}

fn key(name: &str, city: &str) -> String {
    format!(
        "{}|{}",
        normalize_identity_part(name),
        normalize_identity_part(city)
    )
}

#[async_trait]
impl ReverificationSource for InMemoryReverification {
    async fn fresh_photos(
        &self,
        name: &str,
        city: &str,
    ) -> Result<Option<Vec<String>>, CollaboratorError> {
        Ok(self.photos.get(&key(name, city)).cloned())
    }
}
