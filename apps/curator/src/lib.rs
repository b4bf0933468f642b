//! Hotel curation and photo-quality pipeline.
//!
//! Raw hotel records from several content sources go in; a deduplicated,
//! geographically balanced and re-verified set of [`CuratedHotelCard`]s comes
//! out. All network and storage access sits behind the traits in [`ports`].

pub mod adapters;
pub mod config;
pub mod curation;
pub mod errors;
pub mod models;
pub mod photos;
pub mod pipeline;
pub mod ports;

#[cfg(test)]
mod test_support;

pub use config::{Config, PipelineConfig};
pub use errors::CurationError;
pub use models::{CuratedHotelCard, RawHotelRecord, RejectedCandidate, Rejection, SourceRecord};
pub use pipeline::{BatchSummary, CurationPipeline, RunReport};
