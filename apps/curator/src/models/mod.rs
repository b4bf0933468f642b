pub mod candidate;
pub mod hotel;
pub mod photo;
pub mod source;

pub use candidate::{CuratedHotelCard, CurationCandidate, RejectedCandidate, Rejection};
pub use hotel::{Coordinates, Price, RawHotelRecord, SourceId};
pub use photo::{
    PhotoCandidate, PhotoMetadata, PhotoRejection, PhotoSourceType, PhotoVerdict, ScoredPhoto,
};
pub use source::SourceRecord;
