// Curation stages, in pipeline order:
// appeal scoring → hard gates → dedup → diversity balancing → verification.
// Keyword lists and thresholds are configuration data handed in at construction.

pub mod appeal;
pub mod dedup;
pub mod diversity;
pub mod filter;
pub mod geo;
pub mod tags;
pub mod taxonomy;
pub mod verification;

pub use appeal::{AppealScore, VisualAppealScorer};
pub use dedup::{identity_key, DedupOutcome, Deduplicator};
pub use diversity::{BalanceOutcome, DiversityBalancer, DiversityBucket, DiversityConfig, PriceTier, RankBy};
pub use filter::{CallerProfile, CurationFilter, FilterConfig, GateFailure};
pub use tags::AmenityTable;
pub use taxonomy::{Taxonomy, TaxonomyKind, TaxonomySet, WeightedTerm};
pub use verification::{AuditReport, FreshPhotos, VerificationAuditor, VerificationConfig};
