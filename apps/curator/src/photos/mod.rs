// Photo stage: per-photo quality scoring and per-hotel selection.
// Pure functions over supplied metadata; probing lives behind ports::PhotoMetadataProbe.

pub mod quality;
pub mod selector;
pub mod url;

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::photo::ScoredPhoto;

pub use quality::{PhotoQualityConfig, PhotoQualityScorer};
pub use selector::{PhotoSelector, SelectionOutcome, SelectorConfig};
pub use url::normalize_photo_url;

/// Display order for selected photos: quality descending, then source priority.
/// Equal elements keep their input order under a stable sort.
pub fn compare_ranked(a: &ScoredPhoto, b: &ScoredPhoto) -> Ordering {
    b.quality_score
        .partial_cmp(&a.quality_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            b.candidate
                .source_type
                .priority()
                .cmp(&a.candidate.source_type.priority())
        })
}

/// Collapses items that share a normalized URL (exact matches included).
///
/// `replaces(new, kept)` decides whether a later duplicate should take the
/// earlier one's slot. Slot order is first-seen order. Returns the survivors
/// and the number of duplicates removed.
pub fn dedupe_by_url<T, U, R>(items: Vec<T>, url: U, replaces: R) -> (Vec<T>, usize)
where
    U: Fn(&T) -> &str,
    R: Fn(&T, &T) -> bool,
{
    let mut kept: Vec<T> = Vec::with_capacity(items.len());
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut removed = 0usize;

    for item in items {
        let key = normalize_photo_url(url(&item));
        match index.get(&key) {
            Some(&slot) => {
                removed += 1;
                if replaces(&item, &kept[slot]) {
                    kept[slot] = item;
                }
            }
            None => {
                index.insert(key, kept.len());
                kept.push(item);
            }
        }
    }

    (kept, removed)
}
