//! Visual Appeal Scorer: deterministic, keyword-weighted luxury/boutique estimate.
//!
//! Algorithm:
//! 1. Lower-case `name + city + country` (plus amenity tag labels for the amenity taxonomy)
//! 2. For every taxonomy term found at word boundaries, add its weight once
//! 3. appeal = Σ weights, clamped to 0 – 100
//! 4. value = appeal / price when price > 0, else appeal
//!
//! Every point is traceable to a matched term, so results are auditable from
//! the taxonomy alone.

use serde::{Deserialize, Serialize};

use crate::curation::taxonomy::{TaxonomyKind, TaxonomySet};
use crate::models::hotel::RawHotelRecord;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TermMatch {
    pub kind: TaxonomyKind,
    pub term: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppealScore {
    pub appeal: f64, // 0 – 100
    pub value: f64,
    pub matches: Vec<TermMatch>,
}

impl AppealScore {
    pub fn matched_terms(&self) -> Vec<String> {
        self.matches.iter().map(|m| m.term.clone()).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct VisualAppealScorer {
    taxonomies: TaxonomySet,
}

impl VisualAppealScorer {
    pub fn new(taxonomies: TaxonomySet) -> Self {
        Self { taxonomies }
    }

    pub fn score(&self, record: &RawHotelRecord, tags: &[String]) -> AppealScore {
        let text = format!("{} {} {}", record.name, record.city, record.country).to_lowercase();
        let tag_text = tags.join(" | ").to_lowercase();

        let mut matches = Vec::new();
        for taxonomy in self.taxonomies.iter() {
            for wt in &taxonomy.terms {
                let term = wt.term.trim().to_lowercase();
                let hit = contains_term(&text, &term)
                    || (taxonomy.kind.scans_tags() && contains_term(&tag_text, &term));
                if hit {
                    matches.push(TermMatch {
                        kind: taxonomy.kind,
                        term,
                        weight: wt.weight,
                    });
                }
            }
        }

        let appeal = matches
            .iter()
            .map(|m| m.weight)
            .sum::<f64>()
            .clamp(0.0, 100.0);

        AppealScore {
            appeal,
            value: value_score(appeal, record.positive_price()),
            matches,
        }
    }
}

/// appeal / price, falling back to appeal when the price is absent or zero.
pub fn value_score(appeal: f64, price: Option<f64>) -> f64 {
    match price {
        Some(p) if p > 0.0 => appeal / p,
        _ => appeal,
    }
}

/// Substring match that only counts when the term is not embedded in a longer word.
pub(crate) fn contains_term(haystack: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    haystack.match_indices(term).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + term.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
