//! Keyword taxonomies for visual-appeal scoring.
//!
//! Taxonomies are plain data handed to the scorer at construction. The
//! defaults below are the curated lists; tests and callers can supply others.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{ensure, CurationError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyKind {
    Architecture,
    Amenity,
    Destination,
    Brand,
}

impl TaxonomyKind {
    /// Whether amenity tag labels are scanned in addition to name + location.
    pub fn scans_tags(self) -> bool {
        matches!(self, TaxonomyKind::Amenity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightedTerm {
    pub term: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Taxonomy {
    pub kind: TaxonomyKind,
    pub terms: Vec<WeightedTerm>,
}

impl Taxonomy {
    pub fn new(kind: TaxonomyKind, terms: &[(&str, f64)]) -> Self {
        Self {
            kind,
            terms: terms
                .iter()
                .map(|(term, weight)| WeightedTerm {
                    term: term.to_string(),
                    weight: *weight,
                })
                .collect(),
        }
    }
}

/// The four taxonomies, checked for disjointness on construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxonomySet {
    taxonomies: Vec<Taxonomy>,
}

impl TaxonomySet {
    pub fn new(taxonomies: Vec<Taxonomy>) -> Result<Self, CurationError> {
        let set = Self { taxonomies };
        set.validate()?;
        Ok(set)
    }

    /// Every term non-empty, positively weighted, and present in one taxonomy only.
    pub fn validate(&self) -> Result<(), CurationError> {
        let mut seen: HashMap<String, TaxonomyKind> = HashMap::new();

        for taxonomy in &self.taxonomies {
            for wt in &taxonomy.terms {
                let term = wt.term.trim().to_lowercase();
                ensure(!term.is_empty(), || {
                    format!("empty term in {:?} taxonomy", taxonomy.kind)
                })?;
                ensure(wt.weight.is_finite() && wt.weight > 0.0, || {
                    format!(
                        "term '{}' in {:?} taxonomy has non-positive weight {}",
                        wt.term, taxonomy.kind, wt.weight
                    )
                })?;
                if let Some(other) = seen.insert(term.clone(), taxonomy.kind) {
                    return Err(CurationError::config(format!(
                        "term '{term}' appears in both {other:?} and {:?} taxonomies",
                        taxonomy.kind
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Taxonomy> {
        self.taxonomies.iter()
    }
}

impl Default for TaxonomySet {
    fn default() -> Self {
        Self {
            taxonomies: vec![
                Taxonomy::new(TaxonomyKind::Architecture, ARCHITECTURE_TERMS),
                Taxonomy::new(TaxonomyKind::Amenity, AMENITY_TERMS),
                Taxonomy::new(TaxonomyKind::Destination, DESTINATION_TERMS),
                Taxonomy::new(TaxonomyKind::Brand, BRAND_TERMS),
            ],
        }
    }
}

const ARCHITECTURE_TERMS: &[(&str, f64)] = &[
    ("palace", 3.0),
    ("palazzo", 3.0),
    ("castle", 3.0),
    ("chateau", 3.0),
    ("château", 3.0),
    ("manor", 3.0),
    ("villa", 3.0),
    ("mansion", 3.0),
    ("riad", 3.0),
    ("ryokan", 3.0),
    ("treehouse", 3.0),
    ("lighthouse", 3.0),
    ("monastery", 3.0),
    ("cave", 3.0),
    ("historic", 3.0),
    ("heritage", 3.0),
    ("art deco", 3.0),
    ("boutique", 3.0),
    ("design", 3.0),
    ("loft", 3.0),
    ("cabin", 3.0),
    ("lodge", 3.0),
    ("glass", 3.0),
    ("tower", 3.0),
];

const AMENITY_TERMS: &[(&str, f64)] = &[
    ("infinity pool", 4.0),
    ("rooftop", 3.0),
    ("overwater", 4.0),
    ("private pool", 4.0),
    ("plunge pool", 3.0),
    ("hot spring", 4.0),
    ("onsen", 4.0),
    ("spa", 3.0),
    ("hammam", 3.0),
    ("wine cellar", 2.0),
    ("vineyard", 3.0),
    ("terrace", 2.0),
    ("garden", 2.0),
    ("beach club", 3.0),
    ("michelin", 4.0),
    ("fine dining", 3.0),
    ("sauna", 2.0),
    ("butler", 3.0),
    ("fireplace", 2.0),
    ("golf", 2.0),
];

const DESTINATION_TERMS: &[(&str, f64)] = &[
    ("santorini", 5.0),
    ("amalfi", 5.0),
    ("positano", 5.0),
    ("maldives", 5.0),
    ("bora bora", 5.0),
    ("kyoto", 4.0),
    ("bali", 4.0),
    ("ubud", 4.0),
    ("tulum", 4.0),
    ("marrakech", 4.0),
    ("capri", 5.0),
    ("lake como", 5.0),
    ("seychelles", 5.0),
    ("patagonia", 4.0),
    ("provence", 4.0),
    ("tuscany", 4.0),
    ("riviera", 4.0),
    ("alps", 3.0),
    ("cliff", 3.0),
    ("oceanfront", 3.0),
    ("lagoon", 3.0),
    ("island", 3.0),
    ("desert", 3.0),
    ("jungle", 3.0),
];

const BRAND_TERMS: &[(&str, f64)] = &[
    ("aman", 2.0),
    ("six senses", 2.0),
    ("belmond", 2.0),
    ("rosewood", 2.0),
    ("four seasons", 2.0),
    ("mandarin oriental", 2.0),
    ("ritz-carlton", 2.0),
    ("st. regis", 2.0),
    ("edition", 1.0),
    ("relais & châteaux", 2.0),
    ("small luxury hotels", 1.0),
    ("design hotels", 1.0),
    ("collection", 1.0),
    ("resort", 1.0),
    ("suites", 1.0),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_taxonomies_are_disjoint() {
        let result = TaxonomySet::default().validate();
        assert!(result.is_ok(), "{:?}", result.err());
    }

    #[test]
    fn test_overlapping_term_is_rejected() {
        let err = TaxonomySet::new(vec![
            Taxonomy::new(TaxonomyKind::Architecture, &[("villa", 3.0)]),
            Taxonomy::new(TaxonomyKind::Brand, &[("Villa", 1.0)]),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("villa"));
    }

    #[test]
    fn test_non_positive_weight_is_rejected() {
        assert!(TaxonomySet::new(vec![Taxonomy::new(
            TaxonomyKind::Amenity,
            &[("spa", 0.0)]
        )])
        .is_err());
    }

    #[test]
    fn test_only_amenity_taxonomy_scans_tags() {
        assert!(TaxonomyKind::Amenity.scans_tags());
        assert!(!TaxonomyKind::Destination.scans_tags());
    }
}
