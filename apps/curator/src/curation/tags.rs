use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Maps raw provider amenity codes to display tag labels.
///
/// Codes are matched after lower-casing and turning `_`/`-` into spaces.
/// Codes absent from the table (wifi, parking, ...) produce no tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AmenityTable {
    labels: HashMap<String, String>,
}

impl AmenityTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            labels: entries
                .into_iter()
                .map(|(code, label)| (normalize_code(code.as_ref()), label.into()))
                .collect(),
        }
    }

    pub fn label_for(&self, code: &str) -> Option<&str> {
        self.labels.get(&normalize_code(code)).map(String::as_str)
    }

    /// Derives tag labels from raw codes, first occurrence wins, no duplicates.
    pub fn derive_tags(&self, codes: &[String]) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for code in codes {
            if let Some(label) = self.label_for(code) {
                if !tags.iter().any(|t| t == label) {
                    tags.push(label.to_string());
                }
            }
        }
        tags
    }
}

impl Default for AmenityTable {
    fn default() -> Self {
        Self::new(DEFAULT_AMENITY_LABELS.iter().copied())
    }
}

fn normalize_code(code: &str) -> String {
    code.trim()
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

const DEFAULT_AMENITY_LABELS: &[(&str, &str)] = &[
    ("pool", "Pool"),
    ("outdoor pool", "Pool"),
    ("indoor pool", "Pool"),
    ("infinity pool", "Infinity Pool"),
    ("private pool", "Private Pool"),
    ("plunge pool", "Plunge Pool"),
    ("spa", "Spa"),
    ("wellness", "Spa"),
    ("sauna", "Sauna"),
    ("hammam", "Hammam"),
    ("hot tub", "Hot Tub"),
    ("jacuzzi", "Hot Tub"),
    ("onsen", "Onsen"),
    ("hot spring", "Hot Spring"),
    ("beach", "Beachfront"),
    ("beachfront", "Beachfront"),
    ("beach access", "Beachfront"),
    ("rooftop", "Rooftop"),
    ("rooftop bar", "Rooftop"),
    ("restaurant", "Restaurant"),
    ("fine dining", "Fine Dining"),
    ("michelin restaurant", "Michelin"),
    ("gym", "Fitness"),
    ("fitness center", "Fitness"),
    ("garden", "Garden"),
    ("terrace", "Terrace"),
    ("butler", "Butler Service"),
    ("butler service", "Butler Service"),
    ("sea view", "Sea View"),
    ("ocean view", "Sea View"),
    ("mountain view", "Mountain View"),
    ("fireplace", "Fireplace"),
    ("golf", "Golf"),
    ("golf course", "Golf"),
    ("wine cellar", "Wine Cellar"),
    ("vineyard", "Vineyard"),
    ("ski in ski out", "Ski-in/Ski-out"),
    ("overwater villa", "Overwater"),
    ("pet friendly", "Pet Friendly"),
];
