use serde::{Deserialize, Serialize};

use crate::models::photo::{PhotoCandidate, PhotoSourceType};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Price {
    pub amount: f64,
    pub currency: String,
}

impl Price {
    pub fn new(amount: f64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }
}

/// Identifies the collaborator a record was obtained from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SourceId {
    pub source_type: PhotoSourceType,
    pub source_ref: String,
}

/// Canonical hotel record every stage consumes. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawHotelRecord {
    pub source: SourceId,
    pub name: String,
    pub city: String,
    pub country: String,
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amenity_codes: Vec<String>,
    #[serde(default)]
    pub photos: Vec<PhotoCandidate>,
    pub price: Option<Price>,
    pub rating: Option<f64>,
}

impl RawHotelRecord {
    /// Human-readable "City, Country" string used for keyword scanning and logs.
    pub fn location(&self) -> String {
        match (self.city.is_empty(), self.country.is_empty()) {
            (false, false) => format!("{}, {}", self.city, self.country),
            (false, true) => self.city.clone(),
            (true, false) => self.country.clone(),
            (true, true) => String::new(),
        }
    }

    /// Price amount when it is usable as a divisor.
    pub fn positive_price(&self) -> Option<f64> {
        self.price
            .as_ref()
            .map(|p| p.amount)
            .filter(|a| a.is_finite() && *a > 0.0)
    }
}
