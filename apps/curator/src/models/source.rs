//! Per-source input shapes.
//!
//! Each collaborator returns hotels in its own shape. They are normalized into
//! [`RawHotelRecord`] at the pipeline boundary, so no stage ever branches on the
//! source beyond the recorded [`PhotoSourceType`] tag.

use serde::{Deserialize, Serialize};

use crate::models::hotel::{Coordinates, Price, RawHotelRecord, SourceId};
use crate::models::photo::{PhotoCandidate, PhotoSourceType};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum SourceRecord {
    PrimaryApi(PrimaryApiHotel),
    SecondarySearch(SearchResultHotel),
    Scraped(ScrapedHotel),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryApiImage {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub size_bytes: Option<u64>,
}

/// Shape returned by the primary hotel content API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryApiHotel {
    pub hotel_id: String,
    pub name: String,
    pub city: String,
    pub country_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub images: Vec<PrimaryApiImage>,
    pub price_per_night: Option<f64>,
    pub currency: Option<String>,
    pub guest_rating: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchAddress {
    pub city: String,
    pub country: String,
}

/// Shape returned by the secondary places/search provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultHotel {
    pub place_id: String,
    pub title: String,
    pub address: SearchAddress,
    pub gps: Option<Coordinates>,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub price: Option<Price>,
    pub rating: Option<f64>,
}

/// Shape produced by page scrapers: loosely structured text fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedHotel {
    pub page_url: String,
    pub name: String,
    /// "City, Country" as printed on the page.
    pub location: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    /// e.g. "€450", "USD 320", "$1,200"
    pub price_text: Option<String>,
    pub rating: Option<f64>,
}

impl SourceRecord {
    pub fn source_type(&self) -> PhotoSourceType {
        match self {
            SourceRecord::PrimaryApi(_) => PhotoSourceType::PrimaryApi,
            SourceRecord::SecondarySearch(_) => PhotoSourceType::SecondarySearch,
            SourceRecord::Scraped(_) => PhotoSourceType::Scraped,
        }
    }

    /// Normalizes any source shape into the canonical record.
    pub fn into_raw(self) -> RawHotelRecord {
        match self {
            SourceRecord::PrimaryApi(h) => {
                let coordinates = match (h.latitude, h.longitude) {
                    (Some(latitude), Some(longitude)) => Some(Coordinates {
                        latitude,
                        longitude,
                    }),
                    _ => None,
                };
                let photos = h
                    .images
                    .into_iter()
                    .map(|img| PhotoCandidate {
                        url: img.url,
                        width: img.width,
                        height: img.height,
                        file_size: img.size_bytes,
                        content_type: None,
                        source_type: PhotoSourceType::PrimaryApi,
                    })
                    .collect();
                let price = h.price_per_night.map(|amount| {
                    Price::new(amount, h.currency.unwrap_or_else(|| "USD".to_string()))
                });
                RawHotelRecord {
                    source: SourceId {
                        source_type: PhotoSourceType::PrimaryApi,
                        source_ref: h.hotel_id,
                    },
                    name: h.name.trim().to_string(),
                    city: h.city.trim().to_string(),
                    country: h.country_code.trim().to_string(),
                    coordinates,
                    description: h.description,
                    amenity_codes: h.amenities,
                    photos,
                    price,
                    rating: h.guest_rating,
                }
            }
            SourceRecord::SecondarySearch(h) => RawHotelRecord {
                source: SourceId {
                    source_type: PhotoSourceType::SecondarySearch,
                    source_ref: h.place_id,
                },
                name: h.title.trim().to_string(),
                city: h.address.city.trim().to_string(),
                country: h.address.country.trim().to_string(),
                coordinates: h.gps,
                description: h.snippet,
                amenity_codes: h.amenities,
                photos: h
                    .photo_urls
                    .into_iter()
                    .map(|url| PhotoCandidate::new(url, PhotoSourceType::SecondarySearch))
                    .collect(),
                price: h.price,
                rating: h.rating,
            },
            SourceRecord::Scraped(h) => {
                let (city, country) = split_location(&h.location);
                RawHotelRecord {
                    source: SourceId {
                        source_type: PhotoSourceType::Scraped,
                        source_ref: h.page_url,
                    },
                    name: h.name.trim().to_string(),
                    city,
                    country,
                    coordinates: None,
                    description: String::new(),
                    amenity_codes: h.amenities,
                    photos: h
                        .image_urls
                        .into_iter()
                        .map(|url| PhotoCandidate::new(url, PhotoSourceType::Scraped))
                        .collect(),
                    price: h.price_text.as_deref().and_then(parse_price_text),
                    rating: h.rating,
                }
            }
        }
    }
}

/// Splits "Paris, Île-de-France, France" into ("Paris", "France").
fn split_location(location: &str) -> (String, String) {
    let parts: Vec<&str> = location
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    match parts.as_slice() {
        [] => (String::new(), String::new()),
        [only] => (only.to_string(), String::new()),
        [first, .., last] => (first.to_string(), last.to_string()),
    }
}

/// Best-effort parse of scraped price strings. Returns `None` when no amount is found.
fn parse_price_text(text: &str) -> Option<Price> {
    let text = text.trim();
    let currency = if text.contains('€') {
        "EUR"
    } else if text.contains('£') {
        "GBP"
    } else if text.contains('$') {
        "USD"
    } else {
        text.split_whitespace()
            .find(|w| w.len() == 3 && w.chars().all(|c| c.is_ascii_alphabetic()))
            .unwrap_or("USD")
    };

    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let amount: f64 = digits.parse().ok()?;

    Some(Price::new(amount, currency.to_ascii_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primary_api_record_normalizes() {
        let record: SourceRecord = serde_json::from_value(json!({
            "source": "primary_api",
            "hotel_id": "H-1",
            "name": "  Villa Azur ",
            "city": "Nice",
            "country_code": "FR",
            "latitude": 43.7,
            "longitude": 7.26,
            "images": [{"url": "https://cdn/a.jpg", "width": 2000, "height": 1300, "size_bytes": 800000}],
            "price_per_night": 480.0,
            "currency": "EUR",
            "guest_rating": 4.6
        }))
        .unwrap();

        let raw = record.into_raw();
        assert_eq!(raw.name, "Villa Azur");
        assert_eq!(raw.source.source_type, PhotoSourceType::PrimaryApi);
        assert_eq!(raw.photos[0].width, Some(2000));
        assert_eq!(raw.photos[0].source_type, PhotoSourceType::PrimaryApi);
        assert_eq!(raw.price, Some(Price::new(480.0, "EUR")));
        assert!(raw.coordinates.is_some());
    }

    #[test]
    fn test_search_record_photos_have_unknown_metadata() {
        let record = SourceRecord::SecondarySearch(SearchResultHotel {
            place_id: "p-9".to_string(),
            title: "Casa Lumbre".to_string(),
            address: SearchAddress {
                city: "Oaxaca".to_string(),
                country: "MX".to_string(),
            },
            gps: None,
            snippet: String::new(),
            photo_urls: vec!["https://img/p1.jpg".to_string()],
            amenities: vec![],
            price: None,
            rating: Some(4.7),
        });
        let raw = record.into_raw();
        assert!(raw.photos[0].needs_probe());
        assert_eq!(raw.photos[0].source_type, PhotoSourceType::SecondarySearch);
    }

    #[test]
    fn test_scraped_location_and_price_parse() {
        let raw = SourceRecord::Scraped(ScrapedHotel {
            page_url: "https://blog/hotel".to_string(),
            name: "Le Petit Nid".to_string(),
            location: "Paris, Île-de-France, France".to_string(),
            image_urls: vec![],
            amenities: vec![],
            price_text: Some("€1,250 / night".to_string()),
            rating: None,
        })
        .into_raw();
        assert_eq!(raw.city, "Paris");
        assert_eq!(raw.country, "France");
        assert_eq!(raw.price, Some(Price::new(1250.0, "EUR")));
    }

    #[test]
    fn test_parse_price_text_with_code() {
        assert_eq!(parse_price_text("usd 320"), Some(Price::new(320.0, "USD")));
        assert_eq!(parse_price_text("price on request"), None);
    }

    #[test]
    fn test_split_location_single_part() {
        assert_eq!(split_location("Lisbon"), ("Lisbon".to_string(), String::new()));
    }
}
