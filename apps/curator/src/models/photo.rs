use serde::{Deserialize, Serialize};

/// Where a photo (or a hotel record) came from.
///
/// Ordering of [`PhotoSourceType::priority`] is used to break quality ties:
/// primary API > secondary search > scraped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PhotoSourceType {
    PrimaryApi,
    SecondarySearch,
    Scraped,
}

impl PhotoSourceType {
    pub fn priority(self) -> u8 {
        match self {
            PhotoSourceType::PrimaryApi => 3,
            PhotoSourceType::SecondarySearch => 2,
            PhotoSourceType::Scraped => 1,
        }
    }

    /// Only photos served by the primary content API count as confirmed.
    pub fn is_trusted(self) -> bool {
        matches!(self, PhotoSourceType::PrimaryApi)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PhotoSourceType::PrimaryApi => "primary_api",
            PhotoSourceType::SecondarySearch => "secondary_search",
            PhotoSourceType::Scraped => "scraped",
        }
    }
}

/// A photo reference as handed over by a source collaborator.
/// Any metadata field may be unknown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhotoCandidate {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub file_size: Option<u64>, // bytes
    #[serde(default)]
    pub content_type: Option<String>,
    pub source_type: PhotoSourceType,
}

impl PhotoCandidate {
    pub fn new(url: impl Into<String>, source_type: PhotoSourceType) -> Self {
        Self {
            url: url.into(),
            width: None,
            height: None,
            file_size: None,
            content_type: None,
            source_type,
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_file_size(mut self, bytes: u64) -> Self {
        self.file_size = Some(bytes);
        self
    }

    /// True when the scorer cannot run without probing first.
    pub fn needs_probe(&self) -> bool {
        self.width.is_none() || self.height.is_none() || self.file_size.is_none()
    }

    /// Fills unknown fields from probed metadata. Declared values win.
    pub fn merge_metadata(&mut self, meta: &PhotoMetadata) {
        self.width = self.width.or(meta.width);
        self.height = self.height.or(meta.height);
        self.file_size = self.file_size.or(meta.file_size);
        if self.content_type.is_none() {
            self.content_type = meta.content_type.clone();
        }
    }
}

/// Best-effort metadata returned by a probe collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PhotoMetadata {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub file_size: Option<u64>,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PhotoVerdict {
    Accepted,
    Rejected,
}

/// Why a photo was rejected. `reason()` is the verbatim text recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhotoRejection {
    MetadataUnavailable { detail: String },
    ResolutionTooLow { width: u32, height: u32 },
    FileTooSmall { bytes: u64 },
    FileTooLarge { bytes: u64 },
}

impl PhotoRejection {
    pub fn reason(&self) -> String {
        match self {
            PhotoRejection::MetadataUnavailable { detail } => detail.clone(),
            PhotoRejection::ResolutionTooLow { width, height } => {
                format!("resolution too low: {width}x{height}")
            }
            PhotoRejection::FileTooSmall { bytes } => format!("file too small: {bytes} bytes"),
            PhotoRejection::FileTooLarge { bytes } => format!("file too large: {bytes} bytes"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredPhoto {
    pub candidate: PhotoCandidate,
    pub quality_score: f64, // 0 – 100
    pub verdict: PhotoVerdict,
    pub rejection: Option<PhotoRejection>,
}

impl ScoredPhoto {
    pub fn is_accepted(&self) -> bool {
        self.verdict == PhotoVerdict::Accepted
    }

    pub fn url(&self) -> &str {
        &self.candidate.url
    }

    pub fn rejection_reason(&self) -> Option<String> {
        self.rejection.as_ref().map(PhotoRejection::reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_priority_order() {
        assert!(PhotoSourceType::PrimaryApi.priority() > PhotoSourceType::SecondarySearch.priority());
        assert!(PhotoSourceType::SecondarySearch.priority() > PhotoSourceType::Scraped.priority());
    }

    #[test]
    fn test_merge_metadata_keeps_declared_values() {
        let mut photo = PhotoCandidate::new("https://cdn/x.jpg", PhotoSourceType::Scraped)
            .with_dimensions(1600, 1000);
        photo.merge_metadata(&PhotoMetadata {
            width: Some(10),
            height: Some(10),
            file_size: Some(400_000),
            content_type: Some("image/jpeg".to_string()),
        });
        assert_eq!(photo.width, Some(1600));
        assert_eq!(photo.file_size, Some(400_000));
        assert_eq!(photo.content_type.as_deref(), Some("image/jpeg"));
        assert!(!photo.needs_probe());
    }

    #[test]
    fn test_rejection_reason_is_verbatim() {
        let r = PhotoRejection::ResolutionTooLow {
            width: 400,
            height: 300,
        };
        assert_eq!(r.reason(), "resolution too low: 400x300");
    }

    #[test]
    fn test_source_type_serializes_snake_case() {
        let json = serde_json::to_string(&PhotoSourceType::SecondarySearch).unwrap();
        assert_eq!(json, "\"secondary_search\"");
    }
}
