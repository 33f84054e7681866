//! Input candidates and merged result records.
//!
//! A [`Candidate`] is one image reference plus opaque passthrough fields that
//! travel untouched into its [`ResultRecord`]. Only candidates that resolve to
//! an [`ImageInfo`] produce a record.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::format::{Dimensions, ImageMime};

/// Prefix that marks an inline `data:` URI.
pub(crate) const DATA_URI_PREFIX: &str = "data:";

/// One requested image: a URL or `data:` URI plus passthrough metadata.
///
/// Deserializes from `{ "value": "...", ...any other fields }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// URL or `data:` URI.
    pub value: String,
    /// Opaque key-value fields returned unchanged on the result record.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl Candidate {
    /// Creates a candidate with no passthrough metadata.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            metadata: Map::new(),
        }
    }

    /// Adds one passthrough field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Returns true when the reference is an inline `data:` URI.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        self.value.starts_with(DATA_URI_PREFIX)
    }
}

/// Dimensions and type of a resolved image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel count, always `width * height`.
    pub size: u64,
    /// Allow-listed MIME type.
    pub mime: ImageMime,
}

impl ImageInfo {
    /// Builds an info value, computing `size` from the dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32, mime: ImageMime) -> Self {
        Self {
            width,
            height,
            size: u64::from(width) * u64::from(height),
            mime,
        }
    }

    #[must_use]
    pub(crate) fn from_dimensions(dimensions: Dimensions, mime: ImageMime) -> Self {
        Self::new(dimensions.width, dimensions.height, mime)
    }
}

/// A candidate merged with its resolved image info.
///
/// Serializes as one flat object: the candidate's fields followed by
/// `width`, `height`, `size` and `mime`, which win on key collision.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    /// The originating candidate.
    pub candidate: Candidate,
    /// The resolved image info.
    pub info: ImageInfo,
}

impl ResultRecord {
    /// Merges a candidate with its info.
    #[must_use]
    pub fn new(candidate: Candidate, info: ImageInfo) -> Self {
        Self { candidate, info }
    }

    /// Returns the flat merged map.
    #[must_use]
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = self.candidate.metadata.clone();
        map.insert("value".to_string(), Value::from(self.candidate.value.clone()));
        map.insert("width".to_string(), Value::from(self.info.width));
        map.insert("height".to_string(), Value::from(self.info.height));
        map.insert("size".to_string(), Value::from(self.info.size));
        map.insert("mime".to_string(), Value::from(self.info.mime.as_str()));
        map
    }
}

impl Serialize for ResultRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let merged = self.to_map();
        let mut map = serializer.serialize_map(Some(merged.len()))?;
        for (key, value) in &merged {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
