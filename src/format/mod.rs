//! Image format detection on raw bytes.
//!
//! Two pure steps run against the accumulating body of a transfer:
//!
//! - [`classify`] sniffs the byte signature and decides whether the content
//!   is one of the [`ALLOWED_MIME_TYPES`], definitely something else, or not
//!   yet decidable.
//! - [`try_parse_dimensions`] reads width and height from the image header,
//!   reporting [`ParseOutcome::Incomplete`] until enough bytes have arrived.
//!
//! Neither step keeps state; the caller owns the buffer and memoizes results.

use std::fmt;

use serde::{Deserialize, Serialize};

mod dimensions;
mod signature;

pub use dimensions::{Dimensions, ParseOutcome, try_parse_dimensions};
pub use signature::{Classification, classify};

/// Image types whose dimensions this library reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageMime {
    /// `image/jpeg`
    #[serde(rename = "image/jpeg")]
    Jpeg,
    /// `image/png`
    #[serde(rename = "image/png")]
    Png,
    /// `image/gif`
    #[serde(rename = "image/gif")]
    Gif,
    /// `image/bmp`
    #[serde(rename = "image/bmp")]
    Bmp,
    /// `image/x-icon`
    #[serde(rename = "image/x-icon")]
    Ico,
}

/// The fixed allow-list. Content sniffed as anything else is rejected.
pub const ALLOWED_MIME_TYPES: [ImageMime; 5] = [
    ImageMime::Jpeg,
    ImageMime::Png,
    ImageMime::Gif,
    ImageMime::Bmp,
    ImageMime::Ico,
];

impl ImageMime {
    /// Returns the MIME type string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Ico => "image/x-icon",
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
