//! Inline `data:` URI decoding.
//!
//! Embedded images are measured synchronously from their decoded payload,
//! without touching the network layer. Only the
//! `data:<mime-descriptor>;base64,<payload>` shape is recognized.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::candidate::{DATA_URI_PREFIX, ImageInfo};
use crate::format::{Classification, ParseOutcome, classify, try_parse_dimensions};

const IMAGE_TYPE_MARKER: &str = "image/";
const BASE64_MARKER: &str = "base64,";

/// Standard alphabet, padding optional.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Reasons an inline data URI yields no image info.
#[derive(Debug, Error)]
pub enum InlineError {
    /// The reference does not start with `data:`.
    #[error("not a data URI")]
    MissingScheme,

    /// No `;` separates the descriptor from the payload.
    #[error("data URI has no ';' separator")]
    Shape,

    /// The descriptor does not name an image type.
    #[error("data URI descriptor {descriptor:?} is not an image type")]
    NotImage {
        /// The descriptor before the first `;`.
        descriptor: String,
    },

    /// The payload is not marked as base64.
    #[error("data URI payload is not base64-encoded")]
    MissingBase64Marker,

    /// The payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The decoded bytes are not a measurable allow-listed image.
    #[error("decoded payload is not a supported image ({detected})")]
    UnsupportedImage {
        /// What the decoded bytes look like.
        detected: &'static str,
    },
}

/// Decodes an inline image, returning `None` for anything malformed.
#[must_use]
pub fn decode_embedded(data_uri: &str) -> Option<ImageInfo> {
    try_decode_embedded(data_uri).ok()
}

/// Decodes an inline image, reporting why it could not be measured.
///
/// # Errors
///
/// Returns [`InlineError`] when the URI does not have the expected shape,
/// the payload is not base64, or the decoded bytes are not an allow-listed
/// image with a parseable header.
#[instrument(level = "debug", skip(data_uri), fields(len = data_uri.len()))]
pub fn try_decode_embedded(data_uri: &str) -> Result<ImageInfo, InlineError> {
    let rest = data_uri
        .strip_prefix(DATA_URI_PREFIX)
        .ok_or(InlineError::MissingScheme)?;
    let (descriptor, payload) = rest.split_once(';').ok_or(InlineError::Shape)?;

    if !descriptor.contains(IMAGE_TYPE_MARKER) {
        return Err(InlineError::NotImage {
            descriptor: descriptor.to_string(),
        });
    }
    let encoded = payload
        .strip_prefix(BASE64_MARKER)
        .ok_or(InlineError::MissingBase64Marker)?;

    let compact: Vec<u8> = encoded
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let bytes = LENIENT_BASE64.decode(compact)?;

    let mime = match classify(&bytes) {
        Classification::Allowed(mime) => mime,
        Classification::Rejected { detected } => {
            return Err(InlineError::UnsupportedImage { detected });
        }
        Classification::Undetermined => {
            return Err(InlineError::UnsupportedImage {
                detected: "application/octet-stream",
            });
        }
    };

    match try_parse_dimensions(&bytes) {
        ParseOutcome::Found(dimensions) => {
            let info = ImageInfo::from_dimensions(dimensions, mime);
            debug!(width = info.width, height = info.height, mime = %info.mime, "inline image decoded");
            Ok(info)
        }
        ParseOutcome::Incomplete => Err(InlineError::UnsupportedImage {
            detected: mime.as_str(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::format::ImageMime;

    /// A complete 1x1 transparent PNG.
    const PIXEL_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn test_decode_embedded_one_pixel_png() {
        let info = decode_embedded(&format!("data:image/png;base64,{PIXEL_PNG}")).unwrap();
        assert_eq!(info, ImageInfo::new(1, 1, ImageMime::Png));
        assert_eq!(info.size, 1);
    }

    #[test]
    fn test_decode_embedded_ignores_whitespace_and_missing_padding() {
        let unpadded = PIXEL_PNG.trim_end_matches('=');
        let wrapped = format!("{}\n{}", &unpadded[..40], &unpadded[40..]);
        let info = decode_embedded(&format!("data:image/png;base64,{wrapped}")).unwrap();
        assert_eq!((info.width, info.height), (1, 1));
    }

    #[test]
    fn test_decode_embedded_uses_sniffed_mime_over_declared() {
        let info = decode_embedded(&format!("data:image/jpeg;base64,{PIXEL_PNG}")).unwrap();
        assert_eq!(info.mime, ImageMime::Png);
    }

    #[test]
    fn test_decode_embedded_rejects_missing_separator() {
        assert!(matches!(
            try_decode_embedded("data:notanimage"),
            Err(InlineError::Shape)
        ));
        assert!(decode_embedded("data:notanimage").is_none());
    }

    #[test]
    fn test_decode_embedded_rejects_non_image_descriptor() {
        assert!(matches!(
            try_decode_embedded("data:text/plain;base64,aGVsbG8="),
            Err(InlineError::NotImage { .. })
        ));
    }

    #[test]
    fn test_decode_embedded_rejects_non_base64_payload() {
        assert!(matches!(
            try_decode_embedded("data:image/svg+xml;utf8,<svg/>"),
            Err(InlineError::MissingBase64Marker)
        ));
        assert!(matches!(
            try_decode_embedded("data:image/png;base64,!!!"),
            Err(InlineError::Base64(_))
        ));
    }

    #[test]
    fn test_decode_embedded_rejects_unmeasurable_payload() {
        // "hello" is valid base64 but not an image.
        assert!(matches!(
            try_decode_embedded("data:image/png;base64,aGVsbG8="),
            Err(InlineError::UnsupportedImage { .. })
        ));
        // A PNG signature with no IHDR chunk.
        assert!(matches!(
            try_decode_embedded("data:image/png;base64,iVBORw0KGgo="),
            Err(InlineError::UnsupportedImage { detected: "image/png" })
        ));
    }

    #[test]
    fn test_decode_embedded_rejects_plain_urls() {
        assert!(matches!(
            try_decode_embedded("https://example.com/a.png"),
            Err(InlineError::MissingScheme)
        ));
    }
}
