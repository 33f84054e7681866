//! Byte signature classification against the image allow-list.

use super::ImageMime;

/// Result of sniffing an accumulating buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// The buffer starts with an allow-listed image signature.
    Allowed(ImageMime),
    /// More bytes are needed; the buffer is still a prefix of some allowed signature.
    Undetermined,
    /// The content is definitely not an allowed image.
    Rejected {
        /// Best-effort label for what the content looks like, for diagnostics.
        detected: &'static str,
    },
}

impl Classification {
    /// Returns true if no decision can be made yet.
    #[must_use]
    pub fn is_undetermined(self) -> bool {
        matches!(self, Self::Undetermined)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignatureMatch {
    Match,
    Partial,
    Mismatch,
}

type Matcher = fn(&[u8]) -> SignatureMatch;

const SIGNATURES: [(ImageMime, Matcher); 5] = [
    (ImageMime::Jpeg, match_jpeg),
    (ImageMime::Png, match_png),
    (ImageMime::Gif, match_gif),
    (ImageMime::Bmp, match_bmp),
    (ImageMime::Ico, match_ico),
];

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const GIF87_MAGIC: &[u8] = b"GIF87a";
const GIF89_MAGIC: &[u8] = b"GIF89a";
const BMP_MAGIC: &[u8] = b"BM";
const ICO_MAGIC: &[u8] = &[0x00, 0x00, 0x01, 0x00];

/// DIB header sizes for the BITMAPCOREHEADER..BITMAPV5HEADER family.
const BMP_DIB_HEADER_SIZES: [u32; 7] = [12, 40, 52, 56, 64, 108, 124];
const BMP_SNIFF_LEN: usize = 18;
const ICO_SNIFF_LEN: usize = 6;

/// How many leading bytes the text heuristics look at.
const TEXT_SNIFF_LEN: usize = 512;

/// Classifies a buffer by its leading bytes.
///
/// Re-evaluate on every growth of the buffer until the result is not
/// [`Classification::Undetermined`]; after that the decision is final.
#[must_use]
pub fn classify(buffer: &[u8]) -> Classification {
    if buffer.is_empty() {
        return Classification::Undetermined;
    }

    let mut partial = false;
    for (mime, matcher) in SIGNATURES {
        match matcher(buffer) {
            SignatureMatch::Match => return Classification::Allowed(mime),
            SignatureMatch::Partial => partial = true,
            SignatureMatch::Mismatch => {}
        }
    }

    if partial {
        Classification::Undetermined
    } else {
        Classification::Rejected {
            detected: detect_other(buffer),
        }
    }
}

fn match_prefix(buffer: &[u8], magic: &[u8]) -> SignatureMatch {
    if buffer.len() >= magic.len() {
        if buffer.starts_with(magic) {
            SignatureMatch::Match
        } else {
            SignatureMatch::Mismatch
        }
    } else if magic.starts_with(buffer) {
        SignatureMatch::Partial
    } else {
        SignatureMatch::Mismatch
    }
}

fn match_jpeg(buffer: &[u8]) -> SignatureMatch {
    match_prefix(buffer, JPEG_MAGIC)
}

fn match_png(buffer: &[u8]) -> SignatureMatch {
    match_prefix(buffer, PNG_MAGIC)
}

fn match_gif(buffer: &[u8]) -> SignatureMatch {
    match (
        match_prefix(buffer, GIF87_MAGIC),
        match_prefix(buffer, GIF89_MAGIC),
    ) {
        (SignatureMatch::Match, _) | (_, SignatureMatch::Match) => SignatureMatch::Match,
        (SignatureMatch::Partial, _) | (_, SignatureMatch::Partial) => SignatureMatch::Partial,
        _ => SignatureMatch::Mismatch,
    }
}

fn match_bmp(buffer: &[u8]) -> SignatureMatch {
    match match_prefix(buffer, BMP_MAGIC) {
        SignatureMatch::Match => {
            let Some(dib_size) = read_u32_le(buffer, 14) else {
                return SignatureMatch::Partial;
            };
            debug_assert!(buffer.len() >= BMP_SNIFF_LEN);
            if BMP_DIB_HEADER_SIZES.contains(&dib_size) {
                SignatureMatch::Match
            } else {
                SignatureMatch::Mismatch
            }
        }
        other => other,
    }
}

fn match_ico(buffer: &[u8]) -> SignatureMatch {
    match match_prefix(buffer, ICO_MAGIC) {
        SignatureMatch::Match => {
            let Some(count) = buffer
                .get(4..ICO_SNIFF_LEN)
                .map(|bytes| u16::from_le_bytes([bytes[0], bytes[1]]))
            else {
                return SignatureMatch::Partial;
            };
            if count > 0 {
                SignatureMatch::Match
            } else {
                SignatureMatch::Mismatch
            }
        }
        other => other,
    }
}

fn read_u32_le(buffer: &[u8], offset: usize) -> Option<u32> {
    let bytes: [u8; 4] = buffer.get(offset..offset + 4)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}

/// Labels content that failed every allow-listed signature.
fn detect_other(buffer: &[u8]) -> &'static str {
    if buffer.starts_with(b"%PDF-") {
        return "application/pdf";
    }
    if buffer.len() >= 12 && buffer.starts_with(b"RIFF") && &buffer[8..12] == b"WEBP" {
        return "image/webp";
    }
    if buffer.starts_with(b"II*\0") || buffer.starts_with(b"MM\0*") {
        return "image/tiff";
    }
    if buffer.starts_with(b"PK\x03\x04") {
        return "application/zip";
    }
    if buffer.starts_with(&[0x1F, 0x8B]) {
        return "application/gzip";
    }
    detect_text(buffer)
}

fn detect_text(buffer: &[u8]) -> &'static str {
    let sample = &buffer[..buffer.len().min(TEXT_SNIFF_LEN)];
    let sample = sample.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(sample);
    let start = sample
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(sample.len());
    let trimmed = &sample[start..];
    let head: Vec<u8> = trimmed.iter().take(64).map(u8::to_ascii_lowercase).collect();

    if head.starts_with(b"<svg") || (head.starts_with(b"<?xml") && contains(trimmed, b"<svg")) {
        return "image/svg+xml";
    }
    if head.starts_with(b"<?xml") {
        return "text/xml";
    }
    if ["<!doctype html", "<html", "<head", "<body", "<!--", "<script", "<meta"]
        .iter()
        .any(|marker| head.starts_with(marker.as_bytes()))
    {
        return "text/html";
    }
    if head.starts_with(b"{") || head.starts_with(b"[") {
        return "application/json";
    }

    let looks_textual = sample
        .iter()
        .all(|&b| b >= 0x80 || b.is_ascii_graphic() || b.is_ascii_whitespace());
    if looks_textual {
        "text/plain"
    } else {
        "application/octet-stream"
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}
