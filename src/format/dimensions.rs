//! Width/height extraction from image headers.

use tracing::trace;

/// Pixel dimensions read from an image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Result of a header parse attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The header is not complete yet (or not parseable from these bytes).
    Incomplete,
    /// The header yielded concrete dimensions.
    Found(Dimensions),
}

/// Attempts to read image dimensions from the start of `buffer`.
///
/// Pure over the buffer: the same bytes always give the same outcome, and a
/// truncated header is [`ParseOutcome::Incomplete`] rather than an error.
#[must_use]
pub fn try_parse_dimensions(buffer: &[u8]) -> ParseOutcome {
    if buffer.starts_with(BMP_MAGIC) {
        return parse_bmp(buffer);
    }

    let size = match imagesize::blob_size(buffer) {
        Ok(size) => size,
        Err(error) => {
            trace!(bytes = buffer.len(), error = %error, "header not parseable yet");
            return ParseOutcome::Incomplete;
        }
    };

    match (u32::try_from(size.width), u32::try_from(size.height)) {
        (Ok(width), Ok(height)) => ParseOutcome::Found(Dimensions { width, height }),
        _ => ParseOutcome::Incomplete,
    }
}

const BMP_MAGIC: &[u8] = b"BM";
const BMP_DIB_SIZE_OFFSET: usize = 14;
const BMP_CORE_HEADER_SIZE: u32 = 12;

/// Reads BMP dimensions from the DIB header.
///
/// BITMAPCOREHEADER stores unsigned 16-bit fields; every later header stores
/// signed 32-bit fields, with a negative height for top-down rows.
fn parse_bmp(buffer: &[u8]) -> ParseOutcome {
    let Some(dib_size) = read_le::<4>(buffer, BMP_DIB_SIZE_OFFSET).map(u32::from_le_bytes) else {
        return ParseOutcome::Incomplete;
    };

    let dimensions = if dib_size == BMP_CORE_HEADER_SIZE {
        read_le::<2>(buffer, 18)
            .zip(read_le::<2>(buffer, 20))
            .map(|(width, height)| Dimensions {
                width: u32::from(u16::from_le_bytes(width)),
                height: u32::from(u16::from_le_bytes(height)),
            })
    } else {
        read_le::<4>(buffer, 18)
            .zip(read_le::<4>(buffer, 22))
            .map(|(width, height)| Dimensions {
                width: i32::from_le_bytes(width).unsigned_abs(),
                height: i32::from_le_bytes(height).unsigned_abs(),
            })
    };

    match dimensions {
        Some(dimensions) => ParseOutcome::Found(dimensions),
        None => {
            trace!(bytes = buffer.len(), dib_size, "BMP header not complete yet");
            ParseOutcome::Incomplete
        }
    }
}

fn read_le<const N: usize>(buffer: &[u8], offset: usize) -> Option<[u8; N]> {
    buffer.get(offset..offset + N)?.try_into().ok()
}
