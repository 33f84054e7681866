//! Minimal image headers for probe tests.
//!
//! Each builder emits just enough bytes for the header to be parsed; the
//! `*_body` variants pad with filler to simulate a large payload.

/// PNG signature plus a complete IHDR chunk (33 bytes).
pub fn png_header(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes
}

/// A PNG header followed by filler up to `total_len` bytes.
pub fn png_body(width: u32, height: u32, total_len: usize) -> Vec<u8> {
    pad(png_header(width, height), total_len)
}

/// GIF89a logical screen descriptor (13 bytes).
pub fn gif_header(width: u16, height: u16) -> Vec<u8> {
    let mut bytes = b"GIF89a".to_vec();
    bytes.extend_from_slice(&width.to_le_bytes());
    bytes.extend_from_slice(&height.to_le_bytes());
    bytes.extend_from_slice(&[0xF7, 0, 0]);
    bytes
}

/// A GIF header followed by filler up to `total_len` bytes.
pub fn gif_body(width: u16, height: u16, total_len: usize) -> Vec<u8> {
    pad(gif_header(width, height), total_len)
}

/// SOI, a JFIF APP0 segment, then a baseline SOF0 segment.
pub fn jpeg_header(width: u16, height: u16) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8];
    bytes.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
    bytes.extend_from_slice(b"JFIF\0");
    bytes.extend_from_slice(&[0x01, 0x01, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00]);
    bytes.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&[0x03, 0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01]);
    bytes
}

/// BMP file header plus a bottom-up BITMAPINFOHEADER (54 bytes).
pub fn bmp_header(width: u32, height: u32) -> Vec<u8> {
    let width = i32::try_from(width).unwrap();
    let height = i32::try_from(height).unwrap();
    bmp_info(width, height)
}

/// Top-down BITMAPINFOHEADER: the stored height is negative.
pub fn bmp_top_down_header(width: u32, height: u32) -> Vec<u8> {
    let width = i32::try_from(width).unwrap();
    let height = i32::try_from(height).unwrap();
    bmp_info(width, -height)
}

/// BMP file header plus an OS/2 BITMAPCOREHEADER with 16-bit fields (26 bytes).
pub fn bmp_core_header(width: u16, height: u16) -> Vec<u8> {
    let mut bytes = bmp_file_header(26);
    bytes.extend_from_slice(&12u32.to_le_bytes());
    bytes.extend_from_slice(&width.to_le_bytes());
    bytes.extend_from_slice(&height.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes
}

fn bmp_info(width: i32, height: i32) -> Vec<u8> {
    let mut bytes = bmp_file_header(54);
    bytes.extend_from_slice(&40u32.to_le_bytes());
    bytes.extend_from_slice(&width.to_le_bytes());
    bytes.extend_from_slice(&height.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&24u16.to_le_bytes());
    bytes.extend_from_slice(&[0u8; 24]);
    bytes
}

fn bmp_file_header(pixel_offset: u32) -> Vec<u8> {
    let mut bytes = b"BM".to_vec();
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&pixel_offset.to_le_bytes());
    bytes
}

/// ICO directory with a single entry (22 bytes).
pub fn ico_header(side: u8) -> Vec<u8> {
    let mut bytes = vec![0, 0, 1, 0, 1, 0];
    bytes.extend_from_slice(&[side, side, 0, 0]);
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&32u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&22u32.to_le_bytes());
    bytes
}

/// A small but realistic HTML document.
pub fn html_page() -> Vec<u8> {
    b"<!DOCTYPE html>\n<html><head><title>Not an image</title></head><body></body></html>\n"
        .to_vec()
}

/// A PDF preamble.
pub fn pdf_document() -> Vec<u8> {
    pad(b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n1 0 obj\n".to_vec(), 4096)
}

fn pad(mut bytes: Vec<u8>, total_len: usize) -> Vec<u8> {
    if bytes.len() < total_len {
        bytes.resize(total_len, 0xAB);
    }
    bytes
}
