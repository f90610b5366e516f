//! PNG codec boundary: RGBA buffers in, bytes out, and back.
//!
//! Encoding is deterministic (non-interlaced 8-bit RGBA, fixed encoder
//! settings), so identical input always produces byte-identical output.
//! Decoding distinguishes format errors (bad data) from filesystem errors
//! (bad location) so callers can report them differently.

use std::io::Cursor;
use std::path::Path;

use image::ImageEncoder;
use thiserror::Error;

/// Errors from the codec boundary.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The byte source could not be read (missing path, permissions, ...)
    #[error("cannot read image source: {0}")]
    Io(#[from] std::io::Error),
    /// The bytes are not a decodable image / not encodable as requested
    #[error("invalid image data: {0}")]
    Format(String),
}

/// A decoded raster: raw RGBA bytes plus dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Encode an RGBA buffer (`width * height * 4` bytes) as PNG.
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, CodecError> {
    let mut bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut bytes);
    encoder
        .write_image(pixels, width, height, image::ColorType::Rgba8)
        .map_err(|e| CodecError::Format(e.to_string()))?;
    Ok(bytes)
}

/// Decode PNG (or any supported raster) bytes into an RGBA buffer.
pub fn decode_png(bytes: &[u8]) -> Result<DecodedImage, CodecError> {
    let image = image::io::Reader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CodecError::Format(e.to_string()))?
        .decode()
        .map_err(|e| CodecError::Format(e.to_string()))?;
    let rgba = image.to_rgba8();
    Ok(DecodedImage { width: rgba.width(), height: rgba.height(), pixels: rgba.into_raw() })
}

/// Read a file and decode it.
///
/// An unreadable path surfaces as [`CodecError::Io`]; unparseable bytes as
/// [`CodecError::Format`].
pub fn decode_png_file(path: &Path) -> Result<DecodedImage, CodecError> {
    let bytes = std::fs::read(path)?;
    decode_png(&bytes)
}
