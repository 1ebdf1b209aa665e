//! Guidance image decoding

use std::io::Cursor;

use image::ImageReader;

use crate::error::{Error, Result};
use crate::types::GuidanceImage;

/// Decoder seam between the fetch pipeline and the image codec
///
/// Decoding is synchronous; guidance view bitmaps are small and the call
/// runs on the fetch task, never on the caller.
pub trait ImageDecoder: Send + Sync {
    /// Decode raw response bytes into a bitmap
    fn decode(&self, bytes: &[u8]) -> Result<GuidanceImage>;
}

/// Default decoder that sniffs the container format from the bytes
///
/// Handles PNG and JPEG, the formats guidance view services serve. Output
/// is normalized to RGBA8 regardless of the source color type.
#[derive(Clone, Copy, Debug, Default)]
pub struct GuessFormatDecoder;

impl ImageDecoder for GuessFormatDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<GuidanceImage> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| Error::Decode(format!("format detection failed: {e}")))?;

        let decoded = reader.decode().map_err(|e| Error::Decode(e.to_string()))?;

        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(GuidanceImage {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }
}
