//! QR code rendering for the home page.
//!
//! The server URL is encoded as a PNG and returned base64-encoded so the
//! template can inline it in a `data:image/png;base64,...` URI.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use thiserror::Error;

/// Pixels per QR module.
pub const BOX_SIZE: u32 = 8;

/// Quiet zone around the code, in modules.
///
/// Not passed to the renderer: `qrcode` fixes the quiet zone at 4 modules for
/// standard codes once `quiet_zone(true)` is set. This constant records that
/// width and the geometry test holds the rendered image to it.
pub const BORDER: u32 = 4;

/// Errors from QR rendering.
#[derive(Debug, Error)]
pub enum QrError {
    #[error("failed to encode QR code: {0}")]
    Encode(String),

    #[error("failed to write PNG: {0}")]
    Png(#[from] image::ImageError),
}

/// Render `data` as a PNG QR code and return it base64-encoded.
pub fn encode_png_base64(data: &str) -> Result<String, QrError> {
    let png = encode_png(data)?;
    Ok(STANDARD.encode(png))
}

/// Render `data` as PNG bytes.
pub fn encode_png(data: &str) -> Result<Vec<u8>, QrError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::L)
        .map_err(|e| QrError::Encode(e.to_string()))?;

    let image = code
        .render::<Luma<u8>>()
        .dark_color(Luma([0u8]))
        .light_color(Luma([255u8]))
        .quiet_zone(true)
        .module_dimensions(BOX_SIZE, BOX_SIZE)
        .build();

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(image).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}
