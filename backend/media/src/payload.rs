//! Image payload decoding.
//!
//! Turns a base64 payload into an [`ImageInput`]: format sniffed from the
//! bytes, fully decoded (so corrupt images fail here, not in a collaborator)
//! and re-encoded as PNG.

use std::io::Cursor;

use base64::{Engine, engine::general_purpose::STANDARD};
use bytes::Bytes;
use image::ImageFormat;
use tracing::debug;

use freshscan_core::{ImageInput, ScanError};

/// Decode a base64 image payload. Accepts `data:` URLs and embedded whitespace.
pub fn decode_base64_image(payload: &str) -> Result<ImageInput, ScanError> {
    let encoded = strip_data_url(payload.trim());
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(ScanError::undecodable("empty payload"));
    }
    let bytes = STANDARD.decode(compact.as_bytes()).map_err(ScanError::undecodable)?;
    decode_image_bytes(&bytes)
}

/// Decode raw image bytes of any supported format.
pub fn decode_image_bytes(bytes: &[u8]) -> Result<ImageInput, ScanError> {
    let format = image::guess_format(bytes).map_err(ScanError::undecodable)?;
    let img = image::load_from_memory_with_format(bytes, format).map_err(ScanError::undecodable)?;

    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, ImageFormat::Png).map_err(ScanError::undecodable)?;

    debug!(
        format = format.to_mime_type(),
        width = img.width(),
        height = img.height(),
        "Decoded image payload"
    );

    Ok(ImageInput {
        png: Bytes::from(png.into_inner()),
        width: img.width(),
        height: img.height(),
        source_mime: format.to_mime_type(),
    })
}

fn strip_data_url(payload: &str) -> &str {
    if payload.starts_with("data:") {
        if let Some((_, data)) = payload.split_once(";base64,") {
            return data;
        }
    }
    payload
}
