//! Base64 image payloads.
//!
//! Recipe images and avatars arrive as `data:image/<type>;base64,<data>`
//! strings inside JSON bodies. The declared type is not trusted: the format
//! is detected from the decoded bytes.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageFormat, ImageReader};

use crate::error::ImageError;

pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Maximum decoded image size (10MB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub data: Vec<u8>,
    /// Detected content type, e.g. "image/png".
    pub content_type: String,
}

pub fn decode_data_uri(payload: &str) -> Result<DecodedImage, ImageError> {
    let (header, body) = payload
        .trim()
        .split_once(";base64,")
        .ok_or(ImageError::NotDataUri)?;

    if !header.starts_with("data:image/") {
        return Err(ImageError::NotDataUri);
    }

    let data = STANDARD
        .decode(body.trim())
        .map_err(|e| ImageError::InvalidBase64(e.to_string()))?;

    if data.len() > MAX_FILE_SIZE {
        return Err(ImageError::TooLarge {
            size: data.len(),
            max: MAX_FILE_SIZE,
        });
    }

    let content_type = validate_image(&data)?;
    Ok(DecodedImage { data, content_type })
}

/// Detect the format from magic bytes and check it is allowed.
pub fn validate_image(data: &[u8]) -> Result<String, ImageError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ImageError::Unsupported(format!("Failed to read image: {}", e)))?;

    let format = reader
        .format()
        .ok_or_else(|| ImageError::Unsupported("Could not detect image format".to_string()))?;

    if !ALLOWED_FORMATS.contains(&format) {
        return Err(ImageError::Unsupported(format!(
            "{:?}. Allowed: JPEG, PNG, GIF, WebP",
            format
        )));
    }

    Ok(format.to_mime_type().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn test_decode_png() {
        let image = decode_data_uri(&format!("data:image/png;base64,{}", PNG_1X1)).unwrap();
        assert_eq!(image.content_type, "image/png");
        assert_eq!(&image.data[1..4], b"PNG");
    }

    #[test]
    fn test_declared_type_is_not_trusted() {
        let image = decode_data_uri(&format!("data:image/jpeg;base64,{}", PNG_1X1)).unwrap();
        assert_eq!(image.content_type, "image/png");
    }

    #[test]
    fn test_rejects_plain_url() {
        assert_eq!(
            decode_data_uri("https://example.org/cat.png"),
            Err(ImageError::NotDataUri)
        );
    }

    #[test]
    fn test_rejects_non_image_mime() {
        assert_eq!(
            decode_data_uri(&format!("data:text/plain;base64,{}", PNG_1X1)),
            Err(ImageError::NotDataUri)
        );
    }

    #[test]
    fn test_rejects_bad_base64() {
        assert!(matches!(
            decode_data_uri("data:image/png;base64,!!!not base64!!!"),
            Err(ImageError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_rejects_non_image_bytes() {
        let body = STANDARD.encode(b"definitely not an image");
        assert!(matches!(
            decode_data_uri(&format!("data:image/png;base64,{}", body)),
            Err(ImageError::Unsupported(_))
        ));
    }
}
