//! Image helpers for multimodal requests

use crate::{ImageSource, LLMError, Result};
use base64::Engine;
use std::path::Path;

/// Media types accepted for inline images
pub const SUPPORTED_MEDIA_TYPES: &[&str] = &["image/png", "image/jpeg", "image/gif", "image/webp"];

/// Detect the media type of an image from its leading bytes
pub fn media_type_from_bytes(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n']) {
        return Some("image/png");
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some("image/gif");
    }
    if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    None
}

/// Guess the media type from a file extension
pub fn media_type_from_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Pixel dimensions for formats whose header carries them at a fixed offset
///
/// Only PNG and GIF are inspected; other formats return `None`.
pub fn dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    match media_type_from_bytes(bytes)? {
        "image/png" if bytes.len() >= 24 => {
            let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
            let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
            Some((width, height))
        }
        "image/gif" if bytes.len() >= 10 => {
            let width = u16::from_le_bytes([bytes[6], bytes[7]]);
            let height = u16::from_le_bytes([bytes[8], bytes[9]]);
            Some((u32::from(width), u32::from(height)))
        }
        _ => None,
    }
}

/// Encode raw image bytes as an inline base64 source
pub fn encode_image(bytes: &[u8], media_type: &str) -> Result<ImageSource> {
    if bytes.is_empty() {
        return Err(LLMError::InvalidRequest("image is empty".to_string()));
    }
    if !SUPPORTED_MEDIA_TYPES.contains(&media_type) {
        return Err(LLMError::InvalidRequest(format!(
            "unsupported image format '{media_type}'; supported formats: PNG, JPEG, GIF, WebP"
        )));
    }

    Ok(ImageSource::Base64 {
        media_type: media_type.to_string(),
        data: base64::engine::general_purpose::STANDARD.encode(bytes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes
    }

    #[test]
    fn test_detect_media_type() {
        assert_eq!(media_type_from_bytes(&png_header(1, 1)), Some("image/png"));
        assert_eq!(media_type_from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(media_type_from_bytes(b"GIF89a\x01\x00\x01\x00"), Some("image/gif"));
        assert_eq!(media_type_from_bytes(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(media_type_from_bytes(b"%PDF-1.7"), None);
        assert_eq!(media_type_from_path(Path::new("chart.JPG")), Some("image/jpeg"));
        assert_eq!(media_type_from_path(Path::new("report.pdf")), None);
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(dimensions(&png_header(800, 600)), Some((800, 600)));
        assert_eq!(dimensions(b"GIF89a\x40\x01\xC8\x00"), Some((320, 200)));
        assert_eq!(dimensions(&[0xFF, 0xD8, 0xFF, 0xE0]), None);
    }

    #[test]
    fn test_encode_image() {
        let source = encode_image(b"hello", "image/png").unwrap();
        assert_eq!(
            source,
            ImageSource::Base64 {
                media_type: "image/png".to_string(),
                data: "aGVsbG8=".to_string(),
            }
        );
        assert!(encode_image(b"", "image/png").is_err());
        assert!(encode_image(b"hello", "application/pdf").is_err());
    }
}
