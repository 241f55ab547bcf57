//! Inline storage fallback
//!
//! When the cloud upload fails (or no credentials are configured), the image
//! bytes are kept right in the metadata document as a base64 data URL. Crude,
//! but the photo stays servable with zero external dependencies.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Guess a mime type from the filename extension
pub fn mime_for_filename(filename: &str) -> &'static str {
    let extension = filename
        .rsplit('.')
        .next()
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

/// File format label (extension) for the photo record, if recognizable
pub fn format_for_filename(filename: &str) -> Option<String> {
    match mime_for_filename(filename) {
        "application/octet-stream" => None,
        mime => mime.rsplit('/').next().map(|s| {
            // normalize the jpeg/svg+xml mime suffixes back to extensions
            match s {
                "svg+xml" => "svg".to_string(),
                other => other.to_string(),
            }
        }),
    }
}

/// Encode image bytes as a `data:` URL
pub fn encode_data_url(bytes: &[u8], filename: &str) -> String {
    format!(
        "data:{};base64,{}",
        mime_for_filename(filename),
        STANDARD.encode(bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_guessing() {
        assert_eq!(mime_for_filename("sunset.jpg"), "image/jpeg");
        assert_eq!(mime_for_filename("SUNSET.JPEG"), "image/jpeg");
        assert_eq!(mime_for_filename("icon.png"), "image/png");
        assert_eq!(mime_for_filename("noextension"), "application/octet-stream");
    }

    #[test]
    fn test_encode_data_url() {
        let url = encode_data_url(b"abc", "tiny.png");
        assert_eq!(url, "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_format_labels() {
        assert_eq!(format_for_filename("a.jpg"), Some("jpeg".to_string()));
        assert_eq!(format_for_filename("a.svg"), Some("svg".to_string()));
        assert_eq!(format_for_filename("a.xyz"), None);
    }
}
