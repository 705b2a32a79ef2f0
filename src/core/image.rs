//! Normalizes stored project preview images into a renderable source string.
//!
//! Stored payloads are messy: URLs, data-URIs (sometimes accidentally
//! base64-encoded twice upstream), bare base64 text, or raw bytes from an
//! old binary column. `normalize` is total and always returns something an
//! `<img>` tag can render, degrading to the configured placeholder.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// An opaque stored image value: text or raw bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImagePayload {
    Text(String),
    Bytes(Vec<u8>),
}

impl Default for ImagePayload {
    fn default() -> Self {
        ImagePayload::Text(String::new())
    }
}

/// Base64 signatures of the image formats the original data contains.
/// Anything else defaults to JPEG, matching observed behavior.
const BASE64_SIGNATURES: &[(&str, &str)] = &[
    ("iVBORw0", "png"),
    ("UklGR", "webp"),
    ("R0lGOD", "gif"),
    ("/9j/", "jpeg"),
];

/// Resolves a stored payload to a renderable image source.
pub fn normalize(payload: &ImagePayload, placeholder: &str) -> String {
    match payload {
        ImagePayload::Text(text) => normalize_text(text, placeholder),
        ImagePayload::Bytes(bytes) => normalize_bytes(bytes, placeholder),
    }
}

fn normalize_text(text: &str, placeholder: &str) -> String {
    if text.is_empty() {
        return placeholder.to_string();
    }

    if text.starts_with("data:image") {
        return unwrap_double_encoded(text).unwrap_or_else(|| text.to_string());
    }

    if text.starts_with("http") || text.starts_with('/') {
        return text.to_string();
    }

    data_uri_from_base64(text).unwrap_or_else(|| placeholder.to_string())
}

fn normalize_bytes(bytes: &[u8], placeholder: &str) -> String {
    if bytes.is_empty() {
        return placeholder.to_string();
    }

    // Old rows stored textual URLs/data-URIs in the binary column.
    if let Ok(text) = std::str::from_utf8(bytes) {
        if text.starts_with("data:") || text.starts_with("http") || text.starts_with('/') {
            return text.to_string();
        }
    }

    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}

/// Detects a data-URI whose base64 payload is itself a data-URI
/// (accidental double encoding) and returns the inner value. Any decode
/// hiccup is swallowed and the outer value is kept.
fn unwrap_double_encoded(data_uri: &str) -> Option<String> {
    let (_, encoded) = data_uri.split_once(',')?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let inner = String::from_utf8(decoded).ok()?;
    inner.starts_with("data:image").then_some(inner)
}

/// Treats `text` as bare base64 and wraps it into a data-URI, sniffing the
/// MIME type from the encoded signature.
fn data_uri_from_base64(text: &str) -> Option<String> {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() || !is_base64_alphabet(&cleaned) {
        return None;
    }

    let mime = BASE64_SIGNATURES
        .iter()
        .find(|(signature, _)| cleaned.starts_with(signature))
        .map(|(_, mime)| *mime)
        .unwrap_or("jpeg");

    Some(format!("data:image/{mime};base64,{cleaned}"))
}

fn is_base64_alphabet(text: &str) -> bool {
    text.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLACEHOLDER: &str = "/placeholder.svg";

    fn text(value: &str) -> ImagePayload {
        ImagePayload::Text(value.to_string())
    }

    #[test]
    fn empty_payload_falls_back() {
        assert_eq!(normalize(&text(""), PLACEHOLDER), PLACEHOLDER);
        assert_eq!(normalize(&ImagePayload::Bytes(Vec::new()), PLACEHOLDER), PLACEHOLDER);
    }

    #[test]
    fn urls_and_paths_pass_through() {
        assert_eq!(normalize(&text("/foo.png"), PLACEHOLDER), "/foo.png");
        assert_eq!(
            normalize(&text("https://example.com/shot.webp"), PLACEHOLDER),
            "https://example.com/shot.webp"
        );
    }

    #[test]
    fn data_uri_without_valid_inner_is_unchanged() {
        let uri = "data:image/png;base64,abc";
        assert_eq!(normalize(&text(uri), PLACEHOLDER), uri);
    }

    #[test]
    fn double_encoded_data_uri_is_unwrapped() {
        let inner = "data:image/png;base64,iVBORw0KGgo=";
        let outer = format!("data:image/png;base64,{}", STANDARD.encode(inner));
        assert_eq!(normalize(&text(&outer), PLACEHOLDER), inner);
    }

    #[test]
    fn bare_png_base64_gets_a_png_prefix() {
        let out = normalize(&text("iVBORw0KGgoAAAANSUhEUg=="), PLACEHOLDER);
        assert!(out.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn bare_gif_and_webp_signatures_sniffed() {
        assert!(normalize(&text("R0lGODlhAQABAAAA"), PLACEHOLDER)
            .starts_with("data:image/gif;base64,"));
        assert!(normalize(&text("UklGRiIAAABXRUJQ"), PLACEHOLDER)
            .starts_with("data:image/webp;base64,"));
    }

    #[test]
    fn unknown_signature_defaults_to_jpeg() {
        assert!(normalize(&text("QUJDREVGRw=="), PLACEHOLDER)
            .starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn whitespace_in_base64_is_stripped() {
        let out = normalize(&text("iVBORw0K\nGgoAAAAN"), PLACEHOLDER);
        assert_eq!(out, "data:image/png;base64,iVBORw0KGgoAAAAN");
    }

    #[test]
    fn invalid_base64_falls_back() {
        assert_eq!(normalize(&text("not base64!"), PLACEHOLDER), PLACEHOLDER);
    }

    #[test]
    fn binary_bytes_encode_as_png_data_uri() {
        let out = normalize(&ImagePayload::Bytes(vec![0x89, 0x50, 0x4e, 0x47]), PLACEHOLDER);
        assert_eq!(
            out,
            format!(
                "data:image/png;base64,{}",
                STANDARD.encode([0x89u8, 0x50, 0x4e, 0x47])
            )
        );
    }

    #[test]
    fn textual_bytes_are_decoded_in_place() {
        let out = normalize(
            &ImagePayload::Bytes(b"https://example.com/a.png".to_vec()),
            PLACEHOLDER,
        );
        assert_eq!(out, "https://example.com/a.png");

        let out = normalize(&ImagePayload::Bytes(b"data:image/gif;base64,R0lGOD".to_vec()), PLACEHOLDER);
        assert_eq!(out, "data:image/gif;base64,R0lGOD");
    }

    #[test]
    fn jpeg_signature_starting_with_slash_is_kept_as_path() {
        // Rule order: "/9j/..." matches the leading-slash URL rule first.
        let raw = "/9j/4AAQSkZJRg==";
        assert_eq!(normalize(&text(raw), PLACEHOLDER), raw);
    }
}
