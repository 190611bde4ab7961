//! Inline images: an owned byte buffer tagged with its mime type.
//!
//! Logos, generated images, and uploads are stored in the report as
//! `data:<mime>;base64,<payload>` URIs so the record stays self-contained.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::CoreError;

const DEFAULT_MIME: &str = "image/png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Decode a base64 payload carrying the given mime type.
    pub fn from_base64(mime_type: &str, payload: &str) -> Result<Self, CoreError> {
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| CoreError::InvalidDataUri(e.to_string()))?;
        Ok(Self::new(mime_type, bytes))
    }

    /// Parse a `data:` URI. A bare base64 string without the header is
    /// accepted and tagged as PNG.
    pub fn from_data_uri(uri: &str) -> Result<Self, CoreError> {
        let Some(rest) = uri.strip_prefix("data:") else {
            return Self::from_base64(DEFAULT_MIME, uri);
        };

        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| CoreError::InvalidDataUri("missing ',' separator".to_string()))?;

        let Some(mime) = header.strip_suffix(";base64") else {
            return Err(CoreError::InvalidDataUri(format!(
                "only base64 payloads are supported, got header '{header}'"
            )));
        };

        let mime = if mime.is_empty() { DEFAULT_MIME } else { mime };
        Self::from_base64(mime, payload)
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// Map a file extension to an image mime type.
///
/// Returns `None` for extensions that aren't accepted as report images.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

pub fn is_data_uri(src: &str) -> bool {
    src.starts_with("data:")
}
