//! Conversion of user-supplied image files into inline images.

use std::path::Path;

use tracing::info;

use folio_core::models::image::{InlineImage, mime_for_extension};

use crate::error::StorageError;

/// Read an image file fully into memory, tagging it with a mime type
/// inferred from the extension.
pub async fn read_image_file(path: &Path) -> Result<InlineImage, StorageError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let mime = mime_for_extension(ext).ok_or_else(|| {
        StorageError::UnsupportedUpload(format!("unrecognized image extension '{ext}'"))
    })?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| StorageError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    info!(path = %path.display(), mime, bytes = bytes.len(), "image file read");
    Ok(InlineImage::new(mime, bytes))
}

/// Wrap an uploaded body, checking that it declares an image content type.
pub fn image_from_upload(
    content_type: Option<&str>,
    bytes: Vec<u8>,
) -> Result<InlineImage, StorageError> {
    let mime = content_type
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim())
        .filter(|ct| ct.starts_with("image/"))
        .ok_or_else(|| {
            StorageError::UnsupportedUpload(format!(
                "expected an image content type, got {}",
                content_type.unwrap_or("none")
            ))
        })?;

    if bytes.is_empty() {
        return Err(StorageError::UnsupportedUpload("empty upload".to_string()));
    }

    Ok(InlineImage::new(mime, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_file_with_extension_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.JPEG");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let image = read_image_file(&path).await.unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.bytes, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hi").unwrap();

        assert!(matches!(
            read_image_file(&path).await,
            Err(StorageError::UnsupportedUpload(_))
        ));
    }

    #[test]
    fn upload_requires_image_content_type() {
        let image = image_from_upload(Some("image/png; charset=binary"), vec![9]).unwrap();
        assert_eq!(image.mime_type, "image/png");

        assert!(image_from_upload(Some("text/plain"), vec![9]).is_err());
        assert!(image_from_upload(None, vec![9]).is_err());
        assert!(image_from_upload(Some("image/png"), Vec::new()).is_err());
    }
}
