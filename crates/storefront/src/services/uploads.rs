//! Product image uploads.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Largest accepted image, in bytes.
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Errors that can occur while storing an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Image is larger than 2 MiB")]
    TooLarge,

    #[error("failed to write upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether a multipart content type is an image.
#[must_use]
pub fn is_image(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"))
}

/// Build the stored file name: `<millis>-<original>`, spaces turned into
/// dashes and any path components dropped.
#[must_use]
pub fn stored_file_name(original: &str, unix_millis: i64) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .replace(char::is_whitespace, "-");
    let base = base.trim_start_matches('.');
    let base = if base.is_empty() { "image" } else { base };

    format!("{unix_millis}-{base}")
}

/// Write an uploaded image into `dir` and return the stored file name.
///
/// # Errors
///
/// Returns `UploadError::TooLarge` above [`MAX_IMAGE_BYTES`], or
/// `UploadError::Io` if the directory or file cannot be written.
pub async fn save_image(dir: &Path, original: &str, bytes: &[u8]) -> Result<String, UploadError> {
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(UploadError::TooLarge);
    }

    let file_name = stored_file_name(original, chrono::Utc::now().timestamp_millis());
    let path: PathBuf = dir.join(&file_name);

    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(&path, bytes).await?;

    tracing::info!(file = %file_name, size = bytes.len(), "Stored product image");
    Ok(file_name)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_file_name() {
        assert_eq!(
            stored_file_name("red mug front.png", 1_700_000_000_000),
            "1700000000000-red-mug-front.png"
        );
    }

    #[test]
    fn test_stored_file_name_strips_paths() {
        assert_eq!(stored_file_name("../../etc/passwd", 5), "5-passwd");
        assert_eq!(stored_file_name("C:\\photos\\mug.jpg", 5), "5-mug.jpg");
        assert_eq!(stored_file_name("..", 5), "5-image");
        assert_eq!(stored_file_name("", 5), "5-image");
    }

    #[test]
    fn test_is_image() {
        assert!(is_image(Some("image/png")));
        assert!(is_image(Some("IMAGE/JPEG")));
        assert!(!is_image(Some("text/plain")));
        assert!(!is_image(None));
    }

    #[tokio::test]
    async fn test_save_image_rejects_large_files() {
        let dir = std::env::temp_dir().join("awesome-store-upload-test");
        let bytes = vec![0_u8; MAX_IMAGE_BYTES + 1];
        assert!(matches!(
            save_image(&dir, "big.png", &bytes).await,
            Err(UploadError::TooLarge)
        ));
    }

    #[tokio::test]
    async fn test_save_image_writes_file() {
        let dir = std::env::temp_dir().join(format!("awesome-store-upload-{}", uuid::Uuid::new_v4()));
        let name = save_image(&dir, "tiny.png", b"png").await.unwrap();
        assert!(name.ends_with("-tiny.png"));
        assert_eq!(tokio::fs::read(dir.join(&name)).await.unwrap(), b"png");
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
