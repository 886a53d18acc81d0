//! Uploaded file storage.
//!
//! Files are addressed by a relative path such as `merchant-1/logo.png` and
//! exposed under the media base URL once written.

use std::future::Future;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use shopspot_core::MerchantId;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Only image uploads are allowed (got {0})")]
    UnsupportedType(String),

    #[error("Invalid upload path: {0}")]
    InvalidPath(String),

    #[error("failed to write upload: {0}")]
    Io(#[from] std::io::Error),
}

/// Blob storage for uploaded images.
pub trait FileStorage: Send + Sync {
    /// Write `bytes` at `path`, replacing any existing file, and return its
    /// public URL.
    fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> impl Future<Output = Result<String, StorageError>> + Send;
}

/// Stores files on the local filesystem below `root`.
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
    base_url: String,
}

impl LocalFileStorage {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, base_url: &str) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileStorage for LocalFileStorage {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        ensure_image(content_type)?;
        let relative = checked_relative(path)?;
        let target = self.root.join(relative);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &bytes).await?;

        tracing::debug!(path, size = bytes.len(), "Stored upload");
        Ok(format!("{}/{path}", self.base_url))
    }
}

/// Reject anything that is not `image/*`.
///
/// # Errors
///
/// Returns `StorageError::UnsupportedType` otherwise.
pub fn ensure_image(content_type: &str) -> Result<(), StorageError> {
    if content_type.trim().to_ascii_lowercase().starts_with("image/") {
        Ok(())
    } else {
        Err(StorageError::UnsupportedType(content_type.to_owned()))
    }
}

fn checked_relative(path: &str) -> Result<&Path, StorageError> {
    let candidate = Path::new(path);
    let only_normal = candidate
        .components()
        .all(|component| matches!(component, Component::Normal(_)));
    if path.is_empty() || !only_normal {
        return Err(StorageError::InvalidPath(path.to_owned()));
    }
    Ok(candidate)
}

/// Keep `[A-Za-z0-9_-]`, replacing everything else with `-`.
fn sanitize_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Lowercased extension of an uploaded file name, `bin` if it has none.
fn extension(file_name: &str) -> String {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(sanitize_segment)
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| "bin".to_owned());
    ext.to_ascii_lowercase()
}

/// Path of a merchant's store logo. A new upload overwrites the old one.
#[must_use]
pub fn logo_path(merchant: &MerchantId, file_name: &str) -> String {
    format!(
        "{}/logo.{}",
        sanitize_segment(merchant.as_str()),
        extension(file_name)
    )
}

/// Path of a menu item image uploaded at `unix_millis`.
#[must_use]
pub fn menu_image_path(unix_millis: i64, file_name: &str) -> String {
    format!("menu-items/{unix_millis}.{}", extension(file_name))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_logo_path() {
        let merchant = MerchantId::parse("merchant-1").unwrap();
        assert_eq!(logo_path(&merchant, "My Logo.PNG"), "merchant-1/logo.png");
        assert_eq!(logo_path(&merchant, "logo"), "merchant-1/logo.bin");

        let sneaky = MerchantId::parse("../etc").unwrap();
        assert_eq!(logo_path(&sneaky, "a.jpg"), "---etc/logo.jpg");
    }

    #[test]
    fn test_menu_image_path() {
        assert_eq!(
            menu_image_path(1_700_000_000_000, "burger.jpeg"),
            "menu-items/1700000000000.jpeg"
        );
    }

    #[test]
    fn test_rejects_non_images_and_bad_paths() {
        assert!(ensure_image("image/png").is_ok());
        assert!(ensure_image("IMAGE/webp").is_ok());
        assert!(matches!(
            ensure_image("application/pdf"),
            Err(StorageError::UnsupportedType(_))
        ));

        assert!(checked_relative("merchant-1/logo.png").is_ok());
        assert!(checked_relative("../logo.png").is_err());
        assert!(checked_relative("/etc/passwd").is_err());
        assert!(checked_relative("").is_err());
    }

    #[tokio::test]
    async fn test_put_writes_file_and_returns_url() {
        let root = std::env::temp_dir().join(format!("shopspot-media-{}", uuid::Uuid::new_v4()));
        let storage = LocalFileStorage::new(&root, "http://localhost:3000/media/");

        let url = storage
            .put("merchant-1/logo.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:3000/media/merchant-1/logo.png");
        let written = tokio::fs::read(root.join("merchant-1/logo.png")).await.unwrap();
        assert_eq!(written, [1, 2, 3]);

        let rejected = storage.put("merchant-1/doc.pdf", vec![0], "application/pdf").await;
        assert!(matches!(rejected, Err(StorageError::UnsupportedType(_))));

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }
}
