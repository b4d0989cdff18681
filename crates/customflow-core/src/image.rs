//! Uploaded images: upload rules, the storage seam and the reference resolver.
//!
//! Orders never carry image bytes. Clients upload files first, then reference
//! the returned filenames when creating or updating an order. The resolver
//! turns those references into image rows, dropping any that do not exist.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::Result;
use crate::order::NewOrderImage;
use crate::outcome::Partitioned;

/// Extensions accepted by the upload endpoint, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "svg"];
/// Per-file size limit.
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;
/// Limit on the whole multipart request body.
pub const MAX_REQUEST_BYTES: usize = 32 * 1024 * 1024;
/// URL prefix under which stored uploads are served.
pub const UPLOAD_URL_PREFIX: &str = "/uploads";

/// Lower-cased extension of a filename, without the dot.
pub fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

pub fn is_allowed_extension(filename: &str) -> bool {
    extension_of(filename).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// A referenced filename must be a single path component.
pub fn is_safe_filename(filename: &str) -> bool {
    !filename.trim().is_empty()
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.contains("..")
        && !filename.contains('\0')
}

/// MIME type stored with an order image.
pub fn image_mime_type(filename: &str) -> &'static str {
    match extension_of(filename).as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// MIME type declared in an OCR data URL. The vision API only takes these four.
pub fn ocr_mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

pub fn public_path(filename: &str) -> String {
    format!("{UPLOAD_URL_PREFIX}/{filename}")
}

/// Result of storing one uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredImage {
    pub filename: String,
    pub original_name: String,
    pub size: u64,
    pub url: String,
    pub mime_type: String,
}

/// Why an uploaded file was not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum UploadRejection {
    #[strum(serialize = "invalid type")]
    InvalidType,
    #[strum(serialize = "too large")]
    TooLarge,
    #[strum(serialize = "save failed")]
    SaveFailed,
}

/// Storage for uploaded image files.
#[async_trait::async_trait]
pub trait ImageStore: Send + Sync {
    /// Validates and persists one uploaded file under a freshly generated name.
    async fn store(
        &self,
        original_name: &str,
        bytes: &[u8],
    ) -> std::result::Result<StoredImage, UploadRejection>;

    /// Byte size of a stored file, `None` when it does not exist.
    ///
    /// Unsafe filenames are reported as missing without touching the filesystem.
    async fn stat(&self, filename: &str) -> Result<Option<u64>>;

    /// Contents of a stored file, `None` when it does not exist.
    async fn read(&self, filename: &str) -> Result<Option<Vec<u8>>>;

    /// Absolute location of a stored file, `None` for unsafe filenames.
    fn resolve(&self, filename: &str) -> Option<PathBuf>;
}

/// Resolves uploaded filenames into image rows.
#[derive(Clone)]
pub struct ImageResolver {
    store: Arc<dyn ImageStore>,
}

impl ImageResolver {
    pub fn new(store: Arc<dyn ImageStore>) -> Self {
        Self { store }
    }

    /// Looks up each filename in order.
    ///
    /// Missing or unsafe names land in `failed`; this never returns an error
    /// for an individual file.
    pub async fn resolve(&self, filenames: &[String]) -> Partitioned<NewOrderImage> {
        let mut outcome = Partitioned::default();
        for filename in filenames {
            if !is_safe_filename(filename) {
                outcome.push_failed(filename.as_str(), "unsafe filename");
                continue;
            }
            match self.store.stat(filename).await {
                Ok(Some(size)) => outcome.push_ok(NewOrderImage {
                    filename: filename.clone(),
                    path: public_path(filename),
                    size: size as i64,
                    mime_type: image_mime_type(filename).to_string(),
                }),
                Ok(None) => outcome.push_failed(filename.as_str(), "not found"),
                Err(err) => outcome.push_failed(filename.as_str(), err.to_string()),
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeStore {
        files: HashMap<String, u64>,
    }

    #[async_trait::async_trait]
    impl ImageStore for FakeStore {
        async fn store(
            &self,
            _original_name: &str,
            _bytes: &[u8],
        ) -> std::result::Result<StoredImage, UploadRejection> {
            Err(UploadRejection::SaveFailed)
        }

        async fn stat(&self, filename: &str) -> Result<Option<u64>> {
            Ok(self.files.get(filename).copied())
        }

        async fn read(&self, _filename: &str) -> Result<Option<Vec<u8>>> {
            Ok(None)
        }

        fn resolve(&self, filename: &str) -> Option<PathBuf> {
            is_safe_filename(filename).then(|| PathBuf::from("/srv").join(filename))
        }
    }

    #[test]
    fn test_upload_rules() {
        assert!(is_allowed_extension("photo.JPG"));
        assert!(is_allowed_extension("diagram.svg"));
        assert!(!is_allowed_extension("notes.pdf"));
        assert!(!is_allowed_extension("noext"));
    }

    #[test]
    fn test_filename_safety() {
        assert!(is_safe_filename("abc_123.png"));
        assert!(!is_safe_filename(""));
        assert!(!is_safe_filename("../etc/passwd"));
        assert!(!is_safe_filename("sub/dir.png"));
        assert!(!is_safe_filename("sub\\dir.png"));
    }

    #[test]
    fn test_mime_mapping() {
        assert_eq!(image_mime_type("a.JPEG"), "image/jpeg");
        assert_eq!(image_mime_type("a.svg"), "image/svg+xml");
        assert_eq!(image_mime_type("a.tiff"), "application/octet-stream");
        assert_eq!(ocr_mime_type(Path::new("a.bmp")), "image/jpeg");
        assert_eq!(ocr_mime_type(Path::new("a.webp")), "image/webp");
    }

    #[test]
    fn test_rejection_reasons() {
        assert_eq!(UploadRejection::InvalidType.to_string(), "invalid type");
        assert_eq!(UploadRejection::TooLarge.to_string(), "too large");
        assert_eq!(UploadRejection::SaveFailed.to_string(), "save failed");
    }

    #[tokio::test]
    async fn test_resolver_partitions_missing_files() {
        let store = FakeStore {
            files: HashMap::from([("a.png".to_string(), 1024)]),
        };
        let resolver = ImageResolver::new(Arc::new(store));

        let outcome = resolver
            .resolve(&[
                "a.png".to_string(),
                "missing.png".to_string(),
                "../a.png".to_string(),
            ])
            .await;

        assert_eq!(outcome.succeeded.len(), 1);
        let image = &outcome.succeeded[0];
        assert_eq!(image.path, "/uploads/a.png");
        assert_eq!(image.size, 1024);
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(outcome.failed.len(), 2);
        assert_eq!(outcome.failed[0].item, "missing.png");
        assert_eq!(outcome.failed[1].reason, "unsafe filename");
    }
}
