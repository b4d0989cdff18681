//! Filesystem-backed ImageStore.
//!
//! Directory structure:
//! ```text
//! upload_root/
//! ├── 3f2a...c1_1718000000.png
//! └── 9b7e...04_1718000042.jpg
//! ```

use async_trait::async_trait;
use customflow_core::error::Result;
use customflow_core::image::{
    ImageStore, MAX_FILE_BYTES, StoredImage, UploadRejection, extension_of, image_mime_type,
    is_allowed_extension, is_safe_filename, public_path,
};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    /// Creates the store, creating the upload root if needed.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn generate_name(original_name: &str) -> String {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let ext = extension_of(original_name)
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        format!("{}_{}{}", Uuid::new_v4().simple(), secs, ext)
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn store(
        &self,
        original_name: &str,
        bytes: &[u8],
    ) -> std::result::Result<StoredImage, UploadRejection> {
        if !is_allowed_extension(original_name) {
            return Err(UploadRejection::InvalidType);
        }
        if bytes.len() > MAX_FILE_BYTES {
            return Err(UploadRejection::TooLarge);
        }

        let filename = Self::generate_name(original_name);
        let path = self.root.join(&filename);
        if let Err(e) = tokio::fs::write(&path, bytes).await {
            tracing::error!(path = %path.display(), error = %e, "Failed to save upload");
            return Err(UploadRejection::SaveFailed);
        }

        tracing::debug!(%filename, original_name, size = bytes.len(), "Upload stored");
        Ok(StoredImage {
            url: public_path(&filename),
            mime_type: image_mime_type(&filename).to_string(),
            original_name: original_name.to_string(),
            size: bytes.len() as u64,
            filename,
        })
    }

    async fn stat(&self, filename: &str) -> Result<Option<u64>> {
        let Some(path) = self.resolve(filename) else {
            return Ok(None);
        };
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(Some(meta.len())),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn read(&self, filename: &str) -> Result<Option<Vec<u8>>> {
        let Some(path) = self.resolve(filename) else {
            return Ok(None);
        };
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn resolve(&self, filename: &str) -> Option<PathBuf> {
        is_safe_filename(filename).then(|| self.root.join(filename))
    }
}
