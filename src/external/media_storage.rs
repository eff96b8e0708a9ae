use crate::config::MediaConfig;
use crate::error::{AppError, AppResult};
use std::path::{Path, PathBuf};

const PROFILE_PHOTO_DIR: &str = "profiles";

/// Local filesystem store for uploaded images. Returns references relative to the media root.
#[derive(Clone)]
pub struct MediaStorage {
    root: PathBuf,
    max_upload_bytes: usize,
}

impl MediaStorage {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            root: PathBuf::from(&config.root),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Accepted type and size; returns the file extension to store under.
    pub fn check_profile_photo(&self, content_type: &str, bytes: &[u8]) -> AppResult<&'static str> {
        let ext = image_extension(content_type).ok_or_else(|| {
            AppError::ValidationError(format!(
                "profile_photo: Unsupported image type \"{content_type}\""
            ))
        })?;
        if bytes.is_empty() {
            return Err(AppError::ValidationError(
                "profile_photo: The submitted file is empty.".to_string(),
            ));
        }
        if bytes.len() > self.max_upload_bytes {
            return Err(AppError::ValidationError(format!(
                "profile_photo: File exceeds {} bytes",
                self.max_upload_bytes
            )));
        }
        Ok(ext)
    }

    pub async fn store_profile_photo(&self, content_type: &str, bytes: &[u8]) -> AppResult<String> {
        let ext = self.check_profile_photo(content_type, bytes)?;
        let dir = self.root.join(PROFILE_PHOTO_DIR);
        tokio::fs::create_dir_all(&dir).await?;

        let file_name = format!("{}.{ext}", uuid::Uuid::new_v4().simple());
        tokio::fs::write(dir.join(&file_name), bytes).await?;

        Ok(format!("{PROFILE_PHOTO_DIR}/{file_name}"))
    }
}

fn image_extension(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next().unwrap_or("").trim();
    match mime {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_storage(max: usize) -> MediaStorage {
        let root = std::env::temp_dir().join(format!("fitzone-media-{}", uuid::Uuid::new_v4()));
        MediaStorage::new(&MediaConfig {
            root: root.to_string_lossy().to_string(),
            max_upload_bytes: max,
        })
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("image/png"), Some("png"));
        assert_eq!(image_extension("image/jpeg; charset=binary"), Some("jpg"));
        assert_eq!(image_extension("application/pdf"), None);
    }

    #[actix_web::test]
    async fn test_store_profile_photo_writes_file() {
        let storage = temp_storage(1024);
        let reference = storage
            .store_profile_photo("image/png", b"\x89PNG fake")
            .await
            .unwrap();
        assert!(reference.starts_with("profiles/"));
        assert!(reference.ends_with(".png"));

        let written = tokio::fs::read(storage.root().join(&reference)).await.unwrap();
        assert_eq!(written, b"\x89PNG fake");
        let _ = tokio::fs::remove_dir_all(storage.root()).await;
    }

    #[actix_web::test]
    async fn test_store_profile_photo_rejects_bad_uploads() {
        let storage = temp_storage(4);
        assert!(storage.store_profile_photo("text/plain", b"abc").await.is_err());
        assert!(storage.store_profile_photo("image/png", b"").await.is_err());
        assert!(storage.store_profile_photo("image/png", b"too big").await.is_err());
        assert_eq!(storage.check_profile_photo("image/gif", b"GIF8").unwrap(), "gif");
        assert!(!storage.root().exists());
    }
}
