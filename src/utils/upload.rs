use bytes::Bytes;
use chrono::Utc;

use crate::interceptors::{AppError, AppResult};
use crate::utils::slug::random_alnum;

/// Maximum accepted upload size per file (2MB).
pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

/// A multipart file buffered whole in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Original extension of the uploaded file, lowercased.
    pub fn extension(&self) -> Option<String> {
        let ext = self.file_name.rsplit_once('.')?.1;
        if ext.is_empty() || ext.contains('/') {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// Reject anything that is not an image within the size limit. Runs before
/// any byte is written to storage.
pub fn validate_image(field: &str, file: &UploadedFile) -> AppResult<()> {
    if !file.content_type.starts_with("image/") {
        return Err(AppError::field_validation(field, "File must be an image"));
    }
    if file.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::field_validation(field, "Image may not be larger than 2MB"));
    }
    if file.extension().is_none() {
        return Err(AppError::field_validation(field, "File name must carry an extension"));
    }
    Ok(())
}

/// Collision-resistant storage key:
/// `{prefix}/{YYYYMMDD_HHMMSS}_{random_alnum(8)}.{extension}`.
///
/// Timestamp granularity is whole seconds; concurrent uploads within the same
/// second rely on the random suffix for uniqueness.
pub fn generate_storage_key(prefix: &str, extension: &str) -> String {
    format!(
        "{}/{}_{}.{}",
        prefix,
        Utc::now().format("%Y%m%d_%H%M%S"),
        random_alnum(8),
        extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn image(name: &str, content_type: &str, size: usize) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: content_type.to_string(),
            bytes: Bytes::from(vec![0u8; size]),
        }
    }

    #[test]
    fn storage_key_matches_expected_shape() {
        let key = generate_storage_key("products", "png");
        let re = Regex::new(r"^products/\d{8}_\d{6}_[A-Za-z0-9]{8}\.png$").unwrap();
        assert!(re.is_match(&key), "unexpected key: {}", key);
    }

    #[test]
    fn keys_differ_within_the_same_second() {
        assert_ne!(
            generate_storage_key("products", "jpg"),
            generate_storage_key("products", "jpg")
        );
    }

    #[test]
    fn rejects_non_image_content_type() {
        let file = image("notes.txt", "text/plain", 10);
        assert!(validate_image("images", &file).is_err());
    }

    #[test]
    fn rejects_oversized_image() {
        let file = image("big.png", "image/png", MAX_UPLOAD_BYTES + 1);
        assert!(validate_image("images", &file).is_err());
    }

    #[test]
    fn accepts_small_image_and_reads_extension() {
        let file = image("photo.JPG", "image/jpeg", 1024);
        assert!(validate_image("images", &file).is_ok());
        assert_eq!(file.extension().as_deref(), Some("jpg"));
    }

    #[test]
    fn missing_extension_is_rejected() {
        let file = image("photo", "image/png", 10);
        assert!(validate_image("avatar", &file).is_err());
    }
}
