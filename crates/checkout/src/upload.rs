use serde::{Deserialize, Serialize};

use pixelift_core::{DomainError, DomainResult, ValueObject};

/// MIME types the uploader accepts, mirrored by the file input's accept list.
pub const ACCEPTED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Default upload ceiling when the block attributes configure nothing else.
pub const DEFAULT_MAX_FILE_SIZE_MB: u32 = 10;

/// Client-side reference to the file the customer picked.
///
/// Only metadata travels through the flow; bytes stay with the upload
/// collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

impl UploadedFile {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            size_bytes,
        }
    }
}

impl ValueObject for UploadedFile {}

/// Upload acceptance rules for one uploader block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPolicy {
    pub max_file_size_mb: u32,
}

impl UploadPolicy {
    pub fn new(max_file_size_mb: u32) -> Self {
        Self { max_file_size_mb }
    }

    pub fn max_bytes(&self) -> u64 {
        u64::from(self.max_file_size_mb) * 1024 * 1024
    }

    pub fn accepts_type(&self, mime_type: &str) -> bool {
        ACCEPTED_MIME_TYPES.contains(&mime_type)
    }

    /// Accept or reject a picked file. Rejections are recoverable: the
    /// customer picks another file without losing anything else.
    pub fn check(&self, file: &UploadedFile) -> DomainResult<()> {
        if !self.accepts_type(&file.mime_type) {
            return Err(DomainError::validation(format!(
                "unsupported file type: {} (accepted: {})",
                file.mime_type,
                ACCEPTED_MIME_TYPES.join(", ")
            )));
        }

        if file.size_bytes > self.max_bytes() {
            return Err(DomainError::validation(format!(
                "file exceeds the {} MB limit",
                self.max_file_size_mb
            )));
        }

        Ok(())
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE_MB)
    }
}

impl ValueObject for UploadPolicy {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_listed_types_within_limit() {
        let policy = UploadPolicy::default();
        for mime in ACCEPTED_MIME_TYPES {
            let file = UploadedFile::new("photo", mime, 1024);
            assert!(policy.check(&file).is_ok(), "should accept {mime}");
        }
    }

    #[test]
    fn rejects_unlisted_type() {
        let policy = UploadPolicy::default();
        let file = UploadedFile::new("clip.gif", "image/gif", 1024);
        let err = policy.check(&file).unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("image/gif") => {}
            other => panic!("expected Validation naming the type, got {other:?}"),
        }
    }

    #[test]
    fn rejects_oversized_file() {
        let policy = UploadPolicy::new(2);
        let file = UploadedFile::new("big.png", "image/png", 3 * 1024 * 1024);
        let err = policy.check(&file).unwrap_err();
        match err {
            DomainError::Validation(msg) if msg.contains("2 MB") => {}
            other => panic!("expected Validation naming the limit, got {other:?}"),
        }
    }

    #[test]
    fn boundary_size_is_accepted() {
        let policy = UploadPolicy::new(2);
        let file = UploadedFile::new("edge.png", "image/png", 2 * 1024 * 1024);
        assert!(policy.check(&file).is_ok());
    }
}
