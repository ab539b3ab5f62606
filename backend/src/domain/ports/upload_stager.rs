//! Port for writing uploaded images to the content directory.

use std::fmt;

use async_trait::async_trait;

use crate::domain::ImagePath;

use super::define_port_error;

define_port_error! {
    /// Errors raised while staging uploads.
    pub enum UploadStagerError {
        /// Writing to the content directory failed.
        Io { message: String } => "upload staging failed: {message}",
    }
}

/// An uploaded image held in memory awaiting staging.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Client-supplied file name; only its extension is ever reused.
    pub original_name: String,
    /// Declared MIME type, already checked to be `image/*`.
    pub content_type: String,
    /// Complete file contents.
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("original_name", &self.original_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Writes uploads under fresh collision-resistant names.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UploadStager: Send + Sync {
    /// Persist one upload and return its public path.
    async fn stage(&self, upload: &ImageUpload) -> Result<ImagePath, UploadStagerError>;
}
