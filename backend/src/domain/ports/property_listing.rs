//! Driving port for creating property listings.

use async_trait::async_trait;

use crate::domain::{Error, PropertyFields, PropertyId, User};

use super::ImageUpload;

/// Domain use-case port for listing a property with photos.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PropertyListingService: Send + Sync {
    /// Validate the form, stage the uploads and store the listing atomically.
    ///
    /// `uploads` are kept in the order received; that order becomes the
    /// image position.
    async fn create_listing(
        &self,
        owner: &User,
        fields: &PropertyFields,
        uploads: Vec<ImageUpload>,
    ) -> Result<PropertyId, Error>;
}
