//! Port for transactional property persistence.

use async_trait::async_trait;

use crate::domain::{NewProperty, PropertyId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by property repository adapters.
    pub enum PropertyPersistenceError {
        /// A pooled connection could not be obtained.
        Connection { message: String } => "property repository connection failed: {message}",
        /// A statement inside the transaction failed; nothing was committed.
        Query { message: String } => "property repository query failed: {message}",
    }
}

/// Store for property listings and their images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    /// Insert the property and one image row per path, in order, atomically.
    ///
    /// On success the property and every image row are committed. On error
    /// none of them are.
    async fn create_with_images(
        &self,
        property: &NewProperty,
    ) -> Result<PropertyId, PropertyPersistenceError>;
}
