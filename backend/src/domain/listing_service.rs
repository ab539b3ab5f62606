//! Property listing domain service.
//!
//! Validates the submitted form, stages uploads and hands the listing to the
//! repository for a single all-or-nothing transaction.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info};

use crate::domain::ports::{
    ImageUpload, PropertyListingService, PropertyPersistenceError, PropertyRepository,
    UploadStager,
};
use crate::domain::{
    Error, ImagePath, MAX_PROPERTY_IMAGES, NewProperty, PropertyDraft, PropertyFields, PropertyId,
    PropertyValidationError, TraceId, User,
};

/// Map a listing validation failure to a `400` with field details.
pub fn validation_error(err: PropertyValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": err.field().map(|field| field.as_str()),
        "code": err.code(),
    }))
}

/// Listing service backed by a property repository and an upload stager.
#[derive(Clone)]
pub struct ListingService<R, S> {
    properties: Arc<R>,
    stager: Arc<S>,
}

impl<R, S> ListingService<R, S> {
    /// Create a new service with the given adapters.
    pub fn new(properties: Arc<R>, stager: Arc<S>) -> Self {
        Self { properties, stager }
    }
}

impl<R, S> ListingService<R, S>
where
    R: PropertyRepository + 'static,
    S: UploadStager,
{
    async fn stage_all(&self, uploads: &[ImageUpload]) -> Result<Vec<ImagePath>, Error> {
        let mut staged = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let path = self.stager.stage(upload).await.map_err(|err| {
                error!(error = %err, staged = ?staged, "upload staging failed");
                Error::internal(err.to_string())
            })?;
            staged.push(path);
        }
        Ok(staged)
    }

    /// Run the transaction on its own task so a dropped request cannot
    /// cancel it between statements.
    async fn commit(&self, property: NewProperty) -> Result<PropertyId, PropertyPersistenceError> {
        let repo = Arc::clone(&self.properties);
        let task = async move { repo.create_with_images(&property).await };
        let handle = match TraceId::current() {
            Some(trace_id) => tokio::spawn(TraceId::scope(trace_id, task)),
            None => tokio::spawn(task),
        };
        handle
            .await
            .map_err(|err| PropertyPersistenceError::query(format!("transaction task failed: {err}")))?
    }
}

#[async_trait]
impl<R, S> PropertyListingService for ListingService<R, S>
where
    R: PropertyRepository + 'static,
    S: UploadStager,
{
    async fn create_listing(
        &self,
        owner: &User,
        fields: &PropertyFields,
        uploads: Vec<ImageUpload>,
    ) -> Result<PropertyId, Error> {
        let draft = PropertyDraft::try_from_fields(fields).map_err(validation_error)?;
        if uploads.len() > MAX_PROPERTY_IMAGES {
            return Err(validation_error(PropertyValidationError::TooManyImages {
                max: MAX_PROPERTY_IMAGES,
            }));
        }

        let images = self.stage_all(&uploads).await?;
        let staged = images.clone();
        let property =
            NewProperty::new(owner.id().clone(), draft, images).map_err(validation_error)?;

        match self.commit(property).await {
            Ok(property_id) => {
                info!(%property_id, owner_id = %owner.id(), images = staged.len(), "property listed");
                Ok(property_id)
            }
            Err(err) => {
                // TODO: delete staged files here once UploadStager exposes a discard operation.
                error!(
                    error = %err,
                    owner_id = %owner.id(),
                    orphaned = ?staged.iter().map(ImagePath::as_str).collect::<Vec<_>>(),
                    "property transaction rolled back; staged uploads left on disk"
                );
                Err(Error::internal(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
#[path = "listing_service_tests.rs"]
mod tests;
