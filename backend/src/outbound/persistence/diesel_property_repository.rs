//! PostgreSQL-backed `PropertyRepository` implementation using Diesel ORM.
//!
//! The property row and its image rows are written inside one transaction on
//! a single pooled connection. Any failure rolls the whole listing back; the
//! connection returns to the pool when the guard drops.

use async_trait::async_trait;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::ports::{PropertyPersistenceError, PropertyRepository};
use crate::domain::{NewProperty, PropertyId};

use super::diesel_helpers::{DieselFailure, classify_diesel_error, map_basic_pool_error};
use super::models::{NewPropertyImageRow, NewPropertyRow};
use super::pool::{DbPool, PoolError};
use super::schema::{properties, property_images};

/// Diesel-backed implementation of the `PropertyRepository` port.
#[derive(Clone)]
pub struct DieselPropertyRepository {
    pool: DbPool,
}

impl DieselPropertyRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PropertyPersistenceError {
    map_basic_pool_error(error, PropertyPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> PropertyPersistenceError {
    match classify_diesel_error(&error) {
        DieselFailure::Connection(message) => PropertyPersistenceError::connection(message),
        DieselFailure::UniqueViolation => PropertyPersistenceError::query("duplicate key"),
        DieselFailure::Query(message) => PropertyPersistenceError::query(message),
    }
}

fn property_row(id: Uuid, property: &NewProperty) -> NewPropertyRow<'_> {
    let draft = property.draft();
    NewPropertyRow {
        id,
        owner_id: *property.owner_id().as_uuid(),
        title: draft.title(),
        description: draft.description(),
        price: draft.price(),
        area_sqm: draft.area_sqm(),
        property_type: draft.property_type().as_str(),
        location_city: draft.location_city(),
        listing_type: draft.listing_type().as_str(),
    }
}

/// One row per staged path; `position` follows upload order.
fn image_rows(property_id: Uuid, property: &NewProperty) -> Vec<NewPropertyImageRow<'_>> {
    property
        .images()
        .iter()
        .zip(0_i32..)
        .map(|(image, position)| NewPropertyImageRow {
            id: Uuid::new_v4(),
            property_id,
            image_url: image.as_str(),
            position,
        })
        .collect()
}

#[async_trait]
impl PropertyRepository for DieselPropertyRepository {
    async fn create_with_images(
        &self,
        property: &NewProperty,
    ) -> Result<PropertyId, PropertyPersistenceError> {
        let id = Uuid::new_v4();
        let listing = property_row(id, property);
        let images = image_rows(id, property);
        let image_count = images.len();

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction(|conn| {
            async move {
                diesel::insert_into(properties::table)
                    .values(&listing)
                    .execute(conn)
                    .await?;
                debug!(property_id = %id, "property row inserted");

                if !images.is_empty() {
                    diesel::insert_into(property_images::table)
                        .values(&images)
                        .execute(conn)
                        .await?;
                }

                Ok::<_, diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)?;

        info!(property_id = %id, images = image_count, "listing committed");
        Ok(PropertyId::from_uuid(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ImagePath, PropertyDraft, PropertyFields, UserId};
    use rstest::rstest;

    fn listing(images: usize) -> NewProperty {
        let fields = PropertyFields {
            title: Some("Loft".to_owned()),
            description: Some("Bright".to_owned()),
            price: Some("1200".to_owned()),
            area: Some("45.5".to_owned()),
            property_type: Some("Apartment".to_owned()),
            location_city: Some("Metropolis".to_owned()),
            listing_type: Some("rent".to_owned()),
        };
        let draft = PropertyDraft::try_from_fields(&fields).expect("valid draft");
        let paths = (0..images)
            .map(|i| ImagePath::for_file_name(&format!("{i}.jpg")).expect("path"))
            .collect();
        NewProperty::new(UserId::from_uuid(Uuid::nil()), draft, paths).expect("listing")
    }

    #[rstest]
    fn property_row_carries_normalised_values() {
        let property = listing(0);
        let row = property_row(Uuid::nil(), &property);
        assert_eq!(row.property_type, "apartment");
        assert_eq!(row.listing_type, "rent");
        assert!((row.area_sqm - 45.5).abs() < f64::EPSILON);
        assert_eq!(row.owner_id, Uuid::nil());
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(5)]
    fn image_rows_follow_upload_order(#[case] count: usize) {
        let property = listing(count);
        let rows = image_rows(Uuid::nil(), &property);
        assert_eq!(rows.len(), count);
        for (expected, row) in rows.iter().enumerate() {
            assert_eq!(row.position, i32::try_from(expected).expect("small index"));
            assert_eq!(row.image_url, format!("/uploads/{expected}.jpg"));
        }
    }

    #[rstest]
    fn missing_rows_map_to_query_error() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, PropertyPersistenceError::Query { .. }));
    }
}
