//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{properties, property_images, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Insertable struct for the property half of a listing.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = properties)]
pub(crate) struct NewPropertyRow<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub price: f64,
    pub area_sqm: f64,
    pub property_type: &'a str,
    pub location_city: &'a str,
    pub listing_type: &'a str,
}

/// Insertable struct for one listing photo.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = property_images)]
pub(crate) struct NewPropertyImageRow<'a> {
    pub id: Uuid,
    pub property_id: Uuid,
    pub image_url: &'a str,
    pub position: i32,
}
