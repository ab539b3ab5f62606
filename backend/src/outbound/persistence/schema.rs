//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`.
//! `diesel print-schema` against a migrated database regenerates them.

diesel::table! {
    /// Registered accounts. `username` and `email` are unique.
    users (id) {
        id -> Uuid,
        username -> Varchar,
        email -> Varchar,
        /// PHC-encoded argon2 hash.
        password_hash -> Text,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Property listings owned by a user.
    properties (id) {
        id -> Uuid,
        owner_id -> Uuid,
        title -> Varchar,
        description -> Text,
        price -> Float8,
        area_sqm -> Float8,
        property_type -> Varchar,
        location_city -> Varchar,
        /// `sale` or `rent`, enforced by a check constraint.
        listing_type -> Varchar,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Photos attached to a property, ordered by `position`.
    property_images (id) {
        id -> Uuid,
        property_id -> Uuid,
        image_url -> Varchar,
        position -> Int4,
    }
}

diesel::joinable!(properties -> users (owner_id));
diesel::joinable!(property_images -> properties (property_id));

diesel::allow_tables_to_appear_in_same_query!(users, properties, property_images);
