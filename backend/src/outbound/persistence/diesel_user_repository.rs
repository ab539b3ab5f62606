//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Thin adapter: rows are converted to domain types and Diesel failures to
//! `UserPersistenceError`. Uniqueness of username and email is enforced by
//! the database; a violation surfaces as `UserPersistenceError::Conflict`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    EmailAddress, NewUser, PasswordHash, StoredCredentials, User, UserId, Username,
};

use super::diesel_helpers::{DieselFailure, classify_diesel_error, map_basic_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    map_basic_pool_error(error, UserPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    match classify_diesel_error(&error) {
        DieselFailure::UniqueViolation => UserPersistenceError::conflict(),
        DieselFailure::Connection(message) => UserPersistenceError::connection(message),
        DieselFailure::Query(message) => UserPersistenceError::query(message),
    }
}

fn row_to_user(row: &UserRow) -> Result<User, UserPersistenceError> {
    let invalid = |err: crate::domain::UserValidationError| {
        warn!(user_id = %row.id, error = %err, "stored user record failed validation");
        UserPersistenceError::query("stored user record is invalid")
    };
    Ok(User::new(
        UserId::from_uuid(row.id),
        Username::new(&row.username).map_err(invalid)?,
        EmailAddress::new(&row.email).map_err(invalid)?,
    ))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            id: Uuid::new_v4(),
            username: user.username.as_ref(),
            email: user.email.as_ref(),
            password_hash: user.password_hash.as_str(),
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_user(&row)
    }

    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(|row| {
            Ok(StoredCredentials {
                user: row_to_user(&row)?,
                password_hash: PasswordHash::new(row.password_hash),
            })
        })
        .transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.as_ref().map(row_to_user).transpose()
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion and error mapping; queries are covered by the
    //! database-backed integration suite.
    use super::*;
    use rstest::rstest;

    fn row(username: &str, email: &str) -> UserRow {
        UserRow {
            id: Uuid::nil(),
            username: username.to_owned(),
            email: email.to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
        }
    }

    #[rstest]
    fn valid_row_converts_to_user() {
        let user = row_to_user(&row("alice", "a@x.com")).expect("valid row");
        assert_eq!(user.username().as_ref(), "alice");
        assert_eq!(user.email().as_ref(), "a@x.com");
        assert_eq!(user.id().as_uuid(), &Uuid::nil());
    }

    #[rstest]
    #[case(row("", "a@x.com"))]
    #[case(row("alice", ""))]
    fn corrupt_row_is_a_query_error(#[case] bad: UserRow) {
        let err = row_to_user(&bad).expect_err("invalid row");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }

    #[rstest]
    fn pool_failures_map_to_connection_errors() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert!(matches!(err, UserPersistenceError::Connection { message } if message == "timed out"));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let err = map_diesel_error(diesel::result::Error::NotFound);
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }
}
