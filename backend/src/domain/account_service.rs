//! Account domain services: signup and login.
//!
//! Implements the [`LoginService`] and [`SignupService`] driving ports over a
//! credential store and a password hasher.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::domain::ports::{
    LoginService, PasswordHasher, PasswordHasherError, SignupService, UserPersistenceError,
    UserRepository,
};
use crate::domain::{Error, LoginCredentials, NewUser, SignupDetails, User};

/// Login form was submitted without an email or password.
pub const LOGIN_FIELDS_REQUIRED: &str = "Email and password are required.";
/// Shared by unknown emails and wrong passwords.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password.";
/// Signup form was submitted with a blank field.
pub const SIGNUP_FIELDS_REQUIRED: &str = "All fields are required.";
/// Signup collided with an existing username or email.
pub const ACCOUNT_EXISTS: &str = "Username or email already exists.";
/// Returned after a successful signup.
pub const ACCOUNT_CREATED: &str = "Account created successfully. You can now log in.";

/// Account service backed by a credential store and a hasher.
#[derive(Clone)]
pub struct AccountService<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
}

impl<U, H> AccountService<U, H> {
    /// Create a new service with the given adapters.
    pub fn new(users: Arc<U>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Conflict => Error::conflict(ACCOUNT_EXISTS),
        UserPersistenceError::Connection { message } => {
            Error::internal(format!("credential store unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("credential store error: {message}"))
        }
    }
}

fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

#[async_trait]
impl<U, H> LoginService for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let stored = self
            .users
            .find_credentials_by_email(credentials.email())
            .await
            .map_err(map_user_error)?;

        let Some(stored) = stored else {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        let verified = self
            .hasher
            .verify(credentials.password(), &stored.password_hash)
            .await
            .map_err(|err| {
                error!(user_id = %stored.user.id(), error = %err, "stored password hash unusable");
                map_hasher_error(err)
            })?;

        if !verified {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        info!(user_id = %stored.user.id(), "user authenticated");
        Ok(stored.user)
    }
}

#[async_trait]
impl<U, H> SignupService for AccountService<U, H>
where
    U: UserRepository,
    H: PasswordHasher,
{
    async fn register(&self, details: &SignupDetails) -> Result<User, Error> {
        let password_hash = self
            .hasher
            .hash(details.password())
            .await
            .map_err(map_hasher_error)?;

        let new_user = NewUser {
            username: details.username().clone(),
            email: details.email().clone(),
            password_hash,
        };
        let user = self.users.insert(&new_user).await.map_err(map_user_error)?;

        info!(user_id = %user.id(), "account created");
        Ok(user)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
