//! Driving ports for account use-cases: signup and login.
//!
//! Inbound adapters call these to register and authenticate users without
//! importing the credential store or the hashing adapter, so HTTP handler
//! tests can substitute a double.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, SignupDetails, User};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user.
    ///
    /// Unknown emails and wrong passwords fail with the same
    /// [`ErrorCode::Unauthorized`](crate::domain::ErrorCode) error.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}

/// Domain use-case port for account creation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SignupService: Send + Sync {
    /// Hash the password and store a new user.
    async fn register(&self, details: &SignupDetails) -> Result<User, Error>;
}
