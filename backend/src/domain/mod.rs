//! Domain primitives, ports and services.
//!
//! Purpose: define strongly typed entities and the use-cases over them,
//! independent of HTTP and persistence. Types are immutable once validated;
//! invariants are documented on each type.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifiers.
//! - User / Identity: account records and the per-request caller.
//! - LoginCredentials / SignupDetails: validated auth form input.
//! - PropertyDraft / NewProperty: validated listing input.
//! - AccountService / SessionIdentityResolver / ListingService: use-cases
//!   implementing the driving ports in [`ports`].

pub mod account_service;
pub mod auth;
pub mod error;
pub mod identity;
pub mod identity_service;
pub mod listing_service;
pub mod ports;
pub mod property;
pub mod trace_id;
pub mod user;

pub use self::account_service::{
    ACCOUNT_CREATED, ACCOUNT_EXISTS, AccountService, INVALID_CREDENTIALS, LOGIN_FIELDS_REQUIRED,
    SIGNUP_FIELDS_REQUIRED,
};
pub use self::auth::{
    LoginCredentials, LoginValidationError, NewUser, PasswordHash, SignupDetails,
    SignupValidationError, StoredCredentials,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::identity::Identity;
pub use self::identity_service::SessionIdentityResolver;
pub use self::listing_service::{ListingService, validation_error};
pub use self::property::{
    ImagePath, ListingType, MAX_PROPERTY_IMAGES, NewProperty, PropertyDraft, PropertyField,
    PropertyFields, PropertyId, PropertyType, PropertyValidationError, UPLOADS_PREFIX,
};
pub use self::trace_id::TraceId;
pub use self::user::{EMAIL_MAX, EmailAddress, USERNAME_MAX, User, UserId, UserValidationError, Username};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use listings::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
