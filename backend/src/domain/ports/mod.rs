//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`UserRepository`, `PropertyRepository`, `PasswordHasher`,
//! `UploadStager`) are implemented by outbound adapters. Driving ports
//! (`LoginService`, `SignupService`, `IdentityResolver`,
//! `PropertyListingService`) are called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod identity_resolver;
mod login_service;
mod password_hasher;
mod property_listing;
mod property_repository;
mod upload_stager;
mod user_repository;

#[cfg(test)]
pub use identity_resolver::MockIdentityResolver;
pub use identity_resolver::{AnonymousIdentityResolver, IdentityResolver};
pub use login_service::{LoginService, SignupService};
#[cfg(test)]
pub use login_service::{MockLoginService, MockSignupService};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
#[cfg(test)]
pub use property_listing::MockPropertyListingService;
pub use property_listing::PropertyListingService;
#[cfg(test)]
pub use property_repository::MockPropertyRepository;
pub use property_repository::{PropertyPersistenceError, PropertyRepository};
#[cfg(test)]
pub use upload_stager::MockUploadStager;
pub use upload_stager::{ImageUpload, UploadStager, UploadStagerError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
