//! Port for one-way password hashing.
//!
//! The contract: `hash` produces a self-describing encoded hash (algorithm,
//! parameters and salt included) and `verify` compares in constant time.
//! Both may be CPU-heavy, so adapters are expected to move the work off the
//! async executor.

use async_trait::async_trait;

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHasherError {
        /// Hashing could not be completed.
        Hash { message: String } => "password hashing failed: {message}",
        /// A stored hash could not be parsed.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password with a fresh random salt.
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError>;

    /// Check `password` against `hash`.
    ///
    /// A mismatch is `Ok(false)`; only unreadable hashes or internal faults
    /// are errors.
    async fn verify(&self, password: &str, hash: &PasswordHash)
    -> Result<bool, PasswordHasherError>;
}
