//! Property listing backend: account signup and login over cookie sessions,
//! and transactional creation of listings with photo uploads.
//!
//! Layout follows ports and adapters: [`domain`] holds types, ports and
//! services; [`inbound`] adapts HTTP onto the driving ports; [`outbound`]
//! implements the driven ports against PostgreSQL, Argon2 and the uploads
//! directory.

pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use middleware::Trace;
