//! Request middleware.
//!
//! Purpose: define middleware components for request lifecycle concerns:
//! trace correlation and session identity resolution.

pub mod identity;
pub mod trace;

pub use identity::{CurrentIdentity, ResolveIdentity};
pub use trace::Trace;
