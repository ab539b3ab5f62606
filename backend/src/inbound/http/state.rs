//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{LoginService, PropertyListingService, SignupService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub signup: Arc<dyn SignupService>,
    pub listings: Arc<dyn PropertyListingService>,
}

impl HttpState {
    /// Construct state from the driving ports.
    pub fn new(
        login: Arc<dyn LoginService>,
        signup: Arc<dyn SignupService>,
        listings: Arc<dyn PropertyListingService>,
    ) -> Self {
        Self {
            login,
            signup,
            listings,
        }
    }
}
