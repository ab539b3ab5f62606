//! Builders wiring outbound adapters into the domain services.

use std::sync::Arc;

use listings::domain::ports::IdentityResolver;
use listings::domain::{AccountService, ListingService, SessionIdentityResolver};
use listings::inbound::http::state::HttpState;
use listings::outbound::persistence::{DbPool, DieselPropertyRepository, DieselUserRepository};
use listings::outbound::security::Argon2PasswordHasher;
use listings::outbound::uploads::CapStdUploadStager;

/// Shared services handed to every worker.
#[derive(Clone)]
pub(crate) struct Services {
    pub(crate) http_state: HttpState,
    pub(crate) identity: Arc<dyn IdentityResolver>,
}

/// Build the driving-port services over Diesel, Argon2 and the stager.
pub(crate) fn build_services(
    pool: &DbPool,
    hasher: Argon2PasswordHasher,
    stager: CapStdUploadStager,
) -> Services {
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let properties = Arc::new(DieselPropertyRepository::new(pool.clone()));

    let accounts = Arc::new(AccountService::new(Arc::clone(&users), Arc::new(hasher)));
    let listings = Arc::new(ListingService::new(properties, Arc::new(stager)));

    Services {
        http_state: HttpState::new(accounts.clone(), accounts, listings),
        identity: Arc::new(SessionIdentityResolver::new(users)),
    }
}
