//! Driving port that maps a session's user id to a request identity.

use async_trait::async_trait;

use crate::domain::{Identity, UserId};

/// Resolve the caller of a request.
///
/// Infallible by contract: every failure resolves to
/// [`Identity::Anonymous`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, user_id: Option<UserId>) -> Identity;
}

/// Resolver that treats every request as anonymous.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnonymousIdentityResolver;

#[async_trait]
impl IdentityResolver for AnonymousIdentityResolver {
    async fn resolve(&self, _user_id: Option<UserId>) -> Identity {
        Identity::Anonymous
    }
}
