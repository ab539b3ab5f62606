//! Session identity resolution over the credential store.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::ports::{IdentityResolver, UserRepository};
use crate::domain::{Identity, UserId};

/// Resolves session user ids by loading the user record.
///
/// Fails open: store faults are logged and the request continues as
/// [`Identity::Anonymous`].
#[derive(Clone)]
pub struct SessionIdentityResolver<U> {
    users: Arc<U>,
}

impl<U> SessionIdentityResolver<U> {
    /// Resolve identities against `users`.
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl<U> IdentityResolver for SessionIdentityResolver<U>
where
    U: UserRepository,
{
    async fn resolve(&self, user_id: Option<UserId>) -> Identity {
        let Some(user_id) = user_id else {
            return Identity::Anonymous;
        };

        match self.users.find_by_id(&user_id).await {
            Ok(Some(user)) => Identity::Authenticated(user),
            Ok(None) => {
                debug!(%user_id, "session references unknown user");
                Identity::Anonymous
            }
            Err(error) => {
                warn!(%user_id, %error, "identity lookup failed; continuing anonymously");
                Identity::Anonymous
            }
        }
    }
}
