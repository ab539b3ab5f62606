//! Request identity resolved from the session.

use super::User;

/// Who is making the current request.
///
/// Resolution never fails: a missing session, an unknown user and a store
/// fault all produce [`Identity::Anonymous`]. Handlers guarding protected
/// actions must check the variant themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    /// No authenticated user is attached to the request.
    #[default]
    Anonymous,
    /// The session resolved to a stored user.
    Authenticated(User),
}

impl Identity {
    /// Borrow the authenticated user, if any.
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(user) => Some(user),
        }
    }

    /// True when a user is attached.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

impl From<Option<User>> for Identity {
    fn from(value: Option<User>) -> Self {
        value.map_or(Self::Anonymous, Self::Authenticated)
    }
}
