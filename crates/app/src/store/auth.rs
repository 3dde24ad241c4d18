//! Auth session slice.

use great_indian_waffle_core::{AuthToken, AuthUser, UserId};

/// The identity-provider session as last reported to the store.
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// The signed-in user, if any.
    pub user: Option<AuthUser>,
    /// True between a signed-in notification and the next sign-out.
    pub is_authenticated: bool,
    /// True until the provider's first notification, and during sign-in
    /// operations.
    pub loading: bool,
    /// Message from the last failed auth operation.
    pub last_error: Option<String>,
}

impl Default for AuthSession {
    /// Starts loading: the session is unknown until the provider's first
    /// notification arrives.
    fn default() -> Self {
        Self {
            user: None,
            is_authenticated: false,
            loading: true,
            last_error: None,
        }
    }
}

impl AuthSession {
    /// ID of the signed-in user.
    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        self.user.as_ref().map(|user| &user.uid)
    }

    /// Bearer token of the signed-in user.
    #[must_use]
    pub fn token(&self) -> Option<&AuthToken> {
        self.user.as_ref().map(|user| &user.token)
    }
}
