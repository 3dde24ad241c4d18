//! Identity provider abstraction.
//!
//! The real app authenticates against a hosted identity service (email and
//! password, Google, and phone OTP). This crate only depends on the shape of
//! that service: a set of sign-in operations plus a stream of session
//! notifications. Tests plug in a scripted provider; the embedding shell
//! plugs in the real one.
//!
//! The notification stream is the single source of truth for the session.
//! Operations like [`IdentityProvider::sign_in_with_password`] report
//! operation failures, but the signed-in state itself always arrives through
//! [`IdentityProvider::subscribe`], mirroring how hosted identity SDKs
//! deliver an initial "who is signed in" callback followed by updates.

use std::future::Future;

use thiserror::Error;
use tokio::sync::mpsc;

use great_indian_waffle_core::{AuthUser, Email, PhoneNumber, VerificationId};

/// Errors surfaced by an identity provider.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Wrong email/password combination, expired code, disabled account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Sign-up with an email that already has an account.
    #[error("an account already exists for this email")]
    EmailAlreadyInUse,

    /// Provider rejected the password at sign-up.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// The OTP did not match or expired.
    #[error("invalid or expired verification code")]
    InvalidOtp,

    /// The user abandoned an interactive flow (e.g. closed the Google
    /// account picker).
    #[error("sign-in was cancelled")]
    Cancelled,

    /// The provider could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// Anything else the provider reports.
    #[error("{0}")]
    Other(String),
}

/// A session notification from the identity provider.
///
/// `user: Some` means signed in. `user: None` with an `error` means an
/// operation failed and ended the session attempt; `None` without an error
/// is a plain signed-out notification (initial state or sign-out).
#[derive(Debug, Clone)]
pub struct AuthStateEvent {
    pub user: Option<AuthUser>,
    pub error: Option<String>,
}

impl AuthStateEvent {
    /// A signed-in notification.
    #[must_use]
    pub const fn signed_in(user: AuthUser) -> Self {
        Self {
            user: Some(user),
            error: None,
        }
    }

    /// A signed-out notification.
    #[must_use]
    pub const fn signed_out() -> Self {
        Self {
            user: None,
            error: None,
        }
    }

    /// A failed-session notification.
    #[must_use]
    pub const fn failed(error: String) -> Self {
        Self {
            user: None,
            error: Some(error),
        }
    }
}

/// The identity service the engine authenticates against.
///
/// Implementations must emit one initial [`AuthStateEvent`] on
/// [`subscribe`](Self::subscribe) (signed in or signed out) and one event
/// for every later session change. The engine mirrors those events into the
/// store; nothing else writes the session.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Subscribe to session notifications.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<AuthStateEvent>;

    /// Sign in with email and password.
    fn sign_in_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Create an account with email and password, then sign in.
    fn create_user_with_password(
        &self,
        email: &Email,
        password: &str,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Sign in through the Google account picker.
    fn sign_in_with_google(&self) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Send a one-time code to `phone` and return the verification handle.
    fn send_otp(
        &self,
        phone: &PhoneNumber,
    ) -> impl Future<Output = Result<VerificationId, ProviderError>> + Send;

    /// Complete a phone sign-in with the code the user received.
    fn sign_in_with_otp(
        &self,
        verification: &VerificationId,
        code: &str,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// End the current session.
    fn sign_out(&self) -> impl Future<Output = Result<(), ProviderError>> + Send;
}
