//! Authentication service.
//!
//! Validates input, delegates to the identity provider, and mirrors the
//! provider's session notifications into the store. Operations report their
//! own failures, but signed-in state only ever enters the store through the
//! mirror task; nothing else writes the session.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use great_indian_waffle_core::{Email, PhoneNumber, VerificationId};

use crate::identity::IdentityProvider;
use crate::store::Store;

/// Authentication service.
pub struct AuthService<P> {
    store: Store,
    provider: Arc<P>,
}

impl<P: IdentityProvider> AuthService<P> {
    /// Create a new authentication service.
    pub const fn new(store: Store, provider: Arc<P>) -> Self {
        Self { store, provider }
    }

    /// Spawn the task that mirrors provider notifications into the store.
    ///
    /// The task runs until the provider drops its notification sender.
    pub(crate) fn spawn_mirror(&self) -> tokio::task::JoinHandle<()> {
        let store = self.store.clone();
        let mut events = self.provider.subscribe();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                store.apply_auth_event(event);
            }
            debug!("identity provider notification stream ended");
        })
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEmail`] if the email does not parse, or
    /// [`AuthError::Provider`] if the provider rejects the sign-in.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;

        self.store.auth_loading();
        if let Err(e) = self.provider.sign_in_with_password(&email, password).await {
            warn!(error = %e, "sign-in failed");
            self.store.auth_failed(e.to_string());
            return Err(AuthError::Provider(e));
        }
        Ok(())
    }

    /// Create an account with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidEmail`] if the email does not parse, or
    /// [`AuthError::Provider`] if the provider rejects the sign-up.
    #[instrument(skip_all)]
    pub async fn signup(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let email = Email::parse(email)?;

        self.store.auth_loading();
        if let Err(e) = self
            .provider
            .create_user_with_password(&email, password)
            .await
        {
            warn!(error = %e, "sign-up failed");
            self.store.auth_failed(e.to_string());
            return Err(AuthError::Provider(e));
        }
        Ok(())
    }

    /// Sign in through the Google account picker.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Provider`] if the flow fails or is cancelled.
    #[instrument(skip_all)]
    pub async fn login_with_google(&self) -> Result<(), AuthError> {
        self.store.auth_loading();
        if let Err(e) = self.provider.sign_in_with_google().await {
            warn!(error = %e, "google sign-in failed");
            self.store.auth_failed(e.to_string());
            return Err(AuthError::Provider(e));
        }
        Ok(())
    }

    /// Send a one-time code to `phone` and return the verification handle
    /// for [`verify_otp`](Self::verify_otp).
    ///
    /// Leaves the session loading flag alone; nothing is resolving until
    /// the user enters the code.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidPhone`] if the number does not parse, or
    /// [`AuthError::Provider`] if the code cannot be sent.
    #[instrument(skip_all)]
    pub async fn send_otp(&self, phone: &str) -> Result<VerificationId, AuthError> {
        let phone = PhoneNumber::parse(phone)?;

        match self.provider.send_otp(&phone).await {
            Ok(verification) => Ok(verification),
            Err(e) => {
                warn!(error = %e, "failed to send verification code");
                self.store.auth_failed(e.to_string());
                Err(AuthError::Provider(e))
            }
        }
    }

    /// Complete a phone sign-in with the code the user received.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Provider`] if the code is wrong or expired.
    #[instrument(skip_all)]
    pub async fn verify_otp(
        &self,
        verification: &VerificationId,
        code: &str,
    ) -> Result<(), AuthError> {
        self.store.auth_loading();
        if let Err(e) = self.provider.sign_in_with_otp(verification, code).await {
            warn!(error = %e, "code verification failed");
            self.store.auth_failed(e.to_string());
            return Err(AuthError::Provider(e));
        }
        Ok(())
    }

    /// End the current session.
    ///
    /// The provider's signed-out notification resets the session and the
    /// loyalty slice.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Provider`] if sign-out fails.
    #[instrument(skip_all)]
    pub async fn logout(&self) -> Result<(), AuthError> {
        if let Err(e) = self.provider.sign_out().await {
            warn!(error = %e, "sign-out failed");
            self.store.auth_failed(e.to_string());
            return Err(AuthError::Provider(e));
        }
        Ok(())
    }
}
