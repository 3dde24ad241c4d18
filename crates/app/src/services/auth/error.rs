//! Authentication error types.

use thiserror::Error;

use great_indian_waffle_core::{EmailError, PhoneNumberError};

use crate::identity::ProviderError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Invalid phone number format.
    #[error("invalid phone number: {0}")]
    InvalidPhone(#[from] PhoneNumberError),

    /// The identity provider rejected the operation.
    #[error("identity provider error: {0}")]
    Provider(#[from] ProviderError),
}
