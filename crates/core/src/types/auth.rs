//! Identity types mirrored from the external auth provider.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::types::contact::{Email, PhoneNumber};
use crate::types::id::UserId;

/// An opaque bearer token issued by the identity provider.
///
/// The token authorizes backend calls on behalf of the signed-in user.
/// Its `Debug` output is redacted so it never lands in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a provider-issued token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token for use in an Authorization header.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthToken(\"[REDACTED]\")")
    }
}

/// Handle for a pending phone verification, returned when an OTP is sent
/// and required to complete the sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationId(String);

impl VerificationId {
    /// Wrap a provider-issued verification ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the verification ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The signed-in user as reported by the identity provider.
///
/// `uid` and `token` are always present; the profile fields depend on how
/// the account was created (phone sign-ins have no email, and so on).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<PhoneNumber>,
    pub token: AuthToken,
}
