//! Email address and phone number types.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input exceeds the RFC 5321 length limit.
    #[error("email is too long (max {max} characters)")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input has no @ separating local part and domain.
    #[error("email must contain an '@'")]
    MissingAtSign,
    /// The part before the @ is empty.
    #[error("email is missing the part before the '@'")]
    MissingLocalPart,
    /// The part after the @ is empty.
    #[error("email is missing the domain after the '@'")]
    MissingDomain,
}

/// An email address that has passed shape validation.
///
/// Validation is shape-only: `local@domain` with both halves non-empty,
/// within the RFC 5321 length limit. Deliverability is the identity
/// provider's concern.
///
/// ```
/// use great_indian_waffle_core::Email;
///
/// let email = Email::parse("asha@example.com")?;
/// assert_eq!(email.as_str(), "asha@example.com");
///
/// assert!(Email::parse("not-an-email").is_err());
/// # Ok::<(), great_indian_waffle_core::EmailError>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 254
    /// characters, or not of the form `local@domain`.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let (local, domain) = s.split_once('@').ok_or(EmailError::MissingAtSign)?;

        if local.is_empty() {
            return Err(EmailError::MissingLocalPart);
        }

        if domain.is_empty() {
            return Err(EmailError::MissingDomain);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneNumberError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input does not start with a + country code.
    #[error("phone number must start with a + country code")]
    MissingCountryCode,
    /// The input contains a non-digit after the country code sign.
    #[error("phone number must contain only digits after the +")]
    InvalidDigit,
    /// The digit count is out of range.
    #[error("phone number must have between {min} and {max} digits")]
    BadLength {
        /// Minimum digit count.
        min: usize,
        /// Maximum digit count.
        max: usize,
    },
}

/// A phone number in E.164 form, as the identity provider expects for OTP
/// delivery.
///
/// Spaces and hyphens are stripped on parse, so `"+91 98765 43210"` and
/// `"+919876543210"` produce the same value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Minimum number of digits after the country code sign.
    pub const MIN_DIGITS: usize = 8;
    /// Maximum number of digits (E.164 limit).
    pub const MAX_DIGITS: usize = 15;

    /// Parse a `PhoneNumber` from a string, stripping spaces and hyphens.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Does not start with `+`
    /// - Contains a non-digit after the `+`
    /// - Has fewer than 8 or more than 15 digits
    pub fn parse(s: &str) -> Result<Self, PhoneNumberError> {
        let compact: String = s.chars().filter(|c| *c != ' ' && *c != '-').collect();

        if compact.is_empty() {
            return Err(PhoneNumberError::Empty);
        }

        let digits = compact
            .strip_prefix('+')
            .ok_or(PhoneNumberError::MissingCountryCode)?;

        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(PhoneNumberError::InvalidDigit);
        }

        if digits.len() < Self::MIN_DIGITS || digits.len() > Self::MAX_DIGITS {
            return Err(PhoneNumberError::BadLength {
                min: Self::MIN_DIGITS,
                max: Self::MAX_DIGITS,
            });
        }

        Ok(Self(compact))
    }

    /// Returns the normalized number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PhoneNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_emails() {
        assert!(Email::parse("asha@example.com").is_ok());
        assert!(Email::parse("asha.rao+app@gmail.com").is_ok());
        assert!(Email::parse("orders@greatindianwaffle.com").is_ok());
        assert!(Email::parse("staff@waffle.co.in").is_ok());
        assert!(Email::parse("a@b.c").is_ok());
    }

    #[test]
    fn test_parse_empty_email() {
        assert!(matches!(Email::parse(""), Err(EmailError::Empty)));
    }

    #[test]
    fn test_parse_too_long_email() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_missing_at_sign() {
        assert!(matches!(
            Email::parse("no-at-sign"),
            Err(EmailError::MissingAtSign)
        ));
    }

    #[test]
    fn test_parse_missing_local_part() {
        assert!(matches!(
            Email::parse("@domain.com"),
            Err(EmailError::MissingLocalPart)
        ));
    }

    #[test]
    fn test_parse_missing_domain() {
        assert!(matches!(
            Email::parse("user@"),
            Err(EmailError::MissingDomain)
        ));
    }

    #[test]
    fn test_email_serde_roundtrip() {
        let email = Email::parse("asha@example.com").unwrap();
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"asha@example.com\"");

        let parsed: Email = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, email);
    }

    #[test]
    fn test_parse_valid_phone_numbers() {
        assert!(PhoneNumber::parse("+919876543210").is_ok());
        assert!(PhoneNumber::parse("+14155550123").is_ok());
        assert!(PhoneNumber::parse("+4420712345").is_ok());
    }

    #[test]
    fn test_phone_number_normalization() {
        let spaced = PhoneNumber::parse("+91 98765 43210").unwrap();
        let hyphenated = PhoneNumber::parse("+91-98765-43210").unwrap();
        assert_eq!(spaced, hyphenated);
        assert_eq!(spaced.as_str(), "+919876543210");
    }

    #[test]
    fn test_parse_empty_phone_number() {
        assert!(matches!(PhoneNumber::parse(""), Err(PhoneNumberError::Empty)));
        assert!(matches!(
            PhoneNumber::parse("  "),
            Err(PhoneNumberError::Empty)
        ));
    }

    #[test]
    fn test_parse_missing_country_code() {
        assert!(matches!(
            PhoneNumber::parse("9876543210"),
            Err(PhoneNumberError::MissingCountryCode)
        ));
    }

    #[test]
    fn test_parse_invalid_digit() {
        assert!(matches!(
            PhoneNumber::parse("+91abc543210"),
            Err(PhoneNumberError::InvalidDigit)
        ));
    }

    #[test]
    fn test_parse_bad_length() {
        assert!(matches!(
            PhoneNumber::parse("+1234"),
            Err(PhoneNumberError::BadLength { .. })
        ));
        assert!(matches!(
            PhoneNumber::parse("+1234567890123456"),
            Err(PhoneNumberError::BadLength { .. })
        ));
    }

    #[test]
    fn test_phone_number_display() {
        let phone = PhoneNumber::parse("+919876543210").unwrap();
        assert_eq!(format!("{phone}"), "+919876543210");
    }
}
