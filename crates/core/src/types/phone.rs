//! Store phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input contains a character outside the allowed set.
    #[error("phone number contains invalid character {0:?}")]
    InvalidCharacter(char),
    /// Fewer digits than required.
    #[error("phone number must contain at least {min} digits")]
    TooFewDigits {
        /// Minimum digit count.
        min: usize,
    },
}

/// A loosely formatted phone number.
///
/// ## Constraints
///
/// - An optional single `+` as the first character
/// - Otherwise only ASCII digits, spaces, hyphens and parentheses
/// - At least 10 digits
///
/// The original formatting is preserved; only surrounding whitespace is
/// trimmed.
///
/// ```
/// use shopspot_core::Phone;
///
/// assert!(Phone::parse("+1 (555) 123-4567").is_ok());
/// assert!(Phone::parse("5551234567").is_ok());
/// assert!(Phone::parse("12345").is_err());
/// assert!(Phone::parse("").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Phone(String);

impl Phone {
    /// Minimum number of digits in a phone number.
    pub const MIN_DIGITS: usize = 10;

    /// Parse a `Phone`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains a character outside
    /// the allowed set, or has fewer than [`Self::MIN_DIGITS`] digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        let body = s.strip_prefix('+').unwrap_or(s);
        let mut digits = 0;
        for c in body.chars() {
            match c {
                '0'..='9' => digits += 1,
                ' ' | '-' | '(' | ')' => {}
                other => return Err(PhoneError::InvalidCharacter(other)),
            }
        }

        if digits < Self::MIN_DIGITS {
            return Err(PhoneError::TooFewDigits {
                min: Self::MIN_DIGITS,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as entered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Phone {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Phone> for String {
    fn from(phone: Phone) -> Self {
        phone.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_formatted_numbers() {
        assert!(Phone::parse("+1 (555) 123-4567").is_ok());
        assert!(Phone::parse("5551234567").is_ok());
        assert!(Phone::parse("020 7946 0958").is_ok());
        assert!(Phone::parse("+44-20-7946-0958").is_ok());
    }

    #[test]
    fn test_rejects_short_and_empty() {
        assert_eq!(
            Phone::parse("12345"),
            Err(PhoneError::TooFewDigits { min: 10 })
        );
        assert_eq!(Phone::parse(""), Err(PhoneError::Empty));
        assert_eq!(Phone::parse("   "), Err(PhoneError::Empty));
    }

    #[test]
    fn test_rejects_separators_without_digits() {
        // Ten allowed characters but only four digits.
        assert!(Phone::parse("(12) -- 34  ").is_err());
    }

    #[test]
    fn test_rejects_invalid_characters() {
        assert_eq!(
            Phone::parse("555.123.4567"),
            Err(PhoneError::InvalidCharacter('.'))
        );
        assert!(Phone::parse("555123456x7").is_err());
        assert!(Phone::parse("++15551234567").is_err());
        assert!(Phone::parse("555+1234567").is_err());
    }

    #[test]
    fn test_keeps_formatting() {
        let phone = Phone::parse("  +1 (555) 123-4567 ").unwrap();
        assert_eq!(phone.as_str(), "+1 (555) 123-4567");
    }
}
