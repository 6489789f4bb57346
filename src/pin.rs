//! This file defines types that handle PIN validation and credential hashing.
//! `ValidatedPin` wraps a string and ensures it is long enough to be used as a PIN.
//! `SecretHash` converts a PIN or a security answer into a salted and hashed string.

use std::fmt::Display;

use bcrypt::{hash, verify};
use serde::{Deserialize, Serialize};

use crate::{Error, ValidationError};

/// The shortest PIN a user may set.
pub const MINIMUM_PIN_LENGTH: usize = 4;

/// The PIN every new database starts with, and the PIN restored by answering
/// the security question.
pub const DEFAULT_PIN: &str = "1234";

/// A PIN that has been validated, but not yet hashed.
///
/// This struct can be used to construct a [SecretHash].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedPin(String);

impl ValidatedPin {
    /// Create and validate a new PIN from a string.
    ///
    /// # Errors
    ///
    /// This function will return a [ValidationError::PinTooShort] if the PIN has
    /// fewer than [MINIMUM_PIN_LENGTH] characters.
    pub fn new(raw_pin: &str) -> Result<Self, Error> {
        if raw_pin.chars().count() < MINIMUM_PIN_LENGTH {
            return Err(ValidationError::PinTooShort.into());
        }

        Ok(Self(raw_pin.to_owned()))
    }

    /// Create a new `ValidatedPin` without any validation.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because
    /// if an invalid PIN is provided it may cause incorrect behaviour but will
    /// not affect memory safety.
    pub fn new_unchecked(raw_pin: &str) -> Self {
        Self(raw_pin.to_owned())
    }
}

impl Display for ValidatedPin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", str::repeat("*", 8))
    }
}

/// A salted and hashed secret, either the app PIN or the security answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecretHash(String);

impl SecretHash {
    /// An alias for the default encryption cost for hashing secrets.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash a validated PIN with the specified `cost`.
    ///
    /// `cost` increases the rounds of hashing and therefore the time needed to verify a PIN.
    /// Pass in [SecretHash::DEFAULT_COST] to use the recommended cost.
    ///
    /// # Errors
    ///
    /// This function will return an error if the PIN could not be hashed.
    pub fn from_pin(pin: ValidatedPin, cost: u32) -> Result<Self, Error> {
        Self::hash_secret(&pin.0, cost)
    }

    /// Hash a security answer with the specified `cost`.
    ///
    /// The answer is normalised with [normalise_answer] first so that
    /// verification ignores case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// This function will return an error if the answer could not be hashed.
    pub fn from_answer(answer: &str, cost: u32) -> Result<Self, Error> {
        Self::hash_secret(&normalise_answer(answer), cost)
    }

    fn hash_secret(secret: &str, cost: u32) -> Result<Self, Error> {
        match hash(secret, cost) {
            Ok(secret_hash) => Ok(Self(secret_hash)),
            Err(e) => Err(Error::HashingError(e.to_string())),
        }
    }

    /// Create a new `SecretHash` without any validation.
    ///
    /// The caller should ensure that `raw_hash` is a valid bcrypt hash.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because
    /// if an invalid hash is provided it will cause incorrect behaviour but not
    /// affect memory safety.
    pub fn new_unchecked(raw_hash: &str) -> Self {
        Self(raw_hash.to_owned())
    }

    /// Check that `raw_pin` matches the stored PIN hash.
    ///
    /// # Errors
    ///
    /// Returns an [Error::HashingError] if the stored hash is malformed.
    pub fn verify_pin(&self, raw_pin: &str) -> Result<bool, Error> {
        verify(raw_pin, &self.0).map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Check that `raw_answer` matches the stored security answer hash,
    /// ignoring case and surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an [Error::HashingError] if the stored hash is malformed.
    pub fn verify_answer(&self, raw_answer: &str) -> Result<bool, Error> {
        verify(normalise_answer(raw_answer), &self.0)
            .map_err(|error| Error::HashingError(error.to_string()))
    }
}

impl AsRef<str> for SecretHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for SecretHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trim and lowercase a security answer.
pub(crate) fn normalise_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}


#[cfg(test)]
mod secret_hash_tests {
    use crate::{SecretHash, ValidatedPin};

    #[test]
    fn pin_hash_produces_verifiable_hash() {
        let hash = SecretHash::from_pin(ValidatedPin::new_unchecked("4321"), 4).unwrap();

        assert!(hash.verify_pin("4321").unwrap());
        assert!(!hash.verify_pin("1234").unwrap());
    }

    #[test]
    fn hash_duplicate_pin_produces_unique_hash() {
        let pin = ValidatedPin::new_unchecked("4321");
        let hash = SecretHash::from_pin(pin.clone(), 4).unwrap();
        let dupe_hash = SecretHash::from_pin(pin, 4).unwrap();

        assert_ne!(hash, dupe_hash);
    }

    #[test]
    fn answer_verification_ignores_case_and_whitespace() {
        let hash = SecretHash::from_answer("Pink", 4).unwrap();

        assert!(hash.verify_answer("  pINK \n").unwrap());
        assert!(!hash.verify_answer("blue").unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        let hash = SecretHash::new_unchecked("not a bcrypt hash");

        assert!(hash.verify_pin("1234").is_err());
    }
}
