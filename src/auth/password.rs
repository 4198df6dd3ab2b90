//! Password strength checks and hashing.
//!
//! A [ValidatedPassword] is a plain-text password that passed the strength
//! check, a [PasswordHash] is what gets stored in the user table.

use std::fmt::Display;

use bcrypt::{BcryptError, hash, verify};
use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::Error;

/// A password that has been validated, but not yet hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Create and validate a new password from a string.
    ///
    /// `user_inputs` are strings the password should not be built from, such
    /// as the user's name and email.
    ///
    /// # Errors
    ///
    /// Returns [Error::TooWeak] with zxcvbn's suggestions if the password is
    /// easy to guess.
    pub fn new(raw_password: &str, user_inputs: &[&str]) -> Result<Self, Error> {
        let user_inputs = expand_user_inputs(user_inputs);
        let user_inputs: Vec<&str> = user_inputs.iter().map(String::as_str).collect();
        let analysis = zxcvbn(raw_password, &user_inputs);

        match analysis.score() {
            Score::Three | Score::Four => Ok(Self(raw_password.to_owned())),
            _ => Err(Error::TooWeak(
                analysis
                    .feedback()
                    .unwrap_or(&Feedback::default())
                    .to_string(),
            )),
        }
    }

    /// Create a new `ValidatedPassword` without any validation.
    ///
    /// The caller should ensure that `raw_password` is a valid and secure password.
    pub fn new_unchecked(raw_password: &str) -> Self {
        Self(raw_password.to_owned())
    }
}

/// Split email addresses into the words a password is likely to be built from.
///
/// "priya.sharma@example.com" also yields "priya.sharma", "priya" and "sharma".
fn expand_user_inputs(user_inputs: &[&str]) -> Vec<String> {
    let mut expanded = Vec::new();

    for input in user_inputs {
        let input = input.trim().to_lowercase();
        if input.is_empty() {
            continue;
        }

        if let Some((local_part, _)) = input.split_once('@') {
            expanded.extend(
                local_part
                    .split(['.', '_', '-', '+'])
                    .filter(|word| word.len() > 1)
                    .map(str::to_owned),
            );
            expanded.push(local_part.to_owned());
        }

        expanded.push(input);
    }

    expanded
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", str::repeat("*", 8))
    }
}

/// A salted and hashed password.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// An alias for the default bcrypt cost.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `password` with bcrypt using `cost` rounds.
    ///
    /// Pass in [PasswordHash::DEFAULT_COST] outside of tests.
    ///
    /// # Errors
    ///
    /// Returns [Error::HashingError] if the password could not be hashed.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap a hash read back from the database.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_owned())
    }

    /// Check that `raw_password` matches the stored password.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        verify(raw_password, &self.0)
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Error,
        auth::{PasswordHash, ValidatedPassword},
    };

    #[test]
    fn rejects_empty_password() {
        let result = ValidatedPassword::new("", &[]);

        assert!(matches!(result, Err(Error::TooWeak(_))));
    }

    #[test]
    fn rejects_password_built_from_email() {
        let result = ValidatedPassword::new("priya.sharma1", &["priya.sharma@example.com"]);

        assert!(matches!(result, Err(Error::TooWeak(_))));
    }

    #[test]
    fn rejects_password_built_from_email_words() {
        let result = ValidatedPassword::new("quintelzorvak", &["zorvak.quintel@example.com"]);

        assert!(matches!(result, Err(Error::TooWeak(_))));
    }

    #[test]
    fn email_is_split_into_words() {
        assert_eq!(
            super::expand_user_inputs(&["Priya.Sharma@example.com", " ", "Priya"]),
            [
                "priya",
                "sharma",
                "priya.sharma",
                "priya.sharma@example.com",
                "priya"
            ]
        );
    }

    #[test]
    fn accepts_long_password() {
        let result = ValidatedPassword::new("correct horse battery staple", &[]);

        assert!(result.is_ok());
    }

    #[test]
    fn display_hides_password() {
        let password = ValidatedPassword::new_unchecked("hunter2");

        assert_eq!(password.to_string(), "********");
    }

    #[test]
    fn hash_verifies_only_the_original_password() {
        let password = "roostersgocockledoodledoo";
        let hash = PasswordHash::new(ValidatedPassword::new_unchecked(password), 4).unwrap();

        assert!(hash.verify(password).unwrap());
        assert!(!hash.verify("the_wrong_password").unwrap());
    }

    #[test]
    fn hashing_is_salted() {
        let password = ValidatedPassword::new_unchecked("turkeysgogobblegobble");

        let hash = PasswordHash::new(password.clone(), 4).unwrap();
        let dupe_hash = PasswordHash::new(password, 4).unwrap();

        assert_ne!(hash, dupe_hash);
    }
}
