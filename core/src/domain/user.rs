//! User entity and its value objects.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::timestamps::{TimestampError, Timestamps};

/// Validation errors raised by user construction and mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// Username was empty or whitespace-only.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Email did not match the `local@domain` pattern.
    #[error("email address is malformed")]
    InvalidEmail,
    /// A name field was empty or whitespace-only.
    #[error("name field must not be empty")]
    EmptyName,
    /// A name field contained characters other than letters and spaces.
    #[error("name field must contain only letters and spaces")]
    InvalidNameCharacters,
    /// The stored password hash was empty.
    #[error("hashed password must not be empty")]
    EmptyHashedPassword,
    /// The user was already verified.
    #[error("user is already verified")]
    AlreadyVerified,
    /// Timestamp ordering invariant violated.
    #[error(transparent)]
    Timestamps(#[from] TimestampError),
}

/// Stable user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

static PERSON_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn person_name_regex() -> &'static Regex {
    PERSON_NAME_RE.get_or_init(|| {
        let pattern = r"^[A-Za-z ]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("person name regex failed to compile: {error}"))
    })
}

/// Email address matching a standard `local@domain` pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an email address.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        if !email_regex().is_match(&value) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(value))
    }

    /// The domain part after the `@`.
    pub fn domain(&self) -> &str {
        // The constructor regex guarantees exactly one usable '@'.
        self.0.rsplit('@').next().unwrap_or_default()
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Person-name field: non-blank, letters and spaces only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    /// Validate and construct a name field.
    pub fn new(value: impl Into<String>) -> Result<Self, UserValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if !person_name_regex().is_match(&value) {
            return Err(UserValidationError::InvalidNameCharacters);
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

impl TryFrom<String> for PersonName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Parts required to construct a [`User`].
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Stable identifier for the new user.
    pub id: UserId,
    /// Unique username; must be non-blank.
    pub username: String,
    /// Email address.
    pub email: EmailAddress,
    /// First name.
    pub first_name: PersonName,
    /// Last name.
    pub last_name: PersonName,
    /// Opaque password hash produced outside the domain; must be non-blank.
    pub hashed_password: String,
    /// Whether the account starts out verified.
    pub verified: bool,
}

/// Registered account.
///
/// The password hash is opaque to the domain; hashing and verification are
/// the password security port's concern.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    id: UserId,
    username: String,
    email: EmailAddress,
    first_name: PersonName,
    last_name: PersonName,
    #[serde(skip_serializing)]
    hashed_password: String,
    verified: bool,
    timestamps: Timestamps,
}

impl User {
    /// Validate and construct a user.
    pub fn new(parts: NewUser, timestamps: Timestamps) -> Result<Self, UserValidationError> {
        if parts.username.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if parts.hashed_password.trim().is_empty() {
            return Err(UserValidationError::EmptyHashedPassword);
        }
        Ok(Self {
            id: parts.id,
            username: parts.username,
            email: parts.email,
            first_name: parts.first_name,
            last_name: parts.last_name,
            hashed_password: parts.hashed_password,
            verified: parts.verified,
            timestamps,
        })
    }

    /// Stable user identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Unique username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// First name.
    pub fn first_name(&self) -> &PersonName {
        &self.first_name
    }

    /// Last name.
    pub fn last_name(&self) -> &PersonName {
        &self.last_name
    }

    /// Opaque password hash, for the verification port only.
    pub fn hashed_password(&self) -> &str {
        &self.hashed_password
    }

    /// Whether the account has completed verification.
    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// Moment the account was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.timestamps.created_at()
    }

    /// Moment the account was last mutated.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.timestamps.updated_at()
    }

    /// Mark the account verified, stamping `updated_at`.
    ///
    /// Fails when the account is already verified so double-submission of a
    /// verification token surfaces instead of silently succeeding.
    pub fn verify(&mut self, now: DateTime<Utc>) -> Result<(), UserValidationError> {
        if self.verified {
            return Err(UserValidationError::AlreadyVerified);
        }
        self.verified = true;
        self.timestamps.touch(now);
        Ok(())
    }

    /// Replace the stored password hash, stamping `updated_at`.
    ///
    /// Accepts an already-hashed value; plain-text handling and strength
    /// policy live outside the domain.
    pub fn change_password(
        &mut self,
        new_hashed_password: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), UserValidationError> {
        let new_hashed_password = new_hashed_password.into();
        if new_hashed_password.trim().is_empty() {
            return Err(UserValidationError::EmptyHashedPassword);
        }
        self.hashed_password = new_hashed_password;
        self.timestamps.touch(now);
        Ok(())
    }
}
