//! Tag entity and its normalizing name value object.
//!
//! Tags are global and shared across books through a many-to-many
//! association owned by the tag repository port.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::timestamps::{TimestampError, Timestamps};

/// Maximum length of a tag name, in characters, after normalization.
pub const TAG_NAME_MAX: usize = 50;

/// Validation errors raised by tag construction and mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagValidationError {
    /// Name was empty or whitespace-only.
    #[error("tag name must not be empty")]
    EmptyName,
    /// Name exceeded the length cap after trimming.
    #[error("tag name must not exceed {max} characters")]
    NameTooLong {
        /// The enforced cap.
        max: usize,
    },
    /// Timestamp ordering invariant violated.
    #[error(transparent)]
    Timestamps(#[from] TimestampError),
}

/// Stable tag identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(Uuid);

impl TagId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for TagId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Normalized tag name: trimmed, lower-cased, non-blank, at most
/// [`TAG_NAME_MAX`] characters.
///
/// Normalization happens at construction, so `"Sci-Fi "` and `"sci-fi"`
/// collapse to the same value and compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagName(String);

impl TagName {
    /// Normalize, validate, and construct a tag name.
    pub fn new(value: impl AsRef<str>) -> Result<Self, TagValidationError> {
        let normalized = value.as_ref().trim().to_lowercase();
        if normalized.is_empty() {
            return Err(TagValidationError::EmptyName);
        }
        if normalized.chars().count() > TAG_NAME_MAX {
            return Err(TagValidationError::NameTooLong { max: TAG_NAME_MAX });
        }
        Ok(Self(normalized))
    }
}

impl AsRef<str> for TagName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<TagName> for String {
    fn from(value: TagName) -> Self {
        value.0
    }
}

impl TryFrom<String> for TagName {
    type Error = TagValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Global tag shared across books.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    id: TagId,
    name: TagName,
    timestamps: Timestamps,
}

impl Tag {
    /// Construct a tag from validated components.
    pub fn new(id: TagId, name: TagName, timestamps: Timestamps) -> Self {
        Self {
            id,
            name,
            timestamps,
        }
    }

    /// Stable tag identifier.
    pub fn id(&self) -> TagId {
        self.id
    }

    /// Normalized tag name.
    pub fn name(&self) -> &TagName {
        &self.name
    }

    /// Moment the tag was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.timestamps.created_at()
    }

    /// Moment the tag was last mutated.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.timestamps.updated_at()
    }

    /// Rename the tag. The raw input is re-validated and normalized;
    /// `updated_at` is stamped only when the normalized name actually
    /// differs from the current one.
    pub fn update_name(
        &mut self,
        new_name: impl AsRef<str>,
        now: DateTime<Utc>,
    ) -> Result<(), TagValidationError> {
        let replacement = TagName::new(new_name)?;
        if self.name != replacement {
            self.name = replacement;
            self.timestamps.touch(now);
        }
        Ok(())
    }
}
