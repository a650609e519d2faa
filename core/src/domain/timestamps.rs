//! Shared creation/update timestamp pair and its ordering invariants.
//!
//! Every entity carries a [`Timestamps`] value. `DateTime<Utc>` makes naive
//! (zone-less) values unrepresentable, so only the ordering invariants
//! remain runtime checks: `created_at` must not lie in the future and
//! `updated_at` must never precede `created_at`.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Violations of the timestamp ordering invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    /// `created_at` lies after the supplied reference instant.
    #[error("created_at must not be in the future")]
    CreatedInFuture,
    /// `updated_at` lies before `created_at`.
    #[error("updated_at must not precede created_at")]
    UpdatedBeforeCreated,
}

/// Validated `created_at` / `updated_at` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timestamps {
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Timestamps {
    /// Validate and construct a pair against a reference `now`.
    ///
    /// Callers obtain `now` from their clock so tests can pin time.
    pub fn new(
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Self, TimestampError> {
        if created_at > now {
            return Err(TimestampError::CreatedInFuture);
        }
        if updated_at < created_at {
            return Err(TimestampError::UpdatedBeforeCreated);
        }
        Ok(Self {
            created_at,
            updated_at,
        })
    }

    /// Construct a pair for a freshly created entity (both fields = `now`).
    pub fn at_creation(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    /// Moment the entity was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Moment the entity was last mutated.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Stamp a mutation. `now` must come from the same clock the entity was
    /// created against; values before `created_at` are clamped to preserve
    /// the ordering invariant.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }
}
