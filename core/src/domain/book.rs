//! Book entity and its value objects.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::review::Review;
use crate::domain::tag::Tag;
use crate::domain::timestamps::{TimestampError, Timestamps};

/// Maximum length of a book description, in characters.
pub const DESCRIPTION_MAX: usize = 1000;

/// Validation errors raised by book construction, one variant per invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookValidationError {
    /// Title was empty or whitespace-only.
    #[error("book title must not be empty")]
    EmptyTitle,
    /// Subtitle was empty or whitespace-only.
    #[error("book subtitle must not be empty")]
    EmptySubtitle,
    /// Description was empty or whitespace-only.
    #[error("book description must not be empty")]
    EmptyDescription,
    /// Description exceeded the length cap.
    #[error("book description must not exceed {max} characters")]
    DescriptionTooLong {
        /// The enforced cap.
        max: usize,
    },
    /// Page count was zero.
    #[error("page count must be greater than 0")]
    InvalidPageCount,
    /// ISBN was empty or whitespace-only.
    #[error("ISBN must not be empty")]
    EmptyIsbn,
    /// External identifier was empty or whitespace-only.
    #[error("external book id must not be empty")]
    EmptyExternalId,
    /// Author list was empty.
    #[error("book must have at least one author")]
    EmptyAuthors,
    /// Author list contained a blank entry.
    #[error("book authors must not contain blank entries")]
    BlankAuthor,
    /// Publisher was empty or whitespace-only.
    #[error("book publisher must not be empty")]
    EmptyPublisher,
    /// Published date lies in the future.
    #[error("published date must not be in the future")]
    PublishedInFuture,
    /// Language was empty or whitespace-only.
    #[error("book language must not be empty")]
    EmptyLanguage,
    /// Cover image reference was empty or whitespace-only.
    #[error("cover image reference must not be empty")]
    EmptyCoverImage,
    /// Timestamp ordering invariant violated.
    #[error(transparent)]
    Timestamps(#[from] TimestampError),
}

/// Stable book identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(Uuid);

impl BookId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for BookId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

macro_rules! string_value_object {
    (
        $(#[$outer:meta])*
        $name:ident, $error:expr
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and construct the value object.
            pub fn new(value: impl Into<String>) -> Result<Self, BookValidationError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err($error);
                }
                Ok(Self(value))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_ref())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = BookValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

string_value_object!(
    /// Book title: non-blank.
    BookTitle,
    BookValidationError::EmptyTitle
);

string_value_object!(
    /// Book subtitle: non-blank when present.
    BookSubtitle,
    BookValidationError::EmptySubtitle
);

string_value_object!(
    /// ISBN: non-blank.
    ///
    /// Checksum validation for ISBN-10/13 is intentionally deferred; the
    /// newtype keeps the single place it would land.
    Isbn,
    BookValidationError::EmptyIsbn
);

string_value_object!(
    /// Natural key assigned by the external metadata source.
    ExternalBookId,
    BookValidationError::EmptyExternalId
);

/// Book description: non-blank, capped at [`DESCRIPTION_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BookDescription(String);

impl BookDescription {
    /// Validate and construct a description.
    pub fn new(value: impl Into<String>) -> Result<Self, BookValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(BookValidationError::EmptyDescription);
        }
        if value.chars().count() > DESCRIPTION_MAX {
            return Err(BookValidationError::DescriptionTooLong {
                max: DESCRIPTION_MAX,
            });
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for BookDescription {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for BookDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<BookDescription> for String {
    fn from(value: BookDescription) -> Self {
        value.0
    }
}

impl TryFrom<String> for BookDescription {
    type Error = BookValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Positive page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct BookPageCount(u32);

impl BookPageCount {
    /// Validate and construct a page count.
    pub fn new(value: u32) -> Result<Self, BookValidationError> {
        if value == 0 {
            return Err(BookValidationError::InvalidPageCount);
        }
        Ok(Self(value))
    }

    /// The page count as a plain integer.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<BookPageCount> for u32 {
    fn from(value: BookPageCount) -> Self {
        value.0
    }
}

impl TryFrom<u32> for BookPageCount {
    type Error = BookValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for BookPageCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Parts required to construct a [`Book`].
///
/// Value-object fields arrive pre-validated; the plain-string fields and
/// cross-field invariants are validated by [`Book::new`].
#[derive(Debug, Clone)]
pub struct NewBook {
    /// Stable identifier for the new book.
    pub id: BookId,
    /// Title.
    pub title: BookTitle,
    /// Optional subtitle.
    pub subtitle: Option<BookSubtitle>,
    /// Description.
    pub description: BookDescription,
    /// Author display names; must be non-empty with no blank entries.
    pub authors: Vec<String>,
    /// Publisher display name; must be non-blank.
    pub publisher: String,
    /// Publication date; must not lie in the future.
    pub published_date: NaiveDate,
    /// Page count.
    pub page_count: BookPageCount,
    /// Language label; must be non-blank.
    pub language: String,
    /// Cover image reference; must be non-blank.
    pub cover_image_url: String,
    /// Natural key from the external metadata source, when known.
    pub external_id: Option<ExternalBookId>,
    /// Optional ISBN-10.
    pub isbn10: Option<Isbn>,
    /// Optional ISBN-13.
    pub isbn13: Option<Isbn>,
}

/// Catalogue book aggregate.
///
/// ## Invariants
/// - Non-empty author list with no blank entries.
/// - Non-blank publisher, language, and cover image reference.
/// - Published date not in the future.
/// - Timestamp ordering per [`Timestamps`].
///
/// Review and tag collections are append-only through [`Book::add_review`]
/// and [`Book::add_tag`], which deduplicate by entity equality.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Book {
    id: BookId,
    title: BookTitle,
    subtitle: Option<BookSubtitle>,
    description: BookDescription,
    authors: Vec<String>,
    publisher: String,
    published_date: NaiveDate,
    page_count: BookPageCount,
    language: String,
    cover_image_url: String,
    external_id: Option<ExternalBookId>,
    isbn10: Option<Isbn>,
    isbn13: Option<Isbn>,
    timestamps: Timestamps,
    reviews: Vec<Review>,
    tags: Vec<Tag>,
}

impl Book {
    /// Validate cross-field invariants and construct a book.
    ///
    /// `now` is the reference instant for the future-date checks; callers
    /// obtain it from their clock so tests can pin time.
    pub fn new(
        parts: NewBook,
        timestamps: Timestamps,
        now: DateTime<Utc>,
    ) -> Result<Self, BookValidationError> {
        if parts.authors.is_empty() {
            return Err(BookValidationError::EmptyAuthors);
        }
        if parts.authors.iter().any(|author| author.trim().is_empty()) {
            return Err(BookValidationError::BlankAuthor);
        }
        if parts.publisher.trim().is_empty() {
            return Err(BookValidationError::EmptyPublisher);
        }
        if parts.published_date > now.date_naive() {
            return Err(BookValidationError::PublishedInFuture);
        }
        if parts.language.trim().is_empty() {
            return Err(BookValidationError::EmptyLanguage);
        }
        if parts.cover_image_url.trim().is_empty() {
            return Err(BookValidationError::EmptyCoverImage);
        }

        Ok(Self {
            id: parts.id,
            title: parts.title,
            subtitle: parts.subtitle,
            description: parts.description,
            authors: parts.authors,
            publisher: parts.publisher,
            published_date: parts.published_date,
            page_count: parts.page_count,
            language: parts.language,
            cover_image_url: parts.cover_image_url,
            external_id: parts.external_id,
            isbn10: parts.isbn10,
            isbn13: parts.isbn13,
            timestamps,
            reviews: Vec::new(),
            tags: Vec::new(),
        })
    }

    /// Stable book identifier.
    pub fn id(&self) -> BookId {
        self.id
    }

    /// Title.
    pub fn title(&self) -> &BookTitle {
        &self.title
    }

    /// Optional subtitle.
    pub fn subtitle(&self) -> Option<&BookSubtitle> {
        self.subtitle.as_ref()
    }

    /// Description.
    pub fn description(&self) -> &BookDescription {
        &self.description
    }

    /// Author display names.
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// Publisher display name.
    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    /// Publication date.
    pub fn published_date(&self) -> NaiveDate {
        self.published_date
    }

    /// Page count.
    pub fn page_count(&self) -> BookPageCount {
        self.page_count
    }

    /// Language label.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Cover image reference.
    pub fn cover_image_url(&self) -> &str {
        &self.cover_image_url
    }

    /// Natural key from the external metadata source, when known.
    pub fn external_id(&self) -> Option<&ExternalBookId> {
        self.external_id.as_ref()
    }

    /// Optional ISBN-10.
    pub fn isbn10(&self) -> Option<&Isbn> {
        self.isbn10.as_ref()
    }

    /// Optional ISBN-13.
    pub fn isbn13(&self) -> Option<&Isbn> {
        self.isbn13.as_ref()
    }

    /// Moment the book was created locally.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.timestamps.created_at()
    }

    /// Moment the book was last mutated.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.timestamps.updated_at()
    }

    /// Reviews attached to this aggregate.
    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    /// Tags attached to this aggregate.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Append a review unless an equal one is already present, stamping
    /// `updated_at` on an actual append.
    pub fn add_review(&mut self, review: Review, now: DateTime<Utc>) {
        if !self.reviews.contains(&review) {
            self.reviews.push(review);
            self.timestamps.touch(now);
        }
    }

    /// Append a tag unless an equal one is already present, stamping
    /// `updated_at` on an actual append.
    pub fn add_tag(&mut self, tag: Tag, now: DateTime<Utc>) {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
            self.timestamps.touch(now);
        }
    }

    /// Whether the book carries an external-source identifier.
    pub fn is_externally_sourced(&self) -> bool {
        self.external_id.is_some()
    }
}
