//! Domain entities, ports, and application services.
//!
//! Purpose: define the strongly typed core of the catalogue: validated
//! entities and value objects, the port traits adapters implement, and the
//! services realising the use-cases. Keep invariants documented in each
//! type's Rustdoc; adapters map [`Error`] to their own envelopes.

pub mod error;
pub mod ports;
pub mod timestamps;

pub mod book;
pub mod review;
pub mod tag;
pub mod user;

mod book_service;
mod review_service;
mod tag_service;
mod user_service;

pub use self::book::{
    Book, BookDescription, BookId, BookPageCount, BookSubtitle, BookTitle, BookValidationError,
    ExternalBookId, Isbn, NewBook,
};
pub use self::book_service::{BookDetailsView, BookService};
pub use self::error::{DomainResult, Error, ErrorCode};
pub use self::review::{Rating, Review, ReviewId, ReviewText, ReviewValidationError};
pub use self::review_service::ReviewService;
pub use self::tag::{Tag, TagId, TagName, TagValidationError};
pub use self::tag_service::TagService;
pub use self::timestamps::{TimestampError, Timestamps};
pub use self::user::{EmailAddress, NewUser, PersonName, User, UserId, UserValidationError};
pub use self::user_service::{NewUserRequest, UserService};

#[cfg(test)]
mod book_service_tests;
#[cfg(test)]
mod tag_service_tests;
