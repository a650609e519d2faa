//! Port traits for the hexagonal boundary.
//!
//! One file per collaborator contract. Every port is asynchronous, object
//! safe behind `Send + Sync`, and carries its own adapter error enum so
//! services can map failures precisely. `Fixture*` implementations back
//! tests that do not exercise the port under test; mockall mocks are
//! exported for the ones that do.

mod book_repository;
mod cache;
mod external_books;
mod favorite_repository;
mod password_security;
mod review_repository;
mod tag_repository;
mod user_repository;

#[cfg(test)]
pub use book_repository::MockBookRepository;
pub use book_repository::{BookRepository, BookRepositoryError, FixtureBookRepository};
#[cfg(test)]
pub use cache::MockCache;
pub use cache::{Cache, CacheError, CacheKey, CacheKeyValidationError, FixtureCache};
#[cfg(test)]
pub use external_books::MockExternalBookService;
pub use external_books::{
    ExternalBookDetail, ExternalBookService, ExternalBookServiceError, ExternalImageLinks,
    ExternalIndustryIdentifier, ExternalSearchPage, ExternalVolumeInfo, FixtureExternalBookService,
};
#[cfg(test)]
pub use favorite_repository::MockFavoriteRepository;
pub use favorite_repository::{
    FavoriteRepository, FavoriteRepositoryError, FixtureFavoriteRepository,
};
#[cfg(test)]
pub use password_security::MockPasswordSecurity;
pub use password_security::{FixturePasswordSecurity, PasswordSecurity, PasswordSecurityError};
#[cfg(test)]
pub use review_repository::MockReviewRepository;
pub use review_repository::{FixtureReviewRepository, ReviewRepository, ReviewRepositoryError};
#[cfg(test)]
pub use tag_repository::MockTagRepository;
pub use tag_repository::{FixtureTagRepository, TagRepository, TagRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserRepository, UserRepositoryError};
