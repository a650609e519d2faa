//! Book application service.
//!
//! Owns the catalogue-facing use-cases: idempotent registration of external
//! volumes, cache-aside search against the metadata provider, and the
//! combined details projection for display.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::Serialize;

use crate::domain::book::{
    Book, BookDescription, BookId, BookPageCount, BookSubtitle, BookTitle, BookValidationError,
    ExternalBookId, Isbn, NewBook,
};
use crate::domain::error::{DomainResult, Error};
use crate::domain::ports::{
    BookRepository, BookRepositoryError, Cache, CacheKey, ExternalBookDetail, ExternalBookService,
    ExternalBookServiceError, ExternalSearchPage, FavoriteRepository, FavoriteRepositoryError,
    ReviewRepository, ReviewRepositoryError,
};
use crate::domain::review::Review;
use crate::domain::timestamps::Timestamps;
use crate::domain::user::UserId;

/// Default TTL for cached external search pages.
pub const SEARCH_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Reviews included in the details projection.
const DETAILS_REVIEW_PAGE_SIZE: u32 = 10;

/// Sentinel for provider fields that are absent rather than invalid.
const MISSING_TEXT_SENTINEL: &str = "-";
/// Sentinel for absent publisher/language labels.
const UNKNOWN_LABEL_SENTINEL: &str = "N/A";
/// Marker adapters substitute with their default cover asset.
const DEFAULT_COVER_IMAGE: &str = "default_cover_image_url";

/// Read projection combining provider display fields with local state.
#[derive(Debug, Clone, Serialize)]
pub struct BookDetailsView {
    /// Display fields as the provider reports them.
    pub external: ExternalBookDetail,
    /// The locally registered book.
    pub book: Book,
    /// First page of local reviews for the book.
    pub reviews: Vec<Review>,
    /// Whether the requesting user has favourited the book; `None` when no
    /// requesting user was supplied.
    pub favorited: Option<bool>,
}

/// Application service for catalogue use-cases.
#[derive(Clone)]
pub struct BookService<B, E, F, R, C> {
    books: Arc<B>,
    external: Arc<E>,
    favorites: Arc<F>,
    reviews: Arc<R>,
    cache: Arc<C>,
    clock: Arc<dyn Clock>,
    search_cache_ttl: Duration,
}

impl<B, E, F, R, C> BookService<B, E, F, R, C> {
    /// Create a new service over the given ports.
    pub fn new(
        books: Arc<B>,
        external: Arc<E>,
        favorites: Arc<F>,
        reviews: Arc<R>,
        cache: Arc<C>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            books,
            external,
            favorites,
            reviews,
            cache,
            clock,
            search_cache_ttl: SEARCH_CACHE_TTL,
        }
    }

    /// Override the search cache TTL.
    pub fn with_search_cache_ttl(mut self, ttl: Duration) -> Self {
        self.search_cache_ttl = ttl;
        self
    }
}

impl<B, E, F, R, C> BookService<B, E, F, R, C>
where
    B: BookRepository,
    E: ExternalBookService,
    F: FavoriteRepository,
    R: ReviewRepository,
    C: Cache,
{
    /// Register the external volume locally unless it already is.
    ///
    /// Idempotent by the external-id natural key: a hit on the local lookup
    /// returns the stored book without touching the provider. A concurrent
    /// registration losing the insert race re-fetches and returns the
    /// winner's row.
    pub async fn register_from_external_if_missing(
        &self,
        external_id: &ExternalBookId,
    ) -> DomainResult<Book> {
        if let Some(existing) = self
            .books
            .find_by_external_id(external_id)
            .await
            .map_err(map_book_repo_error)?
        {
            return Ok(existing);
        }

        let detail = self
            .external
            .find_by_external_id(external_id)
            .await
            .map_err(map_external_error)?
            .ok_or_else(|| {
                Error::not_found(format!("book {external_id} not found in external service"))
            })?;

        let now = self.clock.utc();
        let book = map_external_detail_to_book(&detail, external_id.clone(), now)
            .map_err(|err| Error::internal(format!("external volume {external_id} is not registrable: {err}")))?;

        match self.books.save(&book).await {
            Ok(()) => Ok(book),
            Err(BookRepositoryError::DuplicateKey { .. }) => self
                .books
                .find_by_external_id(external_id)
                .await
                .map_err(map_book_repo_error)?
                .ok_or_else(|| {
                    Error::service_unavailable(
                        "book insert conflicted but the winning row was not found",
                    )
                }),
            Err(err) => Err(map_book_repo_error(err)),
        }
    }

    /// Search the provider's catalogue with a cache-aside read.
    ///
    /// Cache failures never abort the search; they degrade to a miss (on
    /// read) or to an uncached response (on write).
    pub async fn search_via_external(
        &self,
        query: &str,
        page_index: u32,
        page_size: u32,
    ) -> DomainResult<ExternalSearchPage> {
        let key = search_cache_key(query, page_index, page_size);

        if let Some(key) = &key {
            match self.cache.get(key).await {
                Ok(Some(payload)) => match serde_json::from_str::<ExternalSearchPage>(&payload) {
                    Ok(page) => {
                        tracing::debug!(key = %key, "external search cache hit");
                        return Ok(page);
                    }
                    Err(error) => {
                        tracing::warn!(key = %key, %error, "discarding undecodable cache entry");
                    }
                },
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(key = %key, %error, "cache read failed; treating as miss");
                }
            }
        }

        let page = self
            .external
            .search(query, None, page_index, page_size)
            .await
            .map_err(map_external_error)?;

        if let Some(key) = &key {
            match serde_json::to_string(&page) {
                Ok(payload) => {
                    if let Err(error) = self
                        .cache
                        .set(key, &payload, Some(self.search_cache_ttl))
                        .await
                    {
                        tracing::warn!(key = %key, %error, "cache write failed; result served uncached");
                    }
                }
                Err(error) => {
                    tracing::warn!(%error, "search page could not be serialized for caching");
                }
            }
        }

        Ok(page)
    }

    /// Assemble the details projection for one external volume.
    ///
    /// Ensures the volume is registered locally (idempotently), then
    /// combines the provider's display fields with the book's local reviews
    /// and, when a requesting user is supplied, its favourite status.
    pub async fn book_details_for_display(
        &self,
        external_id: &ExternalBookId,
        requesting_user: Option<UserId>,
    ) -> DomainResult<BookDetailsView> {
        let detail = self
            .external
            .find_by_external_id(external_id)
            .await
            .map_err(map_external_error)?
            .ok_or_else(|| {
                Error::not_found(format!("book {external_id} not found in external service"))
            })?;

        let book = self.register_from_external_if_missing(external_id).await?;

        let reviews = self
            .reviews
            .list_by_book(book.id(), DETAILS_REVIEW_PAGE_SIZE, 0)
            .await
            .map_err(map_review_repo_error)?;

        let favorited = match requesting_user {
            Some(user_id) => Some(
                self.favorites
                    .is_favorited(user_id, book.id())
                    .await
                    .map_err(map_favorite_repo_error)?,
            ),
            None => None,
        };

        Ok(BookDetailsView {
            external: detail,
            book,
            reviews,
            favorited,
        })
    }
}

fn map_book_repo_error(error: BookRepositoryError) -> Error {
    match error {
        BookRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("book repository unavailable: {message}"))
        }
        BookRepositoryError::Query { message } => {
            Error::internal(format!("book repository error: {message}"))
        }
        BookRepositoryError::DuplicateKey { key } => {
            Error::conflict(format!("book already registered for {key}"))
        }
    }
}

fn map_review_repo_error(error: ReviewRepositoryError) -> Error {
    match error {
        ReviewRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("review repository unavailable: {message}"))
        }
        ReviewRepositoryError::Query { message } => {
            Error::internal(format!("review repository error: {message}"))
        }
    }
}

fn map_favorite_repo_error(error: FavoriteRepositoryError) -> Error {
    match error {
        FavoriteRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("favorite repository unavailable: {message}"))
        }
        FavoriteRepositoryError::Query { message } => {
            Error::internal(format!("favorite repository error: {message}"))
        }
    }
}

fn map_external_error(error: ExternalBookServiceError) -> Error {
    match error {
        ExternalBookServiceError::Unavailable { message } => {
            Error::service_unavailable(format!("external book service unavailable: {message}"))
        }
        ExternalBookServiceError::InvalidResponse { message } => {
            Error::internal(format!("external book service response invalid: {message}"))
        }
    }
}

fn search_cache_key(query: &str, page_index: u32, page_size: u32) -> Option<CacheKey> {
    CacheKey::new(format!(
        "external_search:q={}:idx={page_index}:size={page_size}",
        query.trim()
    ))
    .ok()
}

/// Parse the provider's published-date formats: full date, year-month
/// (day defaulted to 1), or bare year (month and day defaulted to 1).
fn parse_published_date(raw: &str) -> Option<NaiveDate> {
    match raw.len() {
        10 => NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok(),
        7 => NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").ok(),
        4 => raw
            .parse::<i32>()
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1)),
        _ => None,
    }
}

/// Sentinel date for volumes whose published date is absent or unparseable.
fn fallback_published_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Map a provider volume onto a new [`Book`].
///
/// Absent optional fields degrade to sentinels instead of failing; the
/// provider's own invalid data (blank title, oversized description) still
/// surfaces as a validation error.
fn map_external_detail_to_book(
    detail: &ExternalBookDetail,
    external_id: ExternalBookId,
    now: DateTime<Utc>,
) -> Result<Book, BookValidationError> {
    let volume = &detail.volume_info;

    let published_date = volume
        .published_date
        .as_deref()
        .and_then(parse_published_date)
        .unwrap_or_else(fallback_published_date);

    let subtitle = volume
        .subtitle
        .clone()
        .unwrap_or_else(|| MISSING_TEXT_SENTINEL.to_owned());
    let description = volume
        .description
        .clone()
        .unwrap_or_else(|| MISSING_TEXT_SENTINEL.to_owned());
    let publisher = volume
        .publisher
        .clone()
        .unwrap_or_else(|| UNKNOWN_LABEL_SENTINEL.to_owned());
    let language = volume
        .language
        .clone()
        .unwrap_or_else(|| UNKNOWN_LABEL_SENTINEL.to_owned());
    let cover_image_url = volume
        .image_links
        .as_ref()
        .and_then(|links| links.thumbnail.clone())
        .unwrap_or_else(|| DEFAULT_COVER_IMAGE.to_owned());
    let page_count = volume.page_count.filter(|count| *count > 0).unwrap_or(1);

    // Blank identifiers from the provider are dropped rather than fatal.
    let isbn_for = |kind: &str| -> Option<Isbn> {
        volume
            .industry_identifiers
            .iter()
            .find(|entry| entry.kind == kind)
            .and_then(|entry| Isbn::new(entry.identifier.clone()).ok())
    };

    Book::new(
        NewBook {
            id: BookId::random(),
            title: BookTitle::new(volume.title.clone())?,
            subtitle: Some(BookSubtitle::new(subtitle)?),
            description: BookDescription::new(description)?,
            authors: volume.authors.clone(),
            publisher,
            published_date,
            page_count: BookPageCount::new(page_count)?,
            language,
            cover_image_url,
            external_id: Some(external_id),
            isbn10: isbn_for("ISBN_10"),
            isbn13: isbn_for("ISBN_13"),
        },
        Timestamps::at_creation(now),
        now,
    )
}
