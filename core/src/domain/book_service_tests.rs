//! Behavioural unit coverage for the book application service.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;
use mockall::Sequence;
use rstest::rstest;

use crate::domain::book::{
    Book, BookDescription, BookId, BookPageCount, BookTitle, ExternalBookId, NewBook,
};
use crate::domain::book_service::{BookService, SEARCH_CACHE_TTL};
use crate::domain::error::ErrorCode;
use crate::domain::ports::{
    BookRepositoryError, CacheError, ExternalBookDetail, ExternalBookServiceError,
    ExternalImageLinks, ExternalSearchPage, ExternalVolumeInfo, MockBookRepository, MockCache,
    MockExternalBookService, MockFavoriteRepository, MockReviewRepository,
};
use crate::domain::timestamps::Timestamps;
use crate::domain::user::UserId;

const EXTERNAL_ID: &str = "vol-1";
const SEARCH_KEY: &str = "external_search:q=dune:idx=0:size=20";

fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

fn external_id() -> ExternalBookId {
    ExternalBookId::new(EXTERNAL_ID).expect("valid external id")
}

fn fixture_detail() -> ExternalBookDetail {
    ExternalBookDetail {
        id: EXTERNAL_ID.to_owned(),
        volume_info: ExternalVolumeInfo {
            title: "Dune".to_owned(),
            subtitle: None,
            authors: vec!["Frank Herbert".to_owned()],
            publisher: Some("Chilton".to_owned()),
            published_date: Some("1965-08-01".to_owned()),
            description: Some("Desert planet epic.".to_owned()),
            industry_identifiers: Vec::new(),
            page_count: Some(412),
            average_rating: None,
            ratings_count: None,
            language: Some("en".to_owned()),
            image_links: Some(ExternalImageLinks {
                small_thumbnail: None,
                thumbnail: Some("https://covers.example/dune.jpg".to_owned()),
            }),
        },
    }
}

fn fixture_book() -> Book {
    let now = fixture_timestamp();
    Book::new(
        NewBook {
            id: BookId::random(),
            title: BookTitle::new("Dune").expect("valid title"),
            subtitle: None,
            description: BookDescription::new("Desert planet epic.").expect("valid description"),
            authors: vec!["Frank Herbert".to_owned()],
            publisher: "Chilton".to_owned(),
            published_date: NaiveDate::from_ymd_opt(1965, 8, 1).expect("valid date"),
            page_count: BookPageCount::new(412).expect("valid page count"),
            language: "en".to_owned(),
            cover_image_url: "https://covers.example/dune.jpg".to_owned(),
            external_id: Some(external_id()),
            isbn10: None,
            isbn13: None,
        },
        Timestamps::at_creation(now),
        now,
    )
    .expect("valid fixture book")
}

fn fixture_page() -> ExternalSearchPage {
    ExternalSearchPage {
        total_items: 1,
        items: vec![fixture_detail()],
    }
}

fn make_service(
    books: MockBookRepository,
    external: MockExternalBookService,
    favorites: MockFavoriteRepository,
    reviews: MockReviewRepository,
    cache: MockCache,
) -> BookService<
    MockBookRepository,
    MockExternalBookService,
    MockFavoriteRepository,
    MockReviewRepository,
    MockCache,
> {
    BookService::new(
        Arc::new(books),
        Arc::new(external),
        Arc::new(favorites),
        Arc::new(reviews),
        Arc::new(cache),
        fixture_clock(),
    )
}

#[rstest]
#[tokio::test]
async fn register_returns_existing_book_without_calling_the_provider() {
    let existing = fixture_book();
    let existing_id = existing.id();

    let mut books = MockBookRepository::new();
    books
        .expect_find_by_external_id()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    books.expect_save().times(0);

    let mut external = MockExternalBookService::new();
    external.expect_find_by_external_id().times(0);

    let service = make_service(
        books,
        external,
        MockFavoriteRepository::new(),
        MockReviewRepository::new(),
        MockCache::new(),
    );
    let book = service
        .register_from_external_if_missing(&external_id())
        .await
        .expect("existing book returned");

    assert_eq!(book.id(), existing_id);
}

#[rstest]
#[tokio::test]
async fn register_maps_provider_volume_and_saves_it() {
    let mut books = MockBookRepository::new();
    books
        .expect_find_by_external_id()
        .times(1)
        .return_once(|_| Ok(None));
    books
        .expect_save()
        .times(1)
        .withf(|book| {
            book.title().as_ref() == "Dune"
                && book.external_id().map(AsRef::as_ref) == Some(EXTERNAL_ID)
        })
        .return_once(|_| Ok(()));

    let mut external = MockExternalBookService::new();
    external
        .expect_find_by_external_id()
        .times(1)
        .return_once(|_| Ok(Some(fixture_detail())));

    let service = make_service(
        books,
        external,
        MockFavoriteRepository::new(),
        MockReviewRepository::new(),
        MockCache::new(),
    );
    let book = service
        .register_from_external_if_missing(&external_id())
        .await
        .expect("registration succeeds");

    assert_eq!(book.title().as_ref(), "Dune");
    assert_eq!(book.publisher(), "Chilton");
    assert_eq!(
        book.published_date(),
        NaiveDate::from_ymd_opt(1965, 8, 1).expect("valid date")
    );
    assert_eq!(book.page_count().value(), 412);
    assert_eq!(book.created_at(), fixture_timestamp());
    assert!(book.is_externally_sourced());
}

#[rstest]
#[tokio::test]
async fn register_fails_not_found_when_provider_lacks_the_volume() {
    let mut books = MockBookRepository::new();
    books
        .expect_find_by_external_id()
        .times(1)
        .return_once(|_| Ok(None));
    books.expect_save().times(0);

    let mut external = MockExternalBookService::new();
    external
        .expect_find_by_external_id()
        .times(1)
        .return_once(|_| Ok(None));

    let service = make_service(
        books,
        external,
        MockFavoriteRepository::new(),
        MockReviewRepository::new(),
        MockCache::new(),
    );
    let error = service
        .register_from_external_if_missing(&external_id())
        .await
        .expect_err("missing volume should fail");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn register_returns_the_winner_after_losing_the_insert_race() {
    let winner = fixture_book();
    let winner_id = winner.id();

    let mut books = MockBookRepository::new();
    let mut sequence = Sequence::new();
    books
        .expect_find_by_external_id()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_| Ok(None));
    books
        .expect_save()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_| {
            Err(BookRepositoryError::DuplicateKey {
                key: EXTERNAL_ID.to_owned(),
            })
        });
    books
        .expect_find_by_external_id()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(move |_| Ok(Some(winner)));

    let mut external = MockExternalBookService::new();
    external
        .expect_find_by_external_id()
        .times(1)
        .return_once(|_| Ok(Some(fixture_detail())));

    let service = make_service(
        books,
        external,
        MockFavoriteRepository::new(),
        MockReviewRepository::new(),
        MockCache::new(),
    );
    let book = service
        .register_from_external_if_missing(&external_id())
        .await
        .expect("conflict resolves to the winner");

    assert_eq!(book.id(), winner_id);
}

#[rstest]
#[tokio::test]
async fn register_fails_when_the_conflict_winner_cannot_be_found() {
    let mut books = MockBookRepository::new();
    let mut sequence = Sequence::new();
    books
        .expect_find_by_external_id()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_| Ok(None));
    books
        .expect_save()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_| {
            Err(BookRepositoryError::DuplicateKey {
                key: EXTERNAL_ID.to_owned(),
            })
        });
    books
        .expect_find_by_external_id()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_| Ok(None));

    let mut external = MockExternalBookService::new();
    external
        .expect_find_by_external_id()
        .times(1)
        .return_once(|_| Ok(Some(fixture_detail())));

    let service = make_service(
        books,
        external,
        MockFavoriteRepository::new(),
        MockReviewRepository::new(),
        MockCache::new(),
    );
    let error = service
        .register_from_external_if_missing(&external_id())
        .await
        .expect_err("missing winner should fail");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    assert!(error.message().contains("winning row"));
}

#[rstest]
#[tokio::test]
async fn search_serves_a_cached_page_without_calling_the_provider() {
    let cached = serde_json::to_string(&fixture_page()).expect("page serializes");

    let mut cache = MockCache::new();
    cache
        .expect_get()
        .times(1)
        .withf(|key| key.as_str() == SEARCH_KEY)
        .return_once(move |_| Ok(Some(cached)));
    cache.expect_set().times(0);

    let mut external = MockExternalBookService::new();
    external.expect_search().times(0);

    let service = make_service(
        MockBookRepository::new(),
        external,
        MockFavoriteRepository::new(),
        MockReviewRepository::new(),
        cache,
    );
    let page = service
        .search_via_external("dune", 0, 20)
        .await
        .expect("cached search succeeds");

    assert_eq!(page, fixture_page());
}

#[rstest]
#[tokio::test]
async fn search_fetches_on_a_miss_and_caches_with_the_ttl() {
    let mut cache = MockCache::new();
    cache
        .expect_get()
        .times(1)
        .withf(|key| key.as_str() == SEARCH_KEY)
        .return_once(|_| Ok(None));
    cache
        .expect_set()
        .times(1)
        .withf(|key, payload, ttl| {
            key.as_str() == SEARCH_KEY
                && *ttl == Some(SEARCH_CACHE_TTL)
                && serde_json::from_str::<ExternalSearchPage>(payload)
                    .is_ok_and(|page| page == fixture_page())
        })
        .return_once(|_, _, _| Ok(()));

    let mut external = MockExternalBookService::new();
    external
        .expect_search()
        .times(1)
        .return_once(|_, _, _, _| Ok(fixture_page()));

    let service = make_service(
        MockBookRepository::new(),
        external,
        MockFavoriteRepository::new(),
        MockReviewRepository::new(),
        cache,
    );
    let page = service
        .search_via_external("dune", 0, 20)
        .await
        .expect("search succeeds");

    assert_eq!(page, fixture_page());
}

#[rstest]
#[case::read_failure(Err(CacheError::Backend {
    message: "connection refused".to_owned(),
}))]
#[case::undecodable_entry(Ok(Some("not json".to_owned())))]
#[tokio::test]
async fn search_treats_unusable_cache_reads_as_misses(
    #[case] cached: Result<Option<String>, CacheError>,
) {
    let mut cache = MockCache::new();
    cache.expect_get().times(1).return_once(move |_| cached);
    cache.expect_set().times(1).return_once(|_, _, _| Ok(()));

    let mut external = MockExternalBookService::new();
    external
        .expect_search()
        .times(1)
        .return_once(|_, _, _, _| Ok(fixture_page()));

    let service = make_service(
        MockBookRepository::new(),
        external,
        MockFavoriteRepository::new(),
        MockReviewRepository::new(),
        cache,
    );
    let page = service
        .search_via_external("dune", 0, 20)
        .await
        .expect("search survives cache trouble");

    assert_eq!(page, fixture_page());
}

#[rstest]
#[tokio::test]
async fn search_returns_the_page_even_when_the_cache_write_fails() {
    let mut cache = MockCache::new();
    cache.expect_get().times(1).return_once(|_| Ok(None));
    cache.expect_set().times(1).return_once(|_, _, _| {
        Err(CacheError::Backend {
            message: "write timeout".to_owned(),
        })
    });

    let mut external = MockExternalBookService::new();
    external
        .expect_search()
        .times(1)
        .return_once(|_, _, _, _| Ok(fixture_page()));

    let service = make_service(
        MockBookRepository::new(),
        external,
        MockFavoriteRepository::new(),
        MockReviewRepository::new(),
        cache,
    );
    let page = service
        .search_via_external("dune", 0, 20)
        .await
        .expect("search succeeds uncached");

    assert_eq!(page, fixture_page());
}

#[rstest]
#[tokio::test]
async fn search_maps_provider_outage_to_service_unavailable() {
    let mut cache = MockCache::new();
    cache.expect_get().times(1).return_once(|_| Ok(None));
    cache.expect_set().times(0);

    let mut external = MockExternalBookService::new();
    external.expect_search().times(1).return_once(|_, _, _, _| {
        Err(ExternalBookServiceError::Unavailable {
            message: "upstream timeout".to_owned(),
        })
    });

    let service = make_service(
        MockBookRepository::new(),
        external,
        MockFavoriteRepository::new(),
        MockReviewRepository::new(),
        cache,
    );
    let error = service
        .search_via_external("dune", 0, 20)
        .await
        .expect_err("outage should map");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn details_include_the_favourite_flag_for_a_requesting_user() {
    let book = fixture_book();
    let book_id = book.id();

    let mut books = MockBookRepository::new();
    books
        .expect_find_by_external_id()
        .times(1)
        .return_once(move |_| Ok(Some(book)));

    let mut external = MockExternalBookService::new();
    external
        .expect_find_by_external_id()
        .times(1)
        .return_once(|_| Ok(Some(fixture_detail())));

    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_list_by_book()
        .times(1)
        .withf(move |id, limit, offset| *id == book_id && *limit == 10 && *offset == 0)
        .return_once(|_, _, _| Ok(Vec::new()));

    let user_id = UserId::random();
    let mut favorites = MockFavoriteRepository::new();
    favorites
        .expect_is_favorited()
        .times(1)
        .withf(move |uid, bid| *uid == user_id && *bid == book_id)
        .return_once(|_, _| Ok(true));

    let service = make_service(books, external, favorites, reviews, MockCache::new());
    let view = service
        .book_details_for_display(&external_id(), Some(user_id))
        .await
        .expect("details assemble");

    assert_eq!(view.book.id(), book_id);
    assert_eq!(view.external, fixture_detail());
    assert!(view.reviews.is_empty());
    assert_eq!(view.favorited, Some(true));
}

#[rstest]
#[tokio::test]
async fn details_omit_the_favourite_flag_without_a_requesting_user() {
    let book = fixture_book();

    let mut books = MockBookRepository::new();
    books
        .expect_find_by_external_id()
        .times(1)
        .return_once(move |_| Ok(Some(book)));

    let mut external = MockExternalBookService::new();
    external
        .expect_find_by_external_id()
        .times(1)
        .return_once(|_| Ok(Some(fixture_detail())));

    let mut reviews = MockReviewRepository::new();
    reviews
        .expect_list_by_book()
        .times(1)
        .return_once(|_, _, _| Ok(Vec::new()));

    let mut favorites = MockFavoriteRepository::new();
    favorites.expect_is_favorited().times(0);

    let service = make_service(books, external, favorites, reviews, MockCache::new());
    let view = service
        .book_details_for_display(&external_id(), None)
        .await
        .expect("details assemble");

    assert_eq!(view.favorited, None);
}
