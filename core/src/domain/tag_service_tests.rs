//! Behavioural unit coverage for the tag application service.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use mockall::Sequence;
use rstest::rstest;

use crate::domain::book::{
    Book, BookDescription, BookId, BookPageCount, BookTitle, NewBook,
};
use crate::domain::error::ErrorCode;
use crate::domain::ports::{MockBookRepository, MockTagRepository, TagRepositoryError};
use crate::domain::tag::{Tag, TagId, TagName};
use crate::domain::tag_service::TagService;
use crate::domain::timestamps::Timestamps;

fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn fixture_tag(name: &str) -> Tag {
    Tag::new(
        TagId::random(),
        TagName::new(name).expect("valid tag name"),
        Timestamps::at_creation(fixture_timestamp()),
    )
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
            external_id: None,
            isbn10: None,
            isbn13: None,
        },
        Timestamps::at_creation(now),
        now,
    )
    .expect("valid fixture book")
}

fn make_service(
    tags: MockTagRepository,
    books: MockBookRepository,
) -> TagService<MockTagRepository, MockBookRepository> {
    TagService::new(Arc::new(tags), Arc::new(books))
}

#[rstest]
#[tokio::test]
async fn get_or_create_normalizes_the_name_before_the_lookup() {
    let mut tags = MockTagRepository::new();
    tags.expect_get_or_create()
        .times(1)
        .withf(|name| name.as_ref() == "sci-fi")
        .return_once(|name| Ok(fixture_tag(name.as_ref())));

    let service = make_service(tags, MockBookRepository::new());
    let tag = service
        .get_or_create(" Sci-Fi ")
        .await
        .expect("tag resolved");

    assert_eq!(tag.name().as_ref(), "sci-fi");
}

#[rstest]
#[case::blank("   ".to_owned())]
#[case::too_long("x".repeat(51))]
#[tokio::test]
async fn get_or_create_rejects_invalid_names_without_touching_the_repository(
    #[case] raw_name: String,
) {
    let mut tags = MockTagRepository::new();
    tags.expect_get_or_create().times(0);

    let service = make_service(tags, MockBookRepository::new());
    let error = service
        .get_or_create(&raw_name)
        .await
        .expect_err("invalid name should fail");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn tag_book_links_the_resolved_tag_to_a_registered_book() {
    let book = fixture_book();
    let book_id = book.id();
    let tag = fixture_tag("fantasy");
    let tag_id = tag.id();

    let mut books = MockBookRepository::new();
    books
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(book)));

    let mut tags = MockTagRepository::new();
    tags.expect_get_or_create()
        .times(1)
        .return_once(move |_| Ok(tag));
    tags.expect_link_to_book()
        .times(1)
        .withf(move |bid, tid| *bid == book_id && *tid == tag_id)
        .return_once(|_, _| Ok(()));

    let service = make_service(tags, books);
    let linked = service
        .tag_book(book_id, "Fantasy")
        .await
        .expect("tagging succeeds");

    assert_eq!(linked.id(), tag_id);
}

#[rstest]
#[tokio::test]
async fn tag_book_fails_not_found_for_an_unregistered_book() {
    let mut books = MockBookRepository::new();
    books.expect_find_by_id().times(1).return_once(|_| Ok(None));

    let mut tags = MockTagRepository::new();
    tags.expect_get_or_create().times(0);
    tags.expect_link_to_book().times(0);

    let service = make_service(tags, books);
    let error = service
        .tag_book(BookId::random(), "Fantasy")
        .await
        .expect_err("unregistered book should fail");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn retag_book_clears_existing_links_before_linking_the_new_set() {
    let book = fixture_book();
    let book_id = book.id();

    let mut books = MockBookRepository::new();
    books
        .expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(book)));

    let mut tags = MockTagRepository::new();
    let mut sequence = Sequence::new();
    tags.expect_unlink_all_from_book()
        .times(1)
        .in_sequence(&mut sequence)
        .withf(move |bid| *bid == book_id)
        .return_once(|_| Ok(()));
    tags.expect_get_or_create()
        .times(1)
        .in_sequence(&mut sequence)
        .withf(|name| name.as_ref() == "sci-fi")
        .return_once(|name| Ok(fixture_tag(name.as_ref())));
    tags.expect_link_to_book()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_, _| Ok(()));
    tags.expect_get_or_create()
        .times(1)
        .in_sequence(&mut sequence)
        .withf(|name| name.as_ref() == "classics")
        .return_once(|name| Ok(fixture_tag(name.as_ref())));
    tags.expect_link_to_book()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_, _| Ok(()));

    let service = make_service(tags, books);
    let linked = service
        .retag_book(book_id, &["Sci-Fi".to_owned(), "Classics".to_owned()])
        .await
        .expect("retagging succeeds");

    assert_eq!(linked.len(), 2);
    assert_eq!(linked[0].name().as_ref(), "sci-fi");
    assert_eq!(linked[1].name().as_ref(), "classics");
}

#[rstest]
#[tokio::test]
async fn untag_book_delegates_to_the_repository() {
    let book_id = BookId::random();
    let tag_id = TagId::random();

    let mut tags = MockTagRepository::new();
    tags.expect_unlink_from_book()
        .times(1)
        .withf(move |bid, tid| *bid == book_id && *tid == tag_id)
        .return_once(|_, _| Ok(()));

    let service = make_service(tags, MockBookRepository::new());
    service
        .untag_book(book_id, tag_id)
        .await
        .expect("untagging succeeds");
}

#[rstest]
#[tokio::test]
async fn listing_maps_repository_outages_to_service_unavailable() {
    let mut tags = MockTagRepository::new();
    tags.expect_list().times(1).return_once(|_, _| {
        Err(TagRepositoryError::Connection {
            message: "pool exhausted".to_owned(),
        })
    });

    let service = make_service(tags, MockBookRepository::new());
    let error = service.list(20, 0).await.expect_err("outage should map");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
