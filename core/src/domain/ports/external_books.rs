//! Port and wire-shaped payloads for the external book-metadata source.
//!
//! The payload structs mirror the provider's volume-info shape so search
//! pages can round-trip through the cache as JSON without a second mapping
//! layer. Retry and backoff policy belongs to the adapter, not here.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::book::ExternalBookId;

/// Errors surfaced by external metadata adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExternalBookServiceError {
    /// Provider is unreachable or timing out.
    #[error("external book service unavailable: {message}")]
    Unavailable {
        /// Adapter-supplied diagnostic.
        message: String,
    },
    /// Provider answered with a payload the adapter could not interpret.
    #[error("external book service returned an invalid response: {message}")]
    InvalidResponse {
        /// Adapter-supplied diagnostic.
        message: String,
    },
}

/// Industry identifier entry (ISBN_10, ISBN_13, and friends).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalIndustryIdentifier {
    /// Identifier scheme, e.g. `ISBN_13`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Identifier value.
    pub identifier: String,
}

/// Cover image references supplied by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalImageLinks {
    /// Small thumbnail URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_thumbnail: Option<String>,
    /// Thumbnail URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Descriptive fields for one volume, as the provider reports them.
///
/// Everything beyond the title is optional on the wire; registration maps
/// the gaps to sentinel values rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalVolumeInfo {
    /// Title.
    pub title: String,
    /// Subtitle, when the provider has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Author display names.
    #[serde(default)]
    pub authors: Vec<String>,
    /// Publisher display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    /// Publication date as a string of length 10 (`YYYY-MM-DD`),
    /// 7 (`YYYY-MM`), or 4 (`YYYY`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    /// Long-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Industry identifiers.
    #[serde(default)]
    pub industry_identifiers: Vec<ExternalIndustryIdentifier>,
    /// Page count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    /// Provider-side average rating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    /// Provider-side rating count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratings_count: Option<u32>,
    /// Language label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Cover image references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_links: Option<ExternalImageLinks>,
}

/// One volume with its provider-assigned identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalBookDetail {
    /// Provider-assigned identifier; the natural key for local
    /// registration.
    pub id: String,
    /// Descriptive fields.
    pub volume_info: ExternalVolumeInfo,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSearchPage {
    /// Total matches across all pages.
    pub total_items: u64,
    /// Matches on this page.
    #[serde(default)]
    pub items: Vec<ExternalBookDetail>,
}

/// Port for the external book-metadata source.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExternalBookService: Send + Sync {
    /// Search the provider's catalogue.
    async fn search<'a>(
        &self,
        query: &str,
        filters: Option<&'a BTreeMap<String, String>>,
        page_index: u32,
        page_size: u32,
    ) -> Result<ExternalSearchPage, ExternalBookServiceError>;

    /// Fetch one volume by its provider-assigned identifier.
    async fn find_by_external_id(
        &self,
        external_id: &ExternalBookId,
    ) -> Result<Option<ExternalBookDetail>, ExternalBookServiceError>;
}

/// Fixture provider that finds nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureExternalBookService;

#[async_trait]
impl ExternalBookService for FixtureExternalBookService {
    async fn search<'a>(
        &self,
        _query: &str,
        _filters: Option<&'a BTreeMap<String, String>>,
        _page_index: u32,
        _page_size: u32,
    ) -> Result<ExternalSearchPage, ExternalBookServiceError> {
        Ok(ExternalSearchPage {
            total_items: 0,
            items: Vec::new(),
        })
    }

    async fn find_by_external_id(
        &self,
        _external_id: &ExternalBookId,
    ) -> Result<Option<ExternalBookDetail>, ExternalBookServiceError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    //! Wire-shape round-trip checks for the cacheable payloads.
    use super::*;

    fn fixture_page() -> ExternalSearchPage {
        ExternalSearchPage {
            total_items: 1,
            items: vec![ExternalBookDetail {
                id: "vol-1".to_owned(),
                volume_info: ExternalVolumeInfo {
                    title: "Dune".to_owned(),
                    subtitle: None,
                    authors: vec!["Frank Herbert".to_owned()],
                    publisher: Some("Chilton".to_owned()),
                    published_date: Some("1965-08-01".to_owned()),
                    description: None,
                    industry_identifiers: vec![ExternalIndustryIdentifier {
                        kind: "ISBN_13".to_owned(),
                        identifier: "9780441172719".to_owned(),
                    }],
                    page_count: Some(412),
                    average_rating: None,
                    ratings_count: None,
                    language: Some("en".to_owned()),
                    image_links: None,
                },
            }],
        }
    }

    #[test]
    fn search_page_round_trips_through_json() {
        let page = fixture_page();
        let payload = serde_json::to_string(&page).expect("serializes");
        let restored: ExternalSearchPage =
            serde_json::from_str(&payload).expect("deserializes");
        assert_eq!(restored, page);
    }

    #[test]
    fn volume_info_tolerates_missing_optional_fields() {
        let parsed: ExternalVolumeInfo =
            serde_json::from_str(r#"{ "title": "Dune" }"#).expect("minimal payload parses");
        assert_eq!(parsed.title, "Dune");
        assert!(parsed.authors.is_empty());
        assert!(parsed.published_date.is_none());
    }

    #[test]
    fn identifier_kind_uses_provider_field_name() {
        let entry = ExternalIndustryIdentifier {
            kind: "ISBN_10".to_owned(),
            identifier: "0441172717".to_owned(),
        };
        let payload = serde_json::to_string(&entry).expect("serializes");
        assert!(payload.contains(r#""type":"ISBN_10""#));
    }
}
