//! Image Search Backends
//!
//! Background lookups go through the [`ImageSearch`] trait so the resolver
//! never cares which provider answers. [`PexelsSearch`] talks to the Pexels
//! photo search API, the provider the hero banner has always used.
//!
//! # Pexels API
//!
//! - `GET /v1/search?query=<keyword>&per_page=<n>` with the key in the
//!   `Authorization` header
//! - Each photo carries several sizes under `src`; `large2x` is the one the
//!   banner displays, with `large` as a stand-in when it is missing

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default Pexels API root
pub const PEXELS_ENDPOINT: &str = "https://api.pexels.com/v1";

/// Default number of candidates requested per search
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Errors from an image search backend
#[derive(Debug, Error)]
pub enum SearchError {
    /// No API key was configured
    #[error("No image search API key configured")]
    MissingApiKey,

    /// The HTTP client could not be built or the request failed
    #[error("Image search request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status
    #[error("Image search returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, for the log
        body: String,
    },

    /// The response body was not the expected JSON
    #[error("Failed to decode image search response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One search hit
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageCandidate {
    /// Reference to the large rendition
    pub large: String,
    /// Provider id, when known
    pub id: Option<u64>,
    /// Credit line, when known
    pub photographer: Option<String>,
}

impl ImageCandidate {
    /// A candidate with only a large rendition
    pub fn new(large: impl Into<String>) -> Self {
        Self {
            large: large.into(),
            id: None,
            photographer: None,
        }
    }
}

/// Image search backend
#[async_trait]
pub trait ImageSearch: Send + Sync {
    /// Backend name for logs (e.g. "Pexels")
    fn name(&self) -> &str;

    /// Search for candidates matching `keyword`
    ///
    /// An empty vector is a valid answer.
    async fn search(&self, keyword: &str) -> Result<Vec<ImageCandidate>, SearchError>;
}

/// Connection settings for the image search backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchConfig {
    /// API root, without trailing slash
    pub endpoint: String,
    /// API key (the search fails with [`SearchError::MissingApiKey`] without one)
    pub api_key: Option<String>,
    /// Candidates requested per search
    pub per_page: u32,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: PEXELS_ENDPOINT.to_string(),
            api_key: None,
            per_page: DEFAULT_PER_PAGE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl SearchConfig {
    /// Set the API key
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the API root
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Whether a usable key is present
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Pexels photo search client
#[derive(Clone)]
pub struct PexelsSearch {
    /// Connection settings
    config: SearchConfig,
    /// HTTP client
    http_client: reqwest::Client,
}

impl std::fmt::Debug for PexelsSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PexelsSearch")
            .field("endpoint", &self.config.endpoint)
            .field("has_api_key", &self.config.has_api_key())
            .field("per_page", &self.config.per_page)
            .finish_non_exhaustive()
    }
}

impl PexelsSearch {
    /// Create a client from settings
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        let http_client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Search endpoint URL
    fn search_url(&self) -> String {
        format!("{}/search", self.config.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl ImageSearch for PexelsSearch {
    fn name(&self) -> &'static str {
        "Pexels"
    }

    async fn search(&self, keyword: &str) -> Result<Vec<ImageCandidate>, SearchError> {
        let api_key = match self.config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key,
            _ => return Err(SearchError::MissingApiKey),
        };

        let per_page = self.config.per_page.to_string();
        let response = self
            .http_client
            .get(self.search_url())
            .header(reqwest::header::AUTHORIZATION, api_key)
            .query(&[("query", keyword), ("per_page", per_page.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_pexels_response(&body)
    }
}

#[derive(Debug, Deserialize)]
struct PexelsResponse {
    #[serde(default)]
    photos: Vec<PexelsPhoto>,
}

#[derive(Debug, Deserialize)]
struct PexelsPhoto {
    id: Option<u64>,
    photographer: Option<String>,
    src: PexelsSources,
}

#[derive(Debug, Deserialize)]
struct PexelsSources {
    large2x: Option<String>,
    large: Option<String>,
}

/// Turn a Pexels search body into candidates
///
/// Photos with neither a `large2x` nor a `large` rendition are skipped.
///
/// # Errors
///
/// Returns [`SearchError::Decode`] if the body is not a Pexels search result.
pub fn parse_pexels_response(body: &str) -> Result<Vec<ImageCandidate>, SearchError> {
    let response: PexelsResponse = serde_json::from_str(body)?;
    Ok(response
        .photos
        .into_iter()
        .filter_map(|photo| {
            let large = photo.src.large2x.or(photo.src.large)?;
            Some(ImageCandidate {
                large,
                id: photo.id,
                photographer: photo.photographer,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_pexels_response() {
        let body = r#"{
            "page": 1,
            "per_page": 2,
            "photos": [
                {
                    "id": 3184291,
                    "photographer": "fauxels",
                    "src": {
                        "original": "https://images.pexels.com/photos/3184291/a.jpeg",
                        "large2x": "https://images.pexels.com/photos/3184291/a.jpeg?h=650&w=940&dpr=2",
                        "large": "https://images.pexels.com/photos/3184291/a.jpeg?h=650&w=940"
                    }
                },
                {
                    "id": 7,
                    "src": { "large": "https://images.pexels.com/photos/7/b.jpeg" }
                },
                {
                    "id": 8,
                    "src": { "tiny": "https://images.pexels.com/photos/8/c.jpeg" }
                }
            ]
        }"#;

        let candidates = parse_pexels_response(body).unwrap();
        assert_eq!(
            candidates,
            vec![
                ImageCandidate {
                    large: "https://images.pexels.com/photos/3184291/a.jpeg?h=650&w=940&dpr=2"
                        .to_string(),
                    id: Some(3184291),
                    photographer: Some("fauxels".to_string()),
                },
                ImageCandidate {
                    large: "https://images.pexels.com/photos/7/b.jpeg".to_string(),
                    id: Some(7),
                    photographer: None,
                },
            ]
        );
    }

    #[test]
    fn test_parse_empty_and_missing_photos() {
        assert!(parse_pexels_response(r#"{"photos": []}"#).unwrap().is_empty());
        assert!(parse_pexels_response(r#"{"total_results": 0}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_garbage_is_decode_error() {
        let err = parse_pexels_response("<html>rate limited</html>").unwrap_err();
        assert!(matches!(err, SearchError::Decode(_)));
    }

    #[test]
    fn test_search_url_trims_slash() {
        let search = PexelsSearch::new(
            SearchConfig::default().with_endpoint("http://localhost:9000/v1/"),
        )
        .unwrap();
        assert_eq!(search.search_url(), "http://localhost:9000/v1/search");
    }

    #[test]
    fn test_has_api_key() {
        assert!(!SearchConfig::default().has_api_key());
        assert!(!SearchConfig::default().with_api_key("  ").has_api_key());
        assert!(SearchConfig::default().with_api_key("abc").has_api_key());
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let search = PexelsSearch::new(SearchConfig::default()).unwrap();
        let err = search.search("growth").await.unwrap_err();
        assert!(matches!(err, SearchError::MissingApiKey));
    }

    #[test]
    fn test_debug_hides_key() {
        let search =
            PexelsSearch::new(SearchConfig::default().with_api_key("secret-key")).unwrap();
        let debug = format!("{search:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("has_api_key: true"));
    }
}
