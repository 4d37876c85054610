//! Background Asset Resolution
//!
//! Turns a finished [`TextItem`] into the background the banner shows:
//!
//! 1. a direct `image_ref` wins outright,
//! 2. otherwise the `keyword` is searched and one hit is picked at random,
//! 3. otherwise there is no background.
//!
//! A failed or empty search degrades to the per-word fallback image. The
//! failure is logged and never reaches the caller.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, error, warn};

use crate::item::{AssetReference, TextItem};
use crate::search::{ImageSearch, SearchError};

/// Default fallback path; `{word}` becomes the lowercased word
pub const DEFAULT_FALLBACK_TEMPLATE: &str = "/img/hero-backgrounds/{word}.jpg";

/// Deterministic fallback background for a word
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FallbackAsset {
    template: String,
}

impl Default for FallbackAsset {
    fn default() -> Self {
        Self::new(DEFAULT_FALLBACK_TEMPLATE)
    }
}

impl FallbackAsset {
    /// Create from a template containing an optional `{word}` placeholder
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Fallback reference for `word`
    #[must_use]
    pub fn for_word(&self, word: &str) -> AssetReference {
        AssetReference::fallback(self.template.replace("{word}", &word.to_lowercase()))
    }

    /// The raw template
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }
}

/// Resolves backgrounds for finished items
pub struct AssetResolver {
    /// Search backend for keyword items
    search: Arc<dyn ImageSearch>,
    /// Used when the search fails or finds nothing
    fallback: FallbackAsset,
    /// Picks among search hits
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for AssetResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetResolver")
            .field("search", &self.search.name())
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

impl AssetResolver {
    /// Create a resolver with an entropy-seeded picker
    pub fn new(search: Arc<dyn ImageSearch>, fallback: FallbackAsset) -> Self {
        Self::with_rng(search, fallback, StdRng::from_entropy())
    }

    /// Create a resolver with a specific picker (seeded in tests)
    pub fn with_rng(search: Arc<dyn ImageSearch>, fallback: FallbackAsset, rng: StdRng) -> Self {
        Self {
            search,
            fallback,
            rng: Mutex::new(rng),
        }
    }

    /// Resolve the background for `item`
    ///
    /// Only the keyword path suspends. `None` means the item has no
    /// background at all, which is not an error.
    pub async fn resolve(&self, item: &TextItem) -> Option<AssetReference> {
        if let Some(image) = &item.image_ref {
            return Some(image.clone());
        }
        let keyword = item.keyword.as_deref()?;

        match self.search.search(keyword).await {
            Ok(candidates) => {
                let picked = candidates
                    .choose(&mut *self.rng.lock())
                    .map(|c| AssetReference::searched(c.large.clone(), keyword));
                match picked {
                    Some(asset) => {
                        debug!(
                            backend = self.search.name(),
                            keyword,
                            url = %asset.url,
                            candidates = candidates.len(),
                            "Background resolved"
                        );
                        Some(asset)
                    }
                    None => {
                        warn!(
                            backend = self.search.name(),
                            keyword, "Image search found nothing, using fallback"
                        );
                        Some(self.fallback.for_word(&item.word))
                    }
                }
            }
            Err(SearchError::MissingApiKey) => {
                error!(
                    backend = self.search.name(),
                    keyword, "No image search API key, using fallback"
                );
                Some(self.fallback.for_word(&item.word))
            }
            Err(e) => {
                warn!(
                    backend = self.search.name(),
                    keyword,
                    error = %e,
                    "Image search failed, using fallback"
                );
                Some(self.fallback.for_word(&item.word))
            }
        }
    }
}
