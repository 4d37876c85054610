//! Text Items and Asset References
//!
//! The page supplies an ordered list of [`TextItem`]s; the engine only ever
//! reads it. Each item may carry a direct background reference or a search
//! keyword used to look one up when the word finishes typing.

use std::ops::Index;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Where an [`AssetReference`] came from
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AssetOrigin {
    /// Supplied directly on the item
    Direct,
    /// Picked from image search results for a keyword
    Search {
        /// Keyword that was searched
        keyword: String,
    },
    /// Deterministic fallback after a failed or empty lookup
    Fallback,
}

/// Opaque handle to a background asset
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetReference {
    /// Location of the asset (URL or site-relative path)
    pub url: String,
    /// How the asset was obtained
    pub origin: AssetOrigin,
}

impl AssetReference {
    /// A reference supplied directly by the page
    pub fn direct(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            origin: AssetOrigin::Direct,
        }
    }

    /// A reference picked from search results
    pub fn searched(url: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            origin: AssetOrigin::Search {
                keyword: keyword.into(),
            },
        }
    }

    /// A fallback reference
    pub fn fallback(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            origin: AssetOrigin::Fallback,
        }
    }

    /// Whether this is the fallback asset
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self.origin, AssetOrigin::Fallback)
    }
}

/// One word in the rotation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextItem {
    /// Text to type
    pub word: String,
    /// Background to show directly (takes precedence over `keyword`)
    #[serde(default)]
    pub image_ref: Option<AssetReference>,
    /// Keyword to search a background for
    #[serde(default)]
    pub keyword: Option<String>,
}

impl TextItem {
    /// An item with no background
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            image_ref: None,
            keyword: None,
        }
    }

    /// An item whose background is looked up by keyword
    pub fn with_keyword(word: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            ..Self::new(word)
        }
    }

    /// An item with a fixed background
    pub fn with_image(word: impl Into<String>, image: AssetReference) -> Self {
        Self {
            image_ref: Some(image),
            ..Self::new(word)
        }
    }

    /// Length of the word in characters
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.word.chars().count()
    }
}

/// Ordered, wrapping, shared list of items
///
/// Cloning is cheap and keeps identity; two lists are "the same list" only
/// when they share storage, which is what the sequencer uses to decide
/// whether a replacement should restart the rotation.
#[derive(Clone, Debug)]
pub struct ItemList {
    items: Arc<[TextItem]>,
}

impl ItemList {
    /// Build a list from items in display order
    #[must_use]
    pub fn new(items: Vec<TextItem>) -> Self {
        Self {
            items: items.into(),
        }
    }

    /// Number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// An empty list disables the engine
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at `index`, if any
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TextItem> {
        self.items.get(index)
    }

    /// Index that follows `index`, wrapping to 0
    #[must_use]
    pub fn next_index(&self, index: usize) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (index + 1) % self.items.len()
        }
    }

    /// Whether both handles point at the same storage
    #[must_use]
    pub fn same_list(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }

    /// Iterate in display order
    pub fn iter(&self) -> std::slice::Iter<'_, TextItem> {
        self.items.iter()
    }
}

impl Default for ItemList {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<Vec<TextItem>> for ItemList {
    fn from(items: Vec<TextItem>) -> Self {
        Self::new(items)
    }
}

impl Index<usize> for ItemList {
    type Output = TextItem;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}
