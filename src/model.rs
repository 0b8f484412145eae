//! Result data model shared by the cache, client, grid, and session layers.

use serde::{Deserialize, Serialize};

/// A single wallpaper in a result page. Immutable once fetched.
///
/// Only the fields this crate acts on are typed; everything else the endpoint
/// sends (resolutions, premium flags, author info) is carried opaquely in
/// `extra` so renderers downstream can use it without this crate caring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WallpaperSummary {
    pub id: String,
    pub thumbnail_url: String,
    pub title: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One page of search results as returned by the search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage {
    pub items: Vec<WallpaperSummary>,
    pub total_count: u32,
    pub total_pages: u32,
    pub current_page: u32,
}

impl ResultPage {
    /// An empty page, used for the failed-fetch path so renderers always have
    /// something well-formed to display.
    pub fn empty(current_page: u32) -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            total_pages: 0,
            current_page,
        }
    }

    /// True when the query matched nothing at all.
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }
}
