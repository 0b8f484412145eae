//! Result grid planning: lazy image loading, neighbor prefetch, pagination.
//!
//! The planner is deliberately free of DOM concerns. Viewport proximity and
//! persistent storage come in through the [`ViewportObserver`] and
//! [`KeyValueStore`] traits, so the whole layer is testable without a
//! browser. The first few items load eagerly to avoid layout jank on initial
//! paint; the rest wait until they near the viewport. Prefetch is best-effort
//! only — it never blocks visible loads and its failures are swallowed.

use crate::model::ResultPage;
use futures::future::join_all;
use std::future::Future;
use tracing::debug;

/// How many leading items load eagerly on initial paint.
pub const DEFAULT_EAGER_COUNT: usize = 8;
/// How far around a loading item the prefetcher reaches.
const PREFETCH_RADIUS: usize = 2;
/// Pagination window width.
const PAGE_WINDOW: u32 = 5;

/// Reports which item indices are near the visible viewport.
/// Production wires this to an intersection observer; tests return fixed sets.
pub trait ViewportObserver {
    fn near_viewport(&self, item_count: usize) -> Vec<usize>;
}

/// Minimal persistent key-value storage (localStorage in the browser).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// Image load state for one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Load immediately on first paint.
    Eager,
    /// Wait for viewport proximity.
    Deferred,
    /// Proximity reached; the image request is (or should be) underway.
    Triggered,
}

#[derive(Debug, Clone)]
pub struct GridItem {
    pub index: usize,
    pub id: String,
    pub thumbnail_url: String,
    pub state: LoadState,
}

/// Load plan for one page of results.
#[derive(Debug)]
pub struct GridPlan {
    items: Vec<GridItem>,
}

impl GridPlan {
    /// Plan a page: the first `eager_count` items load eagerly, the rest are
    /// deferred until [`observe`](Self::observe) brings them near.
    pub fn for_page(page: &ResultPage, eager_count: usize) -> Self {
        let items = page
            .items
            .iter()
            .enumerate()
            .map(|(index, wallpaper)| GridItem {
                index,
                id: wallpaper.id.clone(),
                thumbnail_url: wallpaper.thumbnail_url.clone(),
                state: if index < eager_count {
                    LoadState::Eager
                } else {
                    LoadState::Deferred
                },
            })
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[GridItem] {
        &self.items
    }

    /// Apply a viewport reading: deferred items near the viewport become
    /// triggered. Returns the newly triggered indices so the host can start
    /// their image requests.
    pub fn observe(&mut self, observer: &dyn ViewportObserver) -> Vec<usize> {
        let mut newly = Vec::new();
        for index in observer.near_viewport(self.items.len()) {
            if let Some(item) = self.items.get_mut(index)
                && item.state == LoadState::Deferred
            {
                item.state = LoadState::Triggered;
                newly.push(index);
            }
        }
        if !newly.is_empty() {
            debug!(count = newly.len(), "grid items triggered by viewport");
        }
        newly
    }

    /// Thumbnail URLs of still-deferred items adjacent to anything already
    /// loading, in index order, deduplicated. Best-effort candidates only.
    pub fn prefetch_neighbors(&self) -> PrefetchPlan {
        let mut urls = Vec::new();
        for item in &self.items {
            if item.state == LoadState::Deferred {
                continue;
            }
            let lo = item.index.saturating_sub(PREFETCH_RADIUS);
            let hi = (item.index + PREFETCH_RADIUS).min(self.items.len().saturating_sub(1));
            for neighbor in &self.items[lo..=hi] {
                if neighbor.state == LoadState::Deferred
                    && !urls.contains(&neighbor.thumbnail_url)
                {
                    urls.push(neighbor.thumbnail_url.clone());
                }
            }
        }
        PrefetchPlan { urls }
    }
}

/// URLs worth warming the image cache with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefetchPlan {
    pub urls: Vec<String>,
}

/// Run a prefetch plan through `fetch`. Failures are logged at debug and
/// otherwise ignored; this must never surface an error or delay anything.
pub async fn run_prefetch<F, Fut>(plan: PrefetchPlan, fetch: F)
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    let attempts = plan.urls.into_iter().map(|url| {
        let request = fetch(url.clone());
        async move { (url, request.await) }
    });
    for (url, result) in join_all(attempts).await {
        if let Err(error) = result {
            debug!(url, error = %error, "prefetch skipped");
        }
    }
}

/// Pagination window: up to [`PAGE_WINDOW`] page numbers around the current
/// page, plus prev/next enablement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    pub pages: Vec<u32>,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

pub fn page_window(current: u32, total_pages: u32) -> PageWindow {
    if total_pages == 0 {
        return PageWindow {
            pages: Vec::new(),
            prev_enabled: false,
            next_enabled: false,
        };
    }
    let current = current.clamp(1, total_pages);
    let end = (current.saturating_add(PAGE_WINDOW / 2))
        .max(PAGE_WINDOW)
        .min(total_pages);
    let start = end.saturating_sub(PAGE_WINDOW - 1).max(1);
    PageWindow {
        pages: (start..=end).collect(),
        prev_enabled: current > 1,
        next_enabled: current < total_pages,
    }
}

/// Grid/list display mode, persisted across visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

const VIEW_MODE_KEY: &str = "wallsearch:view-mode";

impl ViewMode {
    fn as_str(self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }
}

/// Load the persisted view mode, defaulting to grid for anything missing or
/// unrecognized.
pub fn load_view_mode(store: &dyn KeyValueStore) -> ViewMode {
    match store.get(VIEW_MODE_KEY).as_deref() {
        Some("list") => ViewMode::List,
        _ => ViewMode::Grid,
    }
}

pub fn store_view_mode(store: &mut dyn KeyValueStore, mode: ViewMode) {
    store.set(VIEW_MODE_KEY, mode.as_str().to_owned());
}
