//! Query parameter store: the single source of truth for search intent.
//!
//! Mirrors the browser URL's role in the search UI — mutations go through
//! [`QueryStore::set_param`], external navigation (back/forward, pasted links)
//! goes through [`QueryStore::navigate`], and interested parties subscribe to
//! a `watch` channel instead of polling. The store has no network or cache
//! side effects; it is pure state plus notification.

use crate::query::{Param, SearchQuery};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct QueryStore {
    tx: watch::Sender<SearchQuery>,
}

impl Default for QueryStore {
    fn default() -> Self {
        Self::new(SearchQuery::default())
    }
}

impl QueryStore {
    pub fn new(initial: SearchQuery) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Build a store from a navigation query string. Malformed values default
    /// silently, per [`SearchQuery::parse`].
    pub fn from_query_string(query_string: &str) -> Self {
        Self::new(SearchQuery::parse(query_string))
    }

    /// Snapshot of the current query.
    pub fn current(&self) -> SearchQuery {
        self.tx.borrow().clone()
    }

    /// The minimal shareable query string for the current state.
    pub fn query_string(&self) -> String {
        self.tx.borrow().to_query_string()
    }

    /// Subscribe to query changes. Subscribers see the latest value only —
    /// intermediate states during rapid mutation are coalesced, which is
    /// exactly what the fetch pipeline wants.
    pub fn subscribe(&self) -> watch::Receiver<SearchQuery> {
        self.tx.subscribe()
    }

    /// Apply a single parameter mutation. Resets `page` to 1 unless the
    /// mutated parameter is the page itself. No-op mutations do not notify.
    pub fn set_param(&self, param: Param) {
        self.tx.send_if_modified(|query| {
            let before = query.clone();
            query.apply(param);
            let changed = *query != before;
            if changed {
                debug!(query = query.to_query_string(), "query store updated");
            }
            changed
        });
    }

    /// Replace the whole query from a navigation event (back button, pasted
    /// URL). This is the one path where state flows from outside in.
    pub fn navigate(&self, query_string: &str) {
        let parsed = SearchQuery::parse(query_string);
        self.tx.send_if_modified(|query| {
            if *query == parsed {
                return false;
            }
            debug!(query = parsed.to_query_string(), "navigated to query");
            *query = parsed;
            true
        });
    }
}
