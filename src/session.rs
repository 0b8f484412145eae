//! Search session: wires the query store, cache, and fetch orchestrator into
//! one state machine and publishes render-ready state.
//!
//! The session task watches the store, consults the client (cache first,
//! network on miss), and publishes [`SessionState`] snapshots over a `watch`
//! channel. Renderers only ever see the result of the most recent query:
//! stale in-flight work is dropped the moment the store changes (which also
//! aborts its network call), and the orchestrator's cancellation token
//! discards any late response racing the switch. Both layers together, not
//! response filtering, provide the ordering guarantee.

use crate::client::{SearchClient, SearchOutcome};
use crate::model::ResultPage;
use crate::query::SearchQuery;
use crate::store::QueryStore;
use crate::suggest;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

const SUGGESTION_COUNT: usize = 3;

/// Render phase of the search page. Loading always resolves into `Ready`,
/// `Empty`, or `Failed` — never a silent forever-spinner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No query processed yet.
    Idle,
    /// A fetch is underway; `page` still holds the previous results.
    Loading,
    /// Results are current for `query`.
    Ready,
    /// The query matched nothing; show suggestions.
    Empty,
    /// The fetch failed; show the error affordance plus suggestions.
    Failed,
}

/// Snapshot handed to renderers.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub query: SearchQuery,
    pub phase: Phase,
    pub page: Arc<ResultPage>,
    /// Alternative terms, populated for `Empty` and `Failed`.
    pub suggestions: Vec<String>,
    /// True exactly when this snapshot follows a page-number change; the
    /// renderer resets scroll to top.
    pub scroll_to_top: bool,
    /// True while `page` belongs to an older query than `query`
    /// (stale-while-loading rendering).
    pub stale: bool,
}

impl SessionState {
    fn idle() -> Self {
        Self {
            query: SearchQuery::default(),
            phase: Phase::Idle,
            page: Arc::new(ResultPage::empty(1)),
            suggestions: Vec::new(),
            scroll_to_top: false,
            stale: false,
        }
    }
}

/// One search page's session. Owns the store subscription and the client.
pub struct SearchSession {
    store: QueryStore,
    client: Arc<SearchClient>,
    state_tx: watch::Sender<SessionState>,
}

impl SearchSession {
    pub fn new(store: QueryStore, client: Arc<SearchClient>) -> Self {
        let (state_tx, _) = watch::channel(SessionState::idle());
        Self {
            store,
            client,
            state_tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Drive the store → cache → fetch → publish loop until the store is
    /// dropped. The initial store value is processed immediately, so a fresh
    /// page load fetches its results without waiting for input.
    pub async fn run(self) {
        let mut store_rx = self.store.subscribe();
        let mut last_page_no: Option<u32> = None;
        info!("search session started");

        loop {
            let query = store_rx.borrow_and_update().clone();
            let page_changed = last_page_no.is_some_and(|page| page != query.page);

            self.state_tx.send_modify(|state| {
                state.query = query.clone();
                state.phase = Phase::Loading;
                state.stale = true;
                state.scroll_to_top = false;
                state.suggestions.clear();
            });

            tokio::select! {
                outcome = self.client.search(&query) => {
                    self.publish(&query, outcome, page_changed);
                    last_page_no = Some(query.page);
                    if store_rx.changed().await.is_err() {
                        break;
                    }
                }
                changed = store_rx.changed() => {
                    // A newer query arrived mid-fetch; dropping the search
                    // future aborts its request. Loop picks up the new query.
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        self.client.cancel_in_flight();
        info!("search session stopped");
    }

    fn publish(&self, query: &SearchQuery, outcome: SearchOutcome, scroll_to_top: bool) {
        let state = match outcome {
            SearchOutcome::Resolved { page, .. } => {
                let (phase, suggestions) = if page.is_empty() {
                    (Phase::Empty, suggest::alternatives(&query.text, SUGGESTION_COUNT))
                } else {
                    (Phase::Ready, Vec::new())
                };
                SessionState {
                    query: query.clone(),
                    phase,
                    page,
                    suggestions,
                    scroll_to_top,
                    stale: false,
                }
            }
            // Superseded mid-switch; the newer query's pass publishes instead.
            SearchOutcome::Cancelled => return,
            SearchOutcome::Failed { error } => {
                warn!(query = query.to_query_string(), error = %error, "search failed");
                SessionState {
                    query: query.clone(),
                    phase: Phase::Failed,
                    page: Arc::new(ResultPage::empty(query.page)),
                    suggestions: suggest::alternatives(&query.text, SUGGESTION_COUNT),
                    scroll_to_top,
                    stale: false,
                }
            }
        };
        self.state_tx.send_replace(state);
    }
}
