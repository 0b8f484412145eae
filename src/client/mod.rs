//! Fetch orchestrator: cache consult, request cancellation, and the
//! per-request state machine.
//!
//! At most one request is in flight per client instance. Starting a new fetch
//! cancels the previous one through its `CancellationToken`; the superseded
//! call resolves to [`SearchOutcome::Cancelled`] and touches no shared state.
//! A request that outlives its cancellation (network response racing the
//! token) is likewise discarded before it can write to the cache.

pub mod errors;
pub mod transport;
pub mod wire;

use crate::cache::{CacheConfig, ResultCache};
use crate::client::errors::SearchError;
use crate::client::transport::{HttpTransport, SearchTransport};
use crate::client::wire::SearchRequest;
use crate::config::SearchConfig;
use crate::model::ResultPage;
use crate::query::SearchQuery;
use anyhow::Context;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const SLOW_SEARCH_THRESHOLD: Duration = Duration::from_secs(3);

/// Terminal state of one `search` call.
#[derive(Debug)]
pub enum SearchOutcome {
    Resolved {
        page: Arc<ResultPage>,
        from_cache: bool,
    },
    /// Superseded by a newer query. Expected; callers render nothing.
    Cancelled,
    /// Genuine failure (network, status, decode, timeout). Callers render an
    /// empty page plus an error affordance; the error never propagates as a
    /// panic or unhandled rejection.
    Failed { error: SearchError },
}

impl SearchOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SearchOutcome::Cancelled)
    }
}

/// Search client: result cache plus single-slot request canceller.
///
/// Construct one per page/session. The cache is an owned field, not a global,
/// so tests and parallel sessions never share state.
pub struct SearchClient {
    transport: Arc<dyn SearchTransport>,
    cache: Mutex<ResultCache>,
    current: Mutex<CancellationToken>,
    page_size: u32,
    timeout: Duration,
}

impl SearchClient {
    pub fn new(
        transport: Arc<dyn SearchTransport>,
        cache_config: CacheConfig,
        page_size: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            cache: Mutex::new(ResultCache::new(cache_config)),
            current: Mutex::new(CancellationToken::new()),
            page_size,
            timeout,
        }
    }

    /// Build a production client from configuration.
    pub fn from_config(config: &SearchConfig) -> anyhow::Result<Self> {
        let endpoint = url::Url::parse(&config.endpoint)
            .with_context(|| format!("Invalid search endpoint: {}", config.endpoint))?;
        let transport = HttpTransport::new(endpoint, config.bearer_token.clone())?;
        Ok(Self::new(
            Arc::new(transport),
            config.cache_config(),
            config.page_size,
            config.request_timeout(),
        ))
    }

    /// Execute a search: `idle → in_flight → {resolved | cancelled | failed}`.
    ///
    /// 1. Cache hit resolves immediately with no network I/O.
    /// 2. Miss cancels any in-flight request before issuing a new one.
    /// 3. Success populates the cache under the canonical key.
    pub async fn search(&self, query: &SearchQuery) -> SearchOutcome {
        let key = query.canonical_key();

        if let Some(page) = self.cache.lock().expect("cache lock").get(&key) {
            debug!(key, "search cache hit");
            return SearchOutcome::Resolved {
                page,
                from_cache: true,
            };
        }

        // Supersede whatever is in flight and claim the slot.
        let token = {
            let mut current = self.current.lock().expect("token lock");
            current.cancel();
            *current = CancellationToken::new();
            current.clone()
        };

        let request = SearchRequest::from_query(query, self.page_size);
        let started = Instant::now();

        let result = tokio::select! {
            _ = token.cancelled() => {
                debug!(key, "in-flight search superseded");
                return SearchOutcome::Cancelled;
            }
            result = tokio::time::timeout(self.timeout, self.transport.fetch_page(&request)) => {
                match result {
                    Ok(inner) => inner,
                    Err(_elapsed) => Err(SearchError::Timeout(self.timeout)),
                }
            }
        };
        let elapsed = started.elapsed();
        if elapsed > SLOW_SEARCH_THRESHOLD {
            warn!(key, duration = format!("{elapsed:.2?}"), "slow search fetch");
        }

        match result {
            Ok(page) => {
                // The response may race the cancellation signal; a cancelled
                // request must not write to the cache.
                if token.is_cancelled() {
                    debug!(key, "late response for superseded search discarded");
                    return SearchOutcome::Cancelled;
                }
                let page = Arc::new(page);
                self.cache
                    .lock()
                    .expect("cache lock")
                    .put(key, page.clone());
                SearchOutcome::Resolved {
                    page,
                    from_cache: false,
                }
            }
            Err(error) if error.is_cancellation() => SearchOutcome::Cancelled,
            Err(error) => {
                warn!(key, error = %error, "search fetch failed");
                SearchOutcome::Failed { error }
            }
        }
    }

    /// Cancel any in-flight request without starting a new one. Used when the
    /// session shuts down mid-fetch.
    pub fn cancel_in_flight(&self) {
        self.current.lock().expect("token lock").cancel();
    }

    /// Number of cached result pages, for diagnostics.
    pub fn cached_pages(&self) -> usize {
        self.cache.lock().expect("cache lock").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingTransport {
        calls: AtomicU32,
        total_count: u32,
    }

    impl CountingTransport {
        fn new(total_count: u32) -> Self {
            Self {
                calls: AtomicU32::new(0),
                total_count,
            }
        }
    }

    #[async_trait]
    impl SearchTransport for CountingTransport {
        async fn fetch_page(&self, request: &SearchRequest) -> Result<ResultPage, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ResultPage {
                items: Vec::new(),
                total_count: self.total_count,
                total_pages: 1,
                current_page: request.page,
            })
        }
    }

    fn client_with(transport: Arc<dyn SearchTransport>) -> SearchClient {
        SearchClient::new(
            transport,
            CacheConfig::default(),
            24,
            Duration::from_secs(12),
        )
    }

    #[tokio::test]
    async fn second_search_within_ttl_hits_cache() {
        let transport = Arc::new(CountingTransport::new(7));
        let client = client_with(transport.clone());
        let query = SearchQuery::parse("q=nature");

        let first = client.search(&query).await;
        let SearchOutcome::Resolved { from_cache, .. } = first else {
            panic!("expected resolved outcome");
        };
        assert!(!from_cache);

        let second = client.search(&query).await;
        let SearchOutcome::Resolved { from_cache, page } = second else {
            panic!("expected resolved outcome");
        };
        assert!(from_cache);
        assert_eq!(page.total_count, 7);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn equivalent_queries_share_one_fetch() {
        let transport = Arc::new(CountingTransport::new(0));
        let client = client_with(transport.clone());

        client.search(&SearchQuery::parse("q=ocean&premium=true")).await;
        client.search(&SearchQuery::parse("premium=1&q=ocean")).await;
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_refetches() {
        let transport = Arc::new(CountingTransport::new(0));
        let client = SearchClient::new(
            transport.clone(),
            CacheConfig {
                ttl: Duration::from_secs(60),
                capacity: 10,
            },
            24,
            Duration::from_secs(12),
        );
        let query = SearchQuery::parse("q=dunes");

        client.search(&query).await;
        tokio::time::advance(Duration::from_secs(61)).await;
        client.search(&query).await;
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
    }

    struct FailingTransport;

    #[async_trait]
    impl SearchTransport for FailingTransport {
        async fn fetch_page(&self, _request: &SearchRequest) -> Result<ResultPage, SearchError> {
            Err(SearchError::Status {
                status: 502,
                url: "https://api/search".into(),
            })
        }
    }

    #[tokio::test]
    async fn failure_surfaces_without_caching() {
        let client = client_with(Arc::new(FailingTransport));
        let outcome = client.search(&SearchQuery::parse("q=x")).await;
        assert!(matches!(
            outcome,
            SearchOutcome::Failed {
                error: SearchError::Status { status: 502, .. }
            }
        ));
        assert_eq!(client.cached_pages(), 0);
    }

    struct SlowTransport;

    #[async_trait]
    impl SearchTransport for SlowTransport {
        async fn fetch_page(&self, request: &SearchRequest) -> Result<ResultPage, SearchError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(ResultPage::empty(request.page))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_times_out_into_failed() {
        let client = SearchClient::new(
            Arc::new(SlowTransport),
            CacheConfig::default(),
            24,
            Duration::from_secs(12),
        );
        let outcome = client.search(&SearchQuery::parse("q=slow")).await;
        assert!(matches!(
            outcome,
            SearchOutcome::Failed {
                error: SearchError::Timeout(_)
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn newer_search_cancels_in_flight_request() {
        let client = Arc::new(SearchClient::new(
            Arc::new(SlowTransport),
            CacheConfig::default(),
            24,
            Duration::from_secs(60),
        ));

        let first = {
            let client = client.clone();
            tokio::spawn(async move { client.search(&SearchQuery::parse("q=a")).await })
        };
        // Let the first request reach its await point before superseding it.
        tokio::task::yield_now().await;

        let second = {
            let client = client.clone();
            tokio::spawn(async move { client.search(&SearchQuery::parse("q=b")).await })
        };

        let first = first.await.unwrap();
        assert!(first.is_cancelled(), "superseded request should cancel");

        tokio::time::advance(Duration::from_secs(31)).await;
        let second = second.await.unwrap();
        assert!(matches!(second, SearchOutcome::Resolved { .. }));
        // Only the surviving request's page is cached.
        assert_eq!(client.cached_pages(), 1);
    }
}
