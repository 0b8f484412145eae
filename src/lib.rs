//! Client-side search core for a wallpaper-distribution site.
//!
//! The crate implements the query de-duplication and cache layer behind the
//! search UI: a canonical query-parameter store, a debounced input adapter,
//! a bounded TTL result cache, a fetch orchestrator with cooperative
//! cancellation, and a grid planner for lazy image loading. All persistence,
//! ranking, and authentication live in the remote search endpoint; this crate
//! owns only the client-side state machine between user input and rendered
//! results.

pub mod cache;
pub mod client;
pub mod config;
pub mod debounce;
pub mod grid;
pub mod input;
pub mod model;
pub mod query;
pub mod session;
pub mod store;
pub mod suggest;

pub use cache::{CacheConfig, ResultCache};
pub use client::errors::SearchError;
pub use client::{SearchClient, SearchOutcome};
pub use config::SearchConfig;
pub use model::{ResultPage, WallpaperSummary};
pub use query::{Param, SearchQuery, SortBy};
pub use session::{Phase, SearchSession, SessionState};
pub use store::QueryStore;
