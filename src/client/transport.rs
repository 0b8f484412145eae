//! Network transport behind the search client.
//!
//! The orchestrator only needs "send this request, give me a page or an
//! error", so the transport is a trait: [`HttpTransport`] for production,
//! plain structs in tests. Cancellation and timeouts live in the orchestrator;
//! a transport future that gets dropped must simply stop.

use crate::client::errors::SearchError;
use crate::client::wire::{SearchRequest, decode_envelope};
use crate::model::ResultPage;
use anyhow::Context;
use async_trait::async_trait;
use url::Url;

#[async_trait]
pub trait SearchTransport: Send + Sync {
    async fn fetch_page(&self, request: &SearchRequest) -> Result<ResultPage, SearchError>;
}

/// Production transport: POST RPC with bearer auth against the search
/// endpoint.
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: Url,
    bearer_token: Option<String>,
}

impl HttpTransport {
    pub fn new(endpoint: Url, bearer_token: Option<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("wallsearch/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            endpoint,
            bearer_token,
        })
    }
}

#[async_trait]
impl SearchTransport for HttpTransport {
    async fn fetch_page(&self, request: &SearchRequest) -> Result<ResultPage, SearchError> {
        let mut req = self.http.post(self.endpoint.clone()).json(request);
        if let Some(token) = &self.bearer_token {
            req = req.bearer_auth(token);
        }

        let response = req
            .send()
            .await
            .with_context(|| format!("Search request to {} failed", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                url: self.endpoint.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .context("Failed to read search response body")?;
        decode_envelope(&body, status.as_u16(), self.endpoint.as_str())
    }
}
