//! Wire types and JSON decoding for the search endpoint.
//!
//! The endpoint is a POST-style RPC: the request carries the query text,
//! filters, pagination, and sort; the response wraps a page of wallpapers in
//! a `data` envelope. Decode failures report the serde path and a snippet of
//! the offending line, since "failed to parse response" alone is useless when
//! the endpoint changes shape under us.

use crate::client::errors::SearchError;
use crate::model::ResultPage;
use crate::query::SearchQuery;
use serde::{Deserialize, Serialize};

/// RPC request body for the search endpoint.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    pub filters: SearchFilters,
    pub page: u32,
    pub limit: u32,
    pub sort_by: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    pub show_premium: bool,
    pub video_only: bool,
}

impl SearchRequest {
    /// Build the RPC body from a query, clamping the page size to what the
    /// endpoint accepts.
    pub fn from_query(query: &SearchQuery, page_size: u32) -> Self {
        let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_owned());
        Self {
            query: query.text.clone(),
            filters: SearchFilters {
                category: non_empty(&query.category),
                device_type: non_empty(&query.device_type),
                resolution: non_empty(&query.resolution),
                show_premium: query.include_premium,
                video_only: query.video_only,
            },
            page: query.page.max(1),
            limit: page_size.clamp(1, 100),
            sort_by: query.sort_by.as_str().to_owned(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    data: SearchData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchData {
    wallpapers: Vec<crate::model::WallpaperSummary>,
    total_count: u32,
    total_pages: u32,
    current_page: u32,
}

/// Decode a response body into a [`ResultPage`].
pub fn decode_envelope(body: &str, status: u16, url: &str) -> Result<ResultPage, SearchError> {
    let envelope: SearchEnvelope =
        parse_json_with_context(body).map_err(|source| SearchError::Decode {
            status,
            url: url.to_owned(),
            source,
        })?;
    let data = envelope.data;
    Ok(ResultPage {
        items: data.wallpapers,
        total_count: data.total_count,
        total_pages: data.total_pages,
        current_page: data.current_page,
    })
}

/// Parse JSON and, on failure, include the serde path plus a caret-marked
/// snippet of the line where the error occurred.
fn parse_json_with_context<T: serde::de::DeserializeOwned>(body: &str) -> anyhow::Result<T> {
    let jd = &mut serde_json::Deserializer::from_str(body);
    match serde_path_to_error::deserialize(jd) {
        Ok(value) => Ok(value),
        Err(err) => {
            let inner = err.inner();
            let (line, column) = (inner.line(), inner.column());
            let path = err.path().to_string();

            let mut message = String::new();
            if !path.is_empty() && path != "." {
                message.push_str(&format!("at path '{path}': "));
            }
            message.push_str(&format!("{inner}\n{}", snippet_at(body, line, column, 40)));
            Err(anyhow::anyhow!(message))
        }
    }
}

/// A `context_len`-wide slice of the failing line with a caret under the
/// error column. Window edges are pulled onto char boundaries so non-ASCII
/// content near the error never makes the slice itself fail.
fn snippet_at(body: &str, line: usize, column: usize, context_len: usize) -> String {
    let target = body.lines().nth(line.saturating_sub(1)).unwrap_or("");
    if target.is_empty() {
        return "(empty line)".to_string();
    }
    let error_idx = prev_char_boundary(target, column.saturating_sub(1).min(target.len()));
    let half = context_len / 2;
    let start = prev_char_boundary(target, error_idx.saturating_sub(half));
    let end = next_char_boundary(target, (error_idx + half).min(target.len()));
    let caret = " ".repeat(target[start..error_idx].chars().count()) + "^";
    format!("...{}...\n   {caret}", &target[start..end])
}

fn prev_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn next_char_boundary(s: &str, mut idx: usize) -> usize {
    while idx < s.len() && !s.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}
