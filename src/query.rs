//! Canonical search query state and its query-string serialization.
//!
//! The query string is the shareable public surface of the search UI: keys
//! `q, category, device, res, video, premium, sort, page`, each omitted when
//! equal to its default so URLs stay minimal. Serialization uses a fixed key
//! order, so two queries that mean the same thing always produce the same
//! string — that string doubles as the result-cache key.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Result ordering accepted by the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Newest,
    Popular,
    Downloads,
    Random,
    Oldest,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Newest => "newest",
            SortBy::Popular => "popular",
            SortBy::Downloads => "downloads",
            SortBy::Random => "random",
            SortBy::Oldest => "oldest",
        }
    }

    /// Parse a sort value, falling back to the default for anything unknown.
    /// Bad URL params are never an error.
    pub fn parse_or_default(s: &str) -> Self {
        match s {
            "newest" => SortBy::Newest,
            "popular" => SortBy::Popular,
            "downloads" => SortBy::Downloads,
            "random" => SortBy::Random,
            "oldest" => SortBy::Oldest,
            _ => SortBy::default(),
        }
    }
}

/// The full search intent of the page: text, filters, sort, and page number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub category: String,
    pub device_type: String,
    pub resolution: String,
    pub video_only: bool,
    pub include_premium: bool,
    pub sort_by: SortBy,
    /// 1-based page number, never 0.
    pub page: u32,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            text: String::new(),
            category: String::new(),
            device_type: String::new(),
            resolution: String::new(),
            video_only: false,
            include_premium: false,
            sort_by: SortBy::default(),
            page: 1,
        }
    }
}

/// A single mutation applied through [`crate::store::QueryStore::set_param`].
///
/// Any mutation other than `Page` resets the page back to 1, since the old
/// page number is meaningless under new filters.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Text(String),
    Category(String),
    Device(String),
    Resolution(String),
    VideoOnly(bool),
    IncludePremium(bool),
    Sort(SortBy),
    Page(u32),
}

impl SearchQuery {
    /// Parse a query string (with or without a leading `?`).
    ///
    /// Missing keys take their defaults, malformed values fall back silently,
    /// unknown keys are ignored. Never fails.
    pub fn parse(query_string: &str) -> Self {
        let trimmed = query_string.strip_prefix('?').unwrap_or(query_string);
        let mut query = SearchQuery::default();
        for (key, value) in form_urlencoded::parse(trimmed.as_bytes()) {
            match key.as_ref() {
                "q" => query.text = value.trim().to_owned(),
                "category" => query.category = value.into_owned(),
                "device" => query.device_type = value.into_owned(),
                "res" => query.resolution = value.into_owned(),
                "video" => query.video_only = parse_flag(&value),
                "premium" => query.include_premium = parse_flag(&value),
                "sort" => query.sort_by = SortBy::parse_or_default(&value),
                "page" => query.page = value.parse::<u32>().unwrap_or(1).max(1),
                _ => {}
            }
        }
        query
    }

    /// Serialize to the minimal shareable query string, defaults omitted.
    pub fn to_query_string(&self) -> String {
        let mut ser = form_urlencoded::Serializer::new(String::new());
        if !self.text.is_empty() {
            ser.append_pair("q", &self.text);
        }
        if !self.category.is_empty() {
            ser.append_pair("category", &self.category);
        }
        if !self.device_type.is_empty() {
            ser.append_pair("device", &self.device_type);
        }
        if !self.resolution.is_empty() {
            ser.append_pair("res", &self.resolution);
        }
        if self.video_only {
            ser.append_pair("video", "true");
        }
        if self.include_premium {
            ser.append_pair("premium", "true");
        }
        if self.sort_by != SortBy::default() {
            ser.append_pair("sort", self.sort_by.as_str());
        }
        if self.page > 1 {
            ser.append_pair("page", &self.page.to_string());
        }
        ser.finish()
    }

    /// Deterministic cache key. Queries that serialize identically are the
    /// same query for caching purposes.
    pub fn canonical_key(&self) -> String {
        self.to_query_string()
    }

    /// Apply a single parameter mutation, resetting the page for any change
    /// that is not itself a page change.
    pub fn apply(&mut self, param: Param) {
        match param {
            Param::Text(text) => self.text = text.trim().to_owned(),
            Param::Category(c) => self.category = c,
            Param::Device(d) => self.device_type = d,
            Param::Resolution(r) => self.resolution = r,
            Param::VideoOnly(v) => self.video_only = v,
            Param::IncludePremium(p) => self.include_premium = p,
            Param::Sort(s) => self.sort_by = s,
            Param::Page(p) => {
                self.page = p.max(1);
                return;
            }
        }
        self.page = 1;
    }
}

/// Boolean URL flags: "true" and "1" are set, anything else is not.
fn parse_flag(value: &str) -> bool {
    matches!(value, "true" | "1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_query_serializes_empty() {
        assert_eq!(SearchQuery::default().to_query_string(), "");
    }

    #[test]
    fn text_only_query() {
        let query = SearchQuery {
            text: "nature".into(),
            ..Default::default()
        };
        assert_eq!(query.to_query_string(), "q=nature");
    }

    #[test]
    fn round_trip_is_identity() {
        let query = SearchQuery {
            text: "city lights".into(),
            category: "urban".into(),
            device_type: "desktop".into(),
            resolution: "4k".into(),
            video_only: true,
            include_premium: true,
            sort_by: SortBy::Popular,
            page: 3,
        };
        let reparsed = SearchQuery::parse(&query.to_query_string());
        assert_eq!(reparsed, query);
    }

    #[test]
    fn parse_accepts_leading_question_mark() {
        let query = SearchQuery::parse("?q=sunset&page=2");
        assert_eq!(query.text, "sunset");
        assert_eq!(query.page, 2);
    }

    #[test]
    fn default_sort_is_omitted() {
        let mut query = SearchQuery {
            sort_by: SortBy::Popular,
            ..Default::default()
        };
        assert_eq!(query.to_query_string(), "sort=popular");
        query.sort_by = SortBy::Newest;
        assert_eq!(query.to_query_string(), "");
    }

    #[test]
    fn malformed_values_fall_back_silently() {
        let query = SearchQuery::parse("page=zero&sort=loudest&video=maybe&bogus=1");
        assert_eq!(query.page, 1);
        assert_eq!(query.sort_by, SortBy::Newest);
        assert!(!query.video_only);
    }

    #[test]
    fn page_zero_clamps_to_one() {
        assert_eq!(SearchQuery::parse("page=0").page, 1);
    }

    #[test]
    fn equal_queries_share_a_canonical_key() {
        let a = SearchQuery::parse("q=ocean&premium=true");
        let b = SearchQuery::parse("premium=1&q=ocean");
        assert_eq!(a.canonical_key(), b.canonical_key());
    }

    #[test]
    fn apply_resets_page_except_for_page_changes() {
        let mut query = SearchQuery {
            page: 5,
            ..Default::default()
        };
        query.apply(Param::Page(7));
        assert_eq!(query.page, 7);
        query.apply(Param::Category("space".into()));
        assert_eq!(query.page, 1);
        assert_eq!(query.category, "space");
    }

    #[test]
    fn apply_trims_text() {
        let mut query = SearchQuery::default();
        query.apply(Param::Text("  mountains  ".into()));
        assert_eq!(query.text, "mountains");
    }

    #[test]
    fn text_with_spaces_round_trips() {
        let query = SearchQuery {
            text: "café noir".into(),
            ..Default::default()
        };
        let reparsed = SearchQuery::parse(&query.to_query_string());
        assert_eq!(reparsed.text, "café noir");
    }
}
