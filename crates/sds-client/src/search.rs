//! Search request types for the upstream `POST /sds/search/` endpoint.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sort order applied when the caller does not ask for one.
pub const DEFAULT_ORDER_BY: &str = "-id";

/// Field-targeted search criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedSearch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cas_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_code: Option<String>,
}

/// Full-text query flavour understood by the upstream index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    SimpleQueryString,
    Match,
    MatchPhrase,
}

/// Search body sent upstream. Absent fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced_search: Option<AdvancedSearch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_type: Option<SearchType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_revision_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_short_name: Option<String>,
    /// Restrict results to the current revision of each sheet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_current_version: Option<bool>,
}

impl SearchRequest {
    /// Fill in defaults and drop empty strings.
    pub fn normalized(mut self) -> Self {
        fn non_empty(s: Option<String>) -> Option<String> {
            s.filter(|s| !s.trim().is_empty())
        }
        self.search = non_empty(self.search);
        self.language_code = non_empty(self.language_code);
        self.region_short_name = non_empty(self.region_short_name);
        self.order_by = non_empty(self.order_by).or_else(|| Some(DEFAULT_ORDER_BY.to_string()));
        self
    }
}

/// Page selection forwarded as query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}
