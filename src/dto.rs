use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::ai::FilterExtraction;

/// Page size limits applied to every listing request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSettings {
    /// Page size used when a request does not ask for one
    pub default_per_page: u32,
    /// Largest page size a request may ask for
    pub max_per_page: u32,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            default_per_page: 24,
            max_per_page: 100,
        }
    }
}

/// Parses a page number the way browsers send them
///
/// Accepts integers and decimal strings (truncated); anything else is `None`.
fn parse_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite() && n.abs() < i64::MAX as f64)
            .map(|n| n.trunc() as i64)
    })
}

/// Reads a JSON number or numeric string as an integer
fn value_to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && f.abs() < i64::MAX as f64).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_int(s),
        _ => None,
    }
}

/// A validated page request
///
/// `page` is 1-based and always at least 1; `per_page` is always within
/// `1..=max_per_page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    /// Builds a page request, falling back to defaults for missing or invalid values
    pub fn new(page: Option<i64>, per_page: Option<i64>, settings: PageSettings) -> Self {
        let page = page
            .filter(|p| *p >= 1)
            .map(|p| p.min(u32::MAX as i64) as u32)
            .unwrap_or(1);
        let per_page = per_page
            .filter(|p| *p >= 1)
            .map(|p| p.min(settings.max_per_page as i64) as u32)
            .unwrap_or(settings.default_per_page);
        Self { page, per_page }
    }

    /// Builds a page request from raw query-string values
    pub fn from_raw(page: Option<&str>, per_page: Option<&str>, settings: PageSettings) -> Self {
        Self::new(page.and_then(parse_int), per_page.and_then(parse_int), settings)
    }

    /// Builds a page request from loosely typed JSON body values
    pub fn from_values(page: Option<&Value>, per_page: Option<&Value>, settings: PageSettings) -> Self {
        Self::new(page.and_then(value_to_int), per_page.and_then(value_to_int), settings)
    }

    /// Number of rows to skip
    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }

    /// Number of rows to load
    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }

    /// Builds the response metadata for a result set of `total` rows
    pub fn meta(&self, total: i64) -> PageMeta {
        PageMeta {
            page: self.page,
            per_page: self.per_page,
            total: total.max(0),
            total_pages: total_pages(total, self.per_page),
        }
    }
}

/// `ceil(total / per_page)`, zero for an empty result
pub fn total_pages(total: i64, per_page: u32) -> i64 {
    if total <= 0 || per_page == 0 {
        return 0;
    }
    let per_page = per_page as i64;
    (total + per_page - 1) / per_page
}

/// Pagination metadata returned with every listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: i64,
}

/// A page of results
///
/// `filters` is only present on AI searches, where it echoes what the model
/// extracted from the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<FilterExtraction>,
}

/// A single resource wrapped as `{ "data": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// Query parameters for `GET /api/clothes`
///
/// Page values are kept as strings so a malformed number falls back to the
/// default instead of rejecting the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListClothesQuery {
    pub page: Option<String>,
    #[serde(alias = "per_page")]
    pub per_page: Option<String>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub search: Option<String>,
    pub owner: Option<String>,
}

impl fmt::Display for ListClothesQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "page: {:?}, per_page: {:?}, category: {:?}, color: {:?}, search: {:?}, owner: {:?}",
            self.page, self.per_page, self.category, self.color, self.search, self.owner
        )
    }
}

/// Request body for `POST /api/ai/query`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AiQueryDto {
    /// The free-text search prompt
    pub prompt: String,
    pub page: Option<Value>,
    #[serde(alias = "per_page")]
    pub per_page: Option<Value>,
    /// Explicit color that narrows whatever the model extracted
    pub color: Option<String>,
}
