//! Catalog filters
//!
//! `ItemFilter` is the one description of "which items" that the repository
//! turns into SQL. It is built either from the query string of a listing
//! request or from the filter extraction a language model produced for a
//! free-text prompt.

use std::fmt;

use crate::ai::FilterExtraction;
use crate::dto::ListClothesQuery;
use crate::models::{normalize_colors, Category};
use crate::tags::normalize_tag;

/// Upper bound on distinct search terms in one request
pub const MAX_TERMS: usize = 10;

/// Which clothing items a listing should return
///
/// Empty lists and `None` values mean "no constraint". Lists of
/// alternatives (`categories`, `colors`, `sizes`) match any entry; lists of
/// requirements (`terms`, `tags`) must all match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFilter {
    pub categories: Vec<Category>,
    pub colors: Vec<String>,
    pub terms: Vec<String>,
    pub tags: Vec<String>,
    pub brand: Option<String>,
    pub sizes: Vec<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub owner_id: Option<String>,
}

fn is_wildcard(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("all")
}

fn push_unique<T: PartialEq>(values: &mut Vec<T>, value: T) {
    if !values.contains(&value) {
        values.push(value);
    }
}

/// Splits free text into lower-case search terms
fn split_terms(text: &str) -> Vec<String> {
    let mut terms = Vec::new();
    for term in text.split_whitespace() {
        push_unique(&mut terms, term.to_lowercase());
    }
    terms
}

impl ItemFilter {
    /// Builds filters from the `category`, `color`, `search` and `owner`
    /// query parameters
    ///
    /// `category` must name a category (a canonical name or a garment word
    /// such as `jeans`); `all` or an empty value means no category filter.
    /// A search of more than [`MAX_TERMS`] distinct words is rejected.
    pub fn from_query(query: &ListClothesQuery) -> Result<Self, String> {
        let mut filter = ItemFilter::default();

        if let Some(raw) = query.category.as_deref().map(str::trim).filter(|c| !is_wildcard(c)) {
            let category = raw
                .parse::<Category>()
                .ok()
                .or_else(|| Category::parse_lenient(raw))
                .ok_or_else(|| format!("Unknown category: {}", raw))?;
            filter.categories.push(category);
        }

        filter = filter.with_color(query.color.as_deref());

        if let Some(search) = query.search.as_deref() {
            let terms = split_terms(search);
            if terms.len() > MAX_TERMS {
                return Err(format!("Search is limited to {} words", MAX_TERMS));
            }
            filter.terms = terms;
        }

        filter.owner_id = query
            .owner
            .as_deref()
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string);

        Ok(filter)
    }

    /// Translates what a language model extracted from a search prompt
    ///
    /// Unknown categories and malformed tags are dropped rather than failing
    /// the search. At most [`MAX_TERMS`] keyword terms are kept, in the
    /// order the model listed them. Keywords that only restate an extracted color or category
    /// are not kept as search terms, since the model usually repeats them.
    /// A negative price bound is ignored, and an inverted range is ignored
    /// entirely.
    pub fn from_extraction(extraction: &FilterExtraction) -> Self {
        let mut filter = ItemFilter::default();

        for raw in &extraction.categories {
            if let Some(category) = Category::parse_lenient(raw) {
                push_unique(&mut filter.categories, category);
            }
        }

        filter.colors = normalize_colors(&extraction.colors);

        for keyword in &extraction.keywords {
            for term in split_terms(keyword) {
                let restates_color = filter.colors.contains(&term);
                let restates_category = Category::parse_lenient(&term)
                    .is_some_and(|c| filter.categories.contains(&c));
                if !restates_color && !restates_category && filter.terms.len() < MAX_TERMS {
                    push_unique(&mut filter.terms, term);
                }
            }
        }

        for raw in &extraction.tags {
            if let Some(tag) = normalize_tag(raw) {
                push_unique(&mut filter.tags, tag);
            }
        }

        filter.brand = extraction
            .brand
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string);

        for size in &extraction.sizes {
            let size = size.trim();
            if !size.is_empty() {
                push_unique(&mut filter.sizes, size.to_string());
            }
        }

        let min_price = extraction.min_price.filter(|p| *p >= 0.0);
        let max_price = extraction.max_price.filter(|p| *p >= 0.0);
        match (min_price, max_price) {
            (Some(min), Some(max)) if min > max => {}
            (min, max) => {
                filter.min_price = min;
                filter.max_price = max;
            }
        }

        filter
    }

    /// Narrows the filter to one explicit color
    ///
    /// A blank color or `all` leaves the filter unchanged.
    pub fn with_color(mut self, color: Option<&str>) -> Self {
        if let Some(color) = color.map(str::trim).filter(|c| !is_wildcard(c)) {
            self.colors = vec![color.to_lowercase()];
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == ItemFilter::default()
    }
}

impl fmt::Display for ItemFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "categories: {:?}, colors: {:?}, terms: {:?}, tags: {:?}, brand: {:?}, sizes: {:?}, price: {:?}..{:?}, owner: {:?}",
            self.categories,
            self.colors,
            self.terms,
            self.tags,
            self.brand,
            self.sizes,
            self.min_price,
            self.max_price,
            self.owner_id
        )
    }
}

/// Escapes `\`, `%` and `_` for a LIKE pattern using `\` as the escape character
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// LIKE pattern matching `value` anywhere in a column
pub fn contains_pattern(value: &str) -> String {
    format!("%{}%", escape_like(value))
}

/// LIKE pattern matching `value` as a whole entry of a JSON string array column
pub fn json_member_pattern(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    format!("%{}%", escape_like(&quoted))
}
