use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Pulls the JSON object out of a model reply
///
/// Replies are asked to be bare JSON, but models still wrap them in Markdown
/// fences or a sentence of prose. The outermost `{ ... }` span is parsed; any
/// reply without a JSON object in it yields `None`.
pub fn parse_model_json(content: &str) -> Option<Map<String, Value>> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end < start {
        return None;
    }
    match serde_json::from_str::<Value>(&content[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Collects the values of every listed key as strings
///
/// A string value is split on commas, an array keeps its string and number
/// elements, anything else is ignored. Blank entries are dropped.
fn string_list(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    for key in keys {
        match obj.get(*key) {
            Some(Value::String(s)) => out.extend(s.split(',').map(str::to_string)),
            Some(Value::Array(values)) => {
                for value in values {
                    match value {
                        Value::String(s) => out.push(s.clone()),
                        Value::Number(n) => out.push(n.to_string()),
                        _ => {}
                    }
                }
            }
            _ => continue,
        }
    }
    out.into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Reads the first present key as a single string
///
/// Arrays contribute their first string element.
fn string_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| match obj.get(*key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Array(values)) => values.iter().find_map(|v| v.as_str().map(str::to_string)),
            _ => None,
        })
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Reads the first present key as a number, accepting numeric strings like `"$40"`
fn number_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| match obj.get(*key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s
            .trim()
            .trim_start_matches(['$', '€', '£'])
            .replace(',', "")
            .parse::<f64>()
            .ok(),
        _ => None,
    })
    .filter(|n| n.is_finite())
}

/// Structured search intent a language model produced from a free-text prompt
///
/// Every field is optional. Fields the model omitted, or returned in a shape
/// that cannot be read, stay empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterExtraction {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sizes: Vec<String>,
}

impl FilterExtraction {
    /// Reads an extraction from an already parsed JSON object
    pub fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            categories: string_list(obj, &["category", "categories"]),
            colors: string_list(obj, &["color", "colors", "colour", "colours"]),
            keywords: string_list(obj, &["keywords", "keyword", "search", "query"]),
            tags: string_list(obj, &["tags", "tag"]),
            brand: string_field(obj, &["brand"]),
            min_price: number_field(obj, &["minPrice", "min_price", "priceMin"]),
            max_price: number_field(obj, &["maxPrice", "max_price", "priceMax"]),
            sizes: string_list(obj, &["sizes", "size"]),
        }
    }

    /// Reads an extraction from a raw model reply
    ///
    /// A reply that does not contain a JSON object is treated as an empty
    /// extraction, so the search runs without filters instead of failing.
    pub fn from_model_output(content: &str) -> Self {
        match parse_model_json(content) {
            Some(obj) => Self::from_object(&obj),
            None => {
                warn!("Model reply was not a JSON object, using empty filters");
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Garment attributes a vision model reported for an uploaded photo
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisionExtraction {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub primary_color: Option<String>,
    pub colors: Vec<String>,
    pub garment_types: Vec<String>,
    pub patterns: Vec<String>,
    pub graphics: Vec<String>,
    pub materials: Vec<String>,
    pub features: Vec<String>,
    pub styles: Vec<String>,
    pub seasons: Vec<String>,
    pub brand: Option<String>,
    /// The object exactly as the model returned it
    pub raw: Value,
}

impl VisionExtraction {
    /// Reads an extraction from an already parsed JSON object
    pub fn from_object(obj: Map<String, Value>) -> Self {
        Self {
            name: string_field(&obj, &["name", "title"]),
            category: string_field(&obj, &["category"]),
            description: string_field(&obj, &["description", "summary"]),
            primary_color: string_field(&obj, &["primaryColor", "primary_color", "color", "colour"]),
            colors: string_list(&obj, &["colors", "colours"]),
            garment_types: string_list(&obj, &["type", "garmentType", "garment_type", "types"]),
            patterns: string_list(&obj, &["pattern", "patterns"]),
            graphics: string_list(&obj, &["graphic", "graphics", "print", "prints"]),
            materials: string_list(&obj, &["material", "materials", "fabric"]),
            features: string_list(&obj, &["features", "feature", "details"]),
            styles: string_list(&obj, &["style", "styles"]),
            seasons: string_list(&obj, &["season", "seasons"]),
            brand: string_field(&obj, &["brand"]),
            raw: Value::Object(obj),
        }
    }

    /// Reads an extraction from a raw model reply, empty when unreadable
    pub fn from_model_output(content: &str) -> Self {
        match parse_model_json(content) {
            Some(obj) => Self::from_object(obj),
            None => {
                warn!("Vision reply was not a JSON object, storing item untagged");
                Self::default()
            }
        }
    }
}
