/// Tag normalisation
///
/// Vision models describe a garment in loose, inconsistent words. This module
/// maps that output onto flat `key:slug` tokens (`type:tshirt`,
/// `pattern:striped`, `graphic:snake`) which are stored in an item's tag list
/// and matched exactly by search filters.

use crate::ai::VisionExtraction;

pub const KEY_TYPE: &str = "type";
pub const KEY_PATTERN: &str = "pattern";
pub const KEY_GRAPHIC: &str = "graphic";
pub const KEY_MATERIAL: &str = "material";
pub const KEY_FEATURE: &str = "feature";
pub const KEY_STYLE: &str = "style";
pub const KEY_COLOR: &str = "color";
pub const KEY_SEASON: &str = "season";

/// Slugs that carry no information and never become tokens
const EMPTY_SLUGS: &[&str] = &["none", "na", "null", "unknown", "nil"];

/// Patterns meaning "no pattern"
const PLAIN_PATTERNS: &[&str] = &["solid", "plain"];

/// Lower-cases a word and reduces it to `[a-z0-9-]`
///
/// Whitespace, underscores and dashes become a single `-`, other punctuation
/// is removed, so `"Polka  dot"` becomes `"polka-dot"` and `"N/A"` becomes
/// `"na"`.
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    for c in raw.trim().chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            slug.push(c);
        } else if (c.is_whitespace() || c == '_' || c == '-') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

/// Canonical spelling for common variants
fn canonical(slug: String) -> String {
    let mapped = match slug.as_str() {
        "tee" | "t-shirt" | "tshirts" | "tees" => "tshirt",
        "stripe" | "stripes" | "stripy" => "striped",
        "hoody" | "hoodies" => "hoodie",
        "sneaker" => "sneakers",
        "tartan" | "plaids" => "plaid",
        "dots" | "polkadot" | "polkadots" | "polka-dots" => "polka-dot",
        "checked" | "checkered" | "check" => "checkered",
        "floral-print" | "flowers" | "flower" => "floral",
        _ => return slug,
    };
    mapped.to_string()
}

/// Builds a `key:slug` token, or `None` when the value slugifies to nothing
pub fn tag_token(key: &str, value: &str) -> Option<String> {
    let slug = canonical(slugify(value));
    if slug.is_empty() || EMPTY_SLUGS.contains(&slug.as_str()) {
        return None;
    }
    Some(format!("{}:{}", key, slug))
}

/// Normalises a single tag a user or model wrote by hand
///
/// `"Type: T-Shirt"` becomes `type:tshirt`; a bare word is treated as a
/// feature, so `"Hooded"` becomes `feature:hooded`.
pub fn normalize_tag(raw: &str) -> Option<String> {
    match raw.split_once(':') {
        Some((key, value)) => {
            let key = slugify(key);
            if key.is_empty() {
                return None;
            }
            tag_token(&key, value)
        }
        None => tag_token(KEY_FEATURE, raw),
    }
}

fn push_unique(tokens: &mut Vec<String>, token: Option<String>) {
    if let Some(token) = token {
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
}

/// Maps a vision extraction onto de-duplicated tag tokens
///
/// Tokens come out grouped by key in a fixed order (type, pattern, graphic,
/// material, feature, style, color, season), each group in the order the
/// model listed them.
pub fn normalize_tags(vision: &VisionExtraction) -> Vec<String> {
    let mut tokens = Vec::new();

    for value in &vision.garment_types {
        push_unique(&mut tokens, tag_token(KEY_TYPE, value));
    }
    for value in &vision.patterns {
        let slug = slugify(value);
        if PLAIN_PATTERNS.contains(&slug.as_str()) {
            continue;
        }
        push_unique(&mut tokens, tag_token(KEY_PATTERN, value));
    }
    for value in &vision.graphics {
        push_unique(&mut tokens, tag_token(KEY_GRAPHIC, value));
    }
    for value in &vision.materials {
        push_unique(&mut tokens, tag_token(KEY_MATERIAL, value));
    }
    for value in &vision.features {
        push_unique(&mut tokens, tag_token(KEY_FEATURE, value));
    }
    for value in &vision.styles {
        push_unique(&mut tokens, tag_token(KEY_STYLE, value));
    }
    for value in vision.primary_color.iter().chain(vision.colors.iter()) {
        push_unique(&mut tokens, tag_token(KEY_COLOR, value));
    }
    for value in &vision.seasons {
        push_unique(&mut tokens, tag_token(KEY_SEASON, value));
    }

    tokens
}

#[cfg(test)]
mod tests;
#[cfg(test)]
mod prop_tests;
