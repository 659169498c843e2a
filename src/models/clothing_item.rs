use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Category, Image, JsonValue, StringList};

/// A catalog row representing one garment
///
/// This struct maps directly to the `clothing_items` table in the database.
/// List-valued columns (colors, sizes, tags) are stored as JSON arrays and
/// colors are always lower-case so they can be matched exactly.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::clothing_items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct ClothingItem {
    /// Unique identifier for the item (UUID v4 as string)
    id: String,
    name: String,
    category: Category,
    description: Option<String>,
    price: Option<f64>,
    /// Dominant color, lower-case
    primary_color: Option<String>,
    colors: StringList,
    sizes: StringList,
    /// Tag tokens such as `type:tshirt`, plus materials and features
    tags: StringList,
    brand: Option<String>,
    image_url: Option<String>,
    /// Free-form data, e.g. the raw vision extraction for uploaded items
    metadata: JsonValue,
    owner_id: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

/// Field values for a clothing item that has not been stored yet
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewClothingItem {
    pub name: String,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub primary_color: Option<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub tags: Vec<String>,
    pub brand: Option<String>,
    pub image_url: Option<String>,
    pub metadata: serde_json::Value,
    pub owner_id: Option<String>,
}

/// Lower-cases, trims and de-duplicates color names, dropping blanks
pub fn normalize_colors<I, S>(colors: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for color in colors {
        let color = color.as_ref().trim().to_lowercase();
        if !color.is_empty() && !out.contains(&color) {
            out.push(color);
        }
    }
    out
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ClothingItem {
    /// Creates a new item from unsaved field values
    ///
    /// Generates a UUID v4 id and sets both timestamps to now. Colors are
    /// normalised; the primary color is added to the color list when missing.
    pub fn new(new: NewClothingItem) -> Self {
        let now = Utc::now().naive_utc();
        let primary_color = non_blank(new.primary_color).map(|c| c.to_lowercase());
        let mut colors = normalize_colors(new.colors);
        if let Some(primary) = &primary_color {
            if !colors.contains(primary) {
                colors.insert(0, primary.clone());
            }
        }
        let metadata = if new.metadata.is_null() {
            serde_json::Value::Object(Default::default())
        } else {
            new.metadata
        };

        Self {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            category: new.category.unwrap_or(Category::Other),
            description: non_blank(new.description),
            price: new.price.filter(|p| p.is_finite() && *p >= 0.0),
            primary_color,
            colors: StringList(colors),
            sizes: StringList(new.sizes.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()),
            tags: StringList(new.tags),
            brand: non_blank(new.brand),
            image_url: non_blank(new.image_url),
            metadata: JsonValue(metadata),
            owner_id: new.owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_name(&self) -> String {
        self.name.clone()
    }

    pub fn get_category(&self) -> Category {
        self.category
    }

    pub fn get_description(&self) -> Option<String> {
        self.description.clone()
    }

    pub fn get_price(&self) -> Option<f64> {
        self.price
    }

    pub fn get_primary_color(&self) -> Option<String> {
        self.primary_color.clone()
    }

    pub fn get_colors(&self) -> Vec<String> {
        self.colors.0.clone()
    }

    pub fn get_sizes(&self) -> Vec<String> {
        self.sizes.0.clone()
    }

    pub fn get_tags(&self) -> Vec<String> {
        self.tags.0.clone()
    }

    pub fn get_brand(&self) -> Option<String> {
        self.brand.clone()
    }

    pub fn get_image_url(&self) -> Option<String> {
        self.image_url.clone()
    }

    pub fn get_metadata(&self) -> JsonValue {
        self.metadata.clone()
    }

    pub fn get_owner_id(&self) -> Option<String> {
        self.owner_id.clone()
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}

/// A clothing item together with its images, as returned by the API
///
/// The item's fields are flattened into the top-level object so clients see
/// `{ "id": ..., "name": ..., "images": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothingItemView {
    #[serde(flatten)]
    pub item: ClothingItem,
    pub images: Vec<Image>,
}

impl ClothingItemView {
    /// Pairs an item with its images, primary image first
    pub fn new(item: ClothingItem, mut images: Vec<Image>) -> Self {
        images.sort_by_key(|image| (!image.is_primary(), image.get_created_at()));
        Self { item, images }
    }
}
