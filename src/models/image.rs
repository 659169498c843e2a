use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A photo of a clothing item
///
/// This struct maps directly to the `images` table in the database. An item
/// may have several images; at most one of them is flagged as primary.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::images)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct Image {
    id: String,
    clothing_item_id: String,
    url: String,
    alt: Option<String>,
    is_primary: bool,
    created_at: NaiveDateTime,
}

impl Image {
    /// Creates a new image record for the given item
    pub fn new(clothing_item_id: String, url: String, alt: Option<String>, is_primary: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            clothing_item_id,
            url,
            alt,
            is_primary,
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_clothing_item_id(&self) -> String {
        self.clothing_item_id.clone()
    }

    pub fn get_url(&self) -> String {
        self.url.clone()
    }

    pub fn get_alt(&self) -> Option<String> {
        self.alt.clone()
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
