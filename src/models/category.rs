use diesel::deserialize::{FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::serialize;
use diesel::serialize::{IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::{Sqlite, SqliteValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The category a clothing item belongs to
///
/// Stored as upper-case text (`"TOPS"`, `"SHOES"`, ...) and serialized the
/// same way in API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Tops,
    Bottoms,
    Dresses,
    Outerwear,
    Shoes,
    Accessories,
    Activewear,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Tops,
        Category::Bottoms,
        Category::Dresses,
        Category::Outerwear,
        Category::Shoes,
        Category::Accessories,
        Category::Activewear,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Tops => "TOPS",
            Category::Bottoms => "BOTTOMS",
            Category::Dresses => "DRESSES",
            Category::Outerwear => "OUTERWEAR",
            Category::Shoes => "SHOES",
            Category::Accessories => "ACCESSORIES",
            Category::Activewear => "ACTIVEWEAR",
            Category::Other => "OTHER",
        }
    }

    /// Maps a loose garment word onto a category
    ///
    /// Accepts the canonical names in any case, singular forms, and common
    /// garment words a model tends to answer with (`"t-shirt"`, `"jeans"`,
    /// `"sneakers"`). Returns `None` for anything unrecognised.
    pub fn parse_lenient(raw: &str) -> Option<Category> {
        let word: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        if word.is_empty() {
            return None;
        }

        let category = match word.as_str() {
            "tops" | "top" | "shirt" | "shirts" | "tshirt" | "tshirts" | "tee" | "tees" | "blouse"
            | "blouses" | "sweater" | "sweaters" | "hoodie" | "hoodies" | "polo" | "tank" | "tanktop" => {
                Category::Tops
            }
            "bottoms" | "bottom" | "pants" | "trousers" | "jeans" | "shorts" | "skirt" | "skirts"
            | "leggings" | "chinos" => Category::Bottoms,
            "dresses" | "dress" | "gown" | "jumpsuit" => Category::Dresses,
            "outerwear" | "jacket" | "jackets" | "coat" | "coats" | "parka" | "blazer" | "vest" => {
                Category::Outerwear
            }
            "shoes" | "shoe" | "footwear" | "sneakers" | "sneaker" | "boots" | "boot" | "sandals"
            | "heels" | "loafers" => Category::Shoes,
            "accessories" | "accessory" | "hat" | "hats" | "cap" | "scarf" | "belt" | "bag" | "bags"
            | "jewelry" | "sunglasses" | "socks" => Category::Accessories,
            "activewear" | "sportswear" | "athletic" | "gym" | "workout" => Category::Activewear,
            "other" => Category::Other,
            _ => return None,
        };
        Some(category)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Strict parse of a canonical category name, case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == upper)
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

impl FromSql<Text, Sqlite> for Category {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        Ok(text.parse()?)
    }
}

impl ToSql<Text, Sqlite> for Category {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}
