/// Data models module
///
/// This module defines the rows stored in the catalog database and the
/// column types (JSON text, category enum) they are built from.

mod json_value;
pub use json_value::{JsonValue, StringList};

mod category;
pub use category::Category;

mod user;
pub use user::User;

mod clothing_item;
pub use clothing_item::{normalize_colors, ClothingItem, ClothingItemView, NewClothingItem};

mod image;
pub use image::Image;
