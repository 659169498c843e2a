/// Repository module
///
/// This module provides the data access layer for the catalog: users,
/// clothing items and their images. Every function takes the connection
/// pool and returns `anyhow::Result`.

mod user_repo;
mod clothing_repo;
mod image_repo;

// Re-export all repository functions
pub use user_repo::*;
pub use clothing_repo::*;
pub use image_repo::*;
