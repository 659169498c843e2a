use crate::db::DbPool;
use crate::models::Image;
use crate::schema::images;
use anyhow::Result;
use diesel::prelude::*;
use tracing::{debug, instrument};

/// Attaches an image to a clothing item
///
/// Marking the new image primary clears the flag on the item's other images.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `item_id` - The ID of the clothing item
/// * `url` - Public URL of the stored image
/// * `alt` - Optional alt text
/// * `is_primary` - Whether this becomes the item's primary image
///
/// ### Returns
///
/// A Result containing the newly created Image if successful
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The item does not exist or the insert fails
#[instrument(skip(pool))]
pub fn add_image(
    pool: &DbPool,
    item_id: &str,
    url: &str,
    alt: Option<String>,
    is_primary: bool,
) -> Result<Image> {
    let conn = &mut pool.get()?;
    let image = Image::new(item_id.to_string(), url.to_string(), alt, is_primary);

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        if is_primary {
            diesel::update(images::table.filter(images::clothing_item_id.eq(item_id)))
                .set(images::is_primary.eq(false))
                .execute(conn)?;
        }
        diesel::insert_into(images::table)
            .values(&image)
            .execute(conn)?;
        Ok(())
    })?;

    debug!("Added image {} to item {}", image.get_id(), item_id);
    Ok(image)
}

/// Lists an item's images, primary image first, then oldest first
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `item_id` - The ID of the clothing item
///
/// ### Returns
///
/// A Result containing the item's images, empty for an unknown item
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database query fails
#[instrument(skip(pool))]
pub fn list_images_for_item(pool: &DbPool, item_id: &str) -> Result<Vec<Image>> {
    let conn = &mut pool.get()?;

    let result = images::table
        .filter(images::clothing_item_id.eq(item_id))
        .order((images::is_primary.desc(), images::created_at.asc(), images::id.asc()))
        .select(Image::as_select())
        .load(conn)?;

    debug!("Found {} images", result.len());
    Ok(result)
}

#[cfg(test)]
mod tests;
