use std::collections::HashMap;

use crate::db::DbPool;
use crate::dto::Pagination;
use crate::filters::{contains_pattern, json_member_pattern, ItemFilter};
use crate::models::{ClothingItem, ClothingItemView, Image, NewClothingItem};
use crate::schema::{clothing_items, images};
use anyhow::Result;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Nullable};
use diesel::sqlite::{Sqlite, SqliteConnection};
use tracing::{debug, info, instrument};

/// One boxed SQL condition on `clothing_items`
type Predicate = Box<dyn BoxableExpression<clothing_items::table, Sqlite, SqlType = Nullable<Bool>>>;

/// ORs the predicates together, `None` when there are none
fn any_of(predicates: Vec<Predicate>) -> Option<Predicate> {
    predicates
        .into_iter()
        .reduce(|acc, next| -> Predicate { Box::new(acc.or(next)) })
}

/// `color` is one of the entries of the `colors` list
fn color_listed(color: &str) -> Predicate {
    Box::new(clothing_items::colors.like(json_member_pattern(color)).escape('\\').nullable())
}

/// Matches one search term against name, description, brand and tags
fn term_predicate(term: &str) -> Predicate {
    let pattern = contains_pattern(term);
    let name: Predicate = Box::new(clothing_items::name.like(pattern.clone()).escape('\\').nullable());
    let description: Predicate = Box::new(clothing_items::description.like(pattern.clone()).escape('\\'));
    let brand: Predicate = Box::new(clothing_items::brand.like(pattern.clone()).escape('\\'));
    let tags: Predicate = Box::new(clothing_items::tags.like(pattern).escape('\\').nullable());
    Box::new(name.or(description).or(brand).or(tags))
}

/// Builds the filtered (unordered, unpaged) item query
fn filtered_items(filter: &ItemFilter) -> clothing_items::BoxedQuery<'static, Sqlite> {
    let mut query = clothing_items::table.into_boxed();

    if !filter.categories.is_empty() {
        query = query.filter(clothing_items::category.eq_any(filter.categories.clone()));
    }

    let color_matches = filter
        .colors
        .iter()
        .flat_map(|color| {
            [
                Box::new(clothing_items::primary_color.eq(color.clone())) as Predicate,
                color_listed(color),
            ]
        })
        .collect();
    if let Some(predicate) = any_of(color_matches) {
        query = query.filter(predicate);
    }

    for term in &filter.terms {
        query = query.filter(term_predicate(term));
    }

    for tag in &filter.tags {
        query = query.filter(clothing_items::tags.like(json_member_pattern(tag)).escape('\\'));
    }

    if let Some(brand) = &filter.brand {
        query = query.filter(clothing_items::brand.like(contains_pattern(brand)).escape('\\'));
    }

    let size_matches = filter
        .sizes
        .iter()
        .map(|size| -> Predicate {
            Box::new(clothing_items::sizes.like(json_member_pattern(size)).escape('\\').nullable())
        })
        .collect();
    if let Some(predicate) = any_of(size_matches) {
        query = query.filter(predicate);
    }

    if let Some(min) = filter.min_price {
        query = query.filter(clothing_items::price.ge(min));
    }
    if let Some(max) = filter.max_price {
        query = query.filter(clothing_items::price.le(max));
    }

    if let Some(owner) = &filter.owner_id {
        query = query.filter(clothing_items::owner_id.eq(owner.clone()));
    }

    query
}

/// Loads the images of the given items in one query, grouped by item
fn images_by_item(conn: &mut SqliteConnection, item_ids: &[String]) -> Result<HashMap<String, Vec<Image>>> {
    let mut grouped: HashMap<String, Vec<Image>> = HashMap::new();
    if item_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = images::table
        .filter(images::clothing_item_id.eq_any(item_ids))
        .order((images::created_at.asc(), images::id.asc()))
        .select(Image::as_select())
        .load(conn)?;

    for image in rows {
        grouped.entry(image.get_clothing_item_id()).or_default().push(image);
    }
    Ok(grouped)
}

/// Creates a clothing item together with its images
///
/// The first URL in `image_urls` becomes the primary image, and the item's
/// `image_url` when none was given. Everything is written in one transaction.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `new` - The field values of the item to create
/// * `image_urls` - Public URLs of the item's images, primary first
///
/// ### Returns
///
/// A Result containing the stored item and its images
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The owner does not exist
/// - Any insert fails (nothing is written in that case)
#[instrument(skip(pool, new), fields(name = %new.name))]
pub fn create_clothing_item(pool: &DbPool, mut new: NewClothingItem, image_urls: &[String]) -> Result<ClothingItemView> {
    if new.image_url.is_none() {
        new.image_url = image_urls.first().cloned();
    }
    let item = ClothingItem::new(new);
    let images: Vec<Image> = image_urls
        .iter()
        .enumerate()
        .map(|(i, url)| Image::new(item.get_id(), url.clone(), Some(item.get_name()), i == 0))
        .collect();

    let conn = &mut pool.get()?;
    conn.transaction::<_, anyhow::Error, _>(|conn| {
        diesel::insert_into(clothing_items::table)
            .values(&item)
            .execute(conn)?;
        if !images.is_empty() {
            diesel::insert_into(images::table)
                .values(&images)
                .execute(conn)?;
        }
        Ok(())
    })?;

    info!("Created clothing item with id: {}", item.get_id());
    Ok(ClothingItemView::new(item, images))
}

/// Retrieves a clothing item and its images by ID
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `item_id` - The ID of the item to retrieve
///
/// ### Returns
///
/// A Result containing `Some(ClothingItemView)` if found, or `None` if not
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - Either database query fails
#[instrument(skip(pool))]
pub fn get_clothing_item(pool: &DbPool, item_id: &str) -> Result<Option<ClothingItemView>> {
    let conn = &mut pool.get()?;

    let Some(item) = clothing_items::table
        .find(item_id)
        .select(ClothingItem::as_select())
        .first(conn)
        .optional()?
    else {
        debug!("Clothing item not found");
        return Ok(None);
    };

    let mut grouped = images_by_item(conn, &[item.get_id()])?;
    let images = grouped.remove(&item.get_id()).unwrap_or_default();
    Ok(Some(ClothingItemView::new(item, images)))
}

/// Lists one page of clothing items matching `filter`, newest first
///
/// Returns the page together with the total number of matching items. The
/// count and the page are read in the same transaction so they agree.
///
/// ### Arguments
///
/// * `pool` - A reference to the database connection pool
/// * `filter` - Which items to include
/// * `pagination` - The page to load
///
/// ### Returns
///
/// A Result containing the page of items and the total match count
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The count or page query fails
#[instrument(skip(pool, filter, pagination), fields(filter = %filter, page = pagination.page, per_page = pagination.per_page))]
pub fn list_clothing_items(
    pool: &DbPool,
    filter: &ItemFilter,
    pagination: &Pagination,
) -> Result<(Vec<ClothingItemView>, i64)> {
    let conn = &mut pool.get()?;

    let (items, total, mut grouped) = conn.transaction::<_, anyhow::Error, _>(|conn| {
        let total: i64 = filtered_items(filter).count().get_result(conn)?;

        let items: Vec<ClothingItem> = filtered_items(filter)
            .order((clothing_items::created_at.desc(), clothing_items::id.desc()))
            .limit(pagination.limit())
            .offset(pagination.offset())
            .select(ClothingItem::as_select())
            .load(conn)?;

        let ids: Vec<String> = items.iter().map(ClothingItem::get_id).collect();
        let grouped = images_by_item(conn, &ids)?;
        Ok((items, total, grouped))
    })?;

    debug!("Loaded {} of {} matching items", items.len(), total);

    let views = items
        .into_iter()
        .map(|item| {
            let images = grouped.remove(&item.get_id()).unwrap_or_default();
            ClothingItemView::new(item, images)
        })
        .collect();
    Ok((views, total))
}
