use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use tracing::{debug, info, instrument};

use crate::dto::{DataResponse, ListClothesQuery, Paginated, Pagination};
use crate::errors::ApiError;
use crate::filters::ItemFilter;
use crate::models::ClothingItemView;
use crate::repo;
use crate::AppState;

/// Handler for listing clothing items
///
/// This function handles GET requests to `/api/clothes`.
///
/// ### Arguments
///
/// * `state` - The shared application state
/// * `query` - Paging (`page`, `perPage`) and filter (`category`, `color`,
///   `search`, `owner`) parameters
///
/// ### Returns
///
/// One page of items, newest first, with pagination metadata. A query
/// string that cannot be read (e.g. a repeated key) is a 400.
#[instrument(skip(state, query))]
pub async fn list_clothes_handler(
    State(state): State<AppState>,
    query: Result<Query<ListClothesQuery>, QueryRejection>,
) -> Result<Json<Paginated<ClothingItemView>>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    debug!("Listing clothing items with {}", query);

    let filter = ItemFilter::from_query(&query).map_err(ApiError::BadRequest)?;
    let pagination = Pagination::from_raw(
        query.page.as_deref(),
        query.per_page.as_deref(),
        state.page_settings,
    );

    let (data, total) = repo::list_clothing_items(&state.pool, &filter, &pagination)?;

    info!("Returning {} of {} items", data.len(), total);
    Ok(Json(Paginated {
        data,
        meta: pagination.meta(total),
        filters: None,
    }))
}

/// Handler for retrieving a single clothing item
///
/// This function handles GET requests to `/api/clothes/{id}`.
#[instrument(skip(state))]
pub async fn get_clothing_item_handler(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<Json<DataResponse<ClothingItemView>>, ApiError> {
    let item = repo::get_clothing_item(&state.pool, &item_id)?.ok_or(ApiError::NotFound)?;

    debug!("Item found with id: {}", item.item.get_id());
    Ok(Json(DataResponse { data: item }))
}
