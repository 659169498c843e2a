use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::{info, instrument};

use crate::dto::{AiQueryDto, Paginated, Pagination};
use crate::errors::ApiError;
use crate::filters::ItemFilter;
use crate::models::ClothingItemView;
use crate::repo;
use crate::AppState;

/// Handler for natural-language search
///
/// This function handles POST requests to `/api/ai/query`. The prompt is
/// sent to the text model, whose extraction is turned into catalog filters.
/// An unreadable model reply yields no filters, so the search degrades to a
/// plain listing; a failed model request is a 502.
///
/// ### Returns
///
/// One page of matching items, the pagination metadata and the extracted
/// filters under `filters`
#[instrument(skip(state, payload))]
pub async fn ai_query_handler(
    State(state): State<AppState>,
    payload: Result<Json<AiQueryDto>, JsonRejection>,
) -> Result<Json<Paginated<ClothingItemView>>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let prompt = payload.prompt.trim();
    if prompt.is_empty() {
        return Err(ApiError::BadRequest("Prompt is required".to_string()));
    }

    let ai = state
        .ai
        .as_ref()
        .ok_or_else(|| ApiError::Upstream("AI search is not configured".to_string()))?;

    let extraction = ai.extract_filters(prompt).await?;
    let filter = ItemFilter::from_extraction(&extraction).with_color(payload.color.as_deref());
    info!(filter = %filter, "Prompt translated to filters");

    let pagination = Pagination::from_values(
        payload.page.as_ref(),
        payload.per_page.as_ref(),
        state.page_settings,
    );
    let (data, total) = repo::list_clothing_items(&state.pool, &filter, &pagination)?;

    info!("AI search matched {} items", total);
    Ok(Json(Paginated {
        data,
        meta: pagination.meta(total),
        filters: Some(extraction),
    }))
}
