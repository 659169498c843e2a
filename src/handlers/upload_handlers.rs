use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use crate::ai::VisionExtraction;
use crate::dto::DataResponse;
use crate::errors::ApiError;
use crate::models::{Category, ClothingItemView, NewClothingItem};
use crate::repo;
use crate::storage::extension_for;
use crate::tags::normalize_tags;
use crate::AppState;

const UNTITLED: &str = "Untitled item";

/// The image part of an upload
#[derive(Debug)]
struct UploadedFile {
    file_name: Option<String>,
    content_type: String,
    bytes: Vec<u8>,
}

/// All recognised parts of an upload form
#[derive(Debug, Default)]
struct UploadForm {
    name: Option<String>,
    owner_id: Option<String>,
    file: Option<UploadedFile>,
}

fn non_blank(value: String) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Reads the multipart body, enforcing the image type and size limits
///
/// Unknown parts are skipped. The content type is checked before the file
/// body is read, and reading stops as soon as the size limit is passed.
async fn read_upload_form(multipart: &mut Multipart, max_bytes: u64) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(mut field) = multipart.next_field().await? {
        let part = field.name().unwrap_or_default().to_string();
        match part.as_str() {
            "name" => form.name = non_blank(field.text().await?),
            "ownerId" | "owner_id" => form.owner_id = non_blank(field.text().await?),
            "file" => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                if extension_for(&content_type).is_none() {
                    return Err(ApiError::UnsupportedMediaType(format!(
                        "Unsupported image type: {}",
                        if content_type.is_empty() { "unknown" } else { &content_type }
                    )));
                }
                let file_name = field.file_name().map(str::to_string);

                let mut bytes = Vec::new();
                while let Some(chunk) = field.chunk().await? {
                    if (bytes.len() + chunk.len()) as u64 > max_bytes {
                        return Err(ApiError::PayloadTooLarge(format!(
                            "File exceeds the {} byte upload limit",
                            max_bytes
                        )));
                    }
                    bytes.extend_from_slice(&chunk);
                }

                form.file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    Ok(form)
}

/// Builds the item to store from the form and, when available, the vision tags
fn build_new_item(
    name: Option<String>,
    owner_id: Option<String>,
    file_name: Option<&str>,
    vision: Option<&VisionExtraction>,
) -> NewClothingItem {
    let file_stem = file_name
        .and_then(|f| Path::new(f).file_stem())
        .and_then(|s| s.to_str())
        .and_then(|s| non_blank(s.to_string()));

    let name = name
        .or_else(|| vision.and_then(|v| v.name.clone()).and_then(non_blank))
        .or(file_stem)
        .unwrap_or_else(|| UNTITLED.to_string());

    let mut metadata = Map::new();
    metadata.insert("source".to_string(), Value::from("upload"));
    if let Some(file_name) = file_name {
        metadata.insert("originalFilename".to_string(), Value::from(file_name));
    }

    let mut new = NewClothingItem {
        name,
        owner_id,
        ..Default::default()
    };

    if let Some(vision) = vision {
        metadata.insert("vision".to_string(), vision.raw.clone());
        new.category = vision.category.as_deref().and_then(Category::parse_lenient);
        new.description = vision.description.clone();
        new.primary_color = vision.primary_color.clone();
        new.colors = vision.colors.clone();
        new.tags = normalize_tags(vision);
        new.brand = vision.brand.clone();
    }

    new.metadata = Value::Object(metadata);
    new
}

/// Handler for uploading a garment photo
///
/// This function handles multipart POST requests to `/api/upload` with a
/// `file` part and optional `name` and `ownerId` parts. The photo is stored,
/// tagged by the vision model when auto-tagging is on, and saved as a new
/// clothing item whose primary image is the photo.
///
/// ### Errors
///
/// - 400 when the file is missing or empty, or the owner does not exist
/// - 413 when the file is over the upload limit
/// - 415 when the request is not `multipart/form-data` or the file is not a
///   supported image type
/// - 502 when the vision model request fails (the stored photo is removed)
#[instrument(skip(state, multipart))]
pub async fn upload_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<DataResponse<ClothingItemView>>), ApiError> {
    let mut multipart = multipart?;
    let form = read_upload_form(&mut multipart, state.max_upload_bytes).await?;

    let file = form
        .file
        .filter(|f| !f.bytes.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing file".to_string()))?;

    if let Some(owner_id) = &form.owner_id {
        if repo::get_user(&state.pool, owner_id)?.is_none() {
            return Err(ApiError::BadRequest(format!("Unknown owner: {}", owner_id)));
        }
    }

    let url = state.storage.save(&file.bytes, &file.content_type).await?;
    info!("Stored upload at {}", url);

    let vision = match (&state.ai, state.auto_tag) {
        (Some(ai), true) => match ai.describe_image(&file.bytes, &file.content_type).await {
            Ok(vision) => Some(vision),
            Err(err) => {
                state.storage.delete(&url).await;
                return Err(err.into());
            }
        },
        (None, true) => {
            warn!("Auto-tagging is on but no AI provider is configured, storing item untagged");
            None
        }
        (_, false) => None,
    };

    let new = build_new_item(form.name, form.owner_id, file.file_name.as_deref(), vision.as_ref());
    let item = match repo::create_clothing_item(&state.pool, new, &[url.clone()]) {
        Ok(item) => item,
        Err(err) => {
            state.storage.delete(&url).await;
            return Err(ApiError::Database(err));
        }
    };

    info!("Created clothing item {} from upload", item.item.get_id());
    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}
