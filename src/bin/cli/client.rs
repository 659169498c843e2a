use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde_json::json;
use wardrobo::dto::{DataResponse, Paginated};
use wardrobo::models::ClothingItemView;
use wardrobo::storage::ALLOWED_IMAGE_TYPES;

/// Error type for CLI client operations
#[derive(Debug)]
pub enum ClientError {
    /// Server returned an error status with a message body
    Server { status: reqwest::StatusCode, message: String },
    /// Network/connection/request error
    Request(reqwest::Error),
    /// The server URL cannot be used as a base for API paths
    InvalidUrl(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Server { status, message } => {
                write!(f, "Server error ({}): {}", status.as_u16(), message)
            }
            ClientError::Request(err) => write!(f, "{}", err),
            ClientError::InvalidUrl(url) => write!(f, "Invalid server URL: {}", url),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Request(err) => Some(err),
            ClientError::Server { .. } | ClientError::InvalidUrl(_) => None,
        }
    }
}

/// Extension trait for checking HTTP responses and extracting server error messages
trait ResponseExt {
    /// Checks for error status and extracts the server's error message body
    async fn check(self) -> Result<reqwest::Response, ClientError>;
}

impl ResponseExt for reqwest::Response {
    async fn check(self) -> Result<reqwest::Response, ClientError> {
        if self.status().is_success() {
            return Ok(self);
        }
        let status = self.status();
        let message = match self.json::<serde_json::Value>().await {
            Ok(body) => body.get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("Unknown error")
                .to_string(),
            Err(_) => format!("HTTP {}", status),
        };
        Err(ClientError::Server { status, message })
    }
}

/// Filters and paging for `list`
#[derive(Debug, Default)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub search: Option<String>,
    pub owner: Option<String>,
}

/// Builds query parameters from ListParams
fn build_query_params(params: &ListParams) -> Vec<(&'static str, String)> {
    let mut query: Vec<(&'static str, String)> = Vec::new();

    if let Some(page) = params.page {
        query.push(("page", page.to_string()));
    }
    if let Some(per_page) = params.per_page {
        query.push(("perPage", per_page.to_string()));
    }
    if let Some(ref category) = params.category {
        query.push(("category", category.clone()));
    }
    if let Some(ref color) = params.color {
        query.push(("color", color.clone()));
    }
    if let Some(ref search) = params.search {
        query.push(("search", search.clone()));
    }
    if let Some(ref owner) = params.owner {
        query.push(("owner", owner.clone()));
    }

    query
}

/// Guesses an upload's content type from its file extension
pub fn content_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let ext = if ext == "jpeg" { "jpg".to_string() } else { ext };
    ALLOWED_IMAGE_TYPES
        .iter()
        .find(|(_, e)| *e == ext)
        .map(|(mime, _)| *mime)
}

/// Builds `<base_url>/api/clothes/<id>`, percent-encoding the ID as one path segment
fn item_url(base_url: &str, id: &str) -> Result<Url, ClientError> {
    let invalid = || ClientError::InvalidUrl(base_url.to_string());
    let mut url = Url::parse(base_url).map_err(|_| invalid())?;
    url.path_segments_mut()
        .map_err(|_| invalid())?
        .pop_if_empty()
        .extend(["api", "clothes", id]);
    Ok(url)
}

/// HTTP client wrapper for communicating with the Wardrobo server
pub struct WardroboClient {
    /// The base URL of the server (e.g. "http://localhost:3000")
    base_url: String,
    /// The underlying HTTP client
    client: Client,
}

impl WardroboClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Lists one page of clothing items
    pub async fn list_clothes(&self, params: &ListParams) -> Result<Paginated<ClothingItemView>, ClientError> {
        let url = format!("{}/api/clothes", self.base_url);
        let response = self.client.get(&url).query(&build_query_params(params)).send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Gets a clothing item by ID
    pub async fn get_clothing_item(&self, id: &str) -> Result<ClothingItemView, ClientError> {
        let url = item_url(&self.base_url, id)?;
        let response = self.client.get(url).send().await.map_err(ClientError::Request)?.check().await?;
        let body: DataResponse<ClothingItemView> = response.json().await.map_err(ClientError::Request)?;
        Ok(body.data)
    }

    /// Searches the catalog with a natural-language prompt
    pub async fn search(
        &self,
        prompt: &str,
        color: Option<&str>,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<Paginated<ClothingItemView>, ClientError> {
        let url = format!("{}/api/ai/query", self.base_url);
        let body = json!({
            "prompt": prompt,
            "color": color,
            "page": page,
            "perPage": per_page,
        });
        let response = self.client.post(&url).json(&body).send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Uploads a garment photo as a new clothing item
    pub async fn upload(
        &self,
        file_name: String,
        content_type: &str,
        bytes: Vec<u8>,
        name: Option<String>,
        owner_id: Option<String>,
    ) -> Result<ClothingItemView, ClientError> {
        let url = format!("{}/api/upload", self.base_url);
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(content_type)
            .map_err(ClientError::Request)?;
        let mut form = Form::new().part("file", part);
        if let Some(name) = name {
            form = form.text("name", name);
        }
        if let Some(owner_id) = owner_id {
            form = form.text("ownerId", owner_id);
        }

        let response = self.client.post(&url).multipart(form).send().await.map_err(ClientError::Request)?.check().await?;
        let body: DataResponse<ClothingItemView> = response.json().await.map_err(ClientError::Request)?;
        Ok(body.data)
    }
}
