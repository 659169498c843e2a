//! Image storage
//!
//! Uploaded photos are written either to a local directory served under
//! `/uploads` or to a blob store that accepts `PUT` requests. Either way the
//! caller gets back the public URL to record on the clothing item.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::config::Config;

/// Content types accepted for upload, with the file extension they are stored under
pub const ALLOWED_IMAGE_TYPES: [(&str, &str); 5] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
    ("image/avif", "avif"),
];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Blob request failed: {0}")]
    Request(String),

    #[error("Blob store returned {status}: {message}")]
    Remote { status: u16, message: String },
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        StorageError::Request(err.to_string())
    }
}

/// File extension for an accepted image content type
///
/// Parameters such as `; charset=binary` are ignored.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
}

#[derive(Debug, Deserialize)]
struct BlobResponse {
    url: Option<String>,
}

/// Where uploaded images are kept
#[derive(Debug, Clone)]
pub enum ImageStore {
    Local {
        dir: PathBuf,
        public_prefix: String,
    },
    Blob {
        client: reqwest::Client,
        endpoint: String,
        token: Option<String>,
    },
}

impl ImageStore {
    pub fn local(dir: impl Into<PathBuf>, public_prefix: &str) -> Self {
        ImageStore::Local {
            dir: dir.into(),
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn blob(endpoint: &str, token: Option<String>) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(ImageStore::Blob {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Blob storage when an endpoint is configured, the upload directory otherwise
    pub fn from_config(config: &Config) -> Result<Self, StorageError> {
        match config.blob_endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => Self::blob(endpoint, config.blob_token.clone()),
            _ => Ok(Self::local(&config.upload_dir, &config.public_upload_prefix)),
        }
    }

    /// Stores the bytes under a fresh `<uuid>.<ext>` name and returns the public URL
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn save(&self, bytes: &[u8], content_type: &str) -> Result<String, StorageError> {
        let ext = extension_for(content_type)
            .ok_or_else(|| StorageError::UnsupportedType(content_type.to_string()))?;
        let file_name = format!("{}.{}", Uuid::new_v4(), ext);

        match self {
            ImageStore::Local { dir, public_prefix } => {
                tokio::fs::create_dir_all(dir).await?;
                let path = dir.join(&file_name);
                tokio::fs::write(&path, bytes).await?;
                debug!("Wrote image to {}", path.display());
                Ok(format!("{}/{}", public_prefix, file_name))
            }
            ImageStore::Blob { client, endpoint, token } => {
                let target = format!("{}/{}", endpoint, file_name);
                let mut request = client
                    .put(&target)
                    .header(reqwest::header::CONTENT_TYPE, content_type)
                    .body(bytes.to_vec());
                if let Some(token) = token {
                    request = request.bearer_auth(token);
                }

                let response = request.send().await?;
                let status = response.status();
                if !status.is_success() {
                    let message = response.text().await.unwrap_or_default();
                    return Err(StorageError::Remote {
                        status: status.as_u16(),
                        message,
                    });
                }

                let url = response
                    .json::<BlobResponse>()
                    .await
                    .ok()
                    .and_then(|body| body.url)
                    .filter(|url| !url.is_empty())
                    .unwrap_or(target);
                debug!("Uploaded image to {}", url);
                Ok(url)
            }
        }
    }

    /// Removes a previously stored image, logging instead of failing
    ///
    /// Only URLs under the local public prefix are touched; blob objects are
    /// left in place.
    #[instrument(skip(self))]
    pub async fn delete(&self, url: &str) {
        let ImageStore::Local { dir, public_prefix } = self else {
            return;
        };

        let Some(file_name) = url
            .strip_prefix(public_prefix.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return;
        };
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name.contains("..") {
            warn!("Refusing to delete suspicious upload path {}", url);
            return;
        }

        if let Err(err) = tokio::fs::remove_file(dir.join(file_name)).await {
            warn!("Failed to delete {}: {}", url, err);
        }
    }
}

#[cfg(test)]
mod tests;
