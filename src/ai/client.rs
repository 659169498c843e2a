use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, instrument};

use super::{FilterExtraction, VisionExtraction};
use crate::config::AiConfig;
use crate::models::Category;

const USER_AGENT: &str = concat!("wardrobo/", env!("CARGO_PKG_VERSION"));

/// Errors talking to the hosted model
#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI request failed: {0}")]
    Request(String),

    #[error("AI provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("AI provider returned no completion")]
    EmptyResponse,
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        AiError::Request(err.to_string())
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Value,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn category_names() -> String {
    Category::ALL
        .iter()
        .map(Category::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn filter_system_prompt() -> String {
    format!(
        "You turn clothing search requests into JSON filters for a wardrobe catalog. \
         Reply with a single JSON object and nothing else. Allowed keys: \
         \"category\" (one of {}), \"colors\" (array of basic color names), \
         \"keywords\" (array of short words to match against names and descriptions), \
         \"tags\" (array of \"key:value\" tokens where key is one of type, pattern, graphic, \
         material, feature, style, season), \"brand\" (string), \"minPrice\" and \"maxPrice\" \
         (numbers), \"sizes\" (array). Omit keys the request does not mention.",
        category_names()
    )
}

fn vision_system_prompt() -> String {
    format!(
        "You catalog garments from photos. Reply with a single JSON object and nothing else, \
         with keys: \"name\" (short product name), \"category\" (one of {}), \
         \"description\" (one sentence), \"primaryColor\", \"colors\" (array), \"type\" \
         (garment type, e.g. t-shirt, jeans), \"pattern\" (e.g. striped, solid), \"graphics\" \
         (array of printed motifs, e.g. snake), \"materials\" (array), \"features\" (array, \
         e.g. hood, pockets), \"style\" (array), \"season\" (array), \"brand\" if visible.",
        category_names()
    )
}

/// Client for an OpenAI-compatible chat-completions endpoint
#[derive(Debug, Clone)]
pub struct AiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    text_model: String,
    vision_model: String,
}

impl AiClient {
    pub fn new(config: &AiConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            text_model: config.text_model.clone(),
            vision_model: config.vision_model.clone(),
        })
    }

    /// Sends one chat completion and returns the first choice's text
    async fn complete(&self, model: &str, messages: Vec<ChatMessage>) -> Result<String, AiError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model,
            messages,
            temperature: 0.0,
            response_format: json!({ "type": "json_object" }),
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(AiError::EmptyResponse)?;

        debug!(model = model, chars = content.len(), "Received completion");
        Ok(content)
    }

    /// Asks the text model to turn a search prompt into filters
    ///
    /// A reply that is not valid JSON gives an empty extraction; only
    /// transport and provider errors fail.
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn extract_filters(&self, prompt: &str) -> Result<FilterExtraction, AiError> {
        let messages = vec![
            ChatMessage {
                role: "system",
                content: Value::String(filter_system_prompt()),
            },
            ChatMessage {
                role: "user",
                content: Value::String(prompt.to_string()),
            },
        ];

        let content = self.complete(&self.text_model, messages).await?;
        let extraction = FilterExtraction::from_model_output(&content);

        info!(empty = extraction.is_empty(), "Extracted search filters");
        Ok(extraction)
    }

    /// Asks the vision model to describe a garment photo
    #[instrument(skip(self, bytes), fields(size = bytes.len(), content_type = %content_type))]
    pub async fn describe_image(&self, bytes: &[u8], content_type: &str) -> Result<VisionExtraction, AiError> {
        let data_url = format!(
            "data:{};base64,{}",
            content_type,
            general_purpose::STANDARD.encode(bytes)
        );
        let messages = vec![
            ChatMessage {
                role: "system",
                content: Value::String(vision_system_prompt()),
            },
            ChatMessage {
                role: "user",
                content: json!([
                    { "type": "text", "text": "Describe this garment." },
                    { "type": "image_url", "image_url": { "url": data_url } }
                ]),
            },
        ];

        let content = self.complete(&self.vision_model, messages).await?;
        let extraction = VisionExtraction::from_model_output(&content);

        info!(name = ?extraction.name, "Described uploaded image");
        Ok(extraction)
    }
}
