use clap::Parser;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::dto::PageSettings;

/// Configuration for the Wardrobo server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// URL for the database connection
    pub database_url: String,
    /// Address the HTTP server binds to
    pub listen_addr: String,
    /// Directory uploaded images are written to when no blob endpoint is set
    pub upload_dir: String,
    /// URL path under which `upload_dir` is served
    pub public_upload_prefix: String,
    /// Blob storage endpoint; uploads go here instead of `upload_dir` when set
    pub blob_endpoint: Option<String>,
    /// Bearer token for the blob storage endpoint
    pub blob_token: Option<String>,
    /// Largest accepted upload in bytes
    pub max_upload_bytes: u64,
    /// Page size used when a request does not ask for one
    pub default_per_page: u32,
    /// Largest page size a request may ask for
    pub max_per_page: u32,
    /// API key for the hosted model; AI features are off without one
    pub ai_api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API
    pub ai_base_url: String,
    /// Model used to turn search prompts into filters
    pub ai_text_model: String,
    /// Model used to tag uploaded photos
    pub ai_vision_model: String,
    /// Timeout for a single model request, in seconds
    pub ai_timeout_secs: u64,
    /// Whether uploads are sent to the vision model
    pub auto_tag: bool,
    /// Directory for JSON log files; stderr only when unset
    pub log_dir: Option<String>,
    /// Server URL used by the CLI client
    pub server_url: Option<String>,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ConfigUpdate {
    pub database_url: Option<String>,
    pub listen_addr: Option<String>,
    pub upload_dir: Option<String>,
    pub public_upload_prefix: Option<String>,
    pub blob_endpoint: Option<String>,
    pub blob_token: Option<String>,
    pub max_upload_bytes: Option<u64>,
    pub default_per_page: Option<u32>,
    pub max_per_page: Option<u32>,
    pub ai_api_key: Option<String>,
    pub ai_base_url: Option<String>,
    pub ai_text_model: Option<String>,
    pub ai_vision_model: Option<String>,
    pub ai_timeout_secs: Option<u64>,
    pub auto_tag: Option<bool>,
    pub log_dir: Option<String>,
    pub server_url: Option<String>,
}

/// Command line arguments for the server
#[derive(Parser, Debug, Default)]
#[clap(name = "wardrobo", about = "Wardrobe catalog server with AI search")]
pub struct CliArgs {
    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address to listen on, e.g. 127.0.0.1:3000
    #[clap(long, env = "WARDROBO_LISTEN_ADDR")]
    pub listen_addr: Option<String>,

    /// Directory for uploaded images
    #[clap(long, env = "WARDROBO_UPLOAD_DIR")]
    pub upload_dir: Option<String>,

    /// Blob storage endpoint for uploaded images
    #[clap(long, env = "WARDROBO_BLOB_ENDPOINT")]
    pub blob_endpoint: Option<String>,

    /// Blob storage bearer token
    #[clap(long, env = "WARDROBO_BLOB_TOKEN", hide_env_values = true)]
    pub blob_token: Option<String>,

    /// Largest accepted upload in bytes
    #[clap(long, env = "WARDROBO_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: Option<u64>,

    /// API key for the hosted model
    #[clap(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub ai_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[clap(long, env = "OPENAI_BASE_URL")]
    pub ai_base_url: Option<String>,

    /// Model for search prompts
    #[clap(long, env = "WARDROBO_TEXT_MODEL")]
    pub ai_text_model: Option<String>,

    /// Model for image tagging
    #[clap(long, env = "WARDROBO_VISION_MODEL")]
    pub ai_vision_model: Option<String>,

    /// Disable vision tagging of uploads
    #[clap(long, env = "WARDROBO_NO_AUTO_TAG", default_value_t = false)]
    pub no_auto_tag: bool,

    /// Directory for JSON log files
    #[clap(long, env = "WARDROBO_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Debug mode
    #[clap(long, env = "WARDROBO_DEBUG", default_value_t = false)]
    pub debug: bool,
}

/// Settings for the hosted model client
#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    pub api_key: String,
    pub base_url: String,
    pub text_model: String,
    pub vision_model: String,
    pub timeout_secs: u64,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            listen_addr: update.listen_addr.unwrap_or(self.listen_addr),
            upload_dir: update.upload_dir.unwrap_or(self.upload_dir),
            public_upload_prefix: update.public_upload_prefix.unwrap_or(self.public_upload_prefix),
            blob_endpoint: update.blob_endpoint.or(self.blob_endpoint),
            blob_token: update.blob_token.or(self.blob_token),
            max_upload_bytes: update.max_upload_bytes.unwrap_or(self.max_upload_bytes),
            default_per_page: update.default_per_page.unwrap_or(self.default_per_page),
            max_per_page: update.max_per_page.unwrap_or(self.max_per_page),
            ai_api_key: update.ai_api_key.or(self.ai_api_key),
            ai_base_url: update.ai_base_url.unwrap_or(self.ai_base_url),
            ai_text_model: update.ai_text_model.unwrap_or(self.ai_text_model),
            ai_vision_model: update.ai_vision_model.unwrap_or(self.ai_vision_model),
            ai_timeout_secs: update.ai_timeout_secs.unwrap_or(self.ai_timeout_secs),
            auto_tag: update.auto_tag.unwrap_or(self.auto_tag),
            log_dir: update.log_dir.or(self.log_dir),
            server_url: update.server_url.or(self.server_url),
        }
    }

    /// Returns the model client settings, or `None` when no API key is set
    pub fn ai_config(&self) -> Option<AiConfig> {
        let api_key = self.ai_api_key.as_ref().filter(|key| !key.trim().is_empty())?;
        Some(AiConfig {
            api_key: api_key.clone(),
            base_url: self.ai_base_url.clone(),
            text_model: self.ai_text_model.clone(),
            vision_model: self.ai_vision_model.clone(),
            timeout_secs: self.ai_timeout_secs,
        })
    }

    /// One-line description of the effective settings, without secrets
    pub fn summary(&self) -> String {
        let storage = self
            .blob_endpoint
            .as_deref()
            .filter(|endpoint| !endpoint.trim().is_empty())
            .unwrap_or(&self.upload_dir);
        format!(
            "database_url={}, listen_addr={}, storage={}, ai={}, auto_tag={}",
            self.database_url,
            self.listen_addr,
            storage,
            if self.ai_config().is_some() { "enabled" } else { "disabled" },
            self.auto_tag
        )
    }

    /// Returns the pagination defaults, keeping the default within the max
    pub fn page_settings(&self) -> PageSettings {
        let max_per_page = self.max_per_page.max(1);
        PageSettings {
            default_per_page: self.default_per_page.clamp(1, max_per_page),
            max_per_page,
        }
    }
}

/// Returns the base (default) configuration
pub fn base_config(config_path: Option<PathBuf>) -> Config {
    let (database_url, upload_dir) = match config_path {
        Some(path) => (
            path.join("wardrobo.db").to_string_lossy().to_string(),
            path.join("uploads").to_string_lossy().to_string(),
        ),
        None => ("wardrobo.db".to_string(), "uploads".to_string()),
    };

    Config {
        database_url,
        listen_addr: "127.0.0.1:3000".to_string(),
        upload_dir,
        public_upload_prefix: "/uploads".to_string(),
        blob_endpoint: None,
        blob_token: None,
        max_upload_bytes: 10 * 1024 * 1024,
        default_per_page: 24,
        max_per_page: 100,
        ai_api_key: None,
        ai_base_url: "https://api.openai.com/v1".to_string(),
        ai_text_model: "gpt-4o-mini".to_string(),
        ai_vision_model: "gpt-4o-mini".to_string(),
        ai_timeout_secs: 30,
        auto_tag: true,
        log_dir: None,
        server_url: None,
    }
}

/// Loads configuration from a TOML file
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ConfigUpdate>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            }
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                Err(format!("Failed to parse config file: {}", e))
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            Err(format!("Failed to read config file: {}", e))
        }
    }
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url,
        listen_addr: args.listen_addr,
        upload_dir: args.upload_dir,
        public_upload_prefix: None,
        blob_endpoint: args.blob_endpoint,
        blob_token: args.blob_token,
        max_upload_bytes: args.max_upload_bytes,
        default_per_page: None,
        max_per_page: None,
        ai_api_key: args.ai_api_key,
        ai_base_url: args.ai_base_url,
        ai_text_model: args.ai_text_model,
        ai_vision_model: args.ai_vision_model,
        ai_timeout_secs: None,
        auto_tag: args.no_auto_tag.then_some(false),
        log_dir: args.log_dir,
        server_url: None,
    }
}

/// Returns the XDG config directory for Wardrobo, if it exists
pub fn get_config_dir_path() -> Option<PathBuf> {
    let Some(proj_dirs) = ProjectDirs::from("com", "wardrobo", "wardrobo") else {
        warn!("Could not determine XDG config directory, skipping config file");
        return None;
    };

    let path = proj_dirs.config_dir().to_path_buf();
    if path.exists() {
        Some(path)
    } else {
        info!("Config path not found at {:?}, using defaults", path);
        None
    }
}

/// Gets the complete configuration by combining defaults with
/// values from config file, environment variables, and command line arguments
/// in order of increasing precedence
pub fn get_config(args: CliArgs) -> Config {
    let config_dir = get_config_dir_path();
    let base = base_config(config_dir.clone());
    let file_update = config_from_file(config_dir.map(|dir| dir.join("config.toml"))).unwrap_or_default();

    base
        .apply_update(file_update)
        .apply_update(config_from_args(args))
}
