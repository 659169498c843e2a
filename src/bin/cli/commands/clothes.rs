use std::path::PathBuf;

use clap::Subcommand;

use crate::client::{content_type_for_path, ListParams, WardroboClient};
use crate::output::{self, OutputConfig};

/// Catalog commands
#[derive(Subcommand, Debug)]
pub enum ClothesCommands {
    /// List clothing items, newest first
    List {
        /// Page number, starting at 1
        #[clap(long)]
        page: Option<u32>,
        /// Items per page
        #[clap(long)]
        per_page: Option<u32>,
        /// Only this category, e.g. TOPS or jeans
        #[clap(long)]
        category: Option<String>,
        /// Only this color
        #[clap(long)]
        color: Option<String>,
        /// Words that must all appear in name, description, brand or tags
        #[clap(long)]
        search: Option<String>,
        /// Only items owned by this user ID
        #[clap(long)]
        owner: Option<String>,
    },
    /// Get a specific clothing item by ID
    Get {
        /// The item ID
        id: String,
    },
    /// Search with a natural-language prompt, e.g. "red striped shirts under $30"
    Search {
        /// The search prompt
        prompt: String,
        /// Narrow the results to this color
        #[clap(long)]
        color: Option<String>,
        #[clap(long)]
        page: Option<u32>,
        #[clap(long)]
        per_page: Option<u32>,
    },
    /// Upload a garment photo as a new item
    Upload {
        /// Path to a JPEG, PNG, WebP, GIF or AVIF image
        file: PathBuf,
        /// Item name (default: from the vision model or the file name)
        #[clap(long)]
        name: Option<String>,
        /// Owner user ID
        #[clap(long)]
        owner: Option<String>,
    },
}

/// Executes a catalog command
pub async fn execute(
    client: &WardroboClient,
    cmd: ClothesCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ClothesCommands::List { page, per_page, category, color, search, owner } => {
            let params = ListParams { page, per_page, category, color, search, owner };
            let result = client.list_clothes(&params).await?;
            output::print_page(&result, config);
        }
        ClothesCommands::Get { id } => {
            let item = client.get_clothing_item(&id).await?;
            output::print_item(&item, config);
        }
        ClothesCommands::Search { prompt, color, page, per_page } => {
            let result = client.search(&prompt, color.as_deref(), page, per_page).await?;
            output::print_page(&result, config);
        }
        ClothesCommands::Upload { file, name, owner } => {
            let content_type = content_type_for_path(&file)
                .ok_or_else(|| format!("Unsupported image file: {}", file.display()))?;
            let bytes = tokio::fs::read(&file).await?;
            let file_name = file
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());
            let item = client.upload(file_name, content_type, bytes, name, owner).await?;
            output::print_item(&item, config);
        }
    }
    Ok(())
}
