use clap::ValueEnum;
use serde::Serialize;
use wardrobo::ai::FilterExtraction;
use wardrobo::dto::{PageMeta, Paginated};
use wardrobo::models::ClothingItemView;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Bundled output configuration passed to all print functions
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    /// The output format
    pub format: OutputFormat,
    /// When true, print minimal output (just IDs)
    pub quiet: bool,
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(err) => eprintln!("Failed to serialize output: {}", err),
    }
}

fn format_price(price: Option<f64>) -> String {
    price.map(|p| format!("{:.2}", p)).unwrap_or_else(|| "-".to_string())
}

/// Prints a page of clothing items in the specified format
pub fn print_page(page: &Paginated<ClothingItemView>, config: &OutputConfig) {
    match config.format {
        OutputFormat::Json => print_json(page),
        OutputFormat::Human => {
            if config.quiet {
                for view in &page.data {
                    println!("{}", view.item.get_id());
                }
                return;
            }
            if let Some(filters) = &page.filters {
                print_filters(filters);
            }
            print_items(&page.data);
            print_meta(&page.meta);
        }
    }
}

fn print_items(items: &[ClothingItemView]) {
    if items.is_empty() {
        println!("No clothing items found.");
        return;
    }

    let max_id = items.iter().map(|v| v.item.get_id().len()).max().unwrap_or(2);
    let max_name = items.iter().map(|v| v.item.get_name().len()).max().unwrap_or(4).max(4);
    println!(
        "{:<id_w$}  {:<11}  {:<name_w$}  {:>8}  COLORS",
        "ID",
        "CATEGORY",
        "NAME",
        "PRICE",
        id_w = max_id,
        name_w = max_name,
    );
    for view in items {
        let item = &view.item;
        println!(
            "{:<id_w$}  {:<11}  {:<name_w$}  {:>8}  {}",
            item.get_id(),
            item.get_category().as_str(),
            item.get_name(),
            format_price(item.get_price()),
            item.get_colors().join(", "),
            id_w = max_id,
            name_w = max_name,
        );
    }
}

fn print_meta(meta: &PageMeta) {
    println!(
        "\nPage {} of {} ({} items, {} per page)",
        meta.page, meta.total_pages, meta.total, meta.per_page
    );
}

fn print_filters(filters: &FilterExtraction) {
    if filters.is_empty() {
        println!("No filters understood from the prompt, showing everything.\n");
        return;
    }
    let mut parts = Vec::new();
    if !filters.categories.is_empty() {
        parts.push(format!("category: {}", filters.categories.join("/")));
    }
    if !filters.colors.is_empty() {
        parts.push(format!("colors: {}", filters.colors.join("/")));
    }
    if !filters.keywords.is_empty() {
        parts.push(format!("keywords: {}", filters.keywords.join(" ")));
    }
    if !filters.tags.is_empty() {
        parts.push(format!("tags: {}", filters.tags.join(", ")));
    }
    if let Some(brand) = &filters.brand {
        parts.push(format!("brand: {}", brand));
    }
    if filters.min_price.is_some() || filters.max_price.is_some() {
        parts.push(format!(
            "price: {}..{}",
            format_price(filters.min_price),
            format_price(filters.max_price)
        ));
    }
    if !filters.sizes.is_empty() {
        parts.push(format!("sizes: {}", filters.sizes.join("/")));
    }
    println!("Filters: {}\n", parts.join("; "));
}

/// Prints a single clothing item in the specified format
pub fn print_item(view: &ClothingItemView, config: &OutputConfig) {
    match config.format {
        OutputFormat::Json => print_json(view),
        OutputFormat::Human => {
            let item = &view.item;
            if config.quiet {
                println!("{}", item.get_id());
                return;
            }
            println!("ID:          {}", item.get_id());
            println!("Name:        {}", item.get_name());
            println!("Category:    {}", item.get_category());
            if let Some(description) = item.get_description() {
                println!("Description: {}", description);
            }
            println!("Price:       {}", format_price(item.get_price()));
            if let Some(brand) = item.get_brand() {
                println!("Brand:       {}", brand);
            }
            println!("Colors:      {}", item.get_colors().join(", "));
            if !item.get_sizes().is_empty() {
                println!("Sizes:       {}", item.get_sizes().join(", "));
            }
            if !item.get_tags().is_empty() {
                println!("Tags:        {}", item.get_tags().join(", "));
            }
            for image in &view.images {
                let marker = if image.is_primary() { " (primary)" } else { "" };
                println!("Image:       {}{}", image.get_url(), marker);
            }
            println!("Created:     {}", item.get_created_at());
        }
    }
}
