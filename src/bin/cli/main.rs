mod client;
mod commands;
mod output;

use clap::Parser;
use client::WardroboClient;
use output::{OutputConfig, OutputFormat};
use std::process;
use wardrobo::config;

/// CLI for the Wardrobo clothing catalog
#[derive(Parser, Debug)]
#[clap(name = "wardrobo-cli", about = "Browse, search and add to a Wardrobo catalog")]
struct Cli {
    /// Server URL to connect to
    #[clap(long, env = "WARDROBO_URL", global = true)]
    server_url: Option<String>,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    format: OutputFormat,

    /// Quiet mode: print only item IDs
    #[clap(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: commands::clothes::ClothesCommands,
}

/// Resolves the server URL from CLI args, config file, or defaults
///
/// Precedence: CLI flag / env var > config file > default
fn resolve_server_url(cli_url: Option<String>) -> String {
    if let Some(url) = cli_url {
        return url;
    }

    // Try reading from config file
    if let Some(dir) = config::get_config_dir_path() {
        if let Ok(update) = config::config_from_file(Some(dir.join("config.toml"))) {
            if let Some(url) = update.server_url {
                return url;
            }
        }
    }

    "http://localhost:3000".to_string()
}

/// Formats an error for human-readable stderr output
fn format_error(err: &dyn std::error::Error) -> String {
    let err_string = err.to_string();

    if err_string.contains("error sending request")
        || err_string.contains("Connection refused")
        || err_string.contains("connection refused")
        || err_string.contains("tcp connect error")
    {
        return format!("Could not connect to server. Is wardrobo running?\n  {}", err_string);
    }

    // ClientError::Server already reads "Server error (STATUS): message"
    err_string
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let client = WardroboClient::new(resolve_server_url(cli.server_url));
    let output_config = OutputConfig {
        format: cli.format,
        quiet: cli.quiet,
    };

    if let Err(e) = commands::clothes::execute(&client, cli.command, &output_config).await {
        eprintln!("Error: {}", format_error(e.as_ref()));
        process::exit(1);
    }
}
