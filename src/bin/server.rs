use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use wardrobo::config::{get_config, CliArgs, Config};
use wardrobo::{create_app, db, run_migrations, AppState};

/// Installs stderr logging plus, when a log directory is configured, a
/// daily JSON log file. The returned guard flushes the file on drop.
fn init_tracing(config: &Config, debug: bool) -> Option<WorkerGuard> {
    let default_filter = if debug {
        "wardrobo=debug,tower_http=debug"
    } else {
        "wardrobo=info,tower_http=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "wardrobo.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_writer(writer).boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env before clap reads them
    dotenv::dotenv().ok();

    let args = CliArgs::parse();
    let debug = args.debug;
    let config = get_config(args);
    let _guard = init_tracing(&config, debug);
    info!("Final configuration: {}", config.summary());

    let pool = db::init_pool(&config.database_url)?;
    {
        let mut conn = pool.get().context("Failed to get connection for migrations")?;
        run_migrations(&mut conn)?;
    }

    let state = AppState::from_config(Arc::new(pool), &config)?;
    if state.ai.is_none() {
        warn!("No AI API key configured; prompt search will return 502 and uploads stay untagged");
    }
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.listen_addr))?;
    info!("Wardrobo listening on {}", config.listen_addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
