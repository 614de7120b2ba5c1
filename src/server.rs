//! SaveKar HTTP server.
//!
//! Settings come from `settings.json` (platform config dir, or the path in
//! `SAVEKAR_CONFIG`) with environment overrides applied on top.
//!
//! Logging is configured by environment:
//!   LOG_FORMAT  - "json" or "text" (default: "text")
//!   LOG_FILE    - path to a daily rolling log file (optional)
//!   LOG_ANSI    - "true"/"false" override ANSI colors
//!   RUST_LOG    - env filter (default: "savekar=debug,tower_http=debug")

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use savekar::app::App;
use savekar::http_handler::router;
use savekar::services::settings_engine::{SettingsEngine, SettingsEngineTrait};

fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "savekar=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    let guard = if let Some(ref path) = log_file {
        let dir = Path::new(path).parent().unwrap_or(Path::new("."));
        let name = Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("savekar.log");
        let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, name));

        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry.with(tracing_subscriber::fmt::layer().json()).init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "logging initialized"
    );
    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = init_logging();

    let mut engine = SettingsEngine::new(std::env::var("SAVEKAR_CONFIG").ok());
    engine
        .load()
        .with_context(|| format!("loading settings from {}", engine.get_config_path()))?;
    engine
        .apply_overrides(|var| std::env::var(var).ok())
        .context("applying environment overrides")?;
    let settings = engine.get_settings().clone();
    info!(config = %engine.get_config_path(), bind = %settings.server.bind, "settings loaded");

    let bind = settings.server.bind.clone();
    let app = Arc::new(App::new(settings).context("initializing SaveKar")?);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {}", bind))?;
    info!(addr = %bind, "SaveKar server listening");
    axum::serve(listener, router(app)).await?;

    Ok(())
}
