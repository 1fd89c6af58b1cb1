//! Layout Translator Web - HTTP service translating PDFs by URL.

mod helpers;
mod routes;
mod state;

use anyhow::{Context, Result};
use clap::Parser;
use layout_translator_core::{AppConfig, TranslatorConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "layout-translator-web")]
#[command(author, version, about = "Layout Translator Web Server", long_about = None)]
struct Args {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to
    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// LibreTranslate base URL (falls back to EXPO_PUBLIC_LT_URL)
    #[arg(long, env = "LT_URL")]
    lt_url: Option<String>,

    /// LibreTranslate API key (falls back to EXPO_PUBLIC_LT_API_KEY)
    #[arg(long, env = "LT_API_KEY", hide_env_values = true)]
    lt_api_key: Option<String>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path).context("Failed to load config file")?,
        None => AppConfig::load(),
    };
    let file = std::mem::take(&mut config.translator);
    let timeout_secs = file.timeout_secs;
    config.translator = TranslatorConfig::new(args.lt_url, args.lt_api_key)
        .or(file)
        .or(TranslatorConfig::from_env());
    config.translator.timeout_secs = timeout_secs;

    // Requests fail with 500 until this is fixed; /health reports it too
    if let Err(e) = config.translator.validate() {
        warn!("Translation service not configured: {}", e);
    }

    let state = Arc::new(AppState::new(config).context("Failed to initialize application state")?);

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
