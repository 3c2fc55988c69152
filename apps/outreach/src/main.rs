mod config;
mod errors;
mod export;
mod extraction;
mod llm_client;
mod outreach;
mod routes;
mod sources;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::filter::{CategoryTable, KeywordFilter};
use crate::extraction::matcher::EmailMatcher;
use crate::llm_client::{LlmClient, TextGenerator};
use crate::routes::build_router;
use crate::sources::{HttpPageFetcher, TextResolver};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Outreach v{}", env!("CARGO_PKG_VERSION"));

    let matcher = Arc::new(EmailMatcher::new()?);

    // Category table: built-in defaults, extended by CATEGORIES_PATH
    let mut categories = CategoryTable::default();
    if let Some(path) = &config.categories_path {
        categories.merge(CategoryTable::from_json_file(path)?);
        info!("Loaded categories from {}", path.display());
    }
    let filter = KeywordFilter::new(Arc::new(categories));

    let fetcher = HttpPageFetcher::new(Duration::from_secs(config.fetch_timeout_secs))?;
    let resolver = TextResolver::new(Arc::new(fetcher));

    let generator: Option<Arc<dyn TextGenerator>> = match &config.anthropic_api_key {
        Some(key) => {
            let client = LlmClient::new(key.clone())?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(Arc::new(client))
        }
        None => {
            info!("ANTHROPIC_API_KEY not set, emails use the generic template");
            None
        }
    };

    info!("No mail transport configured, /outreach/send accepts dry runs only");

    let state = AppState {
        config: config.clone(),
        matcher,
        filter,
        resolver,
        generator,
        mailer: None,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS once a frontend origin exists

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
