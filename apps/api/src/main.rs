mod analysis;
mod config;
mod errors;
mod extract;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::{lexicon::Lexicon, Analyzer};
use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CVLens API v{}", env!("CARGO_PKG_VERSION"));

    // Load the lexicon before binding anything: a broken ontology must stop
    // the process, not surface per-request.
    let lexicon = match &config.lexicon_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read lexicon file '{path}'"))?;
            Lexicon::from_json(&raw)
                .with_context(|| format!("Failed to parse lexicon file '{path}'"))?
        }
        None => Lexicon::builtin().context("Failed to load built-in lexicon")?,
    };
    info!(
        "Lexicon loaded: {} skills, {} action verbs",
        lexicon.skill_count(),
        lexicon.action_verb_count()
    );

    let analyzer = Analyzer::new(lexicon).context("Failed to compile text patterns")?;

    let state = AppState {
        analyzer: Arc::new(analyzer),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
