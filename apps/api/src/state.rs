use std::sync::Arc;

use crate::analysis::Analyzer;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum
/// extractors. The analyzer is built once at startup and is read-only for
/// the process lifetime, so concurrent requests share it freely.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub config: Config,
}
