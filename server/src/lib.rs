use anyhow::Result;
use axum::{extract::{Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use indexer::{build_engine_from_path, BuildOptions};
use parking_lot::RwLock;
use search_core::{Hit, IndexStats, SearchEngine, SearchResults};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Corpus file or directory, re-read on rebuild.
    pub input: PathBuf,
    pub options: BuildOptions,
    pub admin_token: Option<String>,
    /// Comma-separated origins; any origin when unset.
    pub cors_allow_origin: Option<String>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}

#[derive(Deserialize)]
pub struct SuggestParams {
    pub prefix: String,
    #[serde(default = "default_k")]
    pub k: usize,
}

fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    /// The query after cleaning, absent when nothing indexable was left.
    pub term: Option<String>,
    pub found: bool,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<Hit>,
}

#[derive(Serialize)]
pub struct SuggestResponse {
    pub prefix: String,
    pub words: Vec<String>,
}

/// The live snapshot. Queries clone the inner `Arc` and never hold the lock
/// while ranking; a rebuild replaces the `Arc` wholesale.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RwLock<Arc<SearchEngine>>>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn snapshot(&self) -> Arc<SearchEngine> { self.engine.read().clone() }
}

pub fn build_app(config: AppConfig) -> Result<Router> {
    let engine = build_engine_from_path(&config.input, &config.options)?;
    Ok(router(engine, config))
}

pub fn router(engine: SearchEngine, config: AppConfig) -> Router {
    let cors = match &config.cors_allow_origin {
        Some(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        None => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let state = AppState { engine: Arc::new(RwLock::new(Arc::new(engine))), config: Arc::new(config) };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/suggest", get(suggest_handler))
        .route("/stats", get(stats_handler))
        .route("/index/rebuild", post(rebuild_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let engine = state.snapshot();
    let term = state.config.options.preprocessor.normalize_term(&params.q);
    let results = match &term {
        Some(word) => engine.search(word),
        None => SearchResults::NotIndexed,
    };
    let found = !results.is_not_indexed();
    let total_hits = results.hits().len();
    let k = params.k.clamp(1, 100);
    let results = results.top(k).into_hits();

    let elapsed = start.elapsed();
    Json(SearchResponse { query: params.q, term, found, took_s: elapsed.as_secs_f64(), total_hits, results })
}

pub async fn suggest_handler(State(state): State<AppState>, Query(params): Query<SuggestParams>) -> Json<SuggestResponse> {
    let prefix = state.config.options.preprocessor.normalize_prefix(&params.prefix);
    let words = match &prefix {
        Some(p) => state.snapshot().suggest(p, params.k.clamp(1, 100)),
        None => Vec::new(),
    };
    Json(SuggestResponse { prefix: prefix.unwrap_or_default(), words })
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<IndexStats> {
    Json(state.snapshot().stats())
}

/// Rebuilds from the configured input and swaps the new snapshot in.
async fn rebuild_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<IndexStats>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let config = state.config.clone();
    let engine = tokio::task::spawn_blocking(move || build_engine_from_path(&config.input, &config.options))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))?;
    let stats = engine.stats();
    *state.engine.write() = Arc::new(engine);
    tracing::info!(documents = stats.documents, words = stats.words, "swapped in rebuilt index");
    Ok(Json(stats))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let required = match &state.config.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
