//! Application state, bootstrap and router assembly.

use axum::{
    extract::{FromRef, State},
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use gitview_storage::{RepoStore, StorageError};
use gitview_web::{web_routes, UserStore, WebState};
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;

use crate::config::NodeConfig;
use crate::observability::request_id_middleware;

/// Shared state of the node.
#[derive(Clone)]
pub struct AppState {
    pub web: WebState,
    /// Time the node finished bootstrapping.
    pub started: Instant,
}

impl AppState {
    /// Wraps the front-end state.
    pub fn new(web: WebState) -> Self {
        Self {
            web,
            started: Instant::now(),
        }
    }
}

impl FromRef<AppState> for WebState {
    fn from_ref(state: &AppState) -> Self {
        state.web.clone()
    }
}

/// Opens the repositories folder and loads the users and repository
/// models.
///
/// Fails when the repositories folder does not exist. Repositories that
/// fail to load are skipped. Repositories are followed on disk after
/// start-up, so pushes and new repositories show without a restart.
pub fn bootstrap(config: &NodeConfig) -> Result<AppState, StorageError> {
    let repos = Arc::new(RepoStore::open(&config.repositories.base_dir)?);
    tracing::info!(
        base_dir = %config.repositories.base_dir.display(),
        count = repos.len(),
        "Loaded repositories"
    );

    let users = Arc::new(UserStore::new(config.users.iter().cloned()));
    let web = WebState::new(repos.clone(), users, config.web.clone());

    for model in &config.repositories.models {
        if repos.get(&model.name).is_err() {
            tracing::warn!(repository = %model.name, "Configured repository was not found");
        }
        web.set_repository_model(model.clone());
    }

    Ok(AppState::new(web))
}

/// Creates the node router: health check and web pages, with request ids
/// and HTTP tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(web_routes())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "repositories": state.web.repos.len(),
        "uptime_seconds": state.started.elapsed().as_secs(),
    }))
}
