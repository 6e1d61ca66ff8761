pub mod brackets;
pub mod error;
pub mod request_id;
pub mod tournaments;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, put},
};
use cue_bracket::db::{BracketRepository, TournamentRepository};
use cue_bracket::{BracketManager, TournamentManager};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::BracketDefaults;

pub use error::{ApiError, ErrorResponse};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub tournaments: Arc<TournamentManager>,
    pub brackets: Arc<BracketManager>,
    /// Storage handle used by the health check
    pub store: Arc<dyn TournamentRepository>,
    pub bracket_defaults: BracketDefaults,
}

impl AppState {
    /// Build the state over a single store holding both tournaments and brackets
    pub fn new<R>(repo: Arc<R>, bracket_defaults: BracketDefaults) -> Self
    where
        R: TournamentRepository + BracketRepository + 'static,
    {
        Self {
            tournaments: Arc::new(TournamentManager::new(repo.clone())),
            brackets: Arc::new(BracketManager::new(repo.clone(), repo.clone())),
            store: repo,
            bracket_defaults,
        }
    }
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/tournaments",
            get(tournaments::list_tournaments).post(tournaments::create_tournament),
        )
        .route("/tournaments/{id}", get(tournaments::get_tournament))
        .route(
            "/tournaments/{id}/players",
            get(tournaments::list_players).post(tournaments::register_player),
        )
        .route(
            "/tournaments/{id}/bracket",
            get(brackets::get_bracket)
                .post(brackets::create_bracket)
                .delete(brackets::delete_bracket),
        )
        .route("/matches/{match_id}", put(brackets::record_match));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api)
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "timestamp": chrono::Utc::now().to_rfc3339(),
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "timestamp": chrono::Utc::now().to_rfc3339(),
                })),
            )
        }
    }
}
