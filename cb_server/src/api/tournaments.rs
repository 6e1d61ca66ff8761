//! Tournament and registration endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use cue_bracket::tournament::{NewPlayer, NewTournament, Registration, Tournament};
use uuid::Uuid;

use super::{AppState, error::ApiError};

/// List all tournaments ordered by date
pub async fn list_tournaments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Tournament>>, ApiError> {
    let tournaments = state.tournaments.list_tournaments().await?;
    Ok(Json(tournaments))
}

/// Create a tournament
pub async fn create_tournament(
    State(state): State<AppState>,
    Json(request): Json<NewTournament>,
) -> Result<(StatusCode, Json<Tournament>), ApiError> {
    let tournament = state.tournaments.create_tournament(request).await?;
    tracing::info!(
        tournament_id = %tournament.id,
        "Tournament '{}' created for {}",
        tournament.name,
        tournament.date
    );
    Ok((StatusCode::CREATED, Json(tournament)))
}

/// Get a single tournament
pub async fn get_tournament(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Tournament>, ApiError> {
    let tournament = state.tournaments.get_tournament(id).await?;
    Ok(Json(tournament))
}

/// Registered players ordered by seed
pub async fn list_players(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Registration>>, ApiError> {
    let players = state.tournaments.list_players(id).await?;
    Ok(Json(players))
}

/// Register a player for a tournament
pub async fn register_player(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<NewPlayer>,
) -> Result<(StatusCode, Json<Registration>), ApiError> {
    let registration = state.tournaments.register_player(id, request).await?;
    Ok((StatusCode::CREATED, Json(registration)))
}
