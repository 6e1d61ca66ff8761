//! Bracket endpoints: generate, view, score and delete.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use cue_bracket::bracket::{
    BestOf, BracketConfig, BracketFormat, BracketStatus, BracketType, BracketView, MatchUpdate,
    Seeding,
};
use cue_bracket::BracketError;
use serde::Deserialize;
use uuid::Uuid;

use super::{AppState, error::ApiError, request_id::RequestId};
use crate::config::BracketDefaults;
use crate::{logging, metrics};

/// Bracket settings as sent by the organizer
///
/// Omitted fields fall back to the server's defaults, then to
/// [`BracketConfig::default`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateBracketRequest {
    pub bracket_type: Option<BracketType>,
    pub format: Option<BracketFormat>,
    pub seeding: Option<Seeding>,
    pub tables_per_bracket: Option<u32>,
    pub weighted_matchups: Option<bool>,
    pub bracket_size: Option<u32>,
    pub uppers_race_to: Option<u32>,
    pub lowers_race_to: Option<u32>,
    pub championship_format: Option<String>,
    pub best_of: Option<BestOf>,
}

impl CreateBracketRequest {
    pub fn into_config(self, defaults: &BracketDefaults) -> BracketConfig {
        let base = BracketConfig::default();
        BracketConfig {
            bracket_type: self.bracket_type.unwrap_or(base.bracket_type),
            format: self.format.unwrap_or(base.format),
            seeding: self.seeding.unwrap_or(base.seeding),
            tables_per_bracket: self
                .tables_per_bracket
                .unwrap_or(defaults.tables_per_bracket),
            weighted_matchups: self.weighted_matchups.unwrap_or(base.weighted_matchups),
            bracket_size: self.bracket_size,
            uppers_race_to: self.uppers_race_to.unwrap_or(defaults.race_to),
            lowers_race_to: self.lowers_race_to.unwrap_or(defaults.race_to),
            championship_format: self
                .championship_format
                .unwrap_or(base.championship_format),
            best_of: self.best_of.unwrap_or(base.best_of),
        }
    }
}

/// The tournament's current bracket with its layout
pub async fn get_bracket(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BracketView>, ApiError> {
    // Surface a missing tournament as such before reporting a missing bracket
    state.tournaments.get_tournament(id).await?;
    let view = state
        .brackets
        .bracket_view(id)
        .await?
        .ok_or(BracketError::NoBracket(id))?;
    Ok(Json(view))
}

/// Generate a bracket from the current registrations
pub async fn create_bracket(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateBracketRequest>,
) -> Result<(StatusCode, Json<BracketView>), ApiError> {
    let config = request.into_config(&state.bracket_defaults);
    let view = state.brackets.create_bracket(id, config).await?;

    metrics::brackets_created_total(view.bracket.bracket_size);
    logging::log_bracket_event(
        "create",
        &id.to_string(),
        &format!(
            "{}-slot bracket {} with {} players (request {})",
            view.bracket.bracket_size,
            view.bracket.id,
            view.players.len(),
            request_id.as_str()
        ),
    );
    Ok((StatusCode::CREATED, Json(view)))
}

/// Delete the tournament's current bracket
pub async fn delete_bracket(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.brackets.delete_bracket(id).await?;
    logging::log_bracket_event(
        "delete",
        &id.to_string(),
        &format!("current bracket deleted (request {})", request_id.as_str()),
    );
    Ok(StatusCode::NO_CONTENT)
}

/// Record scores, table and status for a match
pub async fn record_match(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(match_id): Path<Uuid>,
    Json(update): Json<MatchUpdate>,
) -> Result<Json<BracketView>, ApiError> {
    let status = update.status;
    let view = state.brackets.record_match(match_id, update).await?;

    metrics::matches_recorded_total(status.as_str());
    let was_final = view
        .matches
        .iter()
        .any(|m| m.id == match_id && m.slot.round == view.total_rounds);
    if was_final && view.bracket.status == BracketStatus::Completed {
        metrics::brackets_completed_total();
        logging::log_bracket_event(
            "complete",
            &view.bracket.tournament_id.to_string(),
            &format!(
                "champion {} (request {})",
                view.player_name(view.champion),
                request_id.as_str()
            ),
        );
    }
    Ok(Json(view))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_request_uses_server_defaults() {
        let defaults = BracketDefaults {
            tables_per_bracket: 6,
            race_to: 5,
        };
        let request: CreateBracketRequest = serde_json::from_str("{}").unwrap();
        let config = request.into_config(&defaults);

        assert_eq!(config.tables_per_bracket, 6);
        assert_eq!(config.uppers_race_to, 5);
        assert_eq!(config.lowers_race_to, 5);
        assert_eq!(config.seeding, Seeding::Standard);
        assert_eq!(config.bracket_size, None);
    }

    #[test]
    fn test_request_values_override_defaults() {
        let request: CreateBracketRequest = serde_json::from_str(
            r#"{"tables_per_bracket": 1, "uppers_race_to": 7, "seeding": "manual", "bracket_size": 16}"#,
        )
        .unwrap();
        let config = request.into_config(&BracketDefaults::default());

        assert_eq!(config.tables_per_bracket, 1);
        assert_eq!(config.uppers_race_to, 7);
        assert_eq!(config.seeding, Seeding::Manual);
        assert_eq!(config.bracket_size, Some(16));
    }
}
