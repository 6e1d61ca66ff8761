//! Mapping of domain errors onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cue_bracket::{BracketError, TournamentError};
use serde::{Deserialize, Serialize};

/// JSON error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An error on its way back to the client
///
/// The body only ever carries the sanitized client message; the full error
/// is logged when the status is a server error.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

fn tournament_status(err: &TournamentError) -> StatusCode {
    match err {
        TournamentError::NotFound(_) => StatusCode::NOT_FOUND,
        TournamentError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        TournamentError::TournamentFull | TournamentError::RegistrationClosed => {
            StatusCode::CONFLICT
        }
        TournamentError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
        TournamentError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn bracket_status(err: &BracketError) -> StatusCode {
    match err {
        BracketError::Configuration(_) | BracketError::InvalidResult(_) => StatusCode::BAD_REQUEST,
        BracketError::MatchNotFound(_)
        | BracketError::BracketNotFound(_)
        | BracketError::NoBracket(_) => StatusCode::NOT_FOUND,
        BracketError::SlotConflict { .. } | BracketError::ActiveBracketExists => {
            StatusCode::CONFLICT
        }
        BracketError::Tournament(e) => tournament_status(e),
        BracketError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
        BracketError::Integrity { .. }
        | BracketError::Database(_)
        | BracketError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<TournamentError> for ApiError {
    fn from(err: TournamentError) -> Self {
        let status = tournament_status(&err);
        if status.is_server_error() {
            tracing::error!("Tournament request failed: {}", err);
        }
        Self::new(status, err.client_message())
    }
}

impl From<BracketError> for ApiError {
    fn from(err: BracketError) -> Self {
        let status = bracket_status(&err);
        if status.is_server_error() {
            tracing::error!("Bracket request failed: {}", err);
        }
        Self::new(status, err.client_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cue_bracket::bracket::Slot;
    use std::time::Duration;
    use uuid::Uuid;

    #[test]
    fn test_conflicts_map_to_409() {
        let err: ApiError = BracketError::SlotConflict {
            round: 2,
            match_number: 1,
            slot: Slot::Player1,
        }
        .into();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err: ApiError = BracketError::ActiveBracketExists.into();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_missing_resources_map_to_404() {
        let err: ApiError = BracketError::MatchNotFound(Uuid::new_v4()).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let err: ApiError =
            BracketError::Tournament(TournamentError::NotFound(Uuid::new_v4())).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Tournament not found");
    }

    #[test]
    fn test_internal_errors_are_sanitized() {
        let err: ApiError = BracketError::Integrity {
            round: 3,
            match_number: 1,
        }
        .into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Bracket data is inconsistent");
    }

    #[test]
    fn test_timeouts_map_to_503() {
        let err: ApiError = TournamentError::Timeout(Duration::from_secs(5)).into();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
