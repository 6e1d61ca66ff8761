//! Tournament error types.

use std::time::Duration;
use thiserror::Error;

use super::models::TournamentId;
use crate::db::timeouts::TimeoutError;

/// Tournament errors
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("Tournament not found: {0}")]
    NotFound(TournamentId),

    #[error("Tournament is full")]
    TournamentFull,

    /// Registration only happens before a bracket is running
    #[error("Registration is closed")]
    RegistrationClosed,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),
}

impl From<TimeoutError> for TournamentError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Timeout(duration) => TournamentError::Timeout(duration),
            TimeoutError::Database(e) => TournamentError::Database(e),
        }
    }
}

impl TournamentError {
    /// Get a client-safe error message that doesn't leak database details
    pub fn client_message(&self) -> String {
        match self {
            TournamentError::Database(_) => "Internal server error".to_string(),
            TournamentError::NotFound(_) => "Tournament not found".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for tournament operations
pub type TournamentResult<T> = Result<T, TournamentError>;
