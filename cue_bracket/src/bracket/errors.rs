//! Bracket error types.

use std::time::Duration;
use thiserror::Error;

use super::models::{BracketId, MatchId, Slot};
use crate::db::timeouts::TimeoutError;
use crate::tournament::{TournamentError, TournamentId};

/// Bracket errors
#[derive(Debug, Error)]
pub enum BracketError {
    /// Invalid bracket input, raised before anything is written
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An advancement target that generation should have created is missing
    #[error("Integrity error: no match {match_number} in round {round}")]
    Integrity { round: u32, match_number: u32 },

    /// The destination slot already holds a different player and can no
    /// longer be changed
    #[error("Slot conflict: round {round} match {match_number} {slot} is already decided")]
    SlotConflict {
        round: u32,
        match_number: u32,
        slot: Slot,
    },

    #[error("Invalid result: {0}")]
    InvalidResult(String),

    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    #[error("Bracket not found: {0}")]
    BracketNotFound(BracketId),

    #[error("No bracket for tournament {0}")]
    NoBracket(TournamentId),

    #[error("Tournament already has an active bracket")]
    ActiveBracketExists,

    #[error(transparent)]
    Tournament(#[from] TournamentError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<TimeoutError> for BracketError {
    fn from(err: TimeoutError) -> Self {
        match err {
            TimeoutError::Timeout(duration) => BracketError::Timeout(duration),
            TimeoutError::Database(e) => BracketError::Database(e),
        }
    }
}

impl BracketError {
    /// Message that is safe to show to the organizer
    pub fn client_message(&self) -> String {
        match self {
            BracketError::Database(_) | BracketError::Serialization(_) => {
                "Internal server error".to_string()
            }
            BracketError::Integrity { .. } => "Bracket data is inconsistent".to_string(),
            BracketError::Tournament(e) => e.client_message(),
            _ => self.to_string(),
        }
    }
}

/// Result type for bracket operations
pub type BracketResult<T> = Result<T, BracketError>;
