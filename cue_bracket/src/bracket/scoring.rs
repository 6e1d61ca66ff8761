//! Match result validation and winner resolution.

use serde::{Deserialize, Serialize};

use super::errors::{BracketError, BracketResult};
use super::models::{MatchSlot, MatchStatus};
use crate::tournament::models::PlayerId;

/// An organizer's edit of a single match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchUpdate {
    #[serde(default)]
    pub player1_score: u32,
    #[serde(default)]
    pub player2_score: u32,
    #[serde(default)]
    pub table_number: Option<u32>,
    pub status: MatchStatus,
}

/// Decide the winner of `m` after applying `update`.
///
/// The first player to reach `race_to` wins. A winner is only recorded for
/// completed matches. A match with a single player resolves to that player
/// when completed; a match with none has no winner.
pub fn resolve_winner(
    m: &MatchSlot,
    update: &MatchUpdate,
    race_to: u32,
) -> BracketResult<Option<PlayerId>> {
    if update.table_number == Some(0) {
        return Err(invalid("table number must be at least 1"));
    }
    if update.player1_score > race_to || update.player2_score > race_to {
        return Err(invalid(format!("scores cannot exceed race to {race_to}")));
    }
    if update.player1_score == race_to && update.player2_score == race_to {
        return Err(invalid("only one player can reach the race"));
    }

    match (m.player1, m.player2) {
        (Some(p1), Some(p2)) => {
            let leader = if update.player1_score == race_to {
                Some(p1)
            } else if update.player2_score == race_to {
                Some(p2)
            } else {
                None
            };
            match update.status {
                MatchStatus::Completed if leader.is_none() => Err(invalid(format!(
                    "a completed match needs a player at race to {race_to}"
                ))),
                MatchStatus::Completed => Ok(leader),
                _ => Ok(None),
            }
        }
        (Some(present), None) | (None, Some(present)) => {
            let absent_score = if m.player1.is_some() {
                update.player2_score
            } else {
                update.player1_score
            };
            if absent_score > 0 {
                return Err(invalid("the empty slot cannot score"));
            }
            Ok((update.status == MatchStatus::Completed).then_some(present))
        }
        (None, None) => {
            if update.player1_score > 0 || update.player2_score > 0 {
                return Err(invalid("a match without players cannot score"));
            }
            Ok(None)
        }
    }
}

fn invalid(msg: impl Into<String>) -> BracketError {
    BracketError::InvalidResult(msg.into())
}
