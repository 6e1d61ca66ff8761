//! Bracket and match data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::errors::{BracketError, BracketResult};
use crate::tournament::models::{PlayerId, TournamentId};

/// Bracket ID type
pub type BracketId = Uuid;

/// Match ID type
pub type MatchId = Uuid;

/// Supported bracket sizes, smallest first
pub const BRACKET_SIZES: [u32; 6] = [2, 4, 8, 16, 32, 64];

/// Largest supported bracket
pub const MAX_BRACKET_SIZE: u32 = 64;

/// Match state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Pending,
    InProgress,
    Completed,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::InProgress => "in_progress",
            MatchStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MatchStatus::Pending),
            "in_progress" => Ok(MatchStatus::InProgress),
            "completed" => Ok(MatchStatus::Completed),
            other => Err(format!("unknown match status '{other}'")),
        }
    }
}

/// Bracket state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketStatus {
    Draft,
    Active,
    Completed,
}

impl BracketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BracketStatus::Draft => "draft",
            BracketStatus::Active => "active",
            BracketStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for BracketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BracketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(BracketStatus::Draft),
            "active" => Ok(BracketStatus::Active),
            "completed" => Ok(BracketStatus::Completed),
            other => Err(format!("unknown bracket status '{other}'")),
        }
    }
}

/// Player position within a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Player1,
    Player2,
}

impl Slot {
    pub const BOTH: [Slot; 2] = [Slot::Player1, Slot::Player2];

    /// Slot a winner of `match_number` occupies in the next round.
    ///
    /// Sibling matches `(2k-1, 2k)` feed match `k`: odd numbers take
    /// player 1, even numbers player 2.
    pub fn for_match_number(match_number: u32) -> Self {
        if match_number % 2 == 1 {
            Slot::Player1
        } else {
            Slot::Player2
        }
    }

    /// Database column holding this slot
    pub fn column(&self) -> &'static str {
        match self {
            Slot::Player1 => "player1_id",
            Slot::Player2 => "player2_id",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Player1 => f.write_str("player1"),
            Slot::Player2 => f.write_str("player2"),
        }
    }
}

/// Bracket layout type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketType {
    #[default]
    Single,
    Split,
}

/// Elimination format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketFormat {
    #[default]
    SingleElimination,
    DoubleElimination,
}

/// How registered players are ordered before pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seeding {
    /// Ascending registration seed
    #[default]
    Standard,
    /// Shuffled
    Random,
    /// The order the registrations were supplied in
    Manual,
}

/// Best-of setting for the championship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BestOf {
    #[default]
    Disabled,
    Three,
    Five,
    Seven,
}

/// Bracket configuration chosen by the organizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BracketConfig {
    pub bracket_type: BracketType,
    pub format: BracketFormat,
    pub seeding: Seeding,
    /// Number of tables round-one matches are spread across
    pub tables_per_bracket: u32,
    pub weighted_matchups: bool,
    /// Requested bracket size; `None` picks the smallest size that fits
    pub bracket_size: Option<u32>,
    /// Race-to target for winners' side matches
    pub uppers_race_to: u32,
    /// Race-to target for losers' side matches
    pub lowers_race_to: u32,
    pub championship_format: String,
    pub best_of: BestOf,
}

impl Default for BracketConfig {
    fn default() -> Self {
        Self {
            bracket_type: BracketType::Single,
            format: BracketFormat::SingleElimination,
            seeding: Seeding::Standard,
            tables_per_bracket: 2,
            weighted_matchups: false,
            bracket_size: None,
            uppers_race_to: 3,
            lowers_race_to: 3,
            championship_format: "Single Game".to_string(),
            best_of: BestOf::Disabled,
        }
    }
}

impl BracketConfig {
    /// Reject configurations the generator cannot honour
    pub fn validate(&self) -> BracketResult<()> {
        if self.format != BracketFormat::SingleElimination {
            return Err(BracketError::Configuration(
                "only single elimination brackets can be generated".to_string(),
            ));
        }
        if self.tables_per_bracket == 0 {
            return Err(BracketError::Configuration(
                "tables per bracket must be at least 1".to_string(),
            ));
        }
        if self.uppers_race_to == 0 || self.lowers_race_to == 0 {
            return Err(BracketError::Configuration(
                "race-to must be at least 1".to_string(),
            ));
        }
        if let Some(size) = self.bracket_size
            && !BRACKET_SIZES.contains(&size)
        {
            return Err(BracketError::Configuration(format!(
                "unsupported bracket size {size}"
            )));
        }
        Ok(())
    }
}

/// A generated bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    pub id: BracketId,
    pub tournament_id: TournamentId,
    pub config: BracketConfig,
    pub bracket_size: u32,
    pub status: BracketStatus,
    pub created_at: DateTime<Utc>,
}

impl Bracket {
    /// Number of rounds, `log2(bracket_size)`
    pub fn total_rounds(&self) -> u32 {
        total_rounds(self.bracket_size)
    }
}

/// Number of rounds in a bracket of the given power-of-two size
pub fn total_rounds(bracket_size: u32) -> u32 {
    bracket_size.trailing_zeros()
}

/// Storage-independent match record keyed by round and match number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSlot {
    pub round: u32,
    pub match_number: u32,
    pub player1: Option<PlayerId>,
    pub player2: Option<PlayerId>,
    pub player1_score: u32,
    pub player2_score: u32,
    pub winner: Option<PlayerId>,
    pub table_number: Option<u32>,
    pub status: MatchStatus,
}

impl MatchSlot {
    /// An undecided match with no players
    pub fn empty(round: u32, match_number: u32) -> Self {
        Self {
            round,
            match_number,
            player1: None,
            player2: None,
            player1_score: 0,
            player2_score: 0,
            winner: None,
            table_number: None,
            status: MatchStatus::Pending,
        }
    }

    pub fn key(&self) -> (u32, u32) {
        (self.round, self.match_number)
    }

    pub fn player(&self, slot: Slot) -> Option<PlayerId> {
        match slot {
            Slot::Player1 => self.player1,
            Slot::Player2 => self.player2,
        }
    }

    pub fn set_player(&mut self, slot: Slot, player: Option<PlayerId>) {
        match slot {
            Slot::Player1 => self.player1 = player,
            Slot::Player2 => self.player2 = player,
        }
    }

    pub fn player_count(&self) -> usize {
        usize::from(self.player1.is_some()) + usize::from(self.player2.is_some())
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.player1 == Some(player) || self.player2 == Some(player)
    }

    pub fn is_completed(&self) -> bool {
        self.status == MatchStatus::Completed
    }

    /// Completed with nobody to advance
    pub fn is_void(&self) -> bool {
        self.is_completed() && self.player_count() == 0
    }

    /// Nothing has been played or recorded yet
    pub fn is_untouched(&self) -> bool {
        self.status == MatchStatus::Pending && self.player1_score == 0 && self.player2_score == 0
    }

    /// Completed automatically because one side had no opponent
    pub fn is_auto_bye(&self) -> bool {
        self.is_completed()
            && self.player_count() == 1
            && self.player1_score == 0
            && self.player2_score == 0
    }

    /// Whether the result columns (scores, winner, table, status) differ
    pub fn result_differs(&self, other: &MatchSlot) -> bool {
        self.player1_score != other.player1_score
            || self.player2_score != other.player2_score
            || self.winner != other.winner
            || self.table_number != other.table_number
            || self.status != other.status
    }
}

/// A persisted match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub bracket_id: BracketId,
    #[serde(flatten)]
    pub slot: MatchSlot,
}
