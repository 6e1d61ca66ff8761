//! Tournament and registration data models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Tournament ID type
pub type TournamentId = Uuid;

/// Player ID type
pub type PlayerId = Uuid;

/// Label shown for a player slot that has not been decided yet
pub const TBD: &str = "TBD";

/// Tournament state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    /// Accepting registrations, no bracket running
    Upcoming,
    /// A bracket is being played
    InProgress,
    /// The bracket final has been decided
    Completed,
}

impl TournamentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Upcoming => "upcoming",
            TournamentStatus::InProgress => "in_progress",
            TournamentStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TournamentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(TournamentStatus::Upcoming),
            "in_progress" => Ok(TournamentStatus::InProgress),
            "completed" => Ok(TournamentStatus::Completed),
            other => Err(format!("unknown tournament status '{other}'")),
        }
    }
}

/// Registration state of a player within a tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Registered,
    CheckedIn,
    Eliminated,
}

impl RegistrationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Registered => "registered",
            RegistrationStatus::CheckedIn => "checked_in",
            RegistrationStatus::Eliminated => "eliminated",
        }
    }
}

impl FromStr for RegistrationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registered" => Ok(RegistrationStatus::Registered),
            "checked_in" => Ok(RegistrationStatus::CheckedIn),
            "eliminated" => Ok(RegistrationStatus::Eliminated),
            other => Err(format!("unknown registration status '{other}'")),
        }
    }
}

/// A registered player profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

impl Player {
    /// Full name as shown on the bracket
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Look up the display name of a player, falling back to [`TBD`].
pub fn display_name(players: &[Player], id: Option<PlayerId>) -> String {
    id.and_then(|id| players.iter().find(|p| p.id == id))
        .map(Player::display_name)
        .unwrap_or_else(|| TBD.to_string())
}

/// Input for registering a new player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPlayer {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Tournament registration entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub player: Player,
    /// Seed position, 1-indexed in registration order
    pub seed: u32,
    pub status: RegistrationStatus,
}

/// Input for creating a tournament
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTournament {
    pub name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub location: String,
    pub max_players: u32,
    /// Entry fee in cents
    #[serde(default)]
    pub entry_fee: i64,
    #[serde(default)]
    pub pre_registration: bool,
}

/// Tournament information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub date: NaiveDate,
    pub location: String,
    pub max_players: u32,
    /// Entry fee in cents
    pub entry_fee: i64,
    pub pre_registration: bool,
    pub status: TournamentStatus,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    /// Build a fresh tournament record from creation input
    pub fn from_new(new: NewTournament) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: new.name,
            date: new.date,
            location: new.location,
            max_players: new.max_players,
            entry_fee: new.entry_fee,
            pre_registration: new.pre_registration,
            status: TournamentStatus::Upcoming,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(first: &str, last: &str) -> Player {
        Player {
            id: Uuid::new_v4(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: None,
        }
    }

    #[test]
    fn test_display_name() {
        let p = player("Efren", "Reyes");
        assert_eq!(p.display_name(), "Efren Reyes");
    }

    #[test]
    fn test_display_name_lookup_falls_back_to_tbd() {
        let players = vec![player("Earl", "Strickland")];
        assert_eq!(display_name(&players, Some(players[0].id)), "Earl Strickland");
        assert_eq!(display_name(&players, None), TBD);
        assert_eq!(display_name(&players, Some(Uuid::new_v4())), TBD);
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            TournamentStatus::Upcoming,
            TournamentStatus::InProgress,
            TournamentStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<TournamentStatus>(), Ok(status));
        }
        assert!("running".parse::<TournamentStatus>().is_err());
    }

    #[test]
    fn test_registration_status_serde() {
        let json = serde_json::to_string(&RegistrationStatus::CheckedIn).unwrap();
        assert_eq!(json, "\"checked_in\"");
    }

    #[test]
    fn test_from_new_starts_upcoming() {
        let t = Tournament::from_new(NewTournament {
            name: "Friday 9-Ball".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
            location: "Corner Pocket".to_string(),
            max_players: 16,
            entry_fee: 2000,
            pre_registration: true,
        });
        assert_eq!(t.status, TournamentStatus::Upcoming);
        assert_eq!(t.max_players, 16);
    }
}
