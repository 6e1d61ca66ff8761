//! Tournament manager for creating tournaments and registering players.

use log::info;
use std::sync::Arc;
use uuid::Uuid;

use super::errors::{TournamentError, TournamentResult};
use super::models::{
    NewPlayer, NewTournament, Player, Registration, Tournament, TournamentId, TournamentStatus,
};
use crate::bracket::MAX_BRACKET_SIZE;
use crate::db::TournamentRepository;

/// Tournament manager
#[derive(Clone)]
pub struct TournamentManager {
    repo: Arc<dyn TournamentRepository>,
}

impl TournamentManager {
    pub fn new(repo: Arc<dyn TournamentRepository>) -> Self {
        Self { repo }
    }

    /// Create a new tournament in the `Upcoming` state
    pub async fn create_tournament(&self, new: NewTournament) -> TournamentResult<Tournament> {
        if new.name.trim().is_empty() {
            return Err(TournamentError::InvalidInput(
                "tournament name is required".to_string(),
            ));
        }
        if !(2..=MAX_BRACKET_SIZE).contains(&new.max_players) {
            return Err(TournamentError::InvalidInput(format!(
                "max players must be between 2 and {MAX_BRACKET_SIZE}"
            )));
        }
        if new.entry_fee < 0 {
            return Err(TournamentError::InvalidInput(
                "entry fee cannot be negative".to_string(),
            ));
        }

        let tournament = Tournament::from_new(NewTournament {
            name: new.name.trim().to_string(),
            ..new
        });
        self.repo.create_tournament(&tournament).await?;

        info!("Created tournament {} ({})", tournament.name, tournament.id);
        Ok(tournament)
    }

    /// Get a tournament, failing when it does not exist
    pub async fn get_tournament(&self, id: TournamentId) -> TournamentResult<Tournament> {
        self.repo
            .get_tournament(id)
            .await?
            .ok_or(TournamentError::NotFound(id))
    }

    pub async fn list_tournaments(&self) -> TournamentResult<Vec<Tournament>> {
        self.repo.list_tournaments().await
    }

    /// Register a player; the seed is the next free registration position
    pub async fn register_player(
        &self,
        tournament_id: TournamentId,
        new: NewPlayer,
    ) -> TournamentResult<Registration> {
        let tournament = self.get_tournament(tournament_id).await?;

        if tournament.status != TournamentStatus::Upcoming {
            return Err(TournamentError::RegistrationClosed);
        }

        let first_name = new.first_name.trim();
        let last_name = new.last_name.trim();
        if first_name.is_empty() && last_name.is_empty() {
            return Err(TournamentError::InvalidInput(
                "player name is required".to_string(),
            ));
        }

        let registered = self.repo.list_registrations(tournament_id).await?;
        if registered.len() >= tournament.max_players as usize {
            return Err(TournamentError::TournamentFull);
        }

        let player = Player {
            id: Uuid::new_v4(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: new.email.filter(|e| !e.trim().is_empty()),
        };
        let seed = registered.len() as u32 + 1;
        let registration = self
            .repo
            .register_player(tournament_id, &player, seed)
            .await?;

        info!(
            "Registered {} for tournament {} as seed {}",
            player.display_name(),
            tournament_id,
            seed
        );
        Ok(registration)
    }

    /// Registered players ordered by seed
    pub async fn list_players(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Vec<Registration>> {
        self.get_tournament(tournament_id).await?;
        self.repo.list_registrations(tournament_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryRepository;
    use chrono::NaiveDate;

    fn manager() -> TournamentManager {
        TournamentManager::new(Arc::new(MemoryRepository::new()))
    }

    fn new_tournament(max_players: u32) -> NewTournament {
        NewTournament {
            name: "Tuesday 8-Ball".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 3).unwrap(),
            location: "Hall".to_string(),
            max_players,
            entry_fee: 1500,
            pre_registration: false,
        }
    }

    fn new_player(first: &str) -> NewPlayer {
        NewPlayer {
            first_name: first.to_string(),
            last_name: "Doe".to_string(),
            email: None,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let mut new = new_tournament(8);
        new.name = "   ".to_string();
        assert!(matches!(
            manager().create_tournament(new).await,
            Err(TournamentError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_too_few_players() {
        assert!(matches!(
            manager().create_tournament(new_tournament(1)).await,
            Err(TournamentError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_seeds_follow_registration_order() {
        let mgr = manager();
        let t = mgr.create_tournament(new_tournament(8)).await.unwrap();
        for name in ["Ann", "Ben", "Cat"] {
            mgr.register_player(t.id, new_player(name)).await.unwrap();
        }
        let players = mgr.list_players(t.id).await.unwrap();
        let seeds: Vec<_> = players
            .iter()
            .map(|r| (r.seed, r.player.first_name.as_str()))
            .collect();
        assert_eq!(seeds, vec![(1, "Ann"), (2, "Ben"), (3, "Cat")]);
    }

    #[tokio::test]
    async fn test_full_tournament_rejects_registration() {
        let mgr = manager();
        let t = mgr.create_tournament(new_tournament(2)).await.unwrap();
        mgr.register_player(t.id, new_player("A")).await.unwrap();
        mgr.register_player(t.id, new_player("B")).await.unwrap();
        assert!(matches!(
            mgr.register_player(t.id, new_player("C")).await,
            Err(TournamentError::TournamentFull)
        ));
    }

    #[tokio::test]
    async fn test_unknown_tournament() {
        let id = Uuid::new_v4();
        assert!(matches!(
            manager().list_players(id).await,
            Err(TournamentError::NotFound(got)) if got == id
        ));
    }
}
