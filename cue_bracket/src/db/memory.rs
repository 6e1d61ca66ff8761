//! In-memory repository.
//!
//! Backs the test suites and lets the server run without PostgreSQL. Enforces
//! the same constraints the schema does: one active bracket per tournament,
//! unique seeds, and cascading bracket deletes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::repository::{BracketRepository, TournamentRepository};
use crate::bracket::{
    Bracket, BracketError, BracketId, BracketResult, BracketStatus, Match, MatchId, Slot,
};
use crate::tournament::{
    Player, PlayerId, Registration, RegistrationStatus, Tournament, TournamentError,
    TournamentId, TournamentResult, TournamentStatus,
};

#[derive(Debug, Default)]
struct Store {
    tournaments: HashMap<TournamentId, Tournament>,
    registrations: HashMap<TournamentId, Vec<Registration>>,
    brackets: HashMap<BracketId, Bracket>,
    matches: HashMap<MatchId, Match>,
}

/// Repository holding everything in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    store: Arc<RwLock<Store>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TournamentRepository for MemoryRepository {
    async fn ping(&self) -> TournamentResult<()> {
        Ok(())
    }

    async fn create_tournament(&self, tournament: &Tournament) -> TournamentResult<()> {
        let mut store = self.store.write().await;
        if store.tournaments.contains_key(&tournament.id) {
            return Err(TournamentError::InvalidInput(format!(
                "tournament {} already exists",
                tournament.id
            )));
        }
        store
            .tournaments
            .insert(tournament.id, tournament.clone());
        Ok(())
    }

    async fn get_tournament(&self, id: TournamentId) -> TournamentResult<Option<Tournament>> {
        Ok(self.store.read().await.tournaments.get(&id).cloned())
    }

    async fn list_tournaments(&self) -> TournamentResult<Vec<Tournament>> {
        let store = self.store.read().await;
        let mut tournaments: Vec<Tournament> = store.tournaments.values().cloned().collect();
        tournaments.sort_by_key(|t| (t.date, t.created_at));
        Ok(tournaments)
    }

    async fn update_tournament_status(
        &self,
        id: TournamentId,
        status: TournamentStatus,
    ) -> TournamentResult<()> {
        let mut store = self.store.write().await;
        if let Some(t) = store.tournaments.get_mut(&id) {
            t.status = status;
        }
        Ok(())
    }

    async fn register_player(
        &self,
        tournament_id: TournamentId,
        player: &Player,
        seed: u32,
    ) -> TournamentResult<Registration> {
        let mut store = self.store.write().await;
        if !store.tournaments.contains_key(&tournament_id) {
            return Err(TournamentError::NotFound(tournament_id));
        }

        let registrations = store.registrations.entry(tournament_id).or_default();
        if registrations.iter().any(|r| r.seed == seed) {
            return Err(TournamentError::InvalidInput(format!(
                "seed {seed} is already taken"
            )));
        }

        let registration = Registration {
            player: player.clone(),
            seed,
            status: RegistrationStatus::Registered,
        };
        registrations.push(registration.clone());
        registrations.sort_by_key(|r| r.seed);
        Ok(registration)
    }

    async fn list_registrations(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Vec<Registration>> {
        let store = self.store.read().await;
        Ok(store
            .registrations
            .get(&tournament_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl BracketRepository for MemoryRepository {
    async fn find_current_bracket(
        &self,
        tournament_id: TournamentId,
    ) -> BracketResult<Option<Bracket>> {
        let store = self.store.read().await;
        Ok(store
            .brackets
            .values()
            .filter(|b| b.tournament_id == tournament_id && b.status != BracketStatus::Draft)
            .max_by_key(|b| (b.status == BracketStatus::Active, b.created_at))
            .cloned())
    }

    async fn get_bracket(&self, id: BracketId) -> BracketResult<Option<Bracket>> {
        Ok(self.store.read().await.brackets.get(&id).cloned())
    }

    async fn list_matches(&self, bracket_id: BracketId) -> BracketResult<Vec<Match>> {
        let store = self.store.read().await;
        let mut matches: Vec<Match> = store
            .matches
            .values()
            .filter(|m| m.bracket_id == bracket_id)
            .cloned()
            .collect();
        matches.sort_by_key(|m| m.slot.key());
        Ok(matches)
    }

    async fn get_match(&self, id: MatchId) -> BracketResult<Option<Match>> {
        Ok(self.store.read().await.matches.get(&id).cloned())
    }

    async fn create_bracket(&self, bracket: &Bracket, matches: &[Match]) -> BracketResult<()> {
        let mut store = self.store.write().await;
        let active_exists = store.brackets.values().any(|b| {
            b.tournament_id == bracket.tournament_id && b.status == BracketStatus::Active
        });
        if bracket.status == BracketStatus::Active && active_exists {
            return Err(BracketError::ActiveBracketExists);
        }

        store.brackets.insert(bracket.id, bracket.clone());
        store
            .matches
            .extend(matches.iter().map(|m| (m.id, m.clone())));
        Ok(())
    }

    async fn update_match_result(&self, m: &Match) -> BracketResult<()> {
        let mut store = self.store.write().await;
        let stored = store
            .matches
            .get_mut(&m.id)
            .ok_or(BracketError::MatchNotFound(m.id))?;
        stored.slot.player1_score = m.slot.player1_score;
        stored.slot.player2_score = m.slot.player2_score;
        stored.slot.winner = m.slot.winner;
        stored.slot.table_number = m.slot.table_number;
        stored.slot.status = m.slot.status;
        Ok(())
    }

    async fn set_player_slot(
        &self,
        match_id: MatchId,
        slot: Slot,
        player: Option<PlayerId>,
    ) -> BracketResult<()> {
        let mut store = self.store.write().await;
        let stored = store
            .matches
            .get_mut(&match_id)
            .ok_or(BracketError::MatchNotFound(match_id))?;
        stored.slot.set_player(slot, player);
        Ok(())
    }

    async fn update_bracket_status(
        &self,
        id: BracketId,
        status: BracketStatus,
    ) -> BracketResult<()> {
        let mut store = self.store.write().await;
        let bracket = store
            .brackets
            .get_mut(&id)
            .ok_or(BracketError::BracketNotFound(id))?;
        bracket.status = status;
        Ok(())
    }

    async fn delete_bracket(&self, id: BracketId) -> BracketResult<()> {
        let mut store = self.store.write().await;
        if store.brackets.remove(&id).is_none() {
            return Err(BracketError::BracketNotFound(id));
        }
        store.matches.retain(|_, m| m.bracket_id != id);
        Ok(())
    }
}
