//! Bracket manager: one method per organizer action.
//!
//! Each action loads what it needs, runs the pure bracket computation, and
//! only then writes. Nothing is persisted when the computation fails.

use chrono::Utc;
use log::{info, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::advancement::BracketTree;
use super::errors::{BracketError, BracketResult};
use super::generator::generate;
use super::layout::{BracketLayout, layout};
use super::models::{
    Bracket, BracketConfig, BracketStatus, Match, MatchId, MatchSlot, Slot, total_rounds,
};
use super::scoring::MatchUpdate;
use super::seeding::order_players;
use crate::db::{BracketRepository, TournamentRepository};
use crate::tournament::{
    Player, PlayerId, Registration, TournamentError, TournamentId, TournamentStatus,
    display_name,
};

/// Everything needed to show a bracket
#[derive(Debug, Clone, Serialize)]
pub struct BracketView {
    pub bracket: Bracket,
    pub total_rounds: u32,
    /// Ordered by round then match number
    pub matches: Vec<Match>,
    pub players: Vec<Player>,
    pub champion: Option<PlayerId>,
    pub layout: BracketLayout,
}

impl BracketView {
    fn build(bracket: Bracket, mut matches: Vec<Match>, registrations: Vec<Registration>) -> Self {
        matches.sort_by_key(|m| m.slot.key());
        let rounds = bracket.total_rounds();
        let slots: Vec<MatchSlot> = matches.iter().map(|m| m.slot.clone()).collect();
        let champion = slots
            .iter()
            .find(|m| m.key() == (rounds, 1) && m.is_completed())
            .and_then(|m| m.winner);

        Self {
            layout: layout(&slots),
            total_rounds: rounds,
            champion,
            players: registrations.into_iter().map(|r| r.player).collect(),
            matches,
            bracket,
        }
    }

    pub fn get(&self, round: u32, match_number: u32) -> Option<&Match> {
        self.matches
            .iter()
            .find(|m| m.slot.key() == (round, match_number))
    }

    /// Display name for a slot, `TBD` when empty
    pub fn player_name(&self, id: Option<PlayerId>) -> String {
        display_name(&self.players, id)
    }
}

/// Bracket manager
#[derive(Clone)]
pub struct BracketManager {
    tournaments: Arc<dyn TournamentRepository>,
    brackets: Arc<dyn BracketRepository>,
}

impl BracketManager {
    pub fn new(
        tournaments: Arc<dyn TournamentRepository>,
        brackets: Arc<dyn BracketRepository>,
    ) -> Self {
        Self {
            tournaments,
            brackets,
        }
    }

    /// Generate and store a bracket from the tournament's registrations
    pub async fn create_bracket(
        &self,
        tournament_id: TournamentId,
        config: BracketConfig,
    ) -> BracketResult<BracketView> {
        config.validate()?;

        self.tournaments
            .get_tournament(tournament_id)
            .await?
            .ok_or(TournamentError::NotFound(tournament_id))?;

        if let Some(current) = self.brackets.find_current_bracket(tournament_id).await?
            && current.status == BracketStatus::Active
        {
            return Err(BracketError::ActiveBracketExists);
        }

        let registrations = self.tournaments.list_registrations(tournament_id).await?;
        let players = order_players(&registrations, config.seeding);
        let generated = generate(&players, config.bracket_size, config.tables_per_bracket)?;

        let bracket = Bracket {
            id: Uuid::new_v4(),
            tournament_id,
            config,
            bracket_size: generated.bracket_size,
            status: BracketStatus::Active,
            created_at: Utc::now(),
        };
        let matches: Vec<Match> = generated
            .matches
            .into_iter()
            .map(|slot| Match {
                id: Uuid::new_v4(),
                bracket_id: bracket.id,
                slot,
            })
            .collect();

        self.brackets.create_bracket(&bracket, &matches).await?;
        self.tournaments
            .update_tournament_status(tournament_id, TournamentStatus::InProgress)
            .await?;

        info!(
            "Created {}-player bracket {} for tournament {} with {} matches",
            bracket.bracket_size,
            bracket.id,
            tournament_id,
            matches.len()
        );
        Ok(BracketView::build(bracket, matches, registrations))
    }

    /// The tournament's current bracket, if it has one
    pub async fn bracket_view(
        &self,
        tournament_id: TournamentId,
    ) -> BracketResult<Option<BracketView>> {
        let Some(bracket) = self.brackets.find_current_bracket(tournament_id).await? else {
            return Ok(None);
        };
        let matches = self.brackets.list_matches(bracket.id).await?;
        let registrations = self.tournaments.list_registrations(tournament_id).await?;
        Ok(Some(BracketView::build(bracket, matches, registrations)))
    }

    /// Record a result for one match and push the winner through the bracket
    pub async fn record_match(
        &self,
        match_id: MatchId,
        update: MatchUpdate,
    ) -> BracketResult<BracketView> {
        let target = self
            .brackets
            .get_match(match_id)
            .await?
            .ok_or(BracketError::MatchNotFound(match_id))?;
        let mut bracket = self
            .brackets
            .get_bracket(target.bracket_id)
            .await?
            .ok_or(BracketError::BracketNotFound(target.bracket_id))?;
        let stored = self.brackets.list_matches(bracket.id).await?;

        let ids: HashMap<(u32, u32), MatchId> =
            stored.iter().map(|m| (m.slot.key(), m.id)).collect();
        let before: HashMap<(u32, u32), MatchSlot> = stored
            .into_iter()
            .map(|m| (m.slot.key(), m.slot))
            .collect();

        let mut tree = BracketTree::new(
            total_rounds(bracket.bracket_size),
            before.values().cloned().collect(),
        )?;
        let advanced = tree.record_result(
            target.slot.round,
            target.slot.match_number,
            &update,
            bracket.config.uppers_race_to,
        )?;

        let next_status = if tree.is_complete() {
            BracketStatus::Completed
        } else {
            BracketStatus::Active
        };
        if bracket.status == BracketStatus::Completed && next_status == BracketStatus::Active {
            let current = self
                .brackets
                .find_current_bracket(bracket.tournament_id)
                .await?;
            if current.is_some_and(|b| b.id != bracket.id) {
                return Err(BracketError::ActiveBracketExists);
            }
        }

        for key in tree.take_changed() {
            let (Some(after), Some(prior), Some(&id)) =
                (tree.get(key.0, key.1), before.get(&key), ids.get(&key))
            else {
                return Err(BracketError::Integrity {
                    round: key.0,
                    match_number: key.1,
                });
            };
            for slot in Slot::BOTH {
                if after.player(slot) != prior.player(slot) {
                    self.brackets
                        .set_player_slot(id, slot, after.player(slot))
                        .await?;
                }
            }
            if after.result_differs(prior) {
                self.brackets
                    .update_match_result(&Match {
                        id,
                        bracket_id: bracket.id,
                        slot: after.clone(),
                    })
                    .await?;
            }
        }

        if let Some(to) = &advanced {
            info!(
                "Match {} winner {} advances to round {} match {}",
                match_id, to.winner, to.round, to.match_number
            );
        }

        if next_status != bracket.status {
            self.brackets
                .update_bracket_status(bracket.id, next_status)
                .await?;
            let tournament_status = match next_status {
                BracketStatus::Completed => TournamentStatus::Completed,
                _ => TournamentStatus::InProgress,
            };
            self.tournaments
                .update_tournament_status(bracket.tournament_id, tournament_status)
                .await?;
            match next_status {
                BracketStatus::Completed => info!(
                    "Bracket {} complete, champion {:?}",
                    bracket.id,
                    tree.champion()
                ),
                _ => warn!("Bracket {} reopened by a result correction", bracket.id),
            }
            bracket.status = next_status;
        }

        let tournament_id = bracket.tournament_id;
        let matches = tree
            .into_matches()
            .into_iter()
            .filter_map(|slot| {
                ids.get(&slot.key()).map(|&id| Match {
                    id,
                    bracket_id: bracket.id,
                    slot,
                })
            })
            .collect();
        let registrations = self.tournaments.list_registrations(tournament_id).await?;
        Ok(BracketView::build(bracket, matches, registrations))
    }

    /// Delete the tournament's current bracket and all of its matches
    pub async fn delete_bracket(&self, tournament_id: TournamentId) -> BracketResult<()> {
        let bracket = self
            .brackets
            .find_current_bracket(tournament_id)
            .await?
            .ok_or(BracketError::NoBracket(tournament_id))?;

        self.brackets.delete_bracket(bracket.id).await?;

        let status = match self.brackets.find_current_bracket(tournament_id).await? {
            Some(_) => TournamentStatus::Completed,
            None => TournamentStatus::Upcoming,
        };
        self.tournaments
            .update_tournament_status(tournament_id, status)
            .await?;

        info!(
            "Deleted bracket {} of tournament {}",
            bracket.id, tournament_id
        );
        Ok(())
    }
}
