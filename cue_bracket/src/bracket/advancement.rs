//! Winner advancement through a single-elimination bracket.
//!
//! [`advance`] is the pure topology rule: a completed match `n` in round `r`
//! feeds match `ceil(n / 2)` of round `r + 1`, odd numbers into player 1 and
//! even numbers into player 2. [`BracketTree`] applies that rule to a whole
//! bracket held in memory, cascading byes and tracking which matches changed
//! so the caller can persist exactly those.

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::errors::{BracketError, BracketResult};
use super::models::{MatchSlot, MatchStatus, Slot};
use super::scoring::{self, MatchUpdate};
use crate::tournament::models::PlayerId;

/// Where a winner goes next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceTarget {
    pub round: u32,
    pub match_number: u32,
    pub slot: Slot,
    pub winner: PlayerId,
}

/// Compute the advancement target of a match.
///
/// Returns `None` when the match is not completed, has no winner, or is the
/// final of a bracket with `total_rounds` rounds.
pub fn advance(m: &MatchSlot, total_rounds: u32) -> Option<AdvanceTarget> {
    if m.status != MatchStatus::Completed {
        return None;
    }
    let winner = m.winner?;
    let round = m.round + 1;
    if round > total_rounds {
        return None;
    }
    Some(AdvanceTarget {
        round,
        match_number: m.match_number.div_ceil(2),
        slot: Slot::for_match_number(m.match_number),
        winner,
    })
}

/// A whole bracket in memory, ordered by `(round, match_number)`.
#[derive(Debug, Clone)]
pub struct BracketTree {
    total_rounds: u32,
    matches: Vec<MatchSlot>,
    changed: BTreeSet<(u32, u32)>,
}

impl BracketTree {
    /// Build a tree from a flat match list in any order.
    ///
    /// Duplicate `(round, match_number)` keys are rejected as an integrity
    /// failure. Missing matches are only detected when something advances
    /// into them.
    pub fn new(total_rounds: u32, mut matches: Vec<MatchSlot>) -> BracketResult<Self> {
        matches.sort_by_key(MatchSlot::key);
        if let Some(pair) = matches.windows(2).find(|w| w[0].key() == w[1].key()) {
            error!(
                "Duplicate match {} in round {}",
                pair[0].match_number, pair[0].round
            );
            return Err(BracketError::Integrity {
                round: pair[0].round,
                match_number: pair[0].match_number,
            });
        }
        Ok(Self {
            total_rounds,
            matches,
            changed: BTreeSet::new(),
        })
    }

    pub fn total_rounds(&self) -> u32 {
        self.total_rounds
    }

    pub fn matches(&self) -> &[MatchSlot] {
        &self.matches
    }

    pub fn into_matches(self) -> Vec<MatchSlot> {
        self.matches
    }

    pub fn get(&self, round: u32, match_number: u32) -> Option<&MatchSlot> {
        self.position(round, match_number).map(|idx| &self.matches[idx])
    }

    /// Keys of matches modified since the last call, in bracket order
    pub fn take_changed(&mut self) -> Vec<(u32, u32)> {
        std::mem::take(&mut self.changed).into_iter().collect()
    }

    /// The final match, if it exists
    pub fn final_match(&self) -> Option<&MatchSlot> {
        self.get(self.total_rounds, 1)
    }

    /// Whether the final has been decided
    pub fn is_complete(&self) -> bool {
        self.champion().is_some()
    }

    pub fn champion(&self) -> Option<PlayerId> {
        self.final_match()
            .filter(|m| m.is_completed())
            .and_then(|m| m.winner)
    }

    fn position(&self, round: u32, match_number: u32) -> Option<usize> {
        self.matches
            .binary_search_by_key(&(round, match_number), MatchSlot::key)
            .ok()
    }

    fn require(&self, round: u32, match_number: u32) -> BracketResult<usize> {
        self.position(round, match_number).ok_or_else(|| {
            error!("Advancement target missing: round {round} match {match_number}");
            BracketError::Integrity {
                round,
                match_number,
            }
        })
    }

    /// Both matches feeding this one are completed. Round one is always
    /// ready.
    pub fn is_ready(&self, round: u32, match_number: u32) -> bool {
        if round <= 1 {
            return true;
        }
        let upper = match_number * 2 - 1;
        [upper, upper + 1].iter().all(|&feeder| {
            self.get(round - 1, feeder)
                .is_some_and(MatchSlot::is_completed)
        })
    }

    /// Write the winner into its destination slot.
    ///
    /// Re-applying the same winner is a no-op. A different player already in
    /// the slot is replaced only while the destination is untouched;
    /// otherwise the call fails with [`BracketError::SlotConflict`].
    pub fn apply_advance(&mut self, target: &AdvanceTarget) -> BracketResult<()> {
        let idx = self.require(target.round, target.match_number)?;
        let dest = &mut self.matches[idx];

        match dest.player(target.slot) {
            Some(existing) if existing == target.winner => return Ok(()),
            Some(existing) => {
                if !dest.is_untouched() {
                    return Err(BracketError::SlotConflict {
                        round: target.round,
                        match_number: target.match_number,
                        slot: target.slot,
                    });
                }
                warn!(
                    "Replacing {} in round {} match {} {} with {}",
                    existing, target.round, target.match_number, target.slot, target.winner
                );
            }
            None => {}
        }

        dest.set_player(target.slot, Some(target.winner));
        self.changed.insert(dest.key());
        debug!(
            "Advanced {} to round {} match {} {}",
            target.winner, target.round, target.match_number, target.slot
        );
        Ok(())
    }

    /// Undo an earlier advancement so a corrected result can take its place.
    ///
    /// Untouched destinations have the slot cleared. Automatic byes are
    /// reopened and their own advancement retracted. Anything already played
    /// is a [`BracketError::SlotConflict`].
    fn retract(&mut self, target: &AdvanceTarget) -> BracketResult<()> {
        let idx = self.require(target.round, target.match_number)?;
        if self.matches[idx].player(target.slot) != Some(target.winner) {
            return Ok(());
        }

        if self.matches[idx].is_auto_bye() {
            if let Some(next) = advance(&self.matches[idx], self.total_rounds) {
                self.retract(&next)?;
            }
            let dest = &mut self.matches[idx];
            dest.status = MatchStatus::Pending;
            dest.winner = None;
        } else if !self.matches[idx].is_untouched() {
            return Err(BracketError::SlotConflict {
                round: target.round,
                match_number: target.match_number,
                slot: target.slot,
            });
        }

        let dest = &mut self.matches[idx];
        dest.set_player(target.slot, None);
        self.changed.insert(dest.key());
        Ok(())
    }

    /// Complete every ready match that has fewer than two players.
    ///
    /// One player is a bye and advances; no players is a void match. Rounds
    /// are walked in order so byes cascade in a single pass.
    pub fn resolve_byes(&mut self) -> BracketResult<()> {
        for idx in 0..self.matches.len() {
            let (round, match_number) = self.matches[idx].key();
            if self.matches[idx].is_completed() || !self.is_ready(round, match_number) {
                continue;
            }

            let m = &mut self.matches[idx];
            match (m.player1, m.player2) {
                (Some(_), Some(_)) => continue,
                (present, other) => {
                    m.winner = present.or(other);
                    m.status = MatchStatus::Completed;
                    m.player1_score = 0;
                    m.player2_score = 0;
                    self.changed.insert((round, match_number));
                    match m.winner {
                        Some(winner) => debug!(
                            "Bye for {winner} in round {round} match {match_number}"
                        ),
                        None => debug!("Void match in round {round} match {match_number}"),
                    }
                }
            }

            if let Some(target) = advance(&self.matches[idx], self.total_rounds) {
                self.apply_advance(&target)?;
            }
        }
        Ok(())
    }

    /// Record an organizer's result for one match and advance the winner.
    ///
    /// A winner that replaces an earlier one first retracts the earlier
    /// advancement. Returns where the winner went, if anywhere.
    pub fn record_result(
        &mut self,
        round: u32,
        match_number: u32,
        update: &MatchUpdate,
        race_to: u32,
    ) -> BracketResult<Option<AdvanceTarget>> {
        let idx = self.require(round, match_number)?;

        if update.status != MatchStatus::Pending && !self.is_ready(round, match_number) {
            return Err(BracketError::InvalidResult(format!(
                "round {round} match {match_number} is waiting on earlier matches"
            )));
        }

        let winner = scoring::resolve_winner(&self.matches[idx], update, race_to)?;

        if let Some(previous) = advance(&self.matches[idx], self.total_rounds) {
            let keeps_winner =
                update.status == MatchStatus::Completed && winner == Some(previous.winner);
            if !keeps_winner {
                self.retract(&previous)?;
            }
        }

        let m = &mut self.matches[idx];
        let before = m.clone();
        m.player1_score = update.player1_score;
        m.player2_score = update.player2_score;
        m.table_number = update.table_number;
        m.status = update.status;
        m.winner = winner;
        if m.result_differs(&before) {
            self.changed.insert(m.key());
        }

        let target = advance(&self.matches[idx], self.total_rounds);
        if let Some(target) = &target {
            self.apply_advance(target)?;
        }
        self.resolve_byes()?;
        Ok(target)
    }
}
