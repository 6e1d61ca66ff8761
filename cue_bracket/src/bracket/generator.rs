//! Single-elimination bracket generation.
//!
//! Players are paired in input order: round-one match `i` takes positions
//! `2i - 2` and `2i - 1`, and positions past the end of the list are byes.
//! Every later round is created up front as empty pending matches so that
//! advancement always has a slot to write into.

use log::{debug, info};
use serde::Serialize;

use super::advancement::BracketTree;
use super::errors::{BracketError, BracketResult};
use super::models::{BRACKET_SIZES, MAX_BRACKET_SIZE, MatchSlot, total_rounds};
use crate::tournament::models::PlayerId;

/// A freshly generated bracket, not yet persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedBracket {
    pub bracket_size: u32,
    pub total_rounds: u32,
    /// Every match of the bracket, ordered by round then match number
    pub matches: Vec<MatchSlot>,
}

impl GeneratedBracket {
    pub fn first_round(&self) -> impl Iterator<Item = &MatchSlot> {
        self.matches.iter().filter(|m| m.round == 1)
    }
}

/// Smallest supported bracket size that seats `player_count` players.
pub fn bracket_size_for(player_count: usize) -> BracketResult<u32> {
    if player_count < 2 {
        return Err(BracketError::Configuration(format!(
            "at least 2 players are required, got {player_count}"
        )));
    }
    BRACKET_SIZES
        .iter()
        .copied()
        .find(|&size| size as usize >= player_count)
        .ok_or_else(|| {
            BracketError::Configuration(format!(
                "at most {MAX_BRACKET_SIZE} players are supported, got {player_count}"
            ))
        })
}

/// Generate every match of a single-elimination bracket.
///
/// `bracket_size`, when given, must equal the size the player count calls
/// for. Byes are completed and advanced before returning.
pub fn generate(
    players: &[PlayerId],
    bracket_size: Option<u32>,
    tables_per_bracket: u32,
) -> BracketResult<GeneratedBracket> {
    let size = bracket_size_for(players.len())?;
    if let Some(requested) = bracket_size
        && requested != size
    {
        return Err(BracketError::Configuration(format!(
            "bracket size {requested} does not fit {} players (expected {size})",
            players.len()
        )));
    }
    if tables_per_bracket == 0 {
        return Err(BracketError::Configuration(
            "tables per bracket must be at least 1".to_string(),
        ));
    }

    let rounds = total_rounds(size);
    let mut matches = Vec::with_capacity(size as usize - 1);

    for i in 0..size / 2 {
        let seat = (2 * i) as usize;
        matches.push(MatchSlot {
            player1: players.get(seat).copied(),
            player2: players.get(seat + 1).copied(),
            table_number: Some(i % tables_per_bracket + 1),
            ..MatchSlot::empty(1, i + 1)
        });
    }
    for round in 2..=rounds {
        matches.extend((1..=size >> round).map(|n| MatchSlot::empty(round, n)));
    }

    let mut tree = BracketTree::new(rounds, matches)?;
    tree.resolve_byes()?;
    let byes = tree
        .matches()
        .iter()
        .filter(|m| m.round == 1 && m.player_count() < 2)
        .count();

    info!(
        "Generated {size}-player bracket for {} players ({rounds} rounds, {byes} byes)",
        players.len()
    );
    debug!("Bracket spans {tables_per_bracket} tables");

    Ok(GeneratedBracket {
        bracket_size: size,
        total_rounds: rounds,
        matches: tree.into_matches(),
    })
}
