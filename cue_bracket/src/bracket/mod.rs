//! Single-elimination brackets.
//!
//! - [`generator`]: players to a complete set of matches, byes resolved
//! - [`advancement`]: where a winner goes next, applied over a whole bracket
//! - [`scoring`]: race-to results to a winner
//! - [`layout`]: geometry for drawing the bracket
//! - [`manager`]: the organizer actions, persisted through a repository
//!
//! ## Example
//!
//! ```
//! use cue_bracket::bracket::{advance, generate, layout};
//! use uuid::Uuid;
//!
//! let players: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
//! let bracket = generate(&players, None, 2).unwrap();
//! assert_eq!(bracket.bracket_size, 8);
//!
//! // The lone player in round one match 3 already moved on.
//! let bye = &bracket.matches[2];
//! let next = advance(bye, bracket.total_rounds).unwrap();
//! assert_eq!((next.round, next.match_number), (2, 2));
//!
//! let drawn = layout(&bracket.matches);
//! assert_eq!(drawn.rounds.last().unwrap().label, "Final");
//! ```

pub mod advancement;
pub mod errors;
pub mod generator;
pub mod layout;
pub mod manager;
pub mod models;
pub mod scoring;
pub mod seeding;

pub use advancement::{AdvanceTarget, BracketTree, advance};
pub use errors::{BracketError, BracketResult};
pub use generator::{GeneratedBracket, bracket_size_for, generate};
pub use layout::{BracketLayout, Connector, Line, MatchBox, Point, RoundColumn, layout, round_label};
pub use manager::{BracketManager, BracketView};
pub use models::{
    BRACKET_SIZES, BestOf, Bracket, BracketConfig, BracketFormat, BracketId, BracketStatus,
    BracketType, MAX_BRACKET_SIZE, Match, MatchId, MatchSlot, MatchStatus, Seeding, Slot,
    total_rounds,
};
pub use scoring::{MatchUpdate, resolve_winner};
pub use seeding::{order_players, order_players_with};
