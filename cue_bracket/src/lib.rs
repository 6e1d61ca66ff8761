//! # Cue Bracket
//!
//! Tournament bracket engine for cue sport events: organizers create a
//! tournament, register players, generate a single-elimination bracket and
//! record results as the bracket plays out.
//!
//! ## Core Modules
//!
//! - [`bracket`]: bracket generation, winner advancement, result scoring and layout
//! - [`tournament`]: tournaments and player registration
//! - [`db`]: repository traits with PostgreSQL and in-memory implementations
//!
//! The algorithms in [`bracket`] are pure functions over match data. The
//! managers ([`BracketManager`], [`TournamentManager`]) run them against a
//! repository.

/// Bracket generation, advancement and layout.
pub mod bracket;
pub use bracket::{
    BracketConfig, BracketError, BracketManager, BracketResult, BracketView, MatchStatus,
    MatchUpdate,
};

/// Persistence.
pub mod db;

/// Tournaments and registrations.
pub mod tournament;
pub use tournament::{TournamentError, TournamentManager, TournamentResult};
