//! Tournaments and player registration.
//!
//! ## Example
//!
//! ```no_run
//! use cue_bracket::db::MemoryRepository;
//! use cue_bracket::tournament::{NewPlayer, NewTournament, TournamentManager};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = TournamentManager::new(Arc::new(MemoryRepository::new()));
//!
//!     let tournament = manager
//!         .create_tournament(NewTournament {
//!             name: "Friday 9-Ball".to_string(),
//!             date: chrono::NaiveDate::from_ymd_opt(2025, 5, 2).unwrap(),
//!             location: "Corner Pocket".to_string(),
//!             max_players: 16,
//!             entry_fee: 2000,
//!             pre_registration: false,
//!         })
//!         .await?;
//!
//!     manager
//!         .register_player(
//!             tournament.id,
//!             NewPlayer {
//!                 first_name: "Efren".to_string(),
//!                 last_name: "Reyes".to_string(),
//!                 email: None,
//!             },
//!         )
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{TournamentError, TournamentResult};
pub use manager::TournamentManager;
pub use models::{
    NewPlayer, NewTournament, Player, PlayerId, Registration, RegistrationStatus, TBD,
    Tournament, TournamentId, TournamentStatus, display_name,
};
