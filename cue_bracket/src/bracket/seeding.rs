//! Player ordering before round-one pairing.

use rand::Rng;
use rand::seq::SliceRandom;

use super::models::Seeding;
use crate::tournament::models::{PlayerId, Registration};

/// Order registered players for the generator.
///
/// # Arguments
///
/// * `registrations` - Registrations in the order the store returned them
/// * `seeding` - Seeding policy from the bracket configuration
///
/// # Returns
///
/// * `Vec<PlayerId>` - Players in pairing order
pub fn order_players(registrations: &[Registration], seeding: Seeding) -> Vec<PlayerId> {
    order_players_with(registrations, seeding, &mut rand::rng())
}

/// Same as [`order_players`] with a caller-supplied random source
pub fn order_players_with<R: Rng + ?Sized>(
    registrations: &[Registration],
    seeding: Seeding,
    rng: &mut R,
) -> Vec<PlayerId> {
    match seeding {
        Seeding::Standard => {
            let mut sorted: Vec<&Registration> = registrations.iter().collect();
            sorted.sort_by_key(|r| r.seed);
            sorted.into_iter().map(|r| r.player.id).collect()
        }
        Seeding::Manual => registrations.iter().map(|r| r.player.id).collect(),
        Seeding::Random => {
            let mut ids: Vec<PlayerId> = registrations.iter().map(|r| r.player.id).collect();
            ids.shuffle(rng);
            ids
        }
    }
}
