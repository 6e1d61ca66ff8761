/// Property-based tests for bracket generation, advancement and layout
///
/// Brackets are generated for arbitrary player counts and then played out
/// with random winners to check that the tree stays consistent.
use cue_bracket::bracket::{
    BracketTree, MatchStatus, MatchUpdate, Slot, advance, generate, layout,
};
use proptest::prelude::*;
use uuid::Uuid;

fn players(n: usize) -> Vec<Uuid> {
    (0..n).map(|_| Uuid::new_v4()).collect()
}

// Play every playable match in round order, picking winners from `picks`.
fn play_out(tree: &mut BracketTree, picks: &[bool], race_to: u32) {
    let mut pick = picks.iter().cycle();
    for round in 1..=tree.total_rounds() {
        let numbers: Vec<u32> = tree
            .matches()
            .iter()
            .filter(|m| m.round == round && !m.is_completed())
            .map(|m| m.match_number)
            .collect();
        for n in numbers {
            let player1_wins = *pick.next().unwrap_or(&true);
            let update = MatchUpdate {
                player1_score: if player1_wins { race_to } else { 0 },
                player2_score: if player1_wins { 0 } else { race_to },
                table_number: None,
                status: MatchStatus::Completed,
            };
            tree.record_result(round, n, &update, race_to).unwrap();
        }
    }
}

proptest! {
    #[test]
    fn test_size_is_smallest_power_of_two(n in 2usize..=64) {
        let bracket = generate(&players(n), None, 2).unwrap();
        let size = bracket.bracket_size as usize;

        prop_assert!(size.is_power_of_two());
        prop_assert!(size >= n);
        prop_assert!(size / 2 < n);
        prop_assert_eq!(bracket.matches.iter().filter(|m| m.round == 1).count(), size / 2);
        prop_assert_eq!(bracket.matches.len(), size - 1);
    }

    #[test]
    fn test_every_player_seated_once(n in 2usize..=64) {
        let p = players(n);
        let bracket = generate(&p, None, 3).unwrap();
        for id in &p {
            let seated = bracket
                .matches
                .iter()
                .filter(|m| m.round == 1 && m.contains(*id))
                .count();
            prop_assert_eq!(seated, 1);
        }
    }

    #[test]
    fn test_advance_slot_follows_match_parity(round in 1u32..6, k in 1u32..=16) {
        let w = Uuid::new_v4();
        for (number, slot) in [(2 * k - 1, Slot::Player1), (2 * k, Slot::Player2)] {
            let m = cue_bracket::bracket::MatchSlot {
                player1: Some(w),
                winner: Some(w),
                status: MatchStatus::Completed,
                ..cue_bracket::bracket::MatchSlot::empty(round, number)
            };
            let target = advance(&m, 6).unwrap();
            prop_assert_eq!(target.round, round + 1);
            prop_assert_eq!(target.match_number, k);
            prop_assert_eq!(target.slot, slot);
        }
    }

    #[test]
    fn test_random_playout_crowns_one_champion(
        n in 2usize..=64,
        picks in prop::collection::vec(any::<bool>(), 1..64),
    ) {
        let p = players(n);
        let bracket = generate(&p, None, 2).unwrap();
        let mut tree = BracketTree::new(bracket.total_rounds, bracket.matches).unwrap();

        play_out(&mut tree, &picks, 3);

        prop_assert!(tree.is_complete());
        let champion = tree.champion().unwrap();
        prop_assert!(p.contains(&champion));
        for m in tree.matches() {
            prop_assert!(m.is_completed());
            if let Some(w) = m.winner {
                prop_assert!(m.contains(w));
            }
        }
    }

    #[test]
    fn test_layout_is_deterministic(n in 2usize..=64) {
        let bracket = generate(&players(n), None, 2).unwrap();
        let first = layout(&bracket.matches);
        prop_assert_eq!(&first, &layout(&bracket.matches));
        prop_assert_eq!(first.rounds.len() as u32, bracket.total_rounds);
    }
}
