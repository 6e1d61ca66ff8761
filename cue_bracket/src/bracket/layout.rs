//! Geometry of a drawn bracket.
//!
//! Rounds are laid out as columns left to right. Each round's matches share
//! the full bracket height evenly, so a match always sits vertically between
//! the two matches that feed it. Output is plain data for whatever front end
//! draws it.

use serde::Serialize;
use std::collections::BTreeMap;

use super::models::MatchSlot;

/// Match box width
pub const MATCH_WIDTH: f64 = 240.0;

/// Match box height
pub const MATCH_HEIGHT: f64 = 80.0;

/// Horizontal gap between round columns
pub const HORIZONTAL_GAP: f64 = 160.0;

/// Vertical gap between match boxes
pub const VERTICAL_GAP: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Line {
    pub from: Point,
    pub to: Point,
}

/// A positioned match box
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchBox {
    pub round: u32,
    pub match_number: u32,
    /// Top-left corner
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl MatchBox {
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// Lines joining a sibling pair to the match they feed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connector {
    pub round: u32,
    /// Match fed in the next round
    pub target_match: u32,
    pub upper_stub: Line,
    pub lower_stub: Line,
    pub bridge: Line,
    pub link: Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundColumn {
    pub round: u32,
    pub label: String,
    pub x: f64,
    pub matches: Vec<MatchBox>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BracketLayout {
    pub rounds: Vec<RoundColumn>,
    pub connectors: Vec<Connector>,
    pub width: f64,
    pub height: f64,
}

/// Display label of `round` in a bracket of `total_rounds` rounds
pub fn round_label(round: u32, total_rounds: u32) -> String {
    if round == total_rounds {
        "Final".to_string()
    } else if round + 1 == total_rounds {
        "Semifinals".to_string()
    } else {
        format!("Round {round}")
    }
}

/// Lay out a bracket from its matches in any order.
pub fn layout(matches: &[MatchSlot]) -> BracketLayout {
    let mut by_round: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
    for m in matches {
        by_round.entry(m.round).or_default().push(m.match_number);
    }
    if by_round.is_empty() {
        return BracketLayout::default();
    }
    for numbers in by_round.values_mut() {
        numbers.sort_unstable();
    }

    let max_count = by_round.values().map(Vec::len).max().unwrap_or(0);
    let height = max_count as f64 * (MATCH_HEIGHT + VERTICAL_GAP) * 2.0;
    let total_rounds = by_round.keys().next_back().copied().unwrap_or(0);

    let rounds: Vec<RoundColumn> = by_round
        .iter()
        .enumerate()
        .map(|(col, (&round, numbers))| {
            let x = col as f64 * (MATCH_WIDTH + HORIZONTAL_GAP);
            let spacing = height / numbers.len() as f64;
            let matches = numbers
                .iter()
                .enumerate()
                .map(|(j, &match_number)| MatchBox {
                    round,
                    match_number,
                    x,
                    y: (j as f64 + 0.5) * spacing - MATCH_HEIGHT / 2.0,
                    width: MATCH_WIDTH,
                    height: MATCH_HEIGHT,
                })
                .collect();
            RoundColumn {
                round,
                label: round_label(round, total_rounds),
                x,
                matches,
            }
        })
        .collect();

    let connectors = rounds
        .windows(2)
        .flat_map(|pair| connect(&pair[0], &pair[1], height))
        .collect();

    let width = rounds.len() as f64 * MATCH_WIDTH
        + rounds.len().saturating_sub(1) as f64 * HORIZONTAL_GAP;

    BracketLayout {
        rounds,
        connectors,
        width,
        height,
    }
}

fn connect(column: &RoundColumn, next: &RoundColumn, height: f64) -> Vec<Connector> {
    let next_spacing = height / next.matches.len().max(1) as f64;
    let stub_end = column.x + MATCH_WIDTH + HORIZONTAL_GAP / 2.0;
    let next_x = column.x + MATCH_WIDTH + HORIZONTAL_GAP;

    column
        .matches
        .chunks_exact(2)
        .enumerate()
        .map(|(k, pair)| {
            let upper = pair[0].center_y();
            let lower = pair[1].center_y();
            let mid = (upper + lower) / 2.0;
            let target_y = (k as f64 + 0.5) * next_spacing;
            Connector {
                round: column.round,
                target_match: k as u32 + 1,
                upper_stub: Line {
                    from: Point {
                        x: column.x + MATCH_WIDTH,
                        y: upper,
                    },
                    to: Point { x: stub_end, y: upper },
                },
                lower_stub: Line {
                    from: Point {
                        x: column.x + MATCH_WIDTH,
                        y: lower,
                    },
                    to: Point { x: stub_end, y: lower },
                },
                bridge: Line {
                    from: Point { x: stub_end, y: upper },
                    to: Point { x: stub_end, y: lower },
                },
                link: Line {
                    from: Point { x: stub_end, y: mid },
                    to: Point {
                        x: next_x,
                        y: target_y,
                    },
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bracket(size: u32) -> Vec<MatchSlot> {
        let mut matches = Vec::new();
        let mut round = 1;
        let mut count = size / 2;
        while count >= 1 {
            matches.extend((1..=count).map(|n| MatchSlot::empty(round, n)));
            round += 1;
            count /= 2;
        }
        matches
    }

    #[test]
    fn test_empty_input_gives_empty_layout() {
        let l = layout(&[]);
        assert!(l.rounds.is_empty());
        assert!(l.connectors.is_empty());
        assert_eq!(l.width, 0.0);
        assert_eq!(l.height, 0.0);
    }

    #[test]
    fn test_eight_player_geometry() {
        let l = layout(&bracket(8));
        assert_eq!(l.rounds.len(), 3);
        assert_eq!(l.height, 4.0 * 120.0 * 2.0);
        assert_eq!(l.width, 3.0 * 240.0 + 2.0 * 160.0);

        let first = &l.rounds[0];
        assert_eq!(first.x, 0.0);
        assert_eq!(first.matches[0].center_y(), 120.0);
        assert_eq!(first.matches[3].center_y(), 840.0);

        let final_round = &l.rounds[2];
        assert_eq!(final_round.x, 800.0);
        assert_eq!(final_round.matches[0].center_y(), 480.0);
    }

    #[test]
    fn test_round_labels() {
        let l = layout(&bracket(16));
        let labels: Vec<_> = l.rounds.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Round 1", "Round 2", "Semifinals", "Final"]);

        let l = layout(&bracket(2));
        assert_eq!(l.rounds[0].label, "Final");
    }

    #[test]
    fn test_connectors_meet_next_match_center() {
        let l = layout(&bracket(8));
        assert_eq!(l.connectors.len(), 3);

        for c in &l.connectors {
            let col = (c.round - 1) as usize;
            let target = &l.rounds[col + 1].matches[(c.target_match - 1) as usize];
            assert_eq!(c.link.to.x, target.x);
            assert_eq!(c.link.to.y, target.center_y());
            assert_eq!(c.upper_stub.to, c.bridge.from);
            assert_eq!(c.lower_stub.to, c.bridge.to);
            assert_eq!(c.link.from.y, (c.bridge.from.y + c.bridge.to.y) / 2.0);
        }
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let mut matches = bracket(8);
        let ordered = layout(&matches);
        matches.reverse();
        assert_eq!(layout(&matches), ordered);
    }

    #[test]
    fn test_layout_is_idempotent() {
        let matches = bracket(32);
        assert_eq!(layout(&matches), layout(&matches));
    }
}
