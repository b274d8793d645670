//! Cost-bounded shortest-path search over the board
//!
//! Uniform-cost search from the start hex. When the target can't be reached
//! within budget the unit still gets as close as it can: the destination is
//! the reachable tile nearest (Manhattan) to the target, ties going to the
//! cheaper tile.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::board::{Board, Hex};

/// A found path, ordered start -> destination inclusive
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathResult {
    pub cost: u32,
    pub path: Vec<Hex>,
}

impl PathResult {
    pub fn destination(&self) -> Option<Hex> {
        self.path.last().copied()
    }

    /// True when the path goes nowhere
    pub fn is_trivial(&self) -> bool {
        self.path.len() <= 1
    }
}

/// Find the path toward `target`, or the closest reachable tile to it.
///
/// Returns `None` only when the start hex has no tile.
pub fn find_path(
    board: &Board,
    start: Hex,
    target: Hex,
    blocked: &FxHashSet<Hex>,
    max_cost: u32,
) -> Option<PathResult> {
    let (costs, came_from) = search(board, start, blocked, max_cost);

    let destination = if costs.contains_key(&target) {
        target
    } else {
        costs
            .iter()
            .min_by_key(|&(&hex, &cost)| (hex.manhattan_distance(target), cost, hex))
            .map(|(&hex, _)| hex)?
    };

    let mut path = vec![destination];
    let mut current = destination;
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();

    Some(PathResult {
        cost: costs[&destination],
        path,
    })
}

/// Every tile reachable within budget, with its cheapest cost
pub fn reachable_tiles(
    board: &Board,
    start: Hex,
    blocked: &FxHashSet<Hex>,
    max_cost: u32,
) -> FxHashMap<Hex, u32> {
    search(board, start, blocked, max_cost).0
}

type SearchTables = (FxHashMap<Hex, u32>, FxHashMap<Hex, Hex>);

fn search(board: &Board, start: Hex, blocked: &FxHashSet<Hex>, max_cost: u32) -> SearchTables {
    let mut costs: FxHashMap<Hex, u32> = FxHashMap::default();
    let mut came_from: FxHashMap<Hex, Hex> = FxHashMap::default();

    if board.tile_at(start).is_none() {
        return (costs, came_from);
    }

    let mut frontier = BinaryHeap::new();
    costs.insert(start, 0);
    frontier.push(Frontier { hex: start, cost: 0 });

    while let Some(Frontier { hex, cost }) = frontier.pop() {
        // Stale entry, a cheaper route was already found
        if cost > costs.get(&hex).copied().unwrap_or(u32::MAX) {
            continue;
        }

        for next in board.neighbors(hex) {
            if blocked.contains(&next) {
                continue;
            }
            let Some(tile) = board.tile_at(next) else {
                continue;
            };
            if !tile.passable {
                continue;
            }

            let next_cost = cost.saturating_add(tile.movement_cost);
            if next_cost > max_cost {
                continue;
            }

            if next_cost < costs.get(&next).copied().unwrap_or(u32::MAX) {
                costs.insert(next, next_cost);
                came_from.insert(next, hex);
                frontier.push(Frontier {
                    hex: next,
                    cost: next_cost,
                });
            }
        }
    }

    (costs, came_from)
}

/// Priority queue entry
#[derive(Copy, Clone, Eq, PartialEq)]
struct Frontier {
    hex: Hex,
    cost: u32,
}

// Min-heap on cost; hex comparison keeps Ord consistent with Eq
impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.hex.cmp(&self.hex))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Terrain, Tile};
    use proptest::prelude::*;

    fn no_blocks() -> FxHashSet<Hex> {
        FxHashSet::default()
    }

    fn path_cost(board: &Board, path: &[Hex]) -> u32 {
        path.iter()
            .skip(1)
            .map(|&h| board.tile_at(h).unwrap().movement_cost)
            .sum()
    }

    #[test]
    fn test_start_equals_target() {
        let board = Board::rectangular(3, 3);
        let start = Hex::new(1, 1);
        let result = find_path(&board, start, start, &no_blocks(), 0).unwrap();
        assert_eq!(result.cost, 0);
        assert_eq!(result.path, vec![start]);
        assert!(result.is_trivial());
    }

    #[test]
    fn test_missing_start_returns_none() {
        let board = Board::rectangular(2, 2);
        assert!(find_path(&board, Hex::new(5, 5), Hex::new(0, 0), &no_blocks(), 10).is_none());
    }

    #[test]
    fn test_three_tile_corridor() {
        let board = Board::parse("...").unwrap();
        let result = find_path(&board, Hex::new(0, 0), Hex::new(2, 0), &no_blocks(), 2).unwrap();
        assert_eq!(result.cost, 2);
        assert_eq!(result.path, vec![Hex::new(0, 0), Hex::new(1, 0), Hex::new(2, 0)]);

        // Budget of 1 lands on the middle tile
        let short = find_path(&board, Hex::new(0, 0), Hex::new(2, 0), &no_blocks(), 1).unwrap();
        assert_eq!(short.cost, 1);
        assert_eq!(short.path, vec![Hex::new(0, 0), Hex::new(1, 0)]);
    }

    #[test]
    fn test_prefers_cheaper_detour() {
        // Straight line crosses two swamps (7); the detour over plains costs 5
        let board = Board::parse(".SS.\n....").unwrap();
        let result = find_path(&board, Hex::new(0, 0), Hex::new(3, 0), &no_blocks(), 10).unwrap();
        assert_eq!(result.cost, 5);
        assert_eq!(result.destination(), Some(Hex::new(3, 0)));
        assert!(!result.path.contains(&Hex::new(1, 0)));
    }

    #[test]
    fn test_blocked_tile_is_avoided() {
        let board = Board::rectangular(3, 2);
        let mut blocked = no_blocks();
        blocked.insert(Hex::new(1, 0));
        let result = find_path(&board, Hex::new(0, 0), Hex::new(2, 0), &blocked, 10).unwrap();
        assert_eq!(result.cost, 4);
        assert!(!result.path.contains(&Hex::new(1, 0)));
    }

    #[test]
    fn test_target_reached_beats_cheaper_candidates() {
        let board = Board::rectangular(5, 1);
        let result = find_path(&board, Hex::new(0, 0), Hex::new(4, 0), &no_blocks(), 4).unwrap();
        assert_eq!(result.destination(), Some(Hex::new(4, 0)));
    }

    #[test]
    fn test_unreachable_target_walls_in() {
        // Water cuts the board in two; the unit walks up to the shore
        let board = Board::parse("..~..").unwrap();
        let result = find_path(&board, Hex::new(0, 0), Hex::new(4, 0), &no_blocks(), 10).unwrap();
        assert_eq!(result.destination(), Some(Hex::new(1, 0)));
        assert_eq!(result.cost, 1);
    }

    #[test]
    fn test_closest_tie_broken_by_cost() {
        // (1,0) and (0,1) are both 2 away from (1,2); (0,1) is swamp
        let board = Board::new([
            Tile::new(Hex::new(0, 0), Terrain::Plain),
            Tile::new(Hex::new(1, 0), Terrain::Plain),
            Tile::new(Hex::new(0, 1), Terrain::Swamp),
            Tile::new(Hex::new(2, 2), Terrain::Plain),
        ])
        .unwrap();
        let result = find_path(&board, Hex::new(0, 0), Hex::new(1, 2), &no_blocks(), 5).unwrap();
        assert_eq!(result.destination(), Some(Hex::new(1, 0)));
    }

    #[test]
    fn test_reachable_tiles_respects_budget() {
        let board = Board::rectangular(5, 5);
        let reach = reachable_tiles(&board, Hex::new(2, 2), &no_blocks(), 1);
        assert_eq!(reach.len(), 5);
        assert_eq!(reach[&Hex::new(2, 2)], 0);
        assert!(reach.values().all(|&c| c <= 1));
    }

    fn arb_board() -> impl Strategy<Value = Board> {
        prop::collection::vec(0u8..6, 36).prop_map(|cells| {
            let tiles = cells.iter().enumerate().filter_map(|(i, &c)| {
                let hex = Hex::new((i % 6) as i32, (i / 6) as i32);
                match c {
                    0 => None,
                    1 => Some(Tile::new(hex, Terrain::Water)),
                    2 => Some(Tile::new(hex, Terrain::Swamp)),
                    3 => Some(Tile::new(hex, Terrain::Forest)),
                    _ => Some(Tile::new(hex, Terrain::Plain)),
                }
            });
            Board::new(tiles).unwrap()
        })
    }

    proptest! {
        #[test]
        fn prop_path_cost_matches_tiles(
            board in arb_board(),
            sq in 0i32..6, sr in 0i32..6,
            tq in 0i32..6, tr in 0i32..6,
            max_cost in 0u32..12,
            blocked_cells in prop::collection::vec((0i32..6, 0i32..6), 0..6),
        ) {
            let start = Hex::new(sq, sr);
            let target = Hex::new(tq, tr);
            let blocked: FxHashSet<Hex> = blocked_cells
                .into_iter()
                .map(|(q, r)| Hex::new(q, r))
                .filter(|&h| h != start)
                .collect();

            match find_path(&board, start, target, &blocked, max_cost) {
                None => prop_assert!(board.tile_at(start).is_none()),
                Some(result) => {
                    prop_assert_eq!(result.path[0], start);
                    prop_assert!(result.cost <= max_cost);
                    prop_assert_eq!(path_cost(&board, &result.path), result.cost);
                    for step in result.path.iter().skip(1) {
                        prop_assert!(!blocked.contains(step));
                        prop_assert!(board.is_passable(*step));
                    }
                    for pair in result.path.windows(2) {
                        prop_assert_eq!(pair[0].manhattan_distance(pair[1]), 1);
                    }
                }
            }
        }

        #[test]
        fn prop_start_to_start_is_free(board in arb_board(), q in 0i32..6, r in 0i32..6) {
            let start = Hex::new(q, r);
            if board.tile_at(start).is_some() {
                let result = find_path(&board, start, start, &FxHashSet::default(), 0).unwrap();
                prop_assert_eq!(result.cost, 0);
                prop_assert_eq!(result.path, vec![start]);
            }
        }
    }
}
