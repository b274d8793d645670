//! Hex board geometry with axial coordinates and static terrain

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::BoardError;

/// Axial hex coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Manhattan distance in axial space: |dq| + |dr|
    ///
    /// Used for attack range and for "closest reachable" destination picks.
    pub fn manhattan_distance(&self, other: Hex) -> u32 {
        (self.q - other.q).unsigned_abs() + (self.r - other.r).unsigned_abs()
    }

    /// Offset this hex by a direction vector
    pub fn offset(&self, (dq, dr): (i32, i32)) -> Hex {
        Hex::new(self.q + dq, self.r + dr)
    }
}

impl std::fmt::Display for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Direction vectors in axial coordinates (dq, dr)
///
/// Only four of the six hex directions connect tiles on this grid. Path costs
/// depend on it, so do not widen this to full hex adjacency.
pub const DIRECTIONS: [(i32, i32); 4] = [
    (1, 0),  // E
    (-1, 0), // W
    (0, 1),  // S
    (0, -1), // N
];

/// Terrain kind of a tile
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Plain,
    Forest,
    Hill,
    Water,
    City,
    Swamp,
    Road,
    Bridge,
    Ford,
}

impl Terrain {
    /// Movement cost when the tile doesn't override it
    pub fn default_cost(self) -> u32 {
        match self {
            Terrain::Plain | Terrain::City | Terrain::Road | Terrain::Bridge => 1,
            Terrain::Forest | Terrain::Hill | Terrain::Ford => 2,
            Terrain::Swamp => 3,
            Terrain::Water => 1,
        }
    }

    pub fn default_passable(self) -> bool {
        self != Terrain::Water
    }

    /// Map glyph used by [`Board::parse`]
    pub fn glyph(self) -> char {
        match self {
            Terrain::Plain => '.',
            Terrain::Forest => 'F',
            Terrain::Hill => 'H',
            Terrain::Water => '~',
            Terrain::City => 'C',
            Terrain::Swamp => 'S',
            Terrain::Road => '=',
            Terrain::Bridge => 'B',
            Terrain::Ford => 'f',
        }
    }

    pub fn from_glyph(c: char) -> Option<Self> {
        Some(match c {
            '.' => Terrain::Plain,
            'F' => Terrain::Forest,
            'H' => Terrain::Hill,
            '~' => Terrain::Water,
            'C' => Terrain::City,
            'S' => Terrain::Swamp,
            '=' => Terrain::Road,
            'B' => Terrain::Bridge,
            'f' => Terrain::Ford,
            _ => return None,
        })
    }
}

/// A single board tile, immutable for the duration of a game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub coord: Hex,
    pub terrain: Terrain,
    pub passable: bool,
    pub movement_cost: u32,
}

impl Tile {
    /// Tile with the terrain's default cost and passability
    pub fn new(coord: Hex, terrain: Terrain) -> Self {
        Self {
            coord,
            terrain,
            passable: terrain.default_passable(),
            movement_cost: terrain.default_cost(),
        }
    }

    pub fn with_cost(mut self, movement_cost: u32) -> Self {
        self.movement_cost = movement_cost;
        self
    }

    pub fn impassable(mut self) -> Self {
        self.passable = false;
        self
    }
}

/// Static terrain: at most one tile per coordinate
///
/// Boards need not be rectangular; `tile_at` may return `None` anywhere
/// inside the bounding box.
#[derive(Clone, Debug, Default)]
pub struct Board {
    tiles: FxHashMap<Hex, Tile>,
    min_q: i32,
    max_q: i32,
    rows: BTreeSet<i32>,
}

impl Board {
    /// Build a board from tiles, rejecting duplicates and zero-cost tiles
    pub fn new(tiles: impl IntoIterator<Item = Tile>) -> Result<Self, BoardError> {
        let mut board = Board {
            min_q: i32::MAX,
            max_q: i32::MIN,
            ..Default::default()
        };

        for tile in tiles {
            if tile.movement_cost == 0 {
                return Err(BoardError::ZeroCost(tile.coord));
            }
            if board.tiles.insert(tile.coord, tile).is_some() {
                return Err(BoardError::DuplicateTile(tile.coord));
            }
            board.min_q = board.min_q.min(tile.coord.q);
            board.max_q = board.max_q.max(tile.coord.q);
            board.rows.insert(tile.coord.r);
        }

        if board.tiles.is_empty() {
            board.min_q = 0;
            board.max_q = -1;
        }

        Ok(board)
    }

    /// All-plain board with q in 0..columns and r in 0..rows
    pub fn rectangular(columns: u32, rows: u32) -> Self {
        let mut tiles = FxHashMap::default();
        let mut row_set = BTreeSet::new();
        for r in 0..rows as i32 {
            row_set.insert(r);
            for q in 0..columns as i32 {
                let hex = Hex::new(q, r);
                tiles.insert(hex, Tile::new(hex, Terrain::Plain));
            }
        }
        let (min_q, max_q) = if columns == 0 || rows == 0 {
            (0, -1)
        } else {
            (0, columns as i32 - 1)
        };
        Board {
            tiles,
            min_q,
            max_q,
            rows: row_set,
        }
    }

    /// Parse an ASCII map: line index is `r`, character index is `q`.
    /// Spaces and `#` leave the coordinate without a tile.
    pub fn parse(map: &str) -> Result<Self, BoardError> {
        let mut tiles = Vec::new();
        for (r, line) in map.lines().enumerate() {
            for (q, glyph) in line.chars().enumerate() {
                if glyph == ' ' || glyph == '#' {
                    continue;
                }
                let terrain = Terrain::from_glyph(glyph).ok_or(BoardError::UnknownGlyph {
                    glyph,
                    at: Hex::new(q as i32, r as i32),
                })?;
                tiles.push(Tile::new(Hex::new(q as i32, r as i32), terrain));
            }
        }
        Board::new(tiles)
    }

    /// Render back to the ASCII map format
    pub fn render(&self) -> String {
        let mut out = String::new();
        let max_r = self.rows.iter().next_back().copied().unwrap_or(-1);
        for r in 0..=max_r {
            let line: String = (0..=self.max_q)
                .map(|q| {
                    self.tile_at(Hex::new(q, r))
                        .map(|t| t.terrain.glyph())
                        .unwrap_or(' ')
                })
                .collect();
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out
    }

    pub fn tile_at(&self, hex: Hex) -> Option<&Tile> {
        self.tiles.get(&hex)
    }

    /// Missing tiles count as impassable
    pub fn is_passable(&self, hex: Hex) -> bool {
        self.tile_at(hex).is_some_and(|t| t.passable)
    }

    /// Neighbor coordinates along the four connected directions.
    /// Coordinates are returned whether or not a tile exists there.
    pub fn neighbors(&self, hex: Hex) -> Vec<Hex> {
        DIRECTIONS.iter().map(|&dir| hex.offset(dir)).collect()
    }

    /// Width of the bounding box in columns
    pub fn columns(&self) -> u32 {
        (self.max_q - self.min_q + 1).max(0) as u32
    }

    /// Number of distinct rows
    pub fn rows(&self) -> u32 {
        self.rows.len() as u32
    }

    pub fn min_q(&self) -> i32 {
        self.min_q
    }

    pub fn max_q(&self) -> i32 {
        self.max_q
    }

    /// Zero-based column index of a hex within the bounding box
    pub fn column_index(&self, hex: Hex) -> i32 {
        hex.q - self.min_q
    }

    /// Reflect a column across the board's vertical midline, clamped to bounds
    pub fn mirror_q(&self, q: i32) -> i32 {
        (self.min_q + self.max_q - q).clamp(self.min_q, self.max_q)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles.values()
    }

    /// Tiles sorted by (r, q) for stable output
    pub fn sorted_tiles(&self) -> Vec<Tile> {
        let mut tiles: Vec<Tile> = self.tiles.values().copied().collect();
        tiles.sort_by_key(|t| (t.coord.r, t.coord.q));
        tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
