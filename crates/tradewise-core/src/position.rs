// Football positions and a fixed-size per-position table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Football positions as reported by the league provider.
///
/// Only the four offensive skill positions take part in trade logic; kickers
/// and defenses are recognized so they can be skipped explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    K,
    DEF,
}

impl Position {
    /// Positions that carry a strength profile and can be traded.
    pub const TRADEABLE: [Position; 4] = [Position::QB, Position::RB, Position::WR, Position::TE];

    /// Parse a provider position string.
    ///
    /// Accepts "DST" and "D/ST" as aliases for team defense.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::QB),
            "RB" => Some(Position::RB),
            "WR" => Some(Position::WR),
            "TE" => Some(Position::TE),
            "K" => Some(Position::K),
            "DEF" | "DST" | "D/ST" => Some(Position::DEF),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::K => "K",
            Position::DEF => "DEF",
        }
    }

    /// Whether this position participates in profiling and trades.
    pub fn is_tradeable(&self) -> bool {
        self.slot_index().is_some()
    }

    /// Number of starters averaged into the position's strength.
    pub fn starter_slots(&self) -> usize {
        match self {
            Position::RB => 3,
            Position::WR => 4,
            _ => 1,
        }
    }

    /// Fallback points-per-game for an empty starter slot during trade simulation.
    pub fn replacement_level(&self) -> f64 {
        match self {
            Position::QB => 12.0,
            Position::RB => 6.0,
            Position::WR => 8.0,
            Position::TE => 5.0,
            Position::K | Position::DEF => 0.0,
        }
    }

    fn slot_index(&self) -> Option<usize> {
        match self {
            Position::QB => Some(0),
            Position::RB => Some(1),
            Position::WR => Some(2),
            Position::TE => Some(3),
            Position::K | Position::DEF => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

// ---------------------------------------------------------------------------
// PositionTable
// ---------------------------------------------------------------------------

/// One value per tradeable position (QB, RB, WR, TE).
///
/// Indexing with `K` or `DEF` panics; callers filter with
/// [`Position::is_tradeable`] first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionTable<T>([T; 4]);

impl<T> PositionTable<T> {
    pub fn new(qb: T, rb: T, wr: T, te: T) -> Self {
        PositionTable([qb, rb, wr, te])
    }

    /// Build a table by evaluating `f` for each tradeable position in order.
    pub fn from_fn(mut f: impl FnMut(Position) -> T) -> Self {
        PositionTable([
            f(Position::QB),
            f(Position::RB),
            f(Position::WR),
            f(Position::TE),
        ])
    }

    pub fn get(&self, pos: Position) -> Option<&T> {
        pos.slot_index().map(|i| &self.0[i])
    }

    /// Iterate `(position, value)` pairs in QB, RB, WR, TE order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &T)> {
        Position::TRADEABLE.iter().copied().zip(self.0.iter())
    }

    pub fn map<U>(&self, mut f: impl FnMut(Position, &T) -> U) -> PositionTable<U> {
        PositionTable::from_fn(|pos| f(pos, &self[pos]))
    }
}

impl<T> Index<Position> for PositionTable<T> {
    type Output = T;

    fn index(&self, pos: Position) -> &T {
        match pos.slot_index() {
            Some(i) => &self.0[i],
            None => panic!("{pos} has no entry in a position table"),
        }
    }
}

impl<T> IndexMut<Position> for PositionTable<T> {
    fn index_mut(&mut self, pos: Position) -> &mut T {
        match pos.slot_index() {
            Some(i) => &mut self.0[i],
            None => panic!("{pos} has no entry in a position table"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
