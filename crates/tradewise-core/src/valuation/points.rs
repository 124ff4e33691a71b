// Per-game fantasy scoring and position-weighted player value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::position::{Position, PositionTable};

// ---------------------------------------------------------------------------
// Scoring type
// ---------------------------------------------------------------------------

/// Which season point total counts as canonical for a league.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScoringType {
    #[default]
    Ppr,
    HalfPpr,
    Standard,
}

impl ScoringType {
    /// Resolve the scoring type from a league's points-per-reception setting.
    ///
    /// Missing settings resolve to full PPR.
    pub fn from_reception_points(reception_points: Option<f64>) -> Self {
        match reception_points {
            Some(rec) if rec.is_finite() && rec >= 0.75 => ScoringType::Ppr,
            Some(rec) if rec.is_finite() && rec >= 0.25 => ScoringType::HalfPpr,
            Some(rec) if rec.is_finite() => ScoringType::Standard,
            _ => ScoringType::Ppr,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoringType::Ppr => "PPR",
            ScoringType::HalfPpr => "Half-PPR",
            ScoringType::Standard => "Standard",
        }
    }
}

// ---------------------------------------------------------------------------
// Stat line
// ---------------------------------------------------------------------------

/// Season totals for one player as delivered by the stats provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    #[serde(default)]
    pub pts_ppr: Option<f64>,
    #[serde(default)]
    pub pts_half_ppr: Option<f64>,
    #[serde(default)]
    pub pts_std: Option<f64>,
    #[serde(default, alias = "gp")]
    pub games_played: Option<f64>,
}

impl StatLine {
    /// Season point total under the given scoring type (0.0 when missing).
    pub fn total_points(&self, scoring: ScoringType) -> f64 {
        let total = match scoring {
            ScoringType::Ppr => self.pts_ppr,
            ScoringType::HalfPpr => self.pts_half_ppr,
            ScoringType::Standard => self.pts_std,
        };
        total.filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

/// Fantasy points per game for a season stat line.
///
/// Returns 0.0 when the player has no games, no stats, or a non-finite total.
pub fn fantasy_points_per_game(stats: Option<&StatLine>, scoring: ScoringType) -> f64 {
    let Some(stats) = stats else {
        return 0.0;
    };
    let games = stats.games_played.filter(|g| g.is_finite()).unwrap_or(0.0);
    if games <= 0.0 {
        return 0.0;
    }
    stats.total_points(scoring) / games
}

// ---------------------------------------------------------------------------
// Position weights
// ---------------------------------------------------------------------------

#[derive(Debug, Error, PartialEq)]
pub enum WeightError {
    #[error("weight for {position} must be a positive finite number, got {value}")]
    NotPositive { position: Position, value: f64 },

    #[error("{position} does not take a scarcity weight")]
    UnweightedPosition { position: Position },
}

/// Scarcity multipliers applied to points-per-game for cross-position comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionWeights(PositionTable<f64>);

impl Default for PositionWeights {
    fn default() -> Self {
        PositionWeights(PositionTable::new(0.625, 1.0, 0.95, 1.05))
    }
}

impl PositionWeights {
    /// Build a weight table, validating every entry.
    pub fn new(qb: f64, rb: f64, wr: f64, te: f64) -> Result<Self, WeightError> {
        let table = PositionTable::new(qb, rb, wr, te);
        for (position, &value) in table.iter() {
            check_weight(position, value)?;
        }
        Ok(PositionWeights(table))
    }

    /// Multiplier for a position. Kickers and defenses weigh zero.
    pub fn weight(&self, position: Position) -> f64 {
        self.0.get(position).copied().unwrap_or(0.0)
    }

    /// Replace a single weight, leaving the table untouched on error.
    pub fn set(&mut self, position: Position, value: f64) -> Result<(), WeightError> {
        if !position.is_tradeable() {
            return Err(WeightError::UnweightedPosition { position });
        }
        check_weight(position, value)?;
        self.0[position] = value;
        Ok(())
    }
}

fn check_weight(position: Position, value: f64) -> Result<(), WeightError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(WeightError::NotPositive { position, value });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A rostered player valued for one season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub full_name: String,
    pub position: Position,
    /// NFL team abbreviation; empty for free agents.
    pub team: String,
    pub fantasy_points_per_game: f64,
}

impl Player {
    /// Points per game scaled by the weight of `position`.
    pub fn adjusted_value(&self, position: Position, weights: &PositionWeights) -> f64 {
        adjusted_value(self.fantasy_points_per_game, position, weights)
    }
}

/// `ppg × weight(position)`.
pub fn adjusted_value(ppg: f64, position: Position, weights: &PositionWeights) -> f64 {
    ppg * weights.weight(position)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
