// Trade shapes, gives, value/bonus/fairness formulas and the candidate record.
//
// The valuation here is shared by the batch recommender and the interactive
// session, so both always agree on the numbers for the same set of gives.

use serde::Serialize;

use crate::position::Position;
use crate::valuation::points::{Player, PositionWeights};

// ---------------------------------------------------------------------------
// Trade type
// ---------------------------------------------------------------------------

/// Player-count shape of a trade, independent of which side gives more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TradeType {
    OneForOne,
    TwoForOne,
    ThreeForTwo,
}

impl TradeType {
    /// Exact shape for the given side sizes, or `None` for unsupported shapes.
    pub fn from_counts(team1: usize, team2: usize) -> Option<Self> {
        let (small, large) = if team1 <= team2 { (team1, team2) } else { (team2, team1) };
        match (small, large) {
            (1, 1) => Some(TradeType::OneForOne),
            (1, 2) => Some(TradeType::TwoForOne),
            (2, 3) => Some(TradeType::ThreeForTwo),
            _ => None,
        }
    }

    /// Exact shape if supported, otherwise the closest shape by total players.
    pub fn nearest(team1: usize, team2: usize) -> Self {
        Self::from_counts(team1, team2).unwrap_or(match team1 + team2 {
            0..=2 => TradeType::OneForOne,
            3 => TradeType::TwoForOne,
            _ => TradeType::ThreeForTwo,
        })
    }

    pub fn label(&self) -> &'static str {
        match self {
            TradeType::OneForOne => "1-for-1",
            TradeType::TwoForOne => "2-for-1",
            TradeType::ThreeForTwo => "3-for-2",
        }
    }

    /// Flat credit for the side holding the best player in the trade.
    pub fn best_player_bonus(&self) -> f64 {
        match self {
            TradeType::OneForOne => 1.0,
            TradeType::TwoForOne | TradeType::ThreeForTwo => 3.0,
        }
    }

    /// Largest value difference a recommended trade of this shape may have.
    pub fn max_value_difference(&self) -> f64 {
        match self {
            TradeType::OneForOne => 6.0,
            TradeType::TwoForOne => 8.0,
            TradeType::ThreeForTwo => 10.0,
        }
    }

    /// Minimum ratio of the smaller side's value to the larger side's value.
    ///
    /// The "smaller side" is the one giving fewer players.
    pub fn consolidation_floor(&self) -> Option<f64> {
        match self {
            TradeType::OneForOne => None,
            TradeType::TwoForOne => Some(0.80),
            TradeType::ThreeForTwo => Some(0.75),
        }
    }

    /// Upper value-difference bounds for `Fair` and `Good`.
    fn fairness_cutoffs(&self) -> (f64, f64) {
        match self {
            TradeType::OneForOne => (2.0, 4.0),
            TradeType::TwoForOne => (3.0, 5.5),
            TradeType::ThreeForTwo => (4.0, 7.0),
        }
    }

    /// Grade a value difference for this shape.
    pub fn fairness(&self, value_difference: f64) -> Fairness {
        let (fair, good) = self.fairness_cutoffs();
        if value_difference <= fair {
            Fairness::Fair
        } else if value_difference <= good {
            Fairness::Good
        } else {
            Fairness::Moderate
        }
    }
}

/// Discrete fairness label for a trade's value difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Fairness {
    Fair,
    Good,
    Moderate,
}

impl Fairness {
    pub fn label(&self) -> &'static str {
        match self {
            Fairness::Fair => "Fair",
            Fairness::Good => "Good",
            Fairness::Moderate => "Moderate",
        }
    }
}

/// One of the two parties in a trade. `Team1` is always the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TradeSide {
    Team1,
    Team2,
}

impl TradeSide {
    pub fn other(&self) -> Self {
        match self {
            TradeSide::Team1 => TradeSide::Team2,
            TradeSide::Team2 => TradeSide::Team1,
        }
    }
}

// ---------------------------------------------------------------------------
// Gives and valuation
// ---------------------------------------------------------------------------

/// A player a side sends away, valued at its position weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeGive {
    pub player: Player,
    pub position: Position,
    pub adjusted_value: f64,
}

impl TradeGive {
    pub fn new(player: Player, weights: &PositionWeights) -> Self {
        let position = player.position;
        let adjusted_value = player.adjusted_value(position, weights);
        TradeGive {
            player,
            position,
            adjusted_value,
        }
    }
}

/// Bonus credited to the side sending the single most valuable player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestPlayerBonus {
    pub player_id: String,
    pub player_name: String,
    pub side: TradeSide,
    pub amount: f64,
}

/// Value totals of a set of gives.
///
/// `team1_value` and `team2_value` are the raw adjusted sums; the bonus is
/// only folded into `value_difference`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeValuation {
    pub team1_value: f64,
    pub team2_value: f64,
    pub best_player_bonus: Option<BestPlayerBonus>,
    pub value_difference: f64,
}

impl TradeValuation {
    /// Value a side sends including any bonus it earned.
    pub fn side_total(&self, side: TradeSide) -> f64 {
        let raw = match side {
            TradeSide::Team1 => self.team1_value,
            TradeSide::Team2 => self.team2_value,
        };
        let bonus = self
            .best_player_bonus
            .as_ref()
            .filter(|b| b.side == side)
            .map_or(0.0, |b| b.amount);
        raw + bonus
    }
}

/// Summed adjusted value of one side's gives. An empty side is `+0.0`.
pub fn side_value(gives: &[TradeGive]) -> f64 {
    gives.iter().fold(0.0, |acc, g| acc + g.adjusted_value)
}

/// Sum both sides, award the best-player bonus and compute the difference.
///
/// Ties for best player go to team1. No bonus is awarded to an empty trade.
pub fn value_trade(team1_gives: &[TradeGive], team2_gives: &[TradeGive], trade_type: TradeType) -> TradeValuation {
    let team1_value = side_value(team1_gives);
    let team2_value = side_value(team2_gives);

    let mut best: Option<(&TradeGive, TradeSide)> = None;
    let sides = [(team1_gives, TradeSide::Team1), (team2_gives, TradeSide::Team2)];
    for (gives, side) in sides {
        for give in gives {
            let better = match best {
                Some((current, _)) => give.adjusted_value > current.adjusted_value,
                None => true,
            };
            if better {
                best = Some((give, side));
            }
        }
    }

    let best_player_bonus = best.map(|(give, side)| BestPlayerBonus {
        player_id: give.player.id.clone(),
        player_name: give.player.full_name.clone(),
        side,
        amount: trade_type.best_player_bonus(),
    });

    let mut valuation = TradeValuation {
        team1_value,
        team2_value,
        best_player_bonus,
        value_difference: 0.0,
    };
    valuation.value_difference =
        (valuation.side_total(TradeSide::Team1) - valuation.side_total(TradeSide::Team2)).abs();
    valuation
}

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// The probable waiver casualty of the side receiving more players.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LikelyDrop {
    pub side: TradeSide,
    pub player: Player,
    pub adjusted_value: f64,
}

/// A validated, valued and scored trade recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeCandidate {
    pub trade_type: TradeType,
    /// The acting user's team.
    pub team1: String,
    pub team2: String,
    pub team1_gives: Vec<TradeGive>,
    pub team2_gives: Vec<TradeGive>,
    pub team1_value: f64,
    pub team2_value: f64,
    pub best_player_bonus: Option<BestPlayerBonus>,
    pub value_difference: f64,
    pub fairness: Fairness,
    pub likely_dropped: Option<LikelyDrop>,
    /// Ranking score; higher sorts first.
    pub score: f64,
}

impl TradeCandidate {
    /// Identity used for deduplication.
    pub fn key(&self) -> String {
        trade_key(&self.team1, &self.team2, &self.team1_gives, &self.team2_gives)
    }

    pub fn gives(&self, side: TradeSide) -> &[TradeGive] {
        match side {
            TradeSide::Team1 => &self.team1_gives,
            TradeSide::Team2 => &self.team2_gives,
        }
    }
}

/// `team1|team2|sorted team1 ids|sorted team2 ids`.
pub fn trade_key(team1: &str, team2: &str, team1_gives: &[TradeGive], team2_gives: &[TradeGive]) -> String {
    let sorted_ids = |gives: &[TradeGive]| {
        let mut ids: Vec<&str> = gives.iter().map(|g| g.player.id.as_str()).collect();
        ids.sort_unstable();
        ids.join(",")
    };
    format!("{team1}|{team2}|{}|{}", sorted_ids(team1_gives), sorted_ids(team2_gives))
}

/// Whether any player id appears more than once across both give lists.
pub fn has_duplicate_players(team1_gives: &[TradeGive], team2_gives: &[TradeGive]) -> bool {
    let mut seen = std::collections::HashSet::new();
    team1_gives
        .iter()
        .chain(team2_gives)
        .any(|g| !seen.insert(g.player.id.as_str()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
