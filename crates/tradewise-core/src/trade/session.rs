// Interactive trade builder.
//
// Holds two editable give lists and keeps a live analysis that is recomputed
// after every mutation, using the same valuation as the recommender but
// without the simulation gate or acceptance cap.

use serde::Serialize;

use crate::trade::candidate::{value_trade, BestPlayerBonus, Fairness, TradeCandidate, TradeGive, TradeSide, TradeType};
use crate::valuation::points::{Player, PositionWeights};

/// Live valuation of the trade being built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeAnalysis {
    /// Exact shape, or the nearest supported shape by total player count.
    pub trade_type: TradeType,
    pub team1_value: f64,
    pub team2_value: f64,
    pub value_difference: f64,
    pub fairness: Fairness,
    pub best_player_bonus: Option<BestPlayerBonus>,
}

impl TradeAnalysis {
    fn compute(team1_gives: &[TradeGive], team2_gives: &[TradeGive]) -> Self {
        let trade_type = TradeType::nearest(team1_gives.len(), team2_gives.len());
        let valuation = value_trade(team1_gives, team2_gives, trade_type);
        TradeAnalysis {
            trade_type,
            team1_value: valuation.team1_value,
            team2_value: valuation.team2_value,
            value_difference: valuation.value_difference,
            fairness: trade_type.fairness(valuation.value_difference),
            best_player_bonus: valuation.best_player_bonus,
        }
    }
}

/// A single user's editable trade.
#[derive(Debug, Clone)]
pub struct TradeSession {
    team1_gives: Vec<TradeGive>,
    team2_gives: Vec<TradeGive>,
    weights: PositionWeights,
    analysis: TradeAnalysis,
}

impl TradeSession {
    /// Empty session.
    pub fn new(weights: PositionWeights) -> Self {
        let analysis = TradeAnalysis::compute(&[], &[]);
        TradeSession {
            team1_gives: Vec::new(),
            team2_gives: Vec::new(),
            weights,
            analysis,
        }
    }

    /// Session seeded with a recommendation's gives, revalued at `weights`.
    pub fn from_candidate(candidate: &TradeCandidate, weights: PositionWeights) -> Self {
        let mut session = TradeSession::new(weights);
        for side in [TradeSide::Team1, TradeSide::Team2] {
            for give in candidate.gives(side) {
                session.add_give(side, give.player.clone());
            }
        }
        session
    }

    pub fn gives(&self, side: TradeSide) -> &[TradeGive] {
        match side {
            TradeSide::Team1 => &self.team1_gives,
            TradeSide::Team2 => &self.team2_gives,
        }
    }

    pub fn weights(&self) -> &PositionWeights {
        &self.weights
    }

    pub fn analysis(&self) -> &TradeAnalysis {
        &self.analysis
    }

    /// Whether a player can still be added to either side.
    pub fn is_available(&self, player_id: &str) -> bool {
        self.find(player_id).is_none()
    }

    /// Add a player to `side`. Returns `false` without changing anything if the
    /// player is already in the trade or is not a QB, RB, WR or TE.
    pub fn add_give(&mut self, side: TradeSide, player: Player) -> bool {
        if !player.position.is_tradeable() || !self.is_available(&player.id) {
            return false;
        }
        let give = TradeGive::new(player, &self.weights);
        self.gives_mut(side).push(give);
        self.refresh();
        true
    }

    /// Remove a player from whichever side holds it.
    pub fn remove_give(&mut self, player_id: &str) -> Option<TradeGive> {
        let (side, index) = self.find(player_id)?;
        let give = self.gives_mut(side).remove(index);
        self.refresh();
        Some(give)
    }

    /// Move a player to the other side. Returns `false` if it is not in the trade.
    pub fn move_give(&mut self, player_id: &str) -> bool {
        let Some((side, index)) = self.find(player_id) else {
            return false;
        };
        let give = self.gives_mut(side).remove(index);
        self.gives_mut(side.other()).push(give);
        self.refresh();
        true
    }

    /// Replace the weight table and revalue every give.
    pub fn set_weights(&mut self, weights: PositionWeights) {
        self.weights = weights;
        for give in self.team1_gives.iter_mut().chain(self.team2_gives.iter_mut()) {
            give.adjusted_value = give.player.adjusted_value(give.position, &self.weights);
        }
        self.refresh();
    }

    /// Drop every give from both sides.
    pub fn clear(&mut self) {
        self.team1_gives.clear();
        self.team2_gives.clear();
        self.refresh();
    }

    fn find(&self, player_id: &str) -> Option<(TradeSide, usize)> {
        [TradeSide::Team1, TradeSide::Team2].into_iter().find_map(|side| {
            self.gives(side)
                .iter()
                .position(|g| g.player.id == player_id)
                .map(|index| (side, index))
        })
    }

    fn gives_mut(&mut self, side: TradeSide) -> &mut Vec<TradeGive> {
        match side {
            TradeSide::Team1 => &mut self.team1_gives,
            TradeSide::Team2 => &mut self.team2_gives,
        }
    }

    fn refresh(&mut self) {
        self.analysis = TradeAnalysis::compute(&self.team1_gives, &self.team2_gives);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn player(id: &str, position: Position, ppg: f64) -> Player {
        Player {
            id: id.into(),
            full_name: format!("Player {id}"),
            position,
            team: "TST".into(),
            fantasy_points_per_game: ppg,
        }
    }

    #[test]
    fn empty_session_reports_zero_and_fair() {
        let session = TradeSession::new(PositionWeights::default());
        let a = session.analysis();
        assert_eq!(a.team1_value, 0.0);
        assert_eq!(a.team2_value, 0.0);
        assert_eq!(a.value_difference, 0.0);
        assert!(a.best_player_bonus.is_none());
        assert_eq!(a.fairness, Fairness::Fair);
        assert_eq!(a.trade_type, TradeType::OneForOne);
        // Reports must never show "-0.00".
        assert!(a.team1_value.is_sign_positive());
        assert!(a.team2_value.is_sign_positive());
        assert!(a.value_difference.is_sign_positive());
    }

    #[test]
    fn emptied_side_returns_to_positive_zero() {
        let mut session = TradeSession::new(PositionWeights::default());
        assert!(session.add_give(TradeSide::Team2, player("rb", Position::RB, 9.0)));
        assert!(session.remove_give("rb").is_some());
        assert!(session.analysis().team2_value.is_sign_positive());
        assert_eq!(session.analysis().team2_value, 0.0);
    }

    #[test]
    fn same_player_only_added_once() {
        let mut session = TradeSession::new(PositionWeights::default());
        let wr = player("wr", Position::WR, 14.0);

        assert!(session.is_available("wr"));
        assert!(session.add_give(TradeSide::Team1, wr.clone()));
        assert!(!session.is_available("wr"));
        assert!(!session.add_give(TradeSide::Team2, wr.clone()));
        assert!(!session.add_give(TradeSide::Team1, wr));
        assert_eq!(session.gives(TradeSide::Team1).len(), 1);
        assert!(session.gives(TradeSide::Team2).is_empty());
    }

    #[test]
    fn kickers_are_rejected() {
        let mut session = TradeSession::new(PositionWeights::default());
        assert!(!session.add_give(TradeSide::Team1, player("k", Position::K, 9.0)));
        assert!(!session.add_give(TradeSide::Team2, player("d", Position::DEF, 7.0)));
        assert!(session.is_available("k"));
    }

    #[test]
    fn analysis_tracks_mutations() {
        let mut session = TradeSession::new(PositionWeights::default());
        session.add_give(TradeSide::Team1, player("qb", Position::QB, 24.0));
        session.add_give(TradeSide::Team2, player("wr", Position::WR, 14.0));

        let a = session.analysis().clone();
        assert_eq!(a.trade_type, TradeType::OneForOne);
        assert!(approx_eq(a.value_difference, 2.7, 1e-10));
        assert_eq!(a.fairness, Fairness::Good);
        assert_eq!(a.best_player_bonus.unwrap().player_id, "qb");

        session.add_give(TradeSide::Team2, player("rb", Position::RB, 4.0));
        let a = session.analysis();
        // 15.0 + 3.0 vs 13.3 + 4.0
        assert_eq!(a.trade_type, TradeType::TwoForOne);
        assert!(approx_eq(a.value_difference, 0.7, 1e-10));
        assert_eq!(a.fairness, Fairness::Fair);

        assert!(session.move_give("rb"));
        assert_eq!(session.gives(TradeSide::Team1).len(), 2);
        // 15.0 + 4.0 + 3.0 vs 13.3
        assert!(approx_eq(session.analysis().value_difference, 8.7, 1e-10));
        assert_eq!(session.analysis().fairness, Fairness::Moderate);

        let removed = session.remove_give("qb").unwrap();
        assert_eq!(removed.player.id, "qb");
        assert!(session.is_available("qb"));
        assert!(session.remove_give("qb").is_none());
        assert!(!session.move_give("qb"));
        // 4.0 vs 13.3 + 1.0
        assert!(approx_eq(session.analysis().value_difference, 10.3, 1e-10));
    }

    #[test]
    fn nonstandard_shapes_use_nearest_type() {
        let mut session = TradeSession::new(PositionWeights::default());
        for (i, side) in [TradeSide::Team1, TradeSide::Team1, TradeSide::Team2, TradeSide::Team2]
            .into_iter()
            .enumerate()
        {
            session.add_give(side, player(&format!("rb{i}"), Position::RB, 10.0));
        }
        // 2-for-2 rounds to 3-for-2 by total count.
        assert_eq!(session.analysis().trade_type, TradeType::ThreeForTwo);
        assert!(approx_eq(session.analysis().value_difference, 3.0, 1e-10));
        assert_eq!(session.analysis().fairness, Fairness::Fair);

        session.clear();
        session.add_give(TradeSide::Team1, player("solo", Position::TE, 10.0));
        assert_eq!(session.analysis().trade_type, TradeType::OneForOne);
        assert!(approx_eq(session.analysis().value_difference, 11.5, 1e-10));
    }

    #[test]
    fn set_weights_revalues_gives() {
        let mut session = TradeSession::new(PositionWeights::default());
        session.add_give(TradeSide::Team1, player("qb", Position::QB, 20.0));
        assert!(approx_eq(session.analysis().team1_value, 12.5, 1e-10));

        session.set_weights(PositionWeights::new(1.0, 1.0, 1.0, 1.0).unwrap());
        assert!(approx_eq(session.analysis().team1_value, 20.0, 1e-10));
        assert!(approx_eq(session.gives(TradeSide::Team1)[0].adjusted_value, 20.0, 1e-10));
    }

    #[test]
    fn seeded_from_candidate() {
        let weights = PositionWeights::default();
        let qb = TradeGive::new(player("qb", Position::QB, 24.0), &weights);
        let wr = TradeGive::new(player("wr", Position::WR, 14.0), &weights);
        let valuation = value_trade(std::slice::from_ref(&qb), std::slice::from_ref(&wr), TradeType::OneForOne);
        let candidate = TradeCandidate {
            trade_type: TradeType::OneForOne,
            team1: "A".into(),
            team2: "B".into(),
            team1_gives: vec![qb],
            team2_gives: vec![wr],
            team1_value: valuation.team1_value,
            team2_value: valuation.team2_value,
            best_player_bonus: valuation.best_player_bonus.clone(),
            value_difference: valuation.value_difference,
            fairness: Fairness::Good,
            likely_dropped: None,
            score: 0.0,
        };

        let session = TradeSession::from_candidate(&candidate, weights);
        assert_eq!(session.analysis().value_difference, candidate.value_difference);
        assert_eq!(session.analysis().best_player_bonus, candidate.best_player_bonus);
        assert_eq!(session.analysis().fairness, candidate.fairness);
    }
}
