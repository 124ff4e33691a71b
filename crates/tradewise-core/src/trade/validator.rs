// Trade validation, valuation and ranking score.
//
// A proposal becomes a candidate only if swapping the players improves both
// rosters (measured with replacement-level fill) and the value gap stays under
// the cap for its shape.

use std::collections::HashSet;

use thiserror::Error;

use crate::position::Position;
use crate::trade::candidate::{
    has_duplicate_players, side_value, value_trade, LikelyDrop, TradeCandidate, TradeGive, TradeSide, TradeType,
};
use crate::valuation::points::{Player, PositionWeights};
use crate::valuation::strength::{simulation_value, PositionStatus, TeamProfile};

/// Raw gives for a trade that has not been validated yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    pub team1_gives: Vec<TradeGive>,
    pub team2_gives: Vec<TradeGive>,
}

impl Proposal {
    pub fn trade_type(&self) -> Option<TradeType> {
        TradeType::from_counts(self.team1_gives.len(), self.team2_gives.len())
    }

    pub fn gives(&self, side: TradeSide) -> &[TradeGive] {
        match side {
            TradeSide::Team1 => &self.team1_gives,
            TradeSide::Team2 => &self.team2_gives,
        }
    }

    pub fn gives_mut(&mut self, side: TradeSide) -> &mut Vec<TradeGive> {
        match side {
            TradeSide::Team1 => &mut self.team1_gives,
            TradeSide::Team2 => &mut self.team2_gives,
        }
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.team1_gives
            .iter()
            .chain(&self.team2_gives)
            .any(|g| g.player.id == player_id)
    }
}

/// Why a proposal was not turned into a candidate.
#[derive(Debug, Error, PartialEq)]
pub enum Rejection {
    #[error("unsupported trade shape {team1}-for-{team2}")]
    UnsupportedShape { team1: usize, team2: usize },

    #[error("a player appears on both sides of the trade")]
    DuplicatePlayer,

    #[error("smaller side is worth {ratio:.2} of the larger side, floor is {floor:.2}")]
    BelowConsolidationFloor { ratio: f64, floor: f64 },

    #[error("no net gain for both teams (team1 {team1_delta:+.2}, team2 {team2_delta:+.2})")]
    NoNetGain { team1_delta: f64, team2_delta: f64 },

    #[error("value difference {difference:.2} exceeds cap {cap:.2}")]
    ValueGap { difference: f64, cap: f64 },
}

// ---------------------------------------------------------------------------
// Consolidation floor
// ---------------------------------------------------------------------------

/// Check an asymmetric trade's smaller side against its shape's value floor.
///
/// The side giving fewer players must be worth at least the floor fraction
/// (80% for 2-for-1, 75% for 3-for-2) of the side giving more. Symmetric and
/// unsupported shapes always pass.
pub fn check_consolidation_floor(team1_gives: &[TradeGive], team2_gives: &[TradeGive]) -> Result<(), Rejection> {
    let Some(floor) = TradeType::from_counts(team1_gives.len(), team2_gives.len())
        .and_then(|t| t.consolidation_floor())
    else {
        return Ok(());
    };
    let (fewer, more) = if team1_gives.len() < team2_gives.len() {
        (team1_gives, team2_gives)
    } else {
        (team2_gives, team1_gives)
    };
    let fewer_value = side_value(fewer);
    let more_value = side_value(more);
    if more_value <= 0.0 {
        return Ok(());
    }
    let ratio = fewer_value / more_value;
    if ratio < floor {
        return Err(Rejection::BelowConsolidationFloor { ratio, floor });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Players a team would hold after sending `outgoing` and receiving `incoming`.
fn post_trade_roster<'a>(
    profile: &'a TeamProfile,
    outgoing: &[TradeGive],
    incoming: &'a [TradeGive],
) -> Vec<&'a Player> {
    let leaving: HashSet<&str> = outgoing.iter().map(|g| g.player.id.as_str()).collect();
    profile
        .all_players()
        .filter(|p| !leaving.contains(p.id.as_str()))
        .chain(incoming.iter().map(|g| &g.player))
        .collect()
}

/// Summed change in simulated strength across all four positions.
pub fn simulate_net_change(profile: &TeamProfile, outgoing: &[TradeGive], incoming: &[TradeGive]) -> f64 {
    let after = post_trade_roster(profile, outgoing, incoming);
    Position::TRADEABLE
        .iter()
        .map(|&pos| {
            let before: Vec<&Player> = profile.players_at(pos).iter().collect();
            let after_at: Vec<&Player> = after.iter().copied().filter(|p| p.position == pos).collect();
            simulation_value(&after_at, pos) - simulation_value(&before, pos)
        })
        .sum()
}

/// Lowest-valued player on the post-trade roster of the side taking on more
/// players than it sends. `None` for symmetric trades.
fn likely_dropped(
    team1: &TeamProfile,
    team2: &TeamProfile,
    team1_gives: &[TradeGive],
    team2_gives: &[TradeGive],
    weights: &PositionWeights,
) -> Option<LikelyDrop> {
    let (side, profile, outgoing, incoming) = if team2_gives.len() > team1_gives.len() {
        (TradeSide::Team1, team1, team1_gives, team2_gives)
    } else if team1_gives.len() > team2_gives.len() {
        (TradeSide::Team2, team2, team2_gives, team1_gives)
    } else {
        return None;
    };

    post_trade_roster(profile, outgoing, incoming)
        .into_iter()
        .map(|p| (p, p.adjusted_value(p.position, weights)))
        .min_by(|(a, av), (b, bv)| {
            av.partial_cmp(bv)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        })
        .map(|(player, adjusted_value)| LikelyDrop {
            side,
            player: player.clone(),
            adjusted_value,
        })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Turn a proposal into a scored candidate, or explain why it was rejected.
///
/// Steps: shape and duplicate checks, post-trade simulation (both teams must
/// gain), valuation with best-player bonus, value-gap cap, fairness grade,
/// likely-dropped player, ranking score.
pub fn validate(
    proposal: Proposal,
    team1: &TeamProfile,
    team2: &TeamProfile,
    weights: &PositionWeights,
) -> Result<TradeCandidate, Rejection> {
    let Proposal {
        team1_gives,
        team2_gives,
    } = proposal;

    let trade_type = TradeType::from_counts(team1_gives.len(), team2_gives.len()).ok_or(
        Rejection::UnsupportedShape {
            team1: team1_gives.len(),
            team2: team2_gives.len(),
        },
    )?;
    if has_duplicate_players(&team1_gives, &team2_gives) {
        return Err(Rejection::DuplicatePlayer);
    }

    let team1_delta = simulate_net_change(team1, &team1_gives, &team2_gives);
    let team2_delta = simulate_net_change(team2, &team2_gives, &team1_gives);
    if team1_delta <= 0.0 || team2_delta <= 0.0 {
        return Err(Rejection::NoNetGain {
            team1_delta,
            team2_delta,
        });
    }

    let valuation = value_trade(&team1_gives, &team2_gives, trade_type);
    let cap = trade_type.max_value_difference();
    if valuation.value_difference > cap {
        return Err(Rejection::ValueGap {
            difference: valuation.value_difference,
            cap,
        });
    }

    let likely_dropped = likely_dropped(team1, team2, &team1_gives, &team2_gives, weights);

    let mut candidate = TradeCandidate {
        trade_type,
        team1: team1.team_name.clone(),
        team2: team2.team_name.clone(),
        team1_gives,
        team2_gives,
        team1_value: valuation.team1_value,
        team2_value: valuation.team2_value,
        fairness: trade_type.fairness(valuation.value_difference),
        best_player_bonus: valuation.best_player_bonus,
        value_difference: valuation.value_difference,
        likely_dropped,
        score: 0.0,
    };
    candidate.score = rank_score(&candidate, team1, team2);
    Ok(candidate)
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Ranking score for a candidate.
///
/// For every distinct position a side gives from its surplus: +10 if the
/// receiver is in deficit there, +5 if balanced. Plus
/// `max(0, 5 - value_difference)`.
pub fn rank_score(candidate: &TradeCandidate, team1: &TeamProfile, team2: &TeamProfile) -> f64 {
    let mut score = 0.0;
    for (side, giver, receiver) in [
        (TradeSide::Team1, team1, team2),
        (TradeSide::Team2, team2, team1),
    ] {
        let mut positions: Vec<Position> = candidate.gives(side).iter().map(|g| g.position).collect();
        positions.sort();
        positions.dedup();
        for pos in positions {
            if !giver.is_surplus(pos) {
                continue;
            }
            score += match receiver.status(pos) {
                PositionStatus::Deficit => 10.0,
                PositionStatus::Balanced => 5.0,
                PositionStatus::Surplus => 0.0,
            };
        }
    }
    score + (5.0 - candidate.value_difference).max(0.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::PositionTable;
    use crate::trade::candidate::Fairness;

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

    fn give(p: &Player) -> TradeGive {
        TradeGive::new(p.clone(), &PositionWeights::default())
    }

    fn team(name: &str, players: Vec<Player>) -> TeamProfile {
        TeamProfile::from_players(name, 1, players)
    }

    /// Team with a strong QB pair and thin receivers.
    fn qb_rich() -> TeamProfile {
        team(
            "QB Rich",
            vec![
                player("a-qb1", Position::QB, 28.0),
                player("a-qb2", Position::QB, 27.0),
                player("a-wr1", Position::WR, 10.0),
                player("a-wr2", Position::WR, 10.0),
                player("a-wr3", Position::WR, 10.0),
            ],
        )
    }

    /// Team with a weak QB and one elite receiver.
    fn wr_rich() -> TeamProfile {
        team(
            "WR Rich",
            vec![
                player("b-qb1", Position::QB, 12.0),
                player("b-wr1", Position::WR, 16.0),
                player("b-wr2", Position::WR, 2.0),
                player("b-wr3", Position::WR, 2.0),
                player("b-wr4", Position::WR, 2.0),
            ],
        )
    }

    #[test]
    fn net_change_uses_replacement_fill() {
        let a = qb_rich();
        let qb1 = a.players_at(Position::QB)[0].clone();
        let wr = player("x", Position::WR, 16.0);
        // QB 28 -> 27 (-1); WR (10+10+10+8)/4 -> (16+10+10+10)/4 (+2)
        let delta = simulate_net_change(&a, &[give(&qb1)], &[give(&wr)]);
        assert!(approx_eq(delta, 1.0, 1e-10));
    }

    #[test]
    fn accepts_trade_improving_both_sides() {
        let a = qb_rich();
        let b = wr_rich();
        let proposal = Proposal {
            team1_gives: vec![give(&a.players_at(Position::QB)[0])],
            team2_gives: vec![give(&b.players_at(Position::WR)[0])],
        };
        let candidate = validate(proposal, &a, &b, &PositionWeights::default()).unwrap();

        assert_eq!(candidate.trade_type, TradeType::OneForOne);
        // 28 * 0.625 + 1.0 bonus vs 16 * 0.95
        assert!(approx_eq(candidate.value_difference, 18.5 - 15.2, 1e-9));
        assert_eq!(candidate.fairness, Fairness::Good);
        assert!(candidate.likely_dropped.is_none());
        assert_eq!(candidate.best_player_bonus.as_ref().unwrap().side, TradeSide::Team1);
    }

    #[test]
    fn rejects_trade_without_gain_for_both() {
        let a = qb_rich();
        let b = wr_rich();
        // Team1 sends its best WR for a worse one.
        let proposal = Proposal {
            team1_gives: vec![give(&a.players_at(Position::WR)[0])],
            team2_gives: vec![give(&b.players_at(Position::WR)[3])],
        };
        let err = validate(proposal, &a, &b, &PositionWeights::default()).unwrap_err();
        assert!(matches!(err, Rejection::NoNetGain { .. }));
    }

    #[test]
    fn rejects_unsupported_shapes_and_duplicates() {
        let a = qb_rich();
        let b = wr_rich();
        let two_for_two = Proposal {
            team1_gives: vec![give(&a.players_at(Position::QB)[0]), give(&a.players_at(Position::QB)[1])],
            team2_gives: vec![give(&b.players_at(Position::WR)[0]), give(&b.players_at(Position::WR)[1])],
        };
        assert_eq!(
            validate(two_for_two, &a, &b, &PositionWeights::default()).unwrap_err(),
            Rejection::UnsupportedShape { team1: 2, team2: 2 }
        );

        let qb = a.players_at(Position::QB)[0].clone();
        let dup = Proposal {
            team1_gives: vec![give(&qb)],
            team2_gives: vec![give(&qb)],
        };
        assert_eq!(
            validate(dup, &a, &b, &PositionWeights::default()).unwrap_err(),
            Rejection::DuplicatePlayer
        );
    }

    #[test]
    fn rejects_value_gap_over_cap() {
        let a = team(
            "Stacked",
            vec![
                player("s-qb1", Position::QB, 30.0),
                player("s-qb2", Position::QB, 29.5),
            ],
        );
        let b = team(
            "Needy",
            vec![player("n-qb", Position::QB, 5.0), player("n-te", Position::TE, 6.0)],
        );
        // Team1 gains a TE slot (5 -> 6), team2 gains a QB. Values 18.75 + 1 vs 6.3.
        let proposal = Proposal {
            team1_gives: vec![give(&a.players_at(Position::QB)[0])],
            team2_gives: vec![give(&b.players_at(Position::TE)[0])],
        };
        match validate(proposal, &a, &b, &PositionWeights::default()).unwrap_err() {
            Rejection::ValueGap { difference, cap } => {
                assert_eq!(cap, 6.0);
                assert!(approx_eq(difference, 19.75 - 6.3, 1e-9));
            }
            other => panic!("expected ValueGap, got {other}"),
        }
    }

    #[test]
    fn consolidation_floor_rejects_seventy_percent() {
        let pair = vec![
            give(&player("r1", Position::RB, 10.0)),
            give(&player("r2", Position::RB, 10.0)),
        ];
        let single = vec![give(&player("r3", Position::RB, 14.0))];
        match check_consolidation_floor(&pair, &single) {
            Err(Rejection::BelowConsolidationFloor { ratio, floor }) => {
                assert!(approx_eq(ratio, 0.7, 1e-10));
                assert_eq!(floor, 0.8);
            }
            other => panic!("expected floor rejection, got {other:?}"),
        }

        let strong_single = vec![give(&player("r4", Position::RB, 16.0))];
        assert!(check_consolidation_floor(&strong_single, &pair).is_ok());
        assert!(check_consolidation_floor(&single, &single).is_ok());
    }

    #[test]
    fn three_for_two_floor_is_seventy_five_percent() {
        let three: Vec<TradeGive> = ["a", "b", "c"]
            .iter()
            .map(|id| give(&player(id, Position::RB, 10.0)))
            .collect();
        let two_low = vec![
            give(&player("d", Position::RB, 11.0)),
            give(&player("e", Position::RB, 11.0)),
        ];
        let two_ok = vec![
            give(&player("f", Position::RB, 12.0)),
            give(&player("g", Position::RB, 11.0)),
        ];
        assert!(check_consolidation_floor(&three, &two_low).is_err());
        assert!(check_consolidation_floor(&two_ok, &three).is_ok());
    }

    #[test]
    fn likely_drop_is_lowest_value_on_receiving_side() {
        let a = team(
            "Depth",
            vec![
                player("d-rb1", Position::RB, 14.0),
                player("d-rb2", Position::RB, 13.0),
                player("d-rb3", Position::RB, 12.0),
                player("d-rb4", Position::RB, 11.0),
                player("d-qb", Position::QB, 20.0),
            ],
        );
        let b = team(
            "Thin",
            vec![
                player("t-rb1", Position::RB, 25.0),
                player("t-te", Position::TE, 3.0),
                player("t-qb", Position::QB, 10.0),
            ],
        );
        let t1 = vec![give(&a.players_at(Position::RB)[2]), give(&a.players_at(Position::RB)[3])];
        let t2 = vec![give(&b.players_at(Position::RB)[0])];
        let drop = likely_dropped(&a, &b, &t1, &t2, &PositionWeights::default()).unwrap();
        // Team2 receives two players; its cheapest remaining is the TE at 3.15.
        assert_eq!(drop.side, TradeSide::Team2);
        assert_eq!(drop.player.id, "t-te");
        assert!(approx_eq(drop.adjusted_value, 3.15, 1e-10));

        assert!(likely_dropped(&a, &b, &t2, &t2, &PositionWeights::default()).is_none());
    }

    #[test]
    fn rank_score_rewards_surplus_to_deficit() {
        let mut a = qb_rich();
        let mut b = wr_rich();
        a.position_status = PositionTable::new(
            PositionStatus::Surplus,
            PositionStatus::Balanced,
            PositionStatus::Deficit,
            PositionStatus::Balanced,
        );
        b.position_status = PositionTable::new(
            PositionStatus::Deficit,
            PositionStatus::Balanced,
            PositionStatus::Balanced,
            PositionStatus::Balanced,
        );
        let proposal = Proposal {
            team1_gives: vec![give(&a.players_at(Position::QB)[0])],
            team2_gives: vec![give(&b.players_at(Position::WR)[0])],
        };
        let candidate = validate(proposal, &a, &b, &PositionWeights::default()).unwrap();
        // +10 (QB surplus -> deficit), WR not surplus for b, + (5 - 3.3)
        assert!(approx_eq(candidate.score, 10.0 + 1.7, 1e-9));

        b.position_status[Position::QB] = PositionStatus::Balanced;
        assert!(approx_eq(rank_score(&candidate, &a, &b), 5.0 + 1.7, 1e-9));
    }
}
