// Candidate trade generation for one user's team.
//
// Pairs the user's team with every other team, enumerates position-slot plans
// for each trade shape, fills the slots with the best unused players, evens
// out lopsided proposals, then validates and ranks what survives.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::position::Position;
use crate::trade::candidate::{trade_key, value_trade, TradeCandidate, TradeGive, TradeSide, TradeType};
use crate::trade::validator::{check_consolidation_floor, validate, Proposal};
use crate::valuation::points::{Player, PositionWeights};
use crate::valuation::strength::TeamProfile;

/// A proposal with a value gap at or above this is sent to the rebalancer,
/// which stops as soon as the gap drops below it.
pub const REBALANCE_GAP: f64 = 2.0;

/// Largest number of players either side may give after rebalancing.
const MAX_SIDE_SIZE: usize = 3;

/// Output and work bounds for one recommendation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecommendationLimits {
    /// Ranked candidates returned.
    pub max_results: usize,
    /// Proposals examined before enumeration stops.
    pub max_proposals: usize,
}

impl Default for RecommendationLimits {
    fn default() -> Self {
        RecommendationLimits {
            max_results: 15,
            max_proposals: 5000,
        }
    }
}

// ---------------------------------------------------------------------------
// Slot plans
// ---------------------------------------------------------------------------

/// Positions each side fills before players are picked.
#[derive(Debug, Clone, PartialEq)]
struct SlotPlan {
    team1: Vec<Position>,
    team2: Vec<Position>,
}

impl SlotPlan {
    /// Orient a giver/receiver plan so team1 is always the user.
    fn oriented(giver: TradeSide, giver_slots: Vec<Position>, receiver_slots: Vec<Position>) -> Self {
        match giver {
            TradeSide::Team1 => SlotPlan {
                team1: giver_slots,
                team2: receiver_slots,
            },
            TradeSide::Team2 => SlotPlan {
                team1: receiver_slots,
                team2: giver_slots,
            },
        }
    }
}

/// All size-`k` multisets of `positions`, preserving input order.
fn multisets(positions: &[Position], k: usize) -> Vec<Vec<Position>> {
    if k == 0 {
        return vec![Vec::new()];
    }
    let mut out = Vec::new();
    for (i, &pos) in positions.iter().enumerate() {
        for rest in multisets(&positions[i..], k - 1) {
            let mut combo = Vec::with_capacity(k);
            combo.push(pos);
            combo.extend(rest);
            out.push(combo);
        }
    }
    out
}

/// All pairs of distinct positions, preserving input order.
fn distinct_pairs(positions: &[Position]) -> Vec<Vec<Position>> {
    let mut out = Vec::new();
    for (i, &a) in positions.iter().enumerate() {
        for &b in &positions[i + 1..] {
            out.push(vec![a, b]);
        }
    }
    out
}

/// 1-for-1 plans: user gives `pos_a`, other gives `pos_b`.
///
/// Proposed when the user is surplus at `pos_a` and the other team is not, or
/// the other team is surplus at `pos_b` and the user is not.
fn one_for_one_plans(user: &TeamProfile, other: &TeamProfile) -> Vec<SlotPlan> {
    let mut plans = Vec::new();
    for pos_a in Position::TRADEABLE {
        for pos_b in Position::TRADEABLE {
            if pos_a == pos_b {
                continue;
            }
            let direct = user.is_surplus(pos_a) && !other.is_surplus(pos_a);
            let cross = other.is_surplus(pos_b) && !user.is_surplus(pos_b);
            if direct || cross {
                plans.push(SlotPlan {
                    team1: vec![pos_a],
                    team2: vec![pos_b],
                });
            }
        }
    }
    plans
}

/// 2-for-1 plans in both directions: two distinct surplus positions from the
/// giver, one non-deficit position from the receiver.
fn two_for_one_plans(user: &TeamProfile, other: &TeamProfile) -> Vec<SlotPlan> {
    let mut plans = Vec::new();
    for (giver_side, giver, receiver) in [(TradeSide::Team1, user, other), (TradeSide::Team2, other, user)] {
        let receiver_positions = receiver.non_deficit_positions();
        for pair in distinct_pairs(&giver.surplus_positions()) {
            for &single in &receiver_positions {
                plans.push(SlotPlan::oriented(giver_side, pair.clone(), vec![single]));
            }
        }
    }
    plans
}

/// 3-for-2 plans in both directions: three surplus slots from the giver (a
/// position may repeat), two non-deficit slots from the receiver.
fn three_for_two_plans(user: &TeamProfile, other: &TeamProfile) -> Vec<SlotPlan> {
    let mut plans = Vec::new();
    for (giver_side, giver, receiver) in [(TradeSide::Team1, user, other), (TradeSide::Team2, other, user)] {
        let receiver_slots = multisets(&receiver.non_deficit_positions(), 2);
        for giver_slots in multisets(&giver.surplus_positions(), 3) {
            for slots in &receiver_slots {
                plans.push(SlotPlan::oriented(giver_side, giver_slots.clone(), slots.clone()));
            }
        }
    }
    plans
}

// ---------------------------------------------------------------------------
// Filling and rebalancing
// ---------------------------------------------------------------------------

/// Best unused player for every slot. A repeated position takes the next best
/// player there. `None` if any slot cannot be filled.
fn fill_slots(
    profile: &TeamProfile,
    slots: &[Position],
    used: &HashSet<String>,
    weights: &PositionWeights,
) -> Option<Vec<TradeGive>> {
    let mut picked: Vec<TradeGive> = Vec::with_capacity(slots.len());
    for &pos in slots {
        let player = profile
            .players_at(pos)
            .iter()
            .find(|p| !used.contains(&p.id) && !picked.iter().any(|g| g.player.id == p.id))?;
        picked.push(TradeGive::new(player.clone(), weights));
    }
    Some(picked)
}

/// Lowest-valued player at any of the team's surplus positions that is
/// neither used nor already in the proposal.
fn cheapest_surplus_player<'a>(
    profile: &'a TeamProfile,
    proposal: &Proposal,
    used: &HashSet<String>,
    weights: &PositionWeights,
) -> Option<&'a Player> {
    profile
        .surplus_positions()
        .into_iter()
        .flat_map(move |pos| profile.players_at(pos))
        .filter(|p| !used.contains(&p.id) && !proposal.contains(&p.id))
        .map(|p| (p, p.adjusted_value(p.position, weights)))
        .min_by(|(a, av), (b, bv)| {
            av.partial_cmp(bv)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        })
        .map(|(p, _)| p)
}

fn valuation_gap(proposal: &Proposal) -> (f64, TradeSide) {
    let trade_type = TradeType::nearest(proposal.team1_gives.len(), proposal.team2_gives.len());
    let valuation = value_trade(&proposal.team1_gives, &proposal.team2_gives, trade_type);
    let weaker = if valuation.side_total(TradeSide::Team1) <= valuation.side_total(TradeSide::Team2) {
        TradeSide::Team1
    } else {
        TradeSide::Team2
    };
    (valuation.value_difference, weaker)
}

/// Even out a lopsided proposal by adding players to the weaker side.
///
/// The side sending less value (bonus included) repeatedly adds its cheapest
/// unused surplus player, as long as side sizes stay within one of each other
/// and no side exceeds three. Returns the first supported shape whose gap is
/// under [`REBALANCE_GAP`], otherwise the supported shape with the smallest
/// gap seen, which may be the input.
pub fn rebalance(
    proposal: Proposal,
    team1: &TeamProfile,
    team2: &TeamProfile,
    used: &HashSet<String>,
    weights: &PositionWeights,
) -> Proposal {
    let (gap, mut weaker) = valuation_gap(&proposal);
    if gap < REBALANCE_GAP {
        return proposal;
    }

    let mut best_gap = gap;
    let mut best = proposal.clone();
    let mut current = proposal;

    loop {
        let mut counts = (current.team1_gives.len(), current.team2_gives.len());
        match weaker {
            TradeSide::Team1 => counts.0 += 1,
            TradeSide::Team2 => counts.1 += 1,
        }
        if counts.0.max(counts.1) > MAX_SIDE_SIZE || counts.0.abs_diff(counts.1) > 1 {
            break;
        }

        let profile = match weaker {
            TradeSide::Team1 => team1,
            TradeSide::Team2 => team2,
        };
        let Some(extra) = cheapest_surplus_player(profile, &current, used, weights) else {
            break;
        };
        current.gives_mut(weaker).push(TradeGive::new(extra.clone(), weights));

        let (gap, next_weaker) = valuation_gap(&current);
        weaker = next_weaker;
        if current.trade_type().is_some() {
            if gap < REBALANCE_GAP {
                return current;
            }
            if gap < best_gap {
                best_gap = gap;
                best = current.clone();
            }
        }
    }

    best
}

// ---------------------------------------------------------------------------
// Generation run
// ---------------------------------------------------------------------------

/// Mutable state for one recommendation run.
struct Run<'a> {
    user: &'a TeamProfile,
    weights: &'a PositionWeights,
    limits: &'a RecommendationLimits,
    seen: HashSet<String>,
    examined: usize,
    rejected: usize,
    candidates: Vec<TradeCandidate>,
}

impl<'a> Run<'a> {
    fn exhausted(&self) -> bool {
        self.examined >= self.limits.max_proposals
    }

    /// Run every shape family against one other team. The used-player set is
    /// reset for each family.
    fn pair_with(&mut self, other: &TeamProfile) {
        let families = [
            one_for_one_plans(self.user, other),
            two_for_one_plans(self.user, other),
            three_for_two_plans(self.user, other),
        ];
        for plans in families {
            let mut used: HashSet<String> = HashSet::new();
            for plan in &plans {
                if self.exhausted() {
                    return;
                }
                self.consider(other, plan, &mut used);
            }
        }
    }

    fn consider(&mut self, other: &TeamProfile, plan: &SlotPlan, used: &mut HashSet<String>) {
        let Some(team1_gives) = fill_slots(self.user, &plan.team1, used, self.weights) else {
            return;
        };
        let Some(team2_gives) = fill_slots(other, &plan.team2, used, self.weights) else {
            return;
        };
        let proposal = rebalance(
            Proposal {
                team1_gives,
                team2_gives,
            },
            self.user,
            other,
            used,
            self.weights,
        );

        let key = trade_key(
            &self.user.team_name,
            &other.team_name,
            &proposal.team1_gives,
            &proposal.team2_gives,
        );
        if !self.seen.insert(key.clone()) {
            return;
        }
        self.examined += 1;

        if let Err(reason) = check_consolidation_floor(&proposal.team1_gives, &proposal.team2_gives) {
            debug!("Rejected {}: {}", key, reason);
            self.rejected += 1;
            return;
        }

        match validate(proposal, self.user, other, self.weights) {
            Ok(candidate) => {
                for give in candidate.team1_gives.iter().chain(&candidate.team2_gives) {
                    used.insert(give.player.id.clone());
                }
                self.candidates.push(candidate);
            }
            Err(reason) => {
                debug!("Rejected {}: {}", key, reason);
                self.rejected += 1;
            }
        }
    }
}

/// Ranked trade recommendations for `user_team` with default limits.
pub fn find_trade_recommendations(
    profiles: &[TeamProfile],
    user_team: &str,
    weights: &PositionWeights,
) -> Vec<TradeCandidate> {
    find_trade_recommendations_with(profiles, user_team, weights, &RecommendationLimits::default())
}

/// Ranked trade recommendations for `user_team`.
///
/// Only trades between the user's team and one other team are considered.
/// Returns an empty list if the user's team is not among `profiles`.
/// Candidates are stably sorted by descending score and truncated to
/// `limits.max_results`.
pub fn find_trade_recommendations_with(
    profiles: &[TeamProfile],
    user_team: &str,
    weights: &PositionWeights,
    limits: &RecommendationLimits,
) -> Vec<TradeCandidate> {
    let Some(user) = profiles.iter().find(|p| p.team_name == user_team) else {
        warn!("Team '{}' not found among {} profiles", user_team, profiles.len());
        return Vec::new();
    };

    let mut run = Run {
        user,
        weights,
        limits,
        seen: HashSet::new(),
        examined: 0,
        rejected: 0,
        candidates: Vec::new(),
    };

    for other in profiles.iter().filter(|p| p.roster_id != user.roster_id) {
        if run.exhausted() {
            warn!(
                "Stopped after {} proposals; remaining teams not examined",
                limits.max_proposals
            );
            break;
        }
        run.pair_with(other);
    }

    let Run {
        mut candidates,
        examined,
        rejected,
        ..
    } = run;
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    let accepted = candidates.len();
    candidates.truncate(limits.max_results);

    info!(
        "Trade search for '{}': {} proposals examined, {} rejected, {} accepted, {} returned",
        user_team,
        examined,
        rejected,
        accepted,
        candidates.len()
    );

    candidates
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
