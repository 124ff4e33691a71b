// Team positional strength profiling and surplus/deficit classification.
//
// Each roster is reduced to one strength number per position (the average of
// its top starters). Those numbers are then compared against the league-wide
// mean and standard deviation to label every team/position as surplus,
// deficit or balanced.

use serde::Serialize;
use tracing::{debug, info};

use crate::league::LeagueSnapshot;
use crate::position::{Position, PositionTable};
use crate::valuation::points::{fantasy_points_per_game, Player};

// ---------------------------------------------------------------------------
// Pool statistics
// ---------------------------------------------------------------------------

/// Mean and standard deviation of one position's strength across a league.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PoolStats {
    pub mean: f64,
    pub stdev: f64,
}

/// Compute mean and standard deviation for a slice of values.
///
/// Returns `PoolStats { mean: 0.0, stdev: 0.0 }` for an empty slice.
/// Uses the population standard deviation (N denominator), since the league
/// is the full population of teams rather than a sample.
pub fn compute_pool_stats(values: &[f64]) -> PoolStats {
    if values.is_empty() {
        return PoolStats {
            mean: 0.0,
            stdev: 0.0,
        };
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    PoolStats {
        mean,
        stdev: variance.sqrt(),
    }
}

/// Per-position strength statistics for one league.
pub type LeaguePositionStats = PositionTable<PoolStats>;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Where a team's strength at a position sits relative to the league.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PositionStatus {
    /// More than one standard deviation above the league mean.
    Surplus,
    /// More than one standard deviation below the league mean.
    Deficit,
    #[default]
    Balanced,
}

impl PositionStatus {
    /// Classify a strength value against league stats. Both bounds are strict.
    pub fn classify(strength: f64, stats: &PoolStats) -> Self {
        if strength > stats.mean + stats.stdev {
            PositionStatus::Surplus
        } else if strength < stats.mean - stats.stdev {
            PositionStatus::Deficit
        } else {
            PositionStatus::Balanced
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PositionStatus::Surplus => "surplus",
            PositionStatus::Deficit => "deficit",
            PositionStatus::Balanced => "balanced",
        }
    }
}

// ---------------------------------------------------------------------------
// Value functions
// ---------------------------------------------------------------------------

/// Strength of a position group for classification.
///
/// Averages the top N players (1 QB, 3 RB, 4 WR, 1 TE) over a fixed divisor
/// of N, so an empty slot contributes zero. `players` must be sorted
/// descending by points per game.
pub fn strength_value(players: &[Player], position: Position) -> f64 {
    let slots = position.starter_slots();
    let total = players
        .iter()
        .take(slots)
        .fold(0.0, |acc, p| acc + p.fantasy_points_per_game);
    total / slots as f64
}

/// Strength of a position group for trade simulation.
///
/// Like [`strength_value`] but empty starter slots are filled with the
/// position's replacement level instead of zero. Sorts its own input.
pub fn simulation_value(players: &[&Player], position: Position) -> f64 {
    let slots = position.starter_slots();
    let mut ppg: Vec<f64> = players.iter().map(|p| p.fantasy_points_per_game).collect();
    ppg.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    ppg.truncate(slots);
    let filled = ppg.len();
    let total = ppg.iter().sum::<f64>() + (slots - filled) as f64 * position.replacement_level();
    total / slots as f64
}

// ---------------------------------------------------------------------------
// Team profile
// ---------------------------------------------------------------------------

/// Positional strength profile for one roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamProfile {
    pub team_name: String,
    pub roster_id: u32,
    pub position_strength: PositionTable<f64>,
    pub position_status: PositionTable<PositionStatus>,
    /// Players per position, sorted descending by points per game.
    pub players_by_position: PositionTable<Vec<Player>>,
}

impl TeamProfile {
    /// Build an unclassified profile from a team's players.
    ///
    /// Non-tradeable players (K, DEF) are dropped. Statuses start as
    /// `Balanced` until [`classify_profiles`] runs over the whole league.
    pub fn from_players(team_name: impl Into<String>, roster_id: u32, players: Vec<Player>) -> Self {
        let mut players_by_position: PositionTable<Vec<Player>> = PositionTable::default();
        for player in players {
            if player.position.is_tradeable() {
                players_by_position[player.position].push(player);
            }
        }
        for pos in Position::TRADEABLE {
            players_by_position[pos].sort_by(|a, b| {
                b.fantasy_points_per_game
                    .partial_cmp(&a.fantasy_points_per_game)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.id.cmp(&b.id))
            });
        }
        let position_strength = players_by_position.map(|pos, group| strength_value(group, pos));

        TeamProfile {
            team_name: team_name.into(),
            roster_id,
            position_strength,
            position_status: PositionTable::default(),
            players_by_position,
        }
    }

    pub fn status(&self, position: Position) -> PositionStatus {
        self.position_status
            .get(position)
            .copied()
            .unwrap_or_default()
    }

    pub fn is_surplus(&self, position: Position) -> bool {
        self.status(position) == PositionStatus::Surplus
    }

    /// Positions where this team is surplus, in QB, RB, WR, TE order.
    pub fn surplus_positions(&self) -> Vec<Position> {
        Position::TRADEABLE
            .iter()
            .copied()
            .filter(|&p| self.is_surplus(p))
            .collect()
    }

    /// Positions where this team is surplus or balanced.
    pub fn non_deficit_positions(&self) -> Vec<Position> {
        Position::TRADEABLE
            .iter()
            .copied()
            .filter(|&p| self.status(p) != PositionStatus::Deficit)
            .collect()
    }

    /// Players at a position, best first. Empty for K and DEF.
    pub fn players_at(&self, position: Position) -> &[Player] {
        self.players_by_position
            .get(position)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every tradeable player on the roster.
    pub fn all_players(&self) -> impl Iterator<Item = &Player> {
        self.players_by_position.iter().flat_map(|(_, group)| group.iter())
    }
}

/// Compute league stats over all profiles and assign every position status.
pub fn classify_profiles(profiles: &mut [TeamProfile]) -> LeaguePositionStats {
    let stats = PositionTable::from_fn(|pos| {
        let values: Vec<f64> = profiles.iter().map(|t| t.position_strength[pos]).collect();
        compute_pool_stats(&values)
    });
    for profile in profiles.iter_mut() {
        profile.position_status = profile
            .position_strength
            .map(|pos, &strength| PositionStatus::classify(strength, &stats[pos]));
    }
    stats
}

// ---------------------------------------------------------------------------
// Top-level entry point
// ---------------------------------------------------------------------------

/// Build classified team profiles for every roster in a league snapshot.
///
/// Player IDs missing from the directory, players without a recognized
/// position, and kickers/defenses are skipped. Missing stats value a player
/// at zero points per game. Output order follows the snapshot's roster order.
pub fn compute_team_profiles(league: &LeagueSnapshot) -> Vec<TeamProfile> {
    let scoring = league.scoring.scoring_type();

    let mut profiles: Vec<TeamProfile> = league
        .rosters
        .iter()
        .map(|roster| {
            let players: Vec<Player> = roster
                .player_ids()
                .iter()
                .filter_map(|id| {
                    let Some(info) = league.players.get(id) else {
                        debug!("player {} on roster {} not in directory", id, roster.roster_id);
                        return None;
                    };
                    let position = info.position.as_deref().and_then(Position::from_str_pos)?;
                    if !position.is_tradeable() {
                        return None;
                    }
                    Some(Player {
                        id: id.clone(),
                        full_name: info.display_name(id),
                        position,
                        team: info.team.clone().unwrap_or_default(),
                        fantasy_points_per_game: fantasy_points_per_game(
                            league.stats.get(id),
                            scoring,
                        ),
                    })
                })
                .collect();
            TeamProfile::from_players(league.team_name(roster), roster.roster_id, players)
        })
        .collect();

    let stats = classify_profiles(&mut profiles);
    info!(
        "Profiled {} teams for league {} season {} ({} scoring); QB mean {:.2}, RB mean {:.2}, WR mean {:.2}, TE mean {:.2}",
        profiles.len(),
        league.league_id,
        league.season,
        scoring.label(),
        stats[Position::QB].mean,
        stats[Position::RB].mean,
        stats[Position::WR].mean,
        stats[Position::TE].mean,
    );

    profiles
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::{LeagueUser, PlayerInfo, Roster, ScoringSettings};
    use crate::valuation::points::StatLine;
    use std::collections::HashMap;

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

    // ---- compute_pool_stats ----

    #[test]
    fn pool_stats_known_values() {
        // Mean 5, population variance 32/8 = 4, stdev 2.
        let values = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let stats = compute_pool_stats(&values);
        assert!(approx_eq(stats.mean, 5.0, 1e-10));
        assert!(approx_eq(stats.stdev, 2.0, 1e-10));
    }

    #[test]
    fn pool_stats_empty() {
        let stats = compute_pool_stats(&[]);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.stdev, 0.0);
    }

    // ---- classification ----

    #[test]
    fn classify_uses_strict_bounds() {
        let stats = PoolStats {
            mean: 18.0,
            stdev: 4.0,
        };
        assert_eq!(PositionStatus::classify(28.0, &stats), PositionStatus::Surplus);
        assert_eq!(PositionStatus::classify(22.0, &stats), PositionStatus::Balanced);
        assert_eq!(PositionStatus::classify(14.0, &stats), PositionStatus::Balanced);
        assert_eq!(PositionStatus::classify(12.0, &stats), PositionStatus::Deficit);
    }

    #[test]
    fn identical_teams_are_all_balanced() {
        let mut profiles: Vec<TeamProfile> = (0..4)
            .map(|i| {
                TeamProfile::from_players(
                    format!("Team {i}"),
                    i,
                    vec![player(&format!("qb{i}"), Position::QB, 20.0)],
                )
            })
            .collect();
        let stats = classify_profiles(&mut profiles);
        assert_eq!(stats[Position::QB].stdev, 0.0);
        for profile in &profiles {
            for (_, status) in profile.position_status.iter() {
                assert_eq!(*status, PositionStatus::Balanced);
            }
        }
    }

    // ---- value functions ----

    #[test]
    fn strength_divides_by_fixed_slot_count() {
        let rbs = vec![player("r1", Position::RB, 15.0), player("r2", Position::RB, 9.0)];
        assert!(approx_eq(strength_value(&rbs, Position::RB), 8.0, 1e-10));

        let wrs = vec![
            player("w1", Position::WR, 20.0),
            player("w2", Position::WR, 16.0),
            player("w3", Position::WR, 12.0),
            player("w4", Position::WR, 8.0),
            player("w5", Position::WR, 100.0),
        ];
        // Only the first four (already sorted input) count.
        assert!(approx_eq(strength_value(&wrs, Position::WR), 14.0, 1e-10));
        assert_eq!(strength_value(&[], Position::QB), 0.0);
    }

    #[test]
    fn empty_positions_have_positive_zero_strength() {
        let profile = TeamProfile::from_players("Empty", 1, Vec::new());
        for pos in Position::TRADEABLE {
            assert!(profile.position_strength[pos].is_sign_positive(), "{pos}");
        }
    }

    #[test]
    fn simulation_fills_missing_slots_with_replacement_level() {
        let r1 = player("r1", Position::RB, 15.0);
        let r2 = player("r2", Position::RB, 9.0);
        // (15 + 9 + 6) / 3
        assert!(approx_eq(simulation_value(&[&r2, &r1], Position::RB), 10.0, 1e-10));
        assert!(approx_eq(simulation_value(&[], Position::QB), 12.0, 1e-10));
        assert!(approx_eq(simulation_value(&[], Position::WR), 8.0, 1e-10));
        assert!(approx_eq(simulation_value(&[], Position::TE), 5.0, 1e-10));
    }

    #[test]
    fn simulation_and_strength_differ_only_on_empty_slots() {
        let qb = player("q1", Position::QB, 21.0);
        assert_eq!(
            simulation_value(&[&qb], Position::QB),
            strength_value(std::slice::from_ref(&qb), Position::QB)
        );
        assert_ne!(simulation_value(&[], Position::QB), strength_value(&[], Position::QB));
    }

    // ---- profiles ----

    #[test]
    fn profile_sorts_players_and_drops_kickers() {
        let profile = TeamProfile::from_players(
            "Sorted",
            1,
            vec![
                player("w-low", Position::WR, 5.0),
                player("k", Position::K, 9.0),
                player("w-high", Position::WR, 18.0),
                player("w-mid", Position::WR, 11.0),
            ],
        );
        let ids: Vec<&str> = profile.players_at(Position::WR).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["w-high", "w-mid", "w-low"]);
        assert_eq!(profile.all_players().count(), 3);
        assert!(approx_eq(profile.position_strength[Position::WR], 34.0 / 4.0, 1e-10));
        assert!(profile.players_at(Position::K).is_empty());
    }

    fn snapshot() -> LeagueSnapshot {
        let mut players = HashMap::new();
        let mut stats = HashMap::new();
        let mut add = |id: &str, pos: &str, ppr: f64, std: f64, gp: f64| {
            players.insert(
                id.to_string(),
                PlayerInfo {
                    full_name: Some(format!("Player {id}")),
                    first_name: None,
                    last_name: None,
                    position: Some(pos.into()),
                    team: Some("TST".into()),
                },
            );
            stats.insert(
                id.to_string(),
                StatLine {
                    pts_ppr: Some(ppr),
                    pts_half_ppr: Some((ppr + std) / 2.0),
                    pts_std: Some(std),
                    games_played: Some(gp),
                },
            );
        };
        add("1", "QB", 300.0, 280.0, 15.0);
        add("2", "WR", 200.0, 120.0, 10.0);
        add("3", "K", 150.0, 150.0, 17.0);
        add("4", "QB", 150.0, 140.0, 10.0);
        add("5", "TE", 0.0, 0.0, 0.0);

        LeagueSnapshot {
            league_id: "L1".into(),
            season: "2024".into(),
            rosters: vec![
                Roster {
                    roster_id: 1,
                    owner_id: Some("u1".into()),
                    player_ids: Some(vec!["1".into(), "2".into(), "3".into(), "ghost".into()]),
                },
                Roster {
                    roster_id: 2,
                    owner_id: None,
                    player_ids: Some(vec!["4".into(), "5".into()]),
                },
                Roster {
                    roster_id: 3,
                    owner_id: None,
                    player_ids: None,
                },
            ],
            users: vec![LeagueUser {
                user_id: "u1".into(),
                display_name: Some("alpha".into()),
                metadata: None,
            }],
            players,
            stats,
            scoring: ScoringSettings::default(),
        }
    }

    #[test]
    fn compute_profiles_resolves_players_and_names() {
        let profiles = compute_team_profiles(&snapshot());
        assert_eq!(profiles.len(), 3);

        let alpha = &profiles[0];
        assert_eq!(alpha.team_name, "alpha");
        assert_eq!(alpha.all_players().count(), 2); // kicker and unknown id skipped
        assert!(approx_eq(alpha.position_strength[Position::QB], 20.0, 1e-10));
        assert!(approx_eq(alpha.position_strength[Position::WR], 5.0, 1e-10));

        assert_eq!(profiles[1].team_name, "Team 2");
        assert!(approx_eq(profiles[1].position_strength[Position::QB], 15.0, 1e-10));
        assert_eq!(profiles[1].players_at(Position::TE)[0].fantasy_points_per_game, 0.0);

        assert_eq!(profiles[2].all_players().count(), 0);
        assert_eq!(profiles[2].status(Position::QB), PositionStatus::Deficit);
    }

    #[test]
    fn compute_profiles_honours_scoring_type() {
        let mut league = snapshot();
        league.scoring.reception_points = Some(0.0);
        let profiles = compute_team_profiles(&league);
        // Standard: 120 / 10 for the WR.
        assert!(approx_eq(profiles[0].position_strength[Position::WR], 12.0 / 4.0, 1e-10));
    }

    #[test]
    fn compute_profiles_is_deterministic() {
        let league = snapshot();
        assert_eq!(compute_team_profiles(&league), compute_team_profiles(&league));
    }
}
