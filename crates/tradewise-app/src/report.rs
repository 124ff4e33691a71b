// Plain-text rendering of team profiles, trade recommendations and session analysis.

use tradewise_core::position::Position;
use tradewise_core::trade::candidate::{BestPlayerBonus, TradeCandidate, TradeGive, TradeSide};
use tradewise_core::trade::session::TradeAnalysis;
use tradewise_core::valuation::strength::{PositionStatus, TeamProfile};

/// Suffix marking a position status in the profile table.
fn status_marker(status: PositionStatus) -> char {
    match status {
        PositionStatus::Surplus => '+',
        PositionStatus::Deficit => '-',
        PositionStatus::Balanced => ' ',
    }
}

/// One row per team with per-position strength. `+` marks a surplus and `-` a
/// deficit.
pub fn format_profiles(profiles: &[TeamProfile]) -> String {
    let mut out = format!("{:<24}", "Team");
    for pos in Position::TRADEABLE {
        out.push_str(&format!("{:>8}", pos.display_str()));
    }
    out.push('\n');

    for profile in profiles {
        out.push_str(&format!("{:<24}", truncate(&profile.team_name, 23)));
        for pos in Position::TRADEABLE {
            out.push_str(&format!(
                "{:>7.1}{}",
                profile.position_strength[pos],
                status_marker(profile.status(pos)),
            ));
        }
        out.push('\n');
    }
    out
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        t.push('~');
        t
    }
}

fn format_give(give: &TradeGive) -> String {
    format!(
        "{} ({}, {:.2})",
        give.player.full_name,
        give.position.display_str(),
        give.adjusted_value
    )
}

fn format_gives(gives: &[TradeGive]) -> String {
    gives.iter().map(format_give).collect::<Vec<_>>().join(", ")
}

fn side_name<'a>(side: TradeSide, team1: &'a str, team2: &'a str) -> &'a str {
    match side {
        TradeSide::Team1 => team1,
        TradeSide::Team2 => team2,
    }
}

fn format_bonus(bonus: Option<&BestPlayerBonus>, team1: &str, team2: &str) -> String {
    match bonus {
        Some(b) => format!(
            "+{:.1} to {} for {}",
            b.amount,
            side_name(b.side, team1, team2),
            b.player_name
        ),
        None => "none".to_string(),
    }
}

/// Multi-line description of one ranked recommendation.
pub fn format_candidate(rank: usize, candidate: &TradeCandidate) -> String {
    let c = candidate;
    let mut out = format!(
        "{}. [{}] with {} (score {:.2})\n",
        rank,
        c.trade_type.label(),
        c.team2,
        c.score,
    );
    for (team, gives, value) in [
        (&c.team1, &c.team1_gives, c.team1_value),
        (&c.team2, &c.team2_gives, c.team2_value),
    ] {
        out.push_str(&format!("   {} gives: {} = {:.2}\n", team, format_gives(gives), value));
    }
    out.push_str(&format!(
        "   Difference {:.2} ({}), best-player bonus: {}\n",
        c.value_difference,
        c.fairness.label(),
        format_bonus(c.best_player_bonus.as_ref(), &c.team1, &c.team2),
    ));
    if let Some(drop) = &c.likely_dropped {
        out.push_str(&format!(
            "   Likely drop for {}: {} ({:.2})\n",
            side_name(drop.side, &c.team1, &c.team2),
            drop.player.full_name,
            drop.adjusted_value,
        ));
    }
    out
}

/// Ranked list of recommendations for a team.
pub fn format_recommendations(user_team: &str, candidates: &[TradeCandidate]) -> String {
    if candidates.is_empty() {
        return format!("No trade recommendations found for {user_team}.\n");
    }
    let mut out = format!("Trade recommendations for {user_team}:\n");
    for (i, c) in candidates.iter().enumerate() {
        out.push('\n');
        out.push_str(&format_candidate(i + 1, c));
    }
    out
}

/// Summary line block for an interactive session's live analysis.
pub fn format_analysis(analysis: &TradeAnalysis, team1: &str, team2: &str) -> String {
    format!(
        "[{}] {} {:.2} vs {} {:.2}\n\
         Difference {:.2} ({}), best-player bonus: {}\n",
        analysis.trade_type.label(),
        team1,
        analysis.team1_value,
        team2,
        analysis.team2_value,
        analysis.value_difference,
        analysis.fairness.label(),
        format_bonus(analysis.best_player_bonus.as_ref(), team1, team2),
    )
}
