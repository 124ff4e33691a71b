// Assembles a `LeagueSnapshot` from a data provider.

use chrono::{Datelike, NaiveDate};
use tracing::info;

use tradewise_core::league::LeagueSnapshot;

use crate::provider::{LeagueDataProvider, ProviderError};

/// Fetch rosters, users, the player directory, season stats and scoring
/// settings concurrently and bundle them for the engine.
pub async fn load_league_snapshot<P>(
    provider: &P,
    league_id: &str,
    season: &str,
) -> Result<LeagueSnapshot, ProviderError>
where
    P: LeagueDataProvider + ?Sized,
{
    let (rosters, users, players, stats, scoring) = tokio::try_join!(
        provider.league_rosters(league_id),
        provider.league_users(league_id),
        provider.player_directory(),
        provider.season_stats(season),
        provider.scoring_settings(league_id),
    )?;

    info!(
        "Loaded league {} season {}: {} rosters, {} users, {} players, {} stat lines, {} scoring",
        league_id,
        season,
        rosters.len(),
        users.len(),
        players.len(),
        stats.len(),
        scoring.scoring_type().label()
    );

    Ok(LeagueSnapshot {
        league_id: league_id.to_string(),
        season: season.to_string(),
        rosters,
        users,
        players,
        stats,
        scoring,
    })
}

/// NFL season a date falls in: from September on it is the current year,
/// before that the season that started the previous year.
pub fn current_season(today: NaiveDate) -> String {
    let year = if today.month() >= 9 {
        today.year()
    } else {
        today.year() - 1
    };
    year.to_string()
}
