// Tradewise entry point.
//
// Startup sequence:
// 1. Load config
// 2. Initialize tracing (log to the configured file, not terminal)
// 3. Resolve the season and build the cached file provider
// 4. Load the league snapshot
// 5. Profile teams and generate recommendations off the async runtime
// 6. Print profiles, recommendations and the top trade's live analysis

use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

use tradewise_app::cache::{CachedProvider, MemoryCache};
use tradewise_app::config::{self, LoggingConfig};
use tradewise_app::provider::FileProvider;
use tradewise_app::report;
use tradewise_app::snapshot::{current_season, load_league_snapshot};
use tradewise_core::trade::generator::find_trade_recommendations_with;
use tradewise_core::trade::session::TradeSession;
use tradewise_core::valuation::strength::compute_team_profiles;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load config
    let config = config::load_config().context("failed to load configuration")?;

    // 2. Initialize tracing
    init_tracing(&config.logging)?;
    info!("Tradewise starting up");
    info!(
        "Config loaded: league={}, team={}, data dir {}",
        config.league.id,
        config.league.my_team,
        config.data_dir.display()
    );

    // 3. Season and provider
    let season = config
        .league
        .season
        .clone()
        .unwrap_or_else(|| current_season(chrono::Utc::now().date_naive()));
    let provider = CachedProvider::new(
        FileProvider::new(&config.data_dir),
        MemoryCache::new(),
        Duration::from_secs(config.strategy.cache.ttl_secs),
    );

    // 4. Snapshot
    let league = load_league_snapshot(&provider, &config.league.id, &season)
        .await
        .with_context(|| format!("failed to load league {} season {}", config.league.id, season))?;

    // 5. Profiles and recommendations are CPU-bound
    let weights = config.strategy.weights.clone();
    let limits = config.strategy.limits;
    let my_team = config.league.my_team.clone();
    let (profiles, recommendations) = tokio::task::spawn_blocking(move || {
        let profiles = compute_team_profiles(&league);
        let recommendations = find_trade_recommendations_with(&profiles, &my_team, &weights, &limits);
        (profiles, recommendations)
    })
    .await
    .context("recommendation task failed")?;

    if !profiles.iter().any(|p| p.team_name == config.league.my_team) {
        warn!("Configured team '{}' is not in league {}", config.league.my_team, config.league.id);
        eprintln!(
            "Team '{}' not found. Teams in this league: {}",
            config.league.my_team,
            profiles
                .iter()
                .map(|p| p.team_name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    // 6. Output
    println!("{}", report::format_profiles(&profiles));
    println!("{}", report::format_recommendations(&config.league.my_team, &recommendations));

    if let Some(top) = recommendations.first() {
        let session = TradeSession::from_candidate(top, config.strategy.weights.clone());
        println!("Top trade, live analysis:");
        println!("{}", report::format_analysis(session.analysis(), &top.team1, &top.team2));
    }

    info!("Tradewise finished with {} recommendations", recommendations.len());
    Ok(())
}

/// Initialize tracing to write to the configured log file (not the terminal).
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;

    if let Some(dir) = logging.file.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    }
    let log_file = std::fs::File::create(&logging.file)
        .with_context(|| format!("failed to create log file {}", logging.file.display()))?;

    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = env_filter(logging, rust_log.as_deref())?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

/// `RUST_LOG` wins over the configured filter when set and non-empty.
fn env_filter(
    logging: &LoggingConfig,
    rust_log: Option<&str>,
) -> anyhow::Result<tracing_subscriber::EnvFilter> {
    let directives = match rust_log {
        Some(env) if !env.trim().is_empty() => env,
        _ => logging.filter.as_str(),
    };
    tracing_subscriber::EnvFilter::try_new(directives)
        .with_context(|| format!("invalid log filter '{directives}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn logging(filter: &str) -> LoggingConfig {
        LoggingConfig {
            file: PathBuf::from("logs/tradewise.log"),
            filter: filter.into(),
        }
    }

    #[test]
    fn configured_filter_used_without_rust_log() {
        let filter = env_filter(&logging("tradewise_core=debug"), None).unwrap();
        assert_eq!(filter.to_string(), "tradewise_core=debug");

        let filter = env_filter(&logging("tradewise_core=debug"), Some("  ")).unwrap();
        assert_eq!(filter.to_string(), "tradewise_core=debug");
    }

    #[test]
    fn rust_log_overrides_configured_filter() {
        let filter = env_filter(&logging("tradewise_core=debug"), Some("warn")).unwrap();
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn invalid_configured_filter_is_an_error() {
        let err = env_filter(&logging("tradewise_core=notalevel"), None).unwrap_err();
        assert!(err.to_string().contains("invalid log filter"));
    }
}
