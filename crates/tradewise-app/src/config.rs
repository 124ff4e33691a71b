// Configuration loading and parsing (league.toml, strategy.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use tradewise_core::trade::generator::RecommendationLimits;
use tradewise_core::valuation::points::PositionWeights;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub strategy: StrategyConfig,
    /// Root of the league data files read by the file provider.
    pub data_dir: PathBuf,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    /// League identifier as used by the data provider.
    pub id: String,
    /// Team name recommendations are generated for.
    pub my_team: String,
    /// Season to analyze (e.g. "2024"). Defaults to the current NFL season.
    #[serde(default)]
    pub season: Option<String>,
}

// ---------------------------------------------------------------------------
// strategy.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire strategy.toml file.
#[derive(Debug, Clone, Deserialize)]
struct StrategyFile {
    position_weights: WeightsSection,
    recommendations: RecommendationsSection,
    cache: CacheConfig,
    data: DataSection,
    #[serde(default)]
    logging: LoggingSection,
}

/// Position weight multipliers. The field names use UPPERCASE to match the
/// TOML keys (QB, RB, ...).
#[derive(Debug, Clone, Copy, Deserialize)]
#[allow(non_snake_case)]
struct WeightsSection {
    QB: f64,
    RB: f64,
    WR: f64,
    TE: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct RecommendationsSection {
    max_results: usize,
    max_proposals: usize,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of cached provider responses, in seconds.
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct DataSection {
    dir: String,
}

/// `[logging]` table. Optional; every key has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct LoggingSection {
    file: String,
    filter: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        LoggingSection {
            file: "logs/tradewise.log".into(),
            filter: "tradewise_core=info,tradewise_app=info,warn".into(),
        }
    }
}

/// Where the binary writes its log and which targets it records.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Log file, resolved against the base directory when relative.
    pub file: PathBuf,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
}

/// The public strategy config assembled from the strategy.toml sections.
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    pub weights: PositionWeights,
    pub limits: RecommendationLimits,
    pub cache: CacheConfig,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/strategy.toml`, both relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;
    let league = league_file.league;

    // --- strategy.toml (required) ---
    let strategy_path = config_dir.join("strategy.toml");
    let strategy_text = read_file(&strategy_path)?;
    let strategy_file: StrategyFile =
        toml::from_str(&strategy_text).map_err(|e| ConfigError::ParseError {
            path: strategy_path.clone(),
            source: e,
        })?;

    validate_league(&league)?;
    validate_strategy(&strategy_file)?;

    let w = strategy_file.position_weights;
    let weights =
        PositionWeights::new(w.QB, w.RB, w.WR, w.TE).map_err(|e| ConfigError::ValidationError {
            field: "position_weights".into(),
            message: e.to_string(),
        })?;

    let strategy = StrategyConfig {
        weights,
        limits: RecommendationLimits {
            max_results: strategy_file.recommendations.max_results,
            max_proposals: strategy_file.recommendations.max_proposals,
        },
        cache: strategy_file.cache,
    };

    let data_dir = resolve(base_dir, &strategy_file.data.dir);
    let logging = LoggingConfig {
        file: resolve(base_dir, &strategy_file.logging.file),
        filter: strategy_file.logging.filter,
    };

    Ok(Config {
        league,
        strategy,
        data_dir,
        logging,
    })
}

/// Relative paths resolve against the base directory.
fn resolve(base_dir: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

/// Config files read by [`load_config_from`], all shipped under `defaults/`.
pub const CONFIG_FILES: [&str; 2] = ["league.toml", "strategy.toml"];

/// Copy every file of [`CONFIG_FILES`] missing from `config/` out of
/// `defaults/`. Existing files are never overwritten. Returns the files
/// created.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    let missing: Vec<&str> = CONFIG_FILES
        .iter()
        .copied()
        .filter(|name| !config_dir.join(name).is_file())
        .collect();
    if missing.is_empty() {
        return Ok(Vec::new());
    }
    if !defaults_dir.is_dir() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "{} missing from {} and no defaults/ directory to copy from",
                missing.join(", "),
                config_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create {}: {e}", config_dir.display()),
    })?;

    let mut created = Vec::with_capacity(missing.len());
    for name in missing {
        let source = defaults_dir.join(name);
        let target = config_dir.join(name);
        std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to copy {} to {}: {e}", source.display(), target.display()),
        })?;
        created.push(target);
    }
    Ok(created)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_league(league: &LeagueConfig) -> Result<(), ConfigError> {
    let text_fields: &[(&str, &str)] = &[
        ("league.id", league.id.as_str()),
        ("league.my_team", league.my_team.as_str()),
    ];
    for (name, val) in text_fields {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    if let Some(season) = &league.season {
        if season.len() != 4 || !season.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::ValidationError {
                field: "league.season".into(),
                message: format!("must be a four-digit year, got {season:?}"),
            });
        }
    }

    Ok(())
}

fn validate_strategy(strategy: &StrategyFile) -> Result<(), ConfigError> {
    let w = &strategy.position_weights;
    let weight_fields: &[(&str, f64)] = &[
        ("position_weights.QB", w.QB),
        ("position_weights.RB", w.RB),
        ("position_weights.WR", w.WR),
        ("position_weights.TE", w.TE),
    ];
    for (name, val) in weight_fields {
        if !val.is_finite() || *val <= 0.0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: format!("must be > 0, got {val}"),
            });
        }
    }

    let rec = &strategy.recommendations;
    let count_fields: &[(&str, usize)] = &[
        ("recommendations.max_results", rec.max_results),
        ("recommendations.max_proposals", rec.max_proposals),
    ];
    for (name, val) in count_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    let path_fields: &[(&str, &str)] = &[
        ("data.dir", strategy.data.dir.as_str()),
        ("logging.file", strategy.logging.file.as_str()),
        ("logging.filter", strategy.logging.filter.as_str()),
    ];
    for (name, val) in path_fields {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
