// League data provider: the roster/stats source the engine is fed from.
//
// `FileProvider` reads a data directory laid out as:
//
//   leagues/{league_id}/rosters.json
//   leagues/{league_id}/users.json
//   leagues/{league_id}/scoring.json   (optional)
//   players.json
//   stats/{season}.csv                 (player_id, pts_ppr, pts_half_ppr, pts_std, gp)

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use tradewise_core::league::{LeagueUser, PlayerInfo, Roster, ScoringSettings};
use tradewise_core::valuation::points::StatLine;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("not found: {0}")]
    NotFound(String),
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Source of everything needed to analyze one league season.
#[async_trait]
pub trait LeagueDataProvider: Send + Sync {
    async fn league_rosters(&self, league_id: &str) -> Result<Vec<Roster>, ProviderError>;

    async fn league_users(&self, league_id: &str) -> Result<Vec<LeagueUser>, ProviderError>;

    /// Player directory keyed by player ID.
    async fn player_directory(&self) -> Result<HashMap<String, PlayerInfo>, ProviderError>;

    /// Season totals keyed by player ID.
    async fn season_stats(&self, season: &str) -> Result<HashMap<String, StatLine>, ProviderError>;

    async fn scoring_settings(&self, league_id: &str) -> Result<ScoringSettings, ProviderError>;
}

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private)
// ---------------------------------------------------------------------------

/// One row of a season stats CSV. Empty point columns deserialize as `None`.
#[derive(Debug, Deserialize)]
struct RawStatRow {
    player_id: String,
    #[serde(default)]
    pts_ppr: Option<f64>,
    #[serde(default)]
    pts_half_ppr: Option<f64>,
    #[serde(default)]
    pts_std: Option<f64>,
    #[serde(default)]
    gp: Option<f64>,
}

/// Parse a stats CSV, skipping malformed or non-finite rows with a warning.
fn load_stats_from_reader<R: Read>(rdr: R) -> Result<HashMap<String, StatLine>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut stats = HashMap::new();
    for result in reader.deserialize::<RawStatRow>() {
        match result {
            Ok(raw) => {
                let player_id = raw.player_id.trim().to_string();
                if player_id.is_empty() {
                    warn!("skipping stats row with empty player_id");
                    continue;
                }
                let values = [raw.pts_ppr, raw.pts_half_ppr, raw.pts_std, raw.gp];
                if values.iter().flatten().any(|v| !v.is_finite()) {
                    warn!("skipping stats for '{}': non-finite value", player_id);
                    continue;
                }
                if stats.contains_key(&player_id) {
                    warn!("duplicate stats row for '{}', using latest value", player_id);
                }
                stats.insert(
                    player_id,
                    StatLine {
                        pts_ppr: raw.pts_ppr,
                        pts_half_ppr: raw.pts_half_ppr,
                        pts_std: raw.pts_std,
                        games_played: raw.gp,
                    },
                );
            }
            Err(e) => {
                warn!("skipping malformed stats row: {}", e);
            }
        }
    }
    Ok(stats)
}

// ---------------------------------------------------------------------------
// File provider
// ---------------------------------------------------------------------------

/// Reads league data from JSON and CSV files under a root directory.
#[derive(Debug, Clone)]
pub struct FileProvider {
    root: PathBuf,
}

impl FileProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileProvider { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn league_file(&self, league_id: &str, name: &str) -> PathBuf {
        self.root.join("leagues").join(league_id).join(name)
    }

    async fn read_text(path: &Path) -> Result<String, ProviderError> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ProviderError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(ProviderError::Io {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }

    async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ProviderError> {
        let text = Self::read_text(path).await?;
        serde_json::from_str(&text).map_err(|e| ProviderError::Json {
            path: path.display().to_string(),
            source: e,
        })
    }
}

#[async_trait]
impl LeagueDataProvider for FileProvider {
    async fn league_rosters(&self, league_id: &str) -> Result<Vec<Roster>, ProviderError> {
        let rosters: Vec<Roster> = Self::read_json(&self.league_file(league_id, "rosters.json")).await?;
        debug!("Read {} rosters for league {}", rosters.len(), league_id);
        Ok(rosters)
    }

    async fn league_users(&self, league_id: &str) -> Result<Vec<LeagueUser>, ProviderError> {
        Self::read_json(&self.league_file(league_id, "users.json")).await
    }

    async fn player_directory(&self) -> Result<HashMap<String, PlayerInfo>, ProviderError> {
        let players: HashMap<String, PlayerInfo> = Self::read_json(&self.root.join("players.json")).await?;
        debug!("Read {} directory entries", players.len());
        Ok(players)
    }

    async fn season_stats(&self, season: &str) -> Result<HashMap<String, StatLine>, ProviderError> {
        let path = self.root.join("stats").join(format!("{season}.csv"));
        let text = Self::read_text(&path).await?;
        let stats = load_stats_from_reader(text.as_bytes()).map_err(|e| ProviderError::Csv {
            path: path.display().to_string(),
            source: e,
        })?;
        debug!("Read stats for {} players ({} season)", stats.len(), season);
        Ok(stats)
    }

    async fn scoring_settings(&self, league_id: &str) -> Result<ScoringSettings, ProviderError> {
        match Self::read_json(&self.league_file(league_id, "scoring.json")).await {
            Err(ProviderError::NotFound(path)) => {
                debug!("No scoring settings at {}, assuming PPR", path);
                Ok(ScoringSettings::default())
            }
            other => other,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
