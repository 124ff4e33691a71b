// League input data as delivered by the roster/stats provider.
//
// These types mirror the provider's JSON shapes closely so the app crate can
// deserialize straight into them. The engine only reads them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::valuation::points::{ScoringType, StatLine};

/// One team's roster in a league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub roster_id: u32,
    #[serde(default)]
    pub owner_id: Option<String>,
    /// Player IDs on the roster. The provider sends `null` for empty rosters.
    #[serde(default, rename = "players")]
    pub player_ids: Option<Vec<String>>,
}

impl Roster {
    pub fn player_ids(&self) -> &[String] {
        self.player_ids.as_deref().unwrap_or(&[])
    }
}

/// A league member, used to resolve team display names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueUser {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub metadata: Option<UserMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub team_name: Option<String>,
}

impl LeagueUser {
    /// Custom team name if set, otherwise the user's display name.
    pub fn team_name(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.team_name.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .or_else(|| {
                self.display_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
            })
    }
}

/// Player directory entry (identity only, no stats).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub team: Option<String>,
}

impl PlayerInfo {
    /// Best available display name, falling back to the player ID.
    pub fn display_name(&self, player_id: &str) -> String {
        if let Some(name) = self.full_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.trim().to_string();
        }
        let first = self.first_name.as_deref().unwrap_or("").trim();
        let last = self.last_name.as_deref().unwrap_or("").trim();
        let joined = format!("{first} {last}");
        let joined = joined.trim();
        if joined.is_empty() {
            player_id.to_string()
        } else {
            joined.to_string()
        }
    }
}

/// League scoring settings relevant to point-total selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringSettings {
    #[serde(default, alias = "rec")]
    pub reception_points: Option<f64>,
}

impl ScoringSettings {
    pub fn scoring_type(&self) -> ScoringType {
        ScoringType::from_reception_points(self.reception_points)
    }
}

/// Everything the profiler needs for one (league, season) analysis.
#[derive(Debug, Clone, Default)]
pub struct LeagueSnapshot {
    pub league_id: String,
    pub season: String,
    pub rosters: Vec<Roster>,
    pub users: Vec<LeagueUser>,
    pub players: HashMap<String, PlayerInfo>,
    pub stats: HashMap<String, StatLine>,
    pub scoring: ScoringSettings,
}

impl LeagueSnapshot {
    /// Display name for a roster: owner's team name, else `Team {roster_id}`.
    pub fn team_name(&self, roster: &Roster) -> String {
        roster
            .owner_id
            .as_deref()
            .and_then(|owner| self.users.iter().find(|u| u.user_id == owner))
            .and_then(LeagueUser::team_name)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Team {}", roster.roster_id))
    }
}
