// Historical stats provider seam.
//
// The projection engine only ever talks to `StatsProvider`. Implementations
// return whole season tables behind an `Arc` so many concurrent projections
// can share one download.

use async_trait::async_trait;
use huddle_core::StatCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Stat category to value. Categories absent from a row count as zero.
pub type StatLine = BTreeMap<StatCategory, f64>;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// One player's production in one regular-season week. BYE weeks never
/// appear; week numbers start at 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyRecord {
    pub player: String,
    pub position: String,
    pub team: String,
    pub opponent: Option<String>,
    pub week: u8,
    pub stats: StatLine,
}

impl WeeklyRecord {
    pub fn stat(&self, category: StatCategory) -> f64 {
        self.stats.get(&category).copied().unwrap_or(0.0)
    }
}

/// Season totals for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalRecord {
    pub player: String,
    pub position: String,
    pub team: String,
    pub games: u32,
    pub stats: StatLine,
}

impl SeasonalRecord {
    pub fn stat(&self, category: StatCategory) -> f64 {
        self.stats.get(&category).copied().unwrap_or(0.0)
    }
}

/// A regular-season game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub week: u8,
    pub home_team: String,
    pub away_team: String,
}

impl Game {
    /// The other team in this game, if `team` played in it.
    pub fn opponent_of(&self, team: &str) -> Option<&str> {
        if self.home_team == team {
            Some(&self.away_team)
        } else if self.away_team == team {
            Some(&self.home_team)
        } else {
            None
        }
    }
}

/// Production a defense allowed, either for a single week or (when `week`
/// is `None`) for a whole season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenseRecord {
    pub team: String,
    pub week: Option<u8>,
    pub allowed: StatLine,
}

impl DefenseRecord {
    pub fn allowed(&self, category: StatCategory) -> Option<f64> {
        self.allowed.get(&category).copied()
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to parse {what}: {source}")]
    Csv { what: String, source: csv::Error },

    #[error("{what} unavailable for season {season}")]
    Unavailable { what: &'static str, season: u16 },
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Every player's weekly regular-season rows for `season`.
    async fn weekly_stats(&self, season: u16) -> Result<Arc<Vec<WeeklyRecord>>, ProviderError>;

    /// Season totals per player.
    async fn seasonal_stats(&self, season: u16) -> Result<Arc<Vec<SeasonalRecord>>, ProviderError>;

    /// Regular-season games.
    async fn schedules(&self, season: u16) -> Result<Arc<Vec<Game>>, ProviderError>;

    /// Production allowed by each defense.
    async fn defense_stats(&self, season: u16) -> Result<Arc<Vec<DefenseRecord>>, ProviderError>;
}
