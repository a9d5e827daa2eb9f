// nflverse-backed stats provider.
//
// Downloads the public nflverse CSV releases (weekly player stats per
// season, one league-wide games file) and derives season totals and
// defense-allowed tables from the weekly rows. Each parsed season table is
// cached for `provider.cache_ttl_secs`.

use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use async_trait::async_trait;
use huddle_core::config::ProviderConfig;
use huddle_core::{names, StatCategory, TtlCache};
use serde::{Deserialize, Deserializer};
use tracing::{debug, info, warn};

use crate::derive;
use crate::provider::{
    DefenseRecord, Game, ProviderError, SeasonalRecord, StatLine, StatsProvider, WeeklyRecord,
};

// ---------------------------------------------------------------------------
// Raw CSV rows (private)
// ---------------------------------------------------------------------------

/// One row of `player_stats_{season}.csv`. Extra columns are ignored.
/// Numeric columns use "NA" for missing values, which read as zero.
#[derive(Debug, Deserialize)]
struct RawWeeklyRow {
    player_display_name: String,
    #[serde(default)]
    position: String,
    #[serde(alias = "team")]
    recent_team: String,
    #[serde(default)]
    opponent_team: Option<String>,
    week: u8,
    #[serde(default)]
    season_type: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    carries: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    rushing_yards: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    rushing_tds: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    receptions: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    targets: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    receiving_yards: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    receiving_tds: f64,
}

/// One row of the nfldata `games.csv` file.
#[derive(Debug, Deserialize)]
struct RawGameRow {
    season: u16,
    game_type: String,
    week: u8,
    away_team: String,
    home_team: String,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .as_deref()
        .map(str::trim)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0))
}

// ---------------------------------------------------------------------------
// Reader-based parsers (testable without the network)
// ---------------------------------------------------------------------------

/// Parse weekly player stats, keeping regular-season weeks (week >= 1) only.
/// Malformed rows are logged and skipped.
pub fn parse_weekly_csv<R: Read>(rdr: R) -> Result<Vec<WeeklyRecord>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut records = Vec::new();
    for result in reader.deserialize::<RawWeeklyRow>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed weekly row: {}", e);
                continue;
            }
        };
        if raw.week == 0 {
            continue;
        }
        if !raw.season_type.is_empty() && raw.season_type != "REG" {
            continue;
        }
        let stats = StatLine::from([
            (StatCategory::Carries, raw.carries),
            (StatCategory::RushingYards, raw.rushing_yards),
            (StatCategory::RushingTds, raw.rushing_tds),
            (StatCategory::Receptions, raw.receptions),
            (StatCategory::Targets, raw.targets),
            (StatCategory::ReceivingYards, raw.receiving_yards),
            (StatCategory::ReceivingTds, raw.receiving_tds),
        ]);
        records.push(WeeklyRecord {
            player: names::clean_player_name(&raw.player_display_name),
            position: names::collapse_repeated(raw.position.trim()).to_string(),
            team: raw.recent_team.trim().to_string(),
            opponent: raw
                .opponent_team
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty() && t != "NA"),
            week: raw.week,
            stats,
        });
    }
    Ok(records)
}

/// Parse the league-wide games file into regular-season games grouped by
/// season.
pub fn parse_games_csv<R: Read>(rdr: R) -> Result<HashMap<u16, Vec<Game>>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut by_season: HashMap<u16, Vec<Game>> = HashMap::new();
    for result in reader.deserialize::<RawGameRow>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed game row: {}", e);
                continue;
            }
        };
        if raw.game_type != "REG" {
            continue;
        }
        by_season.entry(raw.season).or_default().push(Game {
            week: raw.week,
            home_team: raw.home_team,
            away_team: raw.away_team,
        });
    }
    Ok(by_season)
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct NflverseProvider {
    http: reqwest::Client,
    config: ProviderConfig,
    weekly: TtlCache<u16, Arc<Vec<WeeklyRecord>>>,
    seasonal: TtlCache<u16, Arc<Vec<SeasonalRecord>>>,
    defense: TtlCache<u16, Arc<Vec<DefenseRecord>>>,
    games: TtlCache<u16, Arc<Vec<Game>>>,
    // Serializes downloads so concurrent misses on the same table fetch once.
    download: tokio::sync::Mutex<()>,
}

impl NflverseProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|source| ProviderError::Http {
                url: String::new(),
                source,
            })?;
        Ok(Self {
            http,
            config,
            weekly: TtlCache::new(),
            seasonal: TtlCache::new(),
            defense: TtlCache::new(),
            games: TtlCache::new(),
            download: tokio::sync::Mutex::new(()),
        })
    }

    async fn fetch_text(&self, url: &str) -> Result<String, ProviderError> {
        info!("Downloading {}", url);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| ProviderError::Http {
                url: url.to_string(),
                source,
            })?;
        if !response.status().is_success() {
            return Err(ProviderError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        response.text().await.map_err(|source| ProviderError::Http {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl StatsProvider for NflverseProvider {
    async fn weekly_stats(&self, season: u16) -> Result<Arc<Vec<WeeklyRecord>>, ProviderError> {
        if let Some(hit) = self.weekly.get(&season) {
            return Ok(hit);
        }
        let _guard = self.download.lock().await;
        if let Some(hit) = self.weekly.get(&season) {
            return Ok(hit);
        }

        let url = self.config.weekly_url_for(season);
        let text = self.fetch_text(&url).await?;
        let records = parse_weekly_csv(text.as_bytes()).map_err(|source| ProviderError::Csv {
            what: url.clone(),
            source,
        })?;
        info!(season, rows = records.len(), "weekly stats loaded");

        let records = Arc::new(records);
        self.weekly
            .put(season, Arc::clone(&records), self.config.cache_ttl());
        Ok(records)
    }

    async fn seasonal_stats(&self, season: u16) -> Result<Arc<Vec<SeasonalRecord>>, ProviderError> {
        if let Some(hit) = self.seasonal.get(&season) {
            return Ok(hit);
        }
        let weekly = self.weekly_stats(season).await?;
        let seasonal = Arc::new(derive::seasonal_from_weekly(&weekly));
        debug!(season, players = seasonal.len(), "seasonal totals derived");
        self.seasonal
            .put(season, Arc::clone(&seasonal), self.config.cache_ttl());
        Ok(seasonal)
    }

    async fn schedules(&self, season: u16) -> Result<Arc<Vec<Game>>, ProviderError> {
        if let Some(hit) = self.games.get(&season) {
            return Ok(hit);
        }
        let _guard = self.download.lock().await;
        if let Some(hit) = self.games.get(&season) {
            return Ok(hit);
        }

        let url = self.config.schedules_url.clone();
        let text = self.fetch_text(&url).await?;
        let mut by_season = parse_games_csv(text.as_bytes()).map_err(|source| {
            ProviderError::Csv {
                what: url.clone(),
                source,
            }
        })?;

        let requested = Arc::new(by_season.remove(&season).unwrap_or_default());
        if requested.is_empty() {
            warn!(season, "no regular-season games found");
        }
        // The file covers every season; keep them all while we have them.
        for (other, games) in by_season {
            self.games.put(other, Arc::new(games), self.config.cache_ttl());
        }
        self.games
            .put(season, Arc::clone(&requested), self.config.cache_ttl());
        Ok(requested)
    }

    async fn defense_stats(&self, season: u16) -> Result<Arc<Vec<DefenseRecord>>, ProviderError> {
        if let Some(hit) = self.defense.get(&season) {
            return Ok(hit);
        }
        let weekly = self.weekly_stats(season).await?;
        let defense = Arc::new(derive::defense_from_weekly(&weekly));
        debug!(season, rows = defense.len(), "defense allowed table derived");
        self.defense
            .put(season, Arc::clone(&defense), self.config.cache_ttl());
        Ok(defense)
    }
}
