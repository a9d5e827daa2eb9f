// ESPN fantasy league client: standings, scoreboard and free agents.
//
// Talks to the ESPN Fantasy API v3 league endpoint. Private leagues need the
// `espn_s2` and `SWID` cookies from credentials.toml. Every read goes
// through a per-view TTL cache owned by the client.

use std::sync::Arc;
use std::time::Duration;

use huddle_core::config::{CredentialsConfig, EspnConfig};
use huddle_core::{team, TtlCache};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const ESPN_API_BASE: &str = "https://lm-api-reads.fantasy.espn.com/apis/v3/games/ffl";

/// Free-agent list is trimmed to this many players.
const FREE_AGENT_LIMIT: usize = 200;

// ESPN lineup slot IDs used by the free-agent filter.
const SLOT_QB: u16 = 0;
const SLOT_RB: u16 = 2;
const SLOT_WR: u16 = 4;
const SLOT_TE: u16 = 6;
const SLOT_DST: u16 = 16;
const SLOT_K: u16 = 17;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingsRow {
    pub team: String,
    pub wins: u32,
    pub losses: u32,
    pub points_for: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Matchup {
    pub home: String,
    pub home_score: f64,
    pub away: String,
    pub away_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreeAgent {
    pub name: String,
    pub position: String,
    pub pro_team: String,
    pub projected_points: Option<f64>,
}

#[derive(Debug, Error)]
pub enum EspnError {
    #[error("ESPN request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ESPN returned HTTP {status}")]
    Status { status: u16 },

    #[error("failed to decode ESPN response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unknown position filter `{0}`")]
    UnknownPosition(String),
}

// ---------------------------------------------------------------------------
// Raw response shapes (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SettingsResponse {
    settings: RawSettings,
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct TeamsResponse {
    #[serde(default)]
    teams: Vec<RawTeam>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTeam {
    id: u32,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    nickname: Option<String>,
    #[serde(default)]
    record: Option<RawRecord>,
}

impl RawTeam {
    fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.trim().to_string();
        }
        let parts: Vec<&str> = [self.location.as_deref(), self.nickname.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            format!("Team {}", self.id)
        } else {
            parts.join(" ")
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    overall: RawOverall,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOverall {
    wins: u32,
    losses: u32,
    points_for: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchupResponse {
    status: RawStatus,
    #[serde(default)]
    schedule: Vec<RawMatchup>,
    #[serde(default)]
    teams: Vec<RawTeam>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatus {
    current_matchup_period: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMatchup {
    matchup_period_id: u32,
    home: Option<RawSide>,
    away: Option<RawSide>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSide {
    team_id: u32,
    #[serde(default)]
    total_points: f64,
    #[serde(default)]
    total_points_live: Option<f64>,
}

impl RawSide {
    fn score(&self) -> f64 {
        self.total_points_live.unwrap_or(self.total_points)
    }
}

#[derive(Debug, Deserialize)]
struct PlayersResponse {
    #[serde(default)]
    players: Vec<RawPlayerEntry>,
}

#[derive(Debug, Deserialize)]
struct RawPlayerEntry {
    player: RawPlayer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlayer {
    full_name: String,
    default_position_id: u16,
    pro_team_id: u32,
    #[serde(default)]
    stats: Vec<RawPlayerStat>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlayerStat {
    season_id: u16,
    stat_source_id: u8,
    stat_split_type_id: u8,
    #[serde(default)]
    applied_total: Option<f64>,
}

// ---------------------------------------------------------------------------
// Response conversion (pure, unit tested)
// ---------------------------------------------------------------------------

fn league_name_from(resp: SettingsResponse, league_id: u32) -> String {
    let name = resp.settings.name.trim();
    if name.is_empty() {
        format!("League {league_id}")
    } else {
        name.to_string()
    }
}

fn standings_from(resp: TeamsResponse) -> Vec<StandingsRow> {
    let mut rows: Vec<StandingsRow> = resp
        .teams
        .iter()
        .map(|t| {
            let (wins, losses, points_for) = t
                .record
                .as_ref()
                .map(|r| (r.overall.wins, r.overall.losses, r.overall.points_for))
                .unwrap_or((0, 0, 0.0));
            StandingsRow {
                team: t.display_name(),
                wins,
                losses,
                points_for,
            }
        })
        .collect();
    // Most wins first, points scored breaks ties.
    rows.sort_by(|a, b| {
        b.wins.cmp(&a.wins).then(
            b.points_for
                .partial_cmp(&a.points_for)
                .unwrap_or(std::cmp::Ordering::Equal),
        )
    });
    rows
}

fn scoreboard_from(resp: MatchupResponse) -> Vec<Matchup> {
    let team_name = |id: u32| {
        resp.teams
            .iter()
            .find(|t| t.id == id)
            .map(RawTeam::display_name)
            .unwrap_or_else(|| format!("Team {id}"))
    };
    let period = resp.status.current_matchup_period;

    resp.schedule
        .iter()
        .filter(|m| m.matchup_period_id == period)
        .filter_map(|m| {
            // A matchup with only one side is a bye.
            let (home, away) = (m.home.as_ref()?, m.away.as_ref()?);
            Some(Matchup {
                home: team_name(home.team_id),
                home_score: round2(home.score()),
                away: team_name(away.team_id),
                away_score: round2(away.score()),
            })
        })
        .collect()
}

fn free_agents_from(resp: PlayersResponse, season: u16) -> Vec<FreeAgent> {
    resp.players
        .into_iter()
        .take(FREE_AGENT_LIMIT)
        .map(|entry| {
            let p = entry.player;
            let projected_points = p
                .stats
                .iter()
                .find(|s| s.season_id == season && s.stat_source_id == 1 && s.stat_split_type_id == 0)
                .and_then(|s| s.applied_total);
            FreeAgent {
                name: p.full_name,
                position: position_label(p.default_position_id).to_string(),
                pro_team: team::from_espn_id(p.pro_team_id)
                    .unwrap_or("FA")
                    .to_string(),
                projected_points,
            }
        })
        .collect()
}

fn position_label(default_position_id: u16) -> &'static str {
    match default_position_id {
        1 => "QB",
        2 => "RB",
        3 => "WR",
        4 => "TE",
        5 => "K",
        16 => "D/ST",
        _ => "?",
    }
}

fn slot_for(position: &str) -> Option<u16> {
    match position.trim().to_uppercase().as_str() {
        "QB" => Some(SLOT_QB),
        "RB" => Some(SLOT_RB),
        "WR" => Some(SLOT_WR),
        "TE" => Some(SLOT_TE),
        "D/ST" | "DST" => Some(SLOT_DST),
        "K" => Some(SLOT_K),
        _ => None,
    }
}

/// `x-fantasy-filter` header body for the free-agent query.
fn free_agent_filter(slot: Option<u16>) -> String {
    let slots: Vec<u16> = match slot {
        Some(s) => vec![s],
        None => vec![SLOT_QB, SLOT_RB, SLOT_WR, SLOT_TE, SLOT_DST, SLOT_K],
    };
    serde_json::json!({
        "players": {
            "filterStatus": { "value": ["FREEAGENT", "WAIVERS"] },
            "filterSlotIds": { "value": slots },
            "limit": FREE_AGENT_LIMIT,
            "sortPercOwned": { "sortPriority": 1, "sortAsc": false }
        }
    })
    .to_string()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct EspnClient {
    http: reqwest::Client,
    league_url: String,
    league_id: u32,
    season: u16,
    cookie: Option<String>,
    standings_ttl: Duration,
    scoreboard_ttl: Duration,
    free_agents_ttl: Duration,
    standings: TtlCache<(), Arc<Vec<StandingsRow>>>,
    scoreboard: TtlCache<(), Arc<Vec<Matchup>>>,
    free_agents: TtlCache<Option<u16>, Arc<Vec<FreeAgent>>>,
}

impl EspnClient {
    /// Build a client for the configured league. `season` is the fallback
    /// when the ESPN config does not pin one.
    pub fn new(
        espn: &EspnConfig,
        credentials: &CredentialsConfig,
        season: u16,
        timeout: Duration,
    ) -> Result<Self, EspnError> {
        let season = espn.season.unwrap_or(season);
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let cookie = match (&credentials.espn_s2, &credentials.swid) {
            (Some(s2), Some(swid)) => Some(format!("espn_s2={s2}; SWID={swid}")),
            _ => None,
        };
        Ok(Self {
            http,
            league_url: format!(
                "{ESPN_API_BASE}/seasons/{season}/segments/0/leagues/{}",
                espn.league_id
            ),
            league_id: espn.league_id,
            season,
            cookie,
            standings_ttl: Duration::from_secs(espn.standings_ttl_secs),
            scoreboard_ttl: Duration::from_secs(espn.scoreboard_ttl_secs),
            free_agents_ttl: Duration::from_secs(espn.free_agents_ttl_secs),
            standings: TtlCache::new(),
            scoreboard: TtlCache::new(),
            free_agents: TtlCache::new(),
        })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        views: &[&str],
        fantasy_filter: Option<String>,
    ) -> Result<T, EspnError> {
        let query: Vec<(&str, &str)> = views.iter().map(|v| ("view", *v)).collect();
        let mut request = self.http.get(&self.league_url).query(&query);
        if let Some(cookie) = &self.cookie {
            request = request.header(reqwest::header::COOKIE, cookie);
        }
        if let Some(filter) = fantasy_filter {
            request = request.header("x-fantasy-filter", filter);
        }

        debug!(url = %self.league_url, ?views, "ESPN request");
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(EspnError::Status {
                status: response.status().as_u16(),
            });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// The league's display name from its settings.
    pub async fn league_name(&self) -> Result<String, EspnError> {
        let resp: SettingsResponse = self.fetch(&["mSettings"], None).await?;
        Ok(league_name_from(resp, self.league_id))
    }

    /// Teams ordered by wins, then points for.
    pub async fn standings(&self) -> Result<Arc<Vec<StandingsRow>>, EspnError> {
        if let Some(hit) = self.standings.get(&()) {
            return Ok(hit);
        }
        let resp: TeamsResponse = self.fetch(&["mTeam"], None).await?;
        let rows = Arc::new(standings_from(resp));
        info!(teams = rows.len(), "standings refreshed");
        self.standings.put((), Arc::clone(&rows), self.standings_ttl);
        Ok(rows)
    }

    /// Matchups of the current scoring period.
    pub async fn scoreboard(&self) -> Result<Arc<Vec<Matchup>>, EspnError> {
        if let Some(hit) = self.scoreboard.get(&()) {
            return Ok(hit);
        }
        let resp: MatchupResponse = self.fetch(&["mMatchupScore", "mTeam"], None).await?;
        let matchups = Arc::new(scoreboard_from(resp));
        info!(matchups = matchups.len(), "scoreboard refreshed");
        self.scoreboard
            .put((), Arc::clone(&matchups), self.scoreboard_ttl);
        Ok(matchups)
    }

    /// Available players, optionally limited to one position.
    pub async fn free_agents(&self, position: Option<&str>) -> Result<Arc<Vec<FreeAgent>>, EspnError> {
        let slot = match position {
            Some(pos) => Some(slot_for(pos).ok_or_else(|| EspnError::UnknownPosition(pos.to_string()))?),
            None => None,
        };
        if let Some(hit) = self.free_agents.get(&slot) {
            return Ok(hit);
        }
        let resp: PlayersResponse = self
            .fetch(&["kona_player_info"], Some(free_agent_filter(slot)))
            .await?;
        let players = Arc::new(free_agents_from(resp, self.season));
        info!(players = players.len(), ?position, "free agents refreshed");
        self.free_agents
            .put(slot, Arc::clone(&players), self.free_agents_ttl);
        Ok(players)
    }
}
