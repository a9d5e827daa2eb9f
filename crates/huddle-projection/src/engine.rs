// Projection calculator.
//
// Turns a player's trend, the opposing defenses' profiles and the player's
// schedule into one projected value per remaining game:
//
//     z         = (opponent allowed mean - league mean) / league std
//     projected = max(0, player mean + z * player std)

use std::sync::Arc;
use std::time::Duration;

use huddle_core::season::NFL_SEASON_WEEKS;
use huddle_core::{FantasyPosition, StatCategory, TtlCache};
use huddle_stats::{Game, StatsProvider};
use tracing::{debug, info, warn};

use crate::defense::{compute_defense_profiles, DefenseProfiles};
use crate::error::{Abstention, ProjectionError};
use crate::schedule::resolve_schedule;
use crate::stats::round_tenth;
use crate::trend::{compute_trend, PlayerTrend, TrendOutcome};

pub type DefenseCache = TtlCache<(FantasyPosition, u16), Arc<DefenseProfiles>>;

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionResult {
    pub player: String,
    pub position: FantasyPosition,
    pub trend: PlayerTrend,
    /// One value per remaining game the opponent has a profile for, in week
    /// order. Never negative.
    pub future_projections: Vec<f64>,
    /// Actual values for played weeks, in week order.
    pub completed_games: Vec<f64>,
}

impl ProjectionResult {
    /// Mean of the future projections to one decimal, or `None` when no
    /// games remain.
    pub fn average_projection(&self) -> Option<f64> {
        if self.future_projections.is_empty() {
            return None;
        }
        let sum: f64 = self.future_projections.iter().sum();
        Some(round_tenth(sum / self.future_projections.len() as f64))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionOutcome {
    Projected(ProjectionResult),
    Abstained(Abstention),
}

/// Projected production against one opponent.
pub fn project_value(trend: &PlayerTrend, opponent_z: f64) -> f64 {
    (trend.mean + opponent_z * trend.std).max(0.0)
}

/// Projects players against a `StatsProvider`, sharing defense profiles
/// through an explicit cache keyed by (position, season).
#[derive(Clone)]
pub struct ProjectionEngine {
    provider: Arc<dyn StatsProvider>,
    defense_cache: Arc<DefenseCache>,
    cache_ttl: Duration,
    min_sample: usize,
}

impl ProjectionEngine {
    pub fn new(provider: Arc<dyn StatsProvider>, min_sample: usize, cache_ttl: Duration) -> Self {
        Self::with_cache(provider, Arc::new(DefenseCache::new()), min_sample, cache_ttl)
    }

    /// Use a caller-owned defense cache, e.g. one shared with another engine.
    pub fn with_cache(
        provider: Arc<dyn StatsProvider>,
        defense_cache: Arc<DefenseCache>,
        min_sample: usize,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            provider,
            defense_cache,
            cache_ttl,
            min_sample,
        }
    }

    pub fn provider(&self) -> &Arc<dyn StatsProvider> {
        &self.provider
    }

    pub fn min_sample(&self) -> usize {
        self.min_sample
    }

    /// The player's position code from the season's seasonal table.
    pub async fn player_position(&self, player: &str, season: u16) -> Result<Option<String>, ProjectionError> {
        let seasonal = self.provider.seasonal_stats(season).await?;
        Ok(seasonal
            .iter()
            .find(|r| r.player == player)
            .map(|r| r.position.clone()))
    }

    /// Defense profiles for `position_code`, computed at most once per TTL
    /// for each (position, season).
    pub async fn defense_profiles(
        &self,
        position_code: &str,
        season: u16,
    ) -> Result<Arc<DefenseProfiles>, ProjectionError> {
        let Some(position) = FantasyPosition::from_code(position_code) else {
            warn!(position = position_code, "no defense stats for position");
            return Err(ProjectionError::UnsupportedPosition(position_code.to_string()));
        };
        let key = (position, season);
        if let Some(profiles) = self.defense_cache.get(&key) {
            return Ok(profiles);
        }
        let profiles = Arc::new(compute_defense_profiles(self.provider.as_ref(), position.code(), season).await?);
        self.defense_cache.put(key, Arc::clone(&profiles), self.cache_ttl);
        Ok(profiles)
    }

    /// Project one player for `season`, fetching the season schedule.
    pub async fn project(&self, player: &str, season: u16) -> Result<ProjectionOutcome, ProjectionError> {
        let games = self.provider.schedules(season).await?;
        self.project_against(player, season, &games).await
    }

    /// Project one player against an already-fetched season schedule.
    ///
    /// Only transport and parse failures of the player's own data are
    /// errors; every other reason for not projecting is an abstention.
    pub async fn project_against(
        &self,
        player: &str,
        season: u16,
        games: &[Game],
    ) -> Result<ProjectionOutcome, ProjectionError> {
        let Some(position_code) = self.player_position(player, season).await? else {
            info!(player, season, "abstaining: not in seasonal data");
            return Ok(ProjectionOutcome::Abstained(Abstention::UnknownPlayer));
        };

        let (trend, history) =
            match compute_trend(self.provider.as_ref(), player, &position_code, season, self.min_sample).await? {
                TrendOutcome::Ready { trend, history } => (trend, history),
                TrendOutcome::Abstain { found, required } => {
                    info!(player, found, required, "abstaining: insufficient data");
                    return Ok(ProjectionOutcome::Abstained(Abstention::InsufficientSample { found, required }));
                }
            };

        let profiles = match self.defense_profiles(&position_code, season).await {
            Ok(p) => p,
            Err(ProjectionError::UnsupportedPosition(code)) => {
                return Ok(ProjectionOutcome::Abstained(Abstention::UnsupportedPosition(code)));
            }
            Err(e) => {
                warn!(player, season, "abstaining: {}", e);
                return Ok(ProjectionOutcome::Abstained(Abstention::DefenseUnavailable));
            }
        };

        let schedule = match resolve_schedule(games, &history.current, player, season) {
            Ok(s) => s,
            Err(e) => {
                info!(player, "abstaining: {}", e);
                return Ok(ProjectionOutcome::Abstained(Abstention::TeamNotResolved));
            }
        };

        let mut future_projections = Vec::new();
        let mut completed_games = Vec::new();
        for entry in &schedule {
            if entry.completed {
                match history.current.iter().find(|r| r.week == entry.week) {
                    Some(record) => completed_games.push(record.stat(trend.category)),
                    None => debug!(player, week = entry.week, "no record for completed week"),
                }
            } else {
                match profiles.zscore(&entry.opponent) {
                    Some(z) => future_projections.push(project_value(&trend, z)),
                    None => debug!(player, week = entry.week, opponent = %entry.opponent, "no defense profile"),
                }
            }
        }

        debug!(
            player,
            position = %profiles.position,
            future = future_projections.len(),
            completed = completed_games.len(),
            "projection complete"
        );
        Ok(ProjectionOutcome::Projected(ProjectionResult {
            player: player.to_string(),
            position: profiles.position,
            trend,
            future_projections,
            completed_games,
        }))
    }

    /// The player's value for `stat` in each regular-season week, indexed
    /// from week 1. Weeks without a row are `None`.
    pub async fn weekly_series(
        &self,
        player: &str,
        stat: StatCategory,
        season: u16,
    ) -> Result<Vec<Option<f64>>, ProjectionError> {
        let rows = self.provider.weekly_stats(season).await?;
        let mut series = vec![None; NFL_SEASON_WEEKS as usize];
        for row in rows.iter().filter(|r| r.player == player) {
            if let Some(slot) = (row.week as usize).checked_sub(1).and_then(|i| series.get_mut(i)) {
                *slot = Some(row.stat(stat));
            }
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_stats::{DefenseRecord, Endpoint, InMemoryProvider, SeasonalRecord, StatLine, WeeklyRecord};

    fn rec(player: &str, position: &str, week: u8, yards: f64) -> WeeklyRecord {
        WeeklyRecord {
            player: player.into(),
            position: position.into(),
            team: "CIN".into(),
            opponent: None,
            week,
            stats: StatLine::from([
                (StatCategory::ReceivingYards, yards),
                (StatCategory::RushingYards, yards / 2.0),
            ]),
        }
    }

    fn defense(team: &str, rec_yards: f64) -> DefenseRecord {
        DefenseRecord {
            team: team.into(),
            week: None,
            allowed: StatLine::from([
                (StatCategory::ReceivingYards, rec_yards),
                (StatCategory::RushingYards, rec_yards),
            ]),
        }
    }

    fn games() -> Vec<Game> {
        (1..=6)
            .map(|week| Game {
                week,
                home_team: "CIN".into(),
                away_team: ["NE", "KC", "PIT", "BAL", "CLE", "DEN"][week as usize - 1].into(),
            })
            .collect()
    }

    fn engine(provider: InMemoryProvider) -> ProjectionEngine {
        ProjectionEngine::new(Arc::new(provider), 4, Duration::from_secs(3600))
    }

    fn fixture() -> InMemoryProvider {
        InMemoryProvider::new()
            .with_weekly(2024, (1..=4).map(|w| rec("Chase", "WR", w, 40.0 + 10.0 * w as f64)).collect())
            .with_schedules(2024, games())
            .with_defense(2024, vec![defense("CLE", 50.0), defense("DEN", 70.0), defense("KC", 60.0)])
    }

    #[test]
    fn negative_projection_clamps_to_zero() {
        let trend = PlayerTrend {
            mean: 10.0,
            std: 20.0,
            category: StatCategory::RushingYards,
            sample_size: 4,
        };
        assert_eq!(project_value(&trend, -2.0), 0.0);
        assert_eq!(project_value(&trend, 1.0), 30.0);
    }

    #[test]
    fn average_rounds_and_handles_empty() {
        let mut result = ProjectionResult {
            player: "P".into(),
            position: FantasyPosition::WR,
            trend: PlayerTrend {
                mean: 0.0,
                std: 1.0,
                category: StatCategory::ReceivingYards,
                sample_size: 4,
            },
            future_projections: vec![],
            completed_games: vec![],
        };
        assert_eq!(result.average_projection(), None);
        result.future_projections = vec![10.0, 10.25, 10.0];
        assert_eq!(result.average_projection(), Some(10.1));
        // 12.25 is an exact half.
        result.future_projections = vec![12.0, 12.5];
        assert_eq!(result.average_projection(), Some(12.2));
    }

    #[tokio::test]
    async fn projects_future_games_and_collects_completed() {
        let engine = engine(fixture());
        let outcome = engine.project("Chase", 2024).await.unwrap();
        let ProjectionOutcome::Projected(result) = outcome else {
            panic!("expected a projection, got {outcome:?}");
        };
        assert_eq!(result.position, FantasyPosition::WR);
        assert_eq!(result.completed_games, vec![50.0, 60.0, 70.0, 80.0]);
        // CLE sits one std below the league, DEN one above.
        assert_eq!(result.future_projections.len(), 2);
        let std = result.trend.std;
        assert!((result.future_projections[0] - (65.0 - std)).abs() < 1e-9);
        assert!((result.future_projections[1] - (65.0 + std)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn unknown_player_abstains() {
        let engine = engine(fixture());
        let outcome = engine.project("Nobody", 2024).await.unwrap();
        assert_eq!(outcome, ProjectionOutcome::Abstained(Abstention::UnknownPlayer));
    }

    #[tokio::test]
    async fn quarterback_abstains_as_unsupported() {
        let provider = fixture().with_weekly(2024, (1..=5).map(|w| rec("Burrow", "QB", w, 10.0)).collect());
        let outcome = engine(provider).project("Burrow", 2024).await.unwrap();
        assert_eq!(
            outcome,
            ProjectionOutcome::Abstained(Abstention::UnsupportedPosition("QB".into()))
        );
    }

    #[tokio::test]
    async fn defense_outage_abstains() {
        let outcome = engine(fixture().failing(Endpoint::Defense, 2024))
            .project("Chase", 2024)
            .await
            .unwrap();
        assert_eq!(outcome, ProjectionOutcome::Abstained(Abstention::DefenseUnavailable));
    }

    #[tokio::test]
    async fn prior_season_only_player_has_no_team() {
        // A 2024 seasonal row gives the player a position, but all weekly
        // rows are from 2023.
        let provider = InMemoryProvider::new()
            .with_weekly(2023, (1..=6).map(|w| rec("Retired", "WR", w, 30.0)).collect())
            .with_schedules(2024, games())
            .with_seasonal(
                2024,
                vec![SeasonalRecord {
                    player: "Retired".into(),
                    position: "WR".into(),
                    team: "CIN".into(),
                    games: 0,
                    stats: StatLine::new(),
                }],
            );
        let outcome = engine(provider).project("Retired", 2024).await.unwrap();
        assert_eq!(outcome, ProjectionOutcome::Abstained(Abstention::TeamNotResolved));
    }

    #[tokio::test]
    async fn seasonal_outage_is_an_error() {
        let err = engine(fixture().failing(Endpoint::Seasonal, 2024))
            .project("Chase", 2024)
            .await
            .unwrap_err();
        assert!(matches!(err, ProjectionError::DataUnavailable(_)));
    }

    #[tokio::test]
    async fn defense_profiles_are_cached_per_position_and_season() {
        let provider = Arc::new(fixture());
        let engine = ProjectionEngine::new(provider.clone(), 4, Duration::from_secs(3600));
        let a = engine.defense_profiles("WR", 2024).await.unwrap();
        let b = engine.defense_profiles("wr", 2024).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        engine.defense_profiles("RB", 2024).await.unwrap();
        assert_eq!(provider.calls(Endpoint::Defense), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn defense_profiles_expire_after_ttl() {
        let provider = Arc::new(fixture());
        let engine = ProjectionEngine::new(provider.clone(), 4, Duration::from_secs(60));
        engine.defense_profiles("TE", 2024).await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;
        engine.defense_profiles("TE", 2024).await.unwrap();
        assert_eq!(provider.calls(Endpoint::Defense), 2);
    }

    #[tokio::test]
    async fn weekly_series_has_a_slot_per_week() {
        let engine = engine(fixture());
        let series = engine
            .weekly_series("Chase", StatCategory::ReceivingYards, 2024)
            .await
            .unwrap();
        assert_eq!(series.len(), NFL_SEASON_WEEKS as usize);
        assert_eq!(&series[..5], &[Some(50.0), Some(60.0), Some(70.0), Some(80.0), None]);
    }
}
