// Player trend: mean and spread of a player's weekly production in their
// primary category.

use huddle_core::StatCategory;
use huddle_stats::{StatsProvider, WeeklyRecord};
use tracing::{debug, warn};

use crate::error::ProjectionError;
use crate::stats::{sample_stats, usable_std};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerTrend {
    pub mean: f64,
    /// Never zero; a flat history is coerced to 1.
    pub std: f64,
    pub category: StatCategory,
    pub sample_size: usize,
}

/// The weekly rows a trend was computed from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerHistory {
    /// Current-season rows, ordered by week.
    pub current: Vec<WeeklyRecord>,
    /// Prior-season rows, only loaded when the current season is too short.
    pub prior: Vec<WeeklyRecord>,
}

impl PlayerHistory {
    pub fn sample_size(&self) -> usize {
        self.current.len() + self.prior.len()
    }

    /// Values of `category`, current season first, then prior season.
    /// Weeks are not aligned across seasons.
    pub fn values(&self, category: StatCategory) -> Vec<f64> {
        self.current
            .iter()
            .chain(self.prior.iter())
            .map(|r| r.stat(category))
            .collect()
    }

    /// Highest current-season week the player has a row for.
    pub fn watermark(&self) -> Option<u8> {
        self.current.iter().map(|r| r.week).max()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrendOutcome {
    Ready { trend: PlayerTrend, history: PlayerHistory },
    Abstain { found: usize, required: usize },
}

/// A player's rows from a season table, ordered by week.
pub fn player_weeks(rows: &[WeeklyRecord], player: &str) -> Vec<WeeklyRecord> {
    let mut weeks: Vec<WeeklyRecord> = rows.iter().filter(|r| r.player == player).cloned().collect();
    weeks.sort_by_key(|r| r.week);
    weeks
}

/// Trend over `history`, or `None` if the sample is below `min_sample`.
pub fn trend_from(history: &PlayerHistory, category: StatCategory, min_sample: usize) -> Option<PlayerTrend> {
    let values = history.values(category);
    if values.len() < min_sample {
        return None;
    }
    let stats = sample_stats(&values);
    Some(PlayerTrend {
        mean: stats.mean,
        std: usable_std(stats.std),
        category,
        sample_size: stats.n,
    })
}

/// Load the player's history and compute their trend for the category
/// implied by `position_code`.
///
/// Falls back to the prior season (one year only) when the current season
/// has fewer than `min_sample` games. A failed prior-season fetch counts as
/// no prior data.
pub async fn compute_trend(
    provider: &dyn StatsProvider,
    player: &str,
    position_code: &str,
    season: u16,
    min_sample: usize,
) -> Result<TrendOutcome, ProjectionError> {
    let category = StatCategory::for_position_code(position_code);
    let current_rows = provider.weekly_stats(season).await?;
    let mut history = PlayerHistory {
        current: player_weeks(&current_rows, player),
        prior: Vec::new(),
    };

    if history.current.len() < min_sample && season > 0 {
        match provider.weekly_stats(season - 1).await {
            Ok(prior_rows) => history.prior = player_weeks(&prior_rows, player),
            Err(e) => warn!(player, season = season - 1, "prior season unavailable: {}", e),
        }
    }

    match trend_from(&history, category, min_sample) {
        Some(trend) => {
            debug!(
                player,
                %category,
                mean = trend.mean,
                std = trend.std,
                n = trend.sample_size,
                "trend computed"
            );
            Ok(TrendOutcome::Ready { trend, history })
        }
        None => Ok(TrendOutcome::Abstain {
            found: history.sample_size(),
            required: min_sample,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_stats::{Endpoint, InMemoryProvider, StatLine};

    fn rec(player: &str, week: u8, yards: f64) -> WeeklyRecord {
        WeeklyRecord {
            player: player.into(),
            position: "WR".into(),
            team: "CIN".into(),
            opponent: Some("BAL".into()),
            week,
            stats: StatLine::from([(StatCategory::ReceivingYards, yards)]),
        }
    }

    #[tokio::test]
    async fn full_current_season_skips_prior_fetch() {
        let provider = InMemoryProvider::new().with_weekly(
            2024,
            vec![
                rec("Chase", 4, 80.0),
                rec("Chase", 1, 50.0),
                rec("Chase", 3, 60.0),
                rec("Chase", 2, 70.0),
                rec("Other", 1, 999.0),
            ],
        );
        let outcome = compute_trend(&provider, "Chase", "WR", 2024, 4).await.unwrap();
        let TrendOutcome::Ready { trend, history } = outcome else {
            panic!("expected a trend");
        };
        assert_eq!(trend.category, StatCategory::ReceivingYards);
        assert_eq!(trend.sample_size, 4);
        assert!((trend.mean - 65.0).abs() < 1e-12);
        assert!((trend.std - 12.9099).abs() < 1e-3);
        assert_eq!(history.current.iter().map(|r| r.week).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(history.watermark(), Some(4));
        assert_eq!(provider.calls(Endpoint::Weekly), 1);
    }

    #[tokio::test]
    async fn short_season_appends_prior_year() {
        let provider = InMemoryProvider::new()
            .with_weekly(2024, vec![rec("Rookie", 1, 40.0), rec("Rookie", 2, 60.0)])
            .with_weekly(2023, vec![rec("Rookie", 15, 30.0), rec("Rookie", 16, 70.0)]);
        let outcome = compute_trend(&provider, "Rookie", "WR", 2024, 4).await.unwrap();
        let TrendOutcome::Ready { trend, history } = outcome else {
            panic!("expected a trend");
        };
        assert_eq!(trend.sample_size, 4);
        assert!((trend.mean - 50.0).abs() < 1e-12);
        assert_eq!(history.prior.len(), 2);
        // Prior-season weeks never move the current-season watermark.
        assert_eq!(history.watermark(), Some(2));
    }

    #[tokio::test]
    async fn insufficient_combined_sample_abstains() {
        let provider = InMemoryProvider::new()
            .with_weekly(2024, vec![rec("Deep", 1, 10.0)])
            .with_weekly(2023, vec![rec("Deep", 3, 12.0), rec("Deep", 9, 8.0)]);
        let outcome = compute_trend(&provider, "Deep", "WR", 2024, 4).await.unwrap();
        assert_eq!(outcome, TrendOutcome::Abstain { found: 3, required: 4 });
    }

    #[tokio::test]
    async fn prior_season_outage_counts_as_no_data() {
        let provider = InMemoryProvider::new()
            .with_weekly(2024, vec![rec("Deep", 1, 10.0)])
            .failing(Endpoint::Weekly, 2023);
        let outcome = compute_trend(&provider, "Deep", "WR", 2024, 4).await.unwrap();
        assert_eq!(outcome, TrendOutcome::Abstain { found: 1, required: 4 });
    }

    #[tokio::test]
    async fn current_season_outage_is_an_error() {
        let provider = InMemoryProvider::new().failing(Endpoint::Weekly, 2024);
        let err = compute_trend(&provider, "Anyone", "RB", 2024, 4).await.unwrap_err();
        assert!(matches!(err, ProjectionError::DataUnavailable(_)));
    }

    #[test]
    fn flat_history_gets_unit_std() {
        let history = PlayerHistory {
            current: (1..=5).map(|w| rec("Flat", w, 42.0)).collect(),
            prior: Vec::new(),
        };
        let trend = trend_from(&history, StatCategory::ReceivingYards, 4).unwrap();
        assert_eq!(trend.std, 1.0);
        assert_eq!(trend.mean, 42.0);
    }

    #[test]
    fn running_back_uses_rushing_category() {
        let history = PlayerHistory {
            current: (1..=4).map(|w| rec("Back", w, 42.0)).collect(),
            prior: Vec::new(),
        };
        let trend = trend_from(&history, StatCategory::for_position_code("RB"), 4).unwrap();
        assert_eq!(trend.category, StatCategory::RushingYards);
        assert_eq!(trend.mean, 0.0, "rows carry no rushing yards");
    }
}
