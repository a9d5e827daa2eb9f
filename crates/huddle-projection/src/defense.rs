// Defense strength: how much of a stat category each defense allows, and
// where that sits relative to the league.

use std::collections::{BTreeMap, HashMap};

use huddle_core::{FantasyPosition, StatCategory};
use huddle_stats::{DefenseRecord, StatsProvider};
use tracing::{debug, warn};

use crate::error::ProjectionError;
use crate::stats::{sample_stats, usable_std};

/// What one defense allows per game in a category.
#[derive(Debug, Clone, PartialEq)]
pub struct DefenseProfile {
    pub team: String,
    pub allowed_mean: f64,
    pub allowed_std: f64,
    pub games: usize,
}

/// Cross-team distribution of the per-team allowed means. `allowed_std` is
/// never zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeagueBaseline {
    pub allowed_mean: f64,
    pub allowed_std: f64,
}

/// Every defense's profile for one (position, season).
#[derive(Debug, Clone, PartialEq)]
pub struct DefenseProfiles {
    pub position: FantasyPosition,
    pub season: u16,
    pub category: StatCategory,
    pub teams: HashMap<String, DefenseProfile>,
    pub league: LeagueBaseline,
}

impl DefenseProfiles {
    pub fn get(&self, team: &str) -> Option<&DefenseProfile> {
        self.teams.get(team)
    }

    /// Standard deviations `team` allows above (positive) or below the league
    /// average. `None` if the team has no profile.
    pub fn zscore(&self, team: &str) -> Option<f64> {
        self.get(team)
            .map(|p| (p.allowed_mean - self.league.allowed_mean) / self.league.allowed_std)
    }
}

/// Build profiles from raw defense rows. Rows without a value for the
/// position's category are ignored.
pub fn build_profiles(position: FantasyPosition, season: u16, rows: &[DefenseRecord]) -> DefenseProfiles {
    let category = position.primary_category();

    let mut by_team: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for row in rows {
        if let Some(value) = row.allowed(category) {
            by_team.entry(row.team.as_str()).or_default().push(value);
        }
    }

    let teams: HashMap<String, DefenseProfile> = by_team
        .into_iter()
        .map(|(team, values)| {
            let stats = sample_stats(&values);
            let profile = DefenseProfile {
                team: team.to_string(),
                allowed_mean: stats.mean,
                allowed_std: stats.std,
                games: stats.n,
            };
            (team.to_string(), profile)
        })
        .collect();

    let mut team_means: Vec<f64> = teams.values().map(|p| p.allowed_mean).collect();
    // Summation order should not depend on hash order.
    team_means.sort_by(|a, b| a.total_cmp(b));
    let league_stats = sample_stats(&team_means);

    DefenseProfiles {
        position,
        season,
        category,
        teams,
        league: LeagueBaseline {
            allowed_mean: league_stats.mean,
            allowed_std: usable_std(league_stats.std),
        },
    }
}

/// Fetch the season's defense rows and build profiles for `position_code`.
pub async fn compute_defense_profiles(
    provider: &dyn StatsProvider,
    position_code: &str,
    season: u16,
) -> Result<DefenseProfiles, ProjectionError> {
    let Some(position) = FantasyPosition::from_code(position_code) else {
        warn!(position = position_code, "no defense stats for position");
        return Err(ProjectionError::UnsupportedPosition(position_code.to_string()));
    };

    let rows = provider.defense_stats(season).await?;
    let profiles = build_profiles(position, season, &rows);
    debug!(
        %position,
        season,
        teams = profiles.teams.len(),
        league_mean = profiles.league.allowed_mean,
        league_std = profiles.league.allowed_std,
        "defense profiles computed"
    );
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_stats::{Endpoint, InMemoryProvider, StatLine};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn season_row(team: &str, category: StatCategory, value: f64) -> DefenseRecord {
        DefenseRecord {
            team: team.into(),
            week: None,
            allowed: StatLine::from([(category, value)]),
        }
    }

    fn week_row(team: &str, week: u8, rush: f64, rec: f64) -> DefenseRecord {
        DefenseRecord {
            team: team.into(),
            week: Some(week),
            allowed: StatLine::from([
                (StatCategory::RushingYards, rush),
                (StatCategory::ReceivingYards, rec),
            ]),
        }
    }

    #[test]
    fn league_baseline_over_team_means() {
        let rows = vec![
            season_row("AAA", StatCategory::ReceivingYards, 50.0),
            season_row("BBB", StatCategory::ReceivingYards, 60.0),
            season_row("CCC", StatCategory::ReceivingYards, 70.0),
        ];
        let profiles = build_profiles(FantasyPosition::WR, 2024, &rows);
        assert_eq!(profiles.category, StatCategory::ReceivingYards);
        assert!(approx_eq(profiles.league.allowed_mean, 60.0, 1e-12));
        assert!(approx_eq(profiles.league.allowed_std, 10.0, 1e-12));
        assert!(approx_eq(profiles.zscore("CCC").unwrap(), 1.0, 1e-12));
        assert!(approx_eq(profiles.zscore("AAA").unwrap(), -1.0, 1e-12));
        assert_eq!(profiles.zscore("ZZZ"), None);
    }

    #[test]
    fn weekly_rows_average_per_team() {
        let rows = vec![
            week_row("DEN", 1, 100.0, 200.0),
            week_row("DEN", 2, 140.0, 180.0),
            week_row("KC", 1, 80.0, 250.0),
        ];
        let profiles = build_profiles(FantasyPosition::RB, 2024, &rows);
        let den = profiles.get("DEN").unwrap();
        assert!(approx_eq(den.allowed_mean, 120.0, 1e-12));
        assert_eq!(den.games, 2);
        assert!(den.allowed_std > 0.0);
        assert_eq!(profiles.get("KC").unwrap().allowed_std, 0.0);
    }

    #[test]
    fn identical_defenses_get_unit_std() {
        let rows = vec![
            season_row("AAA", StatCategory::RushingYards, 110.0),
            season_row("BBB", StatCategory::RushingYards, 110.0),
        ];
        let profiles = build_profiles(FantasyPosition::RB, 2024, &rows);
        assert_eq!(profiles.league.allowed_std, 1.0);
        assert_eq!(profiles.zscore("AAA"), Some(0.0));
    }

    #[test]
    fn rows_without_category_are_ignored() {
        let rows = vec![
            season_row("AAA", StatCategory::RushingYards, 110.0),
            season_row("BBB", StatCategory::ReceivingYards, 200.0),
        ];
        let profiles = build_profiles(FantasyPosition::TE, 2024, &rows);
        assert_eq!(profiles.teams.len(), 1);
        assert!(profiles.get("BBB").is_some());
    }

    #[tokio::test]
    async fn unsupported_position_is_rejected_before_fetching() {
        let provider = InMemoryProvider::new();
        let err = compute_defense_profiles(&provider, "QB", 2024).await.unwrap_err();
        assert!(matches!(err, ProjectionError::UnsupportedPosition(ref p) if p == "QB"));
        assert_eq!(provider.calls(Endpoint::Defense), 0);
    }

    #[tokio::test]
    async fn provider_failure_is_data_unavailable() {
        let provider = InMemoryProvider::new().failing(Endpoint::Defense, 2024);
        let err = compute_defense_profiles(&provider, "wr", 2024).await.unwrap_err();
        assert!(matches!(err, ProjectionError::DataUnavailable(_)));
    }
}
