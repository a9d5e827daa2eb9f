// Production ranking used to pick the default batch.

use std::collections::HashSet;

use huddle_core::{FantasyPosition, StatCategory};
use huddle_stats::StatsProvider;

use crate::error::ProjectionError;

/// RB, WR and TE names ordered by season receiving yards (highest first),
/// each name once, truncated to `limit`.
pub async fn rank_players(
    provider: &dyn StatsProvider,
    season: u16,
    limit: usize,
) -> Result<Vec<String>, ProjectionError> {
    let seasonal = provider.seasonal_stats(season).await?;
    let mut rows: Vec<_> = seasonal
        .iter()
        .filter(|r| FantasyPosition::from_code(&r.position).is_some())
        .collect();
    rows.sort_by(|a, b| {
        b.stat(StatCategory::ReceivingYards)
            .total_cmp(&a.stat(StatCategory::ReceivingYards))
    });

    let mut seen = HashSet::new();
    Ok(rows
        .into_iter()
        .filter(|r| seen.insert(r.player.as_str()))
        .take(limit)
        .map(|r| r.player.clone())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_stats::{InMemoryProvider, SeasonalRecord, StatLine};

    fn row(player: &str, yards: f64) -> SeasonalRecord {
        row_at(player, "WR", yards)
    }

    fn row_at(player: &str, position: &str, yards: f64) -> SeasonalRecord {
        SeasonalRecord {
            player: player.into(),
            position: position.into(),
            team: "KC".into(),
            games: 17,
            stats: StatLine::from([(StatCategory::ReceivingYards, yards)]),
        }
    }

    #[tokio::test]
    async fn ranks_by_receiving_yards_without_duplicates() {
        let provider = InMemoryProvider::new().with_seasonal(
            2024,
            vec![
                row("Kelce", 800.0),
                row("Chase", 1700.0),
                row("Henry", 150.0),
                row("Chase", 20.0),
                row("Nacua", 990.0),
            ],
        );
        let ranked = rank_players(&provider, 2024, 3).await.unwrap();
        assert_eq!(ranked, vec!["Chase", "Nacua", "Kelce"]);

        let all = rank_players(&provider, 2024, 50).await.unwrap();
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn skips_positions_without_projections() {
        let provider = InMemoryProvider::new().with_seasonal(
            2024,
            vec![
                row_at("Mahomes", "QB", 2000.0),
                row_at("Punter", "P", 1500.0),
                row_at("McCaffrey", "RB", 600.0),
                row_at("Kelce", "TE", 800.0),
                row_at("Chase", "WR", 1700.0),
            ],
        );
        let ranked = rank_players(&provider, 2024, 3).await.unwrap();
        assert_eq!(ranked, vec!["Chase", "Kelce", "McCaffrey"]);
    }
}
