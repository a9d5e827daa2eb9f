// Batch projection: many players, bounded concurrency, per-player failures
// recorded instead of raised.

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use huddle_core::FantasyPosition;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::engine::{ProjectionEngine, ProjectionOutcome};
use crate::error::Abstention;
use crate::ranking::rank_players;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub player: String,
    pub position: FantasyPosition,
    /// Mean of the player's future projections, one decimal.
    pub average_projection: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExclusionReason {
    Abstained(Abstention),
    Failed(String),
    /// Projected, but no remaining games to average.
    NoFutureGames,
    TaskPanicked,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exclusion {
    pub player: String,
    pub reason: ExclusionReason,
}

/// Batch result. `entries` are in completion order, not input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
    pub excluded: Vec<Exclusion>,
}

impl BatchReport {
    fn exclude(&mut self, player: String, reason: ExclusionReason) {
        self.excluded.push(Exclusion { player, reason });
    }
}

/// Project every player in `players` (or the top `default_size` by
/// production when `None`) with at most `concurrency` projections in flight.
///
/// Never fails: a player that errors, abstains or has no remaining games is
/// listed in `excluded`. If the season schedule (or the default ranking)
/// cannot be loaded the report is empty.
pub async fn project_batch(
    engine: &ProjectionEngine,
    players: Option<Vec<String>>,
    season: u16,
    concurrency: usize,
    default_size: usize,
) -> BatchReport {
    let concurrency = concurrency.max(1);

    let players = match players {
        Some(p) => p,
        None => match rank_players(engine.provider().as_ref(), season, default_size).await {
            Ok(p) => p,
            Err(e) => {
                error!(season, "could not rank players for default batch: {}", e);
                return BatchReport::default();
            }
        },
    };

    let games = match engine.provider().schedules(season).await {
        Ok(g) => g,
        Err(e) => {
            error!(season, "schedule unavailable, batch aborted: {}", e);
            return BatchReport::default();
        }
    };

    // Every worker reads the same cached profiles.
    for position in FantasyPosition::ALL {
        if let Err(e) = engine.defense_profiles(position.code(), season).await {
            warn!(%position, season, "defense profiles not preloaded: {}", e);
        }
    }

    info!(season, players = players.len(), concurrency, "starting batch projection");

    let results = stream::iter(players)
        .map(|player| {
            let engine = engine.clone();
            let games = Arc::clone(&games);
            async move {
                let task_player = player.clone();
                let joined =
                    tokio::spawn(async move { engine.project_against(&task_player, season, &games).await }).await;
                (player, joined)
            }
        })
        .buffer_unordered(concurrency)
        .collect::<Vec<_>>()
        .await;

    let mut report = BatchReport::default();
    for (player, joined) in results {
        match joined {
            Ok(Ok(ProjectionOutcome::Projected(result))) => match result.average_projection() {
                Some(average_projection) => report.entries.push(BatchEntry {
                    player,
                    position: result.position,
                    average_projection,
                }),
                None => report.exclude(player, ExclusionReason::NoFutureGames),
            },
            Ok(Ok(ProjectionOutcome::Abstained(reason))) => {
                report.exclude(player, ExclusionReason::Abstained(reason));
            }
            Ok(Err(e)) => {
                warn!(player = %player, "projection failed: {}", e);
                report.exclude(player, ExclusionReason::Failed(e.to_string()));
            }
            Err(e) => {
                error!(player = %player, "projection task panicked: {}", e);
                report.exclude(player, ExclusionReason::TaskPanicked);
            }
        }
    }

    info!(
        projected = report.entries.len(),
        excluded = report.excluded.len(),
        "batch projection finished"
    );
    report
}
