// Schedule resolution: a player's team's season split into completed and
// future games.

use huddle_stats::{Game, WeeklyRecord};
use serde::Serialize;

use crate::error::ProjectionError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    pub week: u8,
    pub opponent: String,
    /// True for every week at or before the player's latest recorded week.
    pub completed: bool,
}

/// The player's current team: the team on their highest-week record.
pub fn current_team<'a>(records: &'a [WeeklyRecord], player: &str) -> Option<&'a str> {
    records
        .iter()
        .filter(|r| r.player == player)
        .max_by_key(|r| r.week)
        .map(|r| r.team.as_str())
}

/// Build the player's week-ordered schedule from the season's games and the
/// player's current-season weekly records.
///
/// Weeks at or below the highest week in `records` are completed; no gaps
/// are assumed, so a bye week before the watermark is simply absent.
pub fn resolve_schedule(
    games: &[Game],
    records: &[WeeklyRecord],
    player: &str,
    season: u16,
) -> Result<Vec<ScheduleEntry>, ProjectionError> {
    let not_found = || ProjectionError::PlayerNotFound {
        player: player.to_string(),
        season,
    };
    let team = current_team(records, player).ok_or_else(not_found)?;
    let watermark = records
        .iter()
        .filter(|r| r.player == player)
        .map(|r| r.week)
        .max()
        .ok_or_else(not_found)?;

    let mut entries: Vec<ScheduleEntry> = games
        .iter()
        .filter_map(|g| {
            g.opponent_of(team).map(|opponent| ScheduleEntry {
                week: g.week,
                opponent: opponent.to_string(),
                completed: g.week <= watermark,
            })
        })
        .collect();
    entries.sort_by_key(|e| e.week);
    Ok(entries)
}
