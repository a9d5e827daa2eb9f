// Season totals and defense-allowed tables derived from weekly rows.

use std::collections::BTreeMap;

use crate::provider::{DefenseRecord, SeasonalRecord, StatLine, WeeklyRecord};

/// Sum weekly rows into one `SeasonalRecord` per player, ordered by name.
/// The team is taken from the player's latest week.
pub fn seasonal_from_weekly(weekly: &[WeeklyRecord]) -> Vec<SeasonalRecord> {
    let mut by_player: BTreeMap<&str, (SeasonalRecord, u8)> = BTreeMap::new();

    for rec in weekly {
        let (season, last_week) = by_player.entry(rec.player.as_str()).or_insert_with(|| {
            (
                SeasonalRecord {
                    player: rec.player.clone(),
                    position: rec.position.clone(),
                    team: rec.team.clone(),
                    games: 0,
                    stats: StatLine::new(),
                },
                0,
            )
        });
        season.games += 1;
        add_into(&mut season.stats, &rec.stats);
        if rec.week >= *last_week {
            *last_week = rec.week;
            season.team = rec.team.clone();
        }
    }

    by_player.into_values().map(|(season, _)| season).collect()
}

/// Production allowed per defense per week: every weekly row is credited to
/// its opponent. Rows without an opponent are skipped. Ordered by team, then
/// week.
pub fn defense_from_weekly(weekly: &[WeeklyRecord]) -> Vec<DefenseRecord> {
    let mut allowed: BTreeMap<(&str, u8), StatLine> = BTreeMap::new();

    for rec in weekly {
        let Some(opponent) = rec.opponent.as_deref() else {
            continue;
        };
        add_into(allowed.entry((opponent, rec.week)).or_default(), &rec.stats);
    }

    allowed
        .into_iter()
        .map(|((team, week), allowed)| DefenseRecord {
            team: team.to_string(),
            week: Some(week),
            allowed,
        })
        .collect()
}

fn add_into(total: &mut StatLine, line: &StatLine) {
    for (cat, value) in line {
        *total.entry(*cat).or_insert(0.0) += value;
    }
}
