// NFL season resolution.
//
// A season "belongs" to the calendar year it kicks off in. Until the first
// week of play has finished, the previous season is still the current one.

use chrono::{Datelike, Duration, FixedOffset, NaiveDate, Utc, Weekday};

/// Regular-season weeks per team schedule.
pub const NFL_SEASON_WEEKS: u8 = 18;

/// US Eastern (standard time) offset used to decide the date.
const EASTERN_OFFSET_SECS: i32 = -5 * 3600;

/// First Monday of September (Labor Day) for `year`.
pub fn labor_day(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, 9, Weekday::Mon, 1)
}

/// The season that is current on `today`.
///
/// Week 1 is considered complete one week after Labor Day; on or before
/// that date the previous year's season is returned.
pub fn current_season(today: NaiveDate) -> u16 {
    let year = today.year();
    let rolled_over = labor_day(year)
        .map(|ld| today > ld + Duration::days(7))
        .unwrap_or(false);
    let season = if rolled_over { year } else { year - 1 };
    season as u16
}

/// Today's date in US Eastern time.
pub fn today_eastern() -> NaiveDate {
    FixedOffset::east_opt(EASTERN_OFFSET_SECS)
        .map(|tz| Utc::now().with_timezone(&tz).date_naive())
        .unwrap_or_else(|| Utc::now().date_naive())
}

/// Resolve the season to use: an explicit value wins, otherwise the
/// calendar decides.
pub fn resolve_season(explicit: Option<u16>, today: NaiveDate) -> u16 {
    explicit.unwrap_or_else(|| current_season(today))
}
