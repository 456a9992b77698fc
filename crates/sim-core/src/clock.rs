//! Game calendar: 4 weeks per month, 12 months per year.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::model::{THEME_CHRISTMAS, THEME_HALLOWEEN};
use crate::ValidationError;

pub const WEEKS_PER_MONTH: u32 = 4;
pub const MONTHS_PER_YEAR: u32 = 12;
pub const WEEKS_PER_YEAR: u32 = WEEKS_PER_MONTH * MONTHS_PER_YEAR;

/// Current position on the game calendar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameClock {
    /// Week of the month in [1, 4].
    pub week: u32,
    /// Month in [1, 12].
    pub month: u32,
    pub year: i32,
    /// Year the career started; anchors the absolute week counter.
    pub start_year: i32,
}

impl GameClock {
    pub fn new(start_year: i32) -> Self {
        Self {
            week: 1,
            month: 1,
            year: start_year,
            start_year,
        }
    }

    /// Build a clock at an arbitrary date, validating ranges.
    pub fn at(week: u32, month: u32, year: i32, start_year: i32) -> Result<Self, ValidationError> {
        let clock = Self {
            week,
            month,
            year,
            start_year,
        };
        validate_clock(&clock)?;
        Ok(clock)
    }

    /// `week + (month - 1) * 4 + years_elapsed * 48`.
    pub fn absolute_week(&self) -> u32 {
        let years = (self.year - self.start_year).max(0) as u32;
        self.week + (self.month - 1) * WEEKS_PER_MONTH + years * WEEKS_PER_YEAR
    }

    /// Move forward by one week, rolling month and year.
    pub fn advance(&mut self) {
        self.week += 1;
        if self.week > WEEKS_PER_MONTH {
            self.week = 1;
            self.month += 1;
            if self.month > MONTHS_PER_YEAR {
                self.month = 1;
                self.year += 1;
            }
        }
    }

    pub fn is_holiday(&self) -> bool {
        self.month == 12
    }

    pub fn is_halloween(&self) -> bool {
        self.month == 10
    }

    /// Seasonal themes that receive the trend boost this month.
    pub fn active_themes(&self) -> BTreeSet<&'static str> {
        active_themes_for_month(self.month)
    }
}

/// Seasonal theme calendar.
pub fn active_themes_for_month(month: u32) -> BTreeSet<&'static str> {
    let mut themes = BTreeSet::new();
    match month {
        1 => {
            themes.insert("winter");
        }
        2 => {
            themes.insert("winter");
            themes.insert("love");
        }
        6..=8 => {
            themes.insert("summer");
        }
        10 => {
            themes.insert(THEME_HALLOWEEN);
        }
        11 => {
            themes.insert(THEME_CHRISTMAS);
        }
        12 => {
            themes.insert(THEME_CHRISTMAS);
            themes.insert("winter");
        }
        _ => {}
    }
    themes
}

/// Validate calendar ranges.
pub fn validate_clock(clock: &GameClock) -> Result<(), ValidationError> {
    if !(1..=WEEKS_PER_MONTH).contains(&clock.week) {
        return Err(ValidationError::WeekOutOfRange(clock.week));
    }
    if !(1..=MONTHS_PER_YEAR).contains(&clock.month) {
        return Err(ValidationError::MonthOutOfRange(clock.month));
    }
    if clock.year < clock.start_year {
        return Err(ValidationError::YearBeforeStart(clock.year));
    }
    Ok(())
}

/// Number of whole game weeks that elapsed in wall-clock time.
///
/// Returns 0 when `now` is not after `last_tick` or `real_seconds_per_week` is 0,
/// and never more than `cap`.
pub fn elapsed_game_weeks(
    last_tick: DateTime<Utc>,
    now: DateTime<Utc>,
    real_seconds_per_week: u64,
    cap: u32,
) -> u32 {
    if real_seconds_per_week == 0 || now <= last_tick {
        return 0;
    }
    let secs = (now - last_tick).num_seconds().max(0) as u64;
    let weeks = secs / real_seconds_per_week;
    weeks.min(cap as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn absolute_week_counts_months_and_years() {
        let clock = GameClock::at(3, 2, 2026, 2025).unwrap();
        assert_eq!(clock.absolute_week(), 3 + 4 + 48);
        assert_eq!(GameClock::new(2025).absolute_week(), 1);
    }

    #[test]
    fn advance_rolls_over_year() {
        let mut clock = GameClock::at(4, 12, 2025, 2025).unwrap();
        let before = clock.absolute_week();
        clock.advance();
        assert_eq!((clock.week, clock.month, clock.year), (1, 1, 2026));
        assert_eq!(clock.absolute_week(), before + 1);
    }

    #[test]
    fn rejects_bad_month() {
        assert_eq!(
            GameClock::at(1, 13, 2025, 2025),
            Err(ValidationError::MonthOutOfRange(13))
        );
    }

    #[test]
    fn december_is_christmas_season() {
        let themes = active_themes_for_month(12);
        assert!(themes.contains(THEME_CHRISTMAS));
        assert!(active_themes_for_month(10).contains(THEME_HALLOWEEN));
        assert!(active_themes_for_month(4).is_empty());
    }

    #[test]
    fn wall_clock_weeks_are_capped() {
        let t0 = at(1_000);
        assert_eq!(elapsed_game_weeks(t0, at(1_650), 300, 10), 2);
        assert_eq!(elapsed_game_weeks(t0, at(31_000), 300, 10), 10);
        assert_eq!(elapsed_game_weeks(t0, at(970), 300, 10), 0);
    }
}
