/*
 *  countdown/time_remaining.rs
 *
 *  matrix-countdown - countdowns for LED matrix signage
 *  (c) 2020-26 Stuart Hunter
 *
 *  Midnight-anchored time remaining until a target date
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::fmt;
use chrono::{NaiveDate, NaiveDateTime};

/// Text shown on the target day
pub const TODAY_LABEL: &str = "TODAY!";

/// Time left until a countdown's target date.
///
/// The deadline is local midnight: a target of tomorrow is one day away
/// regardless of the time of day, a target of today is due, and anything
/// before today has expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRemaining {
    /// Whole calendar days until the target (always >= 1)
    Days(u32),

    /// Target is today; hours and minutes left before the day ends
    DueToday { hours: u32, minutes: u32 },

    /// Target day is over
    Expired { days_ago: u32 },
}

impl TimeRemaining {
    pub fn compute(target: NaiveDate, now: NaiveDateTime) -> Self {
        let today = now.date();
        let delta = (target - today).num_days();

        if delta > 0 {
            TimeRemaining::Days(saturate(delta))
        } else if delta == 0 {
            let (hours, minutes) = target
                .succ_opt()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|end_of_day| {
                    let left = end_of_day - now;
                    (saturate(left.num_hours()), saturate(left.num_minutes() % 60))
                })
                .unwrap_or((0, 0));
            TimeRemaining::DueToday { hours, minutes }
        } else {
            TimeRemaining::Expired { days_ago: saturate(-delta) }
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, TimeRemaining::Expired { .. })
    }

    pub fn is_due_today(&self) -> bool {
        matches!(self, TimeRemaining::DueToday { .. })
    }

    /// Display text for the value line
    pub fn label(&self) -> String {
        match *self {
            TimeRemaining::Days(1) => "1 Day".to_string(),
            TimeRemaining::Days(n) => format!("{} Days", n),
            TimeRemaining::DueToday { .. } => TODAY_LABEL.to_string(),
            TimeRemaining::Expired { days_ago: 1 } => "1 day ago".to_string(),
            TimeRemaining::Expired { days_ago } => format!("{} days ago", days_ago),
        }
    }
}

impl fmt::Display for TimeRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

fn saturate(v: i64) -> u32 {
    u32::try_from(v.max(0)).unwrap_or(u32::MAX)
}
