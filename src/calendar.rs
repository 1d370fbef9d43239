//! Synthetic business-week calendar for apprenticeship years.
//!
//! No dates are stored with the records.  Every apprenticeship year starts on September 1st (or the
//! Monday after, when that day falls on a weekend) and each reported week occupies the next
//! Monday–Friday slot.  Public holidays are not taken into account.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use log::warn;

use crate::model::{Week, Year};

/// Format used for every date printed in the report.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Date range covered by a single reported week.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeekRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekRange {
    /// Builds the range running from `start` to the Friday of the same week.
    ///
    /// `start` must fall on a weekday.
    pub fn starting_at(start: NaiveDate) -> Self {
        let offset = 4 - i64::from(start.weekday().num_days_from_monday());
        Self {
            start,
            end: start + Duration::days(offset),
        }
    }

    /// Returns the range of week 1 in the given apprenticeship year.
    ///
    /// Yields `None` only when the resulting calendar year is outside of what `chrono` can
    /// represent.
    pub fn first_week(start_year: i32, year_number: u8) -> Option<Self> {
        academic_year_start(start_year, year_number).map(Self::starting_at)
    }

    /// Returns the range of the following business week.
    pub fn following(&self) -> Self {
        Self::starting_at(self.end + Duration::days(3))
    }

    /// Returns the Sunday on or after the end of the week, used to date the signatures.
    pub fn signature_date(&self) -> NaiveDate {
        let until_sunday = 6 - i64::from(self.end.weekday().num_days_from_monday());
        self.end + Duration::days(until_sunday)
    }

    /// Formats the range as "dd.mm.yyyy bis dd.mm.yyyy".
    pub fn label(&self) -> String {
        format!(
            "{} bis {}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

/// Returns the first working day of the given apprenticeship year.
pub fn academic_year_start(start_year: i32, year_number: u8) -> Option<NaiveDate> {
    let calendar_year = start_year.checked_add(i32::from(year_number))? - 1;
    let first = NaiveDate::from_ymd_opt(calendar_year, 9, 1)?;
    let start = match first.weekday() {
        Weekday::Sat => first + Duration::days(2),
        Weekday::Sun => first + Duration::days(1),
        _ => first,
    };
    Some(start)
}

/// Assigns a date range to every week of `year`, in the order the weeks are stored.
///
/// The ranges form a chain: week 1 is anchored at the start of the apprenticeship year and every
/// other week takes the business week after the previous entry.  Weeks therefore have to be
/// ordered by week number; out-of-order input is logged and still mapped in the given order.
pub fn map_weeks(start_year: i32, year: &Year) -> Option<Vec<(&Week, WeekRange)>> {
    let anchor = WeekRange::first_week(start_year, year.year_number)?;

    let mut previous_number = 0;
    let mapped = year
        .weeks
        .iter()
        .scan(anchor, |cursor, week| {
            if week.week_number <= previous_number {
                warn!(
                    "Week {} of year {} follows week {}; dates will not match the week numbers",
                    week.week_number, year.year_number, previous_number
                );
            }
            previous_number = week.week_number;

            *cursor = if week.week_number == 1 {
                anchor
            } else {
                cursor.following()
            };
            Some((week, *cursor))
        })
        .collect();

    Some(mapped)
}
