use chrono::{Datelike, Duration, NaiveDate};
use log::{debug, trace};
use std::fmt;
use thiserror::Error;

// Financial months are only modelled for four digit years. This keeps every date we
// derive from a month (including the following month's start day) well within the
// range `chrono` can represent.
const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

const MAX_START_DAY: u32 = 31;

// Periods are whole weeks, Sunday to Saturday
const WEEK_LENGTH: i64 = 7;

/// An inclusive span of calendar dates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
    days: u32,
}

/// A budgeting month which begins on a configurable day of the calendar month.
///
/// A financial month starting on the 5th of March runs until the 4th of April. Start
/// days that do not exist in a short month roll over into the following month, the
/// same way they would on a wall calendar (e.g. the 31st of April is the 1st of May).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FinancialMonth {
    month: u32,
    year: i32,
    start_day: u32,
}

/// Iterates the weekly periods of a `FinancialMonth`, in index order. Each call to
/// `FinancialMonth::periods` starts again from the first period.
#[derive(Clone, Debug)]
pub struct Periods {
    month: FinancialMonth,
    index: u32,
}

#[derive(Error, Debug, Eq, PartialEq)]
pub enum CalendarError {
    #[error("month {0} is not between 1 and 12")]
    InvalidMonth(u32),
    #[error("start day {0} is not between 1 and 31")]
    InvalidStartDay(u32),
    #[error("year {0} is outside the supported range 1 - 9999")]
    InvalidYear(i32),
}

impl DateRange {
    /// Returns `None` if `end` falls before `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        if end < start {
            return None;
        }

        // Note we add a day here as we are calculating length, not difference
        let days = (end - start).num_days() as u32 + 1;

        Some(DateRange { start, end, days })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the range, including both ends
    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start.format("%d.%m"),
            self.end.format("%d.%m")
        )
    }
}

impl FinancialMonth {
    pub fn new(month: u32, year: i32, start_day: u32) -> Result<Self, CalendarError> {
        if !(1..=12).contains(&month) {
            return Err(CalendarError::InvalidMonth(month));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(CalendarError::InvalidYear(year));
        }
        if !(1..=MAX_START_DAY).contains(&start_day) {
            return Err(CalendarError::InvalidStartDay(start_day));
        }

        Ok(FinancialMonth {
            month,
            year,
            start_day,
        })
    }

    /// Find the financial month that `date` belongs to.
    pub fn containing(date: NaiveDate, start_day: u32) -> Result<Self, CalendarError> {
        let mut month = FinancialMonth::new(date.month(), date.year(), start_day)?;

        // A date before this month's start day belongs to an earlier financial month.
        // Where the start day rolls over a short month (e.g. the 31st after February),
        // the date may sit two financial months back, hence the loop.
        while date < month.range().start {
            month = month.previous()?;
        }

        trace!("{} belongs to financial month {}", date, month);

        Ok(month)
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn start_day(&self) -> u32 {
        self.start_day
    }

    pub fn previous(&self) -> Result<Self, CalendarError> {
        if self.month == 1 {
            FinancialMonth::new(12, self.year - 1, self.start_day)
        } else {
            FinancialMonth::new(self.month - 1, self.year, self.start_day)
        }
    }

    pub fn next(&self) -> Result<Self, CalendarError> {
        if self.month == 12 {
            FinancialMonth::new(1, self.year + 1, self.start_day)
        } else {
            FinancialMonth::new(self.month + 1, self.year, self.start_day)
        }
    }

    /// The dates covered by this financial month.
    ///
    /// The month starts on `start_day` of the calendar month and ends the day before
    /// `start_day` of the following calendar month.
    pub fn range(&self) -> DateRange {
        let (next_month, next_year) = if self.month == 12 {
            (1, self.year + 1)
        } else {
            (self.month + 1, self.year)
        };

        let start = day_of_month(self.year, self.month, self.start_day as i64);
        let end = day_of_month(next_year, next_month, self.start_day as i64 - 1);

        // `end` is always a whole calendar month (less one day) after `start`
        DateRange::new(start, end).expect("financial month ends before it starts")
    }

    /// Returns the date range of the nth (1-based) weekly period in this month, or
    /// `None` if the month has fewer periods.
    ///
    /// Periods run Sunday to Saturday. The first period starts on the month's first
    /// day and the last period ends on the month's final day, so either may be
    /// shorter than a full week.
    pub fn period(&self, index: u32) -> Option<DateRange> {
        if index == 0 {
            return None;
        }

        let month = self.range();
        let week_start = self
            .first_week_start()
            .checked_add_signed(Duration::weeks(index as i64 - 1))?;

        if week_start > month.end {
            trace!("period {} is beyond financial month {}", index, self);
            return None;
        }

        let start = week_start.max(month.start);
        let end = (week_start + Duration::days(WEEK_LENGTH - 1)).min(month.end);

        DateRange::new(start, end)
    }

    /// Returns every period in this month, in order.
    pub fn periods(&self) -> Periods {
        Periods {
            month: *self,
            index: 0,
        }
    }

    pub fn all_periods(&self) -> Vec<DateRange> {
        let periods: Vec<DateRange> = self.periods().collect();

        debug!(
            "financial month {} ({}) has {} periods",
            self,
            self.range(),
            periods.len()
        );

        periods
    }

    /// Returns the index of the period that `today` falls in.
    ///
    /// Only this month's start day is used. The index is counted within whichever
    /// financial month `today` belongs to, which may be a month or two before the
    /// calendar month of `today` when the start day rolls over a short month.
    pub fn current_period_index(&self, today: NaiveDate) -> Result<u32, CalendarError> {
        let month = FinancialMonth::containing(today, self.start_day)?;

        // `today` is on or after the month start, so never before the first Sunday
        let elapsed = (today - month.first_week_start()).num_days();
        let index = (elapsed / WEEK_LENGTH) as u32 + 1;

        trace!(
            "{} is in period {} of financial month {}",
            today,
            index,
            month
        );

        Ok(index)
    }

    // The Sunday on or before the first day of the month. Period n begins n - 1 weeks
    // later, clamped to the month's bounds.
    fn first_week_start(&self) -> NaiveDate {
        let start = self.range().start;
        start - Duration::days(start.weekday().num_days_from_sunday() as i64)
    }
}

impl fmt::Display for FinancialMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}/{} (from day {})",
            self.month, self.year, self.start_day
        )
    }
}

impl Iterator for Periods {
    type Item = DateRange;

    fn next(&mut self) -> Option<Self::Item> {
        self.index += 1;
        self.month.period(self.index)
    }
}

// Resolve a day of the month, normalising days that fall outside it. Days beyond the
// end of the month roll into the next one, and day 0 is the last day of the previous
// month.
fn day_of_month(year: i32, month: u32, day: i64) -> NaiveDate {
    // Years and months are validated by `FinancialMonth::new`
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("invalid year or month");
    first + Duration::days(day - 1)
}
