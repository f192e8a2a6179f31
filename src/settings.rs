use crate::calendar::{CalendarError, FinancialMonth};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FINANCIAL_MONTH_START: u32 = 5;

const FIRST_DAY: u32 = 1;
const LAST_DAY: u32 = 31;

/// Application wide budgeting preferences.
///
/// These are owned by the settings store and passed into calendar calculations
/// explicitly. Changing the start day reinterprets every stored period index; nothing
/// is migrated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_financial_month_start")]
    financial_month_start: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            financial_month_start: DEFAULT_FINANCIAL_MONTH_START,
        }
    }
}

impl Settings {
    /// The day of the calendar month that financial months start on.
    ///
    /// Stored values are not validated when they are read back, so they are clamped
    /// here as well as on the way in.
    pub fn financial_month_start(&self) -> u32 {
        clamp_day(self.financial_month_start)
    }

    /// Any day outside 1 - 31 is clamped to the nearest valid day.
    pub fn set_financial_month_start(&mut self, day: u32) -> &mut Self {
        self.financial_month_start = clamp_day(day);
        self
    }

    pub fn financial_month(&self, month: u32, year: i32) -> Result<FinancialMonth, CalendarError> {
        FinancialMonth::new(month, year, self.financial_month_start())
    }

    /// The financial month that `date` falls in
    pub fn financial_month_containing(
        &self,
        date: NaiveDate,
    ) -> Result<FinancialMonth, CalendarError> {
        FinancialMonth::containing(date, self.financial_month_start())
    }
}

fn default_financial_month_start() -> u32 {
    DEFAULT_FINANCIAL_MONTH_START
}

fn clamp_day(day: u32) -> u32 {
    day.max(FIRST_DAY).min(LAST_DAY)
}
