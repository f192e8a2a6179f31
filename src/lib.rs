mod aggregate;
mod allocation;
mod calendar;
mod category;
mod settings;
mod transaction;

pub use aggregate::{
    category_stats, period_stats, spent_in_range, CategoryStats, LimitStatus, PeriodStats,
    COUNTED_STATUSES,
};
pub use allocation::{
    auto_split_limit, split_by_days, validate_split, AllocationError, PeriodAllocation,
};
pub use calendar::{CalendarError, DateRange, FinancialMonth, Periods};
pub use category::{CategoryError, CategoryLimit, DistributionType};
pub use settings::{Settings, DEFAULT_FINANCIAL_MONTH_START};
pub use transaction::{Transaction, TransactionError, TransactionStatus, TransactionType};

// Limits are split in whole cents.
// @todo Take the minor unit from the currency (ISO 4217) instead of assuming cents.
const CURRENCY_PRECISION: u32 = 2;
