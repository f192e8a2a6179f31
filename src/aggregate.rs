use crate::{
    calendar::{DateRange, FinancialMonth},
    category::CategoryLimit,
    transaction::{Transaction, TransactionStatus},
};
use log::trace;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Both planned and completed transactions count towards a limit
pub const COUNTED_STATUSES: [TransactionStatus; 2] =
    [TransactionStatus::Planned, TransactionStatus::Done];

// Spending at or above this percentage of a limit is flagged as nearing the limit
const NEAR_LIMIT_PERCENTAGE: Decimal = dec!(80);
const FULL_PERCENTAGE: Decimal = dec!(100);

/// How much of a limit has been used
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LimitStatus {
    /// Capped at 100, and 0 when there is no limit
    pub percentage: Decimal,
    /// Negative once the limit is exceeded
    pub remaining: Decimal,
    pub is_over_limit: bool,
    pub is_near_limit: bool,
}

/// Spending against the limit of one period
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    pub period_index: u32,
    pub limit: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
}

/// Spending against a category's limit for a whole financial month
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub category_id: String,
    pub limit: Decimal,
    pub spent: Decimal,
    pub periods: Vec<PeriodStats>,
}

impl LimitStatus {
    pub fn new(spent: Decimal, limit: Decimal) -> Self {
        let percentage = if limit > Decimal::ZERO {
            // Too large to represent is well past the cap
            spent
                .checked_div(limit)
                .and_then(|share| share.checked_mul(FULL_PERCENTAGE))
                .map_or(FULL_PERCENTAGE, |p| p.min(FULL_PERCENTAGE))
        } else {
            Decimal::ZERO
        };
        let is_over_limit = spent > limit;

        LimitStatus {
            percentage,
            remaining: limit.saturating_sub(spent),
            is_over_limit,
            is_near_limit: percentage >= NEAR_LIMIT_PERCENTAGE && !is_over_limit,
        }
    }

    /// How far spending has gone past the limit, or zero
    pub fn overage(&self) -> Decimal {
        if self.remaining < Decimal::ZERO {
            -self.remaining
        } else {
            Decimal::ZERO
        }
    }
}

impl PeriodStats {
    pub fn status(&self) -> LimitStatus {
        LimitStatus::new(self.spent, self.limit)
    }
}

impl CategoryStats {
    pub fn status(&self) -> LimitStatus {
        LimitStatus::new(self.spent, self.limit)
    }
}

/// Total the transactions dated within `range` (inclusive) with one of `statuses`.
///
/// The total saturates rather than overflowing.
pub fn spent_in_range<'a, I>(
    transactions: I,
    range: &DateRange,
    statuses: &[TransactionStatus],
) -> Decimal
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .filter(|t| t.counts_towards(range, statuses))
        .fold(Decimal::ZERO, |total, t| total.saturating_add(t.amount))
}

/// Spending in each period a limit is split into.
///
/// The transactions should already belong to the limit's category. A period index
/// that doesn't exist in `month` (e.g. a fifth period saved against a four period
/// month) reports nothing spent.
pub fn period_stats<'a, I>(
    limit: &CategoryLimit,
    transactions: I,
    month: &FinancialMonth,
) -> Vec<PeriodStats>
where
    I: IntoIterator<Item = &'a Transaction> + Clone,
{
    let allocations = match limit.limits_by_period() {
        Some(allocations) => allocations,
        None => return Vec::new(),
    };

    allocations
        .iter()
        .map(|allocation| {
            let spent = match month.period(allocation.period_index) {
                Some(range) => {
                    spent_in_range(transactions.clone(), &range, &COUNTED_STATUSES)
                }
                None => {
                    trace!(
                        "period {} is not in financial month {}",
                        allocation.period_index,
                        month
                    );
                    Decimal::ZERO
                }
            };

            PeriodStats {
                period_index: allocation.period_index,
                limit: allocation.amount,
                spent,
                remaining: allocation.amount.saturating_sub(spent),
            }
        })
        .collect()
}

/// Spending against a category's limit over the financial month, with a breakdown
/// by period when the limit is split.
pub fn category_stats<'a, I>(
    category_id: &str,
    limit: &CategoryLimit,
    transactions: I,
    month: &FinancialMonth,
) -> CategoryStats
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let own: Vec<&Transaction> = transactions
        .into_iter()
        .filter(|t| t.category_id == category_id)
        .collect();

    let spent = spent_in_range(own.iter().copied(), &month.range(), &COUNTED_STATUSES);
    let periods = period_stats(limit, own.iter().copied(), month);

    trace!(
        "category {} spent {} of {} in {}",
        category_id,
        spent,
        limit.monthly_limit(),
        month
    );

    CategoryStats {
        category_id: category_id.to_owned(),
        limit: limit.monthly_limit(),
        spent,
        periods,
    }
}
