use crate::{calendar::DateRange, CURRENCY_PRECISION};
use log::{debug, trace};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// The smallest amount a split can express, and the tolerance for a hand edited split
const CENT: Decimal = dec!(0.01);

/// The share of a limit assigned to one period of a financial month
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodAllocation {
    /// 1-based, without gaps
    pub period_index: u32,
    pub amount: Decimal,
}

#[derive(Error, Debug, Eq, PartialEq)]
pub enum AllocationError {
    #[error("the limit {0} is negative")]
    NegativeLimit(Decimal),
    #[error("the limit {0} has more than 2 decimal places")]
    CurrencyPrecision(Decimal),
    #[error("a limit must be split into at least one period")]
    NoPeriods,
    #[error("expected {expected} weights but got {actual}")]
    WeightCountMismatch { expected: usize, actual: usize },
    #[error("weights must be non-negative and add up to more than zero")]
    InvalidWeights,
    #[error("the amounts are too large to add up")]
    Overflow,
}

impl PeriodAllocation {
    pub fn new(period_index: u32, amount: Decimal) -> Self {
        PeriodAllocation {
            period_index,
            amount,
        }
    }
}

/// Split `limit` across `periods` in proportion to the number of days in each.
///
/// Every period but the last is truncated to whole cents, which may leave a few cents
/// unallocated. The last period takes whatever remains, so the amounts always add up
/// to exactly `limit`.
pub fn split_by_days(
    limit: Decimal,
    periods: &[DateRange],
) -> Result<Vec<PeriodAllocation>, AllocationError> {
    check_limit(limit)?;

    let total_days: u32 = periods.iter().map(DateRange::days).sum();
    if total_days == 0 {
        return Ok(Vec::new());
    }

    let weights: Vec<Decimal> = periods.iter().map(|p| Decimal::from(p.days())).collect();
    let allocations = proportional(limit, &weights, Decimal::from(total_days))?;

    debug!(
        "split {} across {} periods ({} days): {:?}",
        limit,
        periods.len(),
        total_days,
        amounts(&allocations)
    );

    Ok(allocations)
}

/// Split `limit` into `period_count` parts, independent of any calendar.
///
/// Without weights the limit is divided evenly. Any cents that don't divide evenly
/// are handed out one at a time to the earliest periods, e.g. 100 over 3 periods is
/// 33.34, 33.33, 33.33.
///
/// With weights each period receives its weighted share truncated to whole cents, and
/// the last period takes the remainder, as `split_by_days` does.
pub fn auto_split_limit(
    limit: Decimal,
    period_count: usize,
    weights: Option<&[Decimal]>,
) -> Result<Vec<PeriodAllocation>, AllocationError> {
    check_limit(limit)?;

    if period_count == 0 {
        return Err(AllocationError::NoPeriods);
    }

    let allocations = match weights {
        Some(weights) => {
            if weights.len() != period_count {
                return Err(AllocationError::WeightCountMismatch {
                    expected: period_count,
                    actual: weights.len(),
                });
            }

            if weights.iter().any(|w| *w < Decimal::ZERO) {
                return Err(AllocationError::InvalidWeights);
            }

            let total_weight = sum(weights.iter().copied()).ok_or(AllocationError::Overflow)?;
            if total_weight <= Decimal::ZERO {
                return Err(AllocationError::InvalidWeights);
            }

            proportional(limit, weights, total_weight)?
        }
        None => uniform(limit, period_count),
    };

    debug!(
        "split {} into {} {} periods: {:?}",
        limit,
        period_count,
        if weights.is_some() { "weighted" } else { "uniform" },
        amounts(&allocations)
    );

    Ok(allocations)
}

/// Returns whether `allocations` add up to `limit`, give or take a cent.
///
/// Hand edited splits must pass this check before they are saved. A split that fails
/// it is never corrected here; that is up to the user. Amounts too large to add up
/// are never valid.
pub fn validate_split(limit: Decimal, allocations: &[PeriodAllocation]) -> bool {
    let total = match split_total(allocations) {
        Some(total) => total,
        None => {
            trace!("split of {} overflows", limit);
            return false;
        }
    };

    let valid = total
        .checked_sub(limit)
        .map_or(false, |difference| difference.abs() < CENT);

    if !valid {
        trace!("split totals {} but the limit is {}", total, limit);
    }

    valid
}

// `None` if the amounts overflow
pub(crate) fn split_total(allocations: &[PeriodAllocation]) -> Option<Decimal> {
    sum(allocations.iter().map(|a| a.amount))
}

fn sum<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |total, value| total.checked_add(value))
}

// Currency values can only be split cleanly if they are whole cents
pub(crate) fn check_limit(limit: Decimal) -> Result<(), AllocationError> {
    if limit < Decimal::ZERO {
        return Err(AllocationError::NegativeLimit(limit));
    }

    if limit.normalize().scale() > CURRENCY_PRECISION {
        return Err(AllocationError::CurrencyPrecision(limit));
    }

    Ok(())
}

// Weighted shares truncated to cents, with the last period absorbing any rounding
// error. Callers guarantee `weights` is non-empty and `total_weight` is positive.
fn proportional(
    limit: Decimal,
    weights: &[Decimal],
    total_weight: Decimal,
) -> Result<Vec<PeriodAllocation>, AllocationError> {
    let last = weights.len() - 1;
    let mut remaining = limit;

    weights
        .iter()
        .enumerate()
        .map(|(i, weight)| {
            let amount = if i == last {
                remaining
            } else {
                // Multiply before dividing to keep as much precision as possible
                let share = limit
                    .checked_mul(*weight)
                    .and_then(|scaled| scaled.checked_div(total_weight))
                    .map(truncate_to_cents)
                    .ok_or(AllocationError::Overflow)?;
                // Shares never add up to more than the limit
                remaining -= share;
                share
            };

            Ok(PeriodAllocation::new(i as u32 + 1, amount))
        })
        .collect()
}

fn uniform(limit: Decimal, period_count: usize) -> Vec<PeriodAllocation> {
    let count = Decimal::from(period_count as u64);
    let base = truncate_to_cents(limit / count);

    // As `limit` is whole cents, this is the whole number of cents left over, which is
    // always fewer than `period_count`.
    let extra_cents = (limit - base * count) / CENT;

    trace!(
        "uniform split of {}: base {} with {} extra cents",
        limit,
        base,
        extra_cents
    );

    (0..period_count)
        .map(|i| {
            let amount = if Decimal::from(i as u64) < extra_cents {
                base + CENT
            } else {
                base
            };

            PeriodAllocation::new(i as u32 + 1, amount)
        })
        .collect()
}

// Limits are never negative, so truncating is the same as rounding down
fn truncate_to_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(CURRENCY_PRECISION, RoundingStrategy::ToZero)
}

fn amounts(allocations: &[PeriodAllocation]) -> Vec<Decimal> {
    allocations.iter().map(|a| a.amount).collect()
}
