use crate::{
    allocation::{self, AllocationError, PeriodAllocation},
    calendar::FinancialMonth,
};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a category's limit was divided between periods
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionType {
    Uniform,
    Weighted,
}

/// The spending limit configured for a category.
///
/// This is stored verbatim by the category store. A limit is either a single monthly
/// amount, or a monthly amount split between the weekly periods of the financial
/// month. When split, the period amounts add up to the monthly limit.
///
/// A `CategoryLimit` is never edited in place. Changing the split produces a new
/// value which replaces the old one wholesale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryLimit {
    monthly_limit: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    limits_by_period: Option<Vec<PeriodAllocation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    distribution_type: Option<DistributionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weights: Option<Vec<Decimal>>,
}

#[derive(Error, Debug, PartialEq)]
pub enum CategoryError {
    #[error("could not split the limit")]
    Allocation(#[from] AllocationError),
    #[error("period amounts add up to {actual} but the monthly limit is {expected}")]
    SplitMismatch { expected: Decimal, actual: Decimal },
    #[error("period {found} is out of sequence, expected period {expected}")]
    PeriodSequence { expected: u32, found: u32 },
}

impl CategoryLimit {
    /// A monthly limit that is not split into periods
    pub fn new(monthly_limit: Decimal) -> Result<Self, CategoryError> {
        allocation::check_limit(monthly_limit)?;

        Ok(CategoryLimit {
            monthly_limit,
            limits_by_period: None,
            distribution_type: None,
            weights: None,
        })
    }

    /// Split `monthly_limit` across the periods of `month` by their number of days.
    pub fn split_by_days(
        monthly_limit: Decimal,
        month: &FinancialMonth,
    ) -> Result<Self, CategoryError> {
        let periods = month.all_periods();
        let allocations = allocation::split_by_days(monthly_limit, &periods)?;

        Ok(CategoryLimit {
            monthly_limit,
            limits_by_period: Some(allocations),
            distribution_type: Some(DistributionType::Uniform),
            weights: None,
        })
    }

    /// Split `monthly_limit` across the periods of `month` using one weight per period.
    pub fn split_weighted(
        monthly_limit: Decimal,
        weights: Vec<Decimal>,
        month: &FinancialMonth,
    ) -> Result<Self, CategoryError> {
        let count = month.periods().count();
        let allocations =
            allocation::auto_split_limit(monthly_limit, count, Some(weights.as_slice()))?;

        Ok(CategoryLimit {
            monthly_limit,
            limits_by_period: Some(allocations),
            distribution_type: Some(DistributionType::Weighted),
            weights: Some(weights),
        })
    }

    /// Replace the period split with hand edited amounts.
    ///
    /// The amounts must be numbered 1, 2, 3... and add up to the monthly limit to
    /// within a cent. Nothing is adjusted to make them fit; a split that doesn't add up
    /// is rejected and this limit stays as it was.
    pub fn with_allocations(
        &self,
        allocations: Vec<PeriodAllocation>,
        distribution_type: DistributionType,
    ) -> Result<Self, CategoryError> {
        for (i, a) in allocations.iter().enumerate() {
            let expected = i as u32 + 1;
            if a.period_index != expected {
                return Err(CategoryError::PeriodSequence {
                    expected,
                    found: a.period_index,
                });
            }
        }

        if !allocation::validate_split(self.monthly_limit, &allocations) {
            let actual =
                allocation::split_total(&allocations).ok_or(AllocationError::Overflow)?;
            return Err(CategoryError::SplitMismatch {
                expected: self.monthly_limit,
                actual,
            });
        }

        debug!(
            "replacing split of {} with {} periods",
            self.monthly_limit,
            allocations.len()
        );

        // Hand edits keep the weights they started from, if any, for the next re-split
        let weights = match distribution_type {
            DistributionType::Weighted => self.weights.clone(),
            DistributionType::Uniform => None,
        };

        Ok(CategoryLimit {
            monthly_limit: self.monthly_limit,
            limits_by_period: Some(allocations),
            distribution_type: Some(distribution_type),
            weights,
        })
    }

    /// Drop the period split, keeping only the monthly limit.
    pub fn without_periods(&self) -> Self {
        CategoryLimit {
            monthly_limit: self.monthly_limit,
            limits_by_period: None,
            distribution_type: None,
            weights: None,
        }
    }

    pub fn monthly_limit(&self) -> Decimal {
        self.monthly_limit
    }

    pub fn limits_by_period(&self) -> Option<&[PeriodAllocation]> {
        self.limits_by_period.as_deref()
    }

    pub fn distribution_type(&self) -> Option<DistributionType> {
        self.distribution_type
    }

    pub fn weights(&self) -> Option<&[Decimal]> {
        self.weights.as_deref()
    }

    pub fn has_periods(&self) -> bool {
        self.limits_by_period
            .as_ref()
            .map_or(false, |periods| !periods.is_empty())
    }

    /// The amount allocated to a period, if the limit is split and has that period
    pub fn period_limit(&self, period_index: u32) -> Option<Decimal> {
        self.limits_by_period
            .as_ref()?
            .iter()
            .find(|a| a.period_index == period_index)
            .map(|a| a.amount)
    }

    /// Returns whether a split limit still adds up. Limits read back from storage are
    /// not checked on the way in, so this is worth asking before trusting them.
    pub fn is_valid(&self) -> bool {
        match &self.limits_by_period {
            Some(allocations) => allocation::validate_split(self.monthly_limit, allocations),
            None => true,
        }
    }
}
