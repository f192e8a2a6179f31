use crate::calendar::DateRange;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A recorded or planned movement of money.
///
/// Transactions are owned by the transaction store. Here they are only ever read, to
/// work out how much of a limit has been spent. Dates are calendar dates with no time
/// zone, compared exactly as they were recorded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount: Decimal,
    #[serde(default)]
    pub currency: String,
    pub category_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
    pub status: TransactionStatus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Savings,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Planned,
    Done,
}

#[derive(Error, Debug, PartialEq)]
pub enum TransactionError {
    #[error("transaction amounts cannot be negative (got {0})")]
    NegativeAmount(Decimal),
}

impl Transaction {
    pub fn new<I: Into<String>, C: Into<String>>(
        id: I,
        kind: TransactionType,
        amount: Decimal,
        category_id: C,
        date: NaiveDate,
        status: TransactionStatus,
    ) -> Result<Self, TransactionError> {
        // The direction of a transaction is given by its type, not its sign
        if amount < Decimal::ZERO {
            return Err(TransactionError::NegativeAmount(amount));
        }

        Ok(Transaction {
            id: id.into(),
            kind,
            amount,
            currency: String::new(),
            category_id: category_id.into(),
            date,
            description: String::new(),
            status,
        })
    }

    pub fn with_currency<S: Into<String>>(mut self, currency: S) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    /// Returns whether this transaction falls within `range` and has one of `statuses`
    pub fn counts_towards(&self, range: &DateRange, statuses: &[TransactionStatus]) -> bool {
        range.contains(self.date) && statuses.contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn new_transaction_negative_amount() {
        let result = Transaction::new(
            "t1",
            TransactionType::Expense,
            dec!(-5),
            "food",
            ymd(2024, 3, 5),
            TransactionStatus::Done,
        );
        assert_eq!(result.err(), Some(TransactionError::NegativeAmount(dec!(-5))));
    }

    #[test]
    fn new_transaction_with_details() {
        let t = Transaction::new(
            "t1",
            TransactionType::Expense,
            dec!(12.50),
            "food",
            ymd(2024, 3, 5),
            TransactionStatus::Planned,
        )
        .unwrap()
        .with_currency("UAH")
        .with_description("groceries");

        assert_eq!(t.currency, "UAH");
        assert_eq!(t.description, "groceries");
        assert_eq!(t.category_id, "food");
    }

    #[test]
    fn counts_towards_range_and_status() {
        let range = DateRange::new(ymd(2024, 3, 5), ymd(2024, 3, 9)).unwrap();
        let t = Transaction::new(
            "t1",
            TransactionType::Expense,
            dec!(10),
            "food",
            ymd(2024, 3, 9),
            TransactionStatus::Planned,
        )
        .unwrap();

        assert!(t.counts_towards(&range, &[TransactionStatus::Planned]));
        assert!(!t.counts_towards(&range, &[TransactionStatus::Done]));

        let later = DateRange::new(ymd(2024, 3, 10), ymd(2024, 3, 16)).unwrap();
        assert!(!t.counts_towards(&later, &[TransactionStatus::Planned]));
    }

    #[test]
    fn deserialize_store_record() {
        let json = r#"{
            "id": "a1",
            "type": "expense",
            "amount": 42.5,
            "currency": "UAH",
            "categoryId": "food",
            "date": "2024-03-05",
            "description": "market",
            "status": "done"
        }"#;

        let t: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(t.kind, TransactionType::Expense);
        assert_eq!(t.amount, dec!(42.5));
        assert_eq!(t.date, ymd(2024, 3, 5));
        assert_eq!(t.status, TransactionStatus::Done);
    }
}
