//! Transaction records and payload validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, TallyError};

const MAX_TITLE_LEN: usize = 120;
const MAX_CATEGORY_LEN: usize = 60;
/// Largest accepted amount, in minor units.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;

/// Direction of a money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

/// A recorded transaction.
///
/// `amount` is in minor currency units and is always positive; `kind`
/// carries the sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub title: String,
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Build a new transaction from a payload that has already been validated.
    pub fn create(input: NewTransaction) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title.trim().to_string(),
            amount: input.amount,
            kind: input.kind,
            category: input.category.trim().to_string(),
            created_at: Utc::now(),
        }
    }

    /// Replace the editable fields, keeping `id` and `created_at`.
    pub fn apply(&mut self, input: NewTransaction) {
        self.title = input.title.trim().to_string();
        self.amount = input.amount;
        self.kind = input.kind;
        self.category = input.category.trim().to_string();
    }

    /// The amount with its sign: positive for income, negative for expense.
    pub fn signed_amount(&self) -> i64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

/// Payload for creating or replacing a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub title: String,
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: String,
}

impl NewTransaction {
    /// Check the payload, returning the first problem found.
    pub fn validate(&self) -> Result<()> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(TallyError::Validation("title is required".into()));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(TallyError::Validation(format!(
                "title must be at most {} characters",
                MAX_TITLE_LEN
            )));
        }

        if self.amount <= 0 {
            return Err(TallyError::Validation("amount must be greater than 0".into()));
        }
        if self.amount > MAX_AMOUNT {
            return Err(TallyError::Validation(format!(
                "amount must be at most {}",
                MAX_AMOUNT
            )));
        }

        let category = self.category.trim();
        if category.is_empty() {
            return Err(TallyError::Validation("category is required".into()));
        }
        if category.chars().count() > MAX_CATEGORY_LEN {
            return Err(TallyError::Validation(format!(
                "category must be at most {} characters",
                MAX_CATEGORY_LEN
            )));
        }

        Ok(())
    }
}

/// Totals over a set of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub income: i64,
    pub expense: i64,
    pub total: i64,
}

impl Balance {
    /// Sum the transactions, failing instead of wrapping when a total
    /// does not fit in an `i64`.
    pub fn from_transactions<'a, I>(transactions: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let overflow = || TallyError::Overflow("balance exceeds the representable range".into());

        let mut balance = Balance::default();
        for tx in transactions {
            let bucket = match tx.kind {
                TransactionKind::Income => &mut balance.income,
                TransactionKind::Expense => &mut balance.expense,
            };
            *bucket = bucket.checked_add(tx.amount).ok_or_else(overflow)?;
            balance.total = balance
                .total
                .checked_add(tx.signed_amount())
                .ok_or_else(overflow)?;
        }
        Ok(balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(title: &str, amount: i64, kind: TransactionKind) -> NewTransaction {
        NewTransaction {
            title: title.to_string(),
            amount,
            kind,
            category: "misc".to_string(),
        }
    }

    #[test]
    fn test_valid_payload() {
        assert!(payload("Salary", 500_000, TransactionKind::Income)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_blank_title_rejected() {
        let err = payload("   ", 100, TransactionKind::Expense)
            .validate()
            .unwrap_err();
        assert_eq!(err.to_string(), "title is required");
    }

    #[test]
    fn test_long_title_rejected() {
        let title = "x".repeat(121);
        assert!(payload(&title, 100, TransactionKind::Expense).validate().is_err());
        let title = "x".repeat(120);
        assert!(payload(&title, 100, TransactionKind::Expense).validate().is_ok());
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        assert!(payload("Rent", 0, TransactionKind::Expense).validate().is_err());
        assert!(payload("Rent", -5, TransactionKind::Expense).validate().is_err());
    }

    #[test]
    fn test_blank_category_rejected() {
        let mut input = payload("Rent", 100, TransactionKind::Expense);
        input.category = String::new();
        assert!(matches!(input.validate(), Err(TallyError::Validation(_))));
    }

    #[test]
    fn test_create_trims_fields() {
        let mut input = payload("  Coffee ", 350, TransactionKind::Expense);
        input.category = " food ".to_string();
        let tx = Transaction::create(input);
        assert_eq!(tx.title, "Coffee");
        assert_eq!(tx.category, "food");
        assert_eq!(tx.signed_amount(), -350);
    }

    #[test]
    fn test_apply_keeps_identity() {
        let mut tx = Transaction::create(payload("Coffee", 350, TransactionKind::Expense));
        let (id, created_at) = (tx.id, tx.created_at);

        tx.apply(payload("Refund", 350, TransactionKind::Income));
        assert_eq!(tx.id, id);
        assert_eq!(tx.created_at, created_at);
        assert_eq!(tx.title, "Refund");
        assert_eq!(tx.kind, TransactionKind::Income);
    }

    #[test]
    fn test_balance() {
        let txs = vec![
            Transaction::create(payload("Salary", 1000, TransactionKind::Income)),
            Transaction::create(payload("Rent", 700, TransactionKind::Expense)),
            Transaction::create(payload("Food", 400, TransactionKind::Expense)),
        ];
        let balance = Balance::from_transactions(&txs).unwrap();
        assert_eq!(
            balance,
            Balance {
                income: 1000,
                expense: 1100,
                total: -100
            }
        );
    }

    #[test]
    fn test_amount_upper_bound() {
        assert!(payload("Lottery", MAX_AMOUNT, TransactionKind::Income)
            .validate()
            .is_ok());

        let err = payload("Lottery", MAX_AMOUNT + 1, TransactionKind::Income)
            .validate()
            .unwrap_err();
        assert!(matches!(err, TallyError::Validation(_)));
        assert!(payload("Lottery", i64::MAX, TransactionKind::Income)
            .validate()
            .is_err());
    }

    #[test]
    fn test_balance_overflow_is_an_error() {
        let mut tx = Transaction::create(payload("Lottery", 1, TransactionKind::Income));
        tx.amount = i64::MAX;
        let txs = vec![tx.clone(), tx];

        let result = Balance::from_transactions(&txs);
        assert!(matches!(result, Err(TallyError::Overflow(_))));
    }

    #[test]
    fn test_balance_of_extremes_fits() {
        let mut income = Transaction::create(payload("Big", 1, TransactionKind::Income));
        income.amount = i64::MAX;
        let mut expense = Transaction::create(payload("Big", 1, TransactionKind::Expense));
        expense.amount = i64::MAX;

        let balance = Balance::from_transactions(&[income, expense]).unwrap();
        assert_eq!(balance.total, 0);
    }

    #[test]
    fn test_json_shape() {
        let tx = Transaction::create(payload("Salary", 1000, TransactionKind::Income));
        let value = serde_json::to_value(&tx).unwrap();
        assert_eq!(value["type"], "income");
        assert!(value["createdAt"].is_string());
        assert_eq!(value["amount"], 1000);
    }
}
