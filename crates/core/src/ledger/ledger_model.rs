//! Ledger domain models: transactions, categories and cash-flow aggregates.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Error, Result, ValidationError};
use crate::utils::payload::{
    cents_field, opt_string_field, opt_timestamp_field, opt_u32_field, string_field,
    ymd_prefix_field,
};

/// Direction of a cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Anything that is not explicitly income counts as an expense.
    pub fn from_str_lossy(text: &str) -> Self {
        if text.trim() == "income" {
            TransactionType::Income
        } else {
            TransactionType::Expense
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub household_id: String,
    pub created_by: Option<String>,
    pub tx_type: TransactionType,
    pub amount_cents: i64,
    pub note: Option<String>,
    pub category_id: Option<String>,
    pub occurred_on: NaiveDate,
    pub created_at: Option<NaiveDateTime>,
}

impl TryFrom<&Value> for Transaction {
    type Error = Error;

    fn try_from(row: &Value) -> Result<Self> {
        let occurred_on = ymd_prefix_field(row, "occurred_on")
            .ok_or_else(|| ValidationError::InvalidDate("occurred_on".to_string()))?;
        Ok(Transaction {
            id: string_field(row, "id")?,
            household_id: string_field(row, "household_id")?,
            created_by: opt_string_field(row, "created_by"),
            tx_type: opt_string_field(row, "type")
                .map(|t| TransactionType::from_str_lossy(&t))
                .unwrap_or(TransactionType::Expense),
            amount_cents: cents_field(row, "amount_cents"),
            note: opt_string_field(row, "note"),
            category_id: opt_string_field(row, "category_id"),
            occurred_on,
            created_at: opt_timestamp_field(row, "created_at"),
        })
    }
}

/// Input model for recording a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub household_id: String,
    pub created_by: String,
    pub tx_type: TransactionType,
    pub amount_cents: i64,
    pub note: Option<String>,
    pub category_id: Option<String>,
    /// Defaults to today when absent.
    pub occurred_on: Option<NaiveDate>,
}

/// Whether a category is a recurring commitment or discretionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Fixed,
    #[default]
    Variable,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Fixed => "fixed",
            CategoryKind::Variable => "variable",
        }
    }

    pub fn from_str_lossy(text: &str) -> Self {
        if text.trim() == "fixed" {
            CategoryKind::Fixed
        } else {
            CategoryKind::Variable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub household_id: String,
    pub flow: TransactionType,
    pub kind: CategoryKind,
    pub name: String,
    pub icon: Option<String>,
    pub sort: u32,
}

impl TryFrom<&Value> for Category {
    type Error = Error;

    fn try_from(row: &Value) -> Result<Self> {
        Ok(Category {
            id: string_field(row, "id")?,
            household_id: string_field(row, "household_id")?,
            flow: opt_string_field(row, "flow")
                .map(|f| TransactionType::from_str_lossy(&f))
                .unwrap_or(TransactionType::Expense),
            kind: opt_string_field(row, "kind")
                .map(|k| CategoryKind::from_str_lossy(&k))
                .unwrap_or_default(),
            name: opt_string_field(row, "name").unwrap_or_default(),
            icon: opt_string_field(row, "icon"),
            sort: opt_u32_field(row, "sort").unwrap_or(0),
        })
    }
}

/// Input model for creating a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub household_id: String,
    pub flow: TransactionType,
    pub kind: CategoryKind,
    pub name: String,
    pub icon: Option<String>,
    pub sort: Option<u32>,
}

/// Income and expense totals over a date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetCashFlow {
    pub income_cents: i64,
    pub expense_cents: i64,
    pub net_cents: i64,
}

impl NetCashFlow {
    pub fn from_transactions<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Self {
        let (income_cents, expense_cents) =
            transactions
                .into_iter()
                .fold((0i64, 0i64), |(income, expense), tx| match tx.tx_type {
                    TransactionType::Income => (income + tx.amount_cents, expense),
                    TransactionType::Expense => (income, expense + tx.amount_cents),
                });
        NetCashFlow {
            income_cents,
            expense_cents,
            net_cents: income_cents - expense_cents,
        }
    }
}

/// A month's expenses split by category kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBreakdown {
    /// `YYYY-MM`.
    pub month: String,
    pub income_cents: i64,
    pub fixed_expense_cents: i64,
    pub variable_expense_cents: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tx(tx_type: TransactionType, amount_cents: i64) -> Transaction {
        Transaction {
            id: "t".into(),
            household_id: "hh".into(),
            created_by: None,
            tx_type,
            amount_cents,
            note: None,
            category_id: None,
            occurred_on: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            created_at: None,
        }
    }

    #[test]
    fn test_net_cash_flow_sums_by_type() {
        let rows = vec![
            tx(TransactionType::Income, 500_000),
            tx(TransactionType::Expense, 120_050),
            tx(TransactionType::Expense, 30_000),
        ];
        let net = NetCashFlow::from_transactions(&rows);
        assert_eq!(net.income_cents, 500_000);
        assert_eq!(net.expense_cents, 150_050);
        assert_eq!(net.net_cents, 349_950);
        assert_eq!(NetCashFlow::from_transactions(std::iter::empty()), NetCashFlow::default());
    }

    #[test]
    fn test_transaction_from_untrusted_row() {
        let row = json!({
            "id": "t1",
            "household_id": "hh",
            "type": "income",
            "amount_cents": "1500",
            "occurred_on": "2026-03-04",
            "note": null,
        });
        let tx = Transaction::try_from(&row).unwrap();
        assert_eq!(tx.tx_type, TransactionType::Income);
        assert_eq!(tx.amount_cents, 1500);
        assert_eq!(tx.occurred_on, NaiveDate::from_ymd_opt(2026, 3, 4).unwrap());

        let missing_date = json!({ "id": "t2", "household_id": "hh", "amount_cents": null });
        assert!(Transaction::try_from(&missing_date).is_err());
    }

    #[test]
    fn test_category_kind_defaults_to_variable() {
        let row = json!({ "id": "c1", "household_id": "hh", "kind": "weird", "name": "Food" });
        let category = Category::try_from(&row).unwrap();
        assert_eq!(category.kind, CategoryKind::Variable);
        assert_eq!(category.flow, TransactionType::Expense);
        assert_eq!(category.sort, 0);
    }
}
