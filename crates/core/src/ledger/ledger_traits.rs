use async_trait::async_trait;
use chrono::NaiveDate;

use super::ledger_model::{
    Category, MonthBreakdown, NetCashFlow, NewCategory, NewTransaction, Transaction,
    TransactionType,
};
use crate::errors::Result;

/// Trait for ledger repository operations.
#[async_trait]
pub trait LedgerRepositoryTrait: Send + Sync {
    /// Transactions with `start <= occurred_on < end`, newest first.
    async fn list_transactions(
        &self,
        household_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>>;
    async fn insert_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction>;
    /// Categories ordered by sort key, then name.
    async fn list_categories(&self, household_id: &str) -> Result<Vec<Category>>;
    async fn insert_categories(&self, categories: Vec<NewCategory>) -> Result<Vec<Category>>;
}

/// Trait for ledger service operations.
#[async_trait]
pub trait LedgerServiceTrait: Send + Sync {
    async fn add_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction>;
    async fn list_transactions_by_month(
        &self,
        household_id: &str,
        month: NaiveDate,
    ) -> Result<Vec<Transaction>>;
    async fn list_recent_transactions(
        &self,
        household_id: &str,
        days: u32,
    ) -> Result<Vec<Transaction>>;
    /// Totals over `[start, end)`.
    async fn net_between(
        &self,
        household_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<NetCashFlow>;
    async fn monthly_net(&self, household_id: &str, month: NaiveDate) -> Result<NetCashFlow>;
    async fn month_breakdown(&self, household_id: &str, month: NaiveDate)
        -> Result<MonthBreakdown>;
    async fn list_categories(
        &self,
        household_id: &str,
        flow: Option<TransactionType>,
    ) -> Result<Vec<Category>>;
    async fn create_category(&self, new_category: NewCategory) -> Result<Category>;
    /// Inserts the starter categories unless the household already has some.
    async fn seed_default_categories(&self, household_id: &str) -> Result<usize>;
}
