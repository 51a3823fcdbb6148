use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use log::debug;

use super::ledger_model::{
    Category, CategoryKind, MonthBreakdown, NetCashFlow, NewCategory, NewTransaction,
    Transaction, TransactionType,
};
use super::ledger_traits::{LedgerRepositoryTrait, LedgerServiceTrait};
use crate::errors::{Result, ValidationError};
use crate::events::{DomainEvent, DomainEventSink};
use crate::utils::calendar::{month_key, month_range};
use crate::utils::Clock;

/// Starter categories for a new household: (flow, kind, name, icon, sort).
const DEFAULT_CATEGORIES: &[(TransactionType, CategoryKind, &str, &str, u32)] = &[
    (TransactionType::Income, CategoryKind::Fixed, "Salary", "cash-outline", 10),
    (TransactionType::Income, CategoryKind::Variable, "Side income", "rocket-outline", 20),
    (TransactionType::Income, CategoryKind::Variable, "Transfers received", "swap-horizontal-outline", 30),
    (TransactionType::Income, CategoryKind::Variable, "Bonus", "gift-outline", 40),
    (TransactionType::Expense, CategoryKind::Fixed, "Rent / Mortgage", "home-outline", 110),
    (TransactionType::Expense, CategoryKind::Fixed, "Internet / Phone", "wifi-outline", 120),
    (TransactionType::Expense, CategoryKind::Fixed, "Power / Water", "flash-outline", 130),
    (TransactionType::Expense, CategoryKind::Fixed, "Subscriptions", "tv-outline", 140),
    (TransactionType::Expense, CategoryKind::Variable, "Food", "restaurant-outline", 210),
    (TransactionType::Expense, CategoryKind::Variable, "Transport", "car-outline", 220),
    (TransactionType::Expense, CategoryKind::Variable, "Health", "medkit-outline", 230),
    (TransactionType::Expense, CategoryKind::Variable, "Leisure", "game-controller-outline", 240),
    (TransactionType::Expense, CategoryKind::Variable, "Shopping", "cart-outline", 250),
];

/// Service for the household cash ledger.
pub struct LedgerService {
    repository: Arc<dyn LedgerRepositoryTrait>,
    clock: Arc<dyn Clock>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl LedgerService {
    pub fn new(
        repository: Arc<dyn LedgerRepositoryTrait>,
        clock: Arc<dyn Clock>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            repository,
            clock,
            event_sink,
        }
    }
}

/// Splits a month's transactions into income, fixed and variable expense.
/// Expenses without a known fixed category count as variable.
pub fn breakdown_transactions(
    month: NaiveDate,
    transactions: &[Transaction],
    categories: &[Category],
) -> MonthBreakdown {
    let kinds: HashMap<&str, CategoryKind> = categories
        .iter()
        .map(|c| (c.id.as_str(), c.kind))
        .collect();

    let mut breakdown = MonthBreakdown {
        month: month_key(month),
        income_cents: 0,
        fixed_expense_cents: 0,
        variable_expense_cents: 0,
    };
    for tx in transactions {
        match tx.tx_type {
            TransactionType::Income => breakdown.income_cents += tx.amount_cents,
            TransactionType::Expense => {
                let kind = tx
                    .category_id
                    .as_deref()
                    .and_then(|id| kinds.get(id).copied())
                    .unwrap_or(CategoryKind::Variable);
                match kind {
                    CategoryKind::Fixed => breakdown.fixed_expense_cents += tx.amount_cents,
                    CategoryKind::Variable => breakdown.variable_expense_cents += tx.amount_cents,
                }
            }
        }
    }
    breakdown
}

#[async_trait]
impl LedgerServiceTrait for LedgerService {
    async fn add_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        if new_transaction.amount_cents <= 0 {
            return Err(ValidationError::InvalidAmount(
                "Transaction amount must be positive".to_string(),
            )
            .into());
        }
        let note = new_transaction
            .note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        let normalized = NewTransaction {
            note,
            occurred_on: Some(
                new_transaction
                    .occurred_on
                    .unwrap_or_else(|| self.clock.today()),
            ),
            ..new_transaction
        };
        let household_id = normalized.household_id.clone();
        let created = self.repository.insert_transaction(normalized).await?;
        self.event_sink
            .emit(DomainEvent::transactions_changed(household_id));
        Ok(created)
    }

    async fn list_transactions_by_month(
        &self,
        household_id: &str,
        month: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        let (start, end) = month_range(month)?;
        self.repository
            .list_transactions(household_id, start, end)
            .await
    }

    async fn list_recent_transactions(
        &self,
        household_id: &str,
        days: u32,
    ) -> Result<Vec<Transaction>> {
        let today = self.clock.today();
        let invalid = || ValidationError::InvalidDate(format!("{} days around {}", days, today));
        let start = today
            .checked_sub_days(Days::new(u64::from(days.max(1))))
            .ok_or_else(invalid)?;
        let end = today.checked_add_days(Days::new(1)).ok_or_else(invalid)?;
        self.repository
            .list_transactions(household_id, start, end)
            .await
    }

    async fn net_between(
        &self,
        household_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<NetCashFlow> {
        let transactions = self
            .repository
            .list_transactions(household_id, start, end)
            .await?;
        let net = NetCashFlow::from_transactions(&transactions);
        debug!(
            "Net for household {} in [{}, {}): {} cents",
            household_id, start, end, net.net_cents
        );
        Ok(net)
    }

    async fn monthly_net(&self, household_id: &str, month: NaiveDate) -> Result<NetCashFlow> {
        let (start, end) = month_range(month)?;
        self.net_between(household_id, start, end).await
    }

    async fn month_breakdown(
        &self,
        household_id: &str,
        month: NaiveDate,
    ) -> Result<MonthBreakdown> {
        let (categories, transactions) = futures::try_join!(
            self.repository.list_categories(household_id),
            self.list_transactions_by_month(household_id, month)
        )?;
        Ok(breakdown_transactions(month, &transactions, &categories))
    }

    async fn list_categories(
        &self,
        household_id: &str,
        flow: Option<TransactionType>,
    ) -> Result<Vec<Category>> {
        let categories = self.repository.list_categories(household_id).await?;
        Ok(match flow {
            Some(flow) => categories.into_iter().filter(|c| c.flow == flow).collect(),
            None => categories,
        })
    }

    async fn create_category(&self, new_category: NewCategory) -> Result<Category> {
        let name = new_category.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        let mut created = self
            .repository
            .insert_categories(vec![NewCategory {
                name,
                ..new_category
            }])
            .await?;
        created.pop().ok_or_else(|| {
            crate::Error::Repository("Category insert returned no rows".to_string())
        })
    }

    async fn seed_default_categories(&self, household_id: &str) -> Result<usize> {
        if !self.repository.list_categories(household_id).await?.is_empty() {
            return Ok(0);
        }
        let defaults = DEFAULT_CATEGORIES
            .iter()
            .map(|(flow, kind, name, icon, sort)| NewCategory {
                household_id: household_id.to_string(),
                flow: *flow,
                kind: *kind,
                name: name.to_string(),
                icon: Some(icon.to_string()),
                sort: Some(*sort),
            })
            .collect();
        let inserted = self.repository.insert_categories(defaults).await?;
        debug!(
            "Seeded {} default categories for household {}",
            inserted.len(),
            household_id
        );
        Ok(inserted.len())
    }
}
