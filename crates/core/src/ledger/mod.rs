//! Ledger module - transactions, categories and cash-flow totals.

mod ledger_model;
mod ledger_service;
mod ledger_traits;

pub use ledger_model::{
    Category, CategoryKind, MonthBreakdown, NetCashFlow, NewCategory, NewTransaction,
    Transaction, TransactionType,
};
pub use ledger_service::{breakdown_transactions, LedgerService};
pub use ledger_traits::{LedgerRepositoryTrait, LedgerServiceTrait};
