//! Database models for the ledger.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use hearth_core::ledger::{
    Category, CategoryKind, NewCategory, NewTransaction, Transaction, TransactionType,
};

#[derive(Queryable, Selectable, Insertable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub household_id: String,
    pub created_by: Option<String>,
    pub tx_type: String,
    pub amount_cents: i64,
    pub note: Option<String>,
    pub category_id: Option<String>,
    pub occurred_on: NaiveDate,
    pub created_at: NaiveDateTime,
}

#[derive(Queryable, Selectable, Insertable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CategoryDB {
    pub id: String,
    pub household_id: String,
    pub flow: String,
    pub kind: String,
    pub name: String,
    pub icon: Option<String>,
    pub sort: i32,
}

impl TransactionDB {
    /// A transaction without a date is booked on `today`.
    pub fn from_new(
        new_transaction: NewTransaction,
        id: String,
        today: NaiveDate,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            household_id: new_transaction.household_id,
            created_by: Some(new_transaction.created_by),
            tx_type: new_transaction.tx_type.as_str().to_string(),
            amount_cents: new_transaction.amount_cents,
            note: new_transaction.note,
            category_id: new_transaction.category_id,
            occurred_on: new_transaction.occurred_on.unwrap_or(today),
            created_at: now,
        }
    }
}

impl From<TransactionDB> for Transaction {
    fn from(db: TransactionDB) -> Self {
        Self {
            id: db.id,
            household_id: db.household_id,
            created_by: db.created_by,
            tx_type: TransactionType::from_str_lossy(&db.tx_type),
            amount_cents: db.amount_cents,
            note: db.note,
            category_id: db.category_id,
            occurred_on: db.occurred_on,
            created_at: Some(db.created_at),
        }
    }
}

impl CategoryDB {
    pub fn from_new(new_category: NewCategory, id: String) -> Self {
        Self {
            id,
            household_id: new_category.household_id,
            flow: new_category.flow.as_str().to_string(),
            kind: new_category.kind.as_str().to_string(),
            name: new_category.name,
            icon: new_category.icon,
            sort: new_category
                .sort
                .map_or(0, |sort| i32::try_from(sort).unwrap_or(i32::MAX)),
        }
    }
}

impl From<CategoryDB> for Category {
    fn from(db: CategoryDB) -> Self {
        Self {
            id: db.id,
            household_id: db.household_id,
            flow: TransactionType::from_str_lossy(&db.flow),
            kind: CategoryKind::from_str_lossy(&db.kind),
            name: db.name,
            icon: db.icon,
            sort: u32::try_from(db.sort).unwrap_or(0),
        }
    }
}
