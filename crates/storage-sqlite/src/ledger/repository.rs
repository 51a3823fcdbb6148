use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use uuid::Uuid;

use hearth_core::ledger::{
    Category, LedgerRepositoryTrait, NewCategory, NewTransaction, Transaction,
};
use hearth_core::Result;

use super::model::{CategoryDB, TransactionDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{categories, transactions};

pub struct LedgerRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl LedgerRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        LedgerRepository { pool, writer }
    }
}

#[async_trait]
impl LedgerRepositoryTrait for LedgerRepository {
    async fn list_transactions(
        &self,
        household_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = transactions::table
            .filter(transactions::household_id.eq(household_id))
            .filter(transactions::occurred_on.ge(start))
            .filter(transactions::occurred_on.lt(end))
            .order((
                transactions::occurred_on.desc(),
                transactions::created_at.desc(),
            ))
            .select(TransactionDB::as_select())
            .load(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    async fn insert_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        let now = Utc::now().naive_utc();
        let row =
            TransactionDB::from_new(new_transaction, Uuid::new_v4().to_string(), now.date(), now);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Transaction> {
                diesel::insert_into(transactions::table)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                Ok(Transaction::from(row))
            })
            .await
    }

    async fn list_categories(&self, household_id: &str) -> Result<Vec<Category>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = categories::table
            .filter(categories::household_id.eq(household_id))
            .order((categories::sort.asc(), categories::name.asc()))
            .select(CategoryDB::as_select())
            .load(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn insert_categories(&self, new_categories: Vec<NewCategory>) -> Result<Vec<Category>> {
        let rows: Vec<CategoryDB> = new_categories
            .into_iter()
            .map(|category| CategoryDB::from_new(category, Uuid::new_v4().to_string()))
            .collect();
        self.writer
            .exec(
                move |conn: &mut SqliteConnection| -> Result<Vec<Category>> {
                    diesel::insert_into(categories::table)
                        .values(&rows)
                        .execute(conn)
                        .into_core()?;
                    Ok(rows.into_iter().map(Category::from).collect())
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use hearth_core::ledger::{CategoryKind, TransactionType};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn expense(household_id: &str, amount_cents: i64, occurred_on: NaiveDate) -> NewTransaction {
        NewTransaction {
            household_id: household_id.to_string(),
            created_by: "u1".to_string(),
            tx_type: TransactionType::Expense,
            amount_cents,
            note: None,
            category_id: None,
            occurred_on: Some(occurred_on),
        }
    }

    #[tokio::test]
    async fn test_list_transactions_is_half_open_and_newest_first() {
        let (pool, writer, _dir) = test_database();
        let repo = LedgerRepository::new(pool, writer);
        repo.insert_transaction(expense("hh", 100, d(2026, 3, 1)))
            .await
            .unwrap();
        repo.insert_transaction(expense("hh", 200, d(2026, 3, 31)))
            .await
            .unwrap();
        repo.insert_transaction(expense("hh", 300, d(2026, 4, 1)))
            .await
            .unwrap();
        repo.insert_transaction(expense("other", 400, d(2026, 3, 10)))
            .await
            .unwrap();

        let listed = repo
            .list_transactions("hh", d(2026, 3, 1), d(2026, 4, 1))
            .await
            .unwrap();
        let amounts: Vec<i64> = listed.iter().map(|tx| tx.amount_cents).collect();
        assert_eq!(amounts, vec![200, 100]);
        assert_eq!(listed[0].tx_type, TransactionType::Expense);
    }

    #[tokio::test]
    async fn test_categories_sorted_by_sort_then_name() {
        let (pool, writer, _dir) = test_database();
        let repo = LedgerRepository::new(pool, writer);
        let new_category = |name: &str, sort: u32| NewCategory {
            household_id: "hh".to_string(),
            flow: TransactionType::Expense,
            kind: CategoryKind::Variable,
            name: name.to_string(),
            icon: None,
            sort: Some(sort),
        };
        let inserted = repo
            .insert_categories(vec![
                new_category("Pharmacy", 2),
                new_category("Groceries", 1),
                new_category("Leisure", 2),
            ])
            .await
            .unwrap();
        assert_eq!(inserted.len(), 3);

        let names: Vec<String> = repo
            .list_categories("hh")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Groceries", "Leisure", "Pharmacy"]);
    }
}
