use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;

use hearth_core::closures::{ClosureRepositoryTrait, CycleClosure};
use hearth_core::Result;

use super::model::CycleClosureDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::cycle_closures;

pub struct ClosureRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ClosureRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        ClosureRepository { pool, writer }
    }
}

#[async_trait]
impl ClosureRepositoryTrait for ClosureRepository {
    async fn list_closures(
        &self,
        household_id: &str,
        cycle_keys: &[String],
    ) -> Result<Vec<CycleClosure>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = cycle_closures::table
            .filter(cycle_closures::household_id.eq(household_id))
            .filter(cycle_closures::cycle_key.eq_any(cycle_keys))
            .select(CycleClosureDB::as_select())
            .load(&mut conn)
            .into_core()?;
        Ok(rows.into_iter().map(CycleClosure::from).collect())
    }

    async fn upsert_closure(&self, closure: CycleClosure) -> Result<CycleClosure> {
        let row = CycleClosureDB::from_domain(closure, Utc::now().naive_utc());
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<CycleClosure> {
                diesel::insert_into(cycle_closures::table)
                    .values(&row)
                    .on_conflict((cycle_closures::household_id, cycle_closures::cycle_key))
                    .do_update()
                    .set(&row.changes())
                    .execute(conn)
                    .into_core()?;
                let stored = cycle_closures::table
                    .find((&row.household_id, &row.cycle_key))
                    .select(CycleClosureDB::as_select())
                    .first(conn)
                    .into_core()?;
                Ok(CycleClosure::from(stored))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use chrono::NaiveDate;
    use hearth_core::schedule::{PayCycle, PayScheduleMode};

    fn closure_for(cycle: &PayCycle, net_cents: i64) -> CycleClosure {
        CycleClosure {
            household_id: "hh".to_string(),
            cycle_key: cycle.cycle_key.clone(),
            mode: cycle.mode,
            cycle_start: cycle.start_date,
            cycle_end: cycle.end_date,
            net_cents,
            allocated_cents: 0,
            created_at: None,
            updated_by: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_row_per_cycle() {
        let (pool, writer, _dir) = test_database();
        let repo = ClosureRepository::new(pool, writer);
        let cycle = PayCycle::new(
            PayScheduleMode::Month,
            NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        );
        let first = repo
            .upsert_closure(closure_for(&cycle, 1000))
            .await
            .unwrap();
        let second = repo
            .upsert_closure(closure_for(&cycle, 1500))
            .await
            .unwrap();
        assert_eq!(second.net_cents, 1500);
        assert_eq!(second.created_at, first.created_at);

        let listed = repo
            .list_closures("hh", &[cycle.cycle_key.clone(), "month:x".to_string()])
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert!(repo.list_closures("hh", &[]).await.unwrap().is_empty());
        assert!(repo
            .list_closures("other", &[cycle.cycle_key.clone()])
            .await
            .unwrap()
            .is_empty());
    }
}
