use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;

use hearth_core::schedule::{PaySchedule, PayScheduleRepositoryTrait};
use hearth_core::Result;

use super::model::PayScheduleDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::pay_schedules;

pub struct PayScheduleRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PayScheduleRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        PayScheduleRepository { pool, writer }
    }
}

#[async_trait]
impl PayScheduleRepositoryTrait for PayScheduleRepository {
    async fn get_schedule(&self, household_id: &str) -> Result<Option<PaySchedule>> {
        let mut conn = get_connection(&self.pool)?;
        let row = pay_schedules::table
            .find(household_id)
            .select(PayScheduleDB::as_select())
            .first(&mut conn)
            .optional()
            .into_core()?;
        Ok(row.map(PaySchedule::from))
    }

    async fn upsert_schedule(&self, schedule: PaySchedule) -> Result<PaySchedule> {
        let row = PayScheduleDB::from_domain(&schedule, Utc::now().naive_utc())
            .map_err(StorageError::from)?;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PaySchedule> {
                diesel::insert_into(pay_schedules::table)
                    .values(&row)
                    .on_conflict(pay_schedules::household_id)
                    .do_update()
                    .set(&row.changes())
                    .execute(conn)
                    .into_core()?;
                let stored = pay_schedules::table
                    .find(&row.household_id)
                    .select(PayScheduleDB::as_select())
                    .first(conn)
                    .into_core()?;
                Ok(PaySchedule::from(stored))
            })
            .await
    }
}
