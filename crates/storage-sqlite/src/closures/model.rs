//! Database models for cycle closures.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use hearth_core::closures::CycleClosure;
use hearth_core::schedule::PayScheduleMode;

#[derive(Queryable, Selectable, Insertable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::cycle_closures)]
#[diesel(primary_key(household_id, cycle_key))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CycleClosureDB {
    pub household_id: String,
    pub cycle_key: String,
    pub mode: String,
    pub cycle_start: NaiveDate,
    pub cycle_end: NaiveDate,
    pub net_cents: i64,
    pub allocated_cents: i64,
    pub created_at: NaiveDateTime,
    pub updated_by: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Everything but the key and `created_at`, which a re-close keeps.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = crate::schema::cycle_closures)]
#[diesel(treat_none_as_null = true)]
pub struct CycleClosureChangesDB {
    pub mode: String,
    pub cycle_start: NaiveDate,
    pub cycle_end: NaiveDate,
    pub net_cents: i64,
    pub allocated_cents: i64,
    pub updated_by: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

impl CycleClosureDB {
    pub fn from_domain(closure: CycleClosure, now: NaiveDateTime) -> Self {
        Self {
            household_id: closure.household_id,
            cycle_key: closure.cycle_key,
            mode: closure.mode.as_str().to_string(),
            cycle_start: closure.cycle_start,
            cycle_end: closure.cycle_end,
            net_cents: closure.net_cents,
            allocated_cents: closure.allocated_cents,
            created_at: closure.created_at.unwrap_or(now),
            updated_by: closure.updated_by,
            updated_at: closure.updated_at,
        }
    }

    pub fn changes(&self) -> CycleClosureChangesDB {
        CycleClosureChangesDB {
            mode: self.mode.clone(),
            cycle_start: self.cycle_start,
            cycle_end: self.cycle_end,
            net_cents: self.net_cents,
            allocated_cents: self.allocated_cents,
            updated_by: self.updated_by.clone(),
            updated_at: self.updated_at,
        }
    }
}

impl From<CycleClosureDB> for CycleClosure {
    fn from(db: CycleClosureDB) -> Self {
        Self {
            household_id: db.household_id,
            cycle_key: db.cycle_key,
            mode: PayScheduleMode::from_str_lossy(&db.mode),
            cycle_start: db.cycle_start,
            cycle_end: db.cycle_end,
            net_cents: db.net_cents,
            allocated_cents: db.allocated_cents,
            created_at: Some(db.created_at),
            updated_by: db.updated_by,
            updated_at: db.updated_at,
        }
    }
}
