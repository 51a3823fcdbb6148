//! Database models for goals.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use hearth_core::goals::{Goal, GoalContribution, NewGoal};

#[derive(Queryable, Selectable, Insertable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GoalDB {
    pub id: String,
    pub household_id: String,
    pub created_by: Option<String>,
    pub title: String,
    pub target_cents: i64,
    pub desired_date: NaiveDate,
    pub created_at: NaiveDateTime,
}

#[derive(Queryable, Selectable, Insertable, Identifiable, Associations, Debug, Clone)]
#[diesel(belongs_to(GoalDB, foreign_key = goal_id))]
#[diesel(table_name = crate::schema::goal_contributions)]
#[diesel(primary_key(household_id, goal_id, cycle_key))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GoalContributionDB {
    pub household_id: String,
    pub goal_id: String,
    pub cycle_key: String,
    pub cycle_start: NaiveDate,
    pub cycle_end: NaiveDate,
    pub amount_cents: i64,
    pub updated_by: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Non-key columns, overwritten when a cycle is closed again.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = crate::schema::goal_contributions)]
#[diesel(treat_none_as_null = true)]
pub struct GoalContributionChangesDB {
    pub cycle_start: NaiveDate,
    pub cycle_end: NaiveDate,
    pub amount_cents: i64,
    pub updated_by: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

impl GoalDB {
    pub fn from_new(new_goal: NewGoal, id: String, now: NaiveDateTime) -> Self {
        Self {
            id,
            household_id: new_goal.household_id,
            created_by: Some(new_goal.created_by),
            title: new_goal.title,
            target_cents: new_goal.target_cents,
            desired_date: new_goal.desired_date,
            created_at: now,
        }
    }
}

/// Progress is derived from contributions by the service, so it starts at 0.
impl From<GoalDB> for Goal {
    fn from(db: GoalDB) -> Self {
        Self {
            id: db.id,
            household_id: db.household_id,
            created_by: db.created_by,
            title: db.title,
            target_cents: db.target_cents,
            desired_date: db.desired_date,
            created_at: Some(db.created_at),
            current_cents: 0,
        }
    }
}

impl GoalContributionDB {
    pub fn changes(&self) -> GoalContributionChangesDB {
        GoalContributionChangesDB {
            cycle_start: self.cycle_start,
            cycle_end: self.cycle_end,
            amount_cents: self.amount_cents,
            updated_by: self.updated_by.clone(),
            updated_at: self.updated_at,
        }
    }
}

impl From<GoalContribution> for GoalContributionDB {
    fn from(domain: GoalContribution) -> Self {
        Self {
            household_id: domain.household_id,
            goal_id: domain.goal_id,
            cycle_key: domain.cycle_key,
            cycle_start: domain.cycle_start,
            cycle_end: domain.cycle_end,
            amount_cents: domain.amount_cents,
            updated_by: domain.updated_by,
            updated_at: domain.updated_at,
        }
    }
}

impl From<GoalContributionDB> for GoalContribution {
    fn from(db: GoalContributionDB) -> Self {
        Self {
            household_id: db.household_id,
            goal_id: db.goal_id,
            cycle_key: db.cycle_key,
            cycle_start: db.cycle_start,
            cycle_end: db.cycle_end,
            amount_cents: db.amount_cents,
            updated_by: db.updated_by,
            updated_at: db.updated_at,
        }
    }
}
