//! Goals domain models.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Error, Result, ValidationError};
use crate::utils::payload::{
    cents_field, opt_string_field, opt_timestamp_field, string_field, ymd_field,
    ymd_prefix_field,
};

/// Domain model representing a savings goal.
///
/// `current_cents` is never stored; it is the sum of every contribution
/// recorded for the goal across all closed cycles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub household_id: String,
    pub created_by: Option<String>,
    pub title: String,
    pub target_cents: i64,
    pub desired_date: NaiveDate,
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub current_cents: i64,
}

impl Goal {
    /// Amount still missing to reach the target, never negative.
    pub fn remaining_cents(&self) -> i64 {
        (self.target_cents - self.current_cents).max(0)
    }
}

impl TryFrom<&Value> for Goal {
    type Error = Error;

    fn try_from(row: &Value) -> Result<Self> {
        let desired_date = ymd_prefix_field(row, "desired_date")
            .ok_or_else(|| ValidationError::InvalidDate("desired_date".to_string()))?;
        Ok(Goal {
            id: string_field(row, "id")?,
            household_id: string_field(row, "household_id")?,
            created_by: opt_string_field(row, "created_by"),
            title: opt_string_field(row, "title").unwrap_or_default(),
            target_cents: cents_field(row, "target_cents"),
            desired_date,
            created_at: opt_timestamp_field(row, "created_at"),
            current_cents: 0,
        })
    }
}

/// Input model for creating a new goal
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub household_id: String,
    pub created_by: String,
    pub title: String,
    pub target_cents: i64,
    pub desired_date: NaiveDate,
}

/// Amount allocated to one goal in one cycle.
///
/// Unique per `(household_id, goal_id, cycle_key)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoalContribution {
    pub household_id: String,
    pub goal_id: String,
    pub cycle_key: String,
    pub cycle_start: NaiveDate,
    pub cycle_end: NaiveDate,
    pub amount_cents: i64,
    pub updated_by: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

impl TryFrom<&Value> for GoalContribution {
    type Error = Error;

    fn try_from(row: &Value) -> Result<Self> {
        Ok(GoalContribution {
            household_id: string_field(row, "household_id")?,
            goal_id: string_field(row, "goal_id")?,
            cycle_key: string_field(row, "cycle_key")?,
            cycle_start: ymd_field(row, "cycle_start")?,
            cycle_end: ymd_field(row, "cycle_end")?,
            amount_cents: cents_field(row, "amount_cents"),
            updated_by: opt_string_field(row, "updated_by"),
            updated_at: opt_timestamp_field(row, "updated_at"),
        })
    }
}

/// A requested amount for one goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GoalAllocation {
    pub goal_id: String,
    pub amount_cents: i64,
}

impl GoalAllocation {
    pub fn new(goal_id: impl Into<String>, amount_cents: i64) -> Self {
        Self {
            goal_id: goal_id.into(),
            amount_cents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_goal_from_row_ignores_stored_progress() {
        let row = json!({
            "id": "g1",
            "household_id": "hh",
            "title": "Trip",
            "target_cents": 500000.0,
            "desired_date": "2026-12-01",
            "current_cents": 999,
        });
        let goal = Goal::try_from(&row).unwrap();
        assert_eq!(goal.target_cents, 500_000);
        assert_eq!(goal.current_cents, 0);
        assert_eq!(goal.remaining_cents(), 500_000);
    }

    #[test]
    fn test_remaining_never_negative() {
        let row = json!({ "id": "g1", "household_id": "hh", "target_cents": 100, "desired_date": "2026-01-01" });
        let mut goal = Goal::try_from(&row).unwrap();
        goal.current_cents = 250;
        assert_eq!(goal.remaining_cents(), 0);
    }

    #[test]
    fn test_contribution_requires_cycle_dates() {
        let row = json!({
            "household_id": "hh",
            "goal_id": "g1",
            "cycle_key": "month:2026-02-01->2026-03-01",
            "cycle_start": "2026-02-01",
            "cycle_end": "2026-03-01",
            "amount_cents": null,
        });
        let contribution = GoalContribution::try_from(&row).unwrap();
        assert_eq!(contribution.amount_cents, 0);

        let bad = json!({ "household_id": "hh", "goal_id": "g1", "cycle_key": "k", "cycle_start": "2026-2-1" });
        assert!(GoalContribution::try_from(&bad).is_err());
    }
}
