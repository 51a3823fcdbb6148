//! Cycle closure domain models.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Error, Result};
use crate::goals::{Goal, GoalAllocation};
use crate::schedule::{PayCycle, PayScheduleMode};
use crate::utils::payload::{cents_field, opt_string_field, opt_timestamp_field, string_field, ymd_field};

/// Finalized (and re-editable) net distribution of one cycle.
///
/// Keyed by `(household_id, cycle_key)`. `allocated_cents` is the sum of the
/// strictly positive contributions saved with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleClosure {
    pub household_id: String,
    pub cycle_key: String,
    pub mode: PayScheduleMode,
    pub cycle_start: NaiveDate,
    pub cycle_end: NaiveDate,
    pub net_cents: i64,
    pub allocated_cents: i64,
    pub created_at: Option<NaiveDateTime>,
    pub updated_by: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

impl CycleClosure {
    pub fn unallocated_cents(&self) -> i64 {
        self.net_cents - self.allocated_cents
    }
}

impl TryFrom<&Value> for CycleClosure {
    type Error = Error;

    fn try_from(row: &Value) -> Result<Self> {
        Ok(CycleClosure {
            household_id: string_field(row, "household_id")?,
            cycle_key: string_field(row, "cycle_key")?,
            mode: opt_string_field(row, "mode")
                .map(|m| PayScheduleMode::from_str_lossy(&m))
                .unwrap_or_default(),
            cycle_start: ymd_field(row, "cycle_start")?,
            cycle_end: ymd_field(row, "cycle_end")?,
            net_cents: cents_field(row, "net_cents"),
            allocated_cents: cents_field(row, "allocated_cents"),
            created_at: opt_timestamp_field(row, "created_at"),
            updated_by: opt_string_field(row, "updated_by"),
            updated_at: opt_timestamp_field(row, "updated_at"),
        })
    }
}

/// Input for closing (or re-closing) a cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseCycleRequest {
    pub household_id: String,
    pub user_id: String,
    pub cycle: PayCycle,
    pub net_cents: i64,
    /// May contain zero amounts to clear earlier contributions.
    pub allocations: Vec<GoalAllocation>,
}

/// Everything needed to edit the distribution of one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosureDraft {
    pub cycle: PayCycle,
    pub is_closed: bool,
    /// Frozen snapshot for a closed cycle, live ledger net otherwise.
    pub net_cents: i64,
    pub goals: Vec<Goal>,
    /// One entry per goal, in goal order.
    pub allocations: Vec<GoalAllocation>,
    /// Contributions already saved for the cycle, by goal.
    pub existing: HashMap<String, i64>,
}

/// A cycle together with its closure, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleStatus {
    pub cycle: PayCycle,
    pub closure: Option<CycleClosure>,
}

impl CycleStatus {
    pub fn is_closed(&self) -> bool {
        self.closure.is_some()
    }
}
