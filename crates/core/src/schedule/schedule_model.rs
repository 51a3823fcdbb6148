//! Pay schedule domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{Error, Result, ValidationError};
use crate::utils::calendar::parse_ymd;
use crate::utils::payload::{opt_string_field, opt_timestamp_field, string_field};

/// How often a household gets paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PayScheduleMode {
    /// One cycle per calendar month.
    #[default]
    Month,
    /// Paid on the business-day-adjusted 15th and last day of each month.
    TwiceMonth,
}

impl PayScheduleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayScheduleMode::Month => "month",
            PayScheduleMode::TwiceMonth => "twice_month",
        }
    }

    /// Lenient parse for backend rows: anything unknown is monthly.
    pub fn from_str_lossy(text: &str) -> Self {
        text.parse().unwrap_or_default()
    }
}

impl fmt::Display for PayScheduleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayScheduleMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "month" => Ok(PayScheduleMode::Month),
            "twice_month" => Ok(PayScheduleMode::TwiceMonth),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown pay schedule mode '{}'",
                other
            ))
            .into()),
        }
    }
}

/// Stored pay schedule row, one per household.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaySchedule {
    pub household_id: String,
    pub mode: PayScheduleMode,
    /// Activation boundary; cycles ending on or before it are never pending.
    pub start_date: Option<NaiveDate>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_by: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

impl TryFrom<&Value> for PaySchedule {
    type Error = Error;

    fn try_from(row: &Value) -> Result<Self> {
        let settings = row.get("settings").cloned().unwrap_or(Value::Null);
        let start_text =
            opt_string_field(&settings, "start_ymd").or_else(|| opt_string_field(&settings, "startYMD"));
        let start_date = start_text
            .as_deref()
            .filter(|s| s.len() >= 10)
            .and_then(|s| s.get(..10))
            .and_then(|s| parse_ymd(s).ok());

        Ok(PaySchedule {
            household_id: string_field(row, "household_id")?,
            mode: opt_string_field(row, "mode")
                .map(|m| PayScheduleMode::from_str_lossy(&m))
                .unwrap_or_default(),
            start_date,
            created_at: opt_timestamp_field(row, "created_at"),
            updated_by: opt_string_field(row, "updated_by"),
            updated_at: opt_timestamp_field(row, "updated_at"),
        })
    }
}

/// Resolved schedule used by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayScheduleInfo {
    pub mode: PayScheduleMode,
    pub start_date: NaiveDate,
}

/// Input for changing a household's schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayScheduleUpdate {
    pub household_id: String,
    pub user_id: String,
    pub mode: PayScheduleMode,
    /// Defaults to today when absent.
    pub start_date: Option<NaiveDate>,
}

/// A derived pay period `[start_date, end_date)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayCycle {
    pub mode: PayScheduleMode,
    pub cycle_key: String,
    /// Inclusive.
    pub start_date: NaiveDate,
    /// Exclusive.
    pub end_date: NaiveDate,
}

impl PayCycle {
    pub fn new(mode: PayScheduleMode, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            mode,
            cycle_key: Self::key_for(mode, start_date, end_date),
            start_date,
            end_date,
        }
    }

    /// Stable identity used as the persistence join key: `mode:start->end`.
    pub fn key_for(mode: PayScheduleMode, start_date: NaiveDate, end_date: NaiveDate) -> String {
        format!(
            "{}:{}->{}",
            mode.as_str(),
            start_date.format("%Y-%m-%d"),
            end_date.format("%Y-%m-%d")
        )
    }

    /// Rebuilds a cycle from its key.
    pub fn parse_key(cycle_key: &str) -> Result<Self> {
        let invalid = || ValidationError::InvalidInput(format!("Invalid cycle key '{}'", cycle_key));
        let (mode, range) = cycle_key.split_once(':').ok_or_else(invalid)?;
        let (start, end) = range.split_once("->").ok_or_else(invalid)?;
        let mode: PayScheduleMode = mode.parse()?;
        let start_date = parse_ymd(start)?;
        let end_date = parse_ymd(end)?;
        if end_date <= start_date {
            return Err(invalid().into());
        }
        Ok(Self::new(mode, start_date, end_date))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date < self.end_date
    }

    /// A cycle is complete once its (exclusive) end is on or before today.
    pub fn is_complete(&self, today: NaiveDate) -> bool {
        self.end_date <= today
    }
}

/// The most recently completed cycle and the one currently open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CyclePair {
    pub closing: PayCycle,
    pub current: PayCycle,
}
