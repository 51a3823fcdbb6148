//! Database models for pay schedules.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use hearth_core::schedule::{PaySchedule, PayScheduleMode};
use hearth_core::utils::calendar::{parse_ymd, to_ymd};

#[derive(Queryable, Selectable, Insertable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::pay_schedules)]
#[diesel(primary_key(household_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PayScheduleDB {
    pub household_id: String,
    pub mode: String,
    /// JSON object; the activation date lives under `start_ymd`.
    pub settings: String,
    pub created_at: NaiveDateTime,
    pub updated_by: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Columns rewritten when a household's schedule is saved again.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = crate::schema::pay_schedules)]
#[diesel(treat_none_as_null = true)]
pub struct PayScheduleChangesDB {
    pub mode: String,
    pub settings: String,
    pub updated_by: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct ScheduleSettings {
    #[serde(default, alias = "startYMD", skip_serializing_if = "Option::is_none")]
    pub start_ymd: Option<String>,
}

impl ScheduleSettings {
    /// Lenient read: malformed JSON or a malformed date means no activation date.
    pub fn parse(text: &str) -> Self {
        serde_json::from_str(text).unwrap_or_default()
    }
}

impl PayScheduleDB {
    pub fn from_domain(schedule: &PaySchedule, now: NaiveDateTime) -> serde_json::Result<Self> {
        let settings = ScheduleSettings {
            start_ymd: schedule.start_date.map(to_ymd),
        };
        Ok(Self {
            household_id: schedule.household_id.clone(),
            mode: schedule.mode.as_str().to_string(),
            settings: serde_json::to_string(&settings)?,
            created_at: schedule.created_at.unwrap_or(now),
            updated_by: schedule.updated_by.clone(),
            updated_at: schedule.updated_at,
        })
    }

    pub fn changes(&self) -> PayScheduleChangesDB {
        PayScheduleChangesDB {
            mode: self.mode.clone(),
            settings: self.settings.clone(),
            updated_by: self.updated_by.clone(),
            updated_at: self.updated_at,
        }
    }
}

impl From<PayScheduleDB> for PaySchedule {
    fn from(db: PayScheduleDB) -> Self {
        let start_date = ScheduleSettings::parse(&db.settings)
            .start_ymd
            .as_deref()
            .and_then(|s| s.get(..10))
            .and_then(|s| parse_ymd(s).ok());
        Self {
            household_id: db.household_id,
            mode: PayScheduleMode::from_str_lossy(&db.mode),
            start_date,
            created_at: Some(db.created_at),
            updated_by: db.updated_by,
            updated_at: db.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(mode: &str, settings: &str) -> PayScheduleDB {
        PayScheduleDB {
            household_id: "hh".to_string(),
            mode: mode.to_string(),
            settings: settings.to_string(),
            created_at: NaiveDateTime::default(),
            updated_by: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_settings_accept_legacy_key_and_timestamp_suffix() {
        let schedule =
            PaySchedule::from(row("twice_month", r#"{"startYMD":"2026-01-15T00:00:00Z"}"#));
        assert_eq!(schedule.mode, PayScheduleMode::TwiceMonth);
        assert_eq!(schedule.start_date, parse_ymd("2026-01-15").ok());
    }

    #[test]
    fn test_malformed_settings_fall_back_to_no_activation() {
        let schedule = PaySchedule::from(row("weekly", "not json"));
        assert_eq!(schedule.mode, PayScheduleMode::Month);
        assert_eq!(schedule.start_date, None);
    }
}
