use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, warn};

use super::pay_cycle::{compute_cycles, list_past_cycles};
use super::schedule_model::{
    CyclePair, PayCycle, PaySchedule, PayScheduleInfo, PayScheduleMode, PayScheduleUpdate,
};
use super::schedule_traits::{PayScheduleRepositoryTrait, PayScheduleServiceTrait};
use crate::constants::ACTIVATION_FALLBACK_DATE;
use crate::errors::Result;
use crate::events::{DomainEvent, DomainEventSink};
use crate::utils::calendar::{add_months, month_start, parse_ymd};
use crate::utils::Clock;

pub struct PayScheduleService {
    repository: Arc<dyn PayScheduleRepositoryTrait>,
    clock: Arc<dyn Clock>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl PayScheduleService {
    pub fn new(
        repository: Arc<dyn PayScheduleRepositoryTrait>,
        clock: Arc<dyn Clock>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            repository,
            clock,
            event_sink,
        }
    }

    fn fallback_info() -> Result<PayScheduleInfo> {
        Ok(PayScheduleInfo {
            mode: PayScheduleMode::Month,
            start_date: parse_ymd(ACTIVATION_FALLBACK_DATE)?,
        })
    }

    fn resolve_start(&self, schedule: &PaySchedule) -> NaiveDate {
        schedule
            .start_date
            .or_else(|| schedule.created_at.map(|ts| ts.date()))
            .unwrap_or_else(|| self.clock.today())
    }
}

#[async_trait]
impl PayScheduleServiceTrait for PayScheduleService {
    async fn get_schedule_info(&self, household_id: &str) -> Result<PayScheduleInfo> {
        match self.repository.get_schedule(household_id).await? {
            Some(schedule) => Ok(PayScheduleInfo {
                mode: schedule.mode,
                start_date: self.resolve_start(&schedule),
            }),
            None => {
                warn!(
                    "No pay schedule for household {}, falling back to monthly cycles",
                    household_id
                );
                Self::fallback_info()
            }
        }
    }

    async fn set_schedule(&self, update: PayScheduleUpdate) -> Result<PaySchedule> {
        let now = self.clock.now();
        let existing = self.repository.get_schedule(&update.household_id).await?;
        let schedule = PaySchedule {
            household_id: update.household_id.clone(),
            mode: update.mode,
            start_date: Some(update.start_date.unwrap_or_else(|| now.date())),
            created_at: existing.and_then(|s| s.created_at).or(Some(now)),
            updated_by: Some(update.user_id),
            updated_at: Some(now),
        };
        let saved = self.repository.upsert_schedule(schedule).await?;
        debug!(
            "Pay schedule for household {} set to {} from {:?}",
            saved.household_id, saved.mode, saved.start_date
        );
        self.event_sink
            .emit(DomainEvent::schedule_changed(&update.household_id));
        Ok(saved)
    }

    async fn move_start_back_one_month(
        &self,
        household_id: &str,
        user_id: &str,
    ) -> Result<PaySchedule> {
        let info = self.get_schedule_info(household_id).await?;
        let new_start = add_months(month_start(info.start_date), -1)?;
        self.set_schedule(PayScheduleUpdate {
            household_id: household_id.to_string(),
            user_id: user_id.to_string(),
            mode: info.mode,
            start_date: Some(new_start),
        })
        .await
    }

    async fn current_cycles(&self, household_id: &str) -> Result<CyclePair> {
        let info = self.get_schedule_info(household_id).await?;
        compute_cycles(info.mode, self.clock.today())
    }

    async fn past_cycles(&self, household_id: &str, count: usize) -> Result<Vec<PayCycle>> {
        let info = self.get_schedule_info(household_id).await?;
        list_past_cycles(info.mode, self.clock.today(), count, Some(info.start_date))
    }
}
