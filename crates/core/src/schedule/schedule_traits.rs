use async_trait::async_trait;

use super::schedule_model::{CyclePair, PayCycle, PaySchedule, PayScheduleInfo, PayScheduleUpdate};
use crate::errors::Result;

/// Trait for pay schedule repository operations.
///
/// At most one schedule exists per household; writes upsert by household.
#[async_trait]
pub trait PayScheduleRepositoryTrait: Send + Sync {
    async fn get_schedule(&self, household_id: &str) -> Result<Option<PaySchedule>>;
    async fn upsert_schedule(&self, schedule: PaySchedule) -> Result<PaySchedule>;
}

/// Trait for pay schedule service operations.
#[async_trait]
pub trait PayScheduleServiceTrait: Send + Sync {
    /// Resolved mode and activation date. Never fails on a missing schedule.
    async fn get_schedule_info(&self, household_id: &str) -> Result<PayScheduleInfo>;
    async fn set_schedule(&self, update: PayScheduleUpdate) -> Result<PaySchedule>;
    async fn move_start_back_one_month(&self, household_id: &str, user_id: &str)
        -> Result<PaySchedule>;
    async fn current_cycles(&self, household_id: &str) -> Result<CyclePair>;
    async fn past_cycles(&self, household_id: &str, count: usize) -> Result<Vec<PayCycle>>;
}
