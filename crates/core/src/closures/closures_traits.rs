use std::collections::HashMap;

use async_trait::async_trait;

use super::closures_model::{CloseCycleRequest, ClosureDraft, CycleClosure, CycleStatus};
use crate::errors::Result;
use crate::schedule::PayCycle;

/// Trait for cycle closure repository operations.
#[async_trait]
pub trait ClosureRepositoryTrait: Send + Sync {
    async fn list_closures(
        &self,
        household_id: &str,
        cycle_keys: &[String],
    ) -> Result<Vec<CycleClosure>>;
    /// Upserts on `(household_id, cycle_key)`.
    async fn upsert_closure(&self, closure: CycleClosure) -> Result<CycleClosure>;
}

/// Trait for the closure workflow.
#[async_trait]
pub trait ClosureServiceTrait: Send + Sync {
    /// Closures by cycle key. An empty key list returns an empty map without I/O.
    async fn list_closures(
        &self,
        household_id: &str,
        cycle_keys: &[String],
    ) -> Result<HashMap<String, CycleClosure>>;
    async fn cycle_statuses(
        &self,
        household_id: &str,
        cycles: &[PayCycle],
    ) -> Result<Vec<CycleStatus>>;
    /// Statuses of the household's most recent completed cycles.
    async fn past_cycle_statuses(&self, household_id: &str, count: usize)
        -> Result<Vec<CycleStatus>>;
    async fn open_cycle(&self, household_id: &str, cycle: &PayCycle) -> Result<ClosureDraft>;
    async fn close_cycle(&self, request: CloseCycleRequest) -> Result<CycleClosure>;
}
