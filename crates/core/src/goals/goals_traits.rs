use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::Result;
use crate::goals::goals_model::{Goal, GoalContribution, NewGoal};

/// Trait for goal repository operations
#[async_trait]
pub trait GoalRepositoryTrait: Send + Sync {
    /// Goals ordered by desired date ascending, then creation descending.
    async fn list_goals(&self, household_id: &str) -> Result<Vec<Goal>>;
    async fn insert_goal(&self, new_goal: NewGoal) -> Result<Goal>;
    async fn list_contributions(&self, household_id: &str) -> Result<Vec<GoalContribution>>;
    async fn list_contributions_for_cycle(
        &self,
        household_id: &str,
        cycle_key: &str,
    ) -> Result<Vec<GoalContribution>>;
    /// Upserts on `(household_id, goal_id, cycle_key)`.
    async fn upsert_contributions(&self, contributions: Vec<GoalContribution>) -> Result<usize>;
}

/// Trait for goal service operations
#[async_trait]
pub trait GoalServiceTrait: Send + Sync {
    /// Goals with `current_cents` derived from their contributions.
    async fn list_goals(&self, household_id: &str) -> Result<Vec<Goal>>;
    async fn create_goal(&self, new_goal: NewGoal) -> Result<Goal>;
    /// Amount per goal already recorded for a cycle.
    async fn contributions_for_cycle(
        &self,
        household_id: &str,
        cycle_key: &str,
    ) -> Result<HashMap<String, i64>>;
}
