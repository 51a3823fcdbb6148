//! Distribution of a cycle's net cash flow across goals.

use std::collections::HashMap;

use super::goals_model::{Goal, GoalAllocation};
use crate::errors::{Result, ValidationError};

/// Greedy suggestion in display order.
///
/// Each goal with room gets `min(remaining, leftover)` until the net runs
/// out. Every goal appears in the result; goals that get nothing carry an
/// explicit zero so a re-suggest clears stale values.
pub fn suggested_allocations(net_cents: i64, goals: &[Goal]) -> Vec<GoalAllocation> {
    let mut leftover = net_cents.max(0);
    goals
        .iter()
        .map(|goal| {
            let put = goal.remaining_cents().min(leftover);
            leftover -= put;
            GoalAllocation::new(goal.id.clone(), put)
        })
        .collect()
}

/// Sum of the strictly positive amounts; zero and negative entries do not count.
pub fn allocation_total(allocations: &[GoalAllocation]) -> i64 {
    allocations
        .iter()
        .map(|a| a.amount_cents)
        .filter(|amount| *amount > 0)
        .sum()
}

/// Checks a submission against the cycle's net and returns the allocated total.
pub fn validate_allocations(net_cents: i64, allocations: &[GoalAllocation]) -> Result<i64> {
    if net_cents <= 0 {
        return Err(ValidationError::NonPositiveNet { net_cents }.into());
    }
    if let Some(negative) = allocations.iter().find(|a| a.amount_cents < 0) {
        return Err(ValidationError::InvalidAmount(format!(
            "Negative allocation for goal {}",
            negative.goal_id
        ))
        .into());
    }
    let allocated_cents = allocation_total(allocations);
    if allocated_cents == 0 {
        return Err(ValidationError::EmptyAllocation.into());
    }
    if allocated_cents > net_cents {
        return Err(ValidationError::AllocationExceedsNet {
            allocated_cents,
            net_cents,
        }
        .into());
    }
    Ok(allocated_cents)
}

/// Builds the rows to persist from the amounts typed per goal.
///
/// A goal is included when its requested amount is positive or when it had a
/// positive contribution before, so that clearing a value is saved as zero.
pub fn build_submission(
    goals: &[Goal],
    requested: &HashMap<String, i64>,
    existing: &HashMap<String, i64>,
) -> Vec<GoalAllocation> {
    goals
        .iter()
        .filter_map(|goal| {
            let amount = requested.get(&goal.id).copied().unwrap_or(0).max(0);
            let had_before = existing.get(&goal.id).copied().unwrap_or(0) > 0;
            (amount > 0 || had_before).then(|| GoalAllocation::new(goal.id.clone(), amount))
        })
        .collect()
}
