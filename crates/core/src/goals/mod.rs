//! Goals module - domain models, allocation helpers, services, and traits.

mod allocation;
mod goals_model;
mod goals_service;
mod goals_traits;

pub use allocation::{
    allocation_total, build_submission, suggested_allocations, validate_allocations,
};
pub use goals_model::{Goal, GoalAllocation, GoalContribution, NewGoal};
pub use goals_service::GoalService;
pub use goals_traits::{GoalRepositoryTrait, GoalServiceTrait};
