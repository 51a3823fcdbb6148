//! SQLite storage implementation for goals and their per-cycle contributions.

mod model;
mod repository;

pub use model::{GoalContributionChangesDB, GoalContributionDB, GoalDB};
pub use repository::GoalRepository;
