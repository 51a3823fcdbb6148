//! SQLite storage implementation for pay schedules.

mod model;
mod repository;

pub use model::{PayScheduleDB, ScheduleSettings};
pub use repository::PayScheduleRepository;
