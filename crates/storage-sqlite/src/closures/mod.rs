//! SQLite storage implementation for cycle closures.

mod model;
mod repository;

pub use model::{CycleClosureChangesDB, CycleClosureDB};
pub use repository::ClosureRepository;
