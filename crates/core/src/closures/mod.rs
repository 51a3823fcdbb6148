//! Cycle closures - snapshot a cycle's net cash flow and distribute it to goals.

mod closures_model;
mod closures_service;
mod closures_traits;
mod status_loader;

pub use closures_model::{CloseCycleRequest, ClosureDraft, CycleClosure, CycleStatus};
pub use closures_service::ClosureService;
pub use closures_traits::{ClosureRepositoryTrait, ClosureServiceTrait};
pub use status_loader::ClosureStatusLoader;

#[cfg(test)]
mod closures_service_tests;
