//! Hearth Core - Domain entities, services, and traits.
//!
//! This crate contains the household finance business logic: the pay-cycle
//! engine, goal closures, card installment plans and the cash ledger.
//! It is storage-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod cards;
pub mod closures;
pub mod constants;
pub mod errors;
pub mod events;
pub mod goals;
pub mod ledger;
pub mod money;
pub mod schedule;
pub mod utils;

// Re-export the pay-cycle engine types, they are used everywhere
pub use schedule::{PayCycle, PayScheduleMode};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
