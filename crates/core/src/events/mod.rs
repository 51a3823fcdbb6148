//! Domain events module.
//!
//! Provides domain event types, the sink trait services emit through after
//! successful mutations, and a household-scoped hub that lets dependent
//! views invalidate cached reads without a process-wide listener list.

mod bus;
mod domain_event;
mod sink;

pub use bus::HouseholdEventHub;
pub use domain_event::*;
pub use sink::*;
