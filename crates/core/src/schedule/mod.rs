//! Pay schedule module - schedule models, the pay-cycle engine, services and traits.

mod pay_cycle;
mod schedule_model;
mod schedule_service;
mod schedule_traits;

pub use pay_cycle::{
    compute_cycles, list_past_cycles, payday_after, payday_before, payday_on_or_before,
    paydays_in_month,
};
pub use schedule_model::{
    CyclePair, PayCycle, PaySchedule, PayScheduleInfo, PayScheduleMode, PayScheduleUpdate,
};
pub use schedule_service::PayScheduleService;
pub use schedule_traits::{PayScheduleRepositoryTrait, PayScheduleServiceTrait};
