//! Shared helpers: calendar arithmetic, clocks, payload normalization and
//! the stale-response guard.

pub mod calendar;
pub mod clock;
pub mod payload;
pub mod request_token;

pub use clock::{Clock, FixedClock, SystemClock};
