//! Money codec - integer cents and their decimal text form.
//!
//! All money in the domain is an `i64` count of cents. Floating point is
//! never used for currency arithmetic.

mod money_codec;

pub use money_codec::{cents_to_decimal, format_cents, format_currency, parse_cents};
