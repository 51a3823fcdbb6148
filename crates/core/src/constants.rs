/// Activation date used when a household has no pay schedule configured
pub const ACTIVATION_FALLBACK_DATE: &str = "1970-01-01";

/// Number of past cycles offered for closing when the caller does not ask
pub const DEFAULT_PAST_CYCLE_COUNT: usize = 12;

/// Extra months walked back in monthly mode before giving up on `count`
pub const MONTH_WALK_SLACK: usize = 24;

/// Upper bound on installments for a single card charge
pub const MAX_INSTALLMENTS: u32 = 60;

/// Latest day of month used for due and closing days
pub const MAX_DUE_DAY: u32 = 28;

/// Default horizon for the card installment forecast
pub const DEFAULT_FORECAST_MONTHS: u32 = 6;

/// Default look-back window for recent transactions
pub const DEFAULT_RECENT_DAYS: u32 = 90;
