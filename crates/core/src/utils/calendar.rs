//! Calendar arithmetic on wall-clock dates.
//!
//! All dates are plain `NaiveDate` values without a timezone. Their canonical
//! text form is `YYYY-MM-DD`, which sorts lexicographically in chronological
//! order, so it doubles as the comparison key crossing the storage boundary.

use chrono::{Datelike, Months, NaiveDate, Weekday};

use crate::errors::{Result, ValidationError};

fn out_of_range(what: String) -> crate::errors::Error {
    ValidationError::InvalidDate(format!("{} is out of the supported range", what)).into()
}

/// Adds `months` calendar months (negative values go back in time).
///
/// The day of month is clamped to the receiving month, so Jan 31 + 1 month
/// is the last day of February rather than an overflowed March date.
pub fn add_months(date: NaiveDate, months: i32) -> Result<NaiveDate> {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.ok_or_else(|| out_of_range(format!("{} {:+} months", date, months)))
}

/// Canonical `YYYY-MM-DD` form.
pub fn to_ymd(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses a strict `YYYY-MM-DD` string (zero padded, no time component).
pub fn parse_ymd(text: &str) -> Result<NaiveDate> {
    let bytes = text.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return Err(ValidationError::InvalidDate(format!("'{}' is not YYYY-MM-DD", text)).into());
    }
    Ok(NaiveDate::parse_from_str(text, "%Y-%m-%d")?)
}

/// `YYYY-MM` key of the month containing `date`.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Parses a `YYYY-MM` month key into the first day of that month.
pub fn parse_month_key(text: &str) -> Result<NaiveDate> {
    let (year, month) = text
        .split_once('-')
        .ok_or_else(|| ValidationError::InvalidDate(format!("'{}' is not YYYY-MM", text)))?;
    let year: i32 = year
        .parse()
        .map_err(|_| ValidationError::InvalidDate(format!("'{}' is not YYYY-MM", text)))?;
    let month: u32 = month
        .parse()
        .map_err(|_| ValidationError::InvalidDate(format!("'{}' is not YYYY-MM", text)))?;
    first_of_month(year, month)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Walks backwards while the date falls on a weekend.
pub fn previous_business_day(date: NaiveDate) -> NaiveDate {
    let mut day = date;
    while is_weekend(day) {
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    day
}

pub fn first_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| out_of_range(format!("{:04}-{:02}", year, month)))
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn next_month_start(date: NaiveDate) -> Result<NaiveDate> {
    add_months(month_start(date), 1)
}

/// Half-open `[first of month, first of next month)` range containing `date`.
pub fn month_range(date: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    Ok((month_start(date), next_month_start(date)?))
}

pub fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    let next = add_months(first_of_month(year, month)?, 1)?;
    next.pred_opt()
        .ok_or_else(|| out_of_range(format!("{:04}-{:02}", year, month)))
}

/// Last calendar day of the month, moved back to a weekday.
pub fn last_business_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    Ok(previous_business_day(last_day_of_month(year, month)?))
}

/// The 15th of the month, moved back to a weekday.
pub fn payday_15(year: i32, month: u32) -> Result<NaiveDate> {
    let fifteenth = NaiveDate::from_ymd_opt(year, month, 15)
        .ok_or_else(|| out_of_range(format!("{:04}-{:02}-15", year, month)))?;
    Ok(previous_business_day(fifteenth))
}
