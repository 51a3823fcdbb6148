//! Pay-cycle engine.
//!
//! Cycle boundaries are a pure function of `(mode, today, activation date)`.
//! Monthly cycles are calendar months. Twice-monthly cycles run between
//! consecutive paydays, where the paydays of a month are its 15th and its
//! last day, each moved back to the preceding business day.
//!
//! Paydays are generated lazily, month by month, until the requested cycles
//! are found, so there is no fixed look-back window.

use chrono::{Datelike, NaiveDate};
use log::debug;

use super::schedule_model::{CyclePair, PayCycle, PayScheduleMode};
use crate::constants::MONTH_WALK_SLACK;
use crate::errors::{Result, ValidationError};
use crate::utils::calendar::{add_months, last_business_day_of_month, month_start, payday_15};

/// The two paydays of the month containing `date`, in ascending order.
pub fn paydays_in_month(date: NaiveDate) -> Result<Vec<NaiveDate>> {
    let mut days = vec![
        payday_15(date.year(), date.month())?,
        last_business_day_of_month(date.year(), date.month())?,
    ];
    days.sort();
    days.dedup();
    Ok(days)
}

/// Latest payday on or before `date`.
pub fn payday_on_or_before(date: NaiveDate) -> Result<NaiveDate> {
    let mut month = month_start(date);
    // A month always has a payday by its 15th, so this loop runs at most twice.
    loop {
        if let Some(day) = paydays_in_month(month)?
            .into_iter()
            .rev()
            .find(|day| *day <= date)
        {
            return Ok(day);
        }
        month = add_months(month, -1)?;
    }
}

/// Earliest payday strictly after `date`.
pub fn payday_after(date: NaiveDate) -> Result<NaiveDate> {
    let mut month = month_start(date);
    loop {
        if let Some(day) = paydays_in_month(month)?.into_iter().find(|day| *day > date) {
            return Ok(day);
        }
        month = add_months(month, 1)?;
    }
}

/// Latest payday strictly before `date`.
pub fn payday_before(date: NaiveDate) -> Result<NaiveDate> {
    let day_before = date
        .pred_opt()
        .ok_or_else(|| ValidationError::InvalidDate(format!("No day before {}", date)))?;
    payday_on_or_before(day_before)
}

/// Guards against a zero-length cycle: if `end` does not move past `start`,
/// the earlier payday of the following month is used instead.
fn ensure_forward(start: NaiveDate, end: NaiveDate) -> Result<NaiveDate> {
    if end > start {
        return Ok(end);
    }
    let next_month = add_months(start, 1)?;
    let candidates = paydays_in_month(next_month)?;
    candidates
        .into_iter()
        .find(|day| *day > start)
        .ok_or_else(|| {
            ValidationError::InvalidDate(format!("No payday found after {}", start)).into()
        })
}

/// Returns the closing (most recently completed) and current cycles.
pub fn compute_cycles(mode: PayScheduleMode, today: NaiveDate) -> Result<CyclePair> {
    let pair = match mode {
        PayScheduleMode::Month => {
            let current_start = month_start(today);
            let current_end = add_months(current_start, 1)?;
            let closing_start = add_months(current_start, -1)?;
            CyclePair {
                closing: PayCycle::new(mode, closing_start, current_start),
                current: PayCycle::new(mode, current_start, current_end),
            }
        }
        PayScheduleMode::TwiceMonth => {
            let current_start = payday_on_or_before(today)?;
            let current_end = ensure_forward(current_start, payday_after(current_start)?)?;
            let closing_start = payday_before(current_start)?;
            CyclePair {
                closing: PayCycle::new(mode, closing_start, current_start),
                current: PayCycle::new(mode, current_start, current_end),
            }
        }
    };
    debug!(
        "Computed cycles for {} on {}: closing {}, current {}",
        mode, today, pair.closing.cycle_key, pair.current.cycle_key
    );
    Ok(pair)
}

/// Lists up to `count` fully completed cycles (`end <= today`) whose end is
/// after the activation date, most recent first.
pub fn list_past_cycles(
    mode: PayScheduleMode,
    today: NaiveDate,
    count: usize,
    activation: Option<NaiveDate>,
) -> Result<Vec<PayCycle>> {
    let mut cycles = Vec::with_capacity(count);
    if count == 0 {
        return Ok(cycles);
    }
    let after_activation = |end: NaiveDate| activation.map_or(true, |boundary| end > boundary);

    match mode {
        PayScheduleMode::Month => {
            let this_month = month_start(today);
            for i in 1..=(count + MONTH_WALK_SLACK) {
                let start = add_months(this_month, -(i as i32))?;
                let end = add_months(start, 1)?;
                // Ends only move backwards from here on.
                if !after_activation(end) {
                    break;
                }
                if end <= today {
                    cycles.push(PayCycle::new(mode, start, end));
                }
                if cycles.len() >= count {
                    break;
                }
            }
        }
        PayScheduleMode::TwiceMonth => {
            let mut end = payday_on_or_before(today)?;
            while cycles.len() < count && after_activation(end) {
                let start = payday_before(end)?;
                cycles.push(PayCycle::new(mode, start, end));
                end = start;
            }
        }
    }
    Ok(cycles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_month_cycles_for_mid_month() {
        let pair = compute_cycles(PayScheduleMode::Month, d(2026, 3, 15)).unwrap();
        assert_eq!(pair.current.start_date, d(2026, 3, 1));
        assert_eq!(pair.current.end_date, d(2026, 4, 1));
        assert_eq!(pair.closing.start_date, d(2026, 2, 1));
        assert_eq!(pair.closing.end_date, d(2026, 3, 1));
        assert_eq!(pair.current.cycle_key, "month:2026-03-01->2026-04-01");
        assert_eq!(pair.closing.cycle_key, "month:2026-02-01->2026-03-01");
    }

    #[test]
    fn test_month_cycles_across_year_boundary() {
        let pair = compute_cycles(PayScheduleMode::Month, d(2026, 1, 1)).unwrap();
        assert_eq!(pair.closing.start_date, d(2025, 12, 1));
        assert_eq!(pair.current.end_date, d(2026, 2, 1));
    }

    #[test]
    fn test_twice_month_cycles_mid_month() {
        // 2026-03-13 is a Friday (15th falls on Sunday); 2026-03-31 is a Tuesday.
        let pair = compute_cycles(PayScheduleMode::TwiceMonth, d(2026, 3, 20)).unwrap();
        assert_eq!(pair.current.start_date, d(2026, 3, 13));
        assert_eq!(pair.current.end_date, d(2026, 3, 31));
        // 2026-02-28 is a Saturday, so February's last payday is the 27th.
        assert_eq!(pair.closing.start_date, d(2026, 2, 27));
        assert_eq!(pair.closing.end_date, d(2026, 3, 13));
    }

    #[test]
    fn test_twice_month_on_payday_starts_new_cycle() {
        let pair = compute_cycles(PayScheduleMode::TwiceMonth, d(2026, 3, 13)).unwrap();
        assert_eq!(pair.current.start_date, d(2026, 3, 13));
        assert_eq!(pair.closing.end_date, d(2026, 3, 13));
    }

    #[test]
    fn test_twice_month_weekend_after_last_payday() {
        // 2026-05-29 is Friday, the 30th/31st are a weekend.
        let pair = compute_cycles(PayScheduleMode::TwiceMonth, d(2026, 5, 31)).unwrap();
        assert_eq!(pair.current.start_date, d(2026, 5, 29));
        assert_eq!(pair.current.end_date, d(2026, 6, 15));
    }

    #[test]
    fn test_ensure_forward_skips_degenerate_cycle() {
        let start = d(2026, 3, 31);
        assert_eq!(ensure_forward(start, start).unwrap(), d(2026, 4, 15));
        assert_eq!(ensure_forward(start, d(2026, 4, 15)).unwrap(), d(2026, 4, 15));
    }

    #[test]
    fn test_past_month_cycles_respect_activation() {
        let today = d(2026, 3, 15);
        let cycles =
            list_past_cycles(PayScheduleMode::Month, today, 12, Some(d(2025, 12, 10))).unwrap();
        let keys: Vec<_> = cycles.iter().map(|c| c.cycle_key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "month:2026-02-01->2026-03-01",
                "month:2026-01-01->2026-02-01",
                "month:2025-12-01->2026-01-01",
            ]
        );
    }

    #[test]
    fn test_past_month_cycles_count_cap() {
        let cycles = list_past_cycles(PayScheduleMode::Month, d(2026, 3, 15), 2, None).unwrap();
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0].end_date, d(2026, 3, 1));
        assert!(list_past_cycles(PayScheduleMode::Month, d(2026, 3, 15), 0, None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_past_twice_month_cycles_are_contiguous_and_complete() {
        let today = d(2026, 3, 20);
        let cycles = list_past_cycles(PayScheduleMode::TwiceMonth, today, 4, None).unwrap();
        assert_eq!(cycles.len(), 4);
        assert_eq!(cycles[0].end_date, d(2026, 3, 13));
        for pair in cycles.windows(2) {
            assert_eq!(pair[1].end_date, pair[0].start_date);
        }
        assert!(cycles.iter().all(|c| c.end_date <= today && c.start_date < c.end_date));
    }

    #[test]
    fn test_past_cycles_activation_after_today_is_empty() {
        let today = d(2026, 3, 20);
        for mode in [PayScheduleMode::Month, PayScheduleMode::TwiceMonth] {
            assert!(list_past_cycles(mode, today, 12, Some(today)).unwrap().is_empty());
        }
    }
}
