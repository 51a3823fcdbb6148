//! Installment splitting and due-date scheduling.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use super::cards_model::{CardInstallment, InstallmentForecast, InstallmentPlan, PlannedInstallment};
use crate::constants::{MAX_DUE_DAY, MAX_INSTALLMENTS};
use crate::errors::{Result, ValidationError};
use crate::utils::calendar::{add_months, month_key, month_start};

/// Splits `total_cents` into `installments` parts.
///
/// Every part is `total / n` or one cent more; the extra cents go to the
/// first `total % n` parts.
pub fn split_installments(total_cents: i64, installments: u32) -> Result<Vec<i64>> {
    if total_cents < 1 {
        return Err(ValidationError::InvalidAmount(format!(
            "Charge total must be positive, got {}",
            total_cents
        ))
        .into());
    }
    if installments == 0 || installments > MAX_INSTALLMENTS {
        return Err(ValidationError::InvalidInput(format!(
            "Installments must be between 1 and {}, got {}",
            MAX_INSTALLMENTS, installments
        ))
        .into());
    }
    let n = i64::from(installments);
    let base = total_cents / n;
    let remainder = total_cents - base * n;
    Ok((0..n)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect())
}

/// First due date: the month after the purchase, on `due_day` if given,
/// otherwise on the purchase day. The day is clamped to `1..=28`.
pub fn first_due_date(purchased_on: NaiveDate, due_day: Option<u32>) -> Result<NaiveDate> {
    let day = due_day
        .unwrap_or_else(|| purchased_on.day())
        .clamp(1, MAX_DUE_DAY);
    let next_month = add_months(month_start(purchased_on), 1)?;
    next_month.with_day(day).ok_or_else(|| {
        ValidationError::InvalidDate(format!("Day {} is not valid in {}", day, next_month)).into()
    })
}

/// Builds the full plan; installment `k` (0-based) is due `k` months after the first.
pub fn plan_installments(
    total_cents: i64,
    installments_total: u32,
    purchased_on: NaiveDate,
    due_day: Option<u32>,
) -> Result<InstallmentPlan> {
    let amounts = split_installments(total_cents, installments_total)?;
    let first_due = first_due_date(purchased_on, due_day)?;
    let installments = amounts
        .into_iter()
        .zip(0i32..)
        .map(|(amount_cents, k)| {
            Ok(PlannedInstallment {
                n: k as u32 + 1,
                due_on: add_months(first_due, k)?,
                amount_cents,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(InstallmentPlan {
        total_cents,
        installments_total,
        purchased_on,
        due_day,
        installments,
    })
}

/// Per-month totals of installments due in `[today, today + months_ahead)`.
pub fn build_forecast(
    installments: &[CardInstallment],
    today: NaiveDate,
    months_ahead: u32,
) -> Result<InstallmentForecast> {
    let months = i32::try_from(months_ahead).map_err(|_| {
        ValidationError::InvalidInput(format!("Forecast horizon too large: {}", months_ahead))
    })?;
    let end = add_months(today, months)?;

    let mut by_month: BTreeMap<String, i64> = BTreeMap::new();
    for installment in installments
        .iter()
        .filter(|i| i.due_on >= today && i.due_on < end)
    {
        *by_month.entry(month_key(installment.due_on)).or_insert(0) += installment.amount_cents;
    }

    let (next_month, next_total_cents) = by_month
        .iter()
        .next()
        .map(|(month, total)| (Some(month.clone()), *total))
        .unwrap_or((None, 0));
    Ok(InstallmentForecast {
        by_month,
        next_month,
        next_total_cents,
    })
}
