//! Payment method, card charge and installment models.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::{Error, Result, ValidationError};
use crate::utils::payload::{
    cents_field, opt_cents_field, opt_string_field, opt_timestamp_field, opt_u32_field,
    string_field, ymd_prefix_field,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodType {
    Cash,
    Bank,
    Card,
}

impl PaymentMethodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethodType::Cash => "cash",
            PaymentMethodType::Bank => "bank",
            PaymentMethodType::Card => "card",
        }
    }

    pub fn from_row(text: &str) -> Result<Self> {
        match text.trim() {
            "cash" => Ok(PaymentMethodType::Cash),
            "bank" => Ok(PaymentMethodType::Bank),
            "card" => Ok(PaymentMethodType::Card),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown payment method type '{}'",
                other
            ))
            .into()),
        }
    }
}

/// How a purchase consumes the card limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LimitBehavior {
    /// The whole purchase is held against the limit.
    #[default]
    Full,
    /// Only the open installments are held.
    Installment,
}

impl LimitBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitBehavior::Full => "full",
            LimitBehavior::Installment => "installment",
        }
    }

    pub fn from_str_lossy(text: &str) -> Self {
        if text.trim() == "installment" {
            LimitBehavior::Installment
        } else {
            LimitBehavior::Full
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: String,
    pub household_id: String,
    pub created_by: Option<String>,
    pub method_type: PaymentMethodType,
    pub name: String,
    pub credit_limit_cents: Option<i64>,
    pub closing_day: Option<u32>,
    pub due_day: Option<u32>,
    pub limit_behavior: LimitBehavior,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl PaymentMethod {
    pub fn is_card(&self) -> bool {
        self.method_type == PaymentMethodType::Card
    }
}

impl TryFrom<&Value> for PaymentMethod {
    type Error = Error;

    fn try_from(row: &Value) -> Result<Self> {
        let method_type = PaymentMethodType::from_row(&string_field(row, "type")?)?;
        Ok(PaymentMethod {
            id: string_field(row, "id")?,
            household_id: string_field(row, "household_id")?,
            created_by: opt_string_field(row, "created_by"),
            method_type,
            name: opt_string_field(row, "name").unwrap_or_default(),
            credit_limit_cents: opt_cents_field(row, "credit_limit_cents"),
            closing_day: opt_u32_field(row, "closing_day"),
            due_day: opt_u32_field(row, "due_day"),
            limit_behavior: opt_string_field(row, "limit_behavior")
                .map(|b| LimitBehavior::from_str_lossy(&b))
                .unwrap_or_default(),
            created_at: opt_timestamp_field(row, "created_at"),
            updated_at: opt_timestamp_field(row, "updated_at"),
        })
    }
}

/// Input model for registering a credit card.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCard {
    pub household_id: String,
    pub created_by: String,
    pub name: String,
    pub credit_limit_cents: i64,
    pub due_day: Option<u32>,
    pub closing_day: Option<u32>,
    pub limit_behavior: Option<LimitBehavior>,
}

/// Partial update of a card. Absent fields are left untouched; the day
/// fields distinguish "absent" from an explicit `null` that clears them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardUpdate {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub household_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub credit_limit_cents: Option<i64>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub due_day: Option<Option<u32>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub closing_day: Option<Option<u32>>,
    #[serde(default)]
    pub limit_behavior: Option<LimitBehavior>,
}

fn explicit_null<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardCharge {
    pub id: String,
    pub household_id: String,
    pub created_by: Option<String>,
    pub card_id: String,
    pub purchased_on: NaiveDate,
    pub description: Option<String>,
    pub total_cents: i64,
    pub installments_total: u32,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl TryFrom<&Value> for CardCharge {
    type Error = Error;

    fn try_from(row: &Value) -> Result<Self> {
        let purchased_on = ymd_prefix_field(row, "purchased_on")
            .ok_or_else(|| ValidationError::InvalidDate("purchased_on".to_string()))?;
        Ok(CardCharge {
            id: string_field(row, "id")?,
            household_id: string_field(row, "household_id")?,
            created_by: opt_string_field(row, "created_by"),
            card_id: string_field(row, "card_id")?,
            purchased_on,
            description: opt_string_field(row, "description"),
            total_cents: cents_field(row, "total_cents"),
            installments_total: opt_u32_field(row, "installments_total").unwrap_or(1),
            created_at: opt_timestamp_field(row, "created_at"),
            updated_at: opt_timestamp_field(row, "updated_at"),
        })
    }
}

/// Input model for a card purchase split into installments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCardCharge {
    pub household_id: String,
    pub created_by: String,
    pub card_id: String,
    pub purchased_on: NaiveDate,
    pub description: Option<String>,
    pub total_cents: i64,
    pub installments_total: u32,
    /// Overrides the card's own due day.
    pub due_day: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardInstallment {
    pub id: String,
    pub household_id: String,
    pub created_by: Option<String>,
    pub card_id: String,
    pub charge_id: String,
    /// 1-based position in the plan.
    pub n: u32,
    pub due_on: NaiveDate,
    pub amount_cents: i64,
    pub paid_at: Option<NaiveDateTime>,
    /// Joined from the charge when available.
    pub description: Option<String>,
    pub installments_total: Option<u32>,
}

impl CardInstallment {
    pub fn is_paid(&self) -> bool {
        self.paid_at.is_some()
    }
}

impl TryFrom<&Value> for CardInstallment {
    type Error = Error;

    fn try_from(row: &Value) -> Result<Self> {
        let due_on = ymd_prefix_field(row, "due_on")
            .ok_or_else(|| ValidationError::InvalidDate("due_on".to_string()))?;
        let charge = row.get("charge").cloned().unwrap_or(Value::Null);
        Ok(CardInstallment {
            id: string_field(row, "id")?,
            household_id: string_field(row, "household_id")?,
            created_by: opt_string_field(row, "created_by"),
            card_id: string_field(row, "card_id")?,
            charge_id: string_field(row, "charge_id")?,
            n: opt_u32_field(row, "n").unwrap_or(1),
            due_on,
            amount_cents: cents_field(row, "amount_cents"),
            paid_at: opt_timestamp_field(row, "paid_at"),
            description: opt_string_field(&charge, "description"),
            installments_total: opt_u32_field(&charge, "installments_total"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCardInstallment {
    pub household_id: String,
    pub created_by: String,
    pub card_id: String,
    pub charge_id: String,
    pub n: u32,
    pub due_on: NaiveDate,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedInstallment {
    pub n: u32,
    pub due_on: NaiveDate,
    pub amount_cents: i64,
}

/// Derived schedule of a charge. Amounts always add up to `total_cents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentPlan {
    pub total_cents: i64,
    pub installments_total: u32,
    pub purchased_on: NaiveDate,
    pub due_day: Option<u32>,
    pub installments: Vec<PlannedInstallment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeWithInstallments {
    pub charge: CardCharge,
    pub installments: Vec<CardInstallment>,
}

/// Filter for listing installments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentQuery {
    pub household_id: String,
    pub card_ids: Vec<String>,
    /// Inclusive.
    pub from: Option<NaiveDate>,
    /// Exclusive.
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub include_paid: bool,
}

/// Future installment totals per month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentForecast {
    /// `YYYY-MM` to cents.
    pub by_month: BTreeMap<String, i64>,
    /// Earliest month with a value.
    pub next_month: Option<String>,
    pub next_total_cents: i64,
}
