//! Database models for cards.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use hearth_core::cards::{
    CardCharge, CardInstallment, CardUpdate, LimitBehavior, NewCard, NewCardCharge,
    NewCardInstallment, PaymentMethod, PaymentMethodType,
};
use hearth_core::errors::Error;

fn day_to_db(day: u32) -> i32 {
    i32::try_from(day).unwrap_or(i32::MAX)
}

fn day_from_db(day: i32) -> Option<u32> {
    u32::try_from(day).ok()
}

#[derive(Queryable, Selectable, Insertable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::payment_methods)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PaymentMethodDB {
    pub id: String,
    pub household_id: String,
    pub created_by: Option<String>,
    pub method_type: String,
    pub name: String,
    pub credit_limit_cents: Option<i64>,
    pub closing_day: Option<i32>,
    pub due_day: Option<i32>,
    pub limit_behavior: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Partial card update. `None` leaves a column alone, `Some(None)` clears it.
#[derive(AsChangeset, Debug, Default)]
#[diesel(table_name = crate::schema::payment_methods)]
pub struct PaymentMethodChangesDB {
    pub name: Option<String>,
    pub credit_limit_cents: Option<Option<i64>>,
    pub closing_day: Option<Option<i32>>,
    pub due_day: Option<Option<i32>>,
    pub limit_behavior: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Queryable, Selectable, Insertable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::schema::card_charges)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CardChargeDB {
    pub id: String,
    pub household_id: String,
    pub created_by: Option<String>,
    pub card_id: String,
    pub purchased_on: NaiveDate,
    pub description: Option<String>,
    pub total_cents: i64,
    pub installments_total: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Selectable, Insertable, Identifiable, Associations, Debug, Clone)]
#[diesel(belongs_to(CardChargeDB, foreign_key = charge_id))]
#[diesel(table_name = crate::schema::card_installments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CardInstallmentDB {
    pub id: String,
    pub household_id: String,
    pub created_by: Option<String>,
    pub card_id: String,
    pub charge_id: String,
    pub n: i32,
    pub due_on: NaiveDate,
    pub amount_cents: i64,
    pub paid_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

/// An installment row with the description and count of its charge.
pub type InstallmentRow = (CardInstallmentDB, Option<String>, i32);

impl PaymentMethodDB {
    pub fn from_new_card(new_card: NewCard, id: String, now: NaiveDateTime) -> Self {
        Self {
            id,
            household_id: new_card.household_id,
            created_by: Some(new_card.created_by),
            method_type: PaymentMethodType::Card.as_str().to_string(),
            name: new_card.name,
            credit_limit_cents: Some(new_card.credit_limit_cents),
            closing_day: new_card.closing_day.map(day_to_db),
            due_day: new_card.due_day.map(day_to_db),
            limit_behavior: new_card
                .limit_behavior
                .unwrap_or_default()
                .as_str()
                .to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<PaymentMethodDB> for PaymentMethod {
    type Error = Error;

    fn try_from(db: PaymentMethodDB) -> Result<Self, Error> {
        Ok(Self {
            method_type: PaymentMethodType::from_row(&db.method_type)?,
            id: db.id,
            household_id: db.household_id,
            created_by: db.created_by,
            name: db.name,
            credit_limit_cents: db.credit_limit_cents,
            closing_day: db.closing_day.and_then(day_from_db),
            due_day: db.due_day.and_then(day_from_db),
            limit_behavior: LimitBehavior::from_str_lossy(&db.limit_behavior),
            created_at: Some(db.created_at),
            updated_at: Some(db.updated_at),
        })
    }
}

impl PaymentMethodChangesDB {
    pub fn from_update(update: &CardUpdate, now: NaiveDateTime) -> Self {
        Self {
            name: update.name.clone(),
            credit_limit_cents: update.credit_limit_cents.map(Some),
            closing_day: update.closing_day.map(|day| day.map(day_to_db)),
            due_day: update.due_day.map(|day| day.map(day_to_db)),
            limit_behavior: update.limit_behavior.map(|b| b.as_str().to_string()),
            updated_at: Some(now),
        }
    }
}

impl CardChargeDB {
    pub fn from_new(new_charge: NewCardCharge, id: String, now: NaiveDateTime) -> Self {
        Self {
            id,
            household_id: new_charge.household_id,
            created_by: Some(new_charge.created_by),
            card_id: new_charge.card_id,
            purchased_on: new_charge.purchased_on,
            description: new_charge.description,
            total_cents: new_charge.total_cents,
            installments_total: day_to_db(new_charge.installments_total),
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<CardChargeDB> for CardCharge {
    fn from(db: CardChargeDB) -> Self {
        Self {
            id: db.id,
            household_id: db.household_id,
            created_by: db.created_by,
            card_id: db.card_id,
            purchased_on: db.purchased_on,
            description: db.description,
            total_cents: db.total_cents,
            installments_total: u32::try_from(db.installments_total).unwrap_or(1),
            created_at: Some(db.created_at),
            updated_at: Some(db.updated_at),
        }
    }
}

impl CardInstallmentDB {
    pub fn from_new(installment: NewCardInstallment, id: String, now: NaiveDateTime) -> Self {
        Self {
            id,
            household_id: installment.household_id,
            created_by: Some(installment.created_by),
            card_id: installment.card_id,
            charge_id: installment.charge_id,
            n: day_to_db(installment.n),
            due_on: installment.due_on,
            amount_cents: installment.amount_cents,
            paid_at: None,
            created_at: now,
        }
    }
}

/// Converts a joined installment row into the domain type.
pub fn installment_from_row(
    (db, description, installments_total): InstallmentRow,
) -> CardInstallment {
    CardInstallment {
        id: db.id,
        household_id: db.household_id,
        created_by: db.created_by,
        card_id: db.card_id,
        charge_id: db.charge_id,
        n: u32::try_from(db.n).unwrap_or(1),
        due_on: db.due_on,
        amount_cents: db.amount_cents,
        paid_at: db.paid_at,
        description,
        installments_total: u32::try_from(installments_total).ok(),
    }
}
