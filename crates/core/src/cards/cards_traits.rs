use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::cards_model::{
    CardCharge, CardInstallment, CardUpdate, ChargeWithInstallments, InstallmentForecast,
    InstallmentQuery, NewCard, NewCardCharge, NewCardInstallment, PaymentMethod,
};
use crate::errors::Result;

/// Trait for payment method, charge and installment persistence.
#[async_trait]
pub trait CardRepositoryTrait: Send + Sync {
    /// Ordered by type, then name.
    async fn list_payment_methods(&self, household_id: &str) -> Result<Vec<PaymentMethod>>;
    async fn get_payment_method(
        &self,
        household_id: &str,
        id: &str,
    ) -> Result<Option<PaymentMethod>>;
    async fn insert_card(&self, new_card: NewCard) -> Result<PaymentMethod>;
    async fn update_card(&self, update: CardUpdate) -> Result<PaymentMethod>;
    async fn insert_charge(&self, new_charge: NewCardCharge) -> Result<CardCharge>;
    async fn delete_charge(&self, household_id: &str, charge_id: &str) -> Result<usize>;
    /// Inserts all rows or none.
    async fn insert_installments(
        &self,
        installments: Vec<NewCardInstallment>,
    ) -> Result<Vec<CardInstallment>>;
    /// Ordered by due date.
    async fn list_installments(&self, query: InstallmentQuery) -> Result<Vec<CardInstallment>>;
    async fn set_installment_paid_at(
        &self,
        household_id: &str,
        installment_id: &str,
        paid_at: Option<NaiveDateTime>,
    ) -> Result<CardInstallment>;
}

/// Trait for card service operations.
#[async_trait]
pub trait CardServiceTrait: Send + Sync {
    async fn list_payment_methods(&self, household_id: &str) -> Result<Vec<PaymentMethod>>;
    async fn list_cards(&self, household_id: &str) -> Result<Vec<PaymentMethod>>;
    async fn add_card(&self, new_card: NewCard) -> Result<PaymentMethod>;
    async fn update_card(&self, update: CardUpdate) -> Result<PaymentMethod>;
    /// Creates the charge and its installments; the charge is removed again
    /// if the installments cannot be written.
    async fn add_charge_with_installments(
        &self,
        new_charge: NewCardCharge,
    ) -> Result<ChargeWithInstallments>;
    async fn list_installments(&self, query: InstallmentQuery) -> Result<Vec<CardInstallment>>;
    async fn list_unpaid_installments(
        &self,
        household_id: &str,
        card_ids: &[String],
    ) -> Result<Vec<CardInstallment>>;
    async fn set_installment_paid(
        &self,
        household_id: &str,
        installment_id: &str,
        paid: bool,
    ) -> Result<CardInstallment>;
    /// Sum of the card's unpaid installments, overdue ones included.
    async fn used_limit_cents(&self, household_id: &str, card_id: &str) -> Result<i64>;
    async fn forecast(
        &self,
        household_id: &str,
        card_ids: &[String],
        months_ahead: u32,
    ) -> Result<InstallmentForecast>;
}
