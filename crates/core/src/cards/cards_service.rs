use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error, info, warn};

use super::cards_model::{
    CardInstallment, CardUpdate, ChargeWithInstallments, InstallmentForecast, InstallmentQuery,
    NewCard, NewCardCharge, NewCardInstallment, PaymentMethod,
};
use super::cards_traits::{CardRepositoryTrait, CardServiceTrait};
use super::installments::{build_forecast, plan_installments};
use crate::constants::MAX_DUE_DAY;
use crate::errors::{DatabaseError, Result, ValidationError};
use crate::events::{DomainEvent, DomainEventSink};
use crate::utils::Clock;

/// Service for cards, card charges and their installments.
pub struct CardService {
    repository: Arc<dyn CardRepositoryTrait>,
    clock: Arc<dyn Clock>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl CardService {
    pub fn new(
        repository: Arc<dyn CardRepositoryTrait>,
        clock: Arc<dyn Clock>,
        event_sink: Arc<dyn DomainEventSink>,
    ) -> Self {
        Self {
            repository,
            clock,
            event_sink,
        }
    }

    fn check_day(field: &str, day: Option<u32>) -> Result<()> {
        match day {
            Some(d) if !(1..=MAX_DUE_DAY).contains(&d) => Err(ValidationError::InvalidInput(
                format!("{} must be between 1 and {}, got {}", field, MAX_DUE_DAY, d),
            )
            .into()),
            _ => Ok(()),
        }
    }

    fn trimmed_name(name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("name".to_string()).into());
        }
        Ok(name.to_string())
    }
}

#[async_trait]
impl CardServiceTrait for CardService {
    async fn list_payment_methods(&self, household_id: &str) -> Result<Vec<PaymentMethod>> {
        self.repository.list_payment_methods(household_id).await
    }

    async fn list_cards(&self, household_id: &str) -> Result<Vec<PaymentMethod>> {
        let methods = self.repository.list_payment_methods(household_id).await?;
        Ok(methods.into_iter().filter(PaymentMethod::is_card).collect())
    }

    async fn add_card(&self, new_card: NewCard) -> Result<PaymentMethod> {
        Self::check_day("dueDay", new_card.due_day)?;
        Self::check_day("closingDay", new_card.closing_day)?;
        let card = NewCard {
            name: Self::trimmed_name(&new_card.name)?,
            credit_limit_cents: new_card.credit_limit_cents.max(0),
            limit_behavior: Some(new_card.limit_behavior.unwrap_or_default()),
            ..new_card
        };
        let created = self.repository.insert_card(card).await?;
        debug!("Added card {} for household {}", created.id, created.household_id);
        Ok(created)
    }

    async fn update_card(&self, update: CardUpdate) -> Result<PaymentMethod> {
        Self::check_day("dueDay", update.due_day.flatten())?;
        Self::check_day("closingDay", update.closing_day.flatten())?;
        let name = match update.name.as_deref() {
            Some(name) => Some(Self::trimmed_name(name)?),
            None => None,
        };
        let patch = CardUpdate {
            name,
            credit_limit_cents: update.credit_limit_cents.map(|c| c.max(0)),
            ..update
        };
        self.repository.update_card(patch).await
    }

    async fn add_charge_with_installments(
        &self,
        new_charge: NewCardCharge,
    ) -> Result<ChargeWithInstallments> {
        let card = self
            .repository
            .get_payment_method(&new_charge.household_id, &new_charge.card_id)
            .await?
            .filter(PaymentMethod::is_card)
            .ok_or_else(|| {
                DatabaseError::NotFound(format!("Card {} not found", new_charge.card_id))
            })?;

        // Validated before any write.
        let plan = plan_installments(
            new_charge.total_cents,
            new_charge.installments_total,
            new_charge.purchased_on,
            new_charge.due_day.or(card.due_day),
        )?;

        let description = new_charge
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        let charge = self
            .repository
            .insert_charge(NewCardCharge {
                description,
                ..new_charge
            })
            .await?;

        let rows: Vec<NewCardInstallment> = plan
            .installments
            .iter()
            .map(|planned| NewCardInstallment {
                household_id: charge.household_id.clone(),
                created_by: charge.created_by.clone().unwrap_or_default(),
                card_id: charge.card_id.clone(),
                charge_id: charge.id.clone(),
                n: planned.n,
                due_on: planned.due_on,
                amount_cents: planned.amount_cents,
            })
            .collect();

        let installments = match self.repository.insert_installments(rows).await {
            Ok(installments) => installments,
            Err(e) => {
                warn!(
                    "Installments for charge {} failed ({}), removing the charge",
                    charge.id, e
                );
                if let Err(rollback_err) = self
                    .repository
                    .delete_charge(&charge.household_id, &charge.id)
                    .await
                {
                    error!(
                        "Failed to roll back charge {}: {}",
                        charge.id, rollback_err
                    );
                }
                return Err(e);
            }
        };

        info!(
            "Created charge {} on card {}: {} cents in {} installments",
            charge.id,
            charge.card_id,
            charge.total_cents,
            installments.len()
        );
        self.event_sink.emit(DomainEvent::card_charge_created(
            &charge.household_id,
            &charge.card_id,
            &charge.id,
        ));
        Ok(ChargeWithInstallments {
            charge,
            installments,
        })
    }

    async fn list_installments(&self, query: InstallmentQuery) -> Result<Vec<CardInstallment>> {
        if query.card_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.repository.list_installments(query).await
    }

    async fn list_unpaid_installments(
        &self,
        household_id: &str,
        card_ids: &[String],
    ) -> Result<Vec<CardInstallment>> {
        self.list_installments(InstallmentQuery {
            household_id: household_id.to_string(),
            card_ids: card_ids.to_vec(),
            from: None,
            to: None,
            include_paid: false,
        })
        .await
    }

    async fn set_installment_paid(
        &self,
        household_id: &str,
        installment_id: &str,
        paid: bool,
    ) -> Result<CardInstallment> {
        let paid_at = paid.then(|| self.clock.now());
        self.repository
            .set_installment_paid_at(household_id, installment_id, paid_at)
            .await
    }

    async fn used_limit_cents(&self, household_id: &str, card_id: &str) -> Result<i64> {
        let unpaid = self
            .list_unpaid_installments(household_id, &[card_id.to_string()])
            .await?;
        Ok(unpaid.iter().map(|i| i.amount_cents).sum())
    }

    async fn forecast(
        &self,
        household_id: &str,
        card_ids: &[String],
        months_ahead: u32,
    ) -> Result<InstallmentForecast> {
        let unpaid = self.list_unpaid_installments(household_id, card_ids).await?;
        build_forecast(&unpaid, self.clock.today(), months_ahead)
    }
}
