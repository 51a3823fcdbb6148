//! Domain event types.

use serde::{Deserialize, Serialize};

/// Domain events emitted by core services after successful mutations.
///
/// Every event carries the household it belongs to, so subscribers scoped to
/// one household never see another household's changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// Transactions were added; cached net figures are stale.
    TransactionsChanged { household_id: String },

    /// Goals or their contributions changed; progress figures are stale.
    GoalsChanged { household_id: String },

    /// The pay schedule mode or activation date changed.
    ScheduleChanged { household_id: String },

    /// A cycle was closed (or re-closed) with a new allocation.
    CycleClosed {
        household_id: String,
        cycle_key: String,
    },

    /// A card charge and its installments were created.
    CardChargeCreated {
        household_id: String,
        card_id: String,
        charge_id: String,
    },
}

impl DomainEvent {
    pub fn transactions_changed(household_id: impl Into<String>) -> Self {
        Self::TransactionsChanged {
            household_id: household_id.into(),
        }
    }

    pub fn goals_changed(household_id: impl Into<String>) -> Self {
        Self::GoalsChanged {
            household_id: household_id.into(),
        }
    }

    pub fn schedule_changed(household_id: impl Into<String>) -> Self {
        Self::ScheduleChanged {
            household_id: household_id.into(),
        }
    }

    pub fn cycle_closed(household_id: impl Into<String>, cycle_key: impl Into<String>) -> Self {
        Self::CycleClosed {
            household_id: household_id.into(),
            cycle_key: cycle_key.into(),
        }
    }

    pub fn card_charge_created(
        household_id: impl Into<String>,
        card_id: impl Into<String>,
        charge_id: impl Into<String>,
    ) -> Self {
        Self::CardChargeCreated {
            household_id: household_id.into(),
            card_id: card_id.into(),
            charge_id: charge_id.into(),
        }
    }

    /// The household this event belongs to.
    pub fn household_id(&self) -> &str {
        match self {
            Self::TransactionsChanged { household_id }
            | Self::GoalsChanged { household_id }
            | Self::ScheduleChanged { household_id }
            | Self::CycleClosed { household_id, .. }
            | Self::CardChargeCreated { household_id, .. } => household_id,
        }
    }

    /// The serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TransactionsChanged { .. } => "transactions_changed",
            Self::GoalsChanged { .. } => "goals_changed",
            Self::ScheduleChanged { .. } => "schedule_changed",
            Self::CycleClosed { .. } => "cycle_closed",
            Self::CardChargeCreated { .. } => "card_charge_created",
        }
    }
}
