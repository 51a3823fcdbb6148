//! Cards module - payment methods, installment purchases and forecasts.

mod cards_model;
mod cards_service;
mod cards_traits;
mod installments;

pub use cards_model::*;
pub use cards_service::CardService;
pub use cards_traits::{CardRepositoryTrait, CardServiceTrait};
pub use installments::{build_forecast, first_due_date, plan_installments, split_installments};
