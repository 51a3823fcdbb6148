//! SQLite storage implementation for payment methods, charges and installments.

mod model;
mod repository;

pub use model::{CardChargeDB, CardInstallmentDB, PaymentMethodChangesDB, PaymentMethodDB};
pub use repository::CardRepository;
