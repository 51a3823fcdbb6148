//! SQLite storage implementation for transactions and categories.

mod model;
mod repository;

pub use model::{CategoryDB, TransactionDB};
pub use repository::LedgerRepository;
