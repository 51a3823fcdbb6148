//! SQLite storage for Hearth.
//!
//! Implements every repository trait defined in `hearth-core` with Diesel on
//! a single SQLite file:
//! - connection pooling and the single writer actor
//! - embedded migrations
//! - Diesel model types per domain
//!
//! ```text
//! core (domain services)
//!         │  repository traits
//!         ▼
//! storage-sqlite (this crate)
//!         │
//!         ▼
//!     SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod cards;
pub mod closures;
pub mod goals;
pub mod ledger;
pub mod schedule;

pub use cards::CardRepository;
pub use closures::ClosureRepository;
pub use goals::GoalRepository;
pub use ledger::LedgerRepository;
pub use schedule::PayScheduleRepository;

pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

pub use errors::{IntoCore, StorageError};

// Re-export from hearth-core for convenience
pub use hearth_core::errors::{DatabaseError, Error, Result};
