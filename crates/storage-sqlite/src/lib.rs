//! SQLite storage implementation for CardVault.
//!
//! This crate holds every Diesel dependency of the workspace. It implements
//! the `CardStore` trait defined in `cardvault-core` and contains:
//! - Database connection pooling and the single writer actor
//! - Diesel migrations for cards and price alerts
//! - Database-specific model types (with Diesel derives)
//!
//! ```text
//!      core (price engine)
//!              │
//!              ▼
//!   storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```

pub mod cards;
pub mod db;
pub mod errors;
pub mod schema;

pub use cards::CardRepository;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use cardvault_core::errors::{DatabaseError, Error, Result};
