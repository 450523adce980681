//! CardVault Core - Domain entities, services, and traits.
//!
//! This crate contains the price synchronization engine for a trading-card
//! inventory. It is database-agnostic and defines traits that are implemented
//! by the `storage-sqlite` crate.

pub mod cards;
pub mod constants;
pub mod errors;
pub mod prices;
pub mod settings;

// Re-export common types from the cards and prices modules
pub use cards::*;
pub use prices::{
    AlertDecision, AlertEvaluator, PriceCache, PriceMonitor, PriceSyncService, ProgressState,
    ProgressTracker, SyncPhase,
};
pub use settings::PriceSyncSettings;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
