//! Price synchronization engine.
//!
//! - [`cache`] - TTL-based price snapshots
//! - [`alerts`] - threshold alerts with a per-card cooldown
//! - [`progress`] - single-flight progress tracking per owner
//! - [`events`] - progress event sinks
//! - [`sync`] - the bulk sync worker and its run trigger
//! - [`monitor`] - periodic sweep over alert-watched cards
//!
//! # Architecture
//!
//! ```text
//! PriceSyncService → RateLimitedFetcher → market-data crate (Scryfall)
//!       ↓        ↘
//! CardStore (DB)   PriceCache, AlertEvaluator, ProgressTracker
//! ```

pub mod alerts;
pub mod cache;
pub mod errors;
pub mod events;
pub mod monitor;
pub mod progress;
pub mod sync;


pub use alerts::{AlertDecision, AlertEvaluator, NoAlertReason};
pub use cache::{CacheEntry, PriceCache};
pub use errors::PriceSyncError;
pub use events::{MockSyncEventSink, NoOpSyncEventSink, SyncEventSink};
pub use monitor::{PriceMonitor, SweepReport};
pub use progress::{ProgressState, ProgressTracker, SyncPhase, SyncRun, SyncSummary};
pub use sync::{PriceSyncService, SyncStarted};
