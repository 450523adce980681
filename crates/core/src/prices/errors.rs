//! Price sync error types.

use thiserror::Error;

/// Errors surfaced by the price sync engine itself.
///
/// Per-card fetch failures are not errors at this level; they are counted
/// and reported through progress.
#[derive(Error, Debug)]
pub enum PriceSyncError {
    /// A run is already active for this owner.
    #[error("A price update is already running for owner {owner_id}")]
    AlreadyRunning { owner_id: String },
}
