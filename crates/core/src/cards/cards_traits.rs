//! Card store trait.
//!
//! Defines the contract between the price engine and whatever persists the
//! inventory, without any database-specific types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::cards_model::{AlertState, CardPriceRecord, NewPriceAlert, PriceAlert, PriceUpdate};
use crate::errors::Result;

/// Storage interface used by the price engine.
///
/// Reads are synchronous and expected to be fast; writes are async because
/// implementations may funnel them through a single writer.
#[async_trait]
pub trait CardStore: Send + Sync {
    // =========================================================================
    // Reads
    // =========================================================================

    /// Retrieves a card by its ID, `None` if it no longer exists.
    fn get_card(&self, card_id: &str) -> Result<Option<CardPriceRecord>>;

    /// Lists the IDs of all cards of an owner, in stable order.
    fn list_card_ids(&self, owner_id: &str) -> Result<Vec<String>>;

    /// Lists the IDs of an owner's cards whose alerts are enabled.
    fn list_alert_watched_card_ids(&self, owner_id: &str) -> Result<Vec<String>>;

    /// Lists owners having at least one card with alerts enabled.
    fn list_alert_owner_ids(&self) -> Result<Vec<String>>;

    /// Reads the alert bookkeeping of a card.
    fn get_alert_state(&self, card_id: &str) -> Result<AlertState>;

    /// Lists an owner's alerts, newest first.
    fn list_alerts(&self, owner_id: &str, unread_only: bool) -> Result<Vec<PriceAlert>>;

    // =========================================================================
    // Writes
    // =========================================================================

    /// Writes fetched prices and recomputes the derived valuation fields.
    async fn write_price(&self, update: PriceUpdate) -> Result<()>;

    /// Records when an alert last fired for a card.
    async fn write_alert_state(&self, card_id: &str, last_triggered_at: DateTime<Utc>)
        -> Result<()>;

    /// Persists a fired alert and stamps the card's `last_alert_at` with its
    /// `triggered_at`, both in one transaction.
    async fn record_alert(&self, alert: NewPriceAlert) -> Result<PriceAlert>;

    /// Marks an owner's alert as read.
    ///
    /// Fails with `DatabaseError::NotFound` when the alert does not exist or
    /// belongs to another owner.
    async fn mark_alert_read(&self, owner_id: &str, alert_id: &str) -> Result<()>;
}
