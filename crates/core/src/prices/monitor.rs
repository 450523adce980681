//! Periodic sweep over cards with price alerts enabled.

use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;

use super::errors::PriceSyncError;
use super::sync::PriceSyncService;
use crate::cards::CardStore;
use crate::errors::{Error, Result};

/// What one sweep did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    /// Owners for which a background run was started.
    pub started: usize,
    /// Owners skipped because a run was already active.
    pub skipped: usize,
    /// Owners whose cards could not be listed or whose run failed to start.
    pub failed: usize,
    /// Cards queued across all started runs.
    pub cards: usize,
}

/// Starts a background sync for every owner watching prices.
///
/// The monitor only enumerates and triggers; scheduling lives with the
/// caller.
pub struct PriceMonitor<S>
where
    S: CardStore,
{
    service: Arc<PriceSyncService<S>>,
}

impl<S> PriceMonitor<S>
where
    S: CardStore + 'static,
{
    pub fn new(service: Arc<PriceSyncService<S>>) -> Self {
        Self { service }
    }

    /// Run one sweep.
    ///
    /// Fails only when the owners cannot be enumerated at all.
    pub fn sweep(&self) -> Result<SweepReport> {
        let store = self.service.store();
        let owners = store.list_alert_owner_ids()?;
        debug!("Price monitor sweep over {} owners", owners.len());

        let mut report = SweepReport::default();
        for owner_id in owners {
            let card_ids = match store.list_alert_watched_card_ids(&owner_id) {
                Ok(ids) if ids.is_empty() => continue,
                Ok(ids) => ids,
                Err(e) => {
                    warn!("Failed to list watched cards for {}: {}", owner_id, e);
                    report.failed += 1;
                    continue;
                }
            };

            match self.service.start_bulk_sync(&owner_id, Some(card_ids)) {
                Ok(started) => {
                    report.started += 1;
                    report.cards += started.total;
                }
                Err(Error::PriceSync(PriceSyncError::AlreadyRunning { .. })) => {
                    info!(
                        "Skipping price monitor run for {}: update already running",
                        owner_id
                    );
                    report.skipped += 1;
                }
                Err(e) => {
                    warn!("Failed to start price monitor run for {}: {}", owner_id, e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Price monitor sweep: {} started, {} skipped, {} failed ({} cards)",
            report.started, report.skipped, report.failed, report.cards
        );
        Ok(report)
    }
}
