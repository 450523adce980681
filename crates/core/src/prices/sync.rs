//! Bulk price synchronization.
//!
//! The [`PriceSyncService`] walks an owner's cards in order, reuses fresh
//! cached prices, fetches the rest through the shared rate-limited fetcher,
//! writes results back, evaluates alerts, and reports progress. At most one
//! run is active per owner.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use rust_decimal::Decimal;

use cardvault_market_data::{FetchError, PriceSelection, RateLimitedFetcher};

use super::alerts::{AlertDecision, AlertEvaluator};
use super::cache::PriceCache;
use super::errors::PriceSyncError;
use super::events::{NoOpSyncEventSink, SyncEventSink};
use super::progress::{ProgressState, ProgressTracker, SyncRun, SyncSummary};
use crate::cards::{CardPriceRecord, CardStore, NewPriceAlert, PriceUpdate};
use crate::constants::ALERT_TYPE_PRICE_CHANGE;
use crate::errors::Result;
use crate::settings::PriceSyncSettings;

/// Acknowledgement of a run started in the background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncStarted {
    pub total: usize,
}

/// Result of syncing a single card.
enum CardOutcome {
    Updated { name: String },
    Failed { name: String, reason: String },
    Fatal { name: String, reason: String },
}

/// Price synchronization service.
///
/// Holds the process-wide cache and fetcher, plus one progress tracker per
/// owner that has ever started a run.
pub struct PriceSyncService<S>
where
    S: CardStore,
{
    store: Arc<S>,
    fetcher: RateLimitedFetcher,
    cache: Arc<PriceCache>,
    evaluator: AlertEvaluator,
    sink: Arc<dyn SyncEventSink>,
    trackers: Mutex<HashMap<String, Arc<ProgressTracker>>>,
}

impl<S> PriceSyncService<S>
where
    S: CardStore + 'static,
{
    pub fn new(store: Arc<S>, fetcher: RateLimitedFetcher, settings: &PriceSyncSettings) -> Self {
        Self {
            store,
            fetcher,
            cache: Arc::new(PriceCache::new(settings.cache_ttl())),
            evaluator: AlertEvaluator::from_settings(settings),
            sink: Arc::new(NoOpSyncEventSink),
            trackers: Mutex::new(HashMap::new()),
        }
    }

    /// Share a cache with other services.
    pub fn with_cache(mut self, cache: Arc<PriceCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn SyncEventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn cache(&self) -> Arc<PriceCache> {
        Arc::clone(&self.cache)
    }

    pub fn store(&self) -> Arc<S> {
        Arc::clone(&self.store)
    }

    fn lock_trackers(&self) -> MutexGuard<'_, HashMap<String, Arc<ProgressTracker>>> {
        self.trackers.lock().unwrap_or_else(|poisoned| {
            warn!("Progress tracker map mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// The owner's tracker, created on first use. Only starting a run calls this.
    fn tracker(&self, owner_id: &str) -> Arc<ProgressTracker> {
        self.lock_trackers()
            .entry(owner_id.to_string())
            .or_insert_with(|| Arc::new(ProgressTracker::new(owner_id, Arc::clone(&self.sink))))
            .clone()
    }

    fn existing_tracker(&self, owner_id: &str) -> Option<Arc<ProgressTracker>> {
        self.lock_trackers().get(owner_id).cloned()
    }

    /// Current progress snapshot for an owner. Owners that never started a
    /// run report the idle state.
    pub fn status(&self, owner_id: &str) -> ProgressState {
        self.existing_tracker(owner_id)
            .map(|tracker| tracker.status())
            .unwrap_or_default()
    }

    pub fn is_running(&self, owner_id: &str) -> bool {
        self.existing_tracker(owner_id)
            .is_some_and(|tracker| tracker.is_active())
    }

    /// Number of owners that have started at least one run.
    pub fn tracked_owner_count(&self) -> usize {
        self.lock_trackers().len()
    }

    /// Start a run in the background and return immediately.
    ///
    /// `card_ids` of `None` means all of the owner's cards. Fails with
    /// [`PriceSyncError::AlreadyRunning`] if the owner has an active run.
    pub fn start_bulk_sync(
        self: &Arc<Self>,
        owner_id: &str,
        card_ids: Option<Vec<String>>,
    ) -> Result<SyncStarted> {
        let (run, card_ids) = self.begin(owner_id, card_ids)?;
        let total = run.total();

        let service = Arc::clone(self);
        let owner_id = owner_id.to_string();
        tokio::spawn(async move {
            service.execute(&owner_id, run, card_ids).await;
        });

        Ok(SyncStarted { total })
    }

    /// Run a sync to completion on the caller's task.
    pub async fn run_bulk_sync(
        &self,
        owner_id: &str,
        card_ids: Option<Vec<String>>,
    ) -> Result<SyncSummary> {
        let (run, card_ids) = self.begin(owner_id, card_ids)?;
        Ok(self.execute(owner_id, run, card_ids).await)
    }

    fn begin(
        &self,
        owner_id: &str,
        card_ids: Option<Vec<String>>,
    ) -> Result<(SyncRun, Vec<String>)> {
        let tracker = self.tracker(owner_id);
        let already_running = || PriceSyncError::AlreadyRunning {
            owner_id: owner_id.to_string(),
        };

        if tracker.is_active() {
            return Err(already_running().into());
        }

        let card_ids = match card_ids {
            Some(ids) => ids,
            None => self.store.list_card_ids(owner_id)?,
        };

        let run = tracker
            .try_begin(card_ids.len())
            .ok_or_else(already_running)?;

        info!(
            "Starting price update for owner {} ({} cards)",
            owner_id,
            card_ids.len()
        );
        Ok((run, card_ids))
    }

    async fn execute(&self, owner_id: &str, mut run: SyncRun, card_ids: Vec<String>) -> SyncSummary {
        for card_id in &card_ids {
            match self.sync_card(owner_id, card_id).await {
                CardOutcome::Updated { name } => run.record_success(&name),
                CardOutcome::Failed { name, reason } => {
                    warn!("Error updating {}: {}", name, reason);
                    run.record_error(&name, &reason);
                }
                CardOutcome::Fatal { name, reason } => {
                    error!(
                        "Aborting price update for owner {} at {}: {}",
                        owner_id, name, reason
                    );
                    return run.abort(&name, &reason);
                }
            }
        }

        let summary = run.complete();
        info!(
            "Price update completed for owner {}: {} updated, {} errors, {} total",
            owner_id, summary.updated_count, summary.error_count, summary.total
        );
        summary
    }

    async fn sync_card(&self, owner_id: &str, card_id: &str) -> CardOutcome {
        let card = match self.store.get_card(card_id) {
            Ok(Some(card)) if card.owner_id == owner_id => card,
            Ok(_) => {
                return CardOutcome::Failed {
                    name: card_id.to_string(),
                    reason: "Card not found".to_string(),
                }
            }
            Err(e) => {
                return CardOutcome::Failed {
                    name: card_id.to_string(),
                    reason: e.to_string(),
                }
            }
        };

        let lookup = card.lookup();
        let key = lookup.cache_key();

        let (usd, usd_foil) = match self.cache.get_fresh(&key, Utc::now()) {
            Some(entry) => {
                debug!("Using cached price for {}", lookup);
                (entry.price_usd, entry.price_usd_foil)
            }
            None => match self.fetcher.fetch_price(&lookup).await {
                Ok(quote) => {
                    self.cache
                        .put(&key, quote.usd, quote.usd_foil, quote.fetched_at);
                    (quote.usd, quote.usd_foil)
                }
                Err(FetchError::Fatal(e)) => {
                    return CardOutcome::Fatal {
                        name: card.name,
                        reason: e.to_string(),
                    }
                }
                Err(e) => {
                    return CardOutcome::Failed {
                        name: card.name,
                        reason: e.to_string(),
                    }
                }
            },
        };

        let Some(selection) = PriceSelection::choose(usd, usd_foil, card.is_foil) else {
            return CardOutcome::Failed {
                name: card.name,
                reason: "No price available".to_string(),
            };
        };
        if selection.fallback {
            info!(
                "No {} price for {}, using {:?} price {}",
                if card.is_foil { "foil" } else { "regular" },
                lookup,
                selection.variant,
                selection.price
            );
        }

        let now = Utc::now();
        let update = PriceUpdate {
            card_id: card.id.clone(),
            price: usd,
            price_foil: usd_foil,
            market_price: selection.price,
            price_fallback: selection.fallback,
            updated_at: now,
        };
        if let Err(e) = self.store.write_price(update).await {
            return CardOutcome::Failed {
                name: card.name,
                reason: e.to_string(),
            };
        }

        self.check_alert(&card, selection.price, now).await;

        CardOutcome::Updated { name: card.name }
    }

    /// Alert bookkeeping never fails the card; problems are logged.
    async fn check_alert(&self, card: &CardPriceRecord, new_price: Decimal, now: DateTime<Utc>) {
        let state = match self.store.get_alert_state(&card.id) {
            Ok(state) => state,
            Err(e) => {
                warn!("Failed to read alert state for {}: {}", card.name, e);
                return;
            }
        };

        let (direction, change_pct, threshold_pct, triggered_at) =
            match self
                .evaluator
                .evaluate(card.market_price, new_price, now, &state)
            {
                AlertDecision::Fire {
                    direction,
                    change_pct,
                    threshold_pct,
                    triggered_at,
                } => (direction, change_pct, threshold_pct, triggered_at),
                AlertDecision::Suppressed(reason) => {
                    debug!("No alert for {}: {:?}", card.name, reason);
                    return;
                }
            };
        // A fired alert always has a non-zero baseline
        let previous_value = card.market_price.unwrap_or_default();

        info!(
            "Price alert for {}: {} -> {} ({}%)",
            card.name, previous_value, new_price, change_pct
        );

        let alert = NewPriceAlert {
            card_id: card.id.clone(),
            owner_id: card.owner_id.clone(),
            card_name: card.name.clone(),
            alert_type: ALERT_TYPE_PRICE_CHANGE.to_string(),
            threshold_value: threshold_pct,
            previous_value,
            current_value: new_price,
            change_pct,
            direction,
            triggered_at,
        };
        if let Err(e) = self.store.record_alert(alert).await {
            warn!("Failed to record price alert for {}: {}", card.name, e);
        }
    }
}
