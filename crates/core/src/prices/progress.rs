//! Live status of bulk price syncs.
//!
//! Each sync scope (one owner) has a single [`ProgressTracker`]. A run claims
//! the tracker with a compare-and-set on its active flag and receives a
//! [`SyncRun`] guard; only the guard mutates the state, and every mutation
//! replaces the whole snapshot so pollers never observe a torn mix.
//!
//! ```text
//! idle -> start -> {progress | error tick}* -> complete | error -> (next start)
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::events::SyncEventSink;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPhase {
    /// No run has happened in this scope yet.
    #[default]
    Idle,
    Start,
    Progress,
    Complete,
    /// A per-card error tick while `active`, the abort reason once inactive.
    Error,
}

/// Snapshot of a scope's sync status, as served to polling clients.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressState {
    pub active: bool,
    pub phase: SyncPhase,
    pub current: usize,
    pub total: usize,
    pub updated_count: usize,
    pub error_count: usize,
    pub message: String,
    pub card_name: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ProgressState {
    pub fn is_terminal(&self) -> bool {
        !self.active && matches!(self.phase, SyncPhase::Complete | SyncPhase::Error)
    }
}

/// Final counts of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub total: usize,
    pub processed: usize,
    pub updated_count: usize,
    pub error_count: usize,
    /// Reason the run stopped early, if it did.
    pub aborted: Option<String>,
}

/// Single-slot progress state for one sync scope.
pub struct ProgressTracker {
    owner_id: String,
    active: AtomicBool,
    state: RwLock<Arc<ProgressState>>,
    sink: Arc<dyn SyncEventSink>,
}

impl ProgressTracker {
    pub fn new(owner_id: impl Into<String>, sink: Arc<dyn SyncEventSink>) -> Self {
        Self {
            owner_id: owner_id.into(),
            active: AtomicBool::new(false),
            state: RwLock::new(Arc::new(ProgressState::default())),
            sink,
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Current snapshot. The last terminal state stays visible until the
    /// next run starts.
    pub fn status(&self) -> ProgressState {
        let guard = self.state.read().unwrap_or_else(|poisoned| {
            warn!("Progress state lock was poisoned, recovering");
            poisoned.into_inner()
        });
        ProgressState::clone(&guard)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Claim the slot for a run over `total` cards.
    ///
    /// Returns `None` without side effects if a run is already active.
    /// On success the `start` state has been published before this returns.
    pub fn try_begin(self: &Arc<Self>, total: usize) -> Option<SyncRun> {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Sync already active for owner {}", self.owner_id);
            return None;
        }

        let started_at = Utc::now();
        self.publish(ProgressState {
            active: true,
            phase: SyncPhase::Start,
            current: 0,
            total,
            updated_count: 0,
            error_count: 0,
            message: format!("Starting price update for {} cards...", total),
            card_name: None,
            started_at: Some(started_at),
            finished_at: None,
        });

        Some(SyncRun {
            tracker: Arc::clone(self),
            total,
            current: 0,
            updated_count: 0,
            error_count: 0,
            started_at,
            finished: false,
        })
    }

    fn publish(&self, state: ProgressState) {
        {
            let mut guard = self.state.write().unwrap_or_else(|poisoned| {
                warn!("Progress state lock was poisoned, recovering");
                poisoned.into_inner()
            });
            *guard = Arc::new(state.clone());
        }
        self.sink.emit(&self.owner_id, &state);
    }

    fn release(&self) {
        self.active.store(false, Ordering::Release);
    }
}

/// Exclusive handle on a tracker for the duration of one run.
///
/// Dropping the guard releases the slot. A run dropped before
/// [`complete`](Self::complete) or [`abort`](Self::abort) publishes an
/// `error` state first, so the tracker never stays `active`.
pub struct SyncRun {
    tracker: Arc<ProgressTracker>,
    total: usize,
    current: usize,
    updated_count: usize,
    error_count: usize,
    started_at: DateTime<Utc>,
    finished: bool,
}

impl SyncRun {
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// A card was priced and written.
    ///
    /// The tick for the last card is folded into the terminal event so that
    /// `current == total` is published exactly once.
    pub fn record_success(&mut self, card_name: &str) {
        self.advance();
        self.updated_count += 1;
        if self.current < self.total {
            let message = format!("Updated {}/{}: {}", self.current, self.total, card_name);
            self.publish_tick(SyncPhase::Progress, card_name, message);
        }
    }

    /// A card failed without ending the run.
    pub fn record_error(&mut self, card_name: &str, reason: &str) {
        self.advance();
        self.error_count += 1;
        if self.current < self.total {
            let message = format!("Error updating {}: {}", card_name, reason);
            self.publish_tick(SyncPhase::Error, card_name, message);
        }
    }

    /// All cards were processed.
    pub fn complete(mut self) -> SyncSummary {
        let message = format!(
            "Price update completed! Updated {} of {} cards.",
            self.updated_count, self.total
        );
        self.finish(SyncPhase::Complete, None, message);
        self.summary(None)
    }

    /// The run stops at `card_name`, which counts as processed and failed.
    pub fn abort(mut self, card_name: &str, reason: &str) -> SyncSummary {
        self.advance();
        self.error_count += 1;
        let message = format!("Price update aborted at {}: {}", card_name, reason);
        self.finish(SyncPhase::Error, Some(card_name), message);
        self.summary(Some(reason.to_string()))
    }

    fn advance(&mut self) {
        if self.current < self.total {
            self.current += 1;
        }
    }

    fn publish_tick(&self, phase: SyncPhase, card_name: &str, message: String) {
        self.tracker.publish(ProgressState {
            active: true,
            phase,
            current: self.current,
            total: self.total,
            updated_count: self.updated_count,
            error_count: self.error_count,
            message,
            card_name: Some(card_name.to_string()),
            started_at: Some(self.started_at),
            finished_at: None,
        });
    }

    fn finish(&mut self, phase: SyncPhase, card_name: Option<&str>, message: String) {
        self.finished = true;
        self.tracker.publish(ProgressState {
            active: false,
            phase,
            current: self.current,
            total: self.total,
            updated_count: self.updated_count,
            error_count: self.error_count,
            message,
            card_name: card_name.map(str::to_string),
            started_at: Some(self.started_at),
            finished_at: Some(Utc::now()),
        });
    }

    fn summary(&self, aborted: Option<String>) -> SyncSummary {
        SyncSummary {
            total: self.total,
            processed: self.current,
            updated_count: self.updated_count,
            error_count: self.error_count,
            aborted,
        }
    }
}

impl Drop for SyncRun {
    fn drop(&mut self) {
        if !self.finished {
            warn!(
                "Price sync for owner {} ended without a terminal state",
                self.tracker.owner_id
            );
            self.finish(
                SyncPhase::Error,
                None,
                "Price update interrupted".to_string(),
            );
        }
        self.tracker.release();
    }
}
