//! Progress event sink trait and implementations.

use std::sync::{Arc, Mutex};

use super::progress::ProgressState;

/// Receives every progress state a sync run publishes.
///
/// Implementations translate progress into platform-specific actions
/// (push to a UI, log). The tracker itself is the source of truth for
/// polling clients; a sink is a best-effort side channel.
///
/// `emit()` must be fast and must not block.
pub trait SyncEventSink: Send + Sync {
    fn emit(&self, owner_id: &str, state: &ProgressState);
}

/// No-op implementation for contexts that only poll.
#[derive(Clone, Default)]
pub struct NoOpSyncEventSink;

impl SyncEventSink for NoOpSyncEventSink {
    fn emit(&self, _owner_id: &str, _state: &ProgressState) {}
}

/// Mock sink for testing - collects emitted states.
#[derive(Clone, Default)]
pub struct MockSyncEventSink {
    events: Arc<Mutex<Vec<(String, ProgressState)>>>,
}

impl MockSyncEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected states, in emission order.
    pub fn events(&self) -> Vec<ProgressState> {
        self.lock().iter().map(|(_, state)| state.clone()).collect()
    }

    /// Returns the states emitted for one owner.
    pub fn events_for(&self, owner_id: &str) -> Vec<ProgressState> {
        self.lock()
            .iter()
            .filter(|(owner, _)| owner == owner_id)
            .map(|(_, state)| state.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, ProgressState)>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SyncEventSink for MockSyncEventSink {
    fn emit(&self, owner_id: &str, state: &ProgressState) {
        self.lock().push((owner_id.to_string(), state.clone()));
    }
}
