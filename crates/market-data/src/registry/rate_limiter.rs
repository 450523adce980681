//! Minimum-spacing rate limiter for price sources.
//!
//! Every outbound call to the pricing catalogue passes through one shared
//! limiter. Waiters are served in arrival order, and the start of two
//! successive calls is never closer than the configured spacing, no matter
//! how many sync runs are active.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::debug;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::provider::DEFAULT_MIN_SPACING;

/// FIFO rate limiter enforcing a minimum spacing between call starts.
///
/// The inner mutex is tokio's fair mutex: tasks acquire it in the order
/// they asked for it. The holder sleeps until its slot opens, records the
/// slot, and releases the lock, so the queue drains one slot at a time.
pub struct RateLimiter {
    /// Start instant of the most recent call, `None` before the first one.
    last_call: Mutex<Option<Instant>>,
    min_spacing: Duration,
}

impl RateLimiter {
    /// Create a limiter with the default spacing (100 ms).
    pub fn new() -> Self {
        Self::with_spacing(DEFAULT_MIN_SPACING)
    }

    pub fn with_spacing(min_spacing: Duration) -> Self {
        Self {
            last_call: Mutex::new(None),
            min_spacing,
        }
    }

    pub fn min_spacing(&self) -> Duration {
        self.min_spacing
    }

    /// Wait for the next free slot and claim it.
    ///
    /// Returns once the caller may start its call.
    pub async fn acquire(&self) {
        let mut last_call = self.last_call.lock().await;

        if let Some(prev) = *last_call {
            let next_slot = prev + self.min_spacing;
            if next_slot > Instant::now() {
                debug!(
                    "Rate limiter: waiting {:?} for next slot",
                    next_slot - Instant::now()
                );
                tokio::time::sleep_until(next_slot).await;
            }
        }

        *last_call = Some(Instant::now());
    }

    /// Claim a slot only if one is free right now.
    ///
    /// Returns false when another caller holds the queue or the spacing
    /// since the previous call has not elapsed yet.
    pub fn try_acquire(&self) -> bool {
        let Ok(mut last_call) = self.last_call.try_lock() else {
            return false;
        };

        let now = Instant::now();
        match *last_call {
            Some(prev) if now < prev + self.min_spacing => false,
            _ => {
                *last_call = Some(now);
                true
            }
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Paces the outbound requests of a single price fetch.
///
/// A source may need more than one request per card (an exact printing, then
/// a name search). Each request waits for its own limiter slot through
/// [`RequestPacer::ready`].
pub struct RequestPacer<'a> {
    limiter: &'a RateLimiter,
    slot_held: AtomicBool,
}

impl<'a> RequestPacer<'a> {
    /// A pacer that claims a slot for every request, the first included.
    pub fn new(limiter: &'a RateLimiter) -> Self {
        Self {
            limiter,
            slot_held: AtomicBool::new(false),
        }
    }

    /// A pacer whose first request uses a slot the caller already claimed.
    pub fn with_claimed_slot(limiter: &'a RateLimiter) -> Self {
        Self {
            limiter,
            slot_held: AtomicBool::new(true),
        }
    }

    /// Wait until the next outbound request may start.
    pub async fn ready(&self) {
        if self.slot_held.swap(false, Ordering::AcqRel) {
            return;
        }
        self.limiter.acquire().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_first_acquire_is_immediate() {
        let limiter = RateLimiter::with_spacing(Duration::from_millis(200));

        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_successive_acquires_are_spaced() {
        let limiter = RateLimiter::with_spacing(Duration::from_millis(30));

        let start = Instant::now();
        for _ in 0..4 {
            limiter.acquire().await;
        }

        // Three gaps of at least 30ms each
        assert!(start.elapsed() >= Duration::from_millis(90));
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_spacing() {
        let limiter = Arc::new(RateLimiter::with_spacing(Duration::from_millis(25)));

        let start = Instant::now();
        let mut handles = Vec::new();
        for _ in 0..5 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move { limiter.acquire().await }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Five callers need four gaps, whichever task runs first
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_try_acquire() {
        let limiter = RateLimiter::with_spacing(Duration::from_millis(50));

        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(limiter.try_acquire());
    }

    #[tokio::test]
    async fn test_pacer_spaces_every_request() {
        let limiter = RateLimiter::with_spacing(Duration::from_millis(40));
        let pacer = RequestPacer::new(&limiter);

        let start = Instant::now();
        pacer.ready().await;
        pacer.ready().await;
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_pacer_uses_claimed_slot_once() {
        let limiter = RateLimiter::with_spacing(Duration::from_millis(40));
        limiter.acquire().await;
        let pacer = RequestPacer::with_claimed_slot(&limiter);

        let start = Instant::now();
        pacer.ready().await;
        assert!(start.elapsed() < Duration::from_millis(30));

        // The second request still waits out the spacing after the claimed slot
        pacer.ready().await;
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_default_spacing() {
        assert_eq!(RateLimiter::new().min_spacing(), Duration::from_millis(100));
    }
}
