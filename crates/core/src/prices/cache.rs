//! Time-stamped price snapshots keyed by catalogue identity.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;

/// A cached catalogue answer for one printing.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub key: String,
    pub price_usd: Option<Decimal>,
    pub price_usd_foil: Option<Decimal>,
    pub fetched_at: DateTime<Utc>,
}

/// Process-wide price cache.
///
/// Entries are never evicted, a refresh replaces the previous snapshot.
/// Reads and writes are safe from any number of concurrent sync runs.
pub struct PriceCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl PriceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn put(
        &self,
        key: &str,
        price_usd: Option<Decimal>,
        price_usd_foil: Option<Decimal>,
        now: DateTime<Utc>,
    ) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                key: key.to_string(),
                price_usd,
                price_usd_foil,
                fetched_at: now,
            },
        );
    }

    /// Fresh iff strictly younger than the TTL.
    pub fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.fetched_at < self.ttl
    }

    /// The entry for `key` if it is still fresh at `now`.
    pub fn get_fresh(&self, key: &str, now: DateTime<Utc>) -> Option<CacheEntry> {
        self.get(key).filter(|entry| self.is_fresh(entry, now))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::new(Duration::seconds(crate::constants::PRICE_CACHE_TTL_SECS))
    }
}
