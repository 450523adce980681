//! Rate-limited, time-bounded access to a price source.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::errors::{FetchError, MarketDataError};
use crate::models::{CardLookup, PriceQuote};
use crate::provider::PriceSource;

use super::rate_limiter::{RateLimiter, RequestPacer};

/// Wraps a [`PriceSource`] with the shared rate limiter and a per-call timeout.
///
/// All fetchers built from the same `Arc<RateLimiter>` share one FIFO queue,
/// so concurrent sync runs never exceed the catalogue's spacing together.
/// Failures come back classified as a [`FetchError`].
#[derive(Clone)]
pub struct RateLimitedFetcher {
    source: Arc<dyn PriceSource>,
    limiter: Arc<RateLimiter>,
    timeout: Duration,
}

impl RateLimitedFetcher {
    /// Create a fetcher with its own limiter, configured from the source's
    /// advertised [`RateLimit`](crate::provider::RateLimit).
    pub fn new(source: Arc<dyn PriceSource>) -> Self {
        let limits = source.rate_limit();
        Self {
            limiter: Arc::new(RateLimiter::with_spacing(limits.min_spacing)),
            timeout: limits.call_timeout,
            source,
        }
    }

    /// Create a fetcher sharing an existing limiter.
    pub fn with_limiter(
        source: Arc<dyn PriceSource>,
        limiter: Arc<RateLimiter>,
        timeout: Duration,
    ) -> Self {
        Self {
            source,
            limiter,
            timeout,
        }
    }

    pub fn source_id(&self) -> &'static str {
        self.source.id()
    }

    pub fn limiter(&self) -> Arc<RateLimiter> {
        self.limiter.clone()
    }

    /// Fetch a quote, waiting for a rate limit slot first.
    ///
    /// The first request goes out on the slot claimed here, and any further
    /// request of the same fetch claims its own. The timeout starts once the
    /// first slot is claimed, so time queued behind other fetches is excluded.
    pub async fn fetch_price(&self, lookup: &CardLookup) -> Result<PriceQuote, FetchError> {
        self.limiter.acquire().await;
        debug!("Fetching price for {} from {}", lookup, self.source.id());

        let pacer = RequestPacer::with_claimed_slot(&self.limiter);
        let call = self.source.fetch_price(lookup, &pacer);
        let result = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Price fetch for {} from {} timed out after {:?}",
                    lookup,
                    self.source.id(),
                    self.timeout
                );
                Err(MarketDataError::Timeout {
                    provider: self.source.id().to_string(),
                })
            }
        };

        result.map_err(FetchError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FetchClass;
    use crate::provider::RateLimit;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubSource {
        delay: Duration,
        /// Outbound requests made per fetch, like a printing miss plus a name search.
        requests: usize,
        calls: AtomicUsize,
        fail_with: Option<fn() -> MarketDataError>,
    }

    impl StubSource {
        fn ok() -> Self {
            Self {
                delay: Duration::ZERO,
                requests: 1,
                calls: AtomicUsize::new(0),
                fail_with: None,
            }
        }
    }

    #[async_trait]
    impl PriceSource for StubSource {
        fn id(&self) -> &'static str {
            "STUB"
        }

        fn rate_limit(&self) -> RateLimit {
            RateLimit::new(Duration::from_millis(20), Duration::from_millis(50))
        }

        async fn fetch_price(
            &self,
            _lookup: &CardLookup,
            pacer: &RequestPacer<'_>,
        ) -> Result<PriceQuote, MarketDataError> {
            for _ in 0..self.requests {
                pacer.ready().await;
                self.calls.fetch_add(1, Ordering::SeqCst);
            }
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match self.fail_with {
                Some(make_error) => Err(make_error()),
                None => Ok(PriceQuote::new(Some(dec!(2.50)), None, "STUB".to_string())),
            }
        }
    }

    fn not_found() -> MarketDataError {
        MarketDataError::CardNotFound("Opt".to_string())
    }

    fn unauthorized() -> MarketDataError {
        MarketDataError::Unauthorized {
            provider: "STUB".to_string(),
            message: "bad key".to_string(),
        }
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let fetcher = RateLimitedFetcher::new(Arc::new(StubSource::ok()));
        let quote = fetcher.fetch_price(&CardLookup::new("Opt")).await.unwrap();
        assert_eq!(quote.usd, Some(dec!(2.50)));
        assert_eq!(fetcher.source_id(), "STUB");
        assert_eq!(fetcher.limiter().min_spacing(), Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_slow_source_times_out_as_transient() {
        let source = StubSource {
            delay: Duration::from_millis(500),
            ..StubSource::ok()
        };
        let fetcher = RateLimitedFetcher::new(Arc::new(source));

        let err = fetcher
            .fetch_price(&CardLookup::new("Opt"))
            .await
            .unwrap_err();
        assert_eq!(err.class(), FetchClass::Transient);
        assert!(matches!(err.inner(), MarketDataError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_errors_are_classified() {
        let source = StubSource {
            fail_with: Some(not_found),
            ..StubSource::ok()
        };
        let fetcher = RateLimitedFetcher::new(Arc::new(source));
        let err = fetcher
            .fetch_price(&CardLookup::new("Opt"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::NotFound(_)));

        let source = StubSource {
            fail_with: Some(unauthorized),
            ..StubSource::ok()
        };
        let fetcher = RateLimitedFetcher::new(Arc::new(source));
        let err = fetcher
            .fetch_price(&CardLookup::new("Opt"))
            .await
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_fetchers_sharing_limiter_are_spaced() {
        let limiter = Arc::new(RateLimiter::with_spacing(Duration::from_millis(30)));
        let a = RateLimitedFetcher::with_limiter(
            Arc::new(StubSource::ok()),
            limiter.clone(),
            Duration::from_secs(1),
        );
        let b = RateLimitedFetcher::with_limiter(
            Arc::new(StubSource::ok()),
            limiter,
            Duration::from_secs(1),
        );

        let start = tokio::time::Instant::now();
        let lookup = CardLookup::new("Opt");
        let (ra, rb) = tokio::join!(a.fetch_price(&lookup), b.fetch_price(&lookup));
        ra.unwrap();
        rb.unwrap();
        b.fetch_price(&lookup).await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[tokio::test]
    async fn test_every_request_of_a_fetch_is_spaced() {
        let source = Arc::new(StubSource {
            requests: 2,
            ..StubSource::ok()
        });
        let fetcher = RateLimitedFetcher::with_limiter(
            source.clone(),
            Arc::new(RateLimiter::with_spacing(Duration::from_millis(80))),
            Duration::from_secs(1),
        );

        let start = tokio::time::Instant::now();
        fetcher.fetch_price(&CardLookup::new("Opt")).await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert!(start.elapsed() >= Duration::from_millis(80));

        // The next fetch queues behind the second request's slot
        fetcher.fetch_price(&CardLookup::new("Opt")).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(240));
    }
}
