//! Price source trait definition.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{CardLookup, PriceQuote};
use crate::registry::RequestPacer;

use super::rate_limit::RateLimit;

/// Trait for card pricing catalogues.
///
/// Implement this trait to add support for a new pricing source.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use cardvault_market_data::{
///     CardLookup, MarketDataError, PriceQuote, PriceSource, RequestPacer,
/// };
///
/// struct FixedPriceSource;
///
/// #[async_trait]
/// impl PriceSource for FixedPriceSource {
///     fn id(&self) -> &'static str {
///         "FIXED"
///     }
///
///     async fn fetch_price(
///         &self,
///         _lookup: &CardLookup,
///         pacer: &RequestPacer<'_>,
///     ) -> Result<PriceQuote, MarketDataError> {
///         pacer.ready().await;
///         Ok(PriceQuote::new(Some(1.into()), None, self.id().to_string()))
///     }
/// }
/// ```
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Unique identifier for this source, e.g. "SCRYFALL".
    ///
    /// Used for logging and error attribution.
    fn id(&self) -> &'static str;

    /// Rate limiting the source expects from its callers.
    fn rate_limit(&self) -> RateLimit {
        RateLimit::default()
    }

    /// Fetch the current prices for a card printing.
    ///
    /// Every outbound request must be preceded by `pacer.ready().await`, so
    /// that lookups needing several requests still honour the catalogue's
    /// minimum spacing.
    ///
    /// # Returns
    ///
    /// The quote on success. A lookup with no catalogue match must fail with
    /// [`MarketDataError::CardNotFound`]; other failures are classified by
    /// [`MarketDataError::fetch_class`].
    async fn fetch_price(
        &self,
        lookup: &CardLookup,
        pacer: &RequestPacer<'_>,
    ) -> Result<PriceQuote, MarketDataError>;
}
