//! Error types and fetch classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all price source operations
//! - [`FetchClass`]: Classification deciding how the sync worker reacts to a failure
//! - [`FetchError`]: A classified failure as returned by the rate-limited fetcher

mod retry;

pub use retry::FetchClass;

use thiserror::Error;

/// Errors that can occur while fetching card prices.
///
/// Each variant is classified into a [`FetchClass`] via the
/// [`fetch_class`](Self::fetch_class) method.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The catalogue has no card matching the lookup.
    /// Terminal for that card, retrying won't help.
    #[error("Card not found: {0}")]
    CardNotFound(String),

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// The provider answered with a 5xx status.
    #[error("Server error from {provider}: HTTP {status}")]
    ServerError {
        /// The provider that failed
        provider: String,
        /// The HTTP status code returned
        status: u16,
    },

    /// The provider rejected our credentials (HTTP 401/403).
    #[error("Unauthorized: {provider} - {message}")]
    Unauthorized {
        /// The provider that rejected the request
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider rejected the request as malformed (HTTP 400/422).
    #[error("Bad request: {provider} - {message}")]
    BadRequest {
        /// The provider that rejected the request
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider returned a body we could not decode.
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse {
        /// The provider that returned the body
        provider: String,
        /// Description of the decoding failure
        message: String,
    },

    /// Any other provider-specific failure.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Returns the fetch classification for this error.
    ///
    /// - [`FetchClass::NotFound`]: the card has no catalogue match
    /// - [`FetchClass::Transient`]: timeouts, 5xx, rate limiting, connection trouble
    /// - [`FetchClass::Fatal`]: credential or request-shape problems that will fail
    ///   for every card, so the enclosing batch should stop
    ///
    /// # Examples
    ///
    /// ```
    /// use cardvault_market_data::errors::{FetchClass, MarketDataError};
    ///
    /// let error = MarketDataError::RateLimited { provider: "SCRYFALL".to_string() };
    /// assert_eq!(error.fetch_class(), FetchClass::Transient);
    ///
    /// let error = MarketDataError::CardNotFound("Black Lotus".to_string());
    /// assert_eq!(error.fetch_class(), FetchClass::NotFound);
    /// ```
    pub fn fetch_class(&self) -> FetchClass {
        match self {
            Self::CardNotFound(_) => FetchClass::NotFound,

            Self::RateLimited { .. }
            | Self::Timeout { .. }
            | Self::ServerError { .. }
            | Self::InvalidResponse { .. }
            | Self::ProviderError { .. }
            | Self::Network(_) => FetchClass::Transient,

            Self::Unauthorized { .. } | Self::BadRequest { .. } => FetchClass::Fatal,
        }
    }
}

/// A classified price fetch failure.
///
/// The variant carries the [`FetchClass`] so callers can match on the
/// outcome directly; the underlying [`MarketDataError`] is kept for reporting.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error(transparent)]
    NotFound(MarketDataError),

    #[error(transparent)]
    Transient(MarketDataError),

    #[error(transparent)]
    Fatal(MarketDataError),
}

impl FetchError {
    pub fn class(&self) -> FetchClass {
        match self {
            FetchError::NotFound(_) => FetchClass::NotFound,
            FetchError::Transient(_) => FetchClass::Transient,
            FetchError::Fatal(_) => FetchClass::Fatal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, FetchError::Fatal(_))
    }

    /// The underlying provider error.
    pub fn inner(&self) -> &MarketDataError {
        match self {
            FetchError::NotFound(e) | FetchError::Transient(e) | FetchError::Fatal(e) => e,
        }
    }
}

impl From<MarketDataError> for FetchError {
    fn from(error: MarketDataError) -> Self {
        match error.fetch_class() {
            FetchClass::NotFound => FetchError::NotFound(error),
            FetchClass::Transient => FetchError::Transient(error),
            FetchClass::Fatal => FetchError::Fatal(error),
        }
    }
}
