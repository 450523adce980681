//! CardVault Market Data Crate
//!
//! This crate provides the outbound side of card price synchronization:
//! fetching trading-card prices from an external pricing catalogue while
//! respecting the catalogue's rate limits.
//!
//! # Overview
//!
//! - A provider-agnostic [`PriceSource`] trait with a Scryfall implementation
//! - A process-wide, FIFO [`RateLimiter`] enforcing a minimum spacing between calls
//! - A [`RateLimitedFetcher`] that bounds each call with a timeout and classifies
//!   failures into [`FetchClass::Transient`], [`FetchClass::NotFound`] or
//!   [`FetchClass::Fatal`]
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +--------------------+
//! |   Sync worker    | --> |     CardLookup     |  (catalogue identity)
//! +------------------+     +--------------------+
//!                                    |
//!                                    v
//!                          +--------------------+
//!                          | RateLimitedFetcher |  (spacing + timeout + classification)
//!                          +--------------------+
//!                                    |
//!                                    v
//!                          +--------------------+
//!                          |    PriceSource     |  (Scryfall, ...)
//!                          +--------------------+
//!                                    |
//!                                    v
//!                          +--------------------+
//!                          |     PriceQuote     |  (regular + foil prices, metadata)
//!                          +--------------------+
//! ```

pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

pub use errors::{FetchClass, FetchError, MarketDataError};
pub use models::{
    CardLookup, CardMetadata, ColorCategory, PriceQuote, PriceSelection, PriceVariant,
};
pub use provider::scryfall::ScryfallProvider;
pub use provider::{PriceSource, RateLimit};
pub use registry::{RateLimitedFetcher, RateLimiter, RequestPacer};
