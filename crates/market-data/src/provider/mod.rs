//! Price source abstractions and implementations.
//!
//! This module contains:
//! - The `PriceSource` trait that all pricing catalogues implement
//! - Rate limiting configuration advertised by each source
//! - Concrete implementations (Scryfall)
//!
//! Sources do not throttle themselves. Spacing between calls is enforced by
//! the [`RateLimitedFetcher`](crate::registry::RateLimitedFetcher) so that every
//! caller in the process shares one queue.

mod rate_limit;
mod traits;

pub mod scryfall;

pub use rate_limit::{RateLimit, DEFAULT_CALL_TIMEOUT, DEFAULT_MIN_SPACING};
pub use traits::PriceSource;
