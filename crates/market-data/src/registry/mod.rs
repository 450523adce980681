//! Call orchestration for price sources.
//!
//! This module provides:
//! - A process-wide FIFO rate limiter and a per-fetch request pacer
//! - A fetcher that applies the limiter, bounds each call with a timeout
//!   and classifies failures

mod fetcher;
mod rate_limiter;

pub use fetcher::RateLimitedFetcher;
pub use rate_limiter::{RateLimiter, RequestPacer};
