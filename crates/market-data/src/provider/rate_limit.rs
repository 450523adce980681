//! Rate limiting configuration for price sources.

use std::time::Duration;

/// Default spacing between two outbound calls.
pub const DEFAULT_MIN_SPACING: Duration = Duration::from_millis(100);

/// Default upper bound for a single call, including body download.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Rate limiting configuration for a price source.
///
/// Describes how politely a third-party catalogue must be called.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimit {
    /// Minimum delay between the start of two successive calls.
    pub min_spacing: Duration,

    /// Upper bound for a single call before it is abandoned as a timeout.
    pub call_timeout: Duration,
}

impl RateLimit {
    pub fn new(min_spacing: Duration, call_timeout: Duration) -> Self {
        Self {
            min_spacing,
            call_timeout,
        }
    }
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            min_spacing: DEFAULT_MIN_SPACING,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}
