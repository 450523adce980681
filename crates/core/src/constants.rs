use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// How long a fetched price is reused before the catalogue is asked again.
pub const PRICE_CACHE_TTL_SECS: i64 = 3600;

/// Minimum time between two alerts for the same card.
pub const ALERT_COOLDOWN_HOURS: i64 = 24;

/// Alert threshold used when a card has no override, in percent.
pub const DEFAULT_ALERT_THRESHOLD_PCT: Decimal = dec!(5);

/// Type tag stored on alerts raised by a price movement.
pub const ALERT_TYPE_PRICE_CHANGE: &str = "price_change";

/// Suggested interval for clients polling sync progress.
pub const STATUS_POLL_INTERVAL_SECS: u64 = 2;
