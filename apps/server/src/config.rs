//! Server configuration read from `CV_*` environment variables.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow_origins: Vec<String>,
    pub request_timeout: Duration,
    pub scryfall_base_url: String,
    /// Minimum spacing between two Scryfall calls.
    pub price_spacing: Duration,
    pub fetch_timeout: Duration,
    /// Default alert threshold in percent.
    pub alert_threshold_pct: Decimal,
    pub monitor_enabled: bool,
    pub monitor_interval: Duration,
    /// Wait after a sweep that could not enumerate cards.
    pub monitor_retry: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            db_path: "./db/cardvault.db".to_string(),
            cors_allow_origins: vec!["*".to_string()],
            request_timeout: Duration::from_millis(30_000),
            scryfall_base_url: "https://api.scryfall.com".to_string(),
            price_spacing: Duration::from_millis(100),
            fetch_timeout: Duration::from_millis(10_000),
            alert_threshold_pct: Decimal::from(5),
            monitor_enabled: true,
            monitor_interval: Duration::from_secs(3600),
            monitor_retry: Duration::from_secs(300),
        }
    }
}

impl Config {
    /// Reads the configuration, loading a `.env` file first when present.
    ///
    /// Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let cors_allow_origins = std::env::var("CV_CORS_ALLOW_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .ok()
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.cors_allow_origins);

        Self {
            listen_addr: env_parse("CV_LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            db_path: std::env::var("CV_DB_PATH").unwrap_or(defaults.db_path),
            cors_allow_origins,
            request_timeout: env_parse("CV_REQUEST_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
            scryfall_base_url: std::env::var("CV_SCRYFALL_BASE_URL")
                .unwrap_or(defaults.scryfall_base_url),
            price_spacing: env_parse("CV_PRICE_SPACING_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.price_spacing),
            fetch_timeout: env_parse("CV_FETCH_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.fetch_timeout),
            alert_threshold_pct: env_parse("CV_ALERT_THRESHOLD_PCT")
                .unwrap_or(defaults.alert_threshold_pct),
            monitor_enabled: env_parse("CV_MONITOR_ENABLED").unwrap_or(defaults.monitor_enabled),
            monitor_interval: env_parse("CV_MONITOR_INTERVAL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.monitor_interval),
            monitor_retry: env_parse("CV_MONITOR_RETRY_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.monitor_retry),
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|raw| raw.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.price_spacing, Duration::from_millis(100));
        assert_eq!(config.alert_threshold_pct, Decimal::from(5));
        assert_eq!(config.monitor_interval, Duration::from_secs(3600));
        assert_eq!(config.monitor_retry, Duration::from_secs(300));
    }

    #[test]
    fn env_parse_rejects_garbage() {
        std::env::set_var("CV_TEST_PARSE_GARBAGE", "not-a-number");
        assert_eq!(env_parse::<u64>("CV_TEST_PARSE_GARBAGE"), None);
        std::env::set_var("CV_TEST_PARSE_GARBAGE", " 250 ");
        assert_eq!(env_parse::<u64>("CV_TEST_PARSE_GARBAGE"), Some(250));
        std::env::remove_var("CV_TEST_PARSE_GARBAGE");
    }
}
