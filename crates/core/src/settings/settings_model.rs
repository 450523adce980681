use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{ALERT_COOLDOWN_HOURS, DEFAULT_ALERT_THRESHOLD_PCT, PRICE_CACHE_TTL_SECS};
use crate::errors::{Error, Result};

/// Tunables of the price synchronization engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSyncSettings {
    /// Age below which a cached price is reused.
    pub cache_ttl_secs: i64,
    /// Quiet period after an alert fires for a card.
    pub alert_cooldown_hours: i64,
    /// Threshold for cards without an override, in percent.
    pub default_alert_threshold_pct: Decimal,
}

impl Default for PriceSyncSettings {
    fn default() -> Self {
        Self {
            cache_ttl_secs: PRICE_CACHE_TTL_SECS,
            alert_cooldown_hours: ALERT_COOLDOWN_HOURS,
            default_alert_threshold_pct: DEFAULT_ALERT_THRESHOLD_PCT,
        }
    }
}

impl PriceSyncSettings {
    pub fn with_default_alert_threshold(mut self, pct: Decimal) -> Self {
        self.default_alert_threshold_pct = pct;
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::seconds(self.cache_ttl_secs)
    }

    pub fn alert_cooldown(&self) -> Duration {
        Duration::hours(self.alert_cooldown_hours)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_ttl_secs < 0 {
            return Err(Error::InvalidConfigValue(format!(
                "cache TTL must not be negative, got {}s",
                self.cache_ttl_secs
            )));
        }
        if self.alert_cooldown_hours < 0 {
            return Err(Error::InvalidConfigValue(format!(
                "alert cooldown must not be negative, got {}h",
                self.alert_cooldown_hours
            )));
        }
        if self.default_alert_threshold_pct.is_sign_negative() {
            return Err(Error::InvalidConfigValue(format!(
                "alert threshold must not be negative, got {}%",
                self.default_alert_threshold_pct
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let settings = PriceSyncSettings::default();
        assert_eq!(settings.cache_ttl(), Duration::hours(1));
        assert_eq!(settings.alert_cooldown(), Duration::hours(24));
        assert_eq!(settings.default_alert_threshold_pct, dec!(5));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let settings = PriceSyncSettings::default().with_default_alert_threshold(dec!(-1));
        assert!(matches!(
            settings.validate(),
            Err(Error::InvalidConfigValue(_))
        ));
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(PriceSyncSettings::default()).unwrap();
        assert_eq!(json["cacheTtlSecs"], 3600);
        assert_eq!(json["alertCooldownHours"], 24);
    }
}
