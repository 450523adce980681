//! Threshold-crossing price alerts with a per-card cooldown.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::cards::{AlertDirection, AlertState};
use crate::settings::PriceSyncSettings;

/// Outcome of evaluating one price change.
#[derive(Debug, Clone, PartialEq)]
pub enum AlertDecision {
    /// Raise an alert and set the card's `last_triggered_at` to `triggered_at`.
    Fire {
        direction: AlertDirection,
        change_pct: Decimal,
        threshold_pct: Decimal,
        triggered_at: DateTime<Utc>,
    },
    /// No alert; the cooldown is left untouched.
    Suppressed(NoAlertReason),
}

impl AlertDecision {
    pub fn fires(&self) -> bool {
        matches!(self, AlertDecision::Fire { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NoAlertReason {
    /// No previous price to compare against, or it was zero.
    NoBaseline,
    /// Threshold is zero for this card.
    Disabled,
    BelowThreshold { change_pct: Decimal },
    CoolingDown { until: DateTime<Utc> },
}

/// Decides whether a price change warrants an alert.
///
/// Percentages are expressed in percent units: a threshold of `5` fires on
/// a move of 5% or more in either direction.
#[derive(Debug, Clone)]
pub struct AlertEvaluator {
    cooldown: Duration,
    default_threshold_pct: Decimal,
}

impl AlertEvaluator {
    pub fn new(cooldown: Duration, default_threshold_pct: Decimal) -> Self {
        Self {
            cooldown,
            default_threshold_pct,
        }
    }

    pub fn from_settings(settings: &PriceSyncSettings) -> Self {
        Self::new(
            settings.alert_cooldown(),
            settings.default_alert_threshold_pct,
        )
    }

    /// Threshold applying to a card.
    pub fn threshold_for(&self, state: &AlertState) -> Decimal {
        state.threshold_pct.unwrap_or(self.default_threshold_pct)
    }

    pub fn evaluate(
        &self,
        old_price: Option<Decimal>,
        new_price: Decimal,
        now: DateTime<Utc>,
        state: &AlertState,
    ) -> AlertDecision {
        let threshold_pct = self.threshold_for(state);
        if threshold_pct <= Decimal::ZERO {
            return AlertDecision::Suppressed(NoAlertReason::Disabled);
        }

        let old_price = match old_price {
            Some(price) if !price.is_zero() => price,
            _ => return AlertDecision::Suppressed(NoAlertReason::NoBaseline),
        };

        // Compared unrounded; only the reported figure is rounded.
        let exact_pct = (new_price - old_price) / old_price * Decimal::ONE_HUNDRED;
        let change_pct = exact_pct.round_dp(2);
        if exact_pct.abs() < threshold_pct {
            return AlertDecision::Suppressed(NoAlertReason::BelowThreshold { change_pct });
        }

        if let Some(last) = state.last_triggered_at {
            let until = last + self.cooldown;
            if now < until {
                return AlertDecision::Suppressed(NoAlertReason::CoolingDown { until });
            }
        }

        let direction = if exact_pct.is_sign_negative() {
            AlertDirection::Down
        } else {
            AlertDirection::Up
        };

        AlertDecision::Fire {
            direction,
            change_pct,
            threshold_pct,
            triggered_at: now,
        }
    }
}

impl Default for AlertEvaluator {
    fn default() -> Self {
        Self::from_settings(&PriceSyncSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap()
    }

    fn state(last: Option<DateTime<Utc>>) -> AlertState {
        AlertState {
            card_id: "c1".to_string(),
            last_triggered_at: last,
            threshold_pct: None,
        }
    }

    #[test]
    fn test_fires_on_threshold_crossing() {
        let evaluator = AlertEvaluator::default();
        let decision = evaluator.evaluate(Some(dec!(10.00)), dec!(11.00), now(), &state(None));

        assert_eq!(
            decision,
            AlertDecision::Fire {
                direction: AlertDirection::Up,
                change_pct: dec!(10.00),
                threshold_pct: dec!(5),
                triggered_at: now(),
            }
        );
    }

    #[test]
    fn test_exact_threshold_fires_downwards() {
        let evaluator = AlertEvaluator::default();
        let decision = evaluator.evaluate(Some(dec!(20.00)), dec!(19.00), now(), &state(None));
        match decision {
            AlertDecision::Fire {
                direction,
                change_pct,
                ..
            } => {
                assert_eq!(direction, AlertDirection::Down);
                assert_eq!(change_pct, dec!(-5.00));
            }
            other => panic!("expected alert, got {:?}", other),
        }
    }

    #[test]
    fn test_small_move_is_suppressed() {
        let evaluator = AlertEvaluator::default();
        let decision = evaluator.evaluate(Some(dec!(10.00)), dec!(10.40), now(), &state(None));
        assert_eq!(
            decision,
            AlertDecision::Suppressed(NoAlertReason::BelowThreshold {
                change_pct: dec!(4.00)
            })
        );
    }

    #[test]
    fn test_move_just_under_threshold_does_not_round_up() {
        let evaluator = AlertEvaluator::default();
        let decision = evaluator.evaluate(Some(dec!(100.00)), dec!(104.996), now(), &state(None));
        assert_eq!(
            decision,
            AlertDecision::Suppressed(NoAlertReason::BelowThreshold {
                change_pct: dec!(5.00)
            })
        );

        let falling = evaluator.evaluate(Some(dec!(100.00)), dec!(95.004), now(), &state(None));
        assert!(!falling.fires());
    }

    #[test]
    fn test_no_baseline() {
        let evaluator = AlertEvaluator::default();
        assert_eq!(
            evaluator.evaluate(None, dec!(3), now(), &state(None)),
            AlertDecision::Suppressed(NoAlertReason::NoBaseline)
        );
        assert_eq!(
            evaluator.evaluate(Some(Decimal::ZERO), dec!(3), now(), &state(None)),
            AlertDecision::Suppressed(NoAlertReason::NoBaseline)
        );
    }

    #[test]
    fn test_cooldown_23h_suppressed_25h_fires() {
        let evaluator = AlertEvaluator::default();

        let recent = state(Some(now() - Duration::hours(23)));
        let decision = evaluator.evaluate(Some(dec!(10)), dec!(20), now(), &recent);
        assert!(matches!(
            decision,
            AlertDecision::Suppressed(NoAlertReason::CoolingDown { .. })
        ));

        let old = state(Some(now() - Duration::hours(25)));
        assert!(evaluator
            .evaluate(Some(dec!(10)), dec!(20), now(), &old)
            .fires());
    }

    #[test]
    fn test_cooldown_ends_exactly_after_24h() {
        let evaluator = AlertEvaluator::default();
        let at_boundary = state(Some(now() - Duration::hours(24)));
        assert!(evaluator
            .evaluate(Some(dec!(10)), dec!(20), now(), &at_boundary)
            .fires());
    }

    #[test]
    fn test_per_card_threshold_override() {
        let evaluator = AlertEvaluator::default();

        let mut strict = state(None);
        strict.threshold_pct = Some(dec!(50));
        assert!(!evaluator
            .evaluate(Some(dec!(10)), dec!(12), now(), &strict)
            .fires());

        let mut disabled = state(None);
        disabled.threshold_pct = Some(Decimal::ZERO);
        assert_eq!(
            evaluator.evaluate(Some(dec!(10)), dec!(100), now(), &disabled),
            AlertDecision::Suppressed(NoAlertReason::Disabled)
        );
    }

    proptest! {
        #[test]
        fn prop_never_fires_within_cooldown(
            old_cents in 1i64..1_000_000,
            new_cents in 0i64..1_000_000,
            hours_ago in 0i64..24,
        ) {
            let evaluator = AlertEvaluator::default();
            let recent = state(Some(now() - Duration::hours(hours_ago)));
            let decision = evaluator.evaluate(
                Some(Decimal::new(old_cents, 2)),
                Decimal::new(new_cents, 2),
                now(),
                &recent,
            );
            prop_assert!(!decision.fires());
        }
    }
}
