//! Database models for cards and price alerts.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cardvault_core::cards::{
    AlertDirection, AlertState, CardPriceRecord, NewCard, NewPriceAlert, PriceAlert,
};

fn parse_decimal(value: Option<&str>) -> Option<Decimal> {
    value.and_then(|s| Decimal::from_str(s).ok())
}

fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Database model for cards
#[derive(
    Queryable, Identifiable, Insertable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::cards)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CardDB {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub set_code: Option<String>,
    pub collector_number: Option<String>,
    pub is_foil: bool,
    pub quantity: i32,
    pub purchase_price: Option<String>,
    pub current_price: Option<String>,
    pub current_price_foil: Option<String>,
    pub market_price: Option<String>,
    pub price_fallback: bool,
    pub total_value: Option<String>,
    pub price_change: Option<String>,
    pub alert_threshold_pct: Option<String>,
    pub last_alert_at: Option<String>,
    pub last_price_update: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl CardDB {
    pub fn alert_state(&self) -> AlertState {
        AlertState {
            card_id: self.id.clone(),
            last_triggered_at: self.last_alert_at.as_deref().and_then(parse_datetime),
            threshold_pct: parse_decimal(self.alert_threshold_pct.as_deref()),
        }
    }
}

impl From<CardDB> for CardPriceRecord {
    fn from(db: CardDB) -> Self {
        Self {
            purchase_price: parse_decimal(db.purchase_price.as_deref()),
            current_price: parse_decimal(db.current_price.as_deref()),
            current_price_foil: parse_decimal(db.current_price_foil.as_deref()),
            market_price: parse_decimal(db.market_price.as_deref()),
            alert_threshold_pct: parse_decimal(db.alert_threshold_pct.as_deref()),
            total_value: parse_decimal(db.total_value.as_deref()),
            price_change: parse_decimal(db.price_change.as_deref()),
            last_price_update: db.last_price_update.as_deref().and_then(parse_datetime),
            id: db.id,
            owner_id: db.owner_id,
            name: db.name,
            set_code: db.set_code,
            collector_number: db.collector_number,
            is_foil: db.is_foil,
            quantity: db.quantity,
            price_fallback: db.price_fallback,
        }
    }
}

impl From<NewCard> for CardDB {
    fn from(domain: NewCard) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: domain.id.unwrap_or_default(),
            owner_id: domain.owner_id,
            name: domain.name,
            set_code: domain.set_code,
            collector_number: domain.collector_number,
            is_foil: domain.is_foil,
            quantity: domain.quantity,
            purchase_price: domain.purchase_price.map(|d| d.to_string()),
            current_price: None,
            current_price_foil: None,
            market_price: None,
            price_fallback: false,
            total_value: None,
            price_change: None,
            alert_threshold_pct: domain.alert_threshold_pct.map(|d| d.to_string()),
            last_alert_at: None,
            last_price_update: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Database model for price alerts
#[derive(
    Queryable, Identifiable, Insertable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::price_alerts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PriceAlertDB {
    pub id: String,
    pub card_id: String,
    pub owner_id: String,
    pub card_name: String,
    pub alert_type: String,
    pub threshold_value: String,
    pub previous_value: String,
    pub current_value: String,
    pub change_pct: String,
    pub direction: String,
    pub is_read: bool,
    pub triggered_at: String,
}

impl PriceAlertDB {
    pub fn from_new(id: String, alert: NewPriceAlert) -> Self {
        Self {
            id,
            card_id: alert.card_id,
            owner_id: alert.owner_id,
            card_name: alert.card_name,
            alert_type: alert.alert_type,
            threshold_value: alert.threshold_value.to_string(),
            previous_value: alert.previous_value.to_string(),
            current_value: alert.current_value.to_string(),
            change_pct: alert.change_pct.to_string(),
            direction: alert.direction.as_str().to_string(),
            is_read: false,
            triggered_at: alert.triggered_at.to_rfc3339(),
        }
    }
}

impl From<PriceAlertDB> for PriceAlert {
    fn from(db: PriceAlertDB) -> Self {
        let change_pct = parse_decimal(Some(&db.change_pct)).unwrap_or_default();
        let direction = AlertDirection::parse(&db.direction).unwrap_or(
            if change_pct.is_sign_negative() {
                AlertDirection::Down
            } else {
                AlertDirection::Up
            },
        );
        Self {
            threshold_value: parse_decimal(Some(&db.threshold_value)).unwrap_or_default(),
            previous_value: parse_decimal(Some(&db.previous_value)).unwrap_or_default(),
            current_value: parse_decimal(Some(&db.current_value)).unwrap_or_default(),
            triggered_at: parse_datetime(&db.triggered_at).unwrap_or_default(),
            change_pct,
            direction,
            id: db.id,
            card_id: db.card_id,
            owner_id: db.owner_id,
            card_name: db.card_name,
            alert_type: db.alert_type,
            is_read: db.is_read,
        }
    }
}
