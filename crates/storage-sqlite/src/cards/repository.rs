use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::sqlite::SqliteConnection;
use log::debug;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::sync::Arc;

use cardvault_core::cards::{
    AlertState, CardPriceRecord, CardStore, NewCard, NewPriceAlert, PriceAlert, PriceUpdate,
};
use cardvault_core::errors::{DatabaseError, Error, Result};

use super::model::{CardDB, PriceAlertDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{cards, price_alerts};

/// Repository for card prices and price alerts
pub struct CardRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl CardRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        Self { pool, writer }
    }

    /// Inserts a card handed over by the inventory.
    pub async fn insert_card(&self, new_card: NewCard) -> Result<CardPriceRecord> {
        new_card.validate()?;

        self.writer
            .exec(move |conn| {
                let mut card_db: CardDB = new_card.into();
                if card_db.id.is_empty() {
                    card_db.id = uuid::Uuid::new_v4().to_string();
                }

                diesel::insert_into(cards::table)
                    .values(&card_db)
                    .execute(conn)
                    .into_core()?;

                Ok(card_db.into())
            })
            .await
    }

    /// Loads owner and threshold of every card; alert filtering happens on
    /// the parsed threshold.
    fn load_alert_view(&self, owner: Option<&str>) -> Result<Vec<(String, String, Option<String>)>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = cards::table.into_boxed();
        if let Some(owner) = owner {
            query = query.filter(cards::owner_id.eq(owner.to_string()));
        }

        query
            .select((cards::id, cards::owner_id, cards::alert_threshold_pct))
            .order((cards::created_at.asc(), cards::id.asc()))
            .load::<(String, String, Option<String>)>(&mut conn)
            .into_core()
    }
}

/// Mirrors `CardPriceRecord::alerts_enabled` on the stored text column.
fn threshold_enabled(raw: Option<&str>) -> bool {
    raw.and_then(|s| s.parse::<Decimal>().ok())
        .map(|pct| pct > Decimal::ZERO)
        .unwrap_or(true)
}

#[async_trait]
impl CardStore for CardRepository {
    fn get_card(&self, card_id: &str) -> Result<Option<CardPriceRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let card = cards::table
            .select(CardDB::as_select())
            .find(card_id)
            .first::<CardDB>(&mut conn)
            .optional()
            .into_core()?;

        Ok(card.map(CardPriceRecord::from))
    }

    fn list_card_ids(&self, owner_id: &str) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;

        cards::table
            .filter(cards::owner_id.eq(owner_id))
            .select(cards::id)
            .order((cards::created_at.asc(), cards::id.asc()))
            .load::<String>(&mut conn)
            .into_core()
    }

    fn list_alert_watched_card_ids(&self, owner_id: &str) -> Result<Vec<String>> {
        Ok(self
            .load_alert_view(Some(owner_id))?
            .into_iter()
            .filter(|(_, _, threshold)| threshold_enabled(threshold.as_deref()))
            .map(|(id, _, _)| id)
            .collect())
    }

    fn list_alert_owner_ids(&self) -> Result<Vec<String>> {
        let owners: BTreeSet<String> = self
            .load_alert_view(None)?
            .into_iter()
            .filter(|(_, _, threshold)| threshold_enabled(threshold.as_deref()))
            .map(|(_, owner, _)| owner)
            .collect();
        Ok(owners.into_iter().collect())
    }

    fn get_alert_state(&self, card_id: &str) -> Result<AlertState> {
        let mut conn = get_connection(&self.pool)?;

        let card = cards::table
            .select(CardDB::as_select())
            .find(card_id)
            .first::<CardDB>(&mut conn)
            .optional()
            .into_core()?;

        Ok(card.map(|c| c.alert_state()).unwrap_or_else(|| AlertState {
            card_id: card_id.to_string(),
            ..Default::default()
        }))
    }

    fn list_alerts(&self, owner_id: &str, unread_only: bool) -> Result<Vec<PriceAlert>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = price_alerts::table
            .filter(price_alerts::owner_id.eq(owner_id.to_string()))
            .into_boxed();
        if unread_only {
            query = query.filter(price_alerts::is_read.eq(false));
        }

        let rows = query
            .select(PriceAlertDB::as_select())
            .order((price_alerts::triggered_at.desc(), price_alerts::id.desc()))
            .load::<PriceAlertDB>(&mut conn)
            .into_core()?;

        Ok(rows.into_iter().map(PriceAlert::from).collect())
    }

    async fn write_price(&self, update: PriceUpdate) -> Result<()> {
        self.writer
            .exec(move |conn| {
                let (quantity, purchase_price) = cards::table
                    .find(&update.card_id)
                    .select((cards::quantity, cards::purchase_price))
                    .first::<(i32, Option<String>)>(conn)
                    .into_core()?;

                let purchase_price = purchase_price.and_then(|s| s.parse().ok());
                let total_value = update.total_value(quantity);
                let price_change = update.price_change(purchase_price);
                let updated_at = update.updated_at.to_rfc3339();

                diesel::update(cards::table.find(&update.card_id))
                    .set((
                        cards::current_price.eq(update.price.map(|d| d.to_string())),
                        cards::current_price_foil.eq(update.price_foil.map(|d| d.to_string())),
                        cards::market_price.eq(Some(update.market_price.to_string())),
                        cards::price_fallback.eq(update.price_fallback),
                        cards::total_value.eq(Some(total_value.to_string())),
                        cards::price_change.eq(price_change.map(|d| d.to_string())),
                        cards::last_price_update.eq(Some(updated_at.clone())),
                        cards::updated_at.eq(updated_at),
                    ))
                    .execute(conn)
                    .into_core()?;

                debug!("Stored price {} for card {}", update.market_price, update.card_id);
                Ok(())
            })
            .await
    }

    async fn write_alert_state(
        &self,
        card_id: &str,
        last_triggered_at: DateTime<Utc>,
    ) -> Result<()> {
        let card_id = card_id.to_string();
        self.writer
            .exec(move |conn| {
                let affected = diesel::update(cards::table.find(&card_id))
                    .set(cards::last_alert_at.eq(Some(last_triggered_at.to_rfc3339())))
                    .execute(conn)
                    .into_core()?;
                if affected == 0 {
                    return Err(Error::Database(DatabaseError::NotFound(format!(
                        "card {}",
                        card_id
                    ))));
                }
                Ok(())
            })
            .await
    }

    async fn record_alert(&self, alert: NewPriceAlert) -> Result<PriceAlert> {
        self.writer
            .exec(move |conn| {
                let card_id = alert.card_id.clone();
                let triggered_at = alert.triggered_at;
                // Cooldown stamp commits with the alert row or not at all
                let affected = diesel::update(cards::table.find(&card_id))
                    .set(cards::last_alert_at.eq(Some(triggered_at.to_rfc3339())))
                    .execute(conn)
                    .into_core()?;
                if affected == 0 {
                    return Err(Error::Database(DatabaseError::NotFound(format!(
                        "card {}",
                        card_id
                    ))));
                }

                let alert_db = PriceAlertDB::from_new(uuid::Uuid::new_v4().to_string(), alert);
                diesel::insert_into(price_alerts::table)
                    .values(&alert_db)
                    .execute(conn)
                    .into_core()?;

                Ok(alert_db.into())
            })
            .await
    }

    async fn mark_alert_read(&self, owner_id: &str, alert_id: &str) -> Result<()> {
        let owner_id = owner_id.to_string();
        let alert_id = alert_id.to_string();
        self.writer
            .exec(move |conn| {
                let affected = diesel::update(
                    price_alerts::table
                        .filter(price_alerts::id.eq(&alert_id))
                        .filter(price_alerts::owner_id.eq(&owner_id)),
                )
                .set(price_alerts::is_read.eq(true))
                .execute(conn)
                .into_core()?;

                if affected == 0 {
                    return Err(Error::Database(DatabaseError::NotFound(format!(
                        "alert {}",
                        alert_id
                    ))));
                }
                Ok(())
            })
            .await
    }
}
