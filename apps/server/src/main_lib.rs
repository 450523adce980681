use std::sync::Arc;

use cardvault_core::{PriceMonitor, PriceSyncService, PriceSyncSettings};
use cardvault_market_data::{RateLimit, RateLimitedFetcher, ScryfallProvider};
use cardvault_storage_sqlite::{db, CardRepository};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

pub struct AppState {
    pub price_sync_service: Arc<PriceSyncService<CardRepository>>,
    pub price_monitor: Arc<PriceMonitor<CardRepository>>,
    pub card_repository: Arc<CardRepository>,
    pub db_path: String,
}

pub fn init_tracing() {
    let log_format = std::env::var("CV_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());
    let card_repository = Arc::new(CardRepository::new(pool.clone(), writer));

    let provider = ScryfallProvider::with_config(
        config.scryfall_base_url.clone(),
        RateLimit::new(config.price_spacing, config.fetch_timeout),
    );
    let fetcher = RateLimitedFetcher::new(Arc::new(provider));

    let settings =
        PriceSyncSettings::default().with_default_alert_threshold(config.alert_threshold_pct);
    settings.validate()?;

    let price_sync_service = Arc::new(PriceSyncService::new(
        card_repository.clone(),
        fetcher,
        &settings,
    ));
    let price_monitor = Arc::new(PriceMonitor::new(price_sync_service.clone()));

    Ok(Arc::new(AppState {
        price_sync_service,
        price_monitor,
        card_repository,
        db_path,
    }))
}
