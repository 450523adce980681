//! Background scheduler for the periodic price monitor.

use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

use crate::config::Config;
use crate::main_lib::AppState;

/// Initial delay before the first sweep, to let the server fully start.
const INITIAL_DELAY_SECS: u64 = 60;

/// Starts the background price monitor.
pub fn start_price_monitor_scheduler(state: Arc<AppState>, config: &Config) {
    let interval = config.monitor_interval;
    let retry = config.monitor_retry;

    tokio::spawn(async move {
        info!(
            "Price monitor started ({}s interval, {}s retry)",
            interval.as_secs(),
            retry.as_secs()
        );
        sleep(Duration::from_secs(INITIAL_DELAY_SECS)).await;

        loop {
            let wait = run_scheduled_sweep(&state, interval, retry);
            sleep(wait).await;
        }
    });
}

/// Runs one sweep and returns how long to wait before the next one.
fn run_scheduled_sweep(state: &Arc<AppState>, interval: Duration, retry: Duration) -> Duration {
    match state.price_monitor.sweep() {
        Ok(report) => {
            info!(
                "Price monitor sweep: {} started, {} skipped, {} failed, {} cards",
                report.started, report.skipped, report.failed, report.cards
            );
            interval
        }
        Err(e) => {
            warn!("Price monitor sweep failed, retrying in {}s: {}", retry.as_secs(), e);
            retry
        }
    }
}
