use cardvault_server::api::app_router;
use cardvault_server::config::Config;
use cardvault_server::{build_state, init_tracing, scheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing();
    let state = build_state(&config).await?;

    if config.monitor_enabled {
        scheduler::start_price_monitor_scheduler(state.clone(), &config);
    } else {
        tracing::info!("Price monitor disabled");
    }

    let router = app_router(state, &config);
    tracing::info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
