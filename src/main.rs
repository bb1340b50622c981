//! Prevalence Risk Service — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use prevalence_risk_analyzer::api::{self, AppState};
use prevalence_risk_analyzer::config::AppConfig;
use prevalence_risk_analyzer::metrics::Metrics;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments. This lets
    // RISK_STRATEGY / RISK_SEED / RISK_BIND_ADDR come from .env.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = AppConfig::load()?;
    let metrics = Metrics::init(cfg.strategy);

    let state = AppState::from_config(&cfg);
    let app = api::router(state).merge(metrics.router());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!(
        addr = %cfg.bind_addr,
        strategy = cfg.strategy.as_str(),
        seeded = cfg.seed.is_some(),
        "prevalence risk service listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
