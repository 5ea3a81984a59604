use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use agent::{KnowledgeBase, TradingAgent};
use analysis::AnalysisConfig;
use common::{Config, VenueClient};
use engine::Bot;
use feed::{PocketVenue, SimVenue};
use store::TradeStore;

#[tokio::main]
async fn main() {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(
        simulation = cfg.session_id.is_none(),
        demo = cfg.demo,
        "OptiBot starting"
    );

    // ── Database ──────────────────────────────────────────────────────────────
    let store = TradeStore::connect(&cfg.database_url)
        .await
        .unwrap_or_else(|e| panic!("Failed to open trade store: {e}"));

    // ── Venue (injected based on session presence) ────────────────────────────
    let venue: Arc<dyn VenueClient> = match &cfg.session_id {
        Some(session_id) => {
            info!("Session id present, using live venue");
            Arc::new(PocketVenue::new(session_id.clone(), cfg.demo))
        }
        None => {
            info!("No session id, using simulated venue");
            Arc::new(SimVenue::new(cfg.demo))
        }
    };

    // ── Bot ───────────────────────────────────────────────────────────────────
    let analysis_cfg = AnalysisConfig::load(&cfg.analysis_config_path);
    let (bot, handle) = Bot::new(
        venue,
        TradingAgent::new(),
        KnowledgeBase::seeded(),
        store,
        &cfg,
        analysis_cfg,
    );

    // ── Dashboard API ─────────────────────────────────────────────────────────
    let api_state = api::AppState {
        handle: handle.clone(),
        dashboard_token: cfg.dashboard_token.clone(),
    };

    // ── Spawn all tasks ───────────────────────────────────────────────────────
    tokio::spawn(bot.run());
    tokio::spawn(api::serve(api_state, cfg.dashboard_port));

    info!("All subsystems started. Waiting for shutdown signal.");
    tokio::signal::ctrl_c().await.unwrap();
    let _ = handle.stop().await;
    info!("Shutdown signal received. Exiting.");
}
