use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use agent::{AgentStats, KnowledgeBase, KnowledgeStats, ScoreContext, TradingAgent};
use analysis::{
    AnalysisConfig, AnalysisSnapshot, CandleWindow, IndicatorSet, Levels, PatternMatch, Trend,
};
use common::{
    BotCommand, BotRunState, Candle, Config, Error, Result, Tournament, VenueClient,
    SUPPORTED_TIMEFRAMES,
};
use feed::CandleStream;
use store::TradeStore;

use crate::tournament::TournamentScout;
use crate::trades::{TradeLifecycle, TradeStats};

/// Bound on any venue-touching wait entered from the request boundary.
const CONTROL_TIMEOUT: Duration = Duration::from_secs(10);

/// Cadence of the pending-trade resolution sweep.
const RESOLVE_INTERVAL: Duration = Duration::from_secs(5);

/// Cadence of the learner placeholder.
const LEARN_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Candles kept in the charting payload.
const CHART_CANDLES: usize = 100;

/// Bot-wide mutable state. Owned by the orchestrator's command loop and the
/// tasks it spawns; the request boundary only ever reads it via `BotHandle`.
#[derive(Debug, Clone)]
pub struct BotState {
    pub run_state: BotRunState,
    pub trading_enabled: bool,
    pub asset: String,
    pub timeframe_secs: u32,
    pub min_confidence: f64,
    pub snapshot: AnalysisSnapshot,
    pub chart_candles: Vec<Candle>,
    pub active_tasks: usize,
}

/// Cloneable handle passed to the API layer.
#[derive(Clone)]
pub struct BotHandle {
    command_tx: mpsc::Sender<BotCommand>,
    state: Arc<RwLock<BotState>>,
    venue: Arc<dyn VenueClient>,
    lifecycle: Arc<TradeLifecycle>,
    agent: Arc<RwLock<TradingAgent>>,
    knowledge: Arc<KnowledgeBase>,
}

/// Read-only status projection for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct BotStatus {
    pub run_state: BotRunState,
    pub is_running: bool,
    pub trading_enabled: bool,
    pub connected: bool,
    pub simulation_mode: bool,
    pub balance: f64,
    pub current_asset: String,
    pub current_timeframe_secs: u32,
    pub min_confidence: f64,
    pub patterns_detected: usize,
    pub pending_trades: usize,
    pub total_trades: usize,
    pub active_tasks: usize,
    pub agent: AgentStats,
    pub knowledge: KnowledgeStats,
}

/// Read-only market-analysis projection for the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct MarketAnalysis {
    pub patterns: Vec<PatternMatch>,
    pub levels: Levels,
    pub indicators: IndicatorSet,
    pub trend: Trend,
    pub candles: Vec<Candle>,
}

impl BotHandle {
    /// Enqueue a control intent under the bounded wait.
    pub async fn send(&self, cmd: BotCommand) -> Result<()> {
        tokio::time::timeout(CONTROL_TIMEOUT, self.command_tx.send(cmd))
            .await
            .map_err(|_| Error::Timeout("bot command queue".into()))?
            .map_err(|_| Error::Other("bot command loop is gone".into()))
    }

    pub async fn start(&self) -> Result<()> {
        self.send(BotCommand::Start).await
    }

    pub async fn stop(&self) -> Result<()> {
        self.send(BotCommand::Stop).await
    }

    pub async fn set_trading_enabled(&self, enabled: bool) -> Result<()> {
        self.send(BotCommand::SetTradingEnabled(enabled)).await
    }

    pub async fn set_min_confidence(&self, confidence: f64) -> Result<()> {
        if !confidence.is_finite() {
            return Err(Error::Validation("min_confidence must be a number".into()));
        }
        self.send(BotCommand::SetMinConfidence(confidence)).await
    }

    pub async fn set_active_asset(&self, asset: String) -> Result<()> {
        if asset.trim().is_empty() {
            return Err(Error::Validation("asset must not be empty".into()));
        }
        self.send(BotCommand::SetAsset(asset)).await
    }

    pub async fn set_active_timeframe(&self, timeframe_secs: u32) -> Result<()> {
        if !SUPPORTED_TIMEFRAMES.contains(&timeframe_secs) {
            return Err(Error::Validation(format!(
                "unsupported timeframe {timeframe_secs}s (supported: {SUPPORTED_TIMEFRAMES:?})"
            )));
        }
        self.send(BotCommand::SetTimeframe(timeframe_secs)).await
    }

    pub async fn join_tournament(&self, id: String) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        tokio::time::timeout(CONTROL_TIMEOUT, async {
            self.command_tx
                .send(BotCommand::JoinTournament { id, reply })
                .await
                .map_err(|_| Error::Other("bot command loop is gone".into()))?;
            rx.await
                .map_err(|_| Error::Other("bot dropped the reply".into()))
        })
        .await
        .map_err(|_| Error::Timeout("join tournament".into()))?
    }

    pub async fn list_free_tournaments(&self) -> Result<Vec<Tournament>> {
        let (reply, rx) = oneshot::channel();
        tokio::time::timeout(CONTROL_TIMEOUT, async {
            self.command_tx
                .send(BotCommand::ListFreeTournaments { reply })
                .await
                .map_err(|_| Error::Other("bot command loop is gone".into()))?;
            rx.await
                .map_err(|_| Error::Other("bot dropped the reply".into()))
        })
        .await
        .map_err(|_| Error::Timeout("list tournaments".into()))?
    }

    /// Current status. Pure read; mutates nothing.
    pub async fn status(&self) -> BotStatus {
        let state = self.state.read().await.clone();
        let stats = self.lifecycle.stats().await;

        BotStatus {
            run_state: state.run_state,
            is_running: state.run_state == BotRunState::Running,
            trading_enabled: state.trading_enabled,
            connected: self.venue.is_connected(),
            simulation_mode: self.venue.is_simulation(),
            balance: self.venue.balance().await,
            current_asset: state.asset,
            current_timeframe_secs: state.timeframe_secs,
            min_confidence: state.min_confidence,
            patterns_detected: state.snapshot.patterns.len(),
            pending_trades: stats.pending_trades,
            total_trades: stats.total_trades + stats.pending_trades,
            active_tasks: state.active_tasks,
            agent: self.agent.read().await.stats(),
            knowledge: self.knowledge.stats(),
        }
    }

    /// Latest analysis snapshot for the active asset, plus charting candles.
    pub async fn market_analysis(&self) -> MarketAnalysis {
        let state = self.state.read().await;
        let mut patterns = state.snapshot.patterns.clone();
        patterns.truncate(10);

        MarketAnalysis {
            patterns,
            levels: state.snapshot.levels.clone(),
            indicators: state.snapshot.indicators.clone(),
            trend: state.snapshot.trend,
            candles: state.chart_candles.clone(),
        }
    }

    pub async fn trade_stats(&self) -> TradeStats {
        self.lifecycle.stats().await
    }
}

/// The orchestrator: owns the command loop, the task registry, and the
/// Stopped → Starting → Running → Stopping machine.
pub struct Bot {
    venue: Arc<dyn VenueClient>,
    lifecycle: Arc<TradeLifecycle>,
    agent: Arc<RwLock<TradingAgent>>,
    knowledge: Arc<KnowledgeBase>,
    scout: Arc<TournamentScout>,
    analysis_cfg: AnalysisConfig,
    state: Arc<RwLock<BotState>>,
    command_rx: mpsc::Receiver<BotCommand>,
    #[allow(dead_code)] // kept to prevent channel close
    command_tx: mpsc::Sender<BotCommand>,
    tasks: HashMap<String, JoinHandle<()>>,
}

impl Bot {
    pub fn new(
        venue: Arc<dyn VenueClient>,
        agent: TradingAgent,
        knowledge: KnowledgeBase,
        store: TradeStore,
        cfg: &Config,
        analysis_cfg: AnalysisConfig,
    ) -> (Self, BotHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let agent = Arc::new(RwLock::new(agent));
        let knowledge = Arc::new(knowledge);
        let lifecycle = Arc::new(TradeLifecycle::new(
            venue.clone(),
            store,
            agent.clone(),
            cfg.payout_ratio,
        ));
        let scout = Arc::new(TournamentScout::new(venue.clone()));

        let state = Arc::new(RwLock::new(BotState {
            run_state: BotRunState::Stopped,
            trading_enabled: false,
            asset: cfg.default_asset.clone(),
            timeframe_secs: cfg.default_timeframe_secs,
            min_confidence: cfg.min_confidence.clamp(0.5, 0.95),
            snapshot: AnalysisSnapshot::default(),
            chart_candles: Vec::new(),
            active_tasks: 0,
        }));

        let handle = BotHandle {
            command_tx: command_tx.clone(),
            state: state.clone(),
            venue: venue.clone(),
            lifecycle: lifecycle.clone(),
            agent: agent.clone(),
            knowledge: knowledge.clone(),
        };

        let bot = Bot {
            venue,
            lifecycle,
            agent,
            knowledge,
            scout,
            analysis_cfg,
            state,
            command_rx,
            command_tx,
            tasks: HashMap::new(),
        };

        (bot, handle)
    }

    /// Run the command loop. Call from `tokio::spawn`.
    pub async fn run(mut self) {
        info!("Bot initialized in stopped state, waiting for commands");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                BotCommand::Start => self.handle_start().await,
                BotCommand::Stop => self.handle_stop().await,

                BotCommand::SetTradingEnabled(enabled) => {
                    self.state.write().await.trading_enabled = enabled;
                    info!(enabled, "Trading toggled");
                }

                BotCommand::SetMinConfidence(value) => {
                    let clamped = value.clamp(0.5, 0.95);
                    self.state.write().await.min_confidence = clamped;
                    info!(min_confidence = clamped, "Minimum confidence updated");
                }

                BotCommand::SetAsset(asset) => {
                    if self.venue.assets().contains(&asset) {
                        self.state.write().await.asset = asset;
                    } else {
                        warn!(%asset, "Unknown asset, keeping current");
                    }
                }

                BotCommand::SetTimeframe(secs) => {
                    if SUPPORTED_TIMEFRAMES.contains(&secs) {
                        // Applied to streams on the next start
                        self.state.write().await.timeframe_secs = secs;
                        info!(timeframe_secs = secs, "Timeframe updated");
                    } else {
                        warn!(timeframe_secs = secs, "Unsupported timeframe ignored");
                    }
                }

                BotCommand::JoinTournament { id, reply } => {
                    let joined = self.scout.join_by_id(&id).await;
                    let _ = reply.send(joined);
                }

                BotCommand::ListFreeTournaments { reply } => {
                    let _ = reply.send(self.scout.free_tournaments().await);
                }
            }
        }

        warn!("Bot command channel closed, shutting down");
        self.handle_stop().await;
    }

    async fn handle_start(&mut self) {
        let current = self.state.read().await.run_state;
        if current == BotRunState::Running {
            info!("Bot already running");
            return;
        }

        self.set_run_state(BotRunState::Starting).await;

        // Startup is the one place a connection failure halts the bot.
        match tokio::time::timeout(CONTROL_TIMEOUT, self.venue.connect()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(error = %e, "Venue connection failed, bot stopping");
                self.set_run_state(BotRunState::Stopped).await;
                return;
            }
            Err(_) => {
                error!("Venue connection timed out, bot stopping");
                self.set_run_state(BotRunState::Stopped).await;
                return;
            }
        }

        let timeframe = self.state.read().await.timeframe_secs;
        let (candle_tx, candle_rx) = mpsc::channel::<Candle>(256);

        // One subscription per venue asset at the active timeframe.
        for asset in self.venue.assets() {
            let stream =
                CandleStream::new(self.venue.clone(), asset.clone(), timeframe, candle_tx.clone());
            self.tasks
                .insert(format!("candles_{asset}"), tokio::spawn(stream.run()));
        }
        drop(candle_tx); // the handler ends once every stream is gone

        let ctx = CandleContext {
            state: self.state.clone(),
            lifecycle: self.lifecycle.clone(),
            agent: self.agent.clone(),
            knowledge: self.knowledge.clone(),
            analysis_cfg: self.analysis_cfg.clone(),
        };
        self.tasks
            .insert("handler".into(), tokio::spawn(candle_loop(candle_rx, ctx)));

        let lifecycle = self.lifecycle.clone();
        self.tasks.insert(
            "resolver".into(),
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(RESOLVE_INTERVAL);
                loop {
                    ticker.tick().await;
                    lifecycle.resolve_once().await;
                }
            }),
        );

        self.tasks
            .insert("tournament".into(), tokio::spawn(self.scout.clone().run()));

        let agent = self.agent.clone();
        self.tasks.insert(
            "learner".into(),
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(LEARN_INTERVAL);
                loop {
                    ticker.tick().await;
                    // Retraining placeholder. Heavy work goes to
                    // spawn_blocking so this never stalls the executor.
                    let stats = agent.read().await.stats();
                    debug!(experiences = stats.experiences, "Learner tick");
                }
            }),
        );

        self.sync_task_count().await;
        self.set_run_state(BotRunState::Running).await;
        info!(tasks = self.tasks.len(), "Bot running");
    }

    async fn handle_stop(&mut self) {
        if self.state.read().await.run_state == BotRunState::Stopped && self.tasks.is_empty() {
            return;
        }

        self.set_run_state(BotRunState::Stopping).await;
        info!("Stopping bot");

        for (name, task) in self.tasks.drain() {
            task.abort();
            info!(task = %name, "Cancelled task");
        }

        self.sync_task_count().await;
        self.set_run_state(BotRunState::Stopped).await;
    }

    async fn set_run_state(&self, run_state: BotRunState) {
        self.state.write().await.run_state = run_state;
    }

    async fn sync_task_count(&self) {
        self.state.write().await.active_tasks = self.tasks.len();
    }
}

/// Everything the candle handler needs besides the channel.
#[derive(Clone)]
struct CandleContext {
    state: Arc<RwLock<BotState>>,
    lifecycle: Arc<TradeLifecycle>,
    agent: Arc<RwLock<TradingAgent>>,
    knowledge: Arc<KnowledgeBase>,
    analysis_cfg: AnalysisConfig,
}

/// Single consumer for every asset's candle stream. Each candle is handled
/// to completion before the next is received, which is what guarantees the
/// one-decision-in-flight rule per asset.
async fn candle_loop(mut candle_rx: mpsc::Receiver<Candle>, ctx: CandleContext) {
    let mut windows: HashMap<String, CandleWindow> = HashMap::new();
    while let Some(candle) = candle_rx.recv().await {
        process_candle(candle, &mut windows, &ctx).await;
    }
    debug!("Candle channel closed, handler exiting");
}

async fn process_candle(
    candle: Candle,
    windows: &mut HashMap<String, CandleWindow>,
    ctx: &CandleContext,
) {
    let window = windows.entry(candle.asset.clone()).or_default();
    window.push(candle.clone());

    if window.len() < analysis::indicators::MIN_CANDLES {
        return; // not enough history to analyze yet
    }

    let snapshot = analysis::analyze(window, &ctx.analysis_cfg);

    let (active_asset, trading_enabled, min_confidence) = {
        let state = ctx.state.read().await;
        (state.asset.clone(), state.trading_enabled, state.min_confidence)
    };

    // Only the active asset's snapshot is published for the dashboard.
    if candle.asset == active_asset {
        let mut state = ctx.state.write().await;
        state.snapshot = snapshot.clone();
        state.chart_candles = window.recent(CHART_CANDLES);
    }

    if !trading_enabled {
        return;
    }

    let context = format!(
        "{} {}s japanese candlesticks support and resistance",
        candle.asset, candle.timeframe_secs
    );
    let relevant = ctx.knowledge.relevant(&context);

    let decision = ctx.agent.read().await.decide(&ScoreContext {
        window,
        snapshot: &snapshot,
        knowledge: &relevant,
    });

    ctx.lifecycle
        .open(&candle.asset, &decision, min_confidence)
        .await;
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use common::{Direction, Trade, TradeOutcome, TradeTicket};
    use feed::SimVenue;

    fn test_config() -> Config {
        Config {
            session_id: None,
            demo: true,
            dashboard_token: "token".into(),
            dashboard_port: 0,
            database_url: String::new(),
            default_asset: "EURUSD_otc".into(),
            default_timeframe_secs: 60,
            min_confidence: 0.75,
            payout_ratio: 0.85,
            analysis_config_path: String::new(),
        }
    }

    async fn spawn_bot(venue: Arc<dyn VenueClient>) -> BotHandle {
        let store = TradeStore::in_memory().await.unwrap();
        let (bot, handle) = Bot::new(
            venue,
            TradingAgent::new(),
            KnowledgeBase::seeded(),
            store,
            &test_config(),
            AnalysisConfig::default(),
        );
        tokio::spawn(bot.run());
        handle
    }

    async fn wait_until(handle: &BotHandle, pred: impl Fn(&BotStatus) -> bool) -> BotStatus {
        for _ in 0..100 {
            let status = handle.status().await;
            if pred(&status) {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("condition not reached; last status: {:?}", handle.status().await);
    }

    /// Venue whose connect always fails; everything else is unreachable.
    struct BrokenVenue;

    #[async_trait]
    impl VenueClient for BrokenVenue {
        async fn connect(&self) -> common::Result<()> {
            Err(Error::Venue("no session".into()))
        }
        async fn balance(&self) -> f64 {
            0.0
        }
        fn is_connected(&self) -> bool {
            false
        }
        fn is_simulation(&self) -> bool {
            false
        }
        fn assets(&self) -> Vec<String> {
            vec!["EURUSD_otc".into()]
        }
        async fn place_trade(
            &self,
            _asset: &str,
            _amount: f64,
            _direction: Direction,
            _expiration_secs: u32,
        ) -> common::Result<TradeTicket> {
            Err(Error::Venue("not connected".into()))
        }
        async fn poll_outcome(&self, _trade: &Trade) -> common::Result<Option<TradeOutcome>> {
            Ok(None)
        }
        async fn apply_profit(&self, _delta: f64) {}
        async fn stream_candles(
            &self,
            _asset: &str,
            _timeframe_secs: u32,
            tx: mpsc::Sender<Candle>,
        ) -> common::Result<()> {
            tx.closed().await;
            Ok(())
        }
        async fn tournaments(&self) -> common::Result<Vec<Tournament>> {
            Ok(Vec::new())
        }
        async fn join_tournament(&self, _id: &str) -> common::Result<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn start_spawns_tasks_and_stop_cancels_them_all() {
        let venue = Arc::new(SimVenue::new(true));
        let handle = spawn_bot(venue).await;

        handle.start().await.unwrap();
        let status = wait_until(&handle, |s| s.run_state == BotRunState::Running).await;
        assert!(status.active_tasks > 0);
        assert!(status.connected);

        // Second start is a no-op
        handle.start().await.unwrap();
        let status = wait_until(&handle, |s| s.run_state == BotRunState::Running).await;
        let task_count = status.active_tasks;

        handle.stop().await.unwrap();
        let status = wait_until(&handle, |s| s.run_state == BotRunState::Stopped).await;
        assert_eq!(status.active_tasks, 0, "registry must be empty after stop");
        assert!(!status.is_running);
        assert!(task_count > 0);
    }

    #[tokio::test]
    async fn failed_connect_reverts_to_stopped() {
        let handle = spawn_bot(Arc::new(BrokenVenue)).await;

        handle.start().await.unwrap();
        let status = wait_until(&handle, |s| {
            s.run_state == BotRunState::Stopped && s.active_tasks == 0
        })
        .await;
        assert!(!status.connected);
    }

    #[tokio::test]
    async fn min_confidence_is_clamped_by_the_command_loop() {
        let handle = spawn_bot(Arc::new(SimVenue::new(true))).await;

        handle.set_min_confidence(0.99).await.unwrap();
        wait_until(&handle, |s| (s.min_confidence - 0.95).abs() < 1e-9).await;

        handle.set_min_confidence(0.1).await.unwrap();
        wait_until(&handle, |s| (s.min_confidence - 0.5).abs() < 1e-9).await;
    }

    #[tokio::test]
    async fn invalid_control_inputs_are_rejected_without_state_change() {
        let handle = spawn_bot(Arc::new(SimVenue::new(true))).await;

        assert!(matches!(
            handle.set_active_timeframe(61).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            handle.set_active_asset("  ".into()).await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            handle.set_min_confidence(f64::NAN).await,
            Err(Error::Validation(_))
        ));

        let status = handle.status().await;
        assert_eq!(status.current_timeframe_secs, 60);
        assert_eq!(status.current_asset, "EURUSD_otc");
    }

    #[tokio::test]
    async fn valid_settings_take_effect() {
        let handle = spawn_bot(Arc::new(SimVenue::new(true))).await;

        handle.set_active_timeframe(300).await.unwrap();
        wait_until(&handle, |s| s.current_timeframe_secs == 300).await;

        handle.set_active_asset("GBPUSD_otc".into()).await.unwrap();
        wait_until(&handle, |s| s.current_asset == "GBPUSD_otc").await;

        handle.set_trading_enabled(true).await.unwrap();
        wait_until(&handle, |s| s.trading_enabled).await;
    }

    #[tokio::test]
    async fn tournament_control_round_trips_through_the_command_loop() {
        let venue = Arc::new(SimVenue::new(true));
        venue.connect().await.unwrap();
        let handle = spawn_bot(venue).await;

        let free = handle.list_free_tournaments().await.unwrap();
        assert_eq!(free.len(), 1);

        let joined = handle.join_tournament("sim_tournament_1".into()).await.unwrap();
        assert!(joined);
    }

    #[tokio::test]
    async fn candle_processing_publishes_the_active_asset_snapshot() {
        let venue: Arc<dyn VenueClient> = Arc::new(SimVenue::new(true));
        let store = TradeStore::in_memory().await.unwrap();
        let agent = Arc::new(RwLock::new(TradingAgent::new()));
        let lifecycle = Arc::new(TradeLifecycle::new(
            venue.clone(),
            store,
            agent.clone(),
            0.85,
        ));
        let state = Arc::new(RwLock::new(BotState {
            run_state: BotRunState::Running,
            trading_enabled: false,
            asset: "EURUSD_otc".into(),
            timeframe_secs: 60,
            min_confidence: 0.75,
            snapshot: AnalysisSnapshot::default(),
            chart_candles: Vec::new(),
            active_tasks: 0,
        }));
        let ctx = CandleContext {
            state: state.clone(),
            lifecycle,
            agent,
            knowledge: Arc::new(KnowledgeBase::seeded()),
            analysis_cfg: AnalysisConfig::default(),
        };

        let mut windows = HashMap::new();
        for i in 0..25 {
            let price = 1.12 + (i % 7) as f64 * 0.0003;
            let candle = Candle {
                asset: "EURUSD_otc".into(),
                timeframe_secs: 60,
                timestamp: Utc::now(),
                open: price,
                high: price + 0.0004,
                low: price - 0.0004,
                close: price + 0.0002,
                volume: 500.0,
            };
            process_candle(candle, &mut windows, &ctx).await;
        }

        let state = state.read().await;
        assert_eq!(state.chart_candles.len(), 25);
        assert!(state.snapshot.indicators.rsi.is_some());

        // Inactive assets never touch the published snapshot
        drop(state);
        let other = Candle {
            asset: "USDJPY_otc".into(),
            timeframe_secs: 60,
            timestamp: Utc::now(),
            open: 155.0,
            high: 155.1,
            low: 154.9,
            close: 155.05,
            volume: 500.0,
        };
        process_candle(other, &mut windows, &ctx).await;
        assert_eq!(
            ctx.state.read().await.chart_candles.first().unwrap().asset,
            "EURUSD_otc"
        );
    }
}
