use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};

use common::{
    Candle, Direction, Error, Result, Tournament, Trade, TradeOutcome, TradeStatus, TradeTicket,
    VenueClient,
};

/// Simulated venue for running the bot without a broker session.
///
/// Candles follow a bounded random walk (statistical shape only, no
/// reproducible sequence), fills always succeed, and pending options settle
/// with a randomized outcome a short delay after creation.
pub struct SimVenue {
    connected: AtomicBool,
    balance: RwLock<f64>,
    demo: bool,
    assets: Vec<String>,
    /// How long after creation a pending option reports settlement.
    settle_after: Duration,
}

impl SimVenue {
    const STARTING_BALANCE: f64 = 10_000.0;

    pub fn new(demo: bool) -> Self {
        info!(demo, "SimVenue initialized");
        Self {
            connected: AtomicBool::new(false),
            balance: RwLock::new(0.0),
            demo,
            assets: vec![
                "EURUSD_otc".into(),
                "GBPUSD_otc".into(),
                "USDJPY_otc".into(),
                "AUDUSD_otc".into(),
                "EURJPY_otc".into(),
                "GBPJPY_otc".into(),
                "EURGBP_otc".into(),
                "USDCAD_otc".into(),
            ],
            settle_after: Duration::from_secs(5),
        }
    }

    /// Override the settlement delay (used by tests).
    pub fn with_settle_after(mut self, delay: Duration) -> Self {
        self.settle_after = delay;
        self
    }
}

fn round5(x: f64) -> f64 {
    (x * 1e5).round() / 1e5
}

#[async_trait]
impl VenueClient for SimVenue {
    async fn connect(&self) -> Result<()> {
        self.connected.store(true, Ordering::SeqCst);
        let starting = if self.demo { Self::STARTING_BALANCE } else { 0.0 };
        *self.balance.write().await = starting;
        info!(balance = starting, "Simulated venue connected");
        Ok(())
    }

    async fn balance(&self) -> f64 {
        *self.balance.read().await
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn is_simulation(&self) -> bool {
        true
    }

    fn assets(&self) -> Vec<String> {
        self.assets.clone()
    }

    async fn place_trade(
        &self,
        asset: &str,
        amount: f64,
        direction: Direction,
        expiration_secs: u32,
    ) -> Result<TradeTicket> {
        if !self.is_connected() {
            return Err(Error::Venue("not connected".into()));
        }

        let trade_id = uuid::Uuid::new_v4().to_string();
        info!(
            %asset,
            %direction,
            amount,
            expiration_secs,
            trade_id = %trade_id,
            "[simulation] trade placed"
        );
        Ok(TradeTicket {
            trade_id,
            status: TradeStatus::Pending,
        })
    }

    async fn poll_outcome(&self, trade: &Trade) -> Result<Option<TradeOutcome>> {
        if trade.status == TradeStatus::Settled {
            return Ok(trade.outcome);
        }

        let age = Utc::now().signed_duration_since(trade.created_at);
        if age.num_milliseconds() < self.settle_after.as_millis() as i64 {
            return Ok(None);
        }

        // Randomized settlement; only the win/loss interface contract matters.
        let outcome = if rand::random::<bool>() {
            TradeOutcome::Win
        } else {
            TradeOutcome::Loss
        };
        Ok(Some(outcome))
    }

    async fn apply_profit(&self, delta: f64) {
        let mut balance = self.balance.write().await;
        *balance += delta;
        debug!(delta, balance = *balance, "Simulated balance adjusted");
    }

    async fn stream_candles(
        &self,
        asset: &str,
        timeframe_secs: u32,
        tx: mpsc::Sender<Candle>,
    ) -> Result<()> {
        let mut rng = StdRng::from_entropy();
        let mut base = 1.12_f64;

        while self.is_connected() {
            let open = base;
            let close = open + rng.gen_range(-0.0001..0.0001) * 5.0;
            let high = open.max(close).max(base + rng.gen_range(0.0..0.0001));
            let low = open.min(close).min(base - rng.gen_range(0.0..0.0001));

            let candle = Candle {
                asset: asset.to_string(),
                timeframe_secs,
                timestamp: Utc::now(),
                open: round5(open),
                high: round5(high),
                low: round5(low),
                close: round5(close),
                volume: rng.gen_range(100.0_f64..1000.0).round(),
            };
            base = close;

            if tx.send(candle).await.is_err() {
                // Consumer gone, subscription over.
                return Ok(());
            }

            tokio::time::sleep(Duration::from_secs(u64::from(timeframe_secs))).await;
        }
        Ok(())
    }

    async fn tournaments(&self) -> Result<Vec<Tournament>> {
        Ok(vec![
            Tournament {
                id: "sim_tournament_1".into(),
                name: "Daily Free Tournament".into(),
                entry_fee: 0.0,
                prize_pool: 100.0,
                participants: 50,
                status: "active".into(),
            },
            Tournament {
                id: "sim_tournament_2".into(),
                name: "Weekend Paid Contest".into(),
                entry_fee: 10.0,
                prize_pool: 1000.0,
                participants: 120,
                status: "invitation_open".into(),
            },
        ])
    }

    async fn join_tournament(&self, id: &str) -> Result<bool> {
        info!(tournament_id = %id, "[simulation] joined tournament");
        Ok(true)
    }
}
