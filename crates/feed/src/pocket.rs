use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info, warn};

use common::{
    Candle, Direction, Error, Result, Tournament, Trade, TradeOutcome, TradeStatus, TradeTicket,
    VenueClient,
};

const BASE_URL: &str = "https://api.po.market";

/// Live venue client authenticated with a dashboard session id.
///
/// Every venue fault maps to an error outcome; nothing in here panics on a
/// bad response. Balance is cached from the last profile fetch and adjusted
/// locally between refreshes.
pub struct PocketVenue {
    session_id: String,
    demo: bool,
    http: Client,
    connected: AtomicBool,
    balance: RwLock<f64>,
    assets: Vec<String>,
}

impl PocketVenue {
    pub fn new(session_id: impl Into<String>, demo: bool) -> Self {
        Self {
            session_id: session_id.into(),
            demo,
            http: Client::builder()
                .use_rustls_tls()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client"),
            connected: AtomicBool::new(false),
            balance: RwLock::new(0.0),
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
        }
    }

    async fn get(&self, path: &str) -> Result<String> {
        let url = format!("{BASE_URL}{path}");
        let resp = self
            .http
            .get(&url)
            .header("X-Session-Id", &self.session_id)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::Venue(format!("HTTP {status}: {body}")));
        }
        Ok(body)
    }

    async fn post(&self, path: &str, body: &serde_json::Value) -> Result<String> {
        let url = format!("{BASE_URL}{path}");
        let resp = self
            .http
            .post(&url)
            .header("X-Session-Id", &self.session_id)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::Venue(format!("HTTP {status}: {text}")));
        }
        Ok(text)
    }
}

#[async_trait]
impl VenueClient for PocketVenue {
    async fn connect(&self) -> Result<()> {
        // Fails closed: any error leaves connected=false and balance untouched.
        match self.get("/v2/profile").await {
            Ok(body) => {
                let profile: ProfileResponse =
                    serde_json::from_str(&body).map_err(|e| Error::Venue(e.to_string()))?;
                let balance = if self.demo {
                    profile.demo_balance
                } else {
                    profile.live_balance
                };
                *self.balance.write().await = balance;
                self.connected.store(true, Ordering::SeqCst);
                info!(demo = self.demo, balance, "Connected to venue");
                Ok(())
            }
            Err(e) => {
                self.connected.store(false, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    async fn balance(&self) -> f64 {
        *self.balance.read().await
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn is_simulation(&self) -> bool {
        false
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
        let body = serde_json::json!({
            "asset": asset,
            "amount": amount,
            "direction": direction.to_string(),
            "expiration": expiration_secs,
            "demo": self.demo,
        });

        debug!(%asset, %direction, amount, "Submitting order to venue");
        let text = self.post("/v2/orders", &body).await?;
        let resp: OrderResponse =
            serde_json::from_str(&text).map_err(|e| Error::Venue(e.to_string()))?;

        Ok(TradeTicket {
            trade_id: resp.id,
            status: TradeStatus::Pending,
        })
    }

    async fn poll_outcome(&self, trade: &Trade) -> Result<Option<TradeOutcome>> {
        let body = self.get(&format!("/v2/orders/{}", trade.trade_id)).await?;
        let resp: OrderStatusResponse =
            serde_json::from_str(&body).map_err(|e| Error::Venue(e.to_string()))?;

        if resp.status != "closed" {
            return Ok(None);
        }
        match resp.outcome.as_deref() {
            Some("win") => Ok(Some(TradeOutcome::Win)),
            Some("loss") => Ok(Some(TradeOutcome::Loss)),
            other => Err(Error::Venue(format!(
                "closed order {} with unexpected outcome {other:?}",
                trade.trade_id
            ))),
        }
    }

    async fn apply_profit(&self, delta: f64) {
        // Cache adjustment only; the authoritative number comes from the
        // next profile fetch.
        let mut balance = self.balance.write().await;
        *balance += delta;
    }

    async fn stream_candles(
        &self,
        asset: &str,
        timeframe_secs: u32,
        tx: mpsc::Sender<Candle>,
    ) -> Result<()> {
        // The venue exposes the latest closed candle over REST; one poll per
        // timeframe tick matches the stream contract.
        while self.is_connected() {
            let body = self
                .get(&format!(
                    "/v2/candles/latest?asset={asset}&period={timeframe_secs}"
                ))
                .await?;
            let dto: CandleDto =
                serde_json::from_str(&body).map_err(|e| Error::Venue(e.to_string()))?;

            let candle = Candle {
                asset: asset.to_string(),
                timeframe_secs,
                timestamp: chrono::DateTime::from_timestamp(dto.timestamp, 0)
                    .unwrap_or_else(Utc::now),
                open: dto.open,
                high: dto.high,
                low: dto.low,
                close: dto.close,
                volume: dto.volume,
            };

            if tx.send(candle).await.is_err() {
                return Ok(());
            }

            tokio::time::sleep(Duration::from_secs(u64::from(timeframe_secs))).await;
        }
        Ok(())
    }

    async fn tournaments(&self) -> Result<Vec<Tournament>> {
        let body = self.get("/v2/tournaments").await?;
        let dtos: Vec<TournamentDto> =
            serde_json::from_str(&body).map_err(|e| Error::Venue(e.to_string()))?;

        Ok(dtos
            .into_iter()
            .map(|t| Tournament {
                id: t.id,
                name: t.name,
                entry_fee: t.entry_fee,
                prize_pool: t.prize_pool,
                participants: t.participants,
                status: t.status,
            })
            .collect())
    }

    async fn join_tournament(&self, id: &str) -> Result<bool> {
        let text = self
            .post(&format!("/v2/tournaments/{id}/join"), &serde_json::json!({}))
            .await?;
        let resp: JoinResponse =
            serde_json::from_str(&text).map_err(|e| Error::Venue(e.to_string()))?;
        if resp.success {
            info!(tournament_id = %id, "Joined tournament");
        } else {
            warn!(tournament_id = %id, "Venue refused tournament join");
        }
        Ok(resp.success)
    }
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ProfileResponse {
    #[serde(default)]
    demo_balance: f64,
    #[serde(default)]
    live_balance: f64,
}

#[derive(Deserialize)]
struct OrderResponse {
    id: String,
}

#[derive(Deserialize)]
struct OrderStatusResponse {
    status: String,
    outcome: Option<String>,
}

#[derive(Deserialize)]
struct CandleDto {
    timestamp: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: f64,
}

#[derive(Deserialize)]
struct TournamentDto {
    id: String,
    name: String,
    #[serde(default)]
    entry_fee: f64,
    #[serde(default)]
    prize_pool: f64,
    #[serde(default)]
    participants: u32,
    status: String,
}

#[derive(Deserialize)]
struct JoinResponse {
    success: bool,
}
