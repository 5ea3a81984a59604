use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Expirations the venue accepts, in seconds.
pub const SUPPORTED_TIMEFRAMES: [u32; 4] = [60, 300, 900, 3600];

/// One OHLCV bar for an asset over a fixed time bucket.
/// Immutable once produced by the feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub asset: String,
    pub timeframe_secs: u32,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Absolute size of the candle body.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Full high-to-low range.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Side of a placed binary-option trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "TEXT", rename_all = "UPPERCASE")]
pub enum Direction {
    Call,
    Put,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Call => write!(f, "CALL"),
            Direction::Put => write!(f, "PUT"),
        }
    }
}

/// What the decision engine wants to do with the current candle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Call,
    Put,
    Hold,
}

impl TradeAction {
    /// The executable side, if any. `Hold` never reaches the venue.
    pub fn direction(&self) -> Option<Direction> {
        match self {
            TradeAction::Call => Some(Direction::Call),
            TradeAction::Put => Some(Direction::Put),
            TradeAction::Hold => None,
        }
    }
}

/// Directional decision produced once per candle for the active asset.
/// Ephemeral: consumed immediately by the trade lifecycle or discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub action: TradeAction,
    /// Execution gate value in [0, 1].
    pub confidence: f64,
    pub expiration_secs: u32,
    pub rationale: String,
}

impl Decision {
    pub fn hold(rationale: impl Into<String>) -> Self {
        Self {
            action: TradeAction::Hold,
            confidence: 0.5,
            expiration_secs: 0,
            rationale: rationale.into(),
        }
    }
}

/// Venue acceptance record for a placed trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeTicket {
    pub trade_id: String,
    pub status: TradeStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum TradeStatus {
    Pending,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum TradeOutcome {
    Win,
    Loss,
}

impl std::fmt::Display for TradeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeOutcome::Win => write!(f, "win"),
            TradeOutcome::Loss => write!(f, "loss"),
        }
    }
}

/// A binary-option trade tracked from placement to settlement.
/// Identity is the venue-issued `trade_id`. Moves pending -> settled exactly
/// once and is immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub trade_id: String,
    pub asset: String,
    pub amount: f64,
    pub direction: Direction,
    pub expiration_secs: u32,
    pub created_at: DateTime<Utc>,
    pub status: TradeStatus,
    pub outcome: Option<TradeOutcome>,
    pub profit: Option<f64>,
}

impl Trade {
    /// A freshly accepted trade waiting for settlement.
    pub fn pending(
        trade_id: impl Into<String>,
        asset: impl Into<String>,
        amount: f64,
        direction: Direction,
        expiration_secs: u32,
    ) -> Self {
        Self {
            trade_id: trade_id.into(),
            asset: asset.into(),
            amount,
            direction,
            expiration_secs,
            created_at: Utc::now(),
            status: TradeStatus::Pending,
            outcome: None,
            profit: None,
        }
    }
}

/// A tournament offered by the venue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub id: String,
    pub name: String,
    pub entry_fee: f64,
    pub prize_pool: f64,
    pub participants: u32,
    pub status: String,
}

impl Tournament {
    /// Zero-entry-fee tournaments currently accepting participants.
    pub fn is_free_and_open(&self) -> bool {
        self.entry_fee == 0.0 && matches!(self.status.as_str(), "active" | "invitation_open")
    }
}

/// Lifecycle state of the bot as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BotRunState {
    #[default]
    Stopped,
    Starting,
    Running,
    Stopping,
}

impl std::fmt::Display for BotRunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BotRunState::Stopped => write!(f, "stopped"),
            BotRunState::Starting => write!(f, "starting"),
            BotRunState::Running => write!(f, "running"),
            BotRunState::Stopping => write!(f, "stopping"),
        }
    }
}

/// Control intents enqueued onto the bot's command loop.
/// The request-serving boundary never mutates bot state directly; it sends
/// one of these and, where a reply is needed, waits on the oneshot under a
/// bounded timeout.
pub enum BotCommand {
    Start,
    Stop,
    SetTradingEnabled(bool),
    SetMinConfidence(f64),
    SetAsset(String),
    SetTimeframe(u32),
    JoinTournament {
        id: String,
        reply: oneshot::Sender<bool>,
    },
    ListFreeTournaments {
        reply: oneshot::Sender<Vec<Tournament>>,
    },
}
