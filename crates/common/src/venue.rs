use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::{Candle, Direction, Result, Tournament, Trade, TradeOutcome, TradeTicket};

/// Abstraction over the broker/venue connection.
///
/// `PocketVenue` implements this for live trading, `SimVenue` for
/// simulation. The rest of the system must not care which is active;
/// `is_simulation` exists only for status reporting.
///
/// Only the trade lifecycle manager in `crates/engine` may call
/// `place_trade`, `poll_outcome` and `apply_profit`.
#[async_trait]
pub trait VenueClient: Send + Sync {
    /// Establish the venue connection. Fails closed: on error the venue is
    /// disconnected and no balance may be assumed.
    async fn connect(&self) -> Result<()>;

    /// Current account balance. Zero until connected.
    async fn balance(&self) -> f64;

    fn is_connected(&self) -> bool;

    fn is_simulation(&self) -> bool;

    /// Instruments this venue serves.
    fn assets(&self) -> Vec<String>;

    /// Submit a binary-option order. Venue faults surface as `Err`,
    /// never a panic, and leave no trade state behind.
    async fn place_trade(
        &self,
        asset: &str,
        amount: f64,
        direction: Direction,
        expiration_secs: u32,
    ) -> Result<TradeTicket>;

    /// Ask the venue whether a pending trade has settled.
    /// `None` while the option is still open.
    async fn poll_outcome(&self, trade: &Trade) -> Result<Option<TradeOutcome>>;

    /// Apply a realized profit/loss to the tracked balance. The simulated
    /// venue adjusts its ledger; a live venue re-queries on the next
    /// `balance` call and may ignore the delta.
    async fn apply_profit(&self, delta: f64);

    /// Produce one candle per `timeframe_secs` for `asset` until the
    /// receiver closes, the venue disconnects, or the surrounding task is
    /// cancelled. Long-running by contract; cancellation is the normal way
    /// to end an active subscription.
    async fn stream_candles(
        &self,
        asset: &str,
        timeframe_secs: u32,
        tx: mpsc::Sender<Candle>,
    ) -> Result<()>;

    /// All tournaments currently listed by the venue.
    async fn tournaments(&self) -> Result<Vec<Tournament>>;

    /// Join a tournament by id. `Ok(false)` means the venue refused
    /// (already joined, closed, invalid id).
    async fn join_tournament(&self, id: &str) -> Result<bool>;
}
