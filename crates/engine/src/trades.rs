use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use agent::{sizing, TradingAgent};
use common::{Decision, Trade, TradeOutcome, TradeStatus, VenueClient};
use store::TradeStore;

/// Owns every trade from placement to settlement.
///
/// This is the ONLY component that calls `place_trade`, `poll_outcome` and
/// `apply_profit` on the venue. A trade lives in the pending map XOR the
/// history list; settlement moves it across exactly once.
pub struct TradeLifecycle {
    venue: Arc<dyn VenueClient>,
    store: TradeStore,
    agent: Arc<RwLock<TradingAgent>>,
    payout_ratio: f64,
    pending: RwLock<HashMap<String, Trade>>,
    history: RwLock<Vec<Trade>>,
}

/// Read-only projection of trade performance.
#[derive(Debug, Clone, Serialize)]
pub struct TradeStats {
    pub total_trades: usize,
    pub total_wins: usize,
    pub total_losses: usize,
    /// wins / settled, zero when nothing settled yet.
    pub win_rate: f64,
    pub pending_trades: usize,
    pub recent_trades: Vec<Trade>,
}

impl TradeLifecycle {
    pub fn new(
        venue: Arc<dyn VenueClient>,
        store: TradeStore,
        agent: Arc<RwLock<TradingAgent>>,
        payout_ratio: f64,
    ) -> Self {
        Self {
            venue,
            store,
            agent,
            payout_ratio,
            pending: RwLock::new(HashMap::new()),
            history: RwLock::new(Vec::new()),
        }
    }

    /// Try to turn a decision into a pending trade.
    ///
    /// Everything that stops the trade here is policy, not failure: the
    /// confidence gate, the sizing floor, and venue rejection all log and
    /// drop the decision. No retry: the next candle brings a new decision.
    /// Returns the venue trade id when a trade was actually placed.
    pub async fn open(&self, asset: &str, decision: &Decision, min_confidence: f64) -> Option<String> {
        let direction = decision.action.direction()?;

        if decision.confidence < min_confidence {
            debug!(
                %asset,
                confidence = decision.confidence,
                gate = min_confidence,
                "Decision below confidence gate"
            );
            return None;
        }

        let balance = self.venue.balance().await;
        let amount = sizing::trade_amount(balance, decision.confidence);
        if amount < sizing::MIN_TRADE_AMOUNT || amount > balance {
            warn!(%asset, amount, balance, "Trade amount outside fundable range, skipping");
            return None;
        }

        info!(
            %asset,
            %direction,
            amount,
            expiration = decision.expiration_secs,
            confidence = decision.confidence,
            "Placing trade"
        );

        let ticket = match self
            .venue
            .place_trade(asset, amount, direction, decision.expiration_secs)
            .await
        {
            Ok(ticket) => ticket,
            Err(e) => {
                // Failed placement leaves no trade state behind.
                warn!(%asset, error = %e, "Trade placement failed, decision dropped");
                return None;
            }
        };

        let trade = Trade::pending(
            ticket.trade_id.clone(),
            asset,
            amount,
            direction,
            decision.expiration_secs,
        );

        self.pending
            .write()
            .await
            .insert(trade.trade_id.clone(), trade.clone());

        if let Err(e) = self.store.save_trade(&trade).await {
            error!(trade_id = %trade.trade_id, error = %e, "Failed to persist trade");
        }

        Some(ticket.trade_id)
    }

    /// One resolution sweep over the pending map.
    ///
    /// Each settled trade is removed from pending, appended to history,
    /// applied to the balance and persisted, exactly once. Re-running
    /// after settlement is a no-op because settled trades are no longer
    /// pending.
    pub async fn resolve_once(&self) {
        let snapshot: Vec<Trade> = self.pending.read().await.values().cloned().collect();

        for trade in snapshot {
            let outcome = match self.venue.poll_outcome(&trade).await {
                Ok(Some(outcome)) => outcome,
                Ok(None) => continue,
                Err(e) => {
                    warn!(trade_id = %trade.trade_id, error = %e, "Outcome poll failed");
                    continue;
                }
            };

            // Claim the settlement: whoever removes the pending entry owns it.
            let Some(mut settled) = self.pending.write().await.remove(&trade.trade_id) else {
                continue;
            };

            let profit = match outcome {
                TradeOutcome::Win => settled.amount * self.payout_ratio,
                TradeOutcome::Loss => -settled.amount,
            };

            settled.status = TradeStatus::Settled;
            settled.outcome = Some(outcome);
            settled.profit = Some(profit);

            self.venue.apply_profit(profit).await;

            if let Err(e) = self
                .store
                .update_outcome(&settled.trade_id, outcome, profit)
                .await
            {
                error!(trade_id = %settled.trade_id, error = %e, "Failed to persist settlement");
            }

            self.agent.write().await.record_outcome(&settled);

            info!(
                asset = %settled.asset,
                direction = %settled.direction,
                %outcome,
                profit,
                "Trade resolved"
            );

            self.history.write().await.push(settled);
        }
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.read().await.len()
    }

    pub async fn stats(&self) -> TradeStats {
        let history = self.history.read().await;
        let pending = self.pending.read().await.len();

        let total = history.len();
        let wins = history
            .iter()
            .filter(|t| t.outcome == Some(TradeOutcome::Win))
            .count();

        TradeStats {
            total_trades: total,
            total_wins: wins,
            total_losses: total - wins,
            win_rate: if total == 0 {
                0.0
            } else {
                wins as f64 / total as f64
            },
            pending_trades: pending,
            recent_trades: history.iter().rev().take(10).cloned().collect(),
        }
    }
}
