pub mod knowledge;
pub mod scorer;
pub mod sizing;

pub use knowledge::{Concept, KnowledgeBase, KnowledgeStats};
pub use scorer::{HeuristicScorer, ScoreContext, Scorer};
pub use sizing::{trade_amount, trade_expiration};

use serde::Serialize;
use tracing::debug;

use common::{Decision, Direction, Trade, TradeOutcome};

/// Decision engine: a scoring strategy plus placeholder training state.
///
/// The scorer is swappable behind the `Scorer` trait; the default is the
/// heuristic implementation. Settled trades land in the experience buffer
/// for a future learned model; nothing trains on them yet.
pub struct TradingAgent {
    scorer: Box<dyn Scorer>,
    experience: Vec<Experience>,
    max_experience: usize,
}

/// One settled trade as seen by the (future) learner.
#[derive(Debug, Clone)]
pub struct Experience {
    pub asset: String,
    pub direction: Direction,
    pub outcome: TradeOutcome,
    pub profit: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentStats {
    pub experiences: usize,
    pub is_trained: bool,
    pub win_rate: f64,
}

impl TradingAgent {
    const MAX_EXPERIENCE: usize = 10_000;

    pub fn new() -> Self {
        Self::with_scorer(Box::new(HeuristicScorer))
    }

    pub fn with_scorer(scorer: Box<dyn Scorer>) -> Self {
        Self {
            scorer,
            experience: Vec::new(),
            max_experience: Self::MAX_EXPERIENCE,
        }
    }

    /// Produce a decision for the current market context.
    /// Pure with respect to trade and bot state.
    pub fn decide(&self, ctx: &ScoreContext<'_>) -> Decision {
        let decision = self.scorer.score(ctx);
        debug!(
            scorer = self.scorer.name(),
            action = ?decision.action,
            confidence = decision.confidence,
            "Decision generated"
        );
        decision
    }

    /// Feed one settled trade into the training buffer.
    pub fn record_outcome(&mut self, trade: &Trade) {
        let (Some(outcome), Some(profit)) = (trade.outcome, trade.profit) else {
            return; // not settled, nothing to learn from
        };
        self.experience.push(Experience {
            asset: trade.asset.clone(),
            direction: trade.direction,
            outcome,
            profit,
        });
        if self.experience.len() > self.max_experience {
            let excess = self.experience.len() - self.max_experience;
            self.experience.drain(..excess);
        }
    }

    pub fn stats(&self) -> AgentStats {
        let wins = self
            .experience
            .iter()
            .filter(|e| e.outcome == TradeOutcome::Win)
            .count();
        let win_rate = if self.experience.is_empty() {
            0.0
        } else {
            wins as f64 / self.experience.len() as f64
        };
        AgentStats {
            experiences: self.experience.len(),
            is_trained: false,
            win_rate,
        }
    }
}

impl Default for TradingAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::TradeStatus;

    fn settled(outcome: TradeOutcome, profit: f64) -> Trade {
        let mut trade = Trade::pending("t", "EURUSD_otc", 10.0, Direction::Call, 60);
        trade.status = TradeStatus::Settled;
        trade.outcome = Some(outcome);
        trade.profit = Some(profit);
        trade
    }

    #[test]
    fn unsettled_trades_are_not_recorded() {
        let mut agent = TradingAgent::new();
        let trade = Trade::pending("t", "EURUSD_otc", 10.0, Direction::Call, 60);
        agent.record_outcome(&trade);
        assert_eq!(agent.stats().experiences, 0);
    }

    #[test]
    fn win_rate_tracks_recorded_outcomes() {
        let mut agent = TradingAgent::new();
        agent.record_outcome(&settled(TradeOutcome::Win, 8.5));
        agent.record_outcome(&settled(TradeOutcome::Win, 8.5));
        agent.record_outcome(&settled(TradeOutcome::Loss, -10.0));

        let stats = agent.stats();
        assert_eq!(stats.experiences, 3);
        assert!((stats.win_rate - 2.0 / 3.0).abs() < 1e-9);
        assert!(!stats.is_trained);
    }
}
