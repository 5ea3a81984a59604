use analysis::indicators::{IndicatorSet, MacdTrend, RsiZone, StochZone};
use analysis::{AnalysisSnapshot, CandleWindow, SignalBias};
use common::{Decision, TradeAction};

use crate::knowledge::Concept;
use crate::sizing::trade_expiration;

/// Everything a scorer may look at. Read-only; scoring never touches trade
/// or bot state.
pub struct ScoreContext<'a> {
    pub window: &'a CandleWindow,
    pub snapshot: &'a AnalysisSnapshot,
    pub knowledge: &'a [Concept],
}

/// A scoring strategy. The default is heuristic; a learned model slots in
/// behind the same contract.
pub trait Scorer: Send + Sync {
    fn name(&self) -> &str;

    fn score(&self, ctx: &ScoreContext<'_>) -> Decision;
}

/// Combined scores below this map to `Hold`.
const HOLD_THRESHOLD: f64 = 0.65;

/// Rule-based scorer: fuses the freshest pattern with an indicator vote.
pub struct HeuristicScorer;

impl Scorer for HeuristicScorer {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn score(&self, ctx: &ScoreContext<'_>) -> Decision {
        let (pattern_bias, pattern_strength) = ctx
            .snapshot
            .patterns
            .first()
            .map(|p| (p.bias, p.strength))
            .unwrap_or((SignalBias::Neutral, 0.5));

        let (indicator_bias, indicator_strength) = indicator_vote(&ctx.snapshot.indicators);

        // Signed sum: positive favors CALL, negative PUT.
        let score = pattern_strength * bias_sign(pattern_bias)
            + indicator_strength * bias_sign(indicator_bias);

        let confidence = (score.abs() / 2.0).clamp(0.5, 0.9);
        if confidence < HOLD_THRESHOLD {
            return Decision::hold("combined score below execution threshold");
        }

        let action = if score > 0.0 {
            TradeAction::Call
        } else {
            TradeAction::Put
        };

        let volatility = ctx
            .snapshot
            .indicators
            .atr
            .as_ref()
            .map(|a| a.value)
            .unwrap_or(0.001);

        Decision {
            action,
            confidence,
            expiration_secs: trade_expiration(volatility, pattern_strength),
            rationale: format!(
                "pattern {pattern_bias:?} ({pattern_strength:.2}) + indicators {indicator_bias:?} ({indicator_strength:.2})"
            ),
        }
    }
}

fn bias_sign(bias: SignalBias) -> f64 {
    match bias {
        SignalBias::Call => 1.0,
        SignalBias::Put => -1.0,
        SignalBias::Neutral => 0.0,
    }
}

/// Weighted vote across the oscillators: RSI counts 1, MACD 1.5,
/// stochastic 0.5. Vote strength caps at 0.8.
fn indicator_vote(ind: &IndicatorSet) -> (SignalBias, f64) {
    let mut bullish: f64 = 0.0;
    let mut bearish: f64 = 0.0;

    if let Some(rsi) = &ind.rsi {
        match rsi.zone {
            RsiZone::Oversold => bullish += 1.0,
            RsiZone::Overbought => bearish += 1.0,
            RsiZone::Neutral => {}
        }
    }
    if let Some(macd) = &ind.macd {
        match macd.trend {
            MacdTrend::Bullish => bullish += 1.5,
            MacdTrend::Bearish => bearish += 1.5,
            MacdTrend::Neutral => {}
        }
    }
    if let Some(stoch) = &ind.stochastic {
        match stoch.zone {
            StochZone::Oversold => bullish += 0.5,
            StochZone::Overbought => bearish += 0.5,
            StochZone::Neutral => {}
        }
    }

    if bullish > bearish {
        (SignalBias::Call, (bullish / 2.0).min(0.8))
    } else if bearish > bullish {
        (SignalBias::Put, (bearish / 2.0).min(0.8))
    } else {
        (SignalBias::Neutral, 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis::indicators::{MacdReading, RsiReading, StochasticReading};
    use analysis::PatternMatch;
    use chrono::Utc;

    fn pattern(bias: SignalBias, strength: f64) -> PatternMatch {
        PatternMatch {
            name: "Bullish Engulfing".into(),
            category: "reversal".into(),
            bias,
            strength,
            index: 0,
            timestamp: Utc::now(),
            price: 1.12,
        }
    }

    fn bullish_indicators() -> IndicatorSet {
        IndicatorSet {
            rsi: Some(RsiReading {
                value: 25.0,
                zone: RsiZone::Oversold,
            }),
            macd: Some(MacdReading {
                line: 0.001,
                signal: 0.0,
                histogram: 0.001,
                trend: MacdTrend::Bullish,
            }),
            ..IndicatorSet::default()
        }
    }

    fn ctx<'a>(
        window: &'a CandleWindow,
        snapshot: &'a AnalysisSnapshot,
    ) -> ScoreContext<'a> {
        ScoreContext {
            window,
            snapshot,
            knowledge: &[],
        }
    }

    #[test]
    fn empty_snapshot_holds() {
        let window = CandleWindow::default();
        let snapshot = AnalysisSnapshot::default();
        let decision = HeuristicScorer.score(&ctx(&window, &snapshot));
        assert_eq!(decision.action, TradeAction::Hold);
        assert!((decision.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn pattern_and_indicators_in_agreement_produce_a_call() {
        let window = CandleWindow::default();
        let snapshot = AnalysisSnapshot {
            patterns: vec![pattern(SignalBias::Call, 0.9)],
            indicators: bullish_indicators(),
            ..AnalysisSnapshot::default()
        };

        let decision = HeuristicScorer.score(&ctx(&window, &snapshot));
        assert_eq!(decision.action, TradeAction::Call);
        assert!(decision.confidence >= HOLD_THRESHOLD);
        assert!(decision.confidence <= 0.9);
        // Strong pattern, quiet market: 300s base at x1
        assert_eq!(decision.expiration_secs, 300);
    }

    #[test]
    fn conflicting_signals_hold() {
        let window = CandleWindow::default();
        let mut indicators = bullish_indicators();
        // Flip the vote against the pattern
        indicators.rsi = Some(RsiReading {
            value: 80.0,
            zone: RsiZone::Overbought,
        });
        indicators.macd = Some(MacdReading {
            line: -0.001,
            signal: 0.0,
            histogram: -0.001,
            trend: MacdTrend::Bearish,
        });
        indicators.stochastic = Some(StochasticReading {
            k: 90.0,
            d: 85.0,
            zone: StochZone::Overbought,
        });

        let snapshot = AnalysisSnapshot {
            patterns: vec![pattern(SignalBias::Call, 0.9)],
            indicators,
            ..AnalysisSnapshot::default()
        };

        let decision = HeuristicScorer.score(&ctx(&window, &snapshot));
        assert_eq!(decision.action, TradeAction::Hold);
    }

    #[test]
    fn bearish_agreement_produces_a_put() {
        let window = CandleWindow::default();
        let indicators = IndicatorSet {
            rsi: Some(RsiReading {
                value: 82.0,
                zone: RsiZone::Overbought,
            }),
            macd: Some(MacdReading {
                line: -0.001,
                signal: 0.0,
                histogram: -0.001,
                trend: MacdTrend::Bearish,
            }),
            ..IndicatorSet::default()
        };
        let snapshot = AnalysisSnapshot {
            patterns: vec![pattern(SignalBias::Put, 0.9)],
            indicators,
            ..AnalysisSnapshot::default()
        };

        let decision = HeuristicScorer.score(&ctx(&window, &snapshot));
        assert_eq!(decision.action, TradeAction::Put);
    }
}
