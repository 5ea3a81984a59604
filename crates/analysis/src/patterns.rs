use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use common::Candle;

use crate::window::CandleWindow;

/// Fewest candles a pattern scan needs; below this the detector returns
/// nothing rather than failing.
pub const MIN_CANDLES: usize = 3;

/// Directional hint carried by a detected pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalBias {
    Call,
    Put,
    Neutral,
}

/// One candlestick pattern occurrence inside the scan window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternMatch {
    pub name: String,
    pub category: String,
    pub bias: SignalBias,
    /// Detection confidence in [0, 1].
    pub strength: f64,
    /// Position in the window, 0 = most recent candle.
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// Scan the most recent `lookback` positions for known candle shapes.
/// Matches come back in ascending index order (newest position first).
pub fn detect_patterns(window: &CandleWindow, lookback: usize) -> Vec<PatternMatch> {
    if window.len() < MIN_CANDLES {
        return Vec::new();
    }

    let mut found = Vec::new();
    for i in 0..window.len().saturating_sub(2).min(lookback) {
        let current = match window.get(i) {
            Some(c) => c,
            None => break,
        };
        let prev = window.get(i + 1);
        let prev2 = window.get(i + 2);

        for (name, category, bias, strength) in detect_at(current, prev, prev2) {
            found.push(PatternMatch {
                name: name.to_string(),
                category: category.to_string(),
                bias,
                strength,
                index: i,
                timestamp: current.timestamp,
                price: current.close,
            });
        }
    }
    found
}

/// Shapes detectable at one position given up to two older candles.
fn detect_at(
    current: &Candle,
    prev: Option<&Candle>,
    prev2: Option<&Candle>,
) -> Vec<(&'static str, &'static str, SignalBias, f64)> {
    let mut detected = Vec::new();

    let body = current.body();
    let range = current.range();
    let upper_shadow = current.high - current.open.max(current.close);
    let lower_shadow = current.open.min(current.close) - current.low;

    if let Some(prev) = prev {
        // Two-candle reversals: the current body engulfs the previous one.
        if prev.is_bearish()
            && current.is_bullish()
            && current.close > prev.open
            && current.open < prev.close
        {
            detected.push(("Bullish Engulfing", "reversal", SignalBias::Call, 0.9));
        }
        if prev.is_bullish()
            && current.is_bearish()
            && current.close < prev.open
            && current.open > prev.close
        {
            detected.push(("Bearish Engulfing", "reversal", SignalBias::Put, 0.9));
        }

        if let Some(prev2) = prev2 {
            // Three-candle stars: wide body, pause, reversal past the midpoint.
            let prev2_mid = (prev2.open + prev2.close) / 2.0;
            let small_pause = prev.body() < prev2.body() * 0.5;

            if prev2.is_bearish() && small_pause && current.is_bullish() && current.close > prev2_mid
            {
                detected.push(("Morning Star", "reversal", SignalBias::Call, 0.85));
            }
            if prev2.is_bullish() && small_pause && current.is_bearish() && current.close < prev2_mid
            {
                detected.push(("Evening Star", "reversal", SignalBias::Put, 0.85));
            }
        }
    }

    // Single-candle shapes.
    if body > 0.0 && lower_shadow >= 2.0 * body && upper_shadow <= body {
        detected.push(("Hammer", "reversal", SignalBias::Call, 0.7));
    }
    if body > 0.0 && upper_shadow >= 2.0 * body && lower_shadow <= body {
        detected.push(("Shooting Star", "reversal", SignalBias::Put, 0.7));
    }
    if range > 1e-4 && body < 0.1 * range {
        detected.push(("Doji", "indecision", SignalBias::Neutral, 0.5));
    }

    detected
}

/// Short-term trend, from where the latest close sits against the mean of
/// recent closes (±0.05% band).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    #[default]
    Neutral,
}

pub fn trend(window: &CandleWindow, period: usize) -> Trend {
    if window.len() < period {
        return Trend::Neutral;
    }

    let closes: Vec<f64> = window.iter().take(period).map(|c| c.close).collect();
    let avg = closes.iter().sum::<f64>() / closes.len() as f64;
    let current = closes[0];

    let diff_pct = (current - avg) / avg * 100.0;
    if diff_pct > 0.05 {
        Trend::Up
    } else if diff_pct < -0.05 {
        Trend::Down
    } else {
        Trend::Neutral
    }
}
