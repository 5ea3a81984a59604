use serde::{Deserialize, Serialize};

use crate::window::CandleWindow;

/// Fewest candles the indicator set needs; below this every field is `None`.
pub const MIN_CANDLES: usize = 20;

/// The fixed named indicator set computed on every candle.
/// Absence is an explicit `None`, never a missing key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub sma_10: Option<f64>,
    pub sma_20: Option<f64>,
    pub ema_10: Option<f64>,
    pub ema_20: Option<f64>,
    pub rsi: Option<RsiReading>,
    pub macd: Option<MacdReading>,
    pub bollinger: Option<BollingerReading>,
    pub stochastic: Option<StochasticReading>,
    pub atr: Option<AtrReading>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsiReading {
    pub value: f64,
    pub zone: RsiZone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MacdTrend {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacdReading {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
    pub trend: MacdTrend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandPosition {
    Above,
    Mid,
    Below,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BollingerReading {
    pub upper: f64,
    pub mid: f64,
    pub lower: f64,
    pub position: BandPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StochZone {
    Overbought,
    Oversold,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StochasticReading {
    pub k: f64,
    pub d: f64,
    pub zone: StochZone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityGrade {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtrReading {
    pub value: f64,
    pub volatility: VolatilityGrade,
}

/// Compute the whole set over one window. Individual indicators whose
/// required history exceeds the window stay `None`.
pub fn calculate_all(window: &CandleWindow) -> IndicatorSet {
    if window.len() < MIN_CANDLES {
        return IndicatorSet::default();
    }

    let closes = window.closes_oldest_first();
    let highs = window.highs_oldest_first();
    let lows = window.lows_oldest_first();

    IndicatorSet {
        sma_10: sma(&closes, 10),
        sma_20: sma(&closes, 20),
        ema_10: ema(&closes, 10),
        ema_20: ema(&closes, 20),
        rsi: rsi(&closes, 14),
        macd: macd(&closes, 12, 26, 9),
        bollinger: bollinger(&closes, 20, 2.0),
        stochastic: stochastic(&highs, &lows, &closes, 14, 3),
        atr: atr(&highs, &lows, &closes, 14),
    }
}

/// Simple moving average of the last `period` values.
pub fn sma(closes: &[f64], period: usize) -> Option<f64> {
    if closes.len() < period || period == 0 {
        return None;
    }
    Some(closes[closes.len() - period..].iter().sum::<f64>() / period as f64)
}

/// Exponential moving average, seeded with the SMA of the first `period`
/// values and folded over the rest.
pub fn ema(closes: &[f64], period: usize) -> Option<f64> {
    if closes.len() < period || period == 0 {
        return None;
    }
    let k = 2.0 / (period as f64 + 1.0);
    let mut value = closes[..period].iter().sum::<f64>() / period as f64;
    for &price in &closes[period..] {
        value = price * k + value * (1.0 - k);
    }
    Some(value)
}

/// RSI with Wilder's smoothed moving average.
/// Needs at least `period + 1` closes.
pub fn rsi(closes: &[f64], period: usize) -> Option<RsiReading> {
    if closes.len() < period + 1 || period < 2 {
        return None;
    }

    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let initial = &changes[..period];

    let mut avg_gain = initial.iter().filter(|&&c| c > 0.0).sum::<f64>() / period as f64;
    let mut avg_loss =
        initial.iter().filter(|&&c| c < 0.0).map(|c| c.abs()).sum::<f64>() / period as f64;

    for &change in &changes[period..] {
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { change.abs() } else { 0.0 };
        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
    }

    let value = if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    let zone = if value > 70.0 {
        RsiZone::Overbought
    } else if value < 30.0 {
        RsiZone::Oversold
    } else {
        RsiZone::Neutral
    };

    Some(RsiReading { value, zone })
}

/// MACD line, signal line and histogram. Needs `slow + signal` closes.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Option<MacdReading> {
    if closes.len() < slow + signal || fast >= slow {
        return None;
    }

    // MACD line for enough trailing bars to smooth a signal line over.
    let series_len = signal + 1;
    let start = closes.len().saturating_sub(slow + series_len - 1);
    let tail = &closes[start..];

    let macd_line: Vec<f64> = (slow - 1..tail.len())
        .map(|i| {
            let slice = &tail[..=i];
            ema_full(slice, fast) - ema_full(slice, slow)
        })
        .collect();

    if macd_line.len() < signal {
        return None;
    }

    let line = *macd_line.last()?;
    let signal_value = ema_full(&macd_line, signal);
    let histogram = line - signal_value;

    let trend = if histogram > 0.0 {
        MacdTrend::Bullish
    } else if histogram < 0.0 {
        MacdTrend::Bearish
    } else {
        MacdTrend::Neutral
    };

    Some(MacdReading {
        line,
        signal: signal_value,
        histogram,
        trend,
    })
}

/// EMA over all of `data`, seeded with the SMA of the first `period` values.
/// Tolerates short slices; used internally where the caller has already
/// checked history length.
fn ema_full(data: &[f64], period: usize) -> f64 {
    if data.is_empty() || period == 0 {
        return 0.0;
    }
    let k = 2.0 / (period as f64 + 1.0);
    let seed_len = period.min(data.len());
    let mut value = data[..seed_len].iter().sum::<f64>() / seed_len as f64;
    for &price in &data[seed_len..] {
        value = price * k + value * (1.0 - k);
    }
    value
}

/// Bollinger bands: SMA mid, `width` standard deviations on each side.
pub fn bollinger(closes: &[f64], period: usize, width: f64) -> Option<BollingerReading> {
    if closes.len() < period || period == 0 {
        return None;
    }

    let tail = &closes[closes.len() - period..];
    let mid = tail.iter().sum::<f64>() / period as f64;
    let variance = tail.iter().map(|c| (c - mid).powi(2)).sum::<f64>() / period as f64;
    let sd = variance.sqrt();

    let upper = mid + width * sd;
    let lower = mid - width * sd;
    let last = *closes.last()?;

    let position = if last > upper {
        BandPosition::Above
    } else if last < lower {
        BandPosition::Below
    } else {
        BandPosition::Mid
    };

    Some(BollingerReading {
        upper,
        mid,
        lower,
        position,
    })
}

/// Stochastic oscillator: %K over `k_period`, %D as an SMA of the last
/// `d_period` %K values.
pub fn stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    k_period: usize,
    d_period: usize,
) -> Option<StochasticReading> {
    let n = closes.len();
    if n < k_period + d_period - 1 || k_period == 0 || d_period == 0 {
        return None;
    }

    let k_at = |end: usize| -> f64 {
        let lo = *lows[end - k_period..end]
            .iter()
            .min_by(|a, b| a.total_cmp(b))
            .unwrap_or(&0.0);
        let hi = *highs[end - k_period..end]
            .iter()
            .max_by(|a, b| a.total_cmp(b))
            .unwrap_or(&0.0);
        if hi - lo <= f64::EPSILON {
            return 50.0;
        }
        (closes[end - 1] - lo) / (hi - lo) * 100.0
    };

    let k_series: Vec<f64> = (0..d_period).map(|i| k_at(n - d_period + 1 + i)).collect();
    let k = *k_series.last()?;
    let d = k_series.iter().sum::<f64>() / d_period as f64;

    let zone = if k > 80.0 {
        StochZone::Overbought
    } else if k < 20.0 {
        StochZone::Oversold
    } else {
        StochZone::Neutral
    };

    Some(StochasticReading { k, d, zone })
}

/// Average True Range with Wilder smoothing. Needs `period + 1` candles.
pub fn atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Option<AtrReading> {
    let n = closes.len();
    if n < period + 1 || period == 0 {
        return None;
    }

    let true_ranges: Vec<f64> = (1..n)
        .map(|i| {
            let hl = highs[i] - lows[i];
            let hc = (highs[i] - closes[i - 1]).abs();
            let lc = (lows[i] - closes[i - 1]).abs();
            hl.max(hc).max(lc)
        })
        .collect();

    let mut value = true_ranges[..period].iter().sum::<f64>() / period as f64;
    for &tr in &true_ranges[period..] {
        value = (value * (period as f64 - 1.0) + tr) / period as f64;
    }

    let volatility = if value > 0.002 {
        VolatilityGrade::High
    } else if value > 0.001 {
        VolatilityGrade::Medium
    } else {
        VolatilityGrade::Low
    };

    Some(AtrReading { value, volatility })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::Candle;

    fn window_of(closes: &[f64]) -> CandleWindow {
        let mut window = CandleWindow::new(200);
        for &c in closes {
            window.push(Candle {
                asset: "EURUSD_otc".into(),
                timeframe_secs: 60,
                timestamp: Utc::now(),
                open: c,
                high: c + 0.0005,
                low: c - 0.0005,
                close: c,
                volume: 100.0,
            });
        }
        window
    }

    #[test]
    fn short_window_yields_all_none() {
        let closes: Vec<f64> = (0..10).map(|i| 1.12 + i as f64 * 0.0001).collect();
        let set = calculate_all(&window_of(&closes));
        assert!(set.sma_10.is_none());
        assert!(set.rsi.is_none());
        assert!(set.macd.is_none());
        assert!(set.bollinger.is_none());
        assert!(set.stochastic.is_none());
        assert!(set.atr.is_none());
    }

    #[test]
    fn full_window_fills_everything_but_macd_needs_more() {
        // 20 candles: enough for everything except MACD (needs 35).
        let closes: Vec<f64> = (0..20).map(|i| 1.12 + i as f64 * 0.0001).collect();
        let set = calculate_all(&window_of(&closes));
        assert!(set.sma_10.is_some());
        assert!(set.sma_20.is_some());
        assert!(set.ema_20.is_some());
        assert!(set.rsi.is_some());
        assert!(set.macd.is_none());
        assert!(set.bollinger.is_some());
        assert!(set.stochastic.is_some());
        assert!(set.atr.is_some());
    }

    #[test]
    fn sma_is_the_mean_of_the_tail() {
        let closes = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(sma(&closes, 2), Some(3.5));
        assert!(sma(&closes, 5).is_none());
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let closes: Vec<f64> = (0..16).map(|i| 100.0 + i as f64).collect();
        let reading = rsi(&closes, 14).unwrap();
        assert!((reading.value - 100.0).abs() < 1e-6);
        assert_eq!(reading.zone, RsiZone::Overbought);
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let closes: Vec<f64> = (0..16).map(|i| 100.0 - i as f64).collect();
        let reading = rsi(&closes, 14).unwrap();
        assert!(reading.value.abs() < 1e-6);
        assert_eq!(reading.zone, RsiZone::Oversold);
    }

    #[test]
    fn macd_bullish_on_strong_uptrend() {
        let mut closes: Vec<f64> = (0..30).map(|i| 100.0 - i as f64 * 0.2).collect();
        closes.extend((0..30).map(|i| 94.0 + i as f64 * 1.5));
        let reading = macd(&closes, 12, 26, 9).unwrap();
        assert_eq!(reading.trend, MacdTrend::Bullish);
        assert!(reading.histogram > 0.0);
    }

    #[test]
    fn bollinger_brackets_the_mean() {
        let closes: Vec<f64> = (0..20).map(|i| 1.12 + (i % 5) as f64 * 0.001).collect();
        let bands = bollinger(&closes, 20, 2.0).unwrap();
        assert!(bands.lower < bands.mid && bands.mid < bands.upper);
    }

    #[test]
    fn stochastic_high_when_close_at_top_of_range() {
        let mut closes: Vec<f64> = vec![1.0; 16];
        closes.push(2.0); // close at the very top of the range
        let highs: Vec<f64> = closes.iter().map(|c| c + 0.0).collect();
        let lows = vec![1.0; 17];
        let reading = stochastic(&highs, &lows, &closes, 14, 3).unwrap();
        assert!(reading.k > 80.0);
        assert_eq!(reading.zone, StochZone::Overbought);
    }

    #[test]
    fn atr_grades_quiet_markets_low() {
        let closes: Vec<f64> = vec![1.12; 20];
        let highs: Vec<f64> = closes.iter().map(|c| c + 0.0002).collect();
        let lows: Vec<f64> = closes.iter().map(|c| c - 0.0002).collect();
        let reading = atr(&highs, &lows, &closes, 14).unwrap();
        assert_eq!(reading.volatility, VolatilityGrade::Low);
        assert!((reading.value - 0.0004).abs() < 1e-9);
    }
}
