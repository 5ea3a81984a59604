use std::collections::VecDeque;

use common::Candle;

/// Bounded rolling window of candles for one asset, newest first.
///
/// The newest-first ordering is the invariant every analysis function
/// relies on: index 0 is the most recent candle. On overflow the oldest
/// entry is evicted.
#[derive(Debug, Clone)]
pub struct CandleWindow {
    candles: VecDeque<Candle>,
    capacity: usize,
}

impl CandleWindow {
    pub const DEFAULT_CAPACITY: usize = 200;

    pub fn new(capacity: usize) -> Self {
        Self {
            candles: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert the latest candle, evicting the oldest when full.
    pub fn push(&mut self, candle: Candle) {
        self.candles.push_front(candle);
        self.candles.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Candle at position `i`, newest first.
    pub fn get(&self, i: usize) -> Option<&Candle> {
        self.candles.get(i)
    }

    pub fn newest(&self) -> Option<&Candle> {
        self.candles.front()
    }

    /// Iterate newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Candle> {
        self.candles.iter()
    }

    /// The `n` most recent candles, newest first (for charting payloads).
    pub fn recent(&self, n: usize) -> Vec<Candle> {
        self.candles.iter().take(n).cloned().collect()
    }

    /// Close prices in chronological order, as indicator math expects.
    pub fn closes_oldest_first(&self) -> Vec<f64> {
        self.candles.iter().rev().map(|c| c.close).collect()
    }

    pub fn highs_oldest_first(&self) -> Vec<f64> {
        self.candles.iter().rev().map(|c| c.high).collect()
    }

    pub fn lows_oldest_first(&self) -> Vec<f64> {
        self.candles.iter().rev().map(|c| c.low).collect()
    }
}

impl Default for CandleWindow {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
