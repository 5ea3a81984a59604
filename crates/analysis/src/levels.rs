use serde::{Deserialize, Serialize};

use crate::window::CandleWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelKind {
    Support,
    Resistance,
}

/// A merged price zone built from nearby swing extrema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelCluster {
    pub price: f64,
    pub kind: LevelKind,
    /// How many extrema merged into this zone.
    pub touches: usize,
    /// min(1, touches / sensitivity).
    pub strength: f64,
    /// Absolute distance from the current price.
    pub distance: f64,
}

/// Nearest support and resistance zones, each sorted by distance ascending.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Levels {
    pub support: Vec<LevelCluster>,
    pub resistance: Vec<LevelCluster>,
}

#[derive(Debug, Clone, Copy)]
struct SwingPoint {
    price: f64,
    kind: LevelKind,
}

/// Find the `count` nearest support levels strictly below the current price
/// and resistance levels strictly above it.
///
/// A swing high/low is a candle whose high/low dominates `sensitivity`
/// neighbors on each side. Swing points whose prices differ by less than
/// `tolerance * current_price` merge into one cluster; the cluster takes
/// its kind from the member majority.
pub fn find_levels(
    window: &CandleWindow,
    sensitivity: usize,
    tolerance: f64,
    count: usize,
) -> Levels {
    if window.len() < sensitivity * 2 {
        return Levels::default();
    }

    let highs: Vec<f64> = window.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = window.iter().map(|c| c.low).collect();
    let current_price = match window.newest() {
        Some(c) => c.close,
        None => return Levels::default(),
    };

    // Swing point scan.
    let mut points: Vec<SwingPoint> = Vec::new();
    for i in sensitivity..window.len() - sensitivity {
        let is_resistance =
            (1..=sensitivity).all(|j| highs[i] >= highs[i - j] && highs[i] >= highs[i + j]);
        if is_resistance {
            points.push(SwingPoint {
                price: highs[i],
                kind: LevelKind::Resistance,
            });
        }

        let is_support = (1..=sensitivity).all(|j| lows[i] <= lows[i - j] && lows[i] <= lows[i + j]);
        if is_support {
            points.push(SwingPoint {
                price: lows[i],
                kind: LevelKind::Support,
            });
        }
    }

    // Merge nearby points, walking in price order.
    points.sort_by(|a, b| a.price.total_cmp(&b.price));
    let merge_band = tolerance * current_price;

    let mut clusters: Vec<LevelCluster> = Vec::new();
    let mut cluster: Vec<SwingPoint> = Vec::new();

    for point in points {
        let joins = cluster
            .last()
            .map(|last| (point.price - last.price).abs() < merge_band)
            .unwrap_or(true);
        if joins {
            cluster.push(point);
        } else {
            clusters.push(finalize(&cluster, sensitivity, current_price));
            cluster = vec![point];
        }
    }
    if !cluster.is_empty() {
        clusters.push(finalize(&cluster, sensitivity, current_price));
    }

    // Keep the nearest zones on the correct side of the current price.
    let mut support: Vec<LevelCluster> = clusters
        .iter()
        .filter(|c| c.kind == LevelKind::Support && c.price < current_price)
        .cloned()
        .collect();
    let mut resistance: Vec<LevelCluster> = clusters
        .into_iter()
        .filter(|c| c.kind == LevelKind::Resistance && c.price > current_price)
        .collect();

    support.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    resistance.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    support.truncate(count);
    resistance.truncate(count);

    Levels {
        support,
        resistance,
    }
}

fn finalize(members: &[SwingPoint], sensitivity: usize, current_price: f64) -> LevelCluster {
    let price = members.iter().map(|p| p.price).sum::<f64>() / members.len() as f64;
    let supports = members
        .iter()
        .filter(|p| p.kind == LevelKind::Support)
        .count();
    let kind = if supports * 2 >= members.len() {
        LevelKind::Support
    } else {
        LevelKind::Resistance
    };

    LevelCluster {
        price,
        kind,
        touches: members.len(),
        strength: (members.len() as f64 / sensitivity as f64).min(1.0),
        distance: (price - current_price).abs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::Candle;

    fn candle(high: f64, low: f64, close: f64) -> Candle {
        Candle {
            asset: "EURUSD_otc".into(),
            timeframe_secs: 60,
            timestamp: Utc::now(),
            open: close,
            high,
            low,
            close,
            volume: 100.0,
        }
    }

    /// Window with two price valleys touching `level` and a final close at
    /// `close`. Pushes oldest first so the last candle is index 0.
    fn window_with_valleys(level_a: f64, level_b: f64, close: f64) -> CandleWindow {
        let mut window = CandleWindow::new(200);
        let base = close;
        let shape = [
            base,
            base + 0.0010,
            base + 0.0020,
            level_a, // valley 1
            base + 0.0020,
            base + 0.0015,
            base + 0.0025,
            level_b, // valley 2
            base + 0.0025,
            base + 0.0015,
            base,
        ];
        for &p in &shape {
            window.push(candle(p + 0.0002, p - 0.0002, p));
        }
        window
    }

    #[test]
    fn short_window_returns_no_levels() {
        let mut window = CandleWindow::new(200);
        for _ in 0..5 {
            window.push(candle(1.1202, 1.1198, 1.12));
        }
        let levels = find_levels(&window, 3, 0.0005, 3);
        assert!(levels.support.is_empty());
        assert!(levels.resistance.is_empty());
    }

    #[test]
    fn extrema_within_tolerance_merge_into_one_cluster() {
        // Two valleys 0.0001 apart: inside 0.0005 * ~1.12 ≈ 0.00056
        let window = window_with_valleys(1.1100, 1.1101, 1.1200);
        let levels = find_levels(&window, 2, 0.0005, 3);

        assert_eq!(levels.support.len(), 1, "valleys should merge: {levels:?}");
        assert_eq!(levels.support[0].touches, 2);
    }

    #[test]
    fn extrema_beyond_tolerance_stay_apart() {
        // Valleys 0.0030 apart: well beyond the merge band
        let window = window_with_valleys(1.1100, 1.1130, 1.1200);
        let levels = find_levels(&window, 2, 0.0005, 3);

        assert_eq!(levels.support.len(), 2, "valleys must not merge: {levels:?}");
    }

    #[test]
    fn supports_sorted_by_distance_and_below_price() {
        let window = window_with_valleys(1.1100, 1.1130, 1.1200);
        let levels = find_levels(&window, 2, 0.0005, 3);

        assert!(levels.support.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert!(levels.support.iter().all(|l| l.price < 1.1200));
    }

    #[test]
    fn strength_caps_at_one() {
        let window = window_with_valleys(1.1100, 1.1101, 1.1200);
        let levels = find_levels(&window, 1, 0.0005, 3);
        assert!(levels.support.iter().all(|l| l.strength <= 1.0));
    }
}
