pub mod config;
pub mod indicators;
pub mod levels;
pub mod patterns;
pub mod window;

pub use config::AnalysisConfig;
pub use indicators::IndicatorSet;
pub use levels::{LevelCluster, LevelKind, Levels};
pub use patterns::{PatternMatch, SignalBias, Trend};
pub use window::CandleWindow;

use serde::{Deserialize, Serialize};

/// Everything the decision engine reads about the current market.
/// Recomputed wholesale on every candle; never partially updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub patterns: Vec<PatternMatch>,
    pub levels: Levels,
    pub indicators: IndicatorSet,
    pub trend: Trend,
}

/// Run the full analysis stage over one candle window.
pub fn analyze(window: &CandleWindow, cfg: &AnalysisConfig) -> AnalysisSnapshot {
    AnalysisSnapshot {
        patterns: patterns::detect_patterns(window, cfg.pattern_lookback),
        levels: levels::find_levels(
            window,
            cfg.level_sensitivity,
            cfg.level_tolerance,
            cfg.level_count,
        ),
        indicators: indicators::calculate_all(window),
        trend: patterns::trend(window, cfg.trend_period),
    }
}
