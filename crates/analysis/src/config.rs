use serde::{Deserialize, Serialize};
use tracing::info;

/// Analysis tuning knobs, loadable from TOML.
///
/// Example `config/analysis.toml`:
/// ```toml
/// pattern_lookback = 10
/// level_sensitivity = 3
/// level_tolerance = 0.0005
/// level_count = 3
/// trend_period = 50
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// How many recent window positions the pattern scan covers.
    #[serde(default = "default_lookback")]
    pub pattern_lookback: usize,
    /// Neighbors on each side a swing extremum must dominate.
    #[serde(default = "default_sensitivity")]
    pub level_sensitivity: usize,
    /// Cluster merge band as a fraction of the current price.
    #[serde(default = "default_tolerance")]
    pub level_tolerance: f64,
    /// Nearest level zones returned per side.
    #[serde(default = "default_count")]
    pub level_count: usize,
    /// Closes averaged for the trend read.
    #[serde(default = "default_trend_period")]
    pub trend_period: usize,
}

fn default_lookback() -> usize {
    10
}
fn default_sensitivity() -> usize {
    3
}
fn default_tolerance() -> f64 {
    0.0005
}
fn default_count() -> usize {
    3
}
fn default_trend_period() -> usize {
    50
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            pattern_lookback: default_lookback(),
            level_sensitivity: default_sensitivity(),
            level_tolerance: default_tolerance(),
            level_count: default_count(),
            trend_period: default_trend_period(),
        }
    }
}

impl AnalysisConfig {
    /// Load from a TOML file. A missing file means defaults; a file that
    /// exists but does not parse is a startup error worth dying for.
    pub fn load(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)
                .unwrap_or_else(|e| panic!("Failed to parse analysis config at '{path}': {e}")),
            Err(_) => {
                info!(%path, "No analysis config file, using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = AnalysisConfig::default();
        assert_eq!(cfg.pattern_lookback, 10);
        assert_eq!(cfg.level_sensitivity, 3);
        assert!((cfg.level_tolerance - 0.0005).abs() < 1e-12);
        assert_eq!(cfg.level_count, 3);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: AnalysisConfig = toml::from_str("level_count = 5").unwrap();
        assert_eq!(cfg.level_count, 5);
        assert_eq!(cfg.pattern_lookback, 10);
    }
}
