/// All configuration loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    /// Venue session id. When absent the bot runs against the simulated
    /// venue regardless of any other setting.
    pub session_id: Option<String>,
    /// Demo account flag, forwarded to the live venue.
    pub demo: bool,

    // Dashboard
    pub dashboard_token: String,
    pub dashboard_port: u16,

    // Database
    pub database_url: String,

    // Trading defaults
    pub default_asset: String,
    pub default_timeframe_secs: u32,
    pub min_confidence: f64,
    /// Fraction of the stake paid out on a winning option.
    pub payout_ratio: f64,

    // Analysis tuning file path
    pub analysis_config_path: String,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any malformed value.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let session_id = optional_env("POCKET_OPTION_SSID").filter(|s| !s.is_empty());

        // Without a session id there is no live account to protect, so demo
        // is forced on.
        let demo = if session_id.is_some() {
            optional_env("BOT_DEMO")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(true)
        } else {
            true
        };

        Config {
            session_id,
            demo,
            dashboard_token: required_env("DASHBOARD_TOKEN"),
            dashboard_port: optional_env("DASHBOARD_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            database_url: optional_env("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://optibot.db?mode=rwc".to_string()),
            default_asset: optional_env("DEFAULT_ASSET")
                .unwrap_or_else(|| "EURUSD_otc".to_string()),
            default_timeframe_secs: optional_env("DEFAULT_TIMEFRAME_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            min_confidence: optional_env("MIN_CONFIDENCE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.75),
            payout_ratio: optional_env("PAYOUT_RATIO")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.85),
            analysis_config_path: optional_env("ANALYSIS_CONFIG_PATH")
                .unwrap_or_else(|| "config/analysis.toml".to_string()),
        }
    }
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
