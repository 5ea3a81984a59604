pub mod lifecycle;
pub mod tournament;
pub mod trades;

pub use lifecycle::{Bot, BotHandle, BotStatus, MarketAnalysis};
pub use tournament::TournamentScout;
pub use trades::{TradeLifecycle, TradeStats};
