pub mod pocket;
pub mod sim;
pub mod stream;

pub use pocket::PocketVenue;
pub use sim::SimVenue;
pub use stream::CandleStream;
