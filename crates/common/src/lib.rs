pub mod config;
pub mod error;
pub mod types;
pub mod venue;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
pub use venue::VenueClient;
