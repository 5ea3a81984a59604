use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{info, warn};

use common::{Candle, VenueClient};

/// Candle subscription task for a single asset.
///
/// Drives `VenueClient::stream_candles` and re-subscribes with exponential
/// backoff on venue errors. The task ends when the consumer drops the
/// receiver or when the orchestrator aborts it; both are normal shutdown
/// paths for an active subscription.
pub struct CandleStream {
    venue: Arc<dyn VenueClient>,
    asset: String,
    timeframe_secs: u32,
    candle_tx: mpsc::Sender<Candle>,
}

impl CandleStream {
    pub fn new(
        venue: Arc<dyn VenueClient>,
        asset: impl Into<String>,
        timeframe_secs: u32,
        candle_tx: mpsc::Sender<Candle>,
    ) -> Self {
        Self {
            venue,
            asset: asset.into(),
            timeframe_secs,
            candle_tx,
        }
    }

    /// Run the subscription loop. Call this inside a `tokio::spawn`.
    pub async fn run(self) {
        let mut backoff = Duration::from_secs(1);
        const MAX_BACKOFF: Duration = Duration::from_secs(60);

        loop {
            info!(asset = %self.asset, timeframe = self.timeframe_secs, "Subscribing to candle stream");
            match self
                .venue
                .stream_candles(&self.asset, self.timeframe_secs, self.candle_tx.clone())
                .await
            {
                Ok(()) => {
                    if self.candle_tx.is_closed() {
                        info!(asset = %self.asset, "Candle consumer gone, subscription ended");
                        return;
                    }
                    // Clean end (venue disconnected); retry shortly.
                    tokio::time::sleep(Duration::from_secs(1)).await;
                    backoff = Duration::from_secs(1);
                }
                Err(e) => {
                    warn!(asset = %self.asset, error = %e, backoff = ?backoff, "Candle stream error, re-subscribing");
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimVenue;

    #[tokio::test]
    async fn stream_delivers_candles_from_the_venue() {
        let venue = Arc::new(SimVenue::new(true));
        venue.connect().await.unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        let stream = CandleStream::new(venue.clone(), "GBPUSD_otc", 3600, tx);
        let handle = tokio::spawn(stream.run());

        let candle = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timeout")
            .expect("channel closed");
        assert_eq!(candle.asset, "GBPUSD_otc");
        assert_eq!(candle.timeframe_secs, 3600);

        handle.abort();
    }

    #[tokio::test]
    async fn stream_ends_when_receiver_dropped() {
        let venue = Arc::new(SimVenue::new(true));
        venue.connect().await.unwrap();

        let (tx, rx) = mpsc::channel(8);
        drop(rx);

        let stream = CandleStream::new(venue, "EURUSD_otc", 3600, tx);
        tokio::time::timeout(Duration::from_secs(1), stream.run())
            .await
            .expect("stream should end once the consumer is gone");
    }
}
