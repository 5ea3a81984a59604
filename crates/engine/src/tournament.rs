use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{info, warn};

use common::{Tournament, VenueClient};

/// Best-effort automated entry into the venue's free tournaments.
///
/// The periodic loop wakes hourly, but an internal last-attempt timestamp
/// spaces real attempts at least `ATTEMPT_SPACING` apart, so wake-interval
/// drift cannot cause attempt bursts.
pub struct TournamentScout {
    venue: Arc<dyn VenueClient>,
    last_attempt: Mutex<Option<Instant>>,
    attempt_spacing: Duration,
}

impl TournamentScout {
    /// Minimum time between automated join attempts.
    pub const ATTEMPT_SPACING: Duration = Duration::from_secs(4 * 60 * 60);
    /// How often the loop wakes to consider an attempt.
    pub const WAKE_INTERVAL: Duration = Duration::from_secs(60 * 60);
    /// Grace period after startup before the first attempt.
    const STARTUP_DELAY: Duration = Duration::from_secs(30);

    pub fn new(venue: Arc<dyn VenueClient>) -> Self {
        Self {
            venue,
            last_attempt: Mutex::new(None),
            attempt_spacing: Self::ATTEMPT_SPACING,
        }
    }

    /// Override the attempt spacing (used by tests).
    pub fn with_attempt_spacing(mut self, spacing: Duration) -> Self {
        self.attempt_spacing = spacing;
        self
    }

    /// Zero-entry-fee tournaments currently open. Venue errors come back
    /// as an empty list; this is a best-effort feature.
    pub async fn free_tournaments(&self) -> Vec<Tournament> {
        match self.venue.tournaments().await {
            Ok(all) => {
                let free: Vec<Tournament> = all
                    .into_iter()
                    .filter(Tournament::is_free_and_open)
                    .collect();
                info!(count = free.len(), "Active free tournaments found");
                free
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch tournaments");
                Vec::new()
            }
        }
    }

    /// Join one tournament by id. Never errors out of the caller's turn.
    pub async fn join_by_id(&self, id: &str) -> bool {
        if !self.venue.is_connected() {
            warn!(tournament_id = %id, "Not connected, cannot join tournament");
            return false;
        }

        match self.venue.join_tournament(id).await {
            Ok(true) => {
                info!(tournament_id = %id, "Joined tournament");
                true
            }
            Ok(false) => {
                warn!(tournament_id = %id, "Tournament join refused (already joined or closed)");
                false
            }
            Err(e) => {
                warn!(tournament_id = %id, error = %e, "Tournament join failed");
                false
            }
        }
    }

    /// Attempt the daily free tournament, honoring the attempt spacing.
    /// Returns the joined tournament id, if any.
    pub async fn join_daily_free(&self) -> Option<String> {
        {
            let mut last = self.last_attempt.lock().await;
            if let Some(at) = *last {
                if at.elapsed() < self.attempt_spacing {
                    return None;
                }
            }
            *last = Some(Instant::now());
        }

        info!("Attempting automated join for the daily free tournament");
        let daily = self
            .free_tournaments()
            .await
            .into_iter()
            .find(|t| t.name.to_lowercase().contains("daily free tournament"))?;

        if self.join_by_id(&daily.id).await {
            Some(daily.id)
        } else {
            None
        }
    }

    /// Periodic loop. Re-arms on every wake no matter what happened;
    /// cancellation (abort) is the only way out.
    pub async fn run(self: Arc<Self>) {
        tokio::time::sleep(Self::STARTUP_DELAY).await;
        loop {
            self.join_daily_free().await;
            tokio::time::sleep(Self::WAKE_INTERVAL).await;
        }
    }
}
