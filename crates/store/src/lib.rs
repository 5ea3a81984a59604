use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::info;

use common::{Direction, Error, Result, Trade, TradeOutcome, TradeStatus};

/// Durable record of trades, one row per venue-issued trade id.
///
/// The schema is created at startup; runtime-bound queries keep the crate
/// buildable without a prepared database.
#[derive(Clone)]
pub struct TradeStore {
    pool: SqlitePool,
}

impl TradeStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url).await?;
        let store = Self { pool };
        store.init().await?;
        info!("Trade store ready");
        Ok(store)
    }

    /// Single-connection in-memory store; the connection is pinned so the
    /// database survives for the store's lifetime. Used by tests and demos.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trades (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                trade_id TEXT UNIQUE NOT NULL,
                asset TEXT NOT NULL,
                amount REAL NOT NULL,
                direction TEXT NOT NULL,
                expiration INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                outcome TEXT,
                profit REAL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Persist a newly accepted trade. Replays of the same trade id are
    /// ignored, matching the exactly-once lifecycle.
    pub async fn save_trade(&self, trade: &Trade) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO trades (trade_id, asset, amount, direction, expiration, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(trade_id) DO NOTHING
            "#,
        )
        .bind(&trade.trade_id)
        .bind(&trade.asset)
        .bind(trade.amount)
        .bind(trade.direction.to_string())
        .bind(trade.expiration_secs as i64)
        .bind(status_str(trade.status))
        .bind(trade.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Record the settlement of a pending trade.
    pub async fn update_outcome(
        &self,
        trade_id: &str,
        outcome: TradeOutcome,
        profit: f64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE trades SET status = 'settled', outcome = ?1, profit = ?2
            WHERE trade_id = ?3
            "#,
        )
        .bind(outcome.to_string())
        .bind(profit)
        .bind(trade_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// The most recent trades, newest first.
    pub async fn recent_trades(&self, limit: i64) -> Result<Vec<Trade>> {
        let rows = sqlx::query(
            r#"
            SELECT trade_id, asset, amount, direction, expiration, status, outcome, profit, created_at
            FROM trades ORDER BY created_at DESC, id DESC LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_trade).collect()
    }
}

fn status_str(status: TradeStatus) -> &'static str {
    match status {
        TradeStatus::Pending => "pending",
        TradeStatus::Settled => "settled",
    }
}

fn row_to_trade(row: SqliteRow) -> Result<Trade> {
    let direction: String = row.try_get("direction")?;
    let direction = match direction.as_str() {
        "CALL" => Direction::Call,
        "PUT" => Direction::Put,
        other => return Err(Error::Other(format!("unknown direction '{other}' in store"))),
    };

    let status: String = row.try_get("status")?;
    let status = match status.as_str() {
        "pending" => TradeStatus::Pending,
        "settled" => TradeStatus::Settled,
        other => return Err(Error::Other(format!("unknown status '{other}' in store"))),
    };

    let outcome: Option<String> = row.try_get("outcome")?;
    let outcome = match outcome.as_deref() {
        Some("win") => Some(TradeOutcome::Win),
        Some("loss") => Some(TradeOutcome::Loss),
        None => None,
        Some(other) => return Err(Error::Other(format!("unknown outcome '{other}' in store"))),
    };

    let created_at: String = row.try_get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| Error::Other(format!("bad created_at in store: {e}")))?
        .with_timezone(&Utc);

    let expiration: i64 = row.try_get("expiration")?;

    Ok(Trade {
        trade_id: row.try_get("trade_id")?,
        asset: row.try_get("asset")?,
        amount: row.try_get("amount")?,
        direction,
        expiration_secs: expiration as u32,
        created_at,
        status,
        outcome,
        profit: row.try_get("profit")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(id: &str) -> Trade {
        Trade::pending(id, "EURUSD_otc", 200.0, Direction::Call, 60)
    }

    #[tokio::test]
    async fn save_then_fetch_round_trips() {
        let store = TradeStore::in_memory().await.unwrap();
        store.save_trade(&trade("t-1")).await.unwrap();

        let recent = store.recent_trades(1).await.unwrap();
        assert_eq!(recent.len(), 1);
        let got = &recent[0];
        assert_eq!(got.trade_id, "t-1");
        assert_eq!(got.asset, "EURUSD_otc");
        assert_eq!(got.amount, 200.0);
        assert_eq!(got.direction, Direction::Call);
        assert_eq!(got.status, TradeStatus::Pending);
    }

    #[tokio::test]
    async fn duplicate_trade_ids_are_ignored() {
        let store = TradeStore::in_memory().await.unwrap();
        store.save_trade(&trade("t-1")).await.unwrap();
        store.save_trade(&trade("t-1")).await.unwrap();

        assert_eq!(store.recent_trades(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn settlement_is_recorded() {
        let store = TradeStore::in_memory().await.unwrap();
        store.save_trade(&trade("t-1")).await.unwrap();
        store
            .update_outcome("t-1", TradeOutcome::Win, 170.0)
            .await
            .unwrap();

        let got = &store.recent_trades(1).await.unwrap()[0];
        assert_eq!(got.status, TradeStatus::Settled);
        assert_eq!(got.outcome, Some(TradeOutcome::Win));
        assert_eq!(got.profit, Some(170.0));
    }

    #[tokio::test]
    async fn recent_trades_come_newest_first() {
        let store = TradeStore::in_memory().await.unwrap();
        for i in 0..3i64 {
            let mut t = trade(&format!("t-{i}"));
            t.created_at = Utc::now() + chrono::Duration::seconds(i);
            store.save_trade(&t).await.unwrap();
        }

        let recent = store.recent_trades(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].trade_id, "t-2");
        assert_eq!(recent[1].trade_id, "t-1");
    }
}
