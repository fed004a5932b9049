//! SQLite-backed position store
//!
//! Two tables: `state(key, value)` holds the `"pos"` and `"entry_price"`
//! entries, `history(timestamp, price, rsi)` one row per evaluated cycle.
//! The database runs in WAL mode and the schema is created on connect.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info, instrument};

use crate::common::errors::{MonitorError, Result};
use crate::common::traits::StateStore;
use crate::common::types::{HistoryPoint, PositionRecord, PositionState};

const POSITION_KEY: &str = "pos";
const ENTRY_PRICE_KEY: &str = "entry_price";

const UPSERT_STATE: &str = "INSERT INTO state (key, value) VALUES (?1, ?2) \
     ON CONFLICT(key) DO UPDATE SET value = excluded.value";

#[derive(Debug, Clone)]
pub struct SqliteStateStore {
    pool: SqlitePool,
}

impl SqliteStateStore {
    /// Open (creating if missing) the database at `url`
    ///
    /// `sqlite::memory:` databases live per connection, so they only make
    /// sense with `max_connections == 1`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.ensure_schema().await?;
        info!(url, "State store ready");
        Ok(store)
    }

    /// Private in-memory database
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:", 1).await
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS state (
                 key   TEXT PRIMARY KEY,
                 value TEXT
             )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS history (
                 timestamp TEXT PRIMARY KEY,
                 price     REAL NOT NULL,
                 rsi       REAL NOT NULL
             )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Most recent history rows, newest first
    pub async fn recent_history(&self, limit: u32) -> Result<Vec<HistoryPoint>> {
        let rows: Vec<(DateTime<Utc>, f64, f64)> = sqlx::query_as(
            "SELECT timestamp, price, rsi FROM history ORDER BY timestamp DESC LIMIT ?1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(timestamp, price, rsi)| HistoryPoint {
                timestamp,
                price,
                rsi,
            })
            .collect())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn lookup<'a>(rows: &'a [(String, Option<String>)], key: &str) -> Option<&'a str> {
    rows.iter()
        .find(|(k, _)| k == key)
        .and_then(|(_, v)| v.as_deref())
}

#[async_trait]
impl StateStore for SqliteStateStore {
    #[instrument(skip(self))]
    async fn load_position(&self) -> Result<PositionRecord> {
        let rows: Vec<(String, Option<String>)> =
            sqlx::query_as("SELECT key, value FROM state WHERE key IN (?1, ?2)")
                .bind(POSITION_KEY)
                .bind(ENTRY_PRICE_KEY)
                .fetch_all(&self.pool)
                .await?;

        let state = match lookup(&rows, POSITION_KEY) {
            Some(raw) => raw.parse::<PositionState>()?,
            None => PositionState::Idle,
        };
        if !state.is_open() {
            return Ok(PositionRecord::idle());
        }

        let entry_price = lookup(&rows, ENTRY_PRICE_KEY)
            .map(|raw| {
                raw.parse::<f64>().map_err(|_| {
                    MonitorError::CorruptState(format!("unparseable entry price {:?}", raw))
                })
            })
            .transpose()?;

        debug!(%state, ?entry_price, "Loaded position");
        Ok(PositionRecord { state, entry_price })
    }

    #[instrument(skip(self))]
    async fn save_position(&self, record: &PositionRecord) -> Result<()> {
        let entry_price = record
            .entry_price
            .filter(|_| record.state.is_open())
            .map(|p| p.to_string());

        let mut tx = self.pool.begin().await?;
        sqlx::query(UPSERT_STATE)
            .bind(POSITION_KEY)
            .bind(record.state.as_str())
            .execute(&mut *tx)
            .await?;
        sqlx::query(UPSERT_STATE)
            .bind(ENTRY_PRICE_KEY)
            .bind(entry_price)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn record_history(&self, point: &HistoryPoint) -> Result<()> {
        sqlx::query(
            "INSERT INTO history (timestamp, price, rsi) VALUES (?1, ?2, ?3) \
             ON CONFLICT(timestamp) DO UPDATE SET price = excluded.price, rsi = excluded.rsi",
        )
        .bind(point.timestamp)
        .bind(point.price)
        .bind(point.rsi)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_empty_store_is_idle() {
        let store = SqliteStateStore::in_memory().await.unwrap();
        assert_eq!(store.load_position().await.unwrap(), PositionRecord::idle());
    }

    #[tokio::test]
    async fn test_position_round_trip() {
        let store = SqliteStateStore::in_memory().await.unwrap();
        let long = PositionRecord::open(PositionState::Long, 142.35);
        store.save_position(&long).await.unwrap();
        assert_eq!(store.load_position().await.unwrap(), long);

        store.save_position(&PositionRecord::idle()).await.unwrap();
        assert_eq!(store.load_position().await.unwrap(), PositionRecord::idle());
    }

    #[tokio::test]
    async fn test_stored_text_values() {
        let store = SqliteStateStore::in_memory().await.unwrap();
        store
            .save_position(&PositionRecord::open(PositionState::Short, 10.5))
            .await
            .unwrap();
        let (value,): (String,) = sqlx::query_as("SELECT value FROM state WHERE key = 'pos'")
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(value, "SHORT");
    }

    #[tokio::test]
    async fn test_corrupt_position_is_reported() {
        let store = SqliteStateStore::in_memory().await.unwrap();
        sqlx::query(UPSERT_STATE)
            .bind(POSITION_KEY)
            .bind("SIDEWAYS")
            .execute(&store.pool)
            .await
            .unwrap();
        assert!(matches!(
            store.load_position().await,
            Err(MonitorError::CorruptState(_))
        ));
    }

    #[tokio::test]
    async fn test_history_upserts_by_timestamp() {
        let store = SqliteStateStore::in_memory().await.unwrap();
        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let later = Utc.timestamp_opt(1_700_000_060, 0).unwrap();

        store
            .record_history(&HistoryPoint { timestamp: ts, price: 1.0, rsi: 40.0 })
            .await
            .unwrap();
        store
            .record_history(&HistoryPoint { timestamp: ts, price: 2.0, rsi: 45.0 })
            .await
            .unwrap();
        store
            .record_history(&HistoryPoint { timestamp: later, price: 3.0, rsi: 50.0 })
            .await
            .unwrap();

        let rows = store.recent_history(10).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].timestamp, later);
        assert_eq!(rows[1].price, 2.0);
    }
}
