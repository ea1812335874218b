//! SQLite store. Uniqueness per order is a `UNIQUE` constraint; record and outbox row share a transaction.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use super::{DeliveryStore, InsertOutcome, StoreError};
use crate::model::{DeliveryId, DeliveryRecord, DeliveryStatus, OrderId};
use crate::outbox::{OutboxEvent, OutboxMessage, OutboxStorage};
use crate::sequence::{AllocationError, IdSource};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS delivery_ids (id INTEGER PRIMARY KEY AUTOINCREMENT)",
    "CREATE TABLE IF NOT EXISTS deliveries (
        delivery_id INTEGER PRIMARY KEY,
        order_id INTEGER NOT NULL,
        address TEXT NOT NULL,
        status TEXT NOT NULL,
        CONSTRAINT deliveries_order_id_key UNIQUE (order_id)
    )",
    "CREATE TABLE IF NOT EXISTS outbox (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        event_type TEXT NOT NULL,
        payload TEXT NOT NULL,
        published INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS outbox_pending_idx ON outbox (published, id)",
];

/// SQLITE_FULL: AUTOINCREMENT reached the largest rowid.
const SQLITE_FULL: &str = "13";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to `url` (e.g. `sqlite://courier.db`, `sqlite::memory:`), creating the file if missing.
    /// In-memory databases live in a single connection that is never recycled.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        let mut options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));
        let mut pool_options = SqlitePoolOptions::new();
        if in_memory {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            options = options.journal_mode(SqliteJournalMode::Wal);
            pool_options = pool_options.max_connections(max_connections.max(1));
        }
        let pool = pool_options.connect_with(options).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create tables and indexes. Safe to run on every start.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn existing_delivery_id(&self, order_id: OrderId) -> Result<Option<DeliveryId>, StoreError> {
        let id: Option<i64> =
            sqlx::query_scalar("SELECT delivery_id FROM deliveries WHERE order_id = ?1")
                .bind(order_id.get())
                .fetch_optional(&self.pool)
                .await?;
        Ok(id.map(DeliveryId::new))
    }
}

fn record_from_row(row: &SqliteRow) -> Result<DeliveryRecord, StoreError> {
    let status: String = row.try_get("status")?;
    let status = DeliveryStatus::parse(&status)
        .ok_or_else(|| StoreError::Corrupt(format!("unknown delivery status {:?}", status)))?;
    Ok(DeliveryRecord {
        delivery_id: DeliveryId::new(row.try_get("delivery_id")?),
        order_id: OrderId::new(row.try_get("order_id")?),
        address: row.try_get("address")?,
        status,
    })
}

#[async_trait]
impl DeliveryStore for SqliteStore {
    async fn insert(
        &self,
        record: &DeliveryRecord,
        event: &OutboxEvent,
    ) -> Result<InsertOutcome, StoreError> {
        let payload = serde_json::to_string(&event.payload)?;
        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query(
            "INSERT INTO deliveries (delivery_id, order_id, address, status) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(record.delivery_id.get())
        .bind(record.order_id.get())
        .bind(&record.address)
        .bind(record.status.as_str())
        .execute(&mut *tx)
        .await;
        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                tx.rollback().await?;
                // Writers are serialised, so the conflicting row is committed by now.
                return match self.existing_delivery_id(record.order_id).await? {
                    Some(existing) => Ok(InsertOutcome::Conflict { existing }),
                    None => Err(StoreError::DuplicateDeliveryId(record.delivery_id)),
                };
            }
            Err(e) => return Err(e.into()),
        }
        sqlx::query("INSERT INTO outbox (event_type, payload) VALUES (?1, ?2)")
            .bind(&event.event_type)
            .bind(payload)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(InsertOutcome::Inserted)
    }

    async fn find_by_order(&self, order_id: OrderId) -> Result<Option<DeliveryRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT delivery_id, order_id, address, status FROM deliveries WHERE order_id = ?1",
        )
        .bind(order_id.get())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(record_from_row).transpose()
    }
}

#[async_trait]
impl OutboxStorage for SqliteStore {
    async fn fetch_pending(&self, limit: usize) -> Result<Vec<OutboxMessage>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            "SELECT id, event_type, payload FROM outbox WHERE published = 0 ORDER BY id LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(|row| {
                let payload: String = row.try_get("payload")?;
                Ok(OutboxMessage {
                    id: row.try_get("id")?,
                    event_type: row.try_get("event_type")?,
                    payload: serde_json::from_str(&payload)?,
                })
            })
            .collect()
    }

    async fn mark_published(&self, ids: &[i64]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for id in ids {
            sqlx::query("UPDATE outbox SET published = 1 WHERE id = ?1")
                .bind(*id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

fn is_sqlite_full(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|d| d.code())
        .is_some_and(|code| code == SQLITE_FULL)
}

impl SqliteStore {
    /// SQLITE_FULL means an exhausted sequence only once `i64::MAX` was handed out;
    /// otherwise the disk or database is full.
    async fn full_sequence_error(&self, e: sqlx::Error) -> AllocationError {
        let high_water: Result<Option<i64>, sqlx::Error> =
            sqlx::query_scalar("SELECT seq FROM sqlite_sequence WHERE name = 'delivery_ids'")
                .fetch_optional(&self.pool)
                .await;
        match high_water {
            Ok(Some(i64::MAX)) => AllocationError::Exhausted,
            _ => AllocationError::Unavailable(e.to_string()),
        }
    }
}

#[async_trait]
impl IdSource for SqliteStore {
    async fn next_id(&self) -> Result<DeliveryId, AllocationError> {
        let allocated = match sqlx::query("INSERT INTO delivery_ids DEFAULT VALUES")
            .execute(&self.pool)
            .await
        {
            Ok(done) => done,
            Err(e) if is_sqlite_full(&e) => return Err(self.full_sequence_error(e).await),
            Err(e) => return Err(AllocationError::Unavailable(e.to_string())),
        };
        let id = allocated.last_insert_rowid();
        // AUTOINCREMENT keeps the high-water mark in sqlite_sequence; the row itself is not needed.
        if let Err(e) = sqlx::query("DELETE FROM delivery_ids WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            tracing::warn!(delivery_id = id, error = %e, "could not trim delivery id sequence");
        }
        Ok(DeliveryId::new(id))
    }
}
