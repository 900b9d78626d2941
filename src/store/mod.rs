//! Address persistence
//!
//! The `address` table is the only persistent state of the service. An
//! [`AddressStore`] is opened once at startup and shared by reference; request
//! handlers borrow a pooled connection for the lifetime of one request and
//! the backfill worker commits one transaction per resolved address.
//!
//! Query helpers take a `&mut SqliteConnection` so they work the same on a
//! pooled session or inside a transaction.

pub mod import;

use crate::constants::geo::SENTINEL_COORDINATE;
use crate::error::Result;
use crate::geo::Coordinates;
use serde::{Deserialize, Serialize};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::str::FromStr;
use tracing::info;

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS address (
    landlot_address   TEXT PRIMARY KEY NOT NULL,
    road_name_address TEXT NOT NULL,
    longitude         REAL NOT NULL,
    latitude          REAL NOT NULL
)";

/// A persisted address row
///
/// Longitude and latitude are either a WGS84 pair or both the sentinel -1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AddressRecord {
    pub landlot_address: String,
    pub road_name_address: String,
    pub longitude: f64,
    pub latitude: f64,
}

impl AddressRecord {
    /// Create a record that has not been geocoded yet
    pub fn pending(landlot_address: impl Into<String>, road_name_address: impl Into<String>) -> Self {
        Self {
            landlot_address: landlot_address.into(),
            road_name_address: road_name_address.into(),
            longitude: SENTINEL_COORDINATE,
            latitude: SENTINEL_COORDINATE,
        }
    }

    /// Create a record with known coordinates
    pub fn resolved(
        landlot_address: impl Into<String>,
        road_name_address: impl Into<String>,
        coords: Coordinates,
    ) -> Self {
        Self {
            landlot_address: landlot_address.into(),
            road_name_address: road_name_address.into(),
            longitude: coords.lon,
            latitude: coords.lat,
        }
    }

    /// Whether either coordinate still holds the sentinel
    pub fn needs_geocoding(&self) -> bool {
        crate::geo::is_sentinel(self.longitude) || crate::geo::is_sentinel(self.latitude)
    }
}

/// Handle to the address database
#[derive(Debug, Clone)]
pub struct AddressStore {
    pool: SqlitePool,
}

impl AddressStore {
    /// Open (creating if missing) the database at `url` and apply the schema
    pub async fn connect(url: &str) -> Result<Self> {
        let opts = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // An in-memory database lives and dies with its connection, so pin
        // the pool to a single connection that never expires.
        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(opts)
                .await?
        } else {
            SqlitePoolOptions::new().connect_with(opts).await?
        };

        let store = Self { pool };
        store.migrate().await?;

        info!(url, "Opened address store");
        Ok(store)
    }

    /// Open a fresh in-memory database (tests and dry runs)
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    /// Borrow a pooled connection, returned to the pool when dropped
    pub async fn session(&self) -> Result<PoolConnection<Sqlite>> {
        Ok(self.pool.acquire().await?)
    }

    /// Start a transaction
    pub async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    /// Close every connection in the pool
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed address store");
    }
}

/// Number of rows in the table
pub async fn count(conn: &mut SqliteConnection) -> Result<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM address")
        .fetch_one(&mut *conn)
        .await?;
    Ok(n)
}

/// Insert records, ignoring any whose land-lot address already exists
///
/// Returns the number of rows actually inserted.
pub async fn insert_all(conn: &mut SqliteConnection, records: &[AddressRecord]) -> Result<u64> {
    let mut inserted = 0;
    for record in records {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO address (landlot_address, road_name_address, longitude, latitude)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&record.landlot_address)
        .bind(&record.road_name_address)
        .bind(record.longitude)
        .bind(record.latitude)
        .execute(&mut *conn)
        .await?;
        inserted += result.rows_affected();
    }
    Ok(inserted)
}

/// Fetch one record by land-lot address
pub async fn get(conn: &mut SqliteConnection, landlot_address: &str) -> Result<Option<AddressRecord>> {
    let record = sqlx::query_as::<_, AddressRecord>(
        "SELECT landlot_address, road_name_address, longitude, latitude
         FROM address WHERE landlot_address = ?",
    )
    .bind(landlot_address)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(record)
}

/// Records whose longitude or latitude is still the sentinel
pub async fn pending(conn: &mut SqliteConnection) -> Result<Vec<AddressRecord>> {
    let records = sqlx::query_as::<_, AddressRecord>(
        "SELECT landlot_address, road_name_address, longitude, latitude
         FROM address WHERE longitude = ? OR latitude = ?
         ORDER BY rowid",
    )
    .bind(SENTINEL_COORDINATE)
    .bind(SENTINEL_COORDINATE)
    .fetch_all(&mut *conn)
    .await?;
    Ok(records)
}

/// Records with a resolved coordinate pair
pub async fn resolved(conn: &mut SqliteConnection) -> Result<Vec<AddressRecord>> {
    let records = sqlx::query_as::<_, AddressRecord>(
        "SELECT landlot_address, road_name_address, longitude, latitude
         FROM address WHERE longitude != ? AND latitude != ?
         ORDER BY rowid",
    )
    .bind(SENTINEL_COORDINATE)
    .bind(SENTINEL_COORDINATE)
    .fetch_all(&mut *conn)
    .await?;
    Ok(records)
}

/// The first `limit` records in table order
pub async fn sample(conn: &mut SqliteConnection, limit: i64) -> Result<Vec<AddressRecord>> {
    let records = sqlx::query_as::<_, AddressRecord>(
        "SELECT landlot_address, road_name_address, longitude, latitude
         FROM address ORDER BY rowid LIMIT ?",
    )
    .bind(limit)
    .fetch_all(&mut *conn)
    .await?;
    Ok(records)
}

/// Write a resolved coordinate pair
///
/// Returns false if no row matched.
pub async fn update_coordinates(
    conn: &mut SqliteConnection,
    landlot_address: &str,
    coords: Coordinates,
) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE address SET longitude = ?, latitude = ? WHERE landlot_address = ?",
    )
    .bind(coords.lon)
    .bind(coords.lat)
    .bind(landlot_address)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_store() -> AddressStore {
        let store = AddressStore::in_memory().await.unwrap();
        let mut conn = store.session().await.unwrap();
        insert_all(
            &mut conn,
            &[
                AddressRecord::pending("서울특별시 강남구 역삼동 825", "서울특별시 강남구 강남대로 396"),
                AddressRecord::resolved(
                    "경기도 수원시 팔달구 고등동 67-14",
                    "경기도 수원시 팔달구 고매로 34-1",
                    Coordinates::new(37.2731321, 127.0061042),
                ),
            ],
        )
        .await
        .unwrap();
        store
    }

    #[tokio::test]
    async fn test_insert_and_count() {
        let store = seeded_store().await;
        let mut conn = store.session().await.unwrap();
        assert_eq!(count(&mut conn).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_ignores_duplicates() {
        let store = seeded_store().await;
        let mut conn = store.session().await.unwrap();

        let inserted = insert_all(
            &mut conn,
            &[AddressRecord::pending("서울특별시 강남구 역삼동 825", "다른 도로명")],
        )
        .await
        .unwrap();

        assert_eq!(inserted, 0);
        let record = get(&mut conn, "서울특별시 강남구 역삼동 825").await.unwrap().unwrap();
        assert_eq!(record.road_name_address, "서울특별시 강남구 강남대로 396");
    }

    #[tokio::test]
    async fn test_pending_and_resolved_partition() {
        let store = seeded_store().await;
        let mut conn = store.session().await.unwrap();

        let pending = pending(&mut conn).await.unwrap();
        let resolved = resolved(&mut conn).await.unwrap();

        assert_eq!(pending.len(), 1);
        assert!(pending[0].needs_geocoding());
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].longitude, 127.0061042);
    }

    #[tokio::test]
    async fn test_update_coordinates() {
        let store = seeded_store().await;
        let mut conn = store.session().await.unwrap();

        let updated = update_coordinates(
            &mut conn,
            "서울특별시 강남구 역삼동 825",
            Coordinates::new(37.498095, 127.027610),
        )
        .await
        .unwrap();
        assert!(updated);

        let record = get(&mut conn, "서울특별시 강남구 역삼동 825").await.unwrap().unwrap();
        assert_eq!(record.latitude, 37.498095);
        assert_eq!(record.longitude, 127.027610);
        assert!(pending(&mut conn).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_address() {
        let store = seeded_store().await;
        let mut conn = store.session().await.unwrap();

        let updated = update_coordinates(&mut conn, "없는 주소", Coordinates::new(37.0, 127.0))
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn test_sample_respects_limit() {
        let store = seeded_store().await;
        let mut conn = store.session().await.unwrap();

        let rows = sample(&mut conn, 1).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].landlot_address, "서울특별시 강남구 역삼동 825");
    }

    #[tokio::test]
    async fn test_rolled_back_transaction_leaves_row() {
        let store = seeded_store().await;

        let mut tx = store.begin().await.unwrap();
        update_coordinates(&mut tx, "서울특별시 강남구 역삼동 825", Coordinates::new(37.5, 127.0))
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        let mut conn = store.session().await.unwrap();
        let record = get(&mut conn, "서울특별시 강남구 역삼동 825").await.unwrap().unwrap();
        assert!(record.needs_geocoding());
    }
}
