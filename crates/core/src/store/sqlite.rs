//! SQLite-backed blob storage.
//!
//! One row per key in the `blobs` table. Guarded writes are expressed as a
//! conditional `INSERT` (key absent) or `UPDATE ... WHERE version = ?`, so
//! the version check and the write happen in one statement.

use std::path::Path;

use async_trait::async_trait;
use tokio_rusqlite::{Connection, params, rusqlite};

use super::backend::{Blob, BlobBackend};
use super::migrations;
use crate::Error;

/// Blob database handle.
///
/// Wraps a tokio-rusqlite Connection that runs database operations
/// on a background thread.
#[derive(Clone, Debug)]
pub struct SqliteBackend {
    pub(crate) conn: Connection,
}

impl SqliteBackend {
    /// Open a database at the specified path.
    ///
    /// Creates the file if it doesn't exist, applies pragmas and runs any
    /// pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        Self::prepare(conn).await
    }

    /// Open an in-memory database for testing.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::prepare(conn).await
    }

    async fn prepare(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA synchronous=NORMAL;
                 PRAGMA temp_store=MEMORY;",
            )?;
            Ok(())
        })
        .await
        .map_err(Error::Database)?;

        migrations::run(&conn).await?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl BlobBackend for SqliteBackend {
    async fn read(&self, key: &str) -> Result<Option<Blob>, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Blob>, Error> {
                let result = conn.query_row(
                    "SELECT value, version FROM blobs WHERE key = ?1",
                    params![key],
                    |row| Ok(Blob { value: row.get(0)?, version: row.get::<_, i64>(1)? as u64 }),
                );

                match result {
                    Ok(blob) => Ok(Some(blob)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn write(&self, key: &str, value: String, expected: Option<u64>) -> Result<bool, Error> {
        let key = key.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let changed = match expected {
                    None => conn.execute(
                        "INSERT INTO blobs (key, value, version, updated_at) VALUES (?1, ?2, 1, ?3)
                         ON CONFLICT(key) DO NOTHING",
                        params![key, value, now],
                    )?,
                    Some(version) => conn.execute(
                        "UPDATE blobs SET value = ?2, version = version + 1, updated_at = ?3
                         WHERE key = ?1 AND version = ?4",
                        params![key, value, now, version as i64],
                    )?,
                };
                Ok(changed == 1)
            })
            .await
            .map_err(Error::from)
    }
}
