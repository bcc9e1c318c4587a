//! SQLite implementation of the SignerRegistry trait.
//!
//! Reads signer records from a `signers` table maintained by whichever
//! system owns key lifecycle. Uses rusqlite with bundled SQLite, wrapped
//! in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, OptionalExtension};

use packsig_core::{Kid, Namespace, SignerRecord, SignerStatus};

use crate::error::{RegistryError, Result};
use crate::migration;
use crate::traits::SignerRegistry;

/// SQLite-backed registry reader.
///
/// Thread-safe via internal Mutex. Lookups run on the blocking pool.
#[derive(Clone)]
pub struct SqliteRegistry {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRegistry {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Insert or replace a record. Used to load fixtures; key lifecycle
    /// itself is owned elsewhere.
    pub async fn put_signer(&self, namespace: &Namespace, record: &SignerRecord) -> Result<()> {
        let conn = self.conn.clone();
        let namespace = namespace.clone();
        let record = record.clone();

        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = lock(&conn)?;
            conn.execute(
                "INSERT OR REPLACE INTO signers (
                    namespace, kid, public_key, private_key, status, created_at, retired_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    namespace.as_str(),
                    record.kid.as_str(),
                    &record.public_key[..],
                    record.private_key.as_ref().map(|k| k.to_vec()),
                    record.status.as_str(),
                    record.created_at,
                    record.retired_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| RegistryError::Unavailable(format!("blocking task failed: {}", e)))?
    }
}

fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|e| {
        RegistryError::Database(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
            Some(format!("mutex poisoned: {}", e)),
        ))
    })
}

/// Raw column values of a signer row.
struct SignerRow {
    kid: String,
    public_key: Vec<u8>,
    private_key: Option<Vec<u8>>,
    status: String,
    created_at: i64,
    retired_at: Option<i64>,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SignerRow> {
    Ok(SignerRow {
        kid: row.get("kid")?,
        public_key: row.get("public_key")?,
        private_key: row.get("private_key")?,
        status: row.get("status")?,
        created_at: row.get("created_at")?,
        retired_at: row.get("retired_at")?,
    })
}

impl TryFrom<SignerRow> for SignerRecord {
    type Error = RegistryError;

    fn try_from(row: SignerRow) -> Result<Self> {
        let status: SignerStatus = row.status.parse().map_err(RegistryError::InvalidData)?;
        Ok(SignerRecord {
            kid: Kid::from(row.kid),
            public_key: Bytes::from(row.public_key),
            private_key: row.private_key.map(Bytes::from),
            status,
            created_at: row.created_at,
            retired_at: row.retired_at,
        })
    }
}

#[async_trait]
impl SignerRegistry for SqliteRegistry {
    async fn get_signer(&self, namespace: &Namespace, kid: &Kid) -> Result<Option<SignerRecord>> {
        let conn = self.conn.clone();
        let namespace = namespace.clone();
        let kid = kid.clone();

        tokio::task::spawn_blocking(move || {
            let conn = lock(&conn)?;
            let row = conn
                .query_row(
                    "SELECT kid, public_key, private_key, status, created_at, retired_at
                     FROM signers WHERE namespace = ?1 AND kid = ?2",
                    params![namespace.as_str(), kid.as_str()],
                    read_row,
                )
                .optional()?;
            row.map(SignerRecord::try_from).transpose()
        })
        .await
        .map_err(|e| RegistryError::Unavailable(format!("blocking task failed: {}", e)))?
    }
}
