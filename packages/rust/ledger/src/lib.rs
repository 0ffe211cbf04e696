//! libsql-backed persistent dedup ledger.
//!
//! The ledger is the durable set of URL hashes already ingested in any prior
//! run. It is a single-column table created idempotently at open. A broken or
//! unreachable ledger invalidates the dedup contract, so every error here is
//! run-fatal ([`LinkdexError::Ledger`]).
//!
//! Dedup can be disabled wholesale ([`Ledger::disabled`]): the same type then
//! answers `exists → false` and ignores `record`, keeping one code path.

use std::path::Path;

use libsql::{Connection, Database, params};
use linkdex_shared::{LinkdexError, Result};

/// Handle to the ledger database. Workers derive their own [`LedgerConn`]
/// from this shared handle; there is no cross-connection locking.
pub struct Ledger {
    /// `None` when dedup is disabled.
    db: Option<Database>,
}

impl Ledger {
    /// Open or create the ledger database at `path` and ensure the
    /// `process_status` table exists.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| LinkdexError::io(parent, e))?;
            }
        }

        tracing::info!(?path, "initializing ledger");

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| LinkdexError::Ledger(e.to_string()))?;

        let ledger = Self { db: Some(db) };
        ledger.init_schema().await?;

        tracing::info!("ledger initialized");
        Ok(ledger)
    }

    /// A ledger that never matches and never records: the dedup-disabled mode.
    pub fn disabled() -> Self {
        Self { db: None }
    }

    /// Whether dedup is active for this ledger.
    pub fn is_enabled(&self) -> bool {
        self.db.is_some()
    }

    /// Create the single-column hash table if it is not there yet.
    async fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        if let Some(conn) = &conn.conn {
            conn.execute("CREATE TABLE IF NOT EXISTS process_status (hash TEXT)", params![])
                .await
                .map_err(|e| LinkdexError::Ledger(format!("schema init failed: {e}")))?;
        }
        Ok(())
    }

    /// Derive a connection for one pool worker. Each worker holds its own
    /// connection for the lifetime of the run.
    pub fn connect(&self) -> Result<LedgerConn> {
        match &self.db {
            Some(db) => {
                let conn = db
                    .connect()
                    .map_err(|e| LinkdexError::Ledger(e.to_string()))?;
                Ok(LedgerConn { conn: Some(conn) })
            }
            None => Ok(LedgerConn { conn: None }),
        }
    }
}

/// One worker's connection to the ledger.
pub struct LedgerConn {
    conn: Option<Connection>,
}

impl LedgerConn {
    /// Whether `hash` has been recorded by any prior (or concurrent) run.
    /// Always false when dedup is disabled.
    pub async fn exists(&self, hash: &str) -> Result<bool> {
        let Some(conn) = &self.conn else {
            return Ok(false);
        };

        let mut rows = conn
            .query(
                "SELECT EXISTS(SELECT 1 FROM process_status WHERE hash = ?1)",
                params![hash],
            )
            .await
            .map_err(|e| LinkdexError::Ledger(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let flag = row
                    .get::<i64>(0)
                    .map_err(|e| LinkdexError::Ledger(e.to_string()))?;
                Ok(flag != 0)
            }
            Ok(None) => Ok(false),
            Err(e) => Err(LinkdexError::Ledger(e.to_string())),
        }
    }

    /// Record `hash` as successfully ingested. Records are never updated or
    /// deleted. A no-op when dedup is disabled.
    pub async fn record(&self, hash: &str) -> Result<()> {
        let Some(conn) = &self.conn else {
            return Ok(());
        };

        conn.execute(
            "INSERT INTO process_status (hash) VALUES (?1)",
            params![hash],
        )
        .await
        .map_err(|e| LinkdexError::Ledger(e.to_string()))?;
        Ok(())
    }
}
