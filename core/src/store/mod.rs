//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The session store calls store methods; it never executes SQL directly.

use crate::error::SimResult;
use rusqlite::Connection;

mod session;

pub use session::SCHEMA_VERSION;

pub struct SimStore {
    conn: Connection,
}

impl SimStore {
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only for real files; :memory: ignores it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        log::debug!("opened session store at {path}");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_sessions.sql"))?;
        Ok(())
    }
}
