//! Store methods for saved simulation sessions.

use crate::{error::SimResult, session::SimulationSession};
use rusqlite::{params, OptionalExtension};

use super::SimStore;

pub const SCHEMA_VERSION: u32 = 1;

impl SimStore {
    /// Replace the whole session collection in one transaction.
    /// Order is preserved through the `position` column.
    pub fn replace_sessions(&self, sessions: &[SimulationSession]) -> SimResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM simulation_session", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO simulation_session (position, session_id, payload)
                 VALUES (?1, ?2, ?3)",
            )?;
            for (position, session) in sessions.iter().enumerate() {
                let payload = serde_json::to_string(session)?;
                stmt.execute(params![position as i64, session.id, payload])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Read every saved session, in stored order.
    pub fn load_sessions(&self) -> SimResult<Vec<SimulationSession>> {
        let mut stmt = self.conn.prepare(
            "SELECT payload FROM simulation_session ORDER BY position ASC",
        )?;
        let payloads = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        let sessions = payloads
            .iter()
            .map(|p| serde_json::from_str(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sessions)
    }

    /// Schema version recorded by the migrations; None if the version
    /// row is missing.
    pub fn schema_version(&self) -> SimResult<Option<u32>> {
        let version: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM store_meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(version.and_then(|v| v.parse().ok()))
    }
}
