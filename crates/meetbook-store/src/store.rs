//! SQLite-backed meeting store.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use meetbook_core::MeetingRecord;

use crate::error::{StoreError, StoreResult};

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS meetings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    date TEXT NOT NULL,
    time TEXT NOT NULL,
    topic TEXT NOT NULL,
    duration INTEGER NOT NULL,
    account TEXT NOT NULL,
    join_url TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);
CREATE INDEX IF NOT EXISTS idx_meetings_user ON meetings(user_id);
CREATE INDEX IF NOT EXISTS idx_meetings_join_url ON meetings(join_url);
";

/// Persistent record of booked meetings.
///
/// One connection behind a mutex: the process handles one chat flow at a
/// time, so there is no contention to speak of, only exclusion.
#[derive(Debug)]
pub struct MeetingStore {
    conn: Mutex<Connection>,
}

impl MeetingStore {
    /// Opens (or creates) the database at `path` and applies the schema.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch(SCHEMA_SQL)?;
        info!(path = %path.as_ref().display(), "meeting store opened");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory store, for tests.
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Persists one booked meeting.
    pub fn save(&self, record: &MeetingRecord) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO meetings (user_id, date, time, topic, duration, account, join_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.user_id,
                record.date,
                record.time,
                record.topic,
                record.duration_minutes,
                record.account,
                record.join_url,
            ],
        )?;
        debug!(user = %record.user_id, topic = %record.topic, "meeting saved");
        Ok(())
    }

    /// Returns the meetings of one user, oldest booking first.
    pub fn meetings_for_user(&self, user_id: &str) -> StoreResult<Vec<MeetingRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, date, time, topic, duration, account, join_url
             FROM meetings WHERE user_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![user_id], row_to_record)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(StoreError::from)
    }

    /// Returns every stored meeting grouped by user.
    pub fn all_meetings(&self) -> StoreResult<HashMap<String, Vec<MeetingRecord>>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, date, time, topic, duration, account, join_url
             FROM meetings ORDER BY id",
        )?;
        let rows = stmt.query_map([], row_to_record)?;

        let mut by_user: HashMap<String, Vec<MeetingRecord>> = HashMap::new();
        for row in rows {
            let record = row?;
            by_user.entry(record.user_id.clone()).or_default().push(record);
        }
        Ok(by_user)
    }

    /// Looks up which account hosts the meeting behind a join link.
    pub fn account_for_link(&self, join_url: &str) -> StoreResult<Option<String>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT account FROM meetings WHERE join_url = ?1 LIMIT 1",
            params![join_url],
            |row| row.get(0),
        )
        .optional()
        .map_err(StoreError::from)
    }

    /// Deletes the meeting behind a join link. Returns true when a row went.
    pub fn delete_by_link(&self, join_url: &str) -> StoreResult<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM meetings WHERE join_url = ?1", params![join_url])?;
        debug!(join_url, deleted, "meeting rows deleted");
        Ok(deleted > 0)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<MeetingRecord> {
    Ok(MeetingRecord {
        user_id: row.get(0)?,
        date: row.get(1)?,
        time: row.get(2)?,
        topic: row.get(3)?,
        duration_minutes: row.get(4)?,
        account: row.get(5)?,
        join_url: row.get(6)?,
    })
}
