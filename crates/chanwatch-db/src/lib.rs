pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

use chanwatch_types::models::{ChannelRoster, ChatRecord};

/// The record store seen by the collector and the API.
///
/// Implementations serialize their own writes; callers may share one store
/// across the dispatch thread and request handlers.
pub trait RecordStore: Send + Sync {
    /// Append a chat record.
    fn insert_message(&self, record: &ChatRecord) -> Result<()>;

    /// Messages for one channel, oldest first.
    fn messages_for_channel(&self, channel: &str) -> Result<Vec<ChatRecord>>;

    /// Look up the roster keyed by `channel`.
    fn find_roster(&self, channel: &str) -> Result<Option<ChannelRoster>>;

    /// Insert a roster unless one already exists for its channel.
    /// Returns whether a row was written.
    fn insert_roster(&self, roster: &ChannelRoster) -> Result<bool>;

    /// Insert or replace the roster keyed by its channel.
    fn upsert_roster(&self, roster: &ChannelRoster) -> Result<()>;

    /// Every stored roster, ordered by channel.
    fn rosters(&self) -> Result<Vec<ChannelRoster>>;
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }
}
