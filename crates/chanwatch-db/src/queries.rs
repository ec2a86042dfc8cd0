use crate::models::{ChannelRow, ChatMessageRow};
use crate::{Database, RecordStore};
use anyhow::Result;
use rusqlite::Connection;

use chanwatch_types::models::{ChannelRoster, ChatRecord};

impl RecordStore for Database {
    // -- Messages --

    fn insert_message(&self, record: &ChatRecord) -> Result<()> {
        let params = serde_json::to_string(&record.params)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO chat_messages (channel, message, timestamp, name, user, host, params)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    record.channel,
                    record.message,
                    record.timestamp,
                    record.name,
                    record.user,
                    record.host,
                    params
                ],
            )?;
            Ok(())
        })
    }

    fn messages_for_channel(&self, channel: &str) -> Result<Vec<ChatRecord>> {
        self.with_conn(|conn| query_messages(conn, channel))?
            .into_iter()
            .map(ChatMessageRow::into_record)
            .collect()
    }

    // -- Rosters --

    fn find_roster(&self, channel: &str) -> Result<Option<ChannelRoster>> {
        self.with_conn(|conn| query_channel(conn, channel))?
            .map(ChannelRow::into_roster)
            .transpose()
    }

    fn insert_roster(&self, roster: &ChannelRoster) -> Result<bool> {
        let names = serde_json::to_string(&roster.names)?;
        self.with_conn(|conn| {
            let written = conn.execute(
                "INSERT OR IGNORE INTO channels (channel_name, names) VALUES (?1, ?2)",
                (&roster.channel, &names),
            )?;
            Ok(written > 0)
        })
    }

    fn upsert_roster(&self, roster: &ChannelRoster) -> Result<()> {
        let names = serde_json::to_string(&roster.names)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO channels (channel_name, names) VALUES (?1, ?2)
                 ON CONFLICT(channel_name) DO UPDATE SET names = excluded.names",
                (&roster.channel, &names),
            )?;
            Ok(())
        })
    }

    fn rosters(&self) -> Result<Vec<ChannelRoster>> {
        self.with_conn(query_channels)?
            .into_iter()
            .map(ChannelRow::into_roster)
            .collect()
    }
}

fn query_messages(conn: &Connection, channel: &str) -> Result<Vec<ChatMessageRow>> {
    // id breaks ties between records stamped in the same millisecond
    let mut stmt = conn.prepare(
        "SELECT channel, message, timestamp, name, user, host, params
         FROM chat_messages
         WHERE channel = ?1
         ORDER BY timestamp ASC, id ASC",
    )?;

    let rows = stmt
        .query_map([channel], |row| {
            Ok(ChatMessageRow {
                channel: row.get(0)?,
                message: row.get(1)?,
                timestamp: row.get(2)?,
                name: row.get(3)?,
                user: row.get(4)?,
                host: row.get(5)?,
                params: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_channel(conn: &Connection, channel: &str) -> Result<Option<ChannelRow>> {
    let mut stmt = conn.prepare("SELECT channel_name, names FROM channels WHERE channel_name = ?1")?;

    let row = stmt
        .query_row([channel], |row| {
            Ok(ChannelRow {
                channel_name: row.get(0)?,
                names: row.get(1)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_channels(conn: &Connection) -> Result<Vec<ChannelRow>> {
    let mut stmt = conn.prepare("SELECT channel_name, names FROM channels ORDER BY channel_name")?;

    let rows = stmt
        .query_map([], |row| {
            Ok(ChannelRow {
                channel_name: row.get(0)?,
                names: row.get(1)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
