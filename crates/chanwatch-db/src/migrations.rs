use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS chat_messages (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            channel     TEXT NOT NULL,
            message     TEXT NOT NULL,
            timestamp   INTEGER NOT NULL,
            name        TEXT NOT NULL,
            user        TEXT NOT NULL DEFAULT '',
            host        TEXT NOT NULL DEFAULT '',
            params      TEXT NOT NULL DEFAULT '[]'
        );

        CREATE INDEX IF NOT EXISTS idx_chat_messages_channel
            ON chat_messages(channel, timestamp);

        CREATE TABLE IF NOT EXISTS channels (
            channel_name    TEXT PRIMARY KEY,
            names           TEXT NOT NULL DEFAULT '[]'
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
