//! Correlation store: durable mapping between Discord and Telegram message ids.
//!
//! Every successful outbound send produces one row linking the source
//! message to the destination message it became. Reply resolution reads the
//! table in either direction to find the message a reply should thread onto.
//!
//! Rows are append-only and inserts are idempotent (`INSERT OR IGNORE` on
//! the primary key), so a retried send after a crash cannot corrupt state.
//! A message split into N chunks produces N rows sharing the source ids;
//! resolution takes `MIN()` of the matches because the first chunk is the
//! canonical reply anchor and message ids are assigned monotonically on
//! both platforms.

use std::path::Path;
use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;
use tracing::info;

use crate::common::error::{StoreError, StoreResult};

/// Thread-safe SQLite-backed correlation store.
///
/// All access goes through a single connection behind a mutex; SQLite plus
/// the lock gives the single-logical-writer guarantee, and each call is one
/// implicit transaction.
#[derive(Clone)]
pub struct CorrelationStore {
    conn: Arc<Mutex<Connection>>,
}

impl CorrelationStore {
    /// Open or create the database at the given path.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).map_err(|e| StoreError::Open {
            path: path.display().to_string(),
            source: e,
        })?;

        // journal_mode PRAGMA always returns the resulting mode, so use query_row
        let _: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        conn.execute_batch("PRAGMA synchronous=NORMAL;")?;

        Self::run_migrations(&conn)?;

        info!("Correlation store opened at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database (for testing).
    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn run_migrations(conn: &Connection) -> StoreResult<()> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS message_map (
              bridge TEXT NOT NULL,
              discord_channel_id INTEGER NOT NULL,
              discord_message_id INTEGER NOT NULL,
              telegram_chat_id INTEGER NOT NULL,
              telegram_message_id INTEGER NOT NULL,
              created_at INTEGER NOT NULL,
              PRIMARY KEY (
                discord_channel_id,
                discord_message_id,
                telegram_chat_id,
                telegram_message_id
              )
            );

            CREATE INDEX IF NOT EXISTS idx_discord_to_tg
              ON message_map(discord_channel_id, discord_message_id, telegram_chat_id);

            CREATE INDEX IF NOT EXISTS idx_tg_to_discord
              ON message_map(telegram_chat_id, telegram_message_id, discord_channel_id);
            ",
        )?;
        Ok(())
    }

    /// Record one relayed message pair.
    ///
    /// Idempotent: re-recording an existing tuple is a silent no-op. The
    /// bridge name is bookkeeping only and does not participate in the
    /// primary key or in resolution.
    pub async fn record(
        &self,
        bridge: &str,
        discord_channel_id: i64,
        discord_message_id: i64,
        telegram_chat_id: i64,
        telegram_message_id: i64,
    ) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR IGNORE INTO message_map(
               bridge,
               discord_channel_id,
               discord_message_id,
               telegram_chat_id,
               telegram_message_id,
               created_at
             )
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                bridge,
                discord_channel_id,
                discord_message_id,
                telegram_chat_id,
                telegram_message_id,
                chrono::Utc::now().timestamp(),
            ],
        )?;
        Ok(())
    }

    /// Find the Telegram message a Discord message became in the given chat.
    ///
    /// Returns `None` when the message was never relayed there; the caller
    /// sends without reply threading in that case.
    pub async fn telegram_reply_target(
        &self,
        discord_channel_id: i64,
        discord_message_id: i64,
        telegram_chat_id: i64,
    ) -> StoreResult<Option<i64>> {
        let conn = self.conn.lock().await;
        let id: Option<i64> = conn.query_row(
            "SELECT MIN(telegram_message_id)
             FROM message_map
             WHERE discord_channel_id = ?1
               AND discord_message_id = ?2
               AND telegram_chat_id = ?3",
            rusqlite::params![discord_channel_id, discord_message_id, telegram_chat_id],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Find the Discord message a Telegram message became in the given channel.
    pub async fn discord_reply_target(
        &self,
        telegram_chat_id: i64,
        telegram_message_id: i64,
        discord_channel_id: i64,
    ) -> StoreResult<Option<i64>> {
        let conn = self.conn.lock().await;
        let id: Option<i64> = conn.query_row(
            "SELECT MIN(discord_message_id)
             FROM message_map
             WHERE telegram_chat_id = ?1
               AND telegram_message_id = ?2
               AND discord_channel_id = ?3",
            rusqlite::params![telegram_chat_id, telegram_message_id, discord_channel_id],
            |row| row.get(0),
        )?;
        Ok(id)
    }
}
