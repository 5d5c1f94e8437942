use anyhow::{anyhow, Result};
use rusqlite::{params, types::Type, Connection, ErrorCode};
use std::{path::Path, thread, time::Duration};
use time::OffsetDateTime;

use crate::models::{Message, Role};

/**
 * \brief Open the message database at `path` and make sure the schema exists.
 */
pub fn open_db(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(Duration::from_secs(5))?;
    migrate(&conn)?;
    Ok(conn)
}

/**
 * \brief Create the append-only message table.
 * \details `created_at` holds unix nanoseconds so ordering is numeric; rowid breaks ties.
 */
pub fn migrate(conn: &Connection) -> Result<()> {
    retry_on_locked(|| {
        conn.execute_batch(
            r#"
        PRAGMA journal_mode=WAL;
        CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY NOT NULL,
            role TEXT NOT NULL CHECK (role IN ('user', 'assistant')),
            content TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS messages_created_at ON messages(created_at);
        "#,
        )
    })?;
    Ok(())
}

/**
 * \brief Insert one message row under its caller-supplied id.
 */
pub fn insert_message(conn: &Connection, message: &Message) -> Result<()> {
    let created_at = timestamp_nanos(message.created_at)?;
    retry_on_locked(|| {
        conn.execute(
            "INSERT INTO messages (id, role, content, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                message.id,
                message.role.as_str(),
                message.content,
                created_at
            ],
        )
    })?;
    Ok(())
}

/**
 * \brief Read the whole history, oldest first.
 */
pub fn load_messages(conn: &Connection) -> Result<Vec<Message>> {
    let mut stmt = conn.prepare(
        "SELECT id, role, content, created_at FROM messages ORDER BY created_at ASC, rowid ASC",
    )?;
    let rows = stmt
        .query_map([], |row| {
            let role: String = row.get(1)?;
            let role = Role::parse(&role).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    1,
                    Type::Text,
                    format!("unknown role {:?}", role).into(),
                )
            })?;
            let nanos: i64 = row.get(3)?;
            let created_at = OffsetDateTime::from_unix_timestamp_nanos(i128::from(nanos))
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Integer, e.into()))?;
            Ok(Message {
                id: row.get(0)?,
                role,
                content: row.get(2)?,
                created_at,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/**
 * \brief Storage form of a timestamp. Fails outside roughly 1677..2262, which i64 nanoseconds cannot hold.
 */
pub fn timestamp_nanos(ts: OffsetDateTime) -> Result<i64> {
    i64::try_from(ts.unix_timestamp_nanos())
        .map_err(|_| anyhow!("created_at {} out of storable range", ts))
}

/**
 * \brief Retry helper for SQLite lock contention.
 * \details Backs off linearly on `database is locked` / busy, at most 6 attempts.
 */
fn retry_on_locked<T, F>(mut action: F) -> Result<T>
where
    F: FnMut() -> rusqlite::Result<T>,
{
    const MAX_RETRIES: usize = 5;
    let mut attempt = 0;
    loop {
        match action() {
            Ok(value) => return Ok(value),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if matches!(
                    err.code,
                    ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
                ) && attempt < MAX_RETRIES =>
            {
                attempt += 1;
                thread::sleep(Duration::from_millis(200 * attempt as u64));
            }
            Err(e) => return Err(e.into()),
        }
    }
}
