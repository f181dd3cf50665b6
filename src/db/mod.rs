// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Data access layer.
//!
//! This module handles all interactions with the SQLite database. The pin
//! state is stored as opaque serialized strings in a single key/value table,
//! so the schema never changes when the snapshot format does.
//!
//! # Tables
//!
//! * `kvs` - Serialized values keyed by storage name.
//!
//! # Performance
//!
//! All functions in this module use [`rusqlite::Connection::prepare_cached`]
//! to reduce SQL parsing overhead.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::Result;

/// Opens a connection to the SQLite database and configures it.
///
/// This function performs the following setup:
/// * **WAL Mode**: Enables Write-Ahead Logging so readers never block the
///   background writer.
/// * **Performance Tuning**: Sets synchronous mode to `NORMAL`.
/// * **Schema**: Executes [`create_schema`] to ensure the table exists.
///
/// # Arguments
///
/// * `path` - The file system path to the SQLite database file.
///
/// # Errors
///
/// Returns an error if:
/// * The database file cannot be opened.
/// * The initial PRAGMA configurations fail.
/// * The schema initialization fails.
pub(crate) fn init_db(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;

    let journal_mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |r| r.get(0))?;
    if journal_mode != "wal" {
        tracing::warn!(
            "Could not switch {:?} to WAL mode, using {}",
            path,
            journal_mode
        );
    }

    conn.execute_batch("PRAGMA synchronous = NORMAL;")?;

    conn.set_prepared_statement_cache_capacity(16);

    create_schema(&conn)?;

    Ok(conn)
}

/// Create the database schema.
///
/// # Errors
///
/// Returns an error if there are permission issues with the database file.
pub(crate) fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kvs (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )?;

    Ok(())
}

/// Fetches the value stored under `key`, if any.
///
/// # Errors
///
/// Returns a [`rusqlite::Error`] (wrapped) if the query fails.
pub(crate) fn get_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    let sql = "SELECT value FROM kvs WHERE key = ?";

    let mut stmt = conn.prepare_cached(sql)?;
    let value: Option<String> = stmt.query_row([key], |row| row.get(0)).optional()?;

    Ok(value)
}

/// Stores `value` under `key`, replacing any previous value.
pub(crate) fn put_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let sql = "
        INSERT INTO kvs (key, value)
        VALUES (?1, ?2)
        ON CONFLICT (key)
        DO UPDATE SET value = ?2";

    let mut stmt = conn.prepare_cached(sql)?;
    stmt.execute(params![key, value])?;

    Ok(())
}

/// Deletes the value stored under `key`. Deleting a missing key is not an
/// error.
pub(crate) fn delete_value(conn: &Connection, key: &str) -> Result<()> {
    let mut stmt = conn.prepare_cached("DELETE FROM kvs WHERE key = ?")?;
    stmt.execute([key])?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = init_db(&dir.path().join("test.db")).unwrap();
        (dir, conn)
    }

    #[test]
    fn missing_key_reads_none() {
        let (_dir, conn) = open_temp();
        assert_eq!(get_value(&conn, "pin-storage").unwrap(), None);
    }

    #[test]
    fn put_then_get() {
        let (_dir, conn) = open_temp();
        put_value(&conn, "k", "first").unwrap();
        put_value(&conn, "k", "second").unwrap();

        assert_eq!(get_value(&conn, "k").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn delete_is_idempotent() {
        let (_dir, conn) = open_temp();
        put_value(&conn, "k", "v").unwrap();

        delete_value(&conn, "k").unwrap();
        delete_value(&conn, "k").unwrap();

        assert_eq!(get_value(&conn, "k").unwrap(), None);
    }

    #[test]
    fn schema_creation_is_repeatable() {
        let (_dir, conn) = open_temp();
        create_schema(&conn).unwrap();
        put_value(&conn, "k", "v").unwrap();
        create_schema(&conn).unwrap();

        assert_eq!(get_value(&conn, "k").unwrap().as_deref(), Some("v"));
    }
}
