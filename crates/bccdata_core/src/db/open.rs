//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Apply `ContextConfig` pragmas before handing the connection out.
//!
//! # Invariants
//! - Returned connections already carry the requested `foreign_keys` mode
//!   and busy timeout.

use super::{ContextConfig, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::Instant;

/// Opens a SQLite database file with the default `ContextConfig`.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_db_with_config(path, &ContextConfig::default())
}

/// Opens a SQLite database file and applies `config`.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db_with_config(path: impl AsRef<Path>, config: &ContextConfig) -> DbResult<Connection> {
    open_with("file", config, || Connection::open(path))
}

/// Opens an in-memory SQLite database with the default `ContextConfig`.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_with("memory", &ContextConfig::default(), Connection::open_in_memory)
}

fn open_with(
    mode: &'static str,
    config: &ContextConfig,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode={mode}");

    let conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&conn, config) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={mode} duration_ms={} foreign_keys={}",
                started_at.elapsed().as_millis(),
                config.foreign_keys
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &Connection, config: &ContextConfig) -> DbResult<()> {
    let foreign_keys = if config.foreign_keys { "ON" } else { "OFF" };
    conn.execute_batch(&format!("PRAGMA foreign_keys = {foreign_keys};"))?;
    conn.busy_timeout(config.busy_timeout)?;
    Ok(())
}
