//! SQLite connection bootstrap for the mapping layer.
//!
//! # Responsibility
//! - Open and configure SQLite connections used by a `DatabaseContext`.
//! - Own the transport-level error type shared by every datastore call.
//!
//! # Invariants
//! - Schema objects are owned by the caller; this module never creates or
//!   migrates tables.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

mod open;

pub use open::{open_db, open_db_in_memory, open_db_with_config};

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Connection settings applied when a context opens its database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextConfig {
    /// Mirrors `PRAGMA foreign_keys`.
    pub foreign_keys: bool,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            foreign_keys: true,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}
