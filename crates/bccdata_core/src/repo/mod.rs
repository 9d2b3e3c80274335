//! Metadata-driven CRUD over registered entity descriptions.
//!
//! # Responsibility
//! - Turn description metadata into SQL text and run it.
//! - Materialize rows through the description factory and `Entity` scanner.
//!
//! # Invariants
//! - Unregistered entity or relationship names fail before any SQL is built.
//! - Every identifier interpolated into SQL passes `sql::validate_identifier`.
//! - Statements, cursors and owned transactions are released on every exit
//!   path, success or failure.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod entity_repo;
pub(crate) mod schema;
pub mod sql;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error returned by registry lookups and CRUD operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    UnknownEntity(String),
    UnknownRelationship {
        entity: String,
        target: String,
    },
    EntityTypeMismatch {
        entity: String,
        expected: &'static str,
        requested: &'static str,
    },
    InvalidIdentifier(String),
    /// The created-column update after insert touched `updated` rows, not one.
    CreatedStampMismatch {
        entity: String,
        id: i64,
        updated: usize,
    },
    /// The re-select after insert returned no row.
    MissingCreatedRow {
        entity: String,
        id: i64,
    },
    InvalidClock(String),
    MissingRequiredTable(String),
    MissingRequiredColumn {
        table: String,
        column: String,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UnknownEntity(name) => write!(f, "entity is not registered: {name}"),
            Self::UnknownRelationship { entity, target } => {
                write!(f, "entity `{entity}` has no relationship to `{target}`")
            }
            Self::EntityTypeMismatch {
                entity,
                expected,
                requested,
            } => write!(
                f,
                "entity `{entity}` materializes as `{expected}`, not `{requested}`"
            ),
            Self::InvalidIdentifier(value) => write!(f, "invalid sql identifier `{value}`"),
            Self::CreatedStampMismatch {
                entity,
                id,
                updated,
            } => write!(
                f,
                "stamping created `{entity}` row {id} updated {updated} rows, expected 1"
            ),
            Self::InvalidClock(message) => write!(f, "system clock is unusable: {message}"),
            Self::MissingCreatedRow { entity, id } => {
                write!(f, "created `{entity}` row {id} could not be re-selected")
            }
            Self::MissingRequiredTable(table) => write!(f, "required table is missing: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column is missing: {table}.{column}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
