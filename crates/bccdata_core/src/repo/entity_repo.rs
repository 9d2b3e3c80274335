//! Generic create / find / find-related engine.
//!
//! # Responsibility
//! - Run the four CRUD operations for any registered description.
//! - Decide which connection handle a call runs on: the caller's
//!   transaction, an implicit one (create), or the context connection.
//!
//! # Invariants
//! - A caller-supplied transaction is never committed or rolled back here.
//! - `create` either commits insert + created stamp together or leaves no row
//!   behind when it owns the transaction.

use crate::context::DatabaseContext;
use crate::model::description::EntityDescription;
use crate::model::entity::Entity;
use crate::repo::{sql, RepoError, RepoResult};
use log::{debug, error, warn};
use rusqlite::{params, Connection, Params, ToSql, Transaction};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// A registered description paired with the context that owns it.
///
/// Obtained from `DatabaseContext::entity`; this is how an operation reaches
/// sibling descriptions (relationship targets) and the live connection.
#[derive(Clone, Copy)]
pub struct EntityRepository<'ctx> {
    context: &'ctx DatabaseContext,
    description: &'ctx EntityDescription,
}

impl<'ctx> EntityRepository<'ctx> {
    pub(crate) fn new(
        context: &'ctx DatabaseContext,
        description: &'ctx EntityDescription,
    ) -> Self {
        Self {
            context,
            description,
        }
    }

    pub fn description(&self) -> &'ctx EntityDescription {
        self.description
    }

    pub fn context(&self) -> &'ctx DatabaseContext {
        self.context
    }

    /// Inserts one row, stamps its creation time and returns it re-read.
    ///
    /// `params` bind positionally to the description's insert SQL. Without
    /// `tx` the call begins, commits or rolls back its own transaction.
    ///
    /// # Errors
    /// - `Db` for any begin/insert/update/select/scan failure.
    /// - `CreatedStampMismatch` when the stamp update touches other than one
    ///   row, which means the primary-key metadata does not match the table.
    /// - `MissingCreatedRow` when the re-select yields nothing.
    /// - `InvalidClock` when the system clock reads before the unix epoch.
    /// - `EntityTypeMismatch` when `E` is not the mapped type.
    pub fn create<E: Entity, P: Params>(
        &self,
        tx: Option<&Transaction<'_>>,
        params: P,
    ) -> RepoResult<E> {
        let started_at = Instant::now();
        let owns_transaction = tx.is_none();

        let result = match tx {
            Some(tx) => self.create_in(tx, params),
            None => self.create_owned(params),
        };

        match &result {
            Ok(_) => debug!(
                "event=entity_create module=repo status=ok entity={} owns_tx={} duration_ms={}",
                self.description.name(),
                owns_transaction,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=entity_create module=repo status=error entity={} owns_tx={} duration_ms={} error={}",
                self.description.name(),
                owns_transaction,
                started_at.elapsed().as_millis(),
                err
            ),
        }

        result
    }

    fn create_owned<E: Entity, P: Params>(&self, params: P) -> RepoResult<E> {
        let tx = self.context.begin()?;
        match self.create_in(&tx, params) {
            Ok(entity) => {
                tx.commit()?;
                Ok(entity)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(
                        "event=entity_create module=repo status=rollback_failed entity={} error={}",
                        self.description.name(),
                        rollback_err
                    );
                }
                Err(err)
            }
        }
    }

    fn create_in<E: Entity, P: Params>(&self, conn: &Connection, params: P) -> RepoResult<E> {
        let description = self.description;
        let stamp_sql = sql::stamp_created(
            description.table_name(),
            description.created_column(),
            description.primary_key(),
        )?;
        let select_sql =
            sql::select_by_column(description.table_name(), description.primary_key())?;

        let id = conn
            .prepare_cached(description.insert_sql())?
            .insert(params)?;

        let created_at = unix_secs(SystemTime::now())?;
        let stamped = conn.execute(&stamp_sql, params![created_at, id])?;
        if stamped != 1 {
            return Err(RepoError::CreatedStampMismatch {
                entity: description.name().to_string(),
                id,
                updated: stamped,
            });
        }

        let mut stmt = conn.prepare(&select_sql)?;
        let mut rows = stmt.query([id])?;
        let mut entity = description.instantiate::<E>()?;
        if !entity.scan_from_rows(&mut rows)? {
            return Err(RepoError::MissingCreatedRow {
                entity: description.name().to_string(),
                id,
            });
        }

        Ok(entity)
    }

    /// Returns every row whose `key` column (primary key when `None`) equals
    /// `value`, in the order the datastore yields them.
    pub fn find_entities<E: Entity>(
        &self,
        tx: Option<&Transaction<'_>>,
        key: Option<&str>,
        value: impl ToSql,
    ) -> RepoResult<Vec<E>> {
        let started_at = Instant::now();
        let column = key.unwrap_or(self.description.primary_key());
        let select_sql = sql::select_by_column(self.description.table_name(), column)?;

        let conn = self.executor(tx);
        let mut stmt = conn.prepare(&select_sql)?;
        let mut rows = stmt.query([value])?;
        let entities = self.description.create_from_rows(&mut rows)?;

        debug!(
            "event=entity_find module=repo status=ok entity={} column={} rows={} duration_ms={}",
            self.description.name(),
            column,
            entities.len(),
            started_at.elapsed().as_millis()
        );
        Ok(entities)
    }

    /// Returns the first match of `find_entities`, or `None` when nothing
    /// matched.
    pub fn find_entity<E: Entity>(
        &self,
        tx: Option<&Transaction<'_>>,
        key: Option<&str>,
        value: impl ToSql,
    ) -> RepoResult<Option<E>> {
        Ok(self.find_entities(tx, key, value)?.into_iter().next())
    }

    /// Returns the `target` rows linked to `value` through the join table of
    /// the relationship registered for `target`.
    ///
    /// `query_key` names the join-table column holding the owner side.
    /// Rows are materialized with the target description's factory.
    pub fn find_related_entities<T: Entity>(
        &self,
        tx: Option<&Transaction<'_>>,
        target: &str,
        query_key: &str,
        value: impl ToSql,
    ) -> RepoResult<Vec<T>> {
        let started_at = Instant::now();
        let relationship = self
            .description
            .relationship_for_name(target)
            .ok_or_else(|| RepoError::UnknownRelationship {
                entity: self.description.name().to_string(),
                target: target.to_string(),
            })?;
        let target_description = self
            .context
            .entity_description_for_name(&relationship.entity_name)
            .ok_or_else(|| RepoError::UnknownEntity(relationship.entity_name.clone()))?;
        let select_sql =
            sql::select_related(relationship, target_description.table_name(), query_key)?;

        let conn = self.executor(tx);
        let mut stmt = conn.prepare(&select_sql)?;
        let mut rows = stmt.query([value])?;
        let entities = target_description.create_from_rows(&mut rows)?;

        debug!(
            "event=entity_find_related module=repo status=ok entity={} target={} rows={} duration_ms={}",
            self.description.name(),
            target,
            entities.len(),
            started_at.elapsed().as_millis()
        );
        Ok(entities)
    }

    fn executor<'a>(&'a self, tx: Option<&'a Transaction<'_>>) -> &'a Connection {
        match tx {
            Some(tx) => tx,
            None => self.context.connection(),
        }
    }
}

fn unix_secs(now: SystemTime) -> RepoResult<i64> {
    let elapsed = now
        .duration_since(UNIX_EPOCH)
        .map_err(|err| RepoError::InvalidClock(err.to_string()))?;
    i64::try_from(elapsed.as_secs())
        .map_err(|_| RepoError::InvalidClock(format!("{}s overflows i64", elapsed.as_secs())))
}
