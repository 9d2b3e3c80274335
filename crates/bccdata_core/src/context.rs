//! Database context: the registry of entity descriptions plus the live
//! connection they run against.
//!
//! # Responsibility
//! - Register descriptions by name and stamp them with this context's id.
//! - Hand out `EntityRepository` handles for CRUD calls.
//!
//! # Invariants
//! - Every description reachable from the registry carries
//!   `context_id == Some(self.id())`.
//! - Registration needs `&mut self`, so it cannot overlap lookups or CRUD
//!   calls on the same context.

use crate::db::{open_db, open_db_in_memory, open_db_with_config, ContextConfig};
use crate::model::description::{ContextId, EntityDescription, EntityRelationship};
use crate::repo::entity_repo::EntityRepository;
use crate::repo::{schema, RepoError, RepoResult};
use log::{debug, error, info};
use rusqlite::{Connection, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use uuid::Uuid;

/// Serializable summary of one registered description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCatalogEntry {
    pub name: String,
    pub table_name: String,
    pub primary_key: String,
    pub created_column: String,
    pub entity_type: String,
    pub relationships: Vec<EntityRelationship>,
}

pub struct DatabaseContext {
    id: ContextId,
    conn: Connection,
    descriptions: HashMap<String, EntityDescription>,
}

impl DatabaseContext {
    /// Wraps an already configured connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            id: Uuid::new_v4(),
            conn,
            descriptions: HashMap::new(),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_with_config(path: impl AsRef<Path>, config: &ContextConfig) -> RepoResult<Self> {
        Ok(Self::new(open_db_with_config(path, config)?))
    }

    pub fn open_in_memory() -> RepoResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Begins a deferred transaction on the context connection.
    ///
    /// Pass it to CRUD calls to group them; the caller commits or rolls back.
    pub fn begin(&self) -> RepoResult<Transaction<'_>> {
        Ok(self.conn.unchecked_transaction()?)
    }

    /// Registers `description` under its name, replacing any previous one.
    pub fn register_entity_description(&mut self, mut description: EntityDescription) {
        description.attach_to(self.id);
        let name = description.name().to_string();
        let table = description.table_name().to_string();

        if self.descriptions.insert(name.clone(), description).is_some() {
            debug!("event=entity_register module=context status=replaced entity={name} table={table}");
        } else {
            debug!("event=entity_register module=context status=ok entity={name} table={table}");
        }
    }

    pub fn entity_description_for_name(&self, name: &str) -> Option<&EntityDescription> {
        self.descriptions.get(name)
    }

    /// Returns the CRUD handle for a registered entity.
    pub fn entity(&self, name: &str) -> RepoResult<EntityRepository<'_>> {
        self.entity_description_for_name(name)
            .map(|description| EntityRepository::new(self, description))
            .ok_or_else(|| RepoError::UnknownEntity(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.descriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptions.is_empty()
    }

    /// Returns registered descriptions sorted by entity name.
    pub fn catalog(&self) -> Vec<EntityCatalogEntry> {
        let mut entries: Vec<_> = self
            .descriptions
            .values()
            .map(|description| EntityCatalogEntry {
                name: description.name().to_string(),
                table_name: description.table_name().to_string(),
                primary_key: description.primary_key().to_string(),
                created_column: description.created_column().to_string(),
                entity_type: description.entity_type().to_string(),
                relationships: description.relationships().into_iter().cloned().collect(),
            })
            .collect();
        entries.sort_by(|left, right| left.name.cmp(&right.name));
        entries
    }

    /// Checks every registered description against the live schema.
    ///
    /// Tables and columns named by descriptions and relationships must
    /// exist, relationship targets must be registered, and insert SQL must
    /// compile. The first problem found is returned.
    pub fn verify_schema(&self) -> RepoResult<()> {
        let started_at = Instant::now();
        let mut descriptions: Vec<_> = self.descriptions.values().collect();
        descriptions.sort_by(|left, right| left.name().cmp(right.name()));

        for description in descriptions {
            if let Err(err) = schema::verify_description(self, description) {
                error!(
                    "event=schema_verify module=context status=error entity={} duration_ms={} error={}",
                    description.name(),
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        }

        info!(
            "event=schema_verify module=context status=ok entities={} duration_ms={}",
            self.descriptions.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}
