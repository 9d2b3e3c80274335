//! Entity descriptions and join-table relationships.
//!
//! # Responsibility
//! - Bind a logical entity name to its table, key column and insert SQL.
//! - Keep the outgoing relationships of one entity keyed by target name.
//! - Hold the factory used to materialize rows into the mapped type.
//!
//! # Invariants
//! - At most one relationship per target entity name; last registration wins.
//! - `context_id` is `None` until the description is registered into a
//!   `DatabaseContext`.

use crate::model::entity::Entity;
use crate::repo::{RepoError, RepoResult};
use rusqlite::Rows;
use serde::{Deserialize, Serialize};
use std::any::{type_name, Any};
use std::collections::HashMap;
use uuid::Uuid;

/// Identity of the `DatabaseContext` a description is registered into.
pub type ContextId = Uuid;

/// Column stamped with the creation time by `create`.
pub const DEFAULT_CREATED_COLUMN: &str = "createdDate";

/// Many-to-many edge from one entity to `entity_name` through a join table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRelationship {
    /// Registered name of the target entity.
    pub entity_name: String,
    pub join_table_name: String,
    /// Join-table column matched against the target's `target_key`.
    pub foreign_key: String,
    /// Target-table column the join rows point at, usually its primary key.
    pub target_key: String,
}

impl EntityRelationship {
    pub fn new(
        entity_name: impl Into<String>,
        join_table_name: impl Into<String>,
        foreign_key: impl Into<String>,
        target_key: impl Into<String>,
    ) -> Self {
        Self {
            entity_name: entity_name.into(),
            join_table_name: join_table_name.into(),
            foreign_key: foreign_key.into(),
            target_key: target_key.into(),
        }
    }
}

/// Metadata for one mapped table.
#[derive(Debug, Clone)]
pub struct EntityDescription {
    name: String,
    table_name: String,
    primary_key: String,
    insert_sql: String,
    created_column: String,
    relationships: HashMap<String, EntityRelationship>,
    factory: fn() -> Box<dyn Any>,
    entity_type: &'static str,
    context_id: Option<ContextId>,
}

impl EntityDescription {
    /// Creates a description whose rows materialize as `E`.
    ///
    /// `insert_sql` is compiled once per connection through the statement
    /// cache and reused by every `create` call.
    pub fn new<E: Entity>(
        name: impl Into<String>,
        table_name: impl Into<String>,
        primary_key: impl Into<String>,
        insert_sql: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            primary_key: primary_key.into(),
            insert_sql: insert_sql.into(),
            created_column: DEFAULT_CREATED_COLUMN.to_string(),
            relationships: HashMap::new(),
            factory: blank_instance::<E>,
            entity_type: type_name::<E>(),
            context_id: None,
        }
    }

    /// Overrides the column stamped with the creation time.
    pub fn with_created_column(mut self, column: impl Into<String>) -> Self {
        self.created_column = column.into();
        self
    }

    /// Adds a relationship, replacing any previous one for the same target.
    pub fn register_relationship(&mut self, relationship: EntityRelationship) {
        self.relationships
            .insert(relationship.entity_name.clone(), relationship);
    }

    /// Builder form of `register_relationship`.
    pub fn with_relationship(mut self, relationship: EntityRelationship) -> Self {
        self.register_relationship(relationship);
        self
    }

    pub fn relationship_for_name(&self, entity_name: &str) -> Option<&EntityRelationship> {
        self.relationships.get(entity_name)
    }

    /// Returns relationships sorted by target entity name.
    pub fn relationships(&self) -> Vec<&EntityRelationship> {
        let mut relationships: Vec<_> = self.relationships.values().collect();
        relationships.sort_by(|left, right| left.entity_name.cmp(&right.entity_name));
        relationships
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn insert_sql(&self) -> &str {
        &self.insert_sql
    }

    pub fn created_column(&self) -> &str {
        &self.created_column
    }

    /// Rust type name of the mapped entity.
    pub fn entity_type(&self) -> &'static str {
        self.entity_type
    }

    pub fn context_id(&self) -> Option<ContextId> {
        self.context_id
    }

    pub(crate) fn attach_to(&mut self, context_id: ContextId) {
        self.context_id = Some(context_id);
    }

    /// Runs the factory and returns a blank `E`.
    ///
    /// Fails with `EntityTypeMismatch` when `E` is not the type this
    /// description was created for.
    pub fn instantiate<E: Entity>(&self) -> RepoResult<E> {
        (self.factory)()
            .downcast::<E>()
            .map(|entity| *entity)
            .map_err(|_| RepoError::EntityTypeMismatch {
                entity: self.name.clone(),
                expected: self.entity_type,
                requested: type_name::<E>(),
            })
    }

    /// Drains `rows`, producing one entity per row in arrival order.
    pub fn create_from_rows<E: Entity>(&self, rows: &mut Rows<'_>) -> RepoResult<Vec<E>> {
        let mut entities = Vec::new();
        loop {
            let mut entity = self.instantiate::<E>()?;
            if !entity.scan_from_rows(rows)? {
                break;
            }
            entities.push(entity);
        }
        Ok(entities)
    }
}

fn blank_instance<E: Entity>() -> Box<dyn Any> {
    Box::new(E::blank())
}
