//! Metadata-driven relational mapping over SQLite.
//!
//! Callers describe tables with `EntityDescription`s, register them into a
//! `DatabaseContext`, and run create / find / find-related through the
//! `EntityRepository` handle returned by `DatabaseContext::entity`.

pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use context::{DatabaseContext, EntityCatalogEntry};
pub use db::{ContextConfig, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::description::{
    ContextId, EntityDescription, EntityRelationship, DEFAULT_CREATED_COLUMN,
};
pub use model::entity::Entity;
pub use repo::entity_repo::EntityRepository;
pub use repo::{RepoError, RepoResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
