//! Mapping metadata and the per-type materialization contract.
//!
//! # Responsibility
//! - Describe tables, key columns and join-table relationships.
//! - Define the `Entity` capability the CRUD engine is generic over.
//!
//! # Invariants
//! - Descriptions are plain values until registered into a context, which
//!   stamps their `context_id`.

pub mod description;
pub mod entity;
