//! SQL text builders for the generic CRUD statements.

use crate::model::description::EntityRelationship;
use crate::repo::{RepoError, RepoResult};
use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// Rejects anything that is not a bare SQL identifier.
pub fn validate_identifier(value: &str) -> RepoResult<&str> {
    if IDENTIFIER_RE.is_match(value) {
        Ok(value)
    } else {
        Err(RepoError::InvalidIdentifier(value.to_string()))
    }
}

/// `SELECT * FROM <table> WHERE <column>=?1`
pub fn select_by_column(table: &str, column: &str) -> RepoResult<String> {
    Ok(format!(
        "SELECT * FROM {} WHERE {}=?1",
        validate_identifier(table)?,
        validate_identifier(column)?
    ))
}

/// `UPDATE <table> SET <created_column>=?1 WHERE <primary_key>=?2`
pub fn stamp_created(table: &str, created_column: &str, primary_key: &str) -> RepoResult<String> {
    Ok(format!(
        "UPDATE {} SET {}=?1 WHERE {}=?2",
        validate_identifier(table)?,
        validate_identifier(created_column)?,
        validate_identifier(primary_key)?
    ))
}

/// Left outer join from the relationship's join table to `target_table`,
/// filtered on `<join_table>.<query_key>=?1`.
pub fn select_related(
    relationship: &EntityRelationship,
    target_table: &str,
    query_key: &str,
) -> RepoResult<String> {
    let join = validate_identifier(&relationship.join_table_name)?;
    let foreign_key = validate_identifier(&relationship.foreign_key)?;
    let target_key = validate_identifier(&relationship.target_key)?;
    let target = validate_identifier(target_table)?;
    let query_key = validate_identifier(query_key)?;

    Ok(format!(
        "SELECT {target}.* FROM {join} LEFT OUTER JOIN {target} \
         ON {join}.{foreign_key}={target}.{target_key} \
         WHERE {join}.{query_key}=?1"
    ))
}
