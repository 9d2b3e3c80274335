//! Opt-in check that registered metadata matches the live schema.

use crate::context::DatabaseContext;
use crate::model::description::EntityDescription;
use crate::repo::{RepoError, RepoResult};
use rusqlite::Connection;

pub(crate) fn verify_description(
    context: &DatabaseContext,
    description: &EntityDescription,
) -> RepoResult<()> {
    let conn = context.connection();
    let table = description.table_name();
    require_table(conn, table)?;
    require_column(conn, table, description.primary_key())?;
    require_column(conn, table, description.created_column())?;

    // Compiles the insert once and leaves it in the statement cache for create.
    conn.prepare_cached(description.insert_sql())?;

    for relationship in description.relationships() {
        let target = context
            .entity_description_for_name(&relationship.entity_name)
            .ok_or_else(|| RepoError::UnknownEntity(relationship.entity_name.clone()))?;
        require_table(conn, &relationship.join_table_name)?;
        require_column(conn, &relationship.join_table_name, &relationship.foreign_key)?;
        require_column(conn, target.table_name(), &relationship.target_key)?;
    }

    Ok(())
}

fn require_table(conn: &Connection, table: &str) -> RepoResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type IN ('table', 'view') AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if exists == 1 {
        Ok(())
    } else {
        Err(RepoError::MissingRequiredTable(table.to_string()))
    }
}

fn require_column(conn: &Connection, table: &str, column: &str) -> RepoResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let mut rows = stmt.query([table])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(0)?;
        if current.eq_ignore_ascii_case(column) {
            return Ok(());
        }
    }
    Err(RepoError::MissingRequiredColumn {
        table: table.to_string(),
        column: column.to_string(),
    })
}
