//! Row materialization contract for mapped types.

use rusqlite::{Row, Rows};

/// A value that can be built blank and then filled from one result row.
///
/// The CRUD engine never inspects concrete entity types: it asks the
/// registered factory for a blank instance and lets the implementation read
/// its own columns.
///
/// Rows produced by `find_related_entities` come from a left outer join, so a
/// join row whose target is missing arrives with every target column NULL.
/// Implementations that can meet such rows should read nullable columns as
/// `Option`.
pub trait Entity: Sized + 'static {
    /// Returns a zero-valued instance ready to receive `populate`.
    fn blank() -> Self;

    /// Copies the columns of `row` into `self`.
    fn populate(&mut self, row: &Row<'_>) -> rusqlite::Result<()>;

    /// Advances `rows` by one and populates `self` from it.
    ///
    /// Returns `Ok(false)` when the cursor is exhausted, `Ok(true)` when a row
    /// was consumed, and an error when the step or the scan failed.
    fn scan_from_rows(&mut self, rows: &mut Rows<'_>) -> rusqlite::Result<bool> {
        match rows.next()? {
            Some(row) => {
                self.populate(row)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
