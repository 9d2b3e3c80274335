#![allow(dead_code)]

use bccdata_core::{DatabaseContext, Entity, EntityDescription, EntityRelationship};
use rusqlite::{params, Connection, Row};

pub const SCHEMA_SQL: &str = "
CREATE TABLE lists (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    kind TEXT NOT NULL DEFAULT 'personal',
    createdDate INTEGER
);
CREATE TABLE placemarks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    createdDate INTEGER
);
CREATE TABLE lists_placemarks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    listsID INTEGER NOT NULL,
    placemarksID INTEGER NOT NULL
);
CREATE TABLE labels (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    text TEXT NOT NULL
);";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct List {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub created_date: Option<i64>,
}

impl Entity for List {
    fn blank() -> Self {
        Self::default()
    }

    fn populate(&mut self, row: &Row<'_>) -> rusqlite::Result<()> {
        self.id = row.get("id")?;
        self.name = row.get("name")?;
        self.kind = row.get("kind")?;
        self.created_date = row.get("createdDate")?;
        Ok(())
    }
}

/// Nullable throughout: related lookups can hand it all-NULL join rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placemark {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub created_date: Option<i64>,
}

impl Entity for Placemark {
    fn blank() -> Self {
        Self::default()
    }

    fn populate(&mut self, row: &Row<'_>) -> rusqlite::Result<()> {
        self.id = row.get("id")?;
        self.title = row.get("title")?;
        self.created_date = row.get("createdDate")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Label {
    pub id: i64,
    pub text: String,
}

impl Entity for Label {
    fn blank() -> Self {
        Self::default()
    }

    fn populate(&mut self, row: &Row<'_>) -> rusqlite::Result<()> {
        self.id = row.get("id")?;
        self.text = row.get("text")?;
        Ok(())
    }
}

pub fn lists_description() -> EntityDescription {
    EntityDescription::new::<List>(
        "lists",
        "lists",
        "id",
        "INSERT INTO lists (name, kind) VALUES (?1, ?2)",
    )
    .with_relationship(EntityRelationship::new(
        "placemarks",
        "lists_placemarks",
        "placemarksID",
        "id",
    ))
}

pub fn placemarks_description() -> EntityDescription {
    EntityDescription::new::<Placemark>(
        "placemarks",
        "placemarks",
        "id",
        "INSERT INTO placemarks (title) VALUES (?1)",
    )
}

/// `labels` has no created column, so creating one always fails mid-way.
pub fn labels_description() -> EntityDescription {
    EntityDescription::new::<Label>(
        "labels",
        "labels",
        "id",
        "INSERT INTO labels (text) VALUES (?1)",
    )
}

/// In-memory context with the fixture schema plus `lists` and `placemarks`.
pub fn fixture_context() -> DatabaseContext {
    let mut context = DatabaseContext::open_in_memory().unwrap();
    context.connection().execute_batch(SCHEMA_SQL).unwrap();
    context.register_entity_description(lists_description());
    context.register_entity_description(placemarks_description());
    context
}

pub fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

pub fn insert_placemark(conn: &Connection, id: i64, title: &str) {
    conn.execute(
        "INSERT INTO placemarks (id, title) VALUES (?1, ?2);",
        params![id, title],
    )
    .unwrap();
}

pub fn link(conn: &Connection, list_id: i64, placemark_id: i64) {
    conn.execute(
        "INSERT INTO lists_placemarks (listsID, placemarksID) VALUES (?1, ?2);",
        params![list_id, placemark_id],
    )
    .unwrap();
}
