//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `bccdata_core` linkage end to end against an in-memory database.
//! - Route the core `event=...` records through the configured file logger.
//! - Keep output deterministic for quick local sanity checks.

use bccdata_core::{
    default_log_level, init_logging, DatabaseContext, Entity, EntityDescription,
    EntityRelationship, LoggingConfig, RepoResult,
};
use rusqlite::{params, Row};
use std::path::PathBuf;
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "BCCDATA_LOG_DIR";

const SCHEMA_SQL: &str = "
CREATE TABLE lists (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, createdDate INTEGER);
CREATE TABLE placemarks (id INTEGER PRIMARY KEY AUTOINCREMENT, title TEXT NOT NULL, createdDate INTEGER);
CREATE TABLE lists_placemarks (id INTEGER PRIMARY KEY AUTOINCREMENT, listsID INTEGER NOT NULL, placemarksID INTEGER NOT NULL);";

#[derive(Debug, Default)]
struct List {
    id: i64,
    name: String,
}

impl Entity for List {
    fn blank() -> Self {
        Self::default()
    }

    fn populate(&mut self, row: &Row<'_>) -> rusqlite::Result<()> {
        self.id = row.get("id")?;
        self.name = row.get("name")?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Placemark {
    id: Option<i64>,
    title: Option<String>,
}

impl Entity for Placemark {
    fn blank() -> Self {
        Self::default()
    }

    fn populate(&mut self, row: &Row<'_>) -> rusqlite::Result<()> {
        self.id = row.get("id")?;
        self.title = row.get("title")?;
        Ok(())
    }
}

fn main() -> ExitCode {
    println!("bccdata_core version={}", bccdata_core::core_version());
    let log_config = LoggingConfig::new(default_log_level(), log_dir());
    match init_logging(&log_config) {
        Ok(()) => println!("logging dir={}", log_config.log_dir.display()),
        Err(err) => eprintln!("logging disabled: {err}"),
    }

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("bccdata smoke failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn log_dir() -> PathBuf {
    std::env::var_os(LOG_DIR_ENV)
        .map(PathBuf::from)
        .filter(|dir| dir.is_absolute())
        .unwrap_or_else(|| std::env::temp_dir().join("bccdata-cli-logs"))
}

fn run() -> RepoResult<()> {
    let mut context = DatabaseContext::open_in_memory()?;
    context.connection().execute_batch(SCHEMA_SQL)?;
    context.register_entity_description(
        EntityDescription::new::<List>(
            "lists",
            "lists",
            "id",
            "INSERT INTO lists (name) VALUES (?1)",
        )
        .with_relationship(EntityRelationship::new(
            "placemarks",
            "lists_placemarks",
            "placemarksID",
            "id",
        )),
    );
    context.register_entity_description(EntityDescription::new::<Placemark>(
        "placemarks",
        "placemarks",
        "id",
        "INSERT INTO placemarks (title) VALUES (?1)",
    ));
    context.verify_schema()?;

    let lists = context.entity("lists")?;
    let placemarks = context.entity("placemarks")?;

    let tx = context.begin()?;
    let list: List = lists.create(Some(&tx), ["coast"])?;
    for title in ["harbor", "lighthouse"] {
        let placemark: Placemark = placemarks.create(Some(&tx), [title])?;
        tx.execute(
            "INSERT INTO lists_placemarks (listsID, placemarksID) VALUES (?1, ?2);",
            params![list.id, placemark.id],
        )?;
    }
    tx.commit()?;

    let found: Option<List> = lists.find_entity(None, None, list.id)?;
    println!(
        "find lists id={} name={}",
        list.id,
        found.map_or_else(|| "<none>".to_string(), |list| list.name)
    );

    let related: Vec<Placemark> =
        lists.find_related_entities(None, "placemarks", "listsID", list.id)?;
    for placemark in related {
        println!(
            "related placemarks id={} title={}",
            placemark.id.unwrap_or_default(),
            placemark.title.unwrap_or_default()
        );
    }

    Ok(())
}
