mod common;

use bccdata_core::{DatabaseContext, EntityDescription, EntityRelationship, RepoError};
use common::{fixture_context, lists_description, placemarks_description, List};

#[test]
fn registered_description_resolves_with_same_metadata_and_context() {
    let context = fixture_context();

    let lists = context.entity_description_for_name("lists").unwrap();
    assert_eq!(lists.name(), "lists");
    assert_eq!(lists.table_name(), "lists");
    assert_eq!(lists.primary_key(), "id");
    assert_eq!(lists.context_id(), Some(context.id()));
    assert_eq!(lists.relationships(), lists_description().relationships());
}

#[test]
fn unregistered_name_is_absent_and_has_no_handle() {
    let context = fixture_context();

    assert!(context.entity_description_for_name("tracks").is_none());
    assert!(matches!(
        context.entity("tracks"),
        Err(RepoError::UnknownEntity(name)) if name == "tracks"
    ));
}

#[test]
fn registering_same_name_twice_keeps_last_registration() {
    let mut context = DatabaseContext::open_in_memory().unwrap();
    context.register_entity_description(lists_description());
    context.register_entity_description(EntityDescription::new::<List>(
        "lists",
        "archived_lists",
        "list_id",
        "INSERT INTO archived_lists (name) VALUES (?1)",
    ));

    assert_eq!(context.len(), 1);
    let lists = context.entity_description_for_name("lists").unwrap();
    assert_eq!(lists.table_name(), "archived_lists");
    assert_eq!(lists.primary_key(), "list_id");
    assert!(lists.relationship_for_name("placemarks").is_none());
}

#[test]
fn relationship_lookup_returns_registered_relationship_unchanged() {
    let relationship =
        EntityRelationship::new("placemarks", "lists_placemarks", "placemarksID", "id");
    let mut description = EntityDescription::new::<List>(
        "lists",
        "lists",
        "id",
        "INSERT INTO lists (name, kind) VALUES (?1, ?2)",
    );
    description.register_relationship(relationship.clone());

    let mut context = DatabaseContext::open_in_memory().unwrap();
    context.register_entity_description(description);

    let lists = context.entity_description_for_name("lists").unwrap();
    assert_eq!(lists.relationship_for_name("placemarks"), Some(&relationship));
    assert!(lists.relationship_for_name("tracks").is_none());
}

#[test]
fn each_context_stamps_its_own_id() {
    let mut first = DatabaseContext::open_in_memory().unwrap();
    let mut second = DatabaseContext::open_in_memory().unwrap();
    first.register_entity_description(placemarks_description());
    second.register_entity_description(placemarks_description());

    assert_ne!(first.id(), second.id());
    assert_eq!(
        first.entity_description_for_name("placemarks").unwrap().context_id(),
        Some(first.id())
    );
    assert_eq!(
        second.entity_description_for_name("placemarks").unwrap().context_id(),
        Some(second.id())
    );
}

#[test]
fn catalog_is_sorted_and_serializable() {
    let context = fixture_context();

    let catalog = context.catalog();
    let names: Vec<_> = catalog.iter().map(|entry| entry.name.as_str()).collect();
    assert_eq!(names, ["lists", "placemarks"]);
    assert_eq!(catalog[0].relationships.len(), 1);
    assert!(catalog[1].entity_type.ends_with("Placemark"));

    let json = serde_json::to_value(&catalog).unwrap();
    assert_eq!(json[0]["relationships"][0]["join_table_name"], "lists_placemarks");
    assert_eq!(json[1]["created_column"], "createdDate");
}
