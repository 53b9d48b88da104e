mod common;

use pretty_assertions::assert_eq;
use serde_json::json;
use treedex_mapper::{
    CowDriver, CowNode, FieldValue, IndexedTreeMapper, MapperConfig, MapperError, MutableDriver,
    MutableNode, Path, PersistentDriver, Selector, TreeNode,
};

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn defaults_apply_to_missing_fields() {
    let config = MapperConfig::from_json_str("{}").unwrap();
    assert_eq!(config, MapperConfig::default());
    assert_eq!(config.primary_key, "id");
    assert!(config.index_keys.is_empty());
    assert!(config.tables.is_none());
}

#[test]
fn parses_every_field() {
    let config = MapperConfig::from_json_str(
        r#"{"index_keys": ["name"], "tables": ["people"], "primary_key": "uid"}"#,
    )
    .unwrap();
    assert_eq!(
        config,
        MapperConfig::new()
            .with_index_keys(["name"])
            .with_tables(["people"])
            .with_primary_key("uid")
    );
}

#[test]
fn malformed_config_is_an_error() {
    let err = MapperConfig::from_json_str(r#"{"index_keys": "name"}"#).unwrap_err();
    assert!(matches!(err, MapperError::Config(_)));
    assert!(err.to_string().starts_with("invalid mapper configuration"));
}

// ── Applying ─────────────────────────────────────────────────────

#[test]
fn tables_limit_what_is_indexed() {
    common::init_tracing();
    let config = MapperConfig::new().with_tables(["people"]);
    let mapper = IndexedTreeMapper::with_config(CowDriver::from_json(common::sample_tree()), config)
        .unwrap();

    assert!(mapper.get("people", 1).unwrap().is_some());
    assert!(matches!(
        mapper.get("todos", 12).unwrap_err(),
        MapperError::TableNotFound { .. }
    ));
    // Unindexed tables are still reachable as containers.
    assert!(mapper.get_table("todos").is_some());
}

#[test]
fn add_to_unindexed_table_checks_existing_entities() {
    common::init_tracing();
    let config = MapperConfig::new().with_index_keys(["name"]).with_tables(["todos"]);
    let mut mapper =
        IndexedTreeMapper::with_config(CowDriver::from_json(common::sample_tree()), config)
            .unwrap();
    let before = mapper.to_json();

    let err = mapper
        .add("people", CowNode::from(json!({"id": 1, "name": "dup"})))
        .unwrap_err();
    assert!(matches!(
        err,
        MapperError::DuplicatePrimaryKey { ref table, .. } if table == "people"
    ));
    assert_eq!(mapper.to_json(), before);
    assert!(!mapper.index().contains_table("people"));
}

#[test]
fn add_to_unindexed_table_indexes_whole_table() {
    common::init_tracing();
    let config = MapperConfig::new().with_index_keys(["name"]).with_tables(["todos"]);
    let mut mapper =
        IndexedTreeMapper::with_config(MutableDriver::from_json(common::sample_tree()), config)
            .unwrap();

    mapper
        .add("people", MutableNode::from(json!({"id": 3, "name": "y"})))
        .unwrap();

    assert_eq!(
        mapper.paths_by_selector("people", 2).unwrap(),
        vec![Path::table("people").index(1)]
    );
    assert_eq!(
        mapper.paths_by_selector("people", 3).unwrap(),
        vec![Path::table("people").index(2)]
    );
    let vojta = mapper.get_first_by("people", Selector::by("name", "vojta")).unwrap();
    assert_eq!(vojta.unwrap().field_value("id"), Some(FieldValue::from(1)));
}

#[test]
fn custom_primary_key() {
    common::init_tracing();
    let driver = PersistentDriver::from_json(json!({
        "users": [{"uid": "a1", "email": "a@x"}, {"uid": "b2", "email": "b@x"}]
    }));
    let config = MapperConfig::new()
        .with_index_keys(["email"])
        .with_primary_key("uid");
    let mapper = IndexedTreeMapper::with_config(driver, config).unwrap();

    assert_eq!(mapper.primary_key(), "uid");
    assert_eq!(mapper.index_keys(), ["email".to_string(), "uid".to_string()]);
    let user = mapper.get("users", "b2").unwrap().unwrap();
    assert_eq!(user.to_json(), json!({"uid": "b2", "email": "b@x"}));
    let by_email = mapper.get_first_by("users", Selector::by("email", "a@x")).unwrap();
    assert_eq!(
        by_email.map(|u| u.to_json()),
        Some(json!({"uid": "a1", "email": "a@x"}))
    );
}

#[test]
fn default_mapper_indexes_only_the_key() {
    common::init_tracing();
    let mapper = IndexedTreeMapper::new(CowDriver::from_json(common::sample_tree())).unwrap();
    assert_eq!(mapper.index_keys(), ["id".to_string()]);
    assert!(matches!(
        mapper.get_by("people", Selector::by("name", "vojta")).unwrap_err(),
        MapperError::FieldNotIndexed { .. }
    ));
}

// ── Construction failures ────────────────────────────────────────

#[test]
fn duplicate_keys_fail_construction() {
    common::init_tracing();
    let driver = CowDriver::from_json(json!({"people": [{"id": 1}, {"id": 1.0}]}));
    let err = IndexedTreeMapper::new(driver).unwrap_err();
    match err {
        MapperError::DuplicatePrimaryKey {
            table,
            field,
            value,
        } => {
            assert_eq!(table, "people");
            assert_eq!(field, "id");
            assert_eq!(value, FieldValue::from(1));
        }
        other => panic!("expected DuplicatePrimaryKey, got {other:?}"),
    }
}

#[test]
fn missing_key_fails_construction() {
    common::init_tracing();
    let driver = CowDriver::from_json(json!({"people": [{"id": 1}, {"name": "anon"}]}));
    let err = IndexedTreeMapper::new(driver).unwrap_err();
    assert_eq!(
        err.to_string(),
        "entity in table 'people' has no value for primary key 'id'"
    );
}

#[test]
fn non_list_table_is_indexed_empty() {
    common::init_tracing();
    let driver = CowDriver::from_json(json!({"settings": {"theme": "dark"}, "people": [{"id": 1}]}));
    let mapper = IndexedTreeMapper::new(driver).unwrap();
    assert!(mapper.get("settings", "theme").unwrap().is_none());
    assert!(mapper.index().table("settings").is_some());
}

#[test]
fn key_mutation_message_names_both_values() {
    let mut mapper = common::cow_mapper();
    let err = mapper
        .update("people", 1, treedex_mapper::CowNode::from(json!({"name": "no key"})))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot change primary key 'id' in table 'people' from '1' to '<none>'"
    );
}
