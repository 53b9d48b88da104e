use pretty_assertions::assert_eq;
use serde_json::json;
use treedex_driver::{CowDriver, MutableDriver, MutableNode, TreeDriver, TreeNode};
use treedex_index::{build_table_index, ensure_primary_key, table_records, IndexError};
use treedex_types::{FieldValue, Path};

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn people() -> MutableDriver {
    MutableDriver::from_json(json!({
        "people": [
            {"id": 1, "name": "vojta"},
            {"id": 2, "name": "honza"},
            {"id": 3, "name": "vojta"}
        ],
        "settings": {"theme": "dark"}
    }))
}

// ── Primary key handling ─────────────────────────────────────────

#[test]
fn ensure_primary_key_appends_once() {
    let mut index_keys = keys(&["name"]);
    ensure_primary_key(&mut index_keys, "id");
    ensure_primary_key(&mut index_keys, "id");
    assert_eq!(index_keys, keys(&["name", "id"]));
}

#[test]
fn primary_key_is_always_indexed() {
    let driver = people();
    let records = table_records(&driver, "people");
    let index = build_table_index("people", &records, &[], "id").unwrap();

    assert!(index.is_indexed("id"));
    assert!(!index.is_indexed("name"));
    assert_eq!(
        index.paths("id", &FieldValue::from(2)),
        &[Path::table("people").index(1)]
    );
}

#[test]
fn missing_primary_key_fails() {
    let driver = MutableDriver::from_json(json!({"todos": [{"id": 1}, {"text": "no id"}]}));
    let records = table_records(&driver, "todos");
    let err = build_table_index("todos", &records, &[], "id").unwrap_err();
    assert_eq!(
        err,
        IndexError::MissingPrimaryKey {
            table: "todos".into(),
            field: "id".into()
        }
    );
}

#[test]
fn scalar_table_element_has_no_primary_key() {
    let driver = MutableDriver::from_json(json!({"todos": [{"id": 1}, 84]}));
    let records = table_records(&driver, "todos");
    assert!(matches!(
        build_table_index("todos", &records, &[], "id"),
        Err(IndexError::MissingPrimaryKey { .. })
    ));
}

#[test]
fn empty_or_null_primary_key_fails() {
    for bad in [json!(""), json!(null), json!({"nested": 1})] {
        let driver = MutableDriver::from_json(json!({"todos": [{"id": bad}]}));
        let records = table_records(&driver, "todos");
        assert!(matches!(
            build_table_index("todos", &records, &[], "id"),
            Err(IndexError::MissingPrimaryKey { .. })
        ));
    }
}

#[test]
fn duplicate_primary_key_fails() {
    let driver = MutableDriver::from_json(json!({"people": [{"id": 1}, {"id": "1"}]}));
    let records = table_records(&driver, "people");
    let err = build_table_index("people", &records, &[], "id").unwrap_err();
    assert_eq!(
        err,
        IndexError::DuplicatePrimaryKey {
            table: "people".into(),
            field: "id".into(),
            value: FieldValue::from(1)
        }
    );
}

#[test]
fn custom_primary_key_field() {
    let driver = MutableDriver::from_json(json!({"people": [{"uuid": "a"}, {"uuid": "b"}]}));
    let records = table_records(&driver, "people");
    let index = build_table_index("people", &records, &[], "uuid").unwrap();
    assert_eq!(
        index.paths("uuid", &"b".into()),
        &[Path::table("people").index(1)]
    );
}

// ── Secondary keys ───────────────────────────────────────────────

#[test]
fn secondary_key_collects_all_matches_in_order() {
    let driver = people();
    let records = table_records(&driver, "people");
    let index = build_table_index("people", &records, &keys(&["name"]), "id").unwrap();

    assert_eq!(
        index.paths("name", &"vojta".into()),
        &[Path::table("people").index(0), Path::table("people").index(2)]
    );
    assert!(index.paths("name", &"nobody".into()).is_empty());
}

#[test]
fn entities_without_secondary_field_are_skipped() {
    let driver = MutableDriver::from_json(json!({"people": [{"id": 1}, {"id": 2, "name": "x"}]}));
    let records = table_records(&driver, "people");
    let index = build_table_index("people", &records, &keys(&["name"]), "id").unwrap();
    assert_eq!(index.entries().filter(|(field, _, _)| *field == "name").count(), 1);
}

// ── Record sources ───────────────────────────────────────────────

#[test]
fn non_list_table_has_no_records() {
    let driver = people();
    assert!(table_records(&driver, "settings").is_empty());
    assert!(table_records(&driver, "missing").is_empty());
}

#[test]
fn registered_entities_replace_table_scan() {
    let mut driver = CowDriver::from_json(json!({
        "people": [{"id": 1, "children": [{"id": 10}, {"id": 11}]}]
    }));
    driver.register_entity("children", Path::table("people").index(0).key("children").index(1));

    let records = table_records(&driver, "children");
    let index = build_table_index("children", &records, &[], "id").unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(
        index.paths("id", &11.into()),
        &[Path::table("people").index(0).key("children").index(1)]
    );
    assert_eq!(table_records(&driver, "people").len(), 1);
}

#[test]
fn records_hold_table_entities() {
    let driver = people();
    let records = table_records(&driver, "people");
    let first: &MutableNode = &records[0].entity;
    assert!(first.same(&driver.get_in_path(&Path::table("people").index(0)).unwrap()));
}
