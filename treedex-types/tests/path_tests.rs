use pretty_assertions::assert_eq;
use treedex_types::{Path, Segment};

// ── Construction ─────────────────────────────────────────────────

#[test]
fn root_path_is_empty() {
    let path = Path::root();
    assert!(path.is_empty());
    assert_eq!(path.len(), 0);
    assert_eq!(path.table_name(), None);
}

#[test]
fn builder_appends_segments_in_order() {
    let path = Path::table("people").index(1).key("children").index(0);
    assert_eq!(
        path.segments(),
        &[
            Segment::Key("people".into()),
            Segment::Index(1),
            Segment::Key("children".into()),
            Segment::Index(0),
        ]
    );
    assert_eq!(path.table_name(), Some("people"));
}

#[test]
fn join_leaves_original_untouched() {
    let base = Path::table("todos");
    let joined = base.join(3usize);
    assert_eq!(base.len(), 1);
    assert_eq!(joined.last(), Some(&Segment::Index(3)));
}

#[test]
fn parent_drops_last_segment() {
    let path = Path::table("todos").index(2);
    assert_eq!(path.parent(), Some(Path::table("todos")));
    assert_eq!(Path::root().parent(), None);
}

#[test]
fn table_name_requires_leading_key() {
    let path: Path = vec![Segment::Index(0)].into();
    assert_eq!(path.table_name(), None);
}

// ── Ordering ─────────────────────────────────────────────────────

#[test]
fn later_list_positions_sort_higher() {
    let mut paths = vec![
        Path::table("people").index(0),
        Path::table("people").index(2),
        Path::table("people").index(1),
    ];
    paths.sort_by(|a, b| b.cmp(a));
    assert_eq!(
        paths,
        vec![
            Path::table("people").index(2),
            Path::table("people").index(1),
            Path::table("people").index(0),
        ]
    );
}

#[test]
fn descendants_sort_after_ancestors() {
    let parent = Path::table("people").index(1);
    let child = parent.clone().key("children").index(0);
    assert!(child > parent);
    assert!(child.starts_with(&parent));
    assert!(!parent.starts_with(&child));
}

// ── Display & serde ──────────────────────────────────────────────

#[test]
fn display_joins_with_dots() {
    let path = Path::table("people").index(1).key("children");
    assert_eq!(path.to_string(), "people.1.children");
    assert_eq!(Path::root().to_string(), "<root>");
}

#[test]
fn serializes_as_plain_array() {
    let path = Path::table("people").index(1);
    let json = serde_json::to_value(&path).unwrap();
    assert_eq!(json, serde_json::json!(["people", 1]));

    let back: Path = serde_json::from_value(json).unwrap();
    assert_eq!(back, path);
}
