use indexmap::IndexMap;
use serde_json::json;

use super::*;
use crate::model::{EntryMode, UnitToken};

fn sample_blocks() -> Vec<SemesterBlock> {
    let mut semesters = IndexMap::new();
    semesters.insert(
        "year1semester1".to_string(),
        vec![
            UnitToken::Code("ABB101".to_string()),
            UnitToken::QutYouElective,
        ],
    );
    semesters.insert("year1semester2".to_string(), Vec::new());

    vec![SemesterBlock {
        mode_entry: EntryMode {
            entry_time: "February".to_string(),
            mode: "Full Time".to_string(),
        },
        semesters,
    }]
}

#[test]
fn merge_preserves_existing_fields_and_adds_blocks() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("AB05.json");
    fs::write(
        &path,
        r#"{"course_code": "AB05", "course_name": "X", "highlights": ["a", "b"]}"#,
    )
    .expect("seed record");

    merge_into_record(&path, None, &sample_blocks()).expect("merge");

    let merged: Value = serde_json::from_slice(&fs::read(&path).expect("read")).expect("json");
    assert_eq!(merged["course_code"], "AB05");
    assert_eq!(merged["course_name"], "X");
    assert_eq!(merged["highlights"], json!(["a", "b"]));
    assert_eq!(
        merged[SEMESTER_BLOCKS_FIELD],
        json!([{
            "mode_entry": {"entry_time": "February", "mode": "Full Time"},
            "semesters": {
                "year1semester1": ["ABB101", "Select one QUT You unit"],
                "year1semester2": []
            }
        }])
    );

    let keys = merged
        .as_object()
        .expect("object")
        .keys()
        .cloned()
        .collect::<Vec<String>>();
    assert_eq!(
        keys,
        vec!["course_code", "course_name", "highlights", SEMESTER_BLOCKS_FIELD]
    );
}

#[test]
fn merge_twice_is_byte_identical() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("AB05.json");
    fs::write(&path, r#"{"course_code": "AB05", "semester_blocks": [], "atar_rank": 70.05}"#)
        .expect("seed record");

    merge_into_record(&path, None, &sample_blocks()).expect("first merge");
    let first = fs::read(&path).expect("read first");
    merge_into_record(&path, None, &sample_blocks()).expect("second merge");
    let second = fs::read(&path).expect("read second");

    assert_eq!(first, second);
}

#[test]
fn merge_writes_to_alternate_output_and_leaves_source_untouched() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("AB05.json");
    let output = dir.path().join("out").join("AB05.json");
    let original = r#"{"course_code": "AB05"}"#;
    fs::write(&path, original).expect("seed record");

    let written = merge_into_record(&path, Some(&output), &sample_blocks()).expect("merge");

    assert_eq!(written, output);
    assert_eq!(fs::read_to_string(&path).expect("read source"), original);
    let merged: Value =
        serde_json::from_slice(&fs::read(&output).expect("read output")).expect("json");
    assert!(merged[SEMESTER_BLOCKS_FIELD].is_array());
}

#[test]
fn missing_record_is_fatal() {
    let dir = tempfile::tempdir().expect("temp dir");
    let error = merge_into_record(&dir.path().join("AB05.json"), None, &sample_blocks())
        .expect_err("missing record must fail");
    assert!(matches!(error, PipelineError::RecordNotFound { .. }));
}

#[test]
fn malformed_record_is_fatal_and_left_alone() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("AB05.json");
    fs::write(&path, "{\"course_code\": ").expect("seed record");

    let error = merge_into_record(&path, None, &sample_blocks()).expect_err("must fail");
    assert!(matches!(error, PipelineError::MalformedRecord { .. }));
    assert_eq!(fs::read_to_string(&path).expect("read"), "{\"course_code\": ");
}

#[test]
fn non_object_record_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("AB05.json");
    fs::write(&path, "[1, 2]").expect("seed record");

    let error = load_record(&path).expect_err("array must fail");
    assert!(matches!(error, PipelineError::RecordNotObject { .. }));
}

#[test]
fn merge_unit_codes_unions_sorts_and_flattens_legacy_entries() {
    let mut catalog = json!({
        "unitCodes": [{"unitCode": "CAB201"}, "ABB101"],
        "source": "crawl"
    })
    .as_object()
    .cloned()
    .expect("object");

    let added = merge_unit_codes(
        &mut catalog,
        &["IFB104".to_string(), "ABB101".to_string()],
    );

    assert_eq!(added, 1);
    assert_eq!(catalog["unitCodes"], json!(["ABB101", "CAB201", "IFB104"]));
    assert_eq!(catalog["source"], "crawl");
}

#[test]
fn missing_unit_catalog_starts_empty() {
    let dir = tempfile::tempdir().expect("temp dir");
    let catalog = load_unit_catalog(&dir.path().join("units.json")).expect("load");
    assert!(catalog.is_empty());
}

#[test]
fn update_unit_catalog_writes_shared_and_per_course_lists() {
    let dir = tempfile::tempdir().expect("temp dir");
    let shared = dir.path().join("units.json");
    let per_course = dir.path().join("course_to_unit").join("AB05.json");
    fs::write(&shared, r#"{"unitCodes": ["CAB201"]}"#).expect("seed catalogue");
    let codes = vec!["ABB102".to_string(), "ABB101".to_string()];

    assert_eq!(update_unit_catalog(&shared, &codes).expect("shared"), 2);
    assert_eq!(update_unit_catalog(&per_course, &codes).expect("per course"), 2);
    assert_eq!(update_unit_catalog(&per_course, &codes).expect("rerun"), 0);

    let shared: Value =
        serde_json::from_slice(&fs::read(&shared).expect("read shared")).expect("json");
    let per_course: Value =
        serde_json::from_slice(&fs::read(&per_course).expect("read per course")).expect("json");
    assert_eq!(shared, json!({"unitCodes": ["ABB101", "ABB102", "CAB201"]}));
    assert_eq!(per_course, json!({"unitCodes": ["ABB101", "ABB102"]}));
}
