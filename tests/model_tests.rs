mod common;

use architect_admin::{
    describe_from_sample, AppError, ColumnType, ConfigError, FieldSchema, Model, ModelRegistry, Record,
};
use common::{post, Post, ZenOfScreaming};
use rstest::rstest;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[test]
fn columns_follow_declaration_order_with_derived_names() {
    let model = Model::build::<ZenOfScreaming>().unwrap();
    assert_eq!(model.name(), "ZenOfScreaming");
    assert_eq!(model.table_name(), "zen");
    let names: Vec<(&str, &str, &str)> = model
        .columns()
        .iter()
        .map(|c| (c.field_name.as_str(), c.storage_name.as_str(), c.label.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![("userId", "user_id", "User Id"), ("displayName", "display_name", "Display Name")]
    );
    assert_eq!(model.primary_key().storage_name, "user_id");
    assert!(model.columns()[0].required);
    assert!(!model.columns()[1].required);
}

#[test]
fn relationships_are_excluded_from_sortable_default() {
    let model = Model::build::<Post>().unwrap();
    let names: Vec<&str> = model
        .columns_excluding_relationships()
        .iter()
        .map(|c| c.storage_name.as_str())
        .collect();
    assert_eq!(names, vec!["id", "title", "views", "draft"]);
}

#[test]
fn to_row_by_value_and_reference_is_identical() {
    let model = Model::build::<Post>().unwrap();
    let p = post(3, "hello", 10);
    let by_ref = model.to_row(&p).unwrap();
    let by_ref_ref = model.to_row(&&p).unwrap();
    let by_value = model.to_row(p.clone()).unwrap();
    assert_eq!(by_ref, by_value);
    assert_eq!(by_ref_ref, by_value);
    assert_eq!(
        serde_json::Value::Object(by_value),
        json!({"id": 3, "title": "hello", "views": 10, "draft": false, "tags": []})
    );
}

#[test]
fn to_row_rejects_other_record_types() {
    let model = Model::build::<Post>().unwrap();
    let other = ZenOfScreaming {
        user_id: "x".into(),
        display_name: None,
    };
    assert!(matches!(
        model.to_row(&other),
        Err(AppError::Config(ConfigError::ModelMismatch { .. }))
    ));
}

#[test]
fn from_row_round_trips_and_checks_type() {
    let model = Model::build::<Post>().unwrap();
    let p = post(1, "a", 2);
    let row = model.to_row(&p).unwrap();
    assert_eq!(model.from_row::<Post>(&row).unwrap(), p);
    assert!(model.from_row::<ZenOfScreaming>(&row).is_err());
}

#[test]
fn zero_values_fill_missing_columns() {
    let model = Model::build::<ZenOfScreaming>().unwrap();
    let row = model.empty_row();
    assert_eq!(row.get("user_id"), Some(&json!("")));
    assert_eq!(row.get("display_name"), Some(&json!(null)));
    let zen: ZenOfScreaming = model.new_instance().unwrap();
    assert_eq!(zen, ZenOfScreaming::default());
    assert!(model.new_slice::<ZenOfScreaming>().unwrap().is_empty());
    assert!(model.new_slice::<Post>().is_err());
}

#[test]
fn primary_key_value_reads_key_column() {
    let model = Model::build::<Post>().unwrap();
    let row = model.to_row(post(9, "x", 0)).unwrap();
    assert_eq!(model.primary_key_value(&row).unwrap(), &json!(9));
    let mut without = row.clone();
    without.remove("id");
    assert!(matches!(model.primary_key_value(&without), Err(AppError::BadRequest(_))));
}

#[derive(Serialize, Deserialize)]
struct NoKey {
    name: String,
}

impl Record for NoKey {
    fn table_name() -> &'static str {
        "no_key"
    }
    fn describe_columns() -> Vec<FieldSchema> {
        vec![FieldSchema::new("name", ColumnType::Text)]
    }
}

#[derive(Serialize, Deserialize)]
struct TwoKeys {
    a: i64,
    b: i64,
}

impl Record for TwoKeys {
    fn table_name() -> &'static str {
        "two_keys"
    }
    fn describe_columns() -> Vec<FieldSchema> {
        vec![
            FieldSchema::new("a", ColumnType::Integer).primary_key(),
            FieldSchema::new("b", ColumnType::Integer).primary_key(),
        ]
    }
}

#[derive(Serialize, Deserialize)]
struct Clash {
    user_id: i64,
    #[serde(rename = "userId")]
    user_id_camel: i64,
}

impl Record for Clash {
    fn table_name() -> &'static str {
        "clash"
    }
    fn describe_columns() -> Vec<FieldSchema> {
        vec![
            FieldSchema::new("user_id", ColumnType::Integer).primary_key(),
            FieldSchema::new("userId", ColumnType::Integer),
        ]
    }
}

#[test]
fn build_errors() {
    assert!(matches!(Model::build::<NoKey>(), Err(ConfigError::PrimaryKeyMissing { .. })));
    match Model::build::<TwoKeys>() {
        Err(ConfigError::CompositePrimaryKey { model, columns }) => {
            assert_eq!(model, "TwoKeys");
            assert_eq!(columns, "a, b");
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(matches!(Model::build::<Clash>(), Err(ConfigError::DuplicateColumn { .. })));
}

#[test]
fn registry_memoizes_per_type() {
    let registry = ModelRegistry::new();
    assert!(registry.is_empty());
    let first = registry.get_or_build::<Post>().unwrap();
    let second = registry.get_or_build::<Post>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    registry.get_or_build::<ZenOfScreaming>().unwrap();
    assert_eq!(registry.len(), 2);
    assert!(registry.get_or_build::<NoKey>().is_err());
    assert_eq!(registry.len(), 2);
}

#[test]
fn registry_first_insert_wins_across_threads() {
    let registry = Arc::new(ModelRegistry::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || registry.get_or_build::<Post>().unwrap())
        })
        .collect();
    let models: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let stored = registry.get::<Post>().unwrap();
    assert!(models.iter().all(|m| Arc::ptr_eq(m, &stored)));
}

#[rstest]
#[case(ColumnType::Integer, " 42 ", json!(42))]
#[case(ColumnType::Float, "1.5", json!(1.5))]
#[case(ColumnType::Bool, "on", json!(true))]
#[case(ColumnType::Bool, "0", json!(false))]
#[case(ColumnType::Text, " keep ", json!(" keep "))]
#[case(ColumnType::Date, "2024-02-29", json!("2024-02-29"))]
#[case(ColumnType::DateTime, "2024-01-02T03:04:05", json!("2024-01-02T03:04:05+00:00"))]
#[case(ColumnType::Json, "[1,2]", json!([1, 2]))]
fn parses_submitted_values(#[case] ty: ColumnType, #[case] raw: &str, #[case] expected: serde_json::Value) {
    assert_eq!(ty.parse_value(raw).unwrap(), expected);
}

#[rstest]
#[case(ColumnType::Integer, "4.2")]
#[case(ColumnType::Bool, "maybe")]
#[case(ColumnType::Uuid, "not-a-uuid")]
#[case(ColumnType::Date, "2023-02-30")]
fn rejects_malformed_values(#[case] ty: ColumnType, #[case] raw: &str) {
    assert!(ty.parse_value(raw).is_err());
}

#[test]
fn nullable_column_reads_blank_as_null() {
    let model = Model::build::<ZenOfScreaming>().unwrap();
    let display = model.column("display_name").unwrap();
    assert_eq!(display.parse_value("").unwrap(), json!(""));
    let key = model.column("user_id").unwrap();
    assert!(key.parse_value("").is_err());
}

#[derive(Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct Sampled {
    user_id: i64,
    score: f64,
    nickname: Option<String>,
    active: bool,
    friends: Vec<i64>,
}

#[test]
fn describe_from_sample_infers_types() {
    let sample = Sampled {
        score: 0.5,
        ..Sampled::default()
    };
    let fields = describe_from_sample(&sample, "userId");
    let summary: Vec<(&str, ColumnType, bool, bool, bool)> = fields
        .iter()
        .map(|f| (f.name.as_str(), f.column_type, f.primary_key, f.nullable, f.relationship))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("userId", ColumnType::Integer, true, false, false),
            ("score", ColumnType::Float, false, false, false),
            ("nickname", ColumnType::Text, false, true, false),
            ("active", ColumnType::Bool, false, false, false),
            ("friends", ColumnType::Json, false, false, true),
        ]
    );
}
