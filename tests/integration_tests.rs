use remap_lang::{
    DefinitionStore, Format, FunctionRegistry, MapError, Mapper, MemorySink, MemorySource,
    MemoryStore, TransformError, Transformation, Transformer, Value, wire,
};
use std::collections::HashMap;

fn json_object(pairs: Vec<(&str, Value)>) -> Value {
    let mut map = HashMap::new();
    for (k, v) in pairs {
        map.insert(k.to_string(), v);
    }
    Value::Object(map)
}

fn any_format() -> Format {
    Format::new(["name"], ["height"]).unwrap()
}

// ============================================================================
// Facade: text pipeline
// ============================================================================

#[test]
fn apply_json_to_json() {
    let transformer = Transformer::new(Transformation::record([
        ("title", Transformation::input("$.name")),
    ]));
    let out = transformer
        .apply(r#"{"name":"Eiffel Tower"}"#, "json", "json")
        .unwrap();
    assert_eq!(out, r#"{"title":"Eiffel Tower"}"#);
}

#[test]
fn apply_json_to_csv_flattens_rows() {
    let transformer = Transformer::new(Transformation::list_of(Transformation::record([
        ("name", Transformation::input("name")),
        ("height", Transformation::input("height")),
    ])));
    let input = r#"[{"name":"Eiffel Tower","height":330},{"name":"Louvre","height":21}]"#;
    let out = transformer.apply(input, "json", "csv").unwrap();
    assert_eq!(out, "height,name\n330,Eiffel Tower\n21,Louvre\n");
}

#[test]
fn apply_csv_to_json_yields_string_records() {
    let transformer = Transformer::new(Transformation::Identity);
    let out = transformer
        .apply("name\nLouvre\n", "csv", "json")
        .unwrap();
    assert_eq!(out, r#"[{"name":"Louvre"}]"#);
}

#[test]
fn apply_yaml_to_json() {
    let transformer = Transformer::new(Transformation::record([
        ("title", Transformation::input("$.name")),
    ]));
    let out = transformer.apply("name: Louvre\n", "yaml", "json").unwrap();
    assert_eq!(out, r#"{"title":"Louvre"}"#);
}

#[test]
fn format_names_are_case_insensitive() {
    let transformer = Transformer::new(Transformation::Identity);
    assert!(transformer.apply("1", "JSON", "Json").is_ok());
}

#[test]
fn unknown_input_format_is_reported() {
    let transformer = Transformer::new(Transformation::Identity);
    match transformer.apply("1", "xml", "json") {
        Err(TransformError::UnknownFormat(name)) => assert_eq!(name, "xml"),
        other => panic!("expected UnknownFormat, got {:?}", other),
    }
}

#[test]
fn unknown_output_format_is_reported() {
    let transformer = Transformer::new(Transformation::Identity);
    match transformer.apply("1", "json", "parquet") {
        Err(TransformError::UnknownFormat(name)) => assert_eq!(name, "parquet"),
        other => panic!("expected UnknownFormat, got {:?}", other),
    }
}

#[test]
fn malformed_input_is_reported_not_crashed() {
    let transformer = Transformer::new(Transformation::Identity);
    assert!(matches!(
        transformer.apply("{oops", "json", "json"),
        Err(TransformError::Codec(_))
    ));
}

#[test]
fn apply_value_skips_codecs() {
    let transformer = Transformer::new(Transformation::extension([(
        "c",
        Transformation::constant(3i64),
    )]));
    let input = json_object(vec![("a", Value::Integer(1))]);
    assert_eq!(
        transformer.apply_value(&input).unwrap(),
        json_object(vec![("a", Value::Integer(1)), ("c", Value::Integer(3))])
    );
}

#[test]
fn facade_uses_builtin_functions_by_default() {
    let transformer = Transformer::new(Transformation::record([(
        "label",
        Transformation::result_of(
            "concat",
            [
                Transformation::input("$.name"),
                Transformation::constant("!"),
            ],
        ),
    )]));
    let out = transformer
        .apply(r#"{"name":"Louvre"}"#, "json", "json")
        .unwrap();
    assert_eq!(out, r#"{"label":"Louvre!"}"#);
}

// ============================================================================
// Function registry
// ============================================================================

#[test]
fn last_registration_wins() {
    let mut registry = FunctionRegistry::new();
    registry.register("f", |_: &[Value]| Value::Integer(1));
    registry.register("f", |_: &[Value]| Value::Integer(2));
    let f = registry.lookup("f").unwrap();
    assert_eq!(f(&[]), Value::Integer(2));
}

#[test]
fn builtin_add_preserves_integers() {
    let registry = FunctionRegistry::with_builtins();
    let add = registry.lookup("add").unwrap();
    assert_eq!(
        add(&[Value::Integer(1), Value::Integer(2)]),
        Value::Integer(3)
    );
    // 1 + 1.5 + 0.5 is whole, so it comes back as an integer
    assert_eq!(
        add(&[Value::Integer(1), Value::Float(1.5), Value::Float(0.5)]),
        Value::Integer(3)
    );
    assert_eq!(
        add(&[Value::Integer(1), Value::Float(0.5)]),
        Value::Float(1.5)
    );
}

#[test]
fn builtin_sum_rejects_non_numeric_arrays() {
    let registry = FunctionRegistry::with_builtins();
    let sum = registry.lookup("sum").unwrap();
    assert_eq!(
        sum(&[Value::Array(vec![Value::Integer(1), Value::String("x".into())])]),
        Value::Null
    );
}

#[test]
fn builtin_matches_applies_regex() {
    let registry = FunctionRegistry::with_builtins();
    let matches = registry.lookup("matches").unwrap();
    assert_eq!(
        matches(&[
            Value::String("remap-0.3".into()),
            Value::String(r"^\w+-\d+\.\d+$".into())
        ]),
        Value::Boolean(true)
    );
    assert_eq!(
        matches(&[Value::String("nope".into()), Value::String(r"^\d+$".into())]),
        Value::Boolean(false)
    );
}

#[test]
fn builtin_split_and_coalesce() {
    let registry = FunctionRegistry::with_builtins();
    let split = registry.lookup("split").unwrap();
    assert_eq!(
        split(&[Value::String("a,b".into()), Value::String(",".into())]),
        Value::Array(vec![
            Value::String("a".into()),
            Value::String("b".into())
        ])
    );
    let coalesce = registry.lookup("coalesce").unwrap();
    assert_eq!(
        coalesce(&[Value::Null, Value::Integer(7)]),
        Value::Integer(7)
    );
}

// ============================================================================
// Format construction
// ============================================================================

#[test]
fn format_accepts_disjoint_field_sets() {
    let format = Format::new(["a", "b"], ["c"]).unwrap();
    assert_eq!(format.required(), &["a".to_string(), "b".to_string()]);
    assert_eq!(format.optional(), &["c".to_string()]);
}

#[test]
fn format_rejects_overlapping_field_sets() {
    let err = Format::new(["a", "b"], ["b"]).unwrap_err();
    assert_eq!(err.field, "b");
    assert!(err.to_string().contains("'b'"));
}

// ============================================================================
// Mapping orchestration
// ============================================================================

#[test]
fn mapper_runs_source_to_sink() {
    let mut mapper = Mapper::new(FunctionRegistry::with_builtins());
    mapper.add_source(Box::new(MemorySource::new(
        "landmarks",
        any_format(),
        json_object(vec![("name", Value::String("Louvre".into()))]),
    )));
    let sink = MemorySink::new("catalog", any_format());
    mapper.add_sink(Box::new(sink.clone()));

    let tree = Transformation::record([("title", Transformation::input("$.name"))]);
    mapper.run("landmarks", "catalog", &tree).unwrap();

    assert_eq!(
        sink.take(),
        vec![json_object(vec![(
            "title",
            Value::String("Louvre".into())
        )])]
    );
}

#[test]
fn mapper_reports_unknown_source() {
    let mapper = Mapper::new(FunctionRegistry::new());
    match mapper.run("ghost", "catalog", &Transformation::Identity) {
        Err(MapError::SourceNotFound(id)) => assert_eq!(id, "ghost"),
        other => panic!("expected SourceNotFound, got {:?}", other),
    }
}

#[test]
fn mapper_reports_unknown_sink() {
    let mut mapper = Mapper::new(FunctionRegistry::new());
    mapper.add_source(Box::new(MemorySource::new(
        "landmarks",
        any_format(),
        Value::Null,
    )));
    match mapper.run("landmarks", "ghost", &Transformation::Identity) {
        Err(MapError::SinkNotFound(id)) => assert_eq!(id, "ghost"),
        other => panic!("expected SinkNotFound, got {:?}", other),
    }
}

#[test]
fn mapper_propagates_evaluation_errors() {
    let mut mapper = Mapper::new(FunctionRegistry::new());
    mapper.add_source(Box::new(MemorySource::new(
        "landmarks",
        any_format(),
        json_object(vec![]),
    )));
    mapper.add_sink(Box::new(MemorySink::new("catalog", any_format())));
    let tree = Transformation::input("$.missing");
    assert!(matches!(
        mapper.run("landmarks", "catalog", &tree),
        Err(MapError::Eval(_))
    ));
}

// ============================================================================
// Definition persistence
// ============================================================================

#[test]
fn store_round_trips_definitions_by_id() {
    let mut store = MemoryStore::new();
    let tree = Transformation::record([("title", Transformation::input("$.name"))]);
    let id = store.save(&tree);
    assert_eq!(store.get_by_id(&id), Some(tree));
    assert_eq!(store.get_by_id("nope"), None);
}

#[test]
fn store_rows_keep_insertion_order_and_timestamps() {
    let mut store = MemoryStore::new();
    let first = store.save(&Transformation::Identity);
    let second = store.save(&Transformation::constant(1i64));

    let rows = store.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id, first);
    assert_eq!(rows[1].id, second);
    assert!(rows[0].created_at <= rows[1].created_at);
    // Rows store the wire format, loadable independently.
    assert!(wire::parse(&rows[1].document).is_ok());
}

// ============================================================================
// End to end: stored definition drives a mapping run
// ============================================================================

#[test]
fn stored_definition_applied_through_facade() {
    let mut store = MemoryStore::new();
    let id = store.save(&Transformation::compose([
        Transformation::input("$.items"),
        Transformation::list_of(Transformation::record([
            ("name", Transformation::input("name")),
        ])),
    ]));

    let tree = store.get_by_id(&id).unwrap();
    let transformer = Transformer::new(tree);
    let out = transformer
        .apply(
            r#"{"items":[{"name":"Eiffel Tower","x":1},{"name":"Louvre","x":2}]}"#,
            "json",
            "csv",
        )
        .unwrap();
    assert_eq!(out, "name\nEiffel Tower\nLouvre\n");
}
