use search_sizing::{
    config::SizingConfig,
    types::{
        AutocompleteVariant, DocumentSchema, FieldSpec, InstanceProfile, QuantizationMethod,
        QuantizationSettings, QuantizationType, SizingInput, SizingRequest,
    },
    CostTable, FieldCostModel, SizingEngine, SizingError,
};
use std::io::Write;

const EXAMPLE_INPUT: &str = r#"{
    "lexical_sizing": {
        "num_documents": 1000000,
        "qps": 100,
        "latency": 0.05,
        "fields": [
            {"field_type": "String", "size": 150, "count": 2},
            {"field_type": "Autocomplete", "autocomplete_type": "edgeGram"},
            {
                "field_type": "Embedded",
                "count": 1,
                "embedded_sizing": {
                    "num_documents": 5,
                    "fields": [{"field_type": "String", "size": 50}]
                }
            }
        ]
    },
    "vector_sizing": {
        "num_documents": 1000000,
        "qps": 50,
        "latency": 0.2,
        "fields": [
            {"field_type": "Vector", "dimensions": 1536}
        ],
        "quantization_settings": {
            "type": "scalar",
            "method": "database"
        }
    }
}"#;

#[test]
fn test_example_input_end_to_end() {
    let engine = SizingEngine::default();
    let input = SizingInput::from_json(EXAMPLE_INPUT).unwrap();

    let result = engine.evaluate_input(&input).unwrap();

    let costs = CostTable::default();
    let model = FieldCostModel::new(&costs);
    let per_document = model.string_cost(150, 2)
        + model.autocomplete_cost(AutocompleteVariant::EdgeGram, 30, 3, 15)
        + 5 * model.string_cost(50, 1);

    let lexical = result.lexical.unwrap();
    assert_eq!(lexical.storage_bytes, 1_000_000 * per_document);
    assert_eq!(lexical.required_vcpu, 4);

    let vector = result.vector.unwrap();
    assert_eq!(vector.storage_bytes, 1_000_000 * (1536 + 6144));
    assert_eq!(vector.ram_bytes, vector.storage_bytes);
    assert_eq!(vector.required_vcpu, 1);

    assert_eq!(result.required_vcpu, 4);
    assert_eq!(result.estimated_ram_bytes, lexical.ram_bytes + vector.ram_bytes);
    assert_eq!(result.lexical_documents, 6_000_000);
    assert_eq!(result.estimated_storage_bytes, lexical.storage_bytes + vector.storage_bytes);
    assert_eq!(result.reindex_storage_bytes, (result.estimated_storage_bytes as f64 * 2.25).ceil() as u64);
    assert!(result.recommended_instance.ram_bytes() >= result.estimated_ram_bytes);
    assert!(result.recommended_instance.storage_bytes() >= result.estimated_storage_bytes);
}

#[test]
fn test_evaluate_is_idempotent() {
    let engine = SizingEngine::default();
    let input = SizingInput::from_json(EXAMPLE_INPUT).unwrap();

    let first = engine.evaluate_input(&input).unwrap();
    let second = engine.evaluate_input(&input).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_concurrent_evaluations_share_one_engine() {
    let engine = SizingEngine::default();
    let input = SizingInput::from_json(EXAMPLE_INPUT).unwrap();
    let expected = engine.evaluate_input(&input).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| engine.evaluate_input(&input).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_ram_beyond_every_instance() {
    let engine = SizingEngine::default();
    // 100M raw 1536-dim vectors need well over 128 GB of RAM
    let vector = SizingRequest::new(100_000_000, 10.0, 0.1)
        .with_field(FieldSpec::Vector { dimensions: 1536, count: 1 });

    let result = engine.evaluate(None, Some(&vector));
    assert!(matches!(result, Err(SizingError::NoSuitableInstance { .. })));
}

#[test]
fn test_single_document_without_load_needs_one_vcpu() {
    let engine = SizingEngine::default();
    let lexical = SizingRequest::new(1, 0.0, 0.05).with_field(FieldSpec::Date);

    let result = engine.evaluate(Some(&lexical), None).unwrap();
    assert_eq!(result.required_vcpu, 1);
}

#[test]
fn test_embedded_scenario() {
    let engine = SizingEngine::default();
    let costs = &engine.config().costs;
    let model = FieldCostModel::new(costs);

    let embedded = FieldSpec::Embedded {
        count: 5,
        schema: DocumentSchema::new(vec![FieldSpec::String { byte_size: 50, count: 1 }]),
    };
    assert_eq!(model.cost(&embedded), 5 * model.cost(&FieldSpec::String { byte_size: 50, count: 1 }));

    let parent = SizingRequest::new(1, 0.0, 1.0)
        .with_field(FieldSpec::String { byte_size: 1000, count: 3 })
        .with_field(embedded.clone());
    let lone = SizingRequest::new(1, 0.0, 1.0).with_field(embedded);

    let parent_result = engine.evaluate(Some(&parent), None).unwrap();
    let lone_result = engine.evaluate(Some(&lone), None).unwrap();
    assert_eq!(
        parent_result.lexical.unwrap().storage_bytes - lone_result.lexical.unwrap().storage_bytes,
        model.string_cost(1000, 3)
    );
}

#[test]
fn test_query_method_retains_raw_vectors() {
    let engine = SizingEngine::default();
    let base = SizingRequest::new(1_000_000, 10.0, 0.2)
        .with_field(FieldSpec::Vector { dimensions: 768, count: 1 });

    let database = base.clone().with_quantization(QuantizationSettings::new(
        QuantizationType::Binary,
        QuantizationMethod::Database,
    ));
    let query = base.with_quantization(QuantizationSettings::new(
        QuantizationType::Binary,
        QuantizationMethod::Query,
    ));

    let database = engine.evaluate(None, Some(&database)).unwrap().vector.unwrap();
    let query = engine.evaluate(None, Some(&query)).unwrap().vector.unwrap();

    assert_eq!(query.storage_bytes - database.storage_bytes, 1_000_000 * 768 * 4);
    assert_eq!(query.ram_bytes, database.ram_bytes);
}

#[test]
fn test_malformed_input_is_a_validation_error() {
    let bad_kind = r#"{"lexical_sizing": {"num_documents": 1, "latency": 0.1,
        "fields": [{"field_type": "Geo"}]}}"#;
    assert!(matches!(SizingInput::from_json(bad_kind), Err(SizingError::Validation { .. })));

    let bad_quantization = r#"{"vector_sizing": {"num_documents": 1, "latency": 0.1,
        "quantization_settings": {"type": "product"}}}"#;
    assert!(matches!(
        SizingInput::from_json(bad_quantization),
        Err(SizingError::Validation { .. })
    ));

    let empty = SizingInput::from_json("{}").unwrap();
    let engine = SizingEngine::default();
    assert!(matches!(engine.evaluate_input(&empty), Err(SizingError::Validation { .. })));
}

#[test]
fn test_engine_from_toml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[capacity]
reindex_space_multiplier = 1.0
queries_per_vcpu_per_second = 100.0

[[instances]]
name = "large"
vcpu = 16
ram_gb = 64
max_storage_gb = 1000

[[instances]]
name = "small"
vcpu = 1
ram_gb = 1
max_storage_gb = 10
"#
    )
    .unwrap();

    let engine = SizingEngine::from_file(file.path()).unwrap();
    assert_eq!(engine.instances()[0], InstanceProfile::new("small", 1, 1, 10));

    let lexical = SizingRequest::new(1000, 10.0, 1.0).with_field(FieldSpec::Numeric);
    let result = engine.evaluate(Some(&lexical), None).unwrap();
    assert_eq!(result.estimated_storage_bytes, 1000 * 16);
    assert_eq!(result.recommended_instance.name, "small");

    // 1000 qps at 1s latency -> 10 vCPU with this table's capacity factor
    let busy = SizingRequest::new(1000, 1000.0, 1.0).with_field(FieldSpec::Numeric);
    let result = engine.evaluate(Some(&busy), None).unwrap();
    assert_eq!(result.required_vcpu, 10);
    assert_eq!(result.recommended_instance.name, "large");
}

#[test]
fn test_invalid_toml_config_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[capacity]\nram_working_set_fraction = 2.0").unwrap();

    assert!(matches!(
        SizingEngine::from_file(file.path()),
        Err(SizingError::Config(_))
    ));
    assert!(SizingConfig::from_file(std::path::Path::new("/nonexistent/sizing.toml")).is_err());
}
