//! End-to-end pipeline tests over the built-in module library

use cauldron_core::modules::builtin_registry;
use cauldron_core::{
    Error, ModuleDescriptor, ModuleRegistry, PipelineExecutor, PipelineStep, RegistryBuilder,
    SemanticType, TypedValue, ValueContainer,
};
use serde_json::json;
use std::sync::Arc;
use std::thread;

fn executor() -> PipelineExecutor {
    PipelineExecutor::new(Arc::new(builtin_registry().unwrap()))
}

#[test]
fn test_base64_decode_yields_bytes() {
    let output = executor()
        .run(&[PipelineStep::new("base64_decode")], TypedValue::from("SGVsbG8="))
        .unwrap();

    assert_eq!(output.semantic_type(), SemanticType::Bytes);
    assert_eq!(output.value, TypedValue::Bytes(b"Hello".to_vec()));
}

#[test]
fn test_hex_encode_yields_text() {
    let output = executor()
        .run(&[PipelineStep::new("hex_encode")], TypedValue::Bytes(b"abc".to_vec()))
        .unwrap();

    assert_eq!(output.value, TypedValue::from("616263"));
}

#[test]
fn test_json_pretty_two_space_indent() {
    let step = PipelineStep::new("json_pretty").with_option("indent", 2);
    let output = executor().run(&[step], TypedValue::from(r#"{"a":1}"#)).unwrap();

    assert_eq!(output.value, TypedValue::from("{\n  \"a\": 1\n}"));
}

#[test]
fn test_multi_step_recipe_bridges_types() {
    // Text -> Bytes (converted) -> hex Text -> Bytes (converted) -> SHA-256 Text
    let steps = vec![
        PipelineStep::new("hex_encode").with_option("uppercase", true),
        PipelineStep::new("sha256"),
    ];
    let output = executor().run(&steps, TypedValue::from("abc")).unwrap();

    assert_eq!(output.trace.len(), 2);
    assert!(output.trace.iter().all(|t| t.bridged));
    assert_eq!(output.value.as_text().map(str::len), Some(64));
}

#[test]
fn test_text_input_reaches_number_modules() {
    let output = executor()
        .run(&[PipelineStep::new("timestamp_to_date")], TypedValue::from(" 86400 "))
        .unwrap();
    assert_eq!(output.value, TypedValue::from("1970-01-02T00:00:00.000Z"));
}

#[test]
fn test_pipeline_halts_at_failing_step() {
    let executor = executor();
    let steps = vec![
        PipelineStep::new("reverse"),
        PipelineStep::new("json_minify"),
        PipelineStep::new("uppercase"),
    ];
    let mut container = ValueContainer::new(TypedValue::from("{not json"));

    let failure = executor.run_in(&steps, &mut container).unwrap_err();

    assert_eq!(failure.step_index, 1);
    assert_eq!(failure.module_id, "json_minify");
    assert!(matches!(failure.cause, Error::ModuleRuntime { .. }));
    assert_eq!(container.current(), &TypedValue::from("nosj ton{"));
    assert_eq!(container.resident_types(), vec![SemanticType::Text]);
}

#[test]
fn test_retry_from_failing_step() {
    let executor = executor();
    let mut steps = vec![
        PipelineStep::new("trim_whitespace"),
        PipelineStep::new("regex_extract"),
    ];
    let mut container = ValueContainer::new(TypedValue::from("  a1 b2  "));

    let failure = executor.run_in(&steps, &mut container).unwrap_err();
    assert!(matches!(failure.cause, Error::InvalidOptions { .. }));

    steps[1] = PipelineStep::new("regex_extract").with_option("pattern", "[a-z]\\d");
    executor.resume_at(&steps, failure.step_index, &mut container).unwrap();
    assert_eq!(container.current(), &TypedValue::List(vec![json!("a1"), json!("b2")]));
}

#[test]
fn test_unavailable_conversion_halts_pipeline() {
    let steps = vec![PipelineStep::new("jwt_decode"), PipelineStep::new("caesar_encrypt")];
    let failure = executor()
        .run(&steps, TypedValue::from("a.e30.b"))
        .unwrap_err();

    // Object converts to Bytes, so this fails on the missing shift option instead
    assert_eq!(failure.step_index, 1);
    assert!(matches!(failure.cause, Error::InvalidOptions { .. }));

    let failure = executor()
        .run(&[PipelineStep::new("jwt_decode"), PipelineStep::new("timestamp_to_date")], TypedValue::from("a.e30.b"))
        .unwrap_err();
    assert!(matches!(
        failure.cause,
        Error::ConversionUnavailable {
            from: SemanticType::Object,
            to: SemanticType::Number
        }
    ));
}

#[test]
fn test_duplicate_registration_blocks_registry() {
    let descriptor = || {
        ModuleDescriptor::builder("noop", "No-op", "Test")
            .input(SemanticType::Text)
            .output(SemanticType::Text)
            .run(|input, _| Ok(input.clone()))
            .build()
    };

    let mut builder = RegistryBuilder::new();
    builder.register(descriptor()).unwrap();
    assert!(matches!(builder.register(descriptor()), Err(Error::Registration { .. })));
    assert!(builder.build().is_err());

    assert!(ModuleRegistry::from_descriptors([descriptor(), descriptor()]).is_err());
}

#[test]
fn test_registry_is_shared_across_concurrent_runs() {
    let registry = Arc::new(builtin_registry().unwrap());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let executor = PipelineExecutor::new(Arc::clone(&registry));
            thread::spawn(move || {
                let input = TypedValue::Bytes(vec![i as u8; 3]);
                executor.run(&[PipelineStep::new("hex_encode")], input).unwrap().value
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let expected = format!("{:02x}", i).repeat(3);
        assert_eq!(handle.join().unwrap(), TypedValue::Text(expected));
    }
}

#[test]
fn test_listing_follows_registration_order() {
    let registry = builtin_registry().unwrap();
    let encoding: Vec<_> = registry.list(Some("Encoding")).iter().map(|m| m.id()).collect();
    assert_eq!(encoding, vec!["base64_encode", "hex_encode", "url_encode"]);
    assert_eq!(registry.categories().first(), Some(&"Encoding"));
}
