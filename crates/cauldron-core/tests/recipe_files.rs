//! Recipe document loading and static checking

use cauldron_core::modules::builtin_registry;
use cauldron_core::{Error, PipelineExecutor, PipelineStep, Recipe, SemanticType, TypedValue};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

const RECIPE: &str = r#"{
    "name": "decode-and-hash",
    "description": "Decode Base64 and fingerprint the result",
    "steps": [
        {"module": "base64_decode"},
        {"module": "sha256", "options": {"uppercase": true}}
    ]
}"#;

#[test]
fn test_load_recipe_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("recipe.json");
    fs::write(&path, RECIPE).unwrap();

    let recipe = Recipe::load(&path).unwrap();
    assert_eq!(recipe.name, "decode-and-hash");
    assert_eq!(recipe.steps.len(), 2);

    let executor = PipelineExecutor::new(Arc::new(builtin_registry().unwrap()));
    let output = executor.run(&recipe.steps, TypedValue::from("SGVsbG8=")).unwrap();
    assert_eq!(
        output.value,
        TypedValue::from("185F8DB32271FE25F561A6FC938B2E264306EC304EDA518007D1764826381969")
    );
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = Recipe::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_malformed_document_is_a_json_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{\"name\": \"x\", \"steps\": [").unwrap();
    assert!(matches!(Recipe::load(&path), Err(Error::Json { .. })));
}

#[test]
fn test_saved_recipe_loads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("saved.json");
    let recipe = Recipe::new("pretty")
        .description("Pretty print with four spaces")
        .step(PipelineStep::new("json_pretty").with_option("indent", 4));

    fs::write(&path, recipe.to_json_pretty().unwrap()).unwrap();
    assert_eq!(Recipe::load(&path).unwrap(), recipe);
}

#[test]
fn test_check_against_builtin_registry() {
    let registry = builtin_registry().unwrap();
    let recipe = Recipe::from_json(RECIPE).unwrap();
    assert_eq!(recipe.check(&registry, SemanticType::Text).unwrap(), SemanticType::Text);

    let bad = Recipe::new("bad")
        .step(PipelineStep::new("jwt_decode"))
        .step(PipelineStep::new("random_bytes"));
    let failure = bad.check(&registry, SemanticType::Text).unwrap_err();
    assert_eq!(failure.step_index, 1);
    assert_eq!(failure.module_id, "random_bytes");
}
