//! Shared utilities for command handlers

use crate::config::{Config, DocumentFormat};
use crate::error::{Error, Result};
use cauldron_core::{PipelineStep, Recipe, SemanticType, TypedValue, ValueContainer};
use serde_json::{Map, Value};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Parse an inline step: `module` or `module:key=value,key2=value2`
///
/// Values are read as JSON when they parse (`3`, `true`, `"x"`), otherwise
/// taken as plain text. A comma not followed by `key=` belongs to the
/// previous value, so `pattern=a,b` keeps its comma.
pub fn parse_step(spec: &str) -> Result<PipelineStep> {
    let (module, rest) = match spec.split_once(':') {
        Some((module, rest)) => (module.trim(), Some(rest)),
        None => (spec.trim(), None),
    };
    if module.is_empty() {
        return Err(Error::invalid_args(format!("step '{}' has no module name", spec)));
    }

    let mut step = PipelineStep::new(module);
    let Some(rest) = rest else {
        return Ok(step);
    };

    let mut pairs: Vec<String> = Vec::new();
    for piece in rest.split(',') {
        match pairs.last_mut() {
            Some(last) if !looks_like_pair(piece) => {
                last.push(',');
                last.push_str(piece);
            }
            _ => pairs.push(piece.to_string()),
        }
    }

    for pair in pairs.iter().filter(|p| !p.trim().is_empty()) {
        let (key, raw) = pair
            .split_once('=')
            .ok_or_else(|| Error::invalid_args(format!("option '{}' in step '{}' is not key=value", pair, module)))?;
        step.options.insert(key.trim().to_string(), parse_option_value(raw));
    }

    Ok(step)
}

fn looks_like_pair(piece: &str) -> bool {
    match piece.split_once('=') {
        Some((key, _)) => {
            let key = key.trim();
            !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        None => false,
    }
}

fn parse_option_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Find a recipe by path, or by name under `paths.recipes_dir`
pub fn resolve_recipe_path(name: &str, config: &Config) -> Result<PathBuf> {
    let direct = Path::new(name);
    if direct.is_file() {
        return Ok(direct.to_path_buf());
    }

    let dir = &config.paths.recipes_dir;
    let mut candidates = vec![dir.join(name)];
    for ext in ["json", "yaml", "yml", "toml"] {
        candidates.push(dir.join(format!("{}.{}", name, ext)));
    }

    candidates
        .into_iter()
        .find(|p| p.is_file())
        .ok_or_else(|| Error::RecipeNotFound {
            name: name.to_string(),
            dir: dir.clone(),
        })
}

/// Load a recipe document, picking the format from the extension
pub fn load_recipe(path: &Path) -> Result<Recipe> {
    let content = fs::read_to_string(path)?;
    let format = DocumentFormat::from_path(path);
    let invalid = |detail: String| {
        tracing::debug!(path = %path.display(), %detail, "Recipe did not parse");
        Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: format.name().to_string(),
        }
    };

    let recipe = match format {
        DocumentFormat::Json => Recipe::from_json(&content)?,
        DocumentFormat::Yaml => serde_yaml::from_str::<Recipe>(&content).map_err(|e| invalid(e.to_string()))?,
        DocumentFormat::Toml => toml::from_str::<Recipe>(&content).map_err(|e| invalid(e.to_string()))?,
    };
    recipe.validate()?;

    tracing::debug!(path = %path.display(), steps = recipe.steps.len(), "Loaded recipe");
    Ok(recipe)
}

/// Combine an optional recipe with inline steps into one recipe
pub fn assemble_recipe(recipe: Option<&str>, inline: &[String], config: &Config) -> Result<Recipe> {
    let mut assembled = match recipe {
        Some(name) => load_recipe(&resolve_recipe_path(name, config)?)?,
        None => Recipe::new("inline"),
    };

    for spec in inline {
        assembled.steps.push(parse_step(spec)?);
    }

    if assembled.steps.is_empty() {
        return Err(Error::invalid_args("nothing to run: give --recipe or at least one --step"));
    }
    Ok(assembled)
}

/// Where the initial value comes from
pub enum InputSource<'a> {
    Inline(&'a str),
    File(&'a Path),
    Stdin,
}

/// Read the initial value and materialize it as `ty`
///
/// Bytes input is taken verbatim; every other type is read as UTF-8 text
/// and converted through a container. A single trailing newline is
/// dropped from stdin text.
pub fn read_input(source: InputSource<'_>, ty: SemanticType) -> Result<TypedValue> {
    let (raw, from_stdin) = match source {
        InputSource::Inline(text) => (text.as_bytes().to_vec(), false),
        InputSource::File(path) => {
            if !path.exists() {
                return Err(Error::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            (fs::read(path)?, false)
        }
        InputSource::Stdin => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            (buf, true)
        }
    };

    if ty == SemanticType::Bytes {
        return Ok(TypedValue::Bytes(raw));
    }

    let mut text = String::from_utf8(raw)
        .map_err(|_| Error::invalid_args(format!("input is not valid UTF-8; use --input-type bytes to read it as {}", ty)))?;
    if from_stdin {
        if text.ends_with('\n') {
            text.pop();
        }
        if text.ends_with('\r') {
            text.pop();
        }
    }

    let mut container = ValueContainer::new(TypedValue::Text(text));
    Ok(container.get(ty)?.clone())
}

/// File contents for a result: raw bytes, raw text, or a rendered value
pub fn render_for_file(value: &TypedValue) -> Result<Vec<u8>> {
    Ok(match value {
        TypedValue::Bytes(bytes) => bytes.clone(),
        TypedValue::Text(text) => text.as_bytes().to_vec(),
        TypedValue::Number(n) => cauldron_core::conversion::format_number(*n).into_bytes(),
        TypedValue::Boolean(b) => b.to_string().into_bytes(),
        TypedValue::Object(map) => serde_json::to_vec_pretty(map)?,
        TypedValue::List(items) => serde_json::to_vec_pretty(&items)?,
    })
}

/// Options map for logging, with secrets masked
pub fn loggable_options(options: &Map<String, Value>) -> String {
    Value::Object(crate::logging::redaction::redact_options(options)).to_string()
}
