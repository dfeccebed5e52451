//! JSON formatting and filtering modules

use crate::module::{ModuleDescriptor, OptionSpec};
use crate::types::{SemanticType, TypedValue};
use anyhow::{anyhow, bail, Context};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;

const MIN_INDENT: f64 = 1.0;
const MAX_INDENT: f64 = 10.0;

pub fn descriptors() -> Vec<ModuleDescriptor> {
    vec![json_pretty(), json_minify(), json_filter()]
}

fn parse(text: &str) -> anyhow::Result<Value> {
    serde_json::from_str(text).context("Invalid JSON")
}

/// Serialize with `indent` spaces per level
pub fn to_string_indented(value: &Value, indent: usize) -> anyhow::Result<String> {
    let spaces = vec![b' '; indent];
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&spaces));
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8(out)?)
}

pub fn json_pretty() -> ModuleDescriptor {
    ModuleDescriptor::builder("json_pretty", "JSON Pretty Print", "JSON")
        .description("Formats JSON with indentation and line breaks to make it more readable.")
        .input(SemanticType::Text)
        .output(SemanticType::Text)
        .option(OptionSpec::number("indent").label("Indent Spaces").default_value(2.0))
        .run(|input, options| {
            let value = parse(input.try_text()?)?;
            let indent = options
                .number("indent")
                .filter(|n| n.is_finite())
                .unwrap_or(2.0)
                .clamp(MIN_INDENT, MAX_INDENT) as usize;
            Ok(TypedValue::Text(to_string_indented(&value, indent)?))
        })
        .build()
}

pub fn json_minify() -> ModuleDescriptor {
    ModuleDescriptor::builder("json_minify", "JSON Minify", "JSON")
        .description("Removes all unnecessary whitespace from JSON.")
        .input(SemanticType::Text)
        .output(SemanticType::Text)
        .run(|input, _| {
            let value = parse(input.try_text()?)?;
            Ok(TypedValue::Text(serde_json::to_string(&value)?))
        })
        .build()
}

pub fn json_filter() -> ModuleDescriptor {
    ModuleDescriptor::builder("json_filter", "JSON Filter", "JSON")
        .description("Selects parts of a JSON document with jq-style paths (.foo.bar, .items[], .items[0]).")
        .input(SemanticType::Text)
        .output(SemanticType::Text)
        .option(OptionSpec::text("filter").label("Filter").default_value("."))
        .run(|input, options| {
            let value = parse(input.try_text()?)?;
            let filter = options.text("filter").map(str::trim).filter(|f| !f.is_empty()).unwrap_or(".");
            let selected = apply_filter(&value, filter).context("Invalid filter")?;
            Ok(TypedValue::Text(render_selection(selected)?))
        })
        .build()
}

/// Evaluate a jq-style path against `data`
///
/// Supported segments: `.key`, `.key[]` (iterate), `.key[N]` (index).
/// A key applied to an array maps over its elements.
pub fn apply_filter(data: &Value, filter: &str) -> anyhow::Result<Value> {
    if filter == "." {
        return Ok(data.clone());
    }
    let path = filter
        .strip_prefix('.')
        .ok_or_else(|| anyhow!("filter must start with '.'"))?;

    let mut current = data.clone();
    for token in path.split('.').filter(|t| !t.is_empty()) {
        current = if let Some(key) = token.strip_suffix("[]") {
            let target = select_key(current, key);
            if !target.is_array() {
                bail!("expected an array at '{}'", if key.is_empty() { "." } else { key });
            }
            target
        } else if let Some((key, rest)) = token.split_once('[') {
            let index: usize = rest
                .strip_suffix(']')
                .and_then(|i| i.parse().ok())
                .ok_or_else(|| anyhow!("invalid index in '{}'", token))?;
            match select_key(current, key) {
                Value::Array(mut items) if index < items.len() => items.swap_remove(index),
                Value::Array(_) => Value::Null,
                _ => bail!("'{}' is not an array", key),
            }
        } else {
            match current {
                Value::Array(items) => Value::Array(items.into_iter().map(|item| field(item, token)).collect()),
                other => field(other, token),
            }
        };
    }
    Ok(current)
}

fn select_key(value: Value, key: &str) -> Value {
    if key.is_empty() {
        value
    } else {
        field(value, key)
    }
}

fn field(value: Value, key: &str) -> Value {
    match value {
        Value::Object(mut map) => map.remove(key).unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

fn render_selection(selected: Value) -> anyhow::Result<String> {
    match selected {
        Value::Object(_) | Value::Array(_) => to_string_indented(&selected, 2),
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(nested @ (Value::Object(_) | Value::Array(_))) => to_string_indented(&nested, 2),
            _ => Ok(text),
        },
        other => Ok(other.to_string()),
    }
}
