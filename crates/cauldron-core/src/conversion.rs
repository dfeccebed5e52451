//! Conversion matrix between semantic types
//!
//! Conversions are a fixed, hand-declared table keyed by ordered
//! `(SemanticType, SemanticType)` pairs. The table is a single exhaustive
//! match, so adding a semantic type forces every pair to be considered.
//! Pairs mapped to `None` have no conversion and surface as
//! `ConversionUnavailable`.
//!
//! Copyright (c) 2025 Cauldron Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::types::{SemanticType, TypedValue};
use anyhow::{anyhow, bail};
use serde_json::{Map, Value};

/// A single conversion; receives a value already tagged with the source type
pub type ConversionFn = fn(&TypedValue) -> anyhow::Result<TypedValue>;

/// Something that can convert typed values between semantic types
pub trait Converter {
    /// Whether a conversion `from -> to` is registered
    fn supports(&self, from: SemanticType, to: SemanticType) -> bool;

    /// Convert `value` (tagged `from`) into the `to` representation
    fn convert(&self, from: SemanticType, to: SemanticType, value: &TypedValue) -> Result<TypedValue>;
}

/// The standard conversion table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionMatrix;

impl ConversionMatrix {
    /// Look up the conversion function for an ordered pair
    pub fn lookup(from: SemanticType, to: SemanticType) -> Option<ConversionFn> {
        use SemanticType::*;

        let f: ConversionFn = match (from, to) {
            (Text, Text) | (Number, Number) | (Boolean, Boolean) | (Object, Object)
            | (List, List) | (Bytes, Bytes) => identity,

            (Text, Number) => text_to_number,
            (Text, Boolean) => text_to_boolean,
            (Text, Object) => text_to_object,
            (Text, List) => text_to_list,
            (Text, Bytes) => text_to_bytes,

            (Number, Text) => number_to_text,
            (Number, Boolean) => number_to_boolean,
            (Number, Object) => number_to_object,
            (Number, List) => number_to_list,
            (Number, Bytes) => number_to_bytes,

            (Boolean, Text) => boolean_to_text,
            (Boolean, Number) => boolean_to_number,
            (Boolean, Object) => boolean_to_object,
            (Boolean, List) => boolean_to_list,
            (Boolean, Bytes) => boolean_to_bytes,

            (Object, Text) => object_to_text,
            (Object, List) => object_to_list,
            (Object, Bytes) => object_to_bytes,
            (Object, Number) | (Object, Boolean) => return None,

            (List, Text) => list_to_text,
            (List, Number) => list_to_number,
            (List, Boolean) => list_to_boolean,
            (List, Object) => list_to_object,
            (List, Bytes) => list_to_bytes,

            (Bytes, Text) => bytes_to_text,
            (Bytes, Number) => bytes_to_number,
            (Bytes, Boolean) => bytes_to_boolean,
            (Bytes, Object) => bytes_to_object,
            (Bytes, List) => bytes_to_list,
        };

        Some(f)
    }

    /// All ordered pairs of distinct types that have a conversion
    pub fn available() -> Vec<(SemanticType, SemanticType)> {
        let mut pairs = Vec::new();
        for from in SemanticType::ALL {
            for to in SemanticType::ALL {
                if from != to && Self::lookup(from, to).is_some() {
                    pairs.push((from, to));
                }
            }
        }
        pairs
    }
}

impl Converter for ConversionMatrix {
    fn supports(&self, from: SemanticType, to: SemanticType) -> bool {
        Self::lookup(from, to).is_some()
    }

    fn convert(&self, from: SemanticType, to: SemanticType, value: &TypedValue) -> Result<TypedValue> {
        let actual = value.semantic_type();
        if actual != from {
            return Err(Error::TypeMismatch {
                expected: from,
                actual,
            });
        }

        let f = Self::lookup(from, to).ok_or(Error::ConversionUnavailable { from, to })?;
        f(value).map_err(|source| Error::ConversionFailed { from, to, source })
    }
}

/// Convert with the standard table
pub fn convert(from: SemanticType, to: SemanticType, value: &TypedValue) -> Result<TypedValue> {
    ConversionMatrix.convert(from, to, value)
}

/// Permissive numeric coercion: never fails, non-numeric text yields NaN
pub fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let radix_prefixes = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)];
    for (prefix, radix) in radix_prefixes {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix)
                .map(|v| v as f64)
                .unwrap_or(f64::NAN);
        }
    }

    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Canonical decimal rendering of a number
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        (if n > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{}", n)
    }
}

/// Structured-data form of a number; integral values stay integers and
/// non-finite values become null
pub fn number_to_json(n: f64) -> Value {
    const MAX_SAFE: f64 = 9_007_199_254_740_992.0;
    if n.is_finite() && n.fract() == 0.0 && n.abs() < MAX_SAFE {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_object(text: &str) -> anyhow::Result<TypedValue> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(TypedValue::Object(map)),
        other => bail!("expected a JSON object, found {}", json_kind(&other)),
    }
}

fn parse_list(text: &str) -> anyhow::Result<TypedValue> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => Ok(TypedValue::List(items)),
        other => bail!("expected a JSON array, found {}", json_kind(&other)),
    }
}

fn identity(value: &TypedValue) -> anyhow::Result<TypedValue> {
    Ok(value.clone())
}

// Text

fn text_to_number(value: &TypedValue) -> anyhow::Result<TypedValue> {
    Ok(TypedValue::Number(parse_number(value.try_text()?)))
}

fn text_to_boolean(value: &TypedValue) -> anyhow::Result<TypedValue> {
    Ok(TypedValue::Boolean(value.try_text()? == "true"))
}

fn text_to_object(value: &TypedValue) -> anyhow::Result<TypedValue> {
    parse_object(value.try_text()?)
}

fn text_to_list(value: &TypedValue) -> anyhow::Result<TypedValue> {
    parse_list(value.try_text()?)
}

fn text_to_bytes(value: &TypedValue) -> anyhow::Result<TypedValue> {
    Ok(TypedValue::Bytes(value.try_text()?.as_bytes().to_vec()))
}

// Number

fn number_to_text(value: &TypedValue) -> anyhow::Result<TypedValue> {
    Ok(TypedValue::Text(format_number(value.try_number()?)))
}

fn number_to_boolean(value: &TypedValue) -> anyhow::Result<TypedValue> {
    let n = value.try_number()?;
    Ok(TypedValue::Boolean(n != 0.0 && !n.is_nan()))
}

fn number_to_object(value: &TypedValue) -> anyhow::Result<TypedValue> {
    let mut map = Map::new();
    map.insert("value".to_string(), number_to_json(value.try_number()?));
    Ok(TypedValue::Object(map))
}

fn number_to_list(value: &TypedValue) -> anyhow::Result<TypedValue> {
    Ok(TypedValue::List(vec![number_to_json(value.try_number()?)]))
}

fn number_to_bytes(value: &TypedValue) -> anyhow::Result<TypedValue> {
    Ok(TypedValue::Bytes(format_number(value.try_number()?).into_bytes()))
}

// Boolean

fn boolean_to_text(value: &TypedValue) -> anyhow::Result<TypedValue> {
    Ok(TypedValue::Text(value.try_boolean()?.to_string()))
}

fn boolean_to_number(value: &TypedValue) -> anyhow::Result<TypedValue> {
    Ok(TypedValue::Number(if value.try_boolean()? { 1.0 } else { 0.0 }))
}

fn boolean_to_object(value: &TypedValue) -> anyhow::Result<TypedValue> {
    let mut map = Map::new();
    map.insert("value".to_string(), Value::Bool(value.try_boolean()?));
    Ok(TypedValue::Object(map))
}

fn boolean_to_list(value: &TypedValue) -> anyhow::Result<TypedValue> {
    Ok(TypedValue::List(vec![Value::Bool(value.try_boolean()?)]))
}

fn boolean_to_bytes(value: &TypedValue) -> anyhow::Result<TypedValue> {
    Ok(TypedValue::Bytes(vec![u8::from(value.try_boolean()?)]))
}

// Object

fn object_to_text(value: &TypedValue) -> anyhow::Result<TypedValue> {
    Ok(TypedValue::Text(serde_json::to_string(value.try_object()?)?))
}

fn object_to_list(value: &TypedValue) -> anyhow::Result<TypedValue> {
    let entries = value
        .try_object()?
        .iter()
        .map(|(key, val)| Value::Array(vec![Value::String(key.clone()), val.clone()]))
        .collect();
    Ok(TypedValue::List(entries))
}

fn object_to_bytes(value: &TypedValue) -> anyhow::Result<TypedValue> {
    Ok(TypedValue::Bytes(serde_json::to_vec(value.try_object()?)?))
}

// List

fn list_to_text(value: &TypedValue) -> anyhow::Result<TypedValue> {
    Ok(TypedValue::Text(serde_json::to_string(value.try_list()?)?))
}

fn list_to_number(value: &TypedValue) -> anyhow::Result<TypedValue> {
    Ok(TypedValue::Number(value.try_list()?.len() as f64))
}

fn list_to_boolean(value: &TypedValue) -> anyhow::Result<TypedValue> {
    Ok(TypedValue::Boolean(!value.try_list()?.is_empty()))
}

fn list_to_object(value: &TypedValue) -> anyhow::Result<TypedValue> {
    let mut map = Map::new();
    for (index, item) in value.try_list()?.iter().enumerate() {
        let pair = item
            .as_array()
            .filter(|pair| pair.len() == 2)
            .ok_or_else(|| anyhow!("element {} is not a [key, value] pair", index))?;

        let key = match &pair[0] {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => bail!("element {} has a non-scalar key ({})", index, json_kind(other)),
        };
        map.insert(key, pair[1].clone());
    }
    Ok(TypedValue::Object(map))
}

fn list_to_bytes(value: &TypedValue) -> anyhow::Result<TypedValue> {
    Ok(TypedValue::Bytes(serde_json::to_vec(value.try_list()?)?))
}

// Bytes

fn bytes_to_text(value: &TypedValue) -> anyhow::Result<TypedValue> {
    Ok(TypedValue::Text(String::from_utf8_lossy(value.try_bytes()?).into_owned()))
}

fn bytes_to_number(value: &TypedValue) -> anyhow::Result<TypedValue> {
    let text = String::from_utf8_lossy(value.try_bytes()?);
    Ok(TypedValue::Number(parse_number(&text)))
}

fn bytes_to_boolean(value: &TypedValue) -> anyhow::Result<TypedValue> {
    let first = value.try_bytes()?.first().copied();
    Ok(TypedValue::Boolean(first.is_some_and(|b| b != 0)))
}

fn bytes_to_object(value: &TypedValue) -> anyhow::Result<TypedValue> {
    parse_object(&String::from_utf8_lossy(value.try_bytes()?))
}

fn bytes_to_list(value: &TypedValue) -> anyhow::Result<TypedValue> {
    let items = value.try_bytes()?.iter().map(|&b| Value::from(b)).collect();
    Ok(TypedValue::List(items))
}
