//! Core value types for the Cauldron recipe engine
//!
//! This module defines the closed set of semantic types a value can be
//! materialized as, and the tagged payload that carries one materialization.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// One of the six canonical value representations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    /// Unicode text
    Text,
    /// Double precision number
    Number,
    /// true / false
    Boolean,
    /// Structured key/value mapping
    Object,
    /// Ordered sequence of structured values
    List,
    /// Raw byte sequence
    Bytes,
}

impl SemanticType {
    /// Every semantic type, in declaration order
    pub const ALL: [SemanticType; 6] = [
        SemanticType::Text,
        SemanticType::Number,
        SemanticType::Boolean,
        SemanticType::Object,
        SemanticType::List,
        SemanticType::Bytes,
    ];

    /// Lowercase tag name
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::Text => "text",
            SemanticType::Number => "number",
            SemanticType::Boolean => "boolean",
            SemanticType::Object => "object",
            SemanticType::List => "list",
            SemanticType::Bytes => "bytes",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemanticType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "string" => Ok(SemanticType::Text),
            "number" => Ok(SemanticType::Number),
            "boolean" | "bool" => Ok(SemanticType::Boolean),
            "object" => Ok(SemanticType::Object),
            "list" | "array" => Ok(SemanticType::List),
            "bytes" | "bytearray" | "byte_array" => Ok(SemanticType::Bytes),
            other => Err(format!("unknown semantic type '{}'", other)),
        }
    }
}

/// A value tagged with exactly one semantic type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum TypedValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    Object(Map<String, Value>),
    List(Vec<Value>),
    Bytes(Vec<u8>),
}

impl TypedValue {
    /// The semantic type of the active payload
    pub fn semantic_type(&self) -> SemanticType {
        match self {
            TypedValue::Text(_) => SemanticType::Text,
            TypedValue::Number(_) => SemanticType::Number,
            TypedValue::Boolean(_) => SemanticType::Boolean,
            TypedValue::Object(_) => SemanticType::Object,
            TypedValue::List(_) => SemanticType::List,
            TypedValue::Bytes(_) => SemanticType::Bytes,
        }
    }

    fn mismatch(&self, expected: SemanticType) -> Error {
        Error::TypeMismatch {
            expected,
            actual: self.semantic_type(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            TypedValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            TypedValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            TypedValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            TypedValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            TypedValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            TypedValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Text payload, or a `TypeMismatch` error
    pub fn try_text(&self) -> Result<&str> {
        self.as_text().ok_or_else(|| self.mismatch(SemanticType::Text))
    }

    /// Number payload, or a `TypeMismatch` error
    pub fn try_number(&self) -> Result<f64> {
        self.as_number().ok_or_else(|| self.mismatch(SemanticType::Number))
    }

    /// Boolean payload, or a `TypeMismatch` error
    pub fn try_boolean(&self) -> Result<bool> {
        self.as_boolean().ok_or_else(|| self.mismatch(SemanticType::Boolean))
    }

    /// Object payload, or a `TypeMismatch` error
    pub fn try_object(&self) -> Result<&Map<String, Value>> {
        self.as_object().ok_or_else(|| self.mismatch(SemanticType::Object))
    }

    /// List payload, or a `TypeMismatch` error
    pub fn try_list(&self) -> Result<&[Value]> {
        self.as_list().ok_or_else(|| self.mismatch(SemanticType::List))
    }

    /// Bytes payload, or a `TypeMismatch` error
    pub fn try_bytes(&self) -> Result<&[u8]> {
        self.as_bytes().ok_or_else(|| self.mismatch(SemanticType::Bytes))
    }
}

impl From<String> for TypedValue {
    fn from(text: String) -> Self {
        TypedValue::Text(text)
    }
}

impl From<&str> for TypedValue {
    fn from(text: &str) -> Self {
        TypedValue::Text(text.to_string())
    }
}

impl From<f64> for TypedValue {
    fn from(n: f64) -> Self {
        TypedValue::Number(n)
    }
}

impl From<bool> for TypedValue {
    fn from(b: bool) -> Self {
        TypedValue::Boolean(b)
    }
}

impl From<Vec<u8>> for TypedValue {
    fn from(bytes: Vec<u8>) -> Self {
        TypedValue::Bytes(bytes)
    }
}

impl From<Map<String, Value>> for TypedValue {
    fn from(map: Map<String, Value>) -> Self {
        TypedValue::Object(map)
    }
}

impl From<Vec<Value>> for TypedValue {
    fn from(items: Vec<Value>) -> Self {
        TypedValue::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_semantic_type_parsing_accepts_aliases() {
        assert_eq!("string".parse::<SemanticType>().unwrap(), SemanticType::Text);
        assert_eq!("byteArray".parse::<SemanticType>().unwrap(), SemanticType::Bytes);
        assert_eq!("array".parse::<SemanticType>().unwrap(), SemanticType::List);
        assert_eq!(" Boolean ".parse::<SemanticType>().unwrap(), SemanticType::Boolean);
        assert!("tuple".parse::<SemanticType>().is_err());
    }

    #[test]
    fn test_semantic_type_display_round_trips() {
        for ty in SemanticType::ALL {
            assert_eq!(ty.to_string().parse::<SemanticType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_typed_value_reports_its_tag() {
        assert_eq!(TypedValue::from("a").semantic_type(), SemanticType::Text);
        assert_eq!(TypedValue::from(1.5).semantic_type(), SemanticType::Number);
        assert_eq!(TypedValue::from(vec![1u8]).semantic_type(), SemanticType::Bytes);
        assert_eq!(TypedValue::List(vec![]).semantic_type(), SemanticType::List);
    }

    #[test]
    fn test_try_accessors() {
        let value = TypedValue::from("hello");
        assert_eq!(value.try_text().unwrap(), "hello");

        let err = value.try_bytes().unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch {
                expected: SemanticType::Bytes,
                actual: SemanticType::Text
            }
        ));
    }

    #[test]
    fn test_typed_value_serialization_is_tagged() {
        let value = TypedValue::Bytes(vec![104, 105]);
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, json!({"type": "bytes", "value": [104, 105]}));
    }
}
