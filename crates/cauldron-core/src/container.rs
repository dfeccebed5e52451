//! Lazily converting, memoizing value holder
//!
//! A [`ValueContainer`] holds one logical value across every representation
//! that has been materialized so far. Reads of a missing representation
//! convert from a resident one and cache the result; writes replace the
//! whole cache.
//!
//! Copyright (c) 2025 Cauldron Team
//! Licensed under the Apache-2.0 license

use crate::conversion::{ConversionMatrix, Converter};
use crate::error::{Error, Result};
use crate::types::{SemanticType, TypedValue};

/// Holds one logical value and its materialized representations
#[derive(Debug, Clone)]
pub struct ValueContainer<C = ConversionMatrix> {
    /// Materialized representations in insertion order; never empty
    entries: Vec<(SemanticType, TypedValue)>,
    converter: C,
}

impl ValueContainer<ConversionMatrix> {
    /// Create a container around `value` using the standard conversion table
    pub fn new(value: TypedValue) -> Self {
        Self::with_converter(value, ConversionMatrix)
    }
}

impl<C: Converter> ValueContainer<C> {
    /// Create a container with a custom converter
    pub fn with_converter(value: TypedValue, converter: C) -> Self {
        Self {
            entries: vec![(value.semantic_type(), value)],
            converter,
        }
    }

    /// Get the value as `target`, converting and caching on a miss
    ///
    /// On a miss the source is the first resident representation, in
    /// insertion order, that has a conversion to `target`.
    pub fn get(&mut self, target: SemanticType) -> Result<&TypedValue> {
        if let Some(index) = self.position(target) {
            return Ok(&self.entries[index].1);
        }

        let (from, source) = self
            .entries
            .iter()
            .find(|(ty, _)| self.converter.supports(*ty, target))
            .ok_or(Error::ConversionUnavailable {
                from: self.current_type(),
                to: target,
            })?;

        log::debug!("Converting container value from {} to {}", from, target);
        let converted = self.converter.convert(*from, target, source)?;

        let index = self.entries.len();
        self.entries.push((target, converted));
        Ok(&self.entries[index].1)
    }

    /// Replace the container's contents with a single new representation
    ///
    /// Every previously cached representation is discarded.
    pub fn set(&mut self, value: TypedValue) {
        self.entries.clear();
        self.entries.push((value.semantic_type(), value));
    }

    /// Whether `ty` is already materialized
    pub fn contains(&self, ty: SemanticType) -> bool {
        self.position(ty).is_some()
    }

    /// Materialized types in insertion order
    pub fn resident_types(&self) -> Vec<SemanticType> {
        self.entries.iter().map(|(ty, _)| *ty).collect()
    }

    /// The value installed by the last `new`/`set`
    pub fn current(&self) -> &TypedValue {
        &self.entries[0].1
    }

    /// Type of the value installed by the last `new`/`set`
    pub fn current_type(&self) -> SemanticType {
        self.entries[0].0
    }

    /// Consume the container, returning the value installed by the last `new`/`set`
    pub fn into_current(mut self) -> TypedValue {
        self.entries.swap_remove(0).1
    }

    /// The converter used on cache misses
    pub fn converter(&self) -> &C {
        &self.converter
    }

    fn position(&self, ty: SemanticType) -> Option<usize> {
        self.entries.iter().position(|(resident, _)| *resident == ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;

    /// Standard table that counts conversions performed
    #[derive(Default)]
    struct CountingConverter {
        calls: Cell<usize>,
    }

    impl Converter for CountingConverter {
        fn supports(&self, from: SemanticType, to: SemanticType) -> bool {
            ConversionMatrix.supports(from, to)
        }

        fn convert(&self, from: SemanticType, to: SemanticType, value: &TypedValue) -> Result<TypedValue> {
            self.calls.set(self.calls.get() + 1);
            ConversionMatrix.convert(from, to, value)
        }
    }

    #[test]
    fn test_new_container_holds_one_entry() {
        let container = ValueContainer::new(TypedValue::from("abc"));
        assert_eq!(container.resident_types(), vec![SemanticType::Text]);
        assert_eq!(container.current(), &TypedValue::from("abc"));
    }

    #[test]
    fn test_get_resident_type_is_a_cache_hit() {
        let mut container = ValueContainer::with_converter(TypedValue::from("abc"), CountingConverter::default());
        assert_eq!(container.get(SemanticType::Text).unwrap(), &TypedValue::from("abc"));
        assert_eq!(container.converter().calls.get(), 0);
    }

    #[test]
    fn test_get_converts_once_and_memoizes() {
        let mut container = ValueContainer::with_converter(TypedValue::from("abc"), CountingConverter::default());

        let first = container.get(SemanticType::Bytes).unwrap().clone();
        let second = container.get(SemanticType::Bytes).unwrap().clone();

        assert_eq!(first, TypedValue::Bytes(b"abc".to_vec()));
        assert_eq!(first, second);
        assert_eq!(container.converter().calls.get(), 1);
        assert_eq!(container.resident_types(), vec![SemanticType::Text, SemanticType::Bytes]);
    }

    #[test]
    fn test_set_discards_cached_representations() {
        let mut container = ValueContainer::new(TypedValue::from("12"));
        assert_eq!(container.get(SemanticType::Number).unwrap(), &TypedValue::Number(12.0));

        container.set(TypedValue::from("34"));
        assert_eq!(container.resident_types(), vec![SemanticType::Text]);
        assert_eq!(container.get(SemanticType::Number).unwrap(), &TypedValue::Number(34.0));
    }

    #[test]
    fn test_miss_falls_back_to_a_resident_type_with_a_conversion() {
        let mut container = ValueContainer::new(TypedValue::Object(
            json!({"a": 1}).as_object().unwrap().clone(),
        ));
        container.get(SemanticType::List).unwrap();

        // Object has no Number conversion, but the cached List does
        assert_eq!(container.get(SemanticType::Number).unwrap(), &TypedValue::Number(1.0));
    }

    #[test]
    fn test_unavailable_conversion_is_reported() {
        let mut container = ValueContainer::new(TypedValue::Object(Default::default()));
        let err = container.get(SemanticType::Boolean).unwrap_err();
        assert!(matches!(
            err,
            Error::ConversionUnavailable {
                from: SemanticType::Object,
                to: SemanticType::Boolean
            }
        ));
        assert_eq!(container.resident_types(), vec![SemanticType::Object]);
    }

    #[test]
    fn test_failed_conversion_leaves_cache_untouched() {
        let mut container = ValueContainer::new(TypedValue::from("{broken"));
        let err = container.get(SemanticType::Object).unwrap_err();
        assert!(matches!(err, Error::ConversionFailed { .. }));
        assert!(!container.contains(SemanticType::Object));
    }

    #[test]
    fn test_into_current_returns_last_set_value() {
        let mut container = ValueContainer::new(TypedValue::from("x"));
        container.set(TypedValue::Number(3.0));
        container.get(SemanticType::Text).unwrap();
        assert_eq!(container.into_current(), TypedValue::Number(3.0));
    }
}
