//! Option resolution for module invocations
//!
//! Supplied option values arrive as loosely typed JSON (from recipe files or
//! the command line). Resolution checks them against the module's declared
//! option set and merges in declared defaults, so module operations only
//! ever see well-typed values.

use crate::error::{Error, Result};
use crate::module::{OptionKind, OptionSpec, OptionValue};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Fully resolved option values handed to a module operation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedOptions {
    values: BTreeMap<String, OptionValue>,
}

impl ResolvedOptions {
    /// Build directly from pairs; mainly useful when calling operations by hand
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<OptionValue>,
    {
        Self {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(OptionValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(OptionValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Boolean option; absent means false
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.values.get(name), Some(OptionValue::Boolean(true)))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn option_value_from_json(value: &Value, kind: &OptionKind) -> Option<OptionValue> {
    let candidate = match value {
        Value::Bool(b) => OptionValue::Boolean(*b),
        Value::Number(n) => OptionValue::Number(n.as_f64()?),
        Value::String(s) => OptionValue::Text(s.clone()),
        _ => return None,
    };
    candidate.matches(kind).then_some(candidate)
}

/// Check `supplied` against `specs` and merge declared defaults
///
/// Unknown option names, values of the wrong kind, and missing required
/// options are all `InvalidOptions`.
pub fn resolve_options(
    module_id: &str,
    specs: &[OptionSpec],
    supplied: &Map<String, Value>,
) -> Result<ResolvedOptions> {
    if let Some(unknown) = supplied.keys().find(|name| !specs.iter().any(|s| &s.name == *name)) {
        return Err(Error::invalid_options(
            module_id,
            Some(unknown.as_str()),
            format!("unknown option '{}'", unknown),
        ));
    }

    let mut values = BTreeMap::new();
    for spec in specs {
        match supplied.get(&spec.name) {
            Some(Value::Null) | None => {
                if let Some(default) = &spec.default {
                    values.insert(spec.name.clone(), default.clone());
                } else if spec.required {
                    return Err(Error::invalid_options(
                        module_id,
                        Some(spec.name.as_str()),
                        format!("missing required option '{}'", spec.name),
                    ));
                }
            }
            Some(raw) => {
                let value = option_value_from_json(raw, &spec.kind).ok_or_else(|| {
                    Error::invalid_options(
                        module_id,
                        Some(spec.name.as_str()),
                        format!("option '{}' expects {}, got {}", spec.name, spec.kind, raw),
                    )
                })?;
                values.insert(spec.name.clone(), value);
            }
        }
    }

    Ok(ResolvedOptions { values })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn specs() -> Vec<OptionSpec> {
        vec![
            OptionSpec::number("indent").default_value(2.0),
            OptionSpec::text("pattern").required(),
            OptionSpec::choice("spaces", ["%20", "+"]).default_value("%20"),
            OptionSpec::boolean("uppercase"),
        ]
    }

    fn supplied(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_defaults_are_merged() {
        let resolved = resolve_options("m", &specs(), &supplied(json!({"pattern": "a+"}))).unwrap();
        assert_eq!(resolved.number("indent"), Some(2.0));
        assert_eq!(resolved.text("spaces"), Some("%20"));
        assert_eq!(resolved.text("pattern"), Some("a+"));
        assert!(!resolved.flag("uppercase"));
        assert!(resolved.get("uppercase").is_none());
    }

    #[test]
    fn test_supplied_values_override_defaults() {
        let resolved = resolve_options(
            "m",
            &specs(),
            &supplied(json!({"pattern": "x", "indent": 4, "spaces": "+", "uppercase": true})),
        )
        .unwrap();
        assert_eq!(resolved.number("indent"), Some(4.0));
        assert_eq!(resolved.text("spaces"), Some("+"));
        assert!(resolved.flag("uppercase"));
    }

    #[test]
    fn test_missing_required_option() {
        let err = resolve_options("regex_extract", &specs(), &Map::new()).unwrap_err();
        match err {
            Error::InvalidOptions { module_id, option, .. } => {
                assert_eq!(module_id, "regex_extract");
                assert_eq!(option.as_deref(), Some("pattern"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_null_counts_as_missing() {
        let err = resolve_options("m", &specs(), &supplied(json!({"pattern": null}))).unwrap_err();
        assert!(err.to_string().contains("missing required option 'pattern'"));
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let err = resolve_options("m", &specs(), &supplied(json!({"pattern": "x", "indent": "4"}))).unwrap_err();
        assert!(err.to_string().contains("option 'indent' expects number"));

        let err = resolve_options("m", &specs(), &supplied(json!({"pattern": "x", "spaces": "-"}))).unwrap_err();
        assert!(err.to_string().contains("expects one of [%20, +]"));
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let err = resolve_options("m", &specs(), &supplied(json!({"pattern": "x", "indnet": 4}))).unwrap_err();
        assert!(err.to_string().contains("unknown option 'indnet'"));
    }
}
