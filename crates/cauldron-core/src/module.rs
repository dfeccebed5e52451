//! Module descriptors and the module operation contract
//!
//! A module is a named, typed transformation unit: static metadata plus one
//! operation from a converted input value and resolved options to a new
//! value. Descriptors are assembled with [`ModuleDescriptorBuilder`] and
//! validated when a registry is built.

use crate::options::ResolvedOptions;
use crate::types::{SemanticType, TypedValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The single capability a module exposes
pub trait Operation: Send + Sync {
    /// Run the module on an input already converted to its declared input type
    fn run(&self, input: &TypedValue, options: &ResolvedOptions) -> anyhow::Result<TypedValue>;
}

impl<F> Operation for F
where
    F: Fn(&TypedValue, &ResolvedOptions) -> anyhow::Result<TypedValue> + Send + Sync,
{
    fn run(&self, input: &TypedValue, options: &ResolvedOptions) -> anyhow::Result<TypedValue> {
        self(input, options)
    }
}

/// Kind of a declared configuration option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "choices", rename_all = "lowercase")]
pub enum OptionKind {
    Text,
    Number,
    Boolean,
    /// One value out of a fixed list
    Choice(Vec<String>),
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionKind::Text => write!(f, "text"),
            OptionKind::Number => write!(f, "number"),
            OptionKind::Boolean => write!(f, "boolean"),
            OptionKind::Choice(choices) => write!(f, "one of [{}]", choices.join(", ")),
        }
    }
}

/// A concrete option value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl OptionValue {
    /// Whether this value is acceptable for an option of `kind`
    pub fn matches(&self, kind: &OptionKind) -> bool {
        match (kind, self) {
            (OptionKind::Text, OptionValue::Text(_)) => true,
            (OptionKind::Number, OptionValue::Number(_)) => true,
            (OptionKind::Boolean, OptionValue::Boolean(_)) => true,
            (OptionKind::Choice(choices), OptionValue::Text(choice)) => choices.contains(choice),
            _ => false,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Boolean(b) => write!(f, "{}", b),
            OptionValue::Number(n) => write!(f, "{}", crate::conversion::format_number(*n)),
            OptionValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// Declaration of one configuration option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub kind: OptionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<OptionValue>,
    #[serde(default)]
    pub required: bool,
}

impl OptionSpec {
    fn new(name: impl Into<String>, kind: OptionKind) -> Self {
        Self {
            name: name.into(),
            label: None,
            kind,
            default: None,
            required: false,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, OptionKind::Text)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, OptionKind::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, OptionKind::Boolean)
    }

    pub fn choice<I, S>(name: impl Into<String>, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, OptionKind::Choice(choices.into_iter().map(Into::into).collect()))
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<OptionValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Boolean(b)
    }
}

impl From<f64> for OptionValue {
    fn from(n: f64) -> Self {
        OptionValue::Number(n)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Text(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Text(s)
    }
}

/// Static metadata plus operation for one module, prior to registration
#[derive(Clone)]
pub struct ModuleDescriptor {
    /// Unique identity, immutable for the process lifetime
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Category label
    pub category: String,
    pub description: Option<String>,
    pub input_type: Option<SemanticType>,
    pub output_type: Option<SemanticType>,
    pub options: Vec<OptionSpec>,
    pub operation: Option<Arc<dyn Operation>>,
}

impl ModuleDescriptor {
    /// Start building a descriptor
    pub fn builder(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> ModuleDescriptorBuilder {
        ModuleDescriptorBuilder::new(id, name, category)
    }
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("category", &self.category)
            .field("input_type", &self.input_type)
            .field("output_type", &self.output_type)
            .field("options", &self.options)
            .field("has_operation", &self.operation.is_some())
            .finish()
    }
}

/// Builder for module descriptors
pub struct ModuleDescriptorBuilder {
    descriptor: ModuleDescriptor,
}

impl ModuleDescriptorBuilder {
    /// Create a new descriptor builder
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            descriptor: ModuleDescriptor {
                id: id.into(),
                name: name.into(),
                category: category.into(),
                description: None,
                input_type: None,
                output_type: None,
                options: Vec::new(),
                operation: None,
            },
        }
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.descriptor.description = Some(description.into());
        self
    }

    /// Set the declared input type
    pub fn input(mut self, ty: SemanticType) -> Self {
        self.descriptor.input_type = Some(ty);
        self
    }

    /// Set the declared output type
    pub fn output(mut self, ty: SemanticType) -> Self {
        self.descriptor.output_type = Some(ty);
        self
    }

    /// Declare an option
    pub fn option(mut self, spec: OptionSpec) -> Self {
        self.descriptor.options.push(spec);
        self
    }

    /// Set the operation from a closure
    pub fn run<F>(mut self, f: F) -> Self
    where
        F: Fn(&TypedValue, &ResolvedOptions) -> anyhow::Result<TypedValue> + Send + Sync + 'static,
    {
        self.descriptor.operation = Some(Arc::new(f));
        self
    }

    /// Set the operation from a shared trait object
    pub fn operation(mut self, operation: Arc<dyn Operation>) -> Self {
        self.descriptor.operation = Some(operation);
        self
    }

    /// Finish; validation happens at registration
    pub fn build(self) -> ModuleDescriptor {
        self.descriptor
    }
}
