//! Module registry
//!
//! Modules are gathered into a [`RegistryBuilder`], validated one by one,
//! and frozen into an immutable [`ModuleRegistry`]. A single invalid or
//! duplicate descriptor poisons the builder: `build` then fails and no
//! registry is ever produced, so a partial module set can never be served.
//!
//! Copyright (c) 2025 Cauldron Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::module::{ModuleDescriptor, Operation, OptionKind, OptionSpec};
use crate::options::{resolve_options, ResolvedOptions};
use crate::types::{SemanticType, TypedValue};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// A validated module, owned by a registry
#[derive(Clone)]
pub struct RegisteredModule {
    id: String,
    name: String,
    category: String,
    description: Option<String>,
    input_type: SemanticType,
    output_type: SemanticType,
    options: Vec<OptionSpec>,
    operation: Arc<dyn Operation>,
}

impl RegisteredModule {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn input_type(&self) -> SemanticType {
        self.input_type
    }

    pub fn output_type(&self) -> SemanticType {
        self.output_type
    }

    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    /// Check supplied option values and merge declared defaults
    pub fn resolve_options(&self, supplied: &Map<String, Value>) -> Result<ResolvedOptions> {
        resolve_options(&self.id, &self.options, supplied)
    }

    /// Invoke the operation; errors are wrapped with the module identity
    pub fn invoke(&self, input: &TypedValue, options: &ResolvedOptions) -> Result<TypedValue> {
        let output = self
            .operation
            .run(input, options)
            .map_err(|source| Error::ModuleRuntime {
                module_id: self.id.clone(),
                source,
            })?;

        let produced = output.semantic_type();
        if produced != self.output_type {
            return Err(Error::OutputTypeMismatch {
                module_id: self.id.clone(),
                declared: self.output_type,
                produced,
            });
        }

        Ok(output)
    }

    /// Serializable summary of the module metadata
    pub fn info(&self) -> ModuleInfo {
        ModuleInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            category: self.category.clone(),
            description: self.description.clone(),
            input_type: self.input_type,
            output_type: self.output_type,
            options: self.options.clone(),
        }
    }
}

impl fmt::Debug for RegisteredModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredModule")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("input_type", &self.input_type)
            .field("output_type", &self.output_type)
            .finish()
    }
}

/// Module metadata without the operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleInfo {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_type: SemanticType,
    pub output_type: SemanticType,
    pub options: Vec<OptionSpec>,
}

/// Collects and validates descriptors before freezing them into a registry
#[derive(Default)]
pub struct RegistryBuilder {
    modules: Vec<RegisteredModule>,
    ids: HashSet<String>,
    poisoned: Option<Error>,
}

impl RegistryBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and add a descriptor
    ///
    /// A failure is returned and also remembered, so a later `build` fails
    /// with the same error.
    pub fn register(&mut self, descriptor: ModuleDescriptor) -> Result<()> {
        self.register_entry(None, descriptor)
    }

    /// Validate and add a descriptor filed under an external key
    ///
    /// The key must equal the descriptor identity.
    pub fn register_keyed(&mut self, key: &str, descriptor: ModuleDescriptor) -> Result<()> {
        self.register_entry(Some(key), descriptor)
    }

    /// Register every descriptor, stopping at the first failure
    pub fn register_all<I>(&mut self, descriptors: I) -> Result<()>
    where
        I: IntoIterator<Item = ModuleDescriptor>,
    {
        descriptors
            .into_iter()
            .try_for_each(|descriptor| self.register(descriptor))
    }

    fn register_entry(&mut self, key: Option<&str>, descriptor: ModuleDescriptor) -> Result<()> {
        if let Some(err) = &self.poisoned {
            return Err(Error::registration(
                descriptor.id,
                "registry",
                format!("builder already failed: {}", err),
            ));
        }

        match self.validate(key, descriptor) {
            Ok(module) => {
                self.ids.insert(module.id.clone());
                self.modules.push(module);
                Ok(())
            }
            Err(err) => {
                log::error!("Module registration failed: {}", err);
                let reported = clone_registration_error(&err);
                self.poisoned = Some(err);
                Err(reported)
            }
        }
    }

    fn validate(&self, key: Option<&str>, descriptor: ModuleDescriptor) -> Result<RegisteredModule> {
        let id = descriptor.id.clone();
        let fail = |field: &str, message: &str| Err(Error::registration(&id, field, message));

        if id.trim().is_empty() {
            return fail("id", "must not be empty");
        }
        if let Some(key) = key {
            if key != id {
                return fail("id", &format!("does not match registration key '{}'", key));
            }
        }
        if descriptor.name.trim().is_empty() {
            return fail("name", "must not be empty");
        }
        if descriptor.category.trim().is_empty() {
            return fail("category", "must not be empty");
        }
        let Some(input_type) = descriptor.input_type else {
            return fail("input_type", "is missing");
        };
        let Some(output_type) = descriptor.output_type else {
            return fail("output_type", "is missing");
        };
        let Some(operation) = descriptor.operation else {
            return fail("operation", "is missing");
        };
        validate_options(&id, &descriptor.options)?;
        if self.ids.contains(&id) {
            return fail("id", "is already registered");
        }

        Ok(RegisteredModule {
            id: descriptor.id,
            name: descriptor.name,
            category: descriptor.category,
            description: descriptor.description,
            input_type,
            output_type,
            options: descriptor.options,
            operation,
        })
    }

    /// Freeze into an immutable registry
    pub fn build(self) -> Result<ModuleRegistry> {
        if let Some(err) = self.poisoned {
            return Err(err);
        }

        let index = self
            .modules
            .iter()
            .enumerate()
            .map(|(i, module)| (module.id.clone(), i))
            .collect();

        log::info!("Module registry built with {} modules", self.modules.len());
        Ok(ModuleRegistry {
            modules: self.modules,
            index,
        })
    }
}

fn clone_registration_error(err: &Error) -> Error {
    match err {
        Error::Registration {
            module_id,
            field,
            message,
        } => Error::registration(module_id, field, message),
        other => Error::registration("", "registry", other.to_string()),
    }
}

fn validate_options(module_id: &str, options: &[OptionSpec]) -> Result<()> {
    let mut seen = HashSet::new();
    for spec in options {
        let field = format!("options.{}", spec.name);
        if spec.name.trim().is_empty() {
            return Err(Error::registration(module_id, "options", "option name must not be empty"));
        }
        if !seen.insert(spec.name.as_str()) {
            return Err(Error::registration(module_id, field, "is declared twice"));
        }
        if let OptionKind::Choice(choices) = &spec.kind {
            if choices.is_empty() {
                return Err(Error::registration(module_id, field, "has an empty choice list"));
            }
        }
        if let Some(default) = &spec.default {
            if !default.matches(&spec.kind) {
                return Err(Error::registration(
                    module_id,
                    field,
                    format!("default {} is not a valid {}", default, spec.kind),
                ));
            }
        }
    }
    Ok(())
}

/// Immutable, shareable set of validated modules
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    modules: Vec<RegisteredModule>,
    index: HashMap<String, usize>,
}

impl ModuleRegistry {
    /// Start a new builder
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Build a registry from descriptors in one go
    pub fn from_descriptors<I>(descriptors: I) -> Result<Self>
    where
        I: IntoIterator<Item = ModuleDescriptor>,
    {
        let mut builder = RegistryBuilder::new();
        builder.register_all(descriptors)?;
        builder.build()
    }

    /// Look up a module by identity
    pub fn lookup(&self, id: &str) -> Result<&RegisteredModule> {
        self.get(id).ok_or_else(|| Error::ModuleNotFound {
            module_id: id.to_string(),
        })
    }

    pub fn get(&self, id: &str) -> Option<&RegisteredModule> {
        self.index.get(id).map(|&i| &self.modules[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Modules in registration order, optionally filtered by category
    pub fn list(&self, category: Option<&str>) -> Vec<&RegisteredModule> {
        self.modules
            .iter()
            .filter(|m| category.map_or(true, |c| m.category.eq_ignore_ascii_case(c)))
            .collect()
    }

    /// Distinct categories in registration order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.modules
            .iter()
            .map(|m| m.category.as_str())
            .filter(|c| seen.insert(*c))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
