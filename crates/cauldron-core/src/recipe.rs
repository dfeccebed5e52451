//! Recipe documents
//!
//! A recipe is a named, serializable list of pipeline steps. Recipes can be
//! checked against a registry without running them: every module must
//! exist, every step's options must resolve, and every step's input type
//! must be reachable from the previous output through the conversion table.

use crate::conversion::{ConversionMatrix, Converter};
use crate::error::{Error, Result, StepFailure};
use crate::registry::ModuleRegistry;
use crate::types::SemanticType;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// One module invocation: identity plus supplied options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineStep {
    pub module: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
}

impl PipelineStep {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            options: Map::new(),
        }
    }

    /// Supply an option value
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }
}

/// A named pipeline definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub steps: Vec<PipelineStep>,
}

impl Recipe {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            steps: Vec::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a step
    pub fn step(mut self, step: PipelineStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Parse a JSON recipe document
    pub fn from_json(text: &str) -> Result<Self> {
        let recipe: Recipe = serde_json::from_str(text)?;
        recipe.validate()?;
        Ok(recipe)
    }

    /// Load a JSON recipe file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            message: format!("failed to read recipe {}", path.display()),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Structural checks that need no registry
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Recipe {
                message: "recipe name must not be empty".to_string(),
            });
        }
        if let Some(index) = self.steps.iter().position(|s| s.module.trim().is_empty()) {
            return Err(Error::Recipe {
                message: format!("step {} has an empty module identity", index),
            });
        }
        Ok(())
    }

    /// Check the recipe against `registry` for an initial value of type `initial`
    ///
    /// Returns the type the recipe would produce.
    pub fn check(&self, registry: &ModuleRegistry, initial: SemanticType) -> std::result::Result<SemanticType, StepFailure> {
        let matrix = ConversionMatrix;
        let mut current = initial;

        for (index, step) in self.steps.iter().enumerate() {
            let fail = |cause: Error| StepFailure::new(index, step.module.clone(), cause);

            let module = registry.lookup(&step.module).map_err(fail)?;
            if !matrix.supports(current, module.input_type()) {
                return Err(fail(Error::ConversionUnavailable {
                    from: current,
                    to: module.input_type(),
                }));
            }
            module.resolve_options(&step.options).map_err(fail)?;
            current = module.output_type();
        }

        Ok(current)
    }
}
