//! Error types for the Cauldron core library
//!
//! This module defines the error taxonomy of the recipe engine, using
//! thiserror for the error definitions and anyhow for the underlying causes
//! raised by conversions and module operations.

use crate::types::SemanticType;
use thiserror::Error;

/// Main error type for Cauldron operations
#[derive(Error, Debug)]
pub enum Error {
    /// A module descriptor failed validation at registry build time
    #[error("Registration failed for module '{module_id}': {field} {message}")]
    Registration {
        module_id: String,
        field: String,
        message: String,
    },

    /// A pipeline step referenced an unregistered module
    #[error("Module not found: '{module_id}'")]
    ModuleNotFound { module_id: String },

    /// No conversion exists from any resident representation to the target
    #[error("No conversion available from {from} to {to}")]
    ConversionUnavailable { from: SemanticType, to: SemanticType },

    /// A registered conversion raised while transforming the value
    #[error("Conversion from {from} to {to} failed: {source}")]
    ConversionFailed {
        from: SemanticType,
        to: SemanticType,
        #[source]
        source: anyhow::Error,
    },

    /// Supplied options do not satisfy the module's declared option set
    #[error("Invalid options for module '{module_id}': {message}")]
    InvalidOptions {
        module_id: String,
        option: Option<String>,
        message: String,
    },

    /// The module's own operation raised
    #[error("Module '{module_id}' failed: {source}")]
    ModuleRuntime {
        module_id: String,
        #[source]
        source: anyhow::Error,
    },

    /// The module returned a value whose tag differs from its declared output
    #[error("Module '{module_id}' declared {declared} output but produced {produced}")]
    OutputTypeMismatch {
        module_id: String,
        declared: SemanticType,
        produced: SemanticType,
    },

    /// A payload accessor was used on the wrong representation
    #[error("Type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        expected: SemanticType,
        actual: SemanticType,
    },

    /// Malformed recipe document
    #[error("Invalid recipe: {message}")]
    Recipe { message: String },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a registration error for a descriptor field
    pub fn registration(
        module_id: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::Registration {
            module_id: module_id.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid options error, optionally naming the offending option
    pub fn invalid_options(
        module_id: impl Into<String>,
        option: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Error::InvalidOptions {
            module_id: module_id.into(),
            option: option.map(str::to_string),
            message: message.into(),
        }
    }

    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Registration { .. } => "RegistrationError",
            Error::ModuleNotFound { .. } => "ModuleNotFound",
            Error::ConversionUnavailable { .. } => "ConversionUnavailable",
            Error::ConversionFailed { .. } => "ConversionFailed",
            Error::InvalidOptions { .. } => "InvalidOptions",
            Error::ModuleRuntime { .. } | Error::OutputTypeMismatch { .. } => "ModuleRuntimeError",
            Error::TypeMismatch { .. } => "TypeMismatch",
            Error::Recipe { .. } => "RecipeError",
            Error::Json { .. } => "JsonError",
            Error::Io { .. } => "IoError",
        }
    }
}

/// A pipeline step failed; the executor stopped at `step_index`
#[derive(Error, Debug)]
#[error("Step {step_index} ('{module_id}') failed: {cause}")]
pub struct StepFailure {
    /// Zero-based position of the failing step
    pub step_index: usize,
    /// Identity of the module the step referenced
    pub module_id: String,
    /// What went wrong
    #[source]
    pub cause: Error,
}

impl StepFailure {
    pub fn new(step_index: usize, module_id: impl Into<String>, cause: Error) -> Self {
        Self {
            step_index,
            module_id: module_id.into(),
            cause,
        }
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}
