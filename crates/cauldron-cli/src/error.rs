//! Error types and handling for the CLI
//!
//! This module provides error types and utilities for handling
//! various failure modes in the CLI application.

use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from cauldron-core outside of a pipeline step
    #[error("{0}")]
    Core(#[from] cauldron_core::Error),

    /// A pipeline step failed, or a recipe check rejected a step
    #[error("{0}")]
    Step(#[from] cauldron_core::StepFailure),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Invalid file format
    #[error("Invalid file format for {}: expected {} format", path.display(), expected)]
    InvalidFormat { path: PathBuf, expected: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument combination
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// Named recipe not found in the recipes directory
    #[error("Recipe '{}' not found (looked in {})", name, dir.display())]
    RecipeNotFound { name: String, dir: PathBuf },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(_) => 2,
            Self::Step(_) => 3,
            Self::FileNotFound { .. } => 4,
            Self::InvalidFormat { .. } => 5,
            Self::Config(_) => 6,
            Self::InvalidArgs(_) => 7,
            Self::RecipeNotFound { .. } => 8,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        let mut out = format!("{} {}", "Error:".red().bold(), error);
        if let Error::Step(failure) = error {
            out.push_str(&format!("\n  {} {}", "kind:".dimmed(), failure.cause.kind()));
        }
        out
    } else {
        let mut out = format!("Error: {}", error);
        if let Error::Step(failure) = error {
            out.push_str(&format!("\n  kind: {}", failure.cause.kind()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cauldron_core::StepFailure;

    #[test]
    fn test_exit_codes_are_distinct_for_step_failures() {
        let failure = StepFailure::new(
            1,
            "json_minify",
            cauldron_core::Error::ModuleNotFound {
                module_id: "json_minify".to_string(),
            },
        );
        let error = Error::from(failure);
        assert_eq!(error.exit_code(), 3);
        assert!(!error.should_show_help());
        assert!(Error::invalid_args("x").should_show_help());
    }

    #[test]
    fn test_format_error_plain() {
        let failure = StepFailure::new(
            0,
            "nope",
            cauldron_core::Error::ModuleNotFound {
                module_id: "nope".to_string(),
            },
        );
        let text = format_error(&Error::from(failure), false);
        assert!(text.starts_with("Error: Step 0 ('nope') failed"));
        assert!(text.contains("kind: "));
    }
}
