//! Cauldron Core - Typed value pipelines for data transformation recipes
//!
//! This crate chains named transformation modules into pipelines. A single
//! logical value flows through the steps inside a memoizing container that
//! converts it on demand between six semantic representations.
//!
//! # Main Components
//!
//! - **Types**: `SemanticType` and the tagged `TypedValue` payload
//! - **Conversion Matrix**: the fixed table of conversions between types
//! - **Value Container**: lazily converting, memoizing value holder
//! - **Module Registry**: validated, immutable set of module descriptors
//! - **Pipeline Executor**: runs steps in order, halting on the first failure
//! - **Built-in Modules**: encoders, hashes, ciphers, extractors and more
//!
//! # Example
//!
//! ```no_run
//! use cauldron_core::{modules, PipelineExecutor, PipelineStep, TypedValue};
//! use std::sync::Arc;
//!
//! fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(modules::builtin_registry()?);
//!     let executor = PipelineExecutor::new(registry);
//!
//!     let steps = vec![PipelineStep::new("base64_decode")];
//!     let output = executor.run(&steps, TypedValue::from("SGVsbG8="))?;
//!     assert_eq!(output.value, TypedValue::Bytes(b"Hello".to_vec()));
//!     Ok(())
//! }
//! ```

pub mod container;
pub mod conversion;
pub mod error;
pub mod module;
pub mod modules;
pub mod options;
pub mod pipeline;
pub mod recipe;
pub mod registry;
pub mod types;

// Re-export main types for convenience
pub use container::ValueContainer;
pub use conversion::{ConversionFn, ConversionMatrix, Converter};
pub use error::{Error, Result, StepFailure};
pub use module::{
    ModuleDescriptor, ModuleDescriptorBuilder, Operation, OptionKind, OptionSpec, OptionValue,
};
pub use options::{resolve_options, ResolvedOptions};
pub use pipeline::{PipelineExecutor, PipelineOutput, PipelineRun, StepTrace};
pub use recipe::{PipelineStep, Recipe};
pub use registry::{ModuleInfo, ModuleRegistry, RegisteredModule, RegistryBuilder};
pub use types::{SemanticType, TypedValue};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
