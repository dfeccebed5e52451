//! Check command handler

use super::utils::assemble_recipe;
use crate::cli::CheckArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use cauldron_core::modules::builtin_registry;
use cauldron_core::SemanticType;
use serde::Serialize;
use tracing::instrument;

#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    recipe: &'a str,
    valid: bool,
    steps: usize,
    input_type: SemanticType,
    output_type: SemanticType,
}

/// Handle the check command
#[instrument(skip_all, fields(recipe = args.recipe.as_deref().unwrap_or("inline")))]
pub fn handle_check(args: CheckArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let recipe = assemble_recipe(args.recipe.as_deref(), &args.steps, config)?;
    let registry = builtin_registry()?;
    let input_type = args
        .input_type
        .map(SemanticType::from)
        .unwrap_or(config.defaults.input_type);

    let output_type = recipe.check(&registry, input_type)?;

    if output.is_human() {
        output.success(&format!(
            "✓ Recipe '{}' is valid: {} → {} in {} step(s)",
            recipe.name,
            input_type,
            output_type,
            recipe.steps.len()
        ))?;
    } else {
        output.data(&CheckReport {
            recipe: &recipe.name,
            valid: true,
            steps: recipe.steps.len(),
            input_type,
            output_type,
        })?;
    }

    Ok(())
}
