//! Run command handler

use super::utils::{assemble_recipe, loggable_options, read_input, render_for_file, InputSource};
use crate::cli::RunArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::{value_to_json, OutputWriter};
use cauldron_core::modules::builtin_registry;
use cauldron_core::{PipelineExecutor, SemanticType, StepTrace};
use serde::Serialize;
use std::fs;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Machine-readable result of a run
#[derive(Debug, Serialize)]
struct RunReport<'a> {
    recipe: &'a str,
    #[serde(rename = "type")]
    value_type: SemanticType,
    value: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<&'a [StepTrace]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_to: Option<String>,
}

/// Handle the run command
#[instrument(skip_all, fields(recipe = args.recipe.as_deref().unwrap_or("inline"), steps = args.steps.len()))]
pub fn handle_run(args: RunArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let timer = Timer::with_details("run_command", args.recipe.as_deref().unwrap_or("inline"));

    let recipe = assemble_recipe(args.recipe.as_deref(), &args.steps, config)?;
    for (index, step) in recipe.steps.iter().enumerate() {
        debug!(index, module = %step.module, options = %loggable_options(&step.options), "Planned step");
    }

    let input_type = args
        .input_type
        .map(SemanticType::from)
        .unwrap_or(config.defaults.input_type);
    let source = match (&args.input, &args.input_file) {
        (Some(text), _) => InputSource::Inline(text),
        (None, Some(path)) => InputSource::File(path),
        (None, None) => InputSource::Stdin,
    };
    let initial = read_input(source, input_type)?;
    info!(input_type = %input_type, steps = recipe.steps.len(), "Starting pipeline");

    let executor = PipelineExecutor::new(Arc::new(builtin_registry()?));
    let show_trace = args.trace || config.defaults.show_trace;
    let spinner = output.spinner("Running pipeline...");

    let mut run = executor.start(&recipe.steps, initial);
    while let Some(outcome) = run.next_step() {
        match outcome {
            Ok(step) => {
                if let Some(pb) = &spinner {
                    pb.set_message(format!("step {} done: {}", step.index, step.module_id));
                }
            }
            Err(failure) => {
                if let Some(pb) = spinner {
                    pb.finish_and_clear();
                }
                warn!(step = failure.step_index, module = %failure.module_id, "Pipeline halted");
                if show_trace && output.is_human() && !run.trace().is_empty() {
                    output.section("Trace (until failure)")?;
                    output.trace(run.trace())?;
                }
                return Err(failure.into());
            }
        }
    }
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    // Convert through the run's container so cached representations are reused
    let converted = match args.as_type {
        Some(ty) => Some(run.container_mut().get(ty.into())?.clone()),
        None => None,
    };
    let finished = run.finish()?;
    let value = converted.unwrap_or(finished.value);

    if let Some(path) = &args.save_to {
        fs::write(path, render_for_file(&value)?)?;
        debug!(path = %path.display(), "Result written");
    }

    if output.is_human() {
        match &args.save_to {
            Some(path) => output.success(&format!("✓ Result ({}) saved to {}", value.semantic_type(), path.display()))?,
            None => output.value(&value)?,
        }
        if show_trace {
            output.section("Trace")?;
            output.trace(&finished.trace)?;
        }
    } else {
        output.data(&RunReport {
            recipe: &recipe.name,
            value_type: value.semantic_type(),
            value: value_to_json(&value),
            trace: show_trace.then_some(finished.trace.as_slice()),
            saved_to: args.save_to.as_ref().map(|p| p.display().to_string()),
        })?;
    }

    timer.finish();
    Ok(())
}
