//! Pipeline executor
//!
//! Runs an ordered list of module invocations through a single
//! [`ValueContainer`]. Each step converts the container value to the
//! module's input type, resolves options, invokes the module and installs
//! the result. The first failing step stops the run; the container keeps the
//! last successfully installed value.
//!
//! Copyright (c) 2025 Cauldron Team
//! Licensed under the Apache-2.0 license

use crate::container::ValueContainer;
use crate::conversion::{ConversionMatrix, Converter};
use crate::error::{Error, StepFailure};
use crate::recipe::PipelineStep;
use crate::registry::ModuleRegistry;
use crate::types::{SemanticType, TypedValue};
use serde::{Serialize, Serializer};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Record of one executed step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepTrace {
    /// Zero-based step position
    pub index: usize,
    pub module_id: String,
    /// Type the module requested
    pub input_type: SemanticType,
    /// Whether a conversion was needed to produce the input
    pub bridged: bool,
    pub output_type: SemanticType,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_micros() as f64 / 1000.0)
}

/// Result of a completed pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Output of the last step (or the initial value for an empty pipeline)
    pub value: TypedValue,
    pub trace: Vec<StepTrace>,
}

impl PipelineOutput {
    pub fn semantic_type(&self) -> SemanticType {
        self.value.semantic_type()
    }
}

/// Executes pipelines against a shared, read-only registry
#[derive(Debug, Clone)]
pub struct PipelineExecutor {
    registry: Arc<ModuleRegistry>,
}

impl PipelineExecutor {
    /// Create an executor over `registry`
    pub fn new(registry: Arc<ModuleRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Begin a step-by-step run over a fresh container
    pub fn start<'a>(&'a self, steps: &'a [PipelineStep], initial: TypedValue) -> PipelineRun<'a> {
        PipelineRun {
            registry: &self.registry,
            steps,
            container: ValueContainer::new(initial),
            next: 0,
            trace: Vec::new(),
        }
    }

    /// Run every step and return the last step's output
    pub fn run(&self, steps: &[PipelineStep], initial: TypedValue) -> Result<PipelineOutput, StepFailure> {
        self.start(steps, initial).finish()
    }

    /// Run every step against a caller-owned container
    ///
    /// On failure the container holds the output of the last successful
    /// step, so the caller can inspect it or resume from the failing step.
    pub fn run_in<C: Converter>(
        &self,
        steps: &[PipelineStep],
        container: &mut ValueContainer<C>,
    ) -> Result<Vec<StepTrace>, StepFailure> {
        self.resume_at(steps, 0, container)
    }

    /// Run steps `start..` against an existing container
    ///
    /// A `start` past the end of `steps` runs nothing.
    pub fn resume_at<C: Converter>(
        &self,
        steps: &[PipelineStep],
        start: usize,
        container: &mut ValueContainer<C>,
    ) -> Result<Vec<StepTrace>, StepFailure> {
        let remaining = steps.get(start..).unwrap_or_default();
        if start > 0 {
            log::debug!("Resuming pipeline at step {} of {}", start, steps.len());
        }

        remaining
            .iter()
            .enumerate()
            .map(|(offset, step)| execute_step(&self.registry, start + offset, step, container))
            .collect()
    }
}

/// A pipeline run advanced one step at a time by the caller
///
/// Dropping the run between steps abandons it; nothing further is executed.
pub struct PipelineRun<'a, C: Converter = ConversionMatrix> {
    registry: &'a ModuleRegistry,
    steps: &'a [PipelineStep],
    container: ValueContainer<C>,
    next: usize,
    trace: Vec<StepTrace>,
}

impl<'a, C: Converter> PipelineRun<'a, C> {
    /// Execute the next step, or `None` once every step has run
    ///
    /// A failed step is not skipped: calling again retries it.
    pub fn next_step(&mut self) -> Option<Result<&StepTrace, StepFailure>> {
        let step = self.steps.get(self.next)?;
        match execute_step(self.registry, self.next, step, &mut self.container) {
            Ok(trace) => {
                self.next += 1;
                self.trace.push(trace);
                self.trace.last().map(Ok)
            }
            Err(failure) => Some(Err(failure)),
        }
    }

    /// Index of the step that runs next
    pub fn position(&self) -> usize {
        self.next
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn is_complete(&self) -> bool {
        self.next >= self.steps.len()
    }

    pub fn container(&self) -> &ValueContainer<C> {
        &self.container
    }

    /// Mutable access between steps, e.g. to correct the value before a retry
    pub fn container_mut(&mut self) -> &mut ValueContainer<C> {
        &mut self.container
    }

    pub fn trace(&self) -> &[StepTrace] {
        &self.trace
    }

    /// Run the remaining steps and return the final value
    pub fn finish(mut self) -> Result<PipelineOutput, StepFailure> {
        while let Some(outcome) = self.next_step() {
            outcome?;
        }

        Ok(PipelineOutput {
            value: self.container.into_current(),
            trace: self.trace,
        })
    }

    /// Stop without running the remaining steps; returns the container as it stands
    pub fn abandon(self) -> ValueContainer<C> {
        log::debug!(
            "Pipeline abandoned after {} of {} steps",
            self.next,
            self.steps.len()
        );
        self.container
    }
}

fn execute_step<C: Converter>(
    registry: &ModuleRegistry,
    index: usize,
    step: &PipelineStep,
    container: &mut ValueContainer<C>,
) -> Result<StepTrace, StepFailure> {
    apply_step(registry, index, step, container).map_err(|cause| {
        log::warn!("Pipeline step {} ('{}') failed: {}", index, step.module, cause);
        StepFailure::new(index, step.module.clone(), cause)
    })
}

fn apply_step<C: Converter>(
    registry: &ModuleRegistry,
    index: usize,
    step: &PipelineStep,
    container: &mut ValueContainer<C>,
) -> Result<StepTrace, Error> {
    let started = Instant::now();
    let module = registry.lookup(&step.module)?;

    let input_type = module.input_type();
    let bridged = !container.contains(input_type);
    log::debug!(
        "Step {} ('{}'): {} -> {}{}",
        index,
        module.id(),
        input_type,
        module.output_type(),
        if bridged { " (converting input)" } else { "" }
    );

    let input = container.get(input_type)?;
    let options = module.resolve_options(&step.options)?;
    let output = module.invoke(input, &options)?;
    container.set(output);

    Ok(StepTrace {
        index,
        module_id: module.id().to_string(),
        input_type,
        bridged,
        output_type: module.output_type(),
        elapsed: started.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{ModuleDescriptor, OptionSpec};
    use serde_json::json;

    fn registry() -> Arc<ModuleRegistry> {
        let upper = ModuleDescriptor::builder("upper", "Upper", "Text")
            .input(SemanticType::Text)
            .output(SemanticType::Text)
            .run(|input, _| Ok(TypedValue::Text(input.try_text()?.to_uppercase())))
            .build();
        let length = ModuleDescriptor::builder("length", "Length", "Analysis")
            .input(SemanticType::Bytes)
            .output(SemanticType::Number)
            .run(|input, _| Ok(TypedValue::Number(input.try_bytes()?.len() as f64)))
            .build();
        let repeat = ModuleDescriptor::builder("repeat", "Repeat", "Text")
            .input(SemanticType::Text)
            .output(SemanticType::Text)
            .option(OptionSpec::number("times").required())
            .run(|input, options| {
                let times = options.number("times").unwrap_or(1.0).max(0.0) as usize;
                Ok(TypedValue::Text(input.try_text()?.repeat(times)))
            })
            .build();
        let fail = ModuleDescriptor::builder("fail", "Fail", "Test")
            .input(SemanticType::Text)
            .output(SemanticType::Text)
            .run(|_, _| Err(anyhow::anyhow!("refused")))
            .build();

        Arc::new(ModuleRegistry::from_descriptors([upper, length, repeat, fail]).unwrap())
    }

    fn steps(ids: &[&str]) -> Vec<PipelineStep> {
        ids.iter().map(|id| PipelineStep::new(*id)).collect()
    }

    #[test]
    fn test_run_chains_steps_through_conversions() {
        let executor = PipelineExecutor::new(registry());
        let output = executor
            .run(&steps(&["upper", "length"]), TypedValue::from("abc"))
            .unwrap();

        assert_eq!(output.value, TypedValue::Number(3.0));
        assert_eq!(output.trace.len(), 2);
        assert!(!output.trace[0].bridged);
        assert!(output.trace[1].bridged);
        assert_eq!(output.trace[1].input_type, SemanticType::Bytes);
    }

    #[test]
    fn test_empty_pipeline_returns_initial_value() {
        let executor = PipelineExecutor::new(registry());
        let output = executor.run(&[], TypedValue::Boolean(true)).unwrap();
        assert_eq!(output.value, TypedValue::Boolean(true));
        assert!(output.trace.is_empty());
    }

    #[test]
    fn test_unknown_module_names_step() {
        let executor = PipelineExecutor::new(registry());
        let failure = executor
            .run(&steps(&["upper", "missing"]), TypedValue::from("x"))
            .unwrap_err();
        assert_eq!(failure.step_index, 1);
        assert_eq!(failure.module_id, "missing");
        assert!(matches!(failure.cause, Error::ModuleNotFound { .. }));
    }

    #[test]
    fn test_invalid_options_fail_before_invocation() {
        let executor = PipelineExecutor::new(registry());
        let failure = executor.run(&steps(&["repeat"]), TypedValue::from("x")).unwrap_err();
        assert!(matches!(failure.cause, Error::InvalidOptions { .. }));

        let step = PipelineStep::new("repeat").with_option("times", json!(3));
        let output = executor.run(&[step], TypedValue::from("ab")).unwrap();
        assert_eq!(output.value, TypedValue::from("ababab"));
    }

    #[test]
    fn test_failure_keeps_previous_output_in_container() {
        let executor = PipelineExecutor::new(registry());
        let pipeline = steps(&["upper", "fail", "length"]);
        let mut container = ValueContainer::new(TypedValue::from("abc"));

        let failure = executor.run_in(&pipeline, &mut container).unwrap_err();
        assert_eq!(failure.step_index, 1);
        assert_eq!(failure.module_id, "fail");
        assert!(matches!(failure.cause, Error::ModuleRuntime { .. }));
        assert_eq!(container.current(), &TypedValue::from("ABC"));
    }

    #[test]
    fn test_resume_at_skips_completed_steps() {
        let executor = PipelineExecutor::new(registry());
        let pipeline = steps(&["fail", "upper", "length"]);
        let mut container = ValueContainer::new(TypedValue::from("abcd"));

        let trace = executor.resume_at(&pipeline, 1, &mut container).unwrap();
        assert_eq!(trace.iter().map(|t| t.index).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(container.current(), &TypedValue::Number(4.0));

        assert!(executor.resume_at(&pipeline, 10, &mut container).unwrap().is_empty());
    }

    #[test]
    fn test_step_by_step_run_can_be_abandoned() {
        let executor = PipelineExecutor::new(registry());
        let pipeline = steps(&["upper", "length"]);
        let mut run = executor.start(&pipeline, TypedValue::from("abc"));

        let first = run.next_step().unwrap().unwrap();
        assert_eq!(first.module_id, "upper");
        assert_eq!(run.position(), 1);
        assert!(!run.is_complete());

        let container = run.abandon();
        assert_eq!(container.current(), &TypedValue::from("ABC"));
    }

    #[test]
    fn test_failed_step_does_not_advance_run() {
        let executor = PipelineExecutor::new(registry());
        let pipeline = steps(&["upper", "fail"]);
        let mut run = executor.start(&pipeline, TypedValue::from("abc"));

        assert!(run.next_step().unwrap().is_ok());
        assert!(run.next_step().unwrap().is_err());
        assert_eq!(run.position(), 1);
        assert_eq!(run.trace().len(), 1);
    }

    #[test]
    fn test_trace_serializes_elapsed_millis() {
        let trace = StepTrace {
            index: 0,
            module_id: "upper".to_string(),
            input_type: SemanticType::Text,
            bridged: false,
            output_type: SemanticType::Text,
            elapsed: Duration::from_millis(3),
        };
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["elapsed_ms"], json!(3.0));
        assert_eq!(json["input_type"], "text");
    }
}
