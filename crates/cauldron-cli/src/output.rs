//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable), with specialized
//! rendering for pipeline values, step traces and module listings.

use crate::cli::OutputFormat;
use crate::error::Result;
use cauldron_core::conversion::format_number;
use cauldron_core::{ModuleInfo, StepTrace, TypedValue};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::Value;
use is_terminal::IsTerminal;
use std::io::{self, Write};
use std::time::Duration;
use tracing::trace;

/// Trait for formatting output with specialized support for common types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            // Human callers use the specialized renderers; pretty JSON is the fallback
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, progress: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: progress && !quiet && io::stderr().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(format: OutputFormat, use_color: bool, quiet: bool, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color,
            show_progress: false, // No progress bars with custom writers
            quiet,
            writer,
        }
    }

    /// Whether the human renderers are in use
    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!(bytes = formatted.len(), "Outputting data");

        if self.format == OutputFormat::Yaml {
            // serde_yaml already terminates the document
            self.write(&formatted)
        } else {
            self.writeln(&formatted)
        }
    }

    /// Write a pipeline value for a human reader
    pub fn value(&mut self, value: &TypedValue) -> Result<()> {
        let rendered = format_value_human(value)?;
        self.writeln(&rendered)
    }

    /// Write a step trace as a table
    pub fn trace(&mut self, trace: &[StepTrace]) -> Result<()> {
        let rows = trace
            .iter()
            .map(|step| {
                vec![
                    step.index.to_string(),
                    step.module_id.clone(),
                    step.input_type.to_string(),
                    if step.bridged { "yes".to_string() } else { "-".to_string() },
                    step.output_type.to_string(),
                    format!("{:.3}", step.elapsed.as_secs_f64() * 1000.0),
                ]
            })
            .collect();
        self.table(&["#", "module", "input", "bridged", "output", "ms"], rows)
    }

    /// Write a module listing as a table
    pub fn modules(&mut self, modules: &[ModuleInfo]) -> Result<()> {
        let rows = modules
            .iter()
            .map(|m| {
                vec![
                    m.id.clone(),
                    m.category.clone(),
                    format!("{} → {}", m.input_type, m.output_type),
                    m.name.clone(),
                ]
            })
            .collect();
        self.table(&["id", "category", "types", "name"], rows)
    }

    /// Write the details of one module
    pub fn module_details(&mut self, module: &ModuleInfo) -> Result<()> {
        let rendered = format_module_human(module);
        self.write(&rendered)
    }

    /// Create a spinner for indeterminate progress
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(default_spinner_style());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        // Calculate column widths
        let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let header_row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" │ ");

        if self.use_color {
            self.writeln(&header_row.bold().to_string())?;
        } else {
            self.writeln(&header_row)?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let row_str = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    if i < widths.len() {
                        format!("{:width$}", cell, width = widths[i])
                    } else {
                        cell.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(" │ ");
            self.writeln(row_str.trim_end())?;
        }

        Ok(())
    }
}

/// Helper function to create a spinner style
pub fn default_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// JSON view of a pipeline value; bytes become a lowercase hex string
pub fn value_to_json(value: &TypedValue) -> Value {
    match value {
        TypedValue::Text(s) => Value::String(s.clone()),
        TypedValue::Number(n) => cauldron_core::conversion::number_to_json(*n),
        TypedValue::Boolean(b) => Value::Bool(*b),
        TypedValue::Object(map) => Value::Object(map.clone()),
        TypedValue::List(items) => Value::Array(items.clone()),
        TypedValue::Bytes(bytes) => Value::String(hex::encode(bytes)),
    }
}

/// Render a pipeline value for a human reader
fn format_value_human(value: &TypedValue) -> Result<String> {
    Ok(match value {
        TypedValue::Text(s) => s.clone(),
        TypedValue::Number(n) => format_number(*n),
        TypedValue::Boolean(b) => b.to_string(),
        TypedValue::Object(map) => serde_json::to_string_pretty(map)?,
        TypedValue::List(items) => serde_json::to_string_pretty(items)?,
        TypedValue::Bytes(bytes) => hex::encode(bytes),
    })
}

/// Render module metadata for a human reader
fn format_module_human(module: &ModuleInfo) -> String {
    let mut output = String::new();

    output.push_str(&format!("{} ({})\n", module.name, module.id));
    output.push_str(&format!("  Category: {}\n", module.category));
    output.push_str(&format!("  Input:    {}\n", module.input_type));
    output.push_str(&format!("  Output:   {}\n", module.output_type));
    if let Some(description) = &module.description {
        output.push_str(&format!("  {}\n", description));
    }

    if module.options.is_empty() {
        output.push_str("  No options\n");
        return output;
    }

    output.push_str("  Options:\n");
    for option in &module.options {
        let mut line = format!("    {} ({})", option.name, option.kind);
        if option.required {
            line.push_str(" required");
        }
        if let Some(default) = &option.default {
            line.push_str(&format!(" default: {}", default));
        }
        if let Some(label) = &option.label {
            line.push_str(&format!(" - {}", label));
        }
        output.push_str(&line);
        output.push('\n');
    }

    output
}
