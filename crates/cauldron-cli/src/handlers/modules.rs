//! Registry introspection handlers (`list`, `show`)

use crate::cli::{ListArgs, ShowArgs};
use crate::error::Result;
use crate::output::OutputWriter;
use cauldron_core::modules::builtin_registry;
use cauldron_core::ModuleInfo;

/// Handle the list command
pub fn handle_list(args: ListArgs, output: &mut OutputWriter) -> Result<()> {
    let registry = builtin_registry()?;
    let modules: Vec<ModuleInfo> = registry
        .list(args.category.as_deref())
        .into_iter()
        .map(|m| m.info())
        .collect();

    if !output.is_human() {
        return output.data(&modules);
    }

    if modules.is_empty() {
        output.warning(&format!(
            "No modules in category '{}'. Categories: {}",
            args.category.as_deref().unwrap_or(""),
            registry.categories().join(", ")
        ))?;
        return Ok(());
    }

    output.modules(&modules)?;
    output.info(&format!("{} module(s)", modules.len()))
}

/// Handle the show command
pub fn handle_show(args: ShowArgs, output: &mut OutputWriter) -> Result<()> {
    let registry = builtin_registry()?;
    let info = registry.lookup(&args.module)?.info();

    if output.is_human() {
        output.module_details(&info)
    } else {
        output.data(&info)
    }
}
