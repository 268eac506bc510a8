//! Emission of the state-machine class and of the debugging IR dump.

pub mod builders;
mod class;
mod printer;

use std::fmt::Write as _;

pub use class::{EmittedClass, emit_class};
pub use printer::print_node;

use crate::diagnostics::LoweringError;
use crate::ir::GeneratorIR;

/// Render a `GeneratorIR` as readable text, one section per component.
pub fn dump_ir(ir: &GeneratorIR) -> Result<String, LoweringError> {
    let mut out = String::new();
    let kind = if ir.is_async { "async generator" } else { "generator" };
    // writing into a String cannot fail
    let _ = writeln!(out, "{} {}", kind, ir.name);
    let _ = writeln!(
        out,
        "  types: yield={} return={} resume={}",
        print_node(&ir.types.yield_type)?,
        print_node(&ir.types.return_type)?,
        print_node(&ir.types.resume_type)?,
    );

    let _ = writeln!(out, "  parameters:");
    for param in &ir.parameters {
        let marker = if param.optional { "?" } else { "" };
        let _ = writeln!(out, "    {}{}: {}", param.name, marker, print_node(&param.ty)?);
    }
    let _ = writeln!(out, "  locals:");
    for local in &ir.locals {
        let init = match &local.init {
            Some(init) => format!(" = {}", print_node(init)?),
            None => String::new(),
        };
        let _ = writeln!(out, "    {}: {}{}", local.name, print_node(&local.ty)?, init);
    }

    for step in &ir.steps {
        let terminal = if step.terminal { " (terminal)" } else { "" };
        let _ = writeln!(out, "  step {}{}:", step.index, terminal);
        if let Some(start) = &step.starting_yield {
            let _ = writeln!(out, "    resume: {}", print_node(start)?.trim_end());
        }
        for stmt in &step.statements {
            for line in print_node(stmt)?.lines() {
                let _ = writeln!(out, "    {}", line);
            }
        }
        if let Some(produced) = &step.produced {
            let _ = writeln!(out, "    produce: {}", print_node(produced)?);
        }
    }
    for warning in &ir.warnings {
        let _ = writeln!(out, "  warning: {}", warning);
    }
    Ok(out)
}
