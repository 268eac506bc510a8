//! Compile TypeScript generator functions into serializable state machines.
//!
//! Each top-level `function*` becomes a class whose `nextStep` runs the
//! generator one suspension at a time, and whose whole execution state lives
//! in a flat record that `saveState` copies out and `loadState` replaces.
//!
//! ```no_run
//! let units = genmachine::compile("function* count(n: number) { yield n; }")?;
//! for unit in units {
//!     let unit = unit?;
//!     println!("{}", unit.source);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod codegen;
pub mod diagnostics;
pub mod ir;
pub mod options;
pub mod parse;
pub mod parser;
pub mod rewrite;
pub mod steps;
pub mod types;

pub use diagnostics::{
    CompileError, CompileFailure, LoweringError, ParseError, Result, Warning, WarningCollector,
    line_col,
};
pub use ir::GeneratorIR;
pub use options::CompileOptions;
pub use parser::GeneratorDecl;

/// One generator compiled to class source.
#[derive(Debug, Clone)]
pub struct CompiledUnit {
    /// Name of the source generator function
    pub name: String,
    pub class_name: String,
    pub source: String,
    pub warnings: WarningCollector,
}

/// Compile every top-level generator in `source` with default options.
pub fn compile(source: &str) -> Result<Vec<std::result::Result<CompiledUnit, CompileFailure>>> {
    compile_with_options(source, &CompileOptions::default())
}

/// Compile every top-level generator in `source`.
///
/// A syntax error in the file fails the whole call. Past that point each
/// generator succeeds or fails on its own, in source order.
#[tracing::instrument(level = "debug", skip_all)]
pub fn compile_with_options(
    source: &str,
    options: &CompileOptions,
) -> Result<Vec<std::result::Result<CompiledUnit, CompileFailure>>> {
    let parsed = parser::parse_source(source)?;
    let units = parser::find_generators(&parsed)
        .into_iter()
        .enumerate()
        .map(|(position, decl)| {
            let decl = decl.map_err(|error| CompileFailure {
                name: format!("<anonymous #{}>", position),
                error: error.into(),
            })?;
            compile_one(&decl, options).map_err(|error| {
                tracing::debug!(name = %decl.name, %error, "generator failed");
                CompileFailure {
                    name: decl.name.clone(),
                    error,
                }
            })
        })
        .collect();
    Ok(units)
}

fn compile_one(decl: &GeneratorDecl, options: &CompileOptions) -> Result<CompiledUnit> {
    let ir = parse::parse_ir(decl)?;
    let emitted = codegen::emit_class(&ir, options)?;
    tracing::debug!(
        name = %ir.name,
        class = %emitted.class_name,
        warnings = emitted.warnings.count(),
        "generator compiled"
    );
    Ok(CompiledUnit {
        name: ir.name,
        class_name: emitted.class_name,
        source: emitted.source,
        warnings: emitted.warnings,
    })
}

/// Build the IR of a single generator declaration.
pub fn parse_ir(decl: &GeneratorDecl) -> Result<GeneratorIR> {
    Ok(parse::parse_ir(decl)?)
}

/// Emit class source for an IR with default options.
pub fn emit(ir: &GeneratorIR) -> Result<String> {
    emit_with_options(ir, &CompileOptions::default())
}

pub fn emit_with_options(ir: &GeneratorIR, options: &CompileOptions) -> Result<String> {
    Ok(codegen::emit_class(ir, options)?.source)
}
