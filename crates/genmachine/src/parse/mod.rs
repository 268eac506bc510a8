//! Build a `GeneratorIR` from a generator declaration.

mod locals;
mod params;
mod return_type;

use std::collections::HashSet;

pub use locals::parse_locals;
pub use params::parse_params;
pub use return_type::parse_return_type;

use crate::diagnostics::{ParseError, WarningCollector, span_offset};
use crate::ir::GeneratorIR;
use crate::parser::GeneratorDecl;
use crate::steps::partition;

#[tracing::instrument(level = "debug", skip_all, fields(name = %decl.name, exported = decl.exported))]
pub fn parse_ir(decl: &GeneratorDecl) -> Result<GeneratorIR, ParseError> {
    let function = &decl.function;
    let body = function
        .body
        .as_ref()
        .map(|b| b.stmts.as_slice())
        .unwrap_or_default();

    let parameters = parse_params(&function.params)?;
    let locals = parse_locals(body)?;

    let mut seen = HashSet::new();
    let bindings = parameters
        .iter()
        .map(|p| (&p.name, p.span))
        .chain(locals.iter().map(|l| (&l.name, l.span)));
    for (name, span) in bindings {
        if !seen.insert(name.as_str()) {
            return Err(ParseError::DuplicateBinding {
                name: name.clone(),
                offset: span_offset(span),
            });
        }
    }

    let mut warnings = WarningCollector::new();
    let steps = partition(body, &mut warnings)?;
    tracing::debug!(
        params = parameters.len(),
        locals = locals.len(),
        steps = steps.len(),
        "generator lowered to IR"
    );

    Ok(GeneratorIR {
        name: decl.name.clone(),
        is_async: function.is_async,
        params: function.params.clone(),
        parameters,
        locals,
        types: parse_return_type(function),
        steps,
        warnings,
    })
}
