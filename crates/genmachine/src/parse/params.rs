//! Flatten a parameter list into one state field per bound name.

use deno_ast::swc::ast;
use deno_ast::swc::common::Spanned;

use crate::codegen::builders::{any_array_type, any_type};
use crate::diagnostics::ParseError;
use crate::ir::ParsedParameter;

/// Whether a pattern sits directly in the parameter list or inside a
/// destructuring pattern. Destructured names lose their structural type.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Position {
    TopLevel,
    Destructured,
}

pub fn parse_params(params: &[ast::Param]) -> Result<Vec<ParsedParameter>, ParseError> {
    let mut out = Vec::new();
    for param in params {
        flatten(&param.pat, Position::TopLevel, &mut out)?;
    }
    Ok(out)
}

fn flatten(
    pat: &ast::Pat,
    position: Position,
    out: &mut Vec<ParsedParameter>,
) -> Result<(), ParseError> {
    match pat {
        ast::Pat::Ident(binding) => {
            let top = position == Position::TopLevel;
            let ty = match &binding.type_ann {
                Some(ann) if top => ann.type_ann.clone(),
                _ => any_type(),
            };
            out.push(ParsedParameter {
                name: binding.id.sym.to_string(),
                ty,
                optional: top && binding.id.optional,
                span: binding.id.span,
            });
        }
        // `x = default` keeps the inner binding's optionality
        ast::Pat::Assign(assign) => flatten(&assign.left, position, out)?,
        ast::Pat::Rest(rest) => match &*rest.arg {
            ast::Pat::Ident(binding) => {
                let ty = match (&rest.type_ann, position) {
                    (Some(ann), Position::TopLevel) => ann.type_ann.clone(),
                    (None, Position::TopLevel) => match &binding.type_ann {
                        Some(ann) => ann.type_ann.clone(),
                        None => any_array_type(),
                    },
                    (_, Position::Destructured) => any_type(),
                };
                out.push(ParsedParameter {
                    name: binding.id.sym.to_string(),
                    ty,
                    optional: false,
                    span: binding.id.span,
                });
            }
            nested => flatten(nested, Position::Destructured, out)?,
        },
        ast::Pat::Object(object) => {
            for prop in &object.props {
                match prop {
                    ast::ObjectPatProp::KeyValue(kv) => {
                        flatten(&kv.value, Position::Destructured, out)?
                    }
                    ast::ObjectPatProp::Assign(shorthand) => out.push(ParsedParameter {
                        name: shorthand.key.id.sym.to_string(),
                        ty: any_type(),
                        optional: false,
                        span: shorthand.key.id.span,
                    }),
                    ast::ObjectPatProp::Rest(rest) => {
                        flatten(&ast::Pat::Rest(rest.clone()), Position::Destructured, out)?
                    }
                }
            }
        }
        ast::Pat::Array(array) => {
            for elem in array.elems.iter().flatten() {
                flatten(elem, Position::Destructured, out)?;
            }
        }
        ast::Pat::Expr(expr) => {
            return Err(ParseError::parameter(
                "expression in binding position",
                expr.span(),
            ));
        }
        ast::Pat::Invalid(invalid) => {
            return Err(ParseError::parameter("invalid pattern", invalid.span));
        }
    }
    Ok(())
}
