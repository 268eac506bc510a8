use deno_ast::swc::ast;

use crate::codegen::builders::any_type;
use crate::diagnostics::{ParseError, span_offset};
use crate::ir::LocalVariableDecl;

/// Collect the declarators of every top-level variable declaration.
///
/// Declarations nested in blocks stay block-scoped in the emitted code and
/// are not lifted into the state record. A top-level class would only be
/// initialized inside the step that declares it, so it is rejected.
pub fn parse_locals(body: &[ast::Stmt]) -> Result<Vec<LocalVariableDecl>, ParseError> {
    let mut locals = Vec::new();
    for stmt in body {
        let var = match stmt {
            ast::Stmt::Decl(ast::Decl::Var(var)) => var,
            ast::Stmt::Decl(ast::Decl::Class(class)) => {
                return Err(ParseError::UnsupportedDeclaration {
                    kind: "class",
                    offset: span_offset(class.class.span),
                });
            }
            _ => continue,
        };
        for decl in &var.decls {
            let binding = match &decl.name {
                ast::Pat::Ident(binding) => binding,
                ast::Pat::Object(_) => return Err(ParseError::local("object pattern", decl.span)),
                ast::Pat::Array(_) => return Err(ParseError::local("array pattern", decl.span)),
                _ => return Err(ParseError::local("non-identifier binding", decl.span)),
            };
            let ty = binding
                .type_ann
                .as_ref()
                .map(|ann| ann.type_ann.clone())
                .unwrap_or_else(any_type);
            locals.push(LocalVariableDecl {
                name: binding.id.sym.to_string(),
                ty,
                init: decl.init.clone(),
                span: decl.span,
            });
        }
    }
    Ok(locals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{find_generators, parse_source};

    fn body_of(src: &str) -> Vec<ast::Stmt> {
        let parsed = parse_source(src).unwrap();
        let decl = find_generators(&parsed).remove(0).unwrap();
        decl.function.body.unwrap().stmts
    }

    #[test]
    fn top_level_class_is_rejected() {
        let body = body_of("function* g() { class P {} yield new P(); }");
        let err = parse_locals(&body).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnsupportedDeclaration { kind: "class", offset: Some(_) }
        ));
    }

    #[test]
    fn collects_top_level_declarators_only() {
        let body = body_of(
            "function* g() { let a: number = 1, b; if (a) { let c = 2; } const d = yield a; }",
        );
        let locals = parse_locals(&body).unwrap();
        let names: Vec<_> = locals.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "d"]);
        assert!(locals[0].init.is_some());
        assert!(locals[1].init.is_none());
    }

    #[test]
    fn destructuring_declaration_is_rejected() {
        let body = body_of("function* g(o: any) { let { x } = o; yield x; }");
        let err = parse_locals(&body).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnsupportedLocalBinding { kind: "object pattern", .. }
        ));
    }
}
