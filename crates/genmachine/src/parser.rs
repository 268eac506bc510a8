use std::sync::Arc;

use deno_ast::swc::ast;
use deno_ast::diagnostics::Diagnostic;
use deno_ast::{
    MediaType, ModuleItemRef, ParseDiagnostic, ParseParams, ParsedSource, StartSourcePos,
    parse_module,
};
use url::Url;

use crate::diagnostics::{ParseError, span_offset};

const SPECIFIER: &str = "file:///generators.ts";

/// A top-level generator function found in a module.
#[derive(Debug, Clone)]
pub struct GeneratorDecl {
    pub name: String,
    pub function: Box<ast::Function>,
    pub exported: bool,
}

/// Parse TypeScript source text into a module.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn parse_source(source: &str) -> Result<ParsedSource, ParseError> {
    let specifier = Url::parse(SPECIFIER).map_err(|e| ParseError::Syntax {
        message: format!("invalid module specifier: {}", e),
        offset: None,
    })?;
    let params = ParseParams {
        specifier,
        text: Arc::from(source),
        media_type: MediaType::TypeScript,
        capture_tokens: false,
        scope_analysis: false,
        maybe_syntax: None,
    };
    let parsed = parse_module(params).map_err(|d| syntax_error(&d))?;
    // Recoverable errors still produce a tree, but not one worth lowering.
    if let Some(diagnostic) = parsed.diagnostics().first() {
        return Err(syntax_error(diagnostic));
    }
    Ok(parsed)
}

fn syntax_error(diagnostic: &ParseDiagnostic) -> ParseError {
    ParseError::Syntax {
        message: diagnostic.message().to_string(),
        offset: Some(
            diagnostic
                .range()
                .start
                .as_byte_index(StartSourcePos::START_SOURCE_POS),
        ),
    }
}

/// Collect every top-level generator declaration, in source order.
///
/// Plain `function*`, `async function*`, and both behind `export` or
/// `export default` are recognized. Bodiless overload signatures are skipped.
pub fn find_generators(parsed: &ParsedSource) -> Vec<Result<GeneratorDecl, ParseError>> {
    let mut found = Vec::new();
    for item in parsed.program_ref().body() {
        let (ident, function, exported) = match item {
            ModuleItemRef::Stmt(ast::Stmt::Decl(ast::Decl::Fn(decl))) => {
                (Some(&decl.ident), &decl.function, false)
            }
            ModuleItemRef::ModuleDecl(ast::ModuleDecl::ExportDecl(export)) => match &export.decl {
                ast::Decl::Fn(decl) => (Some(&decl.ident), &decl.function, true),
                _ => continue,
            },
            ModuleItemRef::ModuleDecl(ast::ModuleDecl::ExportDefaultDecl(export)) => {
                match &export.decl {
                    ast::DefaultDecl::Fn(expr) => (expr.ident.as_ref(), &expr.function, true),
                    _ => continue,
                }
            }
            _ => continue,
        };
        if !function.is_generator || function.body.is_none() {
            continue;
        }
        let decl = match ident {
            Some(ident) => Ok(GeneratorDecl {
                name: ident.sym.to_string(),
                function: function.clone(),
                exported,
            }),
            None => Err(ParseError::AnonymousGenerator {
                offset: span_offset(function.span),
            }),
        };
        found.push(decl);
    }
    tracing::debug!(count = found.len(), "generators discovered");
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_plain_exported_and_async_generators() {
        let src = r#"
            function plain() { return 1; }
            function* first() { yield 1; }
            export function* second() { yield 2; }
            async function* third() { yield 3; }
            export default function* fourth() { yield 4; }
        "#;
        let parsed = parse_source(src).unwrap();
        let found: Vec<_> = find_generators(&parsed)
            .into_iter()
            .map(|d| d.unwrap())
            .collect();
        let names: Vec<_> = found.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third", "fourth"]);
        let exported: Vec<_> = found.iter().map(|d| d.exported).collect();
        assert_eq!(exported, vec![false, true, false, true]);
        assert!(found[2].function.is_async);
    }

    #[test]
    fn anonymous_default_export_is_rejected() {
        let parsed = parse_source("export default function* () { yield 1; }").unwrap();
        let found = find_generators(&parsed);
        assert!(matches!(
            found.as_slice(),
            [Err(ParseError::AnonymousGenerator { .. })]
        ));
    }

    #[test]
    fn syntax_errors_carry_an_offset() {
        let err = parse_source("function* broken( {").unwrap_err();
        match err {
            ParseError::Syntax { offset, .. } => assert!(offset.is_some()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
