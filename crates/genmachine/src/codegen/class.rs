//! Assemble the state-machine class for one generator.

use std::collections::BTreeSet;

use deno_ast::swc::ast;
use deno_ast::swc::common::DUMMY_SP;
use deno_ast::swc::ecma_visit::{Visit, VisitWith};

use crate::codegen::builders::{self, key_value, property_signature};
use crate::codegen::printer::print_node;
use crate::diagnostics::{LoweringError, Warning, WarningCollector, span_offset};
use crate::ir::{GeneratorIR, Step};
use crate::options::CompileOptions;
use crate::rewrite::Rewriter;
use crate::types::{StateType, type_kind};

/// Printed class source plus everything noticed while building it.
#[derive(Debug, Clone)]
pub struct EmittedClass {
    pub class_name: String,
    pub source: String,
    /// Partitioning warnings from the IR followed by emission warnings
    pub warnings: WarningCollector,
}

struct ClassBuilder<'a> {
    ir: &'a GeneratorIR,
    options: &'a CompileOptions,
    names: BTreeSet<String>,
    resume: String,
}

#[tracing::instrument(level = "debug", skip_all, fields(name = %ir.name))]
pub fn emit_class(ir: &GeneratorIR, options: &CompileOptions) -> Result<EmittedClass, LoweringError> {
    check_reserved(ir, &options.counter_field)?;

    let names = ir.state_names();
    let mut warnings = ir.warnings.clone();
    let mut taken = referenced_names(&ir.steps);
    taken.extend(names.iter().cloned());
    let resume = resume_name(&taken, options);
    if resume != options.resume_param {
        warnings.add(Warning::ResumeNameRenamed {
            from: options.resume_param.clone(),
            to: resume.clone(),
        });
    }

    let builder = ClassBuilder {
        ir,
        options,
        names,
        resume,
    };
    let class_name = ir.class_name(&options.class_suffix);
    let class = builder.class()?;
    let module = ast::Module {
        span: DUMMY_SP,
        body: vec![ast::ModuleItem::Stmt(ast::Stmt::Decl(ast::Decl::Class(
            ast::ClassDecl {
                ident: builders::ident(&class_name),
                declare: false,
                class: Box::new(class),
            },
        )))],
        shebang: None,
    };
    let source = print_node(&module)?;
    tracing::debug!(class = %class_name, bytes = source.len(), "class printed");

    Ok(EmittedClass {
        class_name,
        source,
        warnings,
    })
}

fn check_reserved(ir: &GeneratorIR, counter_field: &str) -> Result<(), LoweringError> {
    let clash = ir
        .parameters
        .iter()
        .map(|p| (&p.name, p.span))
        .chain(ir.locals.iter().map(|l| (&l.name, l.span)))
        .find(|(name, _)| name.as_str() == counter_field);
    match clash {
        Some((name, span)) => Err(LoweringError::ReservedStateName {
            name: name.clone(),
            offset: span_offset(span),
        }),
        None => Ok(()),
    }
}

/// The preferred resume name, or the first numbered variant that no name
/// in `taken` and not the counter field uses.
fn resume_name(taken: &BTreeSet<String>, options: &CompileOptions) -> String {
    let taken = |candidate: &str| taken.contains(candidate) || candidate == options.counter_field;
    let preferred = &options.resume_param;
    if !taken(preferred) {
        return preferred.clone();
    }
    (1..)
        .map(|n| format!("{}{}", preferred, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| preferred.clone())
}

/// Every identifier the step code mentions, free or bound. A resume
/// parameter with any of these names would capture the reference.
fn referenced_names(steps: &[Step]) -> BTreeSet<String> {
    let mut collector = IdentCollector::default();
    for step in steps {
        if let Some(start) = &step.starting_yield {
            start.visit_with(&mut collector);
        }
        for stmt in &step.statements {
            stmt.visit_with(&mut collector);
        }
        if let Some(produced) = &step.produced {
            produced.visit_with(&mut collector);
        }
    }
    collector.0
}

#[derive(Default)]
struct IdentCollector(BTreeSet<String>);

impl Visit for IdentCollector {
    fn visit_ident(&mut self, ident: &ast::Ident) {
        self.0.insert(ident.sym.to_string());
    }
}

impl ClassBuilder<'_> {
    fn rewriter(&self) -> Rewriter<'_> {
        Rewriter::new(&self.names, &self.options.state_field, &self.resume)
    }

    fn class(&self) -> Result<ast::Class, LoweringError> {
        let state = ast::ClassMember::ClassProp(ast::ClassProp {
            key: ast::PropName::Ident(builders::ident_name(&self.options.state_field)),
            type_ann: Some(builders::type_ann(self.record_type())),
            accessibility: Some(ast::Accessibility::Private),
            ..Default::default()
        });
        Ok(ast::Class {
            body: vec![
                state,
                ast::ClassMember::Constructor(self.constructor()?),
                self.save_state(),
                self.load_state(),
                self.next_step(),
            ],
            ..Default::default()
        })
    }

    /// `{ nextStep: number; <locals>; <params>; }`
    fn record_type(&self) -> Box<ast::TsType> {
        let counter = property_signature(
            &self.options.counter_field,
            builders::keyword_type(ast::TsKeywordTypeKind::TsNumberKeyword),
            false,
        );
        let locals = self
            .ir
            .locals
            .iter()
            .map(|l| property_signature(&l.name, l.ty.clone(), false));
        let params = self
            .ir
            .parameters
            .iter()
            .map(|p| property_signature(&p.name, p.ty.clone(), p.optional));
        builders::type_literal(std::iter::once(counter).chain(locals).chain(params).collect())
    }

    fn constructor(&self) -> Result<ast::Constructor, LoweringError> {
        let mut fields = vec![key_value(&self.options.counter_field, builders::num(0.0))];
        for local in &self.ir.locals {
            let kind = StateType::classify(&local.ty).ok_or_else(|| {
                LoweringError::UnsupportedDefaultType {
                    name: local.name.clone(),
                    type_kind: type_kind(&local.ty),
                    offset: span_offset(local.span),
                }
            })?;
            fields.push(key_value(&local.name, kind.default_value()));
        }
        for param in &self.ir.parameters {
            fields.push(key_value(&param.name, builders::ident_expr(&param.name)));
        }

        let init = builders::assign_stmt(
            builders::this_member(&self.options.state_field),
            builders::object(fields),
        );
        Ok(ast::Constructor {
            key: ast::PropName::Ident(builders::ident_name("constructor")),
            params: self
                .ir
                .params
                .iter()
                .cloned()
                .map(ast::ParamOrTsParamProp::Param)
                .collect(),
            body: Some(builders::block(vec![init])),
            ..Default::default()
        })
    }

    /// `saveState(): Record { return { ...this.state }; }`
    fn save_state(&self) -> ast::ClassMember {
        let copy = builders::object(vec![builders::spread(Box::new(ast::Expr::Member(
            builders::this_member(&self.options.state_field),
        )))]);
        method(
            "saveState",
            Vec::new(),
            vec![builders::return_stmt(Some(copy))],
            self.record_type(),
            false,
        )
    }

    /// `loadState(state: object): void { this.state = { ...(state as Record) }; }`
    fn load_state(&self) -> ast::ClassMember {
        let incoming = builders::paren(builders::ts_as(
            builders::ident_expr("state"),
            self.record_type(),
        ));
        let replace = builders::assign_stmt(
            builders::this_member(&self.options.state_field),
            builders::object(vec![builders::spread(incoming)]),
        );
        method(
            "loadState",
            vec![builders::param(
                "state",
                builders::keyword_type(ast::TsKeywordTypeKind::TsObjectKeyword),
            )],
            vec![replace],
            builders::keyword_type(ast::TsKeywordTypeKind::TsVoidKeyword),
            false,
        )
    }

    fn next_step(&self) -> ast::ClassMember {
        let rewriter = self.rewriter();
        let mut cases: Vec<ast::SwitchCase> = self
            .ir
            .steps
            .iter()
            .map(|step| ast::SwitchCase {
                span: DUMMY_SP,
                test: Some(builders::num(step.index as f64)),
                cons: self.step_body(&rewriter, step),
            })
            .collect();
        cases.push(ast::SwitchCase {
            span: DUMMY_SP,
            test: None,
            cons: vec![builders::throw_error(&self.options.invalid_step_message)],
        });

        let mut dispatch = ast::Stmt::Switch(ast::SwitchStmt {
            span: DUMMY_SP,
            discriminant: Box::new(ast::Expr::Member(builders::state_member(
                &self.options.state_field,
                &self.options.counter_field,
            ))),
            cases,
        });
        rewriter.qualify_identifiers(&mut dispatch);

        let types = &self.ir.types;
        let mut result = builders::type_ref(
            "IteratorResult",
            vec![types.yield_type.clone(), types.return_type.clone()],
        );
        if self.ir.is_async {
            result = builders::type_ref("Promise", vec![result]);
        }
        method(
            "nextStep",
            vec![builders::param(&self.resume, types.resume_type.clone())],
            vec![dispatch],
            result,
            self.ir.is_async,
        )
    }

    fn step_body(&self, rewriter: &Rewriter<'_>, step: &Step) -> Vec<ast::Stmt> {
        let mut body = Vec::new();

        // `return yield x` is replayed through the produced value instead
        if let Some(start) = &step.starting_yield
            && !matches!(start, ast::Stmt::Return(_))
        {
            body.extend(rewriter.lower_to_state_access(rewriter.substitute_yield(start)));
        }
        for stmt in &step.statements {
            body.extend(rewriter.lower_to_state_access(stmt.clone()));
        }
        if !step.terminal {
            body.push(builders::assign_stmt(
                builders::state_member(&self.options.state_field, &self.options.counter_field),
                builders::num((step.index + 1) as f64),
            ));
        }

        let value = match &step.produced {
            Some(produced) => {
                let mut produced = produced.clone();
                rewriter.substitute_in_expr(&mut produced);
                rewriter.qualify(produced)
            }
            None => builders::undefined(),
        };
        body.push(builders::return_stmt(Some(builders::object(vec![
            key_value("value", value),
            key_value("done", builders::bool_lit(step.terminal)),
        ]))));
        body
    }
}

fn method(
    name: &str,
    params: Vec<ast::Param>,
    stmts: Vec<ast::Stmt>,
    return_type: Box<ast::TsType>,
    is_async: bool,
) -> ast::ClassMember {
    ast::ClassMember::Method(ast::ClassMethod {
        key: ast::PropName::Ident(builders::ident_name(name)),
        function: Box::new(ast::Function {
            params,
            body: Some(builders::block(stmts)),
            is_async,
            return_type: Some(builders::type_ann(return_type)),
            ..Default::default()
        }),
        kind: ast::MethodKind::Method,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referenced_names_include_free_identifiers() {
        let src = "const value = 42; function* g(a: number) { const f = (x: number) => x; yield value + f(a); }";
        let parsed = crate::parser::parse_source(src).unwrap();
        let decl = crate::parser::find_generators(&parsed).remove(0).unwrap();
        let ir = crate::parse::parse_ir(&decl).unwrap();
        let names = referenced_names(&ir.steps);
        for name in ["value", "f", "x", "a"] {
            assert!(names.contains(name), "{name} not collected");
        }
    }

    #[test]
    fn resume_name_skips_state_fields() {
        let options = CompileOptions::default();
        let names: BTreeSet<String> = ["value", "value1"].iter().map(|s| s.to_string()).collect();
        assert_eq!(resume_name(&names, &options), "value2");
        assert_eq!(resume_name(&BTreeSet::new(), &options), "value");
    }
}
