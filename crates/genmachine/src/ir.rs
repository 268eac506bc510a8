//! Intermediate representation of a generator function.
//!
//! A `GeneratorIR` is built once per source generator by `parse::parse_ir`
//! and consumed by the emitter. It owns clones of the syntax nodes it needs
//! so the parsed source can be dropped independently.

use std::collections::BTreeSet;

use deno_ast::swc::ast::{Expr, Param, Stmt, TsType};
use deno_ast::swc::common::Span;

use crate::diagnostics::WarningCollector;

/// One leaf binding of the generator's parameter list.
#[derive(Debug, Clone)]
pub struct ParsedParameter {
    pub name: String,
    /// Declared annotation, or `any` / `any[]` when there is none
    pub ty: Box<TsType>,
    pub optional: bool,
    pub span: Span,
}

/// A top-level `let`/`const`/`var` declarator.
#[derive(Debug, Clone)]
pub struct LocalVariableDecl {
    pub name: String,
    /// Declared annotation, or `any` when there is none
    pub ty: Box<TsType>,
    /// Original initializer; replayed as the first-use assignment
    pub init: Option<Box<Expr>>,
    pub span: Span,
}

/// The three type arguments of `Generator<Y, R, N>`.
#[derive(Debug, Clone)]
pub struct GeneratorTypes {
    pub yield_type: Box<TsType>,
    pub return_type: Box<TsType>,
    pub resume_type: Box<TsType>,
}

/// Code executed between two suspension points.
#[derive(Debug, Clone, Default)]
pub struct Step {
    /// Program-counter value for this step
    pub index: usize,
    /// The statement whose yield suspended the previous step, replayed with
    /// the yield replaced by the resume value. Absent only for step 0.
    pub starting_yield: Option<Stmt>,
    pub statements: Vec<Stmt>,
    /// Yielded operand, or the returned expression for the terminal step
    pub produced: Option<Box<Expr>>,
    pub terminal: bool,
}

#[derive(Debug, Clone)]
pub struct GeneratorIR {
    pub name: String,
    pub is_async: bool,
    /// The original parameter nodes, reused verbatim by the constructor
    pub params: Vec<Param>,
    pub parameters: Vec<ParsedParameter>,
    pub locals: Vec<LocalVariableDecl>,
    pub types: GeneratorTypes,
    pub steps: Vec<Step>,
    pub warnings: WarningCollector,
}

impl GeneratorIR {
    /// Every name that lives in the persistent state record
    pub fn state_names(&self) -> BTreeSet<String> {
        self.locals
            .iter()
            .map(|l| l.name.clone())
            .chain(self.parameters.iter().map(|p| p.name.clone()))
            .collect()
    }

    /// `sum` with suffix `Generator` becomes `SumGenerator`
    pub fn class_name(&self, suffix: &str) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => format!("{}{}{}", first.to_uppercase(), chars.as_str(), suffix),
            None => suffix.to_string(),
        }
    }

    pub fn terminal_step(&self) -> Option<&Step> {
        self.steps.last().filter(|s| s.terminal)
    }
}
