//! Rewrite step code so it reads and writes the persistent state record.
//!
//! Two passes cooperate. The first works on whole statements and only
//! recognizes a few top-level shapes: yield substitution, declaration
//! lowering and plain assignments. The second, `qualify_identifiers`, walks
//! the entire constructed tree and qualifies every remaining reference to
//! a state name, wherever it sits.

use std::collections::BTreeSet;

use deno_ast::swc::ast;
use deno_ast::swc::ecma_visit::{Visit, VisitMut, VisitMutWith, VisitWith};

use crate::codegen::builders;

pub struct Rewriter<'a> {
    names: &'a BTreeSet<String>,
    state_field: &'a str,
    resume: &'a str,
}

impl<'a> Rewriter<'a> {
    pub fn new(names: &'a BTreeSet<String>, state_field: &'a str, resume: &'a str) -> Self {
        Self {
            names,
            state_field,
            resume,
        }
    }

    fn is_state_name(&self, sym: &str) -> bool {
        self.names.contains(sym)
    }

    fn state_member(&self, name: &str) -> ast::MemberExpr {
        builders::state_member(self.state_field, name)
    }

    /// Replace the statement's yield with the resume parameter.
    ///
    /// Only the positions `steps::find_yield` extracts from are rewritten:
    /// a bare yield statement, the right side of an assignment, a declarator
    /// initializer and a return argument, looking one level into blocks and
    /// `if` branches.
    pub fn substitute_yield(&self, stmt: &ast::Stmt) -> ast::Stmt {
        let mut stmt = stmt.clone();
        self.substitute_in_stmt(&mut stmt);
        stmt
    }

    fn substitute_in_stmt(&self, stmt: &mut ast::Stmt) -> bool {
        match stmt {
            ast::Stmt::Expr(e) => self.substitute_in_expr(&mut e.expr),
            ast::Stmt::Return(r) => r
                .arg
                .as_deref_mut()
                .is_some_and(|arg| self.substitute_in_expr(arg)),
            ast::Stmt::Decl(ast::Decl::Var(v)) => v.decls.iter_mut().any(|d| {
                d.init
                    .as_deref_mut()
                    .is_some_and(|init| self.substitute_in_expr(init))
            }),
            ast::Stmt::Block(b) => b.stmts.iter_mut().any(|s| self.substitute_in_stmt(s)),
            ast::Stmt::If(i) => {
                self.substitute_in_stmt(&mut i.cons)
                    || i.alt
                        .as_deref_mut()
                        .is_some_and(|alt| self.substitute_in_stmt(alt))
            }
            _ => false,
        }
    }

    /// Expression counterpart of `substitute_yield`; returns whether a
    /// yield was replaced.
    pub fn substitute_in_expr(&self, expr: &mut ast::Expr) -> bool {
        match expr {
            ast::Expr::Yield(_) => {
                *expr = ast::Expr::Ident(builders::ident(self.resume));
                true
            }
            ast::Expr::Assign(a) => self.substitute_in_expr(&mut a.right),
            ast::Expr::Paren(p) => self.substitute_in_expr(&mut p.expr),
            _ => false,
        }
    }

    /// Lower one statement onto the state record.
    ///
    /// Declarations of state names become assignments (declarators without
    /// an initializer vanish, the constructor default already holds),
    /// assignments to a state name target the field instead, and a bare
    /// state name becomes a field read. Everything else passes through.
    pub fn lower_to_state_access(&self, stmt: ast::Stmt) -> Vec<ast::Stmt> {
        match stmt {
            ast::Stmt::Decl(ast::Decl::Var(var)) => self.lower_declaration(*var),
            ast::Stmt::Expr(ast::ExprStmt { span, expr }) => {
                let expr = match *expr {
                    ast::Expr::Assign(mut assign) => {
                        if let ast::AssignTarget::Simple(ast::SimpleAssignTarget::Ident(binding)) =
                            &assign.left
                            && self.is_state_name(&binding.id.sym)
                        {
                            assign.left = ast::AssignTarget::Simple(
                                ast::SimpleAssignTarget::Member(self.state_member(&binding.id.sym)),
                            );
                        }
                        Box::new(ast::Expr::Assign(assign))
                    }
                    other => self.qualify(Box::new(other)),
                };
                vec![ast::Stmt::Expr(ast::ExprStmt { span, expr })]
            }
            other => vec![other],
        }
    }

    fn lower_declaration(&self, var: ast::VarDecl) -> Vec<ast::Stmt> {
        let ast::VarDecl {
            span,
            ctxt,
            kind,
            declare,
            decls,
        } = var;
        let mut out = Vec::new();
        for decl in decls {
            match &decl.name {
                ast::Pat::Ident(binding) if self.is_state_name(&binding.id.sym) => {
                    if let Some(init) = decl.init {
                        out.push(builders::assign_stmt(
                            self.state_member(&binding.id.sym),
                            init,
                        ));
                    }
                }
                _ => out.push(ast::Stmt::Decl(ast::Decl::Var(Box::new(ast::VarDecl {
                    span,
                    ctxt,
                    kind,
                    declare,
                    decls: vec![decl],
                })))),
            }
        }
        out
    }

    /// A bare state name becomes a field read; anything else is returned
    /// unchanged.
    pub fn qualify(&self, expr: Box<ast::Expr>) -> Box<ast::Expr> {
        match &*expr {
            ast::Expr::Ident(id) if self.is_state_name(&id.sym) => {
                builders::state_access(self.state_field, &id.sym)
            }
            _ => expr,
        }
    }

    /// Qualify every remaining reference to a state name inside `node`.
    ///
    /// Property names are never touched and shorthand properties are
    /// expanded. A name re-bound inside the tree (a nested block's `let`,
    /// `const`, `class` or `function`, a loop head, a nested function's
    /// parameters and hoisted `var`s, a catch binding) is left alone inside
    /// that scope.
    pub fn qualify_identifiers<N>(&self, node: &mut N)
    where
        N: VisitMutWith<StateQualifier<'a>>,
    {
        let mut qualifier = StateQualifier {
            names: self.names,
            state_field: self.state_field,
            shadowed: Vec::new(),
        };
        node.visit_mut_with(&mut qualifier);
    }
}

/// Visitor behind `Rewriter::qualify_identifiers`.
pub struct StateQualifier<'a> {
    names: &'a BTreeSet<String>,
    state_field: &'a str,
    /// Names bound by the scopes currently being visited, innermost last
    shadowed: Vec<String>,
}

impl StateQualifier<'_> {
    fn is_state_name(&self, sym: &str) -> bool {
        self.names.contains(sym) && !self.shadowed.iter().any(|s| s == sym)
    }

    fn access(&self, name: &str) -> Box<ast::Expr> {
        builders::state_access(self.state_field, name)
    }

    fn with_names<F>(&mut self, names: Vec<String>, visit: F)
    where
        F: FnOnce(&mut Self),
    {
        let before = self.shadowed.len();
        self.shadowed.extend(names);
        visit(self);
        self.shadowed.truncate(before);
    }
}

impl VisitMut for StateQualifier<'_> {
    fn visit_mut_expr(&mut self, expr: &mut ast::Expr) {
        if let ast::Expr::Ident(id) = expr
            && self.is_state_name(&id.sym)
        {
            *expr = *self.access(&id.sym);
            return;
        }
        expr.visit_mut_children_with(self);
    }

    fn visit_mut_simple_assign_target(&mut self, target: &mut ast::SimpleAssignTarget) {
        if let ast::SimpleAssignTarget::Ident(binding) = target
            && self.is_state_name(&binding.id.sym)
        {
            *target = ast::SimpleAssignTarget::Member(builders::state_member(
                self.state_field,
                &binding.id.sym,
            ));
            return;
        }
        target.visit_mut_children_with(self);
    }

    fn visit_mut_prop(&mut self, prop: &mut ast::Prop) {
        if let ast::Prop::Shorthand(id) = prop
            && self.is_state_name(&id.sym)
        {
            *prop = ast::Prop::KeyValue(ast::KeyValueProp {
                key: ast::PropName::Ident(builders::ident_name(&id.sym)),
                value: self.access(&id.sym),
            });
            return;
        }
        prop.visit_mut_children_with(self);
    }

    // Reached only from assignment patterns and `for` heads; declaration
    // patterns are cut off in the methods below.
    fn visit_mut_pat(&mut self, pat: &mut ast::Pat) {
        if let ast::Pat::Ident(binding) = pat
            && self.is_state_name(&binding.id.sym)
        {
            *pat = ast::Pat::Expr(self.access(&binding.id.sym));
            return;
        }
        pat.visit_mut_children_with(self);
    }

    fn visit_mut_object_pat_prop(&mut self, prop: &mut ast::ObjectPatProp) {
        if let ast::ObjectPatProp::Assign(shorthand) = prop
            && self.is_state_name(&shorthand.key.id.sym)
        {
            let name = shorthand.key.id.sym.to_string();
            let target = ast::Pat::Expr(self.access(&name));
            let value = match shorthand.value.take() {
                Some(mut default) => {
                    default.visit_mut_with(self);
                    ast::Pat::Assign(ast::AssignPat {
                        span: shorthand.span,
                        left: Box::new(target),
                        right: default,
                    })
                }
                None => target,
            };
            *prop = ast::ObjectPatProp::KeyValue(ast::KeyValuePatProp {
                key: ast::PropName::Ident(builders::ident_name(&name)),
                value: Box::new(value),
            });
            return;
        }
        prop.visit_mut_children_with(self);
    }

    fn visit_mut_var_declarator(&mut self, decl: &mut ast::VarDeclarator) {
        if let Some(init) = &mut decl.init {
            init.visit_mut_with(self);
        }
    }

    fn visit_mut_block_stmt(&mut self, block: &mut ast::BlockStmt) {
        let names = lexical_names(&block.stmts);
        self.with_names(names, |this| block.visit_mut_children_with(this));
    }

    fn visit_mut_for_stmt(&mut self, stmt: &mut ast::ForStmt) {
        let names = match &stmt.init {
            Some(ast::VarDeclOrExpr::VarDecl(var)) if var.kind != ast::VarDeclKind::Var => {
                declared_names(&var.decls)
            }
            _ => Vec::new(),
        };
        self.with_names(names, |this| stmt.visit_mut_children_with(this));
    }

    fn visit_mut_for_in_stmt(&mut self, stmt: &mut ast::ForInStmt) {
        let names = head_names(&stmt.left);
        self.with_names(names, |this| stmt.visit_mut_children_with(this));
    }

    fn visit_mut_for_of_stmt(&mut self, stmt: &mut ast::ForOfStmt) {
        let names = head_names(&stmt.left);
        self.with_names(names, |this| stmt.visit_mut_children_with(this));
    }

    fn visit_mut_function(&mut self, function: &mut ast::Function) {
        let mut names = pat_names(function.params.iter().map(|p| &p.pat));
        if let Some(body) = &function.body {
            names.extend(hoisted_vars(body));
        }
        self.with_names(names, |this| {
            if let Some(body) = &mut function.body {
                body.visit_mut_with(this);
            }
        });
    }

    fn visit_mut_constructor(&mut self, ctor: &mut ast::Constructor) {
        let mut names = pat_names(ctor.params.iter().filter_map(|p| match p {
            ast::ParamOrTsParamProp::Param(param) => Some(&param.pat),
            ast::ParamOrTsParamProp::TsParamProp(_) => None,
        }));
        if let Some(body) = &ctor.body {
            names.extend(hoisted_vars(body));
        }
        self.with_names(names, |this| {
            if let Some(body) = &mut ctor.body {
                body.visit_mut_with(this);
            }
        });
    }

    fn visit_mut_setter_prop(&mut self, setter: &mut ast::SetterProp) {
        setter.key.visit_mut_with(self);
        let mut names = pat_names(std::iter::once(&*setter.param));
        if let Some(body) = &setter.body {
            names.extend(hoisted_vars(body));
        }
        self.with_names(names, |this| {
            if let Some(body) = &mut setter.body {
                body.visit_mut_with(this);
            }
        });
    }

    fn visit_mut_arrow_expr(&mut self, arrow: &mut ast::ArrowExpr) {
        let mut names = pat_names(arrow.params.iter());
        if let ast::BlockStmtOrExpr::BlockStmt(body) = &*arrow.body {
            names.extend(hoisted_vars(body));
        }
        self.with_names(names, |this| arrow.body.visit_mut_with(this));
    }

    fn visit_mut_catch_clause(&mut self, clause: &mut ast::CatchClause) {
        let names = pat_names(clause.param.iter());
        self.with_names(names, |this| clause.body.visit_mut_with(this));
    }
}

fn pat_names<'p>(pats: impl IntoIterator<Item = &'p ast::Pat>) -> Vec<String> {
    let mut names = Vec::new();
    for pat in pats {
        bound_names(pat, &mut names);
    }
    names
}

fn declared_names(decls: &[ast::VarDeclarator]) -> Vec<String> {
    pat_names(decls.iter().map(|d| &d.name))
}

/// Block-scoped names declared directly in a statement list
fn lexical_names(stmts: &[ast::Stmt]) -> Vec<String> {
    let mut names = Vec::new();
    for stmt in stmts {
        match stmt {
            ast::Stmt::Decl(ast::Decl::Var(var)) if var.kind != ast::VarDeclKind::Var => {
                names.extend(declared_names(&var.decls))
            }
            ast::Stmt::Decl(ast::Decl::Using(using)) => names.extend(declared_names(&using.decls)),
            ast::Stmt::Decl(ast::Decl::Fn(f)) => names.push(f.ident.sym.to_string()),
            ast::Stmt::Decl(ast::Decl::Class(c)) => names.push(c.ident.sym.to_string()),
            _ => {}
        }
    }
    names
}

fn head_names(head: &ast::ForHead) -> Vec<String> {
    match head {
        ast::ForHead::VarDecl(var) if var.kind != ast::VarDeclKind::Var => {
            declared_names(&var.decls)
        }
        ast::ForHead::UsingDecl(using) => declared_names(&using.decls),
        _ => Vec::new(),
    }
}

/// `var` names a function body hoists, not counting nested functions
fn hoisted_vars(body: &ast::BlockStmt) -> Vec<String> {
    let mut hoisted = HoistedVars(Vec::new());
    body.visit_with(&mut hoisted);
    hoisted.0
}

struct HoistedVars(Vec<String>);

impl Visit for HoistedVars {
    fn visit_var_decl(&mut self, var: &ast::VarDecl) {
        if var.kind == ast::VarDeclKind::Var {
            self.0.extend(declared_names(&var.decls));
        }
    }

    fn visit_function(&mut self, _: &ast::Function) {}

    fn visit_arrow_expr(&mut self, _: &ast::ArrowExpr) {}

    fn visit_class(&mut self, _: &ast::Class) {}
}

/// Every name a binding pattern introduces.
fn bound_names(pat: &ast::Pat, out: &mut Vec<String>) {
    match pat {
        ast::Pat::Ident(binding) => out.push(binding.id.sym.to_string()),
        ast::Pat::Array(arr) => {
            for elem in arr.elems.iter().flatten() {
                bound_names(elem, out);
            }
        }
        ast::Pat::Object(obj) => {
            for prop in &obj.props {
                match prop {
                    ast::ObjectPatProp::KeyValue(kv) => bound_names(&kv.value, out),
                    ast::ObjectPatProp::Assign(a) => out.push(a.key.id.sym.to_string()),
                    ast::ObjectPatProp::Rest(r) => bound_names(&r.arg, out),
                }
            }
        }
        ast::Pat::Rest(r) => bound_names(&r.arg, out),
        ast::Pat::Assign(a) => bound_names(&a.left, out),
        ast::Pat::Expr(_) | ast::Pat::Invalid(_) => {}
    }
}
