//! Partition a generator body into resumable steps.
//!
//! Only the top-level statement list is partitioned. Each statement holding
//! a yield closes the current step and is replayed, with the yield replaced
//! by the resume value, at the start of the next one. A statement holding a
//! return closes the final step.
//!
//! The containment walkers stop at function, arrow and class boundaries: a
//! yield inside a nested generator belongs to that generator.

use deno_ast::swc::ast;
use deno_ast::swc::common::Spanned;

use crate::diagnostics::{ParseError, Warning, WarningCollector, span_offset};
use crate::ir::Step;

/// Number of `yield` expressions reachable from an expression.
pub fn count_yields_expr(expr: &ast::Expr) -> usize {
    use ast::Expr;

    match expr {
        Expr::Yield(y) => 1 + y.arg.as_deref().map_or(0, count_yields_expr),
        Expr::Await(a) => count_yields_expr(&a.arg),
        Expr::Paren(p) => count_yields_expr(&p.expr),
        Expr::Unary(u) => count_yields_expr(&u.arg),
        Expr::Update(u) => count_yields_expr(&u.arg),
        Expr::Bin(b) => count_yields_expr(&b.left) + count_yields_expr(&b.right),
        Expr::Assign(a) => count_yields_target(&a.left) + count_yields_expr(&a.right),
        Expr::Cond(c) => {
            count_yields_expr(&c.test) + count_yields_expr(&c.cons) + count_yields_expr(&c.alt)
        }
        Expr::Seq(s) => s.exprs.iter().map(|e| count_yields_expr(e)).sum(),
        Expr::Array(arr) => arr.elems.iter().flatten().map(|e| count_yields_expr(&e.expr)).sum(),
        Expr::Object(obj) => obj.props.iter().map(count_yields_prop).sum(),
        Expr::Tpl(t) => t.exprs.iter().map(|e| count_yields_expr(e)).sum(),
        Expr::TaggedTpl(t) => {
            count_yields_expr(&t.tag) + t.tpl.exprs.iter().map(|e| count_yields_expr(e)).sum::<usize>()
        }
        Expr::Call(c) => {
            let callee = match &c.callee {
                ast::Callee::Expr(e) => count_yields_expr(e),
                ast::Callee::Super(_) | ast::Callee::Import(_) => 0,
            };
            callee + count_yields_args(&c.args)
        }
        Expr::New(n) => {
            count_yields_expr(&n.callee) + n.args.as_deref().map_or(0, count_yields_args)
        }
        Expr::Member(m) => count_yields_member(m),
        Expr::SuperProp(s) => match &s.prop {
            ast::SuperProp::Computed(c) => count_yields_expr(&c.expr),
            ast::SuperProp::Ident(_) => 0,
        },
        Expr::OptChain(o) => match &*o.base {
            ast::OptChainBase::Member(m) => count_yields_member(m),
            ast::OptChainBase::Call(c) => count_yields_expr(&c.callee) + count_yields_args(&c.args),
        },
        Expr::TsAs(e) => count_yields_expr(&e.expr),
        Expr::TsNonNull(e) => count_yields_expr(&e.expr),
        Expr::TsTypeAssertion(e) => count_yields_expr(&e.expr),
        Expr::TsConstAssertion(e) => count_yields_expr(&e.expr),
        Expr::TsSatisfies(e) => count_yields_expr(&e.expr),
        Expr::TsInstantiation(e) => count_yields_expr(&e.expr),
        // function, arrow and class bodies are their own scope
        Expr::Fn(_) | Expr::Arrow(_) | Expr::Class(_) => 0,
        _ => 0,
    }
}

fn count_yields_args(args: &[ast::ExprOrSpread]) -> usize {
    args.iter().map(|a| count_yields_expr(&a.expr)).sum()
}

fn count_yields_member(m: &ast::MemberExpr) -> usize {
    count_yields_expr(&m.obj)
        + match &m.prop {
            ast::MemberProp::Computed(c) => count_yields_expr(&c.expr),
            _ => 0,
        }
}

fn count_yields_prop_name(key: &ast::PropName) -> usize {
    match key {
        ast::PropName::Computed(c) => count_yields_expr(&c.expr),
        _ => 0,
    }
}

fn count_yields_prop(prop: &ast::PropOrSpread) -> usize {
    match prop {
        ast::PropOrSpread::Spread(s) => count_yields_expr(&s.expr),
        ast::PropOrSpread::Prop(p) => match &**p {
            ast::Prop::KeyValue(kv) => count_yields_prop_name(&kv.key) + count_yields_expr(&kv.value),
            ast::Prop::Assign(a) => count_yields_expr(&a.value),
            ast::Prop::Getter(g) => count_yields_prop_name(&g.key),
            ast::Prop::Setter(s) => count_yields_prop_name(&s.key),
            ast::Prop::Method(m) => count_yields_prop_name(&m.key),
            ast::Prop::Shorthand(_) => 0,
        },
    }
}

fn count_yields_target(target: &ast::AssignTarget) -> usize {
    match target {
        ast::AssignTarget::Simple(simple) => match simple {
            ast::SimpleAssignTarget::Member(m) => count_yields_member(m),
            ast::SimpleAssignTarget::Paren(p) => count_yields_expr(&p.expr),
            _ => 0,
        },
        ast::AssignTarget::Pat(pat) => match pat {
            ast::AssignTargetPat::Array(arr) => arr.elems.iter().flatten().map(count_yields_pat).sum(),
            ast::AssignTargetPat::Object(obj) => obj.props.iter().map(count_yields_obj_pat_prop).sum(),
            ast::AssignTargetPat::Invalid(_) => 0,
        },
    }
}

fn count_yields_pat(pat: &ast::Pat) -> usize {
    match pat {
        ast::Pat::Assign(a) => count_yields_pat(&a.left) + count_yields_expr(&a.right),
        ast::Pat::Array(arr) => arr.elems.iter().flatten().map(count_yields_pat).sum(),
        ast::Pat::Object(obj) => obj.props.iter().map(count_yields_obj_pat_prop).sum(),
        ast::Pat::Rest(r) => count_yields_pat(&r.arg),
        ast::Pat::Expr(e) => count_yields_expr(e),
        ast::Pat::Ident(_) | ast::Pat::Invalid(_) => 0,
    }
}

fn count_yields_obj_pat_prop(prop: &ast::ObjectPatProp) -> usize {
    match prop {
        ast::ObjectPatProp::KeyValue(kv) => count_yields_prop_name(&kv.key) + count_yields_pat(&kv.value),
        ast::ObjectPatProp::Assign(a) => a.value.as_deref().map_or(0, count_yields_expr),
        ast::ObjectPatProp::Rest(r) => count_yields_pat(&r.arg),
    }
}

fn count_yields_declarators(decls: &[ast::VarDeclarator]) -> usize {
    decls
        .iter()
        .map(|d| count_yields_pat(&d.name) + d.init.as_deref().map_or(0, count_yields_expr))
        .sum()
}

fn count_yields_for_head(head: &ast::ForHead) -> usize {
    match head {
        ast::ForHead::VarDecl(v) => count_yields_declarators(&v.decls),
        ast::ForHead::UsingDecl(u) => count_yields_declarators(&u.decls),
        ast::ForHead::Pat(p) => count_yields_pat(p),
    }
}

fn count_yields_block(block: &ast::BlockStmt) -> usize {
    block.stmts.iter().map(count_yields_stmt).sum()
}

/// Number of `yield` expressions reachable from a statement.
pub fn count_yields_stmt(stmt: &ast::Stmt) -> usize {
    use ast::Stmt;

    match stmt {
        Stmt::Expr(e) => count_yields_expr(&e.expr),
        Stmt::Block(b) => count_yields_block(b),
        Stmt::If(i) => {
            count_yields_expr(&i.test)
                + count_yields_stmt(&i.cons)
                + i.alt.as_deref().map_or(0, count_yields_stmt)
        }
        Stmt::Switch(s) => {
            count_yields_expr(&s.discriminant)
                + s.cases
                    .iter()
                    .map(|c| {
                        c.test.as_deref().map_or(0, count_yields_expr)
                            + c.cons.iter().map(count_yields_stmt).sum::<usize>()
                    })
                    .sum::<usize>()
        }
        Stmt::Try(t) => {
            count_yields_block(&t.block)
                + t.handler.as_ref().map_or(0, |h| count_yields_block(&h.body))
                + t.finalizer.as_ref().map_or(0, count_yields_block)
        }
        Stmt::While(w) => count_yields_expr(&w.test) + count_yields_stmt(&w.body),
        Stmt::DoWhile(w) => count_yields_expr(&w.test) + count_yields_stmt(&w.body),
        Stmt::For(f) => {
            let init = match &f.init {
                Some(ast::VarDeclOrExpr::VarDecl(v)) => count_yields_declarators(&v.decls),
                Some(ast::VarDeclOrExpr::Expr(e)) => count_yields_expr(e),
                None => 0,
            };
            init + f.test.as_deref().map_or(0, count_yields_expr)
                + f.update.as_deref().map_or(0, count_yields_expr)
                + count_yields_stmt(&f.body)
        }
        Stmt::ForIn(f) => {
            count_yields_for_head(&f.left) + count_yields_expr(&f.right) + count_yields_stmt(&f.body)
        }
        Stmt::ForOf(f) => {
            count_yields_for_head(&f.left) + count_yields_expr(&f.right) + count_yields_stmt(&f.body)
        }
        Stmt::Labeled(l) => count_yields_stmt(&l.body),
        Stmt::With(w) => count_yields_expr(&w.obj) + count_yields_stmt(&w.body),
        Stmt::Return(r) => r.arg.as_deref().map_or(0, count_yields_expr),
        Stmt::Throw(t) => count_yields_expr(&t.arg),
        Stmt::Decl(ast::Decl::Var(v)) => count_yields_declarators(&v.decls),
        Stmt::Decl(ast::Decl::Using(u)) => count_yields_declarators(&u.decls),
        _ => 0,
    }
}

pub fn contains_yield(stmt: &ast::Stmt) -> bool {
    count_yields_stmt(stmt) > 0
}

/// Whether a `return` is reachable from a statement without crossing a
/// function boundary.
pub fn contains_return(stmt: &ast::Stmt) -> bool {
    use ast::Stmt;

    match stmt {
        Stmt::Return(_) => true,
        Stmt::Block(b) => b.stmts.iter().any(contains_return),
        Stmt::If(i) => contains_return(&i.cons) || i.alt.as_deref().is_some_and(contains_return),
        Stmt::Switch(s) => s.cases.iter().any(|c| c.cons.iter().any(contains_return)),
        Stmt::Try(t) => {
            t.block.stmts.iter().any(contains_return)
                || t.handler.as_ref().is_some_and(|h| h.body.stmts.iter().any(contains_return))
                || t.finalizer.as_ref().is_some_and(|f| f.stmts.iter().any(contains_return))
        }
        Stmt::While(w) => contains_return(&w.body),
        Stmt::DoWhile(w) => contains_return(&w.body),
        Stmt::For(f) => contains_return(&f.body),
        Stmt::ForIn(f) => contains_return(&f.body),
        Stmt::ForOf(f) => contains_return(&f.body),
        Stmt::Labeled(l) => contains_return(&l.body),
        Stmt::With(w) => contains_return(&w.body),
        _ => false,
    }
}

/// Where a statement's single yield was found.
#[derive(Debug)]
pub struct YieldSite<'a> {
    pub expr: &'a ast::YieldExpr,
    /// Found through a block or `if` branch rather than at the top
    pub nested: bool,
}

/// The yield reachable through the resumable shapes: an expression
/// statement, a declarator initializer or a return argument, whose
/// expression is the yield itself or the right-hand side of an assignment.
/// Blocks and `if` branches are searched one level at a time.
pub fn find_yield(stmt: &ast::Stmt) -> Option<YieldSite<'_>> {
    match stmt {
        ast::Stmt::Expr(e) => at_top(yield_operand_expr(&e.expr)),
        ast::Stmt::Return(r) => at_top(r.arg.as_deref().and_then(yield_operand_expr)),
        ast::Stmt::Decl(ast::Decl::Var(v)) => at_top(
            v.decls
                .iter()
                .find_map(|d| d.init.as_deref().and_then(yield_operand_expr)),
        ),
        ast::Stmt::Block(b) => b.stmts.iter().find_map(find_yield).map(YieldSite::into_nested),
        ast::Stmt::If(i) => find_yield(&i.cons)
            .or_else(|| i.alt.as_deref().and_then(find_yield))
            .map(YieldSite::into_nested),
        _ => None,
    }
}

fn at_top(expr: Option<&ast::YieldExpr>) -> Option<YieldSite<'_>> {
    expr.map(|expr| YieldSite {
        expr,
        nested: false,
    })
}

impl YieldSite<'_> {
    fn into_nested(self) -> Self {
        YieldSite {
            nested: true,
            ..self
        }
    }
}

/// Whether a declaration initializes a declarator before the one holding
/// its yield, as in `let a = 1, b = yield a;`.
fn initializer_precedes_yield(stmt: &ast::Stmt) -> bool {
    let ast::Stmt::Decl(ast::Decl::Var(var)) = stmt else {
        return false;
    };
    var.decls
        .iter()
        .position(|d| d.init.as_deref().and_then(yield_operand_expr).is_some())
        .is_some_and(|at| var.decls[..at].iter().any(|d| d.init.is_some()))
}

fn yield_operand_expr(expr: &ast::Expr) -> Option<&ast::YieldExpr> {
    match expr {
        ast::Expr::Yield(y) => Some(y),
        ast::Expr::Assign(a) => yield_operand_expr(&a.right),
        ast::Expr::Paren(p) => yield_operand_expr(&p.expr),
        _ => None,
    }
}

/// The return statement that ends the generator, and whether it sits inside
/// a compound statement.
fn find_return(stmt: &ast::Stmt) -> Option<(&ast::ReturnStmt, bool)> {
    let inner = match stmt {
        ast::Stmt::Return(r) => return Some((r, false)),
        ast::Stmt::Block(b) => b.stmts.iter().find_map(find_return),
        ast::Stmt::If(i) => {
            find_return(&i.cons).or_else(|| i.alt.as_deref().and_then(find_return))
        }
        ast::Stmt::Labeled(l) => find_return(&l.body),
        ast::Stmt::Try(t) => t.block.stmts.iter().find_map(find_return).or_else(|| {
            t.finalizer
                .as_ref()
                .and_then(|f| f.stmts.iter().find_map(find_return))
        }),
        _ => None,
    };
    inner.map(|(ret, _)| (ret, true))
}

#[derive(Default)]
struct Accumulator {
    starting_yield: Option<ast::Stmt>,
    statements: Vec<ast::Stmt>,
}

impl Accumulator {
    fn close(self, index: usize, produced: Option<Box<ast::Expr>>, terminal: bool) -> Step {
        Step {
            index,
            starting_yield: self.starting_yield,
            statements: self.statements,
            produced,
            terminal,
        }
    }
}

/// Split a generator body into steps.
///
/// The last step is always terminal. A `return yield x;` statement produces
/// a terminal step whose starting statement is the return itself; its
/// produced value still holds the yield, which the emitter substitutes.
pub fn partition(
    body: &[ast::Stmt],
    warnings: &mut WarningCollector,
) -> Result<Vec<Step>, ParseError> {
    let mut steps = Vec::new();
    let mut acc = Accumulator::default();

    for (position, stmt) in body.iter().enumerate() {
        let offset = span_offset(stmt.span());
        let yields = count_yields_stmt(stmt);
        if yields > 1 {
            return Err(ParseError::MultipleYields {
                count: yields,
                offset,
            });
        }

        if yields == 1 {
            let site = find_yield(stmt).ok_or(ParseError::UnsupportedYieldPosition { offset })?;
            if site.expr.delegate {
                return Err(ParseError::DelegatedYield { offset });
            }
            // earlier initializers would only run on replay, after the yield
            if initializer_precedes_yield(stmt) {
                return Err(ParseError::UnsupportedYieldPosition { offset });
            }
            if site.nested {
                warnings.add(Warning::NestedYield { offset });
            }
            let index = steps.len();
            steps.push(std::mem::take(&mut acc).close(index, site.expr.arg.clone(), false));
            acc.starting_yield = Some(stmt.clone());

            if let ast::Stmt::Return(ret) = stmt {
                let index = steps.len();
                steps.push(std::mem::take(&mut acc).close(index, ret.arg.clone(), true));
                note_unreachable(&body[position + 1..], warnings);
                return Ok(steps);
            }
            continue;
        }

        if contains_return(stmt) {
            let produced = match find_return(stmt) {
                Some((ret, nested)) => {
                    if nested {
                        warnings.add(Warning::NestedReturn { offset });
                    }
                    ret.arg.clone()
                }
                None => {
                    warnings.add(Warning::NestedReturn { offset });
                    None
                }
            };
            let index = steps.len();
            steps.push(acc.close(index, produced, true));
            note_unreachable(&body[position + 1..], warnings);
            return Ok(steps);
        }

        acc.statements.push(stmt.clone());
    }

    // falling off the end finishes the generator with `undefined`
    let index = steps.len();
    steps.push(acc.close(index, None, true));
    tracing::trace!(steps = steps.len(), "body partitioned");
    Ok(steps)
}

fn note_unreachable(rest: &[ast::Stmt], warnings: &mut WarningCollector) {
    let count = rest
        .iter()
        .filter(|s| !matches!(s, ast::Stmt::Empty(_)))
        .count();
    if count > 0 {
        warnings.add(Warning::UnreachableStatements { count });
    }
}
