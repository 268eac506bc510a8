//! Typed constructors for the syntax nodes the emitter produces.
//!
//! Every node built here carries a dummy span; the printer lays it out
//! from scratch.

use deno_ast::swc::ast::{
    ArrayLit, AssignExpr, AssignOp, AssignTarget, BindingIdent, BlockStmt, Bool, Expr, ExprOrSpread,
    ExprStmt, Ident, IdentName, KeyValueProp, Lit, MemberExpr, MemberProp, NewExpr, Number,
    ObjectLit, Param, ParenExpr, Pat, Prop, PropName, PropOrSpread, ReturnStmt, SimpleAssignTarget,
    SpreadElement, Stmt, Str, ThisExpr, ThrowStmt, TsArrayType, TsAsExpr, TsEntityName, TsKeywordType,
    TsKeywordTypeKind, TsPropertySignature, TsType, TsTypeAnn, TsTypeElement, TsTypeLit,
    TsTypeParamInstantiation, TsTypeRef,
};
use deno_ast::swc::common::DUMMY_SP;

pub fn ident(sym: &str) -> Ident {
    Ident::new_no_ctxt(sym.into(), DUMMY_SP)
}

pub fn ident_name(sym: &str) -> IdentName {
    IdentName::new(sym.into(), DUMMY_SP)
}

pub fn ident_expr(sym: &str) -> Box<Expr> {
    Box::new(Expr::Ident(ident(sym)))
}

pub fn undefined() -> Box<Expr> {
    ident_expr("undefined")
}

pub fn num(value: f64) -> Box<Expr> {
    Box::new(Expr::Lit(Lit::Num(Number {
        span: DUMMY_SP,
        value,
        raw: None,
    })))
}

pub fn str_lit(value: &str) -> Box<Expr> {
    Box::new(Expr::Lit(Lit::Str(Str {
        span: DUMMY_SP,
        value: value.into(),
        raw: None,
    })))
}

pub fn bool_lit(value: bool) -> Box<Expr> {
    Box::new(Expr::Lit(Lit::Bool(Bool {
        span: DUMMY_SP,
        value,
    })))
}

pub fn empty_array() -> Box<Expr> {
    Box::new(Expr::Array(ArrayLit::default()))
}

pub fn object(props: Vec<PropOrSpread>) -> Box<Expr> {
    Box::new(Expr::Object(ObjectLit {
        span: DUMMY_SP,
        props,
    }))
}

pub fn empty_object() -> Box<Expr> {
    object(Vec::new())
}

/// `key: value`
pub fn key_value(key: &str, value: Box<Expr>) -> PropOrSpread {
    PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp {
        key: PropName::Ident(ident_name(key)),
        value,
    })))
}

/// `...expr`
pub fn spread(expr: Box<Expr>) -> PropOrSpread {
    PropOrSpread::Spread(SpreadElement {
        dot3_token: DUMMY_SP,
        expr,
    })
}

pub fn paren(expr: Box<Expr>) -> Box<Expr> {
    Box::new(Expr::Paren(ParenExpr {
        span: DUMMY_SP,
        expr,
    }))
}

/// `expr as ty`
pub fn ts_as(expr: Box<Expr>, ty: Box<TsType>) -> Box<Expr> {
    Box::new(Expr::TsAs(TsAsExpr {
        span: DUMMY_SP,
        expr,
        type_ann: ty,
    }))
}

pub fn member(obj: Box<Expr>, prop: &str) -> MemberExpr {
    MemberExpr {
        span: DUMMY_SP,
        obj,
        prop: MemberProp::Ident(ident_name(prop)),
    }
}

/// `this.<field>`
pub fn this_member(field: &str) -> MemberExpr {
    member(Box::new(Expr::This(ThisExpr { span: DUMMY_SP })), field)
}

/// `this.<state_field>.<name>`
pub fn state_member(state_field: &str, name: &str) -> MemberExpr {
    member(Box::new(Expr::Member(this_member(state_field))), name)
}

pub fn state_access(state_field: &str, name: &str) -> Box<Expr> {
    Box::new(Expr::Member(state_member(state_field, name)))
}

/// `target op value`
pub fn assign(op: AssignOp, target: MemberExpr, value: Box<Expr>) -> Box<Expr> {
    Box::new(Expr::Assign(AssignExpr {
        span: DUMMY_SP,
        op,
        left: AssignTarget::Simple(SimpleAssignTarget::Member(target)),
        right: value,
    }))
}

pub fn expr_stmt(expr: Box<Expr>) -> Stmt {
    Stmt::Expr(ExprStmt {
        span: DUMMY_SP,
        expr,
    })
}

/// `target = value;`
pub fn assign_stmt(target: MemberExpr, value: Box<Expr>) -> Stmt {
    expr_stmt(assign(AssignOp::Assign, target, value))
}

pub fn return_stmt(arg: Option<Box<Expr>>) -> Stmt {
    Stmt::Return(ReturnStmt {
        span: DUMMY_SP,
        arg,
    })
}

/// `throw new Error("<message>");`
pub fn throw_error(message: &str) -> Stmt {
    Stmt::Throw(ThrowStmt {
        span: DUMMY_SP,
        arg: Box::new(Expr::New(NewExpr {
            callee: ident_expr("Error"),
            args: Some(vec![ExprOrSpread {
                spread: None,
                expr: str_lit(message),
            }]),
            ..Default::default()
        })),
    })
}

pub fn block(stmts: Vec<Stmt>) -> BlockStmt {
    BlockStmt {
        stmts,
        ..Default::default()
    }
}

pub fn type_ann(ty: Box<TsType>) -> Box<TsTypeAnn> {
    Box::new(TsTypeAnn {
        span: DUMMY_SP,
        type_ann: ty,
    })
}

/// `name: ty` as a function parameter
pub fn param(name: &str, ty: Box<TsType>) -> Param {
    Param::from(Pat::Ident(BindingIdent {
        id: ident(name),
        type_ann: Some(type_ann(ty)),
    }))
}

pub fn keyword_type(kind: TsKeywordTypeKind) -> Box<TsType> {
    Box::new(TsType::TsKeywordType(TsKeywordType {
        span: DUMMY_SP,
        kind,
    }))
}

pub fn any_type() -> Box<TsType> {
    keyword_type(TsKeywordTypeKind::TsAnyKeyword)
}

/// `any[]`
pub fn any_array_type() -> Box<TsType> {
    Box::new(TsType::TsArrayType(TsArrayType {
        span: DUMMY_SP,
        elem_type: any_type(),
    }))
}

/// `Name<params...>`; no angle brackets when `params` is empty
pub fn type_ref(name: &str, params: Vec<Box<TsType>>) -> Box<TsType> {
    let type_params = (!params.is_empty()).then(|| {
        Box::new(TsTypeParamInstantiation {
            span: DUMMY_SP,
            params,
        })
    });
    Box::new(TsType::TsTypeRef(TsTypeRef {
        span: DUMMY_SP,
        type_name: TsEntityName::Ident(ident(name)),
        type_params,
    }))
}

/// `name?: ty` inside a type literal
pub fn property_signature(name: &str, ty: Box<TsType>, optional: bool) -> TsTypeElement {
    TsTypeElement::TsPropertySignature(TsPropertySignature {
        span: DUMMY_SP,
        readonly: false,
        key: ident_expr(name),
        computed: false,
        optional,
        type_ann: Some(type_ann(ty)),
    })
}

pub fn type_literal(members: Vec<TsTypeElement>) -> Box<TsType> {
    Box::new(TsType::TsTypeLit(TsTypeLit {
        span: DUMMY_SP,
        members,
    }))
}
